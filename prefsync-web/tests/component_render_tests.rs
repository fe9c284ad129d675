use futures::executor::block_on;
use prefsync_core::{
    PrefValue, Preference, PreferenceKey, PreferenceSet, ShortcutConfig, ShortcutDispatcher,
};
use prefsync_web::components::{PreferencesPanel, ShortcutHelper, preferences_panel, shortcut_helper};
use yew::{Callback, LocalServerRenderer};

fn helper_html(dispatcher: &ShortcutDispatcher) -> String {
    let props = shortcut_helper::Props {
        entries: dispatcher.helper_entries(),
        on_close: Callback::noop(),
    };
    block_on(LocalServerRenderer::<ShortcutHelper>::with_props(props).render())
}

#[test]
fn shortcut_helper_lists_chords_and_close_control() {
    let html = helper_html(&ShortcutDispatcher::new(true, ShortcutConfig::default()));
    assert!(html.contains("keyboard-shortcuts-helper"));
    assert!(html.contains("btn-close"));
    assert!(html.contains("<kbd>Alt</kbd>"));
    assert!(html.contains("<kbd>H</kbd>"));
    assert!(html.contains("Dashboard"));
    assert!(html.contains("Accessibility Settings"));
    assert!(html.contains("<kbd>F1</kbd>"));
    assert_eq!(html.matches("<li>").count(), 11);
}

#[test]
fn shortcut_helper_follows_configured_modifier() {
    let config: ShortcutConfig =
        serde_json::from_str(r#"{"modifier": "ctrl", "help_key": "F2"}"#).unwrap();
    let html = helper_html(&ShortcutDispatcher::new(true, config));
    assert!(html.contains("<kbd>Ctrl</kbd>"));
    assert!(!html.contains("<kbd>Alt</kbd>"));
    assert!(html.contains("<kbd>F2</kbd>"));
}

#[test]
fn preferences_panel_renders_one_toggle_per_flag() {
    let props = preferences_panel::Props {
        prefs: PreferenceSet::defaults(),
        on_change: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<PreferencesPanel>::with_props(props).render());
    assert!(html.contains("preferences-panel"));
    assert_eq!(html.matches("type=\"checkbox\"").count(), 7);
    assert!(html.contains("pref-dark_mode"));
    assert!(html.contains("pref-keyboard_shortcuts"));
    assert!(!html.contains("pref-font_size"));
    assert!(!html.contains("pref-line_spacing"));
}

#[test]
fn preferences_panel_labels_every_toggle() {
    let mut prefs = PreferenceSet::defaults();
    prefs.insert(Preference::new(PreferenceKey::DarkMode, PrefValue::Flag(true)).unwrap());
    let props = preferences_panel::Props {
        prefs,
        on_change: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<PreferencesPanel>::with_props(props).render());
    assert!(html.contains("Dark mode"));
    assert!(html.contains("Keyboard shortcuts"));
    assert_eq!(
        preferences_panel::preference_label(PreferenceKey::DarkMode),
        "Dark mode"
    );
}
