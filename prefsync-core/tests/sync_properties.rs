use futures::executor::block_on;
use prefsync_core::memory::{
    MemoryCache, PageCall, RecordingPage, RecordingPresentation, ScriptedRemote,
};
use prefsync_core::{
    KeyDisposition, KeyInput, LocalCache, PrefValue, Preference, PreferenceKey, PreferenceSet,
    SettingsStore, ShortcutConfig, ShortcutDispatcher, SyncError, SyncStatus, Synchronizer,
};

type Store = SettingsStore<MemoryCache, RecordingPresentation>;

fn store_with(entries: &[(&str, &str)]) -> Store {
    SettingsStore::new(
        MemoryCache::with_entries(entries.iter().copied()),
        RecordingPresentation::default(),
    )
}

fn expected_presentation(prefs: &PreferenceSet) -> RecordingPresentation {
    let presentation = RecordingPresentation::default();
    for pref in prefs.iter() {
        pref.apply(&presentation);
    }
    presentation
}

#[test]
fn empty_cache_with_remote_dark_mode_and_font_size() {
    let remote = ScriptedRemote::default()
        .respond(r#"{"success": true, "settings": {"dark_mode": true, "font_size": 120}}"#);
    let sync = Synchronizer::new(remote);
    let store = store_with(&[]);

    let summary = block_on(sync.run(&store));

    let SyncStatus::Reconciled(report) = &summary.status else {
        panic!("expected reconciliation, got {:?}", summary.status);
    };
    assert_eq!(
        report.changed,
        vec![PreferenceKey::DarkMode, PreferenceKey::FontSize]
    );
    let presentation = store.presentation();
    assert!(presentation.has_class("dark-mode"));
    assert_eq!(
        presentation.style_var("--text-size-factor").as_deref(),
        Some("1.2")
    );
    assert_eq!(store.cache().get("dark_mode").as_deref(), Some("true"));
    assert_eq!(store.cache().get("font_size").as_deref(), Some("120"));
}

#[test]
fn transport_failure_leaves_local_presentation() {
    let remote = ScriptedRemote::default().fail(SyncError::Transport("offline".into()));
    let sync = Synchronizer::new(remote);
    let store = store_with(&[("high_contrast", "true"), ("line_spacing", "2")]);
    let before = store.cache().snapshot();

    let summary = block_on(sync.run(&store));

    assert!(matches!(
        summary.status,
        SyncStatus::Failed(SyncError::Transport(_))
    ));
    let expected = expected_presentation(&summary.local);
    assert_eq!(store.presentation().classes(), expected.classes());
    assert_eq!(store.presentation().style_vars(), expected.style_vars());
    assert!(store.presentation().has_class("high-contrast"));
    assert_eq!(store.cache().snapshot(), before);
}

#[test]
fn local_only_keys_reflect_their_cached_effect() {
    let sync = Synchronizer::new(ScriptedRemote::default());
    let store = store_with(&[
        ("focus_mode", "true"),
        ("font_family", "OpenDyslexic"),
        ("font_size", "90"),
    ]);
    let local = sync.load_and_apply_local(&store);
    let expected = expected_presentation(&local);
    assert_eq!(store.presentation().classes(), expected.classes());
    assert_eq!(store.presentation().style_vars(), expected.style_vars());
    assert_eq!(
        store.presentation().style_var("--font-family").as_deref(),
        Some("OpenDyslexic")
    );
}

#[test]
fn keys_absent_from_remote_stay_untouched() {
    let remote = ScriptedRemote::default()
        .respond(r#"{"success": true, "settings": {"dark_mode": false}}"#);
    let sync = Synchronizer::new(remote);
    let store = store_with(&[("dark_mode", "true"), ("focus_mode", "true")]);

    block_on(sync.run(&store));

    assert!(!store.presentation().has_class("dark-mode"));
    assert!(store.presentation().has_class("focus-mode"));
    assert_eq!(store.cache().get("dark_mode").as_deref(), Some("false"));
    assert_eq!(store.cache().get("focus_mode").as_deref(), Some("true"));
}

#[test]
fn malformed_remote_value_skips_only_that_key() {
    let remote = ScriptedRemote::default().respond(
        r#"{"success": true, "settings": {"dark_mode": "on", "high_contrast": true}}"#,
    );
    let sync = Synchronizer::new(remote);
    let store = store_with(&[("dark_mode", "true")]);

    let summary = block_on(sync.run(&store));

    assert!(matches!(summary.status, SyncStatus::Reconciled(_)));
    assert!(store.presentation().has_class("dark-mode"));
    assert!(store.presentation().has_class("high-contrast"));
    assert_eq!(store.cache().get("dark_mode").as_deref(), Some("true"));
}

#[test]
fn alias_flag_matches_canonical_flag() {
    let via_alias = store_with(&[("reduce_animations", "true")]);
    let via_canonical = store_with(&[("reduced_motion", "true")]);
    let sync = Synchronizer::new(ScriptedRemote::default());
    sync.load_and_apply_local(&via_alias);
    sync.load_and_apply_local(&via_canonical);
    assert_eq!(
        via_alias.presentation().classes(),
        via_canonical.presentation().classes()
    );
    assert!(via_alias.presentation().has_class("reduced-motion"));
}

#[test]
fn reconcile_same_remote_twice_invokes_no_more_effects() {
    let sync = Synchronizer::new(ScriptedRemote::default());
    let store = store_with(&[]);
    let mut local = sync.load_and_apply_local(&store);
    let remote: PreferenceSet = [
        Preference::new(PreferenceKey::HighContrast, PrefValue::Flag(true)).unwrap(),
        Preference::new(PreferenceKey::LineSpacing, PrefValue::Decimal(2.0)).unwrap(),
    ]
    .into_iter()
    .collect();

    sync.reconcile(&store, &mut local, &remote);
    let after_first = store.presentation().call_count();
    sync.reconcile(&store, &mut local, &remote);
    assert_eq!(store.presentation().call_count(), after_first);
}

#[test]
fn shortcuts_unset_means_no_navigation() {
    let store = store_with(&[]);
    let mut dispatcher = ShortcutDispatcher::from_store(&store, ShortcutConfig::default());
    let page = RecordingPage::default();
    for letter in ["h", "f", "g", "t", "d", "s", "a", "x"] {
        assert_eq!(
            dispatcher.handle(&KeyInput::new(letter).with_alt(), &page),
            KeyDisposition::PassThrough
        );
    }
    assert!(
        !page
            .calls()
            .iter()
            .any(|call| matches!(call, PageCall::Navigate(_)))
    );
}

#[test]
fn remote_write_back_enables_shortcuts_on_next_load() {
    let remote = ScriptedRemote::default()
        .respond(r#"{"success": true, "settings": {"keyboard_shortcuts": true}}"#);
    let sync = Synchronizer::new(remote);
    let store = store_with(&[]);
    block_on(sync.run(&store));

    let next_page = store_with(&[]);
    for (key, value) in store.cache().snapshot() {
        next_page.cache().set(&key, &value).unwrap();
    }
    assert!(ShortcutDispatcher::from_store(&next_page, ShortcutConfig::default()).is_enabled());
}
