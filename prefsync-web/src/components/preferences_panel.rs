use prefsync_core::{PrefValue, Preference, PreferenceKey, PreferenceSet, ValueKind};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub prefs: PreferenceSet,
    /// Emitted with the new value whenever a toggle changes.
    pub on_change: Callback<Preference>,
}

#[must_use]
pub const fn preference_label(key: PreferenceKey) -> &'static str {
    match key {
        PreferenceKey::DarkMode => "Dark mode",
        PreferenceKey::HighContrast => "High contrast",
        PreferenceKey::ReducedMotion => "Reduce motion",
        PreferenceKey::FontSize => "Text size",
        PreferenceKey::FontFamily => "Font",
        PreferenceKey::DyslexiaFont => "Dyslexia-friendly font",
        PreferenceKey::LineSpacing => "Line spacing",
        PreferenceKey::EnhancedA11y => "Enhanced accessibility",
        PreferenceKey::FocusMode => "Focus mode",
        PreferenceKey::KeyboardShortcuts => "Keyboard shortcuts",
    }
}

#[function_component(PreferencesPanel)]
pub fn preferences_panel(p: &Props) -> Html {
    let current = use_state(|| p.prefs.clone());

    let toggles = PreferenceKey::ALL
        .into_iter()
        .filter(|key| key.kind() == ValueKind::Flag)
        .map(|key| {
            let checked = current.flag(key);
            let onchange = {
                let current = current.clone();
                let on_change = p.on_change.clone();
                Callback::from(move |e: Event| {
                    let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() else {
                        return;
                    };
                    let Ok(pref) = Preference::new(key, PrefValue::Flag(input.checked())) else {
                        return;
                    };
                    let mut next = (*current).clone();
                    next.insert(pref.clone());
                    current.set(next);
                    on_change.emit(pref);
                })
            };
            let id = format!("pref-{}", key.name());
            html! {
                <li class="preference-toggle">
                    <input type="checkbox" id={id.clone()} {checked} {onchange} />
                    <label for={id}>{ preference_label(key) }</label>
                </li>
            }
        })
        .collect::<Html>();

    html! {
        <section class="preferences-panel" aria-labelledby="preferences-title">
            <h2 id="preferences-title">{ "Accessibility" }</h2>
            <ul>{ toggles }</ul>
        </section>
    }
}
