//! Presentation effects: the class toggles and style variables each
//! preference maps to.

use crate::keys::PreferenceKey;
use crate::preference::Preference;
use crate::value::PrefValue;

/// Presentation collaborator consumed by preference effects.
///
/// Classes live on the presentation root's class set; style variables are
/// named custom properties on the style root.
pub trait Presentation {
    fn set_class(&self, class: &str, enabled: bool);
    fn set_style_var(&self, name: &str, value: &str);
}

impl<P: Presentation + ?Sized> Presentation for &P {
    fn set_class(&self, class: &str, enabled: bool) {
        (**self).set_class(class, enabled);
    }

    fn set_style_var(&self, name: &str, value: &str) {
        (**self).set_style_var(name, value);
    }
}

impl<P: Presentation + ?Sized> Presentation for std::rc::Rc<P> {
    fn set_class(&self, class: &str, enabled: bool) {
        (**self).set_class(class, enabled);
    }

    fn set_style_var(&self, name: &str, value: &str) {
        (**self).set_style_var(name, value);
    }
}

/// The mutation a preference value produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Classes {
        names: &'static [&'static str],
        enabled: bool,
    },
    StyleVars(Vec<(&'static str, String)>),
    None,
}

impl Effect {
    pub fn apply<P: Presentation + ?Sized>(&self, presentation: &P) {
        match self {
            Self::Classes { names, enabled } => {
                for name in *names {
                    presentation.set_class(name, *enabled);
                }
            }
            Self::StyleVars(vars) => {
                for (name, value) in vars {
                    presentation.set_style_var(name, value);
                }
            }
            Self::None => {}
        }
    }
}

/// Class names toggled by a flag preference, empty for non-class keys.
#[must_use]
pub const fn classes_for(key: PreferenceKey) -> &'static [&'static str] {
    match key {
        PreferenceKey::DarkMode => &["dark-mode"],
        PreferenceKey::HighContrast => &["high-contrast"],
        PreferenceKey::ReducedMotion => &["reduced-motion", "reduce-animations"],
        PreferenceKey::DyslexiaFont => &["dyslexia-font"],
        PreferenceKey::EnhancedA11y => &["enhanced-a11y"],
        PreferenceKey::FocusMode => &["focus-mode"],
        _ => &[],
    }
}

impl Preference {
    #[must_use]
    pub fn effect(&self) -> Effect {
        let value = self.value();
        match self.key() {
            PreferenceKey::FontSize => {
                let factor = value.as_f64().unwrap_or(100.0) / 100.0;
                let factor = PrefValue::Decimal(factor).to_string();
                Effect::StyleVars(vec![
                    ("--text-size-factor", factor.clone()),
                    ("--font-size-multiplier", factor),
                ])
            }
            PreferenceKey::LineSpacing => {
                let spacing = value.to_string();
                Effect::StyleVars(vec![
                    ("--line-spacing", spacing.clone()),
                    ("--line-spacing-multiplier", spacing),
                ])
            }
            PreferenceKey::FontFamily => Effect::StyleVars(vec![("--font-family", value.to_string())]),
            PreferenceKey::KeyboardShortcuts => Effect::None,
            key => Effect::Classes {
                names: classes_for(key),
                enabled: value.as_flag().unwrap_or(false),
            },
        }
    }

    pub fn apply<P: Presentation + ?Sized>(&self, presentation: &P) {
        self.effect().apply(presentation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RecordingPresentation;

    fn pref(key: PreferenceKey, value: PrefValue) -> Preference {
        Preference::new(key, value).unwrap()
    }

    #[test]
    fn reduced_motion_toggles_both_classes() {
        let presentation = RecordingPresentation::default();
        pref(PreferenceKey::ReducedMotion, PrefValue::Flag(true)).apply(&presentation);
        assert!(presentation.has_class("reduced-motion"));
        assert!(presentation.has_class("reduce-animations"));

        pref(PreferenceKey::ReducedMotion, PrefValue::Flag(false)).apply(&presentation);
        assert!(!presentation.has_class("reduced-motion"));
        assert!(!presentation.has_class("reduce-animations"));
    }

    #[test]
    fn font_size_sets_factor_variables() {
        let presentation = RecordingPresentation::default();
        pref(PreferenceKey::FontSize, PrefValue::Integer(120)).apply(&presentation);
        assert_eq!(
            presentation.style_var("--text-size-factor").as_deref(),
            Some("1.2")
        );
        assert_eq!(
            presentation.style_var("--font-size-multiplier").as_deref(),
            Some("1.2")
        );
    }

    #[test]
    fn line_spacing_multiplier_matches_value() {
        let presentation = RecordingPresentation::default();
        pref(PreferenceKey::LineSpacing, PrefValue::Decimal(1.75)).apply(&presentation);
        assert_eq!(presentation.style_var("--line-spacing").as_deref(), Some("1.75"));
        assert_eq!(
            presentation.style_var("--line-spacing-multiplier").as_deref(),
            Some("1.75")
        );
    }

    #[test]
    fn keyboard_shortcuts_has_no_presentation_effect() {
        let presentation = RecordingPresentation::default();
        pref(PreferenceKey::KeyboardShortcuts, PrefValue::Flag(true)).apply(&presentation);
        assert_eq!(presentation.call_count(), 0);
    }
}
