//! Recognized preference keys, their storage names and value kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::PrefValue;

/// A preference the synchronizer knows how to read, validate and apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    DarkMode,
    HighContrast,
    ReducedMotion,
    FontSize,
    FontFamily,
    DyslexiaFont,
    LineSpacing,
    #[serde(rename = "enhanced_a11y")]
    EnhancedA11y,
    FocusMode,
    KeyboardShortcuts,
}

/// The type a key's value is fixed to, with its validation bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Flag,
    Integer { min: i64, max: i64 },
    Decimal { min: f64, max: f64 },
    Text,
}

impl PreferenceKey {
    pub const ALL: [Self; 10] = [
        Self::DarkMode,
        Self::HighContrast,
        Self::ReducedMotion,
        Self::FontSize,
        Self::FontFamily,
        Self::DyslexiaFont,
        Self::LineSpacing,
        Self::EnhancedA11y,
        Self::FocusMode,
        Self::KeyboardShortcuts,
    ];

    /// Canonical name used in the local cache and by the remote endpoint.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DarkMode => "dark_mode",
            Self::HighContrast => "high_contrast",
            Self::ReducedMotion => "reduced_motion",
            Self::FontSize => "font_size",
            Self::FontFamily => "font_family",
            Self::DyslexiaFont => "dyslexia_font",
            Self::LineSpacing => "line_spacing",
            Self::EnhancedA11y => "enhanced_a11y",
            Self::FocusMode => "focus_mode",
            Self::KeyboardShortcuts => "keyboard_shortcuts",
        }
    }

    /// Legacy names that resolve to the same preference.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ReducedMotion => &["reduce_animations"],
            Self::FontSize => &["text_size"],
            _ => &[],
        }
    }

    /// Canonical name first, then every alias.
    pub fn storage_names(self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name()).chain(self.aliases().iter().copied())
    }

    /// Resolve a canonical or alias name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.storage_names().any(|candidate| candidate == name))
    }

    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::FontSize => ValueKind::Integer { min: 50, max: 300 },
            Self::LineSpacing => ValueKind::Decimal { min: 0.5, max: 4.0 },
            Self::FontFamily => ValueKind::Text,
            _ => ValueKind::Flag,
        }
    }

    /// Value assumed when neither the cache nor the remote source has one.
    #[must_use]
    pub fn default_value(self) -> PrefValue {
        match self {
            Self::FontSize => PrefValue::Integer(100),
            Self::LineSpacing => PrefValue::Decimal(1.5),
            Self::FontFamily => PrefValue::Text("system-ui".to_string()),
            _ => PrefValue::Flag(false),
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
