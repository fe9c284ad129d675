//! Host configuration: endpoints, the shortcut table and DOM selectors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration. Every field has a default, so `{}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub endpoints: Endpoints,
    pub shortcuts: ShortcutConfig,
    pub dom: DomConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub fetch: String,
    pub update: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            fetch: "/api/settings/accessibility/get".to_string(),
            update: "/api/settings/accessibility".to_string(),
        }
    }
}

/// Modifier that must be held for a navigation chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    #[default]
    Alt,
    Ctrl,
    Meta,
}

impl Modifier {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alt => "Alt",
            Self::Ctrl => "Ctrl",
            Self::Meta => "Meta",
        }
    }
}

/// One navigation chord: modifier + `key` goes to `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutRoute {
    pub key: char,
    pub path: String,
    pub label: String,
}

impl ShortcutRoute {
    fn new(key: char, path: &str, label: &str) -> Self {
        Self {
            key,
            path: path.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub modifier: Modifier,
    pub help_key: String,
    pub routes: Vec<ShortcutRoute>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            modifier: Modifier::Alt,
            help_key: "F1".to_string(),
            routes: vec![
                ShortcutRoute::new('h', "/dashboard", "Dashboard"),
                ShortcutRoute::new('f', "/flashcards", "Flashcards"),
                ShortcutRoute::new('g', "/grades", "Grades"),
                ShortcutRoute::new('t', "/timetable", "Timetable"),
                ShortcutRoute::new('d', "/discussions", "Discussions"),
                ShortcutRoute::new('s', "/settings", "Settings"),
                ShortcutRoute::new('a', "/study_analytics", "Study Analytics"),
                ShortcutRoute::new('x', "/accessibility", "Accessibility Settings"),
            ],
        }
    }
}

/// Selectors and ids the browser host uses to find page elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomConfig {
    pub search_selector: String,
    pub modal_close_selector: String,
    pub helper_container_id: String,
    pub panel_container_id: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            search_selector: "input[type=\"search\"]".to_string(),
            modal_close_selector: ".modal.show .close, .modal.show .btn-close".to_string(),
            helper_container_id: "keyboard-shortcuts-helper".to_string(),
            panel_container_id: "accessibility-preferences".to_string(),
        }
    }
}

impl SyncConfig {
    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON, or the first
    /// validation error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first invariant the configuration violates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.fetch.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint("fetch"));
        }
        if self.endpoints.update.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint("update"));
        }
        if self.shortcuts.help_key.trim().is_empty() {
            return Err(ConfigError::EmptyHelpKey);
        }
        let mut seen = BTreeSet::new();
        for route in &self.shortcuts.routes {
            if !route.key.is_ascii_alphabetic() {
                return Err(ConfigError::InvalidChordKey(route.key));
            }
            if !seen.insert(route.key.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateChord(route.key));
            }
            if !route.path.starts_with('/') {
                return Err(ConfigError::RelativePath {
                    key: route.key,
                    path: route.path.clone(),
                });
            }
        }
        Ok(())
    }
}
