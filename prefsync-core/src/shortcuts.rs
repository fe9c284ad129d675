//! Keyboard shortcut dispatcher: chord table plus a two-state helper toggle.

use log::debug;
use serde::Serialize;

use crate::config::{Modifier, ShortcutConfig, ShortcutRoute};
use crate::effects::Presentation;
use crate::keys::PreferenceKey;
use crate::store::{LocalCache, SettingsStore};

const SEARCH_KEY: &str = "/";
const ESCAPE_KEY: &str = "Escape";

/// Page collaborator the dispatcher drives.
pub trait PageHost {
    /// Full-page navigation; ends the page lifecycle.
    fn navigate(&self, path: &str);
    /// Focus the first search input. Returns `false` if there is none.
    fn focus_search(&self) -> bool;
    /// Trigger the close control of an open modal. Returns `false` if none is open.
    fn close_modal(&self) -> bool;
    fn show_helper(&self);
    fn hide_helper(&self);
}

/// The parts of a keydown event the dispatcher looks at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    pub key: String,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub const fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[must_use]
    pub const fn holds(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Alt => self.alt,
            Modifier::Ctrl => self.ctrl,
            Modifier::Meta => self.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HelperState {
    #[default]
    Idle,
    HelperVisible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    ToggleHelper,
    Navigate(String),
    FocusSearch,
    CloseModal,
}

/// Whether the host should suppress the browser's default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Handled,
    PassThrough,
}

impl KeyDisposition {
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// One row of the shortcut helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelperEntry {
    pub keys: Vec<String>,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct ShortcutDispatcher {
    enabled: bool,
    state: HelperState,
    config: ShortcutConfig,
}

impl ShortcutDispatcher {
    pub const fn new(enabled: bool, config: ShortcutConfig) -> Self {
        Self {
            enabled,
            state: HelperState::Idle,
            config,
        }
    }

    /// Enabled only when the cache flag `keyboard_shortcuts` is `true`.
    pub fn from_store<C, P>(store: &SettingsStore<C, P>, config: ShortcutConfig) -> Self
    where
        C: LocalCache,
        P: Presentation,
    {
        Self::new(store.flag(PreferenceKey::KeyboardShortcuts), config)
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn state(&self) -> HelperState {
        self.state
    }

    /// Map a key event to an action without performing it.
    #[must_use]
    pub fn resolve(&self, input: &KeyInput) -> Option<ShortcutAction> {
        if !self.enabled {
            return None;
        }
        if input.key == self.config.help_key {
            return Some(ShortcutAction::ToggleHelper);
        }
        if input.holds(self.config.modifier) {
            return self
                .route_for(&input.key)
                .map(|route| ShortcutAction::Navigate(route.path.clone()));
        }
        match input.key.as_str() {
            SEARCH_KEY => Some(ShortcutAction::FocusSearch),
            ESCAPE_KEY => Some(ShortcutAction::CloseModal),
            _ => None,
        }
    }

    /// Handle one keydown. `Handled` means the host must call `preventDefault`.
    pub fn handle<H: PageHost + ?Sized>(&mut self, input: &KeyInput, host: &H) -> KeyDisposition {
        let Some(action) = self.resolve(input) else {
            return KeyDisposition::PassThrough;
        };
        debug!("shortcut {:?} -> {action:?}", input.key);
        match action {
            ShortcutAction::ToggleHelper => {
                self.state = match self.state {
                    HelperState::Idle => {
                        host.show_helper();
                        HelperState::HelperVisible
                    }
                    HelperState::HelperVisible => {
                        host.hide_helper();
                        HelperState::Idle
                    }
                };
                KeyDisposition::Handled
            }
            ShortcutAction::Navigate(path) => {
                host.navigate(&path);
                KeyDisposition::Handled
            }
            ShortcutAction::FocusSearch => handled_if(host.focus_search()),
            ShortcutAction::CloseModal => handled_if(host.close_modal()),
        }
    }

    /// The helper's own close control was used.
    pub fn dismiss_helper<H: PageHost + ?Sized>(&mut self, host: &H) {
        if self.state == HelperState::HelperVisible {
            host.hide_helper();
            self.state = HelperState::Idle;
        }
    }

    /// Rows for the shortcut helper, chords first.
    #[must_use]
    pub fn helper_entries(&self) -> Vec<HelperEntry> {
        let modifier = self.config.modifier.label();
        let mut entries: Vec<HelperEntry> = self
            .config
            .routes
            .iter()
            .map(|route| HelperEntry {
                keys: vec![
                    modifier.to_string(),
                    route.key.to_ascii_uppercase().to_string(),
                ],
                label: route.label.clone(),
            })
            .collect();
        entries.push(HelperEntry {
            keys: vec![SEARCH_KEY.to_string()],
            label: "Focus Search".to_string(),
        });
        entries.push(HelperEntry {
            keys: vec!["Esc".to_string()],
            label: "Close Modal".to_string(),
        });
        entries.push(HelperEntry {
            keys: vec![self.config.help_key.clone()],
            label: "Show/Hide This Helper".to_string(),
        });
        entries
    }

    fn route_for(&self, key: &str) -> Option<&ShortcutRoute> {
        let mut chars = key.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return None;
        };
        let letter = letter.to_ascii_lowercase();
        self.config
            .routes
            .iter()
            .find(|route| route.key.to_ascii_lowercase() == letter)
    }
}

const fn handled_if(done: bool) -> KeyDisposition {
    if done {
        KeyDisposition::Handled
    } else {
        KeyDisposition::PassThrough
    }
}
