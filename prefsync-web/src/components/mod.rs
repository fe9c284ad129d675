pub mod preferences_panel;
pub mod shortcut_helper;

pub use preferences_panel::PreferencesPanel;
pub use shortcut_helper::ShortcutHelper;
