//! prefsync core
//!
//! Platform-agnostic accessibility preference model: typed preferences with
//! presentation effects, a synchronizer that reconciles the local cache with
//! the authoritative remote set, and a keyboard shortcut dispatcher.
//! Hosts provide the cache, presentation, page and transport collaborators.

pub mod config;
pub mod effects;
pub mod error;
pub mod input_mode;
pub mod keys;
pub mod memory;
pub mod preference;
pub mod remote;
pub mod shortcuts;
pub mod store;
pub mod sync;
pub mod value;

// Re-export commonly used types
pub use config::{DomConfig, Endpoints, Modifier, ShortcutConfig, ShortcutRoute, SyncConfig};
pub use effects::{Effect, Presentation};
pub use error::{CacheError, ConfigError, SyncError, ValueFailure, ValueFailureReason};
pub use input_mode::{InputModeTracker, USING_MOUSE_CLASS};
pub use keys::{PreferenceKey, ValueKind};
pub use preference::{Preference, PreferenceSet};
pub use remote::{FetchOutcome, RemoteSettings, RemoteSource, UpdateBody};
pub use shortcuts::{
    HelperEntry, HelperState, KeyDisposition, KeyInput, PageHost, ShortcutAction,
    ShortcutDispatcher,
};
pub use store::{LocalCache, LocalRead, SettingsStore};
pub use sync::{ReconcileReport, SyncStatus, SyncSummary, Synchronizer};
pub use value::PrefValue;
