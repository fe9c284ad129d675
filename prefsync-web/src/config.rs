use log::warn;
use prefsync_core::SyncConfig;

const STATIC_CONFIG: &str = include_str!("../static/prefsync.json");

/// Load the bundled configuration, falling back to built-in defaults when
/// it fails to parse or validate.
#[must_use]
pub fn load_from_static() -> SyncConfig {
    SyncConfig::from_json(STATIC_CONFIG).unwrap_or_else(|err| {
        warn!("bundled prefsync.json rejected, using defaults: {err}");
        SyncConfig::default()
    })
}
