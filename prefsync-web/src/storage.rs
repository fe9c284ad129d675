//! `localStorage`-backed local cache.

use log::warn;
use prefsync_core::{CacheError, LocalCache};
use web_sys::Storage;

use crate::dom;

/// Local cache over browser `localStorage`.
///
/// When storage is blocked (private mode, sandboxed frames) reads come back
/// empty and writes fail with [`CacheError::Unavailable`], so the page still
/// loads on defaults.
#[derive(Debug, Clone)]
pub struct BrowserCache {
    storage: Option<Storage>,
}

impl BrowserCache {
    #[must_use]
    pub fn open() -> Self {
        let storage = match dom::local_storage() {
            Ok(storage) => Some(storage),
            Err(err) => {
                warn!(
                    "localStorage unavailable, using defaults: {}",
                    dom::js_error_message(&err)
                );
                None
            }
        };
        Self { storage }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

impl LocalCache for BrowserCache {
    fn get(&self, key: &str) -> Option<String> {
        self.storage
            .as_ref()
            .and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let Some(storage) = self.storage.as_ref() else {
            return Err(CacheError::Unavailable("localStorage".to_string()));
        };
        storage
            .set_item(key, value)
            .map_err(|err| CacheError::Write {
                key: key.to_string(),
                reason: dom::js_error_message(&err),
            })
    }
}
