//! The page-lifetime settings context shared by the synchronizer and the
//! shortcut dispatcher.

use log::{debug, warn};

use crate::effects::Presentation;
use crate::error::{CacheError, ValueFailure};
use crate::keys::{PreferenceKey, ValueKind};
use crate::preference::{Preference, PreferenceSet};
use crate::value::PrefValue;

/// Synchronous string key-value store that survives page loads.
pub trait LocalCache {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`CacheError`] if the underlying store refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

impl<C: LocalCache + ?Sized> LocalCache for &C {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value)
    }
}

impl<C: LocalCache + ?Sized> LocalCache for std::rc::Rc<C> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        (**self).set(key, value)
    }
}

/// Result of reading every recognized key from the cache.
#[derive(Debug, Clone, Default)]
pub struct LocalRead {
    pub prefs: PreferenceSet,
    /// Cached strings that failed validation and fell back to the default.
    pub rejected: Vec<ValueFailure>,
}

/// Cache and presentation for one page lifetime: built at page load,
/// dropped at navigation.
#[derive(Debug, Clone)]
pub struct SettingsStore<C, P> {
    cache: C,
    presentation: P,
}

impl<C, P> SettingsStore<C, P>
where
    C: LocalCache,
    P: Presentation,
{
    pub const fn new(cache: C, presentation: P) -> Self {
        Self {
            cache,
            presentation,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    #[must_use]
    pub const fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Read every recognized key, resolving aliases and substituting defaults.
    #[must_use]
    pub fn read_local(&self) -> LocalRead {
        let mut read = LocalRead::default();
        for key in PreferenceKey::ALL {
            let value = self.read_key(key, &mut read.rejected);
            read.prefs.insert(
                Preference::new(key, value).unwrap_or_else(|_| Preference::default_for(key)),
            );
        }
        for failure in &read.rejected {
            warn!("ignoring cached preference: {failure}");
        }
        read
    }

    /// Current cached value of a flag preference; `false` if unset or invalid.
    #[must_use]
    pub fn flag(&self, key: PreferenceKey) -> bool {
        let mut ignored = Vec::new();
        self.read_key(key, &mut ignored).as_flag().unwrap_or(false)
    }

    pub fn apply(&self, preference: &Preference) {
        debug!("applying {} = {}", preference.key(), preference.value());
        preference.apply(&self.presentation);
    }

    /// Write a preference under its canonical name and under every alias
    /// already present in the cache, so a stale alias entry cannot override
    /// it on the next load.
    ///
    /// # Errors
    ///
    /// Returns the first [`CacheError`] hit; remaining names are still attempted.
    pub fn persist(&self, preference: &Preference) -> Result<(), CacheError> {
        let raw = preference.value().to_cache_string();
        let mut first_err = None;
        for name in preference.key().storage_names() {
            let write = if name == preference.key().name() || self.cache.get(name).is_some() {
                self.cache.set(name, &raw)
            } else {
                Ok(())
            };
            if let Err(err) = write {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn read_key(&self, key: PreferenceKey, rejected: &mut Vec<ValueFailure>) -> PrefValue {
        let kind = key.kind();
        let mut found: Option<PrefValue> = None;
        let mut failures = Vec::new();
        for name in key.storage_names() {
            let Some(raw) = self.cache.get(name) else {
                continue;
            };
            match kind.parse_cached(&raw) {
                Ok(value) => {
                    if kind == ValueKind::Flag {
                        // Either alias set to true activates the preference.
                        if value.as_flag() == Some(true) {
                            return value;
                        }
                        found.get_or_insert(value);
                    } else if found.is_none() {
                        found = Some(value);
                    }
                }
                Err(reason) => failures.push(ValueFailure::new(name, reason)),
            }
        }
        found.unwrap_or_else(|| {
            rejected.extend(failures);
            key.default_value()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCache, RecordingPresentation};

    fn store_with(entries: &[(&str, &str)]) -> SettingsStore<MemoryCache, RecordingPresentation> {
        SettingsStore::new(
            MemoryCache::with_entries(entries.iter().copied()),
            RecordingPresentation::default(),
        )
    }

    #[test]
    fn empty_cache_reads_defaults() {
        let store = store_with(&[]);
        let read = store.read_local();
        assert_eq!(read.prefs, PreferenceSet::defaults());
        assert!(read.rejected.is_empty());
    }

    #[test]
    fn alias_true_wins_over_canonical_false() {
        let store = store_with(&[("reduced_motion", "false"), ("reduce_animations", "true")]);
        assert!(store.read_local().prefs.flag(PreferenceKey::ReducedMotion));
    }

    #[test]
    fn canonical_font_size_wins_over_alias() {
        let store = store_with(&[("font_size", "130"), ("text_size", "90")]);
        assert_eq!(
            store.read_local().prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(130))
        );

        let store = store_with(&[("font_size", "huge"), ("text_size", "90")]);
        let read = store.read_local();
        assert_eq!(
            read.prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(90))
        );
        assert!(read.rejected.is_empty());

        let store = store_with(&[("font_size", "huge"), ("text_size", "tiny")]);
        let read = store.read_local();
        assert_eq!(
            read.prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(100))
        );
        let rejected: Vec<_> = read.rejected.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(rejected, vec!["font_size", "text_size"]);
    }

    #[test]
    fn coerced_flags_fall_back_to_default() {
        let store = store_with(&[("dark_mode", "1")]);
        let read = store.read_local();
        assert!(!read.prefs.flag(PreferenceKey::DarkMode));
        assert_eq!(read.rejected[0].key, "dark_mode");
    }

    #[test]
    fn persist_rewrites_existing_aliases_only() {
        let store = store_with(&[("reduce_animations", "true")]);
        let pref = Preference::new(PreferenceKey::ReducedMotion, PrefValue::Flag(false)).unwrap();
        store.persist(&pref).unwrap();
        assert_eq!(store.cache().get("reduced_motion").as_deref(), Some("false"));
        assert_eq!(
            store.cache().get("reduce_animations").as_deref(),
            Some("false")
        );
        assert!(!store.flag(PreferenceKey::ReducedMotion));

        let size = Preference::new(PreferenceKey::FontSize, PrefValue::Integer(110)).unwrap();
        store.persist(&size).unwrap();
        assert_eq!(store.cache().get("text_size"), None);
    }

    #[test]
    fn persist_reports_write_failures() {
        let store = store_with(&[]);
        store.cache().fail_writes(true);
        let pref = Preference::new(PreferenceKey::DarkMode, PrefValue::Flag(true)).unwrap();
        assert!(matches!(
            store.persist(&pref),
            Err(CacheError::Write { .. })
        ));
    }
}
