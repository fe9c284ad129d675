//! Validated preferences and the key/value sets the synchronizer diffs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ValueFailure;
use crate::keys::PreferenceKey;
use crate::value::PrefValue;

/// A key paired with a value that has passed validation for that key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preference {
    key: PreferenceKey,
    value: PrefValue,
}

impl Preference {
    /// # Errors
    ///
    /// Returns a [`ValueFailure`] if `value` does not fit the key's kind or bounds.
    pub fn new(key: PreferenceKey, value: PrefValue) -> Result<Self, ValueFailure> {
        value
            .validate(key.kind())
            .map_err(|reason| ValueFailure::new(key.name(), reason))?;
        Ok(Self { key, value })
    }

    #[must_use]
    pub fn default_for(key: PreferenceKey) -> Self {
        Self {
            key,
            value: key.default_value(),
        }
    }

    #[must_use]
    pub const fn key(&self) -> PreferenceKey {
        self.key
    }

    #[must_use]
    pub const fn value(&self) -> &PrefValue {
        &self.value
    }
}

/// Mapping from key to validated value. Keys are unique; order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    values: BTreeMap<PreferenceKey, PrefValue>,
}

impl PreferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recognized key at its documented default.
    #[must_use]
    pub fn defaults() -> Self {
        PreferenceKey::ALL
            .into_iter()
            .map(Preference::default_for)
            .collect()
    }

    /// Insert a preference, returning the value it replaced.
    pub fn insert(&mut self, preference: Preference) -> Option<PrefValue> {
        self.values.insert(preference.key, preference.value)
    }

    #[must_use]
    pub fn get(&self, key: PreferenceKey) -> Option<&PrefValue> {
        self.values.get(&key)
    }

    #[must_use]
    pub fn preference(&self, key: PreferenceKey) -> Option<Preference> {
        self.values.get(&key).map(|value| Preference {
            key,
            value: value.clone(),
        })
    }

    #[must_use]
    pub fn contains(&self, key: PreferenceKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Flag value for `key`, `false` when absent or not a flag.
    #[must_use]
    pub fn flag(&self, key: PreferenceKey) -> bool {
        self.get(key).and_then(PrefValue::as_flag).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = Preference> + '_ {
        self.values.iter().map(|(key, value)| Preference {
            key: *key,
            value: value.clone(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = PreferenceKey> + '_ {
        self.values.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<Preference> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = Preference>>(iter: I) -> Self {
        let mut set = Self::new();
        for preference in iter {
            set.insert(preference);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueFailureReason;

    #[test]
    fn new_rejects_values_of_the_wrong_kind() {
        let err = Preference::new(PreferenceKey::DarkMode, PrefValue::Integer(1)).unwrap_err();
        assert_eq!(err.key, "dark_mode");
        assert!(matches!(err.reason, ValueFailureReason::NotFlag(_)));

        let err = Preference::new(PreferenceKey::FontSize, PrefValue::Integer(900)).unwrap_err();
        assert!(matches!(err.reason, ValueFailureReason::OutOfRange { .. }));
    }

    #[test]
    fn defaults_cover_every_key() {
        let defaults = PreferenceSet::defaults();
        assert_eq!(defaults.len(), PreferenceKey::ALL.len());
        assert_eq!(
            defaults.get(PreferenceKey::LineSpacing),
            Some(&PrefValue::Decimal(1.5))
        );
        assert!(!defaults.flag(PreferenceKey::DarkMode));
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut set = PreferenceSet::defaults();
        let previous = set.insert(
            Preference::new(PreferenceKey::DarkMode, PrefValue::Flag(true)).unwrap(),
        );
        assert_eq!(previous, Some(PrefValue::Flag(false)));
        assert!(set.flag(PreferenceKey::DarkMode));
    }

    #[test]
    fn serializes_as_flat_map() {
        let set: PreferenceSet = [
            Preference::new(PreferenceKey::DarkMode, PrefValue::Flag(true)).unwrap(),
            Preference::new(PreferenceKey::FontSize, PrefValue::Integer(120)).unwrap(),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!({"dark_mode": true, "font_size": 120}));
    }
}
