//! The remote settings endpoint: transport seam and payload parsing.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SyncError, ValueFailure};
use crate::keys::{PreferenceKey, ValueKind};
use crate::preference::{Preference, PreferenceSet};

/// Transport to the authoritative settings store.
///
/// Implementations return the raw response body; parsing stays in this crate
/// so every host applies the same validation.
#[async_trait(?Send)]
pub trait RemoteSource {
    /// `GET` the retrieval endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the request could not complete.
    async fn fetch_settings(&self) -> Result<String, SyncError>;

    /// `POST` a JSON body to the update endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Transport`] if the request could not complete.
    async fn send_update(&self, body: String) -> Result<String, SyncError>;
}

#[derive(Debug, Deserialize)]
struct SettingsEnvelope {
    success: bool,
    #[serde(default)]
    settings: Option<Map<String, Value>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateReply {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Body of a single-setting update request.
#[derive(Debug, Serialize)]
pub struct UpdateBody<'a> {
    pub setting: &'a str,
    pub value: Value,
}

impl<'a> UpdateBody<'a> {
    #[must_use]
    pub fn for_preference(preference: &'a Preference) -> Self {
        Self {
            setting: preference.key().name(),
            value: preference.value().to_json(),
        }
    }
}

/// Validated remote settings plus whatever had to be dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSettings {
    pub prefs: PreferenceSet,
    /// Keys whose values failed validation; skipped without blocking the rest.
    pub skipped: Vec<ValueFailure>,
    /// Names the synchronizer does not recognize.
    pub ignored: Vec<String>,
}

/// Tagged result of the single remote fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(RemoteSettings),
    Failure(SyncError),
}

/// Parse the retrieval endpoint's `{ success, settings }` envelope.
///
/// # Errors
///
/// Returns [`SyncError::Parse`] for malformed bodies and
/// [`SyncError::Rejected`] when the server reports `success: false`.
pub fn parse_settings_response(body: &str) -> Result<RemoteSettings, SyncError> {
    let envelope: SettingsEnvelope = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(SyncError::Rejected {
            message: envelope.message,
        });
    }
    let settings = envelope
        .settings
        .ok_or_else(|| SyncError::Parse("missing `settings` object".to_string()))?;
    Ok(resolve_settings(&settings))
}

/// Parse the update endpoint's `{ success, message? }` reply.
///
/// # Errors
///
/// Returns [`SyncError::Parse`] or [`SyncError::Rejected`].
pub fn parse_update_reply(body: &str) -> Result<(), SyncError> {
    let reply: UpdateReply = serde_json::from_str(body)?;
    if reply.success {
        Ok(())
    } else {
        Err(SyncError::Rejected {
            message: reply.message,
        })
    }
}

fn resolve_settings(settings: &Map<String, Value>) -> RemoteSettings {
    let mut resolved = RemoteSettings::default();
    for key in PreferenceKey::ALL {
        let kind = key.kind();
        let mut chosen = None;
        let mut failures = Vec::new();
        for name in key.storage_names() {
            let Some(raw) = settings.get(name) else {
                continue;
            };
            match kind.from_json(raw) {
                Ok(value) if kind == ValueKind::Flag => {
                    if value.as_flag() == Some(true) || chosen.is_none() {
                        chosen = Some(value);
                    }
                }
                Ok(value) => {
                    chosen.get_or_insert(value);
                }
                Err(reason) => failures.push(ValueFailure::new(name, reason)),
            }
        }
        // A key is only skipped when none of its names carried a valid value.
        match chosen.map(|value| Preference::new(key, value)) {
            Some(Ok(preference)) => {
                resolved.prefs.insert(preference);
            }
            Some(Err(failure)) => resolved.skipped.push(failure),
            None => resolved.skipped.extend(failures),
        }
    }
    resolved.ignored = settings
        .keys()
        .filter(|name| PreferenceKey::from_name(name).is_none())
        .cloned()
        .collect();
    if !resolved.ignored.is_empty() {
        debug!("ignoring unrecognized remote settings: {:?}", resolved.ignored);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PrefValue;

    #[test]
    fn parses_successful_envelope() {
        let parsed = parse_settings_response(
            r#"{"success": true, "settings": {"dark_mode": true, "font_size": 120}}"#,
        )
        .unwrap();
        assert_eq!(parsed.prefs.len(), 2);
        assert!(parsed.prefs.flag(PreferenceKey::DarkMode));
        assert_eq!(
            parsed.prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(120))
        );
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn unsuccessful_envelope_is_rejected() {
        let err =
            parse_settings_response(r#"{"success": false, "message": "Not logged in"}"#).unwrap_err();
        assert_eq!(
            err,
            SyncError::Rejected {
                message: Some("Not logged in".into())
            }
        );
    }

    #[test]
    fn malformed_bodies_are_parse_failures() {
        assert_eq!(parse_settings_response("<html>").unwrap_err().kind(), "parse");
        assert_eq!(
            parse_settings_response(r#"{"success": true}"#).unwrap_err().kind(),
            "parse"
        );
        assert_eq!(
            parse_settings_response(r#"{"settings": {}}"#).unwrap_err().kind(),
            "parse"
        );
    }

    #[test]
    fn bad_values_are_skipped_per_key() {
        let parsed = parse_settings_response(
            r#"{"success": true, "settings": {"dark_mode": "yes", "high_contrast": true, "font_size": 5}}"#,
        )
        .unwrap();
        assert!(!parsed.prefs.contains(PreferenceKey::DarkMode));
        assert!(!parsed.prefs.contains(PreferenceKey::FontSize));
        assert!(parsed.prefs.flag(PreferenceKey::HighContrast));
        let skipped: Vec<_> = parsed.skipped.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(skipped, vec!["dark_mode", "font_size"]);
    }

    #[test]
    fn remote_aliases_resolve_like_local_ones() {
        let parsed = parse_settings_response(
            r#"{"success": true, "settings": {"reduced_motion": false, "reduce_animations": true, "text_size": 140}}"#,
        )
        .unwrap();
        assert!(parsed.prefs.flag(PreferenceKey::ReducedMotion));
        assert_eq!(
            parsed.prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(140))
        );
    }

    #[test]
    fn valid_alias_clears_failure_on_canonical_name() {
        let parsed = parse_settings_response(
            r#"{"success": true, "settings": {"font_size": "huge", "text_size": 140}}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.prefs.get(PreferenceKey::FontSize),
            Some(&PrefValue::Integer(140))
        );
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn every_invalid_name_is_reported_when_none_resolve() {
        let parsed = parse_settings_response(
            r#"{"success": true, "settings": {"font_size": "huge", "text_size": 9000}}"#,
        )
        .unwrap();
        assert!(!parsed.prefs.contains(PreferenceKey::FontSize));
        let skipped: Vec<_> = parsed.skipped.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(skipped, vec!["font_size", "text_size"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let parsed =
            parse_settings_response(r#"{"success": true, "settings": {"theme": "blue"}}"#).unwrap();
        assert!(parsed.prefs.is_empty());
        assert_eq!(parsed.ignored, vec!["theme".to_string()]);
    }

    #[test]
    fn update_body_uses_canonical_name() {
        let pref = Preference::new(PreferenceKey::FontSize, PrefValue::Integer(110)).unwrap();
        let body = serde_json::to_value(UpdateBody::for_preference(&pref)).unwrap();
        assert_eq!(body, serde_json::json!({"setting": "font_size", "value": 110}));
        assert!(parse_update_reply(r#"{"success": true}"#).is_ok());
        assert!(parse_update_reply(r#"{"success": false}"#).is_err());
    }
}
