//! Typed preference values and the parse/validate step at the cache and
//! remote boundaries.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValueFailureReason;
use crate::keys::ValueKind;

const FORBIDDEN_TEXT_CHARS: [char; 3] = [';', '{', '}'];

/// A validated preference value.
///
/// Equality follows the comparison policy used during reconciliation: flags
/// by equality, numbers as parsed numbers (so `Integer(120)` equals
/// `Decimal(120.0)`), text by string equality.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Flag(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl PartialEq for PrefValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Flag(a), Self::Flag(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl PrefValue {
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Decimal(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form written to the local cache.
    #[must_use]
    pub fn to_cache_string(&self) -> String {
        self.to_string()
    }

    /// JSON form sent to the update endpoint.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Flag(b) => Value::Bool(*b),
            Self::Integer(n) => Value::from(*n),
            Self::Decimal(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Check that the value has the right type and lies inside the kind's bounds.
    ///
    /// # Errors
    ///
    /// Returns the reason the value does not fit `kind`.
    pub fn validate(&self, kind: ValueKind) -> Result<(), ValueFailureReason> {
        match (kind, self) {
            (ValueKind::Flag, Self::Flag(_)) => Ok(()),
            (ValueKind::Flag, other) => Err(ValueFailureReason::NotFlag(other.to_string())),
            (ValueKind::Integer { min, max }, Self::Integer(n)) => {
                check_range(*n as f64, min as f64, max as f64)
            }
            (ValueKind::Integer { .. }, other) => {
                Err(ValueFailureReason::NotInteger(other.to_string()))
            }
            (ValueKind::Decimal { min, max }, value) => match value.as_f64() {
                Some(n) => check_range(n, min, max),
                None => Err(ValueFailureReason::NotNumber(value.to_string())),
            },
            (ValueKind::Text, Self::Text(s)) => check_text(s),
            (ValueKind::Text, other) => Err(ValueFailureReason::NotText(other.to_string())),
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl ValueKind {
    /// Parse a raw local cache string.
    ///
    /// Flags accept only `true` and `false`; coerced spellings such as `1` or
    /// `yes` are rejected.
    ///
    /// # Errors
    ///
    /// Returns the reason the string is not a valid value of this kind.
    pub fn parse_cached(self, raw: &str) -> Result<PrefValue, ValueFailureReason> {
        let trimmed = raw.trim();
        let value = match self {
            Self::Flag => match trimmed {
                "true" => PrefValue::Flag(true),
                "false" => PrefValue::Flag(false),
                _ => return Err(ValueFailureReason::NotFlag(raw.to_string())),
            },
            Self::Integer { .. } => PrefValue::Integer(
                parse_integer(trimmed).ok_or_else(|| ValueFailureReason::NotInteger(raw.into()))?,
            ),
            Self::Decimal { .. } => PrefValue::Decimal(
                parse_decimal(trimmed).ok_or_else(|| ValueFailureReason::NotNumber(raw.into()))?,
            ),
            Self::Text => PrefValue::Text(trimmed.to_string()),
        };
        value.validate(self)?;
        Ok(value)
    }

    /// Convert a JSON value received from the remote source.
    ///
    /// Numeric kinds also accept numeric strings; flags and text must arrive
    /// with their JSON type.
    ///
    /// # Errors
    ///
    /// Returns the reason the JSON value is not a valid value of this kind.
    pub fn from_json(self, raw: &Value) -> Result<PrefValue, ValueFailureReason> {
        let value = match (self, raw) {
            (Self::Flag, Value::Bool(b)) => PrefValue::Flag(*b),
            (Self::Flag, other) => return Err(ValueFailureReason::NotFlag(other.to_string())),
            (Self::Integer { .. }, Value::Number(n)) => PrefValue::Integer(
                n.as_i64()
                    .or_else(|| n.as_f64().and_then(whole_number))
                    .ok_or_else(|| ValueFailureReason::NotInteger(n.to_string()))?,
            ),
            (Self::Integer { .. }, Value::String(s)) => PrefValue::Integer(
                parse_integer(s.trim()).ok_or_else(|| ValueFailureReason::NotInteger(s.clone()))?,
            ),
            (Self::Integer { .. }, other) => {
                return Err(ValueFailureReason::NotInteger(other.to_string()));
            }
            (Self::Decimal { .. }, Value::Number(n)) => PrefValue::Decimal(
                n.as_f64()
                    .ok_or_else(|| ValueFailureReason::NotNumber(n.to_string()))?,
            ),
            (Self::Decimal { .. }, Value::String(s)) => PrefValue::Decimal(
                parse_decimal(s.trim()).ok_or_else(|| ValueFailureReason::NotNumber(s.clone()))?,
            ),
            (Self::Decimal { .. }, other) => {
                return Err(ValueFailureReason::NotNumber(other.to_string()));
            }
            (Self::Text, Value::String(s)) => PrefValue::Text(s.trim().to_string()),
            (Self::Text, other) => return Err(ValueFailureReason::NotText(other.to_string())),
        };
        value.validate(self)?;
        Ok(value)
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| parse_decimal(raw).and_then(whole_number))
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15).then_some(n as i64)
}

fn check_range(value: f64, min: f64, max: f64) -> Result<(), ValueFailureReason> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValueFailureReason::OutOfRange { value, min, max })
    }
}

fn check_text(text: &str) -> Result<(), ValueFailureReason> {
    if text.trim().is_empty() {
        return Err(ValueFailureReason::Empty);
    }
    match text.chars().find(|c| FORBIDDEN_TEXT_CHARS.contains(c)) {
        Some(c) => Err(ValueFailureReason::ForbiddenChar(c)),
        None => Ok(()),
    }
}
