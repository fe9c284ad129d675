use thiserror::Error;

/// Why a single preference value was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueFailureReason {
    #[error("expected a boolean, got {0}")]
    NotFlag(String),
    #[error("expected an integer, got {0}")]
    NotInteger(String),
    #[error("expected a number, got {0}")]
    NotNumber(String),
    #[error("expected a string, got {0}")]
    NotText(String),
    #[error("{value} is outside {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("text is empty")]
    Empty,
    #[error("text contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// A value failure scoped to one key; never blocks the other keys.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid value for `{key}`: {reason}")]
pub struct ValueFailure {
    pub key: String,
    pub reason: ValueFailureReason,
}

impl ValueFailure {
    pub fn new(key: impl Into<String>, reason: ValueFailureReason) -> Self {
        Self {
            key: key.into(),
            reason,
        }
    }
}

/// Local cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("local cache unavailable: {0}")]
    Unavailable(String),
    #[error("writing `{key}` to the local cache failed: {reason}")]
    Write { key: String, reason: String },
}

/// Failures raised while talking to the remote source or writing its values back.
///
/// None of these are fatal: the synchronizer logs them and keeps whatever
/// presentation state it already applied.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("request could not complete: {0}")]
    Transport(String),
    #[error("response was not well-formed: {0}")]
    Parse(String),
    #[error("server rejected the request{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected { message: Option<String> },
    #[error(transparent)]
    Value(#[from] ValueFailure),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl SyncError {
    /// Short label used in diagnostics and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Rejected { .. } => "rejected",
            Self::Value(_) => "value",
            Self::Cache(_) => "cache",
        }
    }
}

/// Errors raised when a [`SyncConfig`](crate::config::SyncConfig) is malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("endpoint `{0}` is empty")]
    EmptyEndpoint(&'static str),
    #[error("help key is empty")]
    EmptyHelpKey,
    #[error("shortcut key {0:?} is not an ASCII letter")]
    InvalidChordKey(char),
    #[error("shortcut key {0:?} is bound more than once")]
    DuplicateChord(char),
    #[error("shortcut `{key}` path `{path}` must start with '/'")]
    RelativePath { key: char, path: String },
}
