//! Error types for session construction and guardfile evaluation.

use thiserror::Error;

/// Errors from session operations.
///
/// Missing options and unmatched scope names are not errors; they resolve to
/// defaults. Only input that cannot be normalized at all is rejected.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Guardfile evaluation failed: {reason}")]
    Evaluation { reason: String },

    #[error("Failed to load settings: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SessionError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SessionError::InvalidOption {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(e: toml::de::Error) -> Self {
        SessionError::Evaluation {
            reason: e.to_string(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
