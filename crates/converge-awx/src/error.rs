//! AWX error types.

use converge_core::SettingsError;
use thiserror::Error;

/// Unified error type for all AWX operations.
#[derive(Debug, Error)]
pub enum AwxError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("timed out after {timeout_secs}s waiting for job {job_id}")]
    JobTimeout { job_id: i64, timeout_secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl AwxError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<reqwest::Error> for AwxError {
    fn from(e: reqwest::Error) -> Self {
        AwxError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AwxError {
    fn from(e: serde_json::Error) -> Self {
        AwxError::Parse(e.to_string())
    }
}

/// Convenience Result alias.
pub type AwxResult<T> = Result<T, AwxError>;
