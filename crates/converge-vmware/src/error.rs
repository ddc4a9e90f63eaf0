//! Error types for the vCenter tagging crate.

use converge_core::SettingsError;
use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmwareErrorKind {
    /// REST API unreachable or session could not be built
    ConnectionError,
    /// Authentication failed (401)
    AuthenticationError,
    /// Missing or invalid settings
    SettingsError,
    /// Resource not found (404)
    NotFound,
    /// A name lookup matched more than one object
    AmbiguousMatch,
    /// HTTP / API error with status code
    ApiError(u16),
    /// Permission denied (403)
    AccessDenied,
    /// Timeout
    Timeout,
    /// JSON parse / deserialization error
    ParseError,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone)]
pub struct VmwareError {
    pub kind: VmwareErrorKind,
    pub message: String,
}

impl VmwareError {
    pub fn new(kind: VmwareErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::NotFound, msg)
    }

    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::AmbiguousMatch, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(VmwareErrorKind::Timeout, msg)
    }
}

impl fmt::Display for VmwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for VmwareError {}

impl From<SettingsError> for VmwareError {
    fn from(e: SettingsError) -> Self {
        Self::new(VmwareErrorKind::SettingsError, e.to_string())
    }
}

impl From<reqwest::Error> for VmwareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(VmwareErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for VmwareError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

/// Convenience alias.
pub type VmwareResult<T> = Result<T, VmwareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status() {
        let err = VmwareError::api(503, "unavailable");
        assert_eq!(err.kind, VmwareErrorKind::ApiError(503));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_settings_error_converts() {
        let err: VmwareError = SettingsError::Missing("host").into();
        assert_eq!(err.kind, VmwareErrorKind::SettingsError);
    }
}
