//! Guacamole error types.

use converge_core::SettingsError;
use std::fmt;

/// Unified error type for all Guacamole operations.
#[derive(Debug)]
pub enum GuacError {
    /// Login rejected by the gateway
    AuthenticationFailed(String),
    /// Missing or invalid connection settings
    Settings(SettingsError),
    /// A referenced user does not exist
    UserNotFound(String),
    /// A path's parent connection group does not exist
    ParentGroupNotFound(String),
    /// Unexpected status from a data API call
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },
    /// Network / HTTP transport error
    NetworkError(String),
    /// JSON parse error
    ParseError(String),
    /// Invalid parameter
    InvalidParameter(String),
}

impl fmt::Display for GuacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed(msg) => {
                write!(f, "Unable to login to guacamole: {}", msg)
            }
            Self::Settings(err) => write!(f, "Settings error: {}", err),
            Self::UserNotFound(name) => write!(f, "Unable to find username: {}", name),
            Self::ParentGroupNotFound(path) => {
                write!(f, "Unable to find parent group: {}", path)
            }
            Self::Api {
                operation,
                status,
                message,
            } => write!(f, "{} failed with HTTP {}: {}", operation, status, message),
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for GuacError {}

impl From<SettingsError> for GuacError {
    fn from(e: SettingsError) -> Self {
        GuacError::Settings(e)
    }
}

impl From<reqwest::Error> for GuacError {
    fn from(e: reqwest::Error) -> Self {
        GuacError::NetworkError(e.to_string())
    }
}

impl From<serde_json::Error> for GuacError {
    fn from(e: serde_json::Error) -> Self {
        GuacError::ParseError(e.to_string())
    }
}

/// Convenience Result alias.
pub type GuacResult<T> = Result<T, GuacError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_carries_operation_and_status() {
        let err = GuacError::Api {
            operation: "create_user",
            status: 403,
            message: "permission denied".into(),
        };
        let text = err.to_string();
        assert!(text.contains("create_user"));
        assert!(text.contains("403"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn test_settings_error_converts() {
        let err: GuacError = SettingsError::Missing("host").into();
        assert!(err.to_string().contains("host"));
    }
}
