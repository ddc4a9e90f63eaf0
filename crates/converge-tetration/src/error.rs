//! Error types for the web-UI session client.

use converge_core::SettingsError;
use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetErrorKind {
    /// Network / transport failure
    Network,
    /// Missing or invalid settings
    Settings,
    /// Sign-in rejected
    AuthenticationFailed,
    /// Session cookie no longer accepted (401)
    SessionExpired,
    /// CSRF token missing from a page or rejected by the backend (422)
    Csrf,
    /// Resource not found (404)
    NotFound,
    /// Other HTTP / API error
    Api,
    /// Response body could not be parsed
    Parse,
}

/// Crate error carrying a kind, a message, and the HTTP status if one was
/// involved.
#[derive(Debug, Clone)]
pub struct TetError {
    pub kind: TetErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl TetError {
    pub fn new(kind: TetErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            status: None,
        }
    }

    pub fn with_status(kind: TetErrorKind, status: u16, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            status: Some(status),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(TetErrorKind::Network, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(TetErrorKind::AuthenticationFailed, msg)
    }

    pub fn csrf(msg: impl Into<String>) -> Self {
        Self::new(TetErrorKind::Csrf, msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(TetErrorKind::Parse, msg)
    }
}

impl fmt::Display for TetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{:?}] HTTP {}: {}", self.kind, status, self.message),
            None => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for TetError {}

impl From<SettingsError> for TetError {
    fn from(e: SettingsError) -> Self {
        Self::new(TetErrorKind::Settings, e.to_string())
    }
}

impl From<reqwest::Error> for TetError {
    fn from(e: reqwest::Error) -> Self {
        Self::network(e.to_string())
    }
}

impl From<serde_json::Error> for TetError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(e.to_string())
    }
}

/// Convenience alias.
pub type TetResult<T> = Result<T, TetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_shows_in_display() {
        let err = TetError::with_status(TetErrorKind::Api, 500, "boom");
        assert!(err.to_string().contains("500"));
        assert_eq!(err.kind, TetErrorKind::Api);
    }

    #[test]
    fn test_kind_equality() {
        assert_eq!(TetError::csrf("x").kind, TetErrorKind::Csrf);
        assert_ne!(TetError::csrf("x").kind, TetErrorKind::Network);
    }
}
