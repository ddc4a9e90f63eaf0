//! Connection settings resolution.
//!
//! Each vendor crate carries its own settings struct (host, credentials,
//! TLS flags, timeout). The resolution rules are shared: an explicitly
//! supplied value wins, otherwise the vendor's environment variable
//! (`PREFIX_KEY`, uppercased) is consulted, otherwise the default applies.
//! Required settings with no value fail here, before any network call.

use log::warn;
use thiserror::Error;

/// Default request timeout applied by every vendor client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default retry budget carried in settings. No retry loop consumes it in
/// this layer; callers own retry policy.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings resolution failure, raised before any session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("option '{0}' is required")]
    Missing(&'static str),
    #[error("invalid value for option '{0}': {1}")]
    Invalid(&'static str, String),
}

/// Look up `PREFIX_KEY` (uppercased) in the environment.
///
/// Empty values are treated as unset.
pub fn env_fallback(prefix: &str, key: &str) -> Option<String> {
    let var = format!("{}_{}", prefix, key).to_uppercase();
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Resolve a required setting: explicit value, then environment fallback.
pub fn resolve_required(
    explicit: Option<String>,
    prefix: &str,
    key: &'static str,
) -> Result<String, SettingsError> {
    explicit
        .filter(|v| !v.is_empty())
        .or_else(|| env_fallback(prefix, key))
        .ok_or(SettingsError::Missing(key))
}

/// Resolve an optional setting the same way, without failing.
pub fn resolve_optional(explicit: Option<String>, prefix: &str, key: &str) -> Option<String> {
    explicit
        .filter(|v| !v.is_empty())
        .or_else(|| env_fallback(prefix, key))
}

/// Emit the insecure-TLS warning unless it has been silenced.
pub fn warn_insecure(vendor: &str, verify: bool, silent: bool) {
    if !verify && !silent {
        warn!("{}: TLS certificate verification is disabled", vendor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_value_wins() {
        std::env::set_var("CVGTEST_A_HOST", "from-env");
        let v = resolve_required(Some("explicit".into()), "cvgtest_a", "host").unwrap();
        assert_eq!(v, "explicit");
        std::env::remove_var("CVGTEST_A_HOST");
    }

    #[test]
    fn test_env_fallback_applies() {
        std::env::set_var("CVGTEST_B_HOST", "gateway.example.com");
        let v = resolve_required(None, "cvgtest_b", "host").unwrap();
        assert_eq!(v, "gateway.example.com");
        std::env::remove_var("CVGTEST_B_HOST");
    }

    #[test]
    fn test_missing_required_fails() {
        let err = resolve_required(None, "cvgtest_c", "token").unwrap_err();
        assert_eq!(err, SettingsError::Missing("token"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        std::env::set_var("CVGTEST_D_HOST", "");
        assert!(env_fallback("cvgtest_d", "host").is_none());
        let err = resolve_required(Some(String::new()), "cvgtest_d", "host").unwrap_err();
        assert_eq!(err, SettingsError::Missing("host"));
        std::env::remove_var("CVGTEST_D_HOST");
    }

    #[test]
    fn test_resolve_optional() {
        assert_eq!(
            resolve_optional(Some("x".into()), "cvgtest_e", "org"),
            Some("x".into())
        );
        assert_eq!(resolve_optional(None, "cvgtest_e", "org"), None);
    }
}
