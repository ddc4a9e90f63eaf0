//! Settings and wire models for the web-UI backend.

use converge_core::provider::{resolve_required, DEFAULT_TIMEOUT_SECS};
use converge_core::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable prefix for settings fallbacks (`TETRATION_SITE`, …).
pub const ENV_PREFIX: &str = "TETRATION";

// ─── Settings ───────────────────────────────────────────────────────────────

/// Connection settings for the web-UI backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TetSettings {
    /// Site host, e.g. `tetration.example.com`.
    pub site: Option<String>,
    /// Sign-in email.
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub verify: bool,
    #[serde(default = "default_true")]
    pub silent_tls_warnings: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for TetSettings {
    fn default() -> Self {
        Self {
            site: None,
            email: None,
            password: None,
            verify: false,
            silent_tls_warnings: true,
            timeout_secs: default_timeout(),
        }
    }
}

impl TetSettings {
    /// Fill missing values from `TETRATION_*` environment variables and
    /// fail fast if a required setting is still absent.
    pub fn resolve(self) -> Result<ResolvedTetSettings, SettingsError> {
        Ok(ResolvedTetSettings {
            site: resolve_required(self.site, ENV_PREFIX, "site")?,
            email: resolve_required(self.email, ENV_PREFIX, "email")?,
            password: resolve_required(self.password, ENV_PREFIX, "password")?,
            verify: self.verify,
            silent_tls_warnings: self.silent_tls_warnings,
            timeout_secs: self.timeout_secs,
        })
    }
}

/// Settings with every required value present.
#[derive(Debug, Clone)]
pub struct ResolvedTetSettings {
    pub site: String,
    pub email: String,
    pub password: String,
    pub verify: bool,
    pub silent_tls_warnings: bool,
    pub timeout_secs: u64,
}

// ─── Wire models ────────────────────────────────────────────────────────────

/// Workspace scope preferences of the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub root_app_scope: Option<serde_json::Value>,
    #[serde(default)]
    pub app_scope: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// `GET /current_user.json?concise=true` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: serde_json::Value,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Envelope returned by the preference update endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesEnvelope {
    #[serde(default)]
    pub preferences: Preferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_resolve_requires_site() {
        let s = TetSettings {
            email: Some("ops@example.com".into()),
            password: Some("secret".into()),
            ..Default::default()
        };
        assert!(s.resolve().is_err());
    }

    #[test]
    fn test_current_user_parses() {
        let json = r#"{
            "id": 7,
            "email": "ops@example.com",
            "preferences": {
                "root_app_scope": {"id": "scope-root"},
                "app_scope": {"id": "scope-7"}
            }
        }"#;
        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, serde_json::json!(7));
        assert!(user.preferences.app_scope.is_some());
    }
}
