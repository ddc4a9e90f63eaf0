//! Settings, paged envelopes, and wire models for AWX.

use converge_core::provider::{
    resolve_required, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use converge_core::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable prefix for settings fallbacks (`AWX_ENDPOINT`, …).
pub const ENV_PREFIX: &str = "AWX";

// ─── Settings ───────────────────────────────────────────────────────────────

/// Connection settings for an AWX controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwxSettings {
    /// Controller host, e.g. `awx.example.com`.
    pub endpoint: Option<String>,
    /// OAuth2 / personal access token sent as a bearer token.
    pub token: Option<String>,
    #[serde(default)]
    pub verify: bool,
    #[serde(default = "default_true")]
    pub silent_tls_warnings: bool,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Carried as configuration surface; no retry loop consumes it here.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for AwxSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            verify: false,
            silent_tls_warnings: true,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl AwxSettings {
    /// Fill missing values from `AWX_*` environment variables and fail
    /// fast if a required setting is still absent.
    pub fn resolve(self) -> Result<ResolvedAwxSettings, SettingsError> {
        Ok(ResolvedAwxSettings {
            endpoint: resolve_required(self.endpoint, ENV_PREFIX, "endpoint")?,
            token: resolve_required(self.token, ENV_PREFIX, "token")?,
            verify: self.verify,
            silent_tls_warnings: self.silent_tls_warnings,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}

/// Settings with every required value present.
#[derive(Debug, Clone)]
pub struct ResolvedAwxSettings {
    pub endpoint: String,
    pub token: String,
    pub verify: bool,
    pub silent_tls_warnings: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

// ─── Pagination ─────────────────────────────────────────────────────────────

/// Standard AWX list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: i64,
    /// Path of the next page (`/api/v2/...?page=2`), if any.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

// ─── Resources ──────────────────────────────────────────────────────────────

/// An inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organization: Option<i64>,
    /// Inventory variables as stored by the controller (YAML/JSON text).
    #[serde(default)]
    pub variables: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// An inventory group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwxGroup {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A host inside an inventory group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwxHost {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A job template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTemplate {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A stored credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A launched job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Terminal result of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    Successful,
    Failed,
}

impl JobOutcome {
    /// Map a controller status string to a terminal outcome, if it is one.
    pub fn from_status(status: &str) -> Option<Self> {
        match status.to_lowercase().as_str() {
            "successful" => Some(Self::Successful),
            "failed" | "error" | "canceled" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let s = AwxSettings::default();
        assert!(!s.verify);
        assert!(s.silent_tls_warnings);
        assert_eq!(s.timeout_secs, 10);
        assert_eq!(s.max_retries, 3);
    }

    #[test]
    fn test_settings_resolve_requires_token() {
        let s = AwxSettings {
            endpoint: Some("awx.example.com".into()),
            ..Default::default()
        };
        assert!(s.resolve().is_err());
    }

    #[test]
    fn test_page_parses_with_next_link() {
        let json = r#"{
            "count": 12,
            "next": "/api/v2/inventories/?page=2",
            "previous": null,
            "results": [{"id": 1, "name": "Foo Inventory"}]
        }"#;
        let page: Page<Inventory> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 12);
        assert_eq!(page.next.as_deref(), Some("/api/v2/inventories/?page=2"));
        assert_eq!(page.results[0].name, "Foo Inventory");
    }

    #[test]
    fn test_job_outcome_terminal_states() {
        assert_eq!(
            JobOutcome::from_status("Successful"),
            Some(JobOutcome::Successful)
        );
        assert_eq!(JobOutcome::from_status("failed"), Some(JobOutcome::Failed));
        assert_eq!(JobOutcome::from_status("error"), Some(JobOutcome::Failed));
        assert_eq!(
            JobOutcome::from_status("canceled"),
            Some(JobOutcome::Failed)
        );
        assert_eq!(JobOutcome::from_status("pending"), None);
        assert_eq!(JobOutcome::from_status("running"), None);
    }
}
