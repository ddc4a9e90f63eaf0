//! Settings and wire models for the vCenter CIS tagging API.

use converge_core::provider::{
    resolve_required, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use converge_core::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable prefix for settings fallbacks (`VMWARE_HOST`, …).
pub const ENV_PREFIX: &str = "VMWARE";

// ─── Settings ───────────────────────────────────────────────────────────────

/// Connection settings for a vCenter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmwareSettings {
    /// vCenter host, e.g. `vcenter.example.com`.
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
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

impl Default for VmwareSettings {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            verify: false,
            silent_tls_warnings: true,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl VmwareSettings {
    /// Fill missing values from `VMWARE_*` environment variables and fail
    /// fast if a required setting is still absent.
    pub fn resolve(self) -> Result<ResolvedVmwareSettings, SettingsError> {
        Ok(ResolvedVmwareSettings {
            host: resolve_required(self.host, ENV_PREFIX, "host")?,
            username: resolve_required(self.username, ENV_PREFIX, "username")?,
            password: resolve_required(self.password, ENV_PREFIX, "password")?,
            verify: self.verify,
            silent_tls_warnings: self.silent_tls_warnings,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}

/// Settings with every required value present.
#[derive(Debug, Clone)]
pub struct ResolvedVmwareSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub verify: bool,
    pub silent_tls_warnings: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

// ─── Wire envelopes ─────────────────────────────────────────────────────────

/// The CIS API wraps every payload in `{"value": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CisValue<T> {
    pub value: T,
}

/// Error body of a CIS 400 response.
#[derive(Debug, Clone, Deserialize)]
pub struct CisErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl CisErrorBody {
    /// Whether the error means the object already exists.
    pub fn is_already_exists(&self) -> bool {
        self.error_type.contains("already_exists")
    }
}

// ─── Tagging models ─────────────────────────────────────────────────────────

/// A tag category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cardinality: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A tag inside a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Virtual machine summary from `vcenter/vm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmSummary {
    /// VM identifier, e.g. `vm-42`.
    pub vm: String,
    pub name: String,
    #[serde(default)]
    pub power_state: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_resolve_requires_credentials() {
        let s = VmwareSettings {
            host: Some("vcenter.example.com".into()),
            ..Default::default()
        };
        assert!(s.resolve().is_err());
    }

    #[test]
    fn test_cis_value_unwraps() {
        let json = r#"{"value": ["urn:vmomi:cat-1", "urn:vmomi:cat-2"]}"#;
        let ids: CisValue<Vec<String>> = serde_json::from_str(json).unwrap();
        assert_eq!(ids.value.len(), 2);
    }

    #[test]
    fn test_already_exists_detection() {
        let json = r#"{"type": "com.vmware.vapi.std.errors.already_exists", "messages": []}"#;
        let body: CisErrorBody = serde_json::from_str(json).unwrap();
        assert!(body.is_already_exists());

        let other: CisErrorBody =
            serde_json::from_str(r#"{"type": "com.vmware.vapi.std.errors.unauthorized"}"#).unwrap();
        assert!(!other.is_already_exists());
    }

    #[test]
    fn test_tag_parses() {
        let json = r#"{
            "id": "urn:vmomi:InventoryServiceTag:t1",
            "name": "backup-nightly",
            "category_id": "urn:vmomi:InventoryServiceCategory:c1",
            "used_by": []
        }"#;
        let tag: Tag = serde_json::from_str(json).unwrap();
        assert_eq!(tag.name, "backup-nightly");
        assert_eq!(tag.description, "");
    }
}
