//! Data structures and configuration for the Guacamole gateway.

use converge_core::provider::{
    resolve_required, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use converge_core::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Environment variable prefix for settings fallbacks (`GUACAMOLE_HOST`, …).
pub const ENV_PREFIX: &str = "GUACAMOLE";

// ─── Settings ───────────────────────────────────────────────────────────────

/// Connection settings for a Guacamole gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacSettings {
    /// Gateway host, e.g. `guac.example.com`.
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Data source the session data endpoints are served from.
    #[serde(default = "default_data_source")]
    pub data_source: String,
    /// Whether to verify TLS certificates.
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

fn default_data_source() -> String {
    "mysql".to_string()
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

impl Default for GuacSettings {
    fn default() -> Self {
        Self {
            host: None,
            username: None,
            password: None,
            data_source: default_data_source(),
            verify: false,
            silent_tls_warnings: true,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl GuacSettings {
    /// Fill missing values from `GUACAMOLE_*` environment variables and
    /// fail fast if a required setting is still absent.
    pub fn resolve(self) -> Result<ResolvedGuacSettings, SettingsError> {
        Ok(ResolvedGuacSettings {
            host: resolve_required(self.host, ENV_PREFIX, "host")?,
            username: resolve_required(self.username, ENV_PREFIX, "username")?,
            password: resolve_required(self.password, ENV_PREFIX, "password")?,
            data_source: self.data_source,
            verify: self.verify,
            silent_tls_warnings: self.silent_tls_warnings,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        })
    }
}

/// Settings with every required value present.
#[derive(Debug, Clone)]
pub struct ResolvedGuacSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub data_source: String,
    pub verify: bool,
    pub silent_tls_warnings: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

// ─── Auth ───────────────────────────────────────────────────────────────────

/// Response of `POST /api/tokens`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub auth_token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
}

// ─── Users ──────────────────────────────────────────────────────────────────

/// A gateway user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuacUser {
    pub username: String,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub last_active: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

// ─── Connections / groups ───────────────────────────────────────────────────

/// A connection as returned by the data API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuacConnection {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub parent_identifier: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A connection group as returned by the data API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuacConnectionGroup {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub parent_identifier: Option<String>,
    #[serde(rename = "type", default)]
    pub group_type: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One node of the `connectionGroups/ROOT/tree` response. The root node is
/// itself a group whose children nest recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTreeNode {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub child_connections: Vec<TreeConnection>,
    #[serde(default)]
    pub child_connection_groups: Vec<ConnectionTreeNode>,
}

/// A leaf connection inside the tree response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConnection {
    pub identifier: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Protocol presets supported for connection creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Ssh,
    Rdp,
    /// RDP against an xrdp server (relaxed security negotiation).
    Xrdp,
}

/// Parameters for a new connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSpec {
    pub name: String,
    pub hostname: String,
    pub protocol: Protocol,
    /// Identifier of the parent connection group.
    pub parent_identifier: String,
    /// Login user on the target host.
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
}

/// Desired attributes of a connection addressed by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionTarget {
    /// Slash-joined path below the root group, e.g. `DeptA/host1`.
    pub name: String,
    pub hostname: String,
    pub protocol: Protocol,
    /// Login user on the target host.
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
}

// ─── Permissions ────────────────────────────────────────────────────────────

/// Full permission document of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuacPermissions {
    #[serde(default)]
    pub connection_permissions: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub connection_group_permissions: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub system_permissions: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Whether a permission reference targets a connection or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Connection,
    Group,
}

/// Reference to a connection or connection group a permission applies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionRef {
    pub identifier: String,
    pub kind: ConnectionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let s = GuacSettings::default();
        assert_eq!(s.data_source, "mysql");
        assert!(!s.verify);
        assert!(s.silent_tls_warnings);
        assert_eq!(s.timeout_secs, 10);
        assert_eq!(s.max_retries, 3);
    }

    #[test]
    fn test_settings_resolve_requires_host() {
        let s = GuacSettings {
            username: Some("admin".into()),
            password: Some("secret".into()),
            ..Default::default()
        };
        assert!(s.resolve().is_err());
    }

    #[test]
    fn test_settings_deny_unknown_fields() {
        let err = serde_json::from_str::<GuacSettings>(r#"{"hosts": "typo"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_tree_node_parses_nested_response() {
        let json = r#"{
            "name": "ROOT",
            "identifier": "ROOT",
            "type": "ORGANIZATIONAL",
            "childConnectionGroups": [{
                "identifier": "12",
                "name": "DeptA",
                "childConnections": [{"identifier": "44", "name": "host1", "protocol": "ssh"}]
            }]
        }"#;
        let node: ConnectionTreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.child_connection_groups.len(), 1);
        let dept = &node.child_connection_groups[0];
        assert_eq!(dept.identifier, "12");
        assert_eq!(dept.child_connections[0].name, "host1");
    }

    #[test]
    fn test_permissions_parse() {
        let json = r#"{
            "connectionPermissions": {"44": ["READ"]},
            "connectionGroupPermissions": {},
            "systemPermissions": ["ADMINISTER"]
        }"#;
        let p: GuacPermissions = serde_json::from_str(json).unwrap();
        assert!(p.connection_permissions.contains_key("44"));
        assert_eq!(p.system_permissions, vec!["ADMINISTER"]);
    }
}
