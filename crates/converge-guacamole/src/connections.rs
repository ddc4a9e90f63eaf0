//! Connection management — create, delete, lookup, protocol presets.

use crate::client::GuacClient;
use crate::error::GuacResult;
use crate::tree::{self, ROOT_GROUP};
use crate::types::{ConnectionSpec, ConnectionTarget, GuacConnection, GuacSettings, Protocol};
use converge_core::{Action, DesiredState, Outcome};
use serde_json::{json, Value};

/// Wire payload for a new connection, per protocol preset.
///
/// Presets carry the gateway defaults operators expect: ssh terminals get a
/// readable colour scheme and key auth, rdp sessions get NLA security with
/// dynamic resize, xrdp targets negotiate security freely.
pub fn connection_payload(spec: &ConnectionSpec) -> Value {
    match spec.protocol {
        Protocol::Ssh => json!({
            "parentIdentifier": spec.parent_identifier,
            "name": spec.name,
            "protocol": "ssh",
            "parameters": {
                "port": "22",
                "hostname": spec.hostname,
                "username": spec.username,
                "private-key": spec.private_key,
                "font-size": "10",
                "color-scheme": "green-black"
            },
            "attributes": {
                "max-connections": "",
                "max-connections-per-user": ""
            }
        }),
        Protocol::Rdp => json!({
            "parentIdentifier": spec.parent_identifier,
            "name": spec.name,
            "protocol": "rdp",
            "parameters": {
                "port": "3389",
                "hostname": spec.hostname,
                "username": spec.username,
                "password": spec.password,
                "security": "nla",
                "ignore-cert": "true",
                "resize-method": "display-update",
                "enable-wallpaper": "true",
                "enable-font-smoothing": "true"
            },
            "attributes": {
                "max-connections": "",
                "max-connections-per-user": ""
            }
        }),
        Protocol::Xrdp => json!({
            "parentIdentifier": spec.parent_identifier,
            "name": spec.name,
            "protocol": "rdp",
            "parameters": {
                "port": "3389",
                "hostname": spec.hostname,
                "username": spec.username,
                "password": spec.password,
                "security": "any",
                "ignore-cert": "true",
                "enable-wallpaper": "true",
                "enable-font-smoothing": "true"
            },
            "attributes": {
                "max-connections": "",
                "max-connections-per-user": ""
            }
        }),
    }
}

impl GuacClient {
    /// Fetch one connection by identifier.
    pub async fn get_connection(&self, identifier: &str) -> GuacResult<GuacConnection> {
        let path = format!("connections/{}", Self::encode_segment(identifier));
        self.get_json("get_connection", &path).await
    }

    /// Create a connection from a protocol preset.
    pub async fn create_connection(&self, spec: &ConnectionSpec) -> GuacResult<GuacConnection> {
        let payload = connection_payload(spec);
        self.post_json("create_connection", "connections", &payload)
            .await
    }

    /// Delete a connection by identifier.
    pub async fn delete_connection(&self, identifier: &str) -> GuacResult<()> {
        let path = format!("connections/{}", Self::encode_segment(identifier));
        self.delete("delete_connection", &path).await
    }
}

/// Reconcile a connection to the requested state.
///
/// The connection is addressed by its path below the root group; the parent
/// group must already exist.
pub async fn ensure_connection(
    settings: GuacSettings,
    target: &ConnectionTarget,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacConnection>> {
    let client = GuacClient::login(settings).await?;
    let result = reconcile_connection(&client, target, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_connection(
    client: &GuacClient,
    target: &ConnectionTarget,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacConnection>> {
    let path = format!("{}/{}", ROOT_GROUP, target.name);
    let paths = client.connection_paths().await?;

    let existing = match paths.get(&path) {
        Some(identifier) => Some(client.get_connection(identifier).await?),
        None => None,
    };

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            let parent = tree::parent_identifier(&paths, &path)?;
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            let leaf = path.rsplit('/').next().unwrap_or(&target.name);
            let spec = ConnectionSpec {
                name: leaf.to_string(),
                hostname: target.hostname.clone(),
                protocol: target.protocol,
                parent_identifier: parent,
                username: target.username.clone(),
                password: target.password.clone(),
                private_key: target.private_key.clone(),
            };
            let created = client.create_connection(&spec).await?;
            Ok(Outcome::changed(Some(created)))
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            if let Some(ref connection) = existing {
                client.delete_connection(&connection.identifier).await?;
            }
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(protocol: Protocol) -> ConnectionSpec {
        ConnectionSpec {
            name: "host1".into(),
            hostname: "10.0.0.4".into(),
            protocol,
            parent_identifier: "3".into(),
            username: "deploy".into(),
            password: Some("secret".into()),
            private_key: Some("-----BEGIN KEY-----".into()),
        }
    }

    #[test]
    fn test_ssh_payload() {
        let payload = connection_payload(&spec(Protocol::Ssh));
        assert_eq!(payload["protocol"], "ssh");
        assert_eq!(payload["parentIdentifier"], "3");
        assert_eq!(payload["parameters"]["port"], "22");
        assert_eq!(payload["parameters"]["hostname"], "10.0.0.4");
        assert_eq!(payload["parameters"]["private-key"], "-----BEGIN KEY-----");
        assert_eq!(payload["parameters"]["color-scheme"], "green-black");
    }

    #[test]
    fn test_rdp_payload_uses_nla() {
        let payload = connection_payload(&spec(Protocol::Rdp));
        assert_eq!(payload["protocol"], "rdp");
        assert_eq!(payload["parameters"]["security"], "nla");
        assert_eq!(payload["parameters"]["resize-method"], "display-update");
        assert_eq!(payload["parameters"]["password"], "secret");
    }

    #[test]
    fn test_xrdp_payload_relaxes_security() {
        let payload = connection_payload(&spec(Protocol::Xrdp));
        // xrdp servers speak the rdp protocol but cannot do NLA.
        assert_eq!(payload["protocol"], "rdp");
        assert_eq!(payload["parameters"]["security"], "any");
    }
}
