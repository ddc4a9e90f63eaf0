//! Connection group management with hierarchical path handling.

use crate::client::GuacClient;
use crate::error::GuacResult;
use crate::tree::{self, ROOT_GROUP};
use crate::types::{ConnectionTreeNode, GuacConnectionGroup, GuacSettings};
use converge_core::{Action, DesiredState, Outcome};
use serde_json::json;
use std::collections::HashMap;

impl GuacClient {
    /// Fetch the full connection-group tree rooted at `ROOT`.
    pub async fn connection_tree(&self) -> GuacResult<ConnectionTreeNode> {
        self.get_json("get_connection_tree", "connectionGroups/ROOT/tree")
            .await
    }

    /// Fetch the tree and flatten it into a path → identifier map.
    pub async fn connection_paths(&self) -> GuacResult<HashMap<String, String>> {
        let root = self.connection_tree().await?;
        Ok(tree::connection_paths(&root))
    }

    /// Fetch one connection group by identifier.
    pub async fn get_connection_group(
        &self,
        identifier: &str,
    ) -> GuacResult<GuacConnectionGroup> {
        let path = format!("connectionGroups/{}", Self::encode_segment(identifier));
        self.get_json("get_connection_group", &path).await
    }

    /// Create an organizational connection group under a parent.
    pub async fn create_connection_group(
        &self,
        name: &str,
        parent_identifier: &str,
    ) -> GuacResult<GuacConnectionGroup> {
        let payload = json!({
            "parentIdentifier": parent_identifier,
            "name": name,
            "type": "ORGANIZATIONAL",
            "attributes": {
                "max-connections": "",
                "max-connections-per-user": "",
                "enable-session-affinity": ""
            }
        });
        self.post_json("create_connection_group", "connectionGroups", &payload)
            .await
    }

    /// Delete a connection group by identifier.
    pub async fn delete_connection_group(&self, identifier: &str) -> GuacResult<()> {
        let path = format!("connectionGroups/{}", Self::encode_segment(identifier));
        self.delete("delete_connection_group", &path).await
    }
}

/// Reconcile a connection group to the requested state.
///
/// `name` is the slash-joined path below the root, e.g. `DeptA` or
/// `DeptA/Lab`. Intermediate groups must already exist; they are never
/// auto-created.
pub async fn ensure_connection_group(
    settings: GuacSettings,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacConnectionGroup>> {
    let client = GuacClient::login(settings).await?;
    let result = reconcile_connection_group(&client, name, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_connection_group(
    client: &GuacClient,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacConnectionGroup>> {
    let path = format!("{}/{}", ROOT_GROUP, name);
    let paths = client.connection_paths().await?;

    let existing = match paths.get(&path) {
        Some(identifier) => Some(client.get_connection_group(identifier).await?),
        None => None,
    };

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            // Resolved before mutating so a missing parent fails in check
            // mode too.
            let parent = tree::parent_identifier(&paths, &path)?;
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            let leaf = path.rsplit('/').next().unwrap_or(name);
            let created = client.create_connection_group(leaf, &parent).await?;
            Ok(Outcome::changed(Some(created)))
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            if let Some(ref group) = existing {
                client.delete_connection_group(&group.identifier).await?;
            }
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}
