//! User account management.

use crate::client::GuacClient;
use crate::error::GuacResult;
use crate::types::{GuacSettings, GuacUser};
use converge_core::{Action, DesiredState, Outcome};
use serde_json::json;
use std::collections::HashMap;

impl GuacClient {
    /// All user accounts, keyed by username.
    pub async fn list_users(&self) -> GuacResult<HashMap<String, GuacUser>> {
        self.get_json("get_users", "users").await
    }

    /// Look up a single user by username.
    pub async fn find_user(&self, username: &str) -> GuacResult<Option<GuacUser>> {
        let mut users = self.list_users().await?;
        Ok(users.remove(username))
    }

    /// Create a user account with empty attribute defaults.
    pub async fn create_user(&self, username: &str) -> GuacResult<GuacUser> {
        let payload = json!({
            "username": username,
            "attributes": {
                "expired": "",
                "access-window-start": "",
                "access-window-end": "",
                "disabled": "",
                "valid-until": "",
                "valid-from": ""
            }
        });
        self.post_json("create_user", "users", &payload).await
    }

    /// Delete a user account.
    pub async fn delete_user(&self, username: &str) -> GuacResult<()> {
        let path = format!("users/{}", Self::encode_segment(username));
        self.delete("delete_user", &path).await
    }
}

/// Reconcile a user account to the requested state.
///
/// Opens its own session and closes it before returning, success or failure.
pub async fn ensure_user(
    settings: GuacSettings,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacUser>> {
    let client = GuacClient::login(settings).await?;
    let result = reconcile_user(&client, name, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_user(
    client: &GuacClient,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacUser>> {
    let existing = client.find_user(name).await?;

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            let created = client.create_user(name).await?;
            Ok(Outcome::changed(Some(created)))
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            client.delete_user(name).await?;
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}
