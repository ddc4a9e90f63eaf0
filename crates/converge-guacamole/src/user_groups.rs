//! User group management.

use crate::client::GuacClient;
use crate::error::GuacResult;
use crate::types::GuacSettings;
use converge_core::{Action, DesiredState, Outcome};
use serde_json::{json, Value};

impl GuacClient {
    /// Look up a user group by identifier; a 404 means it does not exist.
    pub async fn find_user_group(&self, name: &str) -> GuacResult<Option<Value>> {
        let path = format!("userGroups/{}", Self::encode_segment(name));
        self.get_json_opt("get_user_group", &path).await
    }

    /// Create a user group.
    pub async fn create_user_group(&self, name: &str) -> GuacResult<Value> {
        let payload = json!({
            "identifier": name,
            "attributes": { "disabled": "" }
        });
        self.post_json("create_user_group", "userGroups", &payload)
            .await
    }

    /// Delete a user group.
    pub async fn delete_user_group(&self, name: &str) -> GuacResult<()> {
        let path = format!("userGroups/{}", Self::encode_segment(name));
        self.delete("delete_user_group", &path).await
    }
}

/// Reconcile a user group to the requested state.
pub async fn ensure_user_group(
    settings: GuacSettings,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<Value>> {
    let client = GuacClient::login(settings).await?;
    let result = reconcile_user_group(&client, name, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_user_group(
    client: &GuacClient,
    name: &str,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<Value>> {
    let existing = client.find_user_group(name).await?;

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            let created = client.create_user_group(name).await?;
            Ok(Outcome::changed(Some(created)))
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            client.delete_user_group(name).await?;
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}
