//! Per-user connection permission grants.
//!
//! Grants are mutated with JSON-Patch style documents against
//! `users/{user}/permissions`; presence is read from the identifier maps of
//! the user's permission document.

use crate::client::GuacClient;
use crate::error::{GuacError, GuacResult};
use crate::types::{ConnectionKind, ConnectionRef, GuacPermissions, GuacSettings};
use converge_core::{Action, DesiredState, Outcome};
use serde_json::{json, Value};

/// Patch document granting or revoking READ on a connection or group.
pub fn permission_patch(op: &str, reference: &ConnectionRef) -> Value {
    let path = match reference.kind {
        ConnectionKind::Connection => {
            format!("/connectionPermissions/{}", reference.identifier)
        }
        ConnectionKind::Group => {
            format!("/connectionGroupPermissions/{}", reference.identifier)
        }
    };
    json!([{ "op": op, "path": path, "value": "READ" }])
}

impl GuacPermissions {
    /// Whether READ on the referenced connection/group is currently held.
    pub fn holds(&self, reference: &ConnectionRef) -> bool {
        match reference.kind {
            ConnectionKind::Connection => self
                .connection_permissions
                .contains_key(&reference.identifier),
            ConnectionKind::Group => self
                .connection_group_permissions
                .contains_key(&reference.identifier),
        }
    }
}

impl GuacClient {
    /// Full permission document of a user.
    pub async fn user_permissions(&self, username: &str) -> GuacResult<GuacPermissions> {
        let path = format!("users/{}/permissions", Self::encode_segment(username));
        self.get_json("get_user_permissions", &path).await
    }

    /// Grant READ on a connection or group to a user.
    pub async fn grant_permission(
        &self,
        username: &str,
        reference: &ConnectionRef,
    ) -> GuacResult<()> {
        let path = format!("users/{}/permissions", Self::encode_segment(username));
        self.patch(
            "add_connection_to_user",
            &path,
            &permission_patch("add", reference),
        )
        .await
    }

    /// Revoke READ on a connection or group from a user.
    pub async fn revoke_permission(
        &self,
        username: &str,
        reference: &ConnectionRef,
    ) -> GuacResult<()> {
        let path = format!("users/{}/permissions", Self::encode_segment(username));
        self.patch(
            "remove_connection_from_user",
            &path,
            &permission_patch("remove", reference),
        )
        .await
    }
}

/// Reconcile one permission grant for a user.
///
/// Fails fast when the user does not exist. `changed` reflects whether the
/// reference's membership in the user's permission set differs from the
/// requested state; the returned object is the user's permission document
/// after the operation.
pub async fn ensure_connection_permission(
    settings: GuacSettings,
    user: &str,
    reference: &ConnectionRef,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacPermissions>> {
    let client = GuacClient::login(settings).await?;
    let result = reconcile_permission(&client, user, reference, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_permission(
    client: &GuacClient,
    user: &str,
    reference: &ConnectionRef,
    state: DesiredState,
    check_mode: bool,
) -> GuacResult<Outcome<GuacPermissions>> {
    if client.find_user(user).await?.is_none() {
        return Err(GuacError::UserNotFound(user.to_string()));
    }

    let current = client.user_permissions(user).await?;
    let action = Action::plan_membership(current.holds(reference), state);

    if check_mode || !action.changes() {
        return Ok(Outcome {
            changed: action.changes(),
            object: Some(current),
        });
    }

    match action {
        Action::Create => client.grant_permission(user, reference).await?,
        Action::Delete => client.revoke_permission(user, reference).await?,
        Action::Nothing => {}
    }

    let after = client.user_permissions(user).await?;
    Ok(Outcome::changed(Some(after)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn perms(connections: &[&str], groups: &[&str]) -> GuacPermissions {
        GuacPermissions {
            connection_permissions: connections
                .iter()
                .map(|id| (id.to_string(), vec!["READ".to_string()]))
                .collect(),
            connection_group_permissions: groups
                .iter()
                .map(|id| (id.to_string(), vec!["READ".to_string()]))
                .collect(),
            system_permissions: vec![],
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_patch_paths_by_kind() {
        let conn = ConnectionRef {
            identifier: "44".into(),
            kind: ConnectionKind::Connection,
        };
        let group = ConnectionRef {
            identifier: "3".into(),
            kind: ConnectionKind::Group,
        };

        let add = permission_patch("add", &conn);
        assert_eq!(add[0]["op"], "add");
        assert_eq!(add[0]["path"], "/connectionPermissions/44");
        assert_eq!(add[0]["value"], "READ");

        let remove = permission_patch("remove", &group);
        assert_eq!(remove[0]["op"], "remove");
        assert_eq!(remove[0]["path"], "/connectionGroupPermissions/3");
    }

    #[test]
    fn test_holds_checks_the_matching_set() {
        let current = perms(&["44"], &["3"]);
        assert!(current.holds(&ConnectionRef {
            identifier: "44".into(),
            kind: ConnectionKind::Connection,
        }));
        assert!(!current.holds(&ConnectionRef {
            identifier: "3".into(),
            kind: ConnectionKind::Connection,
        }));
        assert!(current.holds(&ConnectionRef {
            identifier: "3".into(),
            kind: ConnectionKind::Group,
        }));
    }

    #[test]
    fn test_grant_already_present_plans_nothing() {
        let current = perms(&["44"], &[]);
        let reference = ConnectionRef {
            identifier: "44".into(),
            kind: ConnectionKind::Connection,
        };
        let action = Action::plan_membership(current.holds(&reference), DesiredState::Present);
        assert_eq!(action, Action::Nothing);
    }

    #[test]
    fn test_revoke_not_present_plans_nothing() {
        let current = perms(&[], &[]);
        let reference = ConnectionRef {
            identifier: "9".into(),
            kind: ConnectionKind::Group,
        };
        let action = Action::plan_membership(current.holds(&reference), DesiredState::Absent);
        assert_eq!(action, Action::Nothing);
    }
}
