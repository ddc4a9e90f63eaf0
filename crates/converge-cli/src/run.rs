//! Task execution.
//!
//! Each task opens its own authenticated session against its management
//! plane and tears it down before the next task runs; nothing is shared
//! between tasks. Errors are flattened to display strings for the report.

use crate::plan::{AwxJobTask, TaskOp, TetrationScopeTask};
use converge_awx::jobs::LaunchSpec;
use converge_awx::{AwxClient, JobOutcome};
use converge_guacamole::{
    connections, groups, permissions, user_groups, users, ConnectionRef, ConnectionTarget,
};
use converge_tetration::TetClient;
use converge_vmware::{associations, tags};
use serde_json::Value;
use std::time::Duration;

/// Run one task; returns whether it changed (or would change) anything.
pub async fn run_task(op: &TaskOp, check: bool) -> Result<bool, String> {
    match op {
        TaskOp::GuacamoleUser(task) => {
            users::ensure_user(task.settings.clone(), &task.name, task.state, check)
                .await
                .map(|outcome| outcome.changed)
                .map_err(|e| e.to_string())
        }
        TaskOp::GuacamoleUserGroup(task) => {
            user_groups::ensure_user_group(task.settings.clone(), &task.name, task.state, check)
                .await
                .map(|outcome| outcome.changed)
                .map_err(|e| e.to_string())
        }
        TaskOp::GuacamoleConnection(task) => {
            let target = ConnectionTarget {
                name: task.name.clone(),
                hostname: task.hostname.clone(),
                protocol: task.protocol,
                username: task.username.clone(),
                password: task.password.clone(),
                private_key: task.private_key.clone(),
            };
            connections::ensure_connection(task.settings.clone(), &target, task.state, check)
                .await
                .map(|outcome| outcome.changed)
                .map_err(|e| e.to_string())
        }
        TaskOp::GuacamoleConnectionGroup(task) => groups::ensure_connection_group(
            task.settings.clone(),
            &task.name,
            task.state,
            check,
        )
        .await
        .map(|outcome| outcome.changed)
        .map_err(|e| e.to_string()),
        TaskOp::GuacamoleConnectionPermission(task) => {
            let reference = ConnectionRef {
                identifier: task.identifier.clone(),
                kind: task.kind,
            };
            permissions::ensure_connection_permission(
                task.settings.clone(),
                &task.user,
                &reference,
                task.state,
                check,
            )
            .await
            .map(|outcome| outcome.changed)
            .map_err(|e| e.to_string())
        }
        TaskOp::AwxInventory(task) => converge_awx::inventories::ensure_inventory(
            task.settings.clone(),
            &task.name,
            &task.description,
            task.organization,
            task.state,
            check,
        )
        .await
        .map(|outcome| outcome.changed)
        .map_err(|e| e.to_string()),
        TaskOp::AwxJob(task) => run_awx_job(task, check).await,
        TaskOp::VmwareTag(task) => tags::ensure_tag(
            task.settings.clone(),
            &task.category,
            &task.name,
            &task.description,
            task.state,
            check,
        )
        .await
        .map(|outcome| outcome.changed)
        .map_err(|e| e.to_string()),
        TaskOp::VmwareTagAttachment(task) => associations::ensure_attachments(
            task.settings.clone(),
            &task.vm,
            &task.tags,
            task.state,
            check,
        )
        .await
        .map(|outcome| outcome.changed)
        .map_err(|e| e.to_string()),
        TaskOp::TetrationScope(task) => run_scope_switch(task, check).await,
    }
}

/// Launching a job always mutates, so check mode only reports intent.
async fn run_awx_job(task: &AwxJobTask, check: bool) -> Result<bool, String> {
    if check {
        return Ok(true);
    }

    let client = AwxClient::connect(task.settings.clone()).map_err(|e| e.to_string())?;
    let spec = LaunchSpec {
        template: task.template.clone(),
        inventory: task.inventory.clone(),
        credentials: task.credentials.clone(),
        extra_vars: task.extra_vars.clone(),
    };
    let job = client.launch_job(&spec).await.map_err(|e| e.to_string())?;

    if task.wait {
        let outcome = client
            .wait_for_job(
                job.id,
                Duration::from_secs(task.timeout_secs),
                Duration::from_secs(task.interval_secs),
            )
            .await
            .map_err(|e| e.to_string())?;
        if outcome == JobOutcome::Failed {
            return Err(format!("job {} finished as failed", job.id));
        }
    }

    Ok(true)
}

async fn run_scope_switch(task: &TetrationScopeTask, check: bool) -> Result<bool, String> {
    let mut client = TetClient::login(task.settings.clone())
        .await
        .map_err(|e| e.to_string())?;

    let result = if check {
        Ok(!scope_matches(
            client.preferences().app_scope.as_ref(),
            &task.scope_id,
        ))
    } else {
        client
            .set_scope(&task.scope_id)
            .await
            .map_err(|e| e.to_string())
    };

    client.logout().await;
    result
}

/// Whether the active scope preference already points at `scope_id`. The
/// backend serves the preference either as the bare id or as an object
/// carrying an `id` field.
fn scope_matches(app_scope: Option<&Value>, scope_id: &str) -> bool {
    match app_scope {
        Some(Value::String(current)) => current == scope_id,
        Some(Value::Object(map)) => map.get("id").and_then(|v| v.as_str()) == Some(scope_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_matches_bare_id() {
        assert!(scope_matches(Some(&json!("scope-7")), "scope-7"));
        assert!(!scope_matches(Some(&json!("scope-8")), "scope-7"));
    }

    #[test]
    fn test_scope_matches_object_form() {
        assert!(scope_matches(
            Some(&json!({"id": "scope-7", "name": "Default"})),
            "scope-7"
        ));
        assert!(!scope_matches(Some(&json!({"name": "Default"})), "scope-7"));
    }

    #[test]
    fn test_scope_matches_absent_preference() {
        assert!(!scope_matches(None, "scope-7"));
    }
}
