//! YAML plan model.
//!
//! A plan is a list of tasks, each naming one operation on one management
//! plane. Per-task settings blocks are optional; anything left out resolves
//! from the vendor's environment variables at execution time.

use converge_awx::AwxSettings;
use converge_core::DesiredState;
use converge_guacamole::{ConnectionKind, GuacSettings, Protocol};
use converge_tetration::TetSettings;
use converge_vmware::VmwareSettings;
use serde::Deserialize;
use serde_json::Value;

/// A parsed plan file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

fn default_version() -> u32 {
    1
}

/// One task: an optional display name plus exactly one operation key.
#[derive(Debug, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub op: TaskOp,
}

impl Task {
    /// Label used in per-task output lines.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("task #{}", index + 1),
        }
    }
}

/// The operation a task performs, keyed by vendor and resource kind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOp {
    GuacamoleUser(GuacamoleUserTask),
    GuacamoleUserGroup(GuacamoleUserGroupTask),
    GuacamoleConnection(GuacamoleConnectionTask),
    GuacamoleConnectionGroup(GuacamoleConnectionGroupTask),
    GuacamoleConnectionPermission(GuacamoleConnectionPermissionTask),
    AwxInventory(AwxInventoryTask),
    AwxJob(AwxJobTask),
    VmwareTag(VmwareTagTask),
    VmwareTagAttachment(VmwareTagAttachmentTask),
    TetrationScope(TetrationScopeTask),
}

// ─── Guacamole tasks ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacamoleUserTask {
    pub name: String,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: GuacSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacamoleUserGroupTask {
    pub name: String,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: GuacSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacamoleConnectionTask {
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
    pub state: DesiredState,
    #[serde(default)]
    pub settings: GuacSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacamoleConnectionGroupTask {
    /// Slash-joined path below the root group, e.g. `DeptA/Lab`.
    pub name: String,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: GuacSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuacamoleConnectionPermissionTask {
    pub user: String,
    /// Identifier of the connection or connection group.
    pub identifier: String,
    pub kind: ConnectionKind,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: GuacSettings,
}

// ─── AWX tasks ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwxInventoryTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Organization id the inventory belongs to.
    pub organization: i64,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: AwxSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwxJobTask {
    pub template: String,
    #[serde(default)]
    pub inventory: Option<String>,
    #[serde(default)]
    pub credentials: Vec<String>,
    #[serde(default)]
    pub extra_vars: Option<Value>,
    /// Wait for the job to finish before moving on.
    #[serde(default = "default_true")]
    pub wait: bool,
    #[serde(default = "default_job_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_job_interval")]
    pub interval_secs: u64,
    #[serde(default)]
    pub settings: AwxSettings,
}

fn default_true() -> bool {
    true
}
fn default_job_timeout() -> u64 {
    600
}
fn default_job_interval() -> u64 {
    10
}

// ─── VMware tasks ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmwareTagTask {
    /// Name of the (pre-existing) tag category.
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: VmwareSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VmwareTagAttachmentTask {
    /// VM name the tags apply to.
    pub vm: String,
    /// Tag names; each must be unambiguous across categories.
    pub tags: Vec<String>,
    pub state: DesiredState,
    #[serde(default)]
    pub settings: VmwareSettings,
}

// ─── Tetration tasks ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TetrationScopeTask {
    /// Workspace scope to make active for the signed-in user.
    pub scope_id: String,
    #[serde(default)]
    pub settings: TetSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_plan() {
        let yaml = r#"
version: 1
tasks:
  - name: gateway account
    guacamole_user:
      name: jdoe
      state: present
  - awx_inventory:
      name: Foo Inventory
      description: Our Foo Cloud Servers
      organization: 2
      state: present
"#;
        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(plan.version, 1);
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[0].label(0), "gateway account");
        assert_eq!(plan.tasks[1].label(1), "task #2");
        match &plan.tasks[0].op {
            TaskOp::GuacamoleUser(task) => {
                assert_eq!(task.name, "jdoe");
                assert_eq!(task.state, DesiredState::Present);
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_parse_job_task_defaults() {
        let yaml = r#"
tasks:
  - awx_job:
      template: deploy
      credentials: [vault-ssh]
      extra_vars: {release: "1.4.2"}
"#;
        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        match &plan.tasks[0].op {
            TaskOp::AwxJob(task) => {
                assert!(task.wait);
                assert_eq!(task.timeout_secs, 600);
                assert_eq!(task.interval_secs, 10);
                assert_eq!(task.credentials, vec!["vault-ssh"]);
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let yaml = r#"
tasks:
  - guacamole_widget:
      name: x
"#;
        assert!(serde_yaml::from_str::<Plan>(yaml).is_err());
    }

    #[test]
    fn test_unknown_task_field_rejected() {
        let yaml = r#"
tasks:
  - guacamole_user:
      name: jdoe
      state: present
      nonsense: true
"#;
        assert!(serde_yaml::from_str::<Plan>(yaml).is_err());
    }

    #[test]
    fn test_invalid_state_rejected() {
        let yaml = r#"
tasks:
  - guacamole_user:
      name: jdoe
      state: deleted
"#;
        assert!(serde_yaml::from_str::<Plan>(yaml).is_err());
    }

    #[test]
    fn test_permission_task_parses_kind() {
        let yaml = r#"
tasks:
  - guacamole_connection_permission:
      user: jdoe
      identifier: "44"
      kind: group
      state: absent
"#;
        let plan: Plan = serde_yaml::from_str(yaml).unwrap();
        match &plan.tasks[0].op {
            TaskOp::GuacamoleConnectionPermission(task) => {
                assert_eq!(task.kind, ConnectionKind::Group);
                assert_eq!(task.state, DesiredState::Absent);
            }
            other => panic!("unexpected op: {:?}", other),
        }
    }
}
