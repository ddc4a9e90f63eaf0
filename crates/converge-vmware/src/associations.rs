//! Tag association management — attach/detach tag sets on objects.

use crate::client::VmwareClient;
use crate::error::{VmwareError, VmwareResult};
use crate::tags::TAGGING;
use crate::types::{Tag, VmwareSettings};
use converge_core::{DesiredState, Outcome};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Wire payload for association calls. `tag_ids` is omitted for the
/// list-attached call.
pub fn association_payload(vm_id: &str, tag_ids: Option<&[String]>) -> Value {
    let mut payload = json!({
        "object_id": {
            "id": vm_id,
            "type": "VirtualMachine",
        }
    });
    if let Some(ids) = tag_ids {
        payload["tag_ids"] = json!(ids);
    }
    payload
}

impl VmwareClient {
    /// Ids of the tags currently attached to a VM.
    pub async fn attached_tags(&self, vm_id: &str) -> VmwareResult<Vec<String>> {
        let path = format!("{TAGGING}/tag-association?~action=list-attached-tags");
        self.post_value("get_attached_tags", &path, &association_payload(vm_id, None))
            .await
    }

    /// Attach a set of tags to a VM in one call.
    pub async fn attach_tags(&self, vm_id: &str, tag_ids: &[String]) -> VmwareResult<()> {
        let path = format!("{TAGGING}/tag-association?~action=attach-multiple-tags-to-object");
        self.post_unit("attach_tags", &path, &association_payload(vm_id, Some(tag_ids)))
            .await
    }

    /// Detach a set of tags from a VM in one call.
    pub async fn detach_tags(&self, vm_id: &str, tag_ids: &[String]) -> VmwareResult<()> {
        let path = format!("{TAGGING}/tag-association?~action=detach-multiple-tags-from-object");
        self.post_unit("detach_tags", &path, &association_payload(vm_id, Some(tag_ids)))
            .await
    }
}

/// Which attachment calls (if any) converge the current set to the target.
///
/// `Present` attaches only the missing tags, `Absent` detaches only the
/// ones actually attached; agreeing sets produce no call at all.
pub fn attachment_diff(
    attached: &HashSet<String>,
    desired: &[String],
    state: DesiredState,
) -> Vec<String> {
    match state {
        DesiredState::Present => desired
            .iter()
            .filter(|id| !attached.contains(*id))
            .cloned()
            .collect(),
        DesiredState::Absent => desired
            .iter()
            .filter(|id| attached.contains(*id))
            .cloned()
            .collect(),
    }
}

/// Reconcile the attachment of a set of tags (by name) on a VM.
///
/// Returns the tag ids attached to the VM after the operation.
pub async fn ensure_attachments(
    settings: VmwareSettings,
    vm_name: &str,
    tag_names: &[String],
    state: DesiredState,
    check_mode: bool,
) -> VmwareResult<Outcome<Vec<String>>> {
    let client = VmwareClient::connect(settings).await?;
    let result = reconcile_attachments(&client, vm_name, tag_names, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_attachments(
    client: &VmwareClient,
    vm_name: &str,
    tag_names: &[String],
    state: DesiredState,
    check_mode: bool,
) -> VmwareResult<Outcome<Vec<String>>> {
    let vm = client.get_vm_by_name(vm_name).await?;
    let all_tags = client.list_tags().await?;
    let desired = resolve_tag_ids(&all_tags, tag_names)?;

    let attached: HashSet<String> = client.attached_tags(&vm.vm).await?.into_iter().collect();
    let delta = attachment_diff(&attached, &desired, state);

    if delta.is_empty() {
        return Ok(Outcome::unchanged(Some(attached.into_iter().collect())));
    }

    if check_mode {
        return Ok(Outcome::changed(Some(attached.into_iter().collect())));
    }

    match state {
        DesiredState::Present => client.attach_tags(&vm.vm, &delta).await?,
        DesiredState::Absent => client.detach_tags(&vm.vm, &delta).await?,
    }

    let after = client.attached_tags(&vm.vm).await?;
    Ok(Outcome::changed(Some(after)))
}

/// Map tag names to ids, refusing missing or ambiguous names.
fn resolve_tag_ids(all_tags: &[Tag], names: &[String]) -> VmwareResult<Vec<String>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let mut matches = all_tags.iter().filter(|t| &t.name == name);
        let first = matches
            .next()
            .ok_or_else(|| VmwareError::not_found(format!("tag '{name}' not found")))?;
        if matches.next().is_some() {
            return Err(VmwareError::ambiguous(format!(
                "tag name '{name}' exists in more than one category"
            )));
        }
        ids.push(first.id.clone());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, name: &str, category: &str) -> Tag {
        Tag {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category_id: category.into(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_association_payload_shapes() {
        let list = association_payload("vm-42", None);
        assert_eq!(list["object_id"]["id"], "vm-42");
        assert_eq!(list["object_id"]["type"], "VirtualMachine");
        assert!(list.get("tag_ids").is_none());

        let attach = association_payload("vm-42", Some(&["t1".into(), "t2".into()]));
        assert_eq!(attach["tag_ids"], json!(["t1", "t2"]));
    }

    #[test]
    fn test_attachment_diff_present_attaches_missing_only() {
        let attached: HashSet<String> = ["t1".to_string()].into_iter().collect();
        let desired = vec!["t1".to_string(), "t2".to_string()];
        let delta = attachment_diff(&attached, &desired, DesiredState::Present);
        assert_eq!(delta, vec!["t2".to_string()]);
    }

    #[test]
    fn test_attachment_diff_absent_detaches_attached_only() {
        let attached: HashSet<String> = ["t1".to_string()].into_iter().collect();
        let desired = vec!["t1".to_string(), "t2".to_string()];
        let delta = attachment_diff(&attached, &desired, DesiredState::Absent);
        assert_eq!(delta, vec!["t1".to_string()]);
    }

    #[test]
    fn test_attachment_diff_agreeing_sets_are_noops() {
        let attached: HashSet<String> = ["t1".to_string()].into_iter().collect();
        assert!(attachment_diff(&attached, &["t1".to_string()], DesiredState::Present).is_empty());
        assert!(attachment_diff(&attached, &["t9".to_string()], DesiredState::Absent).is_empty());
    }

    #[test]
    fn test_resolve_tag_ids() {
        let tags = vec![
            tag("t1", "backup", "c1"),
            tag("t2", "web", "c1"),
            tag("t3", "backup", "c2"),
        ];
        assert_eq!(
            resolve_tag_ids(&tags, &["web".to_string()]).unwrap(),
            vec!["t2".to_string()]
        );
        assert!(resolve_tag_ids(&tags, &["missing".to_string()]).is_err());
        // "backup" exists in two categories
        assert!(resolve_tag_ids(&tags, &["backup".to_string()]).is_err());
    }
}
