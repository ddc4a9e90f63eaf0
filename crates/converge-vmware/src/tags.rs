//! Tag category and tag management.
//!
//! The CIS tagging API lists ids only; full objects are fetched one by one.
//! Trees are small and re-read on every reconcile.

use crate::client::VmwareClient;
use crate::error::{VmwareError, VmwareResult};
use crate::types::{Category, CisErrorBody, CisValue, Tag, VmwareSettings};
use converge_core::{Action, DesiredState, Outcome};
use log::debug;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub(crate) const TAGGING: &str = "com/vmware/cis/tagging";

/// Wire payload for a tag create call.
pub fn tag_create_spec(category_id: &str, name: &str, description: &str) -> Value {
    json!({
        "create_spec": {
            "category_id": category_id,
            "name": name,
            "description": description,
        }
    })
}

impl VmwareClient {
    /// All tag categories.
    pub async fn list_categories(&self) -> VmwareResult<Vec<Category>> {
        let ids: Vec<String> = self
            .get_value("get_categories", &format!("{TAGGING}/category"))
            .await?;
        let mut categories = Vec::with_capacity(ids.len());
        for id in ids {
            let category: Category = self
                .get_value("get_categories", &format!("{TAGGING}/category/id:{id}"))
                .await?;
            categories.push(category);
        }
        Ok(categories)
    }

    /// Look up a category by name.
    pub async fn find_category(&self, name: &str) -> VmwareResult<Option<Category>> {
        let categories = self.list_categories().await?;
        Ok(categories.into_iter().find(|c| c.name == name))
    }

    /// All tags, across every category.
    pub async fn list_tags(&self) -> VmwareResult<Vec<Tag>> {
        let ids: Vec<String> = self.get_value("get_tags", &format!("{TAGGING}/tag")).await?;
        let mut tags = Vec::with_capacity(ids.len());
        for id in ids {
            let tag: Tag = self
                .get_value("get_tags", &format!("{TAGGING}/tag/id:{id}"))
                .await?;
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Look up a tag by name within a category.
    pub async fn find_tag(&self, category_id: &str, name: &str) -> VmwareResult<Option<Tag>> {
        let tags = self.list_tags().await?;
        Ok(tags
            .into_iter()
            .find(|t| t.category_id == category_id && t.name == name))
    }

    /// Create a tag in a category.
    ///
    /// Returns `None` when the server reports the tag already exists — the
    /// caller re-reads instead of failing.
    pub async fn create_tag(
        &self,
        category_id: &str,
        name: &str,
        description: &str,
    ) -> VmwareResult<Option<Tag>> {
        let payload = tag_create_spec(category_id, name, description);
        let resp = self.post_raw(&format!("{TAGGING}/tag"), &payload).await?;

        if resp.status() == StatusCode::BAD_REQUEST {
            let body = resp.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<CisErrorBody>(&body) {
                if error.is_already_exists() {
                    debug!("tag '{}' already exists in {}", name, category_id);
                    return Ok(None);
                }
            }
            return Err(VmwareError::api(400, format!("create_tag failed: {body}")));
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VmwareError::api(
                status.as_u16(),
                format!("create_tag failed: {body}"),
            ));
        }

        let id: CisValue<String> = resp.json().await?;
        Ok(Some(Tag {
            id: id.value,
            name: name.to_string(),
            description: description.to_string(),
            category_id: category_id.to_string(),
            extra: Default::default(),
        }))
    }

    /// Delete a tag by id.
    pub async fn delete_tag(&self, tag_id: &str) -> VmwareResult<()> {
        self.delete("delete_tag", &format!("{TAGGING}/tag/id:{tag_id}"))
            .await
    }
}

/// Reconcile a tag within a category to the requested state.
///
/// The category must already exist; it is looked up by name on every call.
pub async fn ensure_tag(
    settings: VmwareSettings,
    category: &str,
    name: &str,
    description: &str,
    state: DesiredState,
    check_mode: bool,
) -> VmwareResult<Outcome<Tag>> {
    let client = VmwareClient::connect(settings).await?;
    let result = reconcile_tag(&client, category, name, description, state, check_mode).await;
    client.logout().await;
    result
}

async fn reconcile_tag(
    client: &VmwareClient,
    category: &str,
    name: &str,
    description: &str,
    state: DesiredState,
    check_mode: bool,
) -> VmwareResult<Outcome<Tag>> {
    let category = client
        .find_category(category)
        .await?
        .ok_or_else(|| VmwareError::not_found(format!("category '{category}' not found")))?;

    let existing = client.find_tag(&category.id, name).await?;

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            match client.create_tag(&category.id, name, description).await? {
                Some(tag) => Ok(Outcome::changed(Some(tag))),
                // Appeared between the lookup and the create; converged
                // without us doing anything.
                None => Ok(Outcome::unchanged(
                    client.find_tag(&category.id, name).await?,
                )),
            }
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            if let Some(ref tag) = existing {
                client.delete_tag(&tag.id).await?;
            }
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_create_spec_shape() {
        let spec = tag_create_spec("urn:cat-1", "backup-nightly", "nightly backup set");
        assert_eq!(spec["create_spec"]["category_id"], "urn:cat-1");
        assert_eq!(spec["create_spec"]["name"], "backup-nightly");
        assert_eq!(spec["create_spec"]["description"], "nightly backup set");
    }
}
