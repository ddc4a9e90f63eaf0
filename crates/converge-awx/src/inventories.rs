//! Inventory lookup, traversal, and reconciliation.

use crate::client::AwxClient;
use crate::error::AwxResult;
use crate::types::{AwxGroup, AwxHost, AwxSettings, Inventory, Page};
use converge_core::{Action, DesiredState, Outcome};
use log::debug;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashMap;

/// Page size used when walking list endpoints.
const PAGE_SIZE: &str = "10";

impl AwxClient {
    /// Look up an inventory by exact (case-insensitive) name.
    pub async fn find_inventory(&self, name: &str) -> AwxResult<Option<Inventory>> {
        let page: Page<Inventory> = self
            .get_json_query(
                "get_inventory_by_name",
                "inventories/",
                &[("name__iexact", name)],
            )
            .await?;
        Ok(page.results.into_iter().next())
    }

    /// Create an inventory under an organization.
    pub async fn create_inventory(
        &self,
        name: &str,
        description: &str,
        organization: i64,
    ) -> AwxResult<Inventory> {
        let payload = json!({
            "name": name,
            "description": description,
            "organization": organization,
        });
        self.post_json(
            "create_inventory",
            "inventories/",
            &payload,
            StatusCode::CREATED,
        )
        .await
    }

    /// Delete an inventory by id.
    pub async fn delete_inventory(&self, id: i64) -> AwxResult<()> {
        let path = format!("inventories/{}/", id);
        self.delete("delete_inventory", &path).await
    }

    /// All inventories whose variables contain the given needle, across
    /// every page.
    pub async fn list_inventories_with_variables(
        &self,
        needle: &str,
    ) -> AwxResult<Vec<Inventory>> {
        self.get_all_pages(
            "get_inventories",
            "inventories/",
            &[("page_size", PAGE_SIZE), ("variables__contains", needle)],
        )
        .await
    }

    /// Groups of an inventory.
    pub async fn inventory_groups(&self, inventory_id: i64) -> AwxResult<Vec<AwxGroup>> {
        let path = format!("inventories/{}/groups/", inventory_id);
        let page: Page<AwxGroup> = self.get_json("get_inventory_groups", &path).await?;
        Ok(page.results)
    }

    /// Hosts of a group.
    pub async fn group_hosts(&self, group_id: i64) -> AwxResult<Vec<AwxHost>> {
        let path = format!("groups/{}/hosts/", group_id);
        let page: Page<AwxHost> = self.get_json("get_inventory_group_hosts", &path).await?;
        Ok(page.results)
    }

    /// Variable data of a group.
    pub async fn group_variables(&self, group_id: i64) -> AwxResult<serde_json::Value> {
        let path = format!("groups/{}/variable_data/", group_id);
        self.get_json("get_inventory_group_vars", &path).await
    }

    /// Hostnames of every deployment inventory, keyed by the `os_type`
    /// group variable. Groups without hosts or without an `os_type` are
    /// skipped.
    pub async fn deployment_hosts(&self) -> AwxResult<HashMap<String, Vec<String>>> {
        let mut deployments: HashMap<String, Vec<String>> = HashMap::new();
        let inventories = self
            .list_inventories_with_variables("'deployment_owner'")
            .await?;

        for inventory in inventories {
            for group in self.inventory_groups(inventory.id).await? {
                let hosts = self.group_hosts(group.id).await?;
                if hosts.is_empty() {
                    continue;
                }
                let vars = self.group_variables(group.id).await?;
                let Some(os_type) = vars.get("os_type").and_then(|v| v.as_str()) else {
                    debug!("group {} has hosts but no os_type, skipping", group.name);
                    continue;
                };
                deployments
                    .entry(os_type.to_string())
                    .or_default()
                    .extend(hosts.into_iter().map(|h| h.name));
            }
        }

        Ok(deployments)
    }
}

/// Reconcile an inventory to the requested state.
pub async fn ensure_inventory(
    settings: AwxSettings,
    name: &str,
    description: &str,
    organization: i64,
    state: DesiredState,
    check_mode: bool,
) -> AwxResult<Outcome<Inventory>> {
    let client = AwxClient::connect(settings)?;
    let existing = client.find_inventory(name).await?;

    match Action::plan(existing.is_some(), state) {
        Action::Create => {
            if check_mode {
                return Ok(Outcome::changed(None));
            }
            let created = client
                .create_inventory(name, description, organization)
                .await?;
            Ok(Outcome::changed(Some(created)))
        }
        Action::Delete => {
            if check_mode {
                return Ok(Outcome::changed(existing));
            }
            if let Some(ref inventory) = existing {
                client.delete_inventory(inventory.id).await?;
            }
            Ok(Outcome::changed(None))
        }
        Action::Nothing => Ok(Outcome::unchanged(existing)),
    }
}
