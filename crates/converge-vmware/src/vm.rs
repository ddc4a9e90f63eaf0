//! Virtual machine lookup.

use crate::client::VmwareClient;
use crate::error::{VmwareError, VmwareResult};
use crate::types::VmSummary;

impl VmwareClient {
    /// VMs matching a name filter.
    pub async fn find_vms_by_name(&self, name: &str) -> VmwareResult<Vec<VmSummary>> {
        self.get_value_query("get_vm_by_name", "vcenter/vm", &[("filter.names.1", name)])
            .await
    }

    /// The single VM with the given name.
    ///
    /// Zero matches and multiple matches are both errors: tag operations
    /// must never guess which machine was meant.
    pub async fn get_vm_by_name(&self, name: &str) -> VmwareResult<VmSummary> {
        let mut matches = self.find_vms_by_name(name).await?;
        match matches.len() {
            0 => Err(VmwareError::not_found(format!(
                "Unable to find vm named: {name}"
            ))),
            1 => Ok(matches.remove(0)),
            n => Err(VmwareError::ambiguous(format!(
                "{n} matches found for vm name: {name}"
            ))),
        }
    }
}
