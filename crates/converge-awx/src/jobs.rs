//! Job template launching and completion polling.

use crate::client::AwxClient;
use crate::error::{AwxError, AwxResult};
use crate::types::{Credential, Job, JobOutcome, JobTemplate, Page};
use log::{debug, info};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Everything needed to launch a job template.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Job template name.
    pub template: String,
    /// Inventory name to run against, if overriding the template default.
    pub inventory: Option<String>,
    /// Credential names to attach.
    pub credentials: Vec<String>,
    /// Extra variables passed through to the job.
    pub extra_vars: Option<Value>,
}

/// Wire payload for a launch request.
pub fn launch_payload(
    inventory_id: Option<i64>,
    credential_ids: &[i64],
    extra_vars: Option<&Value>,
) -> Value {
    let mut payload = json!({});
    if let Some(vars) = extra_vars {
        payload["extra_vars"] = vars.clone();
    }
    if !credential_ids.is_empty() {
        payload["credentials"] = json!(credential_ids);
    }
    if let Some(id) = inventory_id {
        payload["inventory_id"] = json!(id);
    }
    payload
}

impl AwxClient {
    /// Look up a job template by exact (case-insensitive) name.
    pub async fn find_template(&self, name: &str) -> AwxResult<Option<JobTemplate>> {
        let page: Page<JobTemplate> = self
            .get_json_query("get_template", "job_templates/", &[("name__iexact", name)])
            .await?;
        Ok(page.results.into_iter().next())
    }

    /// Look up a credential by exact (case-insensitive) name.
    pub async fn find_credential(&self, name: &str) -> AwxResult<Option<Credential>> {
        let page: Page<Credential> = self
            .get_json_query("get_credential", "credentials/", &[("name__iexact", name)])
            .await?;
        Ok(page.results.into_iter().next())
    }

    /// Launch a job template, resolving inventory and credential names.
    pub async fn launch_job(&self, spec: &LaunchSpec) -> AwxResult<Job> {
        let template = self
            .find_template(&spec.template)
            .await?
            .ok_or_else(|| AwxError::not_found("job template", &spec.template))?;

        let mut credential_ids = Vec::with_capacity(spec.credentials.len());
        for name in &spec.credentials {
            let credential = self
                .find_credential(name)
                .await?
                .ok_or_else(|| AwxError::not_found("credential", name))?;
            credential_ids.push(credential.id);
        }

        let inventory_id = match &spec.inventory {
            Some(name) => Some(
                self.find_inventory(name)
                    .await?
                    .ok_or_else(|| AwxError::not_found("inventory", name))?
                    .id,
            ),
            None => None,
        };

        let payload = launch_payload(inventory_id, &credential_ids, spec.extra_vars.as_ref());
        let path = format!("job_templates/{}/launch/", template.id);
        let job: Job = self
            .post_json("launch_job", &path, &payload, StatusCode::CREATED)
            .await?;
        info!("launched job {} from template '{}'", job.id, spec.template);
        Ok(job)
    }

    /// Current state of a job.
    pub async fn job(&self, job_id: i64) -> AwxResult<Job> {
        let path = format!("jobs/{}/", job_id);
        self.get_json("get_job", &path).await
    }

    /// Poll a job until it reaches a terminal state or the timeout elapses.
    ///
    /// Blocking, cooperative waiting: sleeps `interval` between polls. A
    /// timeout is an error; a job that terminally failed is a normal
    /// `JobOutcome::Failed`.
    pub async fn wait_for_job(
        &self,
        job_id: i64,
        timeout: Duration,
        interval: Duration,
    ) -> AwxResult<JobOutcome> {
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            let job = self.job(job_id).await?;
            if let Some(outcome) = JobOutcome::from_status(&job.status) {
                return Ok(outcome);
            }
            debug!("job {} is {}, polling again", job_id, job.status);
            tokio::time::sleep(interval).await;
        }

        Err(AwxError::JobTimeout {
            job_id,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_payload_empty() {
        let payload = launch_payload(None, &[], None);
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn test_launch_payload_full() {
        let vars = json!({"release": "1.4.2"});
        let payload = launch_payload(Some(7), &[3, 9], Some(&vars));
        assert_eq!(payload["inventory_id"], 7);
        assert_eq!(payload["credentials"], json!([3, 9]));
        assert_eq!(payload["extra_vars"]["release"], "1.4.2");
    }

    #[test]
    fn test_launch_payload_omits_empty_credentials() {
        let payload = launch_payload(Some(7), &[], None);
        assert!(payload.get("credentials").is_none());
        assert!(payload.get("extra_vars").is_none());
    }
}
