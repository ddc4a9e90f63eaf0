//! vCenter REST client with session-based authentication.
//!
//! Logs in by exchanging basic-auth credentials for a session identifier at
//! `POST /rest/com/vmware/cis/session`; the identifier rides on every later
//! call in the `vmware-api-session-id` header and is deleted on logout.

use crate::error::{VmwareError, VmwareErrorKind, VmwareResult};
use crate::types::{CisValue, VmwareSettings};
use converge_core::warn_insecure;
use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Authenticated session against one vCenter.
pub struct VmwareClient {
    http: Client,
    base_url: String,
    session_id: String,
}

impl VmwareClient {
    /// Resolve settings, build the HTTP client, and create a session.
    pub async fn connect(settings: VmwareSettings) -> VmwareResult<Self> {
        let settings = settings.resolve()?;
        warn_insecure("vmware", settings.verify, settings.silent_tls_warnings);

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify)
            .build()
            .map_err(|e| VmwareError::connection(format!("Failed to build HTTP client: {e}")))?;

        let base_url = format!("https://{}/rest/", settings.host);
        let url = format!("{}com/vmware/cis/session", base_url);

        let resp = http
            .post(&url)
            .basic_auth(&settings.username, Some(&settings.password))
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(VmwareError::auth("Invalid credentials"));
        }
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VmwareError::api(
                status.as_u16(),
                format!("Login failed: {body}"),
            ));
        }

        let session: CisValue<String> = resp
            .json()
            .await
            .map_err(|e| VmwareError::parse(format!("Failed to parse session response: {e}")))?;

        info!("vCenter session opened on {}", settings.host);

        Ok(Self {
            http,
            base_url,
            session_id: session.value,
        })
    }

    /// Delete the session. Errors are ignored; the session expires anyway.
    pub async fn logout(self) {
        let url = format!("{}com/vmware/cis/session", self.base_url);
        let _ = self
            .http
            .delete(&url)
            .header("vmware-api-session-id", self.session_id.as_str())
            .send()
            .await;
        debug!("vCenter session closed");
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, url)
            .header("vmware-api-session-id", self.session_id.as_str())
    }

    async fn check_status(resp: Response, operation: &'static str) -> VmwareResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => Err(VmwareError::auth(format!(
                "{operation}: session expired or invalid: {body}"
            ))),
            StatusCode::FORBIDDEN => Err(VmwareError::new(
                VmwareErrorKind::AccessDenied,
                format!("{operation}: access denied: {body}"),
            )),
            StatusCode::NOT_FOUND => Err(VmwareError::not_found(format!(
                "{operation}: resource not found: {body}"
            ))),
            _ => Err(VmwareError::api(
                code,
                format!("{operation} failed with HTTP {code}: {body}"),
            )),
        }
    }

    /// GET an envelope-wrapped value.
    pub(crate) async fn get_value<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> VmwareResult<T> {
        debug!("vCenter GET {} ({})", path, operation);
        let resp = self.request(Method::GET, path).send().await?;
        let resp = Self::check_status(resp, operation).await?;
        let envelope: CisValue<T> = resp.json().await?;
        Ok(envelope.value)
    }

    /// GET with query parameters, returning an envelope-wrapped value.
    pub(crate) async fn get_value_query<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> VmwareResult<T> {
        debug!("vCenter GET {} {:?} ({})", path, query, operation);
        let resp = self.request(Method::GET, path).query(query).send().await?;
        let resp = Self::check_status(resp, operation).await?;
        let envelope: CisValue<T> = resp.json().await?;
        Ok(envelope.value)
    }

    /// POST a JSON body, returning the raw response for caller-specific
    /// status handling (tag create inspects 400 bodies).
    pub(crate) async fn post_raw<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> VmwareResult<Response> {
        debug!("vCenter POST {}", path);
        Ok(self.request(Method::POST, path).json(body).send().await?)
    }

    /// POST a JSON body, returning an envelope-wrapped value.
    pub(crate) async fn post_value<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> VmwareResult<T> {
        let resp = self.post_raw(path, body).await?;
        let resp = Self::check_status(resp, operation).await?;
        let envelope: CisValue<T> = resp.json().await?;
        Ok(envelope.value)
    }

    /// POST a JSON body, discarding the response body.
    pub(crate) async fn post_unit<B: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> VmwareResult<()> {
        let resp = self.post_raw(path, body).await?;
        Self::check_status(resp, operation).await?;
        Ok(())
    }

    /// DELETE, discarding the response body.
    pub(crate) async fn delete(&self, operation: &'static str, path: &str) -> VmwareResult<()> {
        debug!("vCenter DELETE {} ({})", path, operation);
        let resp = self.request(Method::DELETE, path).send().await?;
        Self::check_status(resp, operation).await?;
        Ok(())
    }
}
