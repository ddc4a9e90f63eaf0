//! HTTP transport for the AWX API.
//!
//! All calls go to `https://{endpoint}/api/v2/` with a bearer token. List
//! endpoints return paged envelopes whose `next` field is a server-relative
//! path; `get_all_pages` follows it until exhausted.

use crate::error::{AwxError, AwxResult};
use crate::types::{AwxSettings, Page};
use converge_core::warn_insecure;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Authenticated client for one AWX controller.
pub struct AwxClient {
    http: Client,
    /// `https://{endpoint}` — used to absolutise `next` page paths.
    origin: String,
    /// `https://{endpoint}/api/v2/`
    base_url: String,
}

impl AwxClient {
    /// Resolve settings and build the client. No login call is needed;
    /// the bearer token authenticates every request.
    pub fn connect(settings: AwxSettings) -> AwxResult<Self> {
        let settings = settings.resolve()?;
        warn_insecure("awx", settings.verify, settings.silent_tls_warnings);

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", settings.token);
        let value = HeaderValue::from_str(&bearer).map_err(|_| {
            AwxError::AuthenticationFailed("token contains invalid header characters".into())
        })?;
        headers.insert(AUTHORIZATION, value);

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify)
            .default_headers(headers)
            .build()
            .map_err(|e| AwxError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let origin = format!("https://{}", settings.endpoint);
        info!("AWX client created for {}", origin);

        Ok(Self {
            base_url: format!("{}/api/v2/", origin),
            origin,
            http,
        })
    }

    /// Connectivity probe against the unauthenticated `ping` endpoint.
    pub async fn ping(&self) -> AwxResult<bool> {
        let url = format!("{}ping/", self.base_url);
        let resp = self.http.get(&url).send().await?;
        Ok(resp.status().is_success())
    }

    async fn check(
        resp: reqwest::Response,
        operation: &'static str,
    ) -> AwxResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AwxError::AuthenticationFailed(message));
        }
        Err(AwxError::Api {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    /// GET a JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> AwxResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("AWX GET {} ({})", url, operation);
        let resp = self.http.get(&url).send().await?;
        let resp = Self::check(resp, operation).await?;
        Ok(resp.json().await?)
    }

    /// GET a JSON document with query parameters.
    pub(crate) async fn get_json_query<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> AwxResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("AWX GET {} {:?} ({})", url, query, operation);
        let resp = self.http.get(&url).query(query).send().await?;
        let resp = Self::check(resp, operation).await?;
        Ok(resp.json().await?)
    }

    /// POST a JSON body, expecting the given status.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
        expected: StatusCode,
    ) -> AwxResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("AWX POST {} ({})", url, operation);
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        if status != expected {
            let message = resp.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                return Err(AwxError::AuthenticationFailed(message));
            }
            return Err(AwxError::Api {
                operation,
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }

    /// DELETE, accepting any success status.
    pub(crate) async fn delete(&self, operation: &'static str, path: &str) -> AwxResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("AWX DELETE {} ({})", url, operation);
        let resp = self.http.delete(&url).send().await?;
        Self::check(resp, operation).await?;
        Ok(())
    }

    /// Fetch every page of a list endpoint, following `next` links.
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> AwxResult<Vec<T>> {
        let mut page: Page<T> = self.get_json_query(operation, path, query).await?;
        let mut results = std::mem::take(&mut page.results);

        while let Some(next) = page.next.take() {
            // `next` is server-relative: /api/v2/...?page=N
            let url = format!("{}{}", self.origin, next);
            debug!("AWX GET {} ({}, next page)", url, operation);
            let resp = self.http.get(&url).send().await?;
            let resp = Self::check(resp, operation).await?;
            page = resp.json().await?;
            results.extend(std::mem::take(&mut page.results));
        }

        Ok(results)
    }
}
