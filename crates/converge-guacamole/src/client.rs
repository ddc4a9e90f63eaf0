//! HTTP transport for the Guacamole API.
//!
//! Authenticates against `POST /api/tokens` and attaches the returned auth
//! token as a `token` query parameter on every data call, the way the
//! gateway expects. Data endpoints live under
//! `/api/session/data/{data_source}/`.

use crate::error::{GuacError, GuacResult};
use crate::types::{GuacSettings, TokenResponse};
use converge_core::warn_insecure;
use log::{debug, info};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Authenticated session against one Guacamole gateway.
pub struct GuacClient {
    http: Client,
    host: String,
    data_source: String,
    token: String,
}

impl GuacClient {
    /// Resolve settings, open an HTTP client, and log in.
    pub async fn login(settings: GuacSettings) -> GuacResult<Self> {
        let settings = settings.resolve()?;
        warn_insecure(
            "guacamole",
            settings.verify,
            settings.silent_tls_warnings,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify)
            .build()
            .map_err(|e| GuacError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        let url = format!("https://{}/api/tokens", settings.host);
        let resp = http
            .post(&url)
            .form(&[
                ("username", settings.username.as_str()),
                ("password", settings.password.as_str()),
            ])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(GuacError::AuthenticationFailed(
                "provided credentials were rejected".to_string(),
            ));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GuacError::ParseError(format!("Failed to parse token response: {}", e)))?;

        info!("Guacamole session opened on {}", settings.host);

        Ok(Self {
            http,
            host: settings.host,
            data_source: settings.data_source,
            token: token.auth_token,
        })
    }

    /// Invalidate the auth token. Errors are ignored; the session is gone
    /// either way.
    pub async fn logout(self) {
        let url = format!("https://{}/api/tokens/{}", self.host, self.token);
        let _ = self.http.delete(&url).send().await;
        debug!("Guacamole session on {} closed", self.host);
    }

    /// Percent-encode a single path segment (identifiers may contain
    /// spaces or slashes).
    pub(crate) fn encode_segment(segment: &str) -> String {
        utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "https://{}/api/session/data/{}/{}",
            self.host, self.data_source, path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.data_url(path))
            .query(&[("token", self.token.as_str())])
    }

    async fn expect(
        resp: Response,
        operation: &'static str,
        expected: StatusCode,
    ) -> GuacResult<Response> {
        let status = resp.status();
        if status == expected {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(GuacError::Api {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    /// GET a JSON document, expecting 200.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> GuacResult<T> {
        debug!("Guacamole GET {} ({})", path, operation);
        let resp = self.request(Method::GET, path).send().await?;
        let resp = Self::expect(resp, operation, StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    /// GET a JSON document, mapping 404 to `None`.
    pub(crate) async fn get_json_opt<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> GuacResult<Option<T>> {
        debug!("Guacamole GET {} ({})", path, operation);
        let resp = self.request(Method::GET, path).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::expect(resp, operation, StatusCode::OK).await?;
        Ok(Some(resp.json().await?))
    }

    /// POST a JSON body, expecting 200 with a JSON response.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> GuacResult<T> {
        debug!("Guacamole POST {} ({})", path, operation);
        let resp = self.request(Method::POST, path).json(body).send().await?;
        let resp = Self::expect(resp, operation, StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    /// PATCH a JSON body, expecting 204.
    pub(crate) async fn patch(
        &self,
        operation: &'static str,
        path: &str,
        body: &serde_json::Value,
    ) -> GuacResult<()> {
        debug!("Guacamole PATCH {} ({})", path, operation);
        let resp = self.request(Method::PATCH, path).json(body).send().await?;
        Self::expect(resp, operation, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    /// DELETE, expecting 204.
    pub(crate) async fn delete(&self, operation: &'static str, path: &str) -> GuacResult<()> {
        debug!("Guacamole DELETE {} ({})", path, operation);
        let resp = self.request(Method::DELETE, path).send().await?;
        Self::expect(resp, operation, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_segment() {
        assert_eq!(GuacClient::encode_segment("operators"), "operators");
        assert_eq!(GuacClient::encode_segment("ops team"), "ops%20team");
        assert_eq!(GuacClient::encode_segment("a/b"), "a%2Fb");
    }
}
