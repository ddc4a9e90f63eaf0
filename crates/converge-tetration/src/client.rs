//! Session lifecycle and CSRF-protected requests.
//!
//! Sign-in flow:
//! 1. `GET /h4_users/sign_in` — scrape the form's `authenticity_token`
//! 2. `POST /h4_users/sign_in` — submit the form; the session cookie lands
//!    in the cookie store
//! 3. `GET /current_user.json?concise=true` — confirm the session and read
//!    scope preferences
//! 4. `GET /` — refresh the CSRF token from the `csrf-token` meta tag
//!
//! A 422 on a mutating call means the CSRF token went stale; it is
//! refreshed once and the call retried.

use crate::error::{TetError, TetErrorKind, TetResult};
use crate::types::{CurrentUser, Preferences, PreferencesEnvelope, TetSettings};
use converge_core::warn_insecure;
use log::{debug, info};
use regex::Regex;
use reqwest::header::{ACCEPT, REFERER};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

const JSON_ACCEPT: &str = "application/json, text/plain, */*";

/// Scrape the sign-in form's hidden `authenticity_token` input.
pub(crate) fn extract_form_token(html: &str) -> Option<String> {
    let re = Regex::new(r#"name="authenticity_token"[^>]*value="([^"]*)""#).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scrape the `csrf-token` meta tag of an application page.
pub(crate) fn extract_meta_token(html: &str) -> Option<String> {
    let re = Regex::new(r#"name="csrf-token"[^>]*content="([^"]*)""#).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Authenticated cookie session against one site.
pub struct TetClient {
    http: Client,
    site: String,
    csrf_token: String,
    user: CurrentUser,
}

impl TetClient {
    /// Resolve settings and run the full sign-in flow.
    pub async fn login(settings: TetSettings) -> TetResult<Self> {
        let settings = settings.resolve()?;
        warn_insecure(
            "tetration",
            settings.verify,
            settings.silent_tls_warnings,
        );

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify)
            .cookie_store(true)
            .build()
            .map_err(|e| TetError::network(format!("Failed to build HTTP client: {}", e)))?;

        let sign_in_url = format!("https://{}/h4_users/sign_in", settings.site);

        let page = http.get(&sign_in_url).send().await?.text().await?;
        let token = extract_form_token(&page)
            .ok_or_else(|| TetError::csrf("sign-in form has no authenticity token"))?;

        let form = [
            ("authenticity_token", token.as_str()),
            ("h4_user[email]", settings.email.as_str()),
            ("h4_user[password]", settings.password.as_str()),
            ("h4_user[otp_attempt]", ""),
            ("h4_user[remember_me]", "0"),
            ("commit", "Sign in"),
            ("utf8", "\u{2713}"),
        ];

        let resp = http
            .post(&sign_in_url)
            .header(REFERER, &sign_in_url)
            .header(ACCEPT, JSON_ACCEPT)
            .form(&form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TetError::auth(format!(
                "sign-in returned HTTP {}",
                resp.status()
            )));
        }

        let mut client = Self {
            http,
            site: settings.site,
            csrf_token: token,
            user: CurrentUser {
                id: serde_json::Value::Null,
                preferences: Preferences::default(),
                extra: Default::default(),
            },
        };

        // A rejected login still answers 200 with the sign-in page; the
        // session is only real if the user document is served.
        let user: CurrentUser = client
            .get_json("/current_user.json?concise=true")
            .await
            .map_err(|_| TetError::auth("credentials were not accepted"))?;
        client.user = user;

        client.refresh_csrf().await?;
        info!("web-UI session opened on {}", client.site);
        Ok(client)
    }

    /// The signed-in user document captured at login.
    pub fn current_user(&self) -> &CurrentUser {
        &self.user
    }

    /// Workspace scope preferences as last observed.
    pub fn preferences(&self) -> &Preferences {
        &self.user.preferences
    }

    /// Re-read the CSRF token from the application page's meta tag.
    pub async fn refresh_csrf(&mut self) -> TetResult<()> {
        let url = format!("https://{}/", self.site);
        let page = self.http.get(&url).send().await?.text().await?;
        self.csrf_token = extract_meta_token(&page)
            .ok_or_else(|| TetError::csrf("application page has no csrf-token meta tag"))?;
        debug!("refreshed CSRF token");
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("https://{}{}", self.site, path);
        self.http
            .request(method, url)
            .header("X-CSRF-Token", self.csrf_token.as_str())
            .header(ACCEPT, JSON_ACCEPT)
    }

    async fn handle<T: DeserializeOwned>(
        resp: reqwest::Response,
        operation: &str,
    ) -> TetResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        let message = resp.text().await.unwrap_or_default();
        let kind = match status {
            StatusCode::UNAUTHORIZED => TetErrorKind::SessionExpired,
            StatusCode::UNPROCESSABLE_ENTITY => TetErrorKind::Csrf,
            StatusCode::NOT_FOUND => TetErrorKind::NotFound,
            _ => TetErrorKind::Api,
        };
        Err(TetError::with_status(
            kind,
            status.as_u16(),
            format!("{operation}: {message}"),
        ))
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TetResult<T> {
        debug!("web-UI GET {}", path);
        let resp = self.request(Method::GET, path).send().await?;
        Self::handle(resp, path).await
    }

    /// PUT a JSON body.
    pub async fn put_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TetResult<T> {
        debug!("web-UI PUT {}", path);
        let resp = self.request(Method::PUT, path).json(body).send().await?;
        Self::handle(resp, path).await
    }

    /// Switch the session's workspace scope.
    ///
    /// Returns whether the active scope actually changed. A stale CSRF
    /// token (422) is refreshed once and the call retried.
    pub async fn set_scope(&mut self, scope_id: &str) -> TetResult<bool> {
        let before = self.user.preferences.app_scope.clone();
        let payload = json!({ "value": scope_id });
        let path = "/api/preferences/app_scope_id.json";

        let envelope: PreferencesEnvelope = match self.put_json(path, &payload).await {
            Err(e) if e.kind == TetErrorKind::Csrf => {
                self.refresh_csrf().await?;
                self.put_json(path, &payload).await?
            }
            other => other?,
        };

        self.user.preferences = envelope.preferences;
        Ok(before != self.user.preferences.app_scope)
    }

    /// Close the session: notebook-hub sign-out first, then the main
    /// logout. Errors are ignored; the cookie dies with the client.
    pub async fn logout(self) {
        let hub = format!("https://{}/lab/nbs/hub/h4_nb_logout", self.site);
        let _ = self
            .http
            .post(&hub)
            .header("X-CSRF-Token", self.csrf_token.as_str())
            .header(ACCEPT, JSON_ACCEPT)
            .send()
            .await;
        let url = format!("https://{}/logout", self.site);
        let _ = self
            .http
            .post(&url)
            .header("X-CSRF-Token", self.csrf_token.as_str())
            .send()
            .await;
        debug!("web-UI session on {} closed", self.site);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_form_token() {
        let html = r#"<form action="/h4_users/sign_in" method="post">
            <input type="hidden" name="authenticity_token" value="abc123==" />
        </form>"#;
        assert_eq!(extract_form_token(html).as_deref(), Some("abc123=="));
    }

    #[test]
    fn test_extract_form_token_missing() {
        assert!(extract_form_token("<form></form>").is_none());
    }

    #[test]
    fn test_extract_meta_token() {
        let html = r#"<head><meta name="csrf-token" content="tok/9+x=" /></head>"#;
        assert_eq!(extract_meta_token(html).as_deref(), Some("tok/9+x="));
    }

    #[test]
    fn test_meta_token_ignores_other_meta_tags() {
        let html = r#"<meta name="description" content="nope">
                      <meta name="csrf-token" content="real">"#;
        assert_eq!(extract_meta_token(html).as_deref(), Some("real"));
    }
}
