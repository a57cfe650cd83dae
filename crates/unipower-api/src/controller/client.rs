// Controller HTTP client
//
// Wraps `reqwest::Client` with controller-specific URL construction,
// envelope unwrapping, platform-aware path prefixing, and session
// management. Login is lazy: the first request authenticates, and an
// expired session is re-established at most once per failed request,
// serialized through a generation-counted mutex so concurrent callers
// do not stampede the login endpoint.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::controller::models::LegacyResponse;
use crate::controller::ControllerPlatform;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Session bookkeeping behind the login mutex.
///
/// `generation` increments on every successful login; a caller that saw
/// generation N only re-logs-in if it is still N, so a batch of requests
/// failing on the same expired cookie triggers a single re-auth.
#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    logged_in: bool,
    csrf_token: Option<String>,
}

/// HTTP client for the UniFi controller's legacy API.
///
/// Handles the `{ meta, data }` envelope, site-scoped URL construction,
/// and cookie-session authentication. Shared read-only across concurrent
/// requests; all mutable session state lives in the internal mutex.
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    platform: ControllerPlatform,
    username: String,
    password: SecretString,
    session: Mutex<SessionState>,
}

impl ControllerClient {
    /// Create a new controller client. No network traffic happens here;
    /// the session is established on first use.
    pub fn new(
        base_url: Url,
        site: String,
        platform: ControllerPlatform,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let jar = Arc::new(Jar::default());
        let http = transport.build_client(jar)?;
        Ok(Self {
            http,
            base_url,
            site,
            platform,
            username,
            password,
            session: Mutex::new(SessionState::default()),
        })
    }

    /// The current site identifier.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a site-scoped URL: `{base}{prefix}/api/s/{site}/{path}`
    ///
    /// All endpoints this client uses are site-scoped: stat/device,
    /// rest/device, cmd/devmgr.
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}{}/api/s/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.platform.legacy_prefix(),
            self.site,
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Session management ───────────────────────────────────────────

    /// Authenticate with the controller. Caller must hold the session lock.
    ///
    /// On success the session cookie lands in the client's cookie jar and
    /// the CSRF token (required for writes through the UniFi OS proxy) is
    /// captured from the response headers.
    async fn login_locked(&self, state: &mut SessionState) -> Result<(), Error> {
        let url = self.base_url.join(self.platform.login_path())?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        });

        let resp = self.http.post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        state.csrf_token = resp
            .headers()
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        state.generation += 1;
        state.logged_in = true;
        debug!(generation = state.generation, "login successful");
        Ok(())
    }

    /// Ensure a session exists, returning the generation it belongs to.
    async fn ensure_session(&self) -> Result<u64, Error> {
        let mut state = self.session.lock().await;
        if !state.logged_in {
            self.login_locked(&mut state).await?;
        }
        Ok(state.generation)
    }

    /// Re-authenticate after an expired-session failure.
    ///
    /// Skipped if another caller already refreshed the session since
    /// `seen_generation` was observed.
    async fn relogin(&self, seen_generation: u64) -> Result<(), Error> {
        let mut state = self.session.lock().await;
        if state.generation == seen_generation {
            debug!("session expired, re-authenticating");
            self.login_locked(&mut state).await?;
        }
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the legacy envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        self.execute(Method::GET, url, None::<&()>).await
    }

    /// Send a POST request with JSON body and unwrap the legacy envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Vec<T>, Error> {
        self.execute(Method::POST, url, Some(body)).await
    }

    /// Send a PUT request with JSON body and unwrap the legacy envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Vec<T>, Error> {
        self.execute(Method::PUT, url, Some(body)).await
    }

    /// Perform a request with lazy login and a single post-relogin retry.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl Serialize>,
    ) -> Result<Vec<T>, Error> {
        let generation = self.ensure_session().await?;

        match self.send_once(method.clone(), url.clone(), body).await {
            Err(e) if e.is_auth_expired() => {
                self.relogin(generation).await?;
                self.send_once(method, url, body).await
            }
            other => other,
        }
    }

    /// Single request/response cycle with envelope unwrapping.
    async fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&impl Serialize>,
    ) -> Result<Vec<T>, Error> {
        debug!("{} {}", method, url);

        let mut req = self.http.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(body);
        }
        if method != Method::GET {
            let state = self.session.lock().await;
            if let Some(ref token) = state.csrf_token {
                req = req.header("x-csrf-token", token);
            }
        }

        let resp = req.send().await?;
        self.parse_envelope(resp).await
    }

    /// Parse the `{ meta, data }` envelope, returning `data` on success
    /// or an error if `meta.rc != "ok"`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Vec<T>, Error> {
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await?;

        let envelope: LegacyResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        match envelope.meta.rc.as_str() {
            "ok" => Ok(envelope.data),
            _ => Err(Error::ControllerApi {
                message: envelope
                    .meta
                    .msg
                    .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
            }),
        }
    }
}
