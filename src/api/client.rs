//! HTTP client for the RemoteMatch REST API.
//!
//! `ApiClient` owns the request machinery shared by every endpoint wrapper:
//! it attaches the current access token to outgoing requests and
//! transparently recovers from access-token expiry. The first 401 seen by a
//! request triggers a refresh of the token pair and a single retry; a second
//! 401 is final. Concurrent 401s coalesce into one refresh call - whichever
//! request finds the coordinator idle performs the refresh, and everyone else
//! parks a completion handle that is settled when that one call finishes.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::auth::{Session, SessionData, StoredTokens, TokenStore};
use crate::config::Config;

use super::ApiError;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Outcome of a refresh call, broadcast to queued waiters. The error side
/// carries the rendered reason so each waiter can build its own error.
type RefreshOutcome = Result<String, String>;

/// Single-flight refresh coordinator.
///
/// `InFlight` holds the completion handles of requests that observed a 401
/// while the one refresh call was already outstanding. They are drained in a
/// single pass when it settles, before the coordinator returns to `Idle`, so
/// a second refresh can never start while waiters are pending.
enum RefreshState {
    Idle,
    InFlight(Vec<oneshot::Sender<RefreshOutcome>>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPairResponse {
    access_token: String,
    refresh_token: String,
}

/// API client for the RemoteMatch backend.
/// Clone is cheap - the connection pool, session, and refresh coordinator
/// are all shared behind `Arc`s, so clones observe the same session.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    session: Session,
    store: Arc<dyn TokenStore>,
    refresh: Arc<Mutex<RefreshState>>,
}

impl ApiClient {
    /// Create a new API client, seeding the session from the token store so
    /// a persisted session survives a process restart.
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;

        let session = Session::new();
        match store.load() {
            Ok(Some(tokens)) => session.set(SessionData::from(tokens)),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Failed to read stored tokens, starting signed out"),
        }

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout,
            session,
            store,
            refresh: Arc::new(Mutex::new(RefreshState::Idle)),
        })
    }

    /// Shared session state (read-only view for callers)
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Request machinery =====

    /// One physical send. Attaches the given bearer token if present and
    /// retries rate-limited responses with exponential backoff.
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(ApiError::from_transport)?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            retries += 1;
            if retries > MAX_RATE_LIMIT_RETRIES {
                return Err(ApiError::RateLimited);
            }
            warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms *= 2;
        }
    }

    /// Send an authenticated request, recovering once from access-token
    /// expiry.
    ///
    /// The current access token is read at send time, so requests issued
    /// after a refresh automatically pick up the new pair. On a 401 the
    /// client refreshes the token (or joins a refresh already in flight) and
    /// re-issues the request exactly once; a second 401 is surfaced as
    /// `Unauthorized`. Every other status is returned unchanged.
    pub(crate) async fn send_authed(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.session.access_token();
        let response = self
            .send_once(&method, path, query, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::check_response(response).await;
        }

        if self.session.refresh_token().is_none() {
            // Nothing to refresh with; the 401 is the final answer.
            return Err(ApiError::Unauthorized);
        }

        debug!(path, "Access token rejected, refreshing session");
        let fresh = self.refresh_access_token().await?;
        let retried = self
            .send_once(&method, path, query, body, Some(&fresh))
            .await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            // Already retried once with a fresh token; do not loop.
            return Err(ApiError::Unauthorized);
        }
        Self::check_response(retried).await
    }

    /// Check if a response is successful, returning an error with body if not.
    pub(crate) async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    pub(crate) async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    // ===== 401 recovery =====

    /// Obtain a fresh access token, coalescing concurrent callers into one
    /// network call.
    ///
    /// The caller that finds the coordinator idle performs the refresh and
    /// then drains every parked waiter with the outcome. Waiters remain
    /// subject to the per-request timeout: if it elapses first they fail with
    /// `Timeout` and their abandoned handle is discarded when the refresh
    /// settles.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let waiter = {
            let mut state = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                RefreshState::InFlight(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                RefreshState::Idle => {
                    *state = RefreshState::InFlight(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            debug!("Refresh already in flight, waiting for its outcome");
            return match tokio::time::timeout(self.timeout, rx).await {
                Ok(Ok(Ok(token))) => Ok(token),
                Ok(Ok(Err(reason))) => Err(ApiError::RefreshFailed(reason)),
                Ok(Err(_)) => Err(ApiError::RefreshFailed("refresh abandoned".to_string())),
                Err(_) => Err(ApiError::Timeout),
            };
        }

        let outcome = self.perform_refresh().await;

        // Drain every queued waiter atomically, then release the coordinator.
        let waiters = {
            let mut state = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::InFlight(waiters) => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        for tx in waiters {
            // A waiter that timed out has dropped its receiver; ignore it.
            let _ = tx.send(outcome.clone());
        }

        outcome.map_err(ApiError::RefreshFailed)
    }

    /// Call the refresh endpoint and rotate the session.
    ///
    /// Any failure here invalidates the session entirely: both credentials
    /// are cleared from memory and durable storage, forcing a fresh login.
    async fn perform_refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.session.refresh_token() else {
            return Err("no refresh token held".to_string());
        };

        let body = serde_json::json!({ "refreshToken": refresh_token });
        let sent = self
            .send_once(&Method::POST, "/auth/refresh", None, Some(&body), None)
            .await;

        let response = match sent {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let status = response.status();
                warn!(status = %status, "Token refresh rejected, clearing session");
                self.force_logout();
                return Err(format!("refresh rejected with status {}", status));
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, clearing session");
                self.force_logout();
                return Err(err.to_string());
            }
        };

        let tokens: TokenPairResponse = match response.json().await {
            Ok(tokens) => tokens,
            Err(err) => {
                self.force_logout();
                return Err(format!("undecodable refresh response: {}", err));
            }
        };

        debug!("Access token refreshed");
        let access = tokens.access_token.clone();
        self.install_session(&tokens.access_token, &tokens.refresh_token);
        Ok(access)
    }

    // ===== Session side effects =====

    /// Make the given pair the current session and persist it. Called on
    /// login, registration, and refresh. A storage failure is logged rather
    /// than propagated - the in-memory session is what requests use.
    pub(crate) fn install_session(&self, access_token: &str, refresh_token: &str) {
        self.session.set(SessionData::new(
            access_token.to_string(),
            refresh_token.to_string(),
        ));
        let stored = StoredTokens {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };
        if let Err(err) = self.store.persist(&stored) {
            warn!(error = %err, "Failed to persist tokens");
        }
    }

    /// Drop the session locally: clear the in-memory credentials and the
    /// durable slots. New requests go out unauthenticated afterwards.
    pub(crate) fn force_logout(&self) {
        self.session.clear();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear stored tokens");
        }
    }

    // ===== Typed helpers for the endpoint wrappers =====

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send_authed(Method::GET, path, None, None).await?;
        Self::parse_json(response).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .send_authed(Method::GET, path, Some(query), None)
            .await?;
        Self::parse_json(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .send_authed(Method::POST, path, None, Some(&body))
            .await?;
        Self::parse_json(response).await
    }

    /// POST without a body, decoding the response
    pub(crate) async fn post_no_body<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send_authed(Method::POST, path, None, None).await?;
        Self::parse_json(response).await
    }

    /// POST without a body, ignoring the response payload
    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send_authed(Method::POST, path, None, None)
            .await
            .map(|_| ())
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .send_authed(Method::PUT, path, None, Some(&body))
            .await?;
        Self::parse_json(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_authed(Method::DELETE, path, None, None)
            .await
            .map(|_| ())
    }

    /// Unauthenticated send for the login/registration/password-reset
    /// endpoints. These never attach a bearer token and never enter the 401
    /// recovery protocol - a 401 from login is a final answer, not an expiry.
    pub(crate) async fn send_anonymous(
        &self,
        method: Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.send_once(&method, path, None, Some(body), None).await?;
        Self::check_response(response).await
    }
}
