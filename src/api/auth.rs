//! Authentication endpoints: login, registration, session refresh, logout.

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::User;

use super::{ApiClient, ApiError};

/// Payload returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl ApiClient {
    /// Log in with email and password. On success the returned token pair
    /// becomes the current session and is persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .send_anonymous(Method::POST, "/auth/login", &body)
            .await?;
        let auth: AuthResponse = Self::parse_json(response).await?;
        self.install_session(&auth.access_token, &auth.refresh_token);
        debug!(email, "Logged in");
        Ok(auth)
    }

    /// Create an account. Like login, a successful registration starts a
    /// session immediately.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .send_anonymous(Method::POST, "/auth/register", &body)
            .await?;
        let auth: AuthResponse = Self::parse_json(response).await?;
        self.install_session(&auth.access_token, &auth.refresh_token);
        debug!(email, "Registered");
        Ok(auth)
    }

    /// Fetch the account behind the current session
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    /// Log out. The server call is best-effort: local session state is
    /// cleared even if it fails, so the user always ends up signed out.
    pub async fn logout(&self) {
        if let Err(err) = self.post_empty("/auth/logout").await {
            warn!(error = %err, "Logout request failed, clearing session anyway");
        }
        self.force_logout();
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email });
        self.send_anonymous(Method::POST, "/auth/forgot-password", &body)
            .await
            .map(|_| ())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "token": token, "password": password });
        self.send_anonymous(Method::POST, "/auth/reset-password", &body)
            .await
            .map(|_| ())
    }
}
