use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::StoredTokens;

/// The token pair backing an authenticated session.
///
/// `access_token` is the short-lived bearer credential attached to API calls;
/// `refresh_token` is the longer-lived credential used solely to obtain a new
/// access token when the old one expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            created_at: Utc::now(),
        }
    }
}

impl From<StoredTokens> for SessionData {
    fn from(tokens: StoredTokens) -> Self {
        Self::new(tokens.access_token, tokens.refresh_token)
    }
}

/// Process-wide session state, shared by every clone of the API client.
///
/// Readers take the latest value at request send time; the API client is the
/// only writer. Replacing the pair invalidates the previous one for new
/// requests, but requests already in flight keep the token they were sent
/// with.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionData>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access token, if a session is held
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|d| d.access_token.clone())
    }

    /// Current refresh token, if a session is held
    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|d| d.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Copy of the full session state, for display or persistence
    pub fn snapshot(&self) -> Option<SessionData> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, data: SessionData) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(data);
    }

    pub(crate) fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
