use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};

/// Token file name in the data directory
const TOKENS_FILE: &str = "tokens.json";

/// Keychain service name
const KEYRING_SERVICE: &str = "remotematch";

/// Keychain slot holding the access token
const ACCESS_SLOT: &str = "access-token";

/// Keychain slot holding the refresh token
const REFRESH_SLOT: &str = "refresh-token";

/// The two credential slots persisted across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Durable storage for the session's token pair.
///
/// Exactly three operations: read at startup to seed the session, persist on
/// login/registration/refresh, clear on logout or refresh failure. In-flight
/// requests never read the store; the in-memory session is authoritative.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredTokens>>;
    fn persist(&self, tokens: &StoredTokens) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed store: a JSON file under the application data directory.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn tokens_path(&self) -> PathBuf {
        self.dir.join(TOKENS_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        let path = self.tokens_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let tokens = serde_json::from_str(&contents).context("Failed to parse token file")?;
        Ok(Some(tokens))
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create data directory")?;
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(self.tokens_path(), contents).context("Failed to write token file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.tokens_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

/// OS keychain store via `keyring`, one entry per slot.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    fn entry(&self, slot: &str) -> Result<Entry> {
        Entry::new(&self.service, slot).context("Failed to create keyring entry")
    }

    fn read_slot(&self, slot: &str) -> Result<Option<String>> {
        match self.entry(slot)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err).context("Failed to read keychain entry"),
        }
    }

    fn delete_slot(&self, slot: &str) -> Result<()> {
        match self.entry(slot)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err).context("Failed to delete keychain entry"),
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        // The pair is only meaningful together; a lone slot is treated as absent.
        let access = self.read_slot(ACCESS_SLOT)?;
        let refresh = self.read_slot(REFRESH_SLOT)?;
        match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Ok(Some(StoredTokens {
                access_token,
                refresh_token,
            })),
            _ => Ok(None),
        }
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        self.entry(ACCESS_SLOT)?
            .set_password(&tokens.access_token)
            .context("Failed to store access token in keychain")?;
        self.entry(REFRESH_SLOT)?
            .set_password(&tokens.refresh_token)
            .context("Failed to store refresh token in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.delete_slot(ACCESS_SLOT)?;
        self.delete_slot(REFRESH_SLOT)?;
        Ok(())
    }
}

/// In-memory store for tests and sessions that should not outlive the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<StoredTokens>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn persist(&self, tokens: &StoredTokens) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
