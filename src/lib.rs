//! Client library for the RemoteMatch job board.
//!
//! RemoteMatch is a remote-job board with AI-assisted matching. This crate
//! talks to its REST API and handles the session plumbing so callers don't
//! have to: bearer tokens are attached automatically, expired access tokens
//! are refreshed behind the scenes (one refresh call shared by all concurrent
//! requests), and the token pair is persisted so a session survives restarts.
//!
//! ```no_run
//! use std::sync::Arc;
//! use remotematch::{ApiClient, Config, FileTokenStore, JobFilters};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store = Arc::new(FileTokenStore::new(config.data_dir()?));
//! let client = ApiClient::new(&config, store)?;
//!
//! client.login("dev@example.com", "hunter2").await?;
//! let listing = client.search_jobs(&JobFilters::default()).await?;
//! println!("{} open roles", listing.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, AuthResponse};
pub use auth::{
    FileTokenStore, KeyringTokenStore, MemoryTokenStore, Session, SessionData, StoredTokens,
    TokenStore,
};
pub use config::Config;
pub use models::{Job, JobFilters, JobsResponse, Recommendation, User, UserProfile};
