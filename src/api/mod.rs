//! HTTP layer for the RemoteMatch API.
//!
//! `ApiClient` in `client` owns the request machinery (bearer attachment,
//! single-flight token refresh, rate-limit backoff); the sibling modules add
//! the typed endpoint wrappers for each API surface.

mod ai;
mod auth;
mod client;
mod error;
mod jobs;
mod users;

pub use auth::AuthResponse;
pub use client::ApiClient;
pub use error::ApiError;
