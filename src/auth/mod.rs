//! Session state and durable credential storage.
//!
//! This module provides:
//! - `Session`: the process-wide token pair, read by every outgoing request
//! - `TokenStore`: persistence seam for the token pair, with file, OS
//!   keychain, and in-memory implementations
//!
//! The in-memory session is what in-flight requests actually use; the store
//! is a side effect that lets a session survive a process restart.

pub mod session;
pub mod store;

pub use session::{Session, SessionData};
pub use store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
