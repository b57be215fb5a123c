//! Disk cache of fetched listings, for offline browsing and instant startup.

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};
