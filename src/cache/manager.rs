use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Job, Recommendation, User};
use crate::utils::format::relative_time;

/// Consider cached listings stale after 30 minutes; scraped boards churn
/// quickly enough that anything older deserves a refetch.
const CACHE_STALE_MINUTES: i64 = 30;

/// A cached payload with the time it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        relative_time(self.cached_at)
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// JSON-file cache of the last fetched listing, saved jobs, recommendations,
/// and profile. Purely local; there is no invalidation protocol beyond age.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;
        let cached = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;
        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    // ===== Listing =====

    pub fn load_jobs(&self) -> Result<Option<CachedData<Vec<Job>>>> {
        self.load("jobs")
    }

    pub fn save_jobs(&self, jobs: &[Job]) -> Result<()> {
        self.save("jobs", &jobs)
    }

    // ===== Saved jobs =====

    pub fn load_saved_jobs(&self) -> Result<Option<CachedData<Vec<Job>>>> {
        self.load("saved_jobs")
    }

    pub fn save_saved_jobs(&self, jobs: &[Job]) -> Result<()> {
        self.save("saved_jobs", &jobs)
    }

    // ===== Recommendations =====

    pub fn load_recommendations(&self) -> Result<Option<CachedData<Vec<Recommendation>>>> {
        self.load("recommendations")
    }

    pub fn save_recommendations(&self, recommendations: &[Recommendation]) -> Result<()> {
        self.save("recommendations", &recommendations)
    }

    // ===== Profile =====

    pub fn load_profile(&self) -> Result<Option<CachedData<User>>> {
        self.load("profile")
    }

    pub fn save_profile(&self, user: &User) -> Result<()> {
        self.save("profile", user)
    }

    /// Remove every cached file. Called on logout so the next account
    /// doesn't see the previous one's listings.
    pub fn clear(&self) -> Result<()> {
        for name in ["jobs", "saved_jobs", "recommendations", "profile"] {
            let path = self.cache_path(name);
            if path.exists() {
                std::fs::remove_file(path)
                    .with_context(|| format!("Failed to remove cache file: {}", name))?;
            }
        }
        Ok(())
    }

    /// Helper to check staleness, treating missing or unreadable as stale
    fn is_cache_stale<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> bool {
        match loader() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true,
            Err(err) => {
                debug!(cache = name, error = %err, "Failed to load cache for staleness check");
                true
            }
        }
    }

    /// True if any of the cached data sets needs a refetch
    pub fn any_stale(&self) -> bool {
        self.is_cache_stale("jobs", || self.load_jobs())
            || self.is_cache_stale("saved_jobs", || self.load_saved_jobs())
            || self.is_cache_stale("recommendations", || self.load_recommendations())
    }

    /// Helper to load cache ages, swallowing errors for display purposes
    fn load_age<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> Option<String> {
        match loader() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(err) => {
                debug!(cache = name, error = %err, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn cache_ages(&self) -> CacheAges {
        CacheAges {
            jobs: self.load_age("jobs", || self.load_jobs()),
            saved_jobs: self.load_age("saved_jobs", || self.load_saved_jobs()),
            recommendations: self.load_age("recommendations", || self.load_recommendations()),
        }
    }
}

/// Human-readable ages per cached data set, `None` when never fetched.
#[derive(Debug, Default)]
pub struct CacheAges {
    pub jobs: Option<String>,
    pub saved_jobs: Option<String>,
    pub recommendations: Option<String>,
}

impl CacheAges {
    /// Most recently updated data set, for a "last synced" indicator
    pub fn last_updated(&self) -> String {
        [&self.jobs, &self.saved_jobs, &self.recommendations]
            .into_iter()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "never".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            skills: vec![],
            salary: String::new(),
            location: "Remote".to_string(),
            source: "RemoteOK".to_string(),
            url: "https://example.com".to_string(),
            posted_at: Utc::now(),
            ai_score: None,
            match_reason: None,
        }
    }

    #[test]
    fn test_cached_data_staleness() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(CACHE_STALE_MINUTES + 1);
        assert!(old.is_stale());
    }

    #[test]
    fn test_cached_data_age_display() {
        let cached = CachedData::new(vec![1]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_jobs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        assert!(cache.load_jobs().unwrap().is_none());
        assert!(cache.any_stale());

        cache.save_jobs(&[job("1"), job("2")]).unwrap();
        let cached = cache.load_jobs().unwrap().unwrap();
        assert_eq!(cached.data.len(), 2);
        assert!(!cached.is_stale());

        cache.clear().unwrap();
        assert!(cache.load_jobs().unwrap().is_none());
    }

    #[test]
    fn test_cache_ages_last_updated() {
        let ages = CacheAges {
            jobs: Some("5m ago".to_string()),
            ..Default::default()
        };
        assert_eq!(ages.last_updated(), "5m ago");
        assert_eq!(CacheAges::default().last_updated(), "never");
    }
}
