//! Job listing endpoints: search, detail, saved/hidden/applied tracking.

use crate::models::{Job, JobFilters, JobsResponse};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Search the listing. Filtering and pagination happen server-side; the
    /// same `JobFilters` can be applied to a cached list via
    /// [`JobFilters::apply`] when offline.
    pub async fn search_jobs(&self, filters: &JobFilters) -> Result<JobsResponse, ApiError> {
        let query = filters.to_query();
        self.get_with_query("/jobs", &query).await
    }

    pub async fn job(&self, id: &str) -> Result<Job, ApiError> {
        self.get(&format!("/jobs/{}", id)).await
    }

    pub async fn saved_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get("/jobs/saved").await
    }

    pub async fn save_job(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/jobs/{}/save", id)).await
    }

    pub async fn unsave_job(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/jobs/{}/save", id)).await
    }

    /// Hide a job from future listings and recommendations
    pub async fn hide_job(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/jobs/{}/hide", id)).await
    }

    /// Record that the user followed the job's external application link
    pub async fn track_apply(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/jobs/{}/apply", id)).await
    }

    /// Names of the boards the listing is scraped from
    pub async fn job_sources(&self) -> Result<Vec<String>, ApiError> {
        self.get("/jobs/sources").await
    }
}
