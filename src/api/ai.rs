//! AI matching endpoints. The scoring model runs server-side; these calls
//! treat it as an opaque remote service.

use crate::models::{
    JobExplanation, MarketInsights, ProfileAnalysis, Recommendation, SkillSuggestion,
};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Jobs scored against the user's profile, best matches first
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ApiError> {
        self.get("/ai/recommend").await
    }

    /// Strengths/gaps analysis of the user's profile
    pub async fn analyze_profile(&self) -> Result<ProfileAnalysis, ApiError> {
        self.post_no_body("/ai/analyze-profile").await
    }

    /// Why a specific job was (or wasn't) a good match
    pub async fn explain_job(&self, id: &str) -> Result<JobExplanation, ApiError> {
        self.get(&format!("/ai/explain/{}", id)).await
    }

    pub async fn suggest_skills(&self) -> Result<Vec<SkillSuggestion>, ApiError> {
        self.get("/ai/suggest-skills").await
    }

    pub async fn market_insights(&self) -> Result<MarketInsights, ApiError> {
        self.get("/ai/market-insights").await
    }
}
