//! Responses from the AI matching service.

use serde::{Deserialize, Serialize};

use super::Job;

/// One scored job from the recommendation feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub job: Job,
    /// Match score, 0-100
    pub score: f64,
    pub match_reason: String,
    #[serde(default)]
    pub skill_match: Vec<String>,
    #[serde(default)]
    pub skill_gaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub market_demand: Vec<SkillDemand>,
}

/// Demand assessment for a single skill ("high"/"medium"/"low")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill: String,
    pub demand: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExplanation {
    pub explanation: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSuggestion {
    pub skill: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    #[serde(default)]
    pub trending_skills: Vec<TrendingSkill>,
    #[serde(default)]
    pub salary_trends: Vec<SalaryTrend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSkill {
    pub skill: String,
    /// Relative growth, e.g. 0.4 for +40% quarter over quarter
    pub growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryTrend {
    pub role: String,
    pub avg_salary: f64,
}
