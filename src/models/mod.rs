//! Data models for the RemoteMatch API.
//!
//! - `Job`, `JobFilters`, `JobsResponse`: the listing and its query model
//! - `User`, `UserProfile`, `Interactions`: accounts and interaction history
//! - AI types: `Recommendation`, `ProfileAnalysis`, `MarketInsights`, etc.
//!
//! Everything here mirrors the backend's JSON (camelCase, Mongo-style `_id`).

pub mod ai;
pub mod job;
pub mod user;

pub use ai::{
    JobExplanation, MarketInsights, ProfileAnalysis, Recommendation, SalaryTrend, SkillDemand,
    SkillSuggestion, TrendingSkill,
};
pub use job::{Job, JobFilters, JobsResponse};
pub use user::{Interactions, SalaryRange, User, UserProfile};
