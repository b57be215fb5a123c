use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

/// Matching profile built during onboarding.
///
/// `experience_level` is one of "junior"/"mid"/"senior" and
/// `remote_preference` is "global" or "region"; both arrive as plain strings
/// (empty until onboarding completes).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub skills: Vec<String>,
    pub experience_level: String,
    pub salary_range: SalaryRange,
    pub remote_preference: String,
    pub preferred_roles: Vec<String>,
}

impl UserProfile {
    /// A profile is usable for matching once it names at least one skill
    pub fn is_complete(&self) -> bool {
        !self.skills.is_empty() && !self.experience_level.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    /// "user" or "admin"
    pub role: String,
    #[serde(default)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Job ids the user has interacted with, grouped by action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Interactions {
    #[serde(default)]
    pub saved: Vec<String>,
    #[serde(default)]
    pub applied: Vec<String>,
    #[serde(default)]
    pub hidden: Vec<String>,
}
