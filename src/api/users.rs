//! Profile endpoints.

use crate::models::{Interactions, User, UserProfile};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get("/users/profile").await
    }

    pub async fn update_profile(&self, profile: &UserProfile) -> Result<User, ApiError> {
        self.put("/users/profile", serde_json::json!(profile)).await
    }

    /// Submit the initial profile at the end of onboarding
    pub async fn complete_onboarding(&self, profile: &UserProfile) -> Result<User, ApiError> {
        self.post("/users/onboarding", serde_json::json!(profile))
            .await
    }

    /// Job ids the user has saved, applied to, or hidden
    pub async fn interactions(&self) -> Result<Interactions, ApiError> {
        self.get("/users/interactions").await
    }

    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.delete("/users/account").await
    }
}
