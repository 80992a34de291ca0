use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1))]
    pub role: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub candidate_profile: Option<JsonValue>,
    pub employer_profile: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserPayload {
    /// Role is set once at registration; a differing value here is rejected.
    pub role: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub candidate_profile: Option<JsonValue>,
    pub employer_profile: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub candidate_profile: Option<JsonValue>,
    pub employer_profile: Option<JsonValue>,
    pub jobs_posted: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            external_id: value.external_id,
            email: value.email,
            name: value.name,
            avatar_url: value.avatar_url,
            role: value.role,
            candidate_profile: value.candidate_profile,
            employer_profile: value.employer_profile,
            jobs_posted: value.jobs_posted,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
