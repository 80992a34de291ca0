use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Candidate => "candidate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employer" => Some(Role::Employer),
            "candidate" => Some(Role::Candidate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
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

impl User {
    pub fn resolved_role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    /// Display name for jobs this user posts: the company name from the
    /// employer profile, falling back to the account name.
    pub fn company_display_name(&self) -> Option<String> {
        self.employer_profile
            .as_ref()
            .and_then(|profile| profile.get("company_name"))
            .and_then(|value| value.as_str())
            .map(|value| value.to_string())
            .or_else(|| self.name.clone())
    }
}
