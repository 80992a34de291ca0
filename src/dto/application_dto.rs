use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::Application;
use crate::services::application_service::CandidateApplicationRow;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    pub cover_letter: Option<String>,
    pub projects: Option<JsonValue>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub evaluation: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationPayload {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: String,
    pub cover_letter: Option<String>,
    pub projects: JsonValue,
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub evaluation: Option<JsonValue>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
}

/// Candidate-facing view: the application plus the job it targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub job_status: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateApplicationListResponse {
    pub items: Vec<CandidateApplicationResponse>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            candidate_id: value.candidate_id,
            cover_letter: value.cover_letter,
            projects: value.projects,
            skills: value.skills,
            experience: value.experience,
            evaluation: value.evaluation,
            status: value.status,
            applied_at: value.applied_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<CandidateApplicationRow> for CandidateApplicationResponse {
    fn from(value: CandidateApplicationRow) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            job_title: value.job_title,
            company_name: value.company_name,
            job_status: value.job_status,
            status: value.status,
            applied_at: value.applied_at,
            updated_at: value.updated_at,
        }
    }
}
