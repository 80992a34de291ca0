use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::Job;
use crate::services::job_service::{EmployerStats, JobList};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    /// Owner override attempts are rejected; the authenticated employer always owns the job.
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub skills_preferred: Vec<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub remote: bool,
    pub job_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_types: Vec<String>,
    pub min_complexity: Option<String>,
    #[serde(default)]
    pub required_technologies: Vec<String>,
    #[serde(default)]
    pub preferred_features: Vec<String>,
    pub project_scale: Option<String>,
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills_required: Option<Vec<String>>,
    pub skills_preferred: Option<Vec<String>>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub job_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub benefits: Option<Vec<String>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub project_types: Option<Vec<String>>,
    pub min_complexity: Option<String>,
    pub required_technologies: Option<Vec<String>>,
    pub preferred_features: Option<Vec<String>>,
    pub project_scale: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub remote: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiscoveryQuery {
    pub limit: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub company_id: String,
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills_required: Vec<String>,
    pub skills_preferred: Vec<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub job_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub benefits: Vec<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub project_types: Vec<String>,
    pub min_complexity: Option<String>,
    pub required_technologies: Vec<String>,
    pub preferred_features: Vec<String>,
    pub project_scale: Option<String>,
    pub plan_type: String,
    pub payment_status: String,
    pub status: String,
    pub total_applications: i64,
    pub shortlisted_applications: i64,
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPublicSummary {
    pub id: Uuid,
    pub company_name: String,
    pub title: String,
    pub summary: Option<String>,
    pub skills_required: Vec<String>,
    pub experience_level: Option<String>,
    pub location: Option<String>,
    pub remote: bool,
    pub job_type: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobPublicSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDiscoveryResponse {
    pub items: Vec<JobPublicSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerJobListResponse {
    pub items: Vec<JobResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployerStatsResponse {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub shortlisted_applications: i64,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            company_id: value.company_id,
            company_name: value.company_name,
            title: value.title,
            description: value.description,
            requirements: value.requirements,
            skills_required: value.skills_required,
            skills_preferred: value.skills_preferred,
            experience_min: value.experience_min,
            experience_max: value.experience_max,
            experience_level: value.experience_level,
            location: value.location,
            remote: value.remote,
            job_type: value.job_type,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            benefits: value.benefits,
            category: value.category,
            tags: value.tags,
            project_types: value.project_types,
            min_complexity: value.min_complexity,
            required_technologies: value.required_technologies,
            preferred_features: value.preferred_features,
            project_scale: value.project_scale,
            plan_type: value.plan_type,
            payment_status: value.payment_status,
            status: value.status,
            total_applications: value.total_applications,
            shortlisted_applications: value.shortlisted_applications,
            posted_at: value.posted_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Job> for JobPublicSummary {
    fn from(value: Job) -> Self {
        let summary = {
            let trimmed = value.description.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.chars().count() > 320 {
                Some(format!("{}…", trimmed.chars().take(320).collect::<String>()))
            } else {
                Some(trimmed.to_string())
            }
        };

        Self {
            id: value.id,
            company_name: value.company_name,
            title: value.title,
            summary,
            skills_required: value.skills_required,
            experience_level: value.experience_level,
            location: value.location,
            remote: value.remote,
            job_type: value.job_type,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            category: value.category,
            tags: value.tags,
            posted_at: value.posted_at,
        }
    }
}

impl From<JobList> for JobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

impl From<EmployerStats> for EmployerStatsResponse {
    fn from(value: EmployerStats) -> Self {
        Self {
            total_jobs: value.total_jobs,
            active_jobs: value.active_jobs,
            total_applications: value.total_applications,
            shortlisted_applications: value.shortlisted_applications,
        }
    }
}
