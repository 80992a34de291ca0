use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::application_dto::ApplyPayload;
use crate::error::{Error, Result};
use crate::models::application::{shortlist_delta, Application};
use crate::models::job::Job;
use crate::services::job_service::JOB_COLUMNS;

const APPLICATION_COLUMNS: &str = "id, job_id, candidate_id, cover_letter, projects, skills, \
     experience, evaluation, status, applied_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
pub struct CandidateApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub job_status: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_job(&self, job_id: Uuid) -> Result<Job> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    /// One application per candidate per job, against publicly visible jobs
    /// only. The job's total counter moves by an atomic increment.
    pub async fn apply(
        &self,
        job_id: Uuid,
        candidate_id: &str,
        payload: ApplyPayload,
    ) -> Result<Application> {
        let job = self.fetch_job(job_id).await?;
        if !job.is_publicly_visible() {
            return Err(Error::NotFound("Job not found".to_string()));
        }

        let projects = payload.projects.unwrap_or_else(|| json!([]));

        let query = format!(
            "INSERT INTO applications (job_id, candidate_id, cover_letter, projects, skills, \
             experience, evaluation)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .bind(candidate_id)
            .bind(payload.cover_letter)
            .bind(projects)
            .bind(payload.skills)
            .bind(payload.experience)
            .bind(payload.evaluation)
            .fetch_one(&self.pool)
            .await;

        let application = match inserted {
            Ok(application) => application,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::BadRequest(
                    "You have already applied to this job".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = sqlx::query(
            "UPDATE jobs SET total_applications = total_applications + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .execute(&self.pool)
        .await
        {
            tracing::warn!(%job_id, error = ?err, "failed to bump total_applications");
        }

        Ok(application)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Application> {
        let query = format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(application)
    }

    /// Status transition, restricted to the owner of the parent job. Moves
    /// into/out of `shortlisted` adjust the job's shortlist counter by exactly
    /// one; a failed adjustment is logged but does not undo the transition.
    pub async fn update_status(
        &self,
        id: Uuid,
        employer_id: &str,
        new_status: &str,
    ) -> Result<Application> {
        let current = self.get_by_id(id).await?;
        let job = self.fetch_job(current.job_id).await?;
        if job.company_id != employer_id {
            return Err(Error::Forbidden(
                "You do not own the job for this application".to_string(),
            ));
        }

        let delta = shortlist_delta(&current.status, new_status);

        let query = format!(
            "UPDATE applications SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(new_status)
            .fetch_one(&self.pool)
            .await?;

        if delta != 0 {
            if let Err(err) = sqlx::query(
                "UPDATE jobs \
                 SET shortlisted_applications = shortlisted_applications + $2, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(current.job_id)
            .bind(delta)
            .execute(&self.pool)
            .await
            {
                tracing::warn!(
                    job_id = %current.job_id,
                    delta,
                    error = ?err,
                    "failed to adjust shortlisted_applications"
                );
            }
        }

        Ok(application)
    }

    pub async fn list_for_job(&self, job_id: Uuid, employer_id: &str) -> Result<Vec<Application>> {
        let job = self.fetch_job(job_id).await?;
        if job.company_id != employer_id {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }

        let query = format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY applied_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn list_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<CandidateApplicationRow>> {
        let items = sqlx::query_as::<_, CandidateApplicationRow>(
            "SELECT a.id, a.job_id, j.title AS job_title, j.company_name,
                    j.status AS job_status, a.status, a.applied_at, a.updated_at
             FROM applications a
             JOIN jobs j ON j.id = a.job_id
             WHERE a.candidate_id = $1
             ORDER BY a.applied_at DESC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
