use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, DiscoveryQuery, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus, PaymentStatus};
use crate::services::payment_service::Activation;
use crate::utils::time;

pub(crate) const JOB_COLUMNS: &str = "id, company_id, company_name, title, description, requirements, \
     skills_required, skills_preferred, experience_min, experience_max, experience_level, \
     location, remote, job_type, salary_min, salary_max, benefits, category, tags, \
     project_types, min_complexity, required_technologies, preferred_features, project_scale, \
     plan_type, payment_status, status, checkout_session_id, payment_intent_id, \
     provider_order_id, paid_at, activated_at, total_applications, shortlisted_applications, \
     posted_at, updated_at";

// Only rows satisfying this are ever served through the public surface.
const PUBLIC_FILTER: &str = "status = 'active' AND payment_status = 'paid'";

/// Normalizes pagination parameters. Saturating math keeps an absurd page
/// number from overflowing; it lands on an offset past the table instead,
/// which reads back as an empty page.
fn page_window(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    let offset = page.saturating_sub(1).saturating_mul(per_page);
    (page, per_page, offset)
}

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EmployerStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub shortlisted_applications: i64,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        company_id: &str,
        company_name: &str,
        payload: CreateJobPayload,
        activation: &Activation,
    ) -> Result<Job> {
        let activated_at = if activation.payment_status == PaymentStatus::Paid {
            Some(time::now())
        } else {
            None
        };

        let query = format!(
            "INSERT INTO jobs (
                company_id, company_name, title, description, requirements,
                skills_required, skills_preferred, experience_min, experience_max,
                experience_level, location, remote, job_type, salary_min, salary_max,
                benefits, category, tags, project_types, min_complexity,
                required_technologies, preferred_features, project_scale,
                plan_type, payment_status, status, activated_at
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20,
                $21, $22, $23,
                $24, $25, $26, $27
            )
            RETURNING {}",
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&query)
            .bind(company_id)
            .bind(company_name)
            .bind(payload.title)
            .bind(payload.description)
            .bind(payload.requirements)
            .bind(payload.skills_required)
            .bind(payload.skills_preferred)
            .bind(payload.experience_min)
            .bind(payload.experience_max)
            .bind(payload.experience_level)
            .bind(payload.location)
            .bind(payload.remote)
            .bind(payload.job_type)
            .bind(payload.salary_min)
            .bind(payload.salary_max)
            .bind(payload.benefits)
            .bind(payload.category)
            .bind(payload.tags)
            .bind(payload.project_types)
            .bind(payload.min_complexity)
            .bind(payload.required_technologies)
            .bind(payload.preferred_features)
            .bind(payload.project_scale)
            .bind(activation.plan.as_str())
            .bind(activation.payment_status.as_str())
            .bind(activation.status.as_str())
            .bind(activated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(job)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    /// Public detail lookup. Jobs outside the visible set 404 here, so drafts
    /// and unpaid postings are indistinguishable from absent ones.
    pub async fn get_visible_by_id(&self, id: Uuid) -> Result<Job> {
        let query = format!(
            "SELECT {} FROM jobs WHERE id = $1 AND {}",
            JOB_COLUMNS, PUBLIC_FILTER
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn update(
        &self,
        id: Uuid,
        company_id: &str,
        payload: UpdateJobPayload,
    ) -> Result<Job> {
        let existing = self.get_by_id(id).await?;
        if existing.company_id != company_id {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }

        if let Some(status) = payload.status.as_deref() {
            if JobStatus::parse(status).is_none() {
                return Err(Error::BadRequest(
                    "status must be one of: paused, active, closed".to_string(),
                ));
            }
        }

        let query = format!(
            "UPDATE jobs
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 requirements = COALESCE($5, requirements),
                 skills_required = COALESCE($6, skills_required),
                 skills_preferred = COALESCE($7, skills_preferred),
                 experience_min = COALESCE($8, experience_min),
                 experience_max = COALESCE($9, experience_max),
                 experience_level = COALESCE($10, experience_level),
                 location = COALESCE($11, location),
                 remote = COALESCE($12, remote),
                 job_type = COALESCE($13, job_type),
                 salary_min = COALESCE($14, salary_min),
                 salary_max = COALESCE($15, salary_max),
                 benefits = COALESCE($16, benefits),
                 category = COALESCE($17, category),
                 tags = COALESCE($18, tags),
                 project_types = COALESCE($19, project_types),
                 min_complexity = COALESCE($20, min_complexity),
                 required_technologies = COALESCE($21, required_technologies),
                 preferred_features = COALESCE($22, preferred_features),
                 project_scale = COALESCE($23, project_scale),
                 status = COALESCE($24, status),
                 updated_at = NOW()
             WHERE id = $1 AND company_id = $2
             RETURNING {}",
            JOB_COLUMNS
        );

        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(company_id)
            .bind(payload.title)
            .bind(payload.description)
            .bind(payload.requirements)
            .bind(payload.skills_required)
            .bind(payload.skills_preferred)
            .bind(payload.experience_min)
            .bind(payload.experience_max)
            .bind(payload.experience_level)
            .bind(payload.location)
            .bind(payload.remote)
            .bind(payload.job_type)
            .bind(payload.salary_min)
            .bind(payload.salary_max)
            .bind(payload.benefits)
            .bind(payload.category)
            .bind(payload.tags)
            .bind(payload.project_types)
            .bind(payload.min_complexity)
            .bind(payload.required_technologies)
            .bind(payload.preferred_features)
            .bind(payload.project_scale)
            .bind(payload.status)
            .fetch_one(&self.pool)
            .await?;

        Ok(job)
    }

    /// Deleting a job cascades to its applications at the schema level. The
    /// owner's `jobs_posted` counter is intentionally left untouched.
    pub async fn delete(&self, id: Uuid, company_id: &str) -> Result<()> {
        let existing = self.get_by_id(id).await?;
        if existing.company_id != company_id {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }

        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_public(&self, query: JobListQuery) -> Result<JobList> {
        let (page, per_page, offset) = page_window(query.page, query.per_page);

        let mut filters = vec![PUBLIC_FILTER.to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(category) = query.category {
            filters.push(format!("category = ${}", args.len() + 1));
            args.push(category);
        }
        if let Some(location) = query.location {
            filters.push(format!("location ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", location));
        }
        if let Some(job_type) = query.job_type {
            filters.push(format!("job_type = ${}", args.len() + 1));
            args.push(job_type);
        }
        if let Some(level) = query.experience_level {
            filters.push(format!("experience_level = ${}", args.len() + 1));
            args.push(level);
        }
        if let Some(remote) = query.remote {
            filters.push(format!("remote = ${}::boolean", args.len() + 1));
            args.push(remote.to_string());
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            let third = second + 1;
            filters.push(format!(
                "(title ILIKE ${} OR description ILIKE ${} OR company_name ILIKE ${})",
                first, second, third
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM jobs {} ORDER BY posted_at DESC LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(JobList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn discover(&self, query: DiscoveryQuery) -> Result<Vec<Job>> {
        let limit = query.limit.unwrap_or(20).clamp(1, 100);

        let items = match query.category {
            Some(category) => {
                let sql = format!(
                    "SELECT {} FROM jobs WHERE {} AND category = $1 \
                     ORDER BY posted_at DESC LIMIT $2",
                    JOB_COLUMNS, PUBLIC_FILTER
                );
                sqlx::query_as::<_, Job>(&sql)
                    .bind(category)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM jobs WHERE {} ORDER BY posted_at DESC LIMIT $1",
                    JOB_COLUMNS, PUBLIC_FILTER
                );
                sqlx::query_as::<_, Job>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(items)
    }

    /// Employer-facing listing. Application counts are recomputed from the
    /// applications table and overlaid, so this view never shows a drifted
    /// counter.
    pub async fn list_by_company(&self, company_id: &str) -> Result<Vec<Job>> {
        let items = sqlx::query_as::<_, Job>(
            "SELECT j.id, j.company_id, j.company_name, j.title, j.description, j.requirements,
                    j.skills_required, j.skills_preferred, j.experience_min, j.experience_max,
                    j.experience_level, j.location, j.remote, j.job_type, j.salary_min,
                    j.salary_max, j.benefits, j.category, j.tags, j.project_types,
                    j.min_complexity, j.required_technologies, j.preferred_features,
                    j.project_scale, j.plan_type, j.payment_status, j.status,
                    j.checkout_session_id, j.payment_intent_id, j.provider_order_id,
                    j.paid_at, j.activated_at,
                    COALESCE(a.total, 0) AS total_applications,
                    COALESCE(a.shortlisted, 0) AS shortlisted_applications,
                    j.posted_at, j.updated_at
             FROM jobs j
             LEFT JOIN (
                 SELECT job_id,
                        COUNT(*) AS total,
                        COUNT(*) FILTER (WHERE status = 'shortlisted') AS shortlisted
                 FROM applications
                 GROUP BY job_id
             ) a ON a.job_id = j.id
             WHERE j.company_id = $1
             ORDER BY j.posted_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn employer_stats(&self, company_id: &str) -> Result<EmployerStats> {
        let stats = sqlx::query_as::<_, EmployerStats>(
            "SELECT
                 (SELECT COUNT(*) FROM jobs WHERE company_id = $1) AS total_jobs,
                 (SELECT COUNT(*) FROM jobs WHERE company_id = $1 AND status = 'active')
                     AS active_jobs,
                 (SELECT COUNT(*) FROM applications a
                      JOIN jobs j ON j.id = a.job_id
                      WHERE j.company_id = $1) AS total_applications,
                 (SELECT COUNT(*) FROM applications a
                      JOIN jobs j ON j.id = a.job_id
                      WHERE j.company_id = $1 AND a.status = 'shortlisted')
                     AS shortlisted_applications",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, 20, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(-5), Some(500)), (1, 100, 0));
        assert_eq!(page_window(Some(3), Some(50)), (3, 50, 100));
    }

    #[test]
    fn page_window_handles_huge_page_numbers() {
        let (page, per_page, offset) = page_window(Some(i64::MAX), Some(100));
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, 100);
        assert_eq!(offset, i64::MAX);
    }
}
