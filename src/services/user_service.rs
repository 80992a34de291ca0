use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::dto::user_dto::{RegisterUserPayload, UpdateUserPayload};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::utils::email;

const USER_COLUMNS: &str = "id, external_id, email, name, avatar_url, role, candidate_profile, \
     employer_profile, jobs_posted, created_at, updated_at";

/// Routes profile sub-documents to the column matching the caller's role.
/// The other side's column is never written, and a caller who has not picked
/// a role yet writes neither.
fn profile_columns(
    role: Option<Role>,
    candidate: Option<JsonValue>,
    employer: Option<JsonValue>,
) -> (Option<JsonValue>, Option<JsonValue>) {
    match role {
        Some(Role::Candidate) => (candidate, None),
        Some(Role::Employer) => (None, employer),
        None => (None, None),
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE external_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn require_by_external_id(&self, external_id: &str) -> Result<User> {
        self.get_by_external_id(external_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Finds the directory entry for an authenticated caller, creating it on
    /// first contact. Lookup is by provider ID first; an email match re-links
    /// the stored provider ID when the provider has issued a new one.
    pub async fn resolve(
        &self,
        external_id: &str,
        email: &str,
        name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User> {
        if let Some(user) = self.get_by_external_id(external_id).await? {
            return Ok(user);
        }

        let relink = format!(
            "UPDATE users
             SET external_id = $1,
                 name = COALESCE($3, name),
                 avatar_url = COALESCE($4, avatar_url),
                 updated_at = NOW()
             WHERE email = $2
             RETURNING {}",
            USER_COLUMNS
        );
        if let Some(user) = sqlx::query_as::<_, User>(&relink)
            .bind(external_id)
            .bind(email)
            .bind(name)
            .bind(avatar_url)
            .fetch_optional(&self.pool)
            .await?
        {
            tracing::info!(email, "re-linked user to new provider id");
            return Ok(user);
        }

        let insert = format!(
            "INSERT INTO users (external_id, email, name, avatar_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&insert)
            .bind(external_id)
            .bind(email)
            .bind(name)
            .bind(avatar_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    /// Sets the caller's role exactly once. Re-registering with the same role
    /// refreshes the profile; any differing role is rejected.
    pub async fn register(
        &self,
        external_id: &str,
        user_email: &str,
        payload: RegisterUserPayload,
    ) -> Result<User> {
        let role = Role::parse(&payload.role)
            .ok_or_else(|| Error::BadRequest("role must be one of: employer, candidate".to_string()))?;

        let current = self
            .resolve(
                external_id,
                user_email,
                payload.name.as_deref(),
                payload.avatar_url.as_deref(),
            )
            .await?;

        if let Some(existing) = current.resolved_role() {
            if existing != role {
                return Err(Error::Forbidden("Role cannot be changed".to_string()));
            }
        }

        if role == Role::Employer {
            if let Some(message) = email::company_email_error_message(&current.email) {
                return Err(Error::BadRequest(message));
            }
        }

        let (candidate_profile, employer_profile) = profile_columns(
            Some(role),
            payload.candidate_profile,
            payload.employer_profile,
        );

        let query = format!(
            "UPDATE users
             SET role = $2,
                 name = COALESCE($3, name),
                 avatar_url = COALESCE($4, avatar_url),
                 candidate_profile = COALESCE($5, candidate_profile),
                 employer_profile = COALESCE($6, employer_profile),
                 updated_at = NOW()
             WHERE external_id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(role.as_str())
            .bind(payload.name)
            .bind(payload.avatar_url)
            .bind(candidate_profile)
            .bind(employer_profile)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn update_profile(
        &self,
        external_id: &str,
        payload: UpdateUserPayload,
    ) -> Result<User> {
        let current = self.require_by_external_id(external_id).await?;

        if let Some(requested) = payload.role.as_deref() {
            if current.role.as_deref() != Some(requested) {
                return Err(Error::Forbidden("Role cannot be changed".to_string()));
            }
        }

        let (candidate_profile, employer_profile) = profile_columns(
            current.resolved_role(),
            payload.candidate_profile,
            payload.employer_profile,
        );

        let query = format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 avatar_url = COALESCE($3, avatar_url),
                 candidate_profile = COALESCE($4, candidate_profile),
                 employer_profile = COALESCE($5, employer_profile),
                 updated_at = NOW()
             WHERE external_id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .bind(payload.name)
            .bind(payload.avatar_url)
            .bind(candidate_profile)
            .bind(employer_profile)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Atomically claims the next job slot for an employer and returns how
    /// many jobs they had posted before this one. The counter only ever grows,
    /// so deleting jobs never re-opens the free tier.
    pub async fn claim_job_slot(&self, external_id: &str) -> Result<i64> {
        let prior = sqlx::query_scalar::<_, i64>(
            "UPDATE users
             SET jobs_posted = jobs_posted + 1, updated_at = NOW()
             WHERE external_id = $1
             RETURNING jobs_posted - 1",
        )
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_columns_follow_the_role() {
        let candidate = Some(json!({"skills": ["rust"]}));
        let employer = Some(json!({"company_name": "Acme"}));

        let (c, e) = profile_columns(Some(Role::Candidate), candidate.clone(), employer.clone());
        assert_eq!(c, candidate);
        assert_eq!(e, None);

        let (c, e) = profile_columns(Some(Role::Employer), candidate.clone(), employer.clone());
        assert_eq!(c, None);
        assert_eq!(e, employer);
    }

    #[test]
    fn no_role_means_no_profile_write() {
        let (c, e) = profile_columns(None, Some(json!({"a": 1})), Some(json!({"b": 2})));
        assert_eq!(c, None);
        assert_eq!(e, None);
    }
}
