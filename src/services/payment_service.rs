use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::config::get_config;
use crate::dto::payment_dto::{CheckoutSessionResponse, CreateCheckoutSessionPayload};
use crate::error::{Error, Result};
use crate::models::job::{JobStatus, PaymentStatus, PlanType, FREE_JOB_LIMIT};
use crate::models::payment::{Payment, PaymentState, PROVIDER_STRIPE};
use crate::utils::time;

const PAYMENT_COLUMNS: &str = "id, user_id, job_id, provider, plan_type, amount, currency, \
     status, checkout_session_id, payment_intent_id, provider_transaction_id, paid_at, \
     created_at, updated_at";

/// The job state a new posting starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub status: JobStatus,
    pub payment_status: PaymentStatus,
    pub plan: PlanType,
}

impl Activation {
    pub fn is_free_tier(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Free-tier decision: employers get their first jobs activated without
/// payment, on the basic plan regardless of what was requested. From the
/// limit onward a job starts paused/pending with the requested plan kept.
pub fn activation_for(jobs_posted: i64, requested_plan: PlanType) -> Activation {
    if jobs_posted < FREE_JOB_LIMIT {
        Activation {
            status: JobStatus::Active,
            payment_status: PaymentStatus::Paid,
            plan: PlanType::Basic,
        }
    } else {
        Activation {
            status: JobStatus::Paused,
            payment_status: PaymentStatus::Pending,
            plan: requested_plan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event changed a payment (and, for completions, its job).
    Applied,
    /// A replay of an event that was already applied.
    AlreadyApplied,
    /// No payment matches the referenced session/order; deliberately ignored.
    UnknownReference,
}

#[derive(Debug, Deserialize)]
struct ProviderCheckoutSession {
    id: String,
    url: String,
    // Present for payment-mode sessions; intent-keyed failure events can only
    // be matched to a payment when this was captured at creation.
    #[serde(default)]
    payment_intent: Option<String>,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    http: Client,
}

impl PaymentService {
    pub fn new(pool: PgPool, http: Client) -> Self {
        Self { pool, http }
    }

    /// Creates a provider-hosted checkout session for a job the caller owns
    /// and records a pending payment keyed by the session ID. The job itself
    /// is not touched until a verified webhook arrives.
    pub async fn create_checkout_session(
        &self,
        employer_id: &str,
        employer_email: &str,
        payload: CreateCheckoutSessionPayload,
    ) -> Result<CheckoutSessionResponse> {
        let job_id = payload
            .job_id
            .ok_or_else(|| Error::BadRequest("job_id is required".to_string()))?;
        let plan_raw = payload
            .plan_type
            .ok_or_else(|| Error::BadRequest("plan_type is required".to_string()))?;
        let plan = PlanType::parse(&plan_raw).ok_or_else(|| {
            Error::BadRequest("plan_type must be one of: basic, premium".to_string())
        })?;

        let company_id = sqlx::query_scalar::<_, String>("SELECT company_id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        if company_id != employer_id {
            return Err(Error::Forbidden("You do not own this job".to_string()));
        }

        let config = get_config();
        let amount = plan.unit_amount();
        let success_url = format!(
            "{}/employer/jobs?payment=success&session_id={{CHECKOUT_SESSION_ID}}",
            config.frontend_url
        );
        let cancel_url = format!("{}/employer/jobs?payment=cancelled", config.frontend_url);

        let params: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("customer_email", employer_email.to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                format!("Job posting ({} plan)", plan.as_str()),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("metadata[user_id]", employer_id.to_string()),
            ("metadata[job_id]", job_id.to_string()),
            ("metadata[plan_type]", plan.as_str().to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", config.stripe_api_url))
            .bearer_auth(&config.stripe_secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body, "checkout session creation failed");
            return Err(Error::Internal(
                "Payment provider rejected the checkout session".to_string(),
            ));
        }

        let session: ProviderCheckoutSession = response.json().await?;

        sqlx::query(
            "INSERT INTO payments (user_id, job_id, provider, plan_type, amount, currency, \
             status, checkout_session_id, payment_intent_id)
             VALUES ($1, $2, $3, $4, $5, 'usd', $6, $7, $8)",
        )
        .bind(employer_id)
        .bind(job_id)
        .bind(PROVIDER_STRIPE)
        .bind(plan.as_str())
        .bind(amount)
        .bind(PaymentState::Pending.as_str())
        .bind(&session.id)
        .bind(&session.payment_intent)
        .execute(&self.pool)
        .await?;

        tracing::info!(%job_id, session_id = %session.id, plan = plan.as_str(), "checkout session created");

        Ok(CheckoutSessionResponse {
            session_id: session.id,
            checkout_url: session.url,
        })
    }

    /// Applies a verified successful checkout. The payment transition is a
    /// single conditional update keyed by the session ID, so a replayed event
    /// matches zero rows and nothing is double-applied. The job is activated
    /// only when the payment actually transitions.
    pub async fn apply_checkout_completed(
        &self,
        session_id: &str,
        payment_intent: Option<&str>,
        transaction_id: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let paid_at = time::now();

        let query = format!(
            "UPDATE payments
             SET status = $2,
                 payment_intent_id = COALESCE($3, payment_intent_id),
                 provider_transaction_id = COALESCE($4, provider_transaction_id),
                 paid_at = COALESCE(paid_at, $5),
                 updated_at = NOW()
             WHERE checkout_session_id = $1 AND status IN ('pending', 'failed')
             RETURNING {}",
            PAYMENT_COLUMNS
        );
        let completed = sqlx::query_as::<_, Payment>(&query)
            .bind(session_id)
            .bind(PaymentState::Completed.as_str())
            .bind(payment_intent)
            .bind(transaction_id)
            .bind(paid_at)
            .fetch_optional(&self.pool)
            .await?;

        let Some(payment) = completed else {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM payments WHERE checkout_session_id = $1)",
            )
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;
            if exists {
                tracing::info!(session_id, "checkout completion replayed, nothing to apply");
                return Ok(ReconcileOutcome::AlreadyApplied);
            }
            tracing::warn!(session_id, "checkout completion for unknown session");
            return Ok(ReconcileOutcome::UnknownReference);
        };

        sqlx::query(
            "UPDATE jobs
             SET status = 'active',
                 payment_status = 'paid',
                 plan_type = $2,
                 checkout_session_id = $3,
                 payment_intent_id = COALESCE($4, payment_intent_id),
                 provider_order_id = COALESCE($5, provider_order_id),
                 paid_at = COALESCE(paid_at, $6),
                 activated_at = COALESCE(activated_at, $6),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(payment.job_id)
        .bind(&payment.plan_type)
        .bind(session_id)
        .bind(payment_intent)
        .bind(transaction_id)
        .bind(paid_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(session_id, job_id = %payment.job_id, "payment completed, job activated");
        Ok(ReconcileOutcome::Applied)
    }

    /// Marks a pending payment as failed. The job stays untouched; the
    /// employer can retry checkout with the same job.
    pub async fn apply_payment_failed(
        &self,
        session_id: Option<&str>,
        payment_intent: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        let result = match (session_id, payment_intent) {
            (Some(session), _) => {
                sqlx::query(
                    "UPDATE payments SET status = $2, updated_at = NOW()
                     WHERE checkout_session_id = $1 AND status = 'pending'",
                )
                .bind(session)
                .bind(PaymentState::Failed.as_str())
                .execute(&self.pool)
                .await?
            }
            (None, Some(intent)) => {
                sqlx::query(
                    "UPDATE payments SET status = $2, updated_at = NOW()
                     WHERE payment_intent_id = $1 AND status = 'pending'",
                )
                .bind(intent)
                .bind(PaymentState::Failed.as_str())
                .execute(&self.pool)
                .await?
            }
            (None, None) => return Ok(ReconcileOutcome::UnknownReference),
        };

        if result.rows_affected() == 0 {
            tracing::info!(?session_id, ?payment_intent, "payment failure with no pending payment");
            return Ok(ReconcileOutcome::UnknownReference);
        }
        Ok(ReconcileOutcome::Applied)
    }

    /// Marks a completed payment as refunded. Visibility of the job is a
    /// separate (manual) decision, so the job record is untouched.
    pub async fn apply_refund(&self, reference: &str) -> Result<ReconcileOutcome> {
        let result = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = NOW()
             WHERE (provider_transaction_id = $1 OR checkout_session_id = $1)
               AND status = 'completed'",
        )
        .bind(reference)
        .bind(PaymentState::Refunded.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::info!(reference, "refund with no completed payment");
            return Ok(ReconcileOutcome::UnknownReference);
        }
        Ok(ReconcileOutcome::Applied)
    }

    /// Audit insert for a verified provider event. Best-effort: a failure
    /// here never fails the webhook.
    pub async fn record_webhook_event(
        &self,
        provider: &str,
        event_type: &str,
        event_id: &str,
        payload: &JsonValue,
    ) {
        let result = sqlx::query(
            "INSERT INTO webhook_events (provider, event_type, event_id, payload)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(provider)
        .bind(event_type)
        .bind(event_id)
        .bind(payload)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            tracing::warn!(provider, event_type, error = ?err, "failed to record webhook event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_jobs_activate_immediately() {
        for posted in 0..FREE_JOB_LIMIT {
            let activation = activation_for(posted, PlanType::Premium);
            assert_eq!(activation.status, JobStatus::Active);
            assert_eq!(activation.payment_status, PaymentStatus::Paid);
            assert_eq!(activation.plan, PlanType::Basic);
            assert!(activation.is_free_tier());
        }
    }

    #[test]
    fn jobs_past_the_limit_need_payment() {
        let activation = activation_for(FREE_JOB_LIMIT, PlanType::Premium);
        assert_eq!(activation.status, JobStatus::Paused);
        assert_eq!(activation.payment_status, PaymentStatus::Pending);
        assert_eq!(activation.plan, PlanType::Premium);
        assert!(!activation.is_free_tier());

        let basic = activation_for(FREE_JOB_LIMIT + 17, PlanType::Basic);
        assert_eq!(basic.plan, PlanType::Basic);
        assert_eq!(basic.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn boundary_sits_between_twentieth_and_twenty_first_job() {
        // jobs_posted counts prior jobs: 19 -> this is the 20th, 20 -> the 21st.
        assert!(activation_for(FREE_JOB_LIMIT - 1, PlanType::Basic).is_free_tier());
        assert!(!activation_for(FREE_JOB_LIMIT, PlanType::Basic).is_free_tier());
    }

    #[test]
    fn checkout_session_parses_with_and_without_an_intent() {
        let with: ProviderCheckoutSession = serde_json::from_value(serde_json::json!({
            "id": "cs_test_1",
            "url": "https://checkout.test/cs_test_1",
            "payment_intent": "pi_test_1"
        }))
        .unwrap();
        assert_eq!(with.payment_intent.as_deref(), Some("pi_test_1"));

        let without: ProviderCheckoutSession = serde_json::from_value(serde_json::json!({
            "id": "cs_test_2",
            "url": "https://checkout.test/cs_test_2",
            "payment_intent": null
        }))
        .unwrap();
        assert!(without.payment_intent.is_none());
    }
}
