use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// First N jobs per employer activate without payment.
pub const FREE_JOB_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Basic,
    Premium,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(PlanType::Basic),
            "premium" => Some(PlanType::Premium),
            _ => None,
        }
    }

    // Checkout price in minor currency units (USD cents).
    pub fn unit_amount(&self) -> i64 {
        match self {
            PlanType::Basic => 9900,
            PlanType::Premium => 12800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Paused,
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Paused => "paused",
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "paused" => Some(JobStatus::Paused),
            "active" => Some(JobStatus::Active),
            "closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
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
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub provider_order_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub activated_at: Option<DateTime<Utc>>,
    pub total_applications: i64,
    pub shortlisted_applications: i64,
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    // Discoverability invariant: active AND paid, nothing else.
    pub fn is_publicly_visible(&self) -> bool {
        self.status == JobStatus::Active.as_str()
            && self.payment_status == PaymentStatus::Paid.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with(status: &str, payment_status: &str) -> Job {
        Job {
            id: Uuid::new_v4(),
            company_id: "user_1".into(),
            company_name: "Acme".into(),
            title: "Backend Engineer".into(),
            description: "Build things".into(),
            requirements: vec![],
            skills_required: vec![],
            skills_preferred: vec![],
            experience_min: None,
            experience_max: None,
            experience_level: None,
            location: None,
            remote: false,
            job_type: None,
            salary_min: None,
            salary_max: None,
            benefits: vec![],
            category: None,
            tags: vec![],
            project_types: vec![],
            min_complexity: None,
            required_technologies: vec![],
            preferred_features: vec![],
            project_scale: None,
            plan_type: "basic".into(),
            payment_status: payment_status.into(),
            status: status.into(),
            checkout_session_id: None,
            payment_intent_id: None,
            provider_order_id: None,
            paid_at: None,
            activated_at: None,
            total_applications: 0,
            shortlisted_applications: 0,
            posted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn visible_only_when_active_and_paid() {
        assert!(job_with("active", "paid").is_publicly_visible());
        assert!(!job_with("active", "pending").is_publicly_visible());
        assert!(!job_with("paused", "paid").is_publicly_visible());
        assert!(!job_with("paused", "pending").is_publicly_visible());
        assert!(!job_with("closed", "paid").is_publicly_visible());
        assert!(!job_with("active", "completed").is_publicly_visible());
    }

    #[test]
    fn plan_prices_are_fixed() {
        assert_eq!(PlanType::Basic.unit_amount(), 9900);
        assert_eq!(PlanType::Premium.unit_amount(), 12800);
    }

    #[test]
    fn plan_parse_round_trips() {
        assert_eq!(PlanType::parse("basic"), Some(PlanType::Basic));
        assert_eq!(PlanType::parse("premium"), Some(PlanType::Premium));
        assert_eq!(PlanType::parse("enterprise"), None);
    }
}
