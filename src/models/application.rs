use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

// Application status is an open set; only this value affects job counters.
pub const STATUS_SHORTLISTED: &str = "shortlisted";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
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

// Counter adjustment for the parent job when an application moves between
// statuses: +1 entering `shortlisted`, -1 leaving it, 0 otherwise.
pub fn shortlist_delta(from: &str, to: &str) -> i64 {
    match (from == STATUS_SHORTLISTED, to == STATUS_SHORTLISTED) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_shortlist_counts_once() {
        assert_eq!(shortlist_delta("submitted", "shortlisted"), 1);
        assert_eq!(shortlist_delta("under_review", "shortlisted"), 1);
    }

    #[test]
    fn leaving_shortlist_counts_once() {
        assert_eq!(shortlist_delta("shortlisted", "rejected"), -1);
        assert_eq!(shortlist_delta("shortlisted", "interview"), -1);
    }

    #[test]
    fn non_shortlist_moves_do_not_count() {
        assert_eq!(shortlist_delta("submitted", "under_review"), 0);
        assert_eq!(shortlist_delta("interview", "hired"), 0);
        assert_eq!(shortlist_delta("shortlisted", "shortlisted"), 0);
    }
}
