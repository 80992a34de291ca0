use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
