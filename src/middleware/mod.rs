pub mod access_control;
pub mod auth;
pub mod rate_limit;
