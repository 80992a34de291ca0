pub mod application;
pub mod job;
pub mod payment;
pub mod user;
