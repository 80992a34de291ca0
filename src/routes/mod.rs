pub mod application;
pub mod health;
pub mod job;
pub mod payment;
pub mod upload;
pub mod user;
pub mod webhook;
