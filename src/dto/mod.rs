pub mod application_dto;
pub mod job_dto;
pub mod payment_dto;
pub mod user_dto;
pub mod webhook_dto;
