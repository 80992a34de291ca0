pub mod application_service;
pub mod identity_service;
pub mod job_service;
pub mod payment_service;
pub mod storage_service;
pub mod user_service;
