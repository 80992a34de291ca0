pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, identity_service::IdentityService,
    job_service::JobService, payment_service::PaymentService,
    storage_service::StorageService, user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub payment_service: PaymentService,
    pub identity_service: IdentityService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let user_service = UserService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let payment_service = PaymentService::new(pool.clone(), http_client.clone());
        let identity_service = IdentityService::new(http_client);
        let storage_service = StorageService::new(config);

        Self {
            pool,
            user_service,
            job_service,
            application_service,
            payment_service,
            identity_service,
            storage_service,
        }
    }
}
