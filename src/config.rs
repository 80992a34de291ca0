use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub frontend_url: String,
    pub identity_jwt_secret: String,
    pub identity_api_url: String,
    pub identity_api_key: String,
    pub stripe_api_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub lemonsqueezy_webhook_secret: String,
    pub storage_endpoint_url: String,
    pub storage_access_key_id: String,
    pub storage_secret_access_key: String,
    pub storage_bucket: String,
    pub storage_region: String,
    pub storage_public_base_url: String,
    pub public_rps: u32,
    pub authenticated_rps: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            frontend_url: get_env("FRONTEND_URL")?,
            identity_jwt_secret: get_env("IDENTITY_JWT_SECRET")?,
            identity_api_url: get_env("IDENTITY_API_URL")?,
            identity_api_key: get_env("IDENTITY_API_KEY")?,
            stripe_api_url: env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            stripe_secret_key: get_env("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: get_env("STRIPE_WEBHOOK_SECRET")?,
            lemonsqueezy_webhook_secret: get_env("LEMONSQUEEZY_WEBHOOK_SECRET")?,
            storage_endpoint_url: get_env("STORAGE_ENDPOINT_URL")?,
            storage_access_key_id: get_env("STORAGE_ACCESS_KEY_ID")?,
            storage_secret_access_key: get_env("STORAGE_SECRET_ACCESS_KEY")?,
            storage_bucket: get_env("STORAGE_BUCKET")?,
            storage_region: env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            storage_public_base_url: get_env("STORAGE_PUBLIC_BASE_URL")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            authenticated_rps: get_env_parse("AUTHENTICATED_RPS")?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
