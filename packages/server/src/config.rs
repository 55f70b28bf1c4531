use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Matching queue. Absent means the queue degrades to a no-op.
    pub redis_url: Option<String>,
    /// Push notification channel. Absent means notifications are dropped.
    pub nats_url: Option<String>,
    pub port: u16,
    pub agora_app_id: Option<String>,
    pub agora_app_certificate: Option<String>,
    pub openai_api_key: Option<String>,
    pub min_circle_size: usize,
    pub max_circle_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            nats_url: env::var("NATS_URL").ok().filter(|v| !v.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            agora_app_id: env::var("AGORA_APP_ID").ok().filter(|v| !v.is_empty()),
            agora_app_certificate: env::var("AGORA_APP_CERTIFICATE")
                .ok()
                .filter(|v| !v.is_empty()),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            min_circle_size: env::var("MIN_CIRCLE_SIZE")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("MIN_CIRCLE_SIZE must be a valid number")?,
            max_circle_size: env::var("MAX_CIRCLE_SIZE")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("MAX_CIRCLE_SIZE must be a valid number")?,
        })
    }
}
