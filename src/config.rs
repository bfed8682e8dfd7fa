use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    /// Base URL this service is reachable at, used for self-hosted payment
    /// links (simulate-success pages, callback URLs handed to partners).
    pub public_base_url: String,
    /// Shared secret for signing outbound status webhooks.
    pub webhook_secret: String,
    /// Merchant endpoint receiving signed status webhooks. Unset disables
    /// dispatch entirely.
    pub merchant_callback_url: Option<String>,
    pub partner_timeout_secs: u64,
    pub webhook_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            webhook_secret: env::var("WEBHOOK_SECRET")?,
            merchant_callback_url: env::var("MERCHANT_CALLBACK_URL").ok(),
            partner_timeout_secs: env::var("PARTNER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            webhook_timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        })
    }
}
