use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub scoring_api_url: String,
    pub scoring_api_key: String,
    pub scoring_model: String,
    pub profile_api_url: String,
    pub profile_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Capacity of the in-process analysis cache (entries).
    pub cache_capacity: usize,
    /// TTL shared by both cache tiers.
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            scoring_api_url: require_env("SCORING_API_URL")?,
            scoring_api_key: require_env("SCORING_API_KEY")?,
            scoring_model: std::env::var("SCORING_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            profile_api_url: require_env("PROFILE_API_URL")?,
            profile_api_key: require_env("PROFILE_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cache_capacity: std::env::var("CACHE_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse::<usize>()
                .context("CACHE_CAPACITY must be a positive integer")?,
            cache_ttl: Duration::from_secs(
                std::env::var("CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse::<u64>()
                    .context("CACHE_TTL_SECS must be a number of seconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
