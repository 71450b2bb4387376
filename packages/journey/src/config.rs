use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::journeys::models::OwnerIdentity;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the journey API (creation and initialization)
    pub journey_api_url: String,
    /// Scrape endpoint used by the extractor
    pub extractor_url: String,
    pub owner_address: Option<OwnerIdentity>,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let journey_api_url = var("JOURNEY_API_URL")
            .context("JOURNEY_API_URL must be set")?
            .trim_end_matches('/')
            .to_string();

        let extractor_url = var("EXTRACTOR_URL")
            .unwrap_or_else(|| format!("{}/api/scrape-gitcoin", journey_api_url));

        let http_timeout = var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECS must be a valid number")?;

        Ok(Self {
            journey_api_url,
            extractor_url,
            owner_address: var("OWNER_ADDRESS")
                .filter(|s| !s.is_empty())
                .map(OwnerIdentity::new),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}
