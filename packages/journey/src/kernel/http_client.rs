//! HTTP implementations of the stage collaborators.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use super::{BaseExtractor, BaseJourneyCreator, BaseJourneyInitializer};
use crate::domains::journeys::models::{CreateJourneyRequest, ExternalRecord, JourneyEntity};

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Scrape service client implementation of BaseExtractor
pub struct HttpExtractor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpExtractor {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BaseExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<ExternalRecord> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .context("Scrape request failed")?
            .error_for_status()
            .context("Scrape service returned an error status")?;

        response
            .json::<ExternalRecord>()
            .await
            .context("Scrape response was not a valid record")
    }
}

/// Journey API client implementation of BaseJourneyCreator and BaseJourneyInitializer
#[derive(Clone, Debug)]
pub struct HttpJourneyClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpJourneyClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .with_context(|| format!("Invalid journey API URL: {}", base_url.as_ref()))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Journey API URL cannot be a base: {}", base_url));
        }

        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    /// Append `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Journey API URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl BaseJourneyCreator for HttpJourneyClient {
    async fn create(&self, request: CreateJourneyRequest) -> Result<JourneyEntity> {
        let response = self
            .client
            .post(self.endpoint(&["journeys"])?)
            .json(&request)
            .send()
            .await
            .context("Create journey request failed")?
            .error_for_status()
            .context("Journey API rejected the creation")?;

        response
            .json::<JourneyEntity>()
            .await
            .context("Create journey response had no id")
    }
}

#[async_trait]
impl BaseJourneyInitializer for HttpJourneyClient {
    async fn initialize(&self, journey_id: &str, record: &ExternalRecord) -> Result<()> {
        self.client
            .post(self.endpoint(&["journeys", journey_id, "init", "gitcoin"])?)
            .json(record)
            .send()
            .await
            .context("Init journey request failed")?
            .error_for_status()
            .context("Journey API rejected the initialization")?;

        Ok(())
    }
}
