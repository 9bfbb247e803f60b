//! Per-URL harvesting: fetch, extract, assemble

use crate::config::Config;
use crate::extract::FieldExtractor;
use crate::fetch::RequestClient;
use crate::product::{assemble, ProductRecord};
use crate::HarvestError;
use chrono::Utc;

/// Turns one listing URL into one record
///
/// Holds the shared request client and compiled extraction rules for a
/// whole batch; neither keeps per-URL state.
pub struct Pipeline {
    client: RequestClient,
    extractor: FieldExtractor,
}

impl Pipeline {
    pub fn new(client: RequestClient, extractor: FieldExtractor) -> Self {
        Self { client, extractor }
    }

    /// Builds the pipeline with default extraction rules
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        Ok(Self {
            client: RequestClient::new(&config.fetch)?,
            extractor: FieldExtractor::new()?,
        })
    }

    /// Fetches and parses a single listing
    ///
    /// # Returns
    ///
    /// * `Ok(ProductRecord)` - The page was fetched; missing fields are empty
    /// * `Err(HarvestError::Fetch)` - Every fetch attempt failed
    pub async fn harvest(&self, url: &str) -> Result<ProductRecord, HarvestError> {
        let body = self.client.fetch(url).await?;
        let fields = self.extractor.extract(&body, url);

        if fields.title.is_empty() {
            tracing::debug!("No title found on {}", url);
        }

        Ok(assemble(fields, url, Utc::now()))
    }
}
