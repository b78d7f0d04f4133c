// Collection source - the explorer's single network dependency

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::PublicPreserve;

/// The one external parameter the explorer receives at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub collection_url: String,
}

impl ClientConfig {
    pub fn new(collection_url: impl Into<String>) -> Self {
        Self {
            collection_url: collection_url.into(),
        }
    }
}

#[async_trait]
pub trait PreserveSource: Send + Sync {
    /// Fetch the complete published collection. Partial results are never returned.
    async fn fetch_collection(&self) -> AppResult<Vec<PublicPreserve>>;
}

pub struct HttpPreserveSource {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpPreserveSource {
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PreserveSource for HttpPreserveSource {
    async fn fetch_collection(&self) -> AppResult<Vec<PublicPreserve>> {
        debug!("Fetching preserve collection from {}", self.config.collection_url);
        let response = self
            .client
            .get(&self.config.collection_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "collection request failed with HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<Vec<PublicPreserve>>()
            .await
            .map_err(|e| AppError::Network(format!("collection response was not readable: {}", e)))
    }
}
