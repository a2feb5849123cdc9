// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ways to hand a batch to the ingestion entry point.

use async_trait::async_trait;
use tracing::debug;

use foliowatch_alert::Ingestor;
use foliowatch_config::model::ApiConfig;
use foliowatch_core::{BatchSubmitter, FolioBatch, FolioError};

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Posts batches as JSON to a remote Foliowatch API.
pub struct HttpSubmitter {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpSubmitter {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }

    /// Builds a submitter from `[api]`, or `None` when no base URL is set.
    pub fn from_config(config: &ApiConfig) -> Option<Self> {
        config
            .update_url()
            .map(|url| Self::new(url, config.api_key.clone()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BatchSubmitter for HttpSubmitter {
    async fn submit(&self, batch: &FolioBatch) -> Result<(), FolioError> {
        let mut request = self.client.post(&self.url).json(batch);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| FolioError::Transport {
            message: format!("request to {} failed", self.url),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FolioError::Transport {
                message: format!("ingestion endpoint returned {status}: {body}"),
                source: None,
            });
        }

        debug!(url = %self.url, series = batch.len(), %status, "batch submitted");
        Ok(())
    }
}

/// Ingests batches in the same process.
pub struct LocalSubmitter {
    ingestor: Ingestor,
}

impl LocalSubmitter {
    pub fn new(ingestor: Ingestor) -> Self {
        Self { ingestor }
    }
}

#[async_trait]
impl BatchSubmitter for LocalSubmitter {
    async fn submit(&self, batch: &FolioBatch) -> Result<(), FolioError> {
        self.ingestor.ingest(batch).await.map(|_| ())
    }
}
