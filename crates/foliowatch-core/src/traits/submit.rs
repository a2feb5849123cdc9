// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::FolioBatch;

/// Carries a batch from the poller to the ingestion entry point.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    async fn submit(&self, batch: &FolioBatch) -> Result<(), FolioError>;
}
