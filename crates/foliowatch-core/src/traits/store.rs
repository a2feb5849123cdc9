// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History store contract.

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::{AvailabilityRecord, HealthStatus, HistoryQuery, Module, NewAvailabilityRecord};

/// Append-only availability history with derived latest-state views.
///
/// Records are never mutated once written. The only way a record leaves the
/// store is through [`HistoryStore::delete_older_than`].
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a batch atomically. Every record in the batch shares one
    /// ingestion timestamp. An empty batch does nothing.
    async fn add_batch(&self, records: &[NewAvailabilityRecord]) -> Result<usize, FolioError>;

    /// The most recently ingested record for every distinct series.
    async fn latest(&self) -> Result<Vec<AvailabilityRecord>, FolioError>;

    /// Same as [`HistoryStore::latest`], restricted to one module.
    async fn latest_by_module(&self, module: Module)
    -> Result<Vec<AvailabilityRecord>, FolioError>;

    /// One page of history, newest first.
    async fn history(&self, query: &HistoryQuery) -> Result<Vec<AvailabilityRecord>, FolioError>;

    /// Removes records ingested before the start of the day `retention_days`
    /// ago. Non-positive values delete nothing and return `0`.
    async fn delete_older_than(&self, retention_days: i64) -> Result<usize, FolioError>;

    /// Probes the backend.
    async fn health_check(&self) -> Result<HealthStatus, FolioError>;
}
