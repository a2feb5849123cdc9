// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ingestion entry point: append a batch, then check it for alerts.

use std::sync::Arc;

use foliowatch_core::{
    FolioBatch, FolioError, HistoryStore, NewAvailabilityRecord, SeriesAvailability,
};
use tracing::{debug, info};

use crate::service::{AlertService, CheckReport};

/// What happened to one submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The batch had no series; nothing was stored or checked.
    Empty,
    /// The batch was stored and checked.
    Stored { records: usize, alerts: CheckReport },
}

/// Stores batches and triggers alert checks.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn HistoryStore>,
    alerts: AlertService,
}

impl Ingestor {
    pub fn new(store: Arc<dyn HistoryStore>, alerts: AlertService) -> Self {
        Self { store, alerts }
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Appends the batch atomically and then evaluates it.
    ///
    /// If the append fails the error is returned and no alerts are checked.
    pub async fn ingest(&self, batch: &FolioBatch) -> Result<IngestOutcome, FolioError> {
        if batch.is_empty() {
            debug!("empty batch received, nothing to ingest");
            return Ok(IngestOutcome::Empty);
        }

        let records: Vec<NewAvailabilityRecord> =
            batch.items().map(NewAvailabilityRecord::from).collect();
        let written = self.store.add_batch(&records).await?;
        info!(
            invoices = batch.invoices.len(),
            credit_notes = batch.credit_notes.len(),
            records = written,
            "batch ingested"
        );

        let items: Vec<SeriesAvailability> = batch.items().map(SeriesAvailability::from).collect();
        let alerts = self.alerts.check(&items).await;

        Ok(IngestOutcome::Stored {
            records: written,
            alerts,
        })
    }
}
