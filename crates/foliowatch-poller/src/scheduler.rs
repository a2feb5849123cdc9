// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The poll loop.
//!
//! One cycle reads snapshots for every tracked module, computes
//! availability, and submits a single batch. Cycles never overlap: a tick
//! that falls due while a cycle is running is skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use strum::Display;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use foliowatch_core::{
    BatchItem, BatchSubmitter, FolioBatch, FolioError, Module, SnapshotSource,
};

/// Lifecycle of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PollerState {
    /// Constructed, loop not started.
    Idle,
    /// Sleeping until the next tick.
    Waiting,
    /// A cycle is in flight.
    Executing,
    /// The loop has exited.
    Stopped,
}

/// Counts from one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub invoices: usize,
    pub credit_notes: usize,
}

pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    submitter: Arc<dyn BatchSubmitter>,
    interval: Duration,
    run_on_start: bool,
    state: watch::Sender<PollerState>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        submitter: Arc<dyn BatchSubmitter>,
        interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            source,
            submitter,
            interval,
            run_on_start: false,
            state,
        }
    }

    /// Run the first cycle immediately instead of after one full interval.
    pub fn run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    /// Reads both modules and submits one batch.
    ///
    /// A source failure aborts the cycle before anything is submitted.
    pub async fn run_cycle(&self) -> Result<CycleReport, FolioError> {
        let queried_at = Utc::now();
        let invoices = self.read(Module::Invoice).await?;
        let credit_notes = self.read(Module::CreditNote).await?;
        let batch = FolioBatch {
            queried_at,
            invoices,
            credit_notes,
        };

        self.submitter.submit(&batch).await?;
        Ok(CycleReport {
            invoices: batch.invoices.len(),
            credit_notes: batch.credit_notes.len(),
        })
    }

    async fn read(&self, module: Module) -> Result<Vec<BatchItem>, FolioError> {
        let snapshots = self.source.snapshots(module).await?;
        Ok(snapshots.iter().map(BatchItem::from).collect())
    }

    /// Runs until `cancel` fires.
    ///
    /// Cancellation is observed only between cycles; a cycle that has
    /// started always runs to completion.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !self.run_on_start {
            // The first tick completes immediately.
            interval.tick().await;
        }

        info!(
            interval_secs = self.interval.as_secs_f64(),
            run_on_start = self.run_on_start,
            "poller started"
        );

        loop {
            self.state.send_replace(PollerState::Waiting);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            self.state.send_replace(PollerState::Executing);
            debug!("poll cycle starting");
            match self.run_cycle().await {
                Ok(report) => info!(
                    invoices = report.invoices,
                    credit_notes = report.credit_notes,
                    "poll cycle completed"
                ),
                Err(e) => error!(error = %e, "poll cycle failed"),
            }
        }

        self.state.send_replace(PollerState::Stopped);
        info!("poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliowatch_test_utils::{MockSource, RecordingSubmitter};

    #[tokio::test]
    async fn cycle_submits_both_groups() {
        let source = Arc::new(
            MockSource::new()
                .with_series(Module::Invoice, "S01", 1, 100, Some(50))
                .with_series(Module::CreditNote, "S01", 1, 200, Some(185)),
        );
        let submitter = Arc::new(RecordingSubmitter::new());
        let poller = Poller::new(source, submitter.clone(), Duration::from_secs(60));

        let report = poller.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport { invoices: 1, credit_notes: 1 });

        let batches = submitter.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].invoices[0].available_count, 50);
        assert_eq!(batches[0].credit_notes[0].available_count, 15);
    }

    #[tokio::test]
    async fn source_failure_submits_nothing() {
        let source = Arc::new(MockSource::new().fail_next(1));
        let submitter = Arc::new(RecordingSubmitter::new());
        let poller = Poller::new(source, submitter.clone(), Duration::from_secs(60));

        let err = poller.run_cycle().await.unwrap_err();
        assert!(matches!(err, FolioError::Source { .. }));
        assert!(submitter.batches().is_empty());
    }

    #[tokio::test]
    async fn empty_source_still_submits() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let poller = Poller::new(
            Arc::new(MockSource::new()),
            submitter.clone(),
            Duration::from_secs(60),
        );
        poller.run_cycle().await.unwrap();
        assert!(submitter.batches()[0].is_empty());
    }

    #[tokio::test]
    async fn starts_idle() {
        let poller = Poller::new(
            Arc::new(MockSource::new()),
            Arc::new(RecordingSubmitter::new()),
            Duration::from_secs(60),
        );
        assert_eq!(poller.state(), PollerState::Idle);
        assert_eq!(PollerState::Executing.to_string(), "Executing");
    }
}
