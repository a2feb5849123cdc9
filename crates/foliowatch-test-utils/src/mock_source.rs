// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted snapshot source.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use foliowatch_core::{FolioError, Module, RawSnapshot, SeriesKey, SnapshotSource};

/// A snapshot source returning a fixed set of series.
///
/// `fail_next(n)` makes the next `n` calls to `snapshots()` fail with a
/// [`FolioError::Source`] before the source starts answering again.
pub struct MockSource {
    series: Vec<RawSnapshot>,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Adds an active series under `module`.
    pub fn with_series(
        mut self,
        module: Module,
        store_code: &str,
        range_start: i64,
        range_end: i64,
        current_counter: Option<i64>,
    ) -> Self {
        self.series.push(RawSnapshot {
            series: SeriesKey::new(store_code, module.code(), range_start, range_end),
            current_counter,
            active: true,
            source_timestamp: source_timestamp(),
        });
        self
    }

    /// Adds a snapshot as-is, including inactive ones.
    pub fn with_snapshot(mut self, snapshot: RawSnapshot) -> Self {
        self.series.push(snapshot);
        self
    }

    pub fn fail_next(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    /// Number of `snapshots()` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Timestamp stamped on every scripted snapshot.
pub fn source_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0)
        .single()
        .unwrap_or_default()
}

#[async_trait]
impl SnapshotSource for MockSource {
    async fn snapshots(&self, module: Module) -> Result<Vec<RawSnapshot>, FolioError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FolioError::Source {
                message: format!("mock source unavailable for {}", module.code()),
                source: None,
            });
        }

        Ok(self
            .series
            .iter()
            .filter(|s| s.series.module_code == module.code())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_module() {
        let source = MockSource::new()
            .with_series(Module::Invoice, "S01", 1, 100, Some(50))
            .with_series(Module::CreditNote, "S01", 1, 200, None);

        let invoices = source.snapshots(Module::Invoice).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].series.module_code, "MOD28");
        assert_eq!(source.snapshots(Module::CreditNote).await.unwrap().len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failures_run_out() {
        let source = MockSource::new().fail_next(2);
        assert!(source.snapshots(Module::Invoice).await.is_err());
        assert!(source.snapshots(Module::Invoice).await.is_err());
        assert!(source.snapshots(Module::Invoice).await.is_ok());
    }
}
