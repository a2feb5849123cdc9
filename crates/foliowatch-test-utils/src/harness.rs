// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` assembles the ingestion stack on a temp SQLite file: the
//! history store, a capturing [`MockSink`], the alert service and the
//! ingestor. The temp directory lives as long as the harness.

use std::sync::Arc;

use foliowatch_alert::{AlertService, Ingestor};
use foliowatch_config::model::StorageConfig;
use foliowatch_core::{CRITICAL_THRESHOLD_KEY, FolioError, SettingsSource, WARNING_THRESHOLD_KEY};
use foliowatch_storage::SqliteHistoryStore;

use crate::mock_sink::MockSink;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    sink: MockSink,
    thresholds: Option<(i64, i64)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            sink: MockSink::new(),
            thresholds: None,
        }
    }

    /// Make every alert delivery fail.
    pub fn with_failing_sink(mut self) -> Self {
        self.sink = MockSink::failing();
        self
    }

    /// Override the seeded warning and critical thresholds.
    pub fn with_thresholds(mut self, warning: i64, critical: i64) -> Self {
        self.thresholds = Some((warning, critical));
        self
    }

    pub async fn build(self) -> Result<TestHarness, FolioError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| FolioError::Storage { source: e.into() })?;
        let config = StorageConfig {
            database_path: temp_dir
                .path()
                .join("foliowatch.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        };

        let store = SqliteHistoryStore::open(&config).await?;
        if let Some((warning, critical)) = self.thresholds {
            store
                .put_setting(WARNING_THRESHOLD_KEY, &warning.to_string(), None)
                .await?;
            store
                .put_setting(CRITICAL_THRESHOLD_KEY, &critical.to_string(), None)
                .await?;
        }

        let sink = Arc::new(self.sink);
        let alerts = AlertService::new(Arc::new(store.clone()), sink.clone());
        let ingestor = Ingestor::new(Arc::new(store.clone()), alerts);

        Ok(TestHarness {
            store,
            sink,
            ingestor,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete ingestion stack over a throwaway database.
pub struct TestHarness {
    pub store: SqliteHistoryStore,
    pub sink: Arc<MockSink>,
    pub ingestor: Ingestor,
    /// Storage settings pointing at the temp database.
    pub config: StorageConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with seeded thresholds and a sink that accepts everything.
    pub async fn new() -> Result<Self, FolioError> {
        Self::builder().build().await
    }
}
