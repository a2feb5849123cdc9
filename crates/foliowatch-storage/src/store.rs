// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the history store and settings source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tracing::{debug, info};

use foliowatch_config::model::StorageConfig;
use foliowatch_core::{
    AvailabilityRecord, FolioError, HealthStatus, HistoryQuery, HistoryStore, Module,
    NewAvailabilityRecord, Setting, SettingsSource,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed availability history.
///
/// Cheap to clone; clones share the same background connection.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    db: Database,
}

impl SqliteHistoryStore {
    /// Opens the database named in `config`, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, FolioError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        info!(path = %config.database_path, "history store opened");
        Ok(Self { db })
    }

    /// Wraps an already opened database.
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Appends a batch with an explicit ingestion time.
    pub async fn add_batch_at(
        &self,
        records: &[NewAvailabilityRecord],
        ingested_at: DateTime<Utc>,
    ) -> Result<usize, FolioError> {
        let written = queries::history::insert_batch(&self.db, records, ingested_at).await?;
        if written > 0 {
            debug!(records = written, %ingested_at, "history batch appended");
        }
        Ok(written)
    }

    /// Retention pruning evaluated against an explicit "now".
    pub async fn delete_older_than_at(
        &self,
        retention_days: i64,
        now: DateTime<Utc>,
    ) -> Result<usize, FolioError> {
        let Some(cutoff) = retention_cutoff(retention_days, now) else {
            return Ok(0);
        };
        let deleted = queries::history::delete_before(&self.db, cutoff).await?;
        info!(retention_days, %cutoff, deleted, "history pruned");
        Ok(deleted)
    }

    /// Number of stored history records.
    pub async fn record_count(&self) -> Result<i64, FolioError> {
        queries::history::count(&self.db).await
    }

    /// Checkpoints the WAL and closes the shared connection.
    pub async fn close(&self) -> Result<(), FolioError> {
        self.db.clone().close().await
    }
}

/// Start of the UTC day `retention_days` before `now`.
///
/// `None` when nothing should be pruned: a non-positive retention, or one so
/// large it reaches past the representable calendar.
pub fn retention_cutoff(retention_days: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if retention_days <= 0 {
        return None;
    }
    let shifted = TimeDelta::try_days(retention_days).and_then(|d| now.checked_sub_signed(d))?;
    Some(shifted.date_naive().and_time(NaiveTime::MIN).and_utc())
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn add_batch(&self, records: &[NewAvailabilityRecord]) -> Result<usize, FolioError> {
        self.add_batch_at(records, Utc::now()).await
    }

    async fn latest(&self) -> Result<Vec<AvailabilityRecord>, FolioError> {
        queries::history::latest(&self.db, None).await
    }

    async fn latest_by_module(
        &self,
        module: Module,
    ) -> Result<Vec<AvailabilityRecord>, FolioError> {
        queries::history::latest(&self.db, Some(module.code())).await
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<AvailabilityRecord>, FolioError> {
        queries::history::page(&self.db, query).await
    }

    async fn delete_older_than(&self, retention_days: i64) -> Result<usize, FolioError> {
        self.delete_older_than_at(retention_days, Utc::now()).await
    }

    async fn health_check(&self) -> Result<HealthStatus, FolioError> {
        let probe = self
            .db
            .connection()
            .call(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))
            .await
            .map_err(map_tr_err);
        Ok(match probe {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[async_trait]
impl SettingsSource for SqliteHistoryStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>, FolioError> {
        queries::settings::get(&self.db, key).await
    }

    async fn list_settings(&self) -> Result<Vec<Setting>, FolioError> {
        queries::settings::list(&self.db).await
    }

    async fn put_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), FolioError> {
        queries::settings::upsert(&self.db, key, value, description).await?;
        info!(key, value, "setting updated");
        Ok(())
    }
}
