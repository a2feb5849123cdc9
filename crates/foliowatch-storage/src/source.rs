// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot source backed by the transactional system's `control_folios` table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::params;
use tracing::debug;

use foliowatch_core::{FolioError, Module, RawSnapshot, SeriesKey, SnapshotSource};

use crate::queries::parse_ts;

/// Layout of the table this source reads. The table belongs to the external
/// system; it is only created here for local setups and tests.
pub const CONTROL_FOLIOS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS control_folios (
    store_code TEXT NOT NULL,
    module TEXT NOT NULL,
    range_start INTEGER NOT NULL,
    range_end INTEGER NOT NULL,
    current_counter INTEGER,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)";

/// Reads counters for one module at a time from a SQLite database.
pub struct SqliteSnapshotSource {
    conn: tokio_rusqlite::Connection,
}

impl SqliteSnapshotSource {
    pub async fn open(path: &str) -> Result<Self, FolioError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| source_error("cannot open snapshot source", e))?;
        Ok(Self { conn })
    }

    pub fn new(conn: tokio_rusqlite::Connection) -> Self {
        Self { conn }
    }
}

fn source_error(
    message: &str,
    e: impl std::error::Error + Send + Sync + 'static,
) -> FolioError {
    FolioError::Source {
        message: message.to_string(),
        source: Some(Box::new(e)),
    }
}

/// Accepts RFC 3339 as well as SQLite's `YYYY-MM-DD HH:MM:SS[.fff]`, read as UTC.
fn parse_created_at(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(naive) => Ok(naive.and_utc()),
        Err(_) => parse_ts(idx, raw),
    }
}

#[async_trait]
impl SnapshotSource for SqliteSnapshotSource {
    async fn snapshots(&self, module: Module) -> Result<Vec<RawSnapshot>, FolioError> {
        let code = module.code();
        let snapshots = self
            .conn
            .call(move |conn| -> Result<Vec<RawSnapshot>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT store_code, module, range_start, range_end, current_counter, active, created_at
                     FROM control_folios
                     WHERE module = ?1 AND active = 1
                     ORDER BY store_code, range_start",
                )?;
                let rows = stmt.query_map(params![code], |row| {
                    Ok(RawSnapshot {
                        series: SeriesKey {
                            store_code: row.get(0)?,
                            module_code: row.get(1)?,
                            range_start: row.get(2)?,
                            range_end: row.get(3)?,
                        },
                        current_counter: row.get(4)?,
                        active: row.get(5)?,
                        source_timestamp: parse_created_at(6, &row.get::<_, String>(6)?)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, rusqlite::Error>>()
            })
            .await
            .map_err(|e| source_error("snapshot query failed", e))?;
        debug!(module = code, series = snapshots.len(), "snapshots read");
        Ok(snapshots)
    }
}
