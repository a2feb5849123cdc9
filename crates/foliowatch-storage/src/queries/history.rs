// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability history: batch append, latest-per-series, paging, pruning.

use chrono::{DateTime, Utc};
use foliowatch_core::{AvailabilityRecord, FolioError, HistoryQuery, NewAvailabilityRecord, SeriesKey};
use rusqlite::params;

use super::{format_ts, parse_ts};
use crate::database::{Database, map_tr_err};

const RECORD_COLUMNS: &str = "id, store_code, module_code, range_start, range_end, \
     current_counter, available_count, active, source_timestamp, ingested_at";

/// Appends `records` in one transaction, stamping each with `ingested_at`.
///
/// Returns the number of rows written. An empty slice never touches the
/// database.
pub async fn insert_batch(
    db: &Database,
    records: &[NewAvailabilityRecord],
    ingested_at: DateTime<Utc>,
) -> Result<usize, FolioError> {
    if records.is_empty() {
        return Ok(0);
    }
    let records = records.to_vec();
    let ingested_at = format_ts(&ingested_at);
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO folio_history (store_code, module_code, range_start, range_end,
                         current_counter, available_count, active, source_timestamp, ingested_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                )?;
                for record in &records {
                    stmt.execute(params![
                        record.series.store_code,
                        record.series.module_code,
                        record.series.range_start,
                        record.series.range_end,
                        record.current_counter,
                        record.available_count,
                        record.active,
                        format_ts(&record.source_timestamp),
                        ingested_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(records.len())
        })
        .await
        .map_err(map_tr_err)
}

/// Latest record for every series, optionally restricted to one module code.
pub async fn latest(
    db: &Database,
    module_code: Option<&str>,
) -> Result<Vec<AvailabilityRecord>, FolioError> {
    let module_code = module_code.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<Vec<AvailabilityRecord>, rusqlite::Error> {
            let sql = format!(
                "SELECT {RECORD_COLUMNS} FROM (
                     SELECT *, ROW_NUMBER() OVER (
                         PARTITION BY store_code, module_code, range_start, range_end
                         ORDER BY ingested_at DESC, id DESC
                     ) AS rn
                     FROM folio_history
                     WHERE (?1 IS NULL OR module_code = ?1)
                 )
                 WHERE rn = 1
                 ORDER BY module_code, store_code, range_start, range_end"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![module_code], row_to_record)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// One page of history, newest ingestion first.
///
/// Date bounds are inclusive whole days in UTC.
pub async fn page(
    db: &Database,
    query: &HistoryQuery,
) -> Result<Vec<AvailabilityRecord>, FolioError> {
    let module_code = query.module().map(|m| m.code().to_string());
    let from = query
        .start_date()
        .map(|d| format!("{}T00:00:00.000000Z", d.format("%Y-%m-%d")));
    let through = query
        .end_date()
        .map(|d| format!("{}T23:59:59.999999Z", d.format("%Y-%m-%d")));
    let limit = i64::from(query.page_size());
    let offset = i64::try_from(query.offset())
        .map_err(|_| FolioError::Validation("page is out of range".to_string()))?;

    db.connection()
        .call(move |conn| -> Result<Vec<AvailabilityRecord>, rusqlite::Error> {
            let sql = format!(
                "SELECT {RECORD_COLUMNS} FROM folio_history
                 WHERE (?1 IS NULL OR module_code = ?1)
                   AND (?2 IS NULL OR ingested_at >= ?2)
                   AND (?3 IS NULL OR ingested_at <= ?3)
                 ORDER BY ingested_at DESC, id DESC
                 LIMIT ?4 OFFSET ?5"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![module_code, from, through, limit, offset],
                row_to_record,
            )?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes every record ingested strictly before `cutoff`.
pub async fn delete_before(db: &Database, cutoff: DateTime<Utc>) -> Result<usize, FolioError> {
    let cutoff = format_ts(&cutoff);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM folio_history WHERE ingested_at < ?1",
                params![cutoff],
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of stored records.
pub async fn count(db: &Database) -> Result<i64, FolioError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM folio_history", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<AvailabilityRecord, rusqlite::Error> {
    let source_timestamp: String = row.get(8)?;
    let ingested_at: String = row.get(9)?;
    Ok(AvailabilityRecord {
        id: row.get(0)?,
        series: SeriesKey {
            store_code: row.get(1)?,
            module_code: row.get(2)?,
            range_start: row.get(3)?,
            range_end: row.get(4)?,
        },
        current_counter: row.get(5)?,
        available_count: row.get(6)?,
        active: row.get(7)?,
        source_timestamp: parse_ts(8, &source_timestamp)?,
        ingested_at: parse_ts(9, &ingested_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(store: &str, module: &str, counter: Option<i64>, available: i64) -> NewAvailabilityRecord {
        NewAvailabilityRecord {
            series: SeriesKey::new(store, module, 1, 100),
            current_counter: counter,
            available_count: available,
            active: true,
            source_timestamp: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn batch_shares_one_ingestion_time() {
        let db = Database::open_in_memory().await.unwrap();
        let written = insert_batch(
            &db,
            &[record("S01", "MOD28", Some(10), 90), record("S02", "MOD29", None, 100)],
            at(5, 10),
        )
        .await
        .unwrap();
        assert_eq!(written, 2);

        let rows = latest(&db, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.ingested_at == at(5, 10)));
        assert!(rows.iter().any(|r| r.current_counter.is_none()));
    }

    #[tokio::test]
    async fn empty_batch_writes_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(insert_batch(&db, &[], at(5, 10)).await.unwrap(), 0);
        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn latest_picks_newest_ingestion_per_series() {
        let db = Database::open_in_memory().await.unwrap();
        insert_batch(&db, &[record("S01", "MOD28", Some(10), 90)], at(1, 8))
            .await
            .unwrap();
        insert_batch(&db, &[record("S01", "MOD28", Some(60), 40)], at(3, 8))
            .await
            .unwrap();
        insert_batch(&db, &[record("S01", "MOD28", Some(30), 70)], at(2, 8))
            .await
            .unwrap();

        let rows = latest(&db, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].available_count, 40);
    }

    #[tokio::test]
    async fn latest_breaks_ties_by_highest_id() {
        let db = Database::open_in_memory().await.unwrap();
        insert_batch(&db, &[record("S01", "MOD28", Some(10), 90)], at(1, 8))
            .await
            .unwrap();
        insert_batch(&db, &[record("S01", "MOD28", Some(20), 80)], at(1, 8))
            .await
            .unwrap();

        let rows = latest(&db, None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].available_count, 80);
    }

    #[tokio::test]
    async fn latest_distinguishes_ranges_of_one_store() {
        let db = Database::open_in_memory().await.unwrap();
        let mut second_range = record("S01", "MOD28", Some(150), 50);
        second_range.series.range_start = 101;
        second_range.series.range_end = 200;
        insert_batch(&db, &[record("S01", "MOD28", Some(10), 90), second_range], at(1, 8))
            .await
            .unwrap();

        assert_eq!(latest(&db, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn latest_filters_by_module() {
        let db = Database::open_in_memory().await.unwrap();
        insert_batch(
            &db,
            &[record("S01", "MOD28", Some(10), 90), record("S01", "MOD29", Some(5), 95)],
            at(1, 8),
        )
        .await
        .unwrap();

        let invoices = latest(&db, Some("MOD28")).await.unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].series.module_code, "MOD28");
    }

    #[tokio::test]
    async fn page_day_bounds_are_inclusive() {
        let db = Database::open_in_memory().await.unwrap();
        let start_of_day = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let end_of_day = start_of_day + Duration::days(1) - Duration::microseconds(1);
        let next_day = start_of_day + Duration::days(1);
        insert_batch(&db, &[record("A", "MOD28", None, 100)], start_of_day)
            .await
            .unwrap();
        insert_batch(&db, &[record("B", "MOD28", None, 100)], end_of_day)
            .await
            .unwrap();
        insert_batch(&db, &[record("C", "MOD28", None, 100)], next_day)
            .await
            .unwrap();

        let day = start_of_day.date_naive();
        let query = HistoryQuery::new(None, Some(day), Some(day), 1, 10).unwrap();
        let rows = page(&db, &query).await.unwrap();
        let stores: Vec<_> = rows.iter().map(|r| r.series.store_code.as_str()).collect();
        assert_eq!(stores, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn delete_before_is_strict() {
        let db = Database::open_in_memory().await.unwrap();
        insert_batch(&db, &[record("A", "MOD28", None, 100)], at(1, 0))
            .await
            .unwrap();
        insert_batch(&db, &[record("B", "MOD28", None, 100)], at(2, 0))
            .await
            .unwrap();

        assert_eq!(delete_before(&db, at(2, 0)).await.unwrap(), 1);
        let remaining = latest(&db, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].series.store_code, "B");
    }
}
