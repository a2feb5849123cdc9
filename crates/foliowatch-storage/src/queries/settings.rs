// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value settings table.

use foliowatch_core::{FolioError, Setting};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

pub async fn get(db: &Database, key: &str) -> Result<Option<String>, FolioError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn list(db: &Database) -> Result<Vec<Setting>, FolioError> {
    db.connection()
        .call(|conn| -> Result<Vec<Setting>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT key, value, description FROM settings ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                Ok(Setting {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    description: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts or replaces a value. Passing no description keeps the stored one.
pub async fn upsert(
    db: &Database,
    key: &str,
    value: &str,
    description: Option<&str>,
) -> Result<(), FolioError> {
    let key = key.to_string();
    let value = value.to_string();
    let description = description.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO settings (key, value, description, updated_at)
                 VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     description = COALESCE(excluded.description, settings.description),
                     updated_at = excluded.updated_at",
                params![key, value, description],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn thresholds_are_seeded() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(
            get(&db, "AlertThreshold_Warning").await.unwrap().as_deref(),
            Some("100")
        );
        assert_eq!(
            get(&db, "AlertThreshold_Critical").await.unwrap().as_deref(),
            Some("20")
        );
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get(&db, "NoSuchKey").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_keeps_description_when_omitted() {
        let db = Database::open_in_memory().await.unwrap();
        upsert(&db, "RetentionNote", "a", Some("free text")).await.unwrap();
        upsert(&db, "RetentionNote", "b", None).await.unwrap();

        let all = list(&db).await.unwrap();
        let note = all.iter().find(|s| s.key == "RetentionNote").unwrap();
        assert_eq!(note.value, "b");
        assert_eq!(note.description.as_deref(), Some("free text"));
    }

    #[tokio::test]
    async fn list_is_sorted_by_key() {
        let db = Database::open_in_memory().await.unwrap();
        upsert(&db, "Zeta", "1", None).await.unwrap();
        upsert(&db, "Alpha", "1", None).await.unwrap();
        let keys: Vec<_> = list(&db).await.unwrap().into_iter().map(|s| s.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
