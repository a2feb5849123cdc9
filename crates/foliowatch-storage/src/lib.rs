// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Foliowatch.
//!
//! Holds the append-only availability history and the runtime settings table
//! behind a single-writer `tokio-rusqlite` connection with embedded
//! migrations. Also provides a snapshot source that reads counters from a
//! SQLite copy of the transactional system.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod source;
pub mod store;

pub use database::Database;
pub use source::{CONTROL_FOLIOS_SCHEMA, SqliteSnapshotSource};
pub use store::{SqliteHistoryStore, retention_cutoff};
