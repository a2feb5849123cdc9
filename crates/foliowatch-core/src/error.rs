// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Foliowatch monitoring service.

use thiserror::Error;

/// The primary error type used across all Foliowatch crates.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration errors (invalid TOML, bad values, missing required settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-supplied input rejected at a query boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The external snapshot source could not be read.
    #[error("source error: {message}")]
    Source {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A batch could not be carried across the ingestion boundary.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An alert notification could not be delivered.
    #[error("notification error: {message}")]
    Notification {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FolioError {
    /// Returns `true` for errors caused by caller input rather than system failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, FolioError::Validation(_))
    }
}
