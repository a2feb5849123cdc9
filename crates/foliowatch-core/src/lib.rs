// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Foliowatch availability monitor.
//!
//! This crate provides the error type, domain types, the availability
//! calculator, and the boundary traits that connect the history store, the
//! alert evaluator, the poller, and the external source.

pub mod availability;
pub mod error;
pub mod traits;
pub mod types;

pub use error::FolioError;
pub use types::{
    AlertEvent, AlertLevel, AvailabilityRecord, BatchItem, FolioBatch, HealthStatus, HistoryQuery,
    Module, NewAvailabilityRecord, RawSnapshot, SeriesAvailability, SeriesKey, Setting,
    Thresholds, document_type_for,
};

pub use traits::settings::{CRITICAL_THRESHOLD_KEY, WARNING_THRESHOLD_KEY};
pub use traits::{BatchSubmitter, HistoryStore, NotificationSink, SettingsSource, SnapshotSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folio_error_has_all_variants() {
        let _config = FolioError::Config("test".into());
        let _validation = FolioError::Validation("test".into());
        let _storage = FolioError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _source = FolioError::Source {
            message: "test".into(),
            source: None,
        };
        let _transport = FolioError::Transport {
            message: "test".into(),
            source: None,
        };
        let _notification = FolioError::Notification {
            message: "test".into(),
            source: None,
        };
        let _internal = FolioError::Internal("test".into());
    }

    #[test]
    fn error_display_messages() {
        let err = FolioError::Validation("page number must be positive".into());
        assert_eq!(
            err.to_string(),
            "validation error: page number must be positive"
        );

        let err = FolioError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert_eq!(err.to_string(), "storage error: disk full");

        let err = FolioError::Transport {
            message: "status 502".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "transport error: status 502");
    }

    #[test]
    fn only_validation_is_validation() {
        assert!(FolioError::Validation("x".into()).is_validation());
        assert!(!FolioError::Internal("x".into()).is_validation());
        assert!(!FolioError::Config("x".into()).is_validation());
    }

    #[test]
    fn traits_are_object_safe() {
        fn _store(_: &dyn HistoryStore) {}
        fn _source(_: &dyn SnapshotSource) {}
        fn _sink(_: &dyn NotificationSink) {}
        fn _submit(_: &dyn BatchSubmitter) {}
        fn _settings(_: &dyn SettingsSource) {}
    }
}
