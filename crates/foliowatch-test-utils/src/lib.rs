// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Foliowatch integration tests.
//!
//! Provides mock adapters and a harness so pipeline tests run against a
//! throwaway SQLite file without a live source system or mail server.
//!
//! # Components
//!
//! - [`MockSource`] - Snapshot source with scripted series and failures
//! - [`MockSink`] - Notification sink that captures alert events
//! - [`RecordingSubmitter`] - Batch submitter that records what it was given
//! - [`TestHarness`] - Temp database, store, alert service and ingestor

pub mod harness;
pub mod mock_sink;
pub mod mock_source;
pub mod recording_submitter;

pub use harness::TestHarness;
pub use mock_sink::MockSink;
pub use mock_source::MockSource;
pub use recording_submitter::RecordingSubmitter;
