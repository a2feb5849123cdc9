// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alerting and ingestion for Foliowatch.
//!
//! [`Ingestor`] is the single entry point for incoming batches: it appends
//! them to the history store and runs the [`AlertService`], which resolves
//! thresholds from runtime settings, evaluates the batch, and passes each
//! event to a notification sink.

pub mod evaluator;
pub mod ingest;
pub mod service;
pub mod sinks;
pub mod thresholds;

pub use evaluator::evaluate;
pub use ingest::{IngestOutcome, Ingestor};
pub use service::{AlertService, CheckReport};
pub use sinks::{EmailSink, LogSink};
