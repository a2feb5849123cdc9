// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic polling of the external source.
//!
//! The [`Poller`] wakes on a fixed interval, reads raw counters through a
//! [`SnapshotSource`](foliowatch_core::SnapshotSource), and submits one
//! batch per cycle through a [`BatchSubmitter`](foliowatch_core::BatchSubmitter):
//! over HTTP to a remote API, or straight into an in-process ingestor.

pub mod scheduler;
pub mod shutdown;
pub mod submit;

pub use scheduler::{CycleReport, Poller, PollerState};
pub use shutdown::install_signal_handler;
pub use submit::{API_KEY_HEADER, HttpSubmitter, LocalSubmitter};
