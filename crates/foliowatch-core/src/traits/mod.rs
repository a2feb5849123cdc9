// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits between the monitor's components.
//!
//! Every trait uses `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for mocks in tests.

pub mod settings;
pub mod sink;
pub mod source;
pub mod store;
pub mod submit;

pub use settings::SettingsSource;
pub use sink::NotificationSink;
pub use source::SnapshotSource;
pub use store::HistoryStore;
pub use submit::BatchSubmitter;
