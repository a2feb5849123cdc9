// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::AlertEvent;

/// Destination for alert events.
///
/// Called once per event. Callers log and swallow delivery failures, so an
/// implementation should not retry on its own.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    async fn deliver(&self, event: &AlertEvent) -> Result<(), FolioError>;
}
