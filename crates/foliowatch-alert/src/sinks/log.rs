// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use foliowatch_core::{AlertEvent, FolioError, NotificationSink};
use tracing::warn;

/// Writes each alert to the log at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, event: &AlertEvent) -> Result<(), FolioError> {
        warn!(
            level = %event.level,
            series = %event.series,
            available = event.available_count,
            threshold = event.threshold,
            "folio alert"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliowatch_core::{AlertLevel, SeriesKey};
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn logs_series_and_level() {
        let event = AlertEvent {
            level: AlertLevel::Critical,
            series: SeriesKey::new("S01", "MOD29", 1, 200),
            available_count: 15,
            threshold: 20,
            message: "low".into(),
        };
        LogSink.deliver(&event).await.unwrap();
        assert!(logs_contain("folio alert"));
        assert!(logs_contain("MOD29-S01-1-200"));
    }
}
