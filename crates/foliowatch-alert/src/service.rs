// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert checking: threshold lookup, evaluation, and delivery.

use std::sync::Arc;

use foliowatch_core::{AlertEvent, NotificationSink, SeriesAvailability, SettingsSource};
use tracing::{info, warn};

use crate::{evaluator, thresholds};

/// Summary of one alert check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckReport {
    /// Events produced by the evaluator.
    pub raised: usize,
    /// Events the sink accepted.
    pub delivered: usize,
}

/// Reads thresholds, evaluates a batch, and hands each event to the sink.
#[derive(Clone)]
pub struct AlertService {
    settings: Arc<dyn SettingsSource>,
    sink: Arc<dyn NotificationSink>,
}

impl AlertService {
    pub fn new(settings: Arc<dyn SettingsSource>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { settings, sink }
    }

    /// Runs one check. Delivery failures are logged per event and never
    /// stop the remaining events.
    pub async fn check(&self, items: &[SeriesAvailability]) -> CheckReport {
        let thresholds = thresholds::resolve(self.settings.as_ref()).await;
        let events = evaluator::evaluate(items, &thresholds);

        let mut report = CheckReport {
            raised: events.len(),
            delivered: 0,
        };
        for event in &events {
            if self.deliver(event).await {
                report.delivered += 1;
            }
        }

        info!(
            series = items.len(),
            warning = thresholds.warning,
            critical = thresholds.critical,
            raised = report.raised,
            delivered = report.delivered,
            "alert check completed"
        );
        report
    }

    async fn deliver(&self, event: &AlertEvent) -> bool {
        match self.sink.deliver(event).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    sink = self.sink.name(),
                    series = %event.series,
                    level = %event.level,
                    error = %e,
                    "alert delivery failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use foliowatch_core::{AlertLevel, FolioError, SeriesKey, Setting};
    use std::sync::Mutex;

    struct NoSettings;

    #[async_trait]
    impl SettingsSource for NoSettings {
        async fn get_setting(&self, _: &str) -> Result<Option<String>, FolioError> {
            Ok(None)
        }
        async fn list_settings(&self) -> Result<Vec<Setting>, FolioError> {
            Ok(Vec::new())
        }
        async fn put_setting(&self, _: &str, _: &str, _: Option<&str>) -> Result<(), FolioError> {
            Ok(())
        }
    }

    /// Records deliveries; fails for stores listed in `fail_for`.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, AlertLevel)>>,
        fail_for: Vec<&'static str>,
    }

    #[async_trait]
    impl NotificationSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn deliver(&self, event: &AlertEvent) -> Result<(), FolioError> {
            self.seen
                .lock()
                .unwrap()
                .push((event.series.store_code.clone(), event.level));
            if self.fail_for.iter().any(|s| *s == event.series.store_code) {
                return Err(FolioError::Notification {
                    message: "mailbox full".into(),
                    source: None,
                });
            }
            Ok(())
        }
    }

    fn item(store: &str, available: i64) -> SeriesAvailability {
        SeriesAvailability {
            series: SeriesKey::new(store, "MOD28", 1, 100),
            available_count: available,
        }
    }

    #[tokio::test]
    async fn delivers_in_evaluation_order() {
        let sink = Arc::new(Recorder::default());
        let service = AlertService::new(Arc::new(NoSettings), sink.clone());
        let report = service
            .check(&[item("A", 50), item("B", 500), item("C", 5)])
            .await;

        assert_eq!(report, CheckReport { raised: 2, delivered: 2 });
        let seen = sink.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("A".to_string(), AlertLevel::Warning),
                ("C".to_string(), AlertLevel::Critical)
            ]
        );
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_the_rest() {
        let sink = Arc::new(Recorder {
            fail_for: vec!["A"],
            ..Recorder::default()
        });
        let service = AlertService::new(Arc::new(NoSettings), sink.clone());
        let report = service.check(&[item("A", 5), item("B", 5)]).await;

        assert_eq!(report, CheckReport { raised: 2, delivered: 1 });
        assert_eq!(sink.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_critical_items_raise_once() {
        let sink = Arc::new(Recorder::default());
        let service = AlertService::new(Arc::new(NoSettings), sink.clone());
        let report = service.check(&[item("A", 3), item("A", 3)]).await;
        assert_eq!(report.raised, 1);
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }
}
