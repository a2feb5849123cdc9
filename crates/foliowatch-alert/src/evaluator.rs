// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure threshold classification.

use std::collections::HashSet;

use foliowatch_core::{AlertEvent, AlertLevel, SeriesAvailability, SeriesKey, Thresholds};

/// Classifies a single available count. Critical wins over warning.
pub fn classify(available_count: i64, thresholds: &Thresholds) -> Option<(AlertLevel, i64)> {
    if available_count <= thresholds.critical {
        Some((AlertLevel::Critical, thresholds.critical))
    } else if available_count <= thresholds.warning {
        Some((AlertLevel::Warning, thresholds.warning))
    } else {
        None
    }
}

/// Produces alert events for `items`, in input order.
///
/// At most one event is produced per `(series, level)`; later duplicates in
/// the same call are dropped.
pub fn evaluate(items: &[SeriesAvailability], thresholds: &Thresholds) -> Vec<AlertEvent> {
    let mut seen: HashSet<(&SeriesKey, AlertLevel)> = HashSet::new();
    let mut events = Vec::new();

    for item in items {
        let Some((level, threshold)) = classify(item.available_count, thresholds) else {
            continue;
        };
        if !seen.insert((&item.series, level)) {
            continue;
        }
        events.push(AlertEvent {
            level,
            series: item.series.clone(),
            available_count: item.available_count,
            threshold,
            message: format!(
                "{level} alert for series {}: {} folios available (threshold {threshold})",
                item.series, item.available_count
            ),
        });
    }

    events
}
