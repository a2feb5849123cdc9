// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolves alert thresholds from runtime settings.

use foliowatch_core::{CRITICAL_THRESHOLD_KEY, SettingsSource, Thresholds, WARNING_THRESHOLD_KEY};
use tracing::{error, warn};

/// Reads both thresholds, substituting the default for each one that is
/// missing, unreadable, or not an integer. Never fails.
pub async fn resolve(settings: &dyn SettingsSource) -> Thresholds {
    Thresholds {
        warning: read_one(settings, WARNING_THRESHOLD_KEY, Thresholds::DEFAULT_WARNING).await,
        critical: read_one(settings, CRITICAL_THRESHOLD_KEY, Thresholds::DEFAULT_CRITICAL).await,
    }
}

async fn read_one(settings: &dyn SettingsSource, key: &str, default: i64) -> i64 {
    match settings.get_setting(key).await {
        Ok(raw) => match parse(raw.as_deref()) {
            Some(value) => value,
            None => {
                warn!(
                    key,
                    raw = raw.as_deref().unwrap_or("<unset>"),
                    default,
                    "threshold missing or not an integer, using default"
                );
                default
            }
        },
        Err(e) => {
            error!(key, error = %e, default, "failed to read threshold, using default");
            default
        }
    }
}

fn parse(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse().ok()
}
