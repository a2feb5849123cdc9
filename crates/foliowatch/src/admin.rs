// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot maintenance commands: `cleanup` and `settings`.

use tracing::{info, warn};

use foliowatch_config::FolioConfig;
use foliowatch_core::{
    CRITICAL_THRESHOLD_KEY, FolioError, HistoryStore, SettingsSource, WARNING_THRESHOLD_KEY,
};

use crate::SettingsAction;
use crate::serve::open_store;

/// `foliowatch cleanup`: prune history with the configured or given retention.
pub async fn run_cleanup(config: &FolioConfig, days: Option<i64>) -> Result<(), FolioError> {
    let retention_days = days.unwrap_or_else(|| config.retention.days());
    if retention_days <= 0 {
        warn!(retention_days, "retention is not positive, nothing will be deleted");
    }

    let store = open_store(config).await?;
    let deleted = store.delete_older_than(retention_days).await?;
    info!(deleted, retention_days, "history cleanup completed");
    println!("deleted {deleted} history record(s) older than {retention_days} day(s)");

    store.close().await
}

/// `foliowatch settings get|set|list`.
pub async fn run_settings(config: &FolioConfig, action: SettingsAction) -> Result<(), FolioError> {
    let store = open_store(config).await?;

    match action {
        SettingsAction::Get { key } => match store.get_setting(&key).await? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        SettingsAction::Set {
            key,
            value,
            description,
        } => {
            check_value(&key, &value)?;
            store
                .put_setting(&key, &value, description.as_deref())
                .await?;
            info!(key = %key, value = %value, "setting updated");
            println!("{key} = {value}");
        }
        SettingsAction::List => {
            for setting in store.list_settings().await? {
                match setting.description {
                    Some(description) => {
                        println!("{} = {}  # {description}", setting.key, setting.value)
                    }
                    None => println!("{} = {}", setting.key, setting.value),
                }
            }
        }
    }

    store.close().await
}

/// Threshold settings must be integers; everything else is free-form.
fn check_value(key: &str, value: &str) -> Result<(), FolioError> {
    if key == WARNING_THRESHOLD_KEY || key == CRITICAL_THRESHOLD_KEY {
        value.trim().parse::<i64>().map_err(|_| {
            FolioError::Validation(format!("{key} must be an integer, got `{value}`"))
        })?;
    }
    Ok(())
}
