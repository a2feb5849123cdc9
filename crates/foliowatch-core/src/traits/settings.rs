// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime key/value settings.

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::Setting;

/// Key under which the warning threshold is stored.
pub const WARNING_THRESHOLD_KEY: &str = "AlertThreshold_Warning";

/// Key under which the critical threshold is stored.
pub const CRITICAL_THRESHOLD_KEY: &str = "AlertThreshold_Critical";

/// Read/write access to runtime settings.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Raw value for `key`, or `None` when unset.
    async fn get_setting(&self, key: &str) -> Result<Option<String>, FolioError>;

    /// Every stored setting, ordered by key.
    async fn list_settings(&self) -> Result<Vec<Setting>, FolioError>;

    /// Inserts or replaces a setting. A `None` description keeps the existing one.
    async fn put_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), FolioError>;
}
