// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sinks.

pub mod email;
pub mod log;

use std::sync::Arc;

use foliowatch_config::model::SmtpConfig;
use foliowatch_core::NotificationSink;

pub use email::EmailSink;
pub use self::log::LogSink;

/// Picks the sink for the given SMTP settings: email when enabled, log otherwise.
pub fn from_config(smtp: &SmtpConfig) -> Arc<dyn NotificationSink> {
    if smtp.enabled {
        Arc::new(EmailSink::new(smtp.clone()))
    } else {
        Arc::new(LogSink)
    }
}
