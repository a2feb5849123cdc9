// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use std::time::Duration;

use figment::error::Actual;
use figment::value::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Top-level Foliowatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    /// History database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    /// Poll scheduler settings.
    #[serde(default)]
    pub poller: PollerConfig,

    /// External snapshot source.
    #[serde(default)]
    pub source: SourceConfig,

    /// Remote ingestion endpoint used by the poller.
    #[serde(default)]
    pub api: ApiConfig,

    /// Inbound HTTP API.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Email alert delivery.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Service identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "foliowatch".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite history database.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("foliowatch").join("foliowatch.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("foliowatch.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

/// History retention.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Records ingested more than this many days ago are pruned.
    /// Zero or a negative value disables pruning. Read it through
    /// [`RetentionConfig::days`].
    #[serde(default)]
    pub retention_days: RetentionDays,
}

impl RetentionConfig {
    pub const DEFAULT_DAYS: i64 = 365;

    /// Effective retention in days.
    ///
    /// A value that is not an integer falls back to [`Self::DEFAULT_DAYS`]
    /// and logs a warning.
    pub fn days(&self) -> i64 {
        match &self.retention_days {
            RetentionDays::Days(days) => *days,
            RetentionDays::Invalid(raw) => {
                warn!(
                    value = %raw,
                    default = Self::DEFAULT_DAYS,
                    "retention.retention_days is not an integer, using the default"
                );
                Self::DEFAULT_DAYS
            }
        }
    }
}

/// A retention period as written in the configuration.
///
/// Deserialization never fails: anything that is not an integer is kept as
/// [`RetentionDays::Invalid`] with a description of the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionDays {
    Days(i64),
    Invalid(String),
}

impl Default for RetentionDays {
    fn default() -> Self {
        Self::Days(RetentionConfig::DEFAULT_DAYS)
    }
}

impl From<i64> for RetentionDays {
    fn from(days: i64) -> Self {
        Self::Days(days)
    }
}

impl Serialize for RetentionDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Days(days) => serializer.serialize_i64(*days),
            Self::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RetentionDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Value as Deserialize>::deserialize(deserializer)?;
        let actual = value.to_actual();
        let days = match &actual {
            Actual::Signed(n) => i64::try_from(*n).ok(),
            Actual::Unsigned(n) => i64::try_from(*n).ok(),
            Actual::Str(s) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(match days {
            Some(days) => Self::Days(days),
            None => Self::Invalid(actual.to_string()),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollerConfig {
    /// Hours between poll cycles. Fractional values are allowed.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: f64,

    /// Run one cycle immediately at startup instead of waiting a full interval.
    #[serde(default)]
    pub run_on_start: bool,
}

impl PollerConfig {
    /// The poll interval, or `None` if `interval_hours` is not a positive finite number.
    pub fn interval(&self) -> Option<Duration> {
        if !self.interval_hours.is_finite() || self.interval_hours <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(self.interval_hours * 3600.0).ok()
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            run_on_start: false,
        }
    }
}

fn default_interval_hours() -> f64 {
    24.0
}

/// Where raw counter snapshots are read from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// SQLite database holding the `control_folios` table.
    /// `None` means the poller has nothing to read.
    #[serde(default)]
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the ingestion service, e.g. `http://127.0.0.1:5080`.
    /// `None` makes the poller ingest in-process.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,

    /// Value sent in the `X-API-KEY` header.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ApiConfig {
    /// Full ingestion URL, if a base URL is configured.
    pub fn update_url(&self) -> Option<String> {
        self.base_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.endpoint.trim_start_matches('/')
            )
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoint: default_api_endpoint(),
            api_key: None,
        }
    }
}

fn default_api_endpoint() -> String {
    "/api/folios/update".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Key required in `X-API-KEY` on every `/api` route.
    /// When unset, all `/api` requests are rejected.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            api_key: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    5080
}

/// SMTP settings for email alerts.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// Send alerts by email. When disabled alerts are only logged.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Upgrade the connection with STARTTLS. Port 465 always uses implicit TLS.
    #[serde(default = "default_true")]
    pub use_ssl: bool,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub sender_email: Option<String>,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default)]
    pub recipients: Vec<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: default_smtp_port(),
            use_ssl: true,
            username: None,
            password: None,
            sender_email: None,
            sender_name: default_sender_name(),
            recipients: Vec::new(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "Folio Monitor".to_string()
}
