// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::FolioConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &FolioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if let Some(path) = &config.source.database_path {
        if path.trim().is_empty() {
            fail("source.database_path must not be empty when set".to_string());
        }
    }

    if config.poller.interval().is_none() {
        fail(format!(
            "poller.interval_hours must be a positive number, got {}",
            config.poller.interval_hours
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(base) = &config.api.base_url {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            fail(format!(
                "api.base_url `{base}` must start with http:// or https://"
            ));
        }
    }

    if config.smtp.enabled && config.smtp.port == 0 {
        fail("smtp.port must not be 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FolioConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails() {
        let mut config = FolioConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "storage.database_path"));
    }

    #[test]
    fn zero_interval_fails() {
        let mut config = FolioConfig::default();
        config.poller.interval_hours = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "interval_hours"));
    }

    #[test]
    fn bad_base_url_scheme_fails() {
        let mut config = FolioConfig::default();
        config.api.base_url = Some("ftp://example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "api.base_url"));
    }

    #[test]
    fn bad_gateway_host_fails() {
        let mut config = FolioConfig::default();
        config.gateway.host = "local host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "gateway.host"));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = FolioConfig::default();
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "log_level"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = FolioConfig::default();
        config.storage.database_path = String::new();
        config.poller.interval_hours = -2.0;
        config.api.base_url = Some("localhost".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn negative_retention_is_allowed() {
        let mut config = FolioConfig::default();
        config.retention.retention_days = (-1).into();
        assert!(validate_config(&config).is_ok());
    }
}
