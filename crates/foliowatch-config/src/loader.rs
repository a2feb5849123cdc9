// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later overriding earlier:
//! 1. Compiled defaults
//! 2. `/etc/foliowatch/foliowatch.toml`
//! 3. `$XDG_CONFIG_HOME/foliowatch/foliowatch.toml`
//! 4. `./foliowatch.toml`
//! 5. `FOLIOWATCH_*` environment variables

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FolioConfig;

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/foliowatch/foliowatch.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "foliowatch.toml";

/// Top-level sections, used to turn `FOLIOWATCH_SMTP_SENDER_EMAIL` into
/// `smtp.sender_email` rather than `smtp.sender.email`.
const SECTIONS: &[&str] = &[
    "service", "storage", "retention", "poller", "source", "api", "gateway", "smtp",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("foliowatch").join("foliowatch.toml"))
}

/// Builds the standard layered figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Loads configuration from the standard file hierarchy plus environment.
pub fn load_config() -> Result<FolioConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from one explicit file plus environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string on top of the defaults. No env.
pub fn load_config_from_str(toml_content: &str) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

fn env_provider() -> Env {
    Env::prefixed("FOLIOWATCH_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name onto its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}
