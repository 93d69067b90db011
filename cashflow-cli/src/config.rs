//! Configuration for the `cashflow` binary.
//!
//! Values come from three places, highest precedence first: command-line
//! flags, `cashflow.toml`, built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cashflow_core::db::DbConfig;
use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cashflow.toml";

/// Database used when neither the config file nor `--db` names one.
pub const DEFAULT_DATABASE: &str = "cashflow.db";

/// First (prior) year shown in reports.
pub const DEFAULT_BASE_YEAR: i32 = 2023;

// =============================================================================
// File-based Configuration (cashflow.toml)
// =============================================================================

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub report: ReportSection,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Any `EnvFilter` directive, e.g. `"debug"` or `"info,cashflow_core=trace"`.
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSection {
    pub base_year: Option<i32>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `explicit` if given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_FILE`] if present, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db: DbConfig,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub base_year: i32,
}

impl Config {
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
    ) -> Self {
        let default_db = DbConfig::default();
        Self {
            db: DbConfig {
                backend: overrides
                    .backend
                    .or(file.database.backend)
                    .unwrap_or(default_db.backend),
                connection_string: overrides
                    .db
                    .or(file.database.connection_string)
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            log_level: overrides.log_level.or(file.logging.level),
            log_file: overrides.log_file.or(file.logging.file),
            base_year: file.report.base_year.unwrap_or(DEFAULT_BASE_YEAR),
        }
    }
}
