//! `ispn-compat.toml`
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [transform]
//! verify_determinism = true
//! fatal_rejections = false
//!
//! [installer]
//! default_group = "ee"
//! ```
//!
//! Every key is optional. A missing file means defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ispn_service::DEFAULT_GROUP;
use ispn_transform::TransformOptions;
use serde::{Deserialize, Serialize};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "ispn-compat.toml";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `ISPN_COMPAT_LOG` is unset
    pub level: String,
    /// Line format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// `[installer]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Channel of transports that name none
    pub default_group: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            default_group: DEFAULT_GROUP.to_string(),
        }
    }
}

/// Whole configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// Logging
    pub logging: LoggingConfig,
    /// Engine policies
    pub transform: TransformOptions,
    /// Service installer
    pub installer: InstallerConfig,
}

impl CompatConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Malformed TOML or an unknown enum value
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load `path`, or defaults if it does not exist
    ///
    /// # Errors
    /// Unreadable or malformed file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CompatConfig::from_toml("").unwrap(), CompatConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = CompatConfig::from_toml(
            "[logging]\nformat = \"json\"\n\n[transform]\nfatal_rejections = true\n",
        )
        .unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.transform.fatal_rejections);
        assert!(!config.transform.verify_determinism);
        assert_eq!(config.installer.default_group, "ee");
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert!(CompatConfig::from_toml("[logging]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompatConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, CompatConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[installer]\ndefault_group = \"cluster\"\n").unwrap();
        let config = CompatConfig::load(&path).unwrap();
        assert_eq!(config.installer.default_group, "cluster");
    }
}
