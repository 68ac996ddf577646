//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Braced registry GUID, e.g. `{4d36e972-e325-11ce-bfc1-08002be10318}`.
const CLASS_GUID_PATTERN: &str =
    r"^\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}$";

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Device class key scanned for the adapter's subkey
    pub class_guid: String,

    /// Pause between disabling and re-enabling the adapter
    pub settle_delay: Duration,

    /// Verbose logging enabled
    pub verbose: bool,

    /// Config file the values were read from, if any
    pub source: Option<PathBuf>,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source_str = self
            .source
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());

        write!(
            f,
            "Config {{ class_guid: {}, settle_delay: {}ms, verbose: {}, file: {} }}",
            self.class_guid,
            self.settle_delay.as_millis(),
            self.verbose,
            source_str,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The class GUID is not a braced GUID
    /// - The settle delay exceeds [`defaults::MAX_SETTLE_DELAY_MS`]
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let class_guid = Self::resolve_class_guid(toml)?;
        let settle_delay = Self::resolve_settle_delay(cli, toml)?;
        let verbose = cli.verbose || toml.is_some_and(|t| t.log.verbose);

        Ok(Self {
            class_guid,
            settle_delay,
            verbose,
            source: None,
        })
    }

    /// Loads and merges configuration from CLI and the config file.
    ///
    /// If `cli.config` is set, that file must exist. Otherwise the per-user
    /// file is read when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load_with_default(cli, defaults::config_path().as_deref())
    }

    /// Like [`load`](Self::load), with an explicit fallback file location.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_default(cli: &Cli, default: Option<&Path>) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .or_else(|| default.filter(|p| p.is_file()).map(Path::to_path_buf));

        let toml = match &path {
            Some(path) => Some(TomlConfig::load(path)?),
            None => None,
        };

        let mut config = Self::from_raw(cli, toml.as_ref())?;
        config.source = path;
        Ok(config)
    }

    fn resolve_class_guid(toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let value = toml
            .and_then(|t| t.registry.class_guid.as_deref())
            .map_or(defaults::CLASS_GUID, str::trim);

        let pattern = Regex::new(CLASS_GUID_PATTERN).map_err(|source| ConfigError::InvalidRegex {
            pattern: CLASS_GUID_PATTERN.to_string(),
            source,
        })?;

        if !pattern.is_match(value) {
            return Err(ConfigError::InvalidClassGuid {
                value: value.to_string(),
            });
        }

        Ok(value.to_string())
    }

    fn resolve_settle_delay(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let millis = cli
            .settle_delay_ms
            .or_else(|| toml.and_then(|t| t.adapter.settle_delay_ms))
            .unwrap_or(defaults::SETTLE_DELAY_MS);

        if millis > defaults::MAX_SETTLE_DELAY_MS {
            return Err(ConfigError::InvalidDuration {
                field: "settle_delay_ms",
                reason: format!("must be at most {}", defaults::MAX_SETTLE_DELAY_MS),
            });
        }

        Ok(Duration::from_millis(millis))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
