//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Adapter class registry section
    #[serde(default)]
    pub registry: RegistrySection,

    /// Adapter control section
    #[serde(default)]
    pub adapter: AdapterSection,

    /// Logging section
    #[serde(default)]
    pub log: LogSection,
}

/// Adapter class registry section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Device class whose subkeys are scanned for the adapter
    pub class_guid: Option<String>,
}

/// Adapter control section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterSection {
    /// Pause between disable and enable, in milliseconds
    pub settle_delay_ms: Option<u64>,
}

/// Logging section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Enable debug-level logging
    #[serde(default)]
    pub verbose: bool,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# macshift Configuration File
# Every setting is optional; the values shown are the defaults.

[registry]
# Device class whose numbered subkeys hold per-adapter settings.
# Only change this if your Wi-Fi driver registers under another class.
# class_guid = "{4d36e972-e325-11ce-bfc1-08002be10318}"

[adapter]
# Pause between disabling and re-enabling the adapter, in milliseconds
# (default: 900, max: 10000, can be overridden by --settle-delay-ms)
settle_delay_ms = 900

[log]
# Enable debug-level logging (same as --verbose)
# verbose = false
"#
    .to_string()
}
