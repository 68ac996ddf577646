//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Device class of network adapters.
pub const CLASS_GUID: &str = "{4d36e972-e325-11ce-bfc1-08002be10318}";

/// Default pause between disabling and re-enabling an adapter, in milliseconds.
pub const SETTLE_DELAY_MS: u64 = 900;

/// Largest accepted settle delay, in milliseconds.
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

/// Directory under the user config dir holding the config file.
pub const CONFIG_DIR_NAME: &str = "macshift";

/// Config file name, both in the user config dir and for `init`.
pub const CONFIG_FILE_NAME: &str = "macshift.toml";

/// Default settle delay as Duration.
#[must_use]
pub const fn settle_delay() -> Duration {
    Duration::from_millis(SETTLE_DELAY_MS)
}

/// Per-user config file location, if the platform has a config dir.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
