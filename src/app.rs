//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use macshift::config::ConfigError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    use macshift::session::RunOutcome;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid file, bad values, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Aborted run (exit code 1) - no adapters, invalid input, interruption,
    /// or a restore that reported a failure.
    pub const ABORT: ExitCode = ExitCode::FAILURE;

    /// Numeric status for an apply failure followed by a clean restore.
    pub const APPLY_FAILED_STATUS: u8 = 2;

    /// Apply failed on every mechanism but the restore was clean (exit code 2).
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn apply_failed() -> ExitCode {
        ExitCode::from(APPLY_FAILED_STATUS)
    }

    /// Numeric exit status for a finished session.
    #[must_use]
    pub fn status(outcome: &RunOutcome) -> u8 {
        let restore_clean = outcome.restore().is_none_or(|r| r.is_clean());

        match outcome {
            RunOutcome::Applied { .. } if restore_clean => 0,
            RunOutcome::ApplyFailed { .. } if restore_clean => APPLY_FAILED_STATUS,
            _ => 1,
        }
    }

    /// Exit code for a finished session.
    pub fn for_outcome(outcome: &RunOutcome) -> ExitCode {
        match status(outcome) {
            0 => SUCCESS,
            APPLY_FAILED_STATUS => apply_failed(),
            _ => ABORT,
        }
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. }
        | ConfigError::TomlParse(_)
        | ConfigError::InvalidClassGuid { .. } => {
            eprintln!("\nRun 'macshift init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so the interactive prompts on stdout stay readable.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
