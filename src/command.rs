//! Synchronous invocation of external tools (`netsh`, `getmac`).
//!
//! Every call blocks until the tool exits. On Windows the child is created
//! without a console window so prompts stay readable.

use std::io;
use std::process::Command;

use thiserror::Error;

/// Error type for external tool invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The tool could not be started at all.
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        /// The command line that was attempted.
        command: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The tool ran but reported failure.
    #[error("'{command}' failed ({status}): {stderr}")]
    Failed {
        /// The command line that was attempted.
        command: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Runs `program` with `args` and returns its standard output.
///
/// Output is decoded lossily; console tools on Windows emit the OEM code page
/// and only ASCII field labels are relied upon.
///
/// # Errors
///
/// Returns [`CommandError::Launch`] if the process cannot be spawned and
/// [`CommandError::Failed`] if it exits unsuccessfully.
pub fn run(program: &str, args: &[&str]) -> Result<String, CommandError> {
    let command_line = describe(program, args);
    tracing::debug!("Running: {command_line}");

    let mut command = Command::new(program);
    command.args(args);
    hide_console_window(&mut command);

    let output = command.output().map_err(|source| CommandError::Launch {
        command: command_line.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Renders a command line for logs and error messages.
fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(windows)]
fn hide_console_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::CREATE_NO_WINDOW;

    command.creation_flags(CREATE_NO_WINDOW.0);
}

#[cfg(not(windows))]
const fn hide_console_window(_command: &mut Command) {}
