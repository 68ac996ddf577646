//! Application execution logic.
//!
//! This module wires the platform collaborators into one supervised change
//! session and provides the OS interruption future.

use thiserror::Error;
use tokio::signal;

use macshift::config::ValidatedConfig;
use macshift::session::{RunOutcome, SessionError};

#[cfg(windows)]
use std::sync::Arc;

#[cfg(windows)]
use macshift::control::{AdapterController, NetshControl};
#[cfg(windows)]
use macshift::network::platform::PlatformDiscovery;
#[cfg(windows)]
use macshift::registry::{AdapterRegistry, WindowsRegistry};
#[cfg(windows)]
use macshift::restore::RestorePoint;
#[cfg(windows)]
use macshift::session::{ChangeOrchestrator, ConsolePrompter, supervise};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The host has no adapter control implementation.
    #[error("Unsupported platform: adapter control is only available on Windows")]
    UnsupportedPlatform,

    /// The session could not be supervised to completion.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Runs one interactive change session.
///
/// This function:
/// 1. Creates the registry backend for the configured device class
/// 2. Creates the adapter controller with the configured settle delay
/// 3. Runs the session on a blocking thread, racing it against Ctrl+C
/// 4. Logs how the session ended
///
/// # Errors
///
/// Returns an error if the session panicked. The original address has still
/// been restored by then.
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires:
/// - The Windows registry and `netsh`
/// - An interactive console
#[cfg(windows)]
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<RunOutcome, RunError> {
    let registry = AdapterRegistry::new(WindowsRegistry::new(&config.class_guid));
    tracing::debug!("Adapter class key: {}", registry.backend().class_key());

    let controller = AdapterController::new(NetshControl::new(), config.settle_delay);
    let point = Arc::new(RestorePoint::new(Arc::new(registry), Arc::new(controller)));

    let session_point = Arc::clone(&point);
    let session = move || {
        // Stdin is locked on the session thread; the lock never crosses threads.
        let prompter = ConsolePrompter::new(std::io::stdin().lock(), std::io::stdout());
        ChangeOrchestrator::new(PlatformDiscovery::new(), prompter, session_point).run()
    };

    let outcome = supervise(point, session, shutdown_signal()).await?;
    log_outcome(&outcome);
    Ok(outcome)
}

/// Refuses to run on hosts without adapter control.
///
/// # Errors
///
/// Always returns [`RunError::UnsupportedPlatform`].
#[cfg(not(windows))]
#[allow(clippy::unused_async)] // Same signature as the Windows implementation
pub async fn execute(config: ValidatedConfig) -> Result<RunOutcome, RunError> {
    tracing::debug!("Ignoring configuration on unsupported platform: {config}");
    Err(RunError::UnsupportedPlatform)
}

/// Logs a one-line summary of how the session ended.
#[cfg_attr(not(windows), allow(dead_code))]
fn log_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoAdapters => tracing::info!("No change made"),
        RunOutcome::Applied {
            address, mechanism, ..
        } => tracing::info!("Session finished: {address} was applied via {mechanism}"),
        RunOutcome::ApplyFailed { address, .. } => {
            tracing::warn!("Session finished: {address} could not be applied");
        }
        RunOutcome::Aborted { reason, .. } => tracing::warn!("Session aborted: {reason}"),
        RunOutcome::InvalidAddress { input, .. } => {
            tracing::warn!("Session aborted: invalid MAC '{input}'");
        }
        RunOutcome::GenerationFailed { .. } => {
            tracing::warn!("Session aborted: no random MAC could be generated");
        }
        RunOutcome::Interrupted { .. } => tracing::warn!("Session interrupted"),
    }

    match outcome.restore() {
        Some(restore) if restore.is_clean() => tracing::info!("Original MAC restored"),
        Some(restore) => tracing::error!("Restore reported a failure: {restore:?}"),
        None => {}
    }
}

/// Resolves when the process is asked to stop.
///
/// A handler that cannot be installed never resolves, so the remaining
/// handlers still apply.
#[cfg_attr(not(windows), allow(dead_code))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(windows)]
    let terminate = async {
        let ctrl_break = async {
            match signal::windows::ctrl_break() {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install Ctrl+Break handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };
        let ctrl_close = async {
            match signal::windows::ctrl_close() {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install console close handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            () = ctrl_break => {}
            () = ctrl_close => {}
        }
    };

    #[cfg(not(any(unix, windows)))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
