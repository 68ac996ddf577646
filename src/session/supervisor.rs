//! Races a blocking session against an interruption signal.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinError;

use super::RunOutcome;
use crate::control::InterfaceControl;
use crate::registry::RegistryBackend;
use crate::restore::RestorePoint;
use crate::time::Sleeper;

/// Error type for session supervision.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session or the restore task panicked or was cancelled.
    #[error("Session task failed: {0}")]
    Join(#[from] JoinError),
}

/// Runs `session` on a blocking thread until it finishes or `shutdown`
/// resolves, whichever comes first.
///
/// On shutdown the shared `point` is restored on another blocking thread and
/// [`RunOutcome::Interrupted`] is returned. The session thread is not
/// cancelled; once the restore has completed it can no longer change the
/// adapter.
///
/// # Errors
///
/// Returns [`SessionError::Join`] if the session panicked. The restore has
/// still been attempted by then.
pub async fn supervise<B, C, S, F>(
    point: Arc<RestorePoint<B, C, S>>,
    session: F,
    shutdown: impl Future<Output = ()>,
) -> Result<RunOutcome, SessionError>
where
    B: RegistryBackend + 'static,
    C: InterfaceControl + 'static,
    S: Sleeper + 'static,
    F: FnOnce() -> RunOutcome + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(session);

    tokio::select! {
        biased;

        () = shutdown => {
            tracing::warn!("Interrupted, restoring original MAC");
            let restore = tokio::task::spawn_blocking(move || point.restore()).await?;
            Ok(RunOutcome::Interrupted { restore })
        }

        result = &mut task => match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!("Session ended abnormally: {e}");
                let restore = tokio::task::spawn_blocking(move || point.restore()).await?;
                tracing::debug!("Restore after failed session: {restore:?}");
                Err(e.into())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::mock::MockControl;
    use crate::control::AdapterController;
    use crate::network::{AdapterIdentity, AdapterKind};
    use crate::registry::AdapterRegistry;
    use crate::registry::mock::MemoryBackend;
    use crate::restore::{RestoreOutcome, RestoreState};
    use crate::time::mock::RecordingSleeper;
    use std::sync::mpsc;
    use std::time::Duration;

    type TestPoint = RestorePoint<MemoryBackend, MockControl, RecordingSleeper>;

    fn captured_point() -> Arc<TestPoint> {
        let point = Arc::new(RestorePoint::new(
            Arc::new(AdapterRegistry::new(MemoryBackend::new())),
            Arc::new(AdapterController::with_sleeper(
                MockControl::new(),
                RecordingSleeper::new(),
                Duration::ZERO,
            )),
        ));
        point
            .snapshot(&AdapterIdentity::new("Wi-Fi", "", AdapterKind::Wireless))
            .unwrap();
        point
    }

    #[tokio::test]
    async fn finished_session_outcome_is_returned() {
        let point = captured_point();

        let outcome = supervise(
            Arc::clone(&point),
            || RunOutcome::NoAdapters,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, RunOutcome::NoAdapters);
        assert_eq!(point.state(), RestoreState::Pending);
    }

    #[tokio::test]
    async fn shutdown_restores_while_session_is_blocked() {
        let point = captured_point();
        let (release, blocked) = mpsc::channel::<()>();

        let outcome = supervise(
            Arc::clone(&point),
            move || {
                let _ = blocked.recv();
                RunOutcome::NoAdapters
            },
            async {},
        )
        .await
        .unwrap();
        release.send(()).unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Interrupted {
                restore: RestoreOutcome::Executed(_)
            }
        ));
        assert_eq!(point.state(), RestoreState::Completed);
    }

    #[tokio::test]
    async fn shutdown_after_completed_restore_does_not_restore_again() {
        let point = captured_point();
        point.restore();
        let changes = point.controller().control().state_changes().len();

        let outcome = supervise(
            Arc::clone(&point),
            || {
                std::thread::sleep(Duration::from_millis(50));
                RunOutcome::NoAdapters
            },
            async {},
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Interrupted {
                restore: RestoreOutcome::AlreadyCompleted
            }
        );
        assert_eq!(point.controller().control().state_changes().len(), changes);
    }

    #[tokio::test]
    async fn panicking_session_is_reported_and_restored() {
        let point = captured_point();

        let result = supervise(
            Arc::clone(&point),
            || panic!("session failed"),
            std::future::pending(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::Join(_))));
        assert_eq!(point.state(), RestoreState::Completed);
    }
}
