//! Snapshot and one-shot restore of an adapter's original identity.
//!
//! A [`RestorePoint`] is shared (behind an `Arc`) by the session thread and
//! the interruption path. Whichever reaches [`RestorePoint::restore`] first
//! performs the restore; every later call is a no-op. The state flag is
//! checked and set under one mutex, and that mutex stays held while the
//! restore runs, so a concurrent caller waits and then observes completion.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;

use crate::control::{AdapterController, InterfaceControl};
use crate::network::AdapterIdentity;
use crate::registry::{AdapterRegistry, RegistryBackend, StoreKey};
use crate::time::{Sleeper, ThreadSleeper};

/// Error type for restore point misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// A snapshot was already captured for this run.
    #[error("A snapshot of '{adapter}' was already captured")]
    AlreadyCaptured {
        /// Adapter in the existing snapshot.
        adapter: String,
    },
}

/// Pre-change state of one adapter. Never mutated once captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSnapshot {
    /// The adapter being modified.
    pub identity: AdapterIdentity,
    /// Registry subkey holding the adapter's override, if one resolved.
    pub store_key: Option<StoreKey>,
    /// Override configured before this run. `None` means restoring clears it.
    pub original_stored_value: Option<String>,
    /// Address the adapter reported at snapshot time. Informational.
    pub original_live_address: Option<String>,
}

/// Whether the restore has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreState {
    /// Not yet attempted.
    #[default]
    Pending,
    /// Executed, whatever its outcome. Terminal.
    Completed,
}

/// What happened to the stored override during a revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRevert {
    /// No store key resolved; nothing to revert.
    NoStoreKey,
    /// The original value was written back.
    Rewritten,
    /// No override existed before; it was removed.
    Cleared,
    /// The revert failed.
    Failed(String),
}

impl StoreRevert {
    /// Returns `true` unless the revert failed.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of an executed restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Store revert result.
    pub store: StoreRevert,
    /// Whether the adapter restart succeeded.
    pub toggled: bool,
    /// Address the adapter reported afterwards, if it could be read.
    pub live_address: Option<String>,
}

impl RestoreReport {
    /// Returns `true` if every step succeeded.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.store.is_ok() && self.toggled
    }
}

/// Outcome of a [`RestorePoint::restore`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Another call already restored; nothing was done.
    AlreadyCompleted,
    /// No snapshot exists, so nothing was changed and nothing is restored.
    NothingCaptured,
    /// This call performed the restore.
    Executed(RestoreReport),
}

impl RestoreOutcome {
    /// Returns `false` only if this call executed a restore that reported a
    /// failure.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        match self {
            Self::AlreadyCompleted | Self::NothingCaptured => true,
            Self::Executed(report) => report.is_clean(),
        }
    }
}

/// Owner of the snapshot and the one-shot restore.
#[derive(Debug)]
pub struct RestorePoint<B, C, S = ThreadSleeper> {
    registry: Arc<AdapterRegistry<B>>,
    controller: Arc<AdapterController<C, S>>,
    snapshot: OnceLock<AdapterSnapshot>,
    state: Mutex<RestoreState>,
}

impl<B, C, S> RestorePoint<B, C, S>
where
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    /// Creates a restore point with no snapshot.
    #[must_use]
    pub fn new(
        registry: Arc<AdapterRegistry<B>>,
        controller: Arc<AdapterController<C, S>>,
    ) -> Self {
        Self {
            registry,
            controller,
            snapshot: OnceLock::new(),
            state: Mutex::new(RestoreState::Pending),
        }
    }

    /// Returns the registry accessor.
    #[must_use]
    pub const fn registry(&self) -> &Arc<AdapterRegistry<B>> {
        &self.registry
    }

    /// Returns the adapter controller.
    #[must_use]
    pub const fn controller(&self) -> &Arc<AdapterController<C, S>> {
        &self.controller
    }

    /// Returns the captured snapshot, if any.
    #[must_use]
    pub fn captured(&self) -> Option<&AdapterSnapshot> {
        self.snapshot.get()
    }

    /// Returns the current restore state.
    #[must_use]
    pub fn state(&self) -> RestoreState {
        *self.lock_state()
    }

    /// Captures the adapter's pre-change state. Must precede any mutation.
    ///
    /// # Errors
    ///
    /// Returns [`RestoreError::AlreadyCaptured`] on a second call; the
    /// existing snapshot is kept.
    pub fn snapshot(&self, identity: &AdapterIdentity) -> Result<&AdapterSnapshot, RestoreError> {
        let mut fresh = false;
        let snapshot = self.snapshot.get_or_init(|| {
            fresh = true;
            self.capture(identity)
        });

        if fresh {
            Ok(snapshot)
        } else {
            Err(RestoreError::AlreadyCaptured {
                adapter: snapshot.identity.name.clone(),
            })
        }
    }

    fn capture(&self, identity: &AdapterIdentity) -> AdapterSnapshot {
        let original_live_address = self.controller.query_live_address(identity);
        let store_key = self.registry.resolve_store_key(identity);
        let original_stored_value = store_key.as_ref().and_then(|key| self.registry.read(key));

        match (&store_key, &original_stored_value) {
            (Some(key), Some(value)) => {
                tracing::info!("Saved NetworkAddress={value} from registry subkey {key}");
            }
            (Some(key), None) => {
                tracing::info!("Registry subkey {key} has no NetworkAddress override");
            }
            (None, _) => tracing::info!("No registry subkey found for '{}'", identity.name),
        }
        if let Some(address) = &original_live_address {
            tracing::debug!("'{}' currently reports {address}", identity.name);
        }

        AdapterSnapshot {
            identity: identity.clone(),
            store_key,
            original_stored_value,
            original_live_address,
        }
    }

    /// Runs `mutation` only while the restore is still pending.
    ///
    /// The state lock is held for the duration, so a concurrent
    /// [`restore`](Self::restore) waits for the mutation to finish and then
    /// undoes it. Returns `None` if the restore already ran.
    ///
    /// `mutation` must not call [`restore`](Self::restore).
    pub fn while_pending<R>(&self, mutation: impl FnOnce() -> R) -> Option<R> {
        let state = self.lock_state();
        if *state == RestoreState::Completed {
            tracing::debug!("Restore already ran; skipping change");
            return None;
        }
        let result = mutation();
        drop(state);
        Some(result)
    }

    /// Puts the stored override back to its snapshot value without
    /// restarting the adapter or touching the restore state.
    ///
    /// Used to undo a write whose restart failed.
    pub fn rollback_store(&self) -> StoreRevert {
        match self.snapshot.get() {
            Some(snapshot) => self.revert_store(snapshot),
            None => StoreRevert::NoStoreKey,
        }
    }

    /// Reinstates the snapshot. Executes at most once per restore point.
    ///
    /// Partial failures are reported in the returned outcome and never
    /// retried; the state becomes [`RestoreState::Completed`] regardless.
    /// Called before any snapshot exists, it restores nothing but still
    /// completes, so no later change can go through [`while_pending`](Self::while_pending).
    pub fn restore(&self) -> RestoreOutcome {
        let mut state = self.lock_state();
        if *state == RestoreState::Completed {
            tracing::debug!("Restore already completed");
            return RestoreOutcome::AlreadyCompleted;
        }
        *state = RestoreState::Completed;
        let Some(snapshot) = self.snapshot.get() else {
            tracing::debug!("No snapshot captured; nothing to restore");
            return RestoreOutcome::NothingCaptured;
        };

        tracing::info!("Restoring original address of '{}'", snapshot.identity.name);

        let store = self.revert_store(snapshot);
        let toggled = match self.controller.toggle(&snapshot.identity) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Restart during restore failed: {e}");
                false
            }
        };

        let live_address = self.report_live_addresses(snapshot);
        drop(state);

        RestoreOutcome::Executed(RestoreReport {
            store,
            toggled,
            live_address,
        })
    }

    fn revert_store(&self, snapshot: &AdapterSnapshot) -> StoreRevert {
        let Some(key) = &snapshot.store_key else {
            return StoreRevert::NoStoreKey;
        };

        let result = match &snapshot.original_stored_value {
            Some(value) => {
                tracing::info!("Rewriting NetworkAddress={value} to registry subkey {key}");
                self.registry.write(key, value).map(|()| StoreRevert::Rewritten)
            }
            None => {
                tracing::info!("Clearing NetworkAddress from registry subkey {key}");
                self.registry.clear(key).map(|()| StoreRevert::Cleared)
            }
        };

        result.unwrap_or_else(|e| {
            tracing::error!("Registry revert failed: {e}");
            StoreRevert::Failed(e.to_string())
        })
    }

    /// Logs every interface's address and compares the adapter's with the
    /// snapshot. Returns the adapter's current address.
    fn report_live_addresses(&self, snapshot: &AdapterSnapshot) -> Option<String> {
        let rows = self.controller.live_addresses();
        if !rows.is_empty() {
            tracing::info!("Current addresses:");
        }
        for row in &rows {
            tracing::info!("  {row}");
        }

        let current = rows
            .into_iter()
            .find(|row| row.connection_name == snapshot.identity.name)
            .map(|row| row.physical_address);

        match (&snapshot.original_live_address, &current) {
            (Some(before), Some(now)) if before.eq_ignore_ascii_case(now) => {
                tracing::info!("'{}' is back to {now}", snapshot.identity.name);
            }
            (Some(before), Some(now)) => {
                tracing::warn!(
                    "'{}' reports {now}, expected {before}",
                    snapshot.identity.name
                );
            }
            _ => {}
        }

        current
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RestoreState> {
        // A panic elsewhere must not prevent the restore.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Restores when dropped, including during unwinding.
///
/// Dropping after a normal restore is a no-op.
#[must_use = "the guard restores when dropped"]
pub struct RestoreGuard<'a, B, C, S>
where
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    point: &'a RestorePoint<B, C, S>,
}

impl<'a, B, C, S> RestoreGuard<'a, B, C, S>
where
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    /// Arms a guard over `point`.
    pub const fn new(point: &'a RestorePoint<B, C, S>) -> Self {
        Self { point }
    }
}

impl<B, C, S> Drop for RestoreGuard<'_, B, C, S>
where
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    fn drop(&mut self) {
        if let RestoreOutcome::Executed(report) = self.point.restore() {
            tracing::warn!("Restored from drop guard (clean: {})", report.is_clean());
        }
    }
}
