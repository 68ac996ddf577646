//! One interactive change session: select, snapshot, apply, restore.
//!
//! [`ChangeOrchestrator::run`] is synchronous and blocking. The binary runs
//! it on a blocking task and races it against OS interruption with
//! [`supervise`]; both paths share the same [`RestorePoint`].

mod prompt;
mod supervisor;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use prompt::{ConsolePrompter, Prompter, TargetChoice};
pub use supervisor::{SessionError, supervise};

use std::fmt;
use std::sync::Arc;

use crate::control::InterfaceControl;
use crate::network::{AdapterDiscovery, AdapterIdentity, MacAddress};
use crate::registry::RegistryBackend;
use crate::restore::{AdapterSnapshot, RestoreGuard, RestoreOutcome, RestorePoint, StoreRevert};
use crate::time::{Sleeper, ThreadSleeper};

/// How the new address was put in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMechanism {
    /// Registry override followed by an adapter restart.
    Registry,
    /// Address requested directly at enable time.
    Direct,
}

impl fmt::Display for ApplyMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "registry override"),
            Self::Direct => write!(f, "direct request"),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No wireless adapter was found. Nothing was touched.
    NoAdapters,
    /// The session could not take a snapshot and stopped before any change.
    Aborted {
        /// Why.
        reason: String,
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
    /// The manually entered address was rejected.
    InvalidAddress {
        /// The text as entered (trimmed).
        input: String,
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
    /// No random address could be generated.
    GenerationFailed {
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
    /// The address was applied, then restored.
    Applied {
        /// Address that was presented.
        address: MacAddress,
        /// How it was applied.
        mechanism: ApplyMechanism,
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
    /// Every mechanism failed; the adapter was still restored.
    ApplyFailed {
        /// Address that was attempted.
        address: MacAddress,
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
    /// An interruption restored the adapter before the session finished.
    Interrupted {
        /// Result of the restore attempt.
        restore: RestoreOutcome,
    },
}

impl RunOutcome {
    /// Returns the restore result, if a restore was attempted.
    #[must_use]
    pub const fn restore(&self) -> Option<&RestoreOutcome> {
        match self {
            Self::NoAdapters => None,
            Self::Aborted { restore, .. }
            | Self::InvalidAddress { restore, .. }
            | Self::GenerationFailed { restore }
            | Self::Applied { restore, .. }
            | Self::ApplyFailed { restore, .. }
            | Self::Interrupted { restore } => Some(restore),
        }
    }
}

/// Sequences one change session.
pub struct ChangeOrchestrator<D, P, B, C, S = ThreadSleeper> {
    discovery: D,
    prompter: P,
    point: Arc<RestorePoint<B, C, S>>,
}

impl<D, P, B, C, S> ChangeOrchestrator<D, P, B, C, S>
where
    D: AdapterDiscovery,
    P: Prompter,
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    /// Creates an orchestrator. `point` must be the restore point the
    /// interruption path uses.
    #[must_use]
    pub const fn new(discovery: D, prompter: P, point: Arc<RestorePoint<B, C, S>>) -> Self {
        Self {
            discovery,
            prompter,
            point,
        }
    }

    /// Returns the prompter.
    #[must_use]
    pub const fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Runs the session to completion.
    ///
    /// Once a snapshot exists, every path out of this function (including a
    /// panic) restores the adapter.
    pub fn run(&mut self) -> RunOutcome {
        let adapters = self.wireless_adapters();
        if adapters.is_empty() {
            tracing::error!("No Wi-Fi adapters detected");
            return RunOutcome::NoAdapters;
        }

        let index = self.prompter.choose_adapter(&adapters);
        let Some(identity) = adapters.get(index).or_else(|| adapters.first()) else {
            return RunOutcome::NoAdapters;
        };
        tracing::info!("Selected: {identity}");

        let shared = Arc::clone(&self.point);
        let point = &*shared;
        let snapshot = match point.snapshot(identity) {
            Ok(snapshot) => snapshot.clone(),
            Err(e) => {
                // The existing snapshot belongs to another adapter; leave it alone.
                tracing::error!("{e}");
                return RunOutcome::Aborted {
                    reason: e.to_string(),
                    restore: RestoreOutcome::NothingCaptured,
                };
            }
        };
        let _guard = RestoreGuard::new(point);

        let address = match self.choose_address() {
            Ok(address) => address,
            Err(rejected) => return rejected.into_outcome(point.restore()),
        };

        let Some(mechanism) = point.while_pending(|| apply(point, &snapshot, &address)) else {
            return RunOutcome::Interrupted {
                restore: point.restore(),
            };
        };

        match mechanism {
            Some(mechanism) => {
                tracing::info!("MAC change applied via {mechanism}");
                if let Some(live) = point.controller().query_live_address(&snapshot.identity) {
                    tracing::info!("'{}' now reports {live}", snapshot.identity.name);
                }
            }
            None => tracing::error!("Failed to apply MAC change"),
        }

        tracing::info!("Restoring original MAC before exit");
        let restore = point.restore();
        match mechanism {
            Some(mechanism) => RunOutcome::Applied {
                address,
                mechanism,
                restore,
            },
            None => RunOutcome::ApplyFailed { address, restore },
        }
    }

    /// Asks for the target address.
    fn choose_address(&mut self) -> Result<MacAddress, RejectedTarget> {
        match self.prompter.choose_target() {
            TargetChoice::Manual(input) => MacAddress::parse(&input).map_err(|e| {
                tracing::error!(
                    "Invalid MAC: {e}. Expected XX:XX:XX:XX:XX:XX with a unicast first octet"
                );
                RejectedTarget::Invalid(input)
            }),
            TargetChoice::Random => match MacAddress::random() {
                Ok(address) => {
                    tracing::info!("Generated MAC: {address}");
                    Ok(address)
                }
                Err(e) => {
                    tracing::error!("{e}");
                    Err(RejectedTarget::GenerationFailed)
                }
            },
        }
    }

    /// Discovers adapters and keeps the wireless ones. Discovery failure is
    /// treated as finding nothing.
    fn wireless_adapters(&self) -> Vec<AdapterIdentity> {
        match self.discovery.discover() {
            Ok(adapters) => adapters
                .into_iter()
                .filter(|adapter| adapter.kind.is_wireless())
                .collect(),
            Err(e) => {
                tracing::warn!("Adapter discovery failed: {e}");
                Vec::new()
            }
        }
    }
}

/// Why no target address was obtained.
enum RejectedTarget {
    Invalid(String),
    GenerationFailed,
}

impl RejectedTarget {
    fn into_outcome(self, restore: RestoreOutcome) -> RunOutcome {
        match self {
            Self::Invalid(input) => RunOutcome::InvalidAddress { input, restore },
            Self::GenerationFailed => RunOutcome::GenerationFailed { restore },
        }
    }
}

/// Tries the registry override first, then the direct request.
fn apply<B, C, S>(
    point: &RestorePoint<B, C, S>,
    snapshot: &AdapterSnapshot,
    address: &MacAddress,
) -> Option<ApplyMechanism>
where
    B: RegistryBackend,
    C: InterfaceControl,
    S: Sleeper,
{
    let identity = &snapshot.identity;
    let controller = point.controller();

    if let Some(key) = &snapshot.store_key {
        let value = address.to_store_format();
        tracing::info!("Writing NetworkAddress={value} to registry subkey {key}");

        match point.registry().write(key, &value) {
            Ok(()) => match controller.toggle(identity) {
                Ok(()) => return Some(ApplyMechanism::Registry),
                Err(e) => {
                    tracing::warn!("Restart failed after registry write, reverting: {e}");
                    match point.rollback_store() {
                        StoreRevert::Failed(reason) => {
                            tracing::error!("Override may still be set on subkey {key}: {reason}");
                        }
                        revert => tracing::debug!("Registry override rolled back: {revert:?}"),
                    }
                }
            },
            Err(e) => tracing::warn!("Registry write failed: {e}"),
        }
    } else {
        tracing::info!("Registry subkey for '{}' not found; will try fallback", identity.name);
    }

    tracing::info!("Attempting direct request (may be unsupported by some drivers)");
    match controller.apply_direct(identity, address) {
        Ok(()) => Some(ApplyMechanism::Direct),
        Err(e) => {
            tracing::warn!("Direct request failed or unsupported: {e}");
            None
        }
    }
}
