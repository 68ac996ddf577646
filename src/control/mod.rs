//! Live adapter control: enable/disable cycles and address queries.
//!
//! [`AdapterController`] implements the toggle and direct-apply semantics on
//! top of an [`InterfaceControl`] collaborator, which issues the actual OS
//! requests. The settle delay between disable and enable goes through a
//! [`Sleeper`] so tests never block.

mod getmac;
mod netsh;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use getmac::parse_getmac_list;
pub use netsh::{NetshControl, admin_state_args};

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::command::CommandError;
use crate::network::{AdapterIdentity, MacAddress};
use crate::time::{Sleeper, ThreadSleeper};

/// Default pause between disabling and re-enabling an adapter.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(900);

/// Administrative state requested for an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    /// Adapter administratively up.
    Enabled,
    /// Adapter administratively down.
    Disabled,
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enable"),
            Self::Disabled => write!(f, "disable"),
        }
    }
}

/// Error type for adapter control.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The control tool could not be run or reported failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The adapter was disabled, but enabling it again failed.
    #[error("Adapter '{adapter}' was disabled but could not be re-enabled: {source}")]
    LeftDisabled {
        /// Adapter name.
        adapter: String,
        /// Why the enable request failed.
        #[source]
        source: Box<ControlError>,
    },
}

/// One row of the live address listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Connection (interface) name, e.g. `Wi-Fi`.
    pub connection_name: String,
    /// Driver description, if reported.
    pub network_adapter: Option<String>,
    /// Reported hardware address as printed by the OS (may be `N/A`).
    pub physical_address: String,
}

impl fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.connection_name, self.physical_address)?;
        if let Some(adapter) = &self.network_adapter {
            write!(f, " ({adapter})")?;
        }
        Ok(())
    }
}

/// OS-facing adapter control collaborator.
pub trait InterfaceControl: Send + Sync {
    /// Sets the adapter's administrative state.
    ///
    /// When `address` is given together with [`AdminState::Enabled`], the
    /// address is requested as part of the same operation.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] if the request fails or is unsupported.
    fn set_admin_state(
        &self,
        adapter: &str,
        state: AdminState,
        address: Option<&MacAddress>,
    ) -> Result<(), ControlError>;

    /// Lists current hardware addresses for all interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError`] if the listing cannot be obtained.
    fn query_addresses(&self) -> Result<Vec<InterfaceAddress>, ControlError>;
}

/// Applies identity changes to live adapters.
#[derive(Debug)]
pub struct AdapterController<C, S = ThreadSleeper> {
    control: C,
    sleeper: S,
    settle_delay: Duration,
}

impl<C: InterfaceControl> AdapterController<C> {
    /// Creates a controller that really sleeps for `settle_delay`.
    #[must_use]
    pub const fn new(control: C, settle_delay: Duration) -> Self {
        Self::with_sleeper(control, ThreadSleeper, settle_delay)
    }
}

impl<C: InterfaceControl, S: Sleeper> AdapterController<C, S> {
    /// Creates a controller with a custom sleeper.
    #[must_use]
    pub const fn with_sleeper(control: C, sleeper: S, settle_delay: Duration) -> Self {
        Self {
            control,
            sleeper,
            settle_delay,
        }
    }

    /// Returns the control collaborator.
    #[must_use]
    pub const fn control(&self) -> &C {
        &self.control
    }

    /// Returns the sleeper.
    #[must_use]
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Returns the pause between disable and enable.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Disables the adapter, waits for the settle delay, then enables it so
    /// the driver re-reads its configuration.
    ///
    /// # Errors
    ///
    /// Returns the disable error as is. If the disable succeeded but the
    /// enable failed, returns [`ControlError::LeftDisabled`].
    pub fn toggle(&self, identity: &AdapterIdentity) -> Result<(), ControlError> {
        tracing::info!("Restarting adapter '{}'", identity.name);

        self.control
            .set_admin_state(&identity.name, AdminState::Disabled, None)?;
        self.sleeper.sleep(self.settle_delay);
        self.enable(identity, None)
    }

    /// Disables the adapter, then enables it while requesting `mac`.
    ///
    /// Many drivers do not support this; failure is expected and reported.
    ///
    /// # Errors
    ///
    /// Same as [`toggle`](Self::toggle).
    pub fn apply_direct(
        &self,
        identity: &AdapterIdentity,
        mac: &MacAddress,
    ) -> Result<(), ControlError> {
        tracing::info!("Requesting {mac} directly on '{}'", identity.name);

        self.control
            .set_admin_state(&identity.name, AdminState::Disabled, None)?;
        self.enable(identity, Some(mac))
    }

    fn enable(
        &self,
        identity: &AdapterIdentity,
        mac: Option<&MacAddress>,
    ) -> Result<(), ControlError> {
        self.control
            .set_admin_state(&identity.name, AdminState::Enabled, mac)
            .map_err(|e| {
                tracing::warn!("Adapter '{}' may be left disabled", identity.name);
                ControlError::LeftDisabled {
                    adapter: identity.name.clone(),
                    source: Box::new(e),
                }
            })
    }

    /// Best-effort read of the adapter's currently reported address.
    ///
    /// For diagnostics only.
    pub fn query_live_address(&self, identity: &AdapterIdentity) -> Option<String> {
        match self.control.query_addresses() {
            Ok(rows) => rows
                .into_iter()
                .find(|row| row.connection_name == identity.name)
                .map(|row| row.physical_address),
            Err(e) => {
                tracing::debug!("Cannot query address of '{}': {e}", identity.name);
                None
            }
        }
    }

    /// Best-effort listing of every interface's address. Empty on failure.
    pub fn live_addresses(&self) -> Vec<InterfaceAddress> {
        self.control.query_addresses().unwrap_or_else(|e| {
            tracing::warn!("Cannot list interface addresses: {e}");
            Vec::new()
        })
    }
}
