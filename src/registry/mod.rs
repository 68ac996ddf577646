//! Persistent hardware-address overrides in the adapter class registry.
//!
//! Each network adapter has a numbered subkey (`0000`, `0001`, ...) under its
//! device class key. The subkey advertises the adapter's interface GUID in
//! `NetCfgInstanceId` and, when an override is configured, the address in
//! `NetworkAddress`.
//!
//! [`AdapterRegistry`] implements the lookup and override semantics on top of
//! a minimal [`RegistryBackend`], so the semantics can be tested without a
//! real registry.

#[cfg(windows)]
mod windows;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

#[cfg(windows)]
pub use windows::WindowsRegistry;

use std::fmt;

use thiserror::Error;

use crate::network::AdapterIdentity;

/// Value naming the adapter's interface GUID (reverse mapping).
pub const INSTANCE_ID_VALUE: &str = "NetCfgInstanceId";

/// Value holding the hardware-address override.
pub const NETWORK_ADDRESS_VALUE: &str = "NetworkAddress";

/// Errors from registry access.
///
/// Reads that find nothing are not errors; they are `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A registry operation failed.
    #[error("Registry {operation} failed for '{path}': {reason}")]
    Access {
        /// What was being attempted (open, read, write, delete, enumerate).
        operation: &'static str,
        /// Key path (and value name, where relevant).
        path: String,
        /// OS-provided reason.
        reason: String,
    },

    /// A value exists but is not a string.
    #[error("Registry value '{path}' is not a string")]
    UnexpectedType {
        /// Key path and value name.
        path: String,
    },
}

/// Lookup key for one adapter's subkey under the device class key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    /// Creates a store key from a subkey name.
    #[must_use]
    pub fn new(subkey: impl Into<String>) -> Self {
        Self(subkey.into())
    }

    /// Returns the subkey name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal string-value access to the subkeys of one device class key.
///
/// Implementations resolve `subkey` relative to the class key they were
/// created for.
pub trait RegistryBackend: Send + Sync {
    /// Lists the names of all subkeys under the class key.
    ///
    /// # Errors
    ///
    /// Returns an error if the class key cannot be opened or enumerated.
    fn subkeys(&self) -> Result<Vec<String>, StoreError>;

    /// Reads a string value. `Ok(None)` means the value does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the subkey cannot be opened, the read fails, or the
    /// value is not a string.
    fn read_string(&self, subkey: &str, name: &str) -> Result<Option<String>, StoreError>;

    /// Creates or replaces a string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the subkey cannot be opened for writing or the
    /// write fails.
    fn write_string(&self, subkey: &str, name: &str, data: &str) -> Result<(), StoreError>;

    /// Deletes a value. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the subkey cannot be opened for writing or the
    /// delete fails for a reason other than absence.
    fn delete_value(&self, subkey: &str, name: &str) -> Result<bool, StoreError>;
}

/// Reads and writes an adapter's persisted hardware-address override.
///
/// Every operation reports failure as a value; nothing here aborts the run.
#[derive(Debug)]
pub struct AdapterRegistry<B> {
    backend: B,
}

impl<B: RegistryBackend> AdapterRegistry<B> {
    /// Creates a registry accessor over the given backend.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Finds the subkey whose `NetCfgInstanceId` matches the adapter's
    /// instance ID (case-insensitive).
    ///
    /// Returns `None` when the adapter has no instance ID, when no subkey
    /// matches, or when the class key cannot be enumerated. Subkeys that
    /// cannot be read are skipped.
    pub fn resolve_store_key(&self, identity: &AdapterIdentity) -> Option<StoreKey> {
        let Some(instance_id) = identity.instance_id() else {
            tracing::debug!("Adapter '{}' has no instance ID", identity.name);
            return None;
        };

        let subkeys = match self.backend.subkeys() {
            Ok(subkeys) => subkeys,
            Err(e) => {
                tracing::warn!("Cannot scan adapter registry: {e}");
                return None;
            }
        };

        for subkey in subkeys {
            match self.backend.read_string(&subkey, INSTANCE_ID_VALUE) {
                Ok(Some(value)) if value.eq_ignore_ascii_case(instance_id) => {
                    tracing::debug!("Adapter '{}' maps to subkey {subkey}", identity.name);
                    return Some(StoreKey::new(subkey));
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping subkey {subkey}: {e}"),
            }
        }

        tracing::debug!("No registry subkey advertises {instance_id}");
        None
    }

    /// Returns the configured override, or `None` if none is configured.
    ///
    /// A present-but-empty value is returned as `Some("")`. Read failures are
    /// logged and reported as `None`.
    pub fn read(&self, key: &StoreKey) -> Option<String> {
        match self.backend.read_string(key.as_str(), NETWORK_ADDRESS_VALUE) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Cannot read {NETWORK_ADDRESS_VALUE} for subkey {key}: {e}");
                None
            }
        }
    }

    /// Sets the override.
    ///
    /// # Errors
    ///
    /// Returns the backend error; callers decide on fallback.
    pub fn write(&self, key: &StoreKey, value: &str) -> Result<(), StoreError> {
        self.backend
            .write_string(key.as_str(), NETWORK_ADDRESS_VALUE, value)
    }

    /// Removes the override entirely. Clearing an absent override succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the value exists but cannot be removed,
    /// or the subkey cannot be opened.
    pub fn clear(&self, key: &StoreKey) -> Result<(), StoreError> {
        let removed = self
            .backend
            .delete_value(key.as_str(), NETWORK_ADDRESS_VALUE)?;
        if !removed {
            tracing::debug!("No {NETWORK_ADDRESS_VALUE} to clear for subkey {key}");
        }
        Ok(())
    }
}
