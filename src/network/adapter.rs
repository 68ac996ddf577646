//! Core network types for adapter representation.

use std::fmt;

/// Network adapter type classification.
///
/// Only [`AdapterKind::Wireless`] matters to the change session; the other
/// variants exist so discovery can report everything it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    /// Physical Ethernet adapter.
    Ethernet,
    /// Wireless (Wi-Fi) adapter.
    Wireless,
    /// Loopback adapter (localhost).
    Loopback,
    /// Virtual adapter (tunnel, PPP, etc.).
    Virtual,
    /// Unknown or other adapter type, preserving the original type code for debugging.
    Other(u32),
}

impl AdapterKind {
    /// Returns true if this is a wireless adapter.
    #[must_use]
    pub const fn is_wireless(&self) -> bool {
        matches!(self, Self::Wireless)
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethernet => write!(f, "Ethernet"),
            Self::Wireless => write!(f, "Native802_11"),
            Self::Loopback => write!(f, "Loopback"),
            Self::Virtual => write!(f, "Virtual"),
            Self::Other(code) => write!(f, "Other({code})"),
        }
    }
}

/// One network adapter as seen by discovery.
///
/// Constructed once during discovery and never mutated afterwards.
///
/// # Instance ID
///
/// The instance ID is the platform's stable identifier (the interface GUID on
/// Windows). Heuristic discovery cannot always provide one, so it is optional;
/// an empty string is normalized to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterIdentity {
    /// The friendly name of the adapter (e.g., "Wi-Fi").
    pub name: String,
    /// Stable platform identifier, if known.
    pub instance_id: Option<String>,
    /// The type of adapter.
    pub kind: AdapterKind,
}

impl AdapterIdentity {
    /// Creates a new adapter identity.
    #[must_use]
    pub fn new(name: impl Into<String>, instance_id: impl Into<String>, kind: AdapterKind) -> Self {
        let instance_id = instance_id.into();
        let instance_id = instance_id.trim();

        Self {
            name: name.into(),
            instance_id: (!instance_id.is_empty()).then(|| instance_id.to_string()),
            kind,
        }
    }

    /// Returns the instance ID, if any.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}

impl fmt::Display for AdapterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  (GUID: {})  Media: {}",
            self.name,
            self.instance_id().unwrap_or("N/A"),
            self.kind
        )
    }
}

/// Removes adapters whose name was already seen (case-insensitive), keeping
/// the first occurrence.
///
/// Names double as the handle for every control operation, so they must be
/// unique within a run even when several discovery sources report the same
/// adapter.
#[must_use]
pub fn dedup_by_name(adapters: Vec<AdapterIdentity>) -> Vec<AdapterIdentity> {
    let mut seen = std::collections::HashSet::new();
    adapters
        .into_iter()
        .filter(|adapter| seen.insert(adapter.name.to_lowercase()))
        .collect()
}
