//! Platform-specific adapter discovery implementations.
//!
//! This module provides conditional compilation for platform-specific
//! implementations of the [`AdapterDiscovery`](super::AdapterDiscovery) trait.
//!
//! # Platform Support
//!
//! - **Windows**: `GetAdaptersAddresses` via the `windows` crate, with `netsh`
//!   fallbacks.
//! - **Other platforms**: no implementation; the binary refuses to run.

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::WindowsDiscovery;

// Re-export platform-specific discovery as PlatformDiscovery for convenience
#[cfg(windows)]
pub use windows::WindowsDiscovery as PlatformDiscovery;
