//! Network layer for adapter identity and discovery.
//!
//! This module provides types and traits for:
//! - Representing discovered adapters ([`AdapterIdentity`], [`AdapterKind`])
//! - Validating and generating hardware addresses ([`MacAddress`])
//! - Enumerating candidate adapters ([`AdapterDiscovery`])
//! - Parsing textual discovery fallbacks ([`parse`])
//! - Platform-specific implementations ([`platform`])

mod adapter;
mod discovery;
mod mac;
pub mod parse;
pub mod platform;

pub use adapter::{AdapterIdentity, AdapterKind, dedup_by_name};
pub use discovery::{AdapterDiscovery, DiscoveryError, discover_with_fallbacks};
pub use mac::{MAX_RANDOM_ATTEMPTS, MacAddress, MacError};
