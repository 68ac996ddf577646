//! Adapter discovery trait and error types.

use super::{AdapterIdentity, dedup_by_name};
use crate::command::CommandError;
use thiserror::Error;

/// Error type for adapter discovery.
///
/// Describes what went wrong without dictating recovery strategy.
/// Callers decide how to handle each error variant.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Windows API call failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),

    /// An external enumeration tool could not be run or failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Combines the primary enumeration with the textual fallbacks.
///
/// Fallbacks run only when `primary` produced no wireless adapter. Their
/// successful results are merged and de-duplicated by name. An error is
/// returned only when the primary enumeration and every fallback failed;
/// the last fallback error is reported.
///
/// # Errors
///
/// Returns the last fallback error when no strategy succeeded.
pub fn discover_with_fallbacks<F>(
    primary: Result<Vec<AdapterIdentity>, DiscoveryError>,
    fallbacks: F,
) -> Result<Vec<AdapterIdentity>, DiscoveryError>
where
    F: FnOnce() -> Vec<Result<Vec<AdapterIdentity>, DiscoveryError>>,
{
    let mut any_succeeded = match primary {
        Ok(adapters) if adapters.iter().any(|a| a.kind.is_wireless()) => {
            return Ok(dedup_by_name(adapters));
        }
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Adapter enumeration failed: {e}");
            false
        }
    };

    tracing::debug!("No wireless adapter from the primary enumeration, trying fallbacks");
    let mut merged = Vec::new();
    let mut last_error = None;
    for result in fallbacks() {
        match result {
            Ok(adapters) => {
                any_succeeded = true;
                merged.extend(adapters);
            }
            Err(e) => {
                tracing::debug!("Discovery fallback failed: {e}");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_succeeded => Err(e),
        _ => Ok(dedup_by_name(merged)),
    }
}

/// Trait for enumerating the adapters a session may modify.
///
/// # Design
///
/// - Only the shape of the result matters to the session; how adapters are
///   enumerated is entirely up to the implementation
/// - An empty list is a normal result, not an error
/// - Implementations may return non-wireless adapters; the session filters
///   on [`AdapterKind::is_wireless`](super::AdapterKind::is_wireless)
///
/// # Example
///
/// ```
/// use macshift::network::{AdapterDiscovery, AdapterIdentity, AdapterKind, DiscoveryError};
///
/// struct Fixed(Vec<AdapterIdentity>);
///
/// impl AdapterDiscovery for Fixed {
///     fn discover(&self) -> Result<Vec<AdapterIdentity>, DiscoveryError> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let discovery = Fixed(vec![AdapterIdentity::new("Wi-Fi", "", AdapterKind::Wireless)]);
/// assert_eq!(discovery.discover().unwrap().len(), 1);
/// ```
pub trait AdapterDiscovery: Send + Sync {
    /// Enumerates candidate adapters.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when every enumeration strategy failed.
    /// A strategy that succeeds with no adapters is `Ok(vec![])`.
    fn discover(&self) -> Result<Vec<AdapterIdentity>, DiscoveryError>;
}
