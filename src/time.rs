//! Sleep abstraction for testability.
//!
//! This module provides a [`Sleeper`] trait so the adapter settle delay can be
//! observed in tests instead of actually blocking.

use std::time::Duration;

/// Abstraction over blocking sleeps.
///
/// # Example
///
/// ```
/// use macshift::time::{Sleeper, ThreadSleeper};
/// use std::time::Duration;
///
/// let sleeper = ThreadSleeper;
/// sleeper.sleep(Duration::from_millis(1));
/// ```
pub trait Sleeper: Send + Sync {
    /// Blocks the current thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production sleeper delegating to [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
