//! Simulated network latency for backend operations.

use std::time::Duration;

/// Artificial delays applied by [`LocalBackend`](super::LocalBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Catalog, order and subscriber reads.
    pub read: Duration,
    /// Catalog and subscriber writes.
    pub write: Duration,
    /// Order creation, modelling a slower payment gateway.
    pub create_order: Duration,
    /// PIN verification; the only brute-force mitigation.
    pub verify_pin: Duration,
}

impl Latency {
    /// Delays that feel like a real backend.
    #[must_use]
    pub const fn simulated() -> Self {
        Self {
            read: Duration::from_millis(300),
            write: Duration::from_millis(500),
            create_order: Duration::from_millis(1500),
            verify_pin: Duration::from_millis(800),
        }
    }

    /// No delays at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            read: Duration::ZERO,
            write: Duration::ZERO,
            create_order: Duration::ZERO,
            verify_pin: Duration::ZERO,
        }
    }

    /// `simulated()` when `enabled`, otherwise `none()`.
    #[must_use]
    pub const fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::simulated()
        } else {
            Self::none()
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::simulated()
    }
}

/// Sleep for `delay`, skipping the timer entirely when it is zero.
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
