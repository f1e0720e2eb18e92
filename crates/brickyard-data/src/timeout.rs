//! Timeout configuration for fetch operations.

use std::time::Duration;

/// Default total timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout configuration for a fetch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total time for one attempt, including reading the body.
    pub total: Duration,
}

impl TimeoutConfig {
    /// Create a new timeout configuration.
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: std::cmp::min(total / 3, Duration::from_secs(10)),
            total,
        }
    }

    /// Create from a number of seconds, as read from configuration.
    pub fn from_secs(secs: u64) -> Self {
        Self::from_total(Duration::from_secs(secs))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(DEFAULT_TIMEOUT)
    }
}
