//! # Global runtime configuration.
//!
//! [`Config`] centralizes the settings of the [`Clock`](crate::Clock) runtime.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no global semaphore created)
//! - `timeout = 0s` → no default per-invocation timeout
//!
//! Prefer the helper accessors over checking sentinels at call sites.

use std::time::Duration;

/// Global configuration for the scheduler runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for in-flight invocations after cancellation
/// - `max_concurrent`: cap on simultaneously running invocations (`0` = unlimited)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
/// - `timeout`: default per-invocation timeout (`0s` = none; overridable per task)
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for in-flight tasks once shutdown begins.
    ///
    /// When the runtime token is cancelled, the clock waits up to `grace` for
    /// all task loops to exit; overruns surface as
    /// [`RuntimeError::GraceExceeded`](crate::RuntimeError::GraceExceeded).
    pub grace: Duration,

    /// Maximum number of job invocations running at the same time.
    ///
    /// - `0` = unlimited (no semaphore)
    /// - `n > 0` = at most `n` invocations in flight, across all tasks
    pub max_concurrent: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip the oldest items. Minimum value is 1.
    pub bus_capacity: usize,

    /// Default per-invocation timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = applied to every task that does not set its own
    pub timeout: Duration,
}

impl Config {
    /// Returns the global concurrency limit as an `Option`.
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns the default per-invocation timeout as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s`
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `timeout = 0s` (no timeout)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            max_concurrent: 0,
            bus_capacity: 1024,
            timeout: Duration::ZERO,
        }
    }
}
