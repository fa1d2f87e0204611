//! # Application lifecycle states.
//!
//! The clock moves through these states strictly forward; there is no path
//! back from [`AppState::Terminated`] (and since
//! [`Clock::serve`](crate::Clock::serve) consumes the clock, a restart is
//! unrepresentable). Transitions are published as
//! [`EventKind::StateChanged`](crate::EventKind::StateChanged) events and
//! observable through the watch channel returned by
//! [`Clock::state_watch`](crate::Clock::state_watch).

use std::fmt;

/// Lifecycle state of a [`Clock`](crate::Clock).
///
/// ```text
/// Idle → Starting → Running → Stopping → ShutDown → Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Registered, not yet served.
    Idle,
    /// Lifespan setup and startup tasks are running.
    Starting,
    /// All periodic loops are active.
    Running,
    /// Cancellation propagating; waiting out the grace period.
    Stopping,
    /// Shutdown tasks are running.
    ShutDown,
    /// Everything done; the clock is gone.
    Terminated,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppState::Idle => "idle",
            AppState::Starting => "starting",
            AppState::Running => "running",
            AppState::Stopping => "stopping",
            AppState::ShutDown => "shut_down",
            AppState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
