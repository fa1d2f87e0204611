//! # Single-fire triggers.
//!
//! Three variants share the fire-exactly-once shape and differ only in *when*
//! the clock dispatches them:
//!
//! - [`Once`] fires immediately inside the periodic phase, then is terminal.
//! - [`OnStartUp`] fires during application startup, before any periodic loop.
//! - [`OnShutDown`] fires during shutdown, after the periodic loops stopped.

use std::time::Duration;

/// Fires exactly once, immediately, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct Once {
    fired: bool,
}

impl Once {
    /// Creates the trigger.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_wait(&self) -> Option<Duration> {
        if self.fired {
            None
        } else {
            Some(Duration::ZERO)
        }
    }

    pub(crate) fn mark_fired(&mut self) {
        self.fired = true;
    }
}

/// Fires exactly once, when the application starts up.
#[derive(Debug, Clone, Default)]
pub struct OnStartUp {
    fired: bool,
}

impl OnStartUp {
    /// Creates the trigger.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_wait(&self) -> Option<Duration> {
        if self.fired {
            None
        } else {
            Some(Duration::ZERO)
        }
    }

    pub(crate) fn mark_fired(&mut self) {
        self.fired = true;
    }
}

/// Fires exactly once, when the application shuts down.
#[derive(Debug, Clone, Default)]
pub struct OnShutDown {
    fired: bool,
}

impl OnShutDown {
    /// Creates the trigger.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_wait(&self) -> Option<Duration> {
        if self.fired {
            None
        } else {
            Some(Duration::ZERO)
        }
    }

    pub(crate) fn mark_fired(&mut self) {
        self.fired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn once_fires_exactly_once() {
        let mut once = Once::new();
        assert_eq!(once.next_wait(), Some(Duration::ZERO));
        once.mark_fired();
        assert_eq!(once.next_wait(), None);
        assert_eq!(once.next_wait(), None);
    }

    #[test]
    fn lifecycle_variants_share_the_shape() {
        let mut up = OnStartUp::new();
        let mut down = OnShutDown::new();
        assert_eq!(up.next_wait(), Some(Duration::ZERO));
        assert_eq!(down.next_wait(), Some(Duration::ZERO));
        up.mark_fired();
        down.mark_fired();
        assert_eq!(up.next_wait(), None);
        assert_eq!(down.next_wait(), None);
    }
}
