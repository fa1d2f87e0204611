//! # Always-eligible trigger.
//!
//! [`Forever`] reports a zero wait on every query: the loop re-invokes the job
//! as soon as the previous invocation returns. The job governs its own pacing
//! (e.g. an internal `tokio::time::sleep`); without one, the loop spins as
//! fast as the job completes.

/// Always immediately eligible; never exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forever;

impl Forever {
    /// Creates the trigger.
    pub fn new() -> Self {
        Self
    }
}
