//! # Fixed-period trigger.
//!
//! [`Every`] fires repeatedly at a fixed period. Deadlines are anchored: each
//! fire advances the next deadline by exactly one period from the *scheduled*
//! instant, not from the actual wake-up, so successive fire instants stay
//! spaced exactly one period apart regardless of dispatch jitter or how long
//! the job itself takes.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use chime::{Every, FirstRun};
//!
//! // fire immediately, then every 30s, at most 10 times
//! let every = Every::new(Duration::from_secs(30))
//!     .with_first_run(FirstRun::Immediate)
//!     .with_max_runs(10);
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::TriggerError;

/// Strategy for the first fire of an [`Every`] trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstRun {
    /// Fire as soon as the loop starts, then wait one period between fires.
    Immediate,
    /// Wait one full period before the first fire.
    #[default]
    Delayed,
}

/// Fires repeatedly at a fixed period.
#[derive(Debug, Clone)]
pub struct Every {
    period: Duration,
    first_run: FirstRun,
    max_runs: Option<u64>,
    runs: u64,
    next_at: Option<DateTime<Utc>>,
}

impl Every {
    /// Creates a trigger firing every `period`, waiting one period before the
    /// first fire.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            first_run: FirstRun::default(),
            max_runs: None,
            runs: 0,
            next_at: None,
        }
    }

    /// Sets the first-fire strategy.
    pub fn with_first_run(mut self, first_run: FirstRun) -> Self {
        self.first_run = first_run;
        self
    }

    /// Bounds the total number of fires; the trigger is exhausted afterwards.
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs = Some(max_runs);
        self
    }

    /// The configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fires recorded so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub(crate) fn validate(&self) -> Result<(), TriggerError> {
        if self.period.is_zero() {
            return Err(TriggerError::ZeroInterval);
        }
        Ok(())
    }

    fn exhausted(&self) -> bool {
        matches!(self.max_runs, Some(max) if self.runs >= max)
    }

    fn period_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.period).unwrap_or(TimeDelta::MAX)
    }

    pub(crate) fn next_wait(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        let next = match self.next_at {
            Some(at) => at,
            None => {
                // first call anchors the schedule
                let at = match self.first_run {
                    FirstRun::Immediate => now,
                    FirstRun::Delayed => advance(now, self.period_delta()),
                };
                self.next_at = Some(at);
                at
            }
        };
        Some((next - now).to_std().unwrap_or(Duration::ZERO))
    }

    pub(crate) fn mark_fired(&mut self) {
        self.runs += 1;
        if let Some(at) = self.next_at {
            self.next_at = Some(advance(at, self.period_delta()));
        }
    }
}

/// Deadline shift that saturates instead of overflowing on absurd periods.
fn advance(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn delayed_first_run_waits_one_period() {
        let mut every = Every::new(Duration::from_secs(3));
        assert_eq!(every.next_wait(at(0)), Some(Duration::from_secs(3)));
    }

    #[test]
    fn immediate_first_run_fires_now() {
        let mut every = Every::new(Duration::from_secs(3)).with_first_run(FirstRun::Immediate);
        assert_eq!(every.next_wait(at(0)), Some(Duration::ZERO));
        every.mark_fired();
        assert_eq!(every.next_wait(at(0)), Some(Duration::from_secs(3)));
    }

    #[test]
    fn deadlines_are_anchored_not_drifting() {
        let mut every = Every::new(Duration::from_secs(3));
        assert_eq!(every.next_wait(at(0)), Some(Duration::from_secs(3)));
        every.mark_fired();

        // the dispatch woke up late and the job ran for a while; the next
        // deadline is still t=6, so only 1s of waiting remains
        assert_eq!(every.next_wait(at(5)), Some(Duration::from_secs(1)));
        every.mark_fired();

        // overshooting the deadline clamps to zero
        assert_eq!(every.next_wait(at(10)), Some(Duration::ZERO));
    }

    #[test]
    fn max_runs_exhausts_the_trigger() {
        let mut every = Every::new(Duration::from_secs(1)).with_max_runs(2);
        assert!(every.next_wait(at(0)).is_some());
        every.mark_fired();
        assert!(every.next_wait(at(1)).is_some());
        every.mark_fired();
        assert_eq!(every.next_wait(at(2)), None);
        assert_eq!(every.runs(), 2);
    }

    #[test]
    fn zero_period_fails_validation() {
        let every = Every::new(Duration::ZERO);
        assert_eq!(every.validate(), Err(TriggerError::ZeroInterval));
    }
}
