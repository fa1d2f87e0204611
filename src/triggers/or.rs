//! # Or-combination of triggers.
//!
//! [`OrTrigger`] is eligible whenever its earliest child is: the reported wait
//! is the minimum over all non-exhausted children. Firing produces **one**
//! invocation per wake-up — every child whose deadline has arrived advances,
//! so two children due at the same instant never double-fire the task.
//!
//! A combination of `Every(3s)` and `Every(5s)` therefore fires at
//! t = 3, 5, 6, 9, 10, 12, 15, … with a single fire at common multiples.
//!
//! Child bounds are fully respected: an exhausted child is skipped, and the
//! combination is terminal once all children are (or its own `max_runs` is
//! reached).

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::TriggerError;
use crate::triggers::Trigger;

/// Fires when any child trigger would.
#[derive(Debug, Clone)]
pub struct OrTrigger {
    children: Vec<Trigger>,
    max_runs: Option<u64>,
    runs: u64,
}

impl OrTrigger {
    /// Creates a combination over `children`.
    pub fn new(children: Vec<Trigger>) -> Self {
        Self {
            children,
            max_runs: None,
            runs: 0,
        }
    }

    /// Bounds the total number of fires; the combination is exhausted afterwards.
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs = Some(max_runs);
        self
    }

    /// The child triggers.
    pub fn children(&self) -> &[Trigger] {
        &self.children
    }

    /// Validates the combination and every child.
    pub fn validate(&self) -> Result<(), TriggerError> {
        if self.children.is_empty() {
            return Err(TriggerError::EmptyCombination);
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    fn exhausted(&self) -> bool {
        matches!(self.max_runs, Some(max) if self.runs >= max)
    }

    pub(crate) fn next_wait(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        let mut best: Option<Duration> = None;
        for child in &mut self.children {
            if let Some(wait) = child.next_wait(now) {
                best = Some(best.map_or(wait, |b| b.min(wait)));
            }
        }
        best
    }

    pub(crate) fn mark_fired(&mut self, now: DateTime<Utc>) {
        self.runs += 1;
        // advance every child that is due; one wake-up, one fire
        for child in &mut self.children {
            if child.next_wait(now) == Some(Duration::ZERO) {
                child.mark_fired(now);
            }
        }
    }
}
