//! Trigger policies: when a task becomes eligible to run.
//!
//! A [`Trigger`] answers one question, repeatedly: *how long until the next
//! fire?* The dispatch loop sleeps that long, invokes the job, records the
//! fire, and asks again — until the trigger reports it is exhausted.
//!
//! ## Contents
//! - [`Every`] — fixed period, deadline-anchored
//! - [`At`] — daily (or weekly) wall-clock time in a named timezone
//! - [`Cron`] — cron expression in a named timezone
//! - [`Once`] — exactly one fire
//! - [`OnStartUp`] / [`OnShutDown`] — one fire at application start/stop,
//!   out of band from the periodic loops
//! - [`Forever`] — always immediately eligible; the job paces itself
//! - [`OrTrigger`] — fires when the earliest of its children would
//!
//! ## Contract
//! Triggers are a closed set of variants behind one enum rather than a trait
//! hierarchy; the dispatch loop matches on data, not vtables. Each variant
//! keeps its own schedule state (fire counts, anchored deadlines), which is
//! why a trigger instance belongs to exactly one task.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use chime::{Every, Trigger};
//!
//! let trigger: Trigger = Every::new(Duration::from_secs(3)).with_max_runs(10).into();
//! assert!(trigger.validate().is_ok());
//! ```

mod at;
mod cron;
mod every;
mod forever;
mod once;
mod or;

pub use at::{At, DayRule};
pub use cron::Cron;
pub use every::{Every, FirstRun};
pub use forever::Forever;
pub use once::{OnShutDown, OnStartUp, Once};
pub use or::OrTrigger;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::TriggerError;

/// Classification of trigger variants.
///
/// Used by the clock to segregate lifecycle tasks (`OnStartUp`/`OnShutDown`)
/// from the periodic loops, and surfaced in task metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Every,
    At,
    Cron,
    Once,
    OnStartUp,
    OnShutDown,
    Forever,
    Or,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerKind::Every => "every",
            TriggerKind::At => "at",
            TriggerKind::Cron => "cron",
            TriggerKind::Once => "once",
            TriggerKind::OnStartUp => "on_start_up",
            TriggerKind::OnShutDown => "on_shut_down",
            TriggerKind::Forever => "forever",
            TriggerKind::Or => "or",
        };
        f.write_str(name)
    }
}

/// Policy determining when a task becomes eligible to run.
///
/// Owned exclusively by its task; firing mutates internal schedule state.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Fires repeatedly at a fixed period.
    Every(Every),
    /// Fires daily (or weekly) at a wall-clock instant.
    At(At),
    /// Fires per a cron schedule.
    Cron(Cron),
    /// Fires exactly once.
    Once(Once),
    /// Fires once, at application start.
    OnStartUp(OnStartUp),
    /// Fires once, at application shutdown.
    OnShutDown(OnShutDown),
    /// Always immediately eligible.
    Forever(Forever),
    /// Fires when any child trigger would.
    Or(OrTrigger),
}

impl Trigger {
    /// Returns the variant classification.
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Every(_) => TriggerKind::Every,
            Trigger::At(_) => TriggerKind::At,
            Trigger::Cron(_) => TriggerKind::Cron,
            Trigger::Once(_) => TriggerKind::Once,
            Trigger::OnStartUp(_) => TriggerKind::OnStartUp,
            Trigger::OnShutDown(_) => TriggerKind::OnShutDown,
            Trigger::Forever(_) => TriggerKind::Forever,
            Trigger::Or(_) => TriggerKind::Or,
        }
    }

    /// Validates the trigger configuration.
    ///
    /// Called for every registered task before anything executes; a failure
    /// aborts [`Clock::serve`](crate::Clock::serve).
    pub fn validate(&self) -> Result<(), TriggerError> {
        match self {
            Trigger::Every(t) => t.validate(),
            Trigger::At(t) => t.validate(),
            Trigger::Cron(_) => Ok(()), // validated at construction
            Trigger::Once(_) | Trigger::OnStartUp(_) | Trigger::OnShutDown(_) => Ok(()),
            Trigger::Forever(_) => Ok(()),
            Trigger::Or(t) => t.validate(),
        }
    }

    /// Returns the wait until the next fire, or `None` if the trigger is
    /// exhausted and will never fire again.
    ///
    /// A zero duration means "fire now". The first call may anchor internal
    /// deadlines at `now`.
    pub fn next_wait(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Trigger::Every(t) => t.next_wait(now),
            Trigger::At(t) => t.next_wait(now),
            Trigger::Cron(t) => t.next_wait(now),
            Trigger::Once(t) => t.next_wait(),
            Trigger::OnStartUp(t) => t.next_wait(),
            Trigger::OnShutDown(t) => t.next_wait(),
            Trigger::Forever(_) => Some(Duration::ZERO),
            Trigger::Or(t) => t.next_wait(now),
        }
    }

    /// Records one fire at `now`, advancing internal schedule state.
    pub fn mark_fired(&mut self, now: DateTime<Utc>) {
        match self {
            Trigger::Every(t) => t.mark_fired(),
            Trigger::At(t) => t.mark_fired(now),
            Trigger::Cron(t) => t.mark_fired(now),
            Trigger::Once(t) => t.mark_fired(),
            Trigger::OnStartUp(t) => t.mark_fired(),
            Trigger::OnShutDown(t) => t.mark_fired(),
            Trigger::Forever(_) => {}
            Trigger::Or(t) => t.mark_fired(now),
        }
    }

    // --- convenience constructors ---

    /// A trigger firing every `period`.
    pub fn every(period: Duration) -> Self {
        Every::new(period).into()
    }

    /// A trigger firing exactly once, immediately.
    pub fn once() -> Self {
        Once::new().into()
    }

    /// A trigger firing once at application start.
    pub fn on_start_up() -> Self {
        OnStartUp::new().into()
    }

    /// A trigger firing once at application shutdown.
    pub fn on_shut_down() -> Self {
        OnShutDown::new().into()
    }

    /// A trigger that is always immediately eligible.
    pub fn forever() -> Self {
        Forever::new().into()
    }

    /// A trigger firing daily at `hour:minute:second` in `tz`.
    pub fn at(hour: u8, minute: u8, second: u8, tz: Tz) -> Self {
        At::new(hour, minute, second, tz).into()
    }

    /// A trigger firing per the given cron expression in `tz`.
    ///
    /// Standard 5-field expressions are accepted (seconds default to 0).
    pub fn cron(expr: &str, tz: Tz) -> Result<Self, TriggerError> {
        Cron::new(expr, tz).map(Into::into)
    }

    /// A combination firing when any of `children` would.
    pub fn any_of(children: Vec<Trigger>) -> Self {
        OrTrigger::new(children).into()
    }
}

impl From<Every> for Trigger {
    fn from(t: Every) -> Self {
        Trigger::Every(t)
    }
}

impl From<At> for Trigger {
    fn from(t: At) -> Self {
        Trigger::At(t)
    }
}

impl From<Cron> for Trigger {
    fn from(t: Cron) -> Self {
        Trigger::Cron(t)
    }
}

impl From<Once> for Trigger {
    fn from(t: Once) -> Self {
        Trigger::Once(t)
    }
}

impl From<OnStartUp> for Trigger {
    fn from(t: OnStartUp) -> Self {
        Trigger::OnStartUp(t)
    }
}

impl From<OnShutDown> for Trigger {
    fn from(t: OnShutDown) -> Self {
        Trigger::OnShutDown(t)
    }
}

impl From<Forever> for Trigger {
    fn from(t: Forever) -> Self {
        Trigger::Forever(t)
    }
}

impl From<OrTrigger> for Trigger {
    fn from(t: OrTrigger) -> Self {
        Trigger::Or(t)
    }
}
