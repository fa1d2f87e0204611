//! # Runtime events emitted by the clock and its task loops.
//!
//! [`EventKind`] classifies events across three groups:
//! - **Task lifecycle**: dispatch flow of one task loop (scheduled, starting,
//!   completed, failed, timeout, exhausted)
//! - **Application lifecycle**: state transitions and shutdown progress
//! - **Subscriber plumbing**: overflow and panic reports from the fan-out layer
//!
//! [`Event`] carries the metadata: a globally monotonic sequence number,
//! wall-clock timestamp, and optional task/run/delay/reason fields set
//! depending on the kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when events are observed out of
//! order across channels.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::app::AppState;
use crate::tasks::TaskId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle ===
    /// A task loop computed its next fire and went to sleep.
    ///
    /// Sets: `task`, `task_id`, `delay_ms`.
    FireScheduled,

    /// A task invocation is starting.
    ///
    /// Sets: `task`, `task_id`, `run` (1-based fire count).
    TaskStarting,

    /// A task invocation finished successfully (or exited on cancellation).
    ///
    /// Sets: `task`, `task_id`, `run`.
    TaskCompleted,

    /// A task invocation failed; the loop keeps running.
    ///
    /// Sets: `task`, `task_id`, `run`, `reason`.
    TaskFailed,

    /// A task invocation exceeded its timeout (always followed by `TaskFailed`).
    ///
    /// Sets: `task`, `task_id`, `run`, `timeout_ms`.
    TimeoutHit,

    /// A trigger reported no further fires; its loop exits for good.
    ///
    /// Sets: `task`, `task_id`, `run` (total fires).
    TriggerExhausted,

    // === Application lifecycle ===
    /// The application moved to a new lifecycle state.
    ///
    /// Sets: `state`.
    StateChanged,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All task loops stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some invocations were abandoned.
    GraceExceeded,

    // === Subscriber plumbing ===
    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while processing an event.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic message).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Registration id of the task, if applicable.
    pub task_id: Option<TaskId>,
    /// Fire count (1-based), if applicable.
    pub run: Option<u64>,
    /// Wait before the fire in milliseconds (compact).
    pub delay_ms: Option<u64>,
    /// Invocation timeout in milliseconds (compact).
    pub timeout_ms: Option<u64>,
    /// Human-readable reason (errors, overflow details, panic messages).
    pub reason: Option<Arc<str>>,
    /// New application state (for `StateChanged`).
    pub state: Option<AppState>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            task_id: None,
            run: None,
            delay_ms: None,
            timeout_ms: None,
            reason: None,
            state: None,
        }
    }

    /// Attaches a task (or subscriber) name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task registration id.
    #[inline]
    pub fn with_task_id(mut self, id: TaskId) -> Self {
        self.task_id = Some(id);
        self
    }

    /// Attaches a fire count.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches a wait duration (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an application state.
    #[inline]
    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    /// True for events produced by the fan-out layer itself.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::TaskFailed)
            .with_task("mailer")
            .with_task_id(TaskId(3))
            .with_run(7)
            .with_delay(Duration::from_secs(2))
            .with_reason("boom");

        assert_eq!(ev.kind, EventKind::TaskFailed);
        assert_eq!(ev.task.as_deref(), Some("mailer"));
        assert_eq!(ev.task_id, Some(TaskId(3)));
        assert_eq!(ev.run, Some(7));
        assert_eq!(ev.delay_ms, Some(2000));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
