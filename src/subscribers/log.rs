//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format. Enabled
//! via the `logging` cargo feature; intended for development and examples —
//! implement a custom [`Subscribe`](crate::Subscribe) for structured logging
//! or metrics collection.
//!
//! ## Output format
//! ```text
//! [scheduled] task=ticker delay_ms=3000
//! [starting] task=ticker run=1
//! [completed] task=ticker run=1
//! [failed] task=ticker run=2 err="connection refused"
//! [timeout] task=ticker timeout_ms=5000
//! [exhausted] task=ticker runs=10
//! [state] running
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates the subscriber.
    pub fn new() -> Self {
        Self
    }
}

fn opt(field: &Option<std::sync::Arc<str>>) -> &str {
    field.as_deref().unwrap_or("?")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::FireScheduled => {
                println!(
                    "[scheduled] task={} delay_ms={}",
                    opt(&e.task),
                    e.delay_ms.unwrap_or(0)
                );
            }
            EventKind::TaskStarting => {
                println!(
                    "[starting] task={} run={}",
                    opt(&e.task),
                    e.run.unwrap_or(0)
                );
            }
            EventKind::TaskCompleted => {
                println!(
                    "[completed] task={} run={}",
                    opt(&e.task),
                    e.run.unwrap_or(0)
                );
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] task={} run={} err={:?}",
                    opt(&e.task),
                    e.run.unwrap_or(0),
                    opt(&e.reason)
                );
            }
            EventKind::TimeoutHit => {
                println!(
                    "[timeout] task={} timeout_ms={}",
                    opt(&e.task),
                    e.timeout_ms.unwrap_or(0)
                );
            }
            EventKind::TriggerExhausted => {
                println!(
                    "[exhausted] task={} runs={}",
                    opt(&e.task),
                    e.run.unwrap_or(0)
                );
            }
            EventKind::StateChanged => match e.state {
                Some(state) => println!("[state] {state}"),
                None => println!("[state] ?"),
            },
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={} reason={}",
                    opt(&e.task),
                    opt(&e.reason)
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panic] subscriber={} info={:?}",
                    opt(&e.task),
                    opt(&e.reason)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
