//! # Run a single job invocation.
//!
//! [`run_once`] executes one invocation of a task's job with an optional
//! timeout, publishing the terminal event to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! Success:      job.run() → Ok(())            → TaskCompleted
//! Cancellation: job.run() → Err(Canceled)     → TaskCompleted (graceful exit)
//! Failure:      job.run() → Err(other)        → TaskFailed
//! Timeout:      deadline exceeded → cancel child → TimeoutHit + TaskFailed
//! ```
//!
//! ## Rules
//! - Exactly one terminal event per invocation: `TaskCompleted` or `TaskFailed`.
//! - `TimeoutHit` is published in addition to `TaskFailed` on timeout.
//! - Each invocation gets a **child token**; cancelling it (timeout) does not
//!   affect the parent or sibling attempts.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::provider::Provider;
use crate::tasks::{Job, JobRef, TaskContext, TaskId};

/// Identity fields threaded through the published events.
#[derive(Clone, Copy)]
pub(crate) struct RunIdent<'a> {
    pub(crate) id: TaskId,
    pub(crate) name: &'a str,
    pub(crate) run: u64,
}

/// Executes a single invocation of `job`, publishing its terminal event.
pub(crate) async fn run_once(
    job: &JobRef,
    parent: &CancellationToken,
    timeout: Option<Duration>,
    provider: &Arc<Provider>,
    bus: &Bus,
    ident: RunIdent<'_>,
) -> Result<(), TaskError> {
    let child = parent.child_token();
    let ctx = TaskContext::new(child.clone(), Arc::clone(provider));

    let res = match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, job.run(ctx)).await {
            Ok(r) => r,
            Err(_elapsed) => {
                child.cancel();
                bus.publish(
                    Event::new(EventKind::TimeoutHit)
                        .with_task(ident.name)
                        .with_task_id(ident.id)
                        .with_run(ident.run)
                        .with_timeout(dur),
                );
                Err(TaskError::Timeout { timeout: dur })
            }
        },
        None => job.run(ctx).await,
    };

    match res {
        Ok(()) => {
            publish_completed(bus, ident);
            Ok(())
        }
        Err(TaskError::Canceled) => {
            publish_completed(bus, ident);
            Err(TaskError::Canceled)
        }
        Err(e) => {
            bus.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(ident.name)
                    .with_task_id(ident.id)
                    .with_run(ident.run)
                    .with_reason(e.as_message()),
            );
            Err(e)
        }
    }
}

/// Publishes `TaskCompleted` (success or graceful cancellation).
fn publish_completed(bus: &Bus, ident: RunIdent<'_>) {
    bus.publish(
        Event::new(EventKind::TaskCompleted)
            .with_task(ident.name)
            .with_task_id(ident.id)
            .with_run(ident.run),
    );
}
