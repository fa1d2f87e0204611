//! # TaskActor: dispatch loop for one task.
//!
//! Each non-lifecycle task gets its own actor, an independently suspending
//! loop multiplexed onto the runtime with its siblings:
//!
//! ```text
//! loop {
//!   ├─► trigger.next_wait()
//!   │     ├─ None          → publish TriggerExhausted, exit
//!   │     └─ Some(delay)   → publish FireScheduled, cancellable sleep
//!   ├─► trigger.mark_fired()
//!   ├─► acquire global semaphore permit (optional, cancellable)
//!   ├─► publish TaskStarting{ run }
//!   └─► run_once(job, timeout)
//!         ├─ Ok / Canceled → TaskCompleted
//!         └─ Err           → TaskFailed — loop continues either way
//! }
//! ```
//!
//! ## Rules
//! - Invocations run **sequentially** within one actor, never in parallel.
//! - A failed invocation is contained: published, then the loop proceeds to
//!   the next fire. Sibling actors are unaffected.
//! - Cancellation is honored at the safe points: the trigger wait and the
//!   semaphore acquisition. Shutdown during an invocation is delivered through
//!   the invocation's own token.
//! - The fire counter (`run`) is monotonic for the life of the actor.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::app::runner::{run_once, RunIdent};
use crate::events::{Bus, Event, EventKind};
use crate::provider::Provider;
use crate::tasks::Task;

/// Dispatch loop for a single task: wait per trigger, invoke, repeat.
pub(crate) struct TaskActor {
    task: Task,
    bus: Bus,
    provider: Arc<Provider>,
    semaphore: Option<Arc<Semaphore>>,
}

impl TaskActor {
    /// Creates a new actor owning the task (and thereby its trigger).
    pub(crate) fn new(
        task: Task,
        bus: Bus,
        provider: Arc<Provider>,
        semaphore: Option<Arc<Semaphore>>,
    ) -> Self {
        Self {
            task,
            bus,
            provider,
            semaphore,
        }
    }

    /// Runs the loop until the trigger is exhausted or `runtime_token` fires.
    pub(crate) async fn run(mut self, runtime_token: CancellationToken) {
        let id = self.task.id();
        let mut run: u64 = 0;

        loop {
            if runtime_token.is_cancelled() {
                break;
            }

            let Some(wait) = self.task.trigger_mut().next_wait(Utc::now()) else {
                self.bus.publish(
                    Event::new(EventKind::TriggerExhausted)
                        .with_task(self.task.name())
                        .with_task_id(id)
                        .with_run(run),
                );
                break;
            };

            if !wait.is_zero() {
                self.bus.publish(
                    Event::new(EventKind::FireScheduled)
                        .with_task(self.task.name())
                        .with_task_id(id)
                        .with_delay(wait),
                );

                let sleep = time::sleep(wait);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = runtime_token.cancelled() => { break; }
                }
            }
            self.task.trigger_mut().mark_fired(Utc::now());

            let _permit = match &self.semaphore {
                Some(sem) => {
                    let acquire = Arc::clone(sem).acquire_owned();
                    tokio::pin!(acquire);
                    select! {
                        res = &mut acquire => match res {
                            Ok(permit) => Some(permit),
                            Err(_closed) => break,
                        },
                        _ = runtime_token.cancelled() => { break; }
                    }
                }
                None => None,
            };

            run += 1;
            self.bus.publish(
                Event::new(EventKind::TaskStarting)
                    .with_task(self.task.name())
                    .with_task_id(id)
                    .with_run(run),
            );

            // errors are contained here: the result is already published by
            // the runner, and the loop carries on to the next fire
            let _ = run_once(
                self.task.job(),
                &runtime_token,
                self.task.timeout(),
                &self.provider,
                &self.bus,
                RunIdent {
                    id,
                    name: self.task.name(),
                    run,
                },
            )
            .await;
        }
    }
}
