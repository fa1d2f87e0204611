//! Introspection API over a [`Clock`] instance.
//!
//! Useful when embedding the scheduler in a larger application (a web
//! endpoint, a CLI) that needs to list registered tasks or poke one out of
//! band. State lives in memory only: metadata reflects the clock as currently
//! registered, and ids are stable only within one process run.

use tokio_util::sync::CancellationToken;

use crate::app::Clock;
use crate::error::RuntimeError;
use crate::tasks::{Job, TaskContext, TaskId};
use crate::triggers::TriggerKind;

/// Metadata of one registered task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMetadata {
    /// Registration id (stable for this process run).
    pub id: TaskId,
    /// Job name.
    pub name: String,
    /// Group the task came in through, if any.
    pub group: Option<String>,
    /// Trigger classification.
    pub trigger: TriggerKind,
}

/// Lists metadata for every registered task, in registration order.
///
/// ## Example
/// ```rust
/// use chime::api::task_metadata;
/// use chime::{Clock, Config, JobFn, TaskContext, TaskError, TaskSpec, Trigger};
///
/// let mut app = Clock::new(Config::default());
/// app.task(TaskSpec::new(
///     JobFn::arc("probe", |_ctx: TaskContext| async { Ok::<_, TaskError>(()) }),
///     Trigger::once(),
/// ));
///
/// let meta = task_metadata(&app);
/// assert_eq!(meta[0].name, "probe");
/// ```
pub fn task_metadata(clock: &Clock) -> Vec<TaskMetadata> {
    clock
        .tasks()
        .iter()
        .map(|task| TaskMetadata {
            id: task.id(),
            name: task.name().to_string(),
            group: task.group().map(str::to_string),
            trigger: task.trigger().kind(),
        })
        .collect()
}

/// Invokes a registered task's job once, immediately, out of band.
///
/// The trigger is not consulted and not advanced; dependencies resolve
/// through the clock's provider exactly as they would in a scheduled run.
pub async fn run_task(clock: &Clock, id: TaskId) -> Result<(), RuntimeError> {
    let task = clock
        .tasks()
        .iter()
        .find(|task| task.id() == id)
        .ok_or(RuntimeError::TaskNotFound { id })?;

    let ctx = TaskContext::new(CancellationToken::new(), clock.provider().clone());
    task.job()
        .run(ctx)
        .await
        .map_err(|source| RuntimeError::TaskFailed {
            task: task.name().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::TaskError;
    use crate::tasks::{Group, JobFn, TaskSpec};
    use crate::triggers::Trigger;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn metadata_reflects_registration() {
        let mut app = Clock::new(Config::default());
        app.task(TaskSpec::new(
            JobFn::arc("direct", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::every(Duration::from_secs(1)),
        ));

        let mut group = Group::new("emails");
        group.task(TaskSpec::new(
            JobFn::arc("digest", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));
        app.include_group(group);

        let meta = task_metadata(&app);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[0].id, TaskId(0));
        assert_eq!(meta[0].trigger, TriggerKind::Every);
        assert_eq!(meta[0].group, None);
        assert_eq!(meta[1].name, "digest");
        assert_eq!(meta[1].group.as_deref(), Some("emails"));
    }

    #[tokio::test]
    async fn run_task_invokes_with_injected_dependencies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = Clock::new(Config::default());
        app.provider().register(|| 10u64);

        let seen = calls.clone();
        let id = app.task(TaskSpec::new(
            JobFn::arc("adder", move |ctx: TaskContext| {
                let seen = seen.clone();
                async move {
                    let bump = ctx.get::<u64>()?;
                    seen.fetch_add(bump as usize, Ordering::SeqCst);
                    Ok::<(), TaskError>(())
                }
            }),
            Trigger::once(),
        ));

        run_task(&app, id).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn unknown_id_is_reported() {
        let app = Clock::new(Config::default());
        let err = run_task(&app, TaskId(42)).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::TaskNotFound { id: TaskId(42) }
        ));
    }

    #[tokio::test]
    async fn job_failure_is_wrapped() {
        let mut app = Clock::new(Config::default());
        let id = app.task(TaskSpec::new(
            JobFn::arc("faulty", |_ctx: TaskContext| async {
                Err::<(), TaskError>(TaskError::failed("kaput"))
            }),
            Trigger::once(),
        ));

        let err = run_task(&app, id).await.unwrap_err();
        assert!(matches!(err, RuntimeError::TaskFailed { .. }));
        assert!(err.to_string().contains("faulty"));
    }
}
