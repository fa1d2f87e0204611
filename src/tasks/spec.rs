//! # Task specification.
//!
//! [`TaskSpec`] bundles what the registration surface needs: the job, its
//! trigger, and an optional per-invocation timeout. Registering the spec with
//! a [`Clock`](crate::Clock) or a [`Group`](crate::Group) turns it into an
//! immutable [`Task`](crate::Task) with an id.

use std::time::Duration;

use crate::tasks::{Job, JobRef};
use crate::triggers::Trigger;

/// Specification of a task: job + trigger + optional timeout.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use chime::{JobFn, TaskContext, TaskError, TaskSpec, Trigger};
///
/// let job = JobFn::arc("poll", |_ctx: TaskContext| async {
///     Ok::<_, TaskError>(())
/// });
///
/// let spec = TaskSpec::new(job, Trigger::every(Duration::from_secs(3)))
///     .with_timeout(Duration::from_secs(1));
/// assert_eq!(spec.name(), "poll");
/// ```
#[derive(Clone)]
pub struct TaskSpec {
    pub(crate) job: JobRef,
    pub(crate) trigger: Trigger,
    pub(crate) timeout: Option<Duration>,
}

impl TaskSpec {
    /// Creates a specification from a job and any trigger.
    pub fn new(job: JobRef, trigger: impl Into<Trigger>) -> Self {
        Self {
            job,
            trigger: trigger.into(),
            timeout: None,
        }
    }

    /// Sets a per-invocation timeout; an invocation exceeding it is cancelled
    /// and reported as failed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Convenience: the job name.
    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// The trigger configuration.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::{JobFn, TaskContext};
    use crate::triggers::TriggerKind;

    #[test]
    fn builder_sets_fields() {
        let job = JobFn::arc("poll", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) });
        let spec = TaskSpec::new(job, Trigger::once()).with_timeout(Duration::from_secs(2));

        assert_eq!(spec.name(), "poll");
        assert_eq!(spec.trigger().kind(), TriggerKind::Once);
        assert_eq!(spec.timeout(), Some(Duration::from_secs(2)));
    }
}
