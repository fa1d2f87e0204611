//! # Registered task.
//!
//! A [`Task`] is a [`TaskSpec`](crate::TaskSpec) that has been accepted by a
//! [`Clock`](crate::Clock): it carries a [`TaskId`] reflecting registration
//! order and, when it came in through a group, the group's name. Tasks are
//! immutable after registration; the trigger inside is owned exclusively by
//! its task and mutates only as the dispatch loop records fires.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::tasks::{Job, JobRef, TaskSpec};
use crate::triggers::Trigger;

/// Identity of a registered task: its registration order, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered task: job + trigger + id + optional group membership.
pub struct Task {
    id: TaskId,
    job: JobRef,
    trigger: Trigger,
    timeout: Option<Duration>,
    group: Option<Arc<str>>,
}

impl Task {
    pub(crate) fn from_spec(id: TaskId, spec: TaskSpec, group: Option<Arc<str>>) -> Self {
        Self {
            id,
            job: spec.job,
            trigger: spec.trigger,
            timeout: spec.timeout,
            group,
        }
    }

    /// Registration id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The job name.
    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// Shared handle to the job.
    pub fn job(&self) -> &JobRef {
        &self.job
    }

    /// The trigger configuration.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The per-invocation timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Name of the group this task came in through, if any.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub(crate) fn trigger_mut(&mut self) -> &mut Trigger {
        &mut self.trigger
    }
}
