//! Error types used by the chime runtime, triggers, and jobs.
//!
//! Three enums cover the failure surfaces:
//!
//! - [`TriggerError`] — malformed trigger configuration, detected before any
//!   task runs (fatal at startup).
//! - [`TaskError`] — errors raised by a single job invocation, contained at the
//!   loop boundary.
//! - [`RuntimeError`] — errors raised by the orchestration itself.
//!
//! All types provide `as_label`/`as_message` helpers for logs and metrics.

use std::time::Duration;
use thiserror::Error;

use crate::tasks::TaskId;

/// # Errors produced by trigger validation.
///
/// Every registered trigger is validated before the application starts; any of
/// these aborts [`Clock::serve`](crate::Clock::serve) before a single job runs.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// An `Every` trigger was configured with a zero-length period.
    #[error("interval must be greater than zero")]
    ZeroInterval,

    /// An `At` trigger holds an out-of-range time-of-day field.
    #[error("invalid time of day {hour:02}:{minute:02}:{second:02}")]
    InvalidTimeOfDay {
        /// Hour component (valid: 0-23).
        hour: u8,
        /// Minute component (valid: 0-59).
        minute: u8,
        /// Second component (valid: 0-59).
        second: u8,
    },

    /// A cron expression could not be parsed.
    #[error("invalid cron expression {expr:?}: {reason}")]
    InvalidCron {
        /// The offending expression.
        expr: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A timezone name was not found in the IANA database.
    #[error("unknown timezone {name:?}")]
    UnknownTimezone {
        /// The offending zone name.
        name: String,
    },

    /// An `Or` combination was built without any child triggers.
    #[error("or-combination requires at least one child trigger")]
    EmptyCombination,
}

impl TriggerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TriggerError::ZeroInterval => "trigger_zero_interval",
            TriggerError::InvalidTimeOfDay { .. } => "trigger_invalid_time_of_day",
            TriggerError::InvalidCron { .. } => "trigger_invalid_cron",
            TriggerError::UnknownTimezone { .. } => "trigger_unknown_timezone",
            TriggerError::EmptyCombination => "trigger_empty_combination",
        }
    }
}

/// # Errors produced by a single job invocation.
///
/// These are contained per task loop: the runner publishes them as events and
/// the loop proceeds to the next fire. They never terminate sibling loops.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The invocation exceeded its configured timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The job failed with an application error.
    #[error("execution failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The job asked for a dependency no provider was registered for.
    #[error("no provider registered for {type_name}")]
    MissingDependency {
        /// The requested dependency type.
        type_name: &'static str,
    },

    /// The invocation observed cancellation and exited early.
    #[error("cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Failed`] from any displayable error.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        TaskError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Failed { .. } => "task_failed",
            TaskError::MissingDependency { .. } => "task_missing_dependency",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Failed { error } => format!("error: {error}"),
            TaskError::MissingDependency { type_name } => {
                format!("missing dependency: {type_name}")
            }
            TaskError::Canceled => "cancelled".to_string(),
        }
    }
}

/// # Errors produced by the chime runtime.
///
/// Failures of the orchestration layer: validation at startup, the lifespan
/// hook, shutdown overruns, and the introspection API.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A registered task carries a misconfigured trigger (fail fast, nothing ran).
    #[error("task {task:?} has an invalid trigger: {source}")]
    InvalidTrigger {
        /// Name of the offending task.
        task: String,
        /// The validation failure.
        #[source]
        source: TriggerError,
    },

    /// The lifespan hook failed during setup; the application never reached `Running`.
    #[error("lifespan setup failed: {error}")]
    LifespanFailed {
        /// The underlying error message.
        error: String,
    },

    /// Shutdown grace period was exceeded; some tasks remained in flight and were abandoned.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that did not stop in time.
        stuck: Vec<String>,
    },

    /// No task with the given id is registered.
    #[error("no task registered with id {id}")]
    TaskNotFound {
        /// The unknown id.
        id: TaskId,
    },

    /// An out-of-band invocation via the api module failed.
    #[error("task {task:?} failed: {source}")]
    TaskFailed {
        /// Name of the task.
        task: String,
        /// The invocation error.
        #[source]
        source: TaskError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidTrigger { .. } => "runtime_invalid_trigger",
            RuntimeError::LifespanFailed { .. } => "runtime_lifespan_failed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::TaskNotFound { .. } => "runtime_task_not_found",
            RuntimeError::TaskFailed { .. } => "runtime_task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidTrigger { task, source } => {
                format!("invalid trigger on task {task}: {source}")
            }
            RuntimeError::LifespanFailed { error } => format!("lifespan setup failed: {error}"),
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
            RuntimeError::TaskNotFound { id } => format!("task {id} not found"),
            RuntimeError::TaskFailed { task, source } => format!("task {task} failed: {source}"),
        }
    }
}
