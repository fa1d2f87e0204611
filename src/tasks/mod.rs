//! # Task abstractions: jobs, specifications, registered tasks, groups.
//!
//! This module provides the task-related types:
//! - [`Job`] — trait for implementing async cancelable work
//! - [`JobFn`] — function-backed job implementation
//! - [`JobRef`] — shared reference to a job (`Arc<dyn Job>`)
//! - [`TaskContext`] — per-invocation cancellation + dependency resolution
//! - [`TaskSpec`] — registration bundle (job, trigger, timeout)
//! - [`Task`] / [`TaskId`] — registered, immutable task with identity
//! - [`Group`] — named organizational collection of specs

mod context;
mod group;
mod job;
mod spec;
mod task;

pub use context::TaskContext;
pub use group::Group;
pub use job::{Job, JobFn, JobRef};
pub use spec::TaskSpec;
pub use task::{Task, TaskId};
