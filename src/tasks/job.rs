//! # Job abstraction and function-backed implementation.
//!
//! A [`Job`] is the unit of work a trigger fires: a named async callable that
//! receives a [`TaskContext`] (cancellation + dependency resolution) and
//! reports success or a [`TaskError`]. [`JobFn`] wraps a closure, producing a
//! fresh future per invocation; [`JobRef`] is the shared handle the runtime
//! passes around.
//!
//! Jobs should check cancellation at await points and exit promptly during
//! shutdown. Blocking or CPU-heavy work belongs in
//! [`tokio::task::spawn_blocking`] inside the job; a job that never yields
//! stalls its siblings on the same worker.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::TaskContext;

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;

/// # Asynchronous, cancelable unit of work.
///
/// ## Example
/// ```rust
/// use async_trait::async_trait;
/// use chime::{Job, TaskContext, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Job for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable job name.
    fn name(&self) -> &str;

    /// Executes one invocation.
    ///
    /// Implementations should watch `ctx` and return [`TaskError::Canceled`]
    /// promptly when shutdown begins; that is treated as a graceful exit, not
    /// a failure.
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}

/// Function-backed job.
///
/// Wraps a closure that *creates* a new future per invocation, so no state is
/// shared between fires unless the closure captures an `Arc` explicitly.
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use chime::{JobFn, JobRef, TaskContext, TaskError};
    ///
    /// let job: JobRef = JobFn::arc("hello", |_ctx: TaskContext| async {
    ///     println!("hello");
    ///     Ok::<_, TaskError>(())
    /// });
    /// assert_eq!(job.name(), "hello");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self>
    where
        Self: Job,
    {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
