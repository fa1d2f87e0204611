//! # Lifespan hook: setup/teardown scoped to the run.
//!
//! A [`Lifespan`] wraps the whole serving duration: `on_start` runs before any
//! task (including startup tasks), `on_stop` runs after the shutdown tasks on
//! **every** exit path that passed setup — natural exhaustion, OS signal,
//! even a grace-period overrun. The classic use is acquiring an expensive
//! resource for the run and releasing it when the application winds down.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use chime::{Lifespan, TaskError};
//!
//! struct ModelCache;
//!
//! #[async_trait]
//! impl Lifespan for ModelCache {
//!     async fn on_start(&self) -> Result<(), TaskError> {
//!         // load the model...
//!         Ok(())
//!     }
//!
//!     async fn on_stop(&self) {
//!         // release it...
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::TaskError;

/// Setup/teardown scoped to the application's serving duration.
#[async_trait]
pub trait Lifespan: Send + Sync + 'static {
    /// Runs before any task. Returning an error aborts
    /// [`Clock::serve`](crate::Clock::serve) with
    /// [`RuntimeError::LifespanFailed`](crate::RuntimeError::LifespanFailed);
    /// `on_stop` is not called in that case.
    async fn on_start(&self) -> Result<(), TaskError>;

    /// Runs after the shutdown tasks, on every exit path that passed setup.
    async fn on_stop(&self);
}
