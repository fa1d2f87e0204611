//! # Event subscribers.
//!
//! The [`Subscribe`] trait and the [`SubscriberSet`] fan-out that drives each
//! subscriber from its own bounded queue and worker:
//!
//! ```text
//! task loops ── publish ──► Bus ──► clock listener ──► SubscriberSet::emit
//!                                                           │
//!                                                 ┌─────────┼─────────┐
//!                                                 ▼         ▼         ▼
//!                                             LogWriter  Metrics   Custom
//! ```
//!
//! ## Implementing a subscriber
//! ```rust
//! use async_trait::async_trait;
//! use chime::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFailed {
//!             // increment a counter...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure_counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
