//! Application core: orchestration and lifecycle.
//!
//! The public surface of this module is [`Clock`] (the application),
//! [`ClockBuilder`], [`AppState`], and the [`Lifespan`] hook.
//!
//! Internal modules:
//! - [`actor`]: per-task dispatch loop (trigger wait → invoke → repeat);
//! - [`runner`]: executes one invocation with timeout/cancellation and events;
//! - [`clock`]: orchestrates startup, steady state, and graceful shutdown;
//! - [`active`]: tracks in-flight invocations for stuck-task reporting;
//! - [`shutdown`]: cross-platform termination signal handling.

mod active;
mod actor;
mod builder;
mod clock;
mod lifespan;
mod runner;
mod shutdown;
mod state;

pub use builder::ClockBuilder;
pub use clock::Clock;
pub use lifespan::Lifespan;
pub use state::AppState;
