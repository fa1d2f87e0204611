//! # chime
//!
//! **Chime** is a trigger-driven async task scheduler for Rust, built on
//! tokio. Tasks are async jobs bound to a [`Trigger`] — an interval, a
//! wall-clock time, a cron expression, a lifecycle hook, or a combination —
//! and a [`Clock`] runs every task on its own cooperative loop with
//! dependency injection, typed events, and graceful shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskSpec   │   │   TaskSpec   │   │   TaskSpec   │
//!     │ job+trigger  │   │ job+trigger  │   │ job+trigger  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Clock (application)                                              │
//! │  - Provider (dependency factories, override stack)               │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to subscribers)                        │
//! │  - ActiveTracker (in-flight invocations, stuck-task snapshot)     │
//! │  - Lifespan hook (setup/teardown around the run)                  │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  TaskActor   │   │  TaskActor   │   │  TaskActor   │   │
//!     │(trigger loop)│   │(trigger loop)│   │(trigger loop)│   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ publishes        │ publishes        │ publishes       │
//!      │ FireScheduled,   │ TaskStarting,    │ TaskFailed,     │
//!      │ TaskCompleted..  │ TimeoutHit..     │ TriggerExh...   │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                          clock bus listener
//!                           ├──► ActiveTracker
//!                           └──► SubscriberSet ──► sub1 / sub2 / subN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle → Starting → Running → Stopping → ShutDown → Terminated
//!
//! serve():
//!   ├─► validate every trigger (fail fast)
//!   ├─► lifespan.on_start()
//!   ├─► OnStartUp tasks, awaited to completion
//!   ├─► spawn periodic actors, one per task
//!   │     loop: trigger wait → (cancellable sleep) → invoke job
//!   │           errors contained per loop; siblings unaffected
//!   ├─► exhaustion of all triggers, or OS signal → cancel + grace wait
//!   ├─► OnShutDown tasks, exactly once
//!   └─► lifespan.on_stop(), drain subscribers
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                     |
//! |-----------------|---------------------------------------------------------|----------------------------------------|
//! | **Triggers**    | When tasks fire: intervals, wall-clock, cron, combos.   | [`Trigger`], [`Every`], [`At`], [`Cron`], [`OrTrigger`] |
//! | **Tasks**       | Async jobs, specs, named groups.                        | [`Job`], [`JobFn`], [`TaskSpec`], [`Group`] |
//! | **Injection**   | Typed dependency factories with scoped overrides.       | [`Provider`], [`OverrideGuard`], [`TaskContext`] |
//! | **Lifecycle**   | Startup/shutdown tasks, lifespan hook, state watch.     | [`Clock`], [`Lifespan`], [`AppState`]  |
//! | **Events**      | Typed runtime events fanned out to subscribers.         | [`Event`], [`EventKind`], [`Subscribe`] |
//! | **Errors**      | Typed errors for validation, execution, orchestration.  | [`TriggerError`], [`TaskError`], [`RuntimeError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use chime::{Clock, Config, Every, FirstRun, JobFn, TaskContext, TaskError, TaskSpec, Trigger};
//!
//! #[derive(Clone)]
//! struct Mailer { endpoint: &'static str }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = Clock::new(Config::default());
//!     app.provider().register(|| Mailer { endpoint: "smtp://localhost" });
//!
//!     app.task(TaskSpec::new(
//!         JobFn::arc("send-digest", |ctx: TaskContext| async move {
//!             let mailer = ctx.get::<Mailer>()?;
//!             println!("sending digest via {}", mailer.endpoint);
//!             Ok::<_, TaskError>(())
//!         }),
//!         Every::new(Duration::from_secs(3600)).with_first_run(FirstRun::Immediate),
//!     ));
//!
//!     app.task(TaskSpec::new(
//!         JobFn::arc("hello", |_ctx: TaskContext| async {
//!             println!("started up");
//!             Ok::<_, TaskError>(())
//!         }),
//!         Trigger::on_start_up(),
//!     ));
//!
//!     // blocks until every trigger exhausts or SIGINT/SIGTERM arrives
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
mod app;
mod config;
mod error;
mod events;
mod provider;
mod subscribers;
mod tasks;
mod triggers;

// ---- Public re-exports ----

pub use app::{AppState, Clock, ClockBuilder, Lifespan};
pub use config::Config;
pub use error::{RuntimeError, TaskError, TriggerError};
pub use events::{Bus, Event, EventKind};
pub use provider::{OverrideGuard, Provider};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Group, Job, JobFn, JobRef, Task, TaskContext, TaskId, TaskSpec};
pub use triggers::{
    At, Cron, DayRule, Every, FirstRun, Forever, OnShutDown, OnStartUp, Once, OrTrigger, Trigger,
    TriggerKind,
};

// Optional: expose the built-in stdout logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
