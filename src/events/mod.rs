//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the clock, the task loops,
//! and the subscriber workers.
//!
//! ## Quick reference
//! - **Publishers**: [`Clock`](crate::Clock), task actors, the invocation
//!   runner, subscriber workers (overflow/panic).
//! - **Consumer**: the clock's bus listener, which updates the in-flight
//!   tracker and fans events out to the
//!   [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
