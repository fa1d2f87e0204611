//! # Builder for constructing a Clock with optional collaborators.

use std::sync::Arc;

use crate::app::{Clock, Lifespan};
use crate::config::Config;
use crate::provider::Provider;
use crate::subscribers::Subscribe;

/// Builder wiring a [`Clock`] together: config, event subscribers, the
/// lifespan hook, and (optionally) a shared dependency provider.
///
/// ## Example
/// ```rust
/// use chime::{Clock, Config};
///
/// let clock = Clock::builder(Config::default()).build();
/// assert!(clock.tasks().is_empty());
/// ```
pub struct ClockBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    lifespan: Option<Arc<dyn Lifespan>>,
    provider: Option<Arc<Provider>>,
}

impl ClockBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            lifespan: None,
            provider: None,
        }
    }

    /// Sets the event subscribers for observability.
    ///
    /// Subscribers receive runtime events (task lifecycle, failures, state
    /// transitions) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sets the lifespan hook wrapped around the serving duration.
    pub fn with_lifespan(mut self, lifespan: impl Lifespan) -> Self {
        self.lifespan = Some(Arc::new(lifespan));
        self
    }

    /// Shares an existing provider instead of creating a fresh one.
    ///
    /// Useful when tests pre-register overrides, or when several components
    /// resolve from one registry.
    pub fn with_provider(mut self, provider: Arc<Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds the clock. Tasks are registered on the returned instance.
    pub fn build(self) -> Clock {
        Clock::assemble(
            self.cfg,
            self.subscribers,
            self.lifespan,
            self.provider.unwrap_or_else(|| Arc::new(Provider::new())),
        )
    }
}
