//! # Per-invocation context handed to jobs.
//!
//! [`TaskContext`] bundles what one invocation needs from the runtime: the
//! cancellation token for this attempt and a handle to the dependency
//! [`Provider`]. It is cheap to clone and safe to move into spawned work.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::provider::Provider;

/// Context for one job invocation: cancellation + dependency resolution.
#[derive(Clone, Debug)]
pub struct TaskContext {
    token: CancellationToken,
    provider: Arc<Provider>,
}

impl TaskContext {
    /// Creates a context from an attempt token and a provider handle.
    pub fn new(token: CancellationToken, provider: Arc<Provider>) -> Self {
        Self { token, provider }
    }

    /// True once this invocation has been asked to stop (shutdown or timeout).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when this invocation is asked to stop.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The raw cancellation token, for `tokio::select!` compositions.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Resolves a declared dependency through the provider registry.
    ///
    /// Resolution happens per invocation, so overrides installed during the
    /// run are observed immediately.
    pub fn get<T: Send + 'static>(&self) -> Result<T, TaskError> {
        self.provider.resolve::<T>()
    }

    /// The underlying provider handle.
    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_the_provider() {
        let provider = Arc::new(Provider::new());
        provider.register(|| 41u64);
        let ctx = TaskContext::new(CancellationToken::new(), provider);
        assert_eq!(ctx.get::<u64>().unwrap(), 41);
    }

    #[test]
    fn reflects_token_cancellation() {
        let token = CancellationToken::new();
        let ctx = TaskContext::new(token.clone(), Arc::new(Provider::new()));
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
