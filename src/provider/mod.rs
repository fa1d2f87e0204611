//! Dependency provider registry.
//!
//! [`Provider`] maps a dependency *type* to a stack of factories. Jobs resolve
//! their dependencies at invocation time through their
//! [`TaskContext`](crate::TaskContext), so an override installed mid-run is
//! observed by every subsequent invocation of every task.
//!
//! ## Overrides
//! [`Provider::override_with`] pushes a replacement factory and returns an
//! [`OverrideGuard`]; dropping the guard pops the override, restoring whatever
//! was registered underneath. Guards nest, which is what makes scoped test
//! substitution cheap:
//!
//! ```rust
//! use std::sync::Arc;
//! use chime::Provider;
//!
//! #[derive(Clone)]
//! struct ApiKey(&'static str);
//!
//! let provider = Arc::new(Provider::new());
//! provider.register(|| ApiKey("live"));
//!
//! {
//!     let _guard = provider.override_with(|| ApiKey("test"));
//!     assert_eq!(provider.resolve::<ApiKey>().unwrap().0, "test");
//! }
//! assert_eq!(provider.resolve::<ApiKey>().unwrap().0, "live");
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::TaskError;

type Factory = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Per-type factory stack: base registration plus any active overrides.
#[derive(Default)]
struct Slot {
    base: Option<Factory>,
    overrides: Vec<Factory>,
}

impl Slot {
    fn innermost(&self) -> Option<&Factory> {
        self.overrides.last().or(self.base.as_ref())
    }
}

/// Registry of dependency factories, keyed by type.
///
/// Factories run on every resolution; a dependency that should behave as a
/// singleton can close over an `Arc` and hand out clones.
#[derive(Default)]
pub struct Provider {
    slots: RwLock<HashMap<TypeId, Slot>>,
}

impl Provider {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Slot>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Slot>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers the base factory for `T`, replacing any previous base but
    /// leaving active overrides in place.
    pub fn register<T, F>(&self, factory: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Any + Send>);
        let mut slots = self.write();
        slots.entry(TypeId::of::<T>()).or_default().base = Some(factory);
    }

    /// Pushes an override factory for `T`; the returned guard pops it on drop.
    ///
    /// Resolution always uses the innermost (most recent) factory. The guard
    /// borrows the provider, so overrides cannot outlive the registry.
    pub fn override_with<T, F>(&self, factory: F) -> OverrideGuard<'_>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Any + Send>);
        {
            let mut slots = self.write();
            slots
                .entry(TypeId::of::<T>())
                .or_default()
                .overrides
                .push(factory);
        }
        OverrideGuard {
            provider: self,
            key: TypeId::of::<T>(),
        }
    }

    /// Resolves a dependency by calling the innermost factory for `T`.
    pub fn resolve<T: Send + 'static>(&self) -> Result<T, TaskError> {
        let factory = {
            let slots = self.read();
            slots
                .get(&TypeId::of::<T>())
                .and_then(Slot::innermost)
                .cloned()
        };
        let factory = factory.ok_or(TaskError::MissingDependency {
            type_name: type_name::<T>(),
        })?;
        factory()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| TaskError::MissingDependency {
                type_name: type_name::<T>(),
            })
    }

    /// True if a factory (base or override) is registered for `T`.
    pub fn provides<T: 'static>(&self) -> bool {
        self.read()
            .get(&TypeId::of::<T>())
            .is_some_and(|slot| slot.innermost().is_some())
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("types", &self.read().len())
            .finish()
    }
}

/// RAII handle for an active override; dropping it restores the factory that
/// was in effect before [`Provider::override_with`].
#[must_use = "dropping the guard immediately removes the override"]
pub struct OverrideGuard<'a> {
    provider: &'a Provider,
    key: TypeId,
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.provider.write();
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.overrides.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Port(u16);

    #[test]
    fn resolves_registered_factory() {
        let provider = Provider::new();
        provider.register(|| Port(8080));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(8080));
    }

    #[test]
    fn missing_dependency_is_an_error() {
        let provider = Provider::new();
        let err = provider.resolve::<Port>().unwrap_err();
        assert_eq!(err.as_label(), "task_missing_dependency");
    }

    #[test]
    fn override_wins_until_guard_drops() {
        let provider = Arc::new(Provider::new());
        provider.register(|| Port(8080));

        let guard = provider.override_with(|| Port(9999));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(9999));

        drop(guard);
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(8080));
    }

    #[test]
    fn overrides_nest_in_stack_order() {
        let provider = Arc::new(Provider::new());
        provider.register(|| Port(1));

        let outer = provider.override_with(|| Port(2));
        let inner = provider.override_with(|| Port(3));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(3));

        drop(inner);
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(2));
        drop(outer);
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(1));
    }

    #[test]
    fn override_without_base_registration_works() {
        let provider = Arc::new(Provider::new());
        let guard = provider.override_with(|| Port(7));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(7));
        drop(guard);
        // nothing underneath: back to missing
        assert!(provider.resolve::<Port>().is_err());
    }

    #[test]
    fn factories_run_per_resolution() {
        use std::sync::atomic::{AtomicU16, Ordering};
        static CALLS: AtomicU16 = AtomicU16::new(0);

        let provider = Provider::new();
        provider.register(|| Port(CALLS.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(0));
        assert_eq!(provider.resolve::<Port>().unwrap(), Port(1));
    }
}
