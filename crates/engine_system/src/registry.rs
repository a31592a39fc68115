//! System registry: every system the engine knows about, keyed by id.
//!
//! Registration order is remembered so that execution order stays stable
//! among systems that do not depend on each other.

use std::collections::HashMap;

use tracing::warn;

use crate::system::System;

/// Registered systems, keyed by id.
#[derive(Default)]
pub struct SystemRegistry {
    systems: HashMap<String, Box<dyn System>>,
    /// Ids in first-registration order.
    order: Vec<String>,
}

impl SystemRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system. A system with the same id is replaced and
    /// returned; the replacement keeps the original's registration slot.
    pub fn register(&mut self, system: Box<dyn System>) -> Option<Box<dyn System>> {
        let id = system.id().to_string();
        let previous = self.systems.insert(id.clone(), system);
        if previous.is_some() {
            warn!(system = %id, "overwriting already registered system");
        } else {
            self.order.push(id);
        }
        previous
    }

    /// The system registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&(dyn System + 'static)> {
        self.systems.get(id).map(Box::as_ref)
    }

    /// Mutable access to the system registered under `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn System + 'static)> {
        self.systems.get_mut(id).map(Box::as_mut)
    }

    /// Whether a system is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.systems.contains_key(id)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Systems in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn System + 'static)> {
        self.order
            .iter()
            .filter_map(|id| self.systems.get(id).map(Box::as_ref))
    }

    /// Number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl std::fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRegistry")
            .field("systems", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use engine_state::GameState;

    use super::*;
    use crate::system::FnSystem;

    fn noop(id: &str, deps: &[&str]) -> Box<dyn System> {
        FnSystem::boxed(id, deps, |_: &mut GameState, _| Ok(()))
    }

    #[test]
    fn test_register_new_system() {
        let mut registry = SystemRegistry::new();
        assert!(registry.register(noop("base.time", &[])).is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("base.time"));
        assert!(!registry.contains("base.economy"));
    }

    #[test]
    fn test_overwrite_keeps_slot() {
        let mut registry = SystemRegistry::new();
        registry.register(noop("a", &[]));
        registry.register(noop("b", &[]));
        let replaced = registry.register(noop("a", &["b"]));

        assert!(replaced.is_some_and(|old| old.dependencies().is_empty()));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            registry.get("a").map(|s| s.dependencies()),
            Some(vec!["b".to_string()])
        );
    }

    #[test]
    fn test_iter_in_registration_order() {
        let mut registry = SystemRegistry::new();
        for id in ["z", "m", "a"] {
            registry.register(noop(id, &[]));
        }
        let ids: Vec<&str> = registry.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["z", "m", "a"]);
    }
}
