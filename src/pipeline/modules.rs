//! Host module facilities available to behaviors.
//!
//! Hosts register shared services (storage backends, clocks, anything the
//! component library needs beyond state) under a name before resolution
//! starts; behaviors look them up through [`Ctx::module`](super::Ctx::module)
//! by name and type. Entries are `Arc`ed so a behavior can move a handle
//! into a registered method closure.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named table of host-provided services.
#[derive(Default)]
pub struct ModuleContext {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ModuleContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under a name, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, module: T) {
        self.entries.insert(name.into(), Arc::new(module));
    }

    /// Register a module under a name (builder form).
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, module: T) -> Self {
        self.insert(name, module);
        self
    }

    /// Look up a module by name and concrete type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries
            .get(name)
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Whether a module is registered under this name, regardless of type.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock {
        now: u64,
    }

    #[test]
    fn insert_and_get_typed() {
        let modules = ModuleContext::new().with("clock", Clock { now: 42 });
        let clock = modules.get::<Clock>("clock").unwrap();
        assert_eq!(clock.now, 42);
    }

    #[test]
    fn wrong_type_is_none() {
        let modules = ModuleContext::new().with("clock", Clock { now: 0 });
        assert!(modules.get::<String>("clock").is_none());
        assert!(modules.contains("clock"));
    }

    #[test]
    fn missing_name_is_none() {
        let modules = ModuleContext::new();
        assert!(modules.get::<Clock>("clock").is_none());
        assert!(modules.is_empty());
    }

    #[test]
    fn insert_replaces() {
        let mut modules = ModuleContext::new();
        modules.insert("clock", Clock { now: 1 });
        modules.insert("clock", Clock { now: 2 });
        assert_eq!(modules.len(), 1);
        assert_eq!(modules.get::<Clock>("clock").unwrap().now, 2);
    }
}
