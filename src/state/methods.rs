//! Runtime-callable component methods.
//!
//! Traits and components register named methods via `subscribe_methods`
//! (e.g. the state trait registers `setValue`). Callbacks emitted into a
//! render instruction name a `(component, method)` pair; when the view layer
//! hands a callback back to the resolver, it dispatches here.
//!
//! Registrations are per-pass: behaviors re-register on every pipeline run,
//! so the registry is cleared at the start of each pass and re-registration
//! overwrites silently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::bus::{MergeBus, StateChange};
use super::store::StateStore;

/// Mutation scope handed to a method while it runs: the target component's
/// state plus the bus to publish through.
pub struct StateScope<'a> {
    component: &'a str,
    store: &'a mut StateStore,
    bus: &'a mut MergeBus,
}

impl<'a> StateScope<'a> {
    /// Create a scope for one component.
    pub fn new(component: &'a str, store: &'a mut StateStore, bus: &'a mut MergeBus) -> Self {
        Self {
            component,
            store,
            bus,
        }
    }

    /// The component this scope mutates.
    pub fn component_id(&self) -> &str {
        self.component
    }

    /// Shallow-merge into the component's state and publish the change.
    /// Merges that change nothing publish nothing.
    pub fn merge_state(&mut self, partial: &Value) {
        let changed = self.store.merge(self.component, partial);
        self.bus.publish(StateChange {
            component: self.component.to_owned(),
            keys: changed,
        });
    }

    /// Read the component's current state cell.
    pub fn state(&self) -> Option<&Map<String, Value>> {
        self.store.get(self.component)
    }
}

/// A registered method body. Receives the caller's parameters and a
/// mutation scope for the method's own component.
pub type MethodFn = Arc<dyn Fn(&Value, &mut StateScope<'_>) + Send + Sync>;

/// Error from dispatching a callback to a method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodError {
    #[error("component `{component}` has no method `{method}`")]
    Unknown { component: String, method: String },
}

/// The `(component, method) -> body` table for one resolution generation.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<(String, String), MethodFn>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a method on a component.
    pub fn register(
        &mut self,
        component: impl Into<String>,
        method: impl Into<String>,
        body: MethodFn,
    ) {
        self.methods.insert((component.into(), method.into()), body);
    }

    /// Whether a method exists.
    pub fn contains(&self, component: &str, method: &str) -> bool {
        self.methods
            .contains_key(&(component.to_owned(), method.to_owned()))
    }

    /// Invoke a method with the given parameters.
    pub fn invoke(
        &self,
        component: &str,
        method: &str,
        parameters: &Value,
        scope: &mut StateScope<'_>,
    ) -> Result<(), MethodError> {
        let body = self
            .methods
            .get(&(component.to_owned(), method.to_owned()))
            .ok_or_else(|| MethodError::Unknown {
                component: component.to_owned(),
                method: method.to_owned(),
            })?;
        body(parameters, scope);
        Ok(())
    }

    /// Drop every registration. Called at the start of each pass.
    pub fn clear(&mut self) {
        self.methods.clear();
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
