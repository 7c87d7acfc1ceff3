//! Execution context handed to behaviors.

use std::any::Any;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::pipeline::modules::ModuleContext;
use crate::state::{MergeBus, MethodFn, MethodRegistry, StateChange, StateStore};

/// Everything a component or trait behavior can see and touch while it runs:
/// the evaluated properties it was configured with, its component's state,
/// the method registry for this pass, and the host's module facilities.
///
/// Mutations go through the context so every state write is published on the
/// bus and every method registration lands in the current generation.
pub struct Ctx<'a> {
    component_id: &'a str,
    properties: &'a Value,
    store: &'a mut StateStore,
    bus: &'a mut MergeBus,
    methods: &'a mut MethodRegistry,
    modules: &'a ModuleContext,
}

impl<'a> Ctx<'a> {
    /// Build a context for one behavior invocation.
    pub fn new(
        component_id: &'a str,
        properties: &'a Value,
        store: &'a mut StateStore,
        bus: &'a mut MergeBus,
        methods: &'a mut MethodRegistry,
        modules: &'a ModuleContext,
    ) -> Self {
        Self {
            component_id,
            properties,
            store,
            bus,
            methods,
            modules,
        }
    }

    /// Id of the component this behavior runs for.
    pub fn component_id(&self) -> &str {
        self.component_id
    }

    /// The full evaluated properties value. Expressions are already
    /// substituted by the time a behavior sees this.
    pub fn properties(&self) -> &Value {
        self.properties
    }

    /// A single property by key, if present.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The component's current state cell.
    pub fn state(&self) -> Option<&Map<String, Value>> {
        self.store.get(self.component_id)
    }

    /// Shallow-merge into the component's state and publish the change.
    pub fn merge_state(&mut self, partial: &Value) {
        let changed = self.store.merge(self.component_id, partial);
        self.bus.publish(StateChange {
            component: self.component_id.to_owned(),
            keys: changed,
        });
    }

    /// Register a runtime-callable method on this component for the current
    /// pass. Re-registration overwrites.
    pub fn subscribe_method(&mut self, name: impl Into<String>, body: MethodFn) {
        self.methods.register(self.component_id, name, body);
    }

    /// The host's module facilities for this resolver.
    pub fn modules(&self) -> &ModuleContext {
        self.modules
    }

    /// Shorthand for a typed module lookup.
    pub fn module<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.modules.get::<T>(name)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
