//! The versioned type registry.
//!
//! Component and trait implementations register under a [`TypeRef`]
//! (`version/name`). Instances in a document reference types by the same
//! key; the resolver looks them up here during structural validation.
//!
//! Registration is strict: a duplicate key is an error, never a silent
//! overwrite. Two plugins claiming the same type name would otherwise
//! shadow each other depending on load order.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::pipeline::{ComponentBehavior, TraitBehavior};
use crate::schema::{Schema, TypeRef};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which namespace an entry lives in. Components and traits are registered
/// and resolved independently; the same `TypeRef` may exist in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Component,
    Trait,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Component => f.write_str("component"),
            EntryKind::Trait => f.write_str("trait"),
        }
    }
}

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The key is already taken in that namespace.
    #[error("already has {kind} `{type_ref}`")]
    Duplicate { kind: EntryKind, type_ref: TypeRef },

    /// Lookup for a key nothing has registered.
    #[error("{kind} `{type_ref}` has not been registered")]
    Unresolved { kind: EntryKind, type_ref: TypeRef },
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Descriptive metadata shared by both entry kinds.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// The registered key.
    pub type_ref: TypeRef,
    /// Human-readable description for editor palettes.
    pub description: String,
}

impl EntryMeta {
    pub fn new(type_ref: TypeRef, description: impl Into<String>) -> Self {
        Self {
            type_ref,
            description: description.into(),
        }
    }
}

/// A registered component type: property shape, exposed state shape, the
/// initial state seeded on first resolution, and the behavior itself.
pub struct ComponentEntry {
    pub meta: EntryMeta,
    pub props_schema: Schema,
    pub state_schema: Schema,
    pub init_state: Value,
    pub behavior: Box<dyn ComponentBehavior>,
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("meta", &self.meta)
            .field("props_schema", &self.props_schema)
            .field("state_schema", &self.state_schema)
            .field("init_state", &self.init_state)
            .finish_non_exhaustive()
    }
}

impl ComponentEntry {
    pub fn new(
        meta: EntryMeta,
        props_schema: Schema,
        behavior: impl ComponentBehavior + 'static,
    ) -> Self {
        Self {
            meta,
            props_schema,
            state_schema: Schema::Any,
            init_state: Value::Null,
            behavior: Box::new(behavior),
        }
    }

    /// Declare the shape of the state this component exposes.
    pub fn with_state_schema(mut self, schema: Schema) -> Self {
        self.state_schema = schema;
        self
    }

    /// State merged into the store the first time the component resolves.
    pub fn with_init_state(mut self, state: Value) -> Self {
        self.init_state = state;
        self
    }
}

/// A registered trait type.
pub struct TraitEntry {
    pub meta: EntryMeta,
    pub props_schema: Schema,
    pub state_schema: Schema,
    pub behavior: Box<dyn TraitBehavior>,
}

impl TraitEntry {
    pub fn new(
        meta: EntryMeta,
        props_schema: Schema,
        behavior: impl TraitBehavior + 'static,
    ) -> Self {
        Self {
            meta,
            props_schema,
            state_schema: Schema::Any,
            behavior: Box::new(behavior),
        }
    }

    /// Declare the shape of the state this trait exposes.
    pub fn with_state_schema(mut self, schema: Schema) -> Self {
        self.state_schema = schema;
        self
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The component and trait type tables for one runtime.
#[derive(Default)]
pub struct Registry {
    components: HashMap<TypeRef, ComponentEntry>,
    traits: HashMap<TypeRef, TraitEntry>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type. Errors if the key is taken.
    pub fn register_component(&mut self, entry: ComponentEntry) -> Result<(), RegistryError> {
        let key = entry.meta.type_ref.clone();
        if self.components.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: EntryKind::Component,
                type_ref: key,
            });
        }
        tracing::debug!(type_ref = %key, "registered component");
        self.components.insert(key, entry);
        Ok(())
    }

    /// Register a trait type. Errors if the key is taken.
    pub fn register_trait(&mut self, entry: TraitEntry) -> Result<(), RegistryError> {
        let key = entry.meta.type_ref.clone();
        if self.traits.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: EntryKind::Trait,
                type_ref: key,
            });
        }
        tracing::debug!(type_ref = %key, "registered trait");
        self.traits.insert(key, entry);
        Ok(())
    }

    /// Look up a component type.
    pub fn resolve_component(&self, type_ref: &TypeRef) -> Result<&ComponentEntry, RegistryError> {
        self.components
            .get(type_ref)
            .ok_or_else(|| RegistryError::Unresolved {
                kind: EntryKind::Component,
                type_ref: type_ref.clone(),
            })
    }

    /// Look up a trait type.
    pub fn resolve_trait(&self, type_ref: &TypeRef) -> Result<&TraitEntry, RegistryError> {
        self.traits
            .get(type_ref)
            .ok_or_else(|| RegistryError::Unresolved {
                kind: EntryKind::Trait,
                type_ref: type_ref.clone(),
            })
    }

    /// Whether a component type exists.
    pub fn has_component(&self, type_ref: &TypeRef) -> bool {
        self.components.contains_key(type_ref)
    }

    /// Whether a trait type exists.
    pub fn has_trait(&self, type_ref: &TypeRef) -> bool {
        self.traits.contains_key(type_ref)
    }

    /// Number of registered component types.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered trait types.
    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("traits", &self.traits.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
