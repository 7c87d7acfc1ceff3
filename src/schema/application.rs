//! The application document: a flat list of components decorated with traits.
//!
//! This is the external input shape consumed by the resolver. The document is
//! plain serde data; no behavior lives here. Trait order within a component
//! is significant (it is the pipeline execution order) and is preserved
//! exactly through serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::type_ref::TypeRef;

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

// ---------------------------------------------------------------------------
// TraitSpec
// ---------------------------------------------------------------------------

/// A trait attached to a component: a type reference plus its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    /// Which trait implementation to resolve, e.g. `core/v1/slot`.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Trait properties, validated against the trait's declared schema.
    #[serde(default = "empty_object")]
    pub properties: Value,
}

impl TraitSpec {
    /// Create a trait spec with the given properties.
    pub fn new(type_ref: TypeRef, properties: Value) -> Self {
        Self {
            type_ref,
            properties,
        }
    }
}

// ---------------------------------------------------------------------------
// ComponentSpec
// ---------------------------------------------------------------------------

/// One typed component in the application, with an ordered trait list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Unique, stable identifier within one application.
    pub id: String,
    /// Which component implementation to resolve, e.g. `core/v1/text`.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Component properties, validated against the component's schema.
    #[serde(default = "empty_object")]
    pub properties: Value,
    /// Traits in declaration order. Order defines pipeline execution order.
    #[serde(default)]
    pub traits: Vec<TraitSpec>,
}

impl ComponentSpec {
    /// Create a component with empty properties and no traits.
    pub fn new(id: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            id: id.into(),
            type_ref,
            properties: empty_object(),
            traits: Vec::new(),
        }
    }

    /// Replace the properties (builder).
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Append a trait (builder). Traits execute in append order.
    pub fn with_trait(mut self, spec: TraitSpec) -> Self {
        self.traits.push(spec);
        self
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The whole application document: `{ "components": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Components in declaration order. List order is the tiebreaker for
    /// sibling ordering within a slot.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

impl Application {
    /// Create an application from a component list.
    pub fn new(components: Vec<ComponentSpec>) -> Self {
        Self { components }
    }

    /// Parse an application from its JSON document form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a component by id.
    pub fn component(&self, id: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Find a component by id, mutably.
    pub fn component_mut(&mut self, id: &str) -> Option<&mut ComponentSpec> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    /// Whether a component with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.component(id).is_some()
    }

    /// Ids that appear more than once, in first-occurrence order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for c in &self.components {
            if !seen.insert(c.id.as_str()) && !dups.contains(&c.id) {
                dups.push(c.id.clone());
            }
        }
        dups
    }
}

// ===========================================================================
// Tests
// ===========================================================================
