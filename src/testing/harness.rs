//! Document builders for tests.
//!
//! Hand-writing `ComponentSpec` JSON in every test buries the interesting
//! part under boilerplate. [`ComponentBuilder`] keeps test documents one
//! expression long.

use serde_json::{json, Value};

use crate::builtin;
use crate::resolver::{Resolution, Resolver};
use crate::schema::{Application, ComponentSpec, TraitSpec, TypeRef};
use crate::slots::{SLOT_TRAIT_NAME, SLOT_TRAIT_VERSION};

/// Fluent builder for one component spec.
pub struct ComponentBuilder {
    spec: ComponentSpec,
}

/// Start building a component. `component_type` is `"version/name"` and must
/// parse; tests pass literals.
pub fn component(id: &str, component_type: &str) -> ComponentBuilder {
    let type_ref: TypeRef = component_type
        .parse()
        .unwrap_or_else(|e| panic!("bad component type `{component_type}`: {e}"));
    ComponentBuilder {
        spec: ComponentSpec::new(id, type_ref),
    }
}

impl ComponentBuilder {
    /// Set one property key.
    pub fn prop(mut self, key: &str, value: Value) -> Self {
        if let Some(map) = self.spec.properties.as_object_mut() {
            map.insert(key.to_owned(), value);
        }
        self
    }

    /// Attach a trait by type string.
    pub fn trait_spec(mut self, trait_type: &str, properties: Value) -> Self {
        let type_ref: TypeRef = trait_type
            .parse()
            .unwrap_or_else(|e| panic!("bad trait type `{trait_type}`: {e}"));
        self.spec.traits.push(TraitSpec::new(type_ref, properties));
        self
    }

    /// Slot this component under `(parent, slot)`.
    pub fn slot(self, parent: &str, slot: &str) -> Self {
        let trait_type = format!("{SLOT_TRAIT_VERSION}/{SLOT_TRAIT_NAME}");
        self.trait_spec(
            &trait_type,
            json!({ "container": { "id": parent, "slot": slot } }),
        )
    }

    /// Finish the spec.
    pub fn build(self) -> ComponentSpec {
        self.spec
    }
}

/// Collect built components into an application.
pub fn app(components: impl IntoIterator<Item = ComponentBuilder>) -> Application {
    Application::new(components.into_iter().map(ComponentBuilder::build).collect())
}

/// Resolve an application against the `core/v1` library until it settles,
/// panicking on structural errors. Also returns the resolver for follow-up
/// assertions and interactions.
pub fn resolve_app(app: Application) -> (Resolver, Resolution) {
    let mut resolver = Resolver::new(std::sync::Arc::new(builtin::registry()), app);
    let resolution = resolver
        .run_until_settled()
        .unwrap_or_else(|e| panic!("document failed structural validation: {e}"));
    (resolver, resolution)
}
