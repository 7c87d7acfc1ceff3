//! The per-component render pipeline.
//!
//! One pipeline run turns a [`ComponentSpec`] into merged [`RenderProps`]:
//!
//! 1. evaluate `{{ … }}` expressions in the component's properties,
//! 2. validate the evaluated properties against the registered schema,
//! 3. run the component behavior for the base props,
//! 4. execute each trait in declared order, merging its overlay on top.
//!
//! Trait properties are evaluated just before that trait executes, so a state
//! merge performed by an earlier trait is visible to a later trait's
//! expressions within the same run. The slot trait is structural and skipped
//! here; the slot index consumes it instead.
//!
//! Failures are scoped: an error anywhere in a run fails that one component,
//! never the pass.

pub mod behavior;
pub mod context;
pub mod modules;
pub mod result;

use std::collections::BTreeSet;

use crate::expr::{self, ExprError};
use crate::registry::{Registry, RegistryError};
use crate::schema::{violations_summary, ComponentSpec, SchemaViolation, TypeRef};
use crate::slots::is_slot_trait;
use crate::state::{MergeBus, MethodRegistry, StateStore};

pub use behavior::{BehaviorError, ComponentBehavior, TraitBehavior};
pub use context::Ctx;
pub use modules::ModuleContext;
pub use result::{Callback, Effect, FetchRequest, RenderProps, TraitResult};

/// Why one component's pipeline run failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// The component type or a trait type is not registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An expression in the properties failed to parse.
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// Evaluated component properties violate the registered schema.
    #[error("invalid properties: {}", violations_summary(.0))]
    Schema(Vec<SchemaViolation>),

    /// Evaluated trait properties violate the trait's schema.
    #[error("invalid properties for trait `{trait_type}`: {}", violations_summary(violations))]
    TraitSchema {
        trait_type: TypeRef,
        violations: Vec<SchemaViolation>,
    },

    /// The component behavior itself failed.
    #[error("component behavior failed: {0}")]
    Behavior(#[source] BehaviorError),

    /// A trait behavior failed.
    #[error("trait `{trait_type}` failed: {source}")]
    Trait {
        trait_type: TypeRef,
        source: BehaviorError,
    },
}

/// The outcome of one successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Base props with every trait overlay merged in.
    pub props: RenderProps,
    /// Component ids whose state the evaluated expressions read.
    pub dependencies: BTreeSet<String>,
}

/// Run the full pipeline for one component.
pub fn run_component(
    registry: &Registry,
    spec: &ComponentSpec,
    store: &mut StateStore,
    bus: &mut MergeBus,
    methods: &mut MethodRegistry,
    modules: &ModuleContext,
) -> Result<PipelineOutput, ComponentError> {
    let entry = registry.resolve_component(&spec.type_ref)?;

    let (evaluated, mut dependencies) = expr::evaluate_value(&spec.properties, store)?;
    entry
        .props_schema
        .validate(&evaluated)
        .map_err(ComponentError::Schema)?;

    let mut props = {
        let mut ctx = Ctx::new(&spec.id, &evaluated, store, bus, methods, modules);
        entry
            .behavior
            .run(&mut ctx)
            .map_err(ComponentError::Behavior)?
    };

    for trait_spec in &spec.traits {
        if is_slot_trait(&trait_spec.type_ref) {
            continue;
        }
        let trait_entry = registry.resolve_trait(&trait_spec.type_ref)?;

        // Evaluated lazily so earlier traits' state merges are visible.
        let (trait_props, deps) = expr::evaluate_value(&trait_spec.properties, store)?;
        dependencies.extend(deps);
        trait_entry
            .props_schema
            .validate(&trait_props)
            .map_err(|violations| ComponentError::TraitSchema {
                trait_type: trait_spec.type_ref.clone(),
                violations,
            })?;

        let result = {
            let mut ctx = Ctx::new(&spec.id, &trait_props, store, bus, methods, modules);
            trait_entry
                .behavior
                .execute(&mut ctx)
                .map_err(|source| ComponentError::Trait {
                    trait_type: trait_spec.type_ref.clone(),
                    source,
                })?
        };
        if let Some(overlay) = result.props {
            props.merge_from(overlay);
        }
    }

    Ok(PipelineOutput {
        props,
        dependencies,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ComponentEntry, EntryMeta, TraitEntry};
    use crate::schema::{Field, Schema, TraitSpec};
    use serde_json::{json, Value};

    fn text_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_component(ComponentEntry::new(
                EntryMeta::new(TypeRef::new("test/v1", "text"), "text"),
                Schema::object([Field::required("value", Schema::String)]),
                |ctx: &mut Ctx<'_>| -> Result<RenderProps, BehaviorError> {
                    let value = ctx
                        .prop("value")
                        .cloned()
                        .ok_or_else(|| BehaviorError::missing("value"))?;
                    Ok(RenderProps::new().with_data("value", value))
                },
            ))
            .unwrap();
        registry
            .register_trait(TraitEntry::new(
                EntryMeta::new(TypeRef::new("test/v1", "style"), "style"),
                Schema::object([Field::required("styles", Schema::Any)]),
                |ctx: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> {
                    let mut props = RenderProps::new();
                    if let Some(Value::Object(styles)) = ctx.prop("styles") {
                        for (k, v) in styles {
                            props.style.insert(k.clone(), v.clone());
                        }
                    }
                    Ok(TraitResult::from_props(props))
                },
            ))
            .unwrap();
        registry
    }

    fn run(
        registry: &Registry,
        spec: &ComponentSpec,
        store: &mut StateStore,
    ) -> Result<PipelineOutput, ComponentError> {
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        run_component(registry, spec, store, &mut bus, &mut methods, &modules)
    }

    #[test]
    fn base_props_from_component_behavior() {
        let registry = text_registry();
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "hello" }));
        let out = run(&registry, &spec, &mut StateStore::new()).unwrap();
        assert_eq!(out.props.data.get("value"), Some(&json!("hello")));
        assert!(out.dependencies.is_empty());
    }

    #[test]
    fn expressions_evaluated_and_deps_collected() {
        let registry = text_registry();
        let mut store = StateStore::new();
        store.merge("input", &json!({ "value": "typed" }));
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "{{ input.value }}" }));
        let out = run(&registry, &spec, &mut store).unwrap();
        assert_eq!(out.props.data.get("value"), Some(&json!("typed")));
        assert!(out.dependencies.contains("input"));
    }

    #[test]
    fn schema_violation_fails_before_behavior() {
        let registry = text_registry();
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": 42 }));
        let err = run(&registry, &spec, &mut StateStore::new()).unwrap_err();
        assert!(matches!(err, ComponentError::Schema(_)));
    }

    #[test]
    fn trait_overlay_merged_in_order() {
        let registry = text_registry();
        let style = |color: &str| {
            TraitSpec::new(
                TypeRef::new("test/v1", "style"),
                json!({ "styles": { "color": color } }),
            )
        };
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "x" }))
            .with_trait(style("red"))
            .with_trait(style("blue"));
        let out = run(&registry, &spec, &mut StateStore::new()).unwrap();
        // Later trait wins on conflicting keys.
        assert_eq!(out.props.style.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn slot_trait_skipped() {
        let registry = text_registry();
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "x" }))
            .with_trait(TraitSpec::new(
                TypeRef::new("core/v1", "slot"),
                json!({ "container": { "id": "root", "slot": "content" } }),
            ));
        // Would fail with Unresolved if the slot trait were executed.
        run(&registry, &spec, &mut StateStore::new()).unwrap();
    }

    #[test]
    fn unknown_trait_type_fails_component() {
        let registry = text_registry();
        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "x" }))
            .with_trait(TraitSpec::new(TypeRef::new("test/v1", "nope"), json!({})));
        let err = run(&registry, &spec, &mut StateStore::new()).unwrap_err();
        assert!(matches!(err, ComponentError::Registry(_)));
    }

    #[test]
    fn trait_expressions_see_earlier_trait_merges() {
        let mut registry = text_registry();
        registry
            .register_trait(TraitEntry::new(
                EntryMeta::new(TypeRef::new("test/v1", "seed"), "seeds state"),
                Schema::Any,
                |ctx: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> {
                    ctx.merge_state(&json!({ "seeded": "yes" }));
                    Ok(TraitResult::inert())
                },
            ))
            .unwrap();

        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "x" }))
            .with_trait(TraitSpec::new(TypeRef::new("test/v1", "seed"), json!({})))
            .with_trait(TraitSpec::new(
                TypeRef::new("test/v1", "style"),
                json!({ "styles": { "content": "{{ t.seeded }}" } }),
            ));
        let out = run(&registry, &spec, &mut StateStore::new()).unwrap();
        assert_eq!(out.props.style.get("content"), Some(&json!("yes")));
    }

    #[test]
    fn trait_behavior_reaches_host_module() {
        struct Banner {
            text: &'static str,
        }

        let mut registry = text_registry();
        registry
            .register_trait(TraitEntry::new(
                EntryMeta::new(TypeRef::new("test/v1", "banner"), "reads a host module"),
                Schema::Any,
                |ctx: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> {
                    let banner = ctx
                        .module::<Banner>("banner")
                        .ok_or_else(|| BehaviorError::failed("banner module not installed"))?;
                    Ok(TraitResult::from_props(
                        RenderProps::new().with_data("banner", json!(banner.text)),
                    ))
                },
            ))
            .unwrap();

        let spec = ComponentSpec::new("t", TypeRef::new("test/v1", "text"))
            .with_properties(json!({ "value": "x" }))
            .with_trait(TraitSpec::new(TypeRef::new("test/v1", "banner"), json!({})));

        let mut store = StateStore::new();
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();

        // Without the module the trait fails its component.
        let empty = ModuleContext::new();
        let err = run_component(&registry, &spec, &mut store, &mut bus, &mut methods, &empty)
            .unwrap_err();
        assert!(matches!(err, ComponentError::Trait { .. }));

        let modules = ModuleContext::new().with("banner", Banner { text: "welcome" });
        let out = run_component(&registry, &spec, &mut store, &mut bus, &mut methods, &modules)
            .unwrap();
        assert_eq!(out.props.data.get("banner"), Some(&json!("welcome")));
    }
}
