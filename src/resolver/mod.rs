//! The application resolver: document in, render instructions out.
//!
//! A resolution pass is whole-document and stateless from the caller's view:
//! structural validation, then one pipeline run per component in document
//! order, then root filtering. State merges performed during the pass queue
//! on the merge bus; [`Resolver::run_until_settled`] keeps re-resolving
//! until no merges are pending, bounded by [`RuntimeConfig::max_passes`].
//!
//! Per-component failures never abort a pass. The failing component gets an
//! error placeholder instruction and a diagnostic; its siblings render
//! normally. Only structural defects (duplicate ids, unresolved types, slot
//! errors) reject the whole document, and those are batch-reported.

pub mod error;
pub mod instruction;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::patch::{self, Operation, PatchError, PatchOutcome};
use crate::pipeline::{self, Callback, ModuleContext};
use crate::registry::Registry;
use crate::schema::{Application, TypeRef};
use crate::slots::{is_slot_trait, SlotIndex};
use crate::state::{
    MergeBus, MethodError, MethodRegistry, StateChange, StateScope, StateStore, SubscriptionId,
};

pub use error::{ResolveError, StructuralError};
pub use instruction::{ComponentDiagnostic, RenderInstruction, Resolution};

/// Dummy components are invisible data sources; their roots are filtered
/// from the render tree unless configured otherwise.
fn is_dummy(type_ref: &TypeRef) -> bool {
    type_ref.version == "core/v1" && type_ref.name == "dummy"
}

// ---------------------------------------------------------------------------
// RuntimeConfig
// ---------------------------------------------------------------------------

/// Tunables for a resolver. Builder-style consuming setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on passes per [`Resolver::run_until_settled`] call.
    pub max_passes: u32,
    /// Keep dummy components in the root list. Debug aid.
    pub include_dummy_roots: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_passes: 64,
            include_dummy_roots: false,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_passes(mut self, max_passes: u32) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn include_dummy_roots(mut self, include: bool) -> Self {
        self.include_dummy_roots = include;
        self
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Owns the document, the state store, the merge bus, and the method table,
/// and turns them into [`Resolution`]s against a shared [`Registry`].
pub struct Resolver {
    registry: Arc<Registry>,
    app: Application,
    store: StateStore,
    bus: MergeBus,
    methods: MethodRegistry,
    modules: ModuleContext,
    config: RuntimeConfig,
    /// Per-component expression subscriptions, rewatched every pass.
    expr_subs: HashMap<String, SubscriptionId>,
    pass: u64,
}

impl Resolver {
    /// A resolver over an application with default config.
    pub fn new(registry: Arc<Registry>, app: Application) -> Self {
        Self::with_config(registry, app, RuntimeConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, app: Application, config: RuntimeConfig) -> Self {
        Self {
            registry,
            app,
            store: StateStore::new(),
            bus: MergeBus::new(),
            methods: MethodRegistry::new(),
            modules: ModuleContext::new(),
            config,
            expr_subs: HashMap::new(),
            pass: 0,
        }
    }

    /// Install the host's module facilities. Behaviors reach them through
    /// [`Ctx::module`](crate::pipeline::Ctx::module).
    pub fn with_modules(mut self, modules: ModuleContext) -> Self {
        self.modules = modules;
        self
    }

    /// Replace the document wholesale. State cells and subscriptions of
    /// components that survive the swap are kept; the rest are dropped.
    pub fn install(&mut self, app: Application) {
        self.app = app;
        let keep: Vec<String> = self.app.components.iter().map(|c| c.id.clone()).collect();
        self.store.retain(|id| keep.iter().any(|k| k == id));
        let stale: Vec<String> = self
            .expr_subs
            .keys()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(sub) = self.expr_subs.remove(&id) {
                self.bus.unsubscribe(sub);
            }
        }
    }

    /// Apply one editor operation to the document. Removed components lose
    /// their state cells and subscriptions immediately.
    pub fn apply_operation(&mut self, op: &Operation) -> Result<PatchOutcome, PatchError> {
        let outcome = patch::apply(&mut self.app, op)?;
        for id in &outcome.removed {
            self.store.remove(id);
            if let Some(sub) = self.expr_subs.remove(id) {
                self.bus.unsubscribe(sub);
            }
        }
        Ok(outcome)
    }

    /// Run one resolution pass over the whole document.
    pub fn resolve(&mut self) -> Result<Resolution, ResolveError> {
        let index = self.validate_structure()?;

        self.pass += 1;
        tracing::debug!(pass = self.pass, components = self.app.components.len(), "resolving");

        let stale = self.stale_components();
        if !stale.is_empty() {
            tracing::debug!(components = ?stale, "expression bindings stale since last pass");
        }

        // This pass consumes whatever was queued before it started.
        self.bus.drain_pending();
        self.methods.clear();

        let mut resolution = Resolution::default();
        let specs = self.app.components.clone();
        for spec in &specs {
            // Seed declared initial state once per component lifetime.
            if let Ok(entry) = self.registry.resolve_component(&spec.type_ref) {
                if entry.init_state.is_object() {
                    self.store.init(&spec.id, &entry.init_state);
                }
            }

            let slots = index.slots_map(&spec.id);
            match pipeline::run_component(
                &self.registry,
                spec,
                &mut self.store,
                &mut self.bus,
                &mut self.methods,
                &self.modules,
            ) {
                Ok(mut output) => {
                    resolution
                        .effects
                        .append(&mut output.props.effects);
                    match self.expr_subs.get(&spec.id) {
                        Some(&sub) => self.bus.rewatch(sub, output.dependencies),
                        None => {
                            let sub = self
                                .bus
                                .subscribe(spec.id.clone(), output.dependencies);
                            self.expr_subs.insert(spec.id.clone(), sub);
                        }
                    }
                    resolution.instructions.push(RenderInstruction::ok(
                        &spec.id,
                        spec.type_ref.clone(),
                        output.props,
                        slots,
                    ));
                }
                Err(error) => {
                    tracing::warn!(component = %spec.id, %error, "component failed to resolve");
                    resolution.instructions.push(RenderInstruction::error_placeholder(
                        &spec.id,
                        spec.type_ref.clone(),
                        slots,
                        &error,
                    ));
                    resolution.diagnostics.push(ComponentDiagnostic {
                        component_id: spec.id.clone(),
                        error,
                    });
                }
            }
        }

        resolution.roots = index
            .roots()
            .iter()
            .filter(|id| {
                self.config.include_dummy_roots
                    || !self
                        .app
                        .component(id)
                        .is_some_and(|c| is_dummy(&c.type_ref))
            })
            .cloned()
            .collect();

        Ok(resolution)
    }

    /// Resolve repeatedly until no state merge is pending, up to
    /// `max_passes`. Returns the last resolution, with the effects of every
    /// pass accumulated so none are lost to an intermediate pass.
    pub fn run_until_settled(&mut self) -> Result<Resolution, ResolveError> {
        let mut resolution = self.resolve()?;
        let mut passes = 1;
        let mut effects = Vec::new();
        while self.bus.has_pending() {
            if passes >= self.config.max_passes {
                tracing::warn!(
                    max_passes = self.config.max_passes,
                    "state did not settle; giving up"
                );
                break;
            }
            effects.append(&mut resolution.effects);
            resolution = self.resolve()?;
            passes += 1;
        }
        effects.append(&mut resolution.effects);
        resolution.effects = effects;
        Ok(resolution)
    }

    /// Merge external state into a component and queue the change for the
    /// next pass. The entry point for hosts feeding data in.
    pub fn merge_state(&mut self, component: &str, partial: &Value) {
        let changed = self.store.merge(component, partial);
        self.bus.publish(StateChange {
            component: component.to_owned(),
            keys: changed,
        });
    }

    /// Dispatch a callback handed back by the view layer.
    pub fn invoke_callback(&mut self, callback: &Callback) -> Result<(), MethodError> {
        match callback {
            Callback::MethodCall {
                target,
                method,
                parameters,
            } => {
                let mut scope = StateScope::new(target, &mut self.store, &mut self.bus);
                self.methods.invoke(target, method, parameters, &mut scope)
            }
        }
    }

    /// Whether a state change is waiting for the next pass.
    pub fn has_pending_changes(&self) -> bool {
        self.bus.has_pending()
    }

    /// Components whose expressions read state that changed since their last
    /// pass. Reading consumes the flags; the next pass refreshes exactly
    /// these bindings, so editors can poll this between passes to highlight
    /// what will re-render. Sorted for stable output.
    pub fn stale_components(&mut self) -> Vec<String> {
        let bus = &mut self.bus;
        let mut stale: Vec<String> = self
            .expr_subs
            .iter()
            .filter(|(_, sub)| bus.take_dirty(**sub))
            .map(|(id, _)| id.clone())
            .collect();
        stale.sort();
        stale
    }

    pub fn state(&self) -> &StateStore {
        &self.store
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Batch structural validation: duplicate ids, unresolved types, slot
    /// defects. Every defect in the document is collected.
    fn validate_structure(&self) -> Result<SlotIndex, ResolveError> {
        let mut errors: Vec<StructuralError> = Vec::new();

        for id in self.app.duplicate_ids() {
            errors.push(StructuralError::DuplicateComponentId { id });
        }

        for spec in &self.app.components {
            if let Err(source) = self.registry.resolve_component(&spec.type_ref) {
                errors.push(StructuralError::Registry {
                    component: spec.id.clone(),
                    source,
                });
            }
            for trait_spec in &spec.traits {
                // The slot trait is structural; SlotIndex validates it.
                if is_slot_trait(&trait_spec.type_ref) {
                    continue;
                }
                if let Err(source) = self.registry.resolve_trait(&trait_spec.type_ref) {
                    errors.push(StructuralError::Registry {
                        component: spec.id.clone(),
                        source,
                    });
                }
            }
        }

        let index = match SlotIndex::build(&self.app) {
            Ok(index) => index,
            Err(slot_errors) => {
                errors.extend(slot_errors.into_iter().map(StructuralError::Slot));
                SlotIndex::default()
            }
        };

        if errors.is_empty() {
            Ok(index)
        } else {
            Err(ResolveError::Structural(errors))
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
