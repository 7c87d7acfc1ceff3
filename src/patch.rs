//! Editor operations over the application document.
//!
//! An editor mutates the document exclusively through [`Operation`] values
//! applied with [`apply`]; the next resolution pass picks the new document
//! up wholesale. [`OperationQueue`] buffers operations the way a UI event
//! loop produces them, for batch application between passes.

use std::collections::{HashMap, VecDeque};

use serde_json::{json, Value};

use crate::schema::{Application, ComponentSpec, TraitSpec, TypeRef};
use crate::slots::{self, slot_binding};

/// One document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Append a new component, optionally slotted under `(parent, slot)`.
    CreateComponent {
        id: String,
        component_type: TypeRef,
        parent: Option<(String, String)>,
    },
    /// Remove a component and every slot descendant below it.
    RemoveComponent { id: String },
    /// Shallow-merge a partial into a component's properties.
    ModifyProperties { id: String, patch: Value },
    /// Append a trait to a component's trait list.
    AddTrait { id: String, trait_spec: TraitSpec },
}

/// Why an operation was rejected. The document is untouched on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("component id `{id}` already exists")]
    DuplicateId { id: String },

    #[error("no component with id `{id}`")]
    UnknownComponent { id: String },
}

/// What an applied operation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Ids removed by this operation, removal target first.
    pub removed: Vec<String>,
}

/// Apply one operation to the document.
pub fn apply(app: &mut Application, op: &Operation) -> Result<PatchOutcome, PatchError> {
    match op {
        Operation::CreateComponent {
            id,
            component_type,
            parent,
        } => {
            if app.contains(id) {
                return Err(PatchError::DuplicateId { id: id.clone() });
            }
            let mut spec = ComponentSpec::new(id.clone(), component_type.clone());
            if let Some((parent_id, slot)) = parent {
                spec = spec.with_trait(TraitSpec::new(
                    TypeRef::new(slots::SLOT_TRAIT_VERSION, slots::SLOT_TRAIT_NAME),
                    json!({ "container": { "id": parent_id, "slot": slot } }),
                ));
            }
            app.components.push(spec);
            Ok(PatchOutcome::default())
        }

        Operation::RemoveComponent { id } => {
            if !app.contains(id) {
                return Err(PatchError::UnknownComponent { id: id.clone() });
            }
            let mut removed = vec![id.clone()];
            removed.extend(descendants_of(app, id));
            app.components.retain(|c| !removed.contains(&c.id));
            tracing::debug!(component = %id, cascade = removed.len() - 1, "removed component");
            Ok(PatchOutcome { removed })
        }

        Operation::ModifyProperties { id, patch } => {
            let spec = app
                .component_mut(id)
                .ok_or_else(|| PatchError::UnknownComponent { id: id.clone() })?;
            match (spec.properties.as_object_mut(), patch.as_object()) {
                (Some(existing), Some(partial)) => {
                    for (k, v) in partial {
                        existing.insert(k.clone(), v.clone());
                    }
                }
                // Non-object on either side replaces wholesale.
                _ => spec.properties = patch.clone(),
            }
            Ok(PatchOutcome::default())
        }

        Operation::AddTrait { id, trait_spec } => {
            let spec = app
                .component_mut(id)
                .ok_or_else(|| PatchError::UnknownComponent { id: id.clone() })?;
            spec.traits.push(trait_spec.clone());
            Ok(PatchOutcome::default())
        }
    }
}

/// Slot descendants of `id`, breadth-first. Works directly off the trait
/// list so removal cascades even while the document is otherwise invalid.
fn descendants_of(app: &Application, id: &str) -> Vec<String> {
    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for spec in &app.components {
        if let Ok(Some(binding)) = slot_binding(spec) {
            children.entry(binding.parent).or_default().push(spec.id.clone());
        }
    }

    let mut out = Vec::new();
    let mut queue = VecDeque::from([id.to_owned()]);
    while let Some(current) = queue.pop_front() {
        if let Some(kids) = children.get(&current) {
            for kid in kids {
                out.push(kid.clone());
                queue.push_back(kid.clone());
            }
        }
    }
    out
}

/// A FIFO buffer of pending operations.
#[derive(Debug, Default)]
pub struct OperationQueue {
    ops: VecDeque<Operation>,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an operation for the next batch.
    pub fn push(&mut self, op: Operation) {
        self.ops.push_back(op);
    }

    /// Take every queued operation, in arrival order.
    pub fn drain(&mut self) -> Vec<Operation> {
        self.ops.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
