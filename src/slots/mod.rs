//! Slot resolution: `(parent, slot) -> ordered children`.
//!
//! Children declare their placement with a `core/v1/slot` trait carrying the
//! literal shape `{ "container": { "id": parent, "slot": name } }`. One
//! linear scan over the component list builds a flat auxiliary index, never
//! a nested tree of owning pointers, and parents realize nesting lazily by
//! querying their own [`SlotsMap`] by slot name, recursing into children on
//! demand.
//!
//! Structural problems (dangling parent ids, slot cycles, malformed
//! containers) are collected and reported before anything renders; a
//! silently dropped child is invisible and hard to diagnose.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::Serialize;
use serde_json::Value;

use crate::schema::{Application, ComponentSpec, TypeRef};

/// Version segment of the slot trait type.
pub const SLOT_TRAIT_VERSION: &str = "core/v1";
/// Name segment of the slot trait type.
pub const SLOT_TRAIT_NAME: &str = "slot";

/// Whether a trait type is the slot trait special-cased by this module.
pub fn is_slot_trait(type_ref: &TypeRef) -> bool {
    type_ref.version == SLOT_TRAIT_VERSION && type_ref.name == SLOT_TRAIT_NAME
}

/// Empty slice for parents with no children under a queried slot.
const EMPTY_CHILDREN: &[String] = &[];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural slot errors. These abort the resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// A child's slot trait names a parent id that does not exist.
    #[error("component `{component}` targets missing parent `{parent}`")]
    DanglingParent { component: String, parent: String },

    /// Following parent edges from a component loops back onto itself.
    #[error("slot cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// The slot trait's properties are not the required container shape.
    #[error("component `{component}` has a malformed slot container: {message}")]
    BadSlotShape { component: String, message: String },
}

// ---------------------------------------------------------------------------
// SlotBinding
// ---------------------------------------------------------------------------

/// A child's declared placement: which parent, which named slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    /// Parent component id.
    pub parent: String,
    /// Named insertion point on the parent.
    pub slot: String,
}

/// Extract a component's slot binding, if it declares one.
///
/// The first slot trait wins; extra slot traits are ignored with a warning,
/// matching the reference scan semantics. The container shape is enforced
/// exactly: `{ "container": { "id": string, "slot": string } }`.
pub fn slot_binding(spec: &ComponentSpec) -> Result<Option<SlotBinding>, SlotError> {
    let mut slot_traits = spec.traits.iter().filter(|t| is_slot_trait(&t.type_ref));
    let Some(first) = slot_traits.next() else {
        return Ok(None);
    };
    if slot_traits.next().is_some() {
        tracing::warn!(
            component = %spec.id,
            "component declares multiple slot traits; using the first"
        );
    }

    let bad = |message: &str| SlotError::BadSlotShape {
        component: spec.id.clone(),
        message: message.to_owned(),
    };
    let container = first
        .properties
        .get("container")
        .ok_or_else(|| bad("missing `container`"))?;
    let id = match container.get("id") {
        Some(Value::String(id)) => id.clone(),
        _ => return Err(bad("`container.id` must be a string")),
    };
    let slot = match container.get("slot") {
        Some(Value::String(slot)) => slot.clone(),
        _ => return Err(bad("`container.slot` must be a string")),
    };
    Ok(Some(SlotBinding { parent: id, slot }))
}

// ---------------------------------------------------------------------------
// SlotsMap
// ---------------------------------------------------------------------------

/// One parent's view of its children: `slot name -> ordered child ids`.
///
/// This is the opaque handle handed to a parent's renderer; the parent
/// queries it by slot name and recurses into each child's own instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotsMap {
    slots: BTreeMap<String, Vec<String>>,
}

impl SlotsMap {
    /// Children under a slot name, in original component-list order.
    pub fn children(&self, slot: &str) -> &[String] {
        self.slots
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// The populated slot names, sorted.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Whether no slot has any children.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn push(&mut self, slot: String, child: String) {
        self.slots.entry(slot).or_default().push(child);
    }
}

// ---------------------------------------------------------------------------
// SlotIndex
// ---------------------------------------------------------------------------

/// The full slot relation for one application: per-parent slot maps, the
/// reverse child-to-binding map, and the root list.
#[derive(Debug, Clone, Default)]
pub struct SlotIndex {
    by_parent: HashMap<String, SlotsMap>,
    binding_of: HashMap<String, SlotBinding>,
    roots: Vec<String>,
}

impl SlotIndex {
    /// Build the index with one linear scan.
    ///
    /// Batch-validates: every dangling parent, malformed container, and cycle
    /// in the document is reported, not just the first.
    pub fn build(app: &Application) -> Result<Self, Vec<SlotError>> {
        let mut errors = Vec::new();
        let mut index = SlotIndex::default();

        for spec in &app.components {
            match slot_binding(spec) {
                Ok(Some(binding)) => {
                    if !app.contains(&binding.parent) {
                        errors.push(SlotError::DanglingParent {
                            component: spec.id.clone(),
                            parent: binding.parent.clone(),
                        });
                        continue;
                    }
                    index
                        .by_parent
                        .entry(binding.parent.clone())
                        .or_default()
                        .push(binding.slot.clone(), spec.id.clone());
                    index.binding_of.insert(spec.id.clone(), binding);
                }
                Ok(None) => index.roots.push(spec.id.clone()),
                Err(e) => errors.push(e),
            }
        }

        index.detect_cycles(&mut errors);

        if errors.is_empty() {
            Ok(index)
        } else {
            Err(errors)
        }
    }

    /// Walk parent edges from every bound component, coloring nodes. A node
    /// revisited while still on the current walk closes a cycle.
    fn detect_cycles(&self, errors: &mut Vec<SlotError>) {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            Unvisited,
            InProgress,
            Done,
        }
        let mut colors: HashMap<&str, Color> = self
            .binding_of
            .keys()
            .map(|id| (id.as_str(), Color::Unvisited))
            .collect();

        for start in self.binding_of.keys() {
            if colors[start.as_str()] != Color::Unvisited {
                continue;
            }
            let mut walk: Vec<&str> = Vec::new();
            let mut current = start.as_str();
            loop {
                match colors.get(current).copied() {
                    // Reached a root or an already-cleared chain.
                    None | Some(Color::Done) => break,
                    Some(Color::InProgress) => {
                        let cycle_start = walk.iter().position(|&id| id == current)
                            .unwrap_or(0);
                        let mut path: Vec<String> =
                            walk[cycle_start..].iter().map(|&id| id.to_owned()).collect();
                        path.push(current.to_owned());
                        errors.push(SlotError::CycleDetected { path });
                        break;
                    }
                    Some(Color::Unvisited) => {
                        colors.insert(current, Color::InProgress);
                        walk.push(current);
                        current = self.binding_of[current].parent.as_str();
                    }
                }
            }
            for id in walk {
                colors.insert(id, Color::Done);
            }
        }
    }

    /// The slot map for a parent. Parents with no children get an empty map.
    pub fn slots_map(&self, parent: &str) -> SlotsMap {
        self.by_parent.get(parent).cloned().unwrap_or_default()
    }

    /// A component's declared binding, if it has one.
    pub fn binding(&self, id: &str) -> Option<&SlotBinding> {
        self.binding_of.get(id)
    }

    /// Top-level component ids (no slot trait), in list order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// All ids reachable below `id` through slot bindings, breadth-first.
    /// Does not include `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(id);
        while let Some(current) = queue.pop_front() {
            if let Some(map) = self.by_parent.get(current) {
                for slot in map.slot_names() {
                    for child in map.children(slot) {
                        out.push(child.clone());
                        queue.push_back(child);
                    }
                }
            }
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
