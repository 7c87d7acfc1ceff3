//! Resolution output types.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::pipeline::{Callback, ComponentError, Effect, RenderProps};
use crate::schema::TypeRef;
use crate::slots::SlotsMap;

/// One component's renderable payload plus its slot map. The view layer
/// walks roots, renders each instruction, and recurses into slot children
/// by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstruction {
    /// Instance id.
    pub component_id: String,
    /// Registered component type.
    pub component_type: TypeRef,
    /// Display data.
    pub data: Map<String, Value>,
    /// Style overlay.
    pub style: Map<String, Value>,
    /// Event name to callback bindings.
    pub callbacks: BTreeMap<String, Callback>,
    /// This component's children, grouped by slot name.
    pub slots: SlotsMap,
    /// Set when the component failed to resolve; the payload above is then
    /// empty and the view layer renders a placeholder.
    pub error: Option<String>,
}

impl RenderInstruction {
    /// A successfully resolved instruction.
    pub fn ok(
        component_id: impl Into<String>,
        component_type: TypeRef,
        props: RenderProps,
        slots: SlotsMap,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            component_type,
            data: props.data,
            style: props.style,
            callbacks: props.callbacks,
            slots,
            error: None,
        }
    }

    /// A placeholder for a component whose pipeline run failed. Keeps the
    /// component's position in the tree so siblings still render.
    pub fn error_placeholder(
        component_id: impl Into<String>,
        component_type: TypeRef,
        slots: SlotsMap,
        error: &ComponentError,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            component_type,
            data: Map::new(),
            style: Map::new(),
            callbacks: BTreeMap::new(),
            slots,
            error: Some(error.to_string()),
        }
    }

    /// Whether this instruction is an error placeholder.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A per-component diagnostic from one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDiagnostic {
    pub component_id: String,
    pub error: ComponentError,
}

/// The full output of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Every component's instruction, in document order.
    pub instructions: Vec<RenderInstruction>,
    /// Top-level component ids, in document order.
    pub roots: Vec<String>,
    /// Side effects requested during the pass, for the host to run.
    pub effects: Vec<Effect>,
    /// Per-component failures. Never aborts the pass.
    pub diagnostics: Vec<ComponentDiagnostic>,
}

impl Resolution {
    /// Look up one component's instruction by id.
    pub fn instruction(&self, id: &str) -> Option<&RenderInstruction> {
        self.instructions.iter().find(|i| i.component_id == id)
    }

    /// Whether the pass produced no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
