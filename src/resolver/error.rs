//! Resolver failure types.

use crate::registry::RegistryError;
use crate::slots::SlotError;

/// One structural defect in the document. Structural validation is a batch:
/// every defect found is reported, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    /// Two components share an id.
    #[error("duplicate component id `{id}`")]
    DuplicateComponentId { id: String },

    /// An instance references an unregistered type.
    #[error("component `{component}`: {source}")]
    Registry {
        component: String,
        source: RegistryError,
    },

    /// A slot defect: dangling parent, cycle, or malformed container.
    #[error(transparent)]
    Slot(#[from] SlotError),
}

/// Resolution failure. Per-component behavior errors are not here; they are
/// scoped into the resolution's diagnostics instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// The document is structurally invalid; nothing was resolved.
    #[error("document has {} structural error(s): {}", .0.len(), summarize(.0))]
    Structural(Vec<StructuralError>),
}

fn summarize(errors: &[StructuralError]) -> String {
    errors
        .iter()
        .map(StructuralError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
