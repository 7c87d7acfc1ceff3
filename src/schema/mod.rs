//! Application document model and property schemas.
//!
//! - [`application`] — the serde data model for the external document shape
//! - [`type_ref`] — `"version/name"` references used as registry keys
//! - [`props`] — declarative JSON-shape validation for properties

pub mod application;
pub mod props;
pub mod type_ref;

pub use application::{Application, ComponentSpec, TraitSpec};
pub use props::{violations_summary, Field, Schema, SchemaViolation};
pub use type_ref::{InvalidTypeRef, TypeRef};
