//! # trellis
//!
//! A headless runtime for schema-driven component applications.
//!
//! trellis takes a JSON application document (components, traits, slots),
//! resolves it against a registry of typed component and trait
//! implementations, and emits flat render instructions for any view layer
//! to draw. State lives in a central store; `{{ id.path }}` expressions
//! bind properties to it, and every state merge re-resolves the document
//! until it settles.
//!
//! ## Core Systems
//!
//! - **[`schema`]** — Application document model, type references, property schemas
//! - **[`registry`]** — Versioned component/trait type registry
//! - **[`pipeline`]** — Per-component render pipeline: evaluate, validate, execute traits
//! - **[`slots`]** — Slot-based tree assembly over the flat component list
//! - **[`state`]** — State store, merge bus, runtime-callable methods
//! - **[`expr`]** — `{{ … }}` state expressions in property values
//! - **[`resolver`]** — Whole-document resolution and the settle loop
//! - **[`builtin`]** — The `core/v1` component and trait library
//! - **[`patch`]** — Editor operations over the document
//! - **[`host`]** — Async effect host for fetches and external merges

// Document model
pub mod schema;

// Core systems
pub mod expr;
pub mod pipeline;
pub mod registry;
pub mod slots;
pub mod state;

// Resolution
pub mod builtin;
pub mod resolver;

// Editing and embedding
pub mod host;
pub mod patch;

// Test helpers
pub mod testing;
