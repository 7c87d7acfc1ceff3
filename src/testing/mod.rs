//! Headless testing helpers: document builders and text-tree rendering.
//!
//! Use [`component`] / [`app`] to build documents tersely, [`resolve_app`]
//! to resolve them against the `core/v1` library, and [`tree_to_string`] to
//! capture the resolved tree as plain text for snapshot-style assertions.

pub mod harness;
pub mod render;

pub use harness::{app, component, resolve_app, ComponentBuilder};
pub use render::tree_to_string;
