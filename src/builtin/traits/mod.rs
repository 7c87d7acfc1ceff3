//! The core trait library.

pub mod array_state;
pub mod event;
pub mod fetch;
pub mod hidden;
pub mod local_storage;
pub mod slot;
pub mod state;
pub mod style;
pub mod validation;
