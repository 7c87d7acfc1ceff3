//! The `core/v1` component and trait library.
//!
//! [`registry`] builds a fresh [`Registry`] with everything under the
//! `core/v1` version registered. Hosts extend it with their own libraries
//! before handing it to a resolver.

pub mod components;
pub mod traits;

use crate::registry::Registry;

/// Version prefix for every builtin type.
pub const CORE_VERSION: &str = "core/v1";

/// A registry with the full `core/v1` library installed.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    // A fresh registry cannot collide with itself.
    registry
        .register_component(components::text())
        .expect("builtin component registers once");
    registry
        .register_component(components::r#box())
        .expect("builtin component registers once");
    registry
        .register_component(components::button())
        .expect("builtin component registers once");
    registry
        .register_component(components::dummy())
        .expect("builtin component registers once");
    registry
        .register_trait(traits::slot::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::state::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::array_state::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::event::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::style::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::hidden::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::fetch::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::validation::entry())
        .expect("builtin trait registers once");
    registry
        .register_trait(traits::local_storage::entry())
        .expect("builtin trait registers once");
    registry
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeRef;

    #[test]
    fn registry_has_full_core_library() {
        let registry = registry();
        for name in ["text", "box", "button", "dummy"] {
            assert!(registry.has_component(&TypeRef::new(CORE_VERSION, name)));
        }
        for name in [
            "slot",
            "state",
            "arrayState",
            "event",
            "style",
            "hidden",
            "fetch",
            "validation",
            "localStorage",
        ] {
            assert!(registry.has_trait(&TypeRef::new(CORE_VERSION, name)));
        }
    }
}
