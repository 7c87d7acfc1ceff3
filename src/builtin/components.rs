//! The core component library.
//!
//! A deliberately small set: enough for documents to express text, layout,
//! actions, and invisible data sources. Host applications register richer
//! libraries alongside these under their own versions.

use serde_json::Value;

use crate::pipeline::{BehaviorError, Ctx, RenderProps};
use crate::registry::{ComponentEntry, EntryMeta};
use crate::schema::{Field, Schema, TypeRef};

use super::CORE_VERSION;

/// `core/v1/text`: renders a string value.
pub fn text() -> ComponentEntry {
    ComponentEntry::new(
        EntryMeta::new(TypeRef::new(CORE_VERSION, "text"), "renders a text value"),
        Schema::object([Field::required("value", Schema::String)]),
        |ctx: &mut Ctx<'_>| -> Result<RenderProps, BehaviorError> {
            let value = ctx
                .prop("value")
                .cloned()
                .ok_or_else(|| BehaviorError::missing("value"))?;
            Ok(RenderProps::new().with_data("value", value))
        },
    )
}

/// `core/v1/box`: a layout container. Children attach through slot traits;
/// the box itself only forwards its direction hint.
pub fn r#box() -> ComponentEntry {
    ComponentEntry::new(
        EntryMeta::new(TypeRef::new(CORE_VERSION, "box"), "layout container"),
        Schema::object([Field::optional("direction", Schema::String)]),
        |ctx: &mut Ctx<'_>| -> Result<RenderProps, BehaviorError> {
            let direction = ctx
                .prop("direction")
                .cloned()
                .unwrap_or_else(|| Value::String("column".into()));
            Ok(RenderProps::new().with_data("direction", direction))
        },
    )
}

/// `core/v1/button`: a labeled action target. Callbacks come from the event
/// trait, not the component itself.
pub fn button() -> ComponentEntry {
    ComponentEntry::new(
        EntryMeta::new(TypeRef::new(CORE_VERSION, "button"), "labeled action target"),
        Schema::object([Field::required("text", Schema::String)]),
        |ctx: &mut Ctx<'_>| -> Result<RenderProps, BehaviorError> {
            let text = ctx
                .prop("text")
                .cloned()
                .ok_or_else(|| BehaviorError::missing("text"))?;
            Ok(RenderProps::new().with_data("text", text))
        },
    )
}

/// `core/v1/dummy`: renders nothing. Exists to carry data-source traits
/// (state, fetch); the resolver filters it from the root list.
pub fn dummy() -> ComponentEntry {
    ComponentEntry::new(
        EntryMeta::new(TypeRef::new(CORE_VERSION, "dummy"), "invisible data source"),
        Schema::Any,
        |_: &mut Ctx<'_>| -> Result<RenderProps, BehaviorError> { Ok(RenderProps::new()) },
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ModuleContext;
    use crate::state::{MergeBus, MethodRegistry, StateStore};
    use serde_json::json;

    fn run(entry: &ComponentEntry, props: Value) -> Result<RenderProps, BehaviorError> {
        let mut store = StateStore::new();
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        let mut ctx = Ctx::new("c", &props, &mut store, &mut bus, &mut methods, &modules);
        entry.behavior.run(&mut ctx)
    }

    #[test]
    fn text_forwards_value() {
        let out = run(&text(), json!({ "value": "hi" })).unwrap();
        assert_eq!(out.data.get("value"), Some(&json!("hi")));
    }

    #[test]
    fn text_without_value_fails() {
        assert!(run(&text(), json!({})).is_err());
    }

    #[test]
    fn box_defaults_to_column() {
        let out = run(&r#box(), json!({})).unwrap();
        assert_eq!(out.data.get("direction"), Some(&json!("column")));
    }

    #[test]
    fn button_forwards_text() {
        let out = run(&button(), json!({ "text": "Go" })).unwrap();
        assert_eq!(out.data.get("text"), Some(&json!("Go")));
    }

    #[test]
    fn dummy_renders_nothing() {
        let out = run(&dummy(), json!({ "anything": true })).unwrap();
        assert!(out.data.is_empty());
        assert!(out.style.is_empty());
    }
}
