//! `core/v1/style`: overlays style key/values onto the component's props.

use serde_json::Value;

use crate::pipeline::{BehaviorError, Ctx, RenderProps, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "style"),
            "overlays style key/values",
        ),
        Schema::object([Field::required("styles", Schema::Object(Vec::new()))]),
        |ctx: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> {
            let Some(Value::Object(styles)) = ctx.prop("styles") else {
                return Err(BehaviorError::missing("styles"));
            };
            let mut props = RenderProps::new();
            for (k, v) in styles {
                props.style.insert(k.clone(), v.clone());
            }
            Ok(TraitResult::from_props(props))
        },
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

    #[test]
    fn styles_land_in_style_overlay() {
        let props = json!({ "styles": { "color": "red", "padding": 4 } });
        let mut store = StateStore::new();
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        let mut ctx = Ctx::new("c", &props, &mut store, &mut bus, &mut methods, &modules);
        let result = entry().behavior.execute(&mut ctx).unwrap();
        let out = result.props.unwrap();
        assert_eq!(out.style.get("color"), Some(&json!("red")));
        assert_eq!(out.style.get("padding"), Some(&json!(4)));
        assert!(out.data.is_empty());
    }
}
