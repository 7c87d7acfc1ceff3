//! `core/v1/hidden`: hides the component when its condition is true.
//!
//! The condition is usually an expression (`"{{ toggle.value }}"`), already
//! evaluated to a boolean by the time the behavior runs. Hiding is a style
//! concern; the component still resolves, keeps its state, and stays in the
//! tree.

use serde_json::{json, Value};

use crate::pipeline::{BehaviorError, Ctx, RenderProps, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "hidden"),
            "hides the component when the condition holds",
        ),
        Schema::object([Field::required("hidden", Schema::Bool)]),
        |ctx: &mut Ctx<'_>| -> Result<TraitResult, BehaviorError> {
            match ctx.prop("hidden") {
                Some(Value::Bool(true)) => Ok(TraitResult::from_props(
                    RenderProps::new()
                        .with_data("hidden", json!(true))
                        .with_style("display", json!("none")),
                )),
                Some(Value::Bool(false)) => Ok(TraitResult::inert()),
                _ => Err(BehaviorError::missing("hidden")),
            }
        },
    )
}

// ===========================================================================
// Tests
// ===========================================================================
