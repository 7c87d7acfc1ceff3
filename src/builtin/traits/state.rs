//! `core/v1/state`: declares a named state key with an initial value and
//! exposes `setValue` / `resetValue` methods for it.

use std::sync::Arc;

use serde_json::Value;

use crate::pipeline::{BehaviorError, Ctx, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "state"),
            "declares a state key with methods to set and reset it",
        ),
        Schema::object([
            Field::required("key", Schema::String),
            Field::optional("initialValue", Schema::Any),
        ]),
        execute,
    )
}

fn execute(ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
    let key = match ctx.prop("key") {
        Some(Value::String(key)) => key.clone(),
        _ => return Err(BehaviorError::missing("key")),
    };
    let initial = ctx.prop("initialValue").cloned().unwrap_or(Value::Null);

    // Seed only while the key is absent; merges and method calls own it
    // afterwards.
    let seeded = ctx.state().is_some_and(|s| s.contains_key(&key));
    if !seeded {
        ctx.merge_state(&single(&key, initial.clone()));
    }

    let set_key = key.clone();
    ctx.subscribe_method(
        "setValue",
        Arc::new(move |params: &Value, scope| {
            let value = params.get("value").cloned().unwrap_or(Value::Null);
            scope.merge_state(&single(&set_key, value));
        }),
    );
    let reset_key = key;
    ctx.subscribe_method(
        "resetValue",
        Arc::new(move |_: &Value, scope| {
            scope.merge_state(&single(&reset_key, initial.clone()));
        }),
    );

    Ok(TraitResult::inert())
}

/// A one-key object partial.
pub(super) fn single(key: &str, value: Value) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

// ===========================================================================
// Tests
// ===========================================================================
