//! `core/v1/arrayState`: declares a state key holding an array, with item
//! level methods on top of the whole-value ones.
//!
//! Seeding follows the `state` trait: the key is written once per component
//! lifetime and methods own it afterwards. Methods with an out-of-range
//! index do nothing.

use std::sync::Arc;

use serde_json::Value;

use crate::pipeline::{BehaviorError, Ctx, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};
use crate::state::StateScope;

use super::super::CORE_VERSION;
use super::state::single;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "arrayState"),
            "declares an array state key with item-level methods",
        ),
        Schema::object([
            Field::required("key", Schema::String),
            Field::optional("initialValue", Schema::array(Schema::Any)),
        ]),
        execute,
    )
}

fn execute(ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
    let key = match ctx.prop("key") {
        Some(Value::String(key)) => key.clone(),
        _ => return Err(BehaviorError::missing("key")),
    };
    let initial = match ctx.prop("initialValue").cloned() {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(BehaviorError::bad("initialValue", "expected an array")),
        None => Vec::new(),
    };

    let seeded = ctx.state().is_some_and(|s| s.contains_key(&key));
    if !seeded {
        ctx.merge_state(&single(&key, Value::Array(initial)));
    }

    let set_key = key.clone();
    ctx.subscribe_method(
        "setArray",
        Arc::new(move |params: &Value, scope| {
            if let Some(Value::Array(items)) = params.get("value") {
                scope.merge_state(&single(&set_key, Value::Array(items.clone())));
            }
        }),
    );
    let push_key = key.clone();
    ctx.subscribe_method(
        "pushItem",
        Arc::new(move |params: &Value, scope| {
            let Some(item) = params.get("item").cloned() else {
                return;
            };
            let mut items = current(scope, &push_key);
            items.push(item);
            scope.merge_state(&single(&push_key, Value::Array(items)));
        }),
    );
    let remove_key = key.clone();
    ctx.subscribe_method(
        "removeItemByIndex",
        Arc::new(move |params: &Value, scope| {
            let Some(index) = params.get("index").and_then(Value::as_u64) else {
                return;
            };
            let mut items = current(scope, &remove_key);
            if (index as usize) < items.len() {
                items.remove(index as usize);
                scope.merge_state(&single(&remove_key, Value::Array(items)));
            }
        }),
    );
    let modify_key = key;
    ctx.subscribe_method(
        "modifyItemByIndex",
        Arc::new(move |params: &Value, scope| {
            let Some(index) = params.get("index").and_then(Value::as_u64) else {
                return;
            };
            let Some(item) = params.get("item").cloned() else {
                return;
            };
            let mut items = current(scope, &modify_key);
            if let Some(slot) = items.get_mut(index as usize) {
                *slot = item;
                scope.merge_state(&single(&modify_key, Value::Array(items)));
            }
        }),
    );

    Ok(TraitResult::inert())
}

/// The current array under `key`, or empty if absent or not an array.
fn current(scope: &StateScope<'_>, key: &str) -> Vec<Value> {
    match scope.state().and_then(|s| s.get(key)) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
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

    fn run(
        props: &Value,
        store: &mut StateStore,
        methods: &mut MethodRegistry,
    ) -> Result<TraitResult, BehaviorError> {
        let mut bus = MergeBus::new();
        let modules = ModuleContext::new();
        let mut ctx = Ctx::new("list", props, store, &mut bus, methods, &modules);
        entry().behavior.execute(&mut ctx)
    }

    fn invoke(
        store: &mut StateStore,
        methods: &MethodRegistry,
        method: &str,
        params: Value,
    ) {
        let mut bus = MergeBus::new();
        let mut scope = StateScope::new("list", store, &mut bus);
        methods.invoke("list", method, &params, &mut scope).unwrap();
    }

    #[test]
    fn seeds_initial_array_once() {
        let props = json!({ "key": "items", "initialValue": [1, 2] });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        run(&props, &mut store, &mut methods).unwrap();
        assert_eq!(store.value("list", "items"), Some(&json!([1, 2])));

        store.merge("list", &json!({ "items": [9] }));
        run(&props, &mut store, &mut methods).unwrap();
        assert_eq!(store.value("list", "items"), Some(&json!([9])));
    }

    #[test]
    fn missing_initial_value_seeds_empty() {
        let props = json!({ "key": "items" });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        run(&props, &mut store, &mut methods).unwrap();
        assert_eq!(store.value("list", "items"), Some(&json!([])));
    }

    #[test]
    fn item_methods_mutate_the_array() {
        let props = json!({ "key": "items", "initialValue": ["a"] });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        run(&props, &mut store, &mut methods).unwrap();

        invoke(&mut store, &methods, "pushItem", json!({ "item": "b" }));
        assert_eq!(store.value("list", "items"), Some(&json!(["a", "b"])));

        invoke(
            &mut store,
            &methods,
            "modifyItemByIndex",
            json!({ "index": 0, "item": "A" }),
        );
        assert_eq!(store.value("list", "items"), Some(&json!(["A", "b"])));

        invoke(&mut store, &methods, "removeItemByIndex", json!({ "index": 1 }));
        assert_eq!(store.value("list", "items"), Some(&json!(["A"])));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let props = json!({ "key": "items", "initialValue": ["a"] });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        run(&props, &mut store, &mut methods).unwrap();

        invoke(&mut store, &methods, "removeItemByIndex", json!({ "index": 5 }));
        assert_eq!(store.value("list", "items"), Some(&json!(["a"])));
    }

    #[test]
    fn set_array_replaces_wholesale() {
        let props = json!({ "key": "items" });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        run(&props, &mut store, &mut methods).unwrap();

        invoke(&mut store, &methods, "setArray", json!({ "value": [1, 2, 3] }));
        assert_eq!(store.value("list", "items"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn non_array_initial_value_fails() {
        let props = json!({ "key": "items", "initialValue": "nope" });
        let mut store = StateStore::new();
        let mut methods = MethodRegistry::new();
        assert!(run(&props, &mut store, &mut methods).is_err());
    }
}
