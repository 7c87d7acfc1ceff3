//! `core/v1/validation`: checks a state key against declared rules and
//! publishes the verdict back into state.
//!
//! The verdict lands under `validResult` as `{ isValid, errors }`, so other
//! components can bind to it (`{{ form.validResult.isValid }}`). Re-running
//! with an unchanged value merges an identical verdict, which the store
//! coalesces, so the settle loop terminates.

use serde_json::{json, Value};

use crate::pipeline::{BehaviorError, Ctx, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "validation"),
            "validates a state key and publishes the verdict",
        ),
        Schema::object([
            Field::optional("key", Schema::String),
            Field::optional("required", Schema::Bool),
            Field::optional("minLength", Schema::Number),
            Field::optional("maxLength", Schema::Number),
        ]),
        execute,
    )
    .with_state_schema(Schema::object([Field::required(
        "validResult",
        Schema::object([
            Field::required("isValid", Schema::Bool),
            Field::required("errors", Schema::array(Schema::String)),
        ]),
    )]))
}

fn execute(ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
    let key = match ctx.prop("key") {
        Some(Value::String(key)) => key.clone(),
        None => "value".to_owned(),
        Some(_) => return Err(BehaviorError::bad("key", "expected a string")),
    };
    let required = matches!(ctx.prop("required"), Some(Value::Bool(true)));
    let min_length = ctx.prop("minLength").and_then(Value::as_u64);
    let max_length = ctx.prop("maxLength").and_then(Value::as_u64);

    let value = ctx.state().and_then(|s| s.get(&key)).cloned();
    let mut errors: Vec<String> = Vec::new();

    let empty = match &value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if required && empty {
        errors.push(format!("`{key}` is required"));
    }

    // Length rules only apply to strings; other shapes pass them.
    if let Some(Value::String(s)) = &value {
        let len = s.chars().count() as u64;
        if let Some(min) = min_length {
            if len < min {
                errors.push(format!("`{key}` is shorter than {min}"));
            }
        }
        if let Some(max) = max_length {
            if len > max {
                errors.push(format!("`{key}` is longer than {max}"));
            }
        }
    }

    ctx.merge_state(&json!({
        "validResult": { "isValid": errors.is_empty(), "errors": errors }
    }));
    Ok(TraitResult::inert())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ModuleContext;
    use crate::state::{MergeBus, MethodRegistry, StateStore};

    fn run(props: &Value, store: &mut StateStore) -> Result<TraitResult, BehaviorError> {
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        let mut ctx = Ctx::new("form", props, store, &mut bus, &mut methods, &modules);
        entry().behavior.execute(&mut ctx)
    }

    fn verdict(store: &StateStore) -> &Value {
        store.value("form", "validResult").unwrap()
    }

    #[test]
    fn valid_value_passes() {
        let props = json!({ "required": true, "minLength": 2 });
        let mut store = StateStore::new();
        store.merge("form", &json!({ "value": "hello" }));
        run(&props, &mut store).unwrap();
        assert_eq!(verdict(&store)["isValid"], json!(true));
        assert_eq!(verdict(&store)["errors"], json!([]));
    }

    #[test]
    fn required_catches_missing_and_empty() {
        let props = json!({ "required": true });
        let mut store = StateStore::new();
        run(&props, &mut store).unwrap();
        assert_eq!(verdict(&store)["isValid"], json!(false));

        store.merge("form", &json!({ "value": "" }));
        run(&props, &mut store).unwrap();
        assert_eq!(verdict(&store)["isValid"], json!(false));
    }

    #[test]
    fn length_rules_collect_every_violation() {
        let props = json!({ "minLength": 5, "maxLength": 3 });
        let mut store = StateStore::new();
        store.merge("form", &json!({ "value": "abcd" }));
        run(&props, &mut store).unwrap();
        let errors = verdict(&store)["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn custom_key_is_validated() {
        let props = json!({ "key": "name", "required": true });
        let mut store = StateStore::new();
        store.merge("form", &json!({ "name": "ada", "value": "" }));
        run(&props, &mut store).unwrap();
        assert_eq!(verdict(&store)["isValid"], json!(true));
    }

    #[test]
    fn unchanged_value_merges_identical_verdict() {
        let props = json!({ "required": true });
        let mut store = StateStore::new();
        store.merge("form", &json!({ "value": "x" }));
        run(&props, &mut store).unwrap();
        let first = verdict(&store).clone();
        run(&props, &mut store).unwrap();
        assert_eq!(verdict(&store), &first);
    }
}
