//! `core/v1/event`: binds UI events to component method calls.
//!
//! Handlers are declarative: the trait turns each one into a data-oriented
//! [`Callback`] keyed by event name. Nothing runs here; the view layer hands
//! the callback back to the resolver when the event fires. A later handler
//! for the same event name replaces an earlier one.

use serde_json::Value;

use crate::pipeline::{BehaviorError, Callback, Ctx, RenderProps, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "event"),
            "binds events to component method calls",
        ),
        Schema::object([Field::required(
            "handlers",
            Schema::array(Schema::object([
                Field::required("event", Schema::String),
                Field::required("componentId", Schema::String),
                Field::required("method", Schema::String),
                Field::optional("parameters", Schema::Any),
            ])),
        )]),
        execute,
    )
}

fn execute(ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
    let Some(Value::Array(handlers)) = ctx.prop("handlers") else {
        return Err(BehaviorError::missing("handlers"));
    };

    let mut props = RenderProps::new();
    for handler in handlers {
        let event = str_field(handler, "event")?;
        let target = str_field(handler, "componentId")?;
        let method = str_field(handler, "method")?;
        let parameters = handler.get("parameters").cloned().unwrap_or(Value::Null);
        props.callbacks.insert(
            event.to_owned(),
            Callback::MethodCall {
                target: target.to_owned(),
                method: method.to_owned(),
                parameters,
            },
        );
    }
    Ok(TraitResult::from_props(props))
}

fn str_field<'a>(handler: &'a Value, key: &str) -> Result<&'a str, BehaviorError> {
    handler
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| BehaviorError::bad("handlers", format!("handler missing `{key}`")))
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

    fn run(props: Value) -> Result<TraitResult, BehaviorError> {
        let mut store = StateStore::new();
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        let mut ctx = Ctx::new("btn", &props, &mut store, &mut bus, &mut methods, &modules);
        entry().behavior.execute(&mut ctx)
    }

    #[test]
    fn handlers_become_callbacks() {
        let result = run(json!({
            "handlers": [{
                "event": "click",
                "componentId": "input",
                "method": "setValue",
                "parameters": { "value": "clicked" }
            }]
        }))
        .unwrap();
        let props = result.props.unwrap();
        assert_eq!(
            props.callbacks.get("click"),
            Some(&Callback::MethodCall {
                target: "input".into(),
                method: "setValue".into(),
                parameters: json!({ "value": "clicked" }),
            })
        );
    }

    #[test]
    fn later_handler_for_same_event_wins() {
        let result = run(json!({
            "handlers": [
                { "event": "click", "componentId": "a", "method": "m1" },
                { "event": "click", "componentId": "b", "method": "m2" }
            ]
        }))
        .unwrap();
        let props = result.props.unwrap();
        assert!(matches!(
            props.callbacks.get("click"),
            Some(Callback::MethodCall { target, .. }) if target == "b"
        ));
    }

    #[test]
    fn malformed_handler_fails() {
        let err = run(json!({ "handlers": [{ "event": "click" }] })).unwrap_err();
        assert!(matches!(err, BehaviorError::BadProperty { .. }));
    }
}
