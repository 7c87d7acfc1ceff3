//! `core/v1/fetch`: declares an HTTP request for the host to perform.
//!
//! The runtime never touches the network. The trait describes the request,
//! seeds a `fetch` state cell (`loading` / `data` / `error`), and emits an
//! [`Effect::Fetch`] for the embedding host. The host performs the request
//! and merges the outcome back through the resolver, which triggers
//! re-resolution of anything bound to `{{ id.fetch... }}`.
//!
//! The effect is emitted once per component lifetime, keyed on the `fetch`
//! state key being absent or null. `lazy: true` suppresses the automatic
//! request; the registered `triggerFetch` method nulls the key so the next
//! pass requests again, which also serves manual refreshes.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::pipeline::{BehaviorError, Ctx, Effect, FetchRequest, RenderProps, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "fetch"),
            "declares an HTTP request performed by the host",
        ),
        Schema::object([
            Field::required("url", Schema::String),
            Field::optional("method", Schema::String),
            Field::optional("body", Schema::Any),
            Field::optional("lazy", Schema::Bool),
        ]),
        execute,
    )
    .with_state_schema(Schema::object([Field::required(
        "fetch",
        Schema::object([
            Field::required("loading", Schema::Bool),
            Field::optional("data", Schema::Any),
            Field::optional("error", Schema::Any),
        ]),
    )]))
}

fn execute(ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
    let url = match ctx.prop("url") {
        Some(Value::String(url)) => url.clone(),
        _ => return Err(BehaviorError::missing("url")),
    };

    // Nulling the key marks the component for a fresh request.
    ctx.subscribe_method(
        "triggerFetch",
        Arc::new(|_: &Value, scope| {
            scope.merge_state(&json!({ "fetch": null }));
        }),
    );

    let lazy = matches!(ctx.prop("lazy"), Some(Value::Bool(true)));
    let should_request = match ctx.state().and_then(|s| s.get("fetch")) {
        // Never requested: auto-fire unless lazy.
        None => !lazy,
        // Nulled by triggerFetch: always fire.
        Some(Value::Null) => true,
        // In flight or completed.
        Some(_) => false,
    };
    if !should_request {
        return Ok(TraitResult::inert());
    }

    let method = match ctx.prop("method") {
        Some(Value::String(m)) => m.to_uppercase(),
        _ => "GET".to_owned(),
    };
    let body = ctx.prop("body").cloned();

    ctx.merge_state(&json!({
        "fetch": { "loading": true, "data": null, "error": null }
    }));
    let effect = Effect::Fetch {
        component: ctx.component_id().to_owned(),
        request: FetchRequest { url, method, body },
    };
    Ok(TraitResult::from_props(RenderProps::new().with_effect(effect)))
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
        let mut ctx = Ctx::new("api", props, store, &mut bus, &mut methods, &modules);
        entry().behavior.execute(&mut ctx)
    }

    #[test]
    fn first_run_emits_effect_and_loading_state() {
        let props = json!({ "url": "https://api.test/items" });
        let mut store = StateStore::new();
        let result = run(&props, &mut store).unwrap();
        let out = result.props.unwrap();
        assert_eq!(out.effects.len(), 1);
        match &out.effects[0] {
            Effect::Fetch { component, request } => {
                assert_eq!(component, "api");
                assert_eq!(request.url, "https://api.test/items");
                assert_eq!(request.method, "GET");
            }
            other => panic!("expected fetch effect, got {other:?}"),
        }
        assert_eq!(
            store.value("api", "fetch").and_then(|f| f.get("loading")),
            Some(&json!(true))
        );
    }

    #[test]
    fn later_runs_are_inert() {
        let props = json!({ "url": "https://api.test/items" });
        let mut store = StateStore::new();
        run(&props, &mut store).unwrap();
        assert!(run(&props, &mut store).unwrap().is_inert());
    }

    #[test]
    fn lazy_suppresses_auto_request() {
        let props = json!({ "url": "https://api.test/items", "lazy": true });
        let mut store = StateStore::new();
        assert!(run(&props, &mut store).unwrap().is_inert());
        assert!(!store.contains("api"));
    }

    #[test]
    fn nulled_cell_requests_again() {
        let props = json!({ "url": "https://api.test/items" });
        let mut store = StateStore::new();
        run(&props, &mut store).unwrap();
        store.merge(
            "api",
            &json!({ "fetch": { "loading": false, "data": [1], "error": null } }),
        );
        assert!(run(&props, &mut store).unwrap().is_inert());

        // What triggerFetch does.
        store.merge("api", &json!({ "fetch": null }));
        let out = run(&props, &mut store).unwrap().props.unwrap();
        assert_eq!(out.effects.len(), 1);
    }

    #[test]
    fn registers_trigger_method() {
        let props = json!({ "url": "u", "lazy": true });
        let mut store = StateStore::new();
        let mut bus = MergeBus::new();
        let mut methods = MethodRegistry::new();
        let modules = ModuleContext::new();
        {
            let mut ctx = Ctx::new("api", &props, &mut store, &mut bus, &mut methods, &modules);
            entry().behavior.execute(&mut ctx).unwrap();
        }
        assert!(methods.contains("api", "triggerFetch"));
    }

    #[test]
    fn method_uppercased() {
        let props = json!({ "url": "u", "method": "post" });
        let mut store = StateStore::new();
        let out = run(&props, &mut store).unwrap().props.unwrap();
        let Effect::Fetch { request, .. } = &out.effects[0] else {
            panic!("expected fetch effect");
        };
        assert_eq!(request.method, "POST");
    }
}
