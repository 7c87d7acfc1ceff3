//! State expressions: `{{ componentId.path }}` bindings in property values.
//!
//! - [`tokenizer`] — logos lexer for the path grammar
//! - [`template`] — template parsing and evaluation against the state store
//!
//! [`evaluate_value`] walks a whole properties value, evaluating every
//! embedded template and collecting the referenced component ids so the
//! caller can subscribe them on the merge bus.

pub mod template;
pub mod tokenizer;

use std::collections::BTreeSet;

use serde_json::Value;

use crate::state::StateStore;

pub use template::{ExprError, Part, PathExpr, Segment, Template};

/// Evaluate every `{{ … }}` template inside `value` against the store.
///
/// Returns the evaluated value plus the set of component ids it depends on.
/// Strings without `{{` pass through untouched; arrays and objects are walked
/// recursively.
pub fn evaluate_value(
    value: &Value,
    store: &StateStore,
) -> Result<(Value, BTreeSet<String>), ExprError> {
    let mut deps = BTreeSet::new();
    let evaluated = walk(value, store, &mut deps)?;
    Ok((evaluated, deps))
}

fn walk(
    value: &Value,
    store: &StateStore,
    deps: &mut BTreeSet<String>,
) -> Result<Value, ExprError> {
    match value {
        Value::String(s) if template::contains_expr(s) => {
            let template = Template::parse(s)?;
            deps.extend(template.dependencies());
            Ok(template.evaluate(store))
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(walk(item, store, deps)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), walk(v, store, deps)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(id: &str, state: Value) -> StateStore {
        let mut store = StateStore::new();
        store.merge(id, &state);
        store
    }

    #[test]
    fn plain_values_pass_through() {
        let store = StateStore::new();
        let input = json!({ "n": 1, "s": "text", "b": true, "nil": null });
        let (out, deps) = evaluate_value(&input, &store).unwrap();
        assert_eq!(out, input);
        assert!(deps.is_empty());
    }

    #[test]
    fn nested_strings_evaluated() {
        let store = store_with("a", json!({ "v": "hi" }));
        let input = json!({
            "direct": "{{ a.v }}",
            "nested": { "inner": "say {{ a.v }}" },
            "list": ["{{ a.v }}", "plain"]
        });
        let (out, deps) = evaluate_value(&input, &store).unwrap();
        assert_eq!(
            out,
            json!({
                "direct": "hi",
                "nested": { "inner": "say hi" },
                "list": ["hi", "plain"]
            })
        );
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["a".to_owned()]);
    }

    #[test]
    fn dependencies_collected_across_branches() {
        let store = StateStore::new();
        let input = json!({ "x": "{{ a.v }}", "y": ["{{ b.v }}"] });
        let (_, deps) = evaluate_value(&input, &store).unwrap();
        assert_eq!(
            deps.into_iter().collect::<Vec<_>>(),
            vec!["a".to_owned(), "b".to_owned()]
        );
    }

    #[test]
    fn raw_value_substitution_in_object() {
        let store = store_with("c", json!({ "n": 41 }));
        let input = json!({ "count": "{{ c.n }}" });
        let (out, _) = evaluate_value(&input, &store).unwrap();
        // Exactly-one-expression strings become the raw JSON value.
        assert_eq!(out, json!({ "count": 41 }));
    }

    #[test]
    fn parse_error_propagates() {
        let store = StateStore::new();
        let input = json!({ "bad": "{{ unterminated" });
        assert!(evaluate_value(&input, &store).is_err());
    }
}
