//! Pipeline value types: render props, trait results, callbacks, effects.
//!
//! A component behavior produces a base [`RenderProps`]; each trait then
//! contributes an optional overlay that is shallow-merged on top. The merged
//! result is what lands in the render instruction.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Callbacks and effects
// ---------------------------------------------------------------------------

/// A data-oriented callback binding. The view layer hands this back to the
/// resolver verbatim; the resolver dispatches it through the method registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Callback {
    /// Invoke `method` on component `target` with `parameters`.
    #[serde(rename_all = "camelCase")]
    MethodCall {
        target: String,
        method: String,
        parameters: Value,
    },
}

/// An HTTP request described by a fetch trait. The runtime never performs
/// it; the embedding host does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    pub body: Option<Value>,
}

/// A side effect requested during a pass, collected for the host to run
/// after the pass completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Merge a partial into a component's state.
    MergeState { component: String, partial: Value },
    /// Perform an HTTP fetch on behalf of a component.
    Fetch {
        component: String,
        request: FetchRequest,
    },
}

// ---------------------------------------------------------------------------
// RenderProps
// ---------------------------------------------------------------------------

/// The renderable payload for one component: display data, style overlay,
/// callback bindings, and requested effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderProps {
    /// Display data for the view layer, e.g. `text.value`.
    pub data: Map<String, Value>,
    /// Style key/value overlay.
    pub style: Map<String, Value>,
    /// Event name to callback bindings, sorted for stable output.
    pub callbacks: BTreeMap<String, Callback>,
    /// Effects requested this pass, in contribution order.
    pub effects: Vec<Effect>,
}

impl RenderProps {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a data key.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Set a style key.
    pub fn with_style(mut self, key: impl Into<String>, value: Value) -> Self {
        self.style.insert(key.into(), value);
        self
    }

    /// Bind a callback under an event name.
    pub fn with_callback(mut self, event: impl Into<String>, callback: Callback) -> Self {
        self.callbacks.insert(event.into(), callback);
        self
    }

    /// Queue an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Shallow-merge `other` on top of `self`. For data, style, and
    /// callbacks the later contribution wins per key; effects concatenate.
    pub fn merge_from(&mut self, other: RenderProps) {
        self.data.extend(other.data);
        self.style.extend(other.style);
        self.callbacks.extend(other.callbacks);
        self.effects.extend(other.effects);
    }
}

// ---------------------------------------------------------------------------
// TraitResult
// ---------------------------------------------------------------------------

/// The outcome of executing one trait: either a props overlay to merge, or
/// nothing at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitResult {
    /// Overlay to merge into the component's props, if any.
    pub props: Option<RenderProps>,
}

impl TraitResult {
    /// A result that contributes nothing.
    pub fn inert() -> Self {
        Self { props: None }
    }

    /// A result carrying a props overlay.
    pub fn from_props(props: RenderProps) -> Self {
        Self { props: Some(props) }
    }

    /// Whether this result contributes nothing.
    pub fn is_inert(&self) -> bool {
        self.props.is_none()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn callback(target: &str, method: &str) -> Callback {
        Callback::MethodCall {
            target: target.into(),
            method: method.into(),
            parameters: Value::Null,
        }
    }

    #[test]
    fn merge_later_wins_per_key() {
        let mut base = RenderProps::new()
            .with_data("a", json!(1))
            .with_data("b", json!(2))
            .with_style("color", json!("red"));
        let overlay = RenderProps::new()
            .with_data("b", json!(20))
            .with_style("color", json!("blue"));
        base.merge_from(overlay);

        assert_eq!(base.data.get("a"), Some(&json!(1)));
        assert_eq!(base.data.get("b"), Some(&json!(20)));
        assert_eq!(base.style.get("color"), Some(&json!("blue")));
    }

    #[test]
    fn merge_concatenates_effects() {
        let mut base = RenderProps::new().with_effect(Effect::MergeState {
            component: "a".into(),
            partial: json!({ "x": 1 }),
        });
        let overlay = RenderProps::new().with_effect(Effect::MergeState {
            component: "a".into(),
            partial: json!({ "y": 2 }),
        });
        base.merge_from(overlay);
        assert_eq!(base.effects.len(), 2);
    }

    #[test]
    fn merge_callbacks_later_wins() {
        let mut base = RenderProps::new().with_callback("click", callback("a", "inc"));
        base.merge_from(RenderProps::new().with_callback("click", callback("a", "dec")));
        assert_eq!(base.callbacks.get("click"), Some(&callback("a", "dec")));
    }

    #[test]
    fn inert_result_has_no_props() {
        assert!(TraitResult::inert().is_inert());
        assert!(!TraitResult::from_props(RenderProps::new()).is_inert());
    }

    #[test]
    fn callback_serializes_tagged() {
        let value = serde_json::to_value(callback("input", "setValue")).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "methodCall",
                "target": "input",
                "method": "setValue",
                "parameters": null
            })
        );
    }
}
