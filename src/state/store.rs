//! Per-component state cells with shallow merge semantics.
//!
//! Every component instance owns one mutable JSON-object cell, created on the
//! component's first resolution and destroyed when the component leaves the
//! application. `merge` is a shallow key-wise overwrite (nested objects are
//! replaced wholesale, never deep-merged) and reports which keys actually
//! changed so identical replays publish nothing.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// The state store: `component id -> JSON object cell`.
#[derive(Debug, Default)]
pub struct StateStore {
    cells: HashMap<String, Map<String, Value>>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the cell for `id` if it does not exist yet.
    ///
    /// `initial` should be a JSON object; any other value initializes an
    /// empty cell. Calling `init` on an existing cell is a no-op; state
    /// survives pipeline re-runs.
    pub fn init(&mut self, id: &str, initial: &Value) {
        if self.cells.contains_key(id) {
            return;
        }
        let cell = match initial.as_object() {
            Some(map) => map.clone(),
            None => Map::new(),
        };
        self.cells.insert(id.to_owned(), cell);
    }

    /// Shallow-merge `partial` into the cell for `id`, creating the cell if
    /// needed. Returns the keys whose values actually changed, in the order
    /// they appear in `partial`.
    ///
    /// A non-object `partial` changes nothing.
    pub fn merge(&mut self, id: &str, partial: &Value) -> Vec<String> {
        let Some(partial) = partial.as_object() else {
            tracing::warn!(component = id, "merge_state called with a non-object partial");
            return Vec::new();
        };
        let cell = self.cells.entry(id.to_owned()).or_default();
        let mut changed = Vec::new();
        for (key, value) in partial {
            if cell.get(key) != Some(value) {
                cell.insert(key.clone(), value.clone());
                changed.push(key.clone());
            }
        }
        changed
    }

    /// The cell for `id`, if it exists.
    pub fn get(&self, id: &str) -> Option<&Map<String, Value>> {
        self.cells.get(id)
    }

    /// One key of one component's cell.
    pub fn value(&self, id: &str, key: &str) -> Option<&Value> {
        self.cells.get(id).and_then(|cell| cell.get(key))
    }

    /// Whether `id` has a cell.
    pub fn contains(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    /// Drop the cell for `id`, if any.
    pub fn remove(&mut self, id: &str) -> Option<Map<String, Value>> {
        self.cells.remove(id)
    }

    /// Drop every cell whose id fails the predicate. Called when a new
    /// application document replaces the current one.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.cells.retain(|id, _| keep(id));
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The whole store as one JSON object, keyed by component id. Used by
    /// diagnostics and tests.
    pub fn snapshot(&self) -> Value {
        let mut out = Map::new();
        for (id, cell) in &self.cells {
            out.insert(id.clone(), Value::Object(cell.clone()));
        }
        Value::Object(out)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
