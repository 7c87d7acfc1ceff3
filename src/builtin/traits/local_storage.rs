//! `core/v1/localStorage`: persists a state key through a host-provided
//! storage module.
//!
//! The runtime has no storage of its own. Hosts install a [`StorageModule`]
//! under the `"storage"` module name; the trait restores the key from it on
//! first resolution and writes the current value back on every pass, so
//! merges from any source are persisted. Without the module the trait fails
//! its component.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::pipeline::{BehaviorError, Ctx, TraitResult};
use crate::registry::{EntryMeta, TraitEntry};
use crate::schema::{Field, Schema, TypeRef};

use super::super::CORE_VERSION;
use super::state::single;

/// Module name the trait looks up.
pub const STORAGE_MODULE: &str = "storage";

/// A key-value backend the host brings. Keys are namespaced by the runtime
/// as `component.key` before they reach the backend.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Option<Value>;
    fn store(&self, key: &str, value: &Value);
}

/// The module wrapper registered in a
/// [`ModuleContext`](crate::pipeline::ModuleContext).
pub struct StorageModule {
    backend: Box<dyn Storage>,
}

impl StorageModule {
    pub fn new(backend: impl Storage + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// A module over an in-memory map. Used by hosts without durable
    /// storage and by tests.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    pub fn load(&self, key: &str) -> Option<Value> {
        self.backend.load(key)
    }

    pub fn store(&self, key: &str, value: &Value) {
        self.backend.store(key, value);
    }
}

/// Process-local [`Storage`] over a map.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<Value> {
        self.entries.lock().expect("storage lock").get(key).cloned()
    }

    fn store(&self, key: &str, value: &Value) {
        self.entries
            .lock()
            .expect("storage lock")
            .insert(key.to_owned(), value.clone());
    }
}

pub fn entry() -> TraitEntry {
    TraitEntry::new(
        EntryMeta::new(
            TypeRef::new(CORE_VERSION, "localStorage"),
            "persists a state key through the host's storage module",
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
    let storage = ctx
        .module::<StorageModule>(STORAGE_MODULE)
        .ok_or_else(|| BehaviorError::failed("no `storage` module installed"))?;

    let namespaced = format!("{}.{}", ctx.component_id(), key);
    match ctx.state().and_then(|s| s.get(&key)).cloned() {
        None => {
            // First resolution: restore, falling back to the declared
            // initial value.
            let value = storage.load(&namespaced).unwrap_or_else(|| {
                ctx.prop("initialValue").cloned().unwrap_or(Value::Null)
            });
            storage.store(&namespaced, &value);
            ctx.merge_state(&single(&key, value));
        }
        Some(current) => storage.store(&namespaced, &current),
    }

    let set_key = key;
    ctx.subscribe_method(
        "setValue",
        Arc::new(move |params: &Value, scope| {
            let value = params.get("value").cloned().unwrap_or(Value::Null);
            scope.merge_state(&single(&set_key, value));
        }),
    );

    Ok(TraitResult::inert())
}

// ===========================================================================
// Tests
// ===========================================================================
