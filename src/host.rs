//! The effect host: runs the side effects a resolution pass requested.
//!
//! The resolver is synchronous and pure with respect to I/O; effects come
//! out of a pass as data. The host executes them, fetches included, and
//! funnels the resulting state updates back through a channel so the caller
//! can apply them between passes on its own schedule.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::pipeline::{Effect, FetchRequest};
use crate::resolver::Resolver;

/// A state merge waiting to be applied to a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub component: String,
    pub partial: Value,
}

/// What a fetch produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub ok: bool,
    pub data: Value,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: Value::Null,
            error: Some(error.into()),
        }
    }

    /// The partial merged into the component's `fetch` cell.
    fn into_partial(self) -> Value {
        json!({
            "fetch": {
                "loading": false,
                "data": self.data,
                "error": self.error,
            }
        })
    }
}

/// Performs HTTP requests on behalf of fetch traits. Injected so tests and
/// non-networked hosts can stub it.
pub type FetchHandler =
    Arc<dyn Fn(FetchRequest) -> Pin<Box<dyn Future<Output = FetchOutcome> + Send>> + Send + Sync>;

/// Executes effects and queues the resulting state updates.
pub struct EffectHost {
    fetch: FetchHandler,
    tx: mpsc::UnboundedSender<StateUpdate>,
    rx: mpsc::UnboundedReceiver<StateUpdate>,
}

impl EffectHost {
    pub fn new(fetch: FetchHandler) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { fetch, tx, rx }
    }

    /// Schedule one effect. Merges queue immediately; fetches run on a
    /// spawned task and queue their outcome when done.
    pub fn schedule(&self, effect: Effect) {
        match effect {
            Effect::MergeState { component, partial } => {
                // The receiver lives as long as self.
                let _ = self.tx.send(StateUpdate { component, partial });
            }
            Effect::Fetch { component, request } => {
                tracing::debug!(component = %component, url = %request.url, "spawning fetch");
                let tx = self.tx.clone();
                let fut = (self.fetch)(request);
                tokio::spawn(async move {
                    let outcome = fut.await;
                    let _ = tx.send(StateUpdate {
                        component,
                        partial: outcome.into_partial(),
                    });
                });
            }
        }
    }

    /// Schedule every effect from a pass.
    pub fn schedule_all(&self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.schedule(effect);
        }
    }

    /// Wait for the next queued update.
    pub async fn next_update(&mut self) -> Option<StateUpdate> {
        self.rx.recv().await
    }

    /// Take every update queued so far, without waiting.
    pub fn try_updates(&mut self) -> Vec<StateUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = self.rx.try_recv() {
            out.push(update);
        }
        out
    }

    /// Apply every queued update to a resolver. Returns how many were
    /// applied; the caller re-resolves if any were.
    pub fn apply_pending(&mut self, resolver: &mut Resolver) -> usize {
        let updates = self.try_updates();
        let count = updates.len();
        for update in updates {
            resolver.merge_state(&update.component, &update.partial);
        }
        count
    }
}

// ===========================================================================
// Tests
// ===========================================================================
