//! The merge bus: an explicit observer registry for state changes.
//!
//! Anything that reads cross-component state (expression-bearing components,
//! the resolver itself, the editor) subscribes here with a watch set. Every
//! `merge_state` that actually changes a key publishes a [`StateChange`];
//! publishing runs synchronously, marking matching subscriptions dirty and
//! coalescing the change into a pending list. Coalescing merges repeated
//! changes per component into one entry (keys unioned); the store always
//! holds the last write for a key, so coalescing never loses one.
//!
//! The bus is owned by the resolver and threaded through contexts; it is not
//! process-wide state, which keeps resolution passes composable in tests.

use std::collections::HashSet;

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to one bus subscription.
    pub struct SubscriptionId;
}

/// A published state mutation: which component, which keys changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Component whose cell changed.
    pub component: String,
    /// Keys whose values changed, in merge order.
    pub keys: Vec<String>,
}

/// What a subscription watches.
#[derive(Debug, Clone)]
enum Watch {
    /// Every component.
    All,
    /// A fixed set of component ids.
    Components(HashSet<String>),
}

#[derive(Debug)]
struct Subscription {
    /// Debug label, surfaced in traces.
    label: String,
    watch: Watch,
    dirty: bool,
}

/// Observer registry plus coalesced pending-change queue.
#[derive(Debug, Default)]
pub struct MergeBus {
    subs: SlotMap<SubscriptionId, Subscription>,
    pending: Vec<StateChange>,
}

impl MergeBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes of a fixed set of component ids.
    pub fn subscribe(
        &mut self,
        label: impl Into<String>,
        components: impl IntoIterator<Item = String>,
    ) -> SubscriptionId {
        self.subs.insert(Subscription {
            label: label.into(),
            watch: Watch::Components(components.into_iter().collect()),
            dirty: false,
        })
    }

    /// Subscribe to changes of every component.
    pub fn subscribe_all(&mut self, label: impl Into<String>) -> SubscriptionId {
        self.subs.insert(Subscription {
            label: label.into(),
            watch: Watch::All,
            dirty: false,
        })
    }

    /// Replace the watch set of an existing subscription. Expression
    /// dependencies can change between passes; the resolver rewatches after
    /// each one. Unknown ids are ignored.
    pub fn rewatch(&mut self, id: SubscriptionId, components: impl IntoIterator<Item = String>) {
        if let Some(sub) = self.subs.get_mut(id) {
            sub.watch = Watch::Components(components.into_iter().collect());
        }
    }

    /// Remove a subscription. Safe to call with a stale id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subs.remove(id);
    }

    /// Publish a change: mark matching subscriptions dirty and coalesce the
    /// change into the pending list. Synchronous: on return, every matching
    /// subscription observes the change.
    pub fn publish(&mut self, change: StateChange) {
        if change.keys.is_empty() {
            return;
        }
        for sub in self.subs.values_mut() {
            let matches = match &sub.watch {
                Watch::All => true,
                Watch::Components(set) => set.contains(&change.component),
            };
            if matches && !sub.dirty {
                sub.dirty = true;
                tracing::trace!(
                    subscriber = %sub.label,
                    component = %change.component,
                    "subscription marked dirty"
                );
            }
        }
        // Coalesce per component: union the key sets.
        if let Some(existing) = self
            .pending
            .iter_mut()
            .find(|p| p.component == change.component)
        {
            for key in change.keys {
                if !existing.keys.contains(&key) {
                    existing.keys.push(key);
                }
            }
        } else {
            self.pending.push(change);
        }
    }

    /// Whether a subscription has observed a change since its last
    /// [`take_dirty`](Self::take_dirty).
    pub fn is_dirty(&self, id: SubscriptionId) -> bool {
        self.subs.get(id).is_some_and(|s| s.dirty)
    }

    /// Read and clear a subscription's dirty flag.
    pub fn take_dirty(&mut self, id: SubscriptionId) -> bool {
        match self.subs.get_mut(id) {
            Some(sub) => std::mem::replace(&mut sub.dirty, false),
            None => false,
        }
    }

    /// Whether any change is pending.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the coalesced pending changes.
    pub fn drain_pending(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.pending)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn change(component: &str, keys: &[&str]) -> StateChange {
        StateChange {
            component: component.to_owned(),
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    #[test]
    fn watched_subscription_goes_dirty() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe("expr:a", ["b".to_owned()]);
        bus.publish(change("b", &["value"]));
        assert!(bus.is_dirty(sub));
    }

    #[test]
    fn unwatched_component_does_not_dirty() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe("expr:a", ["b".to_owned()]);
        bus.publish(change("c", &["value"]));
        assert!(!bus.is_dirty(sub));
    }

    #[test]
    fn subscribe_all_sees_everything() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe_all("resolver");
        bus.publish(change("anything", &["k"]));
        assert!(bus.is_dirty(sub));
    }

    #[test]
    fn take_dirty_clears_flag() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe_all("resolver");
        bus.publish(change("a", &["k"]));
        assert!(bus.take_dirty(sub));
        assert!(!bus.is_dirty(sub));
        assert!(!bus.take_dirty(sub));
    }

    #[test]
    fn rewatch_changes_watch_set() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe("expr:a", ["b".to_owned()]);
        bus.rewatch(sub, ["c".to_owned()]);
        bus.publish(change("b", &["k"]));
        assert!(!bus.is_dirty(sub));
        bus.publish(change("c", &["k"]));
        assert!(bus.is_dirty(sub));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe_all("resolver");
        bus.unsubscribe(sub);
        bus.publish(change("a", &["k"]));
        assert!(!bus.is_dirty(sub));
        assert_eq!(bus.subscriber_count(), 0);
    }

    // ── Pending / coalescing ─────────────────────────────────────────

    #[test]
    fn empty_key_change_is_dropped() {
        let mut bus = MergeBus::new();
        let sub = bus.subscribe_all("resolver");
        bus.publish(change("a", &[]));
        assert!(!bus.is_dirty(sub));
        assert!(!bus.has_pending());
    }

    #[test]
    fn pending_coalesces_per_component() {
        let mut bus = MergeBus::new();
        bus.publish(change("a", &["x"]));
        bus.publish(change("a", &["y"]));
        bus.publish(change("a", &["x"]));
        bus.publish(change("b", &["z"]));
        let pending = bus.drain_pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0], change("a", &["x", "y"]));
        assert_eq!(pending[1], change("b", &["z"]));
    }

    #[test]
    fn drain_empties_pending() {
        let mut bus = MergeBus::new();
        bus.publish(change("a", &["x"]));
        assert!(bus.has_pending());
        let _ = bus.drain_pending();
        assert!(!bus.has_pending());
        assert!(bus.drain_pending().is_empty());
    }

    #[test]
    fn multiple_subscribers_all_marked() {
        let mut bus = MergeBus::new();
        let s1 = bus.subscribe("expr:x", ["a".to_owned()]);
        let s2 = bus.subscribe_all("resolver");
        bus.publish(change("a", &["k"]));
        assert!(bus.is_dirty(s1));
        assert!(bus.is_dirty(s2));
    }
}
