//! Component state: per-instance cells, the merge bus, callable methods.
//!
//! - [`store`] — one mergeable JSON-object cell per component instance
//! - [`bus`] — explicit observer registry notified on every real change
//! - [`methods`] — `(component, method)` table backing callback dispatch

pub mod bus;
pub mod methods;
pub mod store;

pub use bus::{MergeBus, StateChange, SubscriptionId};
pub use methods::{MethodError, MethodFn, MethodRegistry, StateScope};
pub use store::StateStore;
