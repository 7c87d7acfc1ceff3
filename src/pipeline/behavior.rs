//! Behavior traits implemented by registry entries.
//!
//! Components and traits plug their logic in through these two object-safe
//! traits. Plain closures of the matching shape implement them too, which
//! keeps builtin definitions and test doubles terse.

use super::context::Ctx;
use super::result::{RenderProps, TraitResult};

/// A runtime error raised by a behavior while it runs. Distinct from schema
/// violations, which are caught before the behavior is invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BehaviorError {
    /// A property the behavior needs was absent.
    #[error("missing required property `{key}`")]
    MissingProperty { key: String },

    /// A property was present but unusable.
    #[error("bad property `{key}`: {message}")]
    BadProperty { key: String, message: String },

    /// Any other behavior failure.
    #[error("{0}")]
    Failed(String),
}

impl BehaviorError {
    /// Shorthand for [`BehaviorError::MissingProperty`].
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingProperty { key: key.into() }
    }

    /// Shorthand for [`BehaviorError::BadProperty`].
    pub fn bad(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadProperty {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`BehaviorError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// The logic behind a registered component type: turn evaluated properties
/// and state into base render props.
pub trait ComponentBehavior: Send + Sync {
    fn run(&self, ctx: &mut Ctx<'_>) -> Result<RenderProps, BehaviorError>;
}

impl<F> ComponentBehavior for F
where
    F: Fn(&mut Ctx<'_>) -> Result<RenderProps, BehaviorError> + Send + Sync,
{
    fn run(&self, ctx: &mut Ctx<'_>) -> Result<RenderProps, BehaviorError> {
        self(ctx)
    }
}

/// The logic behind a registered trait type: executed after the component
/// behavior, contributing an optional props overlay.
pub trait TraitBehavior: Send + Sync {
    fn execute(&self, ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError>;
}

impl<F> TraitBehavior for F
where
    F: Fn(&mut Ctx<'_>) -> Result<TraitResult, BehaviorError> + Send + Sync,
{
    fn execute(&self, ctx: &mut Ctx<'_>) -> Result<TraitResult, BehaviorError> {
        self(ctx)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
