//! Refactoring rules and the registry that collects their actions.
//!
//! Rules are independent values behind the [`Refactoring`] trait. For a
//! selection the registry walks the enclosing nodes innermost first and
//! asks each enabled rule, in registration order, for an action. Actions
//! are deferred: nothing is rewritten until [`CodeAction::invoke`].

pub mod action;
pub mod body;
pub mod context;
pub mod errors;
pub mod ids;
pub mod registry;
pub mod rules;

pub use action::CodeAction;
pub use context::RefactoringContext;
pub use errors::ActionError;
pub use ids::{RefactoringId, UnknownRefactoring};
pub use registry::{collect_actions, Registry};
pub use rules::{AncestorPolicy, Refactoring, SpanRequirement};
