use crate::cancel::Cancelled;
use crate::rewrite::RewriteError;
use crate::semantics::SemanticError;
use crate::solution::DocumentId;
use thiserror::Error;

/// Failure of a single code action invocation. The input solution is
/// never affected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("document {0} is not part of the solution")]
    UnknownDocument(DocumentId),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Semantic(SemanticError),
}

impl From<Cancelled> for ActionError {
    fn from(_: Cancelled) -> Self {
        ActionError::Cancelled
    }
}

impl From<SemanticError> for ActionError {
    fn from(error: SemanticError) -> Self {
        match error {
            SemanticError::Cancelled => ActionError::Cancelled,
            other => ActionError::Semantic(other),
        }
    }
}
