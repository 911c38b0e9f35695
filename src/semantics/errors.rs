use crate::cancel::Cancelled;
use crate::solution::DocumentId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("document {0} is not part of the solution")]
    UnknownDocument(DocumentId),

    #[error("symbol '{0}' is not declared in the solution")]
    UnknownSymbol(String),

    #[error("references to '{name}' are ambiguous: {count} overloads share the name")]
    AmbiguousReferences { name: String, count: usize },

    #[error("semantic query failed: {0}")]
    Other(String),
}

impl From<Cancelled> for SemanticError {
    fn from(_: Cancelled) -> Self {
        SemanticError::Cancelled
    }
}
