use crate::syntax::SyntaxKind;
use crate::text::TextSpan;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("expected {expected:?}, found {found:?}")]
    UnexpectedKind {
        expected: SyntaxKind,
        found: SyntaxKind,
    },

    #[error("{kind:?} at {span} is no longer present in the tree")]
    Stale { kind: SyntaxKind, span: TextSpan },

    #[error("cannot rewrite: {0}")]
    Precondition(String),

    #[error("malformed {0:?}: missing {1}")]
    Malformed(SyntaxKind, &'static str),
}

impl RewriteError {
    pub fn precondition(message: impl Into<String>) -> Self {
        RewriteError::Precondition(message.into())
    }
}
