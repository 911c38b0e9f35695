use crate::text::TextSpan;
use thiserror::Error;

/// A recoverable problem found while parsing. The tree is still produced
/// and still reproduces the input text exactly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    pub message: String,
    pub span: TextSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: TextSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
