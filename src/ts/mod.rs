//! Tree-sitter C# grammar, used as an independent check on rewritten text.
//!
//! The engine's own parser never fails, so it cannot tell whether a
//! rewrite produced valid C#. The tree-sitter grammar from
//! `ast-grep-language` can: any `ERROR` or missing node it reports is a
//! syntax error.

pub mod errors;
pub mod parser;

pub use errors::TreeSitterError;
pub use parser::{CSharpParser, ErrorNode, ParsedSource};
