//! Syntax validation of rewritten documents.
//!
//! Before a rewritten document is written it is re-parsed with the
//! tree-sitter C# grammar. A rewrite may not add `ERROR` nodes that the
//! original did not have; files that were broken to begin with can still
//! be fixed as long as nothing new breaks.

use crate::ts::{CSharpParser, ErrorNode, ParsedSource, TreeSitterError};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("rewrite introduced {count} syntax error(s)")]
    ParseErrorIntroduced {
        count: usize,
        errors: Vec<ErrorLocation>,
    },

    #[error("tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),
}

/// Where a syntax error sits, with a little surrounding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub byte_start: usize,
    pub byte_end: usize,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub context: String,
}

impl ErrorLocation {
    fn new(node: &ErrorNode, source: &str) -> Self {
        let context_start = floor_boundary(source, node.byte_start.saturating_sub(20));
        let context_end = floor_boundary(source, (node.byte_end + 20).min(source.len()));
        Self {
            byte_start: node.byte_start,
            byte_end: node.byte_end,
            line: node.start_point.row + 1,
            column: node.start_point.column + 1,
            context: source[context_start..context_end].replace('\n', "\\n"),
        }
    }
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Parse validator owning its own parser.
pub struct ParseValidator {
    parser: CSharpParser,
}

impl ParseValidator {
    pub fn new() -> Result<Self, TreeSitterError> {
        Ok(Self {
            parser: CSharpParser::new()?,
        })
    }

    /// Fail when `source` has any syntax error.
    pub fn validate(&mut self, source: &str) -> Result<(), ValidationError> {
        let parsed = self.parser.parse_source(source)?;
        check_errors(&parsed, &HashSet::new())
    }

    /// Fail when `edited` has syntax errors that `original` did not have.
    pub fn validate_edit(&mut self, original: &str, edited: &str) -> Result<(), ValidationError> {
        let known = error_positions(&self.parser.parse_source(original)?);
        let parsed = self.parser.parse_source(edited)?;
        check_errors(&parsed, &known)
    }
}

/// The same checks using the thread-local parser pool.
pub mod pooled {
    use super::*;
    use crate::pool;

    pub fn validate(source: &str) -> Result<(), ValidationError> {
        pool::with_parser(|parser| {
            let parsed = parser.parse_source(source)?;
            check_errors(&parsed, &HashSet::new())
        })?
    }

    pub fn validate_edit(original: &str, edited: &str) -> Result<(), ValidationError> {
        pool::with_parser(|parser| {
            let known = error_positions(&parser.parse_source(original)?);
            let parsed = parser.parse_source(edited)?;
            check_errors(&parsed, &known)
        })?
    }
}

/// Errors keyed by their text, so an unchanged error at a shifted offset
/// is still recognized. Inserted tokens are keyed by the token kind.
fn error_positions(parsed: &ParsedSource<'_>) -> HashSet<String> {
    parsed
        .error_nodes()
        .iter()
        .map(|node| error_key(parsed.source, node))
        .collect()
}

fn error_key(source: &str, node: &ErrorNode) -> String {
    match node.missing {
        Some(kind) => format!("missing {kind}"),
        None => node.text(source).to_string(),
    }
}

fn check_errors(parsed: &ParsedSource<'_>, known: &HashSet<String>) -> Result<(), ValidationError> {
    let errors: Vec<ErrorLocation> = parsed
        .error_nodes()
        .iter()
        .filter(|node| !known.contains(&error_key(parsed.source, node)))
        .map(|node| ErrorLocation::new(node, parsed.source))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ParseErrorIntroduced {
            count: errors.len(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_source_passes() {
        let mut validator = ParseValidator::new().unwrap();
        assert!(validator
            .validate("namespace App\n{\n    class C { }\n}\n")
            .is_ok());
        assert!(pooled::validate("namespace App;\n\nclass C { }\n").is_ok());
    }

    #[test]
    fn broken_source_reports_location() {
        let mut validator = ParseValidator::new().unwrap();
        let err = validator.validate("class C\n{\n    void M( { }\n").unwrap_err();
        match err {
            ValidationError::ParseErrorIntroduced { count, errors } => {
                assert!(count >= 1);
                assert!(errors.iter().all(|e| e.line >= 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn new_missing_token_is_not_excused_by_old_one() {
        let original = "class C { void M() { int x = 1 } }\n";
        let edited = "class C { void M() { int x = 1 } }\nclass D { }\n";
        assert!(pooled::validate_edit(original, edited).is_ok());
        let broken = "class C { void M() { int x = 1 } }\nclass D { void N( { } }\n";
        assert!(pooled::validate_edit(original, broken).is_err());
    }

    #[test]
    fn only_new_errors_count() {
        let broken = "class C { void M( { } }\n";
        assert!(pooled::validate_edit(broken, broken).is_ok());
        let good = "class C { void M() { } }\n";
        assert!(pooled::validate_edit(good, broken).is_err());
    }
}
