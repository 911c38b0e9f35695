//! Tree rewriter.
//!
//! Every operation takes a tree plus a node that was obtained from it,
//! checks that the node is still there, and returns a new tree. Nothing is
//! mutated: untouched subtrees are shared with the input by `Arc`.
//!
//! Whitespace around rewritten nodes is re-derived from the surrounding
//! code. Comments and directives are never dropped silently; when their
//! anchor token disappears they move to a neighbouring token.

pub mod errors;
pub mod members;
pub mod namespace;
pub mod property;
pub mod rename;

pub use errors::RewriteError;
pub use members::{
    insert_documentation, insert_modifier, remove_modifier, replace_block_with_expression_body,
    replace_body_with_semicolon, replace_type,
};
pub use namespace::{demote_to_flat, promote_to_wrapper};
pub use property::{method_to_property, remove_empty_argument_lists};
pub use rename::rename_tokens;

use crate::syntax::{GreenElement, GreenNode, GreenToken, SyntaxKind, SyntaxNode, SyntaxTree, Trivia, TriviaKind};
use std::sync::Arc;

/// Fail with [`RewriteError::Stale`] unless `node` is still part of `tree`.
pub(crate) fn ensure_present(tree: &SyntaxTree, node: &SyntaxNode) -> Result<(), RewriteError> {
    if tree.contains_node(node) {
        Ok(())
    } else {
        Err(RewriteError::Stale {
            kind: node.kind(),
            span: node.span(),
        })
    }
}

pub(crate) fn ensure_kind(node: &SyntaxNode, expected: SyntaxKind) -> Result<(), RewriteError> {
    if node.kind() == expected {
        Ok(())
    } else {
        Err(RewriteError::UnexpectedKind {
            expected,
            found: node.kind(),
        })
    }
}

/// Line terminator used by `text`.
pub(crate) fn detect_eol(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// One level of indentation as used by `text`: a tab, or the width of the
/// first indented line.
pub(crate) fn detect_indent(text: &str) -> String {
    for line in text.lines() {
        let content = line.trim_start_matches([' ', '\t']);
        if content.is_empty() || content.starts_with('#') || content.len() == line.len() {
            continue;
        }
        let indent = &line[..line.len() - content.len()];
        if indent.starts_with('\t') {
            return "\t".to_string();
        }
        if indent.len() <= 8 {
            return indent.to_string();
        }
    }
    "    ".to_string()
}

/// Comments and directives in `trivia`.
pub(crate) fn significant(trivia: &[Trivia]) -> Vec<Trivia> {
    trivia
        .iter()
        .filter(|t| t.kind().is_significant())
        .cloned()
        .collect()
}

/// Each trivia on a line of its own.
pub(crate) fn as_lines(trivia: &[Trivia], eol: &str) -> Vec<Trivia> {
    trivia
        .iter()
        .flat_map(|t| [t.clone(), Trivia::end_of_line(eol)])
        .collect()
}

/// Whitespace after the last line break of `leading`: the indentation of
/// the line a token starts.
pub(crate) fn line_indent(leading: &[Trivia]) -> String {
    let start = leading
        .iter()
        .rposition(|t| t.kind() == TriviaKind::EndOfLine)
        .map(|i| i + 1)
        .unwrap_or(0);
    leading[start..]
        .iter()
        .filter(|t| t.kind() == TriviaKind::Whitespace)
        .map(Trivia::text)
        .collect()
}

/// `indent` as leading trivia; nothing at column zero.
pub(crate) fn indentation(indent: &str) -> Vec<Trivia> {
    if indent.is_empty() {
        Vec::new()
    } else {
        vec![Trivia::whitespace(indent)]
    }
}

pub(crate) fn ends_with_eol(trivia: &[Trivia]) -> bool {
    trivia
        .last()
        .is_some_and(|t| t.kind() == TriviaKind::EndOfLine)
}

/// Drop blank lines and indentation before the first comment or directive.
pub(crate) fn trim_leading_blank_lines(trivia: &[Trivia]) -> Vec<Trivia> {
    let first_significant = trivia.iter().position(|t| t.kind().is_significant());
    match first_significant {
        Some(index) => {
            // Keep the indentation of the comment's own line.
            let line_start = trivia[..index]
                .iter()
                .rposition(|t| t.kind() == TriviaKind::EndOfLine)
                .map(|i| i + 1)
                .unwrap_or(0);
            trivia[line_start..].to_vec()
        }
        None => trivia
            .iter()
            .rposition(|t| t.kind() == TriviaKind::EndOfLine)
            .map(|i| trivia[i + 1..].to_vec())
            .unwrap_or_else(|| trivia.to_vec()),
    }
}

/// Drop whitespace and blank lines after the last comment or directive.
pub(crate) fn trim_trailing_blank_lines(trivia: &[Trivia], eol: &str) -> Vec<Trivia> {
    match trivia.iter().rposition(|t| t.kind().is_significant()) {
        Some(index) => {
            let mut out = trivia[..=index].to_vec();
            out.push(Trivia::end_of_line(eol));
            out
        }
        None => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Reindent<'a> {
    Indent(&'a str),
    Dedent(&'a str),
}

impl Reindent<'_> {
    fn leading(&self, trivia: &[Trivia], mut line_start: bool) -> Vec<Trivia> {
        let mut out = Vec::with_capacity(trivia.len() + 1);
        for (i, t) in trivia.iter().enumerate() {
            if line_start {
                match (self, t.kind()) {
                    (Reindent::Dedent(unit), TriviaKind::Whitespace) => {
                        let rest = dedent(t.text(), unit);
                        if !rest.is_empty() {
                            out.push(Trivia::whitespace(rest));
                        }
                    }
                    (Reindent::Indent(unit), TriviaKind::Whitespace) => {
                        let next = trivia.get(i + 1).map(Trivia::kind);
                        if matches!(next, Some(TriviaKind::Directive | TriviaKind::EndOfLine)) {
                            out.push(t.clone());
                        } else {
                            out.push(Trivia::whitespace(format!("{unit}{}", t.text())));
                        }
                    }
                    (Reindent::Indent(unit), kind) if kind.is_comment() => {
                        out.push(Trivia::whitespace(*unit));
                        out.push(t.clone());
                    }
                    _ => out.push(t.clone()),
                }
            } else {
                out.push(t.clone());
            }
            line_start = t.kind() == TriviaKind::EndOfLine;
        }
        if line_start {
            if let Reindent::Indent(unit) = self {
                out.push(Trivia::whitespace(*unit));
            }
        }
        out
    }

    /// Re-indent every line that starts inside `element`. `line_start` says
    /// whether the element's first token begins a line.
    pub(crate) fn apply(&self, element: &GreenElement, line_start: &mut bool) -> GreenElement {
        match element {
            GreenElement::Token(token) => {
                let leading = self.leading(token.leading(), *line_start);
                *line_start = ends_with_eol(token.trailing());
                GreenElement::Token(Arc::new(token.with_leading(leading)))
            }
            GreenElement::Node(node) => {
                let children = node
                    .children()
                    .iter()
                    .map(|child| self.apply(child, line_start))
                    .collect();
                let mut rebuilt = GreenNode::new(node.kind(), children);
                for annotation in node.annotations() {
                    rebuilt = rebuilt.with_annotation(*annotation);
                }
                GreenElement::Node(Arc::new(rebuilt))
            }
        }
    }
}

fn dedent(text: &str, unit: &str) -> String {
    if let Some(rest) = text.strip_prefix(unit) {
        return rest.to_string();
    }
    if unit.starts_with(text) {
        return String::new();
    }
    text.to_string()
}

/// `element` with the leading trivia of its first token replaced.
pub(crate) fn with_first_leading(element: &GreenElement, leading: Vec<Trivia>) -> GreenElement {
    element.map_first_token(|t| t.with_leading(leading))
}

/// `element` with the trailing trivia of its last token replaced.
pub(crate) fn with_last_trailing(element: &GreenElement, trailing: Vec<Trivia>) -> GreenElement {
    element.map_last_token(|t| t.with_trailing(trailing))
}

pub(crate) fn first_leading(element: &GreenElement) -> Vec<Trivia> {
    element
        .first_token()
        .map(|t| t.leading().to_vec())
        .unwrap_or_default()
}

pub(crate) fn last_trailing(element: &GreenElement) -> Vec<Trivia> {
    element
        .last_token()
        .map(|t| t.trailing().to_vec())
        .unwrap_or_default()
}

pub(crate) fn token(kind: SyntaxKind, text: &str, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> GreenElement {
    GreenElement::from(GreenToken::new(kind, text, leading, trailing))
}
