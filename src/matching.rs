//! Span matcher: how a selection relates to a declaration.
//!
//! Classification is purely syntactic. Header and body sub-spans come from
//! the typed views in [`crate::syntax::ast`].

use crate::syntax::ast::{AstNode, FileScopedNamespaceDecl, MethodDecl, NamespaceDecl, TypeDecl};
use crate::syntax::{SyntaxNode, SyntaxToken};
use crate::text::TextSpan;

/// Containment of a selection in a node, most specific first.
///
/// A caret on the name token is a separate relation, see [`empty_between`],
/// since the name always lies in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanMatch {
    /// Selection lies within the body sub-span.
    BodyContains,
    /// Selection lies within the header (signature) sub-span.
    HeaderContains,
    /// Selection lies within the node's span but in neither sub-span.
    FullyContains,
    NoMatch,
}

/// The header sub-span of a declaration, if the node kind has one.
pub fn header_span(node: &SyntaxNode) -> Option<TextSpan> {
    if let Some(method) = MethodDecl::cast(node.clone()) {
        return Some(method.header_span());
    }
    if let Some(ty) = TypeDecl::cast(node.clone()) {
        return Some(ty.header_span());
    }
    if let Some(ns) = NamespaceDecl::cast(node.clone()) {
        return Some(ns.header_span());
    }
    FileScopedNamespaceDecl::cast(node.clone()).map(|ns| ns.header_span())
}

/// The body sub-span of a declaration, if it has a body.
pub fn body_span(node: &SyntaxNode) -> Option<TextSpan> {
    if let Some(method) = MethodDecl::cast(node.clone()) {
        return method.body_span();
    }
    if let Some(ty) = TypeDecl::cast(node.clone()) {
        return ty.body_span();
    }
    NamespaceDecl::cast(node.clone()).and_then(|ns| ns.body_span())
}

/// The token naming a declaration.
pub fn name_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    if let Some(method) = MethodDecl::cast(node.clone()) {
        return method.identifier();
    }
    if let Some(ty) = TypeDecl::cast(node.clone()) {
        return ty.identifier();
    }
    let name = NamespaceDecl::cast(node.clone())
        .and_then(|ns| ns.name())
        .or_else(|| FileScopedNamespaceDecl::cast(node.clone()).and_then(|ns| ns.name()))?;
    name.last_token()
}

/// Selection within the node's span; surrounding trivia does not count.
pub fn fully_contains(node: &SyntaxNode, selection: TextSpan) -> bool {
    node.span().contains(selection)
}

pub fn header_contains(node: &SyntaxNode, selection: TextSpan) -> bool {
    header_span(node).is_some_and(|header| header.contains(selection))
}

pub fn body_contains(node: &SyntaxNode, selection: TextSpan) -> bool {
    body_span(node).is_some_and(|body| body.contains(selection))
}

/// Empty selection inside `span`, or touching its start or end.
pub fn is_empty_and_contained_in_span_or_between_spans(span: TextSpan, selection: TextSpan) -> bool {
    selection.is_empty() && span.start() <= selection.start() && selection.end() <= span.end()
}

/// The name token, when `selection` is empty and on it or on either edge.
pub fn empty_between(node: &SyntaxNode, selection: TextSpan) -> Option<SyntaxToken> {
    name_token(node)
        .filter(|token| is_empty_and_contained_in_span_or_between_spans(token.span(), selection))
}

/// Classify `selection` against `node`. A body match wins over a header
/// match.
pub fn classify(node: &SyntaxNode, selection: TextSpan) -> SpanMatch {
    if !fully_contains(node, selection) {
        return SpanMatch::NoMatch;
    }
    if body_contains(node, selection) {
        return SpanMatch::BodyContains;
    }
    if header_contains(node, selection) {
        return SpanMatch::HeaderContains;
    }
    SpanMatch::FullyContains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, SyntaxKind};

    const SRC: &str = "namespace App\n{\n    class C\n    {\n        public int Count(int x) { return x; }\n    }\n}\n";

    fn method() -> SyntaxNode {
        parse(SRC)
            .tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap()
    }

    fn at(needle: &str) -> usize {
        SRC.find(needle).unwrap()
    }

    #[test]
    fn header_selection_is_not_body() {
        let node = method();
        let selection = TextSpan::from_len(at("int x"), 3);
        assert_eq!(classify(&node, selection), SpanMatch::HeaderContains);
        assert!(header_contains(&node, selection));
        assert!(!body_contains(&node, selection));
    }

    #[test]
    fn body_selection() {
        let node = method();
        let selection = TextSpan::from_len(at("return"), 6);
        assert_eq!(classify(&node, selection), SpanMatch::BodyContains);
    }

    #[test]
    fn caret_on_either_edge_of_name() {
        let node = method();
        let start = at("Count");
        for offset in [start, start + 2, start + "Count".len()] {
            let caret = TextSpan::empty(offset);
            assert_eq!(empty_between(&node, caret).unwrap().text(), "Count");
            assert_eq!(classify(&node, caret), SpanMatch::HeaderContains);
        }
        assert!(empty_between(&node, TextSpan::empty(at("int x"))).is_none());
        assert!(empty_between(&node, TextSpan::from_len(start, 1)).is_none());
    }

    #[test]
    fn outside_selection_does_not_match() {
        let node = method();
        assert_eq!(classify(&node, TextSpan::from_len(0, 9)), SpanMatch::NoMatch);
    }

    #[test]
    fn non_empty_selection_is_not_between() {
        assert!(!is_empty_and_contained_in_span_or_between_spans(
            TextSpan::new(4, 9),
            TextSpan::new(4, 5)
        ));
        assert!(is_empty_and_contained_in_span_or_between_spans(
            TextSpan::new(4, 9),
            TextSpan::empty(9)
        ));
    }
}
