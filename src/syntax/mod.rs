//! Lossless C# syntax trees.
//!
//! Every byte of the input, including whitespace, comments and
//! preprocessor lines, is owned by exactly one token's trivia, so
//! `parse(text).tree.text() == text` always holds and rewrites can move
//! trivia around explicitly instead of losing it.

pub mod ast;
pub mod errors;
pub mod green;
pub mod kind;
pub mod lexer;
pub mod node;
pub mod parser;

pub use errors::SyntaxError;
pub use green::{Annotation, GreenElement, GreenNode, GreenToken, Trivia};
pub use kind::{SyntaxKind, TriviaKind};
pub use node::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use parser::{parse, Parse};

use crate::text::{LineIndex, TextSpan};
use std::fmt;
use std::sync::Arc;

/// An immutable syntax tree together with its text.
#[derive(Clone)]
pub struct SyntaxTree {
    root: SyntaxNode,
    text: Arc<str>,
}

impl SyntaxTree {
    pub fn new(root: Arc<GreenNode>) -> Self {
        let text: Arc<str> = Arc::from(root.to_string());
        Self {
            root: SyntaxNode::new_root(root),
            text,
        }
    }

    pub fn root(&self) -> SyntaxNode {
        self.root.clone()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }

    /// The chain of nodes whose full span contains `selection`, innermost first.
    ///
    /// A caret sitting exactly between two siblings belongs to the one that
    /// starts there.
    pub fn nodes_at(&self, selection: TextSpan) -> Vec<SyntaxNode> {
        let mut chain = Vec::new();
        if !self.root.full_span().contains(selection) {
            return chain;
        }
        let mut current = self.root.clone();
        loop {
            let next = if selection.is_empty() {
                let offset = selection.start();
                let elements: Vec<_> = current.children_with_tokens().into_iter().collect();
                match elements.iter().find(|e| e.full_span().contains_offset(offset)) {
                    Some(SyntaxElement::Node(child)) => Some(child.clone()),
                    // The caret is on a token of `current` itself.
                    Some(SyntaxElement::Token(_)) => None,
                    // Only at the end of `current`: the child ending there.
                    None => elements.iter().rev().find_map(|e| match e {
                        SyntaxElement::Node(child) if child.full_span().end() == offset => {
                            Some(child.clone())
                        }
                        _ => None,
                    }),
                }
            } else {
                current
                    .children()
                    .find(|c| c.full_span().contains(selection))
            };
            chain.push(current);
            match next {
                Some(child) => current = child,
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// The token whose full span contains `offset`.
    pub fn token_at_offset(&self, offset: usize) -> Option<SyntaxToken> {
        let mut node = self.root.clone();
        loop {
            let element = node
                .children_with_tokens()
                .into_iter()
                .find(|e| e.full_span().contains_offset(offset))?;
            match element {
                SyntaxElement::Token(token) => return Some(token),
                SyntaxElement::Node(child) => node = child,
            }
        }
    }

    /// Locate the node of `kind` whose span is exactly `span`.
    pub fn find_node(&self, span: TextSpan, kind: SyntaxKind) -> Option<SyntaxNode> {
        let mut candidates = vec![self.root.clone()];
        while let Some(node) = candidates.pop() {
            if node.kind() == kind && node.span() == span {
                return Some(node);
            }
            candidates.extend(node.children().filter(|c| c.full_span().contains(span)));
        }
        None
    }

    /// True when `node` (taken from any tree) is present in this tree
    /// unchanged at the same position.
    pub fn contains_node(&self, node: &SyntaxNode) -> bool {
        self.find_node(node.span(), node.kind())
            .map(|found| found.full_span() == node.full_span() && found.green() == node.green())
            .unwrap_or(false)
    }

    pub fn with_root(&self, root: Arc<GreenNode>) -> SyntaxTree {
        SyntaxTree::new(root)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.root)
            .field("len", &self.text.len())
            .finish()
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.root.green() == other.root.green()
    }
}

impl Eq for SyntaxTree {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_at_is_innermost_first() {
        let src = "namespace N\n{\n    class C\n    {\n        void M() { }\n    }\n}\n";
        let tree = parse(src).tree;
        let offset = src.find("M()").unwrap();
        let chain: Vec<_> = tree
            .nodes_at(TextSpan::empty(offset))
            .iter()
            .map(|n| n.kind())
            .collect();
        assert_eq!(
            chain,
            vec![
                SyntaxKind::MethodDeclaration,
                SyntaxKind::ClassDeclaration,
                SyntaxKind::NamespaceDeclaration,
                SyntaxKind::CompilationUnit
            ]
        );
    }

    #[test]
    fn caret_at_end_of_file_reaches_root() {
        let src = "class C { }";
        let tree = parse(src).tree;
        let chain = tree.nodes_at(TextSpan::empty(src.len()));
        assert_eq!(chain.last().unwrap().kind(), SyntaxKind::CompilationUnit);
    }

    #[test]
    fn find_node_by_span() {
        let src = "namespace N { class C { } }";
        let tree = parse(src).tree;
        let class = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ClassDeclaration)
            .unwrap();
        assert_eq!(class.span(), TextSpan::new(14, 25));
        let found = tree.find_node(class.span(), SyntaxKind::ClassDeclaration).unwrap();
        assert_eq!(found, class);
        assert!(tree.contains_node(&class));

        let other = parse("namespace N { class D { } }").tree;
        assert!(!other.contains_node(&class));
    }

    #[test]
    fn token_at_offset_finds_identifier() {
        let src = "class Widget { }";
        let tree = parse(src).tree;
        let token = tree.token_at_offset(8).unwrap();
        assert_eq!(token.kind(), SyntaxKind::Identifier);
        assert_eq!(token.text(), "Widget");
    }
}
