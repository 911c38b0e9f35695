//! Red tree: cursors over the green tree that know absolute offsets and parents.

use super::green::{GreenElement, GreenNode, GreenToken, Trivia};
use super::kind::SyntaxKind;
use crate::text::TextSpan;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

struct NodeData {
    green: Arc<GreenNode>,
    offset: usize,
    parent: Option<SyntaxNode>,
    index: usize,
}

impl SyntaxNode {
    pub fn new_root(green: Arc<GreenNode>) -> Self {
        SyntaxNode(Arc::new(NodeData {
            green,
            offset: 0,
            parent: None,
            index: 0,
        }))
    }

    fn new_child(green: Arc<GreenNode>, offset: usize, parent: SyntaxNode, index: usize) -> Self {
        SyntaxNode(Arc::new(NodeData {
            green,
            offset,
            parent: Some(parent),
            index,
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.0.green
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        self.0.parent.clone()
    }

    /// Position of this node among its parent's children (tokens included).
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn full_span(&self) -> TextSpan {
        TextSpan::from_len(self.0.offset, self.0.green.width())
    }

    /// Span without the first token's leading and the last token's trailing trivia.
    pub fn span(&self) -> TextSpan {
        let full = self.full_span();
        match (self.0.green.first_token(), self.0.green.last_token()) {
            (Some(first), Some(last)) => {
                let start = full.start() + first.leading_width();
                let end = full.end() - last.trailing_width();
                TextSpan::new(start, end.max(start))
            }
            _ => TextSpan::empty(full.start()),
        }
    }

    pub fn children_with_tokens(&self) -> Vec<SyntaxElement> {
        let mut offset = self.0.offset;
        let mut out = Vec::with_capacity(self.0.green.children().len());
        for (index, child) in self.0.green.children().iter().enumerate() {
            let element = match child {
                GreenElement::Node(node) => SyntaxElement::Node(SyntaxNode::new_child(
                    node.clone(),
                    offset,
                    self.clone(),
                    index,
                )),
                GreenElement::Token(token) => SyntaxElement::Token(SyntaxToken {
                    green: token.clone(),
                    offset,
                    parent: self.clone(),
                    index,
                }),
            };
            offset += child.width();
            out.push(element);
        }
        out
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> {
        self.children_with_tokens()
            .into_iter()
            .filter_map(SyntaxElement::into_node)
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken> {
        self.children_with_tokens()
            .into_iter()
            .filter_map(SyntaxElement::into_token)
    }

    pub fn first_child_token(&self, kind: SyntaxKind) -> Option<SyntaxToken> {
        self.child_tokens().find(|t| t.kind() == kind)
    }

    pub fn first_child(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.children().find(|n| n.kind() == kind)
    }

    /// This node and every node below it, in preorder.
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let children: Vec<_> = node.children().collect();
            out.push(node);
            stack.extend(children.into_iter().rev());
        }
        out.into_iter()
    }

    /// Every token below this node, in document order.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<SyntaxToken>) {
        for element in self.children_with_tokens() {
            match element {
                SyntaxElement::Node(node) => node.collect_tokens(out),
                SyntaxElement::Token(token) => out.push(token),
            }
        }
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .into_iter()
            .find_map(|element| match element {
                SyntaxElement::Token(token) => Some(token),
                SyntaxElement::Node(node) => node.first_token(),
            })
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .into_iter()
            .rev()
            .find_map(|element| match element {
                SyntaxElement::Token(token) => Some(token),
                SyntaxElement::Node(node) => node.last_token(),
            })
    }

    /// This node followed by its parent chain up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        std::iter::successors(Some(self.clone()), SyntaxNode::parent)
    }

    pub fn root(&self) -> SyntaxNode {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    /// Elements of the parent that come after this node.
    pub fn following_siblings(&self) -> Vec<SyntaxElement> {
        match self.parent() {
            Some(parent) => parent
                .children_with_tokens()
                .into_iter()
                .skip(self.index() + 1)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.0.green.to_string()
    }

    /// Produce a new root in which this node's green is replaced by `replacement`.
    ///
    /// Only the ancestors of this node are rebuilt.
    pub fn replace_with(&self, replacement: Arc<GreenNode>) -> Arc<GreenNode> {
        let mut green = replacement;
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            green = Arc::new(
                parent
                    .green()
                    .replace_child(node.index(), GreenElement::Node(green)),
            );
            node = parent;
        }
        green
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0.green, &other.0.green) && self.0.offset == other.0.offset
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.kind(), self.span())
    }
}

#[derive(Clone)]
pub struct SyntaxToken {
    green: Arc<GreenToken>,
    offset: usize,
    parent: SyntaxNode,
    index: usize,
}

impl SyntaxToken {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn green(&self) -> &Arc<GreenToken> {
        &self.green
    }

    pub fn leading(&self) -> &[Trivia] {
        self.green.leading()
    }

    pub fn trailing(&self) -> &[Trivia] {
        self.green.trailing()
    }

    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn full_span(&self) -> TextSpan {
        TextSpan::from_len(self.offset, self.green.width())
    }

    pub fn span(&self) -> TextSpan {
        TextSpan::from_len(self.offset + self.green.leading_width(), self.green.text().len())
    }

    /// Produce a new root in which this token is replaced by `replacement`.
    pub fn replace_with(&self, replacement: GreenToken) -> Arc<GreenNode> {
        let parent = self
            .parent
            .green()
            .replace_child(self.index, GreenElement::from(replacement));
        self.parent.replace_with(Arc::new(parent))
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.green, &other.green) && self.offset == other.offset
    }
}

impl Eq for SyntaxToken {}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind(), self.span(), self.text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxElement::Node(node) => node.kind(),
            SyntaxElement::Token(token) => token.kind(),
        }
    }

    pub fn full_span(&self) -> TextSpan {
        match self {
            SyntaxElement::Node(node) => node.full_span(),
            SyntaxElement::Token(token) => token.full_span(),
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            SyntaxElement::Node(node) => node.span(),
            SyntaxElement::Token(token) => token.span(),
        }
    }

    pub fn green(&self) -> GreenElement {
        match self {
            SyntaxElement::Node(node) => GreenElement::Node(node.green().clone()),
            SyntaxElement::Token(token) => GreenElement::Token(token.green().clone()),
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }

    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}
