//! Immutable green tree: position-independent nodes shared by `Arc`.
//!
//! Green elements know their kind, children and text width but not their
//! absolute offset, so an edit only rebuilds the spine from the edited node
//! to the root while every untouched sibling is reused as-is.

use super::kind::{SyntaxKind, TriviaKind};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// One piece of trivia: whitespace, a newline, a comment or a directive line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    kind: TriviaKind,
    text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Whitespace, text)
    }

    pub fn end_of_line(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::EndOfLine, text)
    }

    pub fn kind(&self) -> TriviaKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub(crate) fn trivia_width(trivia: &[Trivia]) -> usize {
    trivia.iter().map(Trivia::len).sum()
}

/// A token with its leading and trailing trivia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GreenToken {
    kind: SyntaxKind,
    text: String,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
}

impl GreenToken {
    pub fn new(
        kind: SyntaxKind,
        text: impl Into<String>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            leading,
            trailing,
        }
    }

    /// A token without trivia.
    pub fn bare(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, Vec::new(), Vec::new())
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading(&self) -> &[Trivia] {
        &self.leading
    }

    pub fn trailing(&self) -> &[Trivia] {
        &self.trailing
    }

    pub fn leading_width(&self) -> usize {
        trivia_width(&self.leading)
    }

    pub fn trailing_width(&self) -> usize {
        trivia_width(&self.trailing)
    }

    pub fn width(&self) -> usize {
        self.leading_width() + self.text.len() + self.trailing_width()
    }

    pub fn with_leading(&self, leading: Vec<Trivia>) -> GreenToken {
        GreenToken {
            leading,
            ..self.clone()
        }
    }

    pub fn with_trailing(&self, trailing: Vec<Trivia>) -> GreenToken {
        GreenToken {
            trailing,
            ..self.clone()
        }
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        for trivia in &self.leading {
            out.push_str(trivia.text());
        }
        out.push_str(&self.text);
        for trivia in &self.trailing {
            out.push_str(trivia.text());
        }
    }
}

/// Markers attached to nodes produced by a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// The node was synthesized and may be reformatted by a downstream formatter.
    Formatter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GreenElement {
    Node(Arc<GreenNode>),
    Token(Arc<GreenToken>),
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(node) => node.kind(),
            GreenElement::Token(token) => token.kind(),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            GreenElement::Node(node) => node.width(),
            GreenElement::Token(token) => token.width(),
        }
    }

    pub fn as_node(&self) -> Option<&Arc<GreenNode>> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Arc<GreenToken>> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(_) => None,
        }
    }

    pub fn first_token(&self) -> Option<&Arc<GreenToken>> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(node) => node.first_token(),
        }
    }

    pub fn last_token(&self) -> Option<&Arc<GreenToken>> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(node) => node.last_token(),
        }
    }

    /// Rebuild this element with its first token replaced by `f(first)`.
    pub fn map_first_token<F>(&self, f: F) -> GreenElement
    where
        F: FnOnce(&GreenToken) -> GreenToken,
    {
        match self {
            GreenElement::Token(token) => GreenElement::Token(Arc::new(f(token))),
            GreenElement::Node(node) => {
                match node.children.iter().position(|c| c.first_token().is_some()) {
                    Some(index) => {
                        let child = node.children[index].map_first_token(f);
                        GreenElement::Node(Arc::new(node.replace_child(index, child)))
                    }
                    None => self.clone(),
                }
            }
        }
    }

    /// Rebuild this element with its last token replaced by `f(last)`.
    pub fn map_last_token<F>(&self, f: F) -> GreenElement
    where
        F: FnOnce(&GreenToken) -> GreenToken,
    {
        match self {
            GreenElement::Token(token) => GreenElement::Token(Arc::new(f(token))),
            GreenElement::Node(node) => {
                match node.children.iter().rposition(|c| c.last_token().is_some()) {
                    Some(index) => {
                        let child = node.children[index].map_last_token(f);
                        GreenElement::Node(Arc::new(node.replace_child(index, child)))
                    }
                    None => self.clone(),
                }
            }
        }
    }

    /// Visit every token in document order.
    pub fn for_each_token(&self, f: &mut dyn FnMut(&GreenToken)) {
        match self {
            GreenElement::Token(token) => f(token),
            GreenElement::Node(node) => {
                for child in &node.children {
                    child.for_each_token(f);
                }
            }
        }
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            GreenElement::Node(node) => node.write_to(out),
            GreenElement::Token(token) => token.write_to(out),
        }
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(Arc::new(token))
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(Arc::new(node))
    }
}

/// An interior node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GreenNode {
    kind: SyntaxKind,
    children: Vec<GreenElement>,
    width: usize,
    annotations: Vec<Annotation>,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let width = children.iter().map(GreenElement::width).sum();
        Self {
            kind,
            children,
            width,
            annotations: Vec::new(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn has_annotation(&self, annotation: Annotation) -> bool {
        self.annotations.contains(&annotation)
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> GreenNode {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    pub fn first_token(&self) -> Option<&Arc<GreenToken>> {
        self.children.iter().find_map(GreenElement::first_token)
    }

    pub fn last_token(&self) -> Option<&Arc<GreenToken>> {
        self.children.iter().rev().find_map(GreenElement::last_token)
    }

    /// A copy of this node with child `index` replaced.
    pub fn replace_child(&self, index: usize, child: GreenElement) -> GreenNode {
        self.splice_children(index..index + 1, vec![child])
    }

    /// A copy of this node with `range` of its children replaced by `replacement`.
    /// Annotations are kept.
    pub fn splice_children(&self, range: Range<usize>, replacement: Vec<GreenElement>) -> GreenNode {
        let mut children = self.children.clone();
        children.splice(range, replacement);
        GreenNode {
            annotations: self.annotations.clone(),
            ..GreenNode::new(self.kind, children)
        }
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        for child in &self.children {
            child.write_to(out);
        }
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.width);
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

/// Marks a position in the builder so a node can later be opened around
/// everything pushed after it, or the pushes can be discarded.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    children: usize,
    depth: usize,
}

/// Bottom-up builder used by the parser.
#[derive(Debug, Default)]
pub struct GreenBuilder {
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<GreenElement>,
}

impl GreenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    pub fn token(&mut self, token: Arc<GreenToken>) {
        self.children.push(GreenElement::Token(token));
    }

    pub fn finish_node(&mut self) {
        if let Some((kind, first)) = self.parents.pop() {
            let children = self.children.split_off(first);
            self.children
                .push(GreenElement::Node(Arc::new(GreenNode::new(kind, children))));
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            children: self.children.len(),
            depth: self.parents.len(),
        }
    }

    /// Open a node whose first child is whatever was pushed at `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        debug_assert_eq!(checkpoint.depth, self.parents.len());
        self.parents.push((kind, checkpoint.children));
    }

    /// Drop everything pushed since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.parents.truncate(checkpoint.depth);
        self.children.truncate(checkpoint.children);
    }

    /// Close any open nodes and return the root.
    pub fn finish(mut self) -> Arc<GreenNode> {
        while !self.parents.is_empty() {
            self.finish_node();
        }
        if self.children.len() == 1 {
            if let Some(GreenElement::Node(root)) = self.children.pop() {
                return root;
            }
        }
        Arc::new(GreenNode::new(SyntaxKind::CompilationUnit, self.children))
    }
}
