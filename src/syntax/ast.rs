//! Typed views over red nodes.

use super::kind::SyntaxKind;
use super::node::{SyntaxElement, SyntaxNode, SyntaxToken};
use crate::text::TextSpan;

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($name:ident, $($kind:ident)|+) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| $name(node))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(CompilationUnit, CompilationUnit);
ast_node!(NamespaceDecl, NamespaceDeclaration);
ast_node!(FileScopedNamespaceDecl, FileScopedNamespaceDeclaration);
ast_node!(
    TypeDecl,
    ClassDeclaration | StructDeclaration | InterfaceDeclaration | RecordDeclaration | EnumDeclaration
);
ast_node!(MethodDecl, MethodDeclaration);

fn is_header_node(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::AttributeList
            | SyntaxKind::TypeParameterList
            | SyntaxKind::ParameterList
            | SyntaxKind::BaseList
            | SyntaxKind::ConstraintClause
            | SyntaxKind::EnumBody
    )
}

/// Text of a name or type without surrounding trivia.
pub fn trimmed_text(node: &SyntaxNode) -> String {
    node.text().trim().to_string()
}

/// Concatenated token text with all trivia dropped: `A.B<C>` for `A . B< C >`.
pub fn token_text(node: &SyntaxNode) -> String {
    node.tokens().iter().map(|t| t.text()).collect()
}

/// Rightmost identifier of a name: `Task` for `System.Threading.Tasks.Task<T>`.
pub fn simple_name(node: &SyntaxNode) -> Option<SyntaxToken> {
    match node.kind() {
        SyntaxKind::IdentifierName | SyntaxKind::GenericName => node
            .child_tokens()
            .find(|t| t.kind().is_identifier_like()),
        SyntaxKind::QualifiedName => node.children().last().and_then(|n| simple_name(&n)),
        _ => None,
    }
}

pub fn is_void_type(node: &SyntaxNode) -> bool {
    node.kind() == SyntaxKind::PredefinedType
        && node
            .child_tokens()
            .any(|t| t.kind() == SyntaxKind::VoidKeyword)
}

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::UsingDirective)
    }

    /// Top-level declarations: everything but directives and global attributes.
    pub fn members(&self) -> Vec<SyntaxNode> {
        self.0
            .children()
            .filter(|n| {
                !matches!(
                    n.kind(),
                    SyntaxKind::UsingDirective
                        | SyntaxKind::ExternAliasDirective
                        | SyntaxKind::AttributeList
                )
            })
            .collect()
    }

    /// Every namespace declaration in the unit, outermost first.
    pub fn namespaces(&self) -> Vec<SyntaxNode> {
        self.0
            .descendants()
            .filter(|n| n.kind().is_namespace_declaration())
            .collect()
    }

    pub fn end_of_file(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::EndOfFile)
    }
}

impl NamespaceDecl {
    pub fn namespace_keyword(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::NamespaceKeyword)
    }

    pub fn name(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_name())
    }

    pub fn open_brace(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::OpenBrace)
    }

    pub fn close_brace(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::CloseBrace)
    }

    /// The optional `;` after the closing brace.
    pub fn semicolon(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::Semicolon)
    }

    /// Directives and declarations between the braces.
    pub fn members(&self) -> Vec<SyntaxNode> {
        self.0.children().filter(|n| !n.kind().is_name()).collect()
    }

    /// Elements between the braces, tokens included (stray tokens of
    /// malformed input end up here too).
    pub fn body_elements(&self) -> Vec<SyntaxElement> {
        let elements = self.0.children_with_tokens();
        let open = elements
            .iter()
            .position(|e| e.kind() == SyntaxKind::OpenBrace);
        let close = elements
            .iter()
            .rposition(|e| e.kind() == SyntaxKind::CloseBrace);
        match (open, close) {
            (Some(open), Some(close)) if open < close => elements[open + 1..close].to_vec(),
            _ => Vec::new(),
        }
    }

    /// From the `namespace` keyword to the end of the name.
    pub fn header_span(&self) -> TextSpan {
        let start = self.0.span().start();
        let end = self
            .name()
            .map(|n| n.span().end())
            .or_else(|| self.namespace_keyword().map(|k| k.span().end()))
            .unwrap_or(start);
        TextSpan::new(start, end.max(start))
    }

    pub fn body_span(&self) -> Option<TextSpan> {
        let open = self.open_brace()?;
        let end = self
            .close_brace()
            .map(|c| c.span().end())
            .unwrap_or_else(|| self.0.span().end());
        Some(TextSpan::new(open.span().start(), end))
    }
}

impl FileScopedNamespaceDecl {
    pub fn namespace_keyword(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::NamespaceKeyword)
    }

    pub fn name(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_name())
    }

    pub fn semicolon(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::Semicolon)
    }

    /// Declarations governed by this namespace: the siblings that follow
    /// it in the containing unit.
    pub fn members(&self) -> Vec<SyntaxNode> {
        self.0
            .following_siblings()
            .into_iter()
            .filter_map(SyntaxElement::into_node)
            .take_while(|n| n.kind() != SyntaxKind::FileScopedNamespaceDeclaration)
            .collect()
    }

    pub fn header_span(&self) -> TextSpan {
        self.0.span()
    }

    /// The declaration through the end of its last member.
    pub fn extent(&self) -> TextSpan {
        let span = self.0.span();
        match self.members().last() {
            Some(last) => span.cover(last.span()),
            None => span,
        }
    }
}

impl TypeDecl {
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind()
    }

    pub fn is_class(&self) -> bool {
        self.0.kind() == SyntaxKind::ClassDeclaration
            || (self.0.kind() == SyntaxKind::RecordDeclaration
                && !self
                    .0
                    .child_tokens()
                    .any(|t| t.kind() == SyntaxKind::StructKeyword))
    }

    pub fn is_struct(&self) -> bool {
        self.0.kind() == SyntaxKind::StructDeclaration
            || (self.0.kind() == SyntaxKind::RecordDeclaration
                && self
                    .0
                    .child_tokens()
                    .any(|t| t.kind() == SyntaxKind::StructKeyword))
    }

    pub fn modifiers(&self) -> Vec<SyntaxToken> {
        self.0
            .child_tokens()
            .take_while(|t| t.kind().is_modifier())
            .collect()
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().iter().any(|t| t.kind() == kind)
    }

    pub fn identifier(&self) -> Option<SyntaxToken> {
        let mut seen_keyword = false;
        for token in self.0.child_tokens() {
            match token.kind() {
                SyntaxKind::ClassKeyword
                | SyntaxKind::StructKeyword
                | SyntaxKind::InterfaceKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::RecordKeyword => seen_keyword = true,
                kind if seen_keyword && kind.is_identifier_like() => return Some(token),
                _ if seen_keyword => return None,
                _ => {}
            }
        }
        None
    }

    pub fn name(&self) -> Option<String> {
        self.identifier().map(|t| t.text().to_string())
    }

    pub fn members(&self) -> Vec<SyntaxNode> {
        self.0
            .children()
            .filter(|n| !is_header_node(n.kind()))
            .collect()
    }

    pub fn methods(&self) -> Vec<MethodDecl> {
        self.0.children().filter_map(MethodDecl::cast).collect()
    }

    /// Simple name and arity of each base list entry, e.g. `Shape`, 0 and
    /// `IComparer`, 1.
    pub fn base_types(&self) -> Vec<(String, usize)> {
        let Some(list) = self.0.first_child(SyntaxKind::BaseList) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut current: Option<(String, usize)> = None;
        let (mut angle, mut paren) = (0usize, 0usize);
        for token in list.tokens().iter().skip(1) {
            match token.kind() {
                SyntaxKind::LessThan => {
                    if angle == 0 {
                        if let Some((_, arity)) = current.as_mut() {
                            *arity = 1;
                        }
                    }
                    angle += 1;
                }
                SyntaxKind::GreaterThan => angle = angle.saturating_sub(1),
                SyntaxKind::OpenParen => paren += 1,
                SyntaxKind::CloseParen => paren = paren.saturating_sub(1),
                SyntaxKind::Comma if angle == 1 && paren == 0 => {
                    if let Some((_, arity)) = current.as_mut() {
                        *arity += 1;
                    }
                }
                SyntaxKind::Comma if angle == 0 && paren == 0 => out.extend(current.take()),
                kind if angle == 0 && paren == 0 && kind.is_identifier_like() => {
                    current = Some((token.text().to_string(), 0));
                }
                _ => {}
            }
        }
        out.extend(current);
        out
    }

    pub fn open_brace(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::OpenBrace)
    }

    pub fn close_brace(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::CloseBrace)
    }

    /// From the first attribute or modifier to the end of the base list or
    /// constraints.
    pub fn header_span(&self) -> TextSpan {
        let start = self.0.span().start();
        let mut end = start;
        for element in self.0.children_with_tokens() {
            match element.kind() {
                SyntaxKind::OpenBrace | SyntaxKind::Semicolon | SyntaxKind::EnumBody => break,
                _ => end = element.span().end(),
            }
        }
        TextSpan::new(start, end.max(start))
    }

    pub fn body_span(&self) -> Option<TextSpan> {
        if let Some(body) = self.0.first_child(SyntaxKind::EnumBody) {
            return Some(body.span());
        }
        let open = self.open_brace()?;
        let end = self
            .close_brace()
            .map(|c| c.span().end())
            .unwrap_or_else(|| self.0.span().end());
        Some(TextSpan::new(open.span().start(), end))
    }

    /// Containing type for nested declarations.
    pub fn containing_type(&self) -> Option<TypeDecl> {
        self.0.parent().and_then(TypeDecl::cast)
    }
}

impl MethodDecl {
    pub fn attribute_lists(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::AttributeList)
    }

    /// Modifier tokens, in source order.
    pub fn modifiers(&self) -> Vec<SyntaxToken> {
        self.0
            .children_with_tokens()
            .into_iter()
            .skip_while(|e| e.kind() == SyntaxKind::AttributeList)
            .map_while(|e| e.into_token().filter(|t| t.kind().is_modifier()))
            .collect()
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().iter().any(|t| t.kind() == kind)
    }

    pub fn is_async(&self) -> bool {
        self.has_modifier(SyntaxKind::AsyncKeyword)
    }

    pub fn return_type(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind().is_type())
    }

    pub fn returns_void(&self) -> bool {
        self.return_type().map(|t| is_void_type(&t)).unwrap_or(false)
    }

    pub fn explicit_interface(&self) -> Option<SyntaxNode> {
        self.0.first_child(SyntaxKind::ExplicitInterfaceSpecifier)
    }

    /// The method name token.
    pub fn identifier(&self) -> Option<SyntaxToken> {
        let mut after_type = false;
        for element in self.0.children_with_tokens() {
            match element {
                SyntaxElement::Node(node) if node.kind().is_type() => after_type = true,
                SyntaxElement::Token(token) if after_type && token.kind().is_identifier_like() => {
                    return Some(token)
                }
                _ => {}
            }
        }
        None
    }

    pub fn name(&self) -> Option<String> {
        self.identifier().map(|t| t.text().to_string())
    }

    pub fn type_parameter_list(&self) -> Option<SyntaxNode> {
        self.0.first_child(SyntaxKind::TypeParameterList)
    }

    pub fn parameter_list(&self) -> Option<SyntaxNode> {
        self.0.first_child(SyntaxKind::ParameterList)
    }

    /// Number of parameters, counted by top-level commas.
    pub fn parameter_count(&self) -> Option<usize> {
        let tokens = self.parameter_list()?.tokens();
        let inner = tokens.get(1..tokens.len().saturating_sub(1)).unwrap_or_default();
        if inner.is_empty() {
            return Some(0);
        }
        let mut depth = 0usize;
        let mut count = 1;
        for token in inner {
            match token.kind() {
                SyntaxKind::OpenParen | SyntaxKind::OpenBracket | SyntaxKind::LessThan => {
                    depth += 1
                }
                SyntaxKind::CloseParen | SyntaxKind::CloseBracket | SyntaxKind::GreaterThan => {
                    depth = depth.saturating_sub(1)
                }
                SyntaxKind::Comma if depth == 0 => count += 1,
                _ => {}
            }
        }
        Some(count)
    }

    pub fn constraint_clauses(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ConstraintClause)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.first_child(SyntaxKind::Block)
    }

    pub fn expression_body(&self) -> Option<SyntaxNode> {
        self.0.first_child(SyntaxKind::ArrowExpressionClause)
    }

    pub fn has_body(&self) -> bool {
        self.body().is_some() || self.expression_body().is_some()
    }

    pub fn semicolon(&self) -> Option<SyntaxToken> {
        self.0.first_child_token(SyntaxKind::Semicolon)
    }

    /// From the first attribute or modifier to the end of the parameter
    /// list or constraint clauses.
    pub fn header_span(&self) -> TextSpan {
        let start = self.0.span().start();
        let end = self
            .constraint_clauses()
            .last()
            .or_else(|| self.parameter_list())
            .map(|n| n.span().end())
            .or_else(|| self.identifier().map(|t| t.span().end()))
            .unwrap_or(start);
        TextSpan::new(start, end.max(start))
    }

    /// The block, or the expression body through its `;`.
    pub fn body_span(&self) -> Option<TextSpan> {
        if let Some(block) = self.body() {
            return Some(block.span());
        }
        let arrow = self.expression_body()?;
        let span = arrow.span();
        Some(match self.semicolon() {
            Some(semi) => span.cover(semi.span()),
            None => span,
        })
    }

    pub fn containing_type(&self) -> Option<TypeDecl> {
        self.0.parent().and_then(TypeDecl::cast)
    }
}
