//! Recursive-descent parser for the declaration level of C#.
//!
//! Namespaces, type declarations and method signatures are parsed into
//! nodes. Method bodies, parameter lists, attribute lists and members other
//! than methods are kept as flat balanced token runs. The parser never
//! fails: unexpected input ends up in `Error` or `MemberDeclaration` nodes
//! and the resulting tree always reproduces the input text.

use super::errors::SyntaxError;
use super::green::{Checkpoint, GreenBuilder, GreenToken};
use super::kind::SyntaxKind as K;
use super::lexer::tokenize;
use super::SyntaxTree;
use crate::text::TextSpan;
use std::sync::Arc;

/// Result of parsing one source text.
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: SyntaxTree,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn parse(text: &str) -> Parse {
    let mut parser = Parser::new(tokenize(text));
    parser.compilation_unit();
    let errors = std::mem::take(&mut parser.errors);
    let root = parser.builder.finish();
    Parse {
        tree: SyntaxTree::new(root),
        errors,
    }
}

struct Parser {
    tokens: Vec<Arc<GreenToken>>,
    starts: Vec<usize>,
    pos: usize,
    builder: GreenBuilder,
    errors: Vec<SyntaxError>,
}

impl Parser {
    fn new(tokens: Vec<Arc<GreenToken>>) -> Self {
        let mut starts = Vec::with_capacity(tokens.len());
        let mut offset = 0;
        for token in &tokens {
            starts.push(offset + token.leading_width());
            offset += token.width();
        }
        Self {
            tokens,
            starts,
            pos: 0,
            builder: GreenBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn kind_at(&self, index: usize) -> K {
        self.tokens
            .get(index)
            .map(|t| t.kind())
            .unwrap_or(K::EndOfFile)
    }

    fn nth(&self, n: usize) -> K {
        self.kind_at(self.pos + n)
    }

    fn at(&self, kind: K) -> bool {
        self.nth(0) == kind
    }

    fn at_eof(&self) -> bool {
        self.at(K::EndOfFile)
    }

    fn text_at(&self, n: usize) -> &str {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.text())
            .unwrap_or("")
    }

    fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        self.builder.token(self.tokens[self.pos].clone());
        self.pos += 1;
    }

    fn eat(&mut self, kind: K) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        let len = self.tokens.get(index).map(|t| t.text().len()).unwrap_or(0);
        let start = self.starts.get(index).copied().unwrap_or(0);
        self.errors
            .push(SyntaxError::new(message, TextSpan::from_len(start, len)));
    }

    fn expect(&mut self, kind: K, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}"));
            false
        }
    }

    /// Run `f`; if it reports failure, undo everything it consumed or built.
    fn try_parse(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let checkpoint = self.builder.checkpoint();
        let pos = self.pos;
        let errors = self.errors.len();
        if f(self) {
            return true;
        }
        self.builder.rollback(checkpoint);
        self.pos = pos;
        self.errors.truncate(errors);
        false
    }

    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    fn compilation_unit(&mut self) {
        self.builder.start_node(K::CompilationUnit);
        self.namespace_items(false);
        if let Some(eof) = self.tokens.last().cloned() {
            self.builder.token(eof);
        }
        self.builder.finish_node();
    }

    fn namespace_items(&mut self, in_braces: bool) {
        loop {
            match self.nth(0) {
                K::EndOfFile => break,
                K::CloseBrace if in_braces => break,
                K::CloseBrace => {
                    self.error("unexpected `}`");
                    self.builder.start_node(K::Error);
                    self.bump();
                    self.builder.finish_node();
                }
                K::ExternKeyword if self.nth(1) == K::AliasKeyword => {
                    self.directive(K::ExternAliasDirective)
                }
                K::UsingKeyword => self.directive(K::UsingDirective),
                K::GlobalKeyword if self.nth(1) == K::UsingKeyword => {
                    self.directive(K::UsingDirective)
                }
                K::NamespaceKeyword => self.namespace_declaration(),
                K::OpenBracket if self.at_global_attribute() => self.attribute_list(),
                _ => self.member_declaration(),
            }
        }
    }

    fn at_global_attribute(&self) -> bool {
        matches!(self.text_at(1), "assembly" | "module") && self.nth(2) == K::Colon
    }

    /// `using ...;` and `extern alias ...;`, kept flat.
    fn directive(&mut self, kind: K) {
        self.builder.start_node(kind);
        loop {
            match self.nth(0) {
                K::Semicolon => {
                    self.bump();
                    break;
                }
                K::EndOfFile | K::OpenBrace | K::CloseBrace => {
                    self.error("expected `;`");
                    break;
                }
                _ => self.bump(),
            }
        }
        self.builder.finish_node();
    }

    fn namespace_declaration(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        if !self.name(false) {
            self.error("expected namespace name");
        }
        if self.at(K::Semicolon) {
            self.builder
                .start_node_at(checkpoint, K::FileScopedNamespaceDeclaration);
            self.bump();
            self.builder.finish_node();
            return;
        }
        self.builder
            .start_node_at(checkpoint, K::NamespaceDeclaration);
        if self.expect(K::OpenBrace, "`{`") {
            self.namespace_items(true);
            self.expect(K::CloseBrace, "`}`");
            self.eat(K::Semicolon);
        }
        self.builder.finish_node();
    }

    /// Dotted name. Generic arguments are only accepted in type position.
    fn name(&mut self, in_type: bool) -> bool {
        let checkpoint = self.checkpoint();
        if !self.simple_name(in_type) {
            return false;
        }
        while matches!(self.nth(0), K::Dot | K::ColonColon) && self.nth(1).is_identifier_like() {
            self.builder.start_node_at(checkpoint, K::QualifiedName);
            self.bump();
            if !self.simple_name(in_type) {
                return false;
            }
            self.builder.finish_node();
        }
        true
    }

    fn simple_name(&mut self, in_type: bool) -> bool {
        if !self.nth(0).is_identifier_like() {
            return false;
        }
        if in_type && self.nth(1) == K::LessThan {
            self.builder.start_node(K::GenericName);
            self.bump();
            if !self.type_argument_list() {
                return false;
            }
        } else {
            self.builder.start_node(K::IdentifierName);
            self.bump();
        }
        self.builder.finish_node();
        true
    }

    fn type_argument_list(&mut self) -> bool {
        self.builder.start_node(K::TypeArgumentList);
        self.bump();
        loop {
            match self.nth(0) {
                K::GreaterThan => break,
                K::Comma => self.bump(),
                _ => {
                    if !self.ty() {
                        return false;
                    }
                    if !matches!(self.nth(0), K::Comma | K::GreaterThan) {
                        return false;
                    }
                }
            }
        }
        self.bump();
        self.builder.finish_node();
        true
    }

    fn ty(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        match self.nth(0) {
            K::PredefinedTypeKeyword | K::VoidKeyword => {
                self.builder.start_node(K::PredefinedType);
                self.bump();
                self.builder.finish_node();
            }
            K::OpenParen => {
                if !self.tuple_type() {
                    return false;
                }
            }
            kind if kind.is_identifier_like() => {
                if !self.name(true) {
                    return false;
                }
            }
            _ => return false,
        }
        loop {
            match self.nth(0) {
                K::Question => {
                    self.builder.start_node_at(checkpoint, K::NullableType);
                    self.bump();
                    self.builder.finish_node();
                }
                K::OpenBracket if matches!(self.nth(1), K::CloseBracket | K::Comma) => {
                    self.builder.start_node_at(checkpoint, K::ArrayType);
                    self.bump();
                    while self.eat(K::Comma) {}
                    if !self.eat(K::CloseBracket) {
                        return false;
                    }
                    self.builder.finish_node();
                }
                K::Star => {
                    self.builder.start_node_at(checkpoint, K::PointerType);
                    self.bump();
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
        true
    }

    fn tuple_type(&mut self) -> bool {
        self.builder.start_node(K::TupleType);
        self.bump();
        loop {
            if !self.ty() {
                return false;
            }
            if self.nth(0).is_identifier_like() {
                self.bump();
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        if !self.eat(K::CloseParen) {
            return false;
        }
        self.builder.finish_node();
        true
    }

    fn attribute_list(&mut self) {
        self.builder.start_node(K::AttributeList);
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::EndOfFile => {
                    self.error("unterminated attribute list");
                    break;
                }
                K::OpenBracket => depth += 1,
                K::CloseBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    fn member_declaration(&mut self) {
        let checkpoint = self.checkpoint();
        let start = self.pos;
        while self.at(K::OpenBracket) {
            self.attribute_list();
        }
        while self.at_modifier() {
            self.bump();
        }
        match self.nth(0) {
            K::ClassKeyword | K::StructKeyword | K::InterfaceKeyword | K::EnumKeyword => {
                self.type_declaration(checkpoint)
            }
            K::RecordKeyword
                if self.nth(1).is_identifier_like()
                    || matches!(self.nth(1), K::ClassKeyword | K::StructKeyword) =>
            {
                self.type_declaration(checkpoint)
            }
            K::EndOfFile | K::CloseBrace | K::NamespaceKeyword => {
                if self.pos > start {
                    self.error("expected declaration");
                    self.builder.start_node_at(checkpoint, K::Error);
                    self.builder.finish_node();
                }
            }
            _ => {
                if !self.try_parse(|p| p.method_rest(checkpoint)) {
                    self.opaque_member(checkpoint, start);
                }
            }
        }
    }

    fn at_modifier(&self) -> bool {
        let kind = self.nth(0);
        if !kind.is_modifier() {
            return false;
        }
        if kind.is_contextual_keyword() {
            // `async` or `partial` used as a name is followed by punctuation.
            let next = self.nth(1);
            return next.is_identifier_like()
                || next.is_modifier()
                || matches!(
                    next,
                    K::VoidKeyword
                        | K::PredefinedTypeKeyword
                        | K::ClassKeyword
                        | K::StructKeyword
                        | K::InterfaceKeyword
                        | K::RecordKeyword
                        | K::OpenParen
                );
        }
        true
    }

    fn type_declaration(&mut self, checkpoint: Checkpoint) {
        let kind = match self.nth(0) {
            K::ClassKeyword => K::ClassDeclaration,
            K::StructKeyword => K::StructDeclaration,
            K::InterfaceKeyword => K::InterfaceDeclaration,
            K::EnumKeyword => K::EnumDeclaration,
            _ => K::RecordDeclaration,
        };
        self.builder.start_node_at(checkpoint, kind);
        self.bump();
        if kind == K::RecordDeclaration && matches!(self.nth(0), K::ClassKeyword | K::StructKeyword)
        {
            self.bump();
        }
        if self.nth(0).is_identifier_like() {
            self.bump();
        } else {
            self.error("expected type name");
        }
        if self.at(K::LessThan) {
            self.type_parameter_list();
        }
        if self.at(K::OpenParen) {
            self.parameter_list();
        }
        if self.at(K::Colon) {
            self.base_list();
        }
        while self.at(K::WhereKeyword) {
            self.constraint_clause();
        }
        if self.at(K::OpenBrace) {
            if kind == K::EnumDeclaration {
                self.enum_body();
            } else {
                self.bump();
                while !matches!(self.nth(0), K::CloseBrace | K::EndOfFile) {
                    self.member_declaration();
                }
                self.expect(K::CloseBrace, "`}`");
            }
            self.eat(K::Semicolon);
        } else if !self.eat(K::Semicolon) {
            self.error("expected type body");
        }
        self.builder.finish_node();
    }

    /// Return type onward. Fails without side effects unless the member
    /// really is a method.
    fn method_rest(&mut self, checkpoint: Checkpoint) -> bool {
        if !self.ty() {
            return false;
        }
        let Some(segments) = self.method_name_segments() else {
            return false;
        };
        self.builder
            .start_node_at(checkpoint, K::MethodDeclaration);
        if segments > 1 {
            self.builder.start_node(K::ExplicitInterfaceSpecifier);
            if !self.name_segments(segments - 1) {
                return false;
            }
            self.bump();
            self.builder.finish_node();
        }
        self.bump();
        if self.at(K::LessThan) {
            self.type_parameter_list();
        }
        if !self.at(K::OpenParen) {
            return false;
        }
        self.parameter_list();
        while self.at(K::WhereKeyword) {
            self.constraint_clause();
        }
        match self.nth(0) {
            K::OpenBrace => self.block(),
            K::FatArrow => {
                self.arrow_clause();
                self.expect(K::Semicolon, "`;`");
            }
            K::Semicolon => self.bump(),
            _ => self.error("expected method body"),
        }
        self.builder.finish_node();
        true
    }

    /// Look ahead over `A.B<T>.Name` and report how many dotted segments
    /// precede a parameter list, if one follows.
    fn method_name_segments(&self) -> Option<usize> {
        let mut index = self.pos;
        let mut segments = 0;
        loop {
            if !self.kind_at(index).is_identifier_like() {
                return None;
            }
            index += 1;
            segments += 1;
            if self.kind_at(index) == K::LessThan {
                index = self.skip_angles(index)?;
            }
            if self.kind_at(index) == K::Dot {
                index += 1;
                continue;
            }
            break;
        }
        (self.kind_at(index) == K::OpenParen).then_some(segments)
    }

    fn skip_angles(&self, mut index: usize) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            match self.kind_at(index) {
                K::LessThan => depth += 1,
                K::GreaterThan => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index + 1);
                    }
                }
                K::EndOfFile | K::Semicolon | K::OpenBrace | K::CloseBrace => return None,
                _ => {}
            }
            index += 1;
        }
    }

    fn name_segments(&mut self, count: usize) -> bool {
        let checkpoint = self.checkpoint();
        if !self.simple_name(true) {
            return false;
        }
        for _ in 1..count {
            self.builder.start_node_at(checkpoint, K::QualifiedName);
            self.bump();
            if !self.simple_name(true) {
                return false;
            }
            self.builder.finish_node();
        }
        true
    }

    fn type_parameter_list(&mut self) {
        self.builder.start_node(K::TypeParameterList);
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::LessThan => depth += 1,
                K::GreaterThan => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                K::EndOfFile | K::OpenBrace | K::Semicolon | K::OpenParen => {
                    self.error("unterminated type parameter list");
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    fn parameter_list(&mut self) {
        self.builder.start_node(K::ParameterList);
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::OpenParen => depth += 1,
                K::CloseParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                K::EndOfFile | K::OpenBrace | K::CloseBrace | K::Semicolon => {
                    self.error("expected `)`");
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    fn base_list(&mut self) {
        self.builder.start_node(K::BaseList);
        self.bump();
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::OpenParen => depth += 1,
                K::CloseParen => depth = depth.saturating_sub(1),
                K::OpenBrace | K::Semicolon | K::CloseBrace | K::EndOfFile => break,
                K::WhereKeyword if depth == 0 => break,
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    fn constraint_clause(&mut self) {
        self.builder.start_node(K::ConstraintClause);
        self.bump();
        while !matches!(
            self.nth(0),
            K::OpenBrace
                | K::FatArrow
                | K::Semicolon
                | K::WhereKeyword
                | K::CloseBrace
                | K::EndOfFile
        ) {
            self.bump();
        }
        self.builder.finish_node();
    }

    fn block(&mut self) {
        self.builder.start_node(K::Block);
        self.balanced_braces();
        self.builder.finish_node();
    }

    fn enum_body(&mut self) {
        self.builder.start_node(K::EnumBody);
        self.balanced_braces();
        self.builder.finish_node();
    }

    fn balanced_braces(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::EndOfFile => {
                    self.error("expected `}`");
                    return;
                }
                K::OpenBrace => depth += 1,
                K::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn arrow_clause(&mut self) {
        self.builder.start_node(K::ArrowExpressionClause);
        self.bump();
        let mut depth = 0usize;
        loop {
            match self.nth(0) {
                K::EndOfFile => break,
                K::Semicolon if depth == 0 => break,
                K::CloseBrace if depth == 0 => break,
                K::OpenBrace | K::OpenParen | K::OpenBracket => depth += 1,
                K::CloseBrace | K::CloseParen | K::CloseBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
        }
        self.builder.finish_node();
    }

    /// Fields, properties, events, constructors, operators and anything
    /// else that is not a method or a type: consumed up to `;` or the end
    /// of a balanced body.
    fn opaque_member(&mut self, checkpoint: Checkpoint, start: usize) {
        self.builder
            .start_node_at(checkpoint, K::MemberDeclaration);
        let mut depth = 0usize;
        let mut initializer = false;
        loop {
            match self.nth(0) {
                K::EndOfFile => {
                    self.error("expected `;`");
                    break;
                }
                K::CloseBrace if depth == 0 => {
                    if self.pos == start {
                        self.bump();
                    }
                    break;
                }
                K::Semicolon if depth == 0 => {
                    self.bump();
                    break;
                }
                K::Equals | K::FatArrow if depth == 0 => {
                    initializer = true;
                    self.bump();
                }
                K::OpenBrace | K::OpenParen | K::OpenBracket => {
                    depth += 1;
                    self.bump();
                }
                K::CloseBrace => {
                    depth -= 1;
                    self.bump();
                    if depth == 0
                        && !initializer
                        && !matches!(self.nth(0), K::Equals | K::FatArrow)
                    {
                        break;
                    }
                }
                K::CloseParen | K::CloseBracket => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                _ => self.bump(),
            }
        }
        self.builder.finish_node();
    }
}
