//! Token-level reading of method bodies.
//!
//! Blocks are kept as balanced token runs, so statement structure is
//! recovered here from `;` and bracket depth.

use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Tokens of a block without its outer braces.
pub fn inner_tokens(block: &SyntaxNode) -> Vec<SyntaxToken> {
    let mut tokens = block.tokens();
    if tokens.first().map(SyntaxToken::kind) == Some(SyntaxKind::OpenBrace) {
        tokens.remove(0);
    }
    if tokens.last().map(SyntaxToken::kind) == Some(SyntaxKind::CloseBrace) {
        tokens.pop();
    }
    tokens
}

/// Every `return` is a bare `return;` and nothing is yielded.
pub fn returns_no_value(block: &SyntaxNode) -> bool {
    let tokens = block.tokens();
    tokens.windows(2).all(|pair| match pair[0].kind() {
        SyntaxKind::ReturnKeyword => pair[1].kind() == SyntaxKind::Semicolon,
        SyntaxKind::YieldKeyword => !matches!(pair[1].kind(), SyntaxKind::ReturnKeyword)
            && pair[1].text() != "break",
        _ => true,
    }) && tokens.last().map(SyntaxToken::kind) != Some(SyntaxKind::ReturnKeyword)
}

/// The only statement of a block, when it can become an expression body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleStatement {
    /// `return expr;`, holding `expr`.
    Return(Vec<SyntaxToken>),
    /// `throw expr;`, holding `throw expr`.
    Throw(Vec<SyntaxToken>),
    /// `expr;`, holding `expr`.
    Expression(Vec<SyntaxToken>),
}

impl SingleStatement {
    pub fn tokens(&self) -> &[SyntaxToken] {
        match self {
            SingleStatement::Return(tokens)
            | SingleStatement::Throw(tokens)
            | SingleStatement::Expression(tokens) => tokens,
        }
    }
}

const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "do", "switch", "try", "lock", "break", "continue", "goto",
    "checked", "unchecked",
];

fn starts_statement(token: &SyntaxToken) -> bool {
    match token.kind() {
        SyntaxKind::OtherKeyword => STATEMENT_KEYWORDS.contains(&token.text()),
        SyntaxKind::OpenBrace
        | SyntaxKind::Semicolon
        | SyntaxKind::UsingKeyword
        | SyntaxKind::FixedKeyword
        | SyntaxKind::UnsafeKeyword
        | SyntaxKind::ConstKeyword
        | SyntaxKind::YieldKeyword
        | SyntaxKind::ReturnKeyword
        | SyntaxKind::ThrowKeyword => true,
        _ => false,
    }
}

/// `T x = ...;` and `var x;` style local declarations.
fn is_local_declaration(tokens: &[SyntaxToken]) -> bool {
    let end = tokens
        .iter()
        .position(|t| t.kind() == SyntaxKind::Equals)
        .unwrap_or(tokens.len());
    match &tokens[..end] {
        [.., ty, name] => {
            name.kind().is_identifier_like()
                && ty.kind() != SyntaxKind::AwaitKeyword
                && (ty.kind().is_identifier_like()
                    || matches!(
                        ty.kind(),
                        SyntaxKind::PredefinedTypeKeyword
                            | SyntaxKind::GreaterThan
                            | SyntaxKind::CloseBracket
                            | SyntaxKind::Question
                    ))
        }
        _ => false,
    }
}

/// Statement tokens without the final `;`, provided the block holds
/// exactly one statement terminated at nesting depth zero.
fn sole_statement(block: &SyntaxNode) -> Option<Vec<SyntaxToken>> {
    let mut tokens = inner_tokens(block);
    if tokens.pop()?.kind() != SyntaxKind::Semicolon {
        return None;
    }
    let mut depth = 0usize;
    for token in &tokens {
        match token.kind() {
            SyntaxKind::OpenBrace | SyntaxKind::OpenParen | SyntaxKind::OpenBracket => depth += 1,
            SyntaxKind::CloseBrace | SyntaxKind::CloseParen | SyntaxKind::CloseBracket => {
                depth = depth.checked_sub(1)?
            }
            SyntaxKind::Semicolon if depth == 0 => return None,
            _ => {}
        }
    }
    (depth == 0 && !tokens.is_empty()).then_some(tokens)
}

/// Classify the block's only statement. Expression statements are
/// reported only when `allow_expression_statement` is set (void methods).
pub fn single_statement(
    block: &SyntaxNode,
    allow_expression_statement: bool,
) -> Option<SingleStatement> {
    let tokens = sole_statement(block)?;
    let first = tokens.first()?;
    match first.kind() {
        SyntaxKind::ReturnKeyword if tokens.len() > 1 => {
            Some(SingleStatement::Return(tokens[1..].to_vec()))
        }
        SyntaxKind::ThrowKeyword if tokens.len() > 1 => Some(SingleStatement::Throw(tokens)),
        _ if starts_statement(first) => None,
        _ if allow_expression_statement && !is_local_declaration(&tokens) => {
            Some(SingleStatement::Expression(tokens))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn block(body: &str) -> SyntaxNode {
        let src = format!("class C\n{{\n    void M()\n    {body}\n}}\n");
        parse(&src)
            .tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::Block)
            .unwrap()
    }

    fn texts(tokens: &[SyntaxToken]) -> Vec<&str> {
        tokens.iter().map(SyntaxToken::text).collect()
    }

    #[test]
    fn return_statement() {
        let b = block("{ return a + b; }");
        match single_statement(&b, false) {
            Some(SingleStatement::Return(tokens)) => assert_eq!(texts(&tokens), ["a", "+", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn throw_keeps_keyword() {
        let b = block("{ throw new NotSupportedException(); }");
        let statement = single_statement(&b, false).unwrap();
        assert!(matches!(statement, SingleStatement::Throw(_)));
        assert_eq!(statement.tokens()[0].text(), "throw");
    }

    #[test]
    fn expression_statement_only_when_allowed() {
        let b = block("{ Console.WriteLine(x); }");
        assert!(single_statement(&b, false).is_none());
        assert!(matches!(
            single_statement(&b, true),
            Some(SingleStatement::Expression(_))
        ));
    }

    #[test]
    fn rejects_multiple_and_compound_statements() {
        assert!(single_statement(&block("{ A(); B(); }"), true).is_none());
        assert!(single_statement(&block("{ if (x) { A(); } }"), true).is_none());
        assert!(single_statement(&block("{ var x = 1; }"), true).is_none());
        assert!(single_statement(&block("{ }"), true).is_none());
        assert!(single_statement(&block("{ return; }"), false).is_none());
    }

    #[test]
    fn lambda_with_block_is_one_statement() {
        let b = block("{ Run(() => { A(); B(); }); }");
        assert!(single_statement(&b, true).is_some());
    }

    #[test]
    fn bare_returns() {
        assert!(returns_no_value(&block("{ if (x) return; Run(); }")));
        assert!(!returns_no_value(&block("{ return 1; }")));
        assert!(!returns_no_value(&block("{ yield return 1; }")));
    }
}
