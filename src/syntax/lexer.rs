//! Lossless C# lexer.
//!
//! Produces green tokens with trivia already attached: trailing trivia runs
//! up to and including the first end-of-line after a token, everything else
//! is leading trivia of the following token. The stream always ends with an
//! `EndOfFile` token carrying whatever trivia remains.

use super::green::{GreenToken, Trivia};
use super::kind::{SyntaxKind, TriviaKind};
use std::sync::Arc;

pub fn tokenize(src: &str) -> Vec<Arc<GreenToken>> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        line_start: true,
    };
    let mut tokens = Vec::new();
    let mut leading = lexer.leading_trivia();
    loop {
        if lexer.pos >= src.len() {
            tokens.push(Arc::new(GreenToken::new(
                SyntaxKind::EndOfFile,
                "",
                leading,
                Vec::new(),
            )));
            return tokens;
        }
        let start = lexer.pos;
        let kind = lexer.token();
        let text = &src[start..lexer.pos];
        let kind = if kind == SyntaxKind::Identifier {
            SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::Identifier)
        } else {
            kind
        };
        let trailing = lexer.trailing_trivia();
        tokens.push(Arc::new(GreenToken::new(kind, text, leading, trailing)));
        leading = lexer.leading_trivia();
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// Only whitespace has been seen since the last newline.
    line_start: bool,
}

impl<'a> Lexer<'a> {
    fn byte(&self, ahead: usize) -> u8 {
        self.src.as_bytes().get(self.pos + ahead).copied().unwrap_or(0)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn leading_trivia(&mut self) -> Vec<Trivia> {
        let mut out = Vec::new();
        while let Some(trivia) = self.trivia() {
            out.push(trivia);
        }
        out
    }

    fn trailing_trivia(&mut self) -> Vec<Trivia> {
        let mut out = Vec::new();
        while let Some(kind) = self.peek_trivia_kind() {
            if kind == TriviaKind::Directive {
                break;
            }
            if let Some(trivia) = self.trivia() {
                out.push(trivia);
            }
            if kind == TriviaKind::EndOfLine {
                break;
            }
        }
        out
    }

    fn peek_trivia_kind(&self) -> Option<TriviaKind> {
        match self.byte(0) {
            b' ' | b'\t' | 0x0b | 0x0c => Some(TriviaKind::Whitespace),
            b'\r' | b'\n' => Some(TriviaKind::EndOfLine),
            b'/' if self.byte(1) == b'/' => {
                if self.byte(2) == b'/' && self.byte(3) != b'/' {
                    Some(TriviaKind::DocComment)
                } else {
                    Some(TriviaKind::SingleLineComment)
                }
            }
            b'/' if self.byte(1) == b'*' => Some(TriviaKind::MultiLineComment),
            b'#' if self.line_start => Some(TriviaKind::Directive),
            _ => None,
        }
    }

    fn trivia(&mut self) -> Option<Trivia> {
        let kind = self.peek_trivia_kind()?;
        let start = self.pos;
        match kind {
            TriviaKind::Whitespace => {
                while matches!(self.byte(0), b' ' | b'\t' | 0x0b | 0x0c) {
                    self.pos += 1;
                }
            }
            TriviaKind::EndOfLine => {
                if self.byte(0) == b'\r' && self.byte(1) == b'\n' {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                }
                self.line_start = true;
            }
            TriviaKind::SingleLineComment | TriviaKind::DocComment | TriviaKind::Directive => {
                self.skip_to_line_end();
                self.line_start = false;
            }
            TriviaKind::MultiLineComment => {
                self.pos += 2;
                match self.rest().find("*/") {
                    Some(end) => self.pos += end + 2,
                    None => self.pos = self.src.len(),
                }
                self.line_start = false;
            }
        }
        Some(Trivia::new(kind, &self.src[start..self.pos]))
    }

    fn skip_to_line_end(&mut self) {
        while self.pos < self.src.len() && !matches!(self.byte(0), b'\r' | b'\n') {
            self.pos += 1;
        }
    }

    fn token(&mut self) -> SyntaxKind {
        self.line_start = false;
        let b = self.byte(0);
        match b {
            b'"' => {
                if self.rest().starts_with("\"\"\"") {
                    self.raw_string();
                } else {
                    self.pos += 1;
                    self.regular_string();
                }
                SyntaxKind::StringLiteral
            }
            b'\'' => {
                self.pos += 1;
                self.char_literal();
                SyntaxKind::CharLiteral
            }
            b'@' if self.byte(1) == b'"' => {
                self.pos += 2;
                self.verbatim_string();
                SyntaxKind::StringLiteral
            }
            b'@' if self.byte(1) == b'$' && self.byte(2) == b'"' => {
                self.pos += 3;
                self.interpolated_string(true);
                SyntaxKind::StringLiteral
            }
            b'$' => self.dollar_string(),
            b'0'..=b'9' => {
                self.number();
                SyntaxKind::NumericLiteral
            }
            b'.' if self.byte(1).is_ascii_digit() => {
                self.number();
                SyntaxKind::NumericLiteral
            }
            _ => {
                if let Some(kind) = self.punctuation() {
                    return kind;
                }
                self.identifier_or_unknown()
            }
        }
    }

    fn dollar_string(&mut self) -> SyntaxKind {
        let mut dollars = 0;
        while self.byte(dollars) == b'$' {
            dollars += 1;
        }
        let after = &self.rest()[dollars..];
        if after.starts_with("\"\"\"") {
            self.pos += dollars;
            self.raw_string();
        } else if after.starts_with('"') {
            self.pos += dollars + 1;
            self.interpolated_string(false);
        } else if after.starts_with("@\"") {
            self.pos += dollars + 2;
            self.interpolated_string(true);
        } else {
            self.pos += 1;
            return SyntaxKind::Unknown;
        }
        SyntaxKind::StringLiteral
    }

    fn regular_string(&mut self) {
        loop {
            match self.byte(0) {
                b'\\' => self.pos = (self.pos + 2).min(self.src.len()),
                b'"' => {
                    self.pos += 1;
                    return;
                }
                b'\r' | b'\n' => return,
                _ if self.pos >= self.src.len() => return,
                _ => self.pos += 1,
            }
        }
    }

    fn verbatim_string(&mut self) {
        while self.pos < self.src.len() {
            if self.byte(0) == b'"' {
                if self.byte(1) == b'"' {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
    }

    fn raw_string(&mut self) {
        let mut quotes = 0;
        while self.byte(quotes) == b'"' {
            quotes += 1;
        }
        self.pos += quotes;
        let closing = "\"".repeat(quotes);
        match self.rest().find(&closing) {
            Some(end) => {
                self.pos += end + quotes;
                while self.byte(0) == b'"' {
                    self.pos += 1;
                }
            }
            None => self.pos = self.src.len(),
        }
    }

    fn interpolated_string(&mut self, verbatim: bool) {
        let mut depth = 0usize;
        while self.pos < self.src.len() {
            let b = self.byte(0);
            if depth == 0 {
                match b {
                    b'\\' if !verbatim => self.pos = (self.pos + 2).min(self.src.len()),
                    b'"' if verbatim && self.byte(1) == b'"' => self.pos += 2,
                    b'"' => {
                        self.pos += 1;
                        return;
                    }
                    b'{' if self.byte(1) == b'{' => self.pos += 2,
                    b'}' if self.byte(1) == b'}' => self.pos += 2,
                    b'{' => {
                        depth = 1;
                        self.pos += 1;
                    }
                    b'\r' | b'\n' if !verbatim => return,
                    _ => self.pos += 1,
                }
            } else {
                match b {
                    b'{' => {
                        depth += 1;
                        self.pos += 1;
                    }
                    b'}' => {
                        depth -= 1;
                        self.pos += 1;
                    }
                    b'"' | b'\'' | b'@' | b'$' => {
                        self.token();
                    }
                    _ => self.pos += 1,
                }
            }
        }
    }

    fn char_literal(&mut self) {
        loop {
            match self.byte(0) {
                b'\\' => self.pos = (self.pos + 2).min(self.src.len()),
                b'\'' => {
                    self.pos += 1;
                    return;
                }
                b'\r' | b'\n' => return,
                _ if self.pos >= self.src.len() => return,
                _ => self.pos += 1,
            }
        }
    }

    fn number(&mut self) {
        loop {
            let b = self.byte(0);
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else if b == b'.' && self.byte(1).is_ascii_digit() {
                self.pos += 1;
            } else if matches!(b, b'+' | b'-')
                && matches!(self.src.as_bytes().get(self.pos.wrapping_sub(1)), Some(b'e' | b'E'))
                && self.byte(1).is_ascii_digit()
            {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    fn punctuation(&mut self) -> Option<SyntaxKind> {
        const MULTI: &[&str] = &[
            "??=", "=>", "==", "!=", "&&", "||", "++", "--", "->", "??", "?.", "+=", "-=", "*=",
            "/=", "%=", "&=", "|=", "^=",
        ];
        if self.rest().starts_with("::") {
            self.pos += 2;
            return Some(SyntaxKind::ColonColon);
        }
        for op in MULTI {
            if self.rest().starts_with(op) {
                self.pos += op.len();
                return Some(if *op == "=>" {
                    SyntaxKind::FatArrow
                } else {
                    SyntaxKind::Operator
                });
            }
        }
        let kind = match self.byte(0) {
            b'{' => SyntaxKind::OpenBrace,
            b'}' => SyntaxKind::CloseBrace,
            b'(' => SyntaxKind::OpenParen,
            b')' => SyntaxKind::CloseParen,
            b'[' => SyntaxKind::OpenBracket,
            b']' => SyntaxKind::CloseBracket,
            b';' => SyntaxKind::Semicolon,
            b',' => SyntaxKind::Comma,
            b'.' => SyntaxKind::Dot,
            b':' => SyntaxKind::Colon,
            b'<' => SyntaxKind::LessThan,
            b'>' => SyntaxKind::GreaterThan,
            b'?' => SyntaxKind::Question,
            b'=' => SyntaxKind::Equals,
            b'*' => SyntaxKind::Star,
            b'~' => SyntaxKind::Tilde,
            b'+' | b'-' | b'/' | b'%' | b'&' | b'|' | b'^' | b'!' | b'#' => SyntaxKind::Operator,
            _ => return None,
        };
        self.pos += 1;
        Some(kind)
    }

    fn identifier_or_unknown(&mut self) -> SyntaxKind {
        let start = self.pos;
        if self.byte(0) == b'@' {
            self.pos += 1;
        }
        let mut first = true;
        while let Some(c) = self.current_char() {
            let ok = if first {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || c == '_'
            };
            if !ok {
                break;
            }
            first = false;
            self.pos += c.len_utf8();
        }
        if self.pos == start || (self.pos == start + 1 && self.src.as_bytes()[start] == b'@') {
            self.pos = start;
            let width = self.current_char().map(char::len_utf8).unwrap_or(1);
            self.pos += width;
            return SyntaxKind::Unknown;
        }
        // Keywords are mapped by the caller from the token text; `@class`
        // never matches one.
        SyntaxKind::Identifier
    }
}
