//! Token cursor
//!
//! Wraps the pull-based [`Lexer`] with a small lookahead buffer. Every failed `at`
//! check is remembered until the next token is consumed, so a syntax error can list
//! what would have been accepted at that point.

use std::collections::VecDeque;
use std::ops::Range;

use crate::pyi::ast::{Number, Position, SourceLocation};
use crate::pyi::lexer::{Lexer, Spanned, Token, TokenKind};

use super::error::{syntax_error_message, ErrorKind, ParseError};

pub struct Cursor<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Spanned>,
    expected: Vec<TokenKind>,
    location: SourceLocation,
    source_len: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
            expected: Vec::new(),
            location: SourceLocation::new(source),
            source_len: source.len(),
        }
    }

    /// Buffer `count` tokens. Past the end of the stream the buffer is padded with `Eof`.
    fn fill(&mut self, count: usize) {
        while self.lookahead.len() < count {
            let next = self
                .lexer
                .next()
                .unwrap_or((Token::Eof, self.source_len..self.source_len));
            self.lookahead.push_back(next);
        }
    }

    /// The token `n` positions ahead (0 is the current token)
    pub fn nth(&mut self, n: usize) -> &Token {
        self.fill(n + 1);
        &self.lookahead[n].0
    }

    pub fn nth_kind(&mut self, n: usize) -> TokenKind {
        self.nth(n).kind()
    }

    pub fn kind(&mut self) -> TokenKind {
        self.nth_kind(0)
    }

    /// A copy of the current token and its span
    pub fn current(&mut self) -> Spanned {
        self.fill(1);
        self.lookahead[0].clone()
    }

    pub fn span(&mut self) -> Range<usize> {
        self.fill(1);
        self.lookahead[0].1.clone()
    }

    /// Byte offset where the current token starts
    pub fn offset(&mut self) -> usize {
        self.span().start
    }

    /// Check the current token, recording `kind` as expected when it does not match
    pub fn at(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        if !self.expected.contains(&kind) {
            self.expected.push(kind);
        }
        false
    }

    /// The first of `kinds` matching the current token; all are recorded otherwise
    pub fn at_any(&mut self, kinds: &[TokenKind]) -> Option<TokenKind> {
        let mut found = None;
        for &kind in kinds {
            if self.at(kind) {
                found = Some(kind);
                break;
            }
        }
        found
    }

    /// Consume the current token
    pub fn bump(&mut self) -> Spanned {
        self.fill(1);
        self.expected.clear();
        self.lookahead
            .pop_front()
            .unwrap_or((Token::Eof, self.source_len..self.source_len))
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Spanned, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume a `NAME` and return its text
    pub fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.expect(TokenKind::Name)? {
            (Token::Name(name), _) => Ok(name),
            (_, span) => Err(self.error_at(ErrorKind::Syntax, "expected a name", span.start)),
        }
    }

    /// Consume a `STRING` and return its value
    pub fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.expect(TokenKind::String)? {
            (Token::String(value), _) => Ok(value),
            (_, span) => Err(self.error_at(ErrorKind::Syntax, "expected a string", span.start)),
        }
    }

    pub fn expect_number(&mut self) -> Result<Number, ParseError> {
        match self.expect(TokenKind::Number)? {
            (Token::Number(value), _) => Ok(value),
            (_, span) => Err(self.error_at(ErrorKind::Syntax, "expected a number", span.start)),
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        self.location.byte_to_position(offset)
    }

    pub fn error_at(&self, kind: ErrorKind, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(kind, message, self.position(offset))
    }

    /// Error for the current token. A `LEXERROR` token reports the lexer's message.
    pub fn unexpected(&mut self) -> ParseError {
        let (token, span) = self.current();
        match token {
            Token::LexError(message) => self.error_at(ErrorKind::Lex, message, span.start),
            other => {
                let message = syntax_error_message(other.kind(), &self.expected);
                self.error_at(ErrorKind::Syntax, message, span.start)
            }
        }
    }
}
