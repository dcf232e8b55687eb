//! Parse errors
//!
//! Every failure, whatever its origin, ends the parse with a single [`ParseError`].

use serde::Serialize;
use thiserror::Error;

use crate::pyi::ast::Position;
use crate::pyi::lexer::TokenKind;

/// Expected-token lists longer than this are left out of the message
const MAX_EXPECTED: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// A `LEXERROR` token reached the parser
    Lex,
    /// No production accepts the current token
    Syntax,
    /// A builder callback failed
    Build,
}

/// A terminal parse failure; `line` and `column` are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            line: position.line + 1,
            column: position.column + 1,
        }
    }

    /// 0-based position of the error
    pub fn position(&self) -> Position {
        Position::new(self.line - 1, self.column - 1)
    }
}

/// Format a bison-style message: `syntax error, unexpected X, expecting A or B`
pub fn syntax_error_message(unexpected: TokenKind, expected: &[TokenKind]) -> String {
    let mut message = format!("syntax error, unexpected {}", unexpected);
    if !expected.is_empty() && expected.len() <= MAX_EXPECTED {
        let names: Vec<String> = expected.iter().map(|kind| kind.to_string()).collect();
        message.push_str(", expecting ");
        message.push_str(&names.join(" or "));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_with_expected_kinds() {
        assert_eq!(
            syntax_error_message(TokenKind::Name, &[TokenKind::Colon, TokenKind::LParen]),
            "syntax error, unexpected NAME, expecting ':' or '('"
        );
    }

    #[test]
    fn test_long_expected_lists_are_dropped() {
        let expected = [
            TokenKind::Name,
            TokenKind::Class,
            TokenKind::Def,
            TokenKind::If,
            TokenKind::Import,
        ];
        assert_eq!(
            syntax_error_message(TokenKind::RParen, &expected),
            "syntax error, unexpected ')'"
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let error = ParseError::new(ErrorKind::Syntax, "boom", Position::new(0, 4));
        assert_eq!((error.line, error.column), (1, 5));
        assert_eq!(error.position(), Position::new(0, 4));
        assert_eq!(error.to_string(), "boom (line 1, column 5)");
    }
}
