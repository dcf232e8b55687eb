//! Raw tokenization
//!
//! Thin wrappers over the logos lexer. The raw stream still contains layout tokens and
//! has no INDENT/DEDENT markers; see [`super::Lexer`] for the stream the parser reads.

use crate::pyi::lexer::tokens::{LexErrorKind, Token};
use logos::Logos;

/// Tokenize a string and keep spans. Lexing failures become `LexError` tokens
/// so the raw output formats can show where they happened.
pub fn tokenize_with_spans(source: &str) -> Vec<(Token, logos::Span)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let token = match result {
            Ok(token) => token,
            Err(kind) => Token::LexError(describe_error(&kind, lexer.slice())),
        };
        tokens.push((token, lexer.span()));
    }

    tokens
}

/// Human-readable message for a raw lexing failure
pub(crate) fn describe_error(kind: &LexErrorKind, slice: &str) -> String {
    match kind {
        LexErrorKind::InvalidCharacter => format!("invalid character {:?}", slice),
        LexErrorKind::InvalidNumber => format!("invalid number literal {:?}", slice),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyi::ast::Number;

    #[test]
    fn test_simple_tokenization() {
        let tokens: Vec<Token> = tokenize_with_spans("x: int")
            .into_iter()
            .map(|(token, _)| token)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Name("x".to_string()),
                Token::Colon,
                Token::Whitespace,
                Token::Name("int".to_string())
            ]
        );
    }

    #[test]
    fn test_spans_cover_source() {
        let tokens = tokenize_with_spans("def f(x=1)");
        let spans: Vec<_> = tokens.iter().map(|(_, span)| span.clone()).collect();
        assert_eq!(spans, vec![0..3, 3..4, 4..5, 5..6, 6..7, 7..8, 8..9, 9..10]);
        assert_eq!(tokens[6].0, Token::Number(Number::Int(1)));
    }

    #[test]
    fn test_errors_are_kept_with_spans() {
        let tokens = tokenize_with_spans("a $ b");
        assert_eq!(
            tokens[2],
            (Token::LexError("invalid character \"$\"".to_string()), 2..3)
        );
        assert_eq!(tokens.len(), 5);
    }
}
