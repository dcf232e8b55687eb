//! Lexer for the stub dialect
//!
//! Tokenization happens in two stages, the same way indentation-sensitive formats are
//! usually handled:
//!
//! - [`tokens`]: a vanilla logos lexer producing raw tokens, layout included.
//! - [`indentation_transform`]: a pull-based [`Lexer`] that drops layout tokens, tracks
//!   the indentation stack and emits `Indent`/`Dedent`, merges `...`, and ends with `Eof`.
//!
//! The lexer never panics and never returns an error: malformed input becomes a single
//! `LexError` token, which the parser reports as the parse failure.

pub mod indentation_transform;
pub mod lexer_impl;
pub mod tokens;

pub use indentation_transform::{Lexer, Spanned};
pub use lexer_impl::tokenize_with_spans;
pub use tokens::{LexErrorKind, Token, TokenKind, TypeComment};

/// Lex a whole source into the grammar token stream (always ends with `Eof`)
pub fn lex(source: &str) -> Vec<Spanned> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_empty_source() {
        assert_eq!(lex(""), vec![(Token::Eof, 0..0)]);
    }

    #[test]
    fn test_lex_only_comments() {
        let tokens: Vec<Token> = lex("# header\n\n# footer\n")
            .into_iter()
            .map(|(token, _)| token)
            .collect();
        assert_eq!(tokens, vec![Token::Eof]);
    }
}
