//! Condition mini-language
//!
//! The text between `if`/`elif` and the block colon is its own small expression
//! language, parsed here with chumsky combinators:
//!
//! ```text
//! condition   := conjunction (OR conjunction)*
//! conjunction := atom (AND atom)*
//! atom        := dotted_name '[' key ']' op (NUMBER | version)
//!              | dotted_name op (STRING | version)
//!              | '(' condition ')'
//! key         := NUMBER? ':' NUMBER? (':' NUMBER?)? | NUMBER
//! version     := '(' NUMBER ',' (NUMBER (',' NUMBER)?)? ')'
//! ```
//!
//! `and` binds tighter than `or`; both fold to the left.

use std::ops::Range;

use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use chumsky::Stream;

use super::error::{syntax_error_message, ErrorKind};
use crate::pyi::ast::{CompareOp, Condition, ConditionTarget, ConditionValue, ItemKey, Number};
use crate::pyi::lexer::{Spanned, Token, TokenKind};

/// A failed condition parse, located by byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionError {
    pub kind: ErrorKind,
    pub message: String,
    pub offset: usize,
}

fn int() -> impl Parser<Token, i64, Error = Simple<Token>> + Clone {
    filter_map(|span: Range<usize>, token: Token| match token {
        Token::Number(Number::Int(value)) => Ok(value),
        Token::Number(Number::Float(_)) => Err(Simple::custom(
            span,
            "syntax error, condition numbers must be integers",
        )),
        other => Err(Simple::expected_input_found(
            span,
            [Some(Token::Number(Number::Int(0)))],
            Some(other),
        )),
    })
}

fn dotted_name() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! { Token::Name(name) => name }
        .separated_by(just(Token::Dot))
        .at_least(1)
        .map(|parts| parts.join("."))
}

fn compare_op() -> impl Parser<Token, CompareOp, Error = Simple<Token>> + Clone {
    select! {
        Token::Lt => CompareOp::Lt,
        Token::Gt => CompareOp::Gt,
        Token::Le => CompareOp::Le,
        Token::Ge => CompareOp::Ge,
        Token::Eq => CompareOp::Eq,
        Token::Ne => CompareOp::Ne,
    }
}

fn version_tuple() -> impl Parser<Token, Vec<i64>, Error = Simple<Token>> + Clone {
    int()
        .then_ignore(just(Token::Comma))
        .then(
            int()
                .then(just(Token::Comma).ignore_then(int()).or_not())
                .or_not(),
        )
        .delimited_by(just(Token::LParen), just(Token::RParen))
        .map(|(major, rest)| {
            let mut parts = vec![major];
            if let Some((minor, micro)) = rest {
                parts.push(minor);
                parts.extend(micro);
            }
            parts
        })
}

fn item_key() -> impl Parser<Token, ItemKey, Error = Simple<Token>> + Clone {
    let slice = int()
        .or_not()
        .then_ignore(just(Token::Colon))
        .then(int().or_not())
        .then(just(Token::Colon).ignore_then(int().or_not()).or_not())
        .map(|((start, stop), step)| ItemKey::Slice {
            start,
            stop,
            step: step.flatten(),
        });
    slice.or(int().map(ItemKey::Index))
}

pub fn condition_parser() -> impl Parser<Token, Condition, Error = Simple<Token>> {
    let indexed = dotted_name()
        .then(item_key().delimited_by(just(Token::LBracket), just(Token::RBracket)))
        .then(compare_op())
        .then(
            int()
                .map(ConditionValue::Number)
                .or(version_tuple().map(ConditionValue::Version)),
        )
        .map(|(((name, key), op), value)| Condition::Compare {
            target: ConditionTarget {
                name,
                key: Some(key),
            },
            op,
            value,
        });

    let plain = dotted_name()
        .then(compare_op())
        .then(
            select! { Token::String(value) => ConditionValue::String(value) }
                .or(version_tuple().map(ConditionValue::Version)),
        )
        .map(|((name, op), value)| Condition::Compare {
            target: ConditionTarget { name, key: None },
            op,
            value,
        });

    recursive(|condition| {
        let atom = indexed
            .or(plain)
            .or(condition.delimited_by(just(Token::LParen), just(Token::RParen)));

        let conjunction = atom
            .clone()
            .then(just(Token::And).ignore_then(atom).repeated())
            .foldl(|left, right| Condition::And(Box::new(left), Box::new(right)));

        conjunction
            .clone()
            .then(just(Token::Or).ignore_then(conjunction).repeated())
            .foldl(|left, right| Condition::Or(Box::new(left), Box::new(right)))
    })
    .then_ignore(end())
}

/// Parse the tokens of one condition. `stop` is the token that ended the condition
/// (normally the block colon); running out of input is reported against it.
pub fn parse_condition(tokens: Vec<Spanned>, stop: &Spanned) -> Result<Condition, ConditionError> {
    let eoi: Range<usize> = stop.1.clone();
    let stream = Stream::from_iter(eoi, tokens.into_iter());
    condition_parser().parse(stream).map_err(|errors| {
        let first = errors.into_iter().next();
        match first {
            Some(error) => convert_error(error, stop),
            None => ConditionError {
                kind: ErrorKind::Syntax,
                message: "syntax error".to_string(),
                offset: stop.1.start,
            },
        }
    })
}

fn convert_error(error: Simple<Token>, stop: &Spanned) -> ConditionError {
    let offset = error.span().start;
    if let SimpleReason::Custom(message) = error.reason() {
        return ConditionError {
            kind: ErrorKind::Syntax,
            message: message.clone(),
            offset,
        };
    }

    let unexpected = match error.found() {
        Some(token) => token.kind(),
        None => {
            if let Token::LexError(message) = &stop.0 {
                return ConditionError {
                    kind: ErrorKind::Lex,
                    message: message.clone(),
                    offset: stop.1.start,
                };
            }
            stop.0.kind()
        }
    };

    // End of input inside a condition means the block colon was acceptable there.
    let mut expected: Vec<TokenKind> = error
        .expected()
        .map(|token| token.as_ref().map_or(TokenKind::Colon, Token::kind))
        .collect();
    expected.sort_by_key(|kind| kind.to_string());
    expected.dedup();

    ConditionError {
        kind: ErrorKind::Syntax,
        message: syntax_error_message(unexpected, &expected),
        offset,
    }
}
