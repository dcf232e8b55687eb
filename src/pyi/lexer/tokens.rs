//! Token definitions for the stub dialect
//!
//! Raw tokens are produced by the logos derive below. Layout tokens (`Whitespace`,
//! `Newline`) only exist in the raw stream; the [`Lexer`](super::Lexer) turns them into
//! the synthetic `Indent`/`Dedent` markers the grammar consumes. Variants without a
//! logos attribute (`Ellipsis`, `Indent`, `Dedent`, `LexError`, `Eof`) are synthetic.

use logos::{Filter, Lexer, Logos};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::pyi::ast::Number;

/// Failures reported by the raw tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid character")]
    InvalidCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string")]
    UnterminatedTripleQuote,
    #[error("invalid number literal")]
    InvalidNumber,
}

/// The two flavours of `# type:` comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeComment {
    /// `# type:` followed by a type expression
    Type,
    /// `# type: ignore`, with any bracketed error codes already consumed
    Ignore,
}

/// All tokens of the stub dialect
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[logos(error = LexErrorKind)]
#[logos(skip r"\\\r?\n")]
pub enum Token {
    // Layout (raw stream only)
    #[regex(r"[ \t\x0C\r]+")]
    Whitespace,
    #[token("\n")]
    Newline,

    // Comments are skipped unless they are type comments
    #[token("#", lex_comment)]
    TypeComment(TypeComment),

    // Keywords
    #[token("async")]
    Async,
    #[token("class")]
    Class,
    #[token("def")]
    Def,
    #[token("else")]
    Else,
    #[token("elif")]
    Elif,
    #[token("if")]
    If,
    #[token("or")]
    Or,
    #[token("and")]
    And,
    #[token("pass")]
    Pass,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("as")]
    As,
    #[token("raise")]
    Raise,
    #[token("nothing")]
    Nothing,
    #[token("NamedTuple")]
    NamedTuple,
    #[token("namedtuple")]
    CollNamedTuple,
    #[token("TypedDict")]
    TypedDict,
    #[token("TypeVar")]
    TypeVar,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),

    #[regex(r"-?[0-9]+", lex_int)]
    #[regex(r"-?0[xX][0-9a-fA-F]+", lex_hex)]
    #[regex(r"-?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?", lex_float)]
    #[regex(r"-?[0-9]+[eE][-+]?[0-9]+", lex_float)]
    Number(Number),

    #[regex(r#"[bBuUrRfF]{0,2}"([^"\\\n]|\\.)*""#, lex_string)]
    #[regex(r"[bBuUrRfF]{0,2}'([^'\\\n]|\\.)*'", lex_string)]
    #[regex(r#"[bBuUrRfF]{0,2}"([^"\\\n]|\\.)*"#, unterminated_string)]
    #[regex(r"[bBuUrRfF]{0,2}'([^'\\\n]|\\.)*", unterminated_string)]
    String(String),

    #[regex(r#"[bBuUrRfF]{0,2}""""#, lex_triple_quoted)]
    #[regex(r"[bBuUrRfF]{0,2}'''", lex_triple_quoted)]
    TripleQuoted,

    // Operators and punctuation
    #[token("->")]
    Arrow,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("=")]
    Assign,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("@")]
    At,
    #[token("?")]
    Question,

    // Synthetic tokens
    /// Three adjacent dots, merged by the lexer
    Ellipsis,
    Indent,
    Dedent,
    /// A lexing failure; always the last token before `Eof`
    LexError(String),
    Eof,
}

/// Payload-free token classification, used for expected-token sets in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Newline,
    TypeComment,
    TypeIgnore,
    Async,
    Class,
    Def,
    Else,
    Elif,
    If,
    Or,
    And,
    Pass,
    Import,
    From,
    As,
    Raise,
    Nothing,
    NamedTuple,
    CollNamedTuple,
    TypedDict,
    TypeVar,
    Name,
    Number,
    String,
    TripleQuoted,
    Arrow,
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
    Colon,
    LParen,
    RParen,
    Comma,
    Assign,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Star,
    At,
    Question,
    Ellipsis,
    Indent,
    Dedent,
    LexError,
    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Whitespace => TokenKind::Whitespace,
            Token::Newline => TokenKind::Newline,
            Token::TypeComment(TypeComment::Type) => TokenKind::TypeComment,
            Token::TypeComment(TypeComment::Ignore) => TokenKind::TypeIgnore,
            Token::Async => TokenKind::Async,
            Token::Class => TokenKind::Class,
            Token::Def => TokenKind::Def,
            Token::Else => TokenKind::Else,
            Token::Elif => TokenKind::Elif,
            Token::If => TokenKind::If,
            Token::Or => TokenKind::Or,
            Token::And => TokenKind::And,
            Token::Pass => TokenKind::Pass,
            Token::Import => TokenKind::Import,
            Token::From => TokenKind::From,
            Token::As => TokenKind::As,
            Token::Raise => TokenKind::Raise,
            Token::Nothing => TokenKind::Nothing,
            Token::NamedTuple => TokenKind::NamedTuple,
            Token::CollNamedTuple => TokenKind::CollNamedTuple,
            Token::TypedDict => TokenKind::TypedDict,
            Token::TypeVar => TokenKind::TypeVar,
            Token::Name(_) => TokenKind::Name,
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
            Token::TripleQuoted => TokenKind::TripleQuoted,
            Token::Arrow => TokenKind::Arrow,
            Token::Eq => TokenKind::Eq,
            Token::Ne => TokenKind::Ne,
            Token::Le => TokenKind::Le,
            Token::Ge => TokenKind::Ge,
            Token::Lt => TokenKind::Lt,
            Token::Gt => TokenKind::Gt,
            Token::Colon => TokenKind::Colon,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::Comma => TokenKind::Comma,
            Token::Assign => TokenKind::Assign,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::LBrace => TokenKind::LBrace,
            Token::RBrace => TokenKind::RBrace,
            Token::Dot => TokenKind::Dot,
            Token::Star => TokenKind::Star,
            Token::At => TokenKind::At,
            Token::Question => TokenKind::Question,
            Token::Ellipsis => TokenKind::Ellipsis,
            Token::Indent => TokenKind::Indent,
            Token::Dedent => TokenKind::Dedent,
            Token::LexError(_) => TokenKind::LexError,
            Token::Eof => TokenKind::Eof,
        }
    }

    /// Check if this token opens a bracketed region
    pub fn is_open_bracket(&self) -> bool {
        matches!(self, Token::LParen | Token::LBracket | Token::LBrace)
    }

    /// Check if this token closes a bracketed region
    pub fn is_close_bracket(&self) -> bool {
        matches!(self, Token::RParen | Token::RBracket | Token::RBrace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Newline => "NEWLINE",
            TokenKind::TypeComment => "TYPECOMMENT",
            TokenKind::TypeIgnore => "TYPEIGNORE",
            TokenKind::Async => "ASYNC",
            TokenKind::Class => "CLASS",
            TokenKind::Def => "DEF",
            TokenKind::Else => "ELSE",
            TokenKind::Elif => "ELIF",
            TokenKind::If => "IF",
            TokenKind::Or => "OR",
            TokenKind::And => "AND",
            TokenKind::Pass => "PASS",
            TokenKind::Import => "IMPORT",
            TokenKind::From => "FROM",
            TokenKind::As => "AS",
            TokenKind::Raise => "RAISE",
            TokenKind::Nothing => "NOTHING",
            TokenKind::NamedTuple => "NAMEDTUPLE",
            TokenKind::CollNamedTuple => "COLL_NAMEDTUPLE",
            TokenKind::TypedDict => "TYPEDDICT",
            TokenKind::TypeVar => "TYPEVAR",
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::TripleQuoted => "TRIPLEQUOTED",
            TokenKind::Arrow => "ARROW",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Le => "LE",
            TokenKind::Ge => "GE",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Colon => "':'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Assign => "'='",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Dot => "'.'",
            TokenKind::Star => "'*'",
            TokenKind::At => "'@'",
            TokenKind::Question => "'?'",
            TokenKind::Ellipsis => "ELLIPSIS",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::LexError => "LEXERROR",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "<NAME:{}>", name),
            Token::Number(number) => write!(f, "<NUMBER:{}>", number),
            Token::String(value) => write!(f, "<STRING:{:?}>", value),
            Token::LexError(message) => write!(f, "<LEXERROR:{}>", message),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

/// Skip an ordinary comment, or emit a type-comment marker.
///
/// `# type: ignore...` swallows the rest of the line. Any other `# type:` comment only
/// consumes the marker so the type that follows is tokenized normally.
fn lex_comment(lex: &mut Lexer<Token>) -> Filter<TypeComment> {
    let rest = lex.remainder();
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let line = &rest[..line_len];
    let body = line.trim_start_matches(|c: char| c == ' ' || c == '\t');

    if let Some(after) = body.strip_prefix("type:") {
        let argument = after.trim_start_matches(|c: char| c == ' ' || c == '\t');
        if is_ignore_marker(argument) {
            lex.bump(line_len);
            return Filter::Emit(TypeComment::Ignore);
        }
        lex.bump(line.len() - after.len());
        return Filter::Emit(TypeComment::Type);
    }

    lex.bump(line_len);
    Filter::Skip
}

fn is_ignore_marker(argument: &str) -> bool {
    match argument.strip_prefix("ignore") {
        Some(tail) => !tail.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    }
}

fn lex_int(lex: &mut Lexer<Token>) -> Result<Number, LexErrorKind> {
    lex.slice()
        .parse::<i64>()
        .map(Number::Int)
        .map_err(|_| LexErrorKind::InvalidNumber)
}

fn lex_hex(lex: &mut Lexer<Token>) -> Result<Number, LexErrorKind> {
    let slice = lex.slice();
    let (negative, literal) = match slice.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, slice),
    };
    let value =
        i64::from_str_radix(&literal[2..], 16).map_err(|_| LexErrorKind::InvalidNumber)?;
    Ok(Number::Int(if negative { -value } else { value }))
}

fn lex_float(lex: &mut Lexer<Token>) -> Result<Number, LexErrorKind> {
    lex.slice()
        .parse::<f64>()
        .map(Number::Float)
        .map_err(|_| LexErrorKind::InvalidNumber)
}

/// Decode a complete single-line string literal (prefix and quotes included in the slice)
fn lex_string(lex: &mut Lexer<Token>) -> Result<String, LexErrorKind> {
    let slice = lex.slice();
    let quote_at = slice
        .find(|c: char| c == '"' || c == '\'')
        .ok_or(LexErrorKind::UnterminatedString)?;
    let raw = slice[..quote_at].contains(|c: char| c == 'r' || c == 'R');
    let body = &slice[quote_at + 1..slice.len() - 1];
    Ok(if raw {
        body.to_string()
    } else {
        unescape(body)
    })
}

fn unterminated_string(_lex: &mut Lexer<Token>) -> Result<String, LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

/// Consume a docstring up to and including its closing delimiter
fn lex_triple_quoted(lex: &mut Lexer<Token>) -> Result<(), LexErrorKind> {
    let slice = lex.slice();
    let delimiter = &slice[slice.len() - 3..];
    let rest = lex.remainder();

    let mut chars = rest.char_indices();
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if rest[offset..].starts_with(delimiter) {
            lex.bump(offset + delimiter.len());
            return Ok(());
        }
    }
    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedTripleQuote)
}

fn unescape(body: &str) -> String {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some('\\') => value.push('\\'),
            Some('\'') => value.push('\''),
            Some('"') => value.push('"'),
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}
