//! Parser for the stub dialect
//!
//! A recursive-descent parser over the token stream produced by [`crate::pyi::lexer`].
//! Statements and type expressions are parsed by hand with one token of lookahead
//! (two where a `NAME` must be told apart from `NAME =`); the condition language of
//! `if` blocks is a separate chumsky grammar, see [`condition`].
//!
//! Semantic actions are delegated to a [`Builder`], called in source order as each
//! production is recognized. The first lexer, syntax or builder error ends the parse;
//! no partial module is ever returned.
//!
//! ## Modules
//!
//! - `cursor` - Token lookahead and expected-token bookkeeping
//! - `grammar` - Statements: classes, functions, constants, imports, `if` chains
//! - `types` - Type expressions
//! - `condition` - The `if`/`elif` condition language
//! - `error` - [`ParseError`] and message formatting

pub mod condition;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod types;

pub use error::{ErrorKind, ParseError};

use log::debug;

use crate::pyi::ast::Module;
use crate::pyi::builder::{BuildResult, Builder, StubBuilder};
use crate::pyi::config::{PyiConfig, TargetConfig};
use cursor::Cursor;

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest nesting of brackets, parentheses and indented blocks accepted in one parse
pub const MAX_DEPTH: usize = 64;

const DEPTH_EXCEEDED: &str = "memory exhausted";

/// One parse of one source. The builder is borrowed for the duration of the parse.
pub struct Parser<'src, 'b, B: Builder> {
    cursor: Cursor<'src>,
    builder: &'b mut B,
    depth: usize,
}

impl<'src, 'b, B: Builder> Parser<'src, 'b, B> {
    pub fn new(source: &'src str, builder: &'b mut B) -> Self {
        Self {
            cursor: Cursor::new(source),
            builder,
            depth: 0,
        }
    }

    /// Run a production one nesting level down, failing once [`MAX_DEPTH`] is passed
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.depth_exceeded());
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn depth_exceeded(&mut self) -> ParseError {
        let offset = self.cursor.offset();
        debug!("nesting deeper than {} at offset {}", MAX_DEPTH, offset);
        self.cursor.error_at(ErrorKind::Syntax, DEPTH_EXCEEDED, offset)
    }

    /// Run a builder callback. On failure the builder is told where the production
    /// started and the parse fails with a `Build` error at that position.
    fn call<T>(
        &mut self,
        start: usize,
        action: impl FnOnce(&mut B) -> BuildResult<T>,
    ) -> ParseResult<T> {
        action(&mut *self.builder).map_err(|error| {
            let position = self.cursor.position(start);
            debug!("builder failed at {}: {}", position, error);
            self.builder.set_error_location(position);
            ParseError::new(ErrorKind::Build, error.to_string(), position)
        })
    }
}

/// Parse `source`, driving a caller-supplied builder
pub fn parse_with<B: Builder>(source: &str, builder: &mut B) -> ParseResult<Module> {
    Parser::new(source, builder).parse_module()
}

/// Parse `source` with the default builder, resolving `if` blocks against `target`
pub fn parse_for_target(source: &str, target: &TargetConfig) -> ParseResult<Module> {
    let mut builder = StubBuilder::new(target);
    parse_with(source, &mut builder)
}

/// Parse `source` with the default builder configured from `config`
pub fn parse(source: &str, config: &PyiConfig) -> ParseResult<Module> {
    parse_for_target(source, &config.target)
}
