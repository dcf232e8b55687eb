//! Parser for the pytype `.pyi` stub dialect
//!
//! The pipeline is:
//!
//!   source text -> [lexer] (tokens + INDENT/DEDENT) -> [parser] -> [builder] callbacks -> Module
//!
//! The parser never builds final nodes on its own: every reduction is handed to a
//! [`builder::Builder`], which is borrowed for the duration of a parse. The default
//! [`builder::StubBuilder`] resolves `if sys.version_info ...` blocks against a
//! configured target, see [`config`].

pub mod ast;
pub mod builder;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod processor;
pub mod testing;
