//! # pyi
//!
//! A parser for the `.pyi` type-stub dialect used by pytype.
//!
//! ## Testing
//!
//! For testing guidelines, see the [testing module](pyi::testing). Parser tests should
//! use the curated sample stubs and the fluent module assertions.

pub mod pyi;

pub use pyi::ast::Module;
pub use pyi::builder::{Builder, StubBuilder};
pub use pyi::config::{PyiConfig, TargetConfig};
pub use pyi::parser::{parse, parse_with, ErrorKind, ParseError};
