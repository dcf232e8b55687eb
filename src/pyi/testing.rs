//! Testing utilities for module assertions
//!
//! # Parser Testing Guidelines
//!
//! Parser tests should check the shape and content of the parsed [`Module`], not just
//! that parsing succeeded. Two tools help with that:
//!
//! 1. **[StubSources](crate::pyi::processor::stub_sources::StubSources)** - curated
//!    sample stubs under `docs/samples/`, for anything larger than a few lines
//! 2. **[assert_module]** - a fluent API over the parsed module
//!
//! ```rust,ignore
//! use pyi::pyi::processor::stub_sources::StubSources;
//! use pyi::pyi::testing::assert_module;
//!
//! let source = StubSources::get_string("020-classes.pyi")?;
//! let module = parse(&source, &config)?;
//!
//! assert_module(&module)
//!     .definition_names(&["Empty", "Base", "Derived", "Point", "Movie"])
//!     .named("Base", |d| {
//!         d.assert_class()
//!             .bases(&["object"])
//!             .member("size", |m| {
//!                 m.assert_function().decorators(&["property"]).return_type("int");
//!             });
//!     });
//! ```
//!
//! Types, parameters and bases are compared through their `Display` rendering, so
//! expectations read like the stub source.
//!
//! [`Module`]: crate::pyi::ast::Module

mod testing_assertions;
mod testing_matchers;

pub use testing_assertions::{
    assert_module, AliasAssertion, ClassAssertion, ConstantAssertion, DefinitionAssertion,
    FunctionAssertion, ModuleAssertion, ParamAssertion, TypeVarAssertion,
};
pub use testing_matchers::StubMatch;
