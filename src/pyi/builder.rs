//! Semantic actions
//!
//! The parser does not construct final nodes itself. Each time a production is
//! recognized it calls the matching [`Builder`] method, in source order, and moves the
//! child values into the call. A failing callback aborts the parse.
//!
//! `if` chains are resolved while parsing: the parser calls [`Builder::if_begin`]
//! before the first branch body, [`Builder::if_elif`] / [`Builder::if_else`] before each
//! later body, and splices whatever [`Builder::if_end`] returns into the surrounding
//! definition list.
//!
//! [`StubBuilder`] is the default implementation.

pub mod conditions;
pub mod stub_builder;

pub use stub_builder::StubBuilder;

use thiserror::Error;

use crate::pyi::ast::{
    AliasValue, BodyStmt, Condition, Definition, ImportItem, Module, Number, Param, Parent,
    Position, Type,
};

/// Failures raised by builder callbacks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Unsupported condition: '{0}'")]
    UnsupportedCondition(String),
    #[error("{0}")]
    InvalidComparison(String),
    #[error("TypeVar name needs to be {expected:?} (not {found:?})")]
    TypeVarNameMismatch { expected: String, found: String },
    #[error("Duplicate TypeVar name: {0}")]
    DuplicateTypeVar(String),
    #[error("Unrecognized keyword argument {0:?} for TypeVar")]
    InvalidTypeVarArgument(String),
    #[error("Duplicate field name {field:?} in {name}")]
    DuplicateField { name: String, field: String },
    #[error("Unrecognized keyword argument {0:?} for TypedDict")]
    InvalidTypedDictArgument(String),
    #[error("Illegal value for 'total' argument: {0}")]
    InvalidTotal(String),
    #[error("Unexpected class keyword {0:?}")]
    InvalidClassKeyword(String),
    #[error("Duplicate class keyword {0:?}")]
    DuplicateClassKeyword(String),
    #[error("Duplicate parameter name {name:?} in function {function}")]
    DuplicateParameter { function: String, name: String },
    #[error("{0}")]
    Custom(String),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Right-hand side of `NAME = ...` constant forms
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Type(Type),
    Number(Number),
    String(String),
}

/// Keyword argument value of a `TypeVar(...)` call
#[derive(Debug, Clone, PartialEq)]
pub enum TypeVarArg {
    Type(Type),
    String(String),
}

/// Semantic-action interface the parser drives
pub trait Builder {
    /// A named type. `parameters` is `None` without brackets and `Some(vec![])` for
    /// `Name[()]`.
    fn new_type(&mut self, name: &str, parameters: Option<Vec<Type>>) -> BuildResult<Type>;

    /// `a or b or ...`; called once per run of same-operator operands
    fn new_union_type(&mut self, members: Vec<Type>) -> BuildResult<Type>;

    /// `a and b and ...`; called once per run of same-operator operands
    fn new_intersection_type(&mut self, members: Vec<Type>) -> BuildResult<Type>;

    fn new_named_tuple(&mut self, name: &str, fields: Vec<(String, Type)>) -> BuildResult<Type>;

    /// `kwarg` is the optional trailing `NAME = type` argument
    fn new_typed_dict(
        &mut self,
        name: &str,
        fields: Vec<(String, Type)>,
        kwarg: Option<(String, Type)>,
    ) -> BuildResult<Type>;

    fn new_class(
        &mut self,
        decorators: Vec<String>,
        name: &str,
        bases: Vec<Parent>,
        members: Vec<Definition>,
    ) -> BuildResult<Definition>;

    fn new_function(
        &mut self,
        decorators: Vec<String>,
        is_async: bool,
        name: &str,
        params: Vec<Param>,
        return_type: Type,
        body: Vec<BodyStmt>,
    ) -> BuildResult<Definition>;

    fn new_constant(&mut self, name: &str, value: ConstantValue) -> BuildResult<Definition>;

    /// `from` is `None` for plain `import` statements
    fn add_import(&mut self, from: Option<String>, items: Vec<ImportItem>) -> BuildResult<()>;

    /// `name = TypeVar(param_name, *constraints, **kwargs)`
    fn add_type_var(
        &mut self,
        name: &str,
        param_name: &str,
        constraints: Vec<Type>,
        kwargs: Vec<(String, TypeVarArg)>,
    ) -> BuildResult<()>;

    /// Called as soon as a class name is read, before its parents and body
    fn register_class_name(&mut self, name: &str) -> BuildResult<()>;

    /// Module-level `NAME = type` and `NAME = [strings]`
    fn add_alias_or_constant(&mut self, name: &str, value: AliasValue) -> BuildResult<()>;

    /// Class-level `NAME = type` and `NAME = [strings]`; the result becomes a member
    fn new_alias_or_constant(&mut self, name: &str, value: AliasValue)
        -> BuildResult<Definition>;

    fn if_begin(&mut self, condition: Condition) -> BuildResult<()>;

    fn if_elif(&mut self, condition: Condition) -> BuildResult<()>;

    fn if_else(&mut self) -> BuildResult<()>;

    /// Receives the bodies of every branch in order and returns the definitions to splice
    fn if_end(&mut self, branches: Vec<Vec<Definition>>) -> BuildResult<Vec<Definition>>;

    /// Produce the final result from the top-level definitions
    fn build_module(&mut self, definitions: Vec<Definition>) -> BuildResult<Module>;

    fn anything(&self) -> Type {
        Type::Anything
    }

    fn nothing(&self) -> Type {
        Type::Nothing
    }

    fn ellipsis(&self) -> Type {
        Type::Ellipsis
    }

    fn tuple(&self) -> Type {
        Type::named("tuple")
    }

    /// Told where the production that triggered a failing callback starts
    fn set_error_location(&mut self, _location: Position) {}
}
