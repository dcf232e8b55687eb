//! AST definitions for parsed stubs
//!
//! ## Modules
//!
//! - `types` - Type expressions and numeric literals
//! - `condition` - The `if`/`elif` condition language
//! - `node` - Module, definitions and their parts
//! - `position` - Source location utilities for converting byte offsets
//! - `treeviz` - Tree rendering used by the `ast-treeviz` output format

pub mod condition;
pub mod node;
pub mod position;
pub mod treeviz;
pub mod types;

pub use condition::{CompareOp, Condition, ConditionTarget, ConditionValue, ItemKey};
pub use node::{
    Alias, AliasValue, AstNode, BodyStmt, ClassDef, Constant, Definition, FuncDef, Import,
    ImportItem, Module, Param, ParamDefault, ParamKind, Parent, TypeVarDef,
};
pub use position::{Position, SourceLocation};
pub use treeviz::to_treeviz_str;
pub use types::{Literal, Number, Type};
