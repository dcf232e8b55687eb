//! AST node type definitions and trait implementations
//!
//! A [`Module`] holds the definitions of a stub in declaration order. Imports, type
//! variables and module-level aliases are kept in their own lists because the parser
//! hands them to the builder as side effects rather than as definitions.

use serde::Serialize;
use std::fmt;

use super::types::{Number, Type};

// ============================================================================
// AST Traits
// ============================================================================

/// Common interface for all AST nodes
pub trait AstNode {
    fn node_type(&self) -> &'static str;
    fn display_label(&self) -> String;
}

// ============================================================================
// AST Node Definitions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Module {
    pub definitions: Vec<Definition>,
    pub aliases: Vec<Alias>,
    pub imports: Vec<Import>,
    pub type_vars: Vec<TypeVarDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    Constant(Constant),
    Alias(Alias),
    Function(FuncDef),
    Class(ClassDef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alias {
    pub name: String,
    pub value: AliasValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AliasValue {
    Type(Type),
    /// `__all__ = ['a', 'b']`
    StringList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDef {
    pub decorators: Vec<String>,
    pub name: String,
    pub bases: Vec<Parent>,
    pub members: Vec<Definition>,
}

/// One entry of a class parent list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Parent {
    Type(Type),
    /// `metaclass=Meta`, `total=False`
    Keyword { name: String, value: Type },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDef {
    pub decorators: Vec<String>,
    pub is_async: bool,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<BodyStmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamKind {
    Positional,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
    /// A bare `*`
    KeywordOnlyMarker,
    /// `...` standing for any further arguments
    Ellipsis,
}

/// A parameter; `name` is spelled as written, stars included
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    #[serde(rename = "type")]
    pub ty: Type,
    pub default: Option<ParamDefault>,
}

impl Param {
    /// The parameter name without its leading stars
    pub fn bare_name(&self) -> &str {
        self.name.trim_start_matches('*')
    }
}

/// Default values are echoed, never evaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamDefault {
    Name(String),
    Number(Number),
    Ellipsis,
}

/// Statements allowed in a function body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BodyStmt {
    Assign { name: String, value: Type },
    Raise(Type),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// `None` for `import a.b`; the package (dots kept) for `from ... import`
    pub from: Option<String>,
    pub items: Vec<ImportItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportItem {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeVarDef {
    pub name: String,
    pub constraints: Vec<Type>,
    pub bound: Option<Type>,
    pub covariant: bool,
    pub contravariant: bool,
}

// ============================================================================
// Accessors
// ============================================================================

impl Module {
    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Constant(constant) => Some(constant),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Class(class) => Some(class),
            _ => None,
        })
    }

    /// First definition with the given name
    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    pub fn find_alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.name == name)
    }
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Constant(constant) => &constant.name,
            Definition::Alias(alias) => &alias.name,
            Definition::Function(function) => &function.name,
            Definition::Class(class) => &class.name,
        }
    }
}

impl ClassDef {
    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.members.iter().find(|d| d.name() == name)
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for AliasValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasValue::Type(ty) => write!(f, "{}", ty),
            AliasValue::StringList(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("{:?}", s)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Type(ty) => write!(f, "{}", ty),
            Parent::Keyword { name, value } => write!(f, "{}={}", name, value),
        }
    }
}

impl fmt::Display for ParamDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamDefault::Name(name) => write!(f, "{}", name),
            ParamDefault::Number(number) => write!(f, "{}", number),
            ParamDefault::Ellipsis => write!(f, "..."),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if matches!(self.kind, ParamKind::KeywordOnlyMarker | ParamKind::Ellipsis) {
            return Ok(());
        }
        write!(f, ": {}", self.ty)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

impl fmt::Display for ImportItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} as {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AstNode for Definition {
    fn node_type(&self) -> &'static str {
        match self {
            Definition::Constant(_) => "Constant",
            Definition::Alias(_) => "Alias",
            Definition::Function(_) => "Function",
            Definition::Class(_) => "Class",
        }
    }

    fn display_label(&self) -> String {
        match self {
            Definition::Constant(constant) => constant.display_label(),
            Definition::Alias(alias) => alias.display_label(),
            Definition::Function(function) => function.display_label(),
            Definition::Class(class) => class.display_label(),
        }
    }
}

impl AstNode for Constant {
    fn node_type(&self) -> &'static str {
        "Constant"
    }

    fn display_label(&self) -> String {
        format!("{}: {}", self.name, self.ty)
    }
}

impl AstNode for Alias {
    fn node_type(&self) -> &'static str {
        "Alias"
    }

    fn display_label(&self) -> String {
        format!("{} = {}", self.name, self.value)
    }
}

impl AstNode for FuncDef {
    fn node_type(&self) -> &'static str {
        "Function"
    }

    fn display_label(&self) -> String {
        let prefix = if self.is_async { "async " } else { "" };
        format!(
            "{}{}({}) -> {}",
            prefix,
            self.name,
            join(&self.params),
            self.return_type
        )
    }
}

impl AstNode for ClassDef {
    fn node_type(&self) -> &'static str {
        "Class"
    }

    fn display_label(&self) -> String {
        if self.bases.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, join(&self.bases))
        }
    }
}

impl AstNode for Import {
    fn node_type(&self) -> &'static str {
        "Import"
    }

    fn display_label(&self) -> String {
        match &self.from {
            Some(package) => format!("from {} import {}", package, join(&self.items)),
            None => format!("import {}", join(&self.items)),
        }
    }
}

impl AstNode for TypeVarDef {
    fn node_type(&self) -> &'static str {
        "TypeVar"
    }

    fn display_label(&self) -> String {
        let mut parts = vec![format!("{:?}", self.name)];
        parts.extend(self.constraints.iter().map(|c| c.to_string()));
        if let Some(bound) = &self.bound {
            parts.push(format!("bound={}", bound));
        }
        if self.covariant {
            parts.push("covariant=True".to_string());
        }
        if self.contravariant {
            parts.push("contravariant=True".to_string());
        }
        format!("{} = TypeVar({})", self.name, parts.join(", "))
    }
}
