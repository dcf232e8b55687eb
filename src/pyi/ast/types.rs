//! Type expressions

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A numeric literal
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

// Floats compare by bit pattern so tokens can be hashed and compared exactly.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Int(value) => {
                0u8.hash(state);
                value.hash(state);
            }
            Number::Float(value) => {
                1u8.hash(state);
                value.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) => write!(f, "{:?}", value),
        }
    }
}

/// A literal used as a type parameter, e.g. `Literal[1]` or `Literal['r']`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(Number),
    String(String),
}

/// A type expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    /// A possibly dotted name: `int`, `a.b.C`
    Named(String),
    /// `Base[P1, P2, ...]`
    Generic { base: String, parameters: Vec<Type> },
    /// `A or B or ...`
    Union(Vec<Type>),
    /// `A and B and ...`
    Intersection(Vec<Type>),
    /// `NamedTuple('N', [('a', int), ...])` and `namedtuple('N', ['a', ...])`
    NamedTuple {
        name: String,
        fields: Vec<(String, Type)>,
    },
    /// `TypedDict('N', {'a': int}, total=False)`
    TypedDict {
        name: String,
        fields: Vec<(String, Type)>,
        total: bool,
    },
    Literal(Literal),
    /// `?` and `Any`
    Anything,
    /// `nothing`
    Nothing,
    /// `...` used as a type parameter
    Ellipsis,
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// The name a type is referred to by, if it has one
    pub fn base_name(&self) -> Option<&str> {
        match self {
            Type::Named(name) | Type::Generic { base: name, .. } => Some(name.as_str()),
            Type::NamedTuple { name, .. } | Type::TypedDict { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Type::Union(_) | Type::Intersection(_))
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Type], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        if item.is_compound() && separator != ", " {
            write!(f, "({})", item)?;
        } else {
            write!(f, "{}", item)?;
        }
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{}", name),
            Type::Generic { base, parameters } => {
                write!(f, "{}[", base)?;
                if parameters.is_empty() {
                    write!(f, "()")?;
                }
                write_joined(f, parameters, ", ")?;
                write!(f, "]")
            }
            Type::Union(members) => write_joined(f, members, " or "),
            Type::Intersection(members) => write_joined(f, members, " and "),
            Type::NamedTuple { name, fields } => {
                write!(f, "NamedTuple({:?}, [", name)?;
                for (i, (field, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({:?}, {})", field, ty)?;
                }
                write!(f, "])")
            }
            Type::TypedDict {
                name,
                fields,
                total,
            } => {
                write!(f, "TypedDict({:?}, {{", name)?;
                for (i, (field, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", field, ty)?;
                }
                write!(f, "}}, total={})", if *total { "True" } else { "False" })
            }
            Type::Literal(Literal::Number(number)) => write!(f, "{}", number),
            Type::Literal(Literal::String(value)) => write!(f, "{:?}", value),
            Type::Anything => write!(f, "Any"),
            Type::Nothing => write!(f, "nothing"),
            Type::Ellipsis => write!(f, "..."),
        }
    }
}
