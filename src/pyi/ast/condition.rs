//! Conditions of `if`/`elif` blocks
//!
//! The condition language is tiny: comparisons of a dotted name (optionally indexed or
//! sliced) against a string, a number or a version tuple, combined with `and`/`or`.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Apply the operator to an ordering of `left` relative to `right`
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Lt => ordering == Less,
            CompareOp::Gt => ordering == Greater,
            CompareOp::Le => ordering != Greater,
            CompareOp::Ge => ordering != Less,
            CompareOp::Eq => ordering == Equal,
            CompareOp::Ne => ordering != Equal,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        };
        write!(f, "{}", op)
    }
}

/// Subscript applied to the compared name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ItemKey {
    Index(i64),
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
}

/// Left-hand side of a comparison: `sys.version_info`, `sys.version_info[0]`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionTarget {
    pub name: String,
    pub key: Option<ItemKey>,
}

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConditionValue {
    String(String),
    Version(Vec<i64>),
    Number(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Condition {
    Compare {
        target: ConditionTarget,
        op: CompareOp,
        value: ConditionValue,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl fmt::Display for ConditionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.key {
            None => Ok(()),
            Some(ItemKey::Index(index)) => write!(f, "[{}]", index),
            Some(ItemKey::Slice { start, stop, step }) => {
                let part = |v: &Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
                write!(f, "[{}:{}", part(start), part(stop))?;
                if step.is_some() {
                    write!(f, ":{}", part(step))?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::String(value) => write!(f, "{:?}", value),
            ConditionValue::Number(value) => write!(f, "{}", value),
            ConditionValue::Version(parts) if parts.len() == 1 => write!(f, "({},)", parts[0]),
            ConditionValue::Version(parts) => {
                let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { target, op, value } => write!(f, "{} {} {}", target, op, value),
            Condition::And(left, right) => write!(f, "({} and {})", left, right),
            Condition::Or(left, right) => write!(f, "({} or {})", left, right),
        }
    }
}
