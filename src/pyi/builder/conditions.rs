//! Evaluation of `if` conditions against a target Python
//!
//! Only two names are understood: `sys.version_info` (optionally indexed or sliced)
//! and `sys.platform`. Version tuples compare with Python tuple ordering, which is the
//! lexicographic ordering of `Vec<i64>`.

use log::trace;

use super::{BuildError, BuildResult};
use crate::pyi::ast::{CompareOp, Condition, ConditionTarget, ConditionValue, ItemKey};

const VERSION_INFO: &str = "sys.version_info";
const PLATFORM: &str = "sys.platform";

pub struct ConditionEvaluator<'a> {
    version: &'a [i64],
    platform: &'a str,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(version: &'a [i64], platform: &'a str) -> Self {
        Self { version, platform }
    }

    /// Evaluate a condition; `and`/`or` short-circuit
    pub fn eval(&self, condition: &Condition) -> BuildResult<bool> {
        let result = match condition {
            Condition::And(left, right) => self.eval(left)? && self.eval(right)?,
            Condition::Or(left, right) => self.eval(left)? || self.eval(right)?,
            Condition::Compare { target, op, value } => self.compare(target, *op, value)?,
        };
        trace!("condition {} -> {}", condition, result);
        Ok(result)
    }

    fn compare(
        &self,
        target: &ConditionTarget,
        op: CompareOp,
        value: &ConditionValue,
    ) -> BuildResult<bool> {
        match target.name.as_str() {
            VERSION_INFO => self.compare_version(target.key.as_ref(), op, value),
            PLATFORM => self.compare_platform(target, op, value),
            other => Err(BuildError::UnsupportedCondition(other.to_string())),
        }
    }

    fn compare_version(
        &self,
        key: Option<&ItemKey>,
        op: CompareOp,
        value: &ConditionValue,
    ) -> BuildResult<bool> {
        match (key, value) {
            (None, ConditionValue::Version(expected)) => {
                Ok(op.holds(self.version.cmp(expected.as_slice())))
            }
            (None, _) => Err(BuildError::InvalidComparison(
                "sys.version_info must be compared to a tuple of integers".to_string(),
            )),
            (Some(ItemKey::Index(index)), ConditionValue::Number(expected)) => {
                let actual = python_index(self.version, *index)?;
                Ok(op.holds(actual.cmp(expected)))
            }
            (Some(ItemKey::Index(_)), _) => Err(BuildError::InvalidComparison(
                "an element of sys.version_info must be compared to an integer".to_string(),
            )),
            (Some(ItemKey::Slice { start, stop, step }), ConditionValue::Version(expected)) => {
                let actual = python_slice(self.version, *start, *stop, *step)?;
                Ok(op.holds(actual.as_slice().cmp(expected.as_slice())))
            }
            (Some(ItemKey::Slice { .. }), _) => Err(BuildError::InvalidComparison(
                "a slice of sys.version_info must be compared to a tuple of integers".to_string(),
            )),
        }
    }

    fn compare_platform(
        &self,
        target: &ConditionTarget,
        op: CompareOp,
        value: &ConditionValue,
    ) -> BuildResult<bool> {
        if target.key.is_some() {
            return Err(BuildError::UnsupportedCondition(target.to_string()));
        }
        let ConditionValue::String(expected) = value else {
            return Err(BuildError::InvalidComparison(
                "sys.platform must be compared to a string".to_string(),
            ));
        };
        match op {
            CompareOp::Eq => Ok(self.platform == expected),
            CompareOp::Ne => Ok(self.platform != expected),
            _ => Err(BuildError::InvalidComparison(
                "sys.platform must be compared using == or !=".to_string(),
            )),
        }
    }
}

/// `values[index]` with negative indices counting from the end
fn python_index(values: &[i64], index: i64) -> BuildResult<i64> {
    let len = values.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        Ok(values[resolved as usize])
    } else {
        Err(BuildError::InvalidComparison(format!(
            "sys.version_info index {} out of range",
            index
        )))
    }
}

/// `values[start:stop:step]` following Python's clamping rules
fn python_slice(
    values: &[i64],
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> BuildResult<Vec<i64>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(BuildError::InvalidComparison(
            "slice step cannot be zero".to_string(),
        ));
    }
    let len = values.len() as i64;

    // Forward slices clamp to [0, len]; backward slices to [-1, len - 1].
    let (low, high) = if step > 0 { (0, len) } else { (-1, len - 1) };
    let clamp = |bound: Option<i64>, default: i64| match bound {
        None => default,
        Some(i) if i < 0 => (i + len).max(low),
        Some(i) => i.min(high),
    };
    let (mut i, stop) = if step > 0 {
        (clamp(start, 0), clamp(stop, len))
    } else {
        (clamp(start, len - 1), clamp(stop, -1))
    };

    let mut result = Vec::new();
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        result.push(values[i as usize]);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(result)
}
