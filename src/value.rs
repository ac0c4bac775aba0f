//! The filter sub-language's value domain: a JSON value, or `Nothing`.
//!
//! `Nothing` is what a path expression evaluates to when it matches no
//! node. It is distinct from JSON `null`, which is a concrete value that
//! happens to be present. The two compare differently (see
//! [`FilterValue::compare`]).

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Nothing,
    Value(Value),
}

impl FilterValue {
    pub fn is_nothing(&self) -> bool {
        matches!(self, FilterValue::Nothing)
    }

    /// Existence-based truthiness: any concrete value (including `null`,
    /// `false`, and `0`) is truthy; only `Nothing` is falsy.
    pub fn is_truthy(&self) -> bool {
        !self.is_nothing()
    }

    /// Equality used by `==`/`!=`. `Nothing == Nothing` is true;
    /// `Nothing` never equals a concrete value, including `null`.
    pub fn values_equal(&self, other: &FilterValue) -> bool {
        match (self, other) {
            (FilterValue::Nothing, FilterValue::Nothing) => true,
            (FilterValue::Nothing, _) | (_, FilterValue::Nothing) => false,
            (FilterValue::Value(a), FilterValue::Value(b)) => a == b,
        }
    }

    /// Ordering used by `<`, `<=`, `>`, `>=`. Returns `None` when the two
    /// operands are not comparable (different concrete JSON types, or
    /// exactly one side is `Nothing`) — callers resolve `None` to `false`,
    /// except that a reflexive comparison (`<=`/`>=`) of `Nothing` with
    /// itself is true by convention even though no ordering exists.
    pub fn partial_compare(&self, other: &FilterValue) -> Option<Ordering> {
        match (self, other) {
            (FilterValue::Nothing, FilterValue::Nothing) => None,
            (FilterValue::Nothing, _) | (_, FilterValue::Nothing) => None,
            (FilterValue::Value(a), FilterValue::Value(b)) => compare_json(a, b),
        }
    }

    pub fn both_nothing(&self, other: &FilterValue) -> bool {
        self.is_nothing() && other.is_nothing()
    }
}

fn compare_json(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().and_then(|a| b.as_f64().and_then(|b| a.partial_cmp(&b)))
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
