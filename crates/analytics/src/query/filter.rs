//! Record filtering.
//!
//! Predicates never fail: a null field matches nothing but `IsNull`, and
//! ordering comparisons between non-comparable values are simply false.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use tally_core::{ClientRecord, FieldValue};

use crate::accessor::FieldAccessors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

/// One predicate against a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field_name: String,
    pub operator: FilterOperator,
    #[serde(default = "null_value")]
    pub value: FieldValue,
}

fn null_value() -> FieldValue {
    FieldValue::Null
}

impl FilterRule {
    pub fn new(
        field_name: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn is_null(field_name: impl Into<String>) -> Self {
        Self::new(field_name, FilterOperator::IsNull, FieldValue::Null)
    }

    pub fn is_not_null(field_name: impl Into<String>) -> Self {
        Self::new(field_name, FilterOperator::IsNotNull, FieldValue::Null)
    }

    /// Evaluate this rule against an already-resolved field value.
    pub fn matches(&self, actual: &FieldValue) -> bool {
        use FilterOperator::*;

        match self.operator {
            IsNull => return actual.is_null(),
            IsNotNull => return !actual.is_null(),
            _ if actual.is_null() => return false,
            _ => {}
        }

        match self.operator {
            Equals => values_equal(actual, &self.value),
            NotEquals => !values_equal(actual, &self.value),
            GreaterThan => compare(actual, &self.value) == Some(Ordering::Greater),
            LessThan => compare(actual, &self.value) == Some(Ordering::Less),
            GreaterOrEqual => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            LessOrEqual => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Contains => text_match(actual, &self.value, |h, n| h.contains(n)),
            StartsWith => text_match(actual, &self.value, |h, n| h.starts_with(n)),
            EndsWith => text_match(actual, &self.value, |h, n| h.ends_with(n)),
            IsNull | IsNotNull => unreachable!("handled above"),
        }
    }
}

/// True when `record` passes every rule.
pub fn matches_all(record: &ClientRecord, rules: &[FilterRule], accessors: &FieldAccessors) -> bool {
    rules
        .iter()
        .all(|rule| rule.matches(&accessors.resolve(record, &rule.field_name)))
}

/// Ordering between two values of the same comparable family: numbers or
/// timestamps. Anything else is incomparable.
pub(crate) fn compare(a: &FieldValue, b: &FieldValue) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_timestamp(), b.as_timestamp()) {
        return Some(x.cmp(&y));
    }
    None
}

fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return (x - y).abs() <= f64::EPSILON * x.abs().max(y.abs());
    }
    if let (Some(x), Some(y)) = (a.as_timestamp(), b.as_timestamp()) {
        return x == y;
    }
    if b.is_null() {
        return false;
    }
    a.to_string().to_lowercase() == b.to_string().to_lowercase()
}

fn text_match(actual: &FieldValue, needle: &FieldValue, op: fn(&str, &str) -> bool) -> bool {
    if needle.is_null() {
        return false;
    }
    let haystack = actual.to_string().to_lowercase();
    let needle = needle.to_string().to_lowercase();
    op(&haystack, &needle)
}
