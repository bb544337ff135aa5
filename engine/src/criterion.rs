//! Filter criteria and their wire form.
//!
//! A [`Criterion`] is an immutable binary tree: leaves compare one field
//! path against a value, inner nodes join two criteria with `and` / `or`.
//! Leaves are normally built through [`EntityField`](crate::EntityField).
//!
//! ```rust
//! use contacthub_engine::EntityKind;
//! use serde_json::json;
//!
//! let base = EntityKind::Customer.field("base");
//! let criterion = base.field("firstName").equals("Ann") & base.field("dob").is_null();
//!
//! assert_eq!(
//!     serde_json::to_value(criterion.to_wire()).unwrap(),
//!     json!({
//!         "type": "composite",
//!         "conjunction": "and",
//!         "conditions": [
//!             {"type": "atomic", "attribute": "base.firstName", "operator": "EQUALS", "value": "Ann"},
//!             {"type": "atomic", "attribute": "base.dob", "operator": "IS_NULL"}
//!         ]
//!     })
//! );
//! ```

use crate::field::EntityField;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Format of date/time values in criteria.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Comparison operators of atomic criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    NotEquals,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
    IsNotNull,
    Between,
    In,
    NotIn,
}

impl Operator {
    /// Whether the operator carries no value on the wire.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equals => "EQUALS",
            Operator::NotEquals => "NOT_EQUALS",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
            Operator::Between => "BETWEEN",
            Operator::In => "IN",
            Operator::NotIn => "NOT_IN",
        };
        f.write_str(name)
    }
}

/// Joins two criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    And,
    Or,
}

/// A value compared against a field.
///
/// Date and time values are rendered as UTC strings with a trailing `Z`;
/// strings are passed through untouched, so already formatted dates work too.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionValue(Value);

impl CriterionValue {
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for CriterionValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for CriterionValue {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl From<String> for CriterionValue {
    fn from(value: String) -> Self {
        Self(Value::from(value))
    }
}

impl From<bool> for CriterionValue {
    fn from(value: bool) -> Self {
        Self(Value::from(value))
    }
}

impl From<i32> for CriterionValue {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<i64> for CriterionValue {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<u32> for CriterionValue {
    fn from(value: u32) -> Self {
        Self(Value::from(value))
    }
}

impl From<u64> for CriterionValue {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl From<f64> for CriterionValue {
    fn from(value: f64) -> Self {
        Self(Value::from(value))
    }
}

impl From<DateTime<Utc>> for CriterionValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self(Value::from(value.format(DATE_TIME_FORMAT).to_string()))
    }
}

impl From<NaiveDateTime> for CriterionValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::from(value.and_utc())
    }
}

impl From<NaiveDate> for CriterionValue {
    fn from(value: NaiveDate) -> Self {
        Self::from(value.and_time(NaiveTime::default()))
    }
}

impl<T: Into<CriterionValue>> From<Option<T>> for CriterionValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self(Value::Null),
        }
    }
}

impl<T: Into<CriterionValue>> From<Vec<T>> for CriterionValue {
    fn from(values: Vec<T>) -> Self {
        Self(Value::Array(
            values.into_iter().map(|v| v.into().into_value()).collect(),
        ))
    }
}

/// A node of a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Compare one field
    Atomic {
        attribute: String,
        operator: Operator,
        value: Option<Value>,
    },
    /// Join two criteria
    Composite {
        left: Box<Criterion>,
        conjunction: Conjunction,
        right: Box<Criterion>,
    },
}

impl Criterion {
    /// A leaf comparing `field` with `operator`.
    ///
    /// Unary operators drop the value.
    pub fn atomic(field: &EntityField, operator: Operator, value: Option<CriterionValue>) -> Self {
        let value = if operator.is_unary() {
            None
        } else {
            value.map(CriterionValue::into_value)
        };
        Criterion::Atomic {
            attribute: field.path(),
            operator,
            value,
        }
    }

    fn join(self, conjunction: Conjunction, other: Criterion) -> Self {
        Criterion::Composite {
            left: Box::new(self),
            conjunction,
            right: Box::new(other),
        }
    }

    /// Both criteria must hold.
    pub fn and(self, other: Criterion) -> Self {
        self.join(Conjunction::And, other)
    }

    /// Either criterion must hold.
    pub fn or(self, other: Criterion) -> Self {
        self.join(Conjunction::Or, other)
    }

    /// Lower to the API's condition grammar.
    ///
    /// Composite nodes keep their binary nesting: `a & b & c` becomes a
    /// composite whose left condition is itself the composite of `a` and `b`.
    pub fn to_wire(&self) -> WireCondition<'_> {
        match self {
            Criterion::Atomic {
                attribute,
                operator,
                value,
            } => WireCondition::Atomic {
                attribute: attribute.as_str(),
                operator: *operator,
                value: value.as_ref(),
            },
            Criterion::Composite {
                left,
                conjunction,
                right,
            } => WireCondition::Composite {
                conjunction: *conjunction,
                conditions: vec![left.to_wire(), right.to_wire()],
            },
        }
    }
}

impl BitAnd for Criterion {
    type Output = Criterion;

    fn bitand(self, rhs: Criterion) -> Criterion {
        self.and(rhs)
    }
}

impl BitOr for Criterion {
    type Output = Criterion;

    fn bitor(self, rhs: Criterion) -> Criterion {
        self.or(rhs)
    }
}

/// Serialized form of a criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireCondition<'a> {
    Atomic {
        attribute: &'a str,
        operator: Operator,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<&'a Value>,
    },
    Composite {
        conjunction: Conjunction,
        conditions: Vec<WireCondition<'a>>,
    },
}

/// `field` lies between `low` and `high`.
pub fn between(
    field: &EntityField,
    low: impl Into<CriterionValue>,
    high: impl Into<CriterionValue>,
) -> Criterion {
    field.between(low, high)
}

/// `value` is one of the values held by the list at `field`.
pub fn in_set(value: impl Into<CriterionValue>, field: &EntityField) -> Criterion {
    field.in_set(value)
}

/// `value` is none of the values held by the list at `field`.
pub fn not_in_set(value: impl Into<CriterionValue>, field: &EntityField) -> Criterion {
    field.not_in_set(value)
}
