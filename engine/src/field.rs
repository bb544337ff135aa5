//! Lazily built field paths used to write criteria.

use crate::criterion::{Criterion, CriterionValue, Operator};
use crate::path::split_dotted;
use crate::schema::EntityKind;
use std::fmt;

/// A dotted field path on an entity, e.g. `base.contacts.email` on a
/// customer.
///
/// Names are never checked against data; any name extends the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityField {
    entity: EntityKind,
    path: Vec<String>,
}

impl EntityField {
    /// A field on `entity`. Dotted names are split into segments.
    pub fn new(entity: EntityKind, name: impl Into<String>) -> Self {
        Self {
            entity,
            path: Vec::new(),
        }
        .field(name)
    }

    /// Extend the path with `name`.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut path = self.path.clone();
        path.extend(split_dotted(&name).map(str::to_string));
        Self {
            entity: self.entity,
            path,
        }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// The dotted path.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    fn compare(&self, operator: Operator, value: impl Into<CriterionValue>) -> Criterion {
        Criterion::atomic(self, operator, Some(value.into()))
    }

    /// `EQUALS`, or `IS_NULL` when comparing with null.
    pub fn equals(&self, value: impl Into<CriterionValue>) -> Criterion {
        let value = value.into();
        if value.is_null() {
            self.is_null()
        } else {
            self.compare(Operator::Equals, value)
        }
    }

    /// `NOT_EQUALS`, or `IS_NOT_NULL` when comparing with null.
    pub fn not_equals(&self, value: impl Into<CriterionValue>) -> Criterion {
        let value = value.into();
        if value.is_null() {
            self.is_not_null()
        } else {
            self.compare(Operator::NotEquals, value)
        }
    }

    pub fn lt(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::Lt, value)
    }

    pub fn lte(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::Lte, value)
    }

    pub fn gt(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::Gt, value)
    }

    pub fn gte(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::Gte, value)
    }

    pub fn is_null(&self) -> Criterion {
        Criterion::atomic(self, Operator::IsNull, None)
    }

    pub fn is_not_null(&self) -> Criterion {
        Criterion::atomic(self, Operator::IsNotNull, None)
    }

    /// `BETWEEN low and high`; the wire value is `[low, high]`.
    pub fn between(
        &self,
        low: impl Into<CriterionValue>,
        high: impl Into<CriterionValue>,
    ) -> Criterion {
        let bounds = vec![low.into().into_value(), high.into().into_value()];
        self.compare(Operator::Between, serde_json::Value::Array(bounds))
    }

    /// `IN`: the list at this field contains `value`.
    pub fn in_set(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::In, value)
    }

    /// `NOT_IN`: the list at this field does not contain `value`.
    pub fn not_in_set(&self, value: impl Into<CriterionValue>) -> Criterion {
        self.compare(Operator::NotIn, value)
    }
}

impl fmt::Display for EntityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.path())
    }
}
