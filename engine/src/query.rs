//! Queries over remote entities.
//!
//! A query starts empty, gets filtered with criteria, and can be combined
//! with other queries through set operations:
//!
//! - `filter` on an empty query sets the criterion, on a filtered one it ANDs
//!   the new criterion in, and on a combined query it fails;
//! - combining two filtered queries on the same entity folds them into one
//!   simple query (`and` for intersect, `or` for union);
//! - any other combination yields a [`Query::Combined`]; an operand that is
//!   already combined with the same operator has its sub-queries spliced in;
//! - combining with an empty query fails.

use crate::criterion::{Conjunction, Criterion, WireCondition};
use crate::error::{Error, Result};
use crate::schema::EntityKind;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

/// Name the API expects on every query node.
const QUERY_NAME: &str = "query";

/// Set operation joining combined queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SetOperator {
    Union,
    Intersect,
}

impl SetOperator {
    fn conjunction(self) -> Conjunction {
        match self {
            SetOperator::Union => Conjunction::Or,
            SetOperator::Intersect => Conjunction::And,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// One optional criterion over one entity
    Simple {
        entity: EntityKind,
        criterion: Option<Criterion>,
    },
    /// Two or more queries joined by a set operation
    Combined {
        entity: EntityKind,
        operator: SetOperator,
        queries: Vec<Query>,
    },
}

impl Query {
    /// An unfiltered query over `entity`.
    pub fn new(entity: EntityKind) -> Self {
        Query::Simple {
            entity,
            criterion: None,
        }
    }

    /// Target entity. A combined query targets its left operand's entity.
    pub fn entity(&self) -> EntityKind {
        match self {
            Query::Simple { entity, .. } | Query::Combined { entity, .. } => *entity,
        }
    }

    pub fn criterion(&self) -> Option<&Criterion> {
        match self {
            Query::Simple { criterion, .. } => criterion.as_ref(),
            Query::Combined { .. } => None,
        }
    }

    /// Simple and without criterion.
    pub fn is_empty(&self) -> bool {
        matches!(self, Query::Simple { criterion: None, .. })
    }

    /// Narrow the query with `criterion`.
    pub fn filter(self, criterion: Criterion) -> Result<Self> {
        match self {
            Query::Simple {
                entity,
                criterion: None,
            } => Ok(Query::Simple {
                entity,
                criterion: Some(criterion),
            }),
            Query::Simple {
                entity,
                criterion: Some(existing),
            } => Ok(Query::Simple {
                entity,
                criterion: Some(existing.and(criterion)),
            }),
            Query::Combined { .. } => Err(Error::OperationNotPermitted(
                "Cannot apply a filter on a combined query".to_string(),
            )),
        }
    }

    /// Results matching both queries.
    pub fn intersect(self, other: Query) -> Result<Self> {
        self.combine(other, SetOperator::Intersect)
    }

    /// Results matching either query.
    pub fn union(self, other: Query) -> Result<Self> {
        self.combine(other, SetOperator::Union)
    }

    fn combine(self, other: Query, operator: SetOperator) -> Result<Self> {
        if self.is_empty() || other.is_empty() {
            return Err(Error::OperationNotPermitted(
                "Cannot combine empty queries.".to_string(),
            ));
        }

        match (self, other) {
            (
                Query::Simple {
                    entity,
                    criterion: Some(left),
                },
                Query::Simple {
                    entity: other_entity,
                    criterion: Some(right),
                },
            ) if entity == other_entity => {
                let criterion = match operator.conjunction() {
                    Conjunction::And => left.and(right),
                    Conjunction::Or => left.or(right),
                };
                Ok(Query::Simple {
                    entity,
                    criterion: Some(criterion),
                })
            }
            (left, right) => {
                let entity = left.entity();
                let mut queries = Vec::new();
                for operand in [left, right] {
                    match operand {
                        Query::Combined {
                            operator: inner,
                            queries: nested,
                            ..
                        } if inner == operator => queries.extend(nested),
                        other => queries.push(other),
                    }
                }
                Ok(Query::Combined {
                    entity,
                    operator,
                    queries,
                })
            }
        }
    }

    /// Lower to the API's query document.
    ///
    /// An empty query has no document and is executed as a plain listing.
    pub fn to_wire(&self) -> Option<WireQuery<'_>> {
        self.to_wire_body().map(|query| WireQuery {
            name: QUERY_NAME,
            query,
        })
    }

    fn to_wire_body(&self) -> Option<WireQueryBody<'_>> {
        match self {
            Query::Simple { criterion, .. } => {
                criterion.as_ref().map(|criterion| WireQueryBody::Simple {
                    name: QUERY_NAME,
                    are: WireAre {
                        condition: criterion.to_wire(),
                    },
                })
            }
            Query::Combined {
                operator, queries, ..
            } => Some(WireQueryBody::Combined {
                name: QUERY_NAME,
                conjunction: *operator,
                queries: queries.iter().filter_map(Query::to_wire_body).collect(),
            }),
        }
    }
}

impl BitAnd for Query {
    type Output = Result<Query>;

    fn bitand(self, rhs: Query) -> Result<Query> {
        self.intersect(rhs)
    }
}

impl BitOr for Query {
    type Output = Result<Query>;

    fn bitor(self, rhs: Query) -> Result<Query> {
        self.union(rhs)
    }
}

/// Top-level query document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireQuery<'a> {
    name: &'static str,
    query: WireQueryBody<'a>,
}

/// A lowered simple or combined query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireQueryBody<'a> {
    Simple {
        name: &'static str,
        are: WireAre<'a>,
    },
    Combined {
        name: &'static str,
        conjunction: SetOperator,
        queries: Vec<WireQueryBody<'a>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAre<'a> {
    condition: WireCondition<'a>,
}
