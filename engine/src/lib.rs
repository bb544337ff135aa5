//! # ContactHub Engine
//!
//! The IO-free core of the ContactHub client: the record model with change
//! tracking, and the query builder that compiles filters into the API's
//! query grammar.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never talks to the network; the client crate does
//! - **Schema-free**: record attributes are JSON trees, accessed by name
//! - **Minimal patches**: every write is tracked by dotted path, so partial
//!   updates only send what changed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] holds the full attribute tree of a remote entity plus a
//! [`MutationTracker`]. Attributes are read through [`PropertiesRef`] and
//! written through [`PropertiesMut`]; writes land in the tree and in the
//! tracker. Two documents are derived from a record:
//! - [`Record::full_document`] - the tree without null or empty entries, for
//!   create and full replace
//! - [`Record::partial_document`] - the tracked changes in nested form, for
//!   partial update
//!
//! ### Queries
//!
//! [`EntityField`]s build [`Criterion`] trees, which filter a [`Query`].
//! Queries combine through intersect and union, and lower to the wire
//! document with [`Query::to_wire`].
//!
//! ## Quick Start
//!
//! ```rust
//! use contacthub_engine::{schema, EntityKind, Properties, Query, Record};
//! use serde_json::json;
//!
//! // 1. Build a customer locally
//! let mut customer = Record::from_attributes(schema::customer_defaults(), Default::default());
//! customer
//!     .properties_mut()
//!     .child("base").unwrap()
//!     .set("contacts", Properties::new().with("email", "ann@example.com"))
//!     .unwrap();
//! assert!(customer.is_dirty());
//!
//! // 2. Derive the request bodies
//! assert_eq!(
//!     serde_json::Value::Object(customer.full_document()),
//!     json!({"base": {"contacts": {"email": "ann@example.com"}}})
//! );
//! assert_eq!(
//!     serde_json::Value::Object(customer.partial_document()),
//!     json!({"base": {"contacts": {"email": "ann@example.com"}}})
//! );
//!
//! // 3. Query
//! let email = EntityKind::Customer.field("base.contacts.email");
//! let query = Query::new(EntityKind::Customer)
//!     .filter(email.equals("ann@example.com"))
//!     .unwrap();
//! assert!(query.to_wire().is_some());
//! ```

pub mod criterion;
pub mod error;
pub mod field;
pub mod list;
pub mod page;
pub mod path;
pub mod properties;
pub mod query;
pub mod record;
pub mod schema;
pub mod tracker;

// Re-export main types at crate root
pub use criterion::{
    between, in_set, not_in_set, Conjunction, Criterion, CriterionValue, Operator, WireCondition,
};
pub use error::{Error, Result};
pub use field::EntityField;
pub use list::ReadOnlyList;
pub use page::{Page, PageInfo};
pub use path::{
    diff_to_mutation_tracker, enumerate_leaf_paths, get_dotted, set_dotted, strip_empty, Path,
    Segment,
};
pub use properties::{Properties, PropertiesMut, PropertiesRef, Property};
pub use query::{Query, SetOperator, WireQuery};
pub use record::Record;
pub use schema::{EntityKind, EntryKind};
pub use tracker::{resolve_mutation_tracker, MutationTracker};

/// An attribute tree: the JSON object shape of all record data.
pub type Tree = serde_json::Map<String, serde_json::Value>;
