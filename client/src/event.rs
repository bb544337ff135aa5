//! Events tracked for customers.

use contacthub_engine::{Record, Tree};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// An event, as built locally or returned by the API.
///
/// Events are write-once: they are stored with [`Node::add_event`] and
/// never updated.
///
/// [`Node::add_event`]: crate::Node::add_event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    record: Record,
}

impl Event {
    pub fn new(attributes: Tree) -> Self {
        Self::from_snapshot(attributes)
    }

    pub fn from_snapshot(attributes: Tree) -> Self {
        Self {
            record: Record::from_snapshot(attributes),
        }
    }

    /// The `type` attribute.
    pub fn event_type(&self) -> Option<&str> {
        self.attributes().get("type").and_then(Value::as_str)
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.attributes().get("customerId").and_then(Value::as_str)
    }
}

impl Deref for Event {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.record
    }
}

impl DerefMut for Event {
    fn deref_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
