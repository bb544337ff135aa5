//! Jobs, educations, likes and subscriptions of a customer.
//!
//! Entries live in lists under the customer's `base` and have their own
//! endpoints. Writing one through its endpoint also updates the loaded
//! customer, without tracking the change: the server already has it.

use crate::customer::{into_tree, Customer};
use crate::error::Result;
use crate::node::Node;
use crate::transport::Method;
use contacthub_engine::{get_dotted, EntryKind, Error, Record, Tree};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// One element of a customer's entry list.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    kind: EntryKind,
    record: Record,
}

impl Entry {
    /// A local entry of `kind`.
    pub fn new(kind: EntryKind, attributes: Tree) -> Self {
        Self {
            kind,
            record: Record::from_snapshot(attributes),
        }
    }

    /// An entry as returned by the API.
    pub fn from_snapshot(kind: EntryKind, attributes: Tree) -> Self {
        Self::new(kind, attributes)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// POST the entry and append the stored version to `customer`.
    pub fn create(&mut self, node: &Node, customer: &mut Customer) -> Result<()> {
        let customer_id = customer.require_id("Customer")?.to_string();
        let request = node
            .request(Method::Post, &["customers", &customer_id, self.kind.collection()])
            .with_json(Value::Object(self.full_document()));
        let response = node.send(&request)?;
        self.record.mark_synchronized(into_tree(response));

        let mut items = self.loaded(customer).cloned().unwrap_or_default();
        items.push(Value::Object(self.attributes().clone()));
        customer.set_untracked(&self.kind.collection_path(), Value::Array(items));
        Ok(())
    }

    /// PUT the entry over its stored version.
    ///
    /// The entry must be present in the customer's loaded list.
    pub fn replace(&mut self, node: &Node, customer: &mut Customer) -> Result<()> {
        let customer_id = customer.require_id("Customer")?.to_string();
        let id = self.require_id(&self.kind.to_string())?.to_string();
        let mut items = self.loaded(customer).cloned().unwrap_or_default();
        let position = items
            .iter()
            .position(|item| item.get("id").and_then(Value::as_str) == Some(id.as_str()))
            .ok_or_else(|| Error::NotFound {
                kind: self.kind.to_string(),
            })?;

        let request = node
            .request(
                Method::Put,
                &["customers", &customer_id, self.kind.collection(), &id],
            )
            .with_json(Value::Object(self.full_document()));
        let response = node.send(&request)?;
        self.record.mark_synchronized(into_tree(response));

        items[position] = Value::Object(self.attributes().clone());
        customer.set_untracked(&self.kind.collection_path(), Value::Array(items));
        Ok(())
    }

    /// DELETE the entry and drop it from the customer's loaded list.
    pub fn remove(&self, node: &Node, customer: &mut Customer) -> Result<()> {
        let customer_id = customer.require_id("Customer")?.to_string();
        let id = self.require_id(&self.kind.to_string())?;
        let request = node.request(
            Method::Delete,
            &["customers", &customer_id, self.kind.collection(), id],
        );
        node.send(&request)?;

        let remaining = self.loaded(customer).map(|items| {
            let kept: Vec<Value> = items
                .iter()
                .filter(|item| item.get("id").and_then(Value::as_str) != Some(id))
                .cloned()
                .collect();
            (kept, items.len())
        });
        if let Some((kept, before)) = remaining {
            if kept.len() != before {
                customer.set_untracked(&self.kind.collection_path(), Value::Array(kept));
            }
        }
        Ok(())
    }

    fn loaded<'c>(&self, customer: &'c Customer) -> Option<&'c Vec<Value>> {
        get_dotted(customer.attributes(), &self.kind.collection_path()).and_then(Value::as_array)
    }
}

impl Deref for Entry {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.record
    }
}

impl DerefMut for Entry {
    fn deref_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
