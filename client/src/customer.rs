//! Customers and their remote lifecycle.

use crate::error::{ClientError, Result};
use crate::event::Event;
use crate::node::{ListEvents, Node};
use crate::paginated::PaginatedList;
use crate::transport::Method;
use contacthub_engine::schema::customer_defaults;
use contacthub_engine::{get_dotted, set_dotted, Record, Tree};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// Timezone sent on full replace when the local value was cleared.
pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";

/// How `persist` writes a customer that already has an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// PATCH the tracked changes
    #[default]
    Update,
    /// PUT the full document
    Replace,
}

/// A customer of the workspace.
///
/// Dereferences to [`Record`] for attribute access and change tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Customer {
    record: Record,
}

impl Customer {
    /// A new local customer with the default attribute skeleton.
    pub fn new() -> Self {
        Self::with_attributes(Tree::new())
    }

    /// A new local customer; `overrides` replace default top-level keys.
    pub fn with_attributes(overrides: Tree) -> Self {
        Self {
            record: Record::from_attributes(customer_defaults(), overrides),
        }
    }

    /// A customer as returned by the API.
    pub fn from_snapshot(attributes: Tree) -> Self {
        Self {
            record: Record::from_snapshot(attributes),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Create the customer if it has no id, otherwise write it back with
    /// `mode`.
    pub fn persist(&mut self, node: &Node, mode: PersistMode, force_update: bool) -> Result<()> {
        if self.id().is_none() {
            return self.create(node, force_update);
        }
        match mode {
            PersistMode::Update => self.update(node),
            PersistMode::Replace => self.replace(node),
        }
    }

    /// POST the full document.
    ///
    /// With `force_update`, a conflict on an existing customer is resolved
    /// by replacing that customer with the local document.
    pub fn create(&mut self, node: &Node, force_update: bool) -> Result<()> {
        let request = node
            .request(Method::Post, &["customers"])
            .with_json(Value::Object(self.body(node)));

        match node.send(&request) {
            Ok(response) => {
                self.record.mark_synchronized(into_tree(response));
                Ok(())
            }
            Err(ClientError::Remote(remote)) if remote.is_conflict() && force_update => {
                let id = remote
                    .body
                    .as_ref()
                    .and_then(|b| b.pointer("/data/customer/id"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ClientError::InvalidResponse(
                            "conflict without an existing customer id".to_string(),
                        )
                    })?
                    .to_string();
                tracing::info!("Customer already exists as {}, replacing it", id);
                self.put(node, &id)
            }
            Err(e) => Err(e),
        }
    }

    /// PUT the full document over the remote customer.
    pub fn replace(&mut self, node: &Node) -> Result<()> {
        let id = self.record.require_id("Customer")?.to_string();
        self.put(node, &id)
    }

    /// PUT under `id`, which is only stored once the server accepted it.
    fn put(&mut self, node: &Node, id: &str) -> Result<()> {
        let mut body = self.body(node);
        if let Some(Value::Null) = get_dotted(self.attributes(), "base.timezone") {
            set_dotted(&mut body, "base.timezone", Value::from(DEFAULT_TIMEZONE));
        }
        let request = node
            .request(Method::Put, &["customers", id])
            .with_json(Value::Object(body));
        let response = node.send(&request)?;
        self.record.set_untracked("id", Value::from(id));
        self.record.mark_synchronized(into_tree(response));
        Ok(())
    }

    /// PATCH the tracked changes. Does nothing when there are none.
    pub fn update(&mut self, node: &Node) -> Result<()> {
        let id = self.record.require_id("Customer")?.to_string();
        if !self.is_dirty() {
            tracing::debug!("Customer {} has no changes to send", id);
            return Ok(());
        }
        let request = node
            .request(Method::Patch, &["customers", &id])
            .with_json(Value::Object(self.partial_document()));
        let response = node.send(&request)?;
        self.record.mark_synchronized(into_tree(response));
        Ok(())
    }

    /// DELETE the remote customer.
    pub fn remove(&self, node: &Node) -> Result<()> {
        let id = self.record.require_id("Customer")?;
        node.delete_customer(id)
    }

    /// Events recorded for this customer.
    pub fn events(&self, node: &Node) -> Result<PaginatedList<Event>> {
        let id = self.record.require_id("Customer")?;
        node.events(&ListEvents::for_customer(id))
    }

    fn body(&self, node: &Node) -> Tree {
        let mut body = self.full_document();
        body.insert("nodeId".to_string(), Value::from(node.node_id()));
        body
    }
}

impl Deref for Customer {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.record
    }
}

impl DerefMut for Customer {
    fn deref_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

impl From<Tree> for Customer {
    fn from(attributes: Tree) -> Self {
        Self::from_snapshot(attributes)
    }
}

/// Keep object responses; anything else carries nothing to merge.
pub(crate) fn into_tree(response: Option<Value>) -> Option<Tree> {
    match response {
        Some(Value::Object(tree)) => Some(tree),
        _ => None,
    }
}
