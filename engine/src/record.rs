//! Record base: a full attribute snapshot plus a sparse change tracker.

use crate::error::{Error, Result};
use crate::path::{set_dotted, strip_empty};
use crate::properties::{Property, PropertiesMut, PropertiesRef};
use crate::{MutationTracker, Path, Tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A remote entity held locally.
///
/// `attributes` is the current full state. `mutation_tracker` holds the
/// changes made since the record was built from a full snapshot or last
/// synchronized; applying it over that snapshot reconstructs `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Full attribute tree
    attributes: Tree,
    /// Changes since the last synchronization
    #[serde(default)]
    mutation_tracker: MutationTracker,
}

impl Record {
    /// An empty local draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// A record built from a full remote snapshot. This is the baseline, so
    /// nothing is tracked.
    pub fn from_snapshot(attributes: Tree) -> Self {
        Self {
            attributes,
            mutation_tracker: MutationTracker::new(),
        }
    }

    /// A new record from default attributes plus overrides.
    ///
    /// Overrides replace defaults key by key at the top level only; nested
    /// objects are not merged.
    pub fn from_attributes(defaults: Tree, overrides: Tree) -> Self {
        let mut attributes = defaults;
        for (key, value) in overrides {
            attributes.insert(key, value);
        }
        Self::from_snapshot(attributes)
    }

    /// The remote identifier, when the record has been persisted.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").and_then(Value::as_str)
    }

    /// The remote identifier, or [`Error::MissingIdentity`] naming `kind`.
    pub fn require_id(&self, kind: &str) -> Result<&str> {
        self.id()
            .ok_or_else(|| Error::MissingIdentity(kind.to_string()))
    }

    pub fn attributes(&self) -> &Tree {
        &self.attributes
    }

    pub fn mutation_tracker(&self) -> &MutationTracker {
        &self.mutation_tracker
    }

    /// Whether there are local changes not yet synchronized.
    pub fn is_dirty(&self) -> bool {
        !self.mutation_tracker.is_empty()
    }

    /// Read-only root container.
    pub fn properties(&self) -> PropertiesRef<'_> {
        PropertiesRef::new(&self.attributes, Path::root())
    }

    /// Mutable root container; writes are tracked.
    pub fn properties_mut(&mut self) -> PropertiesMut<'_> {
        PropertiesMut::new(&mut self.attributes, Some(&mut self.mutation_tracker))
    }

    /// Read a top-level attribute.
    pub fn get(&self, name: &str) -> Result<Property<'_>> {
        self.properties().get(name)
    }

    /// Write a top-level attribute (tracked).
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.properties_mut().set(name, value)
    }

    /// Write at a dotted path without tracking it.
    ///
    /// For changes the server has already applied, such as a sub-entity
    /// created through its own endpoint. Pending changes covering the path
    /// are rewritten to the new value so a later partial update does not
    /// send stale data.
    pub fn set_untracked(&mut self, dotted: &str, value: Value) {
        self.mutation_tracker.refresh(dotted, value.clone());
        set_dotted(&mut self.attributes, dotted, value);
    }

    /// Body for create and full replace: attributes without null or empty
    /// entries.
    pub fn full_document(&self) -> Tree {
        strip_empty(&self.attributes)
    }

    /// Body for partial update: the tracked changes in nested form, nulls
    /// kept for explicit clears.
    pub fn partial_document(&self) -> Tree {
        self.mutation_tracker.resolve()
    }

    /// Accept the current state as synchronized.
    ///
    /// Top-level keys from the server's response (assigned id, timestamps)
    /// are merged over the local attributes and the tracker is cleared.
    pub fn mark_synchronized(&mut self, response: Option<Tree>) {
        if let Some(response) = response {
            for (key, value) in response {
                self.attributes.insert(key, value);
            }
        }
        self.mutation_tracker.clear();
    }

    /// Unwrap into the plain attribute tree.
    pub fn into_tree(self) -> Tree {
        self.attributes
    }
}

impl From<Tree> for Record {
    fn from(attributes: Tree) -> Self {
        Self::from_snapshot(attributes)
    }
}
