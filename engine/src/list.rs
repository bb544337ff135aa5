//! Read-only view over list-valued attributes.
//!
//! Server-populated collections (`base.jobs`, `tags.auto`, ...) are exposed
//! through [`ReadOnlyList`], which has no mutating methods. Changing a list
//! means reassigning it as a whole through [`PropertiesMut::set`] or
//! [`PropertiesMut::extend`], so the change is tracked against the list's
//! path. Elements that are objects can still be edited in place through
//! [`PropertiesMut::item`].
//!
//! [`PropertiesMut::set`]: crate::PropertiesMut::set
//! [`PropertiesMut::extend`]: crate::PropertiesMut::extend
//! [`PropertiesMut::item`]: crate::PropertiesMut::item

use crate::path::Path;
use crate::properties::{wrap, Property};
use serde_json::Value;
use std::fmt;

/// An immutable list of attribute values.
#[derive(Debug, Clone)]
pub struct ReadOnlyList<'a> {
    items: &'a [Value],
    path: Path,
}

impl<'a> ReadOnlyList<'a> {
    pub(crate) fn new(items: &'a [Value], path: Path) -> Self {
        Self { items, path }
    }

    /// Element at `index`; objects come back wrapped as property views.
    pub fn get(&self, index: usize) -> Option<Property<'a>> {
        let items: &'a [Value] = self.items;
        items
            .get(index)
            .map(|item| wrap(item, self.path.index(index)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over wrapped elements.
    pub fn iter(&self) -> impl Iterator<Item = Property<'a>> + 'a {
        let items: &'a [Value] = self.items;
        let path = self.path.clone();
        items
            .iter()
            .enumerate()
            .map(move |(i, item)| wrap(item, path.index(i)))
    }

    /// The raw element values.
    pub fn as_slice(&self) -> &'a [Value] {
        self.items
    }

    /// Copy the elements out, e.g. to build a replacement list.
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.to_vec()
    }

    /// Path of the list inside its record.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for ReadOnlyList<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl PartialEq<[Value]> for ReadOnlyList<'_> {
    fn eq(&self, other: &[Value]) -> bool {
        self.items == other
    }
}

impl PartialEq<Vec<Value>> for ReadOnlyList<'_> {
    fn eq(&self, other: &Vec<Value>) -> bool {
        self.items == other.as_slice()
    }
}

impl fmt::Display for ReadOnlyList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("]")
    }
}
