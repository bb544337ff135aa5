//! Property containers: attribute-style access into schema-free record data.
//!
//! Record schemas are open (the server may add fields at any time), so
//! attributes are not modelled as structs. Instead a container wraps an
//! attribute tree and resolves names against the keys that are actually
//! present:
//!
//! - reading a missing key fails with [`Error::AttributeNotFound`], while a
//!   key holding `null` reads fine as [`Property::Value`];
//! - nested objects come back as containers with an extended path;
//! - lists come back as [`ReadOnlyList`] views.
//!
//! Three flavours exist:
//!
//! - [`Properties`]: an owned, detached container, used to build values;
//! - [`PropertiesRef`]: a borrowed read-only view;
//! - [`PropertiesMut`]: a borrowed mutable view. When obtained from a
//!   [`Record`](crate::Record) it reports every write to the record's
//!   [`MutationTracker`].

use crate::error::{Error, Result};
use crate::list::ReadOnlyList;
use crate::path::{diff_to_mutation_tracker, Path, Segment};
use crate::{MutationTracker, Tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A wrapped attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Property<'a> {
    /// Scalar or `null`
    Value(&'a Value),
    /// Nested object
    Tree(PropertiesRef<'a>),
    /// List, elements wrapped on access
    List(ReadOnlyList<'a>),
}

pub(crate) fn wrap(value: &Value, path: Path) -> Property<'_> {
    match value {
        Value::Object(tree) => Property::Tree(PropertiesRef { tree, path }),
        Value::Array(items) => Property::List(ReadOnlyList::new(items, path)),
        other => Property::Value(other),
    }
}

impl<'a> Property<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Property::Value(Value::Null))
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Property::Value(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Property::Value(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Property::Value(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Property::Value(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&PropertiesRef<'a>> {
        match self {
            Property::Tree(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ReadOnlyList<'a>> {
        match self {
            Property::List(list) => Some(list),
            _ => None,
        }
    }

    /// Unwrap back into a plain value.
    pub fn to_value(&self) -> Value {
        match self {
            Property::Value(v) => (*v).clone(),
            Property::Tree(props) => Value::Object(props.to_tree()),
            Property::List(list) => Value::Array(list.to_vec()),
        }
    }
}

impl PartialEq<Value> for Property<'_> {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Property::Value(v), other) => *v == other,
            (Property::Tree(props), Value::Object(tree)) => props.tree == tree,
            (Property::List(list), Value::Array(items)) => list == items,
            _ => false,
        }
    }
}

impl fmt::Display for Property<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Value(v) => write!(f, "{}", v),
            Property::Tree(props) => write!(f, "{}", props),
            Property::List(list) => write!(f, "{}", list),
        }
    }
}

fn not_found(name: &str, path: &Path) -> Error {
    Error::AttributeNotFound {
        name: name.to_string(),
        path: path.to_string(),
    }
}

/// A read-only view over a nested attribute tree.
#[derive(Debug, Clone)]
pub struct PropertiesRef<'a> {
    tree: &'a Tree,
    path: Path,
}

impl<'a> PropertiesRef<'a> {
    pub(crate) fn new(tree: &'a Tree, path: Path) -> Self {
        Self { tree, path }
    }

    /// Read an attribute by name.
    pub fn get(&self, name: &str) -> Result<Property<'a>> {
        let tree: &'a Tree = self.tree;
        tree.get(name)
            .map(|value| wrap(value, self.path.key(name)))
            .ok_or_else(|| not_found(name, &self.path))
    }

    /// Read a nested object by name.
    pub fn child(&self, name: &str) -> Result<PropertiesRef<'a>> {
        match self.get(name)? {
            Property::Tree(props) => Ok(props),
            _ => Err(Error::NotATree(self.path.key(name).to_string())),
        }
    }

    /// Read a list by name.
    pub fn list(&self, name: &str) -> Result<ReadOnlyList<'a>> {
        match self.get(name)? {
            Property::List(list) => Ok(list),
            _ => Err(Error::NotAList(self.path.key(name).to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tree.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a String> {
        let tree: &'a Tree = self.tree;
        tree.keys()
    }

    /// Path of this container inside its record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_tree(&self) -> &'a Tree {
        self.tree
    }

    /// Unwrap into a plain attribute tree.
    pub fn to_tree(&self) -> Tree {
        self.tree.clone()
    }
}

impl PartialEq for PropertiesRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl fmt::Display for PropertiesRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.tree.clone()))
    }
}

/// A mutable view over a nested attribute tree.
///
/// The view keeps the root of the tree and its own path, and resolves the
/// path on each access. Nested views borrow their parent, so the structure
/// leading to this node cannot change while the view is alive.
#[derive(Debug)]
pub struct PropertiesMut<'a> {
    root: &'a mut Tree,
    tracker: Option<&'a mut MutationTracker>,
    path: Path,
}

impl<'a> PropertiesMut<'a> {
    pub(crate) fn new(root: &'a mut Tree, tracker: Option<&'a mut MutationTracker>) -> Self {
        Self {
            root,
            tracker,
            path: Path::root(),
        }
    }

    fn node(&self) -> Result<&Tree> {
        tree_at(&*self.root, self.path.segments()).ok_or_else(|| self.detached())
    }

    fn node_mut(&mut self) -> Result<&mut Tree> {
        let path = &self.path;
        tree_at_mut(&mut *self.root, path.segments()).ok_or_else(|| Error::AttributeNotFound {
            name: String::new(),
            path: path.to_string(),
        })
    }

    fn detached(&self) -> Error {
        Error::AttributeNotFound {
            name: String::new(),
            path: self.path.to_string(),
        }
    }

    /// Read an attribute by name.
    pub fn get(&self, name: &str) -> Result<Property<'_>> {
        let node = self.node()?;
        node.get(name)
            .map(|value| wrap(value, self.path.key(name)))
            .ok_or_else(|| not_found(name, &self.path))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node().map(|n| n.contains_key(name)).unwrap_or(false)
    }

    /// Write an attribute, replacing any previous value.
    ///
    /// Assigned [`Properties`] are stored as their plain tree. When the view
    /// belongs to a record the change is tracked: writes below a list element
    /// record the whole list at the list's path; assigning an object over an
    /// object records the diff between the two; anything else records the
    /// new value at the written path.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let written = self.path.key(name);
        let old = self.node_mut()?.insert(name.to_string(), value.clone());

        if let Some(tracker) = self.tracker.as_deref_mut() {
            report(tracker, &*self.root, &written, old, value);
        }
        Ok(())
    }

    /// Append `items` to the list at `name`, reassigning the list as a whole.
    pub fn extend<I, V>(&mut self, name: &str, items: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut list = match self.get(name)? {
            Property::List(list) => list.to_vec(),
            _ => return Err(Error::NotAList(self.path.key(name).to_string())),
        };
        list.extend(items.into_iter().map(Into::into));
        self.set(name, Value::Array(list))
    }

    /// Navigate into the nested object at `name`.
    pub fn child(&mut self, name: &str) -> Result<PropertiesMut<'_>> {
        match self.node()?.get(name) {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(Error::NotATree(self.path.key(name).to_string())),
            None => return Err(not_found(name, &self.path)),
        }
        Ok(PropertiesMut {
            path: self.path.key(name),
            root: &mut *self.root,
            tracker: self.tracker.as_deref_mut(),
        })
    }

    /// Navigate into the object element `index` of the list at `name`.
    pub fn item(&mut self, name: &str, index: usize) -> Result<PropertiesMut<'_>> {
        let list_path = self.path.key(name);
        let items = match self.node()?.get(name) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Error::NotAList(list_path.to_string())),
            None => return Err(not_found(name, &self.path)),
        };
        match items.get(index) {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(Error::NotATree(list_path.index(index).to_string())),
            None => {
                return Err(Error::IndexOutOfBounds {
                    path: list_path.to_string(),
                    index,
                    len: items.len(),
                })
            }
        }
        Ok(PropertiesMut {
            path: list_path.index(index),
            root: &mut *self.root,
            tracker: self.tracker.as_deref_mut(),
        })
    }

    /// A read-only view of this node.
    pub fn view(&self) -> Result<PropertiesRef<'_>> {
        Ok(PropertiesRef::new(self.node()?, self.path.clone()))
    }

    /// Path of this container inside its record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unwrap into a plain attribute tree.
    pub fn to_tree(&self) -> Result<Tree> {
        self.node().cloned()
    }
}

fn report(
    tracker: &mut MutationTracker,
    root: &Tree,
    written: &Path,
    old: Option<Value>,
    new: Value,
) {
    if let Some(anchor) = written.list_anchor() {
        if let Some(list) = value_at(root, anchor.segments()) {
            tracker.record(&anchor.dotted(), list.clone());
        }
        return;
    }
    match (old, new) {
        (Some(Value::Object(old)), Value::Object(new)) => {
            tracker.merge(&written.dotted(), diff_to_mutation_tracker(&old, &new));
        }
        (_, new) => tracker.record(&written.dotted(), new),
    }
}

fn value_at<'t>(root: &'t Tree, segments: &[Segment]) -> Option<&'t Value> {
    let (first, rest) = segments.split_first()?;
    let Segment::Key(key) = first else {
        return None;
    };
    let mut value = root.get(key)?;
    for segment in rest {
        value = match (segment, value) {
            (Segment::Key(k), Value::Object(map)) => map.get(k)?,
            (Segment::Index(i), Value::Array(items)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(value)
}

fn value_at_mut<'t>(root: &'t mut Tree, segments: &[Segment]) -> Option<&'t mut Value> {
    let (first, rest) = segments.split_first()?;
    let Segment::Key(key) = first else {
        return None;
    };
    let mut value = root.get_mut(key)?;
    for segment in rest {
        value = match (segment, value) {
            (Segment::Key(k), Value::Object(map)) => map.get_mut(k)?,
            (Segment::Index(i), Value::Array(items)) => items.get_mut(*i)?,
            _ => return None,
        };
    }
    Some(value)
}

fn tree_at<'t>(root: &'t Tree, segments: &[Segment]) -> Option<&'t Tree> {
    if segments.is_empty() {
        return Some(root);
    }
    value_at(root, segments)?.as_object()
}

fn tree_at_mut<'t>(root: &'t mut Tree, segments: &[Segment]) -> Option<&'t mut Tree> {
    if segments.is_empty() {
        return Some(root);
    }
    value_at_mut(root, segments)?.as_object_mut()
}

/// An owned container with no record behind it.
///
/// Used to build nested values before assigning them:
///
/// ```rust
/// use contacthub_engine::{Properties, Record};
///
/// let mut customer = Record::new();
/// let contacts = Properties::new().with("email", "a@b.com");
/// customer
///     .properties_mut()
///     .set("base", Properties::new().with("contacts", contacts))
///     .unwrap();
///
/// let email = customer.properties().child("base").unwrap()
///     .child("contacts").unwrap()
///     .get("email").unwrap();
/// assert_eq!(email.as_str(), Some("a@b.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    tree: Tree,
}

impl Properties {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: Tree) -> Self {
        Self { tree }
    }

    /// Builder-style write.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Write an attribute. Never tracked.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.tree.insert(name.to_string(), value.into());
    }

    /// Read an attribute by name.
    pub fn get(&self, name: &str) -> Result<Property<'_>> {
        self.view().get(name)
    }

    /// A read-only view.
    pub fn view(&self) -> PropertiesRef<'_> {
        PropertiesRef::new(&self.tree, Path::root())
    }

    /// A mutable, untracked view.
    pub fn view_mut(&mut self) -> PropertiesMut<'_> {
        PropertiesMut::new(&mut self.tree, None)
    }

    pub fn as_tree(&self) -> &Tree {
        &self.tree
    }

    /// Unwrap into a plain attribute tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

impl From<Properties> for Value {
    fn from(props: Properties) -> Self {
        Value::Object(props.tree)
    }
}

impl From<Tree> for Properties {
    fn from(tree: Tree) -> Self {
        Self { tree }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            tree: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view(), f)
    }
}
