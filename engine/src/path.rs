//! Dotted-path utilities over attribute trees.
//!
//! Record data is an ordered JSON object (an "attribute tree"). Changes are
//! addressed with dotted paths such as `base.contacts.email`; list elements
//! only appear in navigation paths, never in tracked mutation keys.

use crate::{MutationTracker, Tree};
use serde_json::Value;
use std::fmt;

/// A single step in a navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key access
    Key(String),
    /// List element access
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A navigation path from a record's root to a nested node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted path. Empty components are skipped.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: split_dotted(dotted)
                .map(|k| Segment::Key(k.to_string()))
                .collect(),
        }
    }

    /// Extend the path with an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Key(key.into()));
        path
    }

    /// Extend the path with a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Index(index));
        path
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path up to (not including) the first list index, if any.
    ///
    /// Writes below a list element are reported against this path with the
    /// whole list as value.
    pub fn list_anchor(&self) -> Option<Path> {
        let first_index = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::Index(_)))?;
        Some(Path {
            segments: self.segments[..first_index].to_vec(),
        })
    }

    /// Dotted rendering of the key segments (`base.contacts.email`).
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let Segment::Key(k) = segment {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
        }
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i > 0 => write!(f, ".{}", k)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

/// Join a dotted prefix with a key.
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

pub(crate) fn split_dotted(dotted: &str) -> impl Iterator<Item = &str> {
    dotted.split('.').filter(|s| !s.is_empty())
}

/// Every path from the root to a non-object leaf, depth-first in key order.
///
/// Lists are leaves. Empty objects have no leaves and contribute nothing.
pub fn enumerate_leaf_paths(tree: &Tree) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    collect_leaf_paths(tree, &mut prefix, &mut paths);
    paths
}

fn collect_leaf_paths(tree: &Tree, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for (key, value) in tree {
        prefix.push(key.clone());
        match value {
            Value::Object(nested) => collect_leaf_paths(nested, prefix, out),
            _ => out.push(prefix.clone()),
        }
        prefix.pop();
    }
}

/// Diff two snapshots into a sparse dotted-path map.
///
/// Keys dropped by `new` are recorded as cleared: `[]` for list values,
/// `null` for everything else. Keys only in `new` contribute each of their
/// leaf paths; equal values are omitted.
pub fn diff_to_mutation_tracker(old: &Tree, new: &Tree) -> MutationTracker {
    let mut out = MutationTracker::new();
    diff_into("", old, new, &mut out);
    out
}

fn diff_into(prefix: &str, old: &Tree, new: &Tree, out: &mut MutationTracker) {
    for (key, old_value) in old {
        let path = join(prefix, key);
        match (old_value, new.get(key)) {
            (Value::Object(o), Some(Value::Object(n))) => diff_into(&path, o, n, out),
            (_, Some(n)) if n == old_value => {}
            (_, Some(n)) => out.insert_raw(path, n.clone()),
            (_, None) => out.insert_raw(path, cleared(old_value)),
        }
    }
    for (key, new_value) in new {
        if !old.contains_key(key) {
            insert_leaves(join(prefix, key), new_value, out);
        }
    }
}

fn insert_leaves(path: String, value: &Value, out: &mut MutationTracker) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                insert_leaves(join(&path, key), nested, out);
            }
        }
        other => out.insert_raw(path, other.clone()),
    }
}

fn cleared(old: &Value) -> Value {
    match old {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Null,
    }
}

/// Recursively drop null values, empty lists and empty objects.
///
/// `false` and `0` are kept. Objects inside lists are stripped too, but the
/// list elements themselves are never removed.
pub fn strip_empty(tree: &Tree) -> Tree {
    tree.iter()
        .filter_map(|(k, v)| strip_value(v).map(|v| (k.clone(), v)))
        .collect()
}

fn strip_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(strip_empty(map)),
                    other => other.clone(),
                })
                .collect(),
        )),
        Value::Object(map) => {
            let stripped = strip_empty(map);
            if stripped.is_empty() {
                None
            } else {
                Some(Value::Object(stripped))
            }
        }
        other => Some(other.clone()),
    }
}

/// Write `value` at a dotted path inside `tree`, creating objects on the way.
///
/// Intermediate non-object values are replaced by objects.
pub fn set_dotted(tree: &mut Tree, dotted: &str, value: Value) {
    let keys: Vec<&str> = split_dotted(dotted).collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut node = tree;
    for key in parents {
        let entry = node
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Tree::new()));
        if !entry.is_object() {
            *entry = Value::Object(Tree::new());
        }
        let Value::Object(map) = entry else {
            return;
        };
        node = map;
    }
    node.insert(last.to_string(), value);
}

/// Read the value at a dotted path, if every step is an object key.
pub fn get_dotted<'a>(tree: &'a Tree, dotted: &str) -> Option<&'a Value> {
    let mut keys = split_dotted(dotted);
    let mut current = tree.get(keys.next()?)?;
    for key in keys {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}
