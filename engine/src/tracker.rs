//! Sparse record of changes since the last synchronization.

use crate::path::{join, set_dotted, split_dotted};
use crate::Tree;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dotted path → new value. A `null` value means "explicitly cleared".
///
/// Entries never overlap: recording a path drops every entry beneath it, and
/// a write below an entry that already holds an object lands inside that
/// object instead of creating a second key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationTracker {
    entries: Tree,
}

impl MutationTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the value recorded for an exact dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    /// Iterate over `(path, value)` entries in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Forget all recorded changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a change at `path`.
    pub fn record(&mut self, path: &str, value: Value) {
        let nested_prefix = format!("{}.", path);
        self.entries.retain(|k, _| !k.starts_with(&nested_prefix));

        let ancestor = self
            .entries
            .keys()
            .find(|k| path.starts_with(&format!("{}.", k)))
            .cloned();
        if let Some(ancestor) = ancestor {
            if let Some(Value::Object(inner)) = self.entries.get_mut(&ancestor) {
                set_dotted(inner, &path[ancestor.len() + 1..], value);
                return;
            }
        }

        self.entries.insert(path.to_string(), value);
    }

    /// Overwrite what is tracked at `path` with `value`, if anything is.
    ///
    /// Applies when an entry sits at `path`, beneath it, or at an ancestor
    /// holding an object. Untouched paths stay untracked.
    pub fn refresh(&mut self, path: &str, value: Value) {
        let nested_prefix = format!("{}.", path);
        let overlaps = self.entries.iter().any(|(k, v)| {
            k == path
                || k.starts_with(&nested_prefix)
                || (v.is_object() && path.starts_with(&format!("{}.", k)))
        });
        if overlaps {
            self.record(path, value);
        }
    }

    /// Record every entry of `diff` under `prefix`.
    pub fn merge(&mut self, prefix: &str, diff: MutationTracker) {
        for (path, value) in diff.entries {
            self.record(&join(prefix, &path), value);
        }
    }

    /// Plain insert used while building diffs, where paths cannot overlap.
    pub(crate) fn insert_raw(&mut self, path: String, value: Value) {
        self.entries.insert(path, value);
    }

    /// Expand dotted paths into a nested tree, merging siblings.
    ///
    /// `{"base.contacts.email": "x", "base.firstName": "y"}` becomes
    /// `{"base": {"contacts": {"email": "x"}, "firstName": "y"}}`.
    pub fn resolve(&self) -> Tree {
        let mut tree = Tree::new();
        for (path, value) in &self.entries {
            if split_dotted(path).next().is_some() {
                set_dotted(&mut tree, path, value.clone());
            }
        }
        tree
    }

    /// The flat dotted-path map as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

impl FromIterator<(String, Value)> for MutationTracker {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut tracker = MutationTracker::new();
        for (path, value) in iter {
            tracker.record(&path, value);
        }
        tracker
    }
}

/// Expand a flat tracker into nested form.
pub fn resolve_mutation_tracker(tracker: &MutationTracker) -> Tree {
    tracker.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_replaces_nested_entries() {
        let mut tracker = MutationTracker::new();
        tracker.record("a.b.c", json!([]));
        tracker.record("a.b.f", json!("g"));
        tracker.record("a.b", json!("a"));

        assert_eq!(tracker.to_value(), json!({"a.b": "a"}));
        assert_eq!(tracker.resolve(), json!({"a": {"b": "a"}}).as_object().unwrap().clone());
    }

    #[test]
    fn record_below_tracked_object_writes_inside_it() {
        let mut tracker = MutationTracker::new();
        tracker.record("prova", json!({"a": "b"}));
        tracker.record("prova.c", json!(1));

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("prova"), Some(&json!({"a": "b", "c": 1})));
    }

    #[test]
    fn record_below_tracked_scalar_adds_entry() {
        let mut tracker = MutationTracker::new();
        tracker.record("a", json!("x"));
        tracker.record("ab", json!("y"));

        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn resolve_merges_siblings_and_keeps_nulls() {
        let tracker: MutationTracker = vec![
            ("base.contacts.email".to_string(), json!("a@b.com")),
            ("base.contacts.fax".to_string(), Value::Null),
            ("base.firstName".to_string(), json!("fn")),
            ("extra".to_string(), json!("extra")),
        ]
        .into_iter()
        .collect();

        let resolved = Value::Object(resolve_mutation_tracker(&tracker));
        assert_eq!(
            resolved,
            json!({
                "base": {"contacts": {"email": "a@b.com", "fax": null}, "firstName": "fn"},
                "extra": "extra"
            })
        );
    }

    #[test]
    fn refresh_only_touches_tracked_paths() {
        let mut tracker = MutationTracker::new();
        tracker.record("base.likes", json!([{"id": "l1", "name": "blues"}]));
        tracker.record("extra", json!({"a": 1}));

        tracker.refresh("base.likes", json!([{"id": "l1"}, {"id": "l2"}]));
        tracker.refresh("extra.b", json!(2));
        tracker.refresh("base.jobs", json!([{"id": "j1"}]));

        assert_eq!(
            tracker.to_value(),
            json!({
                "base.likes": [{"id": "l1"}, {"id": "l2"}],
                "extra": {"a": 1, "b": 2}
            })
        );
    }

    #[test]
    fn refresh_replaces_nested_entries() {
        let mut tracker = MutationTracker::new();
        tracker.record("base.contacts.email", json!("e"));
        tracker.refresh("base.contacts", json!({"email": "e", "fax": "f"}));

        assert_eq!(
            tracker.to_value(),
            json!({"base.contacts": {"email": "e", "fax": "f"}})
        );
    }

    #[test]
    fn merge_prefixes_diff_paths() {
        let mut diff = MutationTracker::new();
        diff.insert_raw("email".into(), json!("e"));
        diff.insert_raw("fax".into(), Value::Null);

        let mut tracker = MutationTracker::new();
        tracker.merge("base.contacts", diff);

        assert_eq!(
            tracker.to_value(),
            json!({"base.contacts.email": "e", "base.contacts.fax": null})
        );
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut tracker = MutationTracker::new();
        tracker.record("base.firstName", json!("fn"));
        let json = serde_json::to_string(&tracker).unwrap();
        assert_eq!(json, r#"{"base.firstName":"fn"}"#);

        let parsed: MutationTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tracker);
    }
}
