//! Change tracking tests for contacthub-engine
//!
//! Scenario tests over whole customer records plus property-based checks of
//! the tree utilities.

use contacthub_engine::{
    diff_to_mutation_tracker, enumerate_leaf_paths, get_dotted, schema, strip_empty, Error,
    MutationTracker, Properties, Record, Tree,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn tree(value: Value) -> Tree {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn fetched_customer() -> Record {
    Record::from_snapshot(tree(json!({
        "id": "01",
        "base": {
            "firstName": "firstName",
            "contacts": {"email": "email@example.com"},
            "educations": [{
                "id": "01",
                "schoolType": "COLLEGE",
                "startYear": 1994,
                "schoolName": "schoolName",
                "schoolConcentration": "schoolConcentration",
                "endYear": 2000,
                "isCurrent": true
            }]
        },
        "extended": {},
        "tags": {"auto": ["auto"], "manual": []}
    })))
}

// ============================================================================
// Collection edits
// ============================================================================

#[test]
fn reassigning_a_collection_tracks_unwrapped_items_in_order() {
    let mut customer = fetched_customer();
    let education = Properties::new()
        .with("id", "02")
        .with("schoolType", schema::school_type::HIGH_SCHOOL)
        .with("startYear", 1990);

    customer
        .properties_mut()
        .child("base")
        .unwrap()
        .set(
            "educations",
            vec![Value::from(education.clone()), json!({"id": "01"})],
        )
        .unwrap();

    assert_eq!(customer.mutation_tracker().len(), 1);
    assert_eq!(
        customer.mutation_tracker().get("base.educations"),
        Some(&json!([Value::from(education), {"id": "01"}]))
    );
}

#[test]
fn element_edit_then_append() {
    let mut customer = fetched_customer();
    {
        let mut props = customer.properties_mut();
        let mut base = props.child("base").unwrap();
        base.item("educations", 0)
            .unwrap()
            .set("isCurrent", false)
            .unwrap();
        base.extend("educations", [Properties::new().with("id", "02")])
            .unwrap();
    }

    let educations = customer.mutation_tracker().get("base.educations").unwrap();
    assert_eq!(educations[0]["isCurrent"], json!(false));
    assert_eq!(educations[0]["schoolType"], json!("COLLEGE"));
    assert_eq!(educations[1], json!({"id": "02"}));
}

#[test]
fn server_lists_are_read_only_views() {
    let customer = fetched_customer();
    let tags = customer.properties().child("tags").unwrap();
    let auto = tags.list("auto").unwrap();
    assert_eq!(auto.len(), 1);
    assert_eq!(auto.to_string(), r#"["auto"]"#);
    assert!(matches!(tags.list("missing"), Err(Error::AttributeNotFound { .. })));
}

// ============================================================================
// Synchronization
// ============================================================================

#[test]
fn clearing_a_field_sends_null_in_partial_document() {
    let mut customer = fetched_customer();
    customer
        .properties_mut()
        .child("base")
        .unwrap()
        .set("firstName", Value::Null)
        .unwrap();

    assert_eq!(
        Value::Object(customer.partial_document()),
        json!({"base": {"firstName": null}})
    );
    assert!(customer.full_document()["base"].get("firstName").is_none());
    assert!(customer
        .properties()
        .child("base")
        .unwrap()
        .get("firstName")
        .unwrap()
        .is_null());
}

#[test]
fn sent_document_is_kept_after_synchronization() {
    let mut customer = Record::from_attributes(
        schema::customer_defaults(),
        tree(json!({"externalId": "ext"})),
    );
    customer.set("extra", "extra").unwrap();

    let sent = customer.full_document();
    assert_eq!(Value::Object(sent.clone()), json!({"externalId": "ext", "extra": "extra"}));

    let mut response = sent.clone();
    response.insert("id".to_string(), json!("01"));
    response.insert("registeredAt".to_string(), json!("2017-01-01T00:00:00Z"));
    customer.mark_synchronized(Some(response));

    assert!(customer.mutation_tracker().is_empty());
    assert_eq!(customer.id(), Some("01"));
    for (key, value) in &sent {
        assert_eq!(customer.attributes().get(key), Some(value));
    }
}

#[test]
fn tracker_replays_over_snapshot() {
    let snapshot = fetched_customer();
    let mut customer = snapshot.clone();
    {
        let mut props = customer.properties_mut();
        let mut base = props.child("base").unwrap();
        base.set("lastName", "lastName").unwrap();
        base.set("contacts", Properties::new().with("fax", "fax"))
            .unwrap();
    }

    let mut replayed = snapshot.into_tree();
    for (path, value) in customer.mutation_tracker().iter() {
        contacthub_engine::set_dotted(&mut replayed, path, value.clone());
    }
    assert_eq!(
        strip_empty(&replayed),
        strip_empty(customer.attributes())
    );
}

// ============================================================================
// Property-based checks
// ============================================================================

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    prop::collection::btree_map("[a-z]{1,3}", arb_value(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

fn has_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => {
            items.is_empty()
                || items.iter().any(|item| match item {
                    Value::Object(map) => map.values().any(has_empty),
                    _ => false,
                })
        }
        Value::Object(map) => map.is_empty() || map.values().any(has_empty),
        _ => false,
    }
}

proptest! {
    #[test]
    fn prop_container_roundtrip(t in arb_tree()) {
        let props = Properties::from_tree(t.clone());
        prop_assert_eq!(props.view().to_tree(), t.clone());
        prop_assert_eq!(Value::from(props), Value::Object(t));
    }

    #[test]
    fn prop_self_diff_is_empty(t in arb_tree()) {
        prop_assert!(diff_to_mutation_tracker(&t, &t).is_empty());
    }

    #[test]
    fn prop_strip_empty_is_idempotent(t in arb_tree()) {
        let stripped = strip_empty(&t);
        prop_assert_eq!(strip_empty(&stripped), stripped.clone());
        prop_assert!(!stripped.values().any(has_empty));
    }

    #[test]
    fn prop_partial_document_follows_path(
        keys in prop::collection::vec("[a-z]{1,3}", 1..4),
        leaf in arb_leaf(),
    ) {
        let dotted = keys.join(".");
        let mut tracker = MutationTracker::new();
        tracker.record(&dotted, leaf.clone());

        let resolved = tracker.resolve();
        prop_assert_eq!(get_dotted(&resolved, &dotted), Some(&leaf));
        prop_assert_eq!(enumerate_leaf_paths(&resolved), vec![keys]);
    }
}
