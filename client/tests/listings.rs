//! Listings, queries, pagination, events, tags and sessions.

mod common;

use chrono::{TimeZone, Utc};
use common::{mock_node, page_body, tree, url, NODE_ID};
use contacthub_client::{ClientError, Event, ListCustomers, ListEvents, Method};
use contacthub_engine::{EntityKind, Error, Query};
use serde_json::{json, Value};

// ============================================================================
// Customer listings
// ============================================================================

#[test]
fn test_list_customers_params() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "01"}, {"id": "02"}]), 0, 1));

    let params = ListCustomers::new()
        .with_external_id("ext")
        .with_page(0)
        .with_size(2)
        .with_fields(["base.firstName", "base.lastName"]);
    let customers = node.customers(&params).unwrap();

    let request = transport.last();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, url("customers"));
    assert_eq!(request.param("nodeId"), Some(NODE_ID));
    assert_eq!(request.param("externalId"), Some("ext"));
    assert_eq!(request.param("size"), Some("2"));
    assert_eq!(request.param("fields"), Some("base.firstName,base.lastName"));

    assert_eq!(customers.len(), 2);
    assert_eq!(customers[1].id(), Some("02"));
    assert_eq!(customers.total_pages(), 1);
}

#[test]
fn test_customer_by_external_id() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "01", "externalId": "ext"}]), 0, 1));

    let customers = node.customer_by_external_id("ext").unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(transport.last().param("externalId"), Some("ext"));
}

#[test]
fn test_malformed_page_is_invalid_response() {
    let (node, transport) = mock_node();
    transport.respond(json!({"elements": []}));

    let err = node.customers(&ListCustomers::new()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_is_sent_as_json_param() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "01"}]), 0, 1));

    let field = EntityKind::Customer.field("base").field("firstName");
    let query = Query::new(EntityKind::Customer)
        .filter(field.equals("Mario"))
        .unwrap();
    let customers = node.all(&query).unwrap();
    assert_eq!(customers.len(), 1);

    let request = transport.last();
    assert_eq!(request.param("nodeId"), Some(NODE_ID));
    assert!(request.param("page").is_none());
    let sent: Value = serde_json::from_str(request.param("query").unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({
            "name": "query",
            "query": {
                "type": "simple",
                "name": "query",
                "are": {
                    "condition": {
                        "type": "atomic",
                        "attribute": "base.firstName",
                        "operator": "EQUALS",
                        "value": "Mario"
                    }
                }
            }
        })
    );
}

#[test]
fn test_empty_query_is_a_plain_listing() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([]), 2, 5));

    let customers = node.page(&Query::new(EntityKind::Customer), 2).unwrap();
    assert!(customers.is_empty());

    let request = transport.last();
    assert!(request.param("query").is_none());
    assert_eq!(request.param("page"), Some("2"));
}

#[test]
fn test_event_query_is_rejected() {
    let (node, transport) = mock_node();
    let query = Query::new(EntityKind::Event)
        .filter(EntityKind::Event.field("type").equals("viewedPage"))
        .unwrap();

    let err = node.all(&query).unwrap_err();
    assert!(matches!(
        err,
        ClientError::Engine(Error::OperationNotPermitted(_))
    ));
    assert_eq!(transport.count(), 0);
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_next_and_previous_page() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "01"}]), 0, 2));
    transport.respond(page_body(json!([{"id": "02"}]), 1, 2));
    transport.respond(page_body(json!([{"id": "01"}]), 0, 2));

    let params = ListCustomers::new().with_external_id("ext");
    let first = node.customers(&params).unwrap();
    assert!(first.previous_page().is_err());

    let second = first.next_page().unwrap();
    assert_eq!(second.number(), 1);
    assert_eq!(second[0].id(), Some("02"));
    let request = transport.last();
    assert_eq!(request.param("page"), Some("1"));
    assert_eq!(request.param("externalId"), Some("ext"));
    assert_eq!(request.param("nodeId"), Some(NODE_ID));

    let err = second.next_page().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Engine error: operation not permitted: Last page reached"
    );

    let back = second.previous_page().unwrap();
    assert_eq!(back.number(), 0);
    assert_eq!(transport.last().param("page"), Some("0"));

    // navigation errors do not send anything
    assert_eq!(transport.count(), 3);
    assert_eq!(first.number(), 0);
}

#[test]
fn test_iterate_page() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "01"}, {"id": "02"}, {"id": "03"}]), 0, 1));

    let customers = node.customers(&ListCustomers::new()).unwrap();
    let ids: Vec<_> = customers.iter().filter_map(|c| c.id()).collect();
    assert_eq!(ids, ["01", "02", "03"]);
    assert_eq!((&customers).into_iter().count(), 3);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_add_event_injects_node_id() {
    let (node, transport) = mock_node();

    let event = Event::new(tree(json!({
        "type": "viewedPage",
        "context": "WEB",
        "properties": {"url": "https://example.com"},
        "bringBackProperties": {"type": "SESSION_ID", "value": "session"}
    })));
    node.add_event(&event).unwrap();

    let request = transport.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, url("events"));
    let body = request.body.unwrap();
    assert_eq!(
        body["bringBackProperties"],
        json!({"type": "SESSION_ID", "value": "session", "nodeId": NODE_ID})
    );
    assert_eq!(body["properties"], json!({"url": "https://example.com"}));
}

#[test]
fn test_add_event_with_customer_id() {
    let (node, transport) = mock_node();

    let event = Event::new(tree(json!({
        "customerId": "c1",
        "type": "loggedIn",
        "context": "WEB",
        "properties": {}
    })));
    node.add_event(&event).unwrap();

    let body = transport.last().body.unwrap();
    assert_eq!(body, json!({"customerId": "c1", "type": "loggedIn", "context": "WEB"}));
}

#[test]
fn test_list_events_filters() {
    let (node, transport) = mock_node();
    transport.respond(page_body(
        json!([{"id": "e1", "customerId": "c1", "type": "viewedPage"}]),
        0,
        1,
    ));

    let params = ListEvents::for_customer("c1")
        .with_type("viewedPage")
        .with_context("WEB")
        .with_mode("ACTIVE")
        .with_dates(
            Some(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2017, 2, 1, 12, 30, 0).unwrap()),
        );
    let events = node.events(&params).unwrap();

    let request = transport.last();
    assert_eq!(request.url, url("events"));
    assert_eq!(request.param("customerId"), Some("c1"));
    assert_eq!(request.param("type"), Some("viewedPage"));
    assert_eq!(request.param("context"), Some("WEB"));
    assert_eq!(request.param("mode"), Some("ACTIVE"));
    assert_eq!(request.param("dateFrom"), Some("2017-01-01T00:00:00Z"));
    assert_eq!(request.param("dateTo"), Some("2017-02-01T12:30:00Z"));
    assert!(request.param("page").is_none());

    assert_eq!(events[0].event_type(), Some("viewedPage"));
    assert_eq!(events[0].customer_id(), Some("c1"));
}

#[test]
fn test_customer_events() {
    let (node, transport) = mock_node();
    transport.respond(page_body(json!([{"id": "e1"}]), 0, 1));

    let customer = contacthub_client::Customer::from_snapshot(tree(json!({"id": "c1"})));
    let events = customer.events(&node).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(transport.last().param("customerId"), Some("c1"));
}

#[test]
fn test_get_event() {
    let (node, transport) = mock_node();
    transport.respond(json!({"id": "e1", "type": "loggedIn"}));

    let event = node.event("e1").unwrap();
    assert_eq!(transport.last().url, url("events/e1"));
    assert_eq!(event.event_type(), Some("loggedIn"));
}

// ============================================================================
// Tags and sessions
// ============================================================================

#[test]
fn test_add_tag() {
    let (node, transport) = mock_node();
    transport.respond(json!({"id": "c1", "tags": {"auto": [], "manual": ["a"]}}));

    node.add_tag("c1", "b").unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(requests[1].url, url("customers/c1"));
    assert_eq!(requests[1].body, Some(json!({"tags": {"manual": ["a", "b"]}})));
}

#[test]
fn test_remove_tag() {
    let (node, transport) = mock_node();
    transport.respond(json!({"id": "c1", "tags": {"auto": [], "manual": ["a", "b"]}}));

    node.remove_tag("c1", "a").unwrap();
    assert_eq!(transport.last().body, Some(json!({"tags": {"manual": ["b"]}})));
}

#[test]
fn test_remove_missing_tag() {
    let (node, transport) = mock_node();
    transport.respond(json!({"id": "c1", "tags": {"auto": [], "manual": []}}));

    let err = node.remove_tag("c1", "a").unwrap_err();
    assert!(matches!(err, ClientError::Engine(Error::NotFound { .. })));
    assert_eq!(transport.count(), 1);
}

#[test]
fn test_sessions() {
    let (node, transport) = mock_node();
    transport.respond(json!({"value": "s"}));

    let session_id = node.create_session_id();
    assert_eq!(session_id.len(), 36);
    assert_ne!(session_id, node.create_session_id());

    node.add_customer_session("c1", &session_id).unwrap();
    let request = transport.last();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, url("customers/c1/sessions"));
    assert_eq!(request.body, Some(json!({"value": session_id})));
}
