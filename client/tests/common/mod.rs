//! Shared helpers for client integration tests.

#![allow(dead_code)]

use contacthub_client::{
    ClientError, Node, RemoteError, Request, Result, Transport, Workspace, WorkspaceConfig,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://api.contactlab.it/hub/v1";
pub const WORKSPACE_ID: &str = "123";
pub const TOKEN: &str = "456";
pub const NODE_ID: &str = "789";

/// Records every request and answers with queued responses.
///
/// An empty queue answers with an empty 2xx body.
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<Request>>,
    responses: Mutex<VecDeque<Result<Option<Value>>>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(Some(body)));
    }

    pub fn respond_empty(&self) {
        self.responses.lock().unwrap().push_back(Ok(None));
    }

    pub fn fail(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Remote(RemoteError::new(status, Some(body)))));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Request {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request sent")
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request) -> Result<Option<Value>> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// A node wired to a fresh mock transport.
pub fn mock_node() -> (Node, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let config = WorkspaceConfig::new(WORKSPACE_ID, TOKEN, NODE_ID);
    let workspace = Workspace::with_transport(config, transport.clone());
    (workspace.default_node(), transport)
}

pub fn url(path: &str) -> String {
    format!("{}/workspaces/{}/{}", BASE_URL, WORKSPACE_ID, path)
}

pub fn tree(value: Value) -> contacthub_engine::Tree {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

/// A page body as the API returns it.
pub fn page_body(elements: Value, number: u64, total_pages: u64) -> Value {
    serde_json::json!({
        "elements": elements,
        "page": {
            "size": 10,
            "totalElements": total_pages * 10,
            "totalUnfilteredElements": total_pages * 10,
            "totalPages": total_pages,
            "number": number
        }
    })
}
