//! Workspaces and nodes: the entry points of the client.
//!
//! A [`Workspace`] holds credentials and the transport; a [`Node`] is a
//! workspace seen through one node id, which every customer and event
//! request is scoped to.

use crate::config::WorkspaceConfig;
use crate::customer::Customer;
use crate::entry::Entry;
use crate::error::{ClientError, Result};
use crate::event::Event;
use crate::paginated::PaginatedList;
use crate::transport::{HttpTransport, Method, Request, Transport};
use chrono::{DateTime, Utc};
use contacthub_engine::{
    criterion::DATE_TIME_FORMAT, EntityKind, EntryKind, Error, Page, Query, Tree,
};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// A ContactHub workspace.
#[derive(Clone)]
pub struct Workspace {
    config: WorkspaceConfig,
    transport: Arc<dyn Transport>,
}

impl Workspace {
    /// Connect with the blocking HTTP transport.
    pub fn connect(config: WorkspaceConfig) -> Result<Self> {
        Ok(Self::with_transport(config, Arc::new(HttpTransport::new()?)))
    }

    /// Use a custom transport.
    pub fn with_transport(config: WorkspaceConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn workspace_id(&self) -> &str {
        &self.config.workspace_id
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// The configured node.
    pub fn default_node(&self) -> Node {
        self.node(self.config.node_id.clone())
    }

    /// View the workspace through `node_id`.
    pub fn node(&self, node_id: impl Into<String>) -> Node {
        Node {
            workspace: self.clone(),
            node_id: node_id.into(),
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Parameters of a customer listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCustomers {
    pub external_id: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
    /// Restrict returned attributes
    pub fields: Vec<String>,
}

impl ListCustomers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Parameters of an event listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEvents {
    pub customer_id: String,
    pub event_type: Option<String>,
    pub context: Option<String>,
    /// `ACTIVE` or `PASSIVE`
    pub mode: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ListEvents {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_dates(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// A workspace scoped to one node.
#[derive(Debug, Clone)]
pub struct Node {
    workspace: Workspace,
    node_id: String,
}

impl Node {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// `{base_url}/workspaces/{workspace_id}/{segments...}`
    pub(crate) fn url(&self, segments: &[&str]) -> String {
        let mut url = format!(
            "{}/workspaces/{}",
            self.workspace.base_url(),
            self.workspace.workspace_id()
        );
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// A request carrying the authentication headers.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Request {
        Request::new(method, self.url(segments))
            .with_header(
                "Authorization",
                format!("Bearer {}", self.workspace.config.token),
            )
            .with_header("Content-Type", "application/json")
    }

    pub(crate) fn send(&self, request: &Request) -> Result<Option<Value>> {
        tracing::debug!("{} {}", request.method, request.url);
        self.workspace.transport.send(request).map_err(|e| {
            if let ClientError::Remote(remote) = &e {
                tracing::warn!(
                    "{} {} failed with {}: {}",
                    request.method,
                    request.url,
                    remote.status,
                    remote.message
                );
            }
            e
        })
    }

    /// Send and require a JSON object back.
    pub(crate) fn send_for_tree(&self, request: &Request) -> Result<Tree> {
        match self.send(request)? {
            Some(Value::Object(tree)) => Ok(tree),
            Some(other) => Err(ClientError::InvalidResponse(format!(
                "expected an object, got {}",
                other
            ))),
            None => Err(ClientError::InvalidResponse("empty body".to_string())),
        }
    }

    pub(crate) fn fetch_page<T>(
        &self,
        request: Request,
        convert: fn(Tree) -> T,
    ) -> Result<PaginatedList<T>> {
        let body = self.send_for_tree(&request)?;
        let page: Page = serde_json::from_value(Value::Object(body))
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let elements = page.elements.into_iter().map(convert).collect();
        Ok(PaginatedList::new(
            elements,
            page.page,
            self.clone(),
            request,
            convert,
        ))
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    /// List customers of this node.
    pub fn customers(&self, params: &ListCustomers) -> Result<PaginatedList<Customer>> {
        let mut request = self
            .request(Method::Get, &["customers"])
            .with_param("nodeId", &self.node_id);
        if let Some(external_id) = &params.external_id {
            request = request.with_param("externalId", external_id);
        }
        if let Some(page) = params.page {
            request = request.with_param("page", page);
        }
        if let Some(size) = params.size {
            request = request.with_param("size", size);
        }
        if !params.fields.is_empty() {
            request = request.with_param("fields", params.fields.join(","));
        }
        self.fetch_page(request, Customer::from_snapshot)
    }

    /// Fetch one customer by id.
    pub fn customer(&self, id: &str) -> Result<Customer> {
        let request = self.request(Method::Get, &["customers", id]);
        Ok(Customer::from_snapshot(self.send_for_tree(&request)?))
    }

    /// Customers of this node carrying `external_id`.
    pub fn customer_by_external_id(&self, external_id: &str) -> Result<Vec<Customer>> {
        let params = ListCustomers::new().with_external_id(external_id);
        Ok(self.customers(&params)?.into_elements())
    }

    /// Run `query` and return its first page.
    pub fn all(&self, query: &Query) -> Result<PaginatedList<Customer>> {
        self.fetch_page(self.query_request(query)?, Customer::from_snapshot)
    }

    /// Run `query` and return page `page`.
    pub fn page(&self, query: &Query, page: u64) -> Result<PaginatedList<Customer>> {
        let request = self.query_request(query)?.with_param("page", page);
        self.fetch_page(request, Customer::from_snapshot)
    }

    fn query_request(&self, query: &Query) -> Result<Request> {
        if query.entity() != EntityKind::Customer {
            return Err(Error::OperationNotPermitted(format!(
                "Cannot run a query on {} as a customer listing",
                query.entity()
            ))
            .into());
        }
        let mut request = self
            .request(Method::Get, &["customers"])
            .with_param("nodeId", &self.node_id);
        if let Some(wire) = query.to_wire() {
            let encoded = serde_json::to_string(&wire)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            request = request.with_param("query", encoded);
        }
        Ok(request)
    }

    /// Delete a customer by id.
    pub fn delete_customer(&self, id: &str) -> Result<()> {
        self.send(&self.request(Method::Delete, &["customers", id]))?;
        Ok(())
    }

    /// Add `tag` to a customer's manual tags.
    pub fn add_tag(&self, customer_id: &str, tag: &str) -> Result<()> {
        let mut manual = self.manual_tags(customer_id)?;
        if !manual.iter().any(|t| t.as_str() == Some(tag)) {
            manual.push(Value::from(tag));
        }
        self.patch_manual_tags(customer_id, manual)
    }

    /// Remove `tag` from a customer's manual tags.
    pub fn remove_tag(&self, customer_id: &str, tag: &str) -> Result<()> {
        let mut manual = self.manual_tags(customer_id)?;
        let before = manual.len();
        manual.retain(|t| t.as_str() != Some(tag));
        if manual.len() == before {
            return Err(Error::NotFound {
                kind: format!("Tag '{}'", tag),
            }
            .into());
        }
        self.patch_manual_tags(customer_id, manual)
    }

    fn manual_tags(&self, customer_id: &str) -> Result<Vec<Value>> {
        let customer = self.customer(customer_id)?;
        let manual = contacthub_engine::get_dotted(customer.attributes(), "tags.manual")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(manual)
    }

    fn patch_manual_tags(&self, customer_id: &str, manual: Vec<Value>) -> Result<()> {
        let request = self
            .request(Method::Patch, &["customers", customer_id])
            .with_json(json!({"tags": {"manual": manual}}));
        self.send(&request)?;
        Ok(())
    }

    /// A new random session id.
    pub fn create_session_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Bind an anonymous session to a customer.
    pub fn add_customer_session(&self, customer_id: &str, session_id: &str) -> Result<Tree> {
        let request = self
            .request(Method::Post, &["customers", customer_id, "sessions"])
            .with_json(json!({"value": session_id}));
        self.send_for_tree(&request)
    }

    // ------------------------------------------------------------------
    // Sub-entries
    // ------------------------------------------------------------------

    /// Fetch one job, education, like or subscription of a customer.
    pub fn entry(&self, kind: EntryKind, customer_id: &str, entry_id: &str) -> Result<Entry> {
        let request = self.request(
            Method::Get,
            &["customers", customer_id, kind.collection(), entry_id],
        );
        Ok(Entry::from_snapshot(kind, self.send_for_tree(&request)?))
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Store an event.
    ///
    /// Events identified through `bringBackProperties` get this node's id
    /// added there so the API can resolve the customer.
    pub fn add_event(&self, event: &Event) -> Result<()> {
        let mut body = event.full_document();
        if let Some(Value::Object(bring_back)) = body.get_mut("bringBackProperties") {
            bring_back.insert("nodeId".to_string(), Value::from(self.node_id.as_str()));
        }
        let request = self
            .request(Method::Post, &["events"])
            .with_json(Value::Object(body));
        self.send(&request)?;
        Ok(())
    }

    /// Fetch one event by id.
    pub fn event(&self, id: &str) -> Result<Event> {
        let request = self.request(Method::Get, &["events", id]);
        Ok(Event::from_snapshot(self.send_for_tree(&request)?))
    }

    /// List events of a customer.
    pub fn events(&self, params: &ListEvents) -> Result<PaginatedList<Event>> {
        let mut request = self
            .request(Method::Get, &["events"])
            .with_param("customerId", &params.customer_id);
        let optional = [
            ("type", params.event_type.clone()),
            ("context", params.context.clone()),
            ("mode", params.mode.clone()),
            (
                "dateFrom",
                params
                    .date_from
                    .map(|d| d.format(DATE_TIME_FORMAT).to_string()),
            ),
            (
                "dateTo",
                params.date_to.map(|d| d.format(DATE_TIME_FORMAT).to_string()),
            ),
            ("page", params.page.map(|p| p.to_string())),
            ("size", params.size.map(|s| s.to_string())),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                request = request.with_param(name, value);
            }
        }
        self.fetch_page(request, Event::from_snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl Transport for Unreachable {
        fn send(&self, _request: &Request) -> Result<Option<Value>> {
            Err(ClientError::Transport("unreachable".to_string()))
        }
    }

    fn node() -> Node {
        let config = WorkspaceConfig::new("123", "456", "789").with_base_url("http://localhost/");
        Workspace::with_transport(config, Arc::new(Unreachable)).default_node()
    }

    #[test]
    fn urls_are_scoped_to_the_workspace() {
        let node = node();
        assert_eq!(node.node_id(), "789");
        assert_eq!(
            node.url(&["customers", "01", "likes"]),
            "http://localhost/workspaces/123/customers/01/likes"
        );
    }

    #[test]
    fn requests_carry_credentials() {
        let request = node().request(Method::Get, &["events"]);
        assert_eq!(request.header("authorization"), Some("Bearer 456"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn transport_errors_propagate() {
        let err = node().customer("01").unwrap_err();
        assert_eq!(err.to_string(), "Transport error: unreachable");
    }

    #[test]
    fn debug_hides_token() {
        assert!(!format!("{:?}", node()).contains("456"));
    }
}
