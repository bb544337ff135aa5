//! # ContactHub Client
//!
//! Blocking client for the ContactHub customer data API, built on
//! [`contacthub_engine`] for change tracking and query compilation.
//!
//! ## Usage
//!
//! ```no_run
//! use contacthub_client::{Customer, PersistMode, Workspace, WorkspaceConfig};
//! use contacthub_engine::{EntityKind, Query};
//!
//! # fn main() -> contacthub_client::Result<()> {
//! let workspace = Workspace::connect(WorkspaceConfig::from_env()?)?;
//! let node = workspace.default_node();
//!
//! let mut customer = Customer::new();
//! customer.properties_mut().child("base")?.set("firstName", "Mario")?;
//! customer.persist(&node, PersistMode::Update, false)?;
//!
//! let field = EntityKind::Customer.field("base.firstName");
//! let query = Query::new(EntityKind::Customer).filter(field.equals("Mario"))?;
//! for customer in &node.all(&query)? {
//!     println!("{:?}", customer.id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod customer;
pub mod entry;
pub mod error;
pub mod event;
pub mod node;
pub mod paginated;
pub mod transport;

pub use config::{ConfigError, WorkspaceConfig};
pub use customer::{Customer, PersistMode};
pub use entry::Entry;
pub use error::{ClientError, RemoteError, Result};
pub use event::Event;
pub use node::{ListCustomers, ListEvents, Node, Workspace};
pub use paginated::PaginatedList;
pub use transport::{HttpTransport, Method, Request, Transport};
