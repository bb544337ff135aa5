//! ContactHub command line client.
//!
//! Reads the workspace configuration from the environment (or `.env`) and
//! prints API results as JSON.

use clap::{Parser, Subcommand};
use contacthub_client::{
    Customer, ListCustomers, ListEvents, Node, PaginatedList, Workspace, WorkspaceConfig,
};
use contacthub_engine::{EntityKind, Query, Record};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "contacthub", about = "Query a ContactHub workspace")]
struct Args {
    /// Node to act on, instead of CONTACTHUB_NODE_ID
    #[arg(long, env = "CONTACTHUB_NODE")]
    node: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one customer
    Customer { id: String },

    /// List customers of the node
    Customers {
        #[arg(long)]
        external_id: Option<String>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        size: Option<u64>,
        /// Attributes to return, comma separated
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Find customers whose attribute equals a value
    Find {
        /// Dotted attribute path, e.g. base.firstName
        #[arg(long)]
        field: String,
        #[arg(long)]
        equals: String,
        #[arg(long, default_value_t = 0)]
        page: u64,
    },

    /// List events of a customer
    Events {
        customer_id: String,
        #[arg(long = "type")]
        event_type: Option<String>,
        #[arg(long)]
        page: Option<u64>,
    },

    /// Delete a customer
    Delete { id: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contacthub_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Load configuration
    let config = WorkspaceConfig::from_env()?;
    tracing::debug!("Using workspace {}", config.workspace_id);

    let workspace = Workspace::connect(config)?;
    let node = match args.node {
        Some(node_id) => workspace.node(node_id),
        None => workspace.default_node(),
    };

    run(&node, args.command)
}

fn run(node: &Node, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Customer { id } => {
            let customer = node.customer(&id)?;
            print_json(&Value::Object(customer.attributes().clone()))?;
        }
        Command::Customers {
            external_id,
            page,
            size,
            fields,
        } => {
            let params = ListCustomers {
                external_id,
                page,
                size,
                fields,
            };
            print_page(&node.customers(&params)?)?;
        }
        Command::Find {
            field,
            equals,
            page,
        } => {
            let criterion = EntityKind::Customer.field(field).equals(equals);
            let query = Query::new(EntityKind::Customer).filter(criterion)?;
            let customers: PaginatedList<Customer> = node.page(&query, page)?;
            print_page(&customers)?;
        }
        Command::Events {
            customer_id,
            event_type,
            page,
        } => {
            let mut params = ListEvents::for_customer(customer_id);
            params.event_type = event_type;
            params.page = page;
            print_page(&node.events(&params)?)?;
        }
        Command::Delete { id } => {
            node.delete_customer(&id)?;
            tracing::info!("Deleted customer {}", id);
        }
    }
    Ok(())
}

fn print_page<T>(list: &PaginatedList<T>) -> Result<(), Box<dyn std::error::Error>>
where
    T: std::ops::Deref<Target = Record>,
{
    let elements: Vec<Value> = list
        .iter()
        .map(|element| Value::Object(element.attributes().clone()))
        .collect();
    print_json(&serde_json::json!({
        "elements": elements,
        "page": list.page_info(),
    }))
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
