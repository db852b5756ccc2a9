//! Customer listing server.
//!
//! Serves `GET /customers` over either the in-memory index (optionally
//! seeded from a JSON file) or a DynamoDB table.
//!
//! Usage:
//!   customer-explorer --table customers --index registration_date_idx --seed-file customers.json

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use customer_explorer::config::{INDEX_NAME_ENV, TABLE_NAME_ENV};
use customer_explorer::{
    http, CustomerIndex, CustomerQueryService, InMemoryCustomerIndex, StoreConfig, StoredItem,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Memory,
    Dynamodb,
}

#[derive(Parser, Debug)]
#[command(name = "customer-explorer")]
#[command(about = "Paginated, searchable customer listing")]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "CUSTOMERS_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Customers table name
    #[arg(long, env = TABLE_NAME_ENV)]
    table: Option<String>,

    /// Secondary index sorted by registration date
    #[arg(long, env = INDEX_NAME_ENV)]
    index: Option<String>,

    /// Storage backend
    #[arg(long, value_enum, default_value = "memory")]
    backend: Backend,

    /// JSON array of stored items to load into the in-memory index
    #[arg(long)]
    seed_file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = StoreConfig {
        table_name: args.table.clone(),
        index_name: args.index.clone(),
    };
    if let Err(e) = config.target() {
        warn!(error = %e, "store configuration incomplete; requests will fail");
    }

    match args.backend {
        Backend::Memory => {
            let index = match &args.seed_file {
                Some(path) => load_seed(path)?,
                None => InMemoryCustomerIndex::new(),
            };
            info!(items = index.len(), "in-memory customer index ready");
            run(index, config, &args.bind).await
        }
        Backend::Dynamodb => run_dynamodb(config, &args.bind).await,
    }
}

async fn run<S: CustomerIndex + 'static>(index: S, config: StoreConfig, bind: &str) -> Result<()> {
    let service = Arc::new(CustomerQueryService::new(index, config));
    http::serve(service, bind)
        .await
        .with_context(|| format!("serving on {bind}"))
}

#[cfg(feature = "dynamodb")]
async fn run_dynamodb(config: StoreConfig, bind: &str) -> Result<()> {
    let index = customer_explorer::DynamoCustomerIndex::from_env().await;
    info!("dynamodb customer index ready");
    run(index, config, bind).await
}

#[cfg(not(feature = "dynamodb"))]
async fn run_dynamodb(_config: StoreConfig, _bind: &str) -> Result<()> {
    anyhow::bail!("built without the `dynamodb` feature")
}

fn load_seed(path: &Path) -> Result<InMemoryCustomerIndex> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let items: Vec<StoredItem> =
        serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))?;
    InMemoryCustomerIndex::with_items(items).context("loading seed items")
}
