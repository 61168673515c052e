// FSM Workflow - HTTP Server
// Serves the workflow REST API
// Run with: cargo run --bin server

//! # FSM Workflow Server Binary
//!
//! Starts the HTTP server that exposes workflow definitions, instances and
//! action execution as REST routes.
//!
//! ## How It Fits Together
//!
//! ```text
//! main() function
//!   ↓ loads
//! ServerConfig (defaults → fsm-workflow.toml → FSM_WORKFLOW_* env → CLI flags)
//!   ↓ picks
//! WorkflowStorage (InMemoryStorage or JsonFileStorage)
//!   ↓ injected into
//! WorkflowApiServerBuilder
//!   ↓ serves
//! Axum router → WorkflowService → validator / transition engine
//! ```
//!
//! ## Usage Examples
//!
//! ```text
//! cargo run --bin server
//! cargo run --bin server -- --port 8080 --storage json --data-dir ./data
//! cargo run --bin server -- --seed-demo
//! ```
//!
//! ## Rust Learning Notes:
//!
//! - `#[tokio::main]` builds the async runtime around `main`
//! - `anyhow::Result` lets `main` propagate any error with `?`
//! - `Arc<dyn WorkflowStorage>` lets the backend be chosen at runtime

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use fsm_workflow::config::StorageBackend;
use fsm_workflow::{
    InMemoryStorage, JsonFileStorage, ServerConfig, WorkflowApiServerBuilder, WorkflowStorage,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fsm-workflow-server")]
#[command(about = "FSM Workflow Server - REST API for finite-state-machine workflows")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./fsm-workflow.toml when present)
    #[arg(short, long, env = "FSM_WORKFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Storage backend
    #[arg(long, value_enum)]
    storage: Option<StorageBackend>,

    /// Directory for the json storage backend
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Register the document review demo workflow on startup
    #[arg(long)]
    seed_demo: bool,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

impl Cli {
    /// Command-line flags win over file and environment settings
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if self.seed_demo {
            config.seed_demo = true;
        }
        if self.no_cors {
            config.cors_enabled = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let dotenv_result = dotenv();

    let cli = Cli::parse();
    let loaded = ServerConfig::load_from(cli.config.as_deref())?;
    let config = cli.apply(loaded);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = dotenv_result {
        warn!("No .env file loaded: {}", e);
    }

    info!("🚀 Starting FSM Workflow Server...");
    info!("=====================================");
    info!("Server: {}", config.bind_address());
    info!("Storage: {:?}", config.storage);

    let storage: Arc<dyn WorkflowStorage> = match config.storage {
        StorageBackend::Memory => {
            info!("💾 Using in-memory storage (data is lost on exit)");
            Arc::new(InMemoryStorage::new())
        }
        StorageBackend::Json => {
            info!("📁 Using JSON file storage in {}", config.data_dir.display());
            Arc::new(JsonFileStorage::open(&config.data_dir).await?)
        }
    };

    WorkflowApiServerBuilder::new()
        .with_config(config)
        .with_storage(storage)
        .build()
        .run()
        .await
}
