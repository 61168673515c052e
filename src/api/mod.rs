// Workflow REST API module
// Exposes every WorkflowService operation as an HTTP route

pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::engine::{CreateDefinitionRequest, InMemoryStorage, WorkflowService, WorkflowStorage};
use handlers::{
    available_actions, create_definition, create_instance, execute_action, execute_action_body,
    get_definition, get_instance, health_check, list_definition_instances, list_definitions,
    list_instances, not_found,
};

/// Workflow API server
pub struct WorkflowApiServer {
    config: ServerConfig,
    service: WorkflowService,
}

impl WorkflowApiServer {
    pub fn new(config: ServerConfig, service: WorkflowService) -> Self {
        Self { config, service }
    }

    /// In-memory storage and default configuration
    pub fn with_defaults() -> Self {
        WorkflowApiServerBuilder::new().build()
    }

    pub fn service(&self) -> &WorkflowService {
        &self.service
    }

    /// Create the Axum router with all workflow routes
    pub fn create_router(&self) -> Router {
        let api_router = Router::new()
            .route("/health", get(health_check))
            // Definitions
            .route("/api/workflows", post(create_definition).get(list_definitions))
            .route("/api/workflows/:id", get(get_definition))
            .route("/api/workflows/:id/instances", get(list_definition_instances))
            // Instances
            .route("/api/instances", post(create_instance).get(list_instances))
            .route("/api/instances/:id", get(get_instance))
            .route("/api/instances/:id/actions", get(available_actions))
            .route("/api/instances/:id/actions/:action_id", post(execute_action))
            .route("/api/instances/:id/execute", post(execute_action_body))
            .fallback(not_found)
            .with_state(self.service.clone());

        if self.config.cors_enabled {
            api_router.layer(CorsLayer::permissive())
        } else {
            api_router
        }
    }

    /// Register the demo workflow unless one with the same name exists
    pub async fn add_default_workflows(&self) -> crate::Result<()> {
        let demo = CreateDefinitionRequest::document_review();
        let existing = self.service.list_definitions().await?;
        if existing.iter().any(|d| d.name == demo.name) {
            info!("📋 Demo workflow '{}' already present", demo.name);
            return Ok(());
        }

        let definition = self.service.create_definition(demo).await?;
        info!("📋 Seeded demo workflow '{}' ({})", definition.name, definition.id);
        Ok(())
    }

    /// Run the server until the process is stopped
    pub async fn run(self) -> anyhow::Result<()> {
        if self.config.seed_demo {
            self.add_default_workflows().await?;
        }

        let app = self.create_router();
        let addr = self.config.bind_address();

        info!("🚀 Workflow API server starting");
        info!("📡 Server address: http://{}", addr);
        info!("🔗 API endpoints:");
        info!("   POST http://{}/api/workflows", addr);
        info!("   POST http://{}/api/instances", addr);
        info!("   POST http://{}/api/instances/:id/actions/:action_id", addr);
        info!("   GET  http://{}/health", addr);
        info!("   CORS enabled: {}", self.config.cors_enabled);

        axum::Server::bind(&addr.parse()?)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

/// Builder pattern for the API server
pub struct WorkflowApiServerBuilder {
    config: ServerConfig,
    storage: Option<Arc<dyn WorkflowStorage>>,
}

impl WorkflowApiServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            storage: None,
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.config.host = host;
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn WorkflowStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> WorkflowApiServer {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStorage::new()));
        WorkflowApiServer::new(self.config, WorkflowService::new(storage))
    }
}

impl Default for WorkflowApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
