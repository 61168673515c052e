// Storage abstraction for the workflow engine
// This defines the interface for persisting definitions and instances

//! # Storage Abstraction Layer
//!
//! The engine depends on persistence only through the [`WorkflowStorage`]
//! trait (the **Repository Pattern**):
//! - **WorkflowStorage trait**: keyed get/save/list for definitions and instances
//! - **InMemoryStorage**: default implementation for development and tests
//! - **JsonFileStorage** (`json_storage` module): JSON files on disk
//!
//! The store is owned by the composition root and shared as
//! `Arc<dyn WorkflowStorage>`. Storage never validates anything; the service
//! layer decides what is allowed to be saved.
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! The `async-trait` crate rewrites `async fn` in traits into methods that
//! return boxed futures, which keeps the trait object-safe.
//!
//! ### Send + Sync
//! Required so one store can be shared across tokio tasks and axum handlers.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::{WorkflowDefinition, WorkflowInstance};
use crate::Result;

/// Storage trait for definition and instance persistence
///
/// ## Return Value
/// `Result<Option<T>>` means:
/// - `Ok(Some(value))`: found
/// - `Ok(None)`: no entity with that id (not an error)
/// - `Err(error)`: the backend failed
#[async_trait::async_trait]
pub trait WorkflowStorage: Send + Sync {
    /// Insert or replace a definition, keyed by its id
    async fn save_definition(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition>;

    async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>>;

    /// All definitions, no particular order
    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>>;

    /// Insert or replace an instance, keyed by its id
    async fn save_instance(&self, instance: WorkflowInstance) -> Result<WorkflowInstance>;

    async fn get_instance(&self, id: &str) -> Result<Option<WorkflowInstance>>;

    /// All instances, no particular order
    async fn list_instances(&self) -> Result<Vec<WorkflowInstance>>;
}

/// In-memory storage implementation for development and testing
///
/// ## Limitations
///
/// - **Not persistent**: data is lost when the process restarts
/// - **Not distributed**: cannot be shared across processes
///
/// ## Rust Learning Notes:
///
/// ### tokio RwLock
/// `.read().await` / `.write().await` return guards that unlock when dropped.
/// A tokio lock can't be poisoned, so acquiring it returns the guard directly.
#[derive(Default)]
pub struct InMemoryStorage {
    definitions: RwLock<HashMap<String, WorkflowDefinition>>,
    instances: RwLock<HashMap<String, WorkflowInstance>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WorkflowStorage for InMemoryStorage {
    async fn save_definition(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition> {
        let mut definitions = self.definitions.write().await;
        definitions.insert(definition.id.clone(), definition.clone());
        Ok(definition)
    }

    async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>> {
        let definitions = self.definitions.read().await;
        Ok(definitions.get(id).cloned())
    }

    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>> {
        let definitions = self.definitions.read().await;
        Ok(definitions.values().cloned().collect())
    }

    async fn save_instance(&self, instance: WorkflowInstance) -> Result<WorkflowInstance> {
        let mut instances = self.instances.write().await;
        instances.insert(instance.id.clone(), instance.clone());
        Ok(instance)
    }

    async fn get_instance(&self, id: &str) -> Result<Option<WorkflowInstance>> {
        let instances = self.instances.read().await;
        Ok(instances.get(id).cloned())
    }

    async fn list_instances(&self) -> Result<Vec<WorkflowInstance>> {
        let instances = self.instances.read().await;
        Ok(instances.values().cloned().collect())
    }
}
