// Workflow service - sequences validator, transition engine and storage

//! # Workflow Service
//!
//! The operations the HTTP layer exposes, one method each:
//!
//! | Operation | Steps |
//! |---|---|
//! | `create_definition` | build, validate, persist |
//! | `create_instance` | resolve definition, adopt its initial state, persist |
//! | `execute_action` | check instance exists, lock it, re-read, resolve definition, run engine, persist, release lock |
//!
//! ## Concurrency
//!
//! Two `execute_action` calls on the same instance are serialized through a
//! per-instance async mutex held in a `DashMap`. The instance is read *after*
//! the lock is taken, so the second caller runs its precondition checks
//! against the first caller's result. Different instances never share a lock.
//! An entry exists only while some caller holds or waits on it, and ids
//! with no stored instance never get one.
//!
//! The store can also be written by something other than this service (a
//! second process on the same data directory, say). Before saving, the
//! stored copy is compared with the one the engine started from; if it moved,
//! the call fails with [`WorkflowError::Conflict`] and nothing is written.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::storage::WorkflowStorage;
use super::{transition, validator};
use crate::models::{Action, ActionId, State, WorkflowDefinition, WorkflowInstance};
use crate::{Result, WorkflowError};

/// Client input for a new workflow definition
///
/// The identifier and creation timestamp are assigned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefinitionRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub states: Vec<State>,

    #[serde(default)]
    pub actions: Vec<Action>,
}

impl CreateDefinitionRequest {
    /// The document review demo workflow
    ///
    /// `draft → review → approved`, with `reject` as the alternative
    /// final outcome of a review.
    pub fn document_review() -> Self {
        Self {
            name: "Document Review".to_string(),
            description: Some("Draft, review, then approve or reject a document".to_string()),
            states: vec![
                State::new("draft", "Draft").initial(),
                State::new("review", "In Review"),
                State::new("approved", "Approved").final_state(),
                State::new("rejected", "Rejected").final_state(),
            ],
            actions: vec![
                Action::new("submit", "Submit for Review", vec!["draft"], "review"),
                Action::new("approve", "Approve", vec!["review"], "approved"),
                Action::new("reject", "Reject", vec!["review"], "rejected"),
            ],
        }
    }
}

/// Orchestrates workflow operations over an injected store
#[derive(Clone)]
pub struct WorkflowService {
    storage: Arc<dyn WorkflowStorage>,
    instance_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl WorkflowService {
    pub fn new(storage: Arc<dyn WorkflowStorage>) -> Self {
        Self {
            storage,
            instance_locks: Arc::new(DashMap::new()),
        }
    }

    /// Validate and store a new definition
    pub async fn create_definition(
        &self,
        request: CreateDefinitionRequest,
    ) -> Result<WorkflowDefinition> {
        let mut definition =
            WorkflowDefinition::new(request.name, request.states, request.actions);
        definition.description = request.description;

        if let Err(e) = validator::validate(&definition) {
            warn!("❌ Rejected workflow definition '{}': {}", definition.name, e.reason());
            return Err(e);
        }

        let created = self.storage.save_definition(definition).await?;
        info!(
            "✅ Created workflow definition '{}' ({}) with {} states and {} actions",
            created.name,
            created.id,
            created.states.len(),
            created.actions.len()
        );
        Ok(created)
    }

    pub async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>> {
        self.storage.get_definition(id).await
    }

    /// All definitions, oldest first
    pub async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>> {
        let mut definitions = self.storage.list_definitions().await?;
        definitions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(definitions)
    }

    /// Start a new instance in the definition's initial state
    pub async fn create_instance(&self, definition_id: &str) -> Result<WorkflowInstance> {
        let definition = self.require_definition(definition_id).await?;

        let initial = definition.initial_state().ok_or_else(|| {
            WorkflowError::validation(format!(
                "workflow definition '{}' has no initial state",
                definition_id
            ))
        })?;

        let instance = WorkflowInstance::new(&definition.id, initial.id.clone());
        let created = self.storage.save_instance(instance).await?;
        info!(
            "🆕 Created instance {} of '{}' in state '{}'",
            created.id, definition.name, created.current_state_id
        );
        Ok(created)
    }

    pub async fn get_instance(&self, id: &str) -> Result<Option<WorkflowInstance>> {
        self.storage.get_instance(id).await
    }

    /// All instances, oldest first
    pub async fn list_instances(&self) -> Result<Vec<WorkflowInstance>> {
        let mut instances = self.storage.list_instances().await?;
        instances.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(instances)
    }

    /// Instances of one definition, oldest first
    pub async fn list_instances_for_definition(
        &self,
        definition_id: &str,
    ) -> Result<Vec<WorkflowInstance>> {
        self.require_definition(definition_id).await?;
        let instances = self.list_instances().await?;
        Ok(instances
            .into_iter()
            .filter(|i| i.definition_id == definition_id)
            .collect())
    }

    /// Actions that could fire right now on the instance
    pub async fn available_actions(&self, instance_id: &str) -> Result<Vec<Action>> {
        let instance = self.require_instance(instance_id).await?;
        let definition = self.require_definition(&instance.definition_id).await?;

        Ok(transition::available_actions(&instance, &definition)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Fire `action_id` on the instance and persist the result
    pub async fn execute_action(
        &self,
        instance_id: &str,
        action_id: &ActionId,
    ) -> Result<WorkflowInstance> {
        // Unknown ids never get a lock entry
        self.require_instance(instance_id).await?;

        let lock = self.lock_for(instance_id);
        let result = {
            let _guard = lock.lock().await;
            self.execute_locked(instance_id, action_id).await
        };
        self.release_lock(instance_id, lock);
        result
    }

    async fn execute_locked(
        &self,
        instance_id: &str,
        action_id: &ActionId,
    ) -> Result<WorkflowInstance> {
        let instance = self.require_instance(instance_id).await?;
        let definition = self.require_definition(&instance.definition_id).await?;

        debug!(
            "⚙️  Executing '{}' on instance {} (state '{}')",
            action_id, instance.id, instance.current_state_id
        );

        let updated = match transition::execute_at(&instance, action_id, &definition, Utc::now()) {
            Ok(updated) => updated,
            Err(e) => {
                warn!(
                    "❌ Action '{}' rejected on instance {}: {}",
                    action_id,
                    instance.id,
                    e.reason()
                );
                return Err(e);
            }
        };

        self.ensure_unchanged(&instance).await?;
        let saved = self.storage.save_instance(updated).await?;

        info!(
            "🔄 Instance {} moved '{}' -> '{}' via '{}'{}",
            saved.id,
            instance.current_state_id,
            saved.current_state_id,
            action_id,
            if saved.is_completed() { " (completed)" } else { "" }
        );
        Ok(saved)
    }

    fn lock_for(&self, instance_id: &str) -> Arc<Mutex<()>> {
        self.instance_locks
            .entry(instance_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the table entry once no other caller holds or waits on it
    ///
    /// Our clone goes first, so whichever caller checks last sees a count of
    /// one. `remove_if` runs under the shard lock, the same lock `lock_for`
    /// clones under.
    fn release_lock(&self, instance_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.instance_locks
            .remove_if(instance_id, |_, entry| Arc::strong_count(entry) == 1);
    }

    async fn ensure_unchanged(&self, read: &WorkflowInstance) -> Result<()> {
        match self.storage.get_instance(&read.id).await? {
            Some(current)
                if current.history.len() == read.history.len()
                    && current.updated_at == read.updated_at =>
            {
                Ok(())
            }
            Some(_) => Err(WorkflowError::Conflict(format!(
                "workflow instance '{}' was modified concurrently",
                read.id
            ))),
            None => Err(WorkflowError::Conflict(format!(
                "workflow instance '{}' disappeared during execution",
                read.id
            ))),
        }
    }

    async fn require_definition(&self, id: &str) -> Result<WorkflowDefinition> {
        self.storage.get_definition(id).await?.ok_or_else(|| {
            WorkflowError::validation(format!("workflow definition '{}' not found", id))
        })
    }

    async fn require_instance(&self, id: &str) -> Result<WorkflowInstance> {
        self.storage
            .get_instance(id)
            .await?
            .ok_or_else(|| WorkflowError::validation(format!("workflow instance '{}' not found", id)))
    }
}
