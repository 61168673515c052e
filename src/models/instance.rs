// Instance domain models - workflow execution state

//! # Instance Models
//!
//! - `WorkflowInstance`: one live run of a workflow definition
//! - `HistoryEntry`: audit record of one executed action
//!
//! An instance refers to its definition by identifier only. The engine looks
//! the definition up on demand and treats a missing one as an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{ActionId, StateId};

/// History entry recording one state transition
///
/// The action name is copied from the definition when the action fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub action_id: ActionId,
    pub action_name: String,
    pub from_state_id: StateId,
    pub to_state_id: StateId,
    pub executed_at: DateTime<Utc>,
}

/// A running workflow - the "token" moving through a definition's states
///
/// ## Lifecycle
///
/// 1. Created in the definition's initial state with empty history
/// 2. Each successful action replaces `current_state_id`, appends one
///    `HistoryEntry` and refreshes `updated_at`
/// 3. Entering a final state sets `completed_at`; no further actions fire
///
/// ## Rust Learning Notes:
///
/// ### Option<T> for Nullable Fields
/// `completed_at: Option<DateTime<Utc>>` is `None` until the instance
/// completes. It serializes as `null` so clients always see the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
    /// Generated identifier (UUID v4)
    pub id: String,

    /// Identifier of the definition this instance runs
    pub definition_id: String,

    pub current_state_id: StateId,

    /// Append-only transition log, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    /// Create a new instance of `definition_id` sitting in `initial_state`
    pub fn new<D: Into<String>>(definition_id: D, initial_state: StateId) -> Self {
        let now = Utc::now();

        WorkflowInstance {
            id: Uuid::new_v4().to_string(),
            definition_id: definition_id.into(),
            current_state_id: initial_state,
            history: vec![],
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// An instance is completed once it has entered a final state
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Most recent history entry, if any action has fired
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn is_in_state(&self, state: &StateId) -> bool {
        &self.current_state_id == state
    }
}
