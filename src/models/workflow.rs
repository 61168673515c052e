// Workflow definitions - complete state machine schemas

//! # Workflow Definitions
//!
//! A `WorkflowDefinition` is the static schema of a workflow:
//! - All states an instance can be in
//! - All actions that move instances between states
//! - Which state is initial and which states are final
//!
//! Definitions are immutable once stored. There is no update path, so every
//! instance created from a definition sees the same graph for its whole life.
//!
//! ## Rust Learning Notes:
//!
//! This file demonstrates:
//! - Iterator chaining (`iter().find()`, `filter().collect()`)
//! - Returning borrowed data (`Option<&State>`) instead of cloning
//! - `chrono` timestamps and `uuid` identifiers in serde structs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::Action;
use super::state::{ActionId, State, StateId};

/// Generic workflow definition - completely domain-agnostic
///
/// ## Examples:
///
/// **Document Review Workflow**:
/// - states: draft (initial), review, approved (final), rejected (final)
/// - actions: submit, approve, reject
///
/// **Order Processing**:
/// - states: cart (initial), paid, shipped, delivered (final)
/// - actions: pay, ship, deliver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Generated identifier (UUID v4), immutable after creation
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    /// All states; insertion order carries no meaning
    pub states: Vec<State>,

    /// All actions; insertion order carries no meaning
    pub actions: Vec<Action>,
}

impl WorkflowDefinition {
    /// Create a new definition with a fresh identifier and creation timestamp
    ///
    /// The definition is **not** validated here. Run it through
    /// `engine::validator::validate` before storing it.
    pub fn new<N: Into<String>>(name: N, states: Vec<State>, actions: Vec<Action>) -> Self {
        WorkflowDefinition {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            states,
            actions,
        }
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up a state by identifier
    pub fn state(&self, id: &StateId) -> Option<&State> {
        self.states.iter().find(|s| &s.id == id)
    }

    /// Look up an action by identifier
    pub fn action(&self, id: &ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| &a.id == id)
    }

    /// The state new instances start in
    ///
    /// Returns `None` when no state is flagged initial. A validated definition
    /// always has exactly one.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_initial)
    }

    /// All absorbing states
    pub fn final_states(&self) -> Vec<&State> {
        self.states.iter().filter(|s| s.is_final).collect()
    }

    /// Actions that list `from` among their source states, enabled or not
    ///
    /// ## Rust Learning Notes:
    ///
    /// ### Filter and Collect Pattern
    /// Returns `Vec<&Action>` - references into the definition, no cloning.
    pub fn outgoing_actions(&self, from: &StateId) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.can_fire_from(from))
            .collect()
    }
}
