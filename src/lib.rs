// FSM Workflow - Rust Edition
// A finite-state-machine workflow engine exposed over HTTP

//! # FSM Workflow Library
//!
//! Clients register a workflow definition (named states plus named actions
//! that move between them), create instances of that definition and drive
//! them forward by invoking actions.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`WorkflowDefinition`]: states and actions of one workflow, immutable once stored
//! - [`WorkflowInstance`]: a live run with a current state and history
//! - [`State`] / [`Action`]: the nodes and edges of the state machine
//! - [`HistoryEntry`]: audit record of one executed action
//!
//! ### Engine
//! - [`engine::validator`]: structural checks run when a definition is created
//! - [`engine::transition`]: decides whether an action may fire and computes the
//!   resulting instance. Pure and synchronous.
//! - [`WorkflowStorage`]: async persistence trait with in-memory and JSON file backends
//! - [`WorkflowService`]: sequences validator, engine and storage calls
//!
//! ### HTTP API
//! [`api`] maps every service operation 1:1 onto an axum route.
//!
//! **Usage Example:**
//! ```rust
//! use fsm_workflow::{engine::transition, Action, State, StateId, WorkflowDefinition, WorkflowInstance};
//!
//! let definition = WorkflowDefinition::new(
//!     "Review",
//!     vec![
//!         State::new("draft", "Draft").initial(),
//!         State::new("approved", "Approved").final_state(),
//!     ],
//!     vec![Action::new("approve", "Approve", vec!["draft"], "approved")],
//! );
//! let instance = WorkflowInstance::new(&definition.id, StateId::from("draft"));
//!
//! let updated = transition::execute(&instance, &"approve".into(), &definition).unwrap();
//! assert!(updated.is_completed());
//! ```

pub mod models;

pub mod engine;

pub mod api;

pub mod config;

pub use models::{
    Action,             // Directed transition rule
    ActionId,           // Identifies actions
    HistoryEntry,       // Records one executed transition
    State,              // One node of the state machine
    StateId,            // Identifies states
    WorkflowDefinition, // Defines the workflow structure
    WorkflowInstance,   // The running workflow
};

pub use engine::{
    CreateDefinitionRequest, InMemoryStorage, JsonFileStorage, WorkflowService, WorkflowStorage,
};

pub use api::{WorkflowApiServer, WorkflowApiServerBuilder};

pub use config::ServerConfig;

use thiserror::Error;

/// Error types for workflow operations
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements `std::error::Error`
/// - `#[error("...")]` provides the `Display` message
/// - `#[from]` enables `?` conversion from the wrapped error type
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Malformed definition, unknown reference, missing entity, disabled
    /// action or an action fired from the wrong state
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another writer changed the instance between read and write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage backend failures (file I/O and the like)
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Shorthand used throughout the engine
    pub fn validation<S: Into<String>>(reason: S) -> Self {
        WorkflowError::Validation(reason.into())
    }

    /// Stable machine-readable code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "VALIDATION_ERROR",
            WorkflowError::Conflict(_) => "CONFLICT",
            WorkflowError::Storage(_) => "STORAGE_ERROR",
            WorkflowError::Serialization(_) => "SERIALIZATION_ERROR",
            WorkflowError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The human-readable reason without the variant prefix
    pub fn reason(&self) -> String {
        match self {
            WorkflowError::Validation(reason)
            | WorkflowError::Conflict(reason)
            | WorkflowError::Internal(reason) => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for WorkflowError {
    fn from(err: std::io::Error) -> Self {
        WorkflowError::Storage(anyhow::Error::new(err))
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_reasons() {
        let err = WorkflowError::validation("action 'x' is disabled");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.reason(), "action 'x' is disabled");
        assert_eq!(err.to_string(), "Validation failed: action 'x' is disabled");

        let err = WorkflowError::Conflict("instance changed".into());
        assert_eq!(err.error_code(), "CONFLICT");

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: WorkflowError = io.into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.reason().contains("disk full"));
    }
}
