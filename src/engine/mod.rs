// Workflow Engine
// Validation, transition logic, persistence and orchestration

//! # Engine Module
//!
//! The layer between the domain models and the HTTP API.
//!
//! ## Architecture Overview
//!
//! ```text
//! api (axum handlers)
//!   ↓
//! service::WorkflowService      ← sequences the steps, serializes per instance
//!   ↓               ↓
//! validator     transition      ← pure, synchronous, no I/O
//!   ↓
//! storage::WorkflowStorage      ← InMemoryStorage / JsonFileStorage
//! ```

/// Structural checks for new definitions
pub mod validator;

/// Transition legality and instance updates
pub mod transition;

/// Storage trait and in-memory implementation
pub mod storage;

/// JSON file storage backend
pub mod json_storage;

/// Orchestration of validator, engine and storage
pub mod service;

pub use json_storage::JsonFileStorage;
pub use service::{CreateDefinitionRequest, WorkflowService};
pub use storage::{InMemoryStorage, WorkflowStorage};
