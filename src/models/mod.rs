// Core domain models for the workflow engine
// These are the generic, language-agnostic data structures

//! # Domain Models Module
//!
//! Pure data for the state machine model. Nothing in here performs I/O or
//! enforces transition rules; that lives in the `engine` module.
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statements at the bottom let callers write
//! `use fsm_workflow::models::State` instead of `models::state::State`.

// StateId, ActionId and State
pub mod state;

// Action - directed transition rules between states
pub mod action;

// WorkflowDefinition - the complete, immutable schema
pub mod workflow;

// WorkflowInstance and HistoryEntry - live execution state
pub mod instance;

pub use action::Action;
pub use instance::{HistoryEntry, WorkflowInstance};
pub use state::{ActionId, State, StateId};
pub use workflow::WorkflowDefinition;
