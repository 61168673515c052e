// Definition validation - structural checks before a workflow is stored

//! # Definition Validator
//!
//! Runs once, when a definition is created. Every check runs on every call,
//! and each violation becomes its own reason:
//!
//! 1. Name non-empty (after trimming)
//! 2. At least one state
//! 3. State ids pairwise distinct
//! 4. Action ids pairwise distinct
//! 5. Exactly one initial state
//! 6. Every `toState` non-empty and naming an existing state
//! 7. Every `fromStates` entry naming an existing state
//! 8. State ids and names non-empty, action ids non-empty
//!
//! Reachability and cycle analysis are out of scope. An action with an empty
//! `fromStates` list is accepted; it simply can never fire.
//!
//! ## Rust Learning Notes:
//!
//! ### HashSet for Efficient Lookup
//! State ids are collected into a `HashSet<&StateId>` once, so each reference
//! check is O(1) instead of a linear scan.

use std::collections::HashSet;

use crate::models::WorkflowDefinition;
use crate::{Result, WorkflowError};

/// Collect every structural violation in `definition`, in check order
///
/// An empty vector means the definition is valid.
pub fn violations(definition: &WorkflowDefinition) -> Vec<String> {
    let mut problems = Vec::new();

    if definition.name.trim().is_empty() {
        problems.push("workflow name must not be empty".to_string());
    }

    if definition.states.is_empty() {
        problems.push("workflow must define at least one state".to_string());
    }

    let mut state_ids = HashSet::new();
    for state in &definition.states {
        if state.id.is_blank() {
            problems.push("state id must not be empty".to_string());
        }
        if state.name.trim().is_empty() {
            problems.push(format!("state '{}' must have a non-empty name", state.id));
        }
        if !state_ids.insert(&state.id) {
            problems.push(format!("duplicate state id '{}'", state.id));
        }
    }

    let mut action_ids = HashSet::new();
    for action in &definition.actions {
        if action.id.is_blank() {
            problems.push("action id must not be empty".to_string());
        }
        if !action_ids.insert(&action.id) {
            problems.push(format!("duplicate action id '{}'", action.id));
        }
    }

    let initial_count = definition.states.iter().filter(|s| s.is_initial).count();
    if initial_count != 1 {
        problems.push(format!(
            "workflow must have exactly one initial state, found {}",
            initial_count
        ));
    }

    for action in &definition.actions {
        if action.to_state.is_blank() {
            problems.push(format!("action '{}' has an empty toState", action.id));
        } else if !state_ids.contains(&action.to_state) {
            problems.push(format!(
                "action '{}' targets unknown state '{}'",
                action.id, action.to_state
            ));
        }

        for from in &action.from_states {
            if !state_ids.contains(from) {
                problems.push(format!(
                    "action '{}' references unknown source state '{}'",
                    action.id, from
                ));
            }
        }
    }

    problems
}

/// Validate a proposed definition
///
/// Fails with [`WorkflowError::Validation`] listing every violation found,
/// joined with `"; "`.
pub fn validate(definition: &WorkflowDefinition) -> Result<()> {
    let problems = violations(definition);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(WorkflowError::Validation(problems.join("; ")))
    }
}
