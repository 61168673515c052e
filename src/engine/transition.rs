// Transition engine - decides whether an action may fire on an instance

//! # Transition Engine
//!
//! Each instance is one run of a deterministic finite automaton:
//! - states = the definition's states
//! - alphabet = the definition's enabled actions
//! - transition function = `fromStates × action → toState`, restricted to
//!   the instance's current state
//! - final states are absorbing
//!
//! ## Precondition Order
//!
//! The first violated precondition is the reported reason:
//!
//! 1. The action exists in the definition
//! 2. The action is enabled
//! 3. The current state exists in the definition
//! 4. The current state is not final
//! 5. The current state is one of the action's `fromStates`
//! 6. The action's `toState` exists in the definition
//!
//! Checks 3 and 6 only fail when stored data is corrupt.
//!
//! The engine never touches storage and never mutates its input. On success
//! it returns a new instance for the caller to persist.

use chrono::{DateTime, Utc};

use crate::models::{Action, ActionId, HistoryEntry, WorkflowDefinition, WorkflowInstance};
use crate::{Result, WorkflowError};

/// Execute `action_id` on `instance`, timestamped with the current time
pub fn execute(
    instance: &WorkflowInstance,
    action_id: &ActionId,
    definition: &WorkflowDefinition,
) -> Result<WorkflowInstance> {
    execute_at(instance, action_id, definition, Utc::now())
}

/// Execute `action_id` on `instance` as of `now`
///
/// ## Rust Learning Notes:
///
/// ### ok_or_else for Option -> Result
/// `definition.action(id)` returns `Option<&Action>`. `ok_or_else` turns the
/// `None` case into an error and `?` returns it early.
pub fn execute_at(
    instance: &WorkflowInstance,
    action_id: &ActionId,
    definition: &WorkflowDefinition,
    now: DateTime<Utc>,
) -> Result<WorkflowInstance> {
    let action = definition.action(action_id).ok_or_else(|| {
        WorkflowError::validation(format!(
            "action '{}' not found in workflow '{}'",
            action_id, definition.id
        ))
    })?;

    if !action.enabled {
        return Err(WorkflowError::validation(format!(
            "action '{}' is disabled",
            action_id
        )));
    }

    let current = definition
        .state(&instance.current_state_id)
        .ok_or_else(|| {
            WorkflowError::validation(format!(
                "current state '{}' not found in workflow '{}'",
                instance.current_state_id, definition.id
            ))
        })?;

    if current.is_final {
        return Err(WorkflowError::validation(format!(
            "cannot act on a completed instance (state '{}' is final)",
            current.id
        )));
    }

    if !action.can_fire_from(&current.id) {
        return Err(WorkflowError::validation(format!(
            "action '{}' is not valid from current state '{}'",
            action_id, current.id
        )));
    }

    let target = definition.state(&action.to_state).ok_or_else(|| {
        WorkflowError::validation(format!(
            "target state '{}' not found in workflow '{}'",
            action.to_state, definition.id
        ))
    })?;

    let mut updated = instance.clone();
    updated.history.push(HistoryEntry {
        action_id: action.id.clone(),
        action_name: action.name.clone(),
        from_state_id: current.id.clone(),
        to_state_id: target.id.clone(),
        executed_at: now,
    });
    updated.current_state_id = target.id.clone();
    updated.updated_at = now;
    if target.is_final && updated.completed_at.is_none() {
        updated.completed_at = Some(now);
    }

    Ok(updated)
}

/// Enabled actions that could fire from the instance's current state
///
/// Empty when the current state is final or missing from the definition.
pub fn available_actions<'a>(
    instance: &WorkflowInstance,
    definition: &'a WorkflowDefinition,
) -> Vec<&'a Action> {
    match definition.state(&instance.current_state_id) {
        Some(state) if !state.is_final => definition
            .outgoing_actions(&state.id)
            .into_iter()
            .filter(|a| a.enabled && definition.state(&a.to_state).is_some())
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{State, StateId};

    fn document_review() -> WorkflowDefinition {
        WorkflowDefinition::new(
            "Document Review",
            vec![
                State::new("draft", "Draft").initial(),
                State::new("review", "Review"),
                State::new("approved", "Approved").final_state(),
            ],
            vec![
                Action::new("submit", "Submit", vec!["draft"], "review"),
                Action::new("approve", "Approve", vec!["review"], "approved"),
                Action::new("archive", "Archive", vec!["draft"], "approved").disabled(),
                Action::new("orphan", "Orphan", Vec::<&str>::new(), "review"),
            ],
        )
    }

    fn new_instance(definition: &WorkflowDefinition) -> WorkflowInstance {
        WorkflowInstance::new(&definition.id, StateId::from("draft"))
    }

    fn reason(result: Result<WorkflowInstance>) -> String {
        match result {
            Err(WorkflowError::Validation(reason)) => reason,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_review_scenario() {
        let definition = document_review();
        let instance = new_instance(&definition);

        let instance = execute(&instance, &ActionId::from("submit"), &definition).unwrap();
        assert_eq!(instance.current_state_id.as_str(), "review");
        assert_eq!(instance.history.len(), 1);
        assert!(!instance.is_completed());

        let instance = execute(&instance, &ActionId::from("approve"), &definition).unwrap();
        assert_eq!(instance.current_state_id.as_str(), "approved");
        assert_eq!(instance.history.len(), 2);
        assert!(instance.is_completed());

        let err = reason(execute(&instance, &ActionId::from("submit"), &definition));
        assert!(err.contains("completed instance"));
    }

    #[test]
    fn test_history_records_each_step() {
        let definition = document_review();
        let start = new_instance(&definition);
        let now = Utc::now();

        let after = execute_at(&start, &ActionId::from("submit"), &definition, now).unwrap();
        let entry = after.last_entry().unwrap();

        assert_eq!(entry.action_id.as_str(), "submit");
        assert_eq!(entry.action_name, "Submit");
        assert_eq!(entry.from_state_id, start.current_state_id);
        assert_eq!(entry.to_state_id.as_str(), "review");
        assert_eq!(entry.executed_at, now);
        assert_eq!(after.updated_at, now);
        assert_eq!(after.created_at, start.created_at);
    }

    #[test]
    fn test_input_instance_untouched() {
        let definition = document_review();
        let instance = new_instance(&definition);
        let snapshot = instance.clone();

        let _ = execute(&instance, &ActionId::from("submit"), &definition).unwrap();
        let _ = execute(&instance, &ActionId::from("approve"), &definition);

        assert_eq!(instance, snapshot);
    }

    #[test]
    fn test_unknown_action() {
        let definition = document_review();
        let err = reason(execute(
            &new_instance(&definition),
            &ActionId::from("publish"),
            &definition,
        ));
        assert!(err.contains("action 'publish' not found"));
    }

    #[test]
    fn test_disabled_action() {
        let definition = document_review();
        let err = reason(execute(
            &new_instance(&definition),
            &ActionId::from("archive"),
            &definition,
        ));
        assert_eq!(err, "action 'archive' is disabled");
    }

    #[test]
    fn test_wrong_source_state() {
        let definition = document_review();
        let err = reason(execute(
            &new_instance(&definition),
            &ActionId::from("approve"),
            &definition,
        ));
        assert_eq!(err, "action 'approve' is not valid from current state 'draft'");
    }

    #[test]
    fn test_empty_from_states_never_fires() {
        let definition = document_review();
        let err = reason(execute(
            &new_instance(&definition),
            &ActionId::from("orphan"),
            &definition,
        ));
        assert!(err.contains("not valid from current state"));
    }

    #[test]
    fn test_final_state_checked_before_source_state() {
        let definition = document_review();
        let mut instance = new_instance(&definition);
        instance.current_state_id = StateId::from("approved");

        // approve lists "review", not "approved"; the final-state rule wins
        let err = reason(execute(&instance, &ActionId::from("approve"), &definition));
        assert!(err.contains("completed instance"));
    }

    #[test]
    fn test_disabled_checked_before_state() {
        let definition = document_review();
        let mut instance = new_instance(&definition);
        instance.current_state_id = StateId::from("approved");

        let err = reason(execute(&instance, &ActionId::from("archive"), &definition));
        assert!(err.contains("disabled"));
    }

    #[test]
    fn test_corrupt_current_state() {
        let definition = document_review();
        let mut instance = new_instance(&definition);
        instance.current_state_id = StateId::from("vanished");

        let err = reason(execute(&instance, &ActionId::from("submit"), &definition));
        assert!(err.contains("current state 'vanished' not found"));
    }

    #[test]
    fn test_corrupt_target_state() {
        let mut definition = document_review();
        definition.actions[0].to_state = StateId::from("vanished");

        let err = reason(execute(
            &new_instance(&definition),
            &ActionId::from("submit"),
            &definition,
        ));
        assert!(err.contains("target state 'vanished' not found"));
    }

    #[test]
    fn test_available_actions() {
        let definition = document_review();
        let instance = new_instance(&definition);

        let ids: Vec<&str> = available_actions(&instance, &definition)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        // archive is disabled, orphan has no source states
        assert_eq!(ids, vec!["submit"]);

        let mut done = instance.clone();
        done.current_state_id = StateId::from("approved");
        assert!(available_actions(&done, &definition).is_empty());
    }
}
