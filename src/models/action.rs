// Action definitions - how instances move between states

//! # Action Definitions
//!
//! An `Action` is a named, directed transition rule:
//! - Which states an instance may be in for the action to fire (`fromStates`)
//! - Which state the instance moves to (`toState`)
//! - Whether the action is currently `enabled`
//!
//! `fromStates` has set semantics. It may be empty, which makes the action
//! legal in a definition but impossible to fire.

use super::state::{default_enabled, ActionId, StateId};
use serde::{Deserialize, Serialize};

/// Generic action definition
///
/// ## Examples:
///
/// **Document Review**:
/// - id: "submit", from_states: ["draft"], to_state: "review"
/// - id: "approve", from_states: ["review"], to_state: "approved"
///
/// **Order Processing**:
/// - id: "cancel", from_states: ["cart", "paid"], to_state: "cancelled"
///
/// ## Rust Learning Notes:
///
/// ### Derive Macros
/// - `Debug`: Enables `{:?}` formatting
/// - `Clone`: Allows `action.clone()`
/// - `Serialize, Deserialize`: JSON conversion via serde
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Unique identifier within the definition
    pub id: ActionId,

    /// Display name, copied into history entries when the action fires
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// States this action may fire from
    #[serde(default)]
    pub from_states: Vec<StateId>,

    /// State the instance moves to
    pub to_state: StateId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Action {
    /// Create a new enabled action
    ///
    /// ## Rust Learning Notes:
    ///
    /// ### Into<T> Trait Bounds
    /// Callers can pass string literals, `String`s or the id newtypes:
    /// `Action::new("submit", "Submit", vec!["draft"], "review")`
    pub fn new<I, N, F, T>(id: I, name: N, from_states: Vec<F>, to_state: T) -> Self
    where
        I: Into<ActionId>,
        N: Into<String>,
        F: Into<StateId>,
        T: Into<StateId>,
    {
        Action {
            id: id.into(),
            name: name.into(),
            enabled: true,
            from_states: from_states.into_iter().map(|s| s.into()).collect(),
            to_state: to_state.into(),
            description: None,
        }
    }

    /// Return a disabled copy of this action
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this action lists the given state as a source
    pub fn can_fire_from(&self, state: &StateId) -> bool {
        self.from_states.contains(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_definition() {
        let action = Action::new("submit", "Submit", vec!["draft"], "review");

        assert_eq!(action.id.as_str(), "submit");
        assert_eq!(action.name, "Submit");
        assert!(action.enabled);
        assert_eq!(action.from_states, vec![StateId::from("draft")]);
        assert_eq!(action.to_state.as_str(), "review");
    }

    #[test]
    fn test_can_fire_from() {
        let action = Action::new("approve", "Approve", vec!["review", "editing"], "approved");

        assert!(action.can_fire_from(&StateId::from("review")));
        assert!(action.can_fire_from(&StateId::from("editing")));
        assert!(!action.can_fire_from(&StateId::from("draft")));
    }

    #[test]
    fn test_empty_from_states_never_fires() {
        let action: Action = serde_json::from_value(serde_json::json!({
            "id": "orphan",
            "name": "Orphan",
            "toState": "review"
        }))
        .unwrap();

        assert!(action.from_states.is_empty());
        assert!(action.enabled);
        assert!(!action.can_fire_from(&StateId::from("review")));
    }

    #[test]
    fn test_action_wire_format() {
        let action = Action::new("submit", "Submit", vec!["draft"], "review").disabled();
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json["fromStates"], serde_json::json!(["draft"]));
        assert_eq!(json["toState"], "review");
        assert_eq!(json["enabled"], false);
    }
}
