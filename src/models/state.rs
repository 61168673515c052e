// Workflow states - the nodes of the state machine
//
// ## Workflow Model Overview
//
// A workflow is a **deterministic finite automaton**:
// **Instances move between States via Actions**
//
// **States (StateId)**: where an instance currently is.
// - Example: "draft", "review", "approved"
// - Exactly one state is the initial state of a definition
// - Final states are absorbing: nothing fires once an instance enters one
//
// **Actions (ActionId)**: named rules that move an instance to a target state.
// - Example: "submit", "approve", "reject"
// - An action lists the source states it may fire from
//
// ### Example Workflow:
//
// ```
//     [draft] --submit--> [review] --approve--> [approved]
//        ^                   |
//        |                   |reject
//        +---<--revise--<----+
// ```
//
// StateId and ActionId are distinct string newtypes.

use serde::{Deserialize, Serialize};

/// Identifier of a state, unique within one workflow definition
///
/// ```rust
/// # use fsm_workflow::StateId;
/// let state = StateId::from("draft");
/// assert_eq!(state.as_str(), "draft");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub String);

impl StateId {
    /// Get the state identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a new state identifier from any string-like input
    pub fn new<S: Into<String>>(name: S) -> Self {
        StateId(name.into())
    }

    /// True when the identifier is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for StateId {
    fn from(s: &str) -> Self {
        StateId(s.to_string())
    }
}

impl From<String> for StateId {
    fn from(s: String) -> Self {
        StateId(s)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an action, unique within one workflow definition
///
/// ```rust
/// # use fsm_workflow::ActionId;
/// let a = ActionId::new("approve");
/// let b = ActionId::from("approve");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    /// Get the action identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create a new action identifier from any string-like input
    pub fn new<S: Into<String>>(name: S) -> Self {
        ActionId(name.into())
    }

    /// True when the identifier is empty or only whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId(s.to_string())
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        ActionId(s)
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn default_enabled() -> bool {
    true
}

/// **Workflow State** - one node of a workflow definition
///
/// ## Examples by Domain:
///
/// **Document Workflow**: "draft" (initial), "review", "approved" (final)
/// **Order Processing**: "cart" (initial), "paid", "shipped", "delivered" (final)
///
/// ## Rust Learning Notes:
///
/// ### Serde Attributes
/// - `rename_all = "camelCase"` turns `is_initial` into `isInitial` on the wire
/// - `default` lets clients omit the flags; `enabled` defaults to `true`
///   through a small function because `bool::default()` is `false`
/// - `skip_serializing_if` drops the description when it is `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// Unique identifier within the definition
    pub id: StateId,

    /// Human-readable display name
    pub name: String,

    /// New instances start here. Exactly one state per definition sets it.
    #[serde(default)]
    pub is_initial: bool,

    /// Absorbing state; reaching it completes the instance
    #[serde(default)]
    pub is_final: bool,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl State {
    /// Create an enabled, non-initial, non-final state
    pub fn new<I: Into<StateId>, N: Into<String>>(id: I, name: N) -> Self {
        State {
            id: id.into(),
            name: name.into(),
            is_initial: false,
            is_final: false,
            enabled: true,
            description: None,
        }
    }

    /// Mark this state as the initial state
    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    /// Mark this state as a final (absorbing) state
    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_id_creation() {
        let state1 = StateId::from("draft");
        let state2 = StateId::from("draft".to_string());
        let state3 = StateId("draft".to_string());
        let state4 = StateId::new("draft");

        assert_eq!(state1, state2);
        assert_eq!(state2, state3);
        assert_eq!(state3, state4);
        assert_eq!(state1.to_string(), "draft");
    }

    #[test]
    fn test_blank_identifiers() {
        assert!(StateId::from("").is_blank());
        assert!(StateId::from("   ").is_blank());
        assert!(!StateId::from("draft").is_blank());
        assert!(ActionId::from("").is_blank());
        assert!(!ActionId::from("submit").is_blank());
    }

    #[test]
    fn test_state_wire_format() {
        let state = State::new("draft", "Draft").initial();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["id"], "draft");
        assert_eq!(json["isInitial"], true);
        assert_eq!(json["isFinal"], false);
        assert_eq!(json["enabled"], true);
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_state_flags_default_when_omitted() {
        let state: State = serde_json::from_value(serde_json::json!({
            "id": "review",
            "name": "Review"
        }))
        .unwrap();

        assert!(!state.is_initial);
        assert!(!state.is_final);
        assert!(state.enabled);
        assert_eq!(state.description, None);
    }
}
