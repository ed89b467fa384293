//! Snapshot model of the focused accessible control
//!
//! The host sends a read-only snapshot (role plus state flags) with
//! every typed-character event. The daemon never walks the host's
//! accessibility tree itself.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Role classification of an accessible control
///
/// Only the roles the editability rule cares about need to be distinct;
/// anything the host reports that we do not recognize collapses into
/// `Unknown`, which classifies as not editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlRole {
    EditableText,
    Document,
    Terminal,
    Button,
    CheckBox,
    ComboBox,
    List,
    ListItem,
    Menu,
    MenuItem,
    StaticText,
    Link,
    Window,
    #[serde(other)]
    Unknown,
}

bitflags! {
    /// State flags reported for an accessible control
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ControlStates: u32 {
        const EDITABLE  = 1 << 0;
        const READONLY  = 1 << 1;
        const FOCUSED   = 1 << 2;
        const PROTECTED = 1 << 3;
        const MULTILINE = 1 << 4;
    }
}

/// Read-only snapshot of the currently focused control, borrowed for
/// the duration of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub role: ControlRole,
    #[serde(default)]
    pub states: ControlStates,
    /// Accessible name, if the host reports one (never inspected by
    /// the echo rule, carried for logging and status displays)
    #[serde(default)]
    pub name: Option<String>,
}

impl ControlSnapshot {
    pub fn new(role: ControlRole) -> Self {
        Self {
            role,
            states: ControlStates::empty(),
            name: None,
        }
    }

    pub fn with_states(role: ControlRole, states: ControlStates) -> Self {
        Self {
            role,
            states,
            name: None,
        }
    }

    /// Whether the control accepts typed text
    ///
    /// True iff the role is editable-text, document, or terminal, or
    /// the EDITABLE state is set, and the READONLY state is not.
    /// Total over every role/state combination; unrecognized input
    /// classifies as not editable.
    pub fn is_editable(&self) -> bool {
        let editable_role = matches!(
            self.role,
            ControlRole::EditableText | ControlRole::Document | ControlRole::Terminal
        );
        (editable_role || self.states.contains(ControlStates::EDITABLE))
            && !self.states.contains(ControlStates::READONLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_roles() {
        assert!(ControlSnapshot::new(ControlRole::EditableText).is_editable());
        assert!(ControlSnapshot::new(ControlRole::Document).is_editable());
        assert!(ControlSnapshot::new(ControlRole::Terminal).is_editable());
    }

    #[test]
    fn test_non_editable_roles() {
        assert!(!ControlSnapshot::new(ControlRole::Button).is_editable());
        assert!(!ControlSnapshot::new(ControlRole::Menu).is_editable());
        assert!(!ControlSnapshot::new(ControlRole::StaticText).is_editable());
        assert!(!ControlSnapshot::new(ControlRole::Unknown).is_editable());
    }

    #[test]
    fn test_editable_state_makes_any_role_editable() {
        let list = ControlSnapshot::with_states(ControlRole::List, ControlStates::EDITABLE);
        assert!(list.is_editable());

        let unknown = ControlSnapshot::with_states(ControlRole::Unknown, ControlStates::EDITABLE);
        assert!(unknown.is_editable());
    }

    #[test]
    fn test_readonly_wins_over_everything() {
        let doc = ControlSnapshot::with_states(ControlRole::Document, ControlStates::READONLY);
        assert!(!doc.is_editable());

        let text = ControlSnapshot::with_states(
            ControlRole::EditableText,
            ControlStates::EDITABLE | ControlStates::READONLY,
        );
        assert!(!text.is_editable());
    }

    #[test]
    fn test_unrelated_states_do_not_affect_classification() {
        let terminal =
            ControlSnapshot::with_states(ControlRole::Terminal, ControlStates::FOCUSED);
        assert!(terminal.is_editable());

        let button = ControlSnapshot::with_states(
            ControlRole::Button,
            ControlStates::FOCUSED | ControlStates::PROTECTED,
        );
        assert!(!button.is_editable());
    }

    #[test]
    fn test_unknown_role_deserializes_from_anything() {
        let snapshot: ControlSnapshot =
            serde_json::from_str(r#"{"role":"slider"}"#).unwrap();
        assert_eq!(snapshot.role, ControlRole::Unknown);
        assert!(!snapshot.is_editable());
    }
}
