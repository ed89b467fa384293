//! Events emitted when echo settings change
//!
//! Broadcast to IPC subscribers (so the host can speak the status
//! message) and to the log relay in main.

use serde::{Deserialize, Serialize};

use crate::echo::{EchoMode, Feature};

/// Events emitted by the echo controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EchoEvent {
    /// A feature's mode was cycled by user command
    ModeCycled {
        feature: Feature,
        mode: EchoMode,
        /// Status phrasing for the host to announce
        message: String,
    },

    /// Persisted settings were re-read (SIGHUP)
    SettingsReloaded {
        characters: EchoMode,
        words: EchoMode,
    },
}

impl std::fmt::Display for EchoEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EchoEvent::ModeCycled { feature, mode, .. } => {
                write!(f, "MODE_CYCLED ({feature} -> {mode})")
            }
            EchoEvent::SettingsReloaded { characters, words } => {
                write!(f, "SETTINGS_RELOADED (characters={characters}, words={words})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = EchoEvent::ModeCycled {
            feature: Feature::Characters,
            mode: EchoMode::Off,
            message: "speak typed characters off".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("mode_cycled"));
        assert!(json.contains("speak typed characters off"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"settings_reloaded","characters":"on","words":"editable_only"}"#;
        let event: EchoEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            EchoEvent::SettingsReloaded {
                characters: EchoMode::On,
                words: EchoMode::EditableOnly,
            }
        ));
    }
}
