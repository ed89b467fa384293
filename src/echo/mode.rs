//! Tri-state echo modes and the features they govern
//!
//! Each echo feature (typed characters, typed words) carries an
//! independent mode cycling Off -> On -> EditableOnly -> Off.

use serde::{Deserialize, Serialize};

/// The three possible modes of an echo feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoMode {
    /// Never echo
    Off,
    /// Always echo, regardless of focus
    On,
    /// Echo only while focus is on an editable control
    EditableOnly,
}

impl Default for EchoMode {
    fn default() -> Self {
        Self::EditableOnly
    }
}

impl EchoMode {
    /// Cyclic successor: Off -> On -> EditableOnly -> Off
    pub fn next(self) -> Self {
        match self {
            EchoMode::Off => EchoMode::On,
            EchoMode::On => EchoMode::EditableOnly,
            EchoMode::EditableOnly => EchoMode::Off,
        }
    }

    /// Integer form used in the persisted settings file
    pub fn as_setting(self) -> i64 {
        match self {
            EchoMode::Off => 0,
            EchoMode::On => 1,
            EchoMode::EditableOnly => 2,
        }
    }
}

/// A persisted mode value outside {0, 1, 2}
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid echo mode value {0}, expected 0, 1, or 2")]
pub struct InvalidModeValue(pub i64);

impl TryFrom<i64> for EchoMode {
    type Error = InvalidModeValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EchoMode::Off),
            1 => Ok(EchoMode::On),
            2 => Ok(EchoMode::EditableOnly),
            other => Err(InvalidModeValue(other)),
        }
    }
}

impl std::fmt::Display for EchoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EchoMode::Off => write!(f, "off"),
            EchoMode::On => write!(f, "on"),
            EchoMode::EditableOnly => write!(f, "editable-only"),
        }
    }
}

/// The two echo features the daemon controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Characters,
    Words,
}

impl Feature {
    /// Both features, in the order flags are derived
    pub const ALL: [Feature; 2] = [Feature::Characters, Feature::Words];

    /// Key of this feature's mode in the persisted settings file
    pub fn settings_key(self) -> &'static str {
        match self {
            Feature::Characters => "speak_typed_characters",
            Feature::Words => "speak_typed_words",
        }
    }

    /// The fixed status phrasing spoken after a mode cycle
    pub fn status_message(self, mode: EchoMode) -> &'static str {
        match (self, mode) {
            (Feature::Characters, EchoMode::Off) => "speak typed characters off",
            (Feature::Characters, EchoMode::On) => "speak typed characters on",
            (Feature::Characters, EchoMode::EditableOnly) => {
                "speak typed characters in editable controls only"
            }
            (Feature::Words, EchoMode::Off) => "speak typed words off",
            (Feature::Words, EchoMode::On) => "speak typed words on",
            (Feature::Words, EchoMode::EditableOnly) => {
                "speak typed words in editable controls only"
            }
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feature::Characters => write!(f, "characters"),
            Feature::Words => write!(f, "words"),
        }
    }
}
