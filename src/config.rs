//! Configuration loading and the persisted settings store

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::echo::{EchoConfig, EchoMode, Feature, InvalidModeValue};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Path to the persisted echo settings file
    pub settings_path: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("typed-echo");

        let socket_path = match std::env::var_os("TYPED_ECHO_SOCKET") {
            Some(path) => PathBuf::from(path),
            None => data_dir.join("daemon.sock"),
        };
        let settings_path = match std::env::var_os("TYPED_ECHO_SETTINGS") {
            Some(path) => PathBuf::from(path),
            None => data_dir.join("settings.json"),
        };

        Ok(Self {
            socket_path,
            data_dir,
            settings_path,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

/// Errors from the persisted settings store
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {key}: {source}")]
    InvalidMode {
        key: &'static str,
        #[source]
        source: InvalidModeValue,
    },
}

/// On-disk form of the echo settings
///
/// Modes are stored as the integers 0 (off), 1 (on), 2 (editable
/// only). A missing key means the user never changed that mode.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    speak_typed_characters: Option<i64>,
    #[serde(default)]
    speak_typed_words: Option<i64>,
}

/// File-backed store for the two persisted tri-state modes
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted modes, substituting the default
    /// (editable-only) for any absent value
    ///
    /// An out-of-range integer is refused with `InvalidMode` rather
    /// than mapped to a guess.
    pub fn load(&self) -> Result<EchoConfig, SettingsError> {
        if !self.path.exists() {
            return Ok(EchoConfig::default());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let stored: StoredSettings = serde_json::from_str(&raw)?;

        Ok(EchoConfig {
            characters: Self::mode_from(stored.speak_typed_characters, Feature::Characters)?,
            words: Self::mode_from(stored.speak_typed_words, Feature::Words)?,
        })
    }

    /// Write both modes to disk
    pub fn save(&self, config: &EchoConfig) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let stored = StoredSettings {
            speak_typed_characters: Some(config.characters.as_setting()),
            speak_typed_words: Some(config.words.as_setting()),
        };
        let raw = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, raw)?;

        Ok(())
    }

    fn mode_from(value: Option<i64>, feature: Feature) -> Result<EchoMode, SettingsError> {
        match value {
            None => Ok(EchoMode::default()),
            Some(v) => EchoMode::try_from(v).map_err(|source| SettingsError::InvalidMode {
                key: feature.settings_key(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config.settings_path.to_string_lossy().contains("typed-echo"));
    }

    #[test]
    fn test_load_absent_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let config = store.load().unwrap();
        assert_eq!(config.characters, EchoMode::EditableOnly);
        assert_eq!(config.words, EchoMode::EditableOnly);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let config = EchoConfig {
            characters: EchoMode::Off,
            words: EchoMode::On,
        };
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.characters, EchoMode::Off);
        assert_eq!(loaded.words, EchoMode::On);
    }

    #[test]
    fn test_missing_key_defaults_to_editable_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"speak_typed_characters": 0}"#).unwrap();

        let loaded = SettingsStore::new(&path).load().unwrap();
        assert_eq!(loaded.characters, EchoMode::Off);
        assert_eq!(loaded.words, EchoMode::EditableOnly);
    }

    #[test]
    fn test_out_of_range_value_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"speak_typed_characters": 7}"#).unwrap();

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidMode {
                key: "speak_typed_characters",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SettingsStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
