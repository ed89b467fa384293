//! Echo controller: derives the live echo flags and cycles modes
//!
//! Owns the two tri-state modes and the pair of derived booleans the
//! host speech layer consumes. Flags are re-derived on every typed
//! character; modes change only through `cycle_mode` (or a settings
//! reload).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::{SettingsError, SettingsStore};
use crate::events::EchoEvent;
use crate::focus::ControlSnapshot;

use super::mode::{EchoMode, Feature};

/// The two persisted tri-state modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoConfig {
    pub characters: EchoMode,
    pub words: EchoMode,
}

impl EchoConfig {
    pub fn mode(&self, feature: Feature) -> EchoMode {
        match feature {
            Feature::Characters => self.characters,
            Feature::Words => self.words,
        }
    }

    pub fn set_mode(&mut self, feature: Feature, mode: EchoMode) {
        match feature {
            Feature::Characters => self.characters = mode,
            Feature::Words => self.words = mode,
        }
    }
}

/// The live boolean echo settings consumed by the speech layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoFlags {
    pub characters: bool,
    pub words: bool,
}

impl EchoFlags {
    fn set(&mut self, feature: Feature, value: bool) {
        match feature {
            Feature::Characters => self.characters = value,
            Feature::Words => self.words = value,
        }
    }
}

/// Result of a mode cycle, carrying the status phrasing to announce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub feature: Feature,
    pub mode: EchoMode,
    pub message: &'static str,
}

/// Controller owning the modes, the editability-driven derivation,
/// and the cycle commands
pub struct EchoController {
    config: EchoConfig,
    flags: EchoFlags,
    store: SettingsStore,
    event_tx: broadcast::Sender<EchoEvent>,
}

impl EchoController {
    /// Create a controller from the persisted settings
    ///
    /// Absent settings default to editable-only; an out-of-range
    /// persisted value is refused here rather than interpreted.
    pub fn new(
        store: SettingsStore,
        event_tx: broadcast::Sender<EchoEvent>,
    ) -> Result<Self, SettingsError> {
        let config = store.load()?;
        let mut controller = Self {
            config,
            flags: EchoFlags::default(),
            store,
            event_tx,
        };
        for feature in Feature::ALL {
            controller.apply_forced_flag(feature, controller.config.mode(feature));
        }

        info!(
            characters = %controller.config.characters,
            words = %controller.config.words,
            "echo controller started"
        );
        Ok(controller)
    }

    pub fn config(&self) -> EchoConfig {
        self.config
    }

    pub fn flags(&self) -> EchoFlags {
        self.flags
    }

    /// Handle one typed-character event
    ///
    /// Re-derives both flags from the current modes and the focused
    /// control, then returns the fresh flags for the caller to hand to
    /// the host before the event is allowed to continue. The character
    /// itself is carried by the event but never inspected (and never
    /// logged; it may be a password keystroke). Modes are not touched.
    pub fn on_typed_character(&mut self, control: &ControlSnapshot, _ch: char) -> EchoFlags {
        for feature in Feature::ALL {
            let flag = derive_flag(self.config.mode(feature), control);
            self.flags.set(feature, flag);
        }

        debug!(
            role = ?control.role,
            characters = self.flags.characters,
            words = self.flags.words,
            "echo flags re-derived"
        );
        self.flags
    }

    /// Cycle a feature's mode to its successor and persist it
    ///
    /// The new mode is written to the store before any in-memory state
    /// changes; a failed write aborts the cycle so the user never
    /// hears a confirmation for a mode that was not recorded. Cycling
    /// into off/on forces the flag; cycling into editable-only leaves
    /// the flag for re-derivation on the next typed character, since
    /// no focus snapshot is available here.
    pub fn cycle_mode(&mut self, feature: Feature) -> Result<Announcement, SettingsError> {
        let old_mode = self.config.mode(feature);
        let new_mode = old_mode.next();

        let mut next_config = self.config;
        next_config.set_mode(feature, new_mode);
        self.store.save(&next_config)?;
        self.config = next_config;

        self.apply_forced_flag(feature, new_mode);

        info!(
            %feature,
            from = %old_mode,
            to = %new_mode,
            "echo mode cycled"
        );

        let message = feature.status_message(new_mode);
        let _ = self.event_tx.send(EchoEvent::ModeCycled {
            feature,
            mode: new_mode,
            message: message.to_string(),
        });

        Ok(Announcement {
            feature,
            mode: new_mode,
            message,
        })
    }

    /// Re-read the persisted modes (SIGHUP path)
    ///
    /// Flags follow the same forced rules as cycling; there is no
    /// focus snapshot to classify against until the next keystroke.
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        let config = self.store.load()?;
        self.config = config;
        for feature in Feature::ALL {
            self.apply_forced_flag(feature, self.config.mode(feature));
        }

        info!(
            characters = %self.config.characters,
            words = %self.config.words,
            "echo settings reloaded"
        );
        let _ = self.event_tx.send(EchoEvent::SettingsReloaded {
            characters: self.config.characters,
            words: self.config.words,
        });
        Ok(())
    }

    /// Force the flag for off/on; leave it untouched for editable-only
    fn apply_forced_flag(&mut self, feature: Feature, mode: EchoMode) {
        match mode {
            EchoMode::Off => self.flags.set(feature, false),
            EchoMode::On => self.flags.set(feature, true),
            EchoMode::EditableOnly => {}
        }
    }
}

/// The derivation rule: on echoes always, off never, editable-only
/// echoes iff the focused control is editable
fn derive_flag(mode: EchoMode, control: &ControlSnapshot) -> bool {
    match mode {
        EchoMode::Off => false,
        EchoMode::On => true,
        EchoMode::EditableOnly => control.is_editable(),
    }
}
