//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. The host forwards typed-character events and gesture
//! invocations as requests; the reply to a typed-character request is
//! the event continuation, so the host must not proceed with echo
//! until it arrives. After a `subscribe` request the connection
//! switches to push mode and carries [`EchoEvent`] frames.

use serde::{Deserialize, Serialize};

use crate::echo::{EchoFlags, EchoMode, Feature};
use crate::events::EchoEvent;
use crate::focus::ControlSnapshot;

/// Requests from the host to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// A character was typed with the given control focused
    ///
    /// The character is carried by the event but never inspected.
    TypedCharacter { control: ControlSnapshot, ch: char },

    /// A bound input gesture was invoked; the daemon resolves it
    /// against its binding table
    InputGesture { identifier: String },

    /// Cycle a feature's mode directly
    CycleMode { feature: Feature },

    /// Request current daemon status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Switch this connection to push notifications
    Subscribe,
}

/// Responses from the daemon to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Continuation reply for a typed-character event, carrying the
    /// freshly derived echo flags
    Echo(EchoFlags),

    /// A mode was cycled; `message` is the status phrasing to speak
    ModeCycled {
        feature: Feature,
        mode: EchoMode,
        message: String,
    },

    /// Current daemon status
    Status(DaemonStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed; `EchoEvent` frames follow
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification frames sent to subscribed connections
pub type Notification = EchoEvent;

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current typed-character echo mode
    pub characters: EchoMode,

    /// Current typed-word echo mode
    pub words: EchoMode,

    /// Live boolean flags as of the last derivation
    pub flags: EchoFlags,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            characters: EchoMode::default(),
            words: EchoMode::default(),
            flags: EchoFlags::default(),
            uptime_secs: 0,
        }
    }
}
