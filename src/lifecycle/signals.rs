//! Process signal handling
//!
//! SIGTERM/SIGINT stop the daemon; SIGHUP re-reads the persisted echo
//! settings (the host configuration can change behind the daemon's
//! back).

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    pub async fn wait(&self) {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles the settings-reload signal (SIGHUP)
pub struct ReloadSignal;

impl ReloadSignal {
    pub fn new() -> Self {
        Self
    }

    /// Wait for the next reload signal
    pub async fn wait(&self) {
        let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");
        sighup.recv().await;
        debug!("received SIGHUP");
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}
