//! typed-echo-daemon: controls when a screen reader echoes typed input
//!
//! The daemon provides:
//! - Independent tri-state modes (off, on, editable-only) for typed
//!   characters and typed words
//! - Editability classification of the focused control
//! - An IPC server carrying typed-character events, cycle commands,
//!   and announcements between the host and the controller
//!
//! The host keeps ownership of gesture capture, speech output, and the
//! accessibility tree; only snapshots and commands cross the socket.

mod config;
mod echo;
mod events;
mod focus;
mod gesture;
mod ipc;
mod lifecycle;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, SettingsStore};
use crate::echo::EchoController;
use crate::events::EchoEvent;
use crate::ipc::Server;
use crate::lifecycle::{ReloadSignal, ShutdownSignal};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "typed-echo-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.settings_path, "configuration loaded");

    // Signal handlers
    let shutdown = ShutdownSignal::new();
    let reload = ReloadSignal::new();

    // Echo events: controller -> IPC subscribers and the log relay
    let (event_tx, _event_rx) = broadcast::channel::<EchoEvent>(64);

    // Create the controller from the persisted settings; a corrupt
    // settings file is refused here rather than guessed around
    let store = SettingsStore::new(config.settings_path.clone());
    let controller = EchoController::new(store, event_tx.clone())?;

    // Create the IPC server owning the controller
    let server = Server::new(&config.socket_path, controller, event_tx.clone())?;

    let mut log_event_rx = event_tx.subscribe();
    let server_for_reload = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the IPC server (accepts host connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Relay echo events into the log
        _ = async {
            loop {
                match log_event_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "echo event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "echo event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("echo event relay exited");
        }

        // Re-read persisted settings on SIGHUP
        _ = async {
            loop {
                reload.wait().await;
                server_for_reload.reload_settings().await;
            }
        } => {}

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!("typed-echo-daemon stopped");

    Ok(())
}
