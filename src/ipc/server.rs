//! Unix domain socket server for IPC
//!
//! Carries typed-character events, cycle commands, and status queries
//! from the host, and pushes echo events to subscribed connections.
//! All controller access goes through one lock, which serializes event
//! handling the same way the host serializes its input dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::echo::{EchoController, Feature};
use crate::events::EchoEvent;
use crate::gesture::GestureBindings;

use super::protocol::{DaemonStatus, Request, Response};

/// IPC server handling host connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    /// Sender subscribed from when a connection switches to push mode
    event_tx: broadcast::Sender<EchoEvent>,
}

/// Shared server state
struct ServerState {
    controller: EchoController,
    bindings: GestureBindings,
    start_time: std::time::Instant,
}

impl Server {
    /// Create a new IPC server owning the controller
    pub fn new(
        socket_path: &Path,
        controller: EchoController,
        event_tx: broadcast::Sender<EchoEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let bindings = GestureBindings::standard();
        for identifier in bindings.identifiers() {
            debug!(gesture = identifier, "cycle gesture bound");
        }

        let state = Arc::new(RwLock::new(ServerState {
            controller,
            bindings,
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            event_tx,
        })
    }

    /// Re-read the persisted echo settings (SIGHUP path)
    pub async fn reload_settings(&self) {
        let mut state = self.state.write().await;
        if let Err(e) = state.controller.reload() {
            error!(%e, "settings reload failed, keeping previous modes");
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let event_tx = self.event_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, event_tx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        event_tx: broadcast::Sender<EchoEvent>,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > 1024 * 1024 {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            // Parse request; log only the kind, never the payload
            // (typed-character payloads must not reach the log)
            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;
            debug!(request = request_name(&request), "received request");

            // Process request
            let (response, subscribe) = Self::process_request(request, &state).await;

            // Send response. For typed-character events this reply is
            // the continuation: the flags are already written by the
            // time it goes out.
            Self::send_message(&mut stream, &response).await?;

            if subscribe {
                debug!("client switched to push mode");
                return Self::push_events(stream, event_tx.subscribe()).await;
            }
        }
    }

    /// Forward echo events to a subscribed connection until it closes
    async fn push_events(
        mut stream: UnixStream,
        mut event_rx: broadcast::Receiver<EchoEvent>,
    ) -> Result<()> {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if Self::send_message(&mut stream, &event).await.is_err() {
                        debug!("subscriber disconnected");
                        return Ok(());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged behind echo events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let state = state.read().await;
                let config = state.controller.config();
                let status = DaemonStatus {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    characters: config.characters,
                    words: config.words,
                    flags: state.controller.flags(),
                    uptime_secs: state.start_time.elapsed().as_secs(),
                };
                (Response::Status(status), false)
            }

            Request::TypedCharacter { control, ch } => {
                let mut state = state.write().await;
                let flags = state.controller.on_typed_character(&control, ch);
                (Response::Echo(flags), false)
            }

            Request::CycleMode { feature } => (Self::cycle(feature, state).await, false),

            Request::InputGesture { identifier } => {
                let feature = state.read().await.bindings.resolve(&identifier);
                match feature {
                    Some(feature) => (Self::cycle(feature, state).await, false),
                    None => (
                        Response::Error {
                            code: "unknown_gesture".to_string(),
                            message: format!("no binding for gesture {identifier:?}"),
                        },
                        false,
                    ),
                }
            }

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    /// Cycle a feature's mode, mapping a persistence failure to an
    /// error reply so the host never announces an unrecorded change
    async fn cycle(feature: Feature, state: &Arc<RwLock<ServerState>>) -> Response {
        let mut state = state.write().await;
        match state.controller.cycle_mode(feature) {
            Ok(announcement) => Response::ModeCycled {
                feature: announcement.feature,
                mode: announcement.mode,
                message: announcement.message.to_string(),
            },
            Err(e) => {
                error!(%feature, %e, "mode cycle failed");
                Response::Error {
                    code: "settings".to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Request kind for logging, with payloads stripped
fn request_name(request: &Request) -> &'static str {
    match request {
        Request::TypedCharacter { .. } => "typed_character",
        Request::InputGesture { .. } => "input_gesture",
        Request::CycleMode { .. } => "cycle_mode",
        Request::GetStatus => "get_status",
        Request::Ping => "ping",
        Request::Subscribe => "subscribe",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsStore;
    use crate::echo::{EchoFlags, EchoMode};
    use crate::focus::{ControlRole, ControlSnapshot};

    fn create_state(dir: &tempfile::TempDir) -> Arc<RwLock<ServerState>> {
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let (tx, _rx) = broadcast::channel(16);
        let controller = EchoController::new(store, tx).unwrap();
        Arc::new(RwLock::new(ServerState {
            controller,
            bindings: GestureBindings::standard(),
            start_time: std::time::Instant::now(),
        }))
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_state(&dir);

        let (response, subscribe) = Server::process_request(Request::Ping, &state).await;
        assert!(matches!(response, Response::Pong));
        assert!(!subscribe);
    }

    #[tokio::test]
    async fn test_typed_character_replies_with_fresh_flags() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_state(&dir);

        let request = Request::TypedCharacter {
            control: ControlSnapshot::new(ControlRole::EditableText),
            ch: 'a',
        };
        let (response, _) = Server::process_request(request, &state).await;
        assert_eq!(
            response_flags(response),
            EchoFlags {
                characters: true,
                words: true,
            }
        );

        let request = Request::TypedCharacter {
            control: ControlSnapshot::new(ControlRole::Button),
            ch: 'a',
        };
        let (response, _) = Server::process_request(request, &state).await;
        assert_eq!(response_flags(response), EchoFlags::default());
    }

    #[tokio::test]
    async fn test_gesture_cycles_mode() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_state(&dir);

        let request = Request::InputGesture {
            identifier: "kb:reader+2".to_string(),
        };
        let (response, _) = Server::process_request(request, &state).await;
        assert!(matches!(
            response,
            Response::ModeCycled {
                feature: Feature::Characters,
                mode: EchoMode::Off,
                ..
            }
        ));
        assert_eq!(
            state.read().await.controller.config().characters,
            EchoMode::Off
        );
    }

    #[tokio::test]
    async fn test_unknown_gesture_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_state(&dir);
        let before = state.read().await.controller.config();

        let request = Request::InputGesture {
            identifier: "kb:reader+9".to_string(),
        };
        let (response, _) = Server::process_request(request, &state).await;
        assert!(matches!(response, Response::Error { .. }));
        assert_eq!(state.read().await.controller.config(), before);
    }

    #[tokio::test]
    async fn test_status_reflects_modes() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_state(&dir);

        let request = Request::CycleMode {
            feature: Feature::Words,
        };
        Server::process_request(request, &state).await;

        let (response, _) = Server::process_request(Request::GetStatus, &state).await;
        match response {
            Response::Status(status) => {
                assert_eq!(status.characters, EchoMode::EditableOnly);
                assert_eq!(status.words, EchoMode::Off);
            }
            other => panic!("expected status, got {other:?}"),
        }
    }

    fn response_flags(response: Response) -> EchoFlags {
        match response {
            Response::Echo(flags) => flags,
            other => panic!("expected echo reply, got {other:?}"),
        }
    }
}
