//! Server-side session: one accepted client connection.
//!
//! The reader role runs in the session's own task and feeds every frame into
//! [`ConnectionRegistry::broadcast`]. The writer role has no task of its own:
//! [`ServerSession::deliver`] is called by whichever task is broadcasting.

use std::{
    net::SocketAddr,
    sync::{Arc, OnceLock},
};

use async_trait::async_trait;
use chatline_shared::{
    codec::{FrameCodec, FrameError},
    protocol::{Message, SERVER_LABEL, announced_name, shutdown_notice},
    session::{FrameSink, ReaderExit, SessionLifecycle, SessionState, run_reader},
};
use futures_util::SinkExt;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::Mutex,
};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::{error::ServerError, registry::ConnectionRegistry};

/// One connected client as seen by the server.
pub struct ServerSession {
    peer: SocketAddr,
    display_name: OnceLock<String>,
    /// Serializes deliveries so frames never interleave on the wire.
    writer: Mutex<FramedWrite<OwnedWriteHalf, FrameCodec>>,
    lifecycle: SessionLifecycle,
}

impl ServerSession {
    pub fn new(peer: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            peer,
            display_name: OnceLock::new(),
            writer: Mutex::new(FramedWrite::new(writer, FrameCodec::new())),
            lifecycle: SessionLifecycle::new(),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Name announced by the client, or its address until it announces one.
    pub fn display_name(&self) -> String {
        self.display_name
            .get()
            .cloned()
            .unwrap_or_else(|| self.peer.to_string())
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    fn assign_display_name(&self, name: &str) -> bool {
        self.display_name.set(name.to_string()).is_ok()
    }

    /// Write one frame to this client.
    ///
    /// A session that is closing or closed silently drops the frame.
    pub async fn deliver(&self, frame: &str) -> Result<(), FrameError> {
        if !self.lifecycle.is_active() {
            return Ok(());
        }

        let mut writer = self.writer.lock().await;
        // close() may have won the race while we waited for the lock
        if !self.lifecycle.is_active() {
            return Ok(());
        }
        writer.send(frame).await
    }

    /// Start closing the session and shut down the write half.
    ///
    /// Only the first call does anything; it returns `true`.
    pub async fn close(&self) -> bool {
        if !self.lifecycle.begin_close() {
            return false;
        }

        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.get_mut().shutdown().await {
            tracing::debug!("Shutting down write half of {} failed: {}", self.peer, e);
        }
        true
    }
}

/// Reader sink relaying every frame to the other sessions.
struct RegistryBroadcast {
    registry: Arc<ConnectionRegistry>,
    session: Arc<ServerSession>,
}

#[async_trait]
impl FrameSink for RegistryBroadcast {
    async fn on_frame(&self, frame: String) {
        if let Some(name) = announced_name(&frame)
            && self.session.assign_display_name(name)
        {
            tracing::info!("Client {} joined as '{}'", self.session.peer(), name);
        }

        let sender = self.session.display_name();
        match Message::parse(&frame) {
            Some(message) if message.label == SERVER_LABEL => {
                tracing::info!("[{}] notice: {}", sender, message.body)
            }
            Some(message) => tracing::info!("[{}] {}: {}", sender, message.label, message.body),
            None => tracing::info!("[{}] {}", sender, frame),
        }
        let delivered = self.registry.broadcast(&frame, self.session.peer()).await;
        tracing::debug!("Relayed frame from {} to {} peer(s)", self.session.peer(), delivered);
    }
}

/// Drive one accepted connection until it ends.
///
/// Registers the session, relays its frames, and on exit closes the
/// connection and removes the session from `registry`. Errors never leave this
/// function.
pub async fn run_session(stream: TcpStream, peer: SocketAddr, registry: Arc<ConnectionRegistry>) {
    let (read_half, write_half) = stream.into_split();
    let session = Arc::new(ServerSession::new(peer, write_half));

    if let Err(e) = registry.register(session.clone()).await {
        if matches!(e, ServerError::ShuttingDown) {
            tracing::info!("Turning away {}: {}", peer, e);
            if let Err(e) = session.deliver(&shutdown_notice()).await {
                tracing::debug!("Shutdown notice to {} failed: {}", peer, e);
            }
        } else {
            tracing::error!("Refusing connection from {}: {}", peer, e);
        }
        session.close().await;
        session.lifecycle().mark_closed();
        return;
    }
    tracing::info!("Client {} connected ({} online)", peer, registry.len().await);

    let mut frames = FramedRead::new(read_half, FrameCodec::new());
    let sink = RegistryBroadcast {
        registry: registry.clone(),
        session: session.clone(),
    };
    let exit = run_reader(&mut frames, &sink, session.lifecycle()).await;

    let name = session.display_name();
    match exit {
        ReaderExit::EndOfStream => tracing::info!("Client '{}' ({}) disconnected", name, peer),
        ReaderExit::Closed => tracing::info!("Session '{}' ({}) closed by server", name, peer),
        ReaderExit::Error(e) if e.is_disconnect() => {
            tracing::warn!("Client '{}' ({}) went offline: {}", name, peer, e)
        }
        ReaderExit::Error(e) => tracing::warn!("Reading from '{}' ({}) failed: {}", name, peer, e),
    }

    session.close().await;
    registry.unregister(peer).await;
    session.lifecycle().mark_closed();
    tracing::debug!("Session {} torn down", peer);
}
