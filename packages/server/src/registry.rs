//! Registry of live server sessions.

use std::{collections::HashMap, collections::hash_map::Entry, net::SocketAddr, sync::Arc};

use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::{error::ServerError, session::ServerSession};

/// The set of currently connected sessions, keyed by peer address.
///
/// Every operation takes the same lock, so membership changes and broadcast
/// snapshots are serialized. The lock is never held while writing to a socket.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<Members>,
}

#[derive(Default)]
struct Members {
    sessions: HashMap<SocketAddr, Arc<ServerSession>>,
    /// Set by `close_all`; no session may join afterwards.
    closed: bool,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session under its peer address.
    ///
    /// Fails with [`ServerError::ShuttingDown`] once [`Self::close_all`] ran.
    pub async fn register(&self, session: Arc<ServerSession>) -> Result<(), ServerError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(ServerError::ShuttingDown);
        }
        match inner.sessions.entry(session.peer()) {
            Entry::Occupied(entry) => Err(ServerError::DuplicateKey(*entry.key())),
            Entry::Vacant(entry) => {
                tracing::debug!("Session {} registered", session.peer());
                entry.insert(session);
                Ok(())
            }
        }
    }

    /// Remove the session for `peer`. Removing an absent session is a no-op.
    pub async fn unregister(&self, peer: SocketAddr) -> Option<Arc<ServerSession>> {
        let removed = self.inner.lock().await.sessions.remove(&peer);
        if removed.is_some() {
            tracing::debug!("Session {} unregistered", peer);
        }
        removed
    }

    /// Deliver `frame` to every registered session except `except`.
    ///
    /// Targets are the sessions registered when the call starts. A failed
    /// delivery is logged and does not affect the other targets. Returns how
    /// many targets accepted the frame without error (a target that is already
    /// closing drops it silently and still counts).
    pub async fn broadcast(&self, frame: &str, except: SocketAddr) -> usize {
        let targets: Vec<Arc<ServerSession>> = self
            .inner
            .lock()
            .await
            .sessions
            .values()
            .filter(|session| session.peer() != except)
            .cloned()
            .collect();

        let results = join_all(targets.iter().map(|session| async move {
            (session, session.deliver(frame).await)
        }))
        .await;

        let mut delivered = 0;
        for (session, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to deliver frame to '{}' ({}): {}",
                    session.display_name(),
                    session.peer(),
                    e
                ),
            }
        }
        delivered
    }

    /// Stop admitting sessions, send `notice` to every registered one, then
    /// close all of them.
    ///
    /// Each session's reader observes the close and unregisters itself.
    pub async fn close_all(&self, notice: &str) -> usize {
        let targets: Vec<Arc<ServerSession>> = {
            let mut inner = self.inner.lock().await;
            inner.closed = true;
            inner.sessions.values().cloned().collect()
        };

        join_all(targets.iter().map(|session| async move {
            if let Err(e) = session.deliver(notice).await {
                tracing::debug!("Shutdown notice to {} failed: {}", session.peer(), e);
            }
            session.close().await;
        }))
        .await;

        targets.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.sessions.is_empty()
    }

    /// Registered peer addresses, sorted.
    pub async fn peers(&self) -> Vec<SocketAddr> {
        let mut peers: Vec<SocketAddr> =
            self.inner.lock().await.sessions.keys().copied().collect();
        peers.sort();
        peers
    }
}
