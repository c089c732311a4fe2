//! Accept loop.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use chatline_shared::protocol::shutdown_notice;
use tokio::{net::TcpListener, task::JoinSet};

use crate::{error::ServerError, registry::ConnectionRegistry, session::run_session};

/// How long shutdown waits for sessions to finish before aborting them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Listening socket plus the registry its sessions join.
pub struct Listener {
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
}

impl Listener {
    /// Bind the server socket.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be listened on.
    pub async fn bind(host: &str, port: u16) -> Result<Self, ServerError> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        Ok(Self::from_listener(listener))
    }

    pub fn from_listener(listener: TcpListener) -> Self {
        Self {
            listener,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.registry.clone()
    }

    /// Accept connections until `shutdown` resolves, then close every live
    /// session and wait for them to finish (bounded by [`SHUTDOWN_GRACE`]).
    pub async fn serve_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Listener { listener, registry } = self;
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        sessions.spawn(run_session(stream, peer, registry.clone()));
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Session task failed: {}", e);
                    }
                }
            }
        }

        drop(listener);
        shutdown_sessions(&registry, &mut sessions).await;
    }
}

async fn shutdown_sessions(registry: &ConnectionRegistry, sessions: &mut JoinSet<()>) {
    tracing::info!("Closing {} live session(s)", registry.len().await);

    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        registry.close_all(&shutdown_notice()).await;
        while let Some(joined) = sessions.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Session task failed: {}", e);
            }
        }
    })
    .await;

    if drained.is_err() {
        tracing::warn!(
            "{} session(s) still running after {:?}, aborting",
            sessions.len(),
            SHUTDOWN_GRACE
        );
        sessions.shutdown().await;
    }
    tracing::info!("All sessions closed");
}
