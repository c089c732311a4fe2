//! Error types for the chat server.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Server-specific errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be created
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A session for this peer address is already registered
    #[error("a session for {0} is already registered")]
    DuplicateKey(SocketAddr),

    /// The registry stopped accepting sessions because the server is shutting down
    #[error("the server is shutting down")]
    ShuttingDown,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
