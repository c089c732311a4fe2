//! Error types for the chat client.

use std::io;

use chatline_shared::codec::FrameError;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Nothing is listening at the server address
    #[error("connection to {addr} refused: {source}")]
    ConnectionRefused {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Any other failure while connecting
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send: {0}")]
    Send(#[from] FrameError),

    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
