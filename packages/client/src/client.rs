//! Connection setup for the chat client.

use std::{io, sync::Arc};

use chatline_shared::{codec::FrameCodec, protocol::join_announcement, session::FrameSink};
use futures_util::SinkExt;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_util::codec::FramedWrite;

use crate::{
    error::ClientError,
    session::{SessionEnd, run_session},
};

/// A connection to the server that has not announced itself yet.
pub struct ChatClient {
    stream: TcpStream,
}

impl ChatClient {
    /// Connect to the server at `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// [`ClientError::ConnectionRefused`] when nothing listens there,
    /// [`ClientError::Connect`] for any other failure.
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await.map_err(|source| {
            let addr = addr.to_string();
            match source.kind() {
                io::ErrorKind::ConnectionRefused => ClientError::ConnectionRefused { addr, source },
                _ => ClientError::Connect { addr, source },
            }
        })?;
        tracing::info!("Connected to chat server at {}", addr);

        Ok(Self { stream })
    }

    /// Announce `name` to the room.
    pub async fn join(self, name: &str) -> Result<JoinedClient, ClientError> {
        let mut framed = FramedWrite::new(self.stream, FrameCodec::new());
        framed.send(join_announcement(name)).await?;

        Ok(JoinedClient {
            stream: framed.into_inner(),
            name: name.to_string(),
        })
    }
}

/// A connection whose user has joined the room under a display name.
pub struct JoinedClient {
    stream: TcpStream,
    name: String,
}

impl JoinedClient {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the session until the user leaves or the server goes away.
    pub async fn run<S>(
        self,
        input: mpsc::UnboundedReceiver<String>,
        display: Arc<S>,
    ) -> Result<SessionEnd, ClientError>
    where
        S: FrameSink + 'static,
    {
        let (reader, writer) = self.stream.into_split();
        run_session(reader, writer, &self.name, input, display).await
    }
}
