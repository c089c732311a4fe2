//! Client session: the reader role prints what the server relays while the
//! writer role sends what the user types.

use std::sync::Arc;

use chatline_shared::{
    codec::{FrameCodec, FrameError},
    protocol::{Message, SENTINEL, is_sentinel, leave_notice},
    session::{FrameSink, ReaderExit, SessionLifecycle, run_reader},
};
use futures_util::SinkExt;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::error::ClientError;

/// How a client session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed the sentinel command.
    Left,
    /// User input ended (EOF or Ctrl+C); the session left the room.
    InputClosed,
    /// The server closed the connection or stopped accepting frames.
    ServerOffline,
}

enum WriterExit {
    Left,
    InputClosed,
    SessionClosed,
}

/// Run both roles over an established connection.
///
/// Returns once both roles have finished and the connection is shut down.
pub async fn run_session<R, W, S>(
    reader: R,
    writer: W,
    name: &str,
    mut input: mpsc::UnboundedReceiver<String>,
    display: Arc<S>,
) -> Result<SessionEnd, ClientError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
    S: FrameSink + 'static,
{
    let lifecycle = Arc::new(SessionLifecycle::new());

    let reader_task = {
        let lifecycle = lifecycle.clone();
        let mut frames = FramedRead::new(reader, FrameCodec::new());
        tokio::spawn(async move {
            let exit = run_reader(&mut frames, display.as_ref(), &lifecycle).await;
            lifecycle.begin_close();
            exit
        })
    };

    let mut writer = FramedWrite::new(writer, FrameCodec::new());
    let end = match run_writer(&mut writer, name, &mut input, &lifecycle).await {
        Ok(WriterExit::Left) => SessionEnd::Left,
        Ok(WriterExit::InputClosed) => SessionEnd::InputClosed,
        Ok(WriterExit::SessionClosed) => SessionEnd::ServerOffline,
        Err(e) => {
            tracing::warn!("Failed to send to server: {}", e);
            SessionEnd::ServerOffline
        }
    };
    lifecycle.begin_close();

    match reader_task.await? {
        ReaderExit::EndOfStream => tracing::info!("Server closed the connection"),
        ReaderExit::Closed => tracing::debug!("Reader stopped after local close"),
        ReaderExit::Error(e) => tracing::warn!("Connection to server lost: {}", e),
    }
    lifecycle.mark_closed();

    Ok(end)
}

/// Writer role: forward user lines until the user leaves, input ends, or the
/// reader closes the session.
async fn run_writer<W>(
    writer: &mut FramedWrite<W, FrameCodec>,
    name: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
    lifecycle: &SessionLifecycle,
) -> Result<WriterExit, FrameError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let line = tokio::select! {
            _ = lifecycle.closing() => return Ok(WriterExit::SessionClosed),
            line = input.recv() => line,
        };

        match line {
            Some(line) if is_sentinel(&line) => {
                leave(writer, name).await?;
                return Ok(WriterExit::Left);
            }
            Some(line) => writer.send(Message::new(name, line).to_string()).await?,
            None => {
                tracing::info!("Input closed, leaving the room");
                leave(writer, name).await?;
                return Ok(WriterExit::InputClosed);
            }
        }
    }
}

/// Send the farewell frames, then shut down the write half.
async fn leave<W>(writer: &mut FramedWrite<W, FrameCodec>, name: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    writer.send(Message::new(name, SENTINEL).to_string()).await?;
    writer.send(leave_notice(name)).await?;
    writer.get_mut().shutdown().await?;
    Ok(())
}
