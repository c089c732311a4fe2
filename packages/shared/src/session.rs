//! Duplex session core shared by the server and the client.
//!
//! Every connection runs a reader role (network -> [`FrameSink`]) and a writer
//! role. Both roles observe one [`SessionLifecycle`]; whichever role closes the
//! session first wins, and the other role sees the state change and exits.

use async_trait::async_trait;
use tokio::{io::AsyncRead, sync::watch};
use tokio_util::codec::FramedRead;

use crate::codec::{FrameCodec, FrameError, Inbound, read_frame};

/// Lifecycle of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Closing,
    Closed,
}

/// Shared, observable session state.
#[derive(Debug)]
pub struct SessionLifecycle {
    state: watch::Sender<SessionState>,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Active);
        Self { state }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Move `Active -> Closing`.
    ///
    /// Returns `true` for exactly one caller; that caller owns the teardown.
    pub fn begin_close(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Active {
                *state = SessionState::Closing;
                true
            } else {
                false
            }
        })
    }

    /// Move to `Closed`. Passes through `Closing` if nobody did yet.
    pub fn mark_closed(&self) {
        self.begin_close();
        self.state.send_replace(SessionState::Closed);
    }

    /// Resolves once the session is no longer active.
    pub async fn closing(&self) {
        let mut state = self.state.subscribe();
        // The sender lives in `self`, so the wait cannot fail.
        let _ = state.wait_for(|s| *s != SessionState::Active).await;
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer of frames decoded by the reader role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn on_frame(&self, frame: String);
}

/// Why a reader role stopped.
#[derive(Debug)]
pub enum ReaderExit {
    /// The peer closed the connection.
    EndOfStream,
    /// Reading failed; the connection is unusable.
    Error(FrameError),
    /// The session was closed locally.
    Closed,
}

/// Reader role: hand every decoded frame to `sink` until the stream ends,
/// reading fails, or the session stops being active.
pub async fn run_reader<R, S>(
    frames: &mut FramedRead<R, FrameCodec>,
    sink: &S,
    lifecycle: &SessionLifecycle,
) -> ReaderExit
where
    R: AsyncRead + Unpin,
    S: FrameSink + ?Sized,
{
    loop {
        let inbound = tokio::select! {
            _ = lifecycle.closing() => return ReaderExit::Closed,
            inbound = read_frame(frames) => inbound,
        };

        match inbound {
            Inbound::Frame(frame) => {
                tracing::trace!("Decoded frame: {}", frame);
                sink.on_frame(frame).await;
            }
            Inbound::EndOfStream => return ReaderExit::EndOfStream,
            Inbound::Error(e) => return ReaderExit::Error(e),
        }
    }
}
