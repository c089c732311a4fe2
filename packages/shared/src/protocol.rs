//! Wire vocabulary: chat messages, system notices and the sentinel command.

use std::fmt;

/// Line that makes a client leave, or the server shut down, when typed alone.
pub const SENTINEL: &str = "bye";

/// Label used on system notices.
pub const SERVER_LABEL: &str = "Server";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3280;

const JOIN_SUFFIX: &str = " has joined the room. Say hi!";

/// A chat message, serialized as `"{label}: {body}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub label: String,
    pub body: String,
}

impl Message {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }

    /// Split a frame at the first `": "`. Frames without one are not messages.
    pub fn parse(frame: &str) -> Option<Self> {
        let (label, body) = frame.split_once(": ")?;
        Some(Self::new(label, body))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.body)
    }
}

/// Only an exact whole-line match counts.
pub fn is_sentinel(line: &str) -> bool {
    line == SENTINEL
}

pub fn join_announcement(name: &str) -> String {
    format!("{}: {}{}", SERVER_LABEL, name, JOIN_SUFFIX)
}

pub fn leave_notice(name: &str) -> String {
    format!("{}: {} has left the chat room.", SERVER_LABEL, name)
}

pub fn shutdown_notice() -> String {
    format!("{}: the server is shutting down.", SERVER_LABEL)
}

/// Extract the display name from a join announcement frame.
pub fn announced_name(frame: &str) -> Option<&str> {
    let rest = frame.strip_prefix(SERVER_LABEL)?.strip_prefix(": ")?;
    let name = rest.strip_suffix(JOIN_SUFFIX)?;
    (!name.is_empty()).then_some(name)
}
