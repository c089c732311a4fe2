//! Interactive client for the Chatline chat server.
//!
//! One task reads frames from the server and prints them; the user's lines
//! are read on a separate thread and sent as `"{name}: {line}"` frames.

mod client;
mod error;
mod input;
mod runner;
mod session;
mod ui;

pub use client::{ChatClient, JoinedClient};
pub use error::ClientError;
pub use input::spawn_input_thread;
pub use runner::run_client;
pub use session::{SessionEnd, run_session};
pub use ui::ConsoleDisplay;
