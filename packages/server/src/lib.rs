//! Line-oriented TCP chat server.
//!
//! Accepts any number of clients and relays every frame a client sends to all
//! other connected clients.

mod error;
mod listener;
mod registry;
mod runner;
mod session;
mod signal;

pub use error::ServerError;
pub use listener::{Listener, SHUTDOWN_GRACE};
pub use registry::ConnectionRegistry;
pub use runner::run_server;
pub use session::{ServerSession, run_session};
pub use signal::{shutdown_signal, spawn_console_reader, wait_for_sentinel};
