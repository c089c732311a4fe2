//! Server execution logic.

use chatline_shared::protocol::SENTINEL;

use crate::{error::ServerError, listener::Listener, signal::shutdown_signal};

/// Run the chat server until the operator shuts it down
///
/// # Arguments
///
/// * `host` - The host address to bind to (e.g., "127.0.0.1")
/// * `port` - The port number to bind to (e.g., 3280)
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address.
pub async fn run_server(host: &str, port: u16) -> Result<(), ServerError> {
    let listener = Listener::bind(host, port).await?;

    tracing::info!("Chat server listening on {}", listener.local_addr()?);
    println!("Type '{}' at any time to shut down the server...", SENTINEL);

    listener.serve_until(shutdown_signal()).await;

    tracing::info!("Server shutdown complete");
    println!("Server is now offline. Good bye!");

    Ok(())
}
