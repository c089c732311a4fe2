//! Client execution logic.

use std::sync::Arc;

use chatline_shared::protocol::SENTINEL;

use crate::{
    client::ChatClient,
    error::ClientError,
    input::spawn_input_thread,
    session::SessionEnd,
    ui::ConsoleDisplay,
};

/// Connect, ask for a display name, join the room and chat until the user
/// leaves or the server goes away.
pub async fn run_client(host: &str, port: u16) -> Result<SessionEnd, ClientError> {
    println!("Type '{}' at any time to leave the chat room...", SENTINEL);

    let client = ChatClient::connect(&format!("{}:{}", host, port)).await?;

    let mut input = spawn_input_thread();
    let Some(name) = input.recv().await else {
        return Ok(SessionEnd::InputClosed);
    };

    let joined = client.join(&name).await?;
    tracing::info!("Joined the room as '{}'", joined.name());

    let display = Arc::new(ConsoleDisplay::new(&name));
    joined.run(input, display).await
}
