//! Interactive chat client.
//!
//! Connects to a chat server, asks for a display name, then sends every line
//! typed and prints every line relayed by the server. Type `bye` to leave.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatline-client
//! cargo run --bin chatline-client -- --host 192.168.0.10 --port 4000
//! ```

use chatline_client::{ClientError, SessionEnd};
use chatline_shared::{
    logger::setup_logger,
    protocol::{DEFAULT_HOST, DEFAULT_PORT},
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatline-client")]
#[command(about = "Interactive client for the line-oriented TCP chat server", long_about = None)]
struct Args {
    /// Chat server host
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Chat server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    match chatline_client::run_client(&args.host, args.port).await {
        Ok(SessionEnd::Left | SessionEnd::InputClosed) => println!("\nGood bye!"),
        Ok(SessionEnd::ServerOffline) => println!("\nServer went offline."),
        Err(e @ ClientError::ConnectionRefused { .. }) => {
            println!("Start the server first.");
            tracing::error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("Client error: {}", e);
            std::process::exit(1);
        }
    }
}
