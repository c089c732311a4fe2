//! Console output for the client.

use std::io::Write;

use async_trait::async_trait;
use chatline_shared::session::FrameSink;

pub const NAME_PROMPT: &str = "Please type your name: ";

/// Prompt shown before each line the user types
pub fn prompt(name: &str) -> String {
    format!("{}: ", name)
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(name: &str) {
    print!("{}", prompt(name));
    std::io::stdout().flush().ok();
}

/// Move to the start of the line so an incoming frame overwrites the prompt.
fn format_incoming(frame: &str) -> String {
    format!("\r{}\n", frame)
}

/// Prints relayed frames over the current prompt, then redraws the prompt.
pub struct ConsoleDisplay {
    name: String,
}

impl ConsoleDisplay {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl FrameSink for ConsoleDisplay {
    async fn on_frame(&self, frame: String) {
        print!("{}", format_incoming(&frame));
        redisplay_prompt(&self.name);
    }
}
