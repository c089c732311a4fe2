//! User input on a dedicated thread.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::ui::{NAME_PROMPT, prompt};

/// Spawn a blocking thread for rustyline (synchronous readline).
///
/// The first line sent is the display name (never empty); every following
/// line is sent exactly as typed. The channel closes on Ctrl+C, Ctrl+D, or a
/// readline failure.
pub fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let name = loop {
            match read_line(&mut rl, NAME_PROMPT) {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line.trim().to_string(),
                None => return,
            }
        };
        let line_prompt = prompt(&name);
        if tx.send(name).is_err() {
            return;
        }

        while let Some(line) = read_line(&mut rl, &line_prompt) {
            if !line.trim().is_empty() {
                rl.add_history_entry(line.as_str()).ok();
            }
            if tx.send(line).is_err() {
                // Session ended, exit thread
                break;
            }
        }
    });

    rx
}

fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Option<String> {
    match rl.readline(prompt) {
        Ok(line) => Some(line),
        Err(ReadlineError::Interrupted) => {
            tracing::info!("Interrupted");
            None
        }
        Err(ReadlineError::Eof) => {
            tracing::info!("EOF");
            None
        }
        Err(err) => {
            tracing::error!("Readline error: {}", err);
            None
        }
    }
}
