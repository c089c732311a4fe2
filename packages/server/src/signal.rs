//! Operator shutdown: the `bye` console command or Ctrl+C.

use std::io::BufRead;

use chatline_shared::protocol::is_sentinel;
use tokio::sync::mpsc;

/// Forward console lines from a dedicated thread.
///
/// A plain thread is used because a blocked stdin read must not hold up
/// runtime shutdown.
pub fn spawn_console_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Console read error: {}", e);
                    break;
                }
            }
        }
    });

    rx
}

/// Wait for the sentinel command. Returns `false` if the console closes first.
pub async fn wait_for_sentinel(commands: &mut mpsc::UnboundedReceiver<String>) -> bool {
    while let Some(command) = commands.recv().await {
        if is_sentinel(&command) {
            return true;
        }
        if !command.is_empty() {
            tracing::info!("Unknown command '{}'", command);
        }
    }
    false
}

/// Resolves when the operator asks the server to shut down.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let console = async {
        let mut commands = spawn_console_reader();
        if !wait_for_sentinel(&mut commands).await {
            tracing::debug!("Console closed; only Ctrl+C can stop the server now");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = console => tracing::info!("Received shutdown command, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_sentinel_ignores_other_commands() {
        // テスト項目: 終了コマンド以外の入力は無視され、完全一致の "bye" で終了する
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        for line in ["status", "bye now", " bye", "bye"] {
            tx.send(line.to_string()).unwrap();
        }

        // when (操作):
        let received = wait_for_sentinel(&mut rx).await;

        // then (期待する結果):
        assert!(received);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wait_for_sentinel_returns_false_when_console_closes() {
        // テスト項目: 終了コマンドなしで入力が閉じられると false が返る
        // given (前提条件):
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("hello".to_string()).unwrap();
        drop(tx);

        // when (操作):
        let received = wait_for_sentinel(&mut rx).await;

        // then (期待する結果):
        assert!(!received);
    }
}
