use crate::domain::model::{GameEvent, Player};
use crate::domain::ports::PlayerAudience;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::BufRead;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

pub const CONSOLE_PLAYER: &str = "console";

/// Prints broadcast lines to stdout. Used when no game server is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleAudience;

#[async_trait]
impl PlayerAudience for ConsoleAudience {
    async fn broadcast(&self, line: &str) -> Result<()> {
        println!("{}", line);
        Ok(())
    }
}

/// Feeds stdin lines in as chat from the console player.
///
/// The read runs on a detached OS thread: a blocked stdin read cannot be
/// cancelled, and must not keep the runtime alive at shutdown.
pub fn console_events(tx: mpsc::Sender<GameEvent>) -> std::io::Result<JoinHandle<()>> {
    console_events_from(std::io::BufReader::new(std::io::stdin()), tx)
}

/// Same as [`console_events`] over any line source. The thread ends at EOF,
/// on a read error, or once the receiver is gone.
pub fn console_events_from<R>(
    reader: R,
    tx: mpsc::Sender<GameEvent>,
) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Failed to read console input: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = GameEvent::Chat {
                    player: Player::new(CONSOLE_PLAYER, CONSOLE_PLAYER),
                    message: line,
                };
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            tracing::debug!("Console input closed");
        })
}
