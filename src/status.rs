//! Background cache status reporting
//!
//! Polls the shared response cache on an interval and publishes snapshots
//! over a tokio channel. The same task runs cleanup and clear requests so
//! the consumer sees the effect in the next message.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::cache::{CacheStats, ResponseCache};

/// Messages sent from the status task to its consumer
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    /// Fresh snapshot of the cache
    Stats(CacheStats),
    /// An expiry sweep removed this many entries
    CleanedUp(usize),
    /// Every entry was removed
    Cleared,
}

/// Requests the consumer can make of the status task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    /// Remove expired entries
    Cleanup,
    /// Remove all entries
    Clear,
}

/// Configuration for the status poller
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// Interval between snapshots
    pub poll_interval: Duration,
    /// Whether polling is enabled
    pub enabled: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            enabled: true,
        }
    }
}

/// Handle for controlling the background status task
pub struct StatusHandle {
    /// Channel for receiving status messages
    pub receiver: mpsc::Receiver<StatusMessage>,
    command_tx: mpsc::Sender<StatusCommand>,
    shutdown_tx: mpsc::Sender<()>,
}

impl StatusHandle {
    /// Spawns the status task for `cache`
    ///
    /// The first snapshot is published immediately, then one per
    /// `poll_interval`. With polling disabled no task is spawned and the
    /// receiver stays empty.
    pub fn spawn(cache: Arc<ResponseCache<Value>>, config: StatusConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (command_tx, mut command_rx) = mpsc::channel::<StatusCommand>(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(config.poll_interval);

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if msg_tx.send(StatusMessage::Stats(cache.stats())).await.is_err() {
                                break;
                            }
                        }
                        Some(command) = command_rx.recv() => {
                            let reply = match command {
                                StatusCommand::Cleanup => {
                                    StatusMessage::CleanedUp(cache.cleanup_expired())
                                }
                                StatusCommand::Clear => {
                                    cache.clear();
                                    StatusMessage::Cleared
                                }
                            };
                            if msg_tx.send(reply).await.is_err()
                                || msg_tx.send(StatusMessage::Stats(cache.stats())).await.is_err()
                            {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
                tracing::debug!("cache status task stopped");
            });
        }

        Self {
            receiver: msg_rx,
            command_tx,
            shutdown_tx,
        }
    }

    /// Asks the task to remove expired entries
    pub async fn request_cleanup(&self) {
        let _ = self.command_tx.send(StatusCommand::Cleanup).await;
    }

    /// Requests a cleanup and waits for its reply and the snapshot after it
    ///
    /// Returns every message received up to and including that snapshot,
    /// or whatever arrived before `wait` ran out.
    pub async fn cleanup_and_wait(&mut self, wait: Duration) -> Vec<StatusMessage> {
        self.request_cleanup().await;

        let deadline = tokio::time::Instant::now() + wait;
        let mut messages = Vec::new();
        let mut cleaned = false;

        while let Ok(Some(message)) =
            tokio::time::timeout_at(deadline, self.receiver.recv()).await
        {
            let done = cleaned && matches!(message, StatusMessage::Stats(_));
            cleaned |= matches!(message, StatusMessage::CleanedUp(_));
            messages.push(message);
            if done {
                break;
            }
        }
        messages
    }

    /// Asks the task to remove every entry
    pub async fn request_clear(&self) {
        let _ = self.command_tx.send(StatusCommand::Clear).await;
    }

    /// Stops the status task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending status messages without blocking
///
/// # Returns
/// * `Some(StatusMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut StatusHandle) -> Option<StatusMessage> {
    handle.receiver.try_recv().ok()
}
