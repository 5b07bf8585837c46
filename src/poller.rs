//! Long-polling loop that feeds Telegram updates to the dialogue.
//!
//! Updates are dispatched one at a time in arrival order. Only retrieval failures are
//! retried with backoff here; a failure while handling a single update is logged and
//! the loop moves on to the next one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::dialogue::{DialogueController, Dispatch};
use crate::errors::BotError;
use crate::telegram::{TelegramClient, parse_update};

pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Value>, BotError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Value>, BotError> {
        self.get_updates(offset, timeout_secs).await
    }
}

/// Doubling delay between failed polls, reset by any successful poll.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Delay to wait now; the following call returns twice as much, up to `max`.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current.min(self.max);
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

pub struct Poller {
    source: Arc<dyn UpdateSource>,
    controller: Arc<DialogueController>,
    timeout_secs: u64,
    offset: Option<i64>,
    backoff: Backoff,
}

impl Poller {
    #[must_use]
    pub fn new(
        source: Arc<dyn UpdateSource>,
        controller: Arc<DialogueController>,
        timeout_secs: u64,
        retry_delay: Duration,
    ) -> Self {
        Self {
            source,
            controller,
            timeout_secs,
            offset: None,
            backoff: Backoff::new(retry_delay, MAX_RETRY_DELAY.max(retry_delay)),
        }
    }

    /// Offset that will be sent with the next `getUpdates` call.
    #[must_use]
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Fetch one batch and dispatch every update in it.
    ///
    /// Returns the number of updates received.
    ///
    /// # Errors
    ///
    /// Only retrieval failures are returned.
    pub async fn poll_once(&mut self) -> Result<usize, BotError> {
        let updates = self
            .source
            .fetch_updates(self.offset, self.timeout_secs)
            .await?;

        for raw in &updates {
            let parsed = match parse_update(raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Skipping malformed update: {}", e);
                    continue;
                }
            };
            self.offset = Some(self.offset.map_or(parsed.update_id + 1, |o| {
                o.max(parsed.update_id + 1)
            }));

            let Some(event) = parsed.event else {
                debug!(update_id = parsed.update_id, "Update carries nothing to handle");
                continue;
            };

            let chat_id = event.chat_id();
            match self.controller.handle_event(event).await {
                Ok(Dispatch::Summarizing(_job)) => {
                    debug!(update_id = parsed.update_id, chat_id = %chat_id, "Summary job detached");
                }
                Ok(_) => {}
                Err(e) => error!(
                    update_id = parsed.update_id,
                    chat_id = %chat_id,
                    "Failed to handle update: {}",
                    e
                ),
            }
        }

        Ok(updates.len())
    }

    /// Poll forever. Retrieval errors are logged and retried after a growing delay.
    pub async fn run(mut self) {
        info!(timeout_secs = self.timeout_secs, "Polling for updates");
        loop {
            match self.poll_once().await {
                Ok(_) => self.backoff.reset(),
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    error!("Polling failed: {}; retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
