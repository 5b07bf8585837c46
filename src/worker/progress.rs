//! Progress indicator shown while a summary is being generated.
//!
//! The model gives no progress signal, so by default the indicator is indeterminate:
//! one "working" message that is edited once when generation ends. `Ticker` keeps the
//! older behaviour of ten timed percentage edits, which track elapsed time only.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::core::models::{ChatId, MessageHandle};
use crate::dialogue::messages;
use crate::errors::BotError;
use crate::transport::ChatTransport;

/// Number of edits issued by the ticker (0%, 10%, ..., 90%).
pub const TICK_COUNT: u32 = 10;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Indeterminate,
    Ticker,
}

impl FromStr for ProgressMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indeterminate" => Ok(Self::Indeterminate),
            "ticker" => Ok(Self::Ticker),
            other => Err(format!(
                "PROGRESS_MODE: expected 'indeterminate' or 'ticker', got '{other}'"
            )),
        }
    }
}

pub struct ProgressReporter {
    transport: Arc<dyn ChatTransport>,
    chat_id: ChatId,
    handle: MessageHandle,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Send the progress message and, in ticker mode, start ticking.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial progress message cannot be sent.
    pub async fn start(
        transport: Arc<dyn ChatTransport>,
        chat_id: ChatId,
        mode: ProgressMode,
        tick_interval: Duration,
    ) -> Result<Self, BotError> {
        let initial = match mode {
            ProgressMode::Indeterminate => messages::PROGRESS_INDETERMINATE,
            ProgressMode::Ticker => messages::PROGRESS_STARTED,
        };
        let handle = transport.send_message(chat_id, initial, None).await?;

        let ticker = match mode {
            ProgressMode::Ticker => Some(tokio::spawn(run_ticker(
                Arc::clone(&transport),
                chat_id,
                handle,
                tick_interval,
            ))),
            ProgressMode::Indeterminate => None,
        };

        Ok(Self {
            transport,
            chat_id,
            handle,
            ticker,
        })
    }

    /// Generation succeeded. In ticker mode this waits for the remaining ticks so the
    /// summary always lands after the last one.
    pub async fn finish(mut self) {
        match self.ticker.take() {
            Some(ticker) => {
                if let Err(e) = ticker.await {
                    warn!(chat_id = %self.chat_id, "Progress ticker ended abnormally: {}", e);
                }
            }
            None => self.edit(messages::PROGRESS_DONE).await,
        }
    }

    /// Generation failed: stop ticking and mark the message as failed.
    ///
    /// The ticker is joined first so no tick edit can land after the failure mark.
    pub async fn fail(mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            // Cancelled is the expected outcome here.
            let _ = ticker.await;
        }
        self.edit(messages::PROGRESS_FAILED).await;
    }

    async fn edit(&self, text: &str) {
        if let Err(e) = self.transport.edit_message(self.chat_id, self.handle, text).await {
            warn!(chat_id = %self.chat_id, "Failed to update progress message: {}", e);
        }
    }
}

async fn run_ticker(
    transport: Arc<dyn ChatTransport>,
    chat_id: ChatId,
    handle: MessageHandle,
    interval: Duration,
) {
    for i in 0..TICK_COUNT {
        tokio::time::sleep(interval).await;
        let text = messages::progress_tick(i * 10);
        if let Err(e) = transport.edit_message(chat_id, handle, &text).await {
            warn!(chat_id = %chat_id, tick = i, "Progress tick failed: {}", e);
        }
    }
}
