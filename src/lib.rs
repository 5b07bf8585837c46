//! TLDR bot - a Telegram chatbot that writes abstractive summaries of the texts users send.
//!
//! The bot walks each chat through a short onboarding (`/start` → Begin → Continue),
//! lets it pick a summary length, and then summarizes every text it receives with a
//! pretrained sequence-to-sequence model served over HTTP.
//!
//! # Architecture
//!
//! The system uses:
//! - a long-polling loop over the Telegram Bot API (`poller`)
//! - a dialogue controller that routes commands, buttons and texts (`dialogue`)
//! - a worker that runs each summarization on its own tokio task (`worker`)
//! - reqwest for both the Telegram and the model-service HTTP APIs
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tldr_bot::ai::{ModelServiceClient, SummarizationModel};
//! use tldr_bot::core::{SessionStore, config::AppConfig};
//! use tldr_bot::dialogue::DialogueController;
//! use tldr_bot::poller::Poller;
//! use tldr_bot::telegram::TelegramClient;
//! use tldr_bot::transport::ChatTransport;
//! use tldr_bot::worker::SummaryWorker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tldr_bot::setup_logging();
//!     let config = AppConfig::from_env()?;
//!
//!     let telegram = Arc::new(TelegramClient::new(config.telegram_bot_token.clone()));
//!     let transport: Arc<dyn ChatTransport> = telegram.clone();
//!     let model: Arc<dyn SummarizationModel> = Arc::new(ModelServiceClient::from_config(&config));
//!
//!     let worker = SummaryWorker::new(
//!         transport.clone(),
//!         model,
//!         config.progress_mode,
//!         config.max_concurrent_summaries,
//!     );
//!     let controller = Arc::new(DialogueController::new(
//!         transport,
//!         SessionStore::new(),
//!         worker,
//!         config.model_name.clone(),
//!     ));
//!
//!     Poller::new(telegram, controller, config.poll_timeout_secs, config.poll_retry_delay)
//!         .run()
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod core;
pub mod dialogue;
pub mod errors;
pub mod poller;
pub mod telegram;
pub mod transport;
pub mod utils;
pub mod worker;

pub use errors::BotError;

/// Configure structured JSON logging.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more than once
/// is harmless; only the first call installs a subscriber.
///
/// # Example
///
/// ```
/// tldr_bot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
