use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::info;

use tldr_bot::ai::{ModelServiceClient, SummarizationModel};
use tldr_bot::core::{SessionStore, config::AppConfig};
use tldr_bot::dialogue::DialogueController;
use tldr_bot::poller::Poller;
use tldr_bot::telegram::TelegramClient;
use tldr_bot::transport::ChatTransport;
use tldr_bot::worker::SummaryWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tldr_bot::setup_logging();

    let config = AppConfig::from_env_file(None).map_err(|e| anyhow!("Config error: {}", e))?;

    let telegram = Arc::new(TelegramClient::new(config.telegram_bot_token.clone()));
    let me = telegram
        .get_me()
        .await
        .context("Failed to verify Telegram bot token")?;
    info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or("<none>"),
        model = %config.model_name,
        progress_mode = ?config.progress_mode,
        "Bot authenticated"
    );

    let transport: Arc<dyn ChatTransport> = telegram.clone();
    let model: Arc<dyn SummarizationModel> = Arc::new(ModelServiceClient::from_config(&config));
    let worker = SummaryWorker::new(
        Arc::clone(&transport),
        model,
        config.progress_mode,
        config.max_concurrent_summaries,
    );
    let controller = Arc::new(DialogueController::new(
        transport,
        SessionStore::new(),
        worker,
        config.model_name.clone(),
    ));

    let poller = Poller::new(
        telegram,
        controller,
        config.poll_timeout_secs,
        config.poll_retry_delay,
    );

    tokio::select! {
        () = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
