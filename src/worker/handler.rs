//! Spawning and running summarization jobs.
//!
//! Jobs run on their own tokio tasks so the dialogue keeps handling events while a
//! model call is in progress. Two limits apply:
//! - at most one job per chat at a time (see [`SummaryWorker::try_spawn`]);
//! - at most `max_concurrent` model calls overall; extra jobs wait for a permit.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::deliver::{deliver_error, deliver_summary};
use super::progress::{DEFAULT_TICK_INTERVAL, ProgressMode, ProgressReporter};
use super::summarize::summarize_text;
use crate::ai::SummarizationModel;
use crate::core::models::{ChatId, SummaryRequest};
use crate::dialogue::controller::re_prompt;
use crate::errors::BotError;
use crate::transport::ChatTransport;

/// Result of one job, handed back through its `JoinHandle`.
#[derive(Debug)]
pub struct JobReport {
    pub correlation_id: String,
    pub chat_id: ChatId,
    pub outcome: Result<(), BotError>,
}

/// Removes the chat from the in-flight set when the job ends, however it ends.
struct InFlightGuard {
    in_flight: Arc<DashSet<ChatId>>,
    chat_id: ChatId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.chat_id);
    }
}

#[derive(Clone)]
pub struct SummaryWorker {
    transport: Arc<dyn ChatTransport>,
    model: Arc<dyn SummarizationModel>,
    progress_mode: ProgressMode,
    tick_interval: Duration,
    in_flight: Arc<DashSet<ChatId>>,
    permits: Arc<Semaphore>,
}

impl SummaryWorker {
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        model: Arc<dyn SummarizationModel>,
        progress_mode: ProgressMode,
        max_concurrent: usize,
    ) -> Self {
        Self {
            transport,
            model,
            progress_mode,
            tick_interval: DEFAULT_TICK_INTERVAL,
            in_flight: Arc::new(DashSet::new()),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn is_busy(&self, chat_id: ChatId) -> bool {
        self.in_flight.contains(&chat_id)
    }

    /// Launch a job unless the chat already has one running.
    ///
    /// Returns `None` when the chat is busy; the request is dropped, not queued.
    #[must_use]
    pub fn try_spawn(&self, request: SummaryRequest) -> Option<JoinHandle<JobReport>> {
        if !self.in_flight.insert(request.chat_id) {
            return None;
        }
        let guard = InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            chat_id: request.chat_id,
        };

        let worker = self.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            worker.run_job(request).await
        }))
    }

    async fn run_job(&self, request: SummaryRequest) -> JobReport {
        let delivered = match self.permits.acquire().await {
            Ok(_permit) => {
                info!(
                    "Starting summary for chat {} with length {:?} (corr_id={})",
                    request.chat_id, request.length, request.correlation_id
                );
                self.summarize_and_deliver(&request).await
            }
            Err(e) => Err(BotError::GeneralError(format!("worker pool closed: {e}"))),
        };

        if let Err(e) = &delivered {
            error!(
                "Failed to summarize for chat {}: {} (corr_id={})",
                request.chat_id, e, request.correlation_id
            );
            deliver_error(self.transport.as_ref(), request.chat_id, &request.correlation_id)
                .await;
        }

        let reprompted = re_prompt(self.transport.as_ref(), request.chat_id).await;
        if let Err(e) = &reprompted {
            error!(
                "Failed to re-prompt chat {}: {} (corr_id={})",
                request.chat_id, e, request.correlation_id
            );
        }

        JobReport {
            correlation_id: request.correlation_id,
            chat_id: request.chat_id,
            outcome: delivered.and(reprompted),
        }
    }

    async fn summarize_and_deliver(&self, request: &SummaryRequest) -> Result<(), BotError> {
        let progress = ProgressReporter::start(
            Arc::clone(&self.transport),
            request.chat_id,
            self.progress_mode,
            self.tick_interval,
        )
        .await?;

        match summarize_text(self.model.as_ref(), &request.text, request.length).await {
            Ok(summary) => {
                progress.finish().await;
                deliver_summary(
                    self.transport.as_ref(),
                    request.chat_id,
                    &summary,
                    &request.correlation_id,
                )
                .await
            }
            Err(e) => {
                progress.fail().await;
                Err(e)
            }
        }
    }
}
