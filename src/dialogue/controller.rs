//! Event dispatch for the summarization dialogue.
//!
//! The conversation nominally goes `/start` → Begin → Continue → length → text, but
//! the order is not enforced: the only state kept per chat is the length preference,
//! and any text is summarized once a preference exists.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::messages;
use crate::core::SessionStore;
use crate::core::models::{ChatId, Command, InboundEvent, SummaryLength, SummaryRequest};
use crate::errors::BotError;
use crate::telegram::keyboard::{
    BEGIN_CALLBACK, CONTINUE_CALLBACK, begin_button, continue_button, length_selector,
    remove_keyboard,
};
use crate::transport::ChatTransport;
use crate::worker::{JobReport, SummaryWorker};

/// What happened to an inbound event.
#[derive(Debug)]
pub enum Dispatch {
    /// The bot answered (or updated state) and is done with the event.
    Replied,
    /// The event was recognised as irrelevant and dropped.
    Ignored,
    /// The chat already has a summary in progress; the text was turned away.
    Busy,
    /// A summarization job was launched.
    Summarizing(JoinHandle<JobReport>),
}

/// Send the length selector again so another round can start without `/start`.
///
/// # Errors
///
/// Returns an error if the message cannot be sent.
pub async fn re_prompt(transport: &dyn ChatTransport, chat_id: ChatId) -> Result<(), BotError> {
    transport
        .send_message(
            chat_id,
            messages::ANOTHER_ROUND_PROMPT,
            Some(&length_selector()),
        )
        .await?;
    Ok(())
}

pub struct DialogueController {
    transport: Arc<dyn ChatTransport>,
    sessions: SessionStore,
    worker: SummaryWorker,
    model_name: String,
}

impl DialogueController {
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        sessions: SessionStore,
        worker: SummaryWorker,
        model_name: String,
    ) -> Self {
        Self {
            transport,
            sessions,
            worker,
            model_name,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Route one inbound event to its handler.
    ///
    /// # Errors
    ///
    /// Transport failures while replying are returned to the caller.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<Dispatch, BotError> {
        match event {
            InboundEvent::Command { chat_id, command } => match command {
                Command::Start => self.on_start(chat_id).await,
                Command::Help => self.on_begin_chosen(chat_id).await,
                Command::Unknown(name) => {
                    debug!(chat_id = %chat_id, command = %name, "Ignoring unknown command");
                    Ok(Dispatch::Ignored)
                }
            },
            InboundEvent::Callback {
                chat_id,
                callback_id,
                data,
            } => {
                if let Err(e) = self.transport.answer_callback(&callback_id).await {
                    warn!(chat_id = %chat_id, "Failed to answer callback query: {}", e);
                }
                match data.as_str() {
                    BEGIN_CALLBACK => self.on_begin_chosen(chat_id).await,
                    CONTINUE_CALLBACK => self.on_continue_chosen(chat_id).await,
                    other => {
                        debug!(chat_id = %chat_id, data = other, "Ignoring unknown callback");
                        Ok(Dispatch::Ignored)
                    }
                }
            }
            InboundEvent::Text { chat_id, text } => match SummaryLength::from_label(&text) {
                Some(length) => self.on_length_chosen(chat_id, length).await,
                None => self.on_text(chat_id, text).await,
            },
        }
    }

    /// Welcome message with a single "Begin" button.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn on_start(&self, chat_id: ChatId) -> Result<Dispatch, BotError> {
        info!(chat_id = %chat_id, "Start requested");
        self.transport
            .send_message(
                chat_id,
                &messages::welcome(&self.model_name),
                Some(&begin_button()),
            )
            .await?;
        Ok(Dispatch::Replied)
    }

    /// Usage instructions with a single "Continue" button.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn on_begin_chosen(&self, chat_id: ChatId) -> Result<Dispatch, BotError> {
        self.transport
            .send_message(chat_id, &messages::instructions(), Some(&continue_button()))
            .await?;
        Ok(Dispatch::Replied)
    }

    /// Present the three-way length selector.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be sent.
    pub async fn on_continue_chosen(&self, chat_id: ChatId) -> Result<Dispatch, BotError> {
        self.transport
            .send_message(chat_id, messages::LENGTH_PROMPT, Some(&length_selector()))
            .await?;
        Ok(Dispatch::Replied)
    }

    /// Store the chat's preference, confirm it, and hide the selector.
    ///
    /// # Errors
    ///
    /// Returns an error if the confirmation cannot be sent. The preference is stored
    /// either way.
    pub async fn on_length_chosen(
        &self,
        chat_id: ChatId,
        length: SummaryLength,
    ) -> Result<Dispatch, BotError> {
        self.sessions.set_length(chat_id, length);
        info!(chat_id = %chat_id, length = length.label(), "Summary length selected");
        self.transport
            .send_message(
                chat_id,
                &messages::length_confirmation(length),
                Some(&remove_keyboard()),
            )
            .await?;
        Ok(Dispatch::Replied)
    }

    /// Summarize `text` for a chat that has chosen a length; otherwise ask it to choose.
    ///
    /// # Errors
    ///
    /// Returns an error if a reply cannot be sent. Failures of the summarization itself
    /// are reported through the job's [`JobReport`].
    pub async fn on_text(&self, chat_id: ChatId, text: String) -> Result<Dispatch, BotError> {
        let Some(length) = self.sessions.length(chat_id) else {
            self.transport
                .send_message(chat_id, messages::GUIDANCE_CHOOSE_LENGTH, None)
                .await?;
            return Ok(Dispatch::Replied);
        };

        if self.worker.is_busy(chat_id) {
            self.transport
                .send_message(chat_id, messages::STILL_WORKING, None)
                .await?;
            return Ok(Dispatch::Busy);
        }

        self.transport
            .send_message(chat_id, messages::ANALYZING, None)
            .await?;

        let request = SummaryRequest::new(chat_id, text, length);
        let correlation_id = request.correlation_id.clone();
        match self.worker.try_spawn(request) {
            Some(job) => {
                info!(chat_id = %chat_id, corr_id = %correlation_id, "Summary job launched");
                Ok(Dispatch::Summarizing(job))
            }
            None => {
                self.transport
                    .send_message(chat_id, messages::STILL_WORKING, None)
                    .await?;
                Ok(Dispatch::Busy)
            }
        }
    }
}
