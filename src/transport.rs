//! The chat operations the dialogue and the worker rely on.

use async_trait::async_trait;

use crate::core::models::{ChatId, MessageHandle};
use crate::errors::BotError;
use crate::telegram::keyboard::ReplyMarkup;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message, optionally with a keyboard attached.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageHandle, BotError>;

    /// Replace the text of a message the bot sent earlier.
    async fn edit_message(
        &self,
        chat_id: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), BotError>;

    /// Acknowledge a button press so the client stops showing a spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError>;
}
