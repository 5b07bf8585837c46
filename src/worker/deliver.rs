use tracing::{error, info};

use super::CANONICAL_FAILURE_MESSAGE;
use crate::core::models::ChatId;
use crate::dialogue::messages;
use crate::errors::BotError;
use crate::telegram::MESSAGE_TEXT_LIMIT;
use crate::transport::ChatTransport;
use crate::utils::split_message;

/// Send the summary as one or more new messages to the originating chat.
///
/// # Errors
///
/// Returns the first transport error; later chunks are not attempted.
pub async fn deliver_summary(
    transport: &dyn ChatTransport,
    chat_id: ChatId,
    summary: &str,
    correlation_id: &str,
) -> Result<(), BotError> {
    let chunks = split_message(summary, MESSAGE_TEXT_LIMIT);
    if chunks.is_empty() {
        info!(
            "Model returned an empty summary for chat {} (corr_id={})",
            chat_id, correlation_id
        );
        transport
            .send_message(chat_id, messages::EMPTY_SUMMARY, None)
            .await?;
        return Ok(());
    }

    info!(
        "Delivering summary to chat {} in {} message(s) (corr_id={})",
        chat_id,
        chunks.len(),
        correlation_id
    );
    for chunk in &chunks {
        transport.send_message(chat_id, chunk, None).await?;
    }
    Ok(())
}

/// Tell the user the request failed. Delivery problems here are logged, not returned:
/// there is nobody left to report them to.
pub async fn deliver_error(transport: &dyn ChatTransport, chat_id: ChatId, correlation_id: &str) {
    if let Err(e) = transport
        .send_message(chat_id, CANONICAL_FAILURE_MESSAGE, None)
        .await
    {
        error!(
            "Failed to send failure notice to chat {}: {} (corr_id={})",
            chat_id, e, correlation_id
        );
    }
}
