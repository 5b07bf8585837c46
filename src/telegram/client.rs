//! Telegram Bot API client module
//!
//! Encapsulates all Bot API interactions with retry logic and error handling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::keyboard::ReplyMarkup;
use crate::core::models::{ChatId, MessageHandle};
use crate::errors::BotError;
use crate::transport::ChatTransport;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram's per-message text limit, in characters.
pub const MESSAGE_TEXT_LIMIT: usize = 4096;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time allowed on top of the long-poll timeout before the HTTP request gives up.
const LONG_POLL_SLACK: Duration = Duration::from_secs(10);

const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

const RETRY_ATTEMPTS: usize = 5;

const ERROR_MESSAGE_NOT_MODIFIED: &str = "message is not modified";

/// Flood-wait worth sleeping through in place; longer waits are not retried.
fn flood_wait(retry_after_secs: u64) -> Option<Duration> {
    let wait = Duration::from_secs(retry_after_secs);
    (wait <= MAX_RETRY_DELAY).then_some(wait)
}

fn should_retry(error: &BotError) -> bool {
    match error {
        BotError::RateLimited {
            retry_after: Some(secs),
        } => flood_wait(*secs).is_some(),
        other => other.is_retryable(),
    }
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub username: Option<String>,
}

/// Map a Bot API envelope to the result or a typed error.
///
/// # Errors
///
/// `RateLimited` for 429, `ApiError` for any other `ok: false`, `ParseError` when a
/// successful envelope has no `result`.
pub fn into_result<T>(status: u16, response: ApiResponse<T>) -> Result<T, BotError> {
    if response.ok {
        return response
            .result
            .ok_or_else(|| BotError::ParseError("response without result".to_string()));
    }

    let code = response.error_code.unwrap_or(status);
    if code == 429 {
        return Err(BotError::RateLimited {
            retry_after: response.parameters.and_then(|p| p.retry_after),
        });
    }

    Err(BotError::ApiError(format!(
        "HTTP {}: {}",
        code,
        response.description.as_deref().unwrap_or("unknown")
    )))
}

/// Telegram Bot API client with retry logic and error handling
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE)
    }

    /// Point the client at a different API host (a local Bot API server, or a test double).
    #[must_use]
    pub fn with_base_url(token: String, base_url: &str) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, BotError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, BotError>> + Send,
        T: Send,
    {
        // 100ms, 200ms, 400ms, ... capped, with jitter.
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(RETRY_ATTEMPTS);

        let mut attempt = 0;
        RetryIf::spawn(
            strategy,
            || {
                attempt += 1;
                let retries_left = attempt <= RETRY_ATTEMPTS;
                let call = operation();
                async move {
                    let result = call.await;
                    // Honour the flood-wait before the backoff delay kicks in.
                    if retries_left
                        && let Err(BotError::RateLimited {
                            retry_after: Some(secs),
                        }) = &result
                        && let Some(wait) = flood_wait(*secs)
                    {
                        warn!(retry_after = secs, "Rate limited by Telegram, waiting");
                        tokio::time::sleep(wait).await;
                    }
                    result
                }
            },
            should_retry,
        )
        .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<T, BotError> {
        // The URL embeds the token, so only the method name is ever logged.
        debug!(method, "Calling Telegram Bot API");
        let resp = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => into_result(status.as_u16(), envelope),
            Err(_) if !status.is_success() => Err(BotError::ApiError(format!(
                "HTTP {}: {} returned a non-JSON body",
                status.as_u16(),
                method
            ))),
            Err(e) => Err(BotError::ParseError(format!("{} response: {}", method, e))),
        }
    }

    /// Verify the token and fetch the bot's identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the API is unreachable.
    pub async fn get_me(&self) -> Result<BotUser, BotError> {
        self.with_retry(|| async { self.call("getMe", &json!({}), REQUEST_TIMEOUT).await })
            .await
    }

    /// Long-poll for updates. Updates come back raw; see [`super::update::parse_update`].
    ///
    /// Not retried here: the poller owns the backoff for retrieval failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Telegram reports an error.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Value>, BotError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        let timeout = Duration::from_secs(timeout_secs).saturating_add(LONG_POLL_SLACK);
        self.call("getUpdates", &payload, timeout).await
    }

    /// # Errors
    ///
    /// Returns an error if the Bot API call fails after retries.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageHandle, BotError> {
        let mut payload = json!({
            "chat_id": chat_id.0,
            "text": text,
        });
        if let Some(markup) = markup {
            payload["reply_markup"] = serde_json::to_value(markup)?;
        }

        let sent: SentMessage = self
            .with_retry(|| async { self.call("sendMessage", &payload, REQUEST_TIMEOUT).await })
            .await?;
        Ok(MessageHandle(sent.message_id))
    }

    /// Edit a message's text in place. Re-sending identical text is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the Bot API call fails after retries.
    pub async fn edit_message_text(
        &self,
        chat_id: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), BotError> {
        let payload = json!({
            "chat_id": chat_id.0,
            "message_id": handle.0,
            "text": text,
        });

        let result: Result<Value, BotError> = self
            .with_retry(|| async { self.call("editMessageText", &payload, REQUEST_TIMEOUT).await })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(BotError::ApiError(ref msg)) if msg.contains(ERROR_MESSAGE_NOT_MODIFIED) => {
                debug!(chat_id = %chat_id, message_id = handle.0, "Edit was a no-op");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the Bot API call fails after retries.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), BotError> {
        let payload = json!({ "callback_query_id": callback_query_id });
        let acknowledged: bool = self
            .with_retry(|| async {
                self.call("answerCallbackQuery", &payload, REQUEST_TIMEOUT)
                    .await
            })
            .await?;
        if !acknowledged {
            warn!(callback_query_id, "answerCallbackQuery returned false");
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageHandle, BotError> {
        TelegramClient::send_message(self, chat_id, text, markup).await
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), BotError> {
        self.edit_message_text(chat_id, handle, text).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        self.answer_callback_query(callback_id).await
    }
}
