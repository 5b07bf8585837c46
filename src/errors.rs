use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to parse Telegram update: {0}")]
    ParseError(String),

    #[error("Failed to access Telegram API: {0}")]
    ApiError(String),

    #[error("Failed to access model service: {0}")]
    ModelError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("{0}")]
    GeneralError(String),

    /// Telegram answered with HTTP 429; `retry_after` is in seconds when provided.
    #[error("Telegram rate limit hit (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },
}

impl BotError {
    /// Whether a failed transport call is worth repeating.
    ///
    /// Network failures, rate limiting and Telegram-side 5xx responses are transient.
    /// Everything else (bad request, forbidden, parse errors) will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            BotError::HttpError(_) | BotError::RateLimited { .. } => true,
            BotError::ApiError(msg) => msg.starts_with("HTTP 5"),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::ParseError(error.to_string())
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::GeneralError(error.to_string())
    }
}
