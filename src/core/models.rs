use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message previously sent by the bot, used for in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(pub i64);

/// Summary length preference selected per chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    pub const ALL: [SummaryLength; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Button label shown on the reply keyboard. Also the text the client sends back.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
        }
    }

    /// Minimum output length (in tokens) requested from the model.
    #[must_use]
    pub const fn min_length(self) -> u32 {
        match self {
            Self::Short => 20,
            Self::Medium => 50,
            Self::Long => 100,
        }
    }

    /// Exact label match; anything else is not a selection.
    #[must_use]
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|len| len.label() == text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse a bot command, stripping the leading slash and an optional `@botname` suffix.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            _ => Self::Unknown(name),
        })
    }
}

/// Events delivered by the transport, already reduced to what the dialogue cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        chat_id: ChatId,
        command: Command,
    },
    Callback {
        chat_id: ChatId,
        callback_id: String,
        data: String,
    },
    Text {
        chat_id: ChatId,
        text: String,
    },
}

impl InboundEvent {
    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Command { chat_id, .. }
            | Self::Callback { chat_id, .. }
            | Self::Text { chat_id, .. } => *chat_id,
        }
    }
}

/// One summarization job. The length is captured when the job is launched.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub correlation_id: String,
    pub chat_id: ChatId,
    pub text: String,
    pub length: SummaryLength,
}

impl SummaryRequest {
    #[must_use]
    pub fn new(chat_id: ChatId, text: String, length: SummaryLength) -> Self {
        Self {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            chat_id,
            text,
            length,
        }
    }
}
