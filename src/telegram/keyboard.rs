//! Reply markup builders for the dialogue's buttons and selectors.

use serde::Serialize;

use crate::core::models::SummaryLength;

/// Callback payload of the "Begin" button under the welcome message.
pub const BEGIN_CALLBACK: &str = "begin";
/// Callback payload of the "Continue" button under the usage instructions.
pub const CONTINUE_CALLBACK: &str = "continue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

/// Telegram `reply_markup` variants used by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    InlineKeyboard {
        inline_keyboard: Vec<Vec<InlineButton>>,
    },
    ReplyKeyboard {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
    },
    RemoveKeyboard {
        remove_keyboard: bool,
    },
}

impl ReplyMarkup {
    #[must_use]
    pub fn single_inline_button(text: &str, callback_data: &str) -> Self {
        Self::InlineKeyboard {
            inline_keyboard: vec![vec![InlineButton {
                text: text.to_string(),
                callback_data: callback_data.to_string(),
            }]],
        }
    }

    /// Labels of every button on a reply keyboard, in row order.
    #[must_use]
    pub fn reply_labels(&self) -> Vec<&str> {
        match self {
            Self::ReplyKeyboard { keyboard, .. } => keyboard
                .iter()
                .flatten()
                .map(|button| button.text.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[must_use]
pub fn begin_button() -> ReplyMarkup {
    ReplyMarkup::single_inline_button("Begin", BEGIN_CALLBACK)
}

#[must_use]
pub fn continue_button() -> ReplyMarkup {
    ReplyMarkup::single_inline_button("Continue", CONTINUE_CALLBACK)
}

/// Persistent three-way selector: one row, one button per length.
#[must_use]
pub fn length_selector() -> ReplyMarkup {
    ReplyMarkup::ReplyKeyboard {
        keyboard: vec![
            SummaryLength::ALL
                .iter()
                .map(|len| KeyboardButton {
                    text: len.label().to_string(),
                })
                .collect(),
        ],
        resize_keyboard: true,
    }
}

#[must_use]
pub fn remove_keyboard() -> ReplyMarkup {
    ReplyMarkup::RemoveKeyboard {
        remove_keyboard: true,
    }
}
