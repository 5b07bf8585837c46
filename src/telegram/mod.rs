//! All Telegram-specific functionality

pub mod client;
pub mod keyboard;
pub mod update;

// Re-export main types for convenience
pub use client::{MESSAGE_TEXT_LIMIT, TelegramClient};
pub use keyboard::ReplyMarkup;
pub use update::{ParsedUpdate, parse_update};
