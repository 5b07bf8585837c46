//! Reduce raw Telegram `Update` objects to [`InboundEvent`]s.
//!
//! Updates are kept as `serde_json::Value` until this point so a single odd update
//! (a sticker, an edited message, a new update type) never fails a whole batch.

use serde_json::Value;

use crate::core::models::{ChatId, Command, InboundEvent};
use crate::errors::BotError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpdate {
    pub update_id: i64,
    /// `None` for updates the bot does not react to.
    pub event: Option<InboundEvent>,
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn v_i64(root: &Value, path: &[&str]) -> Option<i64> {
    v_path(root, path).and_then(Value::as_i64)
}

/// # Errors
///
/// Returns `ParseError` when the update has no numeric `update_id`; without it the
/// poll offset cannot advance past the update.
pub fn parse_update(update: &Value) -> Result<ParsedUpdate, BotError> {
    let update_id = v_i64(update, &["update_id"])
        .ok_or_else(|| BotError::ParseError("update without update_id".to_string()))?;

    let event = parse_message(update).or_else(|| parse_callback(update));

    Ok(ParsedUpdate { update_id, event })
}

fn parse_message(update: &Value) -> Option<InboundEvent> {
    let message = update.get("message")?;
    let chat_id = ChatId(v_i64(message, &["chat", "id"])?);
    let text = v_str(message, &["text"])?;

    if let Some(command) = Command::parse(text) {
        return Some(InboundEvent::Command { chat_id, command });
    }

    Some(InboundEvent::Text {
        chat_id,
        text: text.to_string(),
    })
}

fn parse_callback(update: &Value) -> Option<InboundEvent> {
    let query = update.get("callback_query")?;
    let callback_id = v_str(query, &["id"])?;
    let chat_id = ChatId(v_i64(query, &["message", "chat", "id"])?);
    let data = v_str(query, &["data"]).unwrap_or_default();

    Some(InboundEvent::Callback {
        chat_id,
        callback_id: callback_id.to_string(),
        data: data.to_string(),
    })
}
