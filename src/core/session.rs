//! Per-chat summary length preferences.
//!
//! The store is process-local and lives as long as the bot does. It is cheap to clone;
//! clones share the same underlying map.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::models::{ChatId, SummaryLength};

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<ChatId, SummaryLength>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chat's preference, replacing any earlier one.
    pub fn set_length(&self, chat_id: ChatId, length: SummaryLength) {
        let previous = self.inner.insert(chat_id, length);
        debug!(chat_id = %chat_id, ?previous, ?length, "Summary length stored");
    }

    #[must_use]
    pub fn length(&self, chat_id: ChatId) -> Option<SummaryLength> {
        self.inner.get(&chat_id).map(|entry| *entry.value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
