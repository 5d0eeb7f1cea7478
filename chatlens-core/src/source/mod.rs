//! Message log sources.
//!
//! The analytics engine never reads storage directly. It asks a
//! [`MessageSource`] for a bounded, newest-first window of messages and for
//! the chat list, then computes everything in memory.
//!
//! - [`ChatDb`]: the macOS Messages database (`chat.db`), read-only
//! - [`MemorySource`]: fixed data for tests and demos

mod attributed_body;
mod chat_db;
mod memory;

pub use chat_db::ChatDb;
pub use memory::MemorySource;

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Message query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    /// Only messages in this chat (matches a full or bare chat identifier)
    pub chat_id: Option<String>,
    /// Only messages from this sender handle
    pub sender: Option<String>,
    /// Only messages whose text contains this, case-insensitively
    pub search: Option<String>,
    /// Maximum number of messages returned
    pub limit: usize,
    /// Include messages authored by the local user
    pub include_own_messages: bool,
}

impl MessageFilter {
    /// Everything, newest first, up to `limit`.
    pub fn window(limit: usize) -> Self {
        Self {
            chat_id: None,
            sender: None,
            search: None,
            limit,
            include_own_messages: true,
        }
    }

    pub fn chat(chat_id: impl Into<String>, limit: usize) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            ..Self::window(limit)
        }
    }

    pub fn sender(sender: impl Into<String>, limit: usize) -> Self {
        Self {
            sender: Some(sender.into()),
            ..Self::window(limit)
        }
    }

    /// Restrict to messages containing `query`; blank queries are ignored.
    pub fn with_search(mut self, query: Option<&str>) -> Self {
        self.search = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self
    }

    /// True if `message` satisfies every predicate except the limit.
    pub fn matches(&self, message: &Message) -> bool {
        if !self.include_own_messages && message.is_from_me {
            return false;
        }
        if let Some(chat_id) = &self.chat_id {
            if message.chat_id.as_deref() != Some(chat_id.as_str()) {
                return false;
            }
        }
        if let Some(sender) = &self.sender {
            if &message.sender != sender {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            match message.text.as_deref() {
                Some(text) if text.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }
        true
    }
}

/// A window of messages, newest first.
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    /// Messages ordered newest first
    pub messages: Vec<Message>,
    /// Number of messages in the window
    pub total: usize,
}

impl MessagePage {
    pub fn new(messages: Vec<Message>) -> Self {
        let total = messages.len();
        Self { messages, total }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Read access to a message log.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Messages matching `filter`, newest first, at most `filter.limit`.
    async fn fetch_messages(&self, filter: &MessageFilter) -> Result<MessagePage>;

    /// All chats, most recently active first.
    async fn list_chats(&self) -> Result<Vec<Chat>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(
        chat_id: Option<&str>,
        sender: &str,
        text: Option<&str>,
        is_from_me: bool,
    ) -> Message {
        Message {
            id: 1,
            chat_id: chat_id.map(str::to_string),
            sender: sender.to_string(),
            text: text.map(str::to_string),
            date: Utc::now(),
            is_from_me,
        }
    }

    #[test]
    fn test_filter_matches() {
        let msg = message(Some("chat1"), "+1555", Some("Dinner Tonight?"), false);

        assert!(MessageFilter::window(10).matches(&msg));
        assert!(MessageFilter::chat("chat1", 10).matches(&msg));
        assert!(!MessageFilter::chat("chat2", 10).matches(&msg));
        assert!(MessageFilter::sender("+1555", 10).matches(&msg));
        assert!(!MessageFilter::sender("+1666", 10).matches(&msg));
        assert!(MessageFilter::window(10)
            .with_search(Some("dinner"))
            .matches(&msg));
        assert!(!MessageFilter::window(10)
            .with_search(Some("lunch"))
            .matches(&msg));
    }

    #[test]
    fn test_filter_own_messages() {
        let mine = message(None, "", Some("hi"), true);
        let mut filter = MessageFilter::window(10);
        assert!(filter.matches(&mine));
        filter.include_own_messages = false;
        assert!(!filter.matches(&mine));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = MessageFilter::window(10).with_search(Some("   "));
        assert_eq!(filter.search, None);
        let no_text = message(None, "a", None, false);
        assert!(filter.matches(&no_text));
    }
}
