//! In-memory message source.

use super::{MessageFilter, MessagePage, MessageSource};
use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Holds a fixed set of messages and chats.
///
/// Filtering follows [`MessageFilter::matches`]; chat filters compare
/// against `Message::chat_id` exactly. Fetches are counted so tests can
/// assert how many queries a request issued.
#[derive(Debug, Default)]
pub struct MemorySource {
    messages: Vec<Message>,
    chats: Vec<Chat>,
    fetches: AtomicUsize,
}

impl MemorySource {
    /// Messages may be in any order; fetches return them newest first.
    /// Chats are sorted by last activity, most recent first.
    pub fn new(mut messages: Vec<Message>, mut chats: Vec<Chat>) -> Self {
        messages.sort_by(|a, b| b.date.cmp(&a.date));
        chats.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Self {
            messages,
            chats,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_messages` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_messages(&self, filter: &MessageFilter) -> Result<MessagePage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let messages = self
            .messages
            .iter()
            .filter(|m| filter.matches(m))
            .take(filter.limit)
            .cloned()
            .collect();
        Ok(MessagePage::new(messages))
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        Ok(self.chats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_newest_first_and_limit() {
        let base = Utc::now();
        let messages = (0..5)
            .map(|i| Message {
                id: i,
                chat_id: Some("chat1".to_string()),
                sender: "+1555".to_string(),
                text: None,
                date: base + Duration::minutes(i),
                is_from_me: false,
            })
            .collect();
        let source = MemorySource::new(messages, vec![]);

        let page = source
            .fetch_messages(&MessageFilter::window(3))
            .await
            .unwrap();
        let ids: Vec<_> = page.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![4, 3, 2]);
        assert_eq!(page.total, 3);
        assert_eq!(source.fetch_count(), 1);
    }
}
