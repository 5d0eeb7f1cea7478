//! Request-level entry points.
//!
//! [`Insights`] ties a message source, the contact cache, and analytics
//! settings together. Each call fetches a fresh window and recomputes; only
//! the contact directory is reused across calls.

use crate::analytics::{compute_conversation_stats, compute_global_stats, ChatDetails, GlobalStats};
use crate::config::AnalyticsConfig;
use crate::contacts::{ContactCache, ContactResolver};
use crate::error::Result;
use crate::lookup::fetch_conversation;
use crate::source::{MessageFilter, MessageSource};
use std::sync::Arc;

/// Analytics service over one message source.
#[derive(Clone)]
pub struct Insights {
    source: Arc<dyn MessageSource>,
    contacts: Arc<ContactCache>,
    config: AnalyticsConfig,
}

impl Insights {
    pub fn new(
        source: Arc<dyn MessageSource>,
        contacts: Arc<ContactCache>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            source,
            contacts,
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Resolver over the shared contact directory, loading it on first use.
    pub async fn resolver(&self) -> ContactResolver {
        self.contacts.resolver().await
    }

    /// Statistics over the most recent messages across all conversations.
    ///
    /// A non-blank `query` limits the window to messages containing it
    /// (case-insensitive). The recent chat list is never filtered.
    pub async fn get_global_stats(&self, query: Option<&str>) -> Result<GlobalStats> {
        let resolver = self.contacts.resolver().await;

        let filter = MessageFilter::window(self.config.global_window).with_search(query);
        let (page, chats) = tokio::try_join!(
            self.source.fetch_messages(&filter),
            self.source.list_chats()
        )?;

        tracing::info!(
            source = self.source.name(),
            messages = page.total,
            chats = chats.len(),
            search = filter.search.as_deref().unwrap_or(""),
            "Computing global stats"
        );

        Ok(compute_global_stats(&page, &chats, &resolver, &self.config))
    }

    /// History and statistics for one conversation.
    ///
    /// Identifiers that match nothing produce empty details, not an error.
    pub async fn get_chat_details(&self, chat_id: &str) -> Result<ChatDetails> {
        let limit = self.config.conversation_window;
        let lookup = fetch_conversation(self.source.as_ref(), chat_id, limit).await?;

        tracing::info!(
            chat_id,
            messages = lookup.page.total,
            matched = lookup.matched.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            "Computing conversation stats"
        );

        Ok(compute_conversation_stats(lookup.page.messages, &self.config))
    }
}
