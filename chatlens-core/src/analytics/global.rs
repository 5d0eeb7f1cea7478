//! Whole-log statistics: volume, top conversations, monthly history, and
//! recent chats with resolved names.

use super::tally::Tally;
use crate::config::AnalyticsConfig;
use crate::contacts::ContactResolver;
use crate::source::MessagePage;
use crate::types::{chat_handle, Chat};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A frequently messaged conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopContact {
    /// Chat identifier, or sender handle for messages without a chat
    pub id: String,
    /// Chat name, contact name, or the raw id
    pub name: String,
    /// Messages in the window
    pub count: usize,
}

/// Sent/received counts for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActivity {
    /// `YYYY-MM` (UTC)
    pub month: String,
    pub sent: usize,
    pub received: usize,
}

impl MonthlyActivity {
    pub fn total(&self) -> usize {
        self.sent + self.received
    }
}

/// A chat from the recent list with its display name filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChat {
    pub chat_id: String,
    /// Explicit chat name, resolved contact name, or the raw chat id
    pub display_name: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub is_group: bool,
}

/// Statistics over the global message window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    /// Size of the analyzed window
    pub total_messages: usize,
    pub sent: usize,
    pub received: usize,
    pub top_contacts: Vec<TopContact>,
    /// Ascending by month
    pub history: Vec<MonthlyActivity>,
    pub recent_chats: Vec<RecentChat>,
}

impl GlobalStats {
    /// Percentage of messages sent by the local user (0.0 when empty).
    pub fn sent_percentage(&self) -> f64 {
        percentage(self.sent, self.sent + self.received)
    }

    pub fn received_percentage(&self) -> f64 {
        percentage(self.received, self.sent + self.received)
    }

    /// Month with the most messages. Earliest month wins ties.
    pub fn busiest_month(&self) -> Option<&MonthlyActivity> {
        self.history
            .iter()
            .reduce(|best, m| if m.total() > best.total() { m } else { best })
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Name for a top-conversation id.
///
/// An explicit chat name wins. Otherwise ids that look like phone numbers
/// (contain `+`) go through the resolver.
fn top_contact_name(id: &str, chat: Option<&Chat>, resolver: &ContactResolver) -> String {
    if let Some(name) = chat.and_then(Chat::explicit_name) {
        return name.to_string();
    }
    if id.contains('+') {
        if let Some(name) = resolver.resolve(id) {
            return name.to_string();
        }
    }
    id.to_string()
}

fn recent_chat(chat: &Chat, resolver: &ContactResolver) -> RecentChat {
    let display_name = match chat.explicit_name() {
        Some(name) => name.to_string(),
        None => resolver
            .resolve(chat_handle(&chat.chat_id))
            .unwrap_or(chat.chat_id.as_str())
            .to_string(),
    };

    RecentChat {
        chat_id: chat.chat_id.clone(),
        display_name,
        last_message_at: chat.last_message_at,
        is_group: chat.is_group,
    }
}

/// Compute global statistics.
///
/// `page` is the newest-first message window and `chats` the full chat list,
/// most recent first. Pure: every call recomputes from its inputs.
pub fn compute_global_stats(
    page: &MessagePage,
    chats: &[Chat],
    resolver: &ContactResolver,
    config: &AnalyticsConfig,
) -> GlobalStats {
    let messages = &page.messages;
    let sent = messages.iter().filter(|m| m.is_from_me).count();
    let received = messages.len() - sent;

    let mut conversations = Tally::new();
    let mut months: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for message in messages {
        conversations.add(message.conversation_key());

        let bucket = months
            .entry(message.date.format("%Y-%m").to_string())
            .or_default();
        if message.is_from_me {
            bucket.0 += 1;
        } else {
            bucket.1 += 1;
        }
    }

    let chats_by_id: HashMap<&str, &Chat> =
        chats.iter().map(|c| (c.chat_id.as_str(), c)).collect();

    let top_contacts = conversations
        .top(config.top_contacts)
        .into_iter()
        .map(|(id, count)| {
            let name = top_contact_name(&id, chats_by_id.get(id.as_str()).copied(), resolver);
            TopContact { id, name, count }
        })
        .collect();

    let history = months
        .into_iter()
        .map(|(month, (sent, received))| MonthlyActivity {
            month,
            sent,
            received,
        })
        .collect();

    let recent_chats = chats
        .iter()
        .take(config.recent_chats)
        .map(|chat| recent_chat(chat, resolver))
        .collect();

    GlobalStats {
        total_messages: page.total,
        sent,
        received,
        top_contacts,
        history,
        recent_chats,
    }
}
