//! Core domain types for chatlens
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Chat identifier** | Opaque string naming a conversation, possibly service-qualified (`service;handle`) |
//! | **Handle** | The bare address after the last service delimiter (`+15551234567`, `me@example.com`) |
//! | **Initiation** | A message that starts a new conversational burst |
//! | **Window** | A capped, newest-first slice of the message log fetched per request |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between a service qualifier and the handle in chat identifiers.
pub const SERVICE_DELIMITER: char = ';';

/// Returns the handle portion of a chat identifier.
///
/// `"iMessage;-;+15551234567"` yields `"+15551234567"`; identifiers without a
/// delimiter are returned whole.
pub fn chat_handle(chat_id: &str) -> &str {
    match chat_id.rfind(SERVICE_DELIMITER) {
        Some(pos) => &chat_id[pos + SERVICE_DELIMITER.len_utf8()..],
        None => chat_id,
    }
}

/// True if the identifier carries a service qualifier.
pub fn is_service_qualified(chat_id: &str) -> bool {
    chat_id.contains(SERVICE_DELIMITER)
}

// ============================================
// Message
// ============================================

/// A single message from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Source row identifier
    pub id: i64,
    /// Conversation this message belongs to, if the source knows it
    pub chat_id: Option<String>,
    /// Sender handle (empty for self-authored messages on some sources)
    pub sender: String,
    /// Plain text body
    pub text: Option<String>,
    /// When the message was sent
    pub date: DateTime<Utc>,
    /// Authored by the local user
    pub is_from_me: bool,
}

impl Message {
    /// Key used to group messages into conversations: chat id, else sender.
    pub fn conversation_key(&self) -> &str {
        match self.chat_id.as_deref() {
            Some(chat_id) if !chat_id.is_empty() => chat_id,
            _ => &self.sender,
        }
    }

    /// Text body if present and not blank.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

// ============================================
// Chat
// ============================================

/// Conversation metadata from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Chat identifier, possibly service-qualified
    pub chat_id: String,
    /// Explicit name (group chats, renamed conversations)
    pub display_name: Option<String>,
    /// Most recent message timestamp
    pub last_message_at: Option<DateTime<Utc>>,
    /// More than one other participant
    pub is_group: bool,
}

impl Chat {
    /// Display name if set and not blank.
    pub fn explicit_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Handle portion of this chat's identifier.
    pub fn handle(&self) -> &str {
        chat_handle(&self.chat_id)
    }
}
