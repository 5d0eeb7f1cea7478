//! Read-only access to the macOS Messages database.
//!
//! ```text
//! message ──< chat_message_join >── chat
//!    │
//!    └── handle_id ──> handle.id (phone number or email)
//! ```
//!
//! Tapbacks and other associated messages (`associated_message_type`
//! 2000..=3999) are excluded. Messages whose `text` column is NULL get their
//! body from `attributedBody` when it can be decoded.

use super::attributed_body;
use super::{MessageFilter, MessagePage, MessageSource};
use crate::error::{Error, Result};
use crate::types::{Chat, Message};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Seconds between the Unix epoch and 2001-01-01 UTC.
const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Stored dates above this are nanoseconds; below are seconds (pre-High Sierra).
const NANOSECOND_THRESHOLD: u64 = 100_000_000_000;

/// `chat.style` for group conversations.
const GROUP_CHAT_STYLE: i64 = 43;

const MESSAGES_QUERY: &str = r#"
SELECT m.ROWID, c.guid, h.id, m.text, m.attributedBody, m.date, m.is_from_me
FROM message m
LEFT JOIN handle h ON m.handle_id = h.ROWID
LEFT JOIN chat_message_join cmj ON cmj.message_id = m.ROWID
LEFT JOIN chat c ON c.ROWID = cmj.chat_id
WHERE (m.associated_message_type IS NULL
       OR m.associated_message_type < 2000
       OR m.associated_message_type > 3999)
  AND (?1 IS NULL OR c.guid = ?1 OR c.chat_identifier = ?1)
  AND (?2 IS NULL OR h.id = ?2)
  AND (?3 = 1 OR m.is_from_me = 0)
  AND (?4 IS NULL OR m.text LIKE '%' || ?4 || '%' ESCAPE '\')
ORDER BY m.date DESC, m.ROWID DESC
LIMIT ?5
"#;

const CHATS_QUERY: &str = r#"
SELECT c.guid, c.display_name, c.style, MAX(m.date) AS last_date
FROM chat c
LEFT JOIN chat_message_join cmj ON cmj.chat_id = c.ROWID
LEFT JOIN message m ON m.ROWID = cmj.message_id
GROUP BY c.ROWID
ORDER BY last_date DESC, c.ROWID DESC
"#;

/// Convert a `message.date` value to UTC.
pub fn apple_timestamp(raw: i64) -> Option<DateTime<Utc>> {
    let (secs, nanos) = if raw.unsigned_abs() > NANOSECOND_THRESHOLD {
        (raw.div_euclid(1_000_000_000), raw.rem_euclid(1_000_000_000))
    } else {
        (raw, 0)
    };
    Utc.timestamp_opt(APPLE_EPOCH_OFFSET + secs, nanos as u32)
        .single()
}

/// Escape LIKE wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// The Messages `chat.db`.
///
/// Queries run on the blocking thread pool against a single read-only
/// connection.
#[derive(Clone)]
pub struct ChatDb {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl std::fmt::Debug for ChatDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDb").field("path", &self.path).finish()
    }
}

impl ChatDb {
    /// Open an existing database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Source(format!(
                "Messages database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(path = %path.display(), "Opened Messages database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        })
    }

    /// Wrap an already-open connection (for testing)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with the connection on the blocking pool.
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::Source("Messages database lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::Source(format!("database task failed: {}", e)))?
    }

    fn row_to_message(row: &Row) -> rusqlite::Result<Option<Message>> {
        let id: i64 = row.get(0)?;
        let chat_id: Option<String> = row.get(1)?;
        let sender: Option<String> = row.get(2)?;
        let text: Option<String> = row.get(3)?;
        let body: Option<Vec<u8>> = row.get(4)?;
        let raw_date: Option<i64> = row.get(5)?;
        let is_from_me: bool = row.get(6)?;

        let Some(date) = raw_date.and_then(apple_timestamp) else {
            tracing::debug!(message_id = id, "Skipping message with unreadable date");
            return Ok(None);
        };

        let text = match text {
            Some(t) if !t.is_empty() => Some(t),
            _ => body.as_deref().and_then(attributed_body::extract_text),
        };

        Ok(Some(Message {
            id,
            chat_id,
            sender: sender.unwrap_or_default(),
            text,
            date,
            is_from_me,
        }))
    }

    fn row_to_chat(row: &Row) -> rusqlite::Result<Chat> {
        let chat_id: String = row.get(0)?;
        let display_name: Option<String> = row.get(1)?;
        let style: Option<i64> = row.get(2)?;
        let last_date: Option<i64> = row.get(3)?;

        Ok(Chat {
            chat_id,
            display_name,
            last_message_at: last_date.and_then(apple_timestamp),
            is_group: style == Some(GROUP_CHAT_STYLE),
        })
    }
}

#[async_trait]
impl MessageSource for ChatDb {
    fn name(&self) -> &str {
        "chat.db"
    }

    async fn fetch_messages(&self, filter: &MessageFilter) -> Result<MessagePage> {
        let filter = filter.clone();
        let messages = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare_cached(MESSAGES_QUERY)?;
                let search = filter.search.as_deref().map(escape_like);
                let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
                let rows = stmt.query_map(
                    params![
                        filter.chat_id,
                        filter.sender,
                        filter.include_own_messages,
                        search,
                        limit
                    ],
                    Self::row_to_message,
                )?;

                let mut messages = Vec::new();
                for row in rows {
                    if let Some(message) = row? {
                        messages.push(message);
                    }
                }
                Ok(messages)
            })
            .await?;

        tracing::debug!(count = messages.len(), "Fetched messages from chat.db");
        Ok(MessagePage::new(messages))
    }

    async fn list_chats(&self) -> Result<Vec<Chat>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(CHATS_QUERY)?;
            let chats = stmt
                .query_map([], Self::row_to_chat)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(chats)
        })
        .await
    }
}
