//! Conversation lookup with identifier fallback.
//!
//! Chat identifiers arrive in whatever form the caller has. The message
//! store may know the conversation under the full identifier, under the bare
//! handle, or only through the sender field. Lookup tries each in turn:
//!
//! ```text
//!  ChatId(raw) ──empty──> Handle(after last ';') ──empty──> Sender(handle) ──empty──> []
//!       │                        │                              │
//!       └── found ───────────────┴──────────────────────────────┴──> messages
//! ```
//!
//! Only service-qualified identifiers with a non-empty handle get the two
//! fallback steps; anything else is looked up verbatim once.

use crate::error::Result;
use crate::source::{MessageFilter, MessagePage, MessageSource};
use crate::types::{chat_handle, is_service_qualified};
use std::fmt;

/// One attempt in the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    /// The identifier as given, as a chat filter
    ChatId(String),
    /// The handle after the last service delimiter, as a chat filter
    Handle(String),
    /// The handle as a sender filter
    Sender(String),
}

impl LookupStep {
    /// Message filter for this step.
    pub fn filter(&self, limit: usize) -> MessageFilter {
        match self {
            LookupStep::ChatId(id) | LookupStep::Handle(id) => {
                MessageFilter::chat(id.as_str(), limit)
            }
            LookupStep::Sender(handle) => MessageFilter::sender(handle.as_str(), limit),
        }
    }
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStep::ChatId(id) => write!(f, "chat id {}", id),
            LookupStep::Handle(h) => write!(f, "handle {}", h),
            LookupStep::Sender(h) => write!(f, "sender {}", h),
        }
    }
}

/// Ordered lookup steps for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPlan {
    steps: Vec<LookupStep>,
}

impl LookupPlan {
    pub fn for_chat(chat_id: &str) -> Self {
        let mut steps = vec![LookupStep::ChatId(chat_id.to_string())];
        let handle = chat_handle(chat_id);
        if is_service_qualified(chat_id) && !handle.is_empty() {
            steps.push(LookupStep::Handle(handle.to_string()));
            steps.push(LookupStep::Sender(handle.to_string()));
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[LookupStep] {
        &self.steps
    }
}

/// Outcome of running a plan against a source.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    /// Messages from the first step that returned any, newest first
    pub page: MessagePage,
    /// The step that produced them; `None` if every step came back empty
    pub matched: Option<LookupStep>,
}

/// Fetch a conversation's messages, falling back through [`LookupPlan`].
///
/// An identifier nothing matches yields an empty page, not an error.
pub async fn fetch_conversation(
    source: &dyn MessageSource,
    chat_id: &str,
    limit: usize,
) -> Result<Lookup> {
    let plan = LookupPlan::for_chat(chat_id);

    for (attempt, step) in plan.steps().iter().enumerate() {
        if attempt > 0 {
            tracing::info!(chat_id, step = %step, "No messages yet, retrying lookup");
        }
        let page = source.fetch_messages(&step.filter(limit)).await?;
        if !page.is_empty() {
            tracing::debug!(chat_id, step = %step, count = page.total, "Conversation found");
            return Ok(Lookup {
                page,
                matched: Some(step.clone()),
            });
        }
    }

    tracing::info!(chat_id, "No messages found for conversation");
    Ok(Lookup::default())
}
