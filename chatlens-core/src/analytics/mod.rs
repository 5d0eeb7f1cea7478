//! Analytics over message windows.
//!
//! - [`global`]: whole-log volume, top conversations, monthly history, recent chats
//! - [`conversation`]: one conversation's hourly pattern, initiations, top words
//!
//! Both are pure functions of their inputs. Fetching and contact loading
//! happen in [`crate::Insights`].

pub mod conversation;
pub mod global;
mod tally;

pub use conversation::{
    compute_conversation_stats, ChatDetails, ConversationStats, HourlyActivity, WordCount,
};
pub use global::{compute_global_stats, GlobalStats, MonthlyActivity, RecentChat, TopContact};
