//! # chatlens-core
//!
//! Core library for chatlens, a personal messaging analytics engine.
//!
//! This library provides:
//! - Phone number normalization and contact name resolution
//! - Message sources: the macOS Messages database and an in-memory source
//! - Global and per-conversation analytics
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! ```text
//! MessageSource ──window──┐
//!                         ├──> Insights ──> GlobalStats / ChatDetails
//! ContactCache ──resolver─┘
//! ```
//!
//! Sources and exporters are the only I/O. Everything downstream of a fetched
//! window is pure computation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chatlens_core::contacts::{AddressBookExporter, ContactCache};
//! use chatlens_core::{ChatDb, Config, Insights};
//! use std::sync::Arc;
//!
//! # async fn run() -> chatlens_core::Result<()> {
//! let config = Config::load()?;
//! let source = Arc::new(ChatDb::open(&config.messages.chat_db_path())?);
//! let contacts = Arc::new(ContactCache::new(Box::new(AddressBookExporter::new(
//!     config.contacts.address_book_dir(),
//! ))));
//!
//! let insights = Insights::new(source, contacts, config.analytics.clone());
//! let stats = insights.get_global_stats(None).await?;
//! println!("{} messages", stats.total_messages);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{ChatDetails, GlobalStats};
pub use config::Config;
pub use contacts::{ContactCache, ContactDirectory, ContactResolver};
pub use error::{Error, Result};
pub use insights::Insights;
pub use phone::normalize_phone;
pub use source::{ChatDb, MemorySource, MessageFilter, MessagePage, MessageSource};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod contacts;
pub mod error;
pub mod format;
pub mod insights;
pub mod logging;
pub mod lookup;
pub mod phone;
pub mod source;
pub mod types;
