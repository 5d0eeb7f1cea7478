//! Contact directory: normalized phone number → display name.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌──────────────────┐  once   ┌──────────────┐  Arc   ┌─────────────────┐
//! │ ContactExporter  │ ──────► │ ContactCache │ ─────► │ ContactResolver │
//! │ (AddressBook,    │         │ (OnceCell)   │        │ exact + suffix  │
//! │  command, file)  │         └──────────────┘        └─────────────────┘
//! └──────────────────┘
//! ```
//!
//! The exporter runs at most once per [`ContactCache`]. Concurrent first
//! requests wait on the same load. A failed export is logged and replaced by
//! an empty directory, so resolution quality degrades but requests succeed.
//! There is no refresh: contacts added after the first load are not seen
//! until the process restarts.

mod address_book;
mod exporter;
pub mod resolver;

pub use address_book::AddressBookExporter;
pub use exporter::{
    parse_contact_json, CommandExporter, ContactExporter, JsonFileExporter, StaticExporter,
};
pub use resolver::{resolve, ContactResolver};

use crate::config::{expand_home, ContactSourceKind, ContactsConfig};
use crate::error::{Error, Result};
use crate::phone::normalize_phone;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Phone → name mapping with a fixed iteration order.
///
/// Entries keep the order in which the exporter produced them. Suffix
/// matching scans in that order, so the first inserted candidate wins.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ContactDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from raw `(phone, name)` pairs in arrival order.
    pub fn from_entries<I, P, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, N)>,
        P: AsRef<str>,
        N: AsRef<str>,
    {
        let mut directory = Self::new();
        for (phone, name) in entries {
            directory.insert(phone.as_ref(), name.as_ref());
        }
        directory
    }

    /// Insert a contact number.
    ///
    /// The number is normalized first. Numbers without digits and blank names
    /// are ignored. A repeated number takes the newer name but keeps its
    /// original position.
    pub fn insert(&mut self, phone: &str, name: &str) {
        let key = normalize_phone(phone);
        let name = name.trim();
        if key.is_empty() || name.is_empty() {
            return;
        }

        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = name.to_string(),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, name.to_string()));
            }
        }
    }

    /// Exact lookup by an already-normalized key.
    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.index
            .get(normalized)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(phone, name)| (phone.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the exporter selected by `[contacts]` configuration.
pub fn exporter_from_config(config: &ContactsConfig) -> Result<Box<dyn ContactExporter>> {
    config.validate()?;
    let exporter: Box<dyn ContactExporter> = match config.source {
        ContactSourceKind::AddressBook => {
            Box::new(AddressBookExporter::new(config.address_book_dir()))
        }
        ContactSourceKind::Command => {
            Box::new(CommandExporter::from_command_line(&config.command)?)
        }
        ContactSourceKind::JsonFile => {
            let path = config
                .json_path
                .as_deref()
                .ok_or_else(|| Error::Config("contacts.json_path is not set".to_string()))?;
            Box::new(JsonFileExporter::new(expand_home(path)))
        }
        ContactSourceKind::None => Box::new(StaticExporter::default()),
    };
    Ok(exporter)
}

/// Load-once holder for the process-wide contact directory.
pub struct ContactCache {
    exporter: Box<dyn ContactExporter>,
    directory: OnceCell<Arc<ContactDirectory>>,
}

impl ContactCache {
    /// Create a cache that will load from `exporter` on first use.
    pub fn new(exporter: Box<dyn ContactExporter>) -> Self {
        Self {
            exporter,
            directory: OnceCell::new(),
        }
    }

    /// A cache that is already loaded with `directory` and never exports.
    pub fn preloaded(directory: ContactDirectory) -> Self {
        Self {
            exporter: Box::new(StaticExporter::default()),
            directory: OnceCell::new_with(Some(Arc::new(directory))),
        }
    }

    /// Returns the directory, running the exporter if this is the first call.
    ///
    /// Export failures are logged and yield an empty directory; they are
    /// cached like a success.
    pub async fn directory(&self) -> Arc<ContactDirectory> {
        self.directory
            .get_or_init(|| async {
                let exporter = self.exporter.name();
                match self.exporter.load_contacts().await {
                    Ok(entries) => {
                        let directory = ContactDirectory::from_entries(entries);
                        tracing::info!(
                            exporter,
                            contacts = directory.len(),
                            "Contact directory loaded"
                        );
                        Arc::new(directory)
                    }
                    Err(e) => {
                        tracing::warn!(
                            exporter,
                            error = %e,
                            "Contact export failed, continuing without contact names"
                        );
                        Arc::new(ContactDirectory::new())
                    }
                }
            })
            .await
            .clone()
    }

    /// Resolver over the cached directory.
    pub async fn resolver(&self) -> ContactResolver {
        ContactResolver::new(self.directory().await)
    }

    /// True once the first load has finished.
    pub fn is_loaded(&self) -> bool {
        self.directory.initialized()
    }
}
