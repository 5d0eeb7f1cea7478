//! macOS AddressBook exporter.
//!
//! Contacts.app keeps one Core Data SQLite store per account under
//! `~/Library/Application Support/AddressBook/Sources/<uuid>/`, plus a
//! top-level store for local contacts. Reading them requires Full Disk
//! Access for the terminal; without it the open fails and the cache falls
//! back to an empty directory.

use super::ContactExporter;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

const STORE_FILE: &str = "AddressBook-v22.abcddb";

const PHONE_QUERY: &str = r#"
SELECT r.ZFIRSTNAME, r.ZLASTNAME, r.ZORGANIZATION, p.ZFULLNUMBER
FROM ZABCDPHONENUMBER p
JOIN ZABCDRECORD r ON p.ZOWNER = r.Z_PK
WHERE p.ZFULLNUMBER IS NOT NULL
ORDER BY r.Z_PK, p.Z_PK
"#;

/// Reads phone numbers from every AddressBook store under a root directory.
#[derive(Debug, Clone)]
pub struct AddressBookExporter {
    root: PathBuf,
}

impl AddressBookExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store files under the root: the local store first, then each source.
    fn discover_stores(&self) -> Vec<PathBuf> {
        let mut stores = Vec::new();

        let local = self.root.join(STORE_FILE);
        if local.is_file() {
            stores.push(local);
        }

        let pattern = self.root.join("Sources").join("*").join(STORE_FILE);
        if let Ok(paths) = glob::glob(&pattern.to_string_lossy()) {
            let mut sources: Vec<PathBuf> = paths.flatten().collect();
            sources.sort();
            stores.extend(sources);
        }

        stores
    }
}

/// Display name for a record: "first last", else the organization.
fn record_name(first: Option<String>, last: Option<String>, org: Option<String>) -> String {
    let full = format!(
        "{} {}",
        first.unwrap_or_default().trim(),
        last.unwrap_or_default().trim()
    );
    let full = full.trim();
    if !full.is_empty() {
        return full.to_string();
    }
    org.map(|o| o.trim().to_string()).unwrap_or_default()
}

fn read_store(path: &Path) -> Result<Vec<(String, String)>> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let mut stmt = conn.prepare(PHONE_QUERY)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, Option<String>>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (first, last, org, number) = row?;
        let name = record_name(first, last, org);
        if !name.is_empty() {
            entries.push((number, name));
        }
    }
    Ok(entries)
}

#[async_trait]
impl ContactExporter for AddressBookExporter {
    fn name(&self) -> &str {
        "address_book"
    }

    async fn load_contacts(&self) -> Result<Vec<(String, String)>> {
        let stores = self.discover_stores();
        if stores.is_empty() {
            return Err(Error::Contacts(format!(
                "no {} found under {}",
                STORE_FILE,
                self.root.display()
            )));
        }

        tokio::task::spawn_blocking(move || {
            let mut entries = Vec::new();
            let mut failures = Vec::new();

            for store in &stores {
                match read_store(store) {
                    Ok(mut found) => {
                        tracing::debug!(
                            store = %store.display(),
                            numbers = found.len(),
                            "Read AddressBook store"
                        );
                        entries.append(&mut found);
                    }
                    Err(e) => {
                        tracing::warn!(
                            store = %store.display(),
                            error = %e,
                            "Skipping unreadable AddressBook store"
                        );
                        failures.push(e.to_string());
                    }
                }
            }

            if failures.len() == stores.len() {
                return Err(Error::Contacts(format!(
                    "could not read any AddressBook store: {}",
                    failures.join("; ")
                )));
            }
            Ok(entries)
        })
        .await
        .map_err(|e| Error::Contacts(format!("address book task failed: {}", e)))?
    }
}
