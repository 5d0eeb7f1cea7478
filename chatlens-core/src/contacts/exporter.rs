//! Contact export backends.
//!
//! An exporter produces raw `(phone, name)` pairs in a stable order. It may
//! fail for reasons outside our control (permission prompts denied, helper
//! tool missing); callers go through [`ContactCache`](super::ContactCache),
//! which absorbs those failures.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Source of raw contact entries.
#[async_trait]
pub trait ContactExporter: Send + Sync {
    /// Short name used in logs (e.g., "address_book", "command").
    fn name(&self) -> &str;

    /// Produce `(phone, name)` pairs in export order.
    ///
    /// Phone numbers may be formatted; the directory normalizes them.
    async fn load_contacts(&self) -> Result<Vec<(String, String)>>;
}

/// Parse a `{ "phone": "name", ... }` JSON object, keeping object order.
///
/// Non-string values are skipped.
pub fn parse_contact_json(json: &str) -> Result<Vec<(String, String)>> {
    let value: serde_json::Value = serde_json::from_str(json.trim())?;
    let object = value.as_object().ok_or_else(|| {
        Error::Contacts("expected a JSON object mapping phone numbers to names".to_string())
    })?;

    Ok(object
        .iter()
        .filter_map(|(phone, name)| name.as_str().map(|name| (phone.clone(), name.to_string())))
        .collect())
}

/// Runs an external program that prints a contact JSON object on stdout.
#[derive(Debug, Clone)]
pub struct CommandExporter {
    program: String,
    args: Vec<String>,
}

impl CommandExporter {
    /// Create from a program and its arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create from a `[program, args...]` list as written in config.
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("contacts.command must not be empty".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl ContactExporter for CommandExporter {
    fn name(&self) -> &str {
        "command"
    }

    async fn load_contacts(&self) -> Result<Vec<(String, String)>> {
        tracing::debug!(
            program = %self.program,
            args = ?self.args,
            "Running contact export command"
        );

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::Contacts(format!("failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Contacts(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_contact_json(&stdout)
    }
}

/// Reads a contact JSON object from a file.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContactExporter for JsonFileExporter {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn load_contacts(&self) -> Result<Vec<(String, String)>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Contacts(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        parse_contact_json(&content)
    }
}

/// Fixed in-memory entries. The default instance is empty.
#[derive(Debug, Clone, Default)]
pub struct StaticExporter {
    entries: Vec<(String, String)>,
}

impl StaticExporter {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl ContactExporter for StaticExporter {
    fn name(&self) -> &str {
        "static"
    }

    async fn load_contacts(&self) -> Result<Vec<(String, String)>> {
        Ok(self.entries.clone())
    }
}
