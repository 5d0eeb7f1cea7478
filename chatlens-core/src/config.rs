//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/chatlens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/chatlens/` (~/.config/chatlens/)
//! - State/Logs: `$XDG_STATE_HOME/chatlens/` (~/.local/state/chatlens/)
//!
//! The message log itself is never written; its location comes from
//! `[messages] chat_db_path` and defaults to the macOS Messages database.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Message log location
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Where the contact directory comes from
    #[serde(default)]
    pub contacts: ContactsConfig,

    /// Analytics windows and limits
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Message log configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct MessagesConfig {
    /// Override path for the Messages database (`chat.db`)
    pub chat_db_path: Option<PathBuf>,
}

impl MessagesConfig {
    /// Resolved database path, `~/Library/Messages/chat.db` unless overridden.
    pub fn chat_db_path(&self) -> PathBuf {
        match &self.chat_db_path {
            Some(path) => expand_home(path),
            None => home_dir().join("Library/Messages/chat.db"),
        }
    }
}

/// Supported contact export backends
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactSourceKind {
    /// Read the macOS AddressBook databases directly
    #[default]
    AddressBook,
    /// Run an external command that prints a `{ phone: name }` JSON object
    Command,
    /// Read a `{ phone: name }` JSON object from a file
    JsonFile,
    /// Never resolve names
    None,
}

/// Contact directory configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ContactsConfig {
    /// Which exporter to use
    #[serde(default)]
    pub source: ContactSourceKind,

    /// Program and arguments for `source = "command"`
    #[serde(default)]
    pub command: Vec<String>,

    /// JSON file for `source = "json_file"`
    pub json_path: Option<PathBuf>,

    /// Override for the AddressBook root directory
    pub address_book_dir: Option<PathBuf>,
}

impl ContactsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        match self.source {
            ContactSourceKind::Command if self.command.is_empty() => Err(Error::Config(
                "contacts.command is required when contacts.source = \"command\"".to_string(),
            )),
            ContactSourceKind::JsonFile if self.json_path.is_none() => Err(Error::Config(
                "contacts.json_path is required when contacts.source = \"json_file\"".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// AddressBook root, `~/Library/Application Support/AddressBook` unless overridden.
    pub fn address_book_dir(&self) -> PathBuf {
        match &self.address_book_dir {
            Some(path) => expand_home(path),
            None => home_dir().join("Library/Application Support/AddressBook"),
        }
    }
}

/// Analytics windows and limits
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Messages fetched for global statistics
    #[serde(default = "default_global_window")]
    pub global_window: usize,

    /// Messages fetched for a single conversation
    #[serde(default = "default_conversation_window")]
    pub conversation_window: usize,

    /// Silence (minutes) after which the next message starts a new burst
    #[serde(default = "default_initiation_gap_minutes")]
    pub initiation_gap_minutes: i64,

    /// Number of top contacts in global statistics
    #[serde(default = "default_top_contacts")]
    pub top_contacts: usize,

    /// Number of recent chats in global statistics
    #[serde(default = "default_recent_chats")]
    pub recent_chats: usize,

    /// Number of top words in conversation statistics
    #[serde(default = "default_top_words")]
    pub top_words: usize,

    /// Shortest word (in characters) counted by word frequency
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            global_window: default_global_window(),
            conversation_window: default_conversation_window(),
            initiation_gap_minutes: default_initiation_gap_minutes(),
            top_contacts: default_top_contacts(),
            recent_chats: default_recent_chats(),
            top_words: default_top_words(),
            min_word_length: default_min_word_length(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.global_window == 0 {
            return Err(Error::Config(
                "analytics.global_window must be at least 1".to_string(),
            ));
        }
        if self.conversation_window == 0 {
            return Err(Error::Config(
                "analytics.conversation_window must be at least 1".to_string(),
            ));
        }
        if !(0..=MAX_INITIATION_GAP_MINUTES).contains(&self.initiation_gap_minutes) {
            return Err(Error::Config(format!(
                "analytics.initiation_gap_minutes must be between 0 and {}",
                MAX_INITIATION_GAP_MINUTES
            )));
        }
        Ok(())
    }
}

/// One year.
const MAX_INITIATION_GAP_MINUTES: i64 = 525_600;

fn default_global_window() -> usize {
    50_000
}

fn default_conversation_window() -> usize {
    100_000
}

fn default_initiation_gap_minutes() -> i64 {
    60
}

fn default_top_contacts() -> usize {
    5
}

fn default_recent_chats() -> usize {
    20
}

fn default_top_words() -> usize {
    10
}

fn default_min_word_length() -> usize {
    4
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.contacts.validate()?;
        self.analytics.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/chatlens/config.toml` (~/.config/chatlens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("chatlens").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/chatlens/` (~/.local/state/chatlens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("chatlens")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/chatlens/chatlens.log` (~/.local/state/chatlens/chatlens.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("chatlens.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.global_window, 50_000);
        assert_eq!(config.analytics.conversation_window, 100_000);
        assert_eq!(config.analytics.initiation_gap_minutes, 60);
        assert_eq!(config.analytics.top_contacts, 5);
        assert_eq!(config.analytics.recent_chats, 20);
        assert_eq!(config.analytics.top_words, 10);
        assert_eq!(config.analytics.min_word_length, 4);
        assert_eq!(config.contacts.source, ContactSourceKind::AddressBook);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[messages]
chat_db_path = "/tmp/chat.db"

[contacts]
source = "command"
command = ["swift", "get_contacts.swift"]

[analytics]
initiation_gap_minutes = 30
top_words = 5

[logging]
level = "debug"
"#;
        let config = Config::parse(toml).unwrap();

        assert_eq!(
            config.messages.chat_db_path(),
            PathBuf::from("/tmp/chat.db")
        );
        assert_eq!(config.contacts.source, ContactSourceKind::Command);
        assert_eq!(config.contacts.command, vec!["swift", "get_contacts.swift"]);
        assert_eq!(config.analytics.initiation_gap_minutes, 30);
        assert_eq!(config.analytics.top_words, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.analytics.global_window, 50_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_contacts_config_validation() {
        let config = ContactsConfig::default();
        assert!(config.validate().is_ok());

        let config = ContactsConfig {
            source: ContactSourceKind::Command,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ContactsConfig {
            source: ContactSourceKind::JsonFile,
            json_path: Some(PathBuf::from("/tmp/contacts.json")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_analytics_config_validation() {
        assert!(AnalyticsConfig::default().validate().is_ok());

        let config = AnalyticsConfig {
            conversation_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            initiation_gap_minutes: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_sections() {
        let err = Config::parse("[analytics]\nglobal_window = 0\n").unwrap_err();
        assert!(err.to_string().contains("global_window"));

        let err = Config::parse("[contacts]\nsource = \"json_file\"\n").unwrap_err();
        assert!(err.to_string().contains("json_path"));

        let unknown_source = Config::parse("[contacts]\nsource = \"carrier_pigeon\"\n");
        assert!(unknown_source.is_err());
        assert!(Config::parse("").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analytics]\ntop_contacts = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.analytics.top_contacts, 3);

        let missing = Config::load_from(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }

    #[test]
    fn test_expand_home() {
        let expanded = expand_home(Path::new("~/Library/Messages/chat.db"));
        assert!(expanded.ends_with("Library/Messages/chat.db"));
        assert!(!expanded.starts_with("~"));

        let absolute = expand_home(Path::new("/var/db/chat.db"));
        assert_eq!(absolute, PathBuf::from("/var/db/chat.db"));
    }
}
