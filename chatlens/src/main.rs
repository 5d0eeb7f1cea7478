//! chatlens - messaging analytics for your iMessage history
//!
//! Reads the local Messages database and prints global statistics,
//! per-conversation analytics, or contact directory diagnostics.

mod report;

use anyhow::{Context, Result};
use chatlens_core::contacts::{exporter_from_config, ContactCache};
use chatlens_core::types::chat_handle;
use chatlens_core::{ChatDb, Config, Insights};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chatlens")]
#[command(about = "Messaging analytics for your iMessage history")]
#[command(version)]
struct Args {
    /// Echo warnings and errors to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overall statistics across recent messages
    Stats {
        /// Only count messages containing this text
        #[arg(short, long)]
        query: Option<String>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Analytics for a single conversation
    Chat {
        /// Chat identifier (e.g. "iMessage;-;+15551234567" or a bare handle)
        chat_id: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Also print the last N messages (text format only)
        #[arg(short, long)]
        messages: Option<usize>,
    },

    /// Load the contact directory and optionally resolve an identifier
    Contacts {
        /// Identifier to resolve (phone number, handle, or chat id)
        #[arg(short, long)]
        lookup: Option<String>,
    },
}

fn check_format(format: &str) -> Result<()> {
    match format {
        "text" | "json" => Ok(()),
        other => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", other),
    }
}

fn build_insights(config: &Config, contacts: Arc<ContactCache>) -> Result<Insights> {
    let db_path = config.messages.chat_db_path();
    let db = ChatDb::open(&db_path)
        .with_context(|| format!("failed to open Messages database at {}", db_path.display()))?;
    Ok(Insights::new(
        Arc::new(db),
        contacts,
        config.analytics.clone(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard = chatlens_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    let exporter =
        exporter_from_config(&config.contacts).context("invalid contacts configuration")?;
    let contacts = Arc::new(ContactCache::new(exporter));

    match args.command {
        Command::Stats { query, format } => {
            check_format(&format)?;
            let insights = build_insights(&config, contacts)?;
            let stats = insights
                .get_global_stats(query.as_deref())
                .await
                .context("failed to compute global stats")?;

            if format == "json" {
                report::print_json(&stats)?;
            } else {
                report::print_global(&stats, query.as_deref());
            }
        }

        Command::Chat {
            chat_id,
            format,
            messages,
        } => {
            check_format(&format)?;
            let insights = build_insights(&config, contacts)?;
            let details = insights
                .get_chat_details(&chat_id)
                .await
                .with_context(|| format!("failed to load conversation {}", chat_id))?;

            if format == "json" {
                report::print_json(&details)?;
            } else {
                let resolver = insights.resolver().await;
                let title = resolver.display_name(chat_handle(&chat_id));
                report::print_chat(&chat_id, &title, &details, messages.unwrap_or(0));
            }
        }

        Command::Contacts { lookup } => {
            let resolver = contacts.resolver().await;
            println!(
                "Loaded {} contacts ({:?} source)",
                resolver.directory().len(),
                config.contacts.source
            );

            if let Some(raw) = lookup {
                match resolver.resolve(&raw) {
                    Some(name) => println!("{} -> {}", raw, name),
                    None => println!("{} -> no match", raw),
                }
            }
        }
    }

    tracing::debug!("Done");
    Ok(())
}
