//! Terminal and JSON rendering of analytics results.

use anyhow::Result;
use chatlens_core::analytics::{ChatDetails, GlobalStats};
use chatlens_core::format::{format_count, format_relative_time_opt, hour_range};
use chrono::Local;
use serde::Serialize;

const BAR_WIDTH: usize = 30;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Scale `count` against `max` to a bar of at most `BAR_WIDTH` cells.
fn bar(count: usize, max: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let width = ((count * BAR_WIDTH + max - 1) / max).max(1);
    "#".repeat(width)
}

fn section(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));
}

pub fn print_global(stats: &GlobalStats, query: Option<&str>) {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => println!(
            "{} messages matching \"{}\"",
            format_count(stats.total_messages),
            q
        ),
        None => println!("{} messages analyzed", format_count(stats.total_messages)),
    }

    if stats.total_messages == 0 {
        println!("No messages found.");
        return;
    }

    println!(
        "   Sent:     {:<10} ({:.1}%)",
        format_count(stats.sent),
        stats.sent_percentage()
    );
    println!(
        "   Received: {:<10} ({:.1}%)",
        format_count(stats.received),
        stats.received_percentage()
    );

    if !stats.top_contacts.is_empty() {
        section("TOP CONTACTS");
        for (i, contact) in stats.top_contacts.iter().enumerate() {
            println!(
                "   {}. {:<32} {:>8}",
                i + 1,
                contact.name,
                format_count(contact.count)
            );
        }
    }

    if !stats.history.is_empty() {
        section("MONTHLY ACTIVITY");
        let max = stats
            .history
            .iter()
            .map(|m| m.total())
            .max()
            .unwrap_or(0);
        for month in &stats.history {
            println!(
                "   {}  {:>6} sent {:>6} received  {}",
                month.month,
                format_count(month.sent),
                format_count(month.received),
                bar(month.total(), max)
            );
        }
        if let Some(busiest) = stats.busiest_month() {
            println!("   Busiest month: {}", busiest.month);
        }
    }

    if !stats.recent_chats.is_empty() {
        section("RECENT CHATS");
        for chat in &stats.recent_chats {
            let kind = if chat.is_group { "group" } else { "" };
            println!(
                "   {:<32} {:<6} {}",
                chat.display_name,
                kind,
                format_relative_time_opt(chat.last_message_at)
            );
        }
    }
}

pub fn print_chat(chat_id: &str, title: &str, details: &ChatDetails, show_messages: usize) {
    println!("Conversation with {}", title);
    if title != chat_id {
        println!("   {}", chat_id);
    }

    let stats = &details.stats;
    if stats.total == 0 {
        println!();
        println!("No messages found.");
        return;
    }

    section("SUMMARY");
    println!(
        "   Messages: {:<10} Sent: {:<10} Received: {}",
        format_count(stats.total),
        format_count(stats.sent),
        format_count(stats.received)
    );
    println!(
        "   You started {} conversations, they started {}",
        stats.my_initiations, stats.their_initiations
    );
    println!("   Average message length: {} characters", stats.average_length());

    section("HOURLY ACTIVITY");
    let max = details
        .hourly_activity
        .iter()
        .map(|h| h.count)
        .max()
        .unwrap_or(0);
    for hour in &details.hourly_activity {
        println!("   {:02}:00 {:>6}  {}", hour.hour, hour.count, bar(hour.count, max));
    }
    if let Some(peak) = details.peak_hour() {
        println!("   Peak hour: {}", hour_range(peak));
    }

    if !details.top_words.is_empty() {
        section("TOP WORDS");
        for (i, word) in details.top_words.iter().enumerate() {
            println!("   {:>2}. {:<20} {}", i + 1, word.word, word.count);
        }
    }

    if show_messages > 0 {
        section("LATEST MESSAGES");
        for message in details.latest_messages(show_messages) {
            let who = if message.is_from_me { "Me" } else { title };
            println!(
                "   [{}] {}: {}",
                message.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                who,
                message.text.as_deref().unwrap_or("(no text)")
            );
        }
    }
}
