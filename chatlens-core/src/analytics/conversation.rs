//! Per-conversation analytics.
//!
//! Works on one conversation's message history in chronological order:
//! - sent/received volume and average message length
//! - 24-bucket hourly histogram in local time
//! - initiations: who restarts the conversation after a silence
//! - most frequent words

use super::tally::Tally;
use crate::config::AnalyticsConfig;
use crate::types::Message;
use chrono::{Duration, Local, Timelike};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Maximal runs of ASCII letters, digits, and underscores. Accented letters
/// split a word.
fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?-u:\w)+").expect("word pattern is valid"))
}

/// Volume and initiation counts for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total: usize,
    pub sent: usize,
    pub received: usize,
    /// Bursts started by the local user
    pub my_initiations: usize,
    /// Bursts started by the other side
    pub their_initiations: usize,
    /// Characters of message text across the conversation
    pub total_characters: usize,
}

impl ConversationStats {
    /// Mean characters per message, rounded. Messages without text count as 0.
    pub fn average_length(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.total_characters as f64 / self.total as f64).round() as usize
    }
}

/// Messages in one local hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyActivity {
    /// 0-23
    pub hour: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Everything shown for a single conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetails {
    /// Oldest first
    pub messages: Vec<Message>,
    pub stats: ConversationStats,
    /// Always 24 entries, hour 0 first
    pub hourly_activity: Vec<HourlyActivity>,
    pub top_words: Vec<WordCount>,
}

impl ChatDetails {
    /// Hour with the most messages; the earliest hour wins ties. `None` when empty.
    pub fn peak_hour(&self) -> Option<u32> {
        self.hourly_activity
            .iter()
            .filter(|h| h.count > 0)
            .reduce(|best, h| if h.count > best.count { h } else { best })
            .map(|h| h.hour)
    }

    /// The last `n` messages, oldest first.
    pub fn latest_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// Count initiations as (mine, theirs).
///
/// The first message is an initiation, as is any message arriving strictly
/// more than `gap` after the previous one.
fn count_initiations(messages: &[Message], gap: Duration) -> (usize, usize) {
    let mut mine = 0;
    let mut theirs = 0;
    let mut previous = None;

    for message in messages {
        let starts_burst = match previous {
            None => true,
            Some(prev) => message.date - prev > gap,
        };
        if starts_burst {
            if message.is_from_me {
                mine += 1;
            } else {
                theirs += 1;
            }
        }
        previous = Some(message.date);
    }

    (mine, theirs)
}

fn hourly_histogram(messages: &[Message]) -> Vec<HourlyActivity> {
    let mut counts = [0usize; 24];
    for message in messages {
        counts[message.date.with_timezone(&Local).hour() as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourlyActivity {
            hour: hour as u32,
            count,
        })
        .collect()
}

fn top_words(messages: &[Message], min_length: usize, limit: usize) -> Vec<WordCount> {
    let mut words = Tally::new();
    for text in messages.iter().filter_map(Message::non_empty_text) {
        let lowered = text.to_lowercase();
        for word in word_pattern().find_iter(&lowered) {
            let word = word.as_str();
            if word.chars().count() >= min_length {
                words.add(word);
            }
        }
    }

    words
        .top(limit)
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect()
}

/// Compute conversation analytics.
///
/// `messages` is newest first, as sources return them; the result holds them
/// oldest first.
pub fn compute_conversation_stats(messages: Vec<Message>, config: &AnalyticsConfig) -> ChatDetails {
    let mut messages = messages;
    messages.reverse();

    let sent = messages.iter().filter(|m| m.is_from_me).count();
    let (my_initiations, their_initiations) =
        count_initiations(&messages, Duration::minutes(config.initiation_gap_minutes));
    let total_characters = messages
        .iter()
        .map(|m| m.text.as_deref().map_or(0, |t| t.chars().count()))
        .sum();

    let stats = ConversationStats {
        total: messages.len(),
        sent,
        received: messages.len() - sent,
        my_initiations,
        their_initiations,
        total_characters,
    };
    let hourly_activity = hourly_histogram(&messages);
    let top_words = top_words(&messages, config.min_word_length, config.top_words);

    ChatDetails {
        messages,
        stats,
        hourly_activity,
        top_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn make_message(id: i64, date: DateTime<Utc>, is_from_me: bool, text: Option<&str>) -> Message {
        Message {
            id,
            chat_id: Some("chat1".to_string()),
            sender: "+15551234567".to_string(),
            text: text.map(str::to_string),
            date,
            is_from_me,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    /// Build newest-first input from chronological (minute offset, is_from_me) pairs.
    fn newest_first(rows: &[(i64, bool)]) -> Vec<Message> {
        let mut messages: Vec<Message> = rows
            .iter()
            .enumerate()
            .map(|(i, &(minutes, mine))| {
                let date = base() + Duration::minutes(minutes);
                make_message(i as i64, date, mine, Some("hi"))
            })
            .collect();
        messages.reverse();
        messages
    }

    #[test]
    fn test_messages_returned_oldest_first() {
        let details = compute_conversation_stats(
            newest_first(&[(0, false), (1, true), (2, false)]),
            &AnalyticsConfig::default(),
        );
        let ids: Vec<_> = details.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(details.stats.total, 3);
        assert_eq!(details.stats.sent, 1);
        assert_eq!(details.stats.received, 2);
    }

    #[test]
    fn test_gap_of_exactly_sixty_minutes_is_not_initiation() {
        let details = compute_conversation_stats(
            newest_first(&[(0, false), (60, true)]),
            &AnalyticsConfig::default(),
        );
        assert_eq!(details.stats.their_initiations, 1);
        assert_eq!(details.stats.my_initiations, 0);
    }

    #[test]
    fn test_gap_of_sixty_one_minutes_is_initiation() {
        let details = compute_conversation_stats(
            newest_first(&[(0, false), (61, true)]),
            &AnalyticsConfig::default(),
        );
        assert_eq!(details.stats.their_initiations, 1);
        assert_eq!(details.stats.my_initiations, 1);
    }

    #[test]
    fn test_initiations_over_bursts() {
        // burst 1 by them, burst 2 by me, burst 3 by them
        let details = compute_conversation_stats(
            newest_first(&[
                (0, false),
                (5, true),
                (10, false),
                (200, true),
                (210, false),
                (500, false),
            ]),
            &AnalyticsConfig::default(),
        );
        assert_eq!(details.stats.my_initiations, 1);
        assert_eq!(details.stats.their_initiations, 2);
    }

    #[test]
    fn test_configured_gap() {
        let config = AnalyticsConfig {
            initiation_gap_minutes: 10,
            ..AnalyticsConfig::default()
        };
        let details = compute_conversation_stats(newest_first(&[(0, false), (11, true)]), &config);
        assert_eq!(details.stats.my_initiations, 1);
    }

    #[test]
    fn test_hourly_buckets() {
        let hours = [9, 9, 14, 14, 14];
        let messages: Vec<Message> = hours
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let local = Local.with_ymd_and_hms(2024, 5, 1, h, i as u32, 0).unwrap();
                make_message(i as i64, local.with_timezone(&Utc), false, None)
            })
            .rev()
            .collect();

        let details = compute_conversation_stats(messages, &AnalyticsConfig::default());

        assert_eq!(details.hourly_activity.len(), 24);
        for bucket in &details.hourly_activity {
            let expected = match bucket.hour {
                9 => 2,
                14 => 3,
                _ => 0,
            };
            assert_eq!(bucket.count, expected, "hour {}", bucket.hour);
        }
        assert_eq!(details.peak_hour(), Some(14));
    }

    #[test]
    fn test_hourly_sum_equals_total() {
        let details = compute_conversation_stats(
            newest_first(&[(0, false), (90, true), (400, false), (1000, true)]),
            &AnalyticsConfig::default(),
        );
        let sum: usize = details.hourly_activity.iter().map(|h| h.count).sum();
        assert_eq!(sum, details.stats.total);
    }

    #[test]
    fn test_top_words() {
        let texts = [
            "Pizza tonight? pizza is great",
            "The PIZZA place on main street",
            "street food tonight",
            "a an the and",
            "",
        ];
        let messages: Vec<Message> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let date = base() + Duration::minutes(i as i64);
                make_message(i as i64, date, false, Some(t))
            })
            .rev()
            .collect();

        let details = compute_conversation_stats(messages, &AnalyticsConfig::default());
        let words: Vec<_> = details
            .top_words
            .iter()
            .map(|w| (w.word.as_str(), w.count))
            .collect();
        assert_eq!(
            words,
            vec![
                ("pizza", 3),
                ("tonight", 2),
                ("street", 2),
                ("great", 1),
                ("place", 1),
                ("main", 1),
                ("food", 1),
            ]
        );
    }

    #[test]
    fn test_top_words_split_on_non_ascii_letters() {
        let messages = vec![make_message(
            1,
            base(),
            false,
            Some("Déjà vu: crème brûlée tonight, naïve café_2"),
        )];
        let details = compute_conversation_stats(messages, &AnalyticsConfig::default());
        let words: Vec<_> = details.top_words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["tonight"]);
    }

    #[test]
    fn test_top_words_properties() {
        let text = (0..40)
            .map(|i| format!("word{} ", i).repeat(i % 5 + 1))
            .collect::<String>();
        let messages = vec![make_message(1, base(), true, Some(&text))];
        let details = compute_conversation_stats(messages, &AnalyticsConfig::default());

        assert!(details.top_words.len() <= 10);
        assert!(details
            .top_words
            .windows(2)
            .all(|w| w[0].count >= w[1].count));
        assert!(details.top_words.iter().all(|w| w.word.chars().count() > 3));
    }

    #[test]
    fn test_average_length() {
        let messages = vec![
            make_message(2, base() + Duration::minutes(2), false, None),
            make_message(1, base() + Duration::minutes(1), false, Some("hello")),
            make_message(0, base(), true, Some("hey")),
        ];
        let details = compute_conversation_stats(messages, &AnalyticsConfig::default());
        // (5 + 3 + 0) / 3 = 2.67
        assert_eq!(details.stats.average_length(), 3);
    }

    #[test]
    fn test_empty_conversation() {
        let details = compute_conversation_stats(Vec::new(), &AnalyticsConfig::default());
        assert!(details.messages.is_empty());
        assert_eq!(details.stats, ConversationStats::default());
        assert_eq!(details.hourly_activity.len(), 24);
        assert!(details.top_words.is_empty());
        assert_eq!(details.peak_hour(), None);
        assert_eq!(details.stats.average_length(), 0);
    }

    #[test]
    fn test_latest_messages() {
        let details = compute_conversation_stats(
            newest_first(&[(0, false), (1, true), (2, false)]),
            &AnalyticsConfig::default(),
        );
        let ids: Vec<_> = details.latest_messages(2).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(details.latest_messages(10).len(), 3);
    }
}
