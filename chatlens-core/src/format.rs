//! Formatting helpers for terminal output.

use chrono::{DateTime, Utc};

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_to(ts, Utc::now())
}

fn format_relative_to(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d, %Y").to_string()
    }
}

/// Format an optional timestamp as relative time, or "never" if missing.
pub fn format_relative_time_opt(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format_relative_time(ts),
        None => "never".to_string(),
    }
}

/// Format a count with thousands separators (e.g., "12,345").
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12am".to_string(),
        1..=11 => format!("{}am", hour),
        12 => "12pm".to_string(),
        _ => format!("{}pm", hour - 12),
    }
}

/// Format an hour of the day as a one-hour range (e.g., "2pm-3pm").
pub fn hour_range(hour: u32) -> String {
    let hour = hour % 24;
    format!("{}-{}", hour_label(hour), hour_label((hour + 1) % 24))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            format_relative_to(now + Duration::seconds(5), now),
            "just now"
        );
        assert_eq!(
            format_relative_to(now - Duration::seconds(30), now),
            "just now"
        );
        assert_eq!(
            format_relative_to(now - Duration::minutes(5), now),
            "5m ago"
        );
        assert_eq!(format_relative_to(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative_to(now - Duration::days(2), now), "2d ago");
        assert_eq!(
            format_relative_to(now - Duration::days(30), now),
            "May 16, 2024"
        );
        assert_eq!(format_relative_time_opt(None), "never");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(50_000), "50,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_hour_range() {
        assert_eq!(hour_range(0), "12am-1am");
        assert_eq!(hour_range(11), "11am-12pm");
        assert_eq!(hour_range(14), "2pm-3pm");
        assert_eq!(hour_range(23), "11pm-12am");
    }
}
