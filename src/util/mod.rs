//
//  buildkite-cli
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Functions
//!
//! Formatting and argument parsing helpers shared by the CLI commands.
//!
//! - Time: durations and relative timestamps
//! - Strings: display truncation
//! - Arguments: `key=value` pairs and date filters

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Formats a duration as a compact human-readable string.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use buildkite_cli::util::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(150)), "2m 30s");
/// assert_eq!(format_duration(Duration::from_secs(3700)), "1h 1m");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Formats a timestamp relative to now ("5 minutes ago").
pub fn format_relative_time(timestamp: DateTime<Utc>) -> String {
    format_relative_to(timestamp, Utc::now())
}

fn format_relative_to(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_seconds();

    if diff < 0 {
        return "in the future".to_string();
    }

    let diff = diff as u64;
    let (amount, unit) = if diff < 60 {
        return "just now".to_string();
    } else if diff < 3600 {
        (diff / 60, "minute")
    } else if diff < 86400 {
        (diff / 3600, "hour")
    } else if diff < 604800 {
        (diff / 86400, "day")
    } else if diff < 2592000 {
        (diff / 604800, "week")
    } else if diff < 31536000 {
        (diff / 2592000, "month")
    } else {
        (diff / 31536000, "year")
    };

    format!("{} {}{} ago", amount, unit, if amount == 1 { "" } else { "s" })
}

/// Shortens `s` to at most `max_len` characters, ending with `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// The first line of a possibly multi-line message.
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

/// Parses a `key=value` argument.
///
/// The value may itself contain `=`; only the first one splits.
///
/// # Examples
///
/// ```rust
/// use buildkite_cli::util::parse_key_value;
///
/// assert_eq!(
///     parse_key_value("DEPLOY=a=b").unwrap(),
///     ("DEPLOY".to_string(), "a=b".to_string())
/// );
/// assert!(parse_key_value("novalue").is_err());
/// ```
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", s))?;

    if key.trim().is_empty() {
        anyhow::bail!("Empty key in '{}'", s);
    }

    Ok((key.trim().to_string(), value.to_string()))
}

/// Parses a date filter: RFC 3339 (`2024-01-15T10:00:00Z`) or a plain date
/// (`2024-01-15`, taken as midnight UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': use YYYY-MM-DD or RFC 3339", s))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Merge branch\n\nDetails"), "Merge branch");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_relative_to(now, now), "just now");
        assert_eq!(
            format_relative_to(now - chrono::Duration::minutes(1), now),
            "1 minute ago"
        );
        assert_eq!(
            format_relative_to(now - chrono::Duration::hours(5), now),
            "5 hours ago"
        );
        assert_eq!(
            format_relative_to(now + chrono::Duration::hours(1), now),
            "in the future"
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("release=v1").unwrap(),
            ("release".to_string(), "v1".to_string())
        );
        assert_eq!(parse_key_value("empty=").unwrap().1, "");
        assert!(parse_key_value("=v").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-15").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-15T02:00:00+02:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }
}
