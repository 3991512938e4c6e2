//! Timestamp formatting utilities
//!
//! Timestamped lines use the local wall clock so that operators can line up
//! interleaved output from concurrent calls.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use logtag::TimestampFormat;
/// use chrono::Local;
///
/// let format = TimestampFormat::DateTime;
/// let timestamp = format.format(&Local::now());
/// // Output: "2025-01-08 10:30:45"
/// assert_eq!(timestamp.len(), 19);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Date and time to the second: `2025-01-08 10:30:45`
    #[default]
    DateTime,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Custom strftime format
    ///
    /// ```
    /// use logtag::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

impl TimestampFormat {
    /// Whether every specifier of a custom format is known to chrono.
    /// The built-in variants are always valid.
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Custom(format_str) => !format_str.trim().is_empty()
                && !StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)),
            _ => true,
        }
    }

    /// Render `datetime`. A custom format that chrono cannot render falls
    /// back to the default `DateTime` layout instead of failing.
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            TimestampFormat::DateTime => datetime.format(DATE_TIME).to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    return datetime.format(DATE_TIME).to_string();
                }
                out
            }
        }
    }
}
