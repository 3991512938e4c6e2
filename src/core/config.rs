//! Process-wide logger configuration
//!
//! ```
//! use logtag::{LogColor, LogLevel, LoggerConfig};
//!
//! let config = LoggerConfig::from_json(
//!     r#"{
//!         "tag_colors": { "api": "BrightBlue", "db": "magenta" },
//!         "ignored_tags": ["noisy"],
//!         "min_level": "warning"
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.tag_colors["api"], LogColor::BrightBlue);
//! assert_eq!(config.min_level, LogLevel::Warning);
//! ```

use super::color::LogColor;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Tag label colors. Tags not listed are printed undecorated.
    pub tag_colors: HashMap<String, LogColor>,
    /// Tags whose lines are dropped at every severity
    pub ignored_tags: Vec<String>,
    pub min_level: LogLevel,
    /// `None` leaves the decision to terminal detection
    pub use_colors: Option<bool>,
    pub timestamp_format: TimestampFormat,
}

impl LoggerConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ignored_tags.iter().any(|tag| tag.is_empty()) {
            return Err(LoggerError::config(
                "LoggerConfig",
                "ignored_tags must not contain an empty tag",
            ));
        }
        if let TimestampFormat::Custom(ref format) = self.timestamp_format {
            if !self.timestamp_format.is_valid() {
                return Err(LoggerError::config(
                    "LoggerConfig",
                    format!("invalid custom timestamp format '{}'", format),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::from_json("{}").unwrap();
        assert!(config.tag_colors.is_empty());
        assert_eq!(config.min_level, LogLevel::Info);
        assert_eq!(config.use_colors, None);
        assert_eq!(config.timestamp_format, TimestampFormat::DateTime);
    }

    #[test]
    fn test_full_config() {
        let config = LoggerConfig::from_json(
            r#"{
                "tag_colors": { "grpc": "bright_green" },
                "ignored_tags": ["health"],
                "min_level": "ERROR",
                "use_colors": false,
                "timestamp_format": { "Custom": "%H:%M" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.tag_colors["grpc"], LogColor::BrightGreen);
        assert_eq!(config.ignored_tags, vec!["health".to_string()]);
        assert_eq!(config.min_level, LogLevel::Error);
        assert_eq!(config.use_colors, Some(false));
        assert_eq!(
            config.timestamp_format,
            TimestampFormat::Custom("%H:%M".to_string())
        );
    }

    #[test]
    fn test_unknown_color_rejected() {
        let err = LoggerConfig::from_json(r#"{ "tag_colors": { "api": "orange" } }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_unknown_timestamp_specifier_rejected() {
        let err = LoggerConfig::from_json(r#"{ "timestamp_format": { "Custom": "%Q" } }"#)
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("%Q"));
    }

    #[test]
    fn test_empty_ignored_tag_rejected() {
        let err = LoggerConfig::from_json(r#"{ "ignored_tags": [""] }"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
