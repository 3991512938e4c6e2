//! Log level definitions

use super::color::LogColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    #[default]
    Info = 0,
    Warning = 1,
    Error = 2,
    Fatal = 3,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Text placed in front of the message of a leveled line.
    ///
    /// Info lines carry no prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "",
            LogLevel::Warning => "Warning: ",
            LogLevel::Error => "Error: ",
            LogLevel::Fatal => "Fatal: ",
        }
    }

    pub fn color_code(&self) -> LogColor {
        match self {
            LogLevel::Info => LogColor::Reset,
            LogLevel::Warning => LogColor::Yellow,
            LogLevel::Error | LogLevel::Fatal => LogColor::Red,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.to_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_parse() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("FATAL".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_prefix_colors() {
        assert_eq!(LogLevel::Info.prefix(), "");
        assert_eq!(LogLevel::Warning.color_code(), LogColor::Yellow);
        assert_eq!(LogLevel::Error.color_code(), LogColor::Red);
        assert_eq!(LogLevel::Fatal.color_code(), LogColor::Red);
    }

    #[test]
    fn test_try_from_string() {
        assert_eq!(LogLevel::try_from("error".to_string()), Ok(LogLevel::Error));
        assert!(LogLevel::try_from("loud".to_string()).is_err());
    }

    #[test]
    fn test_serde_names() {
        let level: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(level, LogLevel::Error);
        assert_eq!(serde_json::to_string(&LogLevel::Warning).unwrap(), "\"WARNING\"");
    }
}
