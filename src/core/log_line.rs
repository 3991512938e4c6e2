//! Log line composition

use super::color::{to_colored_text, LogColor};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};

/// One line on its way to the appenders. Never stored.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
    /// Set for the print family; leveled lines carry a severity prefix instead
    pub timestamp: Option<DateTime<Local>>,
}

/// How a [`LogLine`] is turned into text
#[derive(Debug, Clone, Copy)]
pub struct LineStyle<'a> {
    pub tag_color: Option<LogColor>,
    pub use_colors: bool,
    pub timestamp_format: &'a TimestampFormat,
}

impl LogLine {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a payload can never forge additional log lines.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Leveled line: `[tag] <SeverityPrefix>message`
    pub fn leveled(level: LogLevel, tag: &str, message: &str) -> Self {
        Self {
            level,
            tag: tag.to_string(),
            message: Self::sanitize_message(message),
            timestamp: None,
        }
    }

    /// Print-family line: `<timestamp> [tag] message`, Info severity
    pub fn timestamped(tag: &str, message: &str) -> Self {
        Self {
            level: LogLevel::Info,
            tag: tag.to_string(),
            message: Self::sanitize_message(message),
            timestamp: Some(Local::now()),
        }
    }

    pub fn render(&self, style: LineStyle<'_>) -> String {
        let paint = |color: LogColor, text: &str| {
            if style.use_colors {
                to_colored_text(color, text)
            } else {
                text.to_string()
            }
        };

        let mut out = String::with_capacity(self.message.len() + self.tag.len() + 48);

        if let Some(ref timestamp) = self.timestamp {
            out.push_str(&paint(
                LogColor::BrightBlack,
                &style.timestamp_format.format(timestamp),
            ));
            out.push(' ');
        }

        if !self.tag.is_empty() {
            let label = format!("[{}] ", self.tag);
            match style.tag_color {
                Some(color) => out.push_str(&paint(color, &label)),
                None => out.push_str(&label),
            }
        }

        if self.timestamp.is_none() {
            let prefix = self.level.prefix();
            if !prefix.is_empty() {
                out.push_str(&paint(self.level.color_code(), prefix));
            }
        }

        out.push_str(&self.message);
        out
    }
}
