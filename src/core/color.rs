//! Terminal colors used for tags, severity prefixes and interceptor fields
//!
//! The escape codes are a fixed table: every component that decorates text
//! goes through [`LogColor::escape_code`] so lines stay visually consistent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Grey,
    Reset,
}

impl LogColor {
    pub const ALL: [LogColor; 18] = [
        LogColor::Black,
        LogColor::Red,
        LogColor::Green,
        LogColor::Yellow,
        LogColor::Blue,
        LogColor::Magenta,
        LogColor::Cyan,
        LogColor::White,
        LogColor::BrightBlack,
        LogColor::BrightRed,
        LogColor::BrightGreen,
        LogColor::BrightYellow,
        LogColor::BrightBlue,
        LogColor::BrightMagenta,
        LogColor::BrightCyan,
        LogColor::BrightWhite,
        LogColor::Grey,
        LogColor::Reset,
    ];

    /// ANSI control sequence selecting this color
    pub const fn escape_code(&self) -> &'static str {
        match self {
            LogColor::Black => "\x1b[38;30m",
            LogColor::Red => "\x1b[38;31m",
            LogColor::Green => "\x1b[38;32m",
            LogColor::Yellow => "\x1b[38;33m",
            LogColor::Blue => "\x1b[38;34m",
            LogColor::Magenta => "\x1b[38;35m",
            LogColor::Cyan => "\x1b[38;36m",
            LogColor::White => "\x1b[38;37m",
            LogColor::BrightBlack => "\x1b[38;90m",
            LogColor::BrightRed => "\x1b[38;91m",
            LogColor::BrightGreen => "\x1b[38;92m",
            LogColor::BrightYellow => "\x1b[38;93m",
            LogColor::BrightBlue => "\x1b[38;94m",
            LogColor::BrightMagenta => "\x1b[38;95m",
            LogColor::BrightCyan => "\x1b[38;96m",
            LogColor::BrightWhite => "\x1b[38;97m",
            LogColor::Grey => "\x1b[38;5;247m",
            LogColor::Reset => "\x1b[0m",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogColor::Black => "Black",
            LogColor::Red => "Red",
            LogColor::Green => "Green",
            LogColor::Yellow => "Yellow",
            LogColor::Blue => "Blue",
            LogColor::Magenta => "Magenta",
            LogColor::Cyan => "Cyan",
            LogColor::White => "White",
            LogColor::BrightBlack => "BrightBlack",
            LogColor::BrightRed => "BrightRed",
            LogColor::BrightGreen => "BrightGreen",
            LogColor::BrightYellow => "BrightYellow",
            LogColor::BrightBlue => "BrightBlue",
            LogColor::BrightMagenta => "BrightMagenta",
            LogColor::BrightCyan => "BrightCyan",
            LogColor::BrightWhite => "BrightWhite",
            LogColor::Grey => "Grey",
            LogColor::Reset => "Reset",
        }
    }
}

/// Wrap `text` in the escape code of `color` followed by a reset.
///
/// Pure: needs no logger configuration and ignores plain mode. Use
/// [`TagLogger::colorize`](crate::TagLogger::colorize) for text that should
/// honour the logger's color setting.
///
/// ```
/// use logtag::{to_colored_text, LogColor};
///
/// assert_eq!(to_colored_text(LogColor::Red, "X"), "\x1b[38;31mX\x1b[0m");
/// ```
pub fn to_colored_text(color: LogColor, text: &str) -> String {
    let mut out = String::with_capacity(
        color.escape_code().len() + text.len() + LogColor::Reset.escape_code().len(),
    );
    out.push_str(color.escape_code());
    out.push_str(text);
    out.push_str(LogColor::Reset.escape_code());
    out
}

impl fmt::Display for LogColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogColor {
    type Err = String;

    /// Accepts `BrightBlue`, `brightblue`, `bright_blue` and `bright-blue`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        LogColor::ALL
            .into_iter()
            .find(|color| color.name().to_lowercase() == normalized)
            .or(if normalized == "gray" { Some(LogColor::Grey) } else { None })
            .ok_or_else(|| format!("Invalid log color: '{}'", s))
    }
}

impl TryFrom<String> for LogColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogColor> for String {
    fn from(color: LogColor) -> Self {
        color.name().to_string()
    }
}
