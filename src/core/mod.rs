//! Core logger types and traits

pub mod appender;
pub mod color;
pub mod config;
pub mod error;
pub mod log_level;
pub mod log_line;
pub mod logger;
pub mod timestamp;

pub use appender::Appender;
pub use color::{to_colored_text, LogColor};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use log_level::LogLevel;
pub use log_line::{LineStyle, LogLine};
pub use logger::{configure, global, set_min_level, TagLogger, TagLoggerBuilder};
pub use timestamp::TimestampFormat;
