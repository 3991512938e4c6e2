//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// A sink for composed log lines.
///
/// Appenders are shared between concurrent callers and serialize their own
/// writes; the logger holds no write lock.
pub trait Appender: Send + Sync {
    fn append(&self, level: LogLevel, line: &str) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}
