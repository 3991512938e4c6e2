//! Console appender implementation

use crate::core::{Appender, LogLevel, Result};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes each line to the process's standard error (default) or standard
/// output. The stdio handle lock serializes concurrent writers.
pub struct ConsoleAppender {
    stream: Stream,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }

    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&self, _level: LogLevel, line: &str) -> Result<()> {
        match self.stream {
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{}", line)?,
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{}", line)?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match self.stream {
            Stream::Stderr => std::io::stderr().flush()?,
            Stream::Stdout => std::io::stdout().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            Stream::Stderr => "console",
            Stream::Stdout => "console-stdout",
        }
    }
}
