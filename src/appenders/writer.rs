//! Appender over any `std::io::Write`

use crate::core::{Appender, LogLevel, LoggerError, Result};
use parking_lot::Mutex;
use std::io::{BufWriter, Write};

/// Buffers lines into an arbitrary writer (a socket, a pipe, an open file
/// handed over by the host process). The mutex serializes concurrent writers.
pub struct WriterAppender<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
    name: String,
}

impl<W: Write + Send> WriterAppender<W> {
    pub fn new(writer: W) -> Self {
        Self::named("writer", writer)
    }

    pub fn named(name: impl Into<String>, writer: W) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            name: name.into(),
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| LoggerError::IoError(e.into_error()))
    }
}

impl<W: Write + Send> Appender for WriterAppender<W> {
    fn append(&self, _level: LogLevel, line: &str) -> Result<()> {
        writeln!(self.writer.lock(), "{}", line)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_lines_to_buffer() {
        let appender = WriterAppender::new(Vec::new());
        appender.append(LogLevel::Info, "first").unwrap();
        appender.append(LogLevel::Error, "second").unwrap();

        let bytes = appender.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_name() {
        let appender = WriterAppender::named("audit-pipe", Vec::new());
        assert_eq!(appender.name(), "audit-pipe");
    }
}
