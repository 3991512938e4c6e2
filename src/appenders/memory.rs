//! In-memory appender
//!
//! Keeps every line it receives. Clones share the same buffer, so a test (or
//! an admin endpoint showing recent output) can hold one clone while the
//! logger owns another.

use crate::core::{Appender, LogLevel, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryAppender {
    entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines with their severity, oldest first
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&self, level: LogLevel, line: &str) -> Result<()> {
        self.entries.lock().push((level, line.to_string()));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
