//! Request/response interceptors
//!
//! Every interceptor only observes: it forwards requests, messages and errors
//! untouched and writes at most one line per observed event through a
//! [`TagLogger`].

#[cfg(feature = "http")]
pub mod http;
pub mod stream;
pub mod unary;

use crate::core::{global, TagLogger};
use std::fmt::{self, Write as _};
use std::ops::Deref;
use std::sync::Arc;

/// Marker for traffic arriving at this process
pub const INBOUND: &str = "↘️";
/// Marker for traffic leaving this process
pub const OUTBOUND: &str = "↗️";

/// Shown instead of a message when payload logging is off
pub const PAYLOAD_PLACEHOLDER: &str = "<payload truncated>";

/// Character cap applied when payload logging is switched on with a plain `true`
pub const DEFAULT_PAYLOAD_LIMIT: usize = 500;

/// Which end of a call the interceptor is installed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSide {
    Server,
    Client,
}

impl CallSide {
    /// Arrow for the request leg (and stream start) of a call
    pub fn request_arrow(&self) -> &'static str {
        match self {
            CallSide::Server => INBOUND,
            CallSide::Client => OUTBOUND,
        }
    }

    /// Arrow for the response leg (and stream end) of a call
    pub fn response_arrow(&self) -> &'static str {
        match self {
            CallSide::Server => OUTBOUND,
            CallSide::Client => INBOUND,
        }
    }
}

/// How message contents appear in log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadPolicy {
    /// Only [`PAYLOAD_PLACEHOLDER`] is written
    Hidden,
    /// The `Debug` rendering, cut after this many characters
    Truncated(usize),
    /// The whole `Debug` rendering
    Full,
}

impl Default for PayloadPolicy {
    fn default() -> Self {
        PayloadPolicy::Truncated(DEFAULT_PAYLOAD_LIMIT)
    }
}

impl From<bool> for PayloadPolicy {
    fn from(log_payload: bool) -> Self {
        if log_payload {
            PayloadPolicy::Truncated(DEFAULT_PAYLOAD_LIMIT)
        } else {
            PayloadPolicy::Hidden
        }
    }
}

impl PayloadPolicy {
    /// Text used for `payload` in a log line. The payload itself is only
    /// borrowed; truncation affects the rendering alone.
    pub fn render<T: fmt::Debug + ?Sized>(&self, payload: &T) -> String {
        match *self {
            PayloadPolicy::Hidden => PAYLOAD_PLACEHOLDER.to_string(),
            PayloadPolicy::Full => format!("{:?}", payload),
            PayloadPolicy::Truncated(limit) => {
                let mut writer = CharLimitedWriter::new(limit);
                // An error here only means the limit was reached
                let _ = write!(writer, "{:?}", payload);
                writer.buf
            }
        }
    }
}

/// Collects formatter output and refuses everything past `remaining` chars,
/// so huge messages are never rendered in full just to be cut.
struct CharLimitedWriter {
    buf: String,
    remaining: usize,
}

impl CharLimitedWriter {
    fn new(limit: usize) -> Self {
        Self {
            buf: String::new(),
            remaining: limit,
        }
    }
}

impl fmt::Write for CharLimitedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match s.char_indices().nth(self.remaining) {
            Some((cut, _)) => {
                self.buf.push_str(&s[..cut]);
                self.remaining = 0;
                Err(fmt::Error)
            }
            None => {
                self.buf.push_str(s);
                self.remaining -= s.chars().count();
                Ok(())
            }
        }
    }
}

/// The logger an interceptor writes to: the process-wide one unless a
/// dedicated logger was supplied.
#[derive(Clone, Default)]
pub(crate) enum LoggerRef {
    #[default]
    Global,
    Owned(Arc<TagLogger>),
}

impl Deref for LoggerRef {
    type Target = TagLogger;

    fn deref(&self) -> &TagLogger {
        match self {
            LoggerRef::Global => global(),
            LoggerRef::Owned(logger) => logger,
        }
    }
}

impl fmt::Debug for LoggerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerRef::Global => f.write_str("Global"),
            LoggerRef::Owned(_) => f.write_str("Owned"),
        }
    }
}
