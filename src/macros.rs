//! Logging macros for ergonomic log message formatting.
//!
//! Each macro takes the logger, the tag, then `format!`-style arguments. The
//! arguments are only rendered when the line is actually written.
//!
//! # Examples
//!
//! ```
//! use logtag::prelude::*;
//! use logtag::{info, printf};
//!
//! let logger = TagLogger::new();
//!
//! // Basic logging
//! info!(logger, "api", "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "api", "Server listening on port {}", port);
//!
//! // Timestamped line through the process-wide logger
//! printf!(logtag::global(), "api", "{} workers ready", 4);
//! ```

/// Log a message at an explicit severity.
///
/// ```
/// # use logtag::prelude::*;
/// # let logger = TagLogger::new();
/// use logtag::log;
/// log!(logger, LogLevel::Info, "db", "Simple message");
/// log!(logger, LogLevel::Error, "db", "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $tag:expr, $($arg:tt)+) => {
        $logger.logf($tag, $level, format_args!($($arg)+))
    };
}

/// Log an info-level message (no severity prefix).
#[macro_export]
macro_rules! info {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $tag, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use logtag::prelude::*;
/// # let logger = TagLogger::new();
/// use logtag::warn;
/// warn!(logger, "disk", "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $tag, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $tag, $($arg)+)
    };
}

/// Log a fatal-level message, flush, and terminate the process with exit
/// code 1. Meant for startup failures only.
///
/// ```no_run
/// # use logtag::prelude::*;
/// # let logger = TagLogger::new();
/// use logtag::fatal;
/// fatal!(logger, "boot", "Unable to bind port {}", 8080);
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $logger.fatalf($tag, format_args!($($arg)+))
    };
}

/// Timestamped line without a severity prefix.
#[macro_export]
macro_rules! printf {
    ($logger:expr, $tag:expr, $($arg:tt)+) => {
        $logger.printf($tag, format_args!($($arg)+))
    };
}
