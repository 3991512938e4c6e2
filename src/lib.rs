//! # logtag
//!
//! Tag-based, colorized logging for request pipelines, plus interceptors that
//! log HTTP exchanges and unary or streaming RPC calls through it.
//!
//! ## Features
//!
//! - **Tag colors**: every line starts with `[tag] `, colored per tag
//! - **Severity floor**: Info, Warning, Error, Fatal
//! - **Interceptors**: one line per HTTP exchange, unary call or stream message
//! - **Observation only**: wrapped handlers and streams see exactly the
//!   values and errors they would see without logging
//!
//! ```
//! use logtag::prelude::*;
//! use std::collections::HashMap;
//!
//! logtag::configure(HashMap::from([("api".to_string(), LogColor::BrightBlue)]));
//! logtag::global().info("api", "hello");
//! ```

pub mod appenders;
pub mod core;
pub mod interceptors;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, MemoryAppender, WriterAppender};
    pub use crate::core::{
        configure, global, set_min_level, to_colored_text, Appender, LogColor, LogLevel,
        LoggerConfig, LoggerError, TagLogger, TagLoggerBuilder, TimestampFormat,
    };
    #[cfg(feature = "http")]
    pub use crate::interceptors::http::{HttpLogLayer, HttpLogger, MethodAndPath};
    pub use crate::interceptors::stream::{
        LoggedStream, MessageStream, RpcError, StreamDesc, StreamError, StreamInterceptor,
    };
    pub use crate::interceptors::unary::UnaryInterceptor;
    pub use crate::interceptors::{CallSide, PayloadPolicy};
}

pub use appenders::{ConsoleAppender, MemoryAppender, WriterAppender};
pub use core::{
    configure, global, set_min_level, to_colored_text, Appender, LineStyle, LogColor, LogLevel,
    LogLine, LoggerConfig, LoggerError, Result, TagLogger, TagLoggerBuilder, TimestampFormat,
};
