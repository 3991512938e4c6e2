//! Unary call logging for RPC servers and clients
//!
//! One line is written when the call starts (request) and one when it ends
//! (response or error). The outcome of the wrapped handler is returned as-is.
//!
//! ```
//! use logtag::appenders::MemoryAppender;
//! use logtag::interceptors::unary::UnaryInterceptor;
//! use logtag::TagLogger;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let memory = MemoryAppender::new();
//! let logger = Arc::new(TagLogger::builder().use_colors(false).appender(memory.clone()).build());
//! let interceptor = UnaryInterceptor::server("grpc", true).with_logger(logger);
//!
//! let reply: Result<u32, String> = interceptor
//!     .intercept("/math.Calc/Double", 21u32, |n| async move { Ok(n * 2) })
//!     .await;
//!
//! assert_eq!(reply, Ok(42));
//! assert_eq!(memory.len(), 2);
//! # });
//! ```

use super::{CallSide, LoggerRef, PayloadPolicy};
use crate::core::{LogColor, LogLevel, TagLogger};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// A unary call in flight: created when the call begins and logged exactly
/// once when it ends.
#[derive(Debug)]
pub struct CallRecord<'a> {
    pub side: CallSide,
    pub method: &'a str,
    pub request_summary: String,
    pub started: Instant,
}

#[derive(Debug, Clone)]
pub struct UnaryInterceptor {
    tag: String,
    payload: PayloadPolicy,
    side: CallSide,
    logger: LoggerRef,
}

impl UnaryInterceptor {
    /// Interceptor for calls this process serves
    pub fn server(tag: impl Into<String>, payload: impl Into<PayloadPolicy>) -> Self {
        Self::new(CallSide::Server, tag, payload)
    }

    /// Interceptor for calls this process makes
    pub fn client(tag: impl Into<String>, payload: impl Into<PayloadPolicy>) -> Self {
        Self::new(CallSide::Client, tag, payload)
    }

    fn new(side: CallSide, tag: impl Into<String>, payload: impl Into<PayloadPolicy>) -> Self {
        Self {
            tag: tag.into(),
            payload: payload.into(),
            side,
            logger: LoggerRef::Global,
        }
    }

    /// Write to `logger` instead of the process-wide logger
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<TagLogger>) -> Self {
        self.logger = LoggerRef::Owned(logger);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn side(&self) -> CallSide {
        self.side
    }

    /// Log `request`, run `handler`, log its outcome and return it unchanged.
    pub async fn intercept<Req, Resp, E, F, Fut>(
        &self,
        method: &str,
        request: Req,
        handler: F,
    ) -> Result<Resp, E>
    where
        Req: fmt::Debug,
        Resp: fmt::Debug,
        E: fmt::Display,
        F: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
    {
        let record = self.begin(method, &request);
        let result = handler(request).await;
        self.finish(record, &result);
        result
    }

    /// Start a call by hand, for frameworks that do not hand over a closure.
    /// Pair with [`finish`](Self::finish).
    pub fn begin<'a, Req: fmt::Debug + ?Sized>(&self, method: &'a str, request: &Req) -> CallRecord<'a> {
        let record = CallRecord {
            side: self.side,
            method,
            request_summary: self.summarize(request),
            started: Instant::now(),
        };
        self.logger.printf(
            &self.tag,
            format_args!(
                "{} {}: {}",
                record.side.request_arrow(),
                record.method,
                record.request_summary
            ),
        );
        record
    }

    pub fn finish<Resp: fmt::Debug, E: fmt::Display>(
        &self,
        record: CallRecord<'_>,
        result: &Result<Resp, E>,
    ) {
        let arrow = record.side.response_arrow();
        match result {
            Ok(response) => {
                self.logger.printf(
                    &self.tag,
                    format_args!("{} {}: {}", arrow, record.method, self.summarize(response)),
                );
            }
            Err(e) => {
                self.logger.logf(
                    &self.tag,
                    LogLevel::Error,
                    format_args!(
                        "{} {}: {}",
                        arrow,
                        record.method,
                        self.logger.colorize(LogColor::Red, &e.to_string())
                    ),
                );
            }
        }
    }

    fn summarize<T: fmt::Debug + ?Sized>(&self, payload: &T) -> String {
        // Skip rendering entirely when the line would be filtered
        if self.logger.is_enabled(&self.tag, LogLevel::Info) {
            self.payload.render(payload)
        } else {
            String::new()
        }
    }
}
