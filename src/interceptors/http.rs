//! HTTP access logging
//!
//! [`HttpLogger`] turns one finished request/response exchange into one
//! access line:
//!
//! ```text
//! <client-ip> - <hostname> "<method> <path>" <status> <bytes> "<user-agent>" (<latency>ms)
//! ```
//!
//! [`HttpLogLayer`] installs it in any `tower` service stack. Frameworks that
//! are not built on `tower` can fill an [`AccessRecord`] themselves and call
//! [`HttpLogger::log_exchange`].

use super::LoggerRef;
use crate::core::{LogColor, LogLevel, LoggerError, Result, TagLogger};
use http::header::{CONTENT_LENGTH, USER_AGENT};
use http::{HeaderMap, Request, Response};
use http_body::Body;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Layer, Service};

/// Ignore rule: requests with this method whose path (query included) matches
/// the `path` regular expression are not logged while they succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAndPath {
    pub method: String,
    pub path: String,
}

impl MethodAndPath {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct IgnoreRule {
    method: String,
    pattern: Regex,
}

impl IgnoreRule {
    fn compile(rule: &MethodAndPath) -> Result<Self> {
        let pattern =
            Regex::new(&rule.path).map_err(|e| LoggerError::pattern(rule.path.clone(), e))?;
        Ok(Self {
            method: rule.method.clone(),
            pattern,
        })
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method) && self.pattern.is_match(path)
    }
}

/// Errors a handler reports for the current request.
///
/// Handlers attach them to the response with [`attach_error`]; an exchange
/// carrying any of them is logged as a single Error line listing them instead
/// of the access line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerErrors(Vec<String>);

impl HandlerErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.0.push(error.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for HandlerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "Error #{:02}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

/// Record `error` on `response` for the access logger.
pub fn attach_error<B>(response: &mut Response<B>, error: impl fmt::Display) {
    let extensions = response.extensions_mut();
    match extensions.get_mut::<HandlerErrors>() {
        Some(errors) => errors.push(error.to_string()),
        None => {
            let mut errors = HandlerErrors::new();
            errors.push(error.to_string());
            extensions.insert(errors);
        }
    }
}

/// Everything the access line is made of, captured for one exchange
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRecord {
    pub client_ip: String,
    pub method: String,
    /// Path plus `?query` when the request had one
    pub path: String,
    pub status: u16,
    /// Response size as reported; negative means unknown
    pub bytes: i64,
    pub user_agent: String,
    pub latency: Duration,
    pub errors: HandlerErrors,
}

impl AccessRecord {
    /// Request half of the record; the response half is filled by
    /// [`complete`](Self::complete) or [`fail`](Self::fail).
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            client_ip: client_ip(request),
            method: request.method().as_str().to_string(),
            path: path_with_query(request.uri()),
            status: 0,
            bytes: -1,
            user_agent: header_str(request.headers(), USER_AGENT.as_str())
                .unwrap_or_default()
                .to_string(),
            latency: Duration::ZERO,
            errors: HandlerErrors::new(),
        }
    }

    pub fn complete<B: Body>(mut self, response: &Response<B>, latency: Duration) -> Self {
        self.status = response.status().as_u16();
        self.bytes = response_size(response);
        self.latency = latency;
        if let Some(errors) = response.extensions().get::<HandlerErrors>() {
            self.errors = errors.clone();
        }
        self
    }

    /// The handler chain produced no response at all
    pub fn fail(mut self, error: &dyn fmt::Display, latency: Duration) -> Self {
        self.status = 500;
        self.bytes = 0;
        self.latency = latency;
        self.errors.push(error.to_string());
        self
    }

    /// Byte count as written to the log; never negative
    pub fn logged_bytes(&self) -> i64 {
        self.bytes.max(0)
    }

    pub fn latency_millis(&self) -> u128 {
        latency_millis(self.latency)
    }
}

/// Whole milliseconds, rounded up: 1.2ms is 2, 2.0ms stays 2.
pub fn latency_millis(elapsed: Duration) -> u128 {
    elapsed.as_nanos().div_ceil(1_000_000)
}

pub fn status_color(status: u16) -> LogColor {
    match status {
        s if s >= 500 => LogColor::Red,
        400..=499 => LogColor::Yellow,
        _ => LogColor::Green,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn client_ip<B>(request: &Request<B>) -> String {
    let headers = request.headers();
    if let Some(forwarded) = header_str(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header_str(headers, "x-real-ip") {
        return real_ip.to_string();
    }
    request
        .extensions()
        .get::<SocketAddr>()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn path_with_query(uri: &http::Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}

fn response_size<B: Body>(response: &Response<B>) -> i64 {
    header_str(response.headers(), CONTENT_LENGTH.as_str())
        .and_then(|v| v.parse::<i64>().ok())
        .or_else(|| {
            response
                .body()
                .size_hint()
                .exact()
                .and_then(|n| i64::try_from(n).ok())
        })
        .unwrap_or(-1)
}

/// Writes access lines for one tag
#[derive(Debug, Clone)]
pub struct HttpLogger {
    tag: String,
    ignore: Arc<Vec<IgnoreRule>>,
    hostname: String,
    logger: LoggerRef,
}

impl HttpLogger {
    /// Compile the ignore rules and resolve the host name once.
    pub fn new(tag: impl Into<String>, ignore: Vec<MethodAndPath>) -> Result<Self> {
        let rules = ignore
            .iter()
            .map(IgnoreRule::compile)
            .collect::<Result<Vec<_>>>()?;

        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(Self {
            tag: tag.into(),
            ignore: Arc::new(rules),
            hostname,
            logger: LoggerRef::Global,
        })
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<TagLogger>) -> Self {
        self.logger = LoggerRef::Owned(logger);
        self
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn is_ignored(&self, method: &str, path: &str) -> bool {
        self.ignore.iter().any(|rule| rule.matches(method, path))
    }

    pub fn layer(&self) -> HttpLogLayer {
        HttpLogLayer {
            logger: self.clone(),
        }
    }

    /// Log one finished exchange: an Error line for handler errors, nothing
    /// for a successful ignored request, the access line otherwise.
    pub fn log_exchange(&self, record: &AccessRecord) {
        if !record.errors.is_empty() {
            self.logger
                .log(&self.tag, LogLevel::Error, record.errors.to_string());
            return;
        }

        if record.status < 300 && self.is_ignored(&record.method, &record.path) {
            return;
        }

        let level = if record.status >= 500 {
            LogLevel::Error
        } else {
            LogLevel::Info
        };
        if !self.logger.is_enabled(&self.tag, level) {
            return;
        }

        let logger = &*self.logger;
        logger.logf(
            &self.tag,
            level,
            format_args!(
                "{} - {} \"{} {}\" {} {} \"{}\" ({}ms)",
                record.client_ip,
                self.hostname,
                logger.colorize(LogColor::BrightBlue, &record.method),
                logger.colorize(LogColor::BrightBlue, &record.path),
                logger.colorize(status_color(record.status), &record.status.to_string()),
                record.logged_bytes(),
                record.user_agent,
                record.latency_millis()
            ),
        );
    }
}

/// `tower` layer that logs every exchange passing through the wrapped service
#[derive(Debug, Clone)]
pub struct HttpLogLayer {
    logger: HttpLogger,
}

impl HttpLogLayer {
    pub fn new(logger: HttpLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for HttpLogLayer {
    type Service = HttpLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpLogService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpLogService<S> {
    inner: S,
    logger: HttpLogger,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HttpLogService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Body + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // The instance polled ready is the one that must serve the call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let logger = self.logger.clone();
        // Taken before the handlers run; they may rewrite the request
        let record = AccessRecord::from_request(&req);

        Box::pin(async move {
            let start = Instant::now();
            let result = inner.call(req).await;
            let latency = start.elapsed();

            let record = match &result {
                Ok(response) => record.complete(response, latency),
                Err(e) => record.fail(e, latency),
            };
            logger.log_exchange(&record);

            result
        })
    }
}
