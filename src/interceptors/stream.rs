//! Streaming call logging
//!
//! A [`LoggedStream`] decorates any [`MessageStream`]. Every send and receive
//! goes to the wrapped stream first; only then is the outcome observed:
//!
//! - end-of-stream is handed back silently,
//! - any other error is written as one Error line and handed back unchanged,
//! - a successful transfer is written as one line, if the stream descriptor
//!   says that direction carries a stream of messages.
//!
//! A session's lifecycle is `started` → per-message lines → `closed`.

use super::{CallSide, LoggerRef, PayloadPolicy, INBOUND, OUTBOUND};
use crate::core::{LogColor, LogLevel, TagLogger};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Static shape of a streaming method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDesc {
    /// Full method name, e.g. `/pkg.Service/Method`
    pub method: String,
    /// The client sends a stream of messages
    pub client_streaming: bool,
    /// The server sends a stream of messages
    pub server_streaming: bool,
}

impl StreamDesc {
    pub fn new(method: impl Into<String>, client_streaming: bool, server_streaming: bool) -> Self {
        Self {
            method: method.into(),
            client_streaming,
            server_streaming,
        }
    }

    pub fn bidirectional(method: impl Into<String>) -> Self {
        Self::new(method, true, true)
    }
}

/// Errors of a message stream. End-of-stream is a terminal condition, not a
/// failure, and is never logged.
pub trait StreamError: fmt::Display {
    fn is_end_of_stream(&self) -> bool;
}

impl StreamError for std::io::Error {
    fn is_end_of_stream(&self) -> bool {
        self.kind() == std::io::ErrorKind::UnexpectedEof
    }
}

/// Ready-made error type for stream implementations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("end of stream")]
    EndOfStream,

    #[error("stream cancelled")]
    Cancelled,

    #[error("rpc error: code = {code} desc = {message}")]
    Status { code: i32, message: String },
}

impl RpcError {
    pub fn status(code: i32, message: impl Into<String>) -> Self {
        RpcError::Status {
            code,
            message: message.into(),
        }
    }
}

impl StreamError for RpcError {
    fn is_end_of_stream(&self) -> bool {
        matches!(self, RpcError::EndOfStream)
    }
}

/// One side of an open message stream, as seen by the code driving it
#[async_trait]
pub trait MessageStream: Send {
    type Inbound: Send;
    type Outbound: Send;
    type Error: StreamError + Send;

    async fn send_msg(&mut self, msg: Self::Outbound) -> Result<(), Self::Error>;

    /// Next message, or an error whose `is_end_of_stream()` is true once the
    /// peer has finished sending
    async fn recv_msg(&mut self) -> Result<Self::Inbound, Self::Error>;

    /// Signal that no more messages will be sent
    async fn close_send(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Per-stream metadata. Fixed for the life of the stream.
#[derive(Debug, Clone)]
pub struct StreamSession {
    tag: String,
    desc: StreamDesc,
    payload: PayloadPolicy,
    side: CallSide,
    logger: LoggerRef,
}

impl StreamSession {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn desc(&self) -> &StreamDesc {
        &self.desc
    }

    pub fn payload(&self) -> PayloadPolicy {
        self.payload
    }

    pub fn side(&self) -> CallSide {
        self.side
    }

    /// Sends are logged only on the leg that carries a stream of messages
    fn logs_sends(&self) -> bool {
        match self.side {
            CallSide::Server => self.desc.server_streaming,
            CallSide::Client => self.desc.client_streaming,
        }
    }

    fn logs_receives(&self) -> bool {
        match self.side {
            CallSide::Server => self.desc.client_streaming,
            CallSide::Client => self.desc.server_streaming,
        }
    }

    fn summarize<T: fmt::Debug>(&self, msg: &T) -> Option<String> {
        if self.logger.is_enabled(&self.tag, LogLevel::Info) {
            Some(self.payload.render(msg))
        } else {
            None
        }
    }

    fn log_started(&self) {
        self.logger.printf(
            &self.tag,
            format_args!(
                "{} {}: streaming started (client streaming: {}, server streaming: {})",
                self.side.request_arrow(),
                self.desc.method,
                self.desc.client_streaming,
                self.desc.server_streaming
            ),
        );
    }

    fn log_closed(&self) {
        self.logger.printf(
            &self.tag,
            format_args!(
                "{} {}: streaming closed",
                self.side.response_arrow(),
                self.desc.method
            ),
        );
    }

    fn log_message(&self, arrow: &str, summary: &str) {
        self.logger.printf(
            &self.tag,
            format_args!("{} {}: {}", arrow, self.desc.method, summary),
        );
    }

    fn log_error(&self, arrow: &str, error: &dyn fmt::Display) {
        self.logger.logf(
            &self.tag,
            LogLevel::Error,
            format_args!(
                "{} {}: {}",
                arrow,
                self.desc.method,
                self.logger.colorize(LogColor::Red, &error.to_string())
            ),
        );
    }
}

/// A [`MessageStream`] that logs every message passing through it.
///
/// Other operations of the wrapped stream are reached through
/// [`get_ref`](Self::get_ref) and [`get_mut`](Self::get_mut).
pub struct LoggedStream<S: MessageStream> {
    inner: S,
    session: StreamSession,
}

impl<S: MessageStream> LoggedStream<S> {
    fn new(inner: S, session: StreamSession) -> Self {
        Self { inner, session }
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

#[async_trait]
impl<S> MessageStream for LoggedStream<S>
where
    S: MessageStream,
    S::Inbound: fmt::Debug,
    S::Outbound: fmt::Debug,
{
    type Inbound = S::Inbound;
    type Outbound = S::Outbound;
    type Error = S::Error;

    async fn send_msg(&mut self, msg: Self::Outbound) -> Result<(), Self::Error> {
        // Rendered up front because the wrapped stream takes the message
        let summary = if self.session.logs_sends() {
            self.session.summarize(&msg)
        } else {
            None
        };

        let result = self.inner.send_msg(msg).await;

        match &result {
            Err(e) if e.is_end_of_stream() => {}
            Err(e) => self.session.log_error(OUTBOUND, e),
            Ok(()) => {
                if let Some(summary) = summary {
                    self.session.log_message(OUTBOUND, &summary);
                }
            }
        }
        result
    }

    async fn recv_msg(&mut self) -> Result<Self::Inbound, Self::Error> {
        let result = self.inner.recv_msg().await;

        match &result {
            Err(e) if e.is_end_of_stream() => {}
            Err(e) => self.session.log_error(INBOUND, e),
            Ok(msg) => {
                if self.session.logs_receives() {
                    if let Some(summary) = self.session.summarize(msg) {
                        self.session.log_message(INBOUND, &summary);
                    }
                }
            }
        }
        result
    }

    async fn close_send(&mut self) -> Result<(), Self::Error> {
        self.inner.close_send().await
    }
}

impl<S: MessageStream> Drop for LoggedStream<S> {
    fn drop(&mut self) {
        // Server sessions are closed by `StreamInterceptor::intercept`, which
        // knows the handler's result
        if self.session.side == CallSide::Client {
            self.session.log_closed();
        }
    }
}

/// Factory for logged stream sessions
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use logtag::interceptors::stream::{MessageStream, RpcError, StreamDesc, StreamInterceptor};
///
/// struct Echo(Vec<String>);
///
/// #[async_trait]
/// impl MessageStream for Echo {
///     type Inbound = String;
///     type Outbound = String;
///     type Error = RpcError;
///
///     async fn send_msg(&mut self, msg: String) -> Result<(), RpcError> {
///         self.0.push(msg);
///         Ok(())
///     }
///
///     async fn recv_msg(&mut self) -> Result<String, RpcError> {
///         Err(RpcError::EndOfStream)
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let interceptor = StreamInterceptor::server("grpc", true);
/// let desc = StreamDesc::new("/chat.Room/Listen", false, true);
///
/// let result = interceptor
///     .intercept(&desc, Echo(Vec::new()), |mut stream| async move {
///         stream.send_msg("hello".to_string()).await?;
///         assert_eq!(stream.get_ref().0, vec!["hello".to_string()]);
///         Ok::<(), RpcError>(())
///     })
///     .await;
/// assert!(result.is_ok());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct StreamInterceptor {
    tag: String,
    payload: PayloadPolicy,
    side: CallSide,
    logger: LoggerRef,
}

impl StreamInterceptor {
    pub fn server(tag: impl Into<String>, payload: impl Into<PayloadPolicy>) -> Self {
        Self::new(CallSide::Server, tag, payload)
    }

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

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<TagLogger>) -> Self {
        self.logger = LoggerRef::Owned(logger);
        self
    }

    fn session(&self, desc: &StreamDesc) -> StreamSession {
        StreamSession {
            tag: self.tag.clone(),
            desc: desc.clone(),
            payload: self.payload,
            side: self.side,
            logger: self.logger.clone(),
        }
    }

    /// Serve one stream: log the start, drive `handler` with the logged
    /// stream, then log how it closed. The handler's result is returned
    /// unchanged.
    pub async fn intercept<S, E, F, Fut>(&self, desc: &StreamDesc, stream: S, handler: F) -> Result<(), E>
    where
        S: MessageStream,
        E: StreamError,
        F: FnOnce(LoggedStream<S>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let session = self.session(desc);
        session.log_started();

        let result = handler(LoggedStream::new(stream, session.clone())).await;

        match &result {
            Err(e) if !e.is_end_of_stream() => {
                session.log_error(session.side.response_arrow(), e);
            }
            _ => session.log_closed(),
        }
        result
    }

    /// Open a client stream through `opener` and wrap it. An opening failure
    /// is logged and returned; the returned stream logs `streaming closed`
    /// when dropped.
    pub async fn open<S, F, Fut>(&self, desc: &StreamDesc, opener: F) -> Result<LoggedStream<S>, S::Error>
    where
        S: MessageStream,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, S::Error>>,
    {
        let session = self.session(desc);
        session.log_started();

        match opener().await {
            Ok(stream) => Ok(LoggedStream::new(stream, session)),
            Err(e) => {
                if !e.is_end_of_stream() {
                    session.log_error(session.side.response_arrow(), &e);
                }
                Err(e)
            }
        }
    }
}
