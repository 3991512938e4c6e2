//! Tag logger implementation

use super::{
    appender::Appender,
    color::{to_colored_text, LogColor},
    config::LoggerConfig,
    error::Result,
    log_level::LogLevel,
    log_line::{LineStyle, LogLine},
    timestamp::TimestampFormat,
};
use crate::appenders::ConsoleAppender;
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

static GLOBAL: Lazy<TagLogger> = Lazy::new(TagLogger::new);

/// The process-wide logger used by the macros and by interceptors that were
/// not given a logger of their own.
pub fn global() -> &'static TagLogger {
    &GLOBAL
}

/// Replace the tag color registry of the process-wide logger.
pub fn configure(tag_colors: HashMap<String, LogColor>) {
    GLOBAL.configure(tag_colors);
}

/// Replace the severity floor of the process-wide logger.
pub fn set_min_level(level: LogLevel) {
    GLOBAL.set_min_level(level);
}

fn default_use_colors() -> bool {
    #[cfg(feature = "console")]
    {
        colored::control::SHOULD_COLORIZE.should_colorize()
    }
    #[cfg(not(feature = "console"))]
    {
        true
    }
}

/// Snapshot of everything a log call reads. Replaced wholesale on every
/// reconfiguration so a call never observes a half-applied update.
#[derive(Clone)]
struct LoggerState {
    tag_colors: HashMap<String, LogColor>,
    ignored_tags: HashSet<String>,
    min_level: LogLevel,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    appenders: Vec<Arc<dyn Appender>>,
}

impl LoggerState {
    fn enabled(&self, tag: &str, level: LogLevel) -> bool {
        level >= self.min_level && !self.ignored_tags.contains(tag)
    }

    fn style(&self, tag: &str) -> LineStyle<'_> {
        LineStyle {
            tag_color: self.tag_colors.get(tag).copied(),
            use_colors: self.use_colors,
            timestamp_format: &self.timestamp_format,
        }
    }
}

/// Leveled, tag-scoped, colorized logger.
///
/// Every method takes `&self`; configuration changes swap an immutable
/// snapshot, so the hot path costs one atomic load.
///
/// # Example
///
/// ```
/// use logtag::appenders::MemoryAppender;
/// use logtag::{LogColor, LogLevel, TagLogger};
///
/// let memory = MemoryAppender::new();
/// let logger = TagLogger::builder()
///     .tag_color("api", LogColor::BrightBlue)
///     .use_colors(false)
///     .appender(memory.clone())
///     .build();
///
/// logger.info("api", "hello");
/// logger.set_min_level(LogLevel::Error);
/// logger.warn("api", "careful");
///
/// assert_eq!(memory.lines(), vec!["[api] hello".to_string()]);
/// ```
pub struct TagLogger {
    state: ArcSwap<LoggerState>,
}

impl TagLogger {
    /// Logger writing to stderr with no tag colors and an Info floor
    #[must_use]
    pub fn new() -> Self {
        Self::from_state(LoggerState {
            tag_colors: HashMap::new(),
            ignored_tags: HashSet::new(),
            min_level: LogLevel::Info,
            use_colors: default_use_colors(),
            timestamp_format: TimestampFormat::default(),
            appenders: vec![Arc::new(ConsoleAppender::new())],
        })
    }

    fn from_state(state: LoggerState) -> Self {
        Self {
            state: ArcSwap::from_pointee(state),
        }
    }

    #[must_use]
    pub fn builder() -> TagLoggerBuilder {
        TagLoggerBuilder::new()
    }

    fn update(&self, mut change: impl FnMut(&mut LoggerState)) {
        self.state.rcu(|current| {
            let mut next = (**current).clone();
            change(&mut next);
            next
        });
    }

    /// Replace the tag color registry. Last writer wins.
    pub fn configure(&self, tag_colors: HashMap<String, LogColor>) {
        self.update(|state| state.tag_colors = tag_colors.clone());
    }

    /// Replace the set of tags that are never printed
    pub fn ignore_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: HashSet<String> = tags.into_iter().map(Into::into).collect();
        self.update(|state| state.ignored_tags = tags.clone());
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.update(|state| state.min_level = level);
    }

    pub fn set_use_colors(&self, use_colors: bool) {
        self.update(|state| state.use_colors = use_colors);
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) {
        self.update(|state| state.timestamp_format = format.clone());
    }

    pub fn add_appender(&self, appender: Arc<dyn Appender>) {
        self.update(|state| state.appenders.push(Arc::clone(&appender)));
    }

    /// Route all output to `appenders` instead of the current sinks
    pub fn set_appenders(&self, appenders: Vec<Arc<dyn Appender>>) {
        self.update(|state| state.appenders = appenders.clone());
    }

    /// Apply a whole [`LoggerConfig`]. Appenders are left untouched.
    pub fn apply_config(&self, config: &LoggerConfig) {
        let ignored: HashSet<String> = config.ignored_tags.iter().cloned().collect();
        let use_colors = config.use_colors.unwrap_or_else(default_use_colors);
        self.update(|state| {
            state.tag_colors = config.tag_colors.clone();
            state.ignored_tags = ignored.clone();
            state.min_level = config.min_level;
            state.use_colors = use_colors;
            state.timestamp_format = config.timestamp_format.clone();
        });
    }

    pub fn min_level(&self) -> LogLevel {
        self.state.load().min_level
    }

    pub fn use_colors(&self) -> bool {
        self.state.load().use_colors
    }

    /// Whether a line for `tag` at `level` would be written
    pub fn is_enabled(&self, tag: &str, level: LogLevel) -> bool {
        self.state.load().enabled(tag, level)
    }

    /// Decorate `text` with `color` unless the logger is in plain mode
    pub fn colorize(&self, color: LogColor, text: &str) -> String {
        if self.state.load().use_colors {
            to_colored_text(color, text)
        } else {
            text.to_string()
        }
    }

    pub fn log(&self, tag: &str, level: LogLevel, message: impl AsRef<str>) {
        let state = self.state.load();
        if !state.enabled(tag, level) {
            return;
        }
        Self::emit(&state, LogLine::leveled(level, tag, message.as_ref()));
    }

    /// Formatted variant of [`log`](Self::log); arguments are only rendered
    /// when the line is actually written.
    pub fn logf(&self, tag: &str, level: LogLevel, args: fmt::Arguments<'_>) {
        let state = self.state.load();
        if !state.enabled(tag, level) {
            return;
        }
        Self::emit(&state, LogLine::leveled(level, tag, &args.to_string()));
    }

    /// Timestamped Info line without a severity prefix
    pub fn print(&self, tag: &str, message: impl AsRef<str>) {
        let state = self.state.load();
        if !state.enabled(tag, LogLevel::Info) {
            return;
        }
        Self::emit(&state, LogLine::timestamped(tag, message.as_ref()));
    }

    pub fn printf(&self, tag: &str, args: fmt::Arguments<'_>) {
        let state = self.state.load();
        if !state.enabled(tag, LogLevel::Info) {
            return;
        }
        Self::emit(&state, LogLine::timestamped(tag, &args.to_string()));
    }

    #[inline]
    pub fn info(&self, tag: &str, message: impl AsRef<str>) {
        self.log(tag, LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, tag: &str, message: impl AsRef<str>) {
        self.log(tag, LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, tag: &str, message: impl AsRef<str>) {
        self.log(tag, LogLevel::Error, message);
    }

    /// Write a Fatal line, flush, and terminate the process with status 1.
    ///
    /// Only for unrecoverable startup failures. If the tag is ignored or the
    /// floor is above Fatal nothing happens and the call returns.
    pub fn fatal(&self, tag: &str, message: impl AsRef<str>) {
        let state = self.state.load();
        if !state.enabled(tag, LogLevel::Fatal) {
            return;
        }
        Self::emit(&state, LogLine::leveled(LogLevel::Fatal, tag, message.as_ref()));
        self.exit();
    }

    pub fn fatalf(&self, tag: &str, args: fmt::Arguments<'_>) {
        let state = self.state.load();
        if !state.enabled(tag, LogLevel::Fatal) {
            return;
        }
        Self::emit(&state, LogLine::leveled(LogLevel::Fatal, tag, &args.to_string()));
        self.exit();
    }

    fn exit(&self) -> ! {
        if let Err(e) = self.flush() {
            eprintln!("[LOGTAG ERROR] Failed to flush before exit: {}", e);
        }
        std::process::exit(1)
    }

    pub fn flush(&self) -> Result<()> {
        let state = self.state.load();
        for appender in state.appenders.iter() {
            appender.flush()?;
        }
        Ok(())
    }

    /// Write a composed line to every appender
    ///
    /// **Per-Appender Panic Isolation**: a failing or panicking appender is
    /// reported on stderr and the remaining appenders still receive the line.
    fn emit(state: &LoggerState, line: LogLine) {
        let rendered = line.render(state.style(&line.tag));

        for appender in state.appenders.iter() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(line.level, &rendered)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGTAG ERROR] Appender '{}' failed: {}", appender.name(), e);
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGTAG CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_msg
                    );
                }
            }
        }
    }
}

impl Default for TagLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TagLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("TagLogger")
            .field("tag_colors", &state.tag_colors)
            .field("ignored_tags", &state.ignored_tags)
            .field("min_level", &state.min_level)
            .field("use_colors", &state.use_colors)
            .field(
                "appenders",
                &state.appenders.iter().map(|a| a.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for constructing a [`TagLogger`] with a fluent API
///
/// # Example
/// ```
/// use logtag::prelude::*;
///
/// let logger = TagLogger::builder()
///     .min_level(LogLevel::Warning)
///     .tag_color("db", LogColor::Magenta)
///     .ignore_tag("health")
///     .appender(ConsoleAppender::new())
///     .build();
///
/// assert!(!logger.is_enabled("db", LogLevel::Info));
/// assert!(!logger.is_enabled("health", LogLevel::Fatal));
/// ```
pub struct TagLoggerBuilder {
    min_level: LogLevel,
    tag_colors: HashMap<String, LogColor>,
    ignored_tags: HashSet<String>,
    use_colors: Option<bool>,
    timestamp_format: TimestampFormat,
    appenders: Vec<Arc<dyn Appender>>,
}

impl TagLoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            tag_colors: HashMap::new(),
            ignored_tags: HashSet::new(),
            use_colors: None,
            timestamp_format: TimestampFormat::default(),
            appenders: Vec::new(),
        }
    }

    /// Start from a loaded [`LoggerConfig`]
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            min_level: config.min_level,
            tag_colors: config.tag_colors.clone(),
            ignored_tags: config.ignored_tags.iter().cloned().collect(),
            use_colors: config.use_colors,
            timestamp_format: config.timestamp_format.clone(),
            appenders: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tag_color(mut self, tag: impl Into<String>, color: LogColor) -> Self {
        self.tag_colors.insert(tag.into(), color);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn tag_colors(mut self, tag_colors: HashMap<String, LogColor>) -> Self {
        self.tag_colors = tag_colors;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn ignore_tag(mut self, tag: impl Into<String>) -> Self {
        self.ignored_tags.insert(tag.into());
        self
    }

    /// Force color output on or off instead of detecting the terminal
    #[must_use = "builder methods return a new value"]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = Some(use_colors);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Add an appender. Without any, the logger writes to stderr.
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Arc::new(appender));
        self
    }

    pub fn build(self) -> TagLogger {
        let appenders = if self.appenders.is_empty() {
            vec![Arc::new(ConsoleAppender::new()) as Arc<dyn Appender>]
        } else {
            self.appenders
        };

        TagLogger::from_state(LoggerState {
            tag_colors: self.tag_colors,
            ignored_tags: self.ignored_tags,
            min_level: self.min_level,
            use_colors: self.use_colors.unwrap_or_else(default_use_colors),
            timestamp_format: self.timestamp_format,
            appenders,
        })
    }
}

impl Default for TagLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;
    use crate::core::error::LoggerError;

    fn logger_with_memory() -> (TagLogger, MemoryAppender) {
        let memory = MemoryAppender::new();
        let logger = TagLogger::builder()
            .use_colors(false)
            .appender(memory.clone())
            .build();
        (logger, memory)
    }

    #[test]
    fn test_min_level_boundary() {
        let (logger, memory) = logger_with_memory();
        logger.set_min_level(LogLevel::Warning);

        logger.info("svc", "dropped");
        logger.warn("svc", "kept");
        logger.error("svc", "kept too");

        assert_eq!(
            memory.lines(),
            vec![
                "[svc] Warning: kept".to_string(),
                "[svc] Error: kept too".to_string()
            ]
        );
    }

    #[test]
    fn test_colored_tag_scenario() {
        let memory = MemoryAppender::new();
        let logger = TagLogger::builder()
            .use_colors(true)
            .tag_color("api", LogColor::BrightBlue)
            .appender(memory.clone())
            .build();

        logger.info("api", "hello");
        logger.set_min_level(LogLevel::Error);
        logger.warn("api", "careful");

        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "\x1b[38;94m[api] \x1b[0mhello");
    }

    #[test]
    fn test_unknown_tag_is_undecorated() {
        let memory = MemoryAppender::new();
        let logger = TagLogger::builder()
            .use_colors(true)
            .tag_color("api", LogColor::BrightBlue)
            .appender(memory.clone())
            .build();

        logger.info("other", "plain label");
        assert_eq!(memory.lines(), vec!["[other] plain label".to_string()]);
    }

    #[test]
    fn test_ignored_tags() {
        let (logger, memory) = logger_with_memory();
        logger.ignore_tags(["health"]);

        logger.error("health", "never shown");
        logger.print("health", "never shown");
        logger.fatal("health", "ignored fatal returns");
        logger.info("api", "shown");

        assert_eq!(memory.lines(), vec!["[api] shown".to_string()]);
    }

    #[test]
    fn test_logf_formats_arguments() {
        let (logger, memory) = logger_with_memory();
        logger.logf("api", LogLevel::Error, format_args!("code={} path={}", 500, "/x"));
        assert_eq!(memory.lines(), vec!["[api] Error: code=500 path=/x".to_string()]);
    }

    #[test]
    fn test_logf_skips_formatting_when_filtered() {
        struct Exploding;
        impl fmt::Display for Exploding {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a filtered line");
            }
        }

        let (logger, memory) = logger_with_memory();
        logger.set_min_level(LogLevel::Error);
        logger.logf("api", LogLevel::Info, format_args!("{}", Exploding));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_print_is_timestamped_info() {
        let (logger, memory) = logger_with_memory();
        logger.printf("rpc", format_args!("{} started", "stream"));

        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" [rpc] stream started"));
        assert_eq!(memory.entries()[0].0, LogLevel::Info);

        logger.set_min_level(LogLevel::Warning);
        logger.print("rpc", "filtered");
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_print_survives_unknown_timestamp_specifier() {
        let (logger, memory) = logger_with_memory();
        logger.set_timestamp_format(TimestampFormat::Custom("%Q".to_string()));
        logger.printf("rpc", format_args!("{} started", "stream"));

        let lines = memory.lines();
        assert_eq!(lines.len(), 1);
        // default layout "YYYY-MM-DD HH:MM:SS"
        assert_eq!(lines[0].len(), 19 + " [rpc] stream started".len());
        assert!(lines[0].ends_with(" [rpc] stream started"));
    }

    #[test]
    fn test_reconfigure_last_write_wins() {
        let memory = MemoryAppender::new();
        let logger = TagLogger::builder()
            .use_colors(true)
            .appender(memory.clone())
            .build();

        logger.configure(HashMap::from([("a".to_string(), LogColor::Red)]));
        logger.configure(HashMap::from([("a".to_string(), LogColor::Green)]));
        logger.info("a", "x");

        assert_eq!(memory.lines(), vec!["\x1b[38;32m[a] \x1b[0mx".to_string()]);
    }

    #[test]
    fn test_colorize_respects_plain_mode() {
        let (logger, _memory) = logger_with_memory();
        assert_eq!(logger.colorize(LogColor::Red, "500"), "500");

        logger.set_use_colors(true);
        assert_eq!(logger.colorize(LogColor::Red, "500"), "\x1b[38;31m500\x1b[0m");
    }

    #[test]
    fn test_apply_config() {
        let (logger, memory) = logger_with_memory();
        let config = LoggerConfig::from_json(
            r#"{ "min_level": "error", "ignored_tags": ["x"], "use_colors": false }"#,
        )
        .unwrap();
        logger.apply_config(&config);

        assert_eq!(logger.min_level(), LogLevel::Error);
        assert!(!logger.use_colors());
        logger.error("x", "ignored");
        logger.error("y", "kept");
        assert_eq!(memory.lines(), vec!["[y] Error: kept".to_string()]);
    }

    #[test]
    fn test_failing_appender_isolated() {
        struct FailingAppender;

        impl Appender for FailingAppender {
            fn append(&self, _level: LogLevel, _line: &str) -> Result<()> {
                Err(LoggerError::other("Simulated failure"))
            }

            fn flush(&self) -> Result<()> {
                Ok(())
            }

            fn name(&self) -> &str {
                "failing"
            }
        }

        struct PanickingAppender;

        impl Appender for PanickingAppender {
            fn append(&self, _level: LogLevel, _line: &str) -> Result<()> {
                panic!("appender exploded");
            }

            fn flush(&self) -> Result<()> {
                Ok(())
            }

            fn name(&self) -> &str {
                "panicking"
            }
        }

        let memory = MemoryAppender::new();
        let logger = TagLogger::builder()
            .use_colors(false)
            .appender(FailingAppender)
            .appender(PanickingAppender)
            .appender(memory.clone())
            .build();

        logger.info("svc", "still delivered");
        assert_eq!(memory.lines(), vec!["[svc] still delivered".to_string()]);
    }

    #[test]
    fn test_builder_from_config() {
        let config = LoggerConfig::from_json(r#"{ "tag_colors": { "db": "cyan" } }"#).unwrap();
        let memory = MemoryAppender::new();
        let logger = TagLoggerBuilder::from_config(&config)
            .use_colors(true)
            .appender(memory.clone())
            .build();

        logger.warn("db", "slow");
        assert_eq!(
            memory.lines(),
            vec!["\x1b[38;36m[db] \x1b[0m\x1b[38;33mWarning: \x1b[0mslow".to_string()]
        );
    }

    #[test]
    fn test_debug_output() {
        let (logger, _memory) = logger_with_memory();
        let debug = format!("{:?}", logger);
        assert!(debug.contains("memory"));
    }
}
