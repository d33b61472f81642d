//! Terminal session: the data pipeline between a transport and the console
//!
//! A `TerminalSession` takes received buffers and send requests, runs them
//! through the formatter into the console, mirrors them to the log, keeps
//! byte counters and answers auto-reply triggers. Transport I/O stays with
//! the caller: `send` returns the bytes to write.

use bytes::Bytes;

use crate::config::LineEnding;
use crate::core::auto_reply::{AutoReply, AutoReplySettings};
use crate::core::codec::{Direction, SendEncoding};
use crate::core::console::Console;
use crate::core::display::DisplayConfig;
use crate::core::format::{ByteStreamFormatter, Clock, SystemClock};
use crate::core::fragment::{ColorClass, StyledFragment};
use crate::core::logger::{LogMode, LogSink};

/// Received and transmitted byte totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteCounters {
    /// Bytes received
    pub rx: u64,
    /// Bytes transmitted
    pub tx: u64,
}

struct ActiveLog {
    sink: Box<dyn LogSink>,
    mode: LogMode,
}

/// Data pipeline for one terminal session
pub struct TerminalSession<C: Clock = SystemClock> {
    config: DisplayConfig,
    formatter: ByteStreamFormatter<C>,
    console: Console,
    log: Option<ActiveLog>,
    log_status: Option<String>,
    counters: ByteCounters,
    auto_reply: Option<AutoReply>,
    line_ending: LineEnding,
}

impl<C: Clock> std::fmt::Debug for TerminalSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("config", &self.config)
            .field("counters", &self.counters)
            .field("logging", &self.log.is_some())
            .finish_non_exhaustive()
    }
}

impl TerminalSession {
    /// Create a session rendering into `console`
    pub fn new(console: Console, config: DisplayConfig) -> Self {
        Self::with_formatter(console, config, ByteStreamFormatter::new())
    }
}

impl<C: Clock> TerminalSession<C> {
    /// Create a session with a custom formatter (and clock)
    pub fn with_formatter(
        console: Console,
        config: DisplayConfig,
        formatter: ByteStreamFormatter<C>,
    ) -> Self {
        Self {
            config,
            formatter,
            console,
            log: None,
            log_status: None,
            counters: ByteCounters::default(),
            auto_reply: None,
            line_ending: LineEnding::default(),
        }
    }

    /// Current display configuration
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Replace the display configuration; applies from the next buffer
    pub fn set_config(&mut self, config: DisplayConfig) {
        self.config = config;
    }

    /// Mutable access for live toggles
    pub fn config_mut(&mut self) -> &mut DisplayConfig {
        &mut self.config
    }

    /// The console
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Line ending appended by [`send_line`](Self::send_line)
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Configure auto-reply (clears any partial match)
    pub fn set_auto_reply(&mut self, settings: &AutoReplySettings) {
        self.auto_reply = AutoReply::from_settings(settings);
    }

    /// Handle a received buffer.
    ///
    /// Returns encoded auto-reply buffers that must be written to the
    /// transport, in order.
    pub fn receive(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.counters.rx += data.len() as u64;

        self.display(data, Direction::Inbound);
        if self.log_mode() == Some(LogMode::Raw) {
            self.log_write(data);
        }

        let replies = match self.auto_reply.as_mut() {
            Some(auto_reply) => auto_reply.feed(data),
            None => Vec::new(),
        };

        self.log_flush();

        replies.into_iter().map(|reply| self.send(&reply)).collect()
    }

    /// Prepare typed data for sending.
    ///
    /// Escape sequences are replaced if enabled, the data is echoed to the
    /// console if enabled, and the bytes to write are returned.
    pub fn send(&mut self, data: &[u8]) -> Bytes {
        let encoded =
            SendEncoding::from_flag(self.config.replace_escape_sequences_on_send).encode(data);
        self.counters.tx += encoded.len() as u64;

        if self.config.show_sent_data_in_console {
            self.display(&encoded, Direction::Outbound);
        }

        self.log_flush();
        encoded
    }

    /// Send `text` followed by the configured line ending
    pub fn send_line(&mut self, text: &str) -> Bytes {
        let mut data = text.as_bytes().to_vec();
        data.extend_from_slice(self.line_ending.bytes());
        self.send(&data)
    }

    /// Print a status line (e.g. `[serial] Port opened`)
    pub fn print(&mut self, message: &str, color: ColorClass) {
        let fragment = StyledFragment::new(format!("{message}\n"), color);
        self.emit(std::slice::from_ref(&fragment));
        self.log_flush();
    }

    /// Clear the console; counters and formatter state are kept
    pub fn clear(&mut self) {
        tracing::info!("Console cleared");
        self.console.clear();
    }

    /// Byte counters
    pub fn counters(&self) -> ByteCounters {
        self.counters
    }

    /// Reset byte counters
    pub fn reset_counters(&mut self) {
        self.counters = ByteCounters::default();
    }

    /// Start mirroring to `sink`; replaces any active log
    pub fn start_log(&mut self, sink: Box<dyn LogSink>, mode: LogMode) {
        self.stop_log();
        tracing::info!(mode = mode.name(), "Logging started");
        self.log = Some(ActiveLog { sink, mode });
        self.log_status = None;
    }

    /// Stop logging, flushing the sink
    pub fn stop_log(&mut self) {
        if let Some(mut log) = self.log.take() {
            if let Err(e) = log.sink.flush() {
                tracing::warn!(error = %e, "Failed to flush log");
            }
            tracing::info!("Logging stopped");
        }
    }

    /// Whether a log is active
    pub fn is_logging(&self) -> bool {
        self.log.is_some()
    }

    /// Last log error, if any
    pub fn log_status(&self) -> Option<&str> {
        self.log_status.as_deref()
    }

    fn display(&mut self, data: &[u8], direction: Direction) {
        let fragments = self
            .formatter
            .format(data, direction, &self.config, &self.console);
        self.emit(&fragments);
    }

    fn emit(&mut self, fragments: &[StyledFragment]) {
        self.console.append(fragments);
        if self.log_mode() == Some(LogMode::AsDisplayed) {
            for fragment in fragments {
                self.log_write(fragment.text.as_bytes());
            }
        }
    }

    fn log_mode(&self) -> Option<LogMode> {
        self.log.as_ref().map(|log| log.mode)
    }

    fn log_write(&mut self, data: &[u8]) {
        let Some(log) = self.log.as_mut() else {
            return;
        };
        if let Err(e) = log.sink.write(data) {
            tracing::warn!(error = %e, "Log write failed");
            self.log_status = Some(e.to_string());
        }
    }

    fn log_flush(&mut self) {
        let Some(log) = self.log.as_mut() else {
            return;
        };
        if let Err(e) = log.sink.flush() {
            tracing::warn!(error = %e, "Log flush failed");
            self.log_status = Some(e.to_string());
        }
    }
}

impl<C: Clock> Drop for TerminalSession<C> {
    fn drop(&mut self) {
        self.stop_log();
    }
}
