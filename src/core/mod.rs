//! Core module containing the data pipeline of Byteterm
//!
//! This module provides:
//! - Escape sequence encoding for outbound data
//! - Byte stream formatting (text, hex, timestamps) into styled fragments
//! - A queued, time-sliced console renderer with manual line wrapping
//! - Session facade with logging, byte counters and auto-reply

pub mod auto_reply;
pub mod codec;
pub mod console;
pub mod display;
pub mod format;
pub mod fragment;
pub mod logger;
pub mod session;

pub use auto_reply::{AutoReply, AutoReplySettings};
pub use codec::{Direction, EscapeEncoder, SendEncoding};
pub use console::{Console, ConsoleQuery, ConsoleRenderer, RunLoop, RunLoopHandle, ViewportMetrics};
pub use display::DisplayConfig;
pub use format::{ByteStreamFormatter, Clock, FormatterSessionState, SystemClock};
pub use fragment::{ColorClass, StyledFragment};
pub use logger::{FileLogSink, LogError, LogMode, LogSink, MemoryLogSink};
pub use session::{ByteCounters, TerminalSession};
