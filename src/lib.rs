//! # Byteterm Core Library
//!
//! The data pipeline of a byte-oriented serial/TCP/UDP terminal:
//! - Escape sequence encoding for typed outbound data (`\n`, `\x41`, ...)
//! - Formatting of raw byte buffers into coloured text and hex fragments,
//!   with optional timestamps
//! - A console renderer that accepts fragments at any rate and inserts them
//!   in bounded time slices, wrapping lines manually
//!
//! Transports are not part of this crate: feed received buffers to
//! [`TerminalSession::receive`] and write what [`TerminalSession::send`]
//! returns.
//!
//! ## Example
//!
//! ```rust
//! use byteterm_core::{Console, DisplayConfig, RunLoop, TerminalSession, ViewportMetrics};
//!
//! let run_loop = RunLoop::new();
//! let console = Console::new(run_loop.handle(), ViewportMetrics::default());
//! let mut session = TerminalSession::new(console, DisplayConfig::default());
//!
//! session.receive(b"OK\r\n");
//! let to_write = session.send(b"AT\\r\\n");
//! assert_eq!(&to_write[..], b"AT\r\n");
//!
//! run_loop.run_until_idle();
//! assert_eq!(session.console().renderer().text(), "OK\nAT\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes, OutputFormat, PipeMode};
pub use crate::config::{AppConfig, ConfigError, LineEnding};
pub use crate::core::codec::{Direction, EscapeEncoder};
pub use crate::core::console::{Console, ConsoleQuery, ConsoleRenderer, RunLoop, ViewportMetrics};
pub use crate::core::display::DisplayConfig;
pub use crate::core::format::ByteStreamFormatter;
pub use crate::core::fragment::{ColorClass, StyledFragment};
pub use crate::core::logger::{FileLogSink, LogMode, LogSink, MemoryLogSink};
pub use crate::core::session::TerminalSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
