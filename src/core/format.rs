//! Byte stream formatter
//!
//! Turns raw inbound/outbound byte buffers into ordered, styled fragments
//! according to the live [`DisplayConfig`]. Decisions that depend on where
//! the console cursor is (hex spacing, wrap avoidance, timestamps) are made
//! against a projection of the console's line state that is advanced as
//! fragments are emitted.

use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime};

use crate::core::codec::{push_hex_pair, Direction};
use crate::core::console::{ConsoleQuery, LineLayout};
use crate::core::display::DisplayConfig;
use crate::core::fragment::{ColorClass, StyledFragment};

/// Columns a hex pair needs on the current line, including its separator
const HEX_PAIR_COLUMNS: usize = 4;

/// Time source for timestamps
pub trait Clock {
    /// Monotonic instant used for the timestamp rate limit
    fn now(&self) -> Instant;

    /// Local wall-clock time shown in timestamps
    fn wall_time(&self) -> NaiveTime;
}

/// Clock backed by the system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// State carried between formatter calls for the whole session
#[derive(Debug, Clone, Default)]
pub struct FormatterSessionState {
    /// When the last timestamp was shown (unset until the first one)
    pub last_timestamp: Option<Instant>,
    /// Whether the last fragment was hex, so following text gets a space
    pub last_output_was_hex: bool,
}

/// What a single byte renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteOutput {
    hex: bool,
    normal: bool,
}

impl ByteOutput {
    fn classify(byte: u8, config: &DisplayConfig) -> Self {
        // Hex mode renders everything as hex, CR/LF included
        if config.hex_mode {
            return Self {
                hex: true,
                normal: false,
            };
        }

        match byte {
            b'\n' => Self {
                hex: config.show_crlf_hex,
                normal: config.crlf_as_newline,
            },
            b'\r' => Self {
                hex: config.show_crlf_hex,
                normal: false,
            },
            b'\t' => Self {
                hex: false,
                normal: true,
            },
            0x00..=0x1f | 0x7f => Self {
                hex: config.hex_for_special_chars,
                normal: !config.hex_for_special_chars,
            },
            _ => Self {
                hex: false,
                normal: true,
            },
        }
    }
}

/// Collects fragments while projecting their effect on the console line
struct FragmentWriter {
    fragments: Vec<StyledFragment>,
    line: LineLayout,
}

impl FragmentWriter {
    fn new(line: LineLayout) -> Self {
        Self {
            fragments: Vec::new(),
            line,
        }
    }

    fn push(&mut self, text: &str, color: ColorClass) {
        if text.is_empty() {
            return;
        }
        self.line.advance(text);
        match self.fragments.last_mut() {
            Some(last) if last.color == color => last.text.push_str(text),
            _ => self.fragments.push(StyledFragment::new(text, color)),
        }
    }

    fn at_newline(&self) -> bool {
        self.line.last_added_was_newline()
    }
}

/// Formatter for raw byte buffers
#[derive(Debug, Default)]
pub struct ByteStreamFormatter<C: Clock = SystemClock> {
    state: FormatterSessionState,
    clock: C,
}

impl ByteStreamFormatter {
    /// Create a formatter using the system clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> ByteStreamFormatter<C> {
    /// Create a formatter with a custom clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: FormatterSessionState::default(),
            clock,
        }
    }

    /// Session state
    pub fn state(&self) -> &FormatterSessionState {
        &self.state
    }

    /// Format one buffer.
    ///
    /// `console` is only read; the returned fragments must be appended to it
    /// in order before the next call.
    pub fn format(
        &mut self,
        data: &[u8],
        direction: Direction,
        config: &DisplayConfig,
        console: &dyn ConsoleQuery,
    ) -> Vec<StyledFragment> {
        let mut out = FragmentWriter::new(console.snapshot());
        if data.is_empty() {
            return out.fragments;
        }

        let now = self.clock.now();
        let time_gate_open = match direction {
            Direction::Outbound => true,
            Direction::Inbound => self.timestamp_interval_elapsed(now, config),
        };
        let separate_line = direction == Direction::Outbound && config.sent_data_on_separate_line;
        let last_index = data.len() - 1;
        let mut timestamp_shown = false;

        for (i, &byte) in data.iter().enumerate() {
            let output = ByteOutput::classify(byte, config);

            let print_timestamp = config.timestamps_enabled
                && time_gate_open
                && match direction {
                    Direction::Inbound if config.timestamp_after_newline_only => {
                        out.line.last_added_was_newline() && !out.line.last_newline_was_wrap()
                    }
                    _ => !timestamp_shown,
                };

            if separate_line && i == 0 && !out.at_newline() {
                out.push("\n", ColorClass::Default);
            }

            if print_timestamp {
                self.emit_timestamp(&mut out, now);
                timestamp_shown = true;
            }

            if output.hex {
                self.emit_hex(&mut out, byte, print_timestamp);
            }

            if output.normal {
                self.emit_normal(&mut out, byte);
            }

            if separate_line && i == last_index && !out.at_newline() {
                out.push("\n", ColorClass::Default);
                self.state.last_output_was_hex = false;
            }
        }

        tracing::trace!(
            bytes = data.len(),
            fragments = out.fragments.len(),
            ?direction,
            "Formatted buffer"
        );
        out.fragments
    }

    fn timestamp_interval_elapsed(&self, now: Instant, config: &DisplayConfig) -> bool {
        if config.timestamp_time_limit_ms == 0 {
            return true;
        }
        let limit = Duration::from_millis(config.timestamp_time_limit_ms);
        self.state
            .last_timestamp
            .map_or(true, |last| now.saturating_duration_since(last) > limit)
    }

    fn emit_timestamp(&mut self, out: &mut FragmentWriter, now: Instant) {
        let mut text = String::with_capacity(16);
        if !out.at_newline() {
            text.push('\n');
        }
        text.push_str(&self.clock.wall_time().format("%H:%M:%S%.3f: ").to_string());
        out.push(&text, ColorClass::Timestamp);

        self.state.last_timestamp = Some(now);
        self.state.last_output_was_hex = false;
    }

    fn emit_hex(&mut self, out: &mut FragmentWriter, byte: u8, after_timestamp: bool) {
        // Never split a hex pair across a line wrap
        let wrapped = out.line.remaining_on_line() < HEX_PAIR_COLUMNS;
        if wrapped {
            out.push("\n", ColorClass::HexByte);
        }

        let at_line_start = after_timestamp
            || wrapped
            || out.line.current_line_length() == 0
            || out.line.last_added_was_newline();

        let mut text = String::with_capacity(3);
        if !at_line_start {
            text.push(' ');
        }
        push_hex_pair(&mut text, byte);
        out.push(&text, ColorClass::HexByte);

        self.state.last_output_was_hex = true;
    }

    fn emit_normal(&mut self, out: &mut FragmentWriter, byte: u8) {
        if byte == b'\n' {
            self.state.last_output_was_hex = false;
        }
        if self.state.last_output_was_hex {
            out.push(" ", ColorClass::Default);
        }

        // One byte, one char: keeps every byte value displayable
        let mut buf = [0u8; 4];
        out.push(char::from(byte).encode_utf8(&mut buf), ColorClass::Default);

        self.state.last_output_was_hex = false;
    }
}
