//! Live display configuration for the data pipeline

use serde::{Deserialize, Serialize};

/// Display settings, read as a snapshot on every formatter call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Render every byte as hex
    pub hex_mode: bool,
    /// Show CR and LF bytes as hex in text mode
    pub show_crlf_hex: bool,
    /// Start a new line for LF bytes in text mode
    pub crlf_as_newline: bool,
    /// Show control characters (except tab) as hex in text mode
    pub hex_for_special_chars: bool,
    /// Prefix output with `HH:MM:SS.mmm: ` timestamps
    pub timestamps_enabled: bool,
    /// Only timestamp received data at the start of a line
    pub timestamp_after_newline_only: bool,
    /// Minimum time between received-data timestamps (0 = no limit)
    pub timestamp_time_limit_ms: u64,
    /// Echo sent data into the console
    pub show_sent_data_in_console: bool,
    /// Put echoed sent data on its own line
    pub sent_data_on_separate_line: bool,
    /// Replace backslash escape sequences before sending
    pub replace_escape_sequences_on_send: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hex_mode: false,
            show_crlf_hex: false,
            crlf_as_newline: true,
            hex_for_special_chars: true,
            timestamps_enabled: false,
            timestamp_after_newline_only: true,
            timestamp_time_limit_ms: 0,
            show_sent_data_in_console: true,
            sent_data_on_separate_line: true,
            replace_escape_sequences_on_send: true,
        }
    }
}
