//! Byte codecs for the terminal data pipeline
//!
//! - Escape sequence encoding for outgoing text (`\r`, `\n`, `\t`, `\0`, `\\`, `\XX`)
//! - Hex pair rendering and decoding for the console

mod escape;
mod hex;

pub use self::escape::EscapeEncoder;
pub use self::hex::{decode_hex_pairs, hex_pair, push_hex_pair};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Which way a byte buffer is travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Received from the transport
    Inbound,
    /// About to be written to the transport
    Outbound,
}

/// How typed text becomes outgoing bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SendEncoding {
    /// Bytes are sent as typed
    #[default]
    Raw,
    /// Backslash escape sequences are replaced before sending
    EscapeSequences,
}

impl SendEncoding {
    /// Pick the encoding from the `replace escape sequences` toggle
    pub fn from_flag(replace_escape_sequences: bool) -> Self {
        if replace_escape_sequences {
            Self::EscapeSequences
        } else {
            Self::Raw
        }
    }

    /// Encode outgoing data
    pub fn encode(self, data: &[u8]) -> Bytes {
        match self {
            Self::Raw => Bytes::copy_from_slice(data),
            Self::EscapeSequences => EscapeEncoder::new().encode_bytes(data),
        }
    }
}

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Invalid input format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid character
    #[error("Invalid character at position {0}: {1}")]
    InvalidCharacter(usize, char),

    /// Whitespace between the two digits of one byte
    #[error("Hex pair split by whitespace at position {0}")]
    SplitPair(usize),
}
