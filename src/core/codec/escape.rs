//! Escape sequence encoder for outgoing data
//!
//! Turns typed text such as `AT\r\n` or `\02payload\03` into the raw bytes
//! that go out on the wire. Malformed escapes are passed through literally.

use bytes::Bytes;

/// Parser state while scanning for `\XX` hex escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeState {
    /// Waiting for a backslash
    Idle,
    /// Saw `\`, waiting for the first hex digit
    SawBackslash,
    /// Saw `\` and one hex digit (kept as typed)
    HalfHex(u8),
}

/// Whole-string substitutions applied after the hex pass, in order.
///
/// `\0` must come after hex decoding so `\0A` is read as a hex escape,
/// and `\\` must come last.
const SUBSTITUTIONS: [(&[u8], &[u8]); 5] = [
    (b"\\n", b"\n"),
    (b"\\r", b"\r"),
    (b"\\t", b"\t"),
    (b"\\0", b"\0"),
    (b"\\\\", b"\\"),
];

/// Encoder for backslash escape sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeEncoder;

impl EscapeEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    /// Encode typed text into raw bytes
    pub fn encode(&self, text: &str) -> Bytes {
        self.encode_bytes(text.as_bytes())
    }

    /// Encode an already byte-converted text buffer
    pub fn encode_bytes(&self, data: &[u8]) -> Bytes {
        let mut output = decode_hex_escapes(data);
        for (from, to) in SUBSTITUTIONS {
            output = replace_all(&output, from, to);
        }
        Bytes::from(output)
    }
}

fn decode_hex_escapes(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut state = EscapeState::Idle;

    for &c in data {
        state = match state {
            EscapeState::Idle => {
                if c == b'\\' {
                    EscapeState::SawBackslash
                } else {
                    output.push(c);
                    EscapeState::Idle
                }
            }
            EscapeState::SawBackslash => {
                if c.is_ascii_hexdigit() {
                    EscapeState::HalfHex(c)
                } else {
                    output.extend_from_slice(&[b'\\', c]);
                    EscapeState::Idle
                }
            }
            EscapeState::HalfHex(first) => {
                match (hex_value(first), hex_value(c)) {
                    (Some(high), Some(low)) => output.push((high << 4) | low),
                    _ => output.extend_from_slice(&[b'\\', first, c]),
                }
                EscapeState::Idle
            }
        };
    }

    // Unfinished escape at end of input stays literal
    match state {
        EscapeState::Idle => {}
        EscapeState::SawBackslash => output.push(b'\\'),
        EscapeState::HalfHex(first) => output.extend_from_slice(&[b'\\', first]),
    }

    output
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Replace every non-overlapping occurrence of `from`, scanning left to right
fn replace_all(data: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(from) {
            output.extend_from_slice(to);
            i += from.len();
        } else {
            output.push(data[i]);
            i += 1;
        }
    }
    output
}
