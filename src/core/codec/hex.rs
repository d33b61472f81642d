//! Hex byte rendering for the console

use ::hex::FromHexError;

use super::CodecError;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render one byte as two uppercase, zero-padded hex digits
pub fn hex_pair(byte: u8) -> [char; 2] {
    [
        HEX_DIGITS[usize::from(byte >> 4)] as char,
        HEX_DIGITS[usize::from(byte & 0x0f)] as char,
    ]
}

/// Append the hex pair for `byte` to `output`
pub fn push_hex_pair(output: &mut String, byte: u8) {
    output.extend(hex_pair(byte));
}

/// Decode consecutive hex digit pairs, ignoring whitespace between them
///
/// This is the inverse of the console's hex rendering: feeding it the text
/// of every hex fragment, in order, gives back the original bytes.
pub fn decode_hex_pairs(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut digits = String::with_capacity(text.len());
    // Position in `text` of every kept digit
    let mut positions = Vec::with_capacity(text.len());

    for (pos, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if digits.len() % 2 == 1 {
                return Err(CodecError::SplitPair(pos));
            }
        } else if c.is_ascii() {
            digits.push(c);
            positions.push(pos);
        } else {
            return Err(CodecError::InvalidCharacter(pos, c));
        }
    }

    ::hex::decode(&digits).map_err(|e| match e {
        FromHexError::InvalidHexCharacter { c, index } => {
            CodecError::InvalidCharacter(positions.get(index).copied().unwrap_or(index), c)
        }
        FromHexError::OddLength => {
            CodecError::InvalidFormat("Hex string must have even number of digits".to_string())
        }
        FromHexError::InvalidStringLength => CodecError::InvalidFormat(e.to_string()),
    })
}
