//! Styled text fragments produced by the formatter

use serde::{Deserialize, Serialize};

/// Display colour class of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorClass {
    /// Regular data text
    #[default]
    Default,
    /// `HH:MM:SS.mmm: ` prefixes
    Timestamp,
    /// Hex-rendered bytes
    HexByte,
    /// Status and informational lines
    Meta,
}

/// A run of text sharing one colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledFragment {
    /// Text to display
    pub text: String,
    /// Colour class
    pub color: ColorClass,
}

impl StyledFragment {
    /// Create a fragment
    pub fn new(text: impl Into<String>, color: ColorClass) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    /// Plain data text
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, ColorClass::Default)
    }
}
