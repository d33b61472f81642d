//! CLI Pipe Support
//!
//! Writes drained console output to stdout and formats encoded bytes for
//! scripting.

use std::io::{self, Write};

use crate::core::console::ConsoleRenderer;
use crate::core::fragment::{ColorClass, StyledFragment};

const ANSI_RESET: &str = "\x1b[0m";

/// Pipe mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeMode {
    /// No piping, interactive mode
    Interactive,
    /// Read from stdin
    StdinOnly,
    /// Write to stdout
    StdoutOnly,
    /// Full pipe mode (stdin -> process -> stdout)
    Full,
}

impl PipeMode {
    /// Detect pipe mode from environment
    pub fn detect() -> Self {
        let stdin_is_tty = atty::is(atty::Stream::Stdin);
        let stdout_is_tty = atty::is(atty::Stream::Stdout);

        match (stdin_is_tty, stdout_is_tty) {
            (true, true) => Self::Interactive,
            (false, true) => Self::StdinOnly,
            (true, false) => Self::StdoutOnly,
            (false, false) => Self::Full,
        }
    }

    /// Is sending to stdout?
    pub fn has_stdout(&self) -> bool {
        matches!(self, Self::StdoutOnly | Self::Full)
    }
}

/// Output format for console text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Text with ANSI colours
    Ansi,
    /// Text only
    Plain,
    /// One JSON fragment per line
    Json,
}

impl OutputFormat {
    /// Colour when stdout is a terminal, plain text otherwise
    pub fn for_mode(mode: PipeMode) -> Self {
        if mode.has_stdout() {
            Self::Plain
        } else {
            Self::Ansi
        }
    }
}

/// ANSI escape for a colour class
pub fn ansi_color(color: ColorClass) -> &'static str {
    match color {
        ColorClass::Default => ANSI_RESET,
        ColorClass::Timestamp => "\x1b[34m",
        ColorClass::HexByte => "\x1b[31m",
        ColorClass::Meta => "\x1b[90m",
    }
}

/// Copies newly drained console text to an output stream
#[derive(Debug)]
pub struct ConsoleWriter {
    format: OutputFormat,
    offset: usize,
    generation: u64,
}

impl ConsoleWriter {
    /// Create a writer starting at the beginning of the console
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            offset: 0,
            generation: 0,
        }
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write everything drained since the previous call
    pub fn write_new<W: Write>(&mut self, console: &ConsoleRenderer, out: &mut W) -> io::Result<()> {
        if console.generation() != self.generation {
            self.generation = console.generation();
            self.offset = 0;
        }

        let mut colored = false;
        for (text, color) in console.runs_since(self.offset) {
            match self.format {
                OutputFormat::Plain => out.write_all(text.as_bytes())?,
                OutputFormat::Ansi => {
                    out.write_all(ansi_color(color).as_bytes())?;
                    out.write_all(text.as_bytes())?;
                    colored = color != ColorClass::Default;
                }
                OutputFormat::Json => {
                    let fragment = StyledFragment::new(text, color);
                    serde_json::to_writer(&mut *out, &fragment)?;
                    out.write_all(b"\n")?;
                }
            }
        }
        if colored {
            out.write_all(ANSI_RESET.as_bytes())?;
        }

        self.offset = console.text().len();
        out.flush()
    }
}

/// Output format for encoded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesFormat {
    /// Uppercase hex pairs separated by spaces
    Hex,
    /// The bytes themselves
    Raw,
}

/// Write encoded bytes to an output stream
pub fn write_bytes<W: Write>(data: &[u8], format: BytesFormat, out: &mut W) -> io::Result<()> {
    match format {
        BytesFormat::Raw => out.write_all(data)?,
        BytesFormat::Hex => writeln!(out, "{}", hex_format(data))?,
    }
    out.flush()
}

fn hex_format(data: &[u8]) -> String {
    data.iter()
        .map(|b| hex::encode_upper([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::console::ViewportMetrics;

    fn renderer_with(fragments: &[StyledFragment]) -> ConsoleRenderer {
        let mut renderer = ConsoleRenderer::new(ViewportMetrics::default());
        renderer.enqueue(fragments);
        renderer.flush();
        renderer
    }

    #[test]
    fn test_hex_format() {
        let mut out = Vec::new();
        write_bytes(b"A\r\n", BytesFormat::Hex, &mut out).unwrap();
        assert_eq!(out, b"41 0D 0A\n");
    }

    #[test]
    fn test_raw_format() {
        let mut out = Vec::new();
        write_bytes(&[0x00, 0xff], BytesFormat::Raw, &mut out).unwrap();
        assert_eq!(out, vec![0x00, 0xff]);
    }

    #[test]
    fn test_plain_writes_only_new_text() {
        let mut renderer = renderer_with(&[StyledFragment::plain("abc")]);
        let mut writer = ConsoleWriter::new(OutputFormat::Plain);

        let mut out = Vec::new();
        writer.write_new(&renderer, &mut out).unwrap();
        assert_eq!(out, b"abc");

        renderer.enqueue(&[StyledFragment::new(" 0D", ColorClass::HexByte)]);
        renderer.flush();
        out.clear();
        writer.write_new(&renderer, &mut out).unwrap();
        assert_eq!(out, b" 0D");
    }

    #[test]
    fn test_ansi_colors() {
        let renderer = renderer_with(&[
            StyledFragment::plain("a"),
            StyledFragment::new(" 01", ColorClass::HexByte),
        ]);
        let mut writer = ConsoleWriter::new(OutputFormat::Ansi);

        let mut out = Vec::new();
        writer.write_new(&renderer, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b[0ma\x1b[31m 01\x1b[0m"
        );
    }

    #[test]
    fn test_json_lines() {
        let renderer = renderer_with(&[StyledFragment::new("12:00:00.000: ", ColorClass::Timestamp)]);
        let mut writer = ConsoleWriter::new(OutputFormat::Json);

        let mut out = Vec::new();
        writer.write_new(&renderer, &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        let fragment: StyledFragment = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(fragment.color, ColorClass::Timestamp);
        assert_eq!(fragment.text, "12:00:00.000: ");
    }

    #[test]
    fn test_restarts_after_clear() {
        let mut renderer = renderer_with(&[StyledFragment::plain("long text")]);
        let mut writer = ConsoleWriter::new(OutputFormat::Plain);
        let mut out = Vec::new();
        writer.write_new(&renderer, &mut out).unwrap();

        renderer.clear();
        renderer.enqueue(&[StyledFragment::plain("x")]);
        renderer.flush();
        out.clear();
        writer.write_new(&renderer, &mut out).unwrap();
        assert_eq!(out, b"x");
    }

    #[test]
    fn test_restarts_after_clear_with_longer_text() {
        let mut renderer = renderer_with(&[StyledFragment::plain("abc")]);
        let mut writer = ConsoleWriter::new(OutputFormat::Plain);
        let mut out = Vec::new();
        writer.write_new(&renderer, &mut out).unwrap();

        renderer.clear();
        renderer.enqueue(&[StyledFragment::plain("fresh output")]);
        renderer.flush();
        out.clear();
        writer.write_new(&renderer, &mut out).unwrap();
        assert_eq!(out, b"fresh output");
    }

    #[test]
    fn test_format_follows_stdout() {
        assert_eq!(OutputFormat::for_mode(PipeMode::Full), OutputFormat::Plain);
        assert_eq!(OutputFormat::for_mode(PipeMode::StdoutOnly), OutputFormat::Plain);
        assert_eq!(OutputFormat::for_mode(PipeMode::Interactive), OutputFormat::Ansi);
        assert_eq!(OutputFormat::for_mode(PipeMode::StdinOnly), OutputFormat::Ansi);
    }
}
