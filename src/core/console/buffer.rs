//! Append-only styled text buffer with a single insertion cursor

use crate::core::fragment::ColorClass;

/// A contiguous run of buffer text sharing one colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRun {
    /// Byte offset of the run in the buffer text
    pub start: usize,
    /// Byte length of the run
    pub len: usize,
    /// Colour of the run
    pub color: ColorClass,
}

impl FormatRun {
    /// Byte offset one past the end of the run
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Append-only text with format runs
///
/// The cursor always sits at the end of the text and carries the current
/// format. The format is only switched when inserted text has a different
/// colour.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
    runs: Vec<FormatRun>,
    cursor_format: ColorClass,
    format_changes: usize,
    newlines: usize,
}

impl TextBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert text at the cursor
    pub fn insert(&mut self, text: &str, color: ColorClass) {
        if text.is_empty() {
            return;
        }
        if color != self.cursor_format {
            self.cursor_format = color;
            self.format_changes += 1;
        }

        let start = self.text.len();
        self.text.push_str(text);
        self.newlines += text.bytes().filter(|&b| b == b'\n').count();

        match self.runs.last_mut() {
            Some(run) if run.color == color && run.end() == start => run.len += text.len(),
            _ => self.runs.push(FormatRun {
                start,
                len: text.len(),
                color,
            }),
        }
    }

    /// Remove all text; the cursor keeps its format
    pub fn clear(&mut self) {
        self.text.clear();
        self.runs.clear();
        self.newlines = 0;
    }

    /// Full buffer text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Format runs, in order
    pub fn runs(&self) -> &[FormatRun] {
        &self.runs
    }

    /// Text and colour of every run segment from byte `offset` onwards
    pub fn runs_since(&self, offset: usize) -> impl Iterator<Item = (&str, ColorClass)> + '_ {
        self.runs
            .iter()
            .filter(move |run| run.end() > offset)
            .map(move |run| {
                let start = run.start.max(offset);
                (&self.text[start..run.end()], run.color)
            })
    }

    /// Current cursor format
    pub fn cursor_format(&self) -> ColorClass {
        self.cursor_format
    }

    /// How many times the cursor format has been switched
    pub fn format_changes(&self) -> usize {
        self.format_changes
    }

    /// Number of display lines (a trailing newline opens a new, empty line)
    pub fn line_count(&self) -> usize {
        self.newlines + 1
    }

    /// Byte length of the text
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the buffer holds no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Vertical scroll position over the buffer's lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    visible_lines: usize,
    value: usize,
}

impl Viewport {
    /// Create a viewport showing `visible_lines` lines, scrolled to the top
    pub fn new(visible_lines: usize) -> Self {
        Self {
            visible_lines: visible_lines.max(1),
            value: 0,
        }
    }

    /// Largest scroll value for `line_count` lines
    pub fn max_scroll(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.visible_lines)
    }

    /// Whether the view is at the last page
    pub fn at_bottom(&self, line_count: usize) -> bool {
        self.value >= self.max_scroll(line_count)
    }

    /// Whether the content is taller than the viewport
    pub fn overflows(&self, line_count: usize) -> bool {
        self.max_scroll(line_count) > 0
    }

    /// Current scroll value (first visible line)
    pub fn value(&self) -> usize {
        self.value
    }

    /// Scroll to `value`, clamped to the content
    pub fn scroll_to(&mut self, value: usize, line_count: usize) {
        self.value = value.min(self.max_scroll(line_count));
    }

    /// Scroll to the last page
    pub fn scroll_to_bottom(&mut self, line_count: usize) {
        self.value = self.max_scroll(line_count);
    }

    /// Change the number of visible lines, keeping the scroll value in range
    pub fn set_visible_lines(&mut self, visible_lines: usize, line_count: usize) {
        self.visible_lines = visible_lines.max(1);
        self.value = self.value.min(self.max_scroll(line_count));
    }
}
