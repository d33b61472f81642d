//! Manual line wrapping and line-state bookkeeping

/// Fallback line width when the viewport computes to zero columns
pub const FALLBACK_LINE_CHARS: usize = 80;

/// Read-only view of the console's current line state
pub trait ConsoleQuery {
    /// Columns left before the current line wraps
    fn remaining_on_line(&self) -> usize;

    /// Columns used on the current line
    fn current_line_length(&self) -> usize;

    /// Whether the last inserted character, real or synthetic, was a newline
    fn last_added_was_newline(&self) -> bool;

    /// Whether the last newline was inserted by wrapping rather than
    /// coming from the text itself
    fn last_newline_was_wrap(&self) -> bool;

    /// Copy of the layout state, used to project the effect of new text
    fn snapshot(&self) -> LineLayout;
}

/// Pixel geometry of the console viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Viewport width
    pub width_px: f32,
    /// Width taken by the vertical scrollbar
    pub scrollbar_px: f32,
    /// Average character width of the monospace font
    pub char_width_px: f32,
    /// Distance between tab stops
    pub tab_stop_px: f32,
    /// Number of text lines that fit in the viewport
    pub visible_lines: usize,
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            width_px: 656.0,
            scrollbar_px: 16.0,
            char_width_px: 8.0,
            tab_stop_px: 64.0,
            visible_lines: 40,
        }
    }
}

impl ViewportMetrics {
    /// Characters that fit on one line, falling back to 80
    pub fn max_line_chars(&self) -> usize {
        if self.char_width_px <= 0.0 {
            return FALLBACK_LINE_CHARS;
        }
        let usable = (self.width_px - self.scrollbar_px).max(0.0);
        match (usable / self.char_width_px) as usize {
            0 => FALLBACK_LINE_CHARS,
            n => n,
        }
    }

    /// Columns a tab character advances the line by
    pub fn tab_advance(&self) -> usize {
        if self.char_width_px <= 0.0 {
            return 1;
        }
        (self.tab_stop_px / self.char_width_px) as usize + 1
    }
}

/// Running line state for manual wrapping
///
/// Invariant at rest: `line_length < max_line_chars`, except right after a
/// resize shrinks the width; the next character then wraps the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLayout {
    line_length: usize,
    max_line_chars: usize,
    tab_advance: usize,
    last_was_newline: bool,
    last_newline_was_wrap: bool,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self::new(FALLBACK_LINE_CHARS, 9)
    }
}

impl LineLayout {
    /// Create an empty layout; an empty console counts as start of line
    pub fn new(max_line_chars: usize, tab_advance: usize) -> Self {
        Self {
            line_length: 0,
            max_line_chars: sanitize_width(max_line_chars),
            tab_advance: tab_advance.max(1),
            last_was_newline: true,
            last_newline_was_wrap: false,
        }
    }

    /// Maximum characters per line
    pub fn max_line_chars(&self) -> usize {
        self.max_line_chars
    }

    /// Tab advance in columns
    pub fn tab_advance(&self) -> usize {
        self.tab_advance
    }

    /// Change the line width; buffered text and `line_length` are untouched
    pub fn set_max_line_chars(&mut self, max_line_chars: usize) {
        self.max_line_chars = sanitize_width(max_line_chars);
    }

    /// Change the tab advance
    pub fn set_tab_advance(&mut self, tab_advance: usize) {
        self.tab_advance = tab_advance.max(1);
    }

    /// Back to an empty line
    pub fn reset(&mut self) {
        self.line_length = 0;
        self.last_was_newline = true;
        self.last_newline_was_wrap = false;
    }

    /// Lay out `text`, appending it to `output` with synthetic newlines
    /// inserted wherever a line reaches `max_line_chars`.
    pub fn layout_into(&mut self, text: &str, output: &mut String) {
        for c in text.chars() {
            output.push(c);
            if self.step(c) {
                output.push('\n');
            }
        }
    }

    /// Advance the state over `text` without producing output
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            self.step(c);
        }
    }

    /// Account for one character; returns `true` if a wrap newline follows it
    fn step(&mut self, c: char) -> bool {
        if c == '\n' {
            self.line_length = 0;
            self.last_was_newline = true;
            self.last_newline_was_wrap = false;
            return false;
        }

        self.line_length += if c == '\t' { self.tab_advance } else { 1 };
        self.last_was_newline = false;

        if self.line_length >= self.max_line_chars {
            self.line_length = 0;
            self.last_was_newline = true;
            self.last_newline_was_wrap = true;
            return true;
        }
        false
    }
}

impl ConsoleQuery for LineLayout {
    fn remaining_on_line(&self) -> usize {
        self.max_line_chars.saturating_sub(self.line_length)
    }

    fn current_line_length(&self) -> usize {
        self.line_length
    }

    fn last_added_was_newline(&self) -> bool {
        self.last_was_newline
    }

    fn last_newline_was_wrap(&self) -> bool {
        self.last_newline_was_wrap
    }

    fn snapshot(&self) -> LineLayout {
        self.clone()
    }
}

fn sanitize_width(max_line_chars: usize) -> usize {
    if max_line_chars == 0 {
        FALLBACK_LINE_CHARS
    } else {
        max_line_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laid_out(layout: &mut LineLayout, text: &str) -> String {
        let mut out = String::new();
        layout.layout_into(text, &mut out);
        out
    }

    #[test]
    fn test_wraps_at_max_line_chars() {
        let mut layout = LineLayout::new(4, 9);
        assert_eq!(laid_out(&mut layout, "abcdefghij"), "abcd\nefgh\nij");
        assert_eq!(layout.current_line_length(), 2);
        assert_eq!(layout.remaining_on_line(), 2);
        assert!(!layout.last_added_was_newline());
    }

    #[test]
    fn test_real_newline_resets_line() {
        let mut layout = LineLayout::new(4, 9);
        assert_eq!(laid_out(&mut layout, "ab\ncd"), "ab\ncd");
        assert_eq!(layout.current_line_length(), 2);
    }

    #[test]
    fn test_synthetic_newline_sets_flag() {
        let mut layout = LineLayout::new(3, 9);
        layout.advance("abc");
        assert!(layout.last_added_was_newline());
        assert!(layout.last_newline_was_wrap());
        assert_eq!(layout.current_line_length(), 0);

        layout.advance("\n");
        assert!(layout.last_added_was_newline());
        assert!(!layout.last_newline_was_wrap());
    }

    #[test]
    fn test_tab_advances_multiple_columns() {
        let mut layout = LineLayout::new(20, 9);
        layout.advance("a\t");
        assert_eq!(layout.current_line_length(), 10);
    }

    #[test]
    fn test_zero_width_falls_back() {
        let layout = LineLayout::new(0, 9);
        assert_eq!(layout.max_line_chars(), FALLBACK_LINE_CHARS);
    }

    #[test]
    fn test_metrics() {
        let metrics = ViewportMetrics {
            width_px: 816.0,
            scrollbar_px: 16.0,
            char_width_px: 10.0,
            tab_stop_px: 80.0,
            visible_lines: 20,
        };
        assert_eq!(metrics.max_line_chars(), 80);
        assert_eq!(metrics.tab_advance(), 9);

        let narrow = ViewportMetrics {
            width_px: 12.0,
            ..metrics
        };
        assert_eq!(narrow.max_line_chars(), FALLBACK_LINE_CHARS);
    }

    #[test]
    fn test_shrink_then_wrap() {
        let mut layout = LineLayout::new(10, 9);
        layout.advance("abcdefg");
        layout.set_max_line_chars(5);
        assert_eq!(layout.current_line_length(), 7);
        assert_eq!(layout.remaining_on_line(), 0);
        assert_eq!(laid_out(&mut layout, "h"), "h\n");
    }
}
