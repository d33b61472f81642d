//! Console renderer: queued, time-sliced insertion into the text buffer

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use super::buffer::{FormatRun, TextBuffer, Viewport};
use super::layout::{ConsoleQuery, LineLayout, ViewportMetrics};
use super::run_loop::Scheduler;
use crate::core::fragment::{ColorClass, StyledFragment};

/// Maximum characters per queued chunk
pub const CHUNK_CHARS: usize = 512;

/// Wall-clock budget of one drain slice
pub const DRAIN_BUDGET: Duration = Duration::from_millis(10);

/// A piece of laid-out text waiting to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueChunk {
    /// Text, at most [`CHUNK_CHARS`] characters
    pub text: String,
    /// Colour of the text
    pub color: ColorClass,
}

/// Result of one drain slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Queue is empty
    Idle,
    /// Budget ran out with chunks left
    Pending,
}

/// Owns the console text, its layout state and the insertion queue
///
/// Layout (wrapping, line length, newline tracking) is settled as soon as
/// fragments are enqueued, so line-state queries always describe the end of
/// everything handed to the renderer. Insertion into the buffer, format
/// changes and autoscroll happen when the queue is drained.
#[derive(Debug)]
pub struct ConsoleRenderer {
    layout: LineLayout,
    queue: VecDeque<QueueChunk>,
    buffer: TextBuffer,
    viewport: Viewport,
    auto_scroll: bool,
    initializing: bool,
    drain_budget: Duration,
    continuation_scheduled: bool,
    generation: u64,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new(ViewportMetrics::default())
    }
}

impl ConsoleRenderer {
    /// Create an empty console for the given viewport
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self {
            layout: LineLayout::new(metrics.max_line_chars(), metrics.tab_advance()),
            queue: VecDeque::new(),
            buffer: TextBuffer::new(),
            viewport: Viewport::new(metrics.visible_lines),
            auto_scroll: true,
            initializing: true,
            drain_budget: DRAIN_BUDGET,
            continuation_scheduled: false,
            generation: 0,
        }
    }

    /// Override the drain slice budget
    #[must_use]
    pub fn with_drain_budget(mut self, budget: Duration) -> Self {
        self.drain_budget = budget;
        self
    }

    /// Lay out fragments and queue them for insertion.
    ///
    /// Returns `true` when the queue went from empty to non-empty.
    pub fn enqueue(&mut self, fragments: &[StyledFragment]) -> bool {
        let was_empty = self.queue.is_empty();
        for fragment in fragments {
            if fragment.text.is_empty() {
                continue;
            }
            let mut laid_out = String::with_capacity(fragment.text.len() + 8);
            self.layout.layout_into(&fragment.text, &mut laid_out);
            push_chunks(&mut self.queue, &laid_out, fragment.color);
        }
        tracing::trace!(pending = self.queue.len(), "Fragments queued");
        was_empty && !self.queue.is_empty()
    }

    /// Insert queued chunks until the queue is empty or the budget is spent.
    ///
    /// At least one chunk is inserted per slice.
    pub fn drain_slice(&mut self) -> DrainOutcome {
        let started = Instant::now();
        let mut inserted = 0usize;
        while let Some(chunk) = self.queue.pop_front() {
            self.insert_chunk(&chunk);
            inserted += 1;
            if started.elapsed() >= self.drain_budget {
                break;
            }
        }

        tracing::trace!(inserted, left = self.queue.len(), "Drain slice done");
        if self.queue.is_empty() {
            DrainOutcome::Idle
        } else {
            DrainOutcome::Pending
        }
    }

    /// Insert everything queued, ignoring the budget
    pub fn flush(&mut self) {
        while let Some(chunk) = self.queue.pop_front() {
            self.insert_chunk(&chunk);
        }
    }

    fn insert_chunk(&mut self, chunk: &QueueChunk) {
        let at_bottom = self.viewport.at_bottom(self.buffer.line_count());

        self.buffer.insert(&chunk.text, chunk.color);

        let lines = self.buffer.line_count();
        let scroll = self.auto_scroll && (at_bottom || self.initializing);
        if self.initializing && self.viewport.overflows(lines) {
            tracing::debug!(lines, "Console content overflows viewport");
            self.initializing = false;
        }
        if scroll {
            self.viewport.scroll_to_bottom(lines);
        }
    }

    /// Scroll to the last line
    pub fn scroll_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom(self.buffer.line_count());
    }

    /// Scroll to a line, as a user dragging the scrollbar would
    pub fn scroll_to(&mut self, value: usize) {
        self.viewport.scroll_to(value, self.buffer.line_count());
    }

    /// Enable or disable autoscroll; enabling jumps to the bottom
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.auto_scroll = enabled;
        if enabled {
            self.scroll_to_bottom();
        }
    }

    /// Whether autoscroll is on
    pub fn is_auto_scroll_on(&self) -> bool {
        self.auto_scroll
    }

    /// Drop all text and queued chunks and start a fresh line
    pub fn clear(&mut self) {
        self.queue.clear();
        self.buffer.clear();
        self.layout.reset();
        self.generation += 1;
        self.viewport.scroll_to(0, self.buffer.line_count());
    }

    /// Set the line width in characters (0 falls back to 80).
    ///
    /// Buffered text and the current line length are left alone.
    pub fn on_resize(&mut self, max_line_chars: usize) {
        self.layout.set_max_line_chars(max_line_chars);
        tracing::debug!(max_line_chars = self.layout.max_line_chars(), "Console resized");
    }

    /// Recompute layout parameters from new viewport geometry
    pub fn on_viewport_resize(&mut self, metrics: ViewportMetrics) {
        self.layout.set_tab_advance(metrics.tab_advance());
        self.viewport
            .set_visible_lines(metrics.visible_lines, self.buffer.line_count());
        self.on_resize(metrics.max_line_chars());
    }

    /// Buffer text inserted so far
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Format runs of the inserted text
    pub fn runs(&self) -> &[FormatRun] {
        self.buffer.runs()
    }

    /// Run segments from byte `offset` onwards
    pub fn runs_since(&self, offset: usize) -> impl Iterator<Item = (&str, ColorClass)> + '_ {
        self.buffer.runs_since(offset)
    }

    /// Bumped on every `clear()`; byte offsets into `text()` from an
    /// earlier generation are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cursor format switches so far
    pub fn format_changes(&self) -> usize {
        self.buffer.format_changes()
    }

    /// Lines in the buffer
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Current scroll value
    pub fn scroll_value(&self) -> usize {
        self.viewport.value()
    }

    /// Largest scroll value
    pub fn max_scroll(&self) -> usize {
        self.viewport.max_scroll(self.buffer.line_count())
    }

    /// Whether no content has overflowed the viewport yet
    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    /// Chunks waiting for insertion
    pub fn pending_chunks(&self) -> usize {
        self.queue.len()
    }

    /// Current line width in characters
    pub fn max_line_chars(&self) -> usize {
        self.layout.max_line_chars()
    }
}

impl ConsoleQuery for ConsoleRenderer {
    fn remaining_on_line(&self) -> usize {
        self.layout.remaining_on_line()
    }

    fn current_line_length(&self) -> usize {
        self.layout.current_line_length()
    }

    fn last_added_was_newline(&self) -> bool {
        self.layout.last_added_was_newline()
    }

    fn last_newline_was_wrap(&self) -> bool {
        self.layout.last_newline_was_wrap()
    }

    fn snapshot(&self) -> LineLayout {
        self.layout.clone()
    }
}

fn push_chunks(queue: &mut VecDeque<QueueChunk>, text: &str, color: ColorClass) {
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == CHUNK_CHARS {
            queue.push_back(QueueChunk {
                text: text[start..idx].to_string(),
                color,
            });
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        queue.push_back(QueueChunk {
            text: text[start..].to_string(),
            color,
        });
    }
}

/// Console handle tying a [`ConsoleRenderer`] to the host run loop
///
/// Appends are queued and drained in budgeted slices on later turns of the
/// loop. Pending drains only hold a weak reference, so dropping the console
/// abandons them.
pub struct Console {
    renderer: Rc<RefCell<ConsoleRenderer>>,
    scheduler: Rc<dyn Scheduler>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Create a console draining on `scheduler`
    pub fn new(scheduler: impl Scheduler + 'static, metrics: ViewportMetrics) -> Self {
        Self::with_renderer(scheduler, ConsoleRenderer::new(metrics))
    }

    /// Wrap an existing renderer
    pub fn with_renderer(scheduler: impl Scheduler + 'static, renderer: ConsoleRenderer) -> Self {
        Self {
            renderer: Rc::new(RefCell::new(renderer)),
            scheduler: Rc::new(scheduler),
        }
    }

    /// Queue fragments, scheduling a drain if none is in flight
    pub fn append(&self, fragments: &[StyledFragment]) {
        let needs_drain = {
            let mut renderer = self.renderer.borrow_mut();
            let started = renderer.enqueue(fragments);
            started && !renderer.continuation_scheduled
        };
        if needs_drain {
            schedule_drain(&self.renderer, &self.scheduler);
        }
    }

    /// Borrow the renderer
    pub fn renderer(&self) -> Ref<'_, ConsoleRenderer> {
        self.renderer.borrow()
    }

    /// Borrow the renderer mutably
    pub fn renderer_mut(&self) -> RefMut<'_, ConsoleRenderer> {
        self.renderer.borrow_mut()
    }

    /// Scroll to the last line
    pub fn scroll_to_bottom(&self) {
        self.renderer.borrow_mut().scroll_to_bottom();
    }

    /// Enable or disable autoscroll
    pub fn set_auto_scroll(&self, enabled: bool) {
        self.renderer.borrow_mut().set_auto_scroll(enabled);
    }

    /// Clear text and queue
    pub fn clear(&self) {
        self.renderer.borrow_mut().clear();
    }

    /// Set the line width in characters
    pub fn on_resize(&self, max_line_chars: usize) {
        self.renderer.borrow_mut().on_resize(max_line_chars);
    }

    /// Insert everything queued right now
    pub fn flush(&self) {
        self.renderer.borrow_mut().flush();
    }
}

impl ConsoleQuery for Console {
    fn remaining_on_line(&self) -> usize {
        self.renderer.borrow().remaining_on_line()
    }

    fn current_line_length(&self) -> usize {
        self.renderer.borrow().current_line_length()
    }

    fn last_added_was_newline(&self) -> bool {
        self.renderer.borrow().last_added_was_newline()
    }

    fn last_newline_was_wrap(&self) -> bool {
        self.renderer.borrow().last_newline_was_wrap()
    }

    fn snapshot(&self) -> LineLayout {
        self.renderer.borrow().snapshot()
    }
}

fn schedule_drain(renderer: &Rc<RefCell<ConsoleRenderer>>, scheduler: &Rc<dyn Scheduler>) {
    renderer.borrow_mut().continuation_scheduled = true;
    post_drain(Rc::downgrade(renderer), Rc::clone(scheduler));
}

fn post_drain(renderer: Weak<RefCell<ConsoleRenderer>>, scheduler: Rc<dyn Scheduler>) {
    let next = Rc::clone(&scheduler);
    scheduler.schedule(Box::new(move || run_drain(renderer, next)));
}

fn run_drain(weak: Weak<RefCell<ConsoleRenderer>>, scheduler: Rc<dyn Scheduler>) {
    let Some(renderer) = weak.upgrade() else {
        tracing::trace!("Console dropped, abandoning drain");
        return;
    };

    let outcome = match renderer.try_borrow_mut() {
        Ok(mut r) => {
            r.continuation_scheduled = false;
            r.drain_slice()
        }
        Err(_) => {
            // Renderer is borrowed by the host; retry on the next turn
            post_drain(weak, scheduler);
            return;
        }
    };

    if outcome == DrainOutcome::Pending {
        schedule_drain(&renderer, &scheduler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::console::RunLoop;

    fn metrics(width_chars: usize, visible_lines: usize) -> ViewportMetrics {
        ViewportMetrics {
            width_px: width_chars as f32 * 10.0 + 16.0,
            scrollbar_px: 16.0,
            char_width_px: 10.0,
            tab_stop_px: 80.0,
            visible_lines,
        }
    }

    #[test]
    fn test_long_fragment_split_into_chunks() {
        let mut renderer = ConsoleRenderer::new(metrics(10_000, 40));
        let text = "x".repeat(1100);
        assert!(renderer.enqueue(&[StyledFragment::plain(text.clone())]));
        assert_eq!(renderer.pending_chunks(), 3);
        assert!(!renderer.enqueue(&[StyledFragment::plain("y")]));
        renderer.flush();
        assert_eq!(renderer.text(), format!("{text}y"));
        assert_eq!(renderer.pending_chunks(), 0);
    }

    #[test]
    fn test_chunk_split_preserves_color_and_order() {
        let mut renderer = ConsoleRenderer::new(metrics(10_000, 40));
        renderer.enqueue(&[
            StyledFragment::new("a".repeat(600), ColorClass::HexByte),
            StyledFragment::plain("b"),
        ]);
        let chunks: Vec<_> = renderer.queue.iter().cloned().collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.chars().count(), CHUNK_CHARS);
        assert_eq!(chunks[0].color, ColorClass::HexByte);
        assert_eq!(chunks[1].text.chars().count(), 88);
        assert_eq!(chunks[1].color, ColorClass::HexByte);
        assert_eq!(chunks[2].text, "b");
    }

    #[test]
    fn test_drain_slice_with_zero_budget_inserts_one_chunk() {
        let mut renderer =
            ConsoleRenderer::new(metrics(10_000, 40)).with_drain_budget(Duration::ZERO);
        renderer.enqueue(&[StyledFragment::plain("z".repeat(1024))]);
        assert_eq!(renderer.drain_slice(), DrainOutcome::Pending);
        assert_eq!(renderer.text().len(), CHUNK_CHARS);
        assert_eq!(renderer.drain_slice(), DrainOutcome::Idle);
        assert_eq!(renderer.text().len(), 1024);
    }

    #[test]
    fn test_color_only_switched_on_change() {
        let mut renderer = ConsoleRenderer::default();
        renderer.enqueue(&[
            StyledFragment::plain("a"),
            StyledFragment::plain("b"),
            StyledFragment::new("0D", ColorClass::HexByte),
            StyledFragment::new(" 0A", ColorClass::HexByte),
            StyledFragment::plain("c"),
        ]);
        renderer.flush();
        assert_eq!(renderer.format_changes(), 2);
        assert_eq!(renderer.runs().len(), 3);
    }

    #[test]
    fn test_autoscroll_follows_when_at_bottom() {
        let mut renderer = ConsoleRenderer::new(metrics(80, 3));
        for _ in 0..10 {
            renderer.enqueue(&[StyledFragment::plain("line\n")]);
        }
        renderer.flush();
        assert!(!renderer.is_initializing());
        assert_eq!(renderer.scroll_value(), renderer.max_scroll());
    }

    #[test]
    fn test_autoscroll_holds_when_user_scrolled_up() {
        let mut renderer = ConsoleRenderer::new(metrics(80, 3));
        for _ in 0..10 {
            renderer.enqueue(&[StyledFragment::plain("line\n")]);
        }
        renderer.flush();
        renderer.scroll_to(2);
        renderer.enqueue(&[StyledFragment::plain("more\n")]);
        renderer.flush();
        assert_eq!(renderer.scroll_value(), 2);

        renderer.set_auto_scroll(true);
        assert_eq!(renderer.scroll_value(), renderer.max_scroll());
    }

    #[test]
    fn test_autoscroll_disabled() {
        let mut renderer = ConsoleRenderer::new(metrics(80, 3));
        renderer.set_auto_scroll(false);
        for _ in 0..10 {
            renderer.enqueue(&[StyledFragment::plain("line\n")]);
        }
        renderer.flush();
        assert_eq!(renderer.scroll_value(), 0);
        renderer.scroll_to_bottom();
        assert_eq!(renderer.scroll_value(), renderer.max_scroll());
    }

    #[test]
    fn test_clear_resets_line_and_queue() {
        let mut renderer = ConsoleRenderer::default();
        renderer.enqueue(&[StyledFragment::plain("abc")]);
        renderer.clear();
        assert_eq!(renderer.pending_chunks(), 0);
        assert_eq!(renderer.current_line_length(), 0);
        assert!(renderer.last_added_was_newline());
        renderer.flush();
        assert_eq!(renderer.text(), "");
    }

    #[test]
    fn test_clear_bumps_generation() {
        let mut renderer = ConsoleRenderer::default();
        assert_eq!(renderer.generation(), 0);
        renderer.clear();
        renderer.clear();
        assert_eq!(renderer.generation(), 2);
    }

    #[test]
    fn test_initializing_not_reentered_after_clear() {
        let mut renderer = ConsoleRenderer::new(metrics(80, 3));
        for _ in 0..10 {
            renderer.enqueue(&[StyledFragment::plain("line\n")]);
        }
        renderer.flush();
        assert!(!renderer.is_initializing());

        renderer.clear();
        assert!(!renderer.is_initializing());

        for _ in 0..10 {
            renderer.enqueue(&[StyledFragment::plain("line\n")]);
        }
        renderer.flush();
        assert_eq!(renderer.scroll_value(), renderer.max_scroll());

        renderer.scroll_to(2);
        renderer.enqueue(&[StyledFragment::plain("more\n")]);
        renderer.flush();
        assert_eq!(renderer.scroll_value(), 2);
        assert!(!renderer.is_initializing());
    }

    #[test]
    fn test_resize_keeps_content() {
        let mut renderer = ConsoleRenderer::new(metrics(80, 40));
        renderer.enqueue(&[StyledFragment::plain("hello")]);
        renderer.flush();
        renderer.on_resize(40);
        renderer.on_resize(40);
        assert_eq!(renderer.max_line_chars(), 40);
        assert_eq!(renderer.current_line_length(), 5);
        assert_eq!(renderer.text(), "hello");
        renderer.on_resize(0);
        assert_eq!(renderer.max_line_chars(), 80);
    }

    #[test]
    fn test_console_drains_on_run_loop() {
        let run_loop = RunLoop::new();
        let console = Console::new(run_loop.handle(), metrics(80, 40));
        console.append(&[StyledFragment::plain("hi")]);
        console.append(&[StyledFragment::plain(" there")]);
        assert_eq!(console.renderer().text(), "");
        assert_eq!(console.current_line_length(), 8);
        assert_eq!(run_loop.pending(), 1);

        run_loop.run_until_idle();
        assert_eq!(console.renderer().text(), "hi there");
    }

    #[test]
    fn test_console_continuation_not_double_scheduled() {
        let run_loop = RunLoop::new();
        let renderer = ConsoleRenderer::new(metrics(10_000, 40)).with_drain_budget(Duration::ZERO);
        let console = Console::with_renderer(run_loop.handle(), renderer);
        console.append(&[StyledFragment::plain("q".repeat(2048))]);
        assert_eq!(run_loop.pending(), 1);

        // Each turn inserts one chunk and posts exactly one continuation
        run_loop.run_pending();
        assert_eq!(run_loop.pending(), 1);
        console.append(&[StyledFragment::plain("tail")]);
        assert_eq!(run_loop.pending(), 1);

        let turns = run_loop.run_until_idle();
        assert_eq!(turns, 4);
        assert_eq!(console.renderer().text().len(), 2048 + 4);
    }

    #[test]
    fn test_dropped_console_abandons_drain() {
        let run_loop = RunLoop::new();
        let console = Console::new(run_loop.handle(), metrics(80, 40));
        console.append(&[StyledFragment::plain("bye")]);
        drop(console);
        assert_eq!(run_loop.run_pending(), 1);
        assert!(run_loop.is_idle());
    }

    #[test]
    fn test_drain_waits_while_renderer_borrowed() {
        let run_loop = RunLoop::new();
        let console = Console::new(run_loop.handle(), metrics(80, 40));
        console.append(&[StyledFragment::plain("x")]);
        {
            let _held = console.renderer();
            run_loop.run_pending();
        }
        assert_eq!(run_loop.pending(), 1);
        run_loop.run_until_idle();
        assert_eq!(console.renderer().text(), "x");
    }
}
