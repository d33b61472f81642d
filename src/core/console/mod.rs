//! Console: styled text buffer with manual wrapping and time-sliced insertion
//!
//! - [`LineLayout`] tracks the current line and inserts wrap newlines
//! - [`ConsoleRenderer`] owns the text, the queue and the scroll state
//! - [`Console`] drains the renderer on a [`RunLoop`] in budgeted slices

mod buffer;
mod layout;
mod renderer;
mod run_loop;

pub use buffer::{FormatRun, TextBuffer, Viewport};
pub use layout::{ConsoleQuery, LineLayout, ViewportMetrics, FALLBACK_LINE_CHARS};
pub use renderer::{
    Console, ConsoleRenderer, DrainOutcome, QueueChunk, CHUNK_CHARS, DRAIN_BUDGET,
};
pub use run_loop::{RunLoop, RunLoopHandle, Scheduler, Task};
