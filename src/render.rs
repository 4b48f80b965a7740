//! Output rendering for the chat client.
//!
//! The [`Renderer`] trait is the view seam: the store pushes streamed text, errors, and
//! notifications through it, and the REPL uses it to draw history.  [`PlainTextRenderer`]
//! writes to a terminal with optional ANSI styling.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::{Message, MessageRole, ToolCall};
use crate::utils::format_time;

/// ANSI escape code for dim text (used for timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for tool badges).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for pending tools).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording output in tests
pub trait Renderer: Send {
    /// Called before the first chunk of an assistant reply.
    fn start_response(&mut self) {}

    /// Print a chunk of streamed response text.
    ///
    /// This is called incrementally as chunks arrive from the server.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a heading that separates messages from different days.
    fn print_date_header(&mut self, label: &str) {
        self.print_info(&format!("-- {label} --"));
    }

    /// Print a complete message from the session's history.
    fn print_message(&mut self, message: &Message);

    /// Print a badge describing a tool the assistant used.
    fn print_tool_call(&mut self, call: &ToolCall);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout by default with optional
/// ANSI escape codes for styling speakers, timestamps, and tool badges.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    line_start: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }

    /// Creates a new PlainTextRenderer with specified color and interrupt flag.
    pub fn with_color_and_interrupt(use_color: bool, interrupted: Arc<AtomicBool>) -> Self {
        Self::with_color(use_color).with_interrupt(interrupted)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            line_start: true,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Consumes the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    /// Writes text and flushes so streamed content shows immediately.
    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.line_start = text.ends_with('\n');
    }

    fn ensure_line_start(&mut self) {
        if !self.line_start {
            self.write("\n");
        }
    }

    fn speaker(&self, role: MessageRole) -> String {
        let label = match role {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
        };
        self.styled(ANSI_BOLD, label)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn start_response(&mut self) {
        self.ensure_line_start();
        let speaker = self.speaker(MessageRole::Assistant);
        self.write(&format!("{speaker}: "));
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn print_error(&mut self, error: &str) {
        self.ensure_line_start();
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write(&format!("{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.ensure_line_start();
        self.write(&format!("{info}\n"));
    }

    fn print_date_header(&mut self, label: &str) {
        self.ensure_line_start();
        let header = self.styled(ANSI_DIM, &format!("-- {label} --"));
        self.write(&format!("{header}\n"));
    }

    fn print_message(&mut self, message: &Message) {
        self.ensure_line_start();
        let time = self.styled(ANSI_DIM, &format!("[{}]", format_time(message.timestamp)));
        let speaker = self.speaker(message.role);
        self.write(&format!("{time} {speaker}: {}\n", message.content));
        for call in &message.tool_calls {
            self.print_tool_call(call);
        }
    }

    fn print_tool_call(&mut self, call: &ToolCall) {
        self.ensure_line_start();
        let style = if call.error().is_some() {
            ANSI_RED
        } else if call.is_pending() {
            ANSI_YELLOW
        } else {
            ANSI_CYAN
        };
        let badge = self.styled(style, &format!("[tool] {}", call.summary()));
        self.write(&format!("  {badge}\n"));
    }

    fn finish_response(&mut self) {
        self.ensure_line_start();
    }

    fn print_interrupted(&mut self) {
        self.ensure_line_start();
        self.write("[interrupted]\n");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
