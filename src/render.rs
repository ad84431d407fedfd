//! Output rendering for the chat application.
//!
//! The session reports every change to the message list through the
//! [`Renderer`] trait. Streaming replies arrive as cumulative snapshots, so a
//! terminal renderer only has to print whatever extends what it already
//! printed.

use std::fmt;
use std::io::{self, Stdout, Write};

use crate::chat::{Message, MessageId, Role};
use crate::utils::time::clock_label;

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for timestamps and chips).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the model label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

const USER_LABEL: &str = "You";
const MODEL_LABEL: &str = "Coporties";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Called after a message is appended to the store.
    fn message_appended(&mut self, message: &Message);

    /// Called after a streaming message changed. `message` holds the full
    /// text so far, not a delta.
    fn message_updated(&mut self, message: &Message);

    /// Called when a send starts and when it ends.
    fn set_loading(&mut self, _loading: bool) {}

    /// Print a warning for the user.
    fn print_warning(&mut self, warning: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Renders a whole conversation.
    fn render_all(&mut self, messages: &[Message]) {
        for message in messages {
            self.message_appended(message);
        }
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Writes to stdout unless constructed with [`PlainTextRenderer::with_writer`].
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    streaming: Option<MessageId>,
    printed: String,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            streaming: None,
            printed: String::new(),
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn styled(&self, style: &'static str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    /// Ends the open streaming line, if any.
    fn close_stream(&mut self) {
        if self.streaming.take().is_some() {
            self.printed.clear();
            self.emit(format_args!("\n"));
        }
    }

    fn print_header(&mut self, message: &Message) {
        let label = match message.role() {
            Role::User => self.styled(ANSI_BOLD, USER_LABEL),
            Role::Model => self.styled(ANSI_CYAN, MODEL_LABEL),
        };
        self.emit(format_args!("\n{label}\n"));
        if !message.attachments().is_empty() {
            let chips = message
                .attachments()
                .iter()
                .map(|attachment| {
                    let kind = if attachment.is_image() { "image" } else { "file" };
                    format!("[{kind}: {}]", attachment.name())
                })
                .collect::<Vec<_>>()
                .join(" ");
            let chips = self.styled(ANSI_DIM, &chips);
            self.emit(format_args!("{chips}\n"));
        }
    }

    fn print_footer(&mut self, message: &Message) {
        let clock = self.styled(ANSI_DIM, &clock_label(message.timestamp()));
        self.emit(format_args!("{clock}\n"));
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn message_appended(&mut self, message: &Message) {
        self.close_stream();
        self.print_header(message);
        self.emit(format_args!("{}", message.text()));
        if message.is_streaming() {
            self.streaming = Some(message.id().clone());
            self.printed = message.text().to_string();
        } else {
            if !message.text().is_empty() {
                self.emit(format_args!("\n"));
            }
            self.print_footer(message);
        }
        self.flush();
    }

    fn message_updated(&mut self, message: &Message) {
        if self.streaming.as_ref() != Some(message.id()) {
            self.message_appended(message);
            return;
        }
        let text = message.text();
        if let Some(suffix) = text.strip_prefix(self.printed.as_str()) {
            self.emit(format_args!("{suffix}"));
        } else {
            // The text was replaced rather than extended.
            self.emit(format_args!("\n{text}"));
        }
        self.printed = text.to_string();
        if !message.is_streaming() {
            self.close_stream();
            self.print_footer(message);
        }
        self.flush();
    }

    fn set_loading(&mut self, _loading: bool) {
        self.flush();
    }

    fn print_warning(&mut self, warning: &str) {
        self.close_stream();
        let warning = self.styled(ANSI_YELLOW, &format!("Warning: {warning}"));
        self.emit(format_args!("{warning}\n"));
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.close_stream();
        let error = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.emit(format_args!("{error}\n"));
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        self.close_stream();
        self.emit(format_args!("{info}\n"));
        self.flush();
    }
}
