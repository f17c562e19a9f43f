//! engine::trace
//!
//! `enter:` / `exit:` tracing of action invocations.
//!
//! Lines go to a diagnostic writer (stderr unless replaced) and are indented
//! two spaces per nesting level:
//!
//! ```text
//! enter: release
//!   enter: build
//!   exit: build
//! exit: release
//! ```

use std::io::{self, Write};

use colored::Colorize;

/// Writes trace lines for one [`Context`](super::Context).
pub struct Tracer {
    out: Box<dyn Write>,
    color: bool,
}

impl Tracer {
    /// A tracer writing to stderr.
    pub fn stderr(color: bool) -> Self {
        Self::new(io::stderr(), color)
    }

    pub fn new(out: impl Write + 'static, color: bool) -> Self {
        Self {
            out: Box::new(out),
            color,
        }
    }

    pub fn enter(&mut self, name: &str, depth: usize) {
        let marker = if self.color {
            "enter:".green().to_string()
        } else {
            "enter:".to_string()
        };
        self.line(&marker, name, depth);
    }

    pub fn exit(&mut self, name: &str, depth: usize) {
        let marker = if self.color {
            "exit:".blue().to_string()
        } else {
            "exit:".to_string()
        };
        self.line(&marker, name, depth);
    }

    fn line(&mut self, marker: &str, name: &str, depth: usize) {
        // Trace output is best effort; a closed stderr must not fail the action.
        let _ = writeln!(self.out, "{:indent$}{} {}", "", marker, name, indent = depth * 2);
        let _ = self.out.flush();
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}
