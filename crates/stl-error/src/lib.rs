//! Diagnostic classification and pretty-printing for the STL front-end.
//!
//! When the lexer or parser aborts, this crate turns the failure into a
//! stable [`DiagnosticCode`] (§4.B) and renders it as a three-line block: a
//! colored `error[id]` tag with `file:line:col`, the offending source line
//! with a numeric gutter, and a gutter-aligned caret span.

mod classify;
mod symbol;

pub use classify::{classify_lex_error, classify_parse_stack};
pub use symbol::Symbol;

use colored::Colorize;
use stl_diagnostics_codes::DiagnosticCode;
use stl_position::{ErrorPosition, LineStartsCache};

/// A fully formed diagnostic: a stable code, the file it occurred in, and
/// the source position to point the caret at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub file: String,
    pub position: ErrorPosition,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, file: impl Into<String>, position: ErrorPosition) -> Self {
        Diagnostic { code, file: file.into(), position }
    }

    /// Render the three-line pretty-printed block described in §4.B.
    pub fn render(&self, source: &str) -> String {
        let cache = LineStartsCache::new(source);
        let line_text = cache.line_text(source, self.position.line);
        let gutter = format!("{}", self.position.line);
        let pad = " ".repeat(gutter.len());

        let header = format!(
            "{}[{}]: {} ({}:{}:{})",
            "error".red().bold(),
            self.code,
            self.code.message(),
            self.file,
            self.position.line,
            self.position.column_start,
        );
        let source_line = format!("{} | {}", gutter.dimmed(), line_text);
        let caret_width = (self.position.column_end.max(self.position.column_start + 1)
            - self.position.column_start) as usize;
        let caret = format!(
            "{} | {}{}",
            pad,
            " ".repeat((self.position.column_start.saturating_sub(1)) as usize),
            "^".repeat(caret_width.max(1)).red().bold()
        );

        format!("{header}\n{source_line}\n{caret}")
    }
}
