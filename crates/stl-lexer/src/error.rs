//! Error types for the STL lexer

use thiserror::Error;

/// Result type for lexer operations
pub type Result<T> = std::result::Result<T, LexerError>;

/// Errors the lexer can surface. Each variant carries enough position
/// information for the diagnostic classifier (`stl-error`) to render a
/// source excerpt and caret.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexerError {
    /// A double-quoted string literal was never closed before EOF or newline.
    #[error("Unterminated string literal starting at byte {start}")]
    MissingStringQuote { start: usize },

    /// A single-quoted literal was used; STL only supports double quotes.
    #[error("Single-quoted literal at byte {start}")]
    UnsupportedSingleQuote { start: usize },

    /// Any other byte the lexer could not classify into a token.
    #[error("Unexpected character {found:?} at byte {start}")]
    UnknownLexerError { start: usize, found: char },
}

impl LexerError {
    /// The byte offset at which the error begins.
    pub fn start(&self) -> usize {
        match self {
            LexerError::MissingStringQuote { start }
            | LexerError::UnsupportedSingleQuote { start }
            | LexerError::UnknownLexerError { start, .. } => *start,
        }
    }
}
