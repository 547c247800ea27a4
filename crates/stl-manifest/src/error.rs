//! Manifest parse failures (§7 link errors: these abort the run before
//! resolution even starts).

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("manifest:{line}:{column}: unexpected character {found:?}")]
    UnexpectedChar { line: u32, column: u32, found: char },

    #[error("manifest:{line}:{column}: unterminated string literal")]
    UnterminatedString { line: u32, column: u32 },

    #[error("manifest:{line}:{column}: expected {expected}, found {found:?}")]
    Expected { line: u32, column: u32, expected: &'static str, found: String },

    #[error("manifest root must be a map, got {0}")]
    RootNotMap(&'static str),

    #[error("manifest key {0} must be a list of strings")]
    ExpectedStringList(&'static str),

    #[error("manifest `roles` entries must be maps with a `role` key")]
    MalformedRoleEntry,
}
