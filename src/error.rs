//! Error types for the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the document API
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read G-code program: {0}")]
    Io(#[from] std::io::Error),

    #[error("cursor at line {position} is past the end of the program ({total} lines)")]
    CursorOutOfRange { position: usize, total: usize },

    #[error("invalid machine settings in {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },
}

/// Failure to read the numeral of a single word
///
/// Never fatal: the estimator stops reading the line, the geometry
/// compiler drops the line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("word '{letter}' has no value")]
    MissingValue { letter: char },

    #[error("'{letter}{value}' is not a number")]
    InvalidNumber { letter: char, value: String },
}
