//! Parsed line representation
//!
//! Plain data plus the few lookups the interpreters need. Nothing here
//! touches machine state.

use crate::error::ParseError;
use crate::parser::lexer::{split_comment, word_from_piece};

pub use crate::parser::lexer::Word;

/// Motion requested by the first word of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// G0 / G1 straight move
    Linear,
    /// G2 arc
    ArcClockwise,
    /// G3 arc
    ArcCounterClockwise,
}

impl Motion {
    pub fn is_arc(self) -> bool {
        !matches!(self, Motion::Linear)
    }
}

impl Word {
    /// Parse the numeral of this word
    pub fn number(&self) -> Result<f64, ParseError> {
        if self.value.is_empty() {
            return Err(ParseError::MissingValue {
                letter: self.letter,
            });
        }

        // f64 parsing also accepts "inf" and "nan", which no program means
        match self.value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ParseError::InvalidNumber {
                letter: self.letter,
                value: self.value.clone(),
            }),
        }
    }

    /// Exact match on letter and raw numeral, e.g. `is_code('G', "20")`
    pub fn is_code(&self, letter: char, code: &str) -> bool {
        self.letter == letter && self.value == code
    }

    /// Motion selected by this word, if it is one of the G0..G3 family
    pub fn motion(&self) -> Option<Motion> {
        if self.letter != 'G' {
            return None;
        }

        match self.value.as_str() {
            "0" | "00" | "1" | "01" => Some(Motion::Linear),
            "2" | "02" => Some(Motion::ArcClockwise),
            "3" | "03" => Some(Motion::ArcCounterClockwise),
            _ => None,
        }
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.letter, self.value)
    }
}

/// A line split into words with its trailing comment kept
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedLine {
    pub words: Vec<Word>,
    /// Comment text without the leading `;`
    pub comment: Option<String>,
}

impl ParsedLine {
    /// Build from raw text
    pub fn from_text(line: &str) -> Self {
        let (code, comment) = split_comment(line);

        Self {
            words: code.split_whitespace().filter_map(word_from_piece).collect(),
            comment: comment.map(str::to_string),
        }
    }

    /// Motion of the line, decided by its first word only
    pub fn motion(&self) -> Option<Motion> {
        self.words.first().and_then(Word::motion)
    }

    pub fn has_code(&self, letter: char, code: &str) -> bool {
        self.words.iter().any(|w| w.is_code(letter, code))
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.comment.is_none()
    }
}
