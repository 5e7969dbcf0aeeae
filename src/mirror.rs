//! Left-right mirroring of programs
//!
//! Used when drawing on the back of a transparent surface: X coordinates
//! and arc center X offsets are negated, and arc winding is reversed.
//! Works word by word, so `G20` is never mistaken for an arc and negative
//! values flip back cleanly.

use crate::parser::lexer::word_from_piece;
use crate::parser::{split_comment, Word};

/// Mirror one program line
///
/// Lines with nothing to mirror come back verbatim. Words whose numeral
/// does not parse are left as they are.
pub fn mirror_line(line: &str) -> String {
    let (code, comment) = split_comment(line);
    let pieces: Vec<&str> = code.split_whitespace().collect();

    // M101 carries tool sync data in I, which must not be flipped
    let keep_i = pieces
        .iter()
        .any(|p| word_from_piece(p).is_some_and(|w| w.is_code('M', "101")));

    let mut changed = false;
    let mirrored: Vec<String> = pieces
        .iter()
        .map(|piece| match mirror_piece(piece, keep_i) {
            Some(replacement) => {
                changed = true;
                replacement
            }
            None => (*piece).to_string(),
        })
        .collect();

    if !changed {
        return line.to_string();
    }

    let mut out = mirrored.join(" ");
    if let Some(comment) = comment {
        out.push_str(" ;");
        out.push_str(comment);
    }
    out
}

/// Mirror every line of a program
pub fn mirror_program<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines.iter().map(|l| mirror_line(l.as_ref())).collect()
}

fn mirror_piece(piece: &str, keep_i: bool) -> Option<String> {
    let word = word_from_piece(piece)?;

    match word.letter {
        'X' => negated(&word),
        'I' if !keep_i => negated(&word),
        'G' => {
            let swapped = match word.value.as_str() {
                "2" => "3",
                "02" => "03",
                "3" => "2",
                "03" => "02",
                _ => return None,
            };
            Some(format!("G{}", swapped))
        }
        _ => None,
    }
}

fn negated(word: &Word) -> Option<String> {
    let value = match word.number() {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Not mirroring '{}': {}", word, e);
            return None;
        }
    };

    let flipped = -value;
    if flipped == 0.0 {
        Some(format!("{}0", word.letter))
    } else {
        Some(format!("{}{}", word.letter, flipped))
    }
}
