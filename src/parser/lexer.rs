//! GCode Lexer
//!
//! Fast, simple tokenization of plotter GCode lines.
//! A line is `WORD WORD ... ; comment`, each word a letter glued to a numeral.

/// A single word like "G1" or "X-10.5"
///
/// The numeral is kept verbatim. Interpreting it is left to the caller,
/// see [`Word::number`](crate::parser::Word::number).
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// Upper-cased word letter
    pub letter: char,
    /// Raw numeral text following the letter (may be malformed or empty)
    pub value: String,
}

/// Split a raw line into its code part and its comment (without the `;`)
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once(';') {
        Some((code, comment)) => (code, Some(comment)),
        None => (line, None),
    }
}

/// Tokenize a line of GCode into words
///
/// Everything after the first `;` is dropped. Pieces that do not start
/// with a letter are skipped.
pub fn tokenize_line(line: &str) -> Vec<Word> {
    let (code, _) = split_comment(line);
    code.split_whitespace().filter_map(word_from_piece).collect()
}

/// Turn "X10.5" into a word, `None` when it does not start with a letter
pub(crate) fn word_from_piece(piece: &str) -> Option<Word> {
    let mut chars = piece.chars();
    let letter = chars.next()?;

    if !letter.is_ascii_alphabetic() {
        return None;
    }

    Some(Word {
        letter: letter.to_ascii_uppercase(),
        value: chars.as_str().to_string(),
    })
}
