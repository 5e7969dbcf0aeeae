//! GCode Parser
//!
//! Tokenization of single plotter GCode lines into letter/value words.
//! Meaning is assigned later by the estimator and the geometry compiler.

pub mod ast;
pub mod lexer;

pub use ast::{Motion, ParsedLine};
pub use lexer::{split_comment, tokenize_line, Word};

/// Parse a single line of GCode into structured data
pub fn parse_line(line: &str) -> ParsedLine {
    ParsedLine::from_text(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let result = parse_line("G1 X10 Y20");

        assert_eq!(result.motion(), Some(Motion::Linear));
        assert_eq!(result.words.len(), 3);
        assert_eq!(result.words[1].letter, 'X');
        assert_eq!(result.words[1].value, "10");
    }

    #[test]
    fn test_parse_with_comment() {
        let result = parse_line("G1 X10 ; move to X10");

        assert_eq!(result.words.len(), 2);
        assert_eq!(result.comment.as_deref(), Some(" move to X10"));
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(parse_line("   ").is_empty());
    }
}
