//! Tokenizer.
//!
//! Source text is a sequence of tokens separated by ASCII whitespace. A `;`
//! starts a comment that runs to the end of the line. Line breaks carry no
//! meaning beyond position tracking.

use crate::errors::SourceLocation;

/// A token and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text, never empty and never containing whitespace.
    pub text: &'a str,
    /// Position in the source.
    pub location: SourceLocation,
}

/// Splits `source` into tokens, in order.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    for (line_idx, line) in source.lines().enumerate() {
        let code = line.split_once(';').map_or(line, |(code, _)| code);
        // (byte offset, 1-based column) of the token being scanned.
        let mut start: Option<(usize, usize)> = None;
        let chars = code.char_indices().chain(std::iter::once((code.len(), ' ')));

        for (column, (offset, ch)) in (1..).zip(chars) {
            match (ch.is_ascii_whitespace(), start) {
                (false, None) => start = Some((offset, column)),
                (true, Some((begin, begin_column))) => {
                    tokens.push(Token {
                        text: &code[begin..offset],
                        location: SourceLocation {
                            line: line_idx + 1,
                            column: begin_column,
                            token_index: tokens.len(),
                        },
                    });
                    start = None;
                }
                _ => {}
            }
        }
    }

    tokens
}
