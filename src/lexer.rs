//! Lexical analysis for WBS.
//!
//! This module splits raw source text into a stream of positioned
//! [`Lexeme`]s that the tree builder classifies and consumes. The lexer
//! knows nothing about token kinds: it only groups characters into words,
//! strings, and standalone symbols, drops comments and whitespace, and
//! stamps every lexeme with a source position.
//!
//! # Example
//!
//! ```rust
//! use wbs::lexer::Lexer;
//!
//! let lexemes = Lexer::new("const x = 3 // answer").tokenize();
//! let values: Vec<&str> = lexemes.iter().map(|l| l.value.as_str()).collect();
//!
//! assert_eq!(values, ["const", "x", "=", "3"]);
//! ```
//!
//! # Rules
//!
//! - **Words** accumulate ASCII letters, digits, underscores, and periods
//!   (periods so that `file.ext` and dotted paths stay one lexeme).
//! - `#` is accepted only as the first character of a lexeme, for color
//!   literals like `#ff0000`.
//! - **Strings** run from `"` to the next `"` with both quotes included and
//!   no escape handling; they may span line breaks. An unterminated string
//!   becomes one lexeme holding the rest of the input.
//! - **Comments** start where a `/` immediately follows another `/`; the
//!   already-emitted `/` lexeme is removed and input is discarded up to the
//!   next newline.
//! - Any other non-whitespace character is emitted on its own.
//!
//! The lexer cannot fail and emits nothing for whitespace-only input.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A positioned fragment of raw source text.
///
/// Lines and columns are 0-based. The column counter advances on every
/// non-newline character and resets to 0 at a newline, and each lexeme
/// carries the counter value at which it was emitted. Diagnostics downstream
/// reuse these positions verbatim, so the counting scheme is part of the
/// contract.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lexeme {
    /// The raw text of the lexeme.
    pub value: String,
    /// 0-based source line of the lexeme's last character.
    pub line: u32,
    /// Column of the lexeme's last character on that line.
    pub column: u32,
}

impl Lexeme {
    /// Creates a new lexeme.
    pub fn new(value: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            value: value.into(),
            line,
            column,
        }
    }
}

/// The WBS lexer.
///
/// The lexer scans the whole input in one pass. It is not an iterator
/// because the comment rule retroactively removes the already-emitted `/`
/// lexeme when the second `/` arrives.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Scans the source and returns all lexemes in order.
    pub fn tokenize(&self) -> Vec<Lexeme> {
        let mut lexemes: Vec<Lexeme> = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut in_comment = false;
        let mut line: u32 = 0;
        let mut column: u32 = 0;
        let mut prev: Option<char> = None;

        for ch in self.source.chars() {
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }

            if in_comment {
                if ch == '\n' {
                    in_comment = false;
                }
                prev = Some(ch);
                continue;
            }

            if in_string {
                current.push(ch);
                if ch == '"' {
                    in_string = false;
                    lexemes.push(Lexeme::new(std::mem::take(&mut current), line, column));
                }
                prev = Some(ch);
                continue;
            }

            // The first slash already went out as a standalone lexeme; the
            // second one turns it into a comment, so take it back.
            if ch == '/' && prev == Some('/') {
                in_comment = true;
                lexemes.pop();
                prev = Some(ch);
                continue;
            }

            if ch == '"' {
                in_string = true;
                current.push(ch);
                prev = Some(ch);
                continue;
            }

            if ch.is_ascii_alphanumeric()
                || ch == '_'
                || ch == '.'
                || (current.is_empty() && ch == '#')
            {
                current.push(ch);
            } else {
                if !current.is_empty() {
                    lexemes.push(Lexeme::new(std::mem::take(&mut current), line, column));
                }
                if !ch.is_whitespace() {
                    lexemes.push(Lexeme::new(ch.to_string(), line, column));
                }
            }
            prev = Some(ch);
        }

        if !current.is_empty() {
            lexemes.push(Lexeme::new(current, line, column));
        }

        lexemes
    }
}
