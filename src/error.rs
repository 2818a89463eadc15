//! Error types for the WBS front-end.
//!
//! The front-end never aborts on malformed input: the lexer is total and the
//! tree builder records problems as [`SyntaxError`] values while it keeps
//! consuming tokens. Callers receive the full diagnostics list alongside the
//! tree and decide how to surface it (the editor draws markers and a popup
//! list from exactly these values).

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The category of a syntax diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyntaxErrorKind {
    /// A phrase node failed the completion check at final validation.
    IncompletePhrase,
    /// A lexeme could not be classified and no later rule rescued it.
    UnknownToken,
}

/// A positioned syntax diagnostic.
///
/// Line and column are 0-based and use the lexer's counting scheme, so they
/// line up with the positions carried on [`Lexeme`](crate::lexer::Lexeme)s
/// and [`Token`](crate::token::Token)s.
///
/// # Example
///
/// ```rust
/// use wbs::error::{SyntaxError, SyntaxErrorKind};
///
/// let err = SyntaxError::new(SyntaxErrorKind::UnknownToken, 2, 14);
/// assert_eq!(err.to_string(), "Cannot parse token on Line 2:14.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyntaxError {
    /// A phrase is missing mandated children or an unmatched bracket.
    #[error("Incomplete phrase on Line {line}:{column}.")]
    IncompletePhrase {
        /// 0-based source line of the offending token.
        line: u32,
        /// Column of the offending token on that line.
        column: u32,
    },
    /// A token the classifier could not make sense of.
    #[error("Cannot parse token on Line {line}:{column}.")]
    UnknownToken {
        /// 0-based source line of the offending token.
        line: u32,
        /// Column of the offending token on that line.
        column: u32,
    },
}

impl SyntaxError {
    /// Creates a diagnostic of the given kind at a source position.
    pub fn new(kind: SyntaxErrorKind, line: u32, column: u32) -> Self {
        match kind {
            SyntaxErrorKind::IncompletePhrase => SyntaxError::IncompletePhrase { line, column },
            SyntaxErrorKind::UnknownToken => SyntaxError::UnknownToken { line, column },
        }
    }

    /// The diagnostic category.
    pub fn kind(&self) -> SyntaxErrorKind {
        match self {
            SyntaxError::IncompletePhrase { .. } => SyntaxErrorKind::IncompletePhrase,
            SyntaxError::UnknownToken { .. } => SyntaxErrorKind::UnknownToken,
        }
    }

    /// 0-based source line the diagnostic points at.
    pub fn line(&self) -> u32 {
        match self {
            SyntaxError::IncompletePhrase { line, .. } | SyntaxError::UnknownToken { line, .. } => {
                *line
            }
        }
    }

    /// Column on [`line`](Self::line) the diagnostic points at.
    pub fn column(&self) -> u32 {
        match self {
            SyntaxError::IncompletePhrase { column, .. }
            | SyntaxError::UnknownToken { column, .. } => *column,
        }
    }

    /// Sort key for source-order reporting.
    pub(crate) fn position(&self) -> (u32, u32) {
        (self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_editor_popup_wording() {
        let incomplete = SyntaxError::new(SyntaxErrorKind::IncompletePhrase, 0, 3);
        assert_eq!(incomplete.to_string(), "Incomplete phrase on Line 0:3.");

        let unknown = SyntaxError::new(SyntaxErrorKind::UnknownToken, 7, 0);
        assert_eq!(unknown.to_string(), "Cannot parse token on Line 7:0.");
    }

    #[test]
    fn accessors_round_trip() {
        let err = SyntaxError::new(SyntaxErrorKind::UnknownToken, 4, 9);
        assert_eq!(err.kind(), SyntaxErrorKind::UnknownToken);
        assert_eq!(err.line(), 4);
        assert_eq!(err.column(), 9);
    }
}
