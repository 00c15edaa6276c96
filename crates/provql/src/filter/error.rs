//! Error types for the filter pipeline.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors from any stage of the filter pipeline.
///
/// A filter string either fully translates or is rejected; none of these
/// errors is recovered from internally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The input contains a character sequence that matches no token.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token sequence violates the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A syntactically valid comparison is semantically invalid.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Error encountered during lexical analysis.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// A contiguous substring matches no token pattern.
    #[error("unrecognized input '{text}' at position {position}")]
    UnknownToken {
        /// The offending character sequence.
        text: String,
        /// Byte offset where the sequence starts.
        position: usize,
    },

    /// A string literal was opened but never closed.
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
}

/// Error encountered while parsing the token stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {expected} but found {found} at position {position}")]
pub struct ParseError {
    /// Byte offset of the offending token (or of the last token, when the
    /// input ended early).
    pub position: usize,
    /// Description of the token kinds that were valid at this point.
    pub expected: String,
    /// Rendering of the token actually seen, or `end of input`.
    pub found: String,
}

impl ParseError {
    /// Creates a parse error for an unexpected token.
    pub(crate) fn new(
        position: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        ParseError {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a parse error for input that ended before the grammar was
    /// satisfied.
    pub(crate) fn end_of_input(position: usize, expected: impl Into<String>) -> Self {
        ParseError {
            position,
            expected: expected.into(),
            found: "end of input".to_string(),
        }
    }
}

/// Error raised when a parsed comparison cannot be translated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    /// The property path is not in the allow-list for the entity kind.
    #[error("unknown field '{path}'{}", .suggestion.as_ref().map(|s| format!(". Did you mean '{s}'?")).unwrap_or_default())]
    UnknownField {
        /// The rejected property path.
        path: String,
        /// Closest known field name, if one is within edit distance.
        suggestion: Option<String>,
    },

    /// A literal cannot be coerced to the kind its operator requires.
    #[error("invalid value for '{path}': {reason}")]
    InvalidValue {
        /// The property path the comparison applies to.
        path: String,
        /// What went wrong during coercion.
        reason: String,
    },
}

impl SemanticError {
    /// Creates an invalid-value error.
    pub(crate) fn invalid_value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SemanticError::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
