//! # Parse Errors
//!
//! Error types for the PHP parser. Every error carries the byte span of the
//! offending token plus its line and column.
//!
//! ## Example
//!
//! ```rust
//! use php_parser::error::ParseError;
//!
//! let error = ParseError::unexpected_token(")", "identifier");
//! assert!(error.to_string().contains("unexpected token ')'"));
//! ```

use php_ast::{Diagnostic, Position, Span};
use thiserror::Error;

// =============================================================================
// PARSE ERROR
// =============================================================================

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {}, column {}", .position.line + 1, .position.column + 1)]
pub struct ParseError {
    /// Error kind with details.
    pub kind: ParseErrorKind,
    /// Source location of error.
    pub span: Span,
    /// Line and column of `span.start()`.
    pub position: Position,
}

impl ParseError {
    /// Create a new parse error.
    ///
    /// ## Parameters
    ///
    /// - `kind`: Error kind
    /// - `span`: Source location
    /// - `position`: Line/column of the span start
    pub const fn new(kind: ParseErrorKind, span: Span, position: Position) -> Self {
        Self { kind, span, position }
    }

    /// Create unexpected token error without a location.
    ///
    /// ## Parameters
    ///
    /// - `found`: Token that was found
    /// - `expected`: Description of expected token
    pub fn unexpected_token(found: &str, expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                found: found.to_string(),
                expected: expected.to_string(),
            },
            Span::default(),
            Position::default(),
        )
    }

    /// Create unexpected EOF error without a location.
    pub fn unexpected_eof(expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            },
            Span::default(),
            Position::default(),
        )
    }

    /// Attach a location.
    pub fn at(mut self, span: Span, position: Position) -> Self {
        self.span = span;
        self.position = position;
        self
    }

    /// Convert to an error-severity diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string(), self.span)
    }
}

// =============================================================================
// PARSE ERROR KIND
// =============================================================================

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Found unexpected token.
    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        /// Token that was found.
        found: String,
        /// Description of what was expected.
        expected: String,
    },

    /// Unexpected end of file.
    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof {
        /// Description of what was expected.
        expected: String,
    },

    /// Unterminated string, backtick or heredoc literal.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Unterminated `/* ... */` comment.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// Repeated or conflicting modifier (`public public`, `public private`).
    #[error("invalid modifier '{modifier}': {reason}")]
    InvalidModifier {
        /// The offending modifier keyword.
        modifier: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The source never enters PHP mode.
    #[error("missing '<?php' open tag")]
    MissingOpenTag,

    /// Valid PHP this parser does not model.
    #[error("unsupported syntax: {0}")]
    Unsupported(String),
}

// =============================================================================
// TESTS
// =============================================================================
