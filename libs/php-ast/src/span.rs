//! # Source Span
//!
//! Represents a range in the source code for error reporting and source mapping.
//! Synthesized nodes carry `Span::default()`.
//!
//! ## Usage
//!
//! ```rust
//! use php_ast::Span;
//!
//! let span = Span::new(0, 10);
//! assert_eq!(span.start(), 0);
//! assert_eq!(span.end(), 10);
//! assert_eq!(span.len(), 10);
//! ```

use serde::{Deserialize, Serialize};

/// A range in the source code, represented as byte offsets.
///
/// # Fields
///
/// - `start`: Starting byte offset (inclusive)
/// - `end`: Ending byte offset (exclusive)
///
/// # Example
///
/// ```rust
/// use php_ast::Span;
///
/// // For source "<?php echo 1;" the span of "echo" would be:
/// let span = Span::new(6, 10);
/// assert_eq!(span.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting byte offset (inclusive)
    start: usize,
    /// Ending byte offset (exclusive)
    end: usize,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the starting byte offset.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the ending byte offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Creates a span that encompasses both this span and another.
    ///
    /// # Example
    ///
    /// ```rust
    /// use php_ast::Span;
    ///
    /// let merged = Span::new(0, 5).merge(&Span::new(10, 15));
    /// assert_eq!(merged.start(), 0);
    /// assert_eq!(merged.end(), 15);
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Checks if this span contains a byte offset.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the covered slice of `source`, or `None` when the span does not
    /// fall on character boundaries of that text.
    ///
    /// # Example
    ///
    /// ```rust
    /// use php_ast::Span;
    ///
    /// assert_eq!(Span::new(6, 10).slice("<?php echo 1;"), Some("echo"));
    /// ```
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start..self.end)
    }
}

/// A point in the source: byte offset plus zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset.
    pub byte: usize,
    /// Line (0-indexed).
    pub line: usize,
    /// Column in characters (0-indexed).
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(byte: usize, line: usize, column: usize) -> Self {
        Self { byte, line, column }
    }
}
