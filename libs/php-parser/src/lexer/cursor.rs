//! # Character Cursor
//!
//! Peekable character cursor for the lexer.
//! Tracks position (byte, line, column) as it advances.
//!
//! ## Example
//!
//! ```rust
//! use php_parser::lexer::Cursor;
//!
//! let mut cursor = Cursor::new("<?php");
//! assert_eq!(cursor.peek(), Some('<'));
//! cursor.advance();
//! assert_eq!(cursor.peek(), Some('?'));
//! ```

use php_ast::Position;

// =============================================================================
// CURSOR
// =============================================================================

/// Character cursor with position tracking.
///
/// Provides peekable iteration over source characters
/// while tracking byte offset, line, and column.
pub struct Cursor<'a> {
    /// Source text.
    source: &'a str,
    /// Current byte offset.
    byte: usize,
    /// Current line (0-indexed).
    line: usize,
    /// Current column (0-indexed).
    column: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            byte: 0,
            line: 0,
            column: 0,
        }
    }

    /// Get current position.
    pub fn position(&self) -> Position {
        Position::new(self.byte, self.line, self.column)
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.byte
    }

    /// Check if at end of file.
    pub fn is_eof(&self) -> bool {
        self.byte >= self.source.len()
    }

    /// Unconsumed source text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.byte..]
    }

    /// Peek at current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peek at next character (one ahead of current).
    pub fn peek_next(&self) -> Option<char> {
        self.peek_nth(1)
    }

    /// Peek `n` characters ahead; `peek_nth(0)` is `peek()`.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Check whether the unconsumed text starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance to next character.
    ///
    /// ## Returns
    ///
    /// Character that was consumed, or None if at EOF
    ///
    /// ## Example
    ///
    /// ```rust
    /// use php_parser::lexer::Cursor;
    ///
    /// let mut cursor = Cursor::new("ab");
    /// assert_eq!(cursor.advance(), Some('a'));
    /// assert_eq!(cursor.advance(), Some('b'));
    /// assert_eq!(cursor.advance(), None);
    /// ```
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.byte += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advance by `count` characters.
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Advance until the byte offset reaches `target`.
    pub fn advance_to(&mut self, target: usize) {
        while self.byte < target && self.advance().is_some() {}
    }

    /// Advance while predicate is true.
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_empty() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_cursor_peek_nth() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.peek_nth(2), Some('c'));
        assert_eq!(cursor.peek_nth(3), None);
    }

    #[test]
    fn test_cursor_newline() {
        let mut cursor = Cursor::new("a\nb");
        cursor.advance();
        assert_eq!(cursor.position().line, 0);
        cursor.advance();
        assert_eq!(cursor.position().line, 1);
        assert_eq!(cursor.position().column, 0);
    }

    #[test]
    fn test_cursor_advance_to() {
        let mut cursor = Cursor::new("<?php echo");
        cursor.advance_to(5);
        assert_eq!(cursor.rest(), " echo");
        assert!(cursor.starts_with(" e"));
    }

    #[test]
    fn test_cursor_utf8() {
        let mut cursor = Cursor::new("é");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.position().byte, 2);
    }
}
