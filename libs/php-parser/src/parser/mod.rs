//! # PHP Parser
//!
//! Recursive descent parser for PHP producing the `php-ast` tree.
//!
//! ## Example
//!
//! ```rust
//! use php_parser::lexer::Lexer;
//! use php_parser::parser::Parser;
//!
//! let tokens = Lexer::new("<?php echo 1;").tokenize().unwrap();
//! let ast = Parser::new(tokens).parse_file().unwrap();
//! assert_eq!(ast.stmts.len(), 1);
//! ```
//!
//! ## Layout
//!
//! - `declarations`: namespaces, imports, class-likes, members, functions
//! - `statements`: control flow and simple statements
//! - `expressions`: primaries and postfix chains
//! - `operators`: precedence climbing for binary/unary operators
//! - `types`: type declarations

mod declarations;
mod expressions;
mod operators;
mod statements;
mod types;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Token, TokenKind};
use php_ast::{Ast, Expr, Span, Stmt, Type};

// =============================================================================
// PARSER
// =============================================================================

/// Recursive descent parser for PHP.
pub struct Parser {
    /// Token stream, terminated by EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Returned by `peek` past the end of the stream.
    eof: Token,
    /// Comments of consumed tokens not yet placed in the tree.
    comments: Vec<String>,
}

impl Parser {
    /// Create a new parser over tokens from [`crate::lexer::Lexer`].
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens.last().filter(|t| t.is_eof()).cloned().unwrap_or_else(|| {
            let end = tokens.last().map_or(0, |t| t.span.end());
            Token::new(
                TokenKind::Eof,
                Span::new(end, end),
                php_ast::Position::new(end, 0, 0),
                String::new(),
            )
        });
        Self {
            tokens,
            current: 0,
            eof,
            comments: Vec::new(),
        }
    }

    /// Parse a whole file.
    ///
    /// Fails on the first syntax error; there is no partial tree.
    pub fn parse_file(&mut self) -> Result<Ast, ParseError> {
        let start = self.peek().span.start();
        let stmts = self.parse_top_level(false)?;
        let end = self.peek().span.end();
        Ok(Ast {
            stmts,
            span: Span::new(start, end),
        })
    }

    /// Parse a standalone type declaration followed by end of input.
    pub fn parse_standalone_type(&mut self) -> Result<Type, ParseError> {
        self.skip_tags();
        let ty = self.parse_type()?;
        self.skip_tags();
        self.expect(TokenKind::Eof)?;
        Ok(ty)
    }

    /// Parse a standalone expression followed by end of input.
    pub fn parse_standalone_expr(&mut self) -> Result<Expr, ParseError> {
        self.skip_tags();
        let expr = self.parse_expr()?;
        self.match_token(TokenKind::Semicolon);
        self.skip_tags();
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    /// Statements at file level, where unbraced namespaces collect the
    /// statements that follow them.
    pub(crate) fn parse_top_level(&mut self, inside_namespace: bool) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_tags_and_empty();
            stmts.extend(self.leading_comments().into_iter().map(Stmt::Comment));
            if self.is_at_end() || (inside_namespace && self.at_namespace()) {
                break;
            }
            if inside_namespace && self.check(TokenKind::RBrace) {
                break;
            }
            if !inside_namespace && self.at_namespace() {
                stmts.push(self.parse_namespace()?);
                continue;
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Get current token.
    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Get the token `n` positions ahead.
    pub(crate) fn peek_at(&self, n: usize) -> &Token {
        self.tokens.get(self.current + n).unwrap_or(&self.eof)
    }

    /// Get current token kind.
    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Check if current token matches kind.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Check the kind `n` positions ahead.
    pub(crate) fn check_at(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_at(n).kind == kind
    }

    /// Check if current token is the keyword `kw` (case-insensitive).
    pub(crate) fn check_kw(&self, kw: &str) -> bool {
        self.peek().is_keyword(kw)
    }

    /// Check for a keyword `n` positions ahead.
    pub(crate) fn check_kw_at(&self, n: usize, kw: &str) -> bool {
        self.peek_at(n).is_keyword(kw)
    }

    /// Check if at end of file.
    pub(crate) fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Advance to next token.
    ///
    /// ## Returns
    ///
    /// The token that was consumed
    ///
    /// Its comments, and its doc comment unless taken with
    /// [`Parser::take_doc`], move to the pending comment buffer.
    pub(crate) fn advance(&mut self) -> Token {
        let Some(token) = self.tokens.get_mut(self.current) else {
            return self.eof.clone();
        };
        self.comments.append(&mut token.comments);
        self.comments.extend(token.doc.take());
        let token = token.clone();
        if !token.is_eof() {
            self.current += 1;
        }
        token
    }

    /// Take the doc comment of the current token.
    pub(crate) fn take_doc(&mut self) -> Option<String> {
        self.tokens.get_mut(self.current).and_then(|t| t.doc.take())
    }

    /// Drain pending comments plus those in front of the current token.
    pub(crate) fn take_comments(&mut self) -> Vec<String> {
        let mut comments = std::mem::take(&mut self.comments);
        if let Some(token) = self.tokens.get_mut(self.current) {
            comments.append(&mut token.comments);
        }
        comments
    }

    /// Byte offset where the previously consumed token ends.
    pub(crate) fn previous_end(&self) -> usize {
        match self.current.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end(),
            None => 0,
        }
    }

    /// Consume token if it matches expected kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.display()))
        }
    }

    /// Consume the keyword `kw` or fail.
    pub(crate) fn expect_kw(&mut self, kw: &str) -> Result<Token, ParseError> {
        if self.check_kw(kw) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&format!("'{kw}'")))
        }
    }

    /// Consume an identifier and return its text.
    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        if self.check(TokenKind::Ident) {
            Ok(self.advance().text)
        } else {
            Err(self.error_expected(what))
        }
    }

    /// Consume a variable and return its name without `$`.
    pub(crate) fn expect_variable(&mut self) -> Result<String, ParseError> {
        if self.check(TokenKind::Variable) {
            Ok(self.advance().text)
        } else {
            Err(self.error_expected("variable"))
        }
    }

    /// Try to consume token if it matches.
    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Try to consume the keyword `kw`.
    pub(crate) fn match_kw(&mut self, kw: &str) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Statement terminator: `;`, or a `?>` which is left for the
    /// statement loop.
    pub(crate) fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        if self.match_token(TokenKind::Semicolon) || self.check(TokenKind::CloseTag) {
            Ok(())
        } else {
            Err(self.error_expected("';'"))
        }
    }

    /// Skip open and close tags.
    pub(crate) fn skip_tags(&mut self) {
        while matches!(self.peek_kind(), TokenKind::OpenTag | TokenKind::CloseTag) {
            self.advance();
        }
    }

    /// Skip tags and empty statements.
    pub(crate) fn skip_tags_and_empty(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::OpenTag | TokenKind::CloseTag | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    /// Error for the current token given what was expected.
    pub(crate) fn error_expected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let kind = if token.is_eof() {
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                found: token_display(token),
                expected: expected.to_string(),
            }
        };
        ParseError::new(kind, token.span, token.pos)
    }

    /// Error at the current token with an explicit kind.
    pub(crate) fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        let token = self.peek();
        ParseError::new(kind, token.span, token.pos)
    }

    /// Error for syntax this parser does not model.
    pub(crate) fn unsupported(&self, construct: &str) -> ParseError {
        self.error_here(ParseErrorKind::Unsupported(construct.to_string()))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Create span from `start` to the end of the previous token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous_end().max(start))
    }

    /// Current token begins a `namespace` declaration.
    pub(crate) fn at_namespace(&self) -> bool {
        self.check_kw("namespace")
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Ident | TokenKind::Semicolon | TokenKind::LBrace
            )
    }
}

/// Token text as written, for error messages.
fn token_display(token: &Token) -> String {
    match token.kind {
        TokenKind::Variable => format!("${}", token.text),
        TokenKind::Cast => format!("({})", token.text),
        _ => token.text.clone(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests;
