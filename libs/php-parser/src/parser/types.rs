//! # Type Parsing
//!
//! ```text
//! type         = "?" atom | atom {"|" atom} | atom {"&" atom}
//! atom         = name | "(" atom "&" atom {"&" atom} ")"
//! ```
//!
//! In parameter position `Foo &$x` is a by-reference parameter, not an
//! intersection, so `&` only continues a type when a name or `(` follows.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use php_ast::{Name, Type};

impl Parser {
    /// Parse a type declaration.
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        if self.match_token(TokenKind::Question) {
            let inner = self.parse_type_atom()?;
            return Ok(Type::Nullable(Box::new(inner)));
        }

        let first = self.parse_type_atom()?;

        if self.check(TokenKind::Pipe) {
            let mut parts = vec![first];
            while self.match_token(TokenKind::Pipe) {
                parts.push(self.parse_type_atom()?);
            }
            return Ok(Type::Union(parts));
        }

        if self.intersection_continues() {
            let mut parts = vec![first];
            while self.intersection_continues() {
                self.advance();
                parts.push(self.parse_type_atom()?);
            }
            return Ok(Type::Intersection(parts));
        }

        Ok(first)
    }

    fn parse_type_atom(&mut self) -> Result<Type, ParseError> {
        if self.match_token(TokenKind::LParen) {
            let mut parts = vec![self.parse_type_atom()?];
            while self.match_token(TokenKind::Amp) {
                parts.push(self.parse_type_atom()?);
            }
            self.expect(TokenKind::RParen)?;
            return Ok(Type::Intersection(parts));
        }
        let name = self.expect_ident("type")?;
        Ok(Type::Named(Name::new(name)))
    }

    fn intersection_continues(&self) -> bool {
        self.check(TokenKind::Amp) && matches!(self.peek_at(1).kind, TokenKind::Ident | TokenKind::LParen)
    }
}
