//! # Operator Parsing
//!
//! Parses binary, unary, ternary and assignment operators using precedence
//! climbing.
//!
//! ## Operator Precedence (PHP 8)
//!
//! | Precedence | Operators | Associativity |
//! |------------|-----------|---------------|
//! | 1 | `or` | Left |
//! | 2 | `xor` | Left |
//! | 3 | `and` | Left |
//! | 4 | `= += -= ...` | Right |
//! | 5 | `? :` | Left |
//! | 6 | `??` | Right |
//! | 7 | `\|\|` | Left |
//! | 8 | `&&` | Left |
//! | 9 | `\|` | Left |
//! | 10 | `^` | Left |
//! | 11 | `&` | Left |
//! | 12 | `== != === !== <>  <=>` | Left |
//! | 13 | `< <= > >=` | Left |
//! | 14 | `.` | Left |
//! | 15 | `<< >>` | Left |
//! | 16 | `+ -` | Left |
//! | 17 | `* / %` | Left |
//! | 18 | `!` | Right |
//! | 19 | `instanceof` | Left |
//! | 20 | `- + ~ ++ -- (cast) @` (unary) | Right |
//! | 21 | `**` | Right |
//!
//! Assignment binds to any assignable left operand regardless of the
//! surrounding level, so `!$x = f()` parses as `!($x = f())`.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use config::constants::{STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
use php_ast::{AssignOp, BinaryOp, CastKind, Expr, IncDecOp, IncludeKind, UnaryOp};
use stacker::maybe_grow;

// =============================================================================
// PRECEDENCE
// =============================================================================

/// Operator precedence levels.
///
/// Higher values bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    /// `or`
    LogicalOr = 1,
    /// `xor`
    LogicalXor,
    /// `and`
    LogicalAnd,
    /// Assignment operators
    Assignment,
    /// `? :`
    Ternary,
    /// `??`
    Coalesce,
    /// `||`
    BooleanOr,
    /// `&&`
    BooleanAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `== != === !== <=>`
    Equality,
    /// `< <= > >=`
    Comparison,
    /// `.`
    Concat,
    /// `<< >>`
    Shift,
    /// `+ -`
    Additive,
    /// `* / %`
    Multiplicative,
    /// `!`
    Not,
    /// `instanceof`
    Instanceof,
    /// Prefix operators and casts
    Unary,
    /// `**`
    Pow,
}

impl Precedence {
    /// Get next higher precedence level.
    ///
    /// Used for left-associative operators.
    pub(super) fn next(&self) -> Self {
        match self {
            Self::LogicalOr => Self::LogicalXor,
            Self::LogicalXor => Self::LogicalAnd,
            Self::LogicalAnd => Self::Assignment,
            Self::Assignment => Self::Ternary,
            Self::Ternary => Self::Coalesce,
            Self::Coalesce => Self::BooleanOr,
            Self::BooleanOr => Self::BooleanAnd,
            Self::BooleanAnd => Self::BitwiseOr,
            Self::BitwiseOr => Self::BitwiseXor,
            Self::BitwiseXor => Self::BitwiseAnd,
            Self::BitwiseAnd => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Concat,
            Self::Concat => Self::Shift,
            Self::Shift => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Not,
            Self::Not => Self::Instanceof,
            Self::Instanceof => Self::Unary,
            Self::Unary => Self::Pow,
            Self::Pow => Self::Pow,
        }
    }
}

/// Binary operator for a token: precedence, operator, right associativity.
fn binary_info(kind: TokenKind, text: &str) -> Option<(Precedence, BinaryOp, bool)> {
    use BinaryOp as B;
    use Precedence as P;
    let info = match kind {
        TokenKind::PipePipe => (P::BooleanOr, B::BooleanOr, false),
        TokenKind::AmpAmp => (P::BooleanAnd, B::BooleanAnd, false),
        TokenKind::Pipe => (P::BitwiseOr, B::BitwiseOr, false),
        TokenKind::Caret => (P::BitwiseXor, B::BitwiseXor, false),
        TokenKind::Amp => (P::BitwiseAnd, B::BitwiseAnd, false),
        TokenKind::EqEq => (P::Equality, B::Equal, false),
        TokenKind::BangEq => (P::Equality, B::NotEqual, false),
        TokenKind::EqEqEq => (P::Equality, B::Identical, false),
        TokenKind::BangEqEq => (P::Equality, B::NotIdentical, false),
        TokenKind::Spaceship => (P::Equality, B::Spaceship, false),
        TokenKind::Lt => (P::Comparison, B::Less, false),
        TokenKind::LtEq => (P::Comparison, B::LessOrEqual, false),
        TokenKind::Gt => (P::Comparison, B::Greater, false),
        TokenKind::GtEq => (P::Comparison, B::GreaterOrEqual, false),
        TokenKind::Dot => (P::Concat, B::Concat, false),
        TokenKind::Shl => (P::Shift, B::ShiftLeft, false),
        TokenKind::Shr => (P::Shift, B::ShiftRight, false),
        TokenKind::Plus => (P::Additive, B::Add, false),
        TokenKind::Minus => (P::Additive, B::Sub, false),
        TokenKind::Star => (P::Multiplicative, B::Mul, false),
        TokenKind::Slash => (P::Multiplicative, B::Div, false),
        TokenKind::Percent => (P::Multiplicative, B::Mod, false),
        TokenKind::Pow => (P::Pow, B::Pow, true),
        TokenKind::QuestionQuestion => (P::Coalesce, B::Coalesce, true),
        TokenKind::Ident if text.eq_ignore_ascii_case("or") => (P::LogicalOr, B::LogicalOr, false),
        TokenKind::Ident if text.eq_ignore_ascii_case("xor") => (P::LogicalXor, B::LogicalXor, false),
        TokenKind::Ident if text.eq_ignore_ascii_case("and") => (P::LogicalAnd, B::LogicalAnd, false),
        _ => return None,
    };
    Some(info)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::PowEq => AssignOp::Pow,
        TokenKind::DotEq => AssignOp::Concat,
        TokenKind::AmpEq => AssignOp::BitwiseAnd,
        TokenKind::PipeEq => AssignOp::BitwiseOr,
        TokenKind::CaretEq => AssignOp::BitwiseXor,
        TokenKind::ShlEq => AssignOp::ShiftLeft,
        TokenKind::ShrEq => AssignOp::ShiftRight,
        TokenKind::QuestionQuestionEq => AssignOp::Coalesce,
        _ => return None,
    };
    Some(op)
}

fn cast_kind(text: &str) -> CastKind {
    match text {
        "int" => CastKind::Int,
        "float" => CastKind::Float,
        "bool" => CastKind::Bool,
        "array" => CastKind::Array,
        "object" => CastKind::Object,
        _ => CastKind::String,
    }
}

/// Expressions that may appear on the left of an assignment.
fn is_assignable(expr: &Expr) -> bool {
    match expr {
        Expr::Variable(_)
        | Expr::VariableVariable(_)
        | Expr::PropertyFetch { .. }
        | Expr::StaticPropertyFetch { .. }
        | Expr::Index { .. }
        | Expr::Array { .. } => true,
        Expr::Call { callee, .. } => matches!(callee.as_ref(), Expr::Name(n) if n.as_str().eq_ignore_ascii_case("list")),
        _ => false,
    }
}

// =============================================================================
// OPERATOR PARSING
// =============================================================================

impl Parser {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_precedence(Precedence::LogicalOr)
    }

    /// Parse an expression that stops before `and`/`or`/`xor`.
    pub(super) fn parse_assignment_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_precedence(Precedence::Assignment)
    }

    /// Parse expression with minimum precedence.
    pub(super) fn parse_precedence(&mut self, min_prec: Precedence) -> Result<Expr, ParseError> {
        maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || self.parse_precedence_inner(min_prec))
    }

    fn parse_precedence_inner(&mut self, min_prec: Precedence) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        if is_assignable(&left) {
            if let Some(op) = assign_op(self.peek_kind()) {
                self.advance();
                if op == AssignOp::Assign && self.match_token(TokenKind::Amp) {
                    let value = self.parse_assignment_expr()?;
                    left = Expr::AssignRef {
                        target: Box::new(left),
                        value: Box::new(value),
                    };
                } else {
                    let value = self.parse_assignment_expr()?;
                    left = Expr::Assign {
                        target: Box::new(left),
                        op,
                        value: Box::new(value),
                    };
                }
            }
        }

        loop {
            if self.check(TokenKind::Question) {
                if Precedence::Ternary < min_prec {
                    break;
                }
                left = self.parse_ternary(left)?;
                continue;
            }

            if self.check_kw("instanceof") {
                if Precedence::Instanceof < min_prec {
                    break;
                }
                self.advance();
                let class = match self.parse_unary()? {
                    Expr::ConstFetch(name) => Expr::Name(name),
                    other => other,
                };
                left = Expr::Instanceof {
                    expr: Box::new(left),
                    class: Box::new(class),
                };
                continue;
            }

            let token = self.peek();
            let Some((prec, op, right_assoc)) = binary_info(token.kind, &token.text) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            let next_min = if right_assoc { prec } else { prec.next() };
            let right = self.parse_precedence(next_min)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse `cond ? then : otherwise` or `cond ?: otherwise`.
    fn parse_ternary(&mut self, cond: Expr) -> Result<Expr, ParseError> {
        self.expect(TokenKind::Question)?;
        let then = if self.check(TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_assignment_expr()?))
        };
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_precedence(Precedence::Coalesce)?;
        Ok(Expr::Ternary {
            cond: Box::new(cond),
            then,
            otherwise: Box::new(otherwise),
        })
    }

    /// Parse prefix operators, then a primary with its postfix chain.
    pub(super) fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Not)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(operand),
                })
            }
            TokenKind::Minus | TokenKind::Plus | TokenKind::Tilde => {
                let op = match self.advance().kind {
                    TokenKind::Minus => UnaryOp::Neg,
                    TokenKind::Plus => UnaryOp::Pos,
                    _ => UnaryOp::BitwiseNot,
                };
                let operand = self.parse_precedence(Precedence::Unary)?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(operand),
                })
            }
            TokenKind::At => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Unary)?;
                Ok(Expr::ErrorSuppress(Box::new(operand)))
            }
            TokenKind::Cast => {
                let kind = cast_kind(&self.advance().text);
                let operand = self.parse_precedence(Precedence::Unary)?;
                Ok(Expr::Cast {
                    kind,
                    expr: Box::new(operand),
                })
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    IncDecOp::PreInc
                } else {
                    IncDecOp::PreDec
                };
                let operand = self.parse_unary()?;
                Ok(Expr::IncDec {
                    op,
                    expr: Box::new(operand),
                })
            }
            TokenKind::Ident if self.check_kw("new") => self.parse_new(),
            TokenKind::Ident if self.check_kw("clone") => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Clone(Box::new(operand)))
            }
            TokenKind::Ident if self.check_kw("print") => {
                self.advance();
                let operand = self.parse_assignment_expr()?;
                Ok(Expr::Print(Box::new(operand)))
            }
            TokenKind::Ident if self.check_kw("throw") => {
                self.advance();
                let operand = self.parse_assignment_expr()?;
                Ok(Expr::Throw(Box::new(operand)))
            }
            TokenKind::Ident if self.check_kw("yield") => self.parse_yield(),
            _ => {
                if let Some(kind) = self.include_kind() {
                    self.advance();
                    let operand = self.parse_assignment_expr()?;
                    return Ok(Expr::Include {
                        kind,
                        expr: Box::new(operand),
                    });
                }
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// `yield`, `yield value`, `yield key => value` or `yield from expr`.
    fn parse_yield(&mut self) -> Result<Expr, ParseError> {
        self.expect_kw("yield")?;
        if self.match_kw("from") {
            let operand = self.parse_assignment_expr()?;
            return Ok(Expr::YieldFrom(Box::new(operand)));
        }
        if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RParen | TokenKind::RBracket | TokenKind::Comma | TokenKind::CloseTag | TokenKind::Eof
        ) {
            return Ok(Expr::Yield { key: None, value: None });
        }
        let first = self.parse_assignment_expr()?;
        if self.match_token(TokenKind::FatArrow) {
            let value = self.parse_assignment_expr()?;
            return Ok(Expr::Yield {
                key: Some(Box::new(first)),
                value: Some(Box::new(value)),
            });
        }
        Ok(Expr::Yield {
            key: None,
            value: Some(Box::new(first)),
        })
    }

    fn include_kind(&self) -> Option<IncludeKind> {
        let token = self.peek();
        if token.kind != TokenKind::Ident {
            return None;
        }
        match token.text.to_ascii_lowercase().as_str() {
            "include" => Some(IncludeKind::Include),
            "include_once" => Some(IncludeKind::IncludeOnce),
            "require" => Some(IncludeKind::Require),
            "require_once" => Some(IncludeKind::RequireOnce),
            _ => None,
        }
    }
}
