//! # Expression Parsing
//!
//! Primary expressions and their postfix chains (`->`, `?->`, `::`, `[]`,
//! calls, `++`/`--`). Operator precedence lives in `operators`.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use php_ast::{
    Arg, ArrayItem, ArrowFn, ClassDecl, Closure, ClosureUse, Expr, IncDecOp, Literal, MatchArm, Member,
    Modifiers, Name,
};

/// Keywords that cannot start an expression.
const RESERVED: &[&str] = &[
    "abstract", "as", "case", "catch", "class", "const", "declare", "default", "do", "else",
    "elseif", "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "extends",
    "final", "finally", "for", "foreach", "global", "goto", "if", "implements", "insteadof",
    "interface", "namespace", "private", "protected", "public", "return", "switch", "trait",
    "try", "use", "var", "while",
];

impl Parser {
    /// Parse `expr {, expr}`.
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.match_token(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    // =========================================================================
    // PRIMARIES
    // =========================================================================

    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Variable => Ok(Expr::Variable(self.advance().text)),
            TokenKind::Int => Ok(Expr::Literal(Literal::Int(self.advance().text))),
            TokenKind::Float => Ok(Expr::Literal(Literal::Float(self.advance().text))),
            TokenKind::String => Ok(Expr::Literal(Literal::String(self.advance().text))),
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_array_items(TokenKind::RBracket)?;
                Ok(Expr::Array { items, short: true })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::Dollar => {
                self.advance();
                let inner = match self.peek_kind() {
                    TokenKind::LBrace => {
                        self.advance();
                        let inner = self.parse_expr()?;
                        self.expect(TokenKind::RBrace)?;
                        inner
                    }
                    TokenKind::Variable | TokenKind::Dollar => self.parse_primary()?,
                    _ => return Err(self.error_expected("variable or '{' after '$'")),
                };
                Ok(Expr::VariableVariable(Box::new(inner)))
            }
            TokenKind::Ident => self.parse_ident_primary(),
            _ => Err(self.error_expected("expression")),
        }
    }

    fn parse_ident_primary(&mut self) -> Result<Expr, ParseError> {
        let text = self.peek().text.clone();
        let lower = text.to_ascii_lowercase();
        let next = self.peek_at(1).kind;

        match lower.as_str() {
            "true" | "false" | "null" if next != TokenKind::DoubleColon && next != TokenKind::LParen => {
                self.advance();
                return Ok(Expr::Literal(match lower.as_str() {
                    "true" => Literal::Bool(true),
                    "false" => Literal::Bool(false),
                    _ => Literal::Null,
                }));
            }
            "array" if next == TokenKind::LParen => {
                self.advance();
                self.advance();
                let items = self.parse_array_items(TokenKind::RParen)?;
                return Ok(Expr::Array { items, short: false });
            }
            "isset" if next == TokenKind::LParen => {
                self.advance();
                let args = self.parse_args()?;
                return Ok(Expr::Isset(args.into_iter().map(|a| a.value).collect()));
            }
            "empty" if next == TokenKind::LParen => {
                self.advance();
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(Expr::Empty(Box::new(inner)));
            }
            "exit" | "die" => {
                self.advance();
                let args = if self.check(TokenKind::LParen) {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                return Ok(Expr::Call {
                    callee: Box::new(Expr::Name(Name::new(text))),
                    args,
                });
            }
            "function" => return self.parse_closure(false),
            "fn" if next == TokenKind::LParen || next == TokenKind::Amp => return self.parse_arrow_fn(false),
            "static" if self.check_kw_at(1, "function") => {
                self.advance();
                return self.parse_closure(true);
            }
            "static" if self.check_kw_at(1, "fn") => {
                self.advance();
                return self.parse_arrow_fn(true);
            }
            "match" if next == TokenKind::LParen => return self.parse_match(),
            _ => {}
        }

        if RESERVED.contains(&lower.as_str()) && next != TokenKind::DoubleColon {
            return Err(self.error_expected("expression"));
        }

        self.advance();
        let name = Name::new(text);
        if matches!(next, TokenKind::LParen | TokenKind::DoubleColon) {
            Ok(Expr::Name(name))
        } else {
            Ok(Expr::ConstFetch(name))
        }
    }

    /// Parse `new Class(args)` or `new class(args) { ... }`.
    pub(super) fn parse_new(&mut self) -> Result<Expr, ParseError> {
        self.expect_kw("new")?;
        if self.check_kw("class") || (self.check_kw("readonly") && self.check_kw_at(1, "class")) {
            return self.parse_anonymous_class();
        }

        let class = match self.peek_kind() {
            TokenKind::Ident => Expr::Name(Name::new(self.advance().text)),
            TokenKind::Variable => {
                let mut class = Expr::Variable(self.advance().text);
                loop {
                    if matches!(self.peek_kind(), TokenKind::Arrow | TokenKind::QuestionArrow)
                        && self.check_at(1, TokenKind::Ident)
                    {
                        let nullsafe = self.advance().kind == TokenKind::QuestionArrow;
                        let name = Member::Ident(self.advance().text);
                        class = Expr::PropertyFetch {
                            object: Box::new(class),
                            name,
                            nullsafe,
                        };
                    } else if self.check(TokenKind::DoubleColon) && self.check_at(1, TokenKind::Variable) {
                        self.advance();
                        let name = self.advance().text;
                        class = Expr::StaticPropertyFetch {
                            class: Box::new(class),
                            name,
                        };
                    } else if self.check(TokenKind::LBracket) {
                        self.advance();
                        let index = self.parse_expr()?;
                        self.expect(TokenKind::RBracket)?;
                        class = Expr::Index {
                            value: Box::new(class),
                            index: Some(Box::new(index)),
                        };
                    } else {
                        break;
                    }
                }
                class
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Expr::Paren(Box::new(inner))
            }
            _ => return Err(self.error_expected("class name")),
        };

        let args = if self.check(TokenKind::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::New {
            class: Box::new(class),
            args,
        })
    }

    fn parse_anonymous_class(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek().span.start();
        let mut modifiers = Modifiers::empty();
        if self.match_kw("readonly") {
            modifiers.insert(Modifiers::READONLY);
        }
        self.expect_kw("class")?;
        let args = if self.check(TokenKind::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        let extends = if self.match_kw("extends") {
            Some(Name::new(self.expect_ident("parent class name")?))
        } else {
            None
        };
        let implements = if self.match_kw("implements") {
            self.parse_name_list("interface name")?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;
        Ok(Expr::AnonymousClass {
            args,
            class: Box::new(ClassDecl {
                modifiers,
                extends,
                implements,
                members,
                span: self.span_from(start),
                ..Default::default()
            }),
        })
    }

    // =========================================================================
    // POSTFIX
    // =========================================================================

    pub(super) fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let index = if self.check(TokenKind::RBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr()?))
                    };
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index {
                        value: Box::new(expr),
                        index,
                    };
                }
                TokenKind::Arrow | TokenKind::QuestionArrow => {
                    let nullsafe = self.advance().kind == TokenKind::QuestionArrow;
                    let name = self.parse_member_name()?;
                    expr = if self.check(TokenKind::LParen) {
                        let args = self.parse_args()?;
                        Expr::MethodCall {
                            object: Box::new(expr),
                            name,
                            args,
                            nullsafe,
                        }
                    } else {
                        Expr::PropertyFetch {
                            object: Box::new(expr),
                            name,
                            nullsafe,
                        }
                    };
                }
                TokenKind::DoubleColon => {
                    self.advance();
                    expr = self.parse_static_member(expr)?;
                }
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.advance().kind == TokenKind::PlusPlus {
                        IncDecOp::PostInc
                    } else {
                        IncDecOp::PostDec
                    };
                    expr = Expr::IncDec {
                        op,
                        expr: Box::new(expr),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Member name after `->`: identifier (keywords allowed), variable, or `{expr}`.
    fn parse_member_name(&mut self) -> Result<Member, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident => Ok(Member::Ident(self.advance().text)),
            TokenKind::Variable => Ok(Member::Expr(Box::new(Expr::Variable(self.advance().text)))),
            TokenKind::LBrace => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Member::Expr(Box::new(inner)))
            }
            _ => Err(self.error_expected("member name")),
        }
    }

    /// Everything after `Class::`.
    fn parse_static_member(&mut self, class: Expr) -> Result<Expr, ParseError> {
        let class = Box::new(class);
        match self.peek_kind() {
            TokenKind::Variable => {
                let name = self.advance().text;
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::StaticCall {
                        class,
                        name: Member::Expr(Box::new(Expr::Variable(name))),
                        args,
                    })
                } else {
                    Ok(Expr::StaticPropertyFetch { class, name })
                }
            }
            TokenKind::Ident => {
                let name = self.advance().text;
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::StaticCall {
                        class,
                        name: Member::Ident(name),
                        args,
                    })
                } else {
                    Ok(Expr::ClassConstFetch { class, name })
                }
            }
            TokenKind::LBrace => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RBrace)?;
                let args = self.parse_args()?;
                Ok(Expr::StaticCall {
                    class,
                    name: Member::Expr(Box::new(inner)),
                    args,
                })
            }
            _ => Err(self.error_expected("member name after '::'")),
        }
    }

    /// Parse `( [arg {, arg}] [,] )` with named and spread arguments.
    pub(super) fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            if self.check(TokenKind::Ellipsis) && self.check_at(1, TokenKind::RParen) {
                self.advance();
                args.push(Arg::positional(Expr::VariadicPlaceholder));
                break;
            }
            let spread = self.match_token(TokenKind::Ellipsis);
            let name = if !spread && self.check(TokenKind::Ident) && self.check_at(1, TokenKind::Colon) {
                let name = self.advance().text;
                self.advance();
                Some(name)
            } else {
                None
            };
            let value = self.parse_expr()?;
            args.push(Arg { name, value, spread });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// Array items up to the closing delimiter, which is consumed.
    fn parse_array_items(&mut self, close: TokenKind) -> Result<Vec<ArrayItem>, ParseError> {
        let mut items = Vec::new();
        while !self.check(close) {
            if self.check(TokenKind::Comma) {
                return Err(self.unsupported("skipped array elements"));
            }
            let item = if self.match_token(TokenKind::Ellipsis) {
                ArrayItem {
                    key: None,
                    value: self.parse_expr()?,
                    by_ref: false,
                    spread: true,
                }
            } else if self.match_token(TokenKind::Amp) {
                ArrayItem {
                    key: None,
                    value: self.parse_expr()?,
                    by_ref: true,
                    spread: false,
                }
            } else {
                let first = self.parse_expr()?;
                if self.match_token(TokenKind::FatArrow) {
                    let by_ref = self.match_token(TokenKind::Amp);
                    ArrayItem {
                        key: Some(first),
                        value: self.parse_expr()?,
                        by_ref,
                        spread: false,
                    }
                } else {
                    ArrayItem::value(first)
                }
            };
            items.push(item);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    // =========================================================================
    // FUNCTIONS AS VALUES
    // =========================================================================

    fn parse_closure(&mut self, is_static: bool) -> Result<Expr, ParseError> {
        self.expect_kw("function")?;
        let by_ref = self.match_token(TokenKind::Amp);
        let params = self.parse_params()?;
        let mut uses = Vec::new();
        if self.match_kw("use") {
            self.expect(TokenKind::LParen)?;
            while !self.check(TokenKind::RParen) {
                let by_ref = self.match_token(TokenKind::Amp);
                let name = self.expect_variable()?;
                uses.push(ClosureUse { name, by_ref });
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
        }
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Ok(Expr::Closure(Box::new(Closure {
            is_static,
            by_ref,
            params,
            uses,
            return_type,
            body,
        })))
    }

    fn parse_arrow_fn(&mut self, is_static: bool) -> Result<Expr, ParseError> {
        self.expect_kw("fn")?;
        let by_ref = self.match_token(TokenKind::Amp);
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        self.expect(TokenKind::FatArrow)?;
        let body = self.parse_assignment_expr()?;
        Ok(Expr::ArrowFn(Box::new(ArrowFn {
            is_static,
            by_ref,
            params,
            return_type,
            body,
        })))
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        self.expect_kw("match")?;
        self.expect(TokenKind::LParen)?;
        let subject = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let conditions = if self.check_kw("default") && !self.check_at(1, TokenKind::DoubleColon) {
                self.advance();
                self.match_token(TokenKind::Comma);
                None
            } else {
                let mut conds = Vec::new();
                while !self.check(TokenKind::FatArrow) {
                    conds.push(self.parse_expr()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
                Some(conds)
            };
            self.expect(TokenKind::FatArrow)?;
            let body = self.parse_expr()?;
            arms.push(MatchArm { conditions, body });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Expr::Match {
            subject: Box::new(subject),
            arms,
        })
    }
}
