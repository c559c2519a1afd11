//! # Statement Parsing
//!
//! Control structures accept both the brace form and the alternative
//! `if (...): ... endif;` form. Both produce the same tree, so the printer
//! writes braces. `else if` parses as an `else` whose body is a nested `if`.
//!
//! Comments between statements become [`Stmt::Comment`] entries of the
//! enclosing list.

use super::Parser;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use config::constants::{STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
use php_ast::{
    Catch, DeclareDirective, ElseIf, Expr, ForStmt, ForeachStmt, IfStmt, Name, StaticVar, Stmt,
    SwitchCase, TryStmt,
};
use stacker::maybe_grow;

impl Parser {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        if self.at_declaration() {
            let doc_comment = self.take_doc();
            let attributes = self.parse_attributes();
            let doc_comment = doc_comment.or_else(|| self.take_doc());
            return self.parse_declaration(doc_comment, attributes);
        }

        match self.peek_kind() {
            TokenKind::InlineHtml => return Ok(Stmt::InlineHtml(self.advance().text)),
            TokenKind::OpenTag | TokenKind::CloseTag | TokenKind::Semicolon => {
                self.advance();
                return Ok(Stmt::Nop);
            }
            TokenKind::OpenTagEcho => {
                self.advance();
                let exprs = self.parse_expr_list()?;
                self.expect_semicolon()?;
                return Ok(Stmt::Echo(exprs));
            }
            TokenKind::LBrace => return Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Ident => {}
            _ => return self.parse_expression_statement(),
        }

        if self.at_label() {
            let label = self.advance().text;
            self.advance();
            return Ok(Stmt::Label(label));
        }

        let keyword = self.peek().text.to_ascii_lowercase();
        match keyword.as_str() {
            "use" => self.parse_use(),
            "const" => self.parse_const_stmt(),
            "namespace" if self.at_namespace() => Err(self.error_expected("statement")),
            "declare" => self.parse_declare(),
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "for" => self.parse_for(),
            "foreach" => self.parse_foreach(),
            "switch" => self.parse_switch(),
            "break" | "continue" => self.parse_jump(&keyword),
            "return" => {
                self.advance();
                let value = if self.peek_kind().is_statement_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect_semicolon()?;
                Ok(Stmt::Return(value))
            }
            "echo" => {
                self.advance();
                let exprs = self.parse_expr_list()?;
                self.expect_semicolon()?;
                Ok(Stmt::Echo(exprs))
            }
            "throw" => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect_semicolon()?;
                Ok(Stmt::Throw(value))
            }
            "try" => self.parse_try(),
            "global" => {
                self.advance();
                let mut names = vec![self.expect_variable()?];
                while self.match_token(TokenKind::Comma) {
                    names.push(self.expect_variable()?);
                }
                self.expect_semicolon()?;
                Ok(Stmt::Global(names))
            }
            "static" if self.check_at(1, TokenKind::Variable) => self.parse_static_vars(),
            "unset" if self.check_at(1, TokenKind::LParen) => {
                self.advance();
                let exprs = self.parse_paren_list()?;
                self.expect_semicolon()?;
                Ok(Stmt::Unset(exprs))
            }
            "goto" if self.check_at(1, TokenKind::Ident) => {
                self.advance();
                let label = self.advance().text;
                self.expect_semicolon()?;
                Ok(Stmt::Goto(label))
            }
            "__halt_compiler" => Err(self.unsupported("__halt_compiler")),
            _ => self.parse_expression_statement(),
        }
    }

    /// Current token starts a declaration that owns the doc comment in
    /// front of it.
    pub(crate) fn at_declaration(&self) -> bool {
        self.check(TokenKind::Attribute)
            || self.at_class()
            || (["interface", "trait", "enum"].iter().any(|kw| self.check_kw(kw)) && self.check_at(1, TokenKind::Ident))
            || self.at_function_decl()
    }

    /// `name:` outside a `switch` case list.
    fn at_label(&self) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Ident
            && !token.text.contains('\\')
            && self.check_at(1, TokenKind::Colon)
            && !["default", "else", "case"].iter().any(|kw| token.is_keyword(kw))
    }

    /// Comments due before the current statement. A doc comment that no
    /// declaration claims becomes one of them.
    pub(crate) fn leading_comments(&mut self) -> Vec<String> {
        let mut comments = self.take_comments();
        if !self.at_declaration() {
            comments.extend(self.take_doc());
        }
        comments
    }

    fn parse_declaration(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        if self.at_class() {
            self.parse_class(doc_comment, attributes)
        } else if self.check_kw("interface") {
            self.parse_interface(doc_comment, attributes)
        } else if self.check_kw("trait") {
            self.parse_trait(doc_comment, attributes)
        } else if self.check_kw("enum") {
            self.parse_enum(doc_comment, attributes)
        } else if self.at_function_decl() {
            self.parse_function_decl(doc_comment, attributes)
        } else {
            Err(self.unsupported("attributes outside declarations"))
        }
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        self.expect_semicolon()?;
        Ok(Stmt::Expr(expr))
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    /// Parse `{ statements }` and return the statements.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_statements_until(&[])?;
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// Parse statements until `}` or one of the `stop` keywords.
    fn parse_statements_until(&mut self, stop: &[&str]) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_tags_and_empty();
            stmts.extend(self.leading_comments().into_iter().map(Stmt::Comment));
            if self.check(TokenKind::RBrace) || stop.iter().any(|kw| self.check_kw(kw)) {
                break;
            }
            if self.is_at_end() {
                return Err(self.error_expected("'}'"));
            }
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// Body of a control structure: a block, a single statement, or
    /// `: statements end_keyword;`.
    fn parse_body(&mut self, end_keyword: &str) -> Result<Vec<Stmt>, ParseError> {
        if self.check(TokenKind::LBrace) {
            return self.parse_block();
        }
        if self.match_token(TokenKind::Colon) {
            let body = self.parse_statements_until(&[end_keyword])?;
            self.expect_kw(end_keyword)?;
            self.expect_semicolon()?;
            return Ok(body);
        }
        let mut body: Vec<Stmt> = self.leading_comments().into_iter().map(Stmt::Comment).collect();
        body.push(self.parse_statement()?);
        Ok(body)
    }

    /// `( expr )` as used by if/while/switch.
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(cond)
    }

    /// `( [expr {, expr}] )`.
    fn parse_paren_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut exprs = Vec::new();
        while !self.check(TokenKind::RParen) {
            exprs.push(self.parse_expr()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(exprs)
    }

    /// Comma-separated expressions, possibly empty, up to `;` or `)`.
    fn parse_optional_expr_list(&mut self, end: TokenKind) -> Result<Vec<Expr>, ParseError> {
        if self.check(end) {
            return Ok(Vec::new());
        }
        self.parse_expr_list()
    }

    // =========================================================================
    // CONTROL FLOW
    // =========================================================================

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("if")?;
        let cond = self.parse_condition()?;
        if self.match_token(TokenKind::Colon) {
            return self.parse_alternative_if(cond);
        }
        let then = self.parse_body("endif")?;
        let mut elseifs = Vec::new();
        let mut otherwise = None;
        loop {
            if self.match_kw("elseif") {
                let cond = self.parse_condition()?;
                let body = self.parse_body("endif")?;
                elseifs.push(ElseIf { cond, body });
            } else if self.match_kw("else") {
                otherwise = Some(self.parse_body("endif")?);
                break;
            } else {
                break;
            }
        }
        Ok(Stmt::If(IfStmt {
            cond,
            then,
            elseifs,
            otherwise,
        }))
    }

    /// `if (c): ... elseif (c): ... else: ... endif;`
    fn parse_alternative_if(&mut self, cond: Expr) -> Result<Stmt, ParseError> {
        const STOPS: &[&str] = &["elseif", "else", "endif"];
        let then = self.parse_statements_until(STOPS)?;
        let mut elseifs = Vec::new();
        let mut otherwise = None;
        loop {
            if self.match_kw("elseif") {
                let cond = self.parse_condition()?;
                self.expect(TokenKind::Colon)?;
                let body = self.parse_statements_until(STOPS)?;
                elseifs.push(ElseIf { cond, body });
            } else if self.match_kw("else") {
                self.expect(TokenKind::Colon)?;
                otherwise = Some(self.parse_statements_until(&["endif"])?);
            } else {
                break;
            }
        }
        self.expect_kw("endif")?;
        self.expect_semicolon()?;
        Ok(Stmt::If(IfStmt {
            cond,
            then,
            elseifs,
            otherwise,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("while")?;
        let cond = self.parse_condition()?;
        let body = self.parse_body("endwhile")?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("do")?;
        if self.check(TokenKind::Colon) {
            return Err(self.error_expected("statement"));
        }
        let body = self.parse_body("while")?;
        self.expect_kw("while")?;
        let cond = self.parse_condition()?;
        self.expect_semicolon()?;
        Ok(Stmt::DoWhile { body, cond })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("for")?;
        self.expect(TokenKind::LParen)?;
        let init = self.parse_optional_expr_list(TokenKind::Semicolon)?;
        self.expect(TokenKind::Semicolon)?;
        let cond = self.parse_optional_expr_list(TokenKind::Semicolon)?;
        self.expect(TokenKind::Semicolon)?;
        let step = self.parse_optional_expr_list(TokenKind::RParen)?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_body("endfor")?;
        Ok(Stmt::For(ForStmt {
            init,
            cond,
            step,
            body,
        }))
    }

    fn parse_foreach(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("foreach")?;
        self.expect(TokenKind::LParen)?;
        let subject = self.parse_expr()?;
        self.expect_kw("as")?;

        let mut by_ref = self.match_token(TokenKind::Amp);
        let first = self.parse_expr()?;
        let (key, value) = if !by_ref && self.match_token(TokenKind::FatArrow) {
            by_ref = self.match_token(TokenKind::Amp);
            (Some(first), self.parse_expr()?)
        } else {
            (None, first)
        };

        self.expect(TokenKind::RParen)?;
        let body = self.parse_body("endforeach")?;
        Ok(Stmt::Foreach(ForeachStmt {
            subject,
            key,
            value,
            by_ref,
            body,
        }))
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("switch")?;
        let subject = self.parse_condition()?;
        let alternative = self.match_token(TokenKind::Colon);
        if !alternative {
            self.expect(TokenKind::LBrace)?;
        }
        let mut cases = Vec::new();
        loop {
            self.skip_tags_and_empty();
            if alternative && self.match_kw("endswitch") {
                self.expect_semicolon()?;
                break;
            }
            if !alternative && self.match_token(TokenKind::RBrace) {
                break;
            }
            let test = if self.match_kw("case") {
                Some(self.parse_expr()?)
            } else if self.match_kw("default") {
                None
            } else {
                return Err(self.error_expected("'case', 'default' or '}'"));
            };
            if !self.match_token(TokenKind::Colon) {
                self.expect(TokenKind::Semicolon)?;
            }
            let body = self.parse_statements_until(&["case", "default", "endswitch"])?;
            cases.push(SwitchCase { test, body });
        }
        Ok(Stmt::Switch { subject, cases })
    }

    fn parse_jump(&mut self, keyword: &str) -> Result<Stmt, ParseError> {
        self.advance();
        let level = if self.peek_kind().is_statement_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_semicolon()?;
        Ok(if keyword == "break" {
            Stmt::Break(level)
        } else {
            Stmt::Continue(level)
        })
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("try")?;
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.match_kw("catch") {
            self.expect(TokenKind::LParen)?;
            let mut types = vec![Name::new(self.expect_ident("exception class")?)];
            while self.match_token(TokenKind::Pipe) {
                types.push(Name::new(self.expect_ident("exception class")?));
            }
            let var = if self.check(TokenKind::Variable) {
                Some(self.advance().text)
            } else {
                None
            };
            self.expect(TokenKind::RParen)?;
            let body = self.parse_block()?;
            catches.push(Catch { types, var, body });
        }
        let finally = if self.match_kw("finally") {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            return Err(self.error_expected("'catch' or 'finally'"));
        }
        Ok(Stmt::Try(TryStmt {
            body,
            catches,
            finally,
        }))
    }

    // =========================================================================
    // SIMPLE STATEMENTS
    // =========================================================================

    fn parse_declare(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("declare")?;
        self.expect(TokenKind::LParen)?;
        let mut directives = Vec::new();
        loop {
            let name = self.expect_ident("directive name")?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            directives.push(DeclareDirective { name, value });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        if self.check(TokenKind::LBrace) || self.check(TokenKind::Colon) {
            let body = self.parse_body("enddeclare")?;
            return Ok(Stmt::DeclareBlock { directives, body });
        }
        self.expect_semicolon()?;
        Ok(Stmt::Declare(directives))
    }

    fn parse_static_vars(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("static")?;
        let mut vars = Vec::new();
        loop {
            let name = self.expect_variable()?;
            let default = if self.match_token(TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            vars.push(StaticVar { name, default });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::Static(vars))
    }
}
