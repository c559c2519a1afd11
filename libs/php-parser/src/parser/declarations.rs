//! # Declaration Parsing
//!
//! Parses namespaces, imports, constants, class-likes with their members,
//! and named functions.
//!
//! ## Grammar (subset)
//!
//! ```text
//! namespace   = "namespace" [name] (";" | "{" statements "}")
//! use         = "use" ["function" | "const"] use_item {"," use_item} ";"
//! class       = {attribute} {"abstract" | "final" | "readonly"} "class" IDENT
//!               ["extends" name] ["implements" name {"," name}] "{" {member} "}"
//! enum        = {attribute} "enum" IDENT [":" type] ["implements" name {"," name}]
//!               "{" {member} "}"
//! member      = {attribute} ( "use" names (";" | "{" {adaptation} "}")
//!                           | "case" IDENT ["=" expr] ";"
//!                           | modifiers "const" const_item {"," const_item} ";"
//!                           | modifiers "function" ["&"] IDENT params [":" type] (";" | block)
//!                           | modifiers [type] VAR ["=" expr] {"," VAR ["=" expr]} ";" )
//! adaptation  = [name "::"] IDENT ( "insteadof" names | "as" [visibility] [IDENT] ) ";"
//! ```
//!
//! Comments inside a body become [`ClassMember::Comment`] entries.

use super::Parser;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::TokenKind;
use php_ast::{
    ClassConst, ClassDecl, ClassMember, ConstItem, EnumCase, EnumDecl, FunctionDecl, InterfaceDecl,
    MethodDecl, Modifiers, Name, Namespace, Param, PropertyDecl, PropertyItem, Stmt, TraitAdaptation,
    TraitDecl, TraitUse, UseDecl, UseItem, UseKind, Visibility,
};

impl Parser {
    // =========================================================================
    // NAMESPACES AND IMPORTS
    // =========================================================================

    /// Parse `namespace X;` (collecting the following statements) or
    /// `namespace X { ... }`.
    pub(super) fn parse_namespace(&mut self) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        self.expect_kw("namespace")?;

        let name = if self.check(TokenKind::Ident) {
            Some(Name::new(self.advance().text))
        } else {
            None
        };

        if self.match_token(TokenKind::LBrace) {
            let stmts = self.parse_top_level(true)?;
            self.expect(TokenKind::RBrace)?;
            return Ok(Stmt::Namespace(Namespace {
                name,
                stmts,
                braced: true,
                span: self.span_from(start),
            }));
        }

        if name.is_none() {
            return Err(self.error_expected("namespace name or '{'"));
        }
        self.expect_semicolon()?;
        let stmts = self.parse_top_level(true)?;
        Ok(Stmt::Namespace(Namespace {
            name,
            stmts,
            braced: false,
            span: self.span_from(start),
        }))
    }

    /// Parse a top-level `use` import, group form included.
    pub(super) fn parse_use(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("use")?;
        let kind = if self.match_kw("function") {
            UseKind::Function
        } else if self.match_kw("const") {
            UseKind::Const
        } else {
            UseKind::Normal
        };

        let mut items = Vec::new();
        loop {
            let prefix = self.expect_ident("imported name")?;
            if self.check(TokenKind::Backslash) && self.check_at(1, TokenKind::LBrace) {
                self.advance();
                self.advance();
                loop {
                    if self.check(TokenKind::RBrace) {
                        break;
                    }
                    let suffix = self.expect_ident("imported name")?;
                    let alias = self.parse_use_alias()?;
                    items.push(UseItem {
                        name: Name::new(format!("{prefix}\\{suffix}")),
                        alias,
                    });
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace)?;
            } else {
                let alias = self.parse_use_alias()?;
                items.push(UseItem {
                    name: Name::new(prefix),
                    alias,
                });
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::Use(UseDecl { kind, items }))
    }

    fn parse_use_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.match_kw("as") {
            Ok(Some(self.expect_ident("alias")?))
        } else {
            Ok(None)
        }
    }

    /// Parse `const A = 1, B = 2;` at file level.
    pub(super) fn parse_const_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect_kw("const")?;
        let items = self.parse_const_items()?;
        self.expect_semicolon()?;
        Ok(Stmt::Const(items))
    }

    fn parse_const_items(&mut self) -> Result<Vec<ConstItem>, ParseError> {
        let mut items = Vec::new();
        loop {
            let name = self.expect_ident("constant name")?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            items.push(ConstItem { name, value });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    // =========================================================================
    // CLASS-LIKES
    // =========================================================================

    /// Collect `#[...]` attributes as raw text.
    pub(super) fn parse_attributes(&mut self) -> Vec<String> {
        let mut attributes = Vec::new();
        while self.check(TokenKind::Attribute) {
            attributes.push(self.advance().text);
        }
        attributes
    }

    /// Current position starts a class declaration, modifiers included.
    pub(super) fn at_class(&self) -> bool {
        let mut n = 0;
        while ["abstract", "final", "readonly"].iter().any(|kw| self.check_kw_at(n, kw)) {
            n += 1;
        }
        self.check_kw_at(n, "class") && self.check_at(n + 1, TokenKind::Ident)
    }

    /// Parse a class declaration. The doc comment is taken from the first token.
    pub(super) fn parse_class(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        let mut modifiers = Modifiers::empty();
        loop {
            let flag = if self.check_kw("abstract") {
                Modifiers::ABSTRACT
            } else if self.check_kw("final") {
                Modifiers::FINAL
            } else if self.check_kw("readonly") {
                Modifiers::READONLY
            } else {
                break;
            };
            if modifiers.contains(flag) {
                return Err(self.invalid_modifier("repeated class modifier"));
            }
            modifiers.insert(flag);
            self.advance();
        }
        if modifiers.is_abstract() && modifiers.is_final() {
            return Err(self.invalid_modifier("a class cannot be both abstract and final"));
        }

        self.expect_kw("class")?;
        let name = self.expect_ident("class name")?;
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

        Ok(Stmt::Class(ClassDecl {
            name,
            modifiers,
            extends,
            implements,
            members,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    /// Parse an interface declaration.
    pub(super) fn parse_interface(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        self.expect_kw("interface")?;
        let name = self.expect_ident("interface name")?;
        let extends = if self.match_kw("extends") {
            self.parse_name_list("interface name")?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;
        Ok(Stmt::Interface(InterfaceDecl {
            name,
            extends,
            members,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    /// Parse a trait declaration.
    pub(super) fn parse_trait(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        self.expect_kw("trait")?;
        let name = self.expect_ident("trait name")?;
        let members = self.parse_members()?;
        Ok(Stmt::Trait(TraitDecl {
            name,
            members,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    /// Parse a pure or backed enum.
    pub(super) fn parse_enum(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        self.expect_kw("enum")?;
        let name = self.expect_ident("enum name")?;
        let backing = if self.match_token(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let implements = if self.match_kw("implements") {
            self.parse_name_list("interface name")?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;
        Ok(Stmt::Enum(EnumDecl {
            name,
            backing,
            implements,
            members,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    pub(super) fn parse_name_list(&mut self, what: &str) -> Result<Vec<Name>, ParseError> {
        let mut names = vec![Name::new(self.expect_ident(what)?)];
        while self.match_token(TokenKind::Comma) {
            names.push(Name::new(self.expect_ident(what)?));
        }
        Ok(names)
    }

    // =========================================================================
    // MEMBERS
    // =========================================================================

    /// Parse `{ members }` of a class-like.
    pub(super) fn parse_members(&mut self) -> Result<Vec<ClassMember>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        loop {
            let mut comments = self.take_comments();
            if self.check_kw("use") || self.check(TokenKind::RBrace) || self.is_at_end() {
                comments.extend(self.take_doc());
            }
            members.extend(comments.into_iter().map(ClassMember::Comment));
            if self.check(TokenKind::RBrace) {
                break;
            }
            if self.is_at_end() {
                return Err(self.error_expected("'}'"));
            }
            members.push(self.parse_member()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<ClassMember, ParseError> {
        if self.check_kw("use") {
            return self.parse_trait_use();
        }

        let start = self.peek().span.start();
        let doc_comment = self.take_doc();
        let attributes = self.parse_attributes();
        let doc_comment = doc_comment.or_else(|| self.take_doc());

        if self.match_kw("case") {
            let name = self.expect_ident("case name")?;
            let value = if self.match_token(TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect_semicolon()?;
            return Ok(ClassMember::Case(EnumCase {
                name,
                value,
                doc_comment,
                attributes,
            }));
        }

        let modifiers = self.parse_member_modifiers()?;

        if self.match_kw("const") {
            let items = self.parse_const_items()?;
            self.expect_semicolon()?;
            return Ok(ClassMember::Const(ClassConst {
                modifiers,
                items,
                doc_comment,
                attributes,
            }));
        }

        if self.match_kw("function") {
            let by_ref = self.match_token(TokenKind::Amp);
            let name = self.expect_ident("method name")?;
            let params = self.parse_params()?;
            let return_type = self.parse_return_type()?;
            let body = if self.check(TokenKind::LBrace) {
                Some(self.parse_block()?)
            } else {
                self.expect_semicolon()?;
                None
            };
            return Ok(ClassMember::Method(MethodDecl {
                name,
                modifiers,
                by_ref,
                params,
                return_type,
                body,
                doc_comment,
                attributes,
                span: self.span_from(start),
            }));
        }

        let ty = if self.check(TokenKind::Variable) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let mut props = Vec::new();
        loop {
            let name = self.expect_variable()?;
            let default = if self.match_token(TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            props.push(PropertyItem { name, default });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        if self.check(TokenKind::LBrace) {
            return Err(self.unsupported("property hooks"));
        }
        self.expect_semicolon()?;
        Ok(ClassMember::Property(PropertyDecl {
            modifiers,
            ty,
            props,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    /// Parse `use A, B;` or `use A, B { ... }` inside a class-like.
    fn parse_trait_use(&mut self) -> Result<ClassMember, ParseError> {
        self.expect_kw("use")?;
        let traits = self.parse_name_list("trait name")?;
        let mut adaptations = Vec::new();
        if self.match_token(TokenKind::LBrace) {
            while !self.match_token(TokenKind::RBrace) {
                if self.is_at_end() {
                    return Err(self.error_expected("'}'"));
                }
                adaptations.push(self.parse_trait_adaptation()?);
            }
        } else {
            self.expect_semicolon()?;
        }
        Ok(ClassMember::TraitUse(TraitUse { traits, adaptations }))
    }

    fn parse_trait_adaptation(&mut self) -> Result<TraitAdaptation, ParseError> {
        let first = self.expect_ident("method name")?;
        let (trait_name, method) = if self.match_token(TokenKind::DoubleColon) {
            (Some(Name::new(first)), self.expect_ident("method name")?)
        } else {
            (None, first)
        };

        if let Some(trait_name) = trait_name.clone().filter(|_| self.check_kw("insteadof")) {
            self.advance();
            let instead_of = self.parse_name_list("trait name")?;
            self.expect_semicolon()?;
            return Ok(TraitAdaptation::Precedence {
                trait_name,
                method,
                instead_of,
            });
        }

        self.expect_kw("as")?;
        let visibility = ["public", "protected", "private"]
            .iter()
            .find(|kw| self.check_kw(kw))
            .and_then(|kw| kw.parse::<Visibility>().ok());
        if visibility.is_some() {
            self.advance();
        }
        let alias = if self.check(TokenKind::Ident) {
            Some(self.advance().text)
        } else {
            None
        };
        if visibility.is_none() && alias.is_none() {
            return Err(self.error_expected("visibility or alias"));
        }
        self.expect_semicolon()?;
        Ok(TraitAdaptation::Alias {
            trait_name,
            method,
            visibility,
            alias,
        })
    }

    /// Parse member modifiers. `var` contributes no flags.
    fn parse_member_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::empty();
        loop {
            let token = self.peek();
            let flag = if token.is_keyword("public") {
                Modifiers::PUBLIC
            } else if token.is_keyword("protected") {
                Modifiers::PROTECTED
            } else if token.is_keyword("private") {
                Modifiers::PRIVATE
            } else if token.is_keyword("static") {
                Modifiers::STATIC
            } else if token.is_keyword("abstract") {
                Modifiers::ABSTRACT
            } else if token.is_keyword("final") {
                Modifiers::FINAL
            } else if token.is_keyword("readonly") {
                Modifiers::READONLY
            } else if token.is_keyword("var") {
                self.advance();
                continue;
            } else {
                break;
            };
            self.add_modifier(&mut modifiers, flag)?;
            self.advance();
        }
        if modifiers.is_abstract() && modifiers.is_final() {
            return Err(self.invalid_modifier("a member cannot be both abstract and final"));
        }
        Ok(modifiers)
    }

    /// Add `flag`, rejecting repeats and a second visibility keyword.
    fn add_modifier(&self, modifiers: &mut Modifiers, flag: Modifiers) -> Result<(), ParseError> {
        let is_visibility = flag == Modifiers::PUBLIC || flag == Modifiers::PROTECTED || flag == Modifiers::PRIVATE;
        if modifiers.contains(flag) {
            return Err(self.invalid_modifier("repeated modifier"));
        }
        if is_visibility && modifiers.has_visibility() {
            return Err(self.invalid_modifier("multiple access type modifiers are not allowed"));
        }
        modifiers.insert(flag);
        Ok(())
    }

    fn invalid_modifier(&self, reason: &str) -> ParseError {
        self.error_here(ParseErrorKind::InvalidModifier {
            modifier: self.peek().text.clone(),
            reason: reason.to_string(),
        })
    }

    // =========================================================================
    // FUNCTIONS AND PARAMETERS
    // =========================================================================

    /// Current position starts a named function declaration.
    pub(super) fn at_function_decl(&self) -> bool {
        self.check_kw("function")
            && (self.check_at(1, TokenKind::Ident)
                || (self.check_at(1, TokenKind::Amp) && self.check_at(2, TokenKind::Ident)))
    }

    /// Parse `function name(params): type { body }`.
    pub(super) fn parse_function_decl(&mut self, doc_comment: Option<String>, attributes: Vec<String>) -> Result<Stmt, ParseError> {
        let start = self.peek().span.start();
        self.expect_kw("function")?;
        let by_ref = self.match_token(TokenKind::Amp);
        let name = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Ok(Stmt::Function(FunctionDecl {
            name,
            by_ref,
            params,
            return_type,
            body,
            doc_comment,
            attributes,
            span: self.span_from(start),
        }))
    }

    /// Parse `( [param {, param}] [,] )`.
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) {
            params.push(self.parse_param()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let attributes = self.parse_attributes();

        let mut promoted = Modifiers::empty();
        loop {
            let flag = if self.check_kw("public") {
                Modifiers::PUBLIC
            } else if self.check_kw("protected") {
                Modifiers::PROTECTED
            } else if self.check_kw("private") {
                Modifiers::PRIVATE
            } else if self.check_kw("readonly") {
                Modifiers::READONLY
            } else {
                break;
            };
            self.add_modifier(&mut promoted, flag)?;
            self.advance();
        }

        let ty = if matches!(
            self.peek_kind(),
            TokenKind::Variable | TokenKind::Amp | TokenKind::Ellipsis
        ) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let by_ref = self.match_token(TokenKind::Amp);
        let variadic = self.match_token(TokenKind::Ellipsis);
        let name = self.expect_variable()?;
        let default = if self.match_token(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Param {
            name,
            ty,
            default,
            by_ref,
            variadic,
            promoted,
            attributes,
        })
    }

    /// Parse an optional `: type`.
    pub(super) fn parse_return_type(&mut self) -> Result<Option<php_ast::Type>, ParseError> {
        if self.match_token(TokenKind::Colon) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }
}
