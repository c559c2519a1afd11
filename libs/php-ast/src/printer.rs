//! # Printer
//!
//! Deterministic tree-to-text serialization. Output follows PSR-12 layout:
//! class, function and method braces on their own line, control-structure
//! braces on the same line, one statement per line.
//!
//! Printing a tree, reparsing the text, and printing again yields the same
//! text.

use crate::ast::*;
use config::constants::{DEFAULT_INDENT_WIDTH, PHP_OPEN_TAG, STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
use stacker::maybe_grow;

/// Printer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// One indentation level.
    pub indent: String,
}

impl PrintOptions {
    pub fn with_indent_width(width: usize) -> Self {
        Self { indent: " ".repeat(width) }
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::with_indent_width(DEFAULT_INDENT_WIDTH)
    }
}

pub fn print(ast: &Ast) -> String {
    print_with(ast, &PrintOptions::default())
}

pub fn print_with(ast: &Ast, options: &PrintOptions) -> String {
    maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
        let mut p = Printer::new(options, 0);
        p.file(ast);
        p.out
    })
}

/// Prints a statement list without the open tag, at indentation level zero.
pub fn print_stmts(stmts: &[Stmt]) -> String {
    let options = PrintOptions::default();
    maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
        let mut p = Printer::new(&options, 0);
        p.stmts(stmts);
        p.out
    })
}

pub fn print_expr(expr: &Expr) -> String {
    let options = PrintOptions::default();
    maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
        Printer::new(&options, 0).expr(expr)
    })
}

pub fn print_type(ty: &Type) -> String {
    ty.to_string()
}

// =============================================================================
// PRINTER
// =============================================================================

struct Printer {
    out: String,
    unit: String,
    level: usize,
}

/// Statement groups that sit next to each other without a blank line.
#[derive(PartialEq, Eq, Clone, Copy)]
enum Group {
    Use,
    Const,
    Code,
    Declaration,
}

fn group_of(stmt: &Stmt) -> Group {
    match stmt {
        Stmt::Use(_) => Group::Use,
        Stmt::Const(_) => Group::Const,
        Stmt::Class(_)
        | Stmt::Interface(_)
        | Stmt::Trait(_)
        | Stmt::Enum(_)
        | Stmt::Function(_)
        | Stmt::Namespace(_)
        | Stmt::Declare(_)
        | Stmt::DeclareBlock { .. } => Group::Declaration,
        _ => Group::Code,
    }
}

impl Printer {
    fn new(options: &PrintOptions, level: usize) -> Self {
        Self {
            out: String::new(),
            unit: options.indent.clone(),
            level,
        }
    }

    fn nested(&self) -> Printer {
        Printer {
            out: String::new(),
            unit: self.unit.clone(),
            level: self.level + 1,
        }
    }

    fn indent(&self) -> String {
        self.unit.repeat(self.level)
    }

    fn line(&mut self, text: &str) {
        let indent = self.indent();
        self.out.push_str(&indent);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    // =========================================================================
    // FILE LEVEL
    // =========================================================================

    fn file(&mut self, ast: &Ast) {
        self.out.push_str(PHP_OPEN_TAG);
        self.out.push('\n');
        let visible: Vec<&Stmt> = ast.stmts.iter().filter(|s| !matches!(s, Stmt::Nop)).collect();
        if visible.is_empty() {
            return;
        }
        self.blank();
        self.top_level(&visible);
    }

    /// A comment takes the group of the statement it precedes and is never
    /// followed by a blank line.
    fn top_level(&mut self, stmts: &[&Stmt]) {
        let mut prev: Option<Group> = None;
        let mut after_comment = false;
        for (i, stmt) in stmts.iter().enumerate() {
            let group = match stmt {
                Stmt::Comment(_) => stmts[i + 1..]
                    .iter()
                    .find(|s| !matches!(s, Stmt::Comment(_)))
                    .map_or(Group::Code, |s| group_of(s)),
                other => group_of(other),
            };
            if let Some(p) = prev {
                let tight = p == group && matches!(group, Group::Use | Group::Const | Group::Code);
                if !tight && !after_comment {
                    self.blank();
                }
            }
            match stmt {
                Stmt::Namespace(ns) if !ns.braced => self.unbraced_namespace(ns),
                other => self.stmt(other),
            }
            after_comment = matches!(stmt, Stmt::Comment(_));
            prev = Some(group);
        }
    }

    fn unbraced_namespace(&mut self, ns: &Namespace) {
        match &ns.name {
            Some(name) => self.line(&format!("namespace {name};")),
            None => self.line("namespace;"),
        }
        let inner: Vec<&Stmt> = ns.stmts.iter().filter(|s| !matches!(s, Stmt::Nop)).collect();
        if !inner.is_empty() {
            self.blank();
            self.top_level(&inner);
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn body(&mut self, stmts: &[Stmt]) {
        self.level += 1;
        self.stmts(stmts);
        self.level -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Namespace(ns) => {
                if ns.braced {
                    match &ns.name {
                        Some(name) => self.line(&format!("namespace {name} {{")),
                        None => self.line("namespace {"),
                    }
                    self.level += 1;
                    let inner: Vec<&Stmt> = ns.stmts.iter().filter(|s| !matches!(s, Stmt::Nop)).collect();
                    self.top_level(&inner);
                    self.level -= 1;
                    self.line("}");
                } else {
                    self.unbraced_namespace(ns);
                }
            }
            Stmt::Use(decl) => {
                let kind = match decl.kind {
                    UseKind::Normal => "",
                    UseKind::Function => "function ",
                    UseKind::Const => "const ",
                };
                let items = decl
                    .items
                    .iter()
                    .map(|item| match &item.alias {
                        Some(alias) => format!("{} as {alias}", item.name),
                        None => item.name.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.line(&format!("use {kind}{items};"));
            }
            Stmt::Declare(directives) => {
                let list = self.directives(directives);
                self.line(&format!("declare({list});"));
            }
            Stmt::DeclareBlock { directives, body } => {
                let list = self.directives(directives);
                self.line(&format!("declare({list}) {{"));
                self.body(body);
                self.line("}");
            }
            Stmt::Const(items) => {
                let list = self.const_items(items);
                self.line(&format!("const {list};"));
            }
            Stmt::Class(class) => self.class(class),
            Stmt::Interface(iface) => self.interface(iface),
            Stmt::Trait(tr) => self.trait_decl(tr),
            Stmt::Enum(e) => self.enum_decl(e),
            Stmt::Function(func) => self.function(func),
            Stmt::Expr(e) => {
                let text = self.expr(e);
                self.line(&format!("{text};"));
            }
            Stmt::Echo(exprs) => {
                let list = self.expr_list(exprs);
                self.line(&format!("echo {list};"));
            }
            Stmt::Return(value) => match value {
                Some(e) => {
                    let text = self.expr(e);
                    self.line(&format!("return {text};"));
                }
                None => self.line("return;"),
            },
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::While { cond, body } => {
                let c = self.expr(cond);
                self.line(&format!("while ({c}) {{"));
                self.body(body);
                self.line("}");
            }
            Stmt::DoWhile { body, cond } => {
                self.line("do {");
                self.body(body);
                let c = self.expr(cond);
                self.line(&format!("}} while ({c});"));
            }
            Stmt::For(f) => {
                let init = self.expr_list(&f.init);
                let cond = self.expr_list(&f.cond);
                let step = self.expr_list(&f.step);
                if init.is_empty() && cond.is_empty() && step.is_empty() {
                    self.line("for (;;) {");
                } else {
                    self.line(&format!("for ({init}; {cond}; {step}) {{"));
                }
                self.body(&f.body);
                self.line("}");
            }
            Stmt::Foreach(f) => {
                let subject = self.expr(&f.subject);
                let value = format!("{}{}", if f.by_ref { "&" } else { "" }, self.expr(&f.value));
                let binding = match &f.key {
                    Some(key) => format!("{} => {value}", self.expr(key)),
                    None => value,
                };
                self.line(&format!("foreach ({subject} as {binding}) {{"));
                self.body(&f.body);
                self.line("}");
            }
            Stmt::Switch { subject, cases } => {
                let s = self.expr(subject);
                self.line(&format!("switch ({s}) {{"));
                self.level += 1;
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            let t = self.expr(test);
                            self.line(&format!("case {t}:"));
                        }
                        None => self.line("default:"),
                    }
                    self.body(&case.body);
                }
                self.level -= 1;
                self.line("}");
            }
            Stmt::Break(level) => self.jump("break", level.as_ref()),
            Stmt::Continue(level) => self.jump("continue", level.as_ref()),
            Stmt::Throw(e) => {
                let text = self.expr(e);
                self.line(&format!("throw {text};"));
            }
            Stmt::Try(t) => {
                self.line("try {");
                self.body(&t.body);
                for catch in &t.catches {
                    let types = catch.types.iter().map(Name::to_string).collect::<Vec<_>>().join("|");
                    match &catch.var {
                        Some(var) => self.line(&format!("}} catch ({types} ${var}) {{")),
                        None => self.line(&format!("}} catch ({types}) {{")),
                    }
                    self.body(&catch.body);
                }
                if let Some(finally) = &t.finally {
                    self.line("} finally {");
                    self.body(finally);
                }
                self.line("}");
            }
            Stmt::Block(stmts) => {
                self.line("{");
                self.body(stmts);
                self.line("}");
            }
            Stmt::Global(names) => {
                let list = names.iter().map(|n| format!("${n}")).collect::<Vec<_>>().join(", ");
                self.line(&format!("global {list};"));
            }
            Stmt::Static(vars) => {
                let list = vars
                    .iter()
                    .map(|v| match &v.default {
                        Some(d) => format!("${} = {}", v.name, self.expr(d)),
                        None => format!("${}", v.name),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.line(&format!("static {list};"));
            }
            Stmt::Unset(exprs) => {
                let list = self.expr_list(exprs);
                self.line(&format!("unset({list});"));
            }
            Stmt::Goto(label) => self.line(&format!("goto {label};")),
            Stmt::Label(label) => self.line(&format!("{label}:")),
            Stmt::Comment(text) => self.comment(text),
            Stmt::InlineHtml(html) => {
                self.out.push_str("?>");
                self.out.push_str(html);
                self.out.push_str(PHP_OPEN_TAG);
                self.out.push('\n');
            }
            Stmt::Nop => {}
        }
    }

    fn directives(&self, directives: &[DeclareDirective]) -> String {
        directives
            .iter()
            .map(|d| format!("{}={}", d.name, self.expr(&d.value)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn jump(&mut self, keyword: &str, level: Option<&Expr>) {
        match level {
            Some(e) => {
                let text = self.expr(e);
                self.line(&format!("{keyword} {text};"));
            }
            None => self.line(&format!("{keyword};")),
        }
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        let c = self.expr(&stmt.cond);
        self.line(&format!("if ({c}) {{"));
        self.body(&stmt.then);
        for elseif in &stmt.elseifs {
            let c = self.expr(&elseif.cond);
            self.line(&format!("}} elseif ({c}) {{"));
            self.body(&elseif.body);
        }
        if let Some(otherwise) = &stmt.otherwise {
            self.line("} else {");
            self.body(otherwise);
        }
        self.line("}");
    }

    // =========================================================================
    // DECLARATIONS
    // =========================================================================

    /// Each line re-indented; ` *` continuation lines keep their offset.
    fn comment(&mut self, text: &str) {
        for (i, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                self.blank();
            } else if i > 0 && trimmed.starts_with('*') {
                self.line(&format!(" {trimmed}"));
            } else {
                self.line(trimmed);
            }
        }
    }

    fn doc_and_attributes(&mut self, doc: Option<&String>, attributes: &[String]) {
        if let Some(doc) = doc {
            self.comment(doc);
        }
        for attribute in attributes {
            self.line(attribute);
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.doc_and_attributes(class.doc_comment.as_ref(), &class.attributes);
        let mut header = String::new();
        if class.modifiers.is_abstract() {
            header.push_str("abstract ");
        }
        if class.modifiers.is_final() {
            header.push_str("final ");
        }
        if class.modifiers.is_readonly() {
            header.push_str("readonly ");
        }
        header.push_str("class ");
        header.push_str(&class.name);
        if let Some(parent) = &class.extends {
            header.push_str(&format!(" extends {parent}"));
        }
        if !class.implements.is_empty() {
            header.push_str(&format!(" implements {}", join_names(&class.implements)));
        }
        self.line(&header);
        self.members(&class.members);
    }

    fn interface(&mut self, iface: &InterfaceDecl) {
        self.doc_and_attributes(iface.doc_comment.as_ref(), &iface.attributes);
        let mut header = format!("interface {}", iface.name);
        if !iface.extends.is_empty() {
            header.push_str(&format!(" extends {}", join_names(&iface.extends)));
        }
        self.line(&header);
        self.members(&iface.members);
    }

    fn trait_decl(&mut self, tr: &TraitDecl) {
        self.doc_and_attributes(tr.doc_comment.as_ref(), &tr.attributes);
        self.line(&format!("trait {}", tr.name));
        self.members(&tr.members);
    }

    fn enum_decl(&mut self, e: &EnumDecl) {
        self.doc_and_attributes(e.doc_comment.as_ref(), &e.attributes);
        let mut header = format!("enum {}", e.name);
        if let Some(backing) = &e.backing {
            header.push_str(&format!(": {backing}"));
        }
        if !e.implements.is_empty() {
            header.push_str(&format!(" implements {}", join_names(&e.implements)));
        }
        self.line(&header);
        self.members(&e.members);
    }

    fn members(&mut self, members: &[ClassMember]) {
        self.line("{");
        self.level += 1;
        self.member_list(members);
        self.level -= 1;
        self.line("}");
    }

    /// Blank lines go between kinds and before every method. Comments sit
    /// tight against the member that follows them.
    fn member_list(&mut self, members: &[ClassMember]) {
        let mut prev: Option<&ClassMember> = None;
        let mut after_comment = false;
        for (i, member) in members.iter().enumerate() {
            let anchor = if member.is_comment() {
                members[i + 1..].iter().find(|m| !m.is_comment())
            } else {
                Some(member)
            };
            if let (Some(p), Some(a), false) = (prev, anchor, after_comment) {
                let same_kind = std::mem::discriminant(p) == std::mem::discriminant(a);
                if !same_kind || a.is_method() {
                    self.blank();
                }
            }
            self.member(member);
            after_comment = member.is_comment();
            if !member.is_comment() {
                prev = Some(member);
            }
        }
    }

    fn member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::TraitUse(used) => self.trait_use(used),
            ClassMember::Case(case) => {
                self.doc_and_attributes(case.doc_comment.as_ref(), &case.attributes);
                match &case.value {
                    Some(value) => {
                        let v = self.expr(value);
                        self.line(&format!("case {} = {v};", case.name));
                    }
                    None => self.line(&format!("case {};", case.name)),
                }
            }
            ClassMember::Comment(text) => self.comment(text),
            ClassMember::Const(c) => {
                self.doc_and_attributes(c.doc_comment.as_ref(), &c.attributes);
                let mut head = String::new();
                if c.modifiers.is_final() {
                    head.push_str("final ");
                }
                if c.modifiers.has_visibility() {
                    head.push_str(c.modifiers.visibility().as_str());
                    head.push(' ');
                }
                let items = self.const_items(&c.items);
                self.line(&format!("{head}const {items};"));
            }
            ClassMember::Property(p) => self.property(p),
            ClassMember::Method(m) => self.method(m),
        }
    }

    fn trait_use(&mut self, used: &TraitUse) {
        let names = join_names(&used.traits);
        if used.adaptations.is_empty() {
            self.line(&format!("use {names};"));
            return;
        }
        self.line(&format!("use {names} {{"));
        self.level += 1;
        for adaptation in &used.adaptations {
            let text = match adaptation {
                TraitAdaptation::Precedence { trait_name, method, instead_of } => {
                    format!("{trait_name}::{method} insteadof {};", join_names(instead_of))
                }
                TraitAdaptation::Alias { trait_name, method, visibility, alias } => {
                    let mut text = match trait_name {
                        Some(t) => format!("{t}::{method} as"),
                        None => format!("{method} as"),
                    };
                    if let Some(v) = visibility {
                        text.push_str(&format!(" {v}"));
                    }
                    if let Some(alias) = alias {
                        text.push_str(&format!(" {alias}"));
                    }
                    text.push(';');
                    text
                }
            };
            self.line(&text);
        }
        self.level -= 1;
        self.line("}");
    }

    fn property(&mut self, p: &PropertyDecl) {
        self.doc_and_attributes(p.doc_comment.as_ref(), &p.attributes);
        let mut head = property_modifiers(p.modifiers);
        if head.is_empty() {
            head.push_str("var ");
        }
        if let Some(ty) = &p.ty {
            head.push_str(&format!("{ty} "));
        }
        let items = p
            .props
            .iter()
            .map(|item| match &item.default {
                Some(d) => format!("${} = {}", item.name, self.expr(d)),
                None => format!("${}", item.name),
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!("{head}{items};"));
    }

    fn method(&mut self, m: &MethodDecl) {
        self.doc_and_attributes(m.doc_comment.as_ref(), &m.attributes);
        let mut head = String::new();
        if m.modifiers.is_abstract() {
            head.push_str("abstract ");
        }
        if m.modifiers.is_final() {
            head.push_str("final ");
        }
        if m.modifiers.has_visibility() {
            head.push_str(m.modifiers.visibility().as_str());
            head.push(' ');
        }
        if m.modifiers.is_static() {
            head.push_str("static ");
        }
        let signature = self.signature(&m.name, m.by_ref, &m.params, m.return_type.as_ref());
        match &m.body {
            None => self.line(&format!("{head}function {signature};")),
            Some(body) => {
                self.line(&format!("{head}function {signature}"));
                self.line("{");
                self.body(body);
                self.line("}");
            }
        }
    }

    fn function(&mut self, f: &FunctionDecl) {
        self.doc_and_attributes(f.doc_comment.as_ref(), &f.attributes);
        let signature = self.signature(&f.name, f.by_ref, &f.params, f.return_type.as_ref());
        self.line(&format!("function {signature}"));
        self.line("{");
        self.body(&f.body);
        self.line("}");
    }

    fn signature(&self, name: &str, by_ref: bool, params: &[Param], ret: Option<&Type>) -> String {
        let mut s = String::new();
        if by_ref {
            s.push('&');
        }
        s.push_str(name);
        s.push('(');
        s.push_str(&self.params(params));
        s.push(')');
        if let Some(ty) = ret {
            s.push_str(&format!(": {ty}"));
        }
        s
    }

    fn params(&self, params: &[Param]) -> String {
        params.iter().map(|p| self.param(p)).collect::<Vec<_>>().join(", ")
    }

    fn param(&self, p: &Param) -> String {
        let mut s = String::new();
        for attribute in &p.attributes {
            s.push_str(attribute);
            s.push(' ');
        }
        s.push_str(&property_modifiers(p.promoted));
        if let Some(ty) = &p.ty {
            s.push_str(&format!("{ty} "));
        }
        if p.by_ref {
            s.push('&');
        }
        if p.variadic {
            s.push_str("...");
        }
        s.push('$');
        s.push_str(&p.name);
        if let Some(default) = &p.default {
            s.push_str(" = ");
            s.push_str(&self.expr(default));
        }
        s
    }

    fn const_items(&self, items: &[ConstItem]) -> String {
        items
            .iter()
            .map(|c| format!("{} = {}", c.name, self.expr(&c.value)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn expr_list(&self, exprs: &[Expr]) -> String {
        exprs.iter().map(|e| self.expr(e)).collect::<Vec<_>>().join(", ")
    }

    fn args(&self, args: &[Arg]) -> String {
        args.iter()
            .map(|a| {
                let value = self.expr(&a.value);
                match (&a.name, a.spread) {
                    (_, true) => format!("...{value}"),
                    (Some(name), false) => format!("{name}: {value}"),
                    (None, false) => value,
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn member_name(&self, name: &Member) -> String {
        match name {
            Member::Ident(ident) => ident.clone(),
            Member::Expr(e) => match e.as_ref() {
                Expr::Variable(_) => self.expr(e),
                other => format!("{{{}}}", self.expr(other)),
            },
        }
    }

    fn array_item(&self, item: &ArrayItem) -> String {
        let mut value = self.expr(&item.value);
        if item.by_ref {
            value = format!("&{value}");
        }
        if item.spread {
            value = format!("...{value}");
        }
        match &item.key {
            Some(key) => format!("{} => {value}", self.expr(key)),
            None => value,
        }
    }

    fn expr(&self, e: &Expr) -> String {
        match e {
            Expr::Variable(name) => format!("${name}"),
            Expr::VariableVariable(inner) => match inner.as_ref() {
                Expr::Variable(_) | Expr::VariableVariable(_) => format!("${}", self.expr(inner)),
                other => format!("${{{}}}", self.expr(other)),
            },
            Expr::Literal(lit) => print_literal(lit),
            Expr::Array { items, short } => {
                let inner = items.iter().map(|i| self.array_item(i)).collect::<Vec<_>>().join(", ");
                if *short {
                    format!("[{inner}]")
                } else {
                    format!("array({inner})")
                }
            }
            Expr::Name(name) | Expr::ConstFetch(name) => name.to_string(),
            Expr::ClassConstFetch { class, name } => format!("{}::{name}", self.expr(class)),
            Expr::StaticPropertyFetch { class, name } => format!("{}::${name}", self.expr(class)),
            Expr::PropertyFetch { object, name, nullsafe } => {
                format!("{}{}{}", self.expr(object), arrow(*nullsafe), self.member_name(name))
            }
            Expr::MethodCall { object, name, args, nullsafe } => format!(
                "{}{}{}({})",
                self.expr(object),
                arrow(*nullsafe),
                self.member_name(name),
                self.args(args)
            ),
            Expr::StaticCall { class, name, args } => {
                format!("{}::{}({})", self.expr(class), self.member_name(name), self.args(args))
            }
            Expr::Call { callee, args } => format!("{}({})", self.expr(callee), self.args(args)),
            Expr::New { class, args } => format!("new {}({})", self.expr(class), self.args(args)),
            Expr::AnonymousClass { args, class } => self.anonymous_class(args, class),
            Expr::Index { value, index } => match index {
                Some(i) => format!("{}[{}]", self.expr(value), self.expr(i)),
                None => format!("{}[]", self.expr(value)),
            },
            Expr::Assign { target, op, value } => {
                format!("{} {} {}", self.expr(target), assign_op(*op), self.expr(value))
            }
            Expr::AssignRef { target, value } => format!("{} = &{}", self.expr(target), self.expr(value)),
            Expr::Binary { op, left, right } => {
                format!("{} {} {}", self.expr(left), binary_op(*op), self.expr(right))
            }
            Expr::Unary { op, expr } => {
                let inner = self.expr(expr);
                let symbol = unary_op(*op);
                if inner.starts_with(symbol) {
                    format!("{symbol} {inner}")
                } else {
                    format!("{symbol}{inner}")
                }
            }
            Expr::IncDec { op, expr } => {
                let inner = self.expr(expr);
                match op {
                    IncDecOp::PreInc => format!("++{inner}"),
                    IncDecOp::PreDec => format!("--{inner}"),
                    IncDecOp::PostInc => format!("{inner}++"),
                    IncDecOp::PostDec => format!("{inner}--"),
                }
            }
            Expr::Cast { kind, expr } => format!("({}) {}", cast_name(*kind), self.expr(expr)),
            Expr::Ternary { cond, then, otherwise } => match then {
                Some(t) => format!("{} ? {} : {}", self.expr(cond), self.expr(t), self.expr(otherwise)),
                None => format!("{} ?: {}", self.expr(cond), self.expr(otherwise)),
            },
            Expr::Instanceof { expr, class } => format!("{} instanceof {}", self.expr(expr), self.expr(class)),
            Expr::Isset(exprs) => format!("isset({})", self.expr_list(exprs)),
            Expr::Empty(inner) => format!("empty({})", self.expr(inner)),
            Expr::Closure(c) => self.closure(c),
            Expr::ArrowFn(f) => {
                let mut s = String::new();
                if f.is_static {
                    s.push_str("static ");
                }
                s.push_str("fn");
                if f.by_ref {
                    s.push('&');
                }
                s.push_str(&format!("({})", self.params(&f.params)));
                if let Some(ty) = &f.return_type {
                    s.push_str(&format!(": {ty}"));
                }
                s.push_str(&format!(" => {}", self.expr(&f.body)));
                s
            }
            Expr::Match { subject, arms } => {
                let inner = self.nested();
                let indent = inner.indent();
                let mut s = format!("match ({}) {{\n", self.expr(subject));
                for arm in arms {
                    let conditions = match &arm.conditions {
                        Some(conds) => inner.expr_list(conds),
                        None => "default".to_string(),
                    };
                    s.push_str(&format!("{indent}{conditions} => {},\n", inner.expr(&arm.body)));
                }
                s.push_str(&self.indent());
                s.push('}');
                s
            }
            Expr::Clone(inner) => format!("clone {}", self.expr(inner)),
            Expr::Print(inner) => format!("print {}", self.expr(inner)),
            Expr::Throw(inner) => format!("throw {}", self.expr(inner)),
            Expr::Yield { key, value } => match (key, value) {
                (Some(k), Some(v)) => format!("yield {} => {}", self.expr(k), self.expr(v)),
                (None, Some(v)) | (Some(v), None) => format!("yield {}", self.expr(v)),
                (None, None) => "yield".to_string(),
            },
            Expr::YieldFrom(inner) => format!("yield from {}", self.expr(inner)),
            Expr::VariadicPlaceholder => "...".to_string(),
            Expr::Include { kind, expr } => format!("{} {}", include_keyword(*kind), self.expr(expr)),
            Expr::ErrorSuppress(inner) => format!("@{}", self.expr(inner)),
            Expr::Paren(inner) => format!("({})", self.expr(inner)),
        }
    }

    fn anonymous_class(&self, args: &[Arg], class: &ClassDecl) -> String {
        let mut s = String::from("new ");
        if class.modifiers.is_readonly() {
            s.push_str("readonly ");
        }
        s.push_str("class");
        if !args.is_empty() {
            s.push_str(&format!("({})", self.args(args)));
        }
        if let Some(parent) = &class.extends {
            s.push_str(&format!(" extends {parent}"));
        }
        if !class.implements.is_empty() {
            s.push_str(&format!(" implements {}", join_names(&class.implements)));
        }
        let mut inner = self.nested();
        inner.member_list(&class.members);
        s.push_str(" {
");
        s.push_str(&inner.out);
        s.push_str(&self.indent());
        s.push('}');
        s
    }

    fn closure(&self, c: &Closure) -> String {
        let mut s = String::new();
        if c.is_static {
            s.push_str("static ");
        }
        s.push_str("function ");
        if c.by_ref {
            s.push('&');
        }
        s.push_str(&format!("({})", self.params(&c.params)));
        if !c.uses.is_empty() {
            let uses = c
                .uses
                .iter()
                .map(|u| format!("{}${}", if u.by_ref { "&" } else { "" }, u.name))
                .collect::<Vec<_>>()
                .join(", ");
            s.push_str(&format!(" use ({uses})"));
        }
        if let Some(ty) = &c.return_type {
            s.push_str(&format!(": {ty}"));
        }
        let mut inner = self.nested();
        inner.stmts(&c.body);
        s.push_str(" {\n");
        s.push_str(&inner.out);
        s.push_str(&self.indent());
        s.push('}');
        s
    }
}

// =============================================================================
// TOKENS
// =============================================================================

fn join_names(names: &[Name]) -> String {
    names.iter().map(Name::to_string).collect::<Vec<_>>().join(", ")
}

fn property_modifiers(m: Modifiers) -> String {
    let mut s = String::new();
    if m.has_visibility() {
        s.push_str(m.visibility().as_str());
        s.push(' ');
    }
    if m.is_static() {
        s.push_str("static ");
    }
    if m.is_readonly() {
        s.push_str("readonly ");
    }
    s
}

fn arrow(nullsafe: bool) -> &'static str {
    if nullsafe {
        "?->"
    } else {
        "->"
    }
}

fn print_literal(lit: &Literal) -> String {
    match lit {
        Literal::Null => "null".to_string(),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
        Literal::Int(raw) | Literal::Float(raw) | Literal::String(raw) => raw.clone(),
    }
}

fn binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::BooleanOr => "||",
        BinaryOp::BooleanAnd => "&&",
        BinaryOp::LogicalOr => "or",
        BinaryOp::LogicalAnd => "and",
        BinaryOp::LogicalXor => "xor",
        BinaryOp::BitwiseOr => "|",
        BinaryOp::BitwiseXor => "^",
        BinaryOp::BitwiseAnd => "&",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Identical => "===",
        BinaryOp::NotIdentical => "!==",
        BinaryOp::Spaceship => "<=>",
        BinaryOp::Less => "<",
        BinaryOp::LessOrEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterOrEqual => ">=",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::Concat => ".",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
        BinaryOp::Coalesce => "??",
    }
}

fn assign_op(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Add => "+=",
        AssignOp::Sub => "-=",
        AssignOp::Mul => "*=",
        AssignOp::Div => "/=",
        AssignOp::Mod => "%=",
        AssignOp::Pow => "**=",
        AssignOp::Concat => ".=",
        AssignOp::BitwiseAnd => "&=",
        AssignOp::BitwiseOr => "|=",
        AssignOp::BitwiseXor => "^=",
        AssignOp::ShiftLeft => "<<=",
        AssignOp::ShiftRight => ">>=",
        AssignOp::Coalesce => "??=",
    }
}

fn unary_op(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "!",
        UnaryOp::Neg => "-",
        UnaryOp::Pos => "+",
        UnaryOp::BitwiseNot => "~",
    }
}

fn cast_name(kind: CastKind) -> &'static str {
    match kind {
        CastKind::Int => "int",
        CastKind::Float => "float",
        CastKind::String => "string",
        CastKind::Bool => "bool",
        CastKind::Array => "array",
        CastKind::Object => "object",
    }
}

fn include_keyword(kind: IncludeKind) -> &'static str {
    match kind {
        IncludeKind::Include => "include",
        IncludeKind::IncludeOnce => "include_once",
        IncludeKind::Require => "require",
        IncludeKind::RequireOnce => "require_once",
    }
}
