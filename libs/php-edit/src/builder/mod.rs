//! # Builder
//!
//! Synthesizes syntax tree nodes from [`spec`] descriptors.
//!
//! Input problems (an unknown visibility, a malformed type string,
//! conflicting modifiers) fail the build. A method body snippet that does
//! not parse does not: the body becomes a placeholder and the failure is
//! reported as a warning on the [`Built`] result.
//!
//! ## Example
//!
//! ```rust
//! use php_edit::builder::{build_method, spec::MethodSpec};
//! use php_edit::builder::spec::from_json;
//! use serde_json::json;
//!
//! let spec: MethodSpec = from_json(&json!({
//!     "name": "getName",
//!     "return_type": "string",
//!     "body": "return $this->name;"
//! })).unwrap();
//! let built = build_method(&spec).unwrap();
//! assert_eq!(built.node.name, "getName");
//! assert!(built.warnings.is_empty());
//! ```

pub mod literal;
pub mod spec;

pub use literal::literal_from_json;

use crate::error::EditError;
use php_ast::{
    Ast, ClassConst, ClassDecl, ClassMember, ConstItem, DeclareDirective, Diagnostic, Expr, InterfaceDecl,
    MethodDecl, Modifiers, Name, Namespace, Param, PropertyDecl, PropertyItem, Span, Stmt, TraitDecl, TraitUse,
    Type, UseDecl, UseItem, UseKind,
};
use spec::{ClassSpec, ConstantSpec, InterfaceSpec, MethodSpec, ParameterSpec, PropertySpec, TraitSpec};
use tracing::warn;

// =============================================================================
// BUILT
// =============================================================================

/// A synthesized node plus the warnings produced while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Built<T> {
    pub node: T,
    pub warnings: Vec<Diagnostic>,
}

impl<T> Built<T> {
    pub fn new(node: T) -> Self {
        Self {
            node,
            warnings: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Built<U> {
        Built {
            node: f(self.node),
            warnings: self.warnings,
        }
    }

    /// Take `other`'s warnings and return its node.
    pub fn absorb<U>(&mut self, other: Built<U>) -> U {
        self.warnings.extend(other.warnings);
        other.node
    }
}

// =============================================================================
// MEMBERS
// =============================================================================

/// Build a method. An absent body is an empty body.
pub fn build_method(spec: &MethodSpec) -> Result<Built<MethodDecl>, EditError> {
    check_identifier("method", &spec.name)?;
    if spec.is_abstract && spec.is_final {
        return Err(EditError::InvalidDescriptor(format!(
            "method '{}' cannot be both abstract and final",
            spec.name
        )));
    }
    if spec.is_abstract && spec.body.is_some() {
        return Err(EditError::InvalidDescriptor(format!(
            "abstract method '{}' cannot have a body",
            spec.name
        )));
    }

    let mut modifiers = Modifiers::from(spec.visibility);
    modifiers.set(Modifiers::STATIC, spec.is_static);
    modifiers.set(Modifiers::ABSTRACT, spec.is_abstract);
    modifiers.set(Modifiers::FINAL, spec.is_final);

    let params = spec.parameters.iter().map(build_param).collect::<Result<Vec<_>, _>>()?;
    let return_type = spec.return_type.as_deref().map(parse_type).transpose()?;

    let mut built = Built::new(());
    let body = if spec.is_abstract {
        None
    } else {
        Some(built.absorb(build_body(&spec.name, spec.body.as_deref())))
    };

    Ok(built.map(|()| MethodDecl {
        name: spec.name.clone(),
        modifiers,
        by_ref: false,
        params,
        return_type,
        body,
        doc_comment: spec.doc_comment.as_deref().map(doc_block),
        attributes: Vec::new(),
        span: Span::default(),
    }))
}

/// Parse a method body snippet, falling back to a placeholder.
fn build_body(method: &str, body: Option<&str>) -> Built<Vec<Stmt>> {
    let Some(source) = body.filter(|b| !b.trim().is_empty()) else {
        return Built::new(Vec::new());
    };
    match php_parser::parse_snippet(source) {
        Ok(stmts) => Built::new(stmts),
        Err(error) => {
            warn!(method, %error, "method body failed to parse, using an empty placeholder");
            Built {
                node: vec![Stmt::Nop],
                warnings: vec![Diagnostic::warning(
                    format!("body of method '{method}' could not be parsed and was left empty"),
                    Span::default(),
                )
                .with_hint(error.to_string())],
            }
        }
    }
}

/// Build a property declaration with a single name.
pub fn build_property(spec: &PropertySpec) -> Result<Built<PropertyDecl>, EditError> {
    let name = strip_sigil(&spec.name);
    check_identifier("property", name)?;
    if spec.readonly && spec.ty.is_none() {
        return Err(EditError::InvalidDescriptor(format!(
            "readonly property '{name}' must have a type"
        )));
    }
    if spec.readonly && spec.default.is_some() {
        return Err(EditError::InvalidDescriptor(format!(
            "readonly property '{name}' cannot have a default"
        )));
    }

    let mut modifiers = Modifiers::from(spec.visibility);
    modifiers.set(Modifiers::STATIC, spec.is_static);
    modifiers.set(Modifiers::READONLY, spec.readonly);

    Ok(Built::new(PropertyDecl {
        modifiers,
        ty: spec.ty.as_deref().map(parse_type).transpose()?,
        props: vec![PropertyItem {
            name: name.to_string(),
            default: spec.default.as_ref().map(literal_from_json),
        }],
        doc_comment: spec.doc_comment.as_deref().map(doc_block),
        attributes: Vec::new(),
        span: Span::default(),
    }))
}

/// Build a parameter. A present `default`, `null` included, makes it optional.
pub fn build_param(spec: &ParameterSpec) -> Result<Param, EditError> {
    let name = strip_sigil(&spec.name);
    check_identifier("parameter", name)?;
    if spec.variadic && spec.default.is_some() {
        return Err(EditError::InvalidDescriptor(format!(
            "variadic parameter '{name}' cannot have a default"
        )));
    }
    Ok(Param {
        name: name.to_string(),
        ty: spec.ty.as_deref().map(parse_type).transpose()?,
        default: spec.default.as_ref().map(literal_from_json),
        by_ref: spec.by_ref,
        variadic: spec.variadic,
        promoted: spec.promote.map_or(Modifiers::empty(), Modifiers::from),
        attributes: Vec::new(),
    })
}

pub fn build_constant(spec: &ConstantSpec) -> Result<ClassConst, EditError> {
    check_identifier("constant", &spec.name)?;
    Ok(ClassConst {
        modifiers: Modifiers::from(spec.visibility),
        items: vec![ConstItem {
            name: spec.name.clone(),
            value: literal_from_json(&spec.value),
        }],
        doc_comment: None,
        attributes: Vec::new(),
    })
}

/// Parse a type annotation string.
pub fn parse_type(text: &str) -> Result<Type, EditError> {
    php_parser::parse_type(text).map_err(|source| EditError::InvalidType {
        ty: text.to_string(),
        source,
    })
}

// =============================================================================
// FILES
// =============================================================================

/// Build a file containing one class.
pub fn build_class(spec: &ClassSpec) -> Result<Built<Ast>, EditError> {
    check_identifier("class", &spec.name)?;
    if spec.is_abstract && spec.is_final {
        return Err(EditError::InvalidDescriptor(format!(
            "class '{}' cannot be both abstract and final",
            spec.name
        )));
    }

    let mut built = Built::new(());
    let mut members = Vec::new();
    if !spec.traits.is_empty() {
        members.push(ClassMember::TraitUse(TraitUse::new(
            spec.traits.iter().map(|t| Name::new(t.as_str())).collect(),
        )));
    }
    for constant in &spec.constants {
        members.push(ClassMember::Const(build_constant(constant)?));
    }
    for property in &spec.properties {
        members.push(ClassMember::Property(built.absorb(build_property(property)?)));
    }
    for method in &spec.methods {
        members.push(ClassMember::Method(built.absorb(build_method(method)?)));
    }

    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::ABSTRACT, spec.is_abstract);
    modifiers.set(Modifiers::FINAL, spec.is_final);

    let class = Stmt::Class(ClassDecl {
        name: spec.name.clone(),
        modifiers,
        extends: spec.extends.as_deref().map(Name::from),
        implements: spec.implements.iter().map(|i| Name::new(i.as_str())).collect(),
        members,
        doc_comment: spec.doc_comment.as_deref().map(doc_block),
        attributes: Vec::new(),
        span: Span::default(),
    });
    Ok(built.map(|()| wrap_file(class, spec.namespace.as_deref(), &spec.uses, spec.strict_types)))
}

/// Build a file containing one interface. Method bodies are dropped with a warning.
pub fn build_interface(spec: &InterfaceSpec) -> Result<Built<Ast>, EditError> {
    check_identifier("interface", &spec.name)?;

    let mut built = Built::new(());
    let mut members = Vec::new();
    for constant in &spec.constants {
        members.push(ClassMember::Const(build_constant(constant)?));
    }
    for method in &spec.methods {
        if method.body.is_some() {
            built.warnings.push(Diagnostic::warning(
                format!("interface method '{}' cannot have a body; body ignored", method.name),
                Span::default(),
            ));
        }
        let signature = MethodSpec {
            body: None,
            ..method.clone()
        };
        let mut decl = built.absorb(build_method(&signature)?);
        decl.body = None;
        members.push(ClassMember::Method(decl));
    }

    let iface = Stmt::Interface(InterfaceDecl {
        name: spec.name.clone(),
        extends: spec.extends.iter().map(|e| Name::new(e.as_str())).collect(),
        members,
        doc_comment: spec.doc_comment.as_deref().map(doc_block),
        attributes: Vec::new(),
        span: Span::default(),
    });
    Ok(built.map(|()| wrap_file(iface, spec.namespace.as_deref(), &spec.uses, spec.strict_types)))
}

/// Build a file containing one trait.
pub fn build_trait(spec: &TraitSpec) -> Result<Built<Ast>, EditError> {
    check_identifier("trait", &spec.name)?;

    let mut built = Built::new(());
    let mut members = Vec::new();
    for property in &spec.properties {
        members.push(ClassMember::Property(built.absorb(build_property(property)?)));
    }
    for method in &spec.methods {
        members.push(ClassMember::Method(built.absorb(build_method(method)?)));
    }

    let tr = Stmt::Trait(TraitDecl {
        name: spec.name.clone(),
        members,
        doc_comment: spec.doc_comment.as_deref().map(doc_block),
        attributes: Vec::new(),
        span: Span::default(),
    });
    Ok(built.map(|()| wrap_file(tr, spec.namespace.as_deref(), &spec.uses, spec.strict_types)))
}

/// Build a file from a descriptor whose `type` is `class` (the default),
/// `interface` or `trait`.
pub fn build_file(descriptor: &serde_json::Value) -> Result<Built<Ast>, EditError> {
    match descriptor.get("type").and_then(serde_json::Value::as_str).unwrap_or("class") {
        "class" => build_class(&spec::from_json(descriptor)?),
        "interface" => build_interface(&spec::from_json(descriptor)?),
        "trait" => build_trait(&spec::from_json(descriptor)?),
        other => Err(EditError::UnknownCreateType(other.to_string())),
    }
}

/// `declare`, then the namespace holding the imports and the declaration.
fn wrap_file(decl: Stmt, namespace: Option<&str>, uses: &[String], strict_types: bool) -> Ast {
    let mut stmts = Vec::new();
    if strict_types {
        stmts.push(Stmt::Declare(vec![DeclareDirective {
            name: "strict_types".to_string(),
            value: Expr::Literal(php_ast::Literal::int(1)),
        }]));
    }

    let mut body: Vec<Stmt> = uses.iter().map(|u| use_stmt(u)).collect();
    body.push(decl);

    match namespace.map(|ns| ns.trim_matches('\\')).filter(|ns| !ns.is_empty()) {
        Some(ns) => stmts.push(Stmt::Namespace(Namespace {
            name: Some(Name::new(ns)),
            stmts: body,
            braced: false,
            span: Span::default(),
        })),
        None => stmts.extend(body),
    }
    Ast::new(stmts)
}

/// `Foo\Bar` or `Foo\Bar as Baz`.
fn use_stmt(text: &str) -> Stmt {
    let (name, alias) = match text.split_once(" as ") {
        Some((name, alias)) => (name.trim(), Some(alias.trim().to_string())),
        None => (text.trim(), None),
    };
    Stmt::Use(UseDecl {
        kind: UseKind::Normal,
        items: vec![UseItem {
            name: Name::new(name.trim_start_matches('\\')),
            alias,
        }],
    })
}

// =============================================================================
// HELPERS
// =============================================================================

fn strip_sigil(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

fn check_identifier(what: &str, name: &str) -> Result<(), EditError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c == '_' || c.is_alphabetic());
    if valid_start && chars.all(|c| c == '_' || c.is_alphanumeric()) {
        Ok(())
    } else {
        Err(EditError::InvalidDescriptor(format!("invalid {what} name '{name}'")))
    }
}

/// Wrap plain text in a `/** ... */` block; text that already is one is kept.
///
/// A `*/` inside the text is written as `*\/` so the block cannot end early.
fn doc_block(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix("/**").and_then(|rest| rest.strip_suffix("*/")) {
        if !inner.contains("*/") {
            return trimmed.to_string();
        }
    }
    let mut block = String::from("/**\n");
    for line in trimmed.lines() {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            block.push_str(" *\n");
        } else {
            block.push_str(&format!(" * {line}\n"));
        }
    }
    block.push_str(" */");
    block
}
