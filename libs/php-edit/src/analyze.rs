//! # Structural Analyzer
//!
//! Flattens a tree into a serializable [`FileReport`]: names, signatures,
//! visibility and modifiers. Pure read traversal, computed fresh per call.
//!
//! Only the first namespace is reported. Classes, interfaces, traits and
//! enums are collected from every place the query engine reaches.

use crate::error::EditError;
use crate::query;
use php_ast::{
    print_expr, ClassMember, FunctionDecl, MethodDecl, Name, Param, PropertyDecl, UseDecl, UseKind, Visibility,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FileReport {
    pub namespace: Option<String>,
    pub uses: Vec<String>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub traits: Vec<TraitInfo>,
    pub enums: Vec<EnumInfo>,
    pub functions: Vec<FunctionInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub traits: Vec<String>,
    pub constants: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub has_default: bool,
    /// The default expression as printed source.
    pub default: Option<String>,
    pub by_ref: bool,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TraitInfo {
    pub name: String,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EnumInfo {
    pub name: String,
    /// `int` or `string` for a backed enum.
    pub backing: Option<String>,
    pub implements: Vec<String>,
    pub cases: Vec<String>,
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterInfo>,
}

// =============================================================================
// ANALYSIS
// =============================================================================

pub fn analyze(ast: &php_ast::Ast) -> FileReport {
    FileReport {
        namespace: query::first_namespace(ast).and_then(|ns| ns.name.as_ref()).map(Name::to_string),
        uses: query::uses(ast).into_iter().flat_map(use_names).collect(),
        classes: query::classes(ast)
            .into_iter()
            .map(|class| {
                let mut info = ClassInfo {
                    name: class.name.clone(),
                    extends: class.extends.as_ref().map(Name::to_string),
                    implements: names(&class.implements),
                    is_abstract: class.modifiers.is_abstract(),
                    is_final: class.modifiers.is_final(),
                    ..Default::default()
                };
                for member in &class.members {
                    match member {
                        ClassMember::TraitUse(used) => info.traits.extend(names(&used.traits)),
                        ClassMember::Const(c) => info.constants.extend(c.items.iter().map(|i| i.name.clone())),
                        ClassMember::Property(p) => info.properties.extend(property_infos(p)),
                        ClassMember::Method(m) => info.methods.push(method_info(m)),
                        ClassMember::Case(_) | ClassMember::Comment(_) => {}
                    }
                }
                info
            })
            .collect(),
        interfaces: query::interfaces(ast)
            .into_iter()
            .map(|iface| InterfaceInfo {
                name: iface.name.clone(),
                extends: names(&iface.extends),
                methods: methods(&iface.members),
            })
            .collect(),
        traits: query::traits(ast)
            .into_iter()
            .map(|tr| TraitInfo {
                name: tr.name.clone(),
                methods: methods(&tr.members),
                properties: tr
                    .members
                    .iter()
                    .filter_map(ClassMember::as_property)
                    .flat_map(property_infos)
                    .collect(),
            })
            .collect(),
        enums: query::enums(ast)
            .into_iter()
            .map(|e| EnumInfo {
                name: e.name.clone(),
                backing: e.backing.as_ref().map(ToString::to_string),
                implements: names(&e.implements),
                cases: e
                    .members
                    .iter()
                    .filter_map(|member| match member {
                        ClassMember::Case(case) => Some(case.name.clone()),
                        _ => None,
                    })
                    .collect(),
                methods: methods(&e.members),
            })
            .collect(),
        functions: query::functions(ast).into_iter().map(function_info).collect(),
    }
}

/// Parse and analyze.
pub fn analyze_source(source: &str) -> Result<FileReport, EditError> {
    Ok(analyze(&php_parser::parse(source)?))
}

fn names(list: &[Name]) -> Vec<String> {
    list.iter().map(Name::to_string).collect()
}

fn use_names(decl: &UseDecl) -> Vec<String> {
    let prefix = match decl.kind {
        UseKind::Normal => "",
        UseKind::Function => "function ",
        UseKind::Const => "const ",
    };
    decl.items
        .iter()
        .map(|item| match &item.alias {
            Some(alias) => format!("{prefix}{} as {alias}", item.name),
            None => format!("{prefix}{}", item.name),
        })
        .collect()
}

fn methods(members: &[ClassMember]) -> Vec<MethodInfo> {
    members.iter().filter_map(ClassMember::as_method).map(method_info).collect()
}

fn method_info(m: &MethodDecl) -> MethodInfo {
    MethodInfo {
        name: m.name.clone(),
        visibility: m.modifiers.visibility(),
        is_static: m.modifiers.is_static(),
        is_abstract: m.modifiers.is_abstract(),
        is_final: m.modifiers.is_final(),
        return_type: m.return_type.as_ref().map(ToString::to_string),
        parameters: m.params.iter().map(parameter_info).collect(),
    }
}

fn function_info(f: &FunctionDecl) -> FunctionInfo {
    FunctionInfo {
        name: f.name.clone(),
        return_type: f.return_type.as_ref().map(ToString::to_string),
        parameters: f.params.iter().map(parameter_info).collect(),
    }
}

fn parameter_info(p: &Param) -> ParameterInfo {
    ParameterInfo {
        name: p.name.clone(),
        ty: p.ty.as_ref().map(ToString::to_string),
        has_default: p.default.is_some(),
        default: p.default.as_ref().map(print_expr),
        by_ref: p.by_ref,
        variadic: p.variadic,
    }
}

/// One entry per declared name.
fn property_infos(p: &PropertyDecl) -> Vec<PropertyInfo> {
    p.props
        .iter()
        .map(|item| PropertyInfo {
            name: item.name.clone(),
            visibility: p.modifiers.visibility(),
            is_static: p.modifiers.is_static(),
            is_readonly: p.modifiers.is_readonly(),
            ty: p.ty.as_ref().map(ToString::to_string),
            default: item.default.as_ref().map(print_expr),
        })
        .collect()
}
