//! # Script Rendering
//!
//! Option records for generated JavaScript and TypeScript, and the text
//! they render to. Type annotations, access modifiers and other typed
//! syntax are emitted only for [`Dialect::TypeScript`].
//!
//! Default and initial values are JSON literals rendered with
//! `serde_json`, which is valid JavaScript for every JSON value.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{Dialect, Script};
use crate::adapters::scan::indent_lines;

// =============================================================================
// OPTION RECORDS
// =============================================================================

/// A key that is present, even as `null`, yields `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

/// A parameter, written either as a bare name or as a record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ParamRepr")]
pub(crate) struct ParamOptions {
    pub name: String,
    pub ty: Option<String>,
    pub default: Option<Value>,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamRepr {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        ty: Option<String>,
        #[serde(default, deserialize_with = "present")]
        default: Option<Value>,
        #[serde(default)]
        optional: bool,
        #[serde(default)]
        rest: bool,
    },
}

impl From<ParamRepr> for ParamOptions {
    fn from(repr: ParamRepr) -> Self {
        match repr {
            ParamRepr::Name(name) => ParamOptions {
                name,
                ty: None,
                default: None,
                optional: false,
                rest: false,
            },
            ParamRepr::Full {
                name,
                ty,
                default,
                optional,
                rest,
            } => ParamOptions {
                name,
                ty,
                default,
                optional,
                rest,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct MethodOptions {
    pub name: String,
    #[serde(default, alias = "parameters")]
    pub params: Vec<ParamOptions>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub visibility: Option<Access>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FieldOptions {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub visibility: Option<Access>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ClassOptions {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, alias = "constructor")]
    pub constructor_params: Option<Vec<ParamOptions>>,
    #[serde(default, alias = "properties")]
    pub fields: Vec<FieldOptions>,
    #[serde(default)]
    pub methods: Vec<MethodOptions>,
    #[serde(default = "yes")]
    pub export: bool,
    #[serde(default)]
    pub default_export: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FunctionOptions {
    pub name: String,
    #[serde(default, alias = "parameters")]
    pub params: Vec<ParamOptions>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default = "yes")]
    pub export: bool,
    #[serde(default)]
    pub default_export: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ImportOptions {
    pub from: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ConstantOptions {
    pub name: String,
    pub value: Value,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default = "yes")]
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ModuleOptions {
    pub imports: Vec<ImportOptions>,
    pub constants: Vec<ConstantOptions>,
    pub functions: Vec<FunctionOptions>,
    pub default_export: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct InterfacePropertyOptions {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct InterfaceOptions {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<InterfacePropertyOptions>,
    #[serde(default)]
    pub methods: Vec<MethodOptions>,
    #[serde(default = "yes")]
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct TypeAliasOptions {
    pub name: String,
    #[serde(alias = "value")]
    pub definition: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default = "yes")]
    pub export: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "EnumMemberRepr")]
pub(crate) struct EnumMember {
    pub name: String,
    pub value: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnumMemberRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        value: Option<Value>,
    },
}

impl From<EnumMemberRepr> for EnumMember {
    fn from(repr: EnumMemberRepr) -> Self {
        match repr {
            EnumMemberRepr::Name(name) => EnumMember { name, value: None },
            EnumMemberRepr::Full { name, value } => EnumMember { name, value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct EnumOptions {
    pub name: String,
    #[serde(default)]
    pub members: Vec<EnumMember>,
    #[serde(default, rename = "const")]
    pub is_const: bool,
    #[serde(default = "yes")]
    pub export: bool,
}

// =============================================================================
// RENDERERS
// =============================================================================

fn export_prefix(export: bool, default_export: bool) -> &'static str {
    if default_export {
        "export default "
    } else if export {
        "export "
    } else {
        ""
    }
}

fn literal(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn param(dialect: Dialect, param: &ParamOptions) -> String {
    let mut out = String::new();
    if param.rest {
        out.push_str("...");
    }
    out.push_str(&param.name);
    if dialect.typed() {
        if param.optional && param.default.is_none() {
            out.push('?');
        }
        if let Some(ty) = &param.ty {
            out.push_str(": ");
            out.push_str(ty);
        }
    }
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(&literal(default));
    }
    out
}

fn params(dialect: Dialect, params: &[ParamOptions]) -> String {
    params.iter().map(|p| param(dialect, p)).collect::<Vec<_>>().join(", ")
}

fn return_annotation(dialect: Dialect, return_type: Option<&str>) -> String {
    match return_type {
        Some(ty) if dialect.typed() => format!(": {ty}"),
        _ => String::new(),
    }
}

/// `{ body }` with the body indented one level, or `{}` when empty.
fn block(script: &Script, body: Option<&str>) -> String {
    match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) => format!("{{\n{}\n}}", indent_lines(body, &script.indent)),
        None => "{}".to_string(),
    }
}

/// A class method, unindented.
pub(super) fn method(script: &Script, options: &MethodOptions) -> String {
    let mut head = String::new();
    if script.dialect.typed() {
        if let Some(access) = options.visibility {
            head.push_str(access.keyword());
            head.push(' ');
        }
    }
    if options.is_static {
        head.push_str("static ");
    }
    if options.is_async {
        head.push_str("async ");
    }
    format!(
        "{head}{}({}){} {}",
        options.name,
        params(script.dialect, &options.params),
        return_annotation(script.dialect, options.return_type.as_deref()),
        block(script, options.body.as_deref()),
    )
}

/// A class field declaration, unindented.
pub(super) fn field(dialect: Dialect, options: &FieldOptions) -> String {
    let mut out = String::new();
    if dialect.typed() {
        if let Some(access) = options.visibility {
            out.push_str(access.keyword());
            out.push(' ');
        }
    }
    if options.is_static {
        out.push_str("static ");
    }
    if dialect.typed() && options.readonly {
        out.push_str("readonly ");
    }
    out.push_str(&options.name);
    if dialect.typed() {
        if options.optional {
            out.push('?');
        }
        if let Some(ty) = &options.ty {
            out.push_str(": ");
            out.push_str(ty);
        }
    }
    if let Some(value) = &options.value {
        out.push_str(" = ");
        out.push_str(&literal(value));
    }
    out.push(';');
    out
}

/// An interface property signature, unindented.
pub(super) fn property_signature(options: &InterfacePropertyOptions) -> String {
    format!(
        "{}{}{}: {};",
        if options.readonly { "readonly " } else { "" },
        options.name,
        if options.optional { "?" } else { "" },
        options.ty.as_deref().unwrap_or("any"),
    )
}

pub(super) fn import(options: &ImportOptions) -> String {
    let mut bindings = Vec::new();
    if let Some(default) = &options.default {
        bindings.push(default.clone());
    }
    if let Some(namespace) = &options.namespace {
        bindings.push(format!("* as {namespace}"));
    }
    if !options.names.is_empty() {
        bindings.push(format!("{{ {} }}", options.names.join(", ")));
    }
    if bindings.is_empty() {
        format!("import '{}';", options.from)
    } else {
        format!("import {} from '{}';", bindings.join(", "), options.from)
    }
}

pub(super) fn class(script: &Script, options: &ClassOptions) -> String {
    let typed = script.dialect.typed();
    let mut head = export_prefix(options.export, options.default_export).to_string();
    if typed && options.is_abstract {
        head.push_str("abstract ");
    }
    head.push_str("class ");
    head.push_str(&options.name);
    if let Some(base) = &options.extends {
        head.push_str(" extends ");
        head.push_str(base);
    }
    if typed && !options.implements.is_empty() {
        head.push_str(" implements ");
        head.push_str(&options.implements.join(", "));
    }

    let mut sections: Vec<String> = Vec::new();
    if !options.fields.is_empty() {
        let fields: Vec<String> = options.fields.iter().map(|f| field(script.dialect, f)).collect();
        sections.push(fields.join("\n"));
    }
    if let Some(constructor_params) = &options.constructor_params {
        let mut body: Vec<String> = Vec::new();
        if options.extends.is_some() {
            body.push("super();".to_string());
        }
        body.extend(constructor_params.iter().map(|p| format!("this.{0} = {0};", p.name)));
        sections.push(format!(
            "constructor({}) {}",
            params(script.dialect, constructor_params),
            block(script, Some(&body.join("\n"))),
        ));
    }
    sections.extend(options.methods.iter().map(|m| method(script, m)));

    if sections.is_empty() {
        return format!("{head} {{}}\n");
    }
    let body = sections
        .iter()
        .map(|section| indent_lines(section, &script.indent))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{head} {{\n{body}\n}}\n")
}

pub(super) fn function(script: &Script, options: &FunctionOptions) -> String {
    format!(
        "{}{}function {}({}){} {}\n",
        export_prefix(options.export, options.default_export),
        if options.is_async { "async " } else { "" },
        options.name,
        params(script.dialect, &options.params),
        return_annotation(script.dialect, options.return_type.as_deref()),
        block(script, options.body.as_deref()),
    )
}

pub(super) fn module(script: &Script, options: &ModuleOptions) -> String {
    let mut sections: Vec<String> = Vec::new();
    if !options.imports.is_empty() {
        sections.push(options.imports.iter().map(import).collect::<Vec<_>>().join("\n"));
    }
    if !options.constants.is_empty() {
        let constants: Vec<String> = options
            .constants
            .iter()
            .map(|c| {
                let annotation = match (&c.ty, script.dialect.typed()) {
                    (Some(ty), true) => format!(": {ty}"),
                    _ => String::new(),
                };
                format!(
                    "{}const {}{annotation} = {};",
                    export_prefix(c.export, false),
                    c.name,
                    literal(&c.value)
                )
            })
            .collect();
        sections.push(constants.join("\n"));
    }
    for f in &options.functions {
        sections.push(function(script, f).trim_end().to_string());
    }
    if let Some(name) = &options.default_export {
        sections.push(format!("export default {name};"));
    }
    if sections.is_empty() {
        return String::new();
    }
    format!("{}\n", sections.join("\n\n"))
}

pub(super) fn interface(script: &Script, options: &InterfaceOptions) -> String {
    let mut head = format!("{}interface {}", export_prefix(options.export, false), options.name);
    if !options.extends.is_empty() {
        head.push_str(" extends ");
        head.push_str(&options.extends.join(", "));
    }
    let mut members: Vec<String> = options.properties.iter().map(property_signature).collect();
    members.extend(options.methods.iter().map(|m| {
        format!(
            "{}({}): {};",
            m.name,
            params(Dialect::TypeScript, &m.params),
            m.return_type.as_deref().unwrap_or("void")
        )
    }));
    if members.is_empty() {
        return format!("{head} {{}}\n");
    }
    format!("{head} {{\n{}\n}}\n", indent_lines(&members.join("\n"), &script.indent))
}

pub(super) fn type_alias(options: &TypeAliasOptions) -> String {
    let generics = if options.type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", options.type_params.join(", "))
    };
    format!(
        "{}type {}{generics} = {};\n",
        export_prefix(options.export, false),
        options.name,
        options.definition.trim().trim_end_matches(';'),
    )
}

pub(super) fn enumeration(script: &Script, options: &EnumOptions) -> String {
    let head = format!(
        "{}{}enum {}",
        export_prefix(options.export, false),
        if options.is_const { "const " } else { "" },
        options.name,
    );
    if options.members.is_empty() {
        return format!("{head} {{}}\n");
    }
    let members: Vec<String> = options
        .members
        .iter()
        .map(|m| match &m.value {
            Some(value) => format!("{} = {},", m.name, literal(value)),
            None => format!("{},", m.name),
        })
        .collect();
    format!("{head} {{\n{}\n}}\n", indent_lines(&members.join("\n"), &script.indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn js() -> Script {
        Script::new(Dialect::JavaScript, "  ")
    }

    fn ts() -> Script {
        Script::new(Dialect::TypeScript, "  ")
    }

    fn options<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn javascript_class() {
        let options: ClassOptions = options(json!({
            "name": "Counter",
            "extends": "Base",
            "constructor_params": ["start"],
            "fields": [{"name": "total", "static": true, "value": 0}],
            "methods": [
                {"name": "increment", "params": [{"name": "by", "default": 1}], "body": "this.start += by;\nreturn this.start;"},
                {"name": "load", "async": true}
            ]
        }));
        let expected = "export class Counter extends Base {
  static total = 0;

  constructor(start) {
    super();
    this.start = start;
  }

  increment(by = 1) {
    this.start += by;
    return this.start;
  }

  async load() {}
}
";
        assert_eq!(class(&js(), &options), expected);
    }

    #[test]
    fn typed_syntax_is_dropped_for_javascript() {
        let options: ClassOptions = options(json!({
            "name": "A",
            "export": false,
            "implements": ["I"],
            "fields": [{"name": "x", "type": "number", "visibility": "private", "readonly": true}]
        }));
        assert_eq!(class(&js(), &options), "class A {\n  x;\n}\n");
        assert_eq!(class(&ts(), &options), "class A implements I {\n  private readonly x: number;\n}\n");
    }

    #[test]
    fn typescript_function() {
        let options: FunctionOptions = options(json!({
            "name": "greet",
            "params": [{"name": "who", "type": "string"}, {"name": "loud", "type": "boolean", "optional": true}],
            "return_type": "string",
            "body": "return `hi ${who}`;"
        }));
        assert_eq!(
            function(&ts(), &options),
            "export function greet(who: string, loud?: boolean): string {\n  return `hi ${who}`;\n}\n"
        );
        assert_eq!(function(&js(), &options), "export function greet(who, loud) {\n  return `hi ${who}`;\n}\n");
    }

    #[test]
    fn null_default_is_rendered() {
        let options: FunctionOptions = options(json!({"name": "f", "params": [{"name": "x", "default": null}], "export": false}));
        assert_eq!(function(&js(), &options), "function f(x = null) {}\n");
    }

    #[test]
    fn module_sections() {
        let options: ModuleOptions = options(json!({
            "imports": [{"from": "fs", "names": ["readFile"]}, {"from": "./setup"}],
            "constants": [{"name": "LIMIT", "value": 10}],
            "functions": [{"name": "run", "export": false}],
            "default_export": "run"
        }));
        let expected = "import { readFile } from 'fs';
import './setup';

export const LIMIT = 10;

function run() {}

export default run;
";
        assert_eq!(module(&js(), &options), expected);
    }

    #[test]
    fn interface_alias_and_enum() {
        let iface: InterfaceOptions = options(json!({
            "name": "User",
            "extends": ["Entity"],
            "properties": [{"name": "id", "type": "number", "readonly": true}, {"name": "nick", "type": "string", "optional": true}],
            "methods": [{"name": "rename", "params": [{"name": "to", "type": "string"}]}]
        }));
        assert_eq!(
            interface(&ts(), &iface),
            "export interface User extends Entity {\n  readonly id: number;\n  nick?: string;\n  rename(to: string): void;\n}\n"
        );

        let alias: TypeAliasOptions = options(json!({"name": "Id", "definition": "string | number"}));
        assert_eq!(type_alias(&alias), "export type Id = string | number;\n");

        let colors: EnumOptions = options(json!({"name": "Color", "members": ["Red", {"name": "Green", "value": "g"}]}));
        assert_eq!(enumeration(&ts(), &colors), "export enum Color {\n  Red,\n  Green = \"g\",\n}\n");
    }

    #[test]
    fn unknown_access_modifier_is_rejected() {
        let result: Result<FieldOptions, _> = serde_json::from_value(json!({"name": "x", "visibility": "internal"}));
        assert!(result.is_err());
    }
}
