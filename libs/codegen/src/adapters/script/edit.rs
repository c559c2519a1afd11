//! Text-splicing edit operations for script sources.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::render::{self, FieldOptions, ImportOptions, InterfacePropertyOptions, MethodOptions};
use super::report::{class_blocks, interface_blocks, last_import_end};
use super::{masked, Block, Dialect, Script};
use crate::adapter::{operation_tag, options};
use crate::adapters::scan;
use crate::error::CodegenError;

#[derive(Debug, Deserialize)]
struct AddMethod {
    #[serde(default)]
    class: Option<String>,
    method: MethodOptions,
}

#[derive(Debug, Deserialize)]
struct Append {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Replace {
    search: String,
    replace: String,
}

#[derive(Debug, Deserialize)]
struct AddProperty {
    #[serde(default)]
    interface: Option<String>,
    #[serde(default)]
    class: Option<String>,
    property: Value,
}

/// Apply `operations` in order, each against the result of the previous one.
pub(super) fn apply(script: &Script, source: &str, operations: &[Value]) -> Result<String, CodegenError> {
    let mut text = source.to_string();
    for operation in operations {
        let tag = operation_tag(operation)?;
        debug!(adapter = script.dialect.name(), operation = tag, "applying edit operation");
        text = match tag {
            "add_method" => add_method(script, &text, options(operation)?)?,
            "add_import" => add_import(&text, &options(operation)?)?,
            "append" => {
                let Append { content } = options(operation)?;
                scan::append_block(&text, &content)
            }
            "replace" => replace(&text, options(operation)?)?,
            "add_property" if script.dialect == Dialect::TypeScript => add_property(script, &text, options(operation)?)?,
            other => {
                return Err(CodegenError::UnknownOperation {
                    adapter: script.dialect.name().to_string(),
                    operation: other.to_string(),
                })
            }
        };
    }
    Ok(text)
}

fn find<'a>(blocks: &'a [Block], name: Option<&str>, kind: &str) -> Result<&'a Block, CodegenError> {
    match name {
        Some(name) => blocks
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| CodegenError::OperationFailed(format!("{kind} '{name}' not found"))),
        None => blocks
            .first()
            .ok_or_else(|| CodegenError::OperationFailed(format!("no {kind} found in source"))),
    }
}

fn add_method(script: &Script, source: &str, op: AddMethod) -> Result<String, CodegenError> {
    let masked = masked(source);
    let classes = class_blocks(source, &masked)?;
    let target = find(&classes, op.class.as_deref(), "class")?;
    let script = matching_indent(script, source, target);
    let method = render::method(&script, &op.method);
    Ok(scan::insert_before_close(source, target.open, target.close, &method, &script.indent))
}

/// `script` with the indent unit the target block already uses.
fn matching_indent(script: &Script, source: &str, target: &Block) -> Script {
    let mut script = script.clone();
    if let Some(unit) = scan::body_indent_unit(source, target.open, target.close) {
        script.indent = unit.to_string();
    }
    script
}

fn add_import(source: &str, op: &ImportOptions) -> Result<String, CodegenError> {
    if op.from.trim().is_empty() {
        return Err(CodegenError::InvalidOptions("add_import needs a non-empty 'from'".to_string()));
    }
    let line = render::import(op);
    let masked = masked(source);
    match last_import_end(&masked)? {
        Some(end) => {
            let eol = source[end..].find('\n').map_or(source.len(), |i| end + i);
            Ok(format!("{}\n{line}{}", &source[..eol], &source[eol..]))
        }
        None if source.trim().is_empty() => Ok(format!("{line}\n")),
        None => Ok(format!("{line}\n\n{}", source.trim_start_matches('\n'))),
    }
}

fn replace(source: &str, op: Replace) -> Result<String, CodegenError> {
    if op.search.is_empty() {
        return Err(CodegenError::InvalidOptions("replace needs a non-empty 'search'".to_string()));
    }
    if !source.contains(&op.search) {
        return Err(CodegenError::OperationFailed(format!("search text '{}' not found", op.search)));
    }
    Ok(source.replace(&op.search, &op.replace))
}

fn add_property(script: &Script, source: &str, op: AddProperty) -> Result<String, CodegenError> {
    let masked = masked(source);
    match (op.interface, op.class) {
        (Some(name), None) => {
            let property: InterfacePropertyOptions = options(&op.property)?;
            let interfaces = interface_blocks(source, &masked)?;
            let target = find(&interfaces, Some(&name), "interface")?;
            let indent = matching_indent(script, source, target).indent;
            let member = render::property_signature(&property);
            Ok(scan::insert_before_close(source, target.open, target.close, &member, &indent))
        }
        (None, Some(name)) => {
            let property: FieldOptions = options(&op.property)?;
            let classes = class_blocks(source, &masked)?;
            let target = find(&classes, Some(&name), "class")?;
            let indent = matching_indent(script, source, target).indent;
            let member = render::field(script.dialect, &property);
            Ok(scan::insert_after_open(source, target.open, target.close, &member, &indent))
        }
        _ => Err(CodegenError::InvalidOptions(
            "add_property needs exactly one of 'interface' or 'class'".to_string(),
        )),
    }
}
