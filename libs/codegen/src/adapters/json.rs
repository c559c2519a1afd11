//! # JSON Adapter
//!
//! Documents are edited as `serde_json::Value` trees and printed back with
//! the indentation detected in the source. Object key order survives both
//! directions (`preserve_order`).
//!
//! Paths are dot-separated. A segment that addresses an array must be a
//! decimal index; an index equal to the array length appends.

use config::constants::{GeneratorConfig, JSON_DEFAULT_INDENT, JSON_EXTENSIONS};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::adapter::{operation_tag, options, AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
use crate::error::CodegenError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct JsonReport {
    /// `object`, `array`, `string`, `number`, `boolean` or `null`.
    pub root_type: String,
    pub top_level_keys: Vec<String>,
    /// Container nesting; a scalar document has depth 0.
    pub max_depth: usize,
    /// Keys across every object in the document.
    pub key_count: usize,
}

#[derive(Debug, Deserialize)]
struct PathValue {
    path: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct PathOnly {
    path: String,
}

#[derive(Debug, Deserialize)]
struct MergeValue {
    value: Value,
}

pub struct JsonAdapter {
    default_indent: usize,
}

impl JsonAdapter {
    pub fn new(_config: &GeneratorConfig) -> Self {
        Self {
            default_indent: JSON_DEFAULT_INDENT,
        }
    }
}

impl LanguageAdapter for JsonAdapter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        JSON_EXTENSIONS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with("create", true)
            .with("edit", true)
            .with("analyze", true)
            .with("validate", true)
            .with("preserve_key_order", true)
    }

    fn help(&self) -> AdapterHelp {
        AdapterHelp::new("Generate and edit JSON documents addressed by dot paths.")
            .option("data", "the document to write (required)")
            .option("indent", "spaces per level, default 4")
            .example(json!({"data": {"name": "demo", "version": "1.0.0"}, "indent": 2}))
    }

    fn create(&self, options_value: &Value) -> Result<Output, CodegenError> {
        let data = options_value
            .get("data")
            .ok_or_else(|| CodegenError::InvalidOptions("json create needs 'data'".to_string()))?;
        let indent = match options_value.get("indent") {
            None | Some(Value::Null) => self.default_indent,
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| CodegenError::InvalidOptions("'indent' must be a non-negative integer".to_string()))?,
        };
        Ok(Output::text(to_pretty(data, &" ".repeat(indent))?))
    }

    fn edit(&self, source: &str, operations: &[Value]) -> Result<Output, CodegenError> {
        let mut document: Value = serde_json::from_str(source)?;
        for operation in operations {
            let tag = operation_tag(operation)?;
            debug!(adapter = "json", operation = tag, "applying edit operation");
            match tag {
                "set" => {
                    let PathValue { path, value } = options(operation)?;
                    set(&mut document, &segments(&path)?, value)?;
                }
                "remove" => {
                    let PathOnly { path } = options(operation)?;
                    remove(&mut document, &segments(&path)?);
                }
                "merge" => {
                    let MergeValue { value } = options(operation)?;
                    match (&mut document, value) {
                        (Value::Object(target), Value::Object(patch)) => merge(target, patch),
                        _ => {
                            return Err(CodegenError::OperationFailed(
                                "merge needs an object document and an object value".to_string(),
                            ))
                        }
                    }
                }
                "push" => {
                    let PathValue { path, value } = options(operation)?;
                    push(&mut document, &segments(&path)?, value)?;
                }
                other => {
                    return Err(CodegenError::UnknownOperation {
                        adapter: self.name().to_string(),
                        operation: other.to_string(),
                    })
                }
            }
        }
        Ok(Output::text(to_pretty(&document, &detect_indent(source, self.default_indent))?))
    }

    fn analyze(&self, source: &str) -> Result<AnalysisReport, CodegenError> {
        let document: Value = serde_json::from_str(source)?;
        Ok(AnalysisReport::Json(JsonReport {
            root_type: type_name(&document).to_string(),
            top_level_keys: document
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default(),
            max_depth: depth(&document),
            key_count: key_count(&document),
        }))
    }

    fn validate(&self, source: &str) -> bool {
        serde_json::from_str::<Value>(source).is_ok()
    }
}

// =============================================================================
// PRINTING
// =============================================================================

fn to_pretty(value: &Value, indent: &str) -> Result<String, CodegenError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    let mut text = String::from_utf8(buffer).map_err(|e| CodegenError::OperationFailed(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

/// Indent unit of the first indented line, else `default` spaces.
fn detect_indent(source: &str, default: usize) -> String {
    source
        .lines()
        .skip(1)
        .find_map(|line| {
            let unit: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            (!unit.is_empty() && !line.trim().is_empty()).then_some(unit)
        })
        .unwrap_or_else(|| " ".repeat(default))
}

// =============================================================================
// PATHS
// =============================================================================

fn segments(path: &str) -> Result<Vec<&str>, CodegenError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(CodegenError::InvalidOptions(format!("invalid path '{path}'")));
    }
    Ok(parts)
}

fn index(segment: &str, len: usize) -> Result<usize, CodegenError> {
    let index: usize = segment
        .parse()
        .map_err(|_| CodegenError::OperationFailed(format!("'{segment}' is not an array index")))?;
    if index > len {
        return Err(CodegenError::OperationFailed(format!(
            "index {index} is past the end of an array of length {len}"
        )));
    }
    Ok(index)
}

/// Descend one segment, creating an empty object when nothing is there.
fn child_or_create<'a>(node: &'a mut Value, segment: &str) -> Result<&'a mut Value, CodegenError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => Ok(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let at = index(segment, items.len())?;
            if at == items.len() {
                items.push(Value::Null);
            }
            Ok(&mut items[at])
        }
        other => Err(CodegenError::OperationFailed(format!(
            "cannot descend into {} at '{segment}'",
            type_name(other)
        ))),
    }
}

fn set(document: &mut Value, path: &[&str], value: Value) -> Result<(), CodegenError> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| CodegenError::InvalidOptions("empty path".to_string()))?;
    let mut node = document;
    for segment in parents {
        node = child_or_create(node, segment)?;
    }
    *child_or_create(node, last)? = value;
    Ok(())
}

fn push(document: &mut Value, path: &[&str], value: Value) -> Result<(), CodegenError> {
    let mut node = document;
    for segment in path {
        node = child_or_create(node, segment)?;
    }
    if node.is_null() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(items) => {
            items.push(value);
            Ok(())
        }
        other => Err(CodegenError::OperationFailed(format!(
            "cannot push onto {}",
            type_name(other)
        ))),
    }
}

/// Remove the addressed entry. A path that does not resolve is left alone.
fn remove(document: &mut Value, path: &[&str]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = document;
    for segment in parents {
        let next = match node {
            Value::Object(map) => map.get_mut(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return,
        }
    }
    match node {
        Value::Object(map) => {
            map.shift_remove(*last);
        }
        Value::Array(items) => {
            if let Some(i) = last.parse::<usize>().ok().filter(|i| *i < items.len()) {
                items.remove(i);
            }
        }
        _ => {}
    }
}

/// Deep merge: nested objects merge, everything else is replaced.
fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn key_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len() + map.values().map(key_count).sum::<usize>(),
        Value::Array(items) => items.iter().map(key_count).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn adapter() -> JsonAdapter {
        JsonAdapter::new(&GeneratorConfig::default())
    }

    #[test]
    fn create_uses_requested_indent() {
        let out = adapter().create(&json!({"data": {"b": 1, "a": [true]}, "indent": 2})).unwrap();
        assert_eq!(out.text, "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}\n");
    }

    #[test]
    fn create_requires_data() {
        let err = adapter().create(&json!({"indent": 2})).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidOptions(_)));
        assert_eq!(adapter().create(&json!({"data": null})).unwrap().text, "null\n");
    }

    #[test]
    fn edit_keeps_source_indent() {
        let out = adapter()
            .edit("{\n  \"a\": 1\n}", &[json!({"type": "set", "path": "b", "value": 2})])
            .unwrap();
        assert_eq!(out.text, "{\n  \"a\": 1,\n  \"b\": 2\n}\n");
    }

    #[test]
    fn set_through_scalar_fails() {
        let err = adapter()
            .edit("{\"a\": 1}", &[json!({"type": "set", "path": "a.b", "value": 2})])
            .unwrap_err();
        assert!(matches!(err, CodegenError::OperationFailed(_)));
    }

    #[test]
    fn array_indices() {
        let mut doc = json!({"list": [1, 2]});
        set(&mut doc, &["list", "0"], json!(10)).unwrap();
        set(&mut doc, &["list", "2"], json!(3)).unwrap();
        assert_eq!(doc, json!({"list": [10, 2, 3]}));
        assert!(set(&mut doc, &["list", "9"], json!(0)).is_err());
        assert!(set(&mut doc, &["list", "x"], json!(0)).is_err());
    }

    #[test]
    fn report_counts() {
        let report = adapter().analyze(r#"{"a": {"b": [{"c": 1}]}, "d": 2}"#).unwrap();
        let json = report.as_json().unwrap();
        assert_eq!(json.root_type, "object");
        assert_eq!(json.top_level_keys, vec!["a", "d"]);
        assert_eq!(json.max_depth, 4);
        assert_eq!(json.key_count, 4);
    }

    #[test]
    fn validation() {
        assert!(adapter().validate("[1, 2]"));
        assert!(!adapter().validate("{\"a\": }"));
        assert!(!adapter().validate(""));
    }
}
