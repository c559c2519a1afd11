//! # Edit Operation Dispatcher
//!
//! Applies an ordered list of operations to the first class in a tree.
//!
//! Operations run strictly in order and each one sees the tree left by the
//! ones before it, so `replace_method` can target a method added earlier in
//! the same list. Every operation looks the class up again. The first
//! failure aborts the whole call.
//!
//! ## Example
//!
//! ```rust
//! use php_edit::edit::{edit_source, EditOperation};
//! use serde_json::json;
//!
//! let ops = [EditOperation::from_json(&json!({
//!     "type": "add_method",
//!     "method": {"name": "id", "return_type": "int", "body": "return 1;"}
//! })).unwrap()];
//! let edited = edit_source("<?php class A {}", &ops).unwrap();
//! assert!(edited.text.contains("public function id(): int"));
//! ```

use crate::builder::spec::{from_json, MethodSpec, PropertySpec};
use crate::builder::{build_method, build_property};
use crate::error::EditError;
use crate::query::{first_class_mut, first_method_block_index, method_index};
use php_ast::{print_with, Ast, ClassMember, Diagnostic, PrintOptions};
use serde_json::{Map, Value};
use tracing::debug;

/// One structural edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Append a method to the class body.
    AddMethod { method: MethodSpec },
    /// Insert a property before the first method, or append it.
    AddProperty { property: PropertySpec },
    /// Replace the named method in place.
    ReplaceMethod { method_name: String, method: MethodSpec },
}

impl EditOperation {
    /// The `type` tag of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::AddMethod { .. } => "add_method",
            EditOperation::AddProperty { .. } => "add_property",
            EditOperation::ReplaceMethod { .. } => "replace_method",
        }
    }

    /// Decode `{"type": ..., ...}`.
    ///
    /// ## Errors
    ///
    /// - [`EditError::InvalidOperation`]: not an object, no string `type`,
    ///   or a required field is missing
    /// - [`EditError::UnknownOperation`]: the tag is not a known operation
    /// - [`EditError::InvalidDescriptor`]: the embedded descriptor is malformed
    pub fn from_json(value: &Value) -> Result<Self, EditError> {
        let obj = value
            .as_object()
            .ok_or_else(|| EditError::InvalidOperation("operation must be an object".to_string()))?;
        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EditError::InvalidOperation("operation needs a string 'type'".to_string()))?;

        match tag {
            "add_method" => Ok(EditOperation::AddMethod {
                method: from_json(field(obj, tag, "method")?)?,
            }),
            "add_property" => Ok(EditOperation::AddProperty {
                property: from_json(field(obj, tag, "property")?)?,
            }),
            "replace_method" => {
                let method_name = field(obj, tag, "method_name")?
                    .as_str()
                    .ok_or_else(|| EditError::InvalidOperation("'method_name' must be a string".to_string()))?
                    .to_string();
                Ok(EditOperation::ReplaceMethod {
                    method_name,
                    method: from_json(field(obj, tag, "method")?)?,
                })
            }
            other => Err(EditError::UnknownOperation(other.to_string())),
        }
    }

    /// Decode a whole list. Nothing is applied when any entry is bad.
    pub fn from_json_list(values: &[Value]) -> Result<Vec<Self>, EditError> {
        values.iter().map(Self::from_json).collect()
    }
}

fn field<'a>(obj: &'a Map<String, Value>, tag: &str, key: &str) -> Result<&'a Value, EditError> {
    obj.get(key)
        .ok_or_else(|| EditError::InvalidOperation(format!("'{tag}' requires '{key}'")))
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Apply `ops` to `ast` in order.
///
/// ## Returns
///
/// Warnings collected while building members.
pub fn apply(ast: &mut Ast, ops: &[EditOperation]) -> Result<Vec<Diagnostic>, EditError> {
    let mut warnings = Vec::new();
    for op in ops {
        debug!(operation = op.name(), "applying edit operation");
        warnings.extend(apply_one(ast, op)?);
    }
    Ok(warnings)
}

fn apply_one(ast: &mut Ast, op: &EditOperation) -> Result<Vec<Diagnostic>, EditError> {
    let class = first_class_mut(ast).ok_or(EditError::NoClass)?;

    match op {
        EditOperation::AddMethod { method } => {
            let built = build_method(method)?;
            class.members.push(ClassMember::Method(built.node));
            Ok(built.warnings)
        }
        EditOperation::AddProperty { property } => {
            let built = build_property(property)?;
            let member = ClassMember::Property(built.node);
            match first_method_block_index(class) {
                Some(index) => class.members.insert(index, member),
                None => class.members.push(member),
            }
            Ok(built.warnings)
        }
        EditOperation::ReplaceMethod { method_name, method } => {
            let index = method_index(class, method_name).ok_or_else(|| EditError::MethodNotFound {
                class: class.name.clone(),
                method: method_name.clone(),
            })?;
            let built = build_method(method)?;
            class.members[index] = ClassMember::Method(built.node);
            Ok(built.warnings)
        }
    }
}

/// Result of [`edit_source`].
#[derive(Debug, Clone, PartialEq)]
pub struct Edited {
    pub text: String,
    pub warnings: Vec<Diagnostic>,
}

/// Parse, edit and print. The source is never partially edited.
pub fn edit_source(source: &str, ops: &[EditOperation]) -> Result<Edited, EditError> {
    edit_source_with(source, ops, &PrintOptions::default())
}

/// [`edit_source`] with explicit printer options.
pub fn edit_source_with(source: &str, ops: &[EditOperation], options: &PrintOptions) -> Result<Edited, EditError> {
    let mut ast = php_parser::parse(source)?;
    let warnings = apply(&mut ast, ops)?;
    Ok(Edited {
        text: print_with(&ast, options),
        warnings,
    })
}
