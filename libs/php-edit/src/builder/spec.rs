//! # Descriptors
//!
//! Declarative records the builder turns into syntax tree nodes. All are
//! deserialized from JSON with snake_case keys.
//!
//! A `default` key that is absent means "no default" while `"default": null`
//! means "defaults to `null`"; the two print differently.
//!
//! ```rust
//! use php_edit::builder::spec::{from_json, ParameterSpec};
//! use serde_json::json;
//!
//! let required: ParameterSpec = from_json(&json!({"name": "x", "type": "string"})).unwrap();
//! let optional: ParameterSpec = from_json(&json!({"name": "x", "type": "string", "default": null})).unwrap();
//! assert_eq!(required.default, None);
//! assert_eq!(optional.default, Some(serde_json::Value::Null));
//! ```

use crate::error::EditError;
use php_ast::Visibility;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a descriptor, mapping failures to [`EditError::InvalidDescriptor`].
pub fn from_json<T: DeserializeOwned>(value: &Value) -> Result<T, EditError> {
    serde_json::from_value(value.clone()).map_err(EditError::invalid_descriptor)
}

/// A key that is present, even with `null`, becomes `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub by_ref: bool,
    #[serde(default)]
    pub variadic: bool,
    /// Constructor promotion with this visibility.
    #[serde(default)]
    pub promote: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default, alias = "params")]
    pub parameters: Vec<ParameterSpec>,
    /// Statements without an open tag. Absent means an empty body.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConstantSpec {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ClassSpec {
    pub name: String,
    pub namespace: Option<String>,
    pub uses: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    #[serde(rename = "final")]
    pub is_final: bool,
    pub traits: Vec<String>,
    pub constants: Vec<ConstantSpec>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<MethodSpec>,
    pub doc_comment: Option<String>,
    /// Emit `declare(strict_types=1);`.
    pub strict_types: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct InterfaceSpec {
    pub name: String,
    pub namespace: Option<String>,
    pub uses: Vec<String>,
    pub extends: Vec<String>,
    pub constants: Vec<ConstantSpec>,
    pub methods: Vec<MethodSpec>,
    pub doc_comment: Option<String>,
    pub strict_types: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TraitSpec {
    pub name: String,
    pub namespace: Option<String>,
    pub uses: Vec<String>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<MethodSpec>,
    pub doc_comment: Option<String>,
    pub strict_types: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_defaults() {
        let spec: MethodSpec = from_json(&json!({"name": "run"})).unwrap();
        assert_eq!(spec.visibility, Visibility::Public);
        assert!(!spec.is_static);
        assert!(spec.body.is_none());
        assert!(spec.parameters.is_empty());
    }

    #[test]
    fn unknown_visibility_is_rejected() {
        let err = from_json::<MethodSpec>(&json!({"name": "run", "visibility": "internal"})).unwrap_err();
        assert!(matches!(err, EditError::InvalidDescriptor(_)));
    }

    #[test]
    fn missing_name_is_rejected() {
        assert!(from_json::<PropertySpec>(&json!({"type": "int"})).is_err());
    }

    #[test]
    fn property_default_presence() {
        let absent: PropertySpec = from_json(&json!({"name": "a"})).unwrap();
        let null: PropertySpec = from_json(&json!({"name": "a", "default": null})).unwrap();
        assert_eq!(absent.default, None);
        assert_eq!(null.default, Some(Value::Null));
    }

    #[test]
    fn class_spec_reads_flags() {
        let spec: ClassSpec = from_json(&json!({
            "name": "Base",
            "abstract": true,
            "implements": ["A", "B"],
            "methods": [{"name": "f", "params": [{"name": "x"}]}]
        }))
        .unwrap();
        assert!(spec.is_abstract);
        assert_eq!(spec.implements.len(), 2);
        assert_eq!(spec.methods[0].parameters[0].name, "x");
    }
}
