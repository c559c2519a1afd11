//! # Language Adapter
//!
//! The contract every language implements: create, edit, analyze and
//! validate over in-memory text. Adapters never touch the filesystem and
//! hold no mutable state, so one instance serves every call.

use std::collections::BTreeMap;

use php_ast::Diagnostic;
use php_edit::FileReport;
use serde::Serialize;
use serde_json::Value;

use crate::adapters::css::CssReport;
use crate::adapters::json::JsonReport;
use crate::adapters::script::ScriptReport;
use crate::error::CodegenError;

/// One language implementation.
pub trait LanguageAdapter: Send + Sync {
    /// Short lower-case name, such as `php`.
    fn name(&self) -> &'static str;

    /// Extensions this adapter claims, lower-case without a dot.
    fn extensions(&self) -> &'static [&'static str];

    fn version(&self) -> &'static str {
        config::constants::ADAPTER_VERSION
    }

    /// Descriptive feature flags. Not consulted during dispatch.
    fn capabilities(&self) -> Capabilities;

    fn help(&self) -> AdapterHelp;

    /// Generate new source from an option record.
    fn create(&self, options: &Value) -> Result<Output, CodegenError>;

    /// Apply `operations` in order. The first failure aborts the call.
    fn edit(&self, source: &str, operations: &[Value]) -> Result<Output, CodegenError>;

    fn analyze(&self, source: &str) -> Result<AnalysisReport, CodegenError>;

    /// Syntax acceptance. Never panics.
    fn validate(&self, source: &str) -> bool;
}

// =============================================================================
// RESULTS
// =============================================================================

/// Generated or edited text plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Output {
    pub text: String,
    pub warnings: Vec<Diagnostic>,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Diagnostic>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Structural facts about one file, shaped by its language.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "language", rename_all = "lowercase")]
pub enum AnalysisReport {
    Php(FileReport),
    #[serde(rename = "javascript")]
    Script(ScriptReport),
    #[serde(rename = "typescript")]
    TypedScript(ScriptReport),
    Css(CssReport),
    Json(JsonReport),
}

impl AnalysisReport {
    pub fn as_php(&self) -> Option<&FileReport> {
        match self {
            AnalysisReport::Php(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptReport> {
        match self {
            AnalysisReport::Script(report) | AnalysisReport::TypedScript(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_css(&self) -> Option<&CssReport> {
        match self {
            AnalysisReport::Css(report) => Some(report),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonReport> {
        match self {
            AnalysisReport::Json(report) => Some(report),
            _ => None,
        }
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Named feature flags in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities(BTreeMap<&'static str, bool>);

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: &'static str, enabled: bool) -> Self {
        self.0.insert(feature, enabled);
        self
    }

    pub fn supports(&self, feature: &str) -> bool {
        self.0.get(feature).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Usage documentation for one adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterHelp {
    pub description: String,
    /// Sample option records for `create`.
    pub examples: Vec<Value>,
    /// Option key → meaning.
    pub options: BTreeMap<String, String>,
}

impl AdapterHelp {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            examples: Vec::new(),
            options: BTreeMap::new(),
        }
    }

    pub fn example(mut self, example: Value) -> Self {
        self.examples.push(example);
        self
    }

    pub fn option(mut self, key: &str, meaning: &str) -> Self {
        self.options.insert(key.to_string(), meaning.to_string());
        self
    }
}

/// Deserialize an option record, mapping failures to `InvalidOptions`.
pub(crate) fn options<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, CodegenError> {
    serde_json::from_value(value.clone()).map_err(CodegenError::invalid_options)
}

/// The `type` tag of an edit operation.
pub(crate) fn operation_tag(operation: &Value) -> Result<&str, CodegenError> {
    operation
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CodegenError::InvalidOptions("operation needs a string 'type'".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_default_to_false() {
        let caps = Capabilities::new().with("create", true);
        assert!(caps.supports("create"));
        assert!(!caps.supports("format"));
    }

    #[test]
    fn report_is_tagged_by_language() {
        let report = AnalysisReport::Php(FileReport::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["language"], "php");
        assert!(json["classes"].is_array());
    }
}
