//! PHP adapter: a thin shell over the `php-edit` engine.

use config::constants::{GeneratorConfig, PHP_EXTENSIONS};
use php_ast::{print_with, PrintOptions};
use php_edit::{analyze_source, build_file, edit::edit_source_with, is_syntactically_valid, EditError, EditOperation};
use serde_json::{json, Value};

use crate::adapter::{AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
use crate::error::CodegenError;

pub struct PhpAdapter {
    print_options: PrintOptions,
}

impl PhpAdapter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            print_options: PrintOptions::with_indent_width(config.indent_width),
        }
    }
}

impl LanguageAdapter for PhpAdapter {
    fn name(&self) -> &'static str {
        "php"
    }

    fn extensions(&self) -> &'static [&'static str] {
        PHP_EXTENSIONS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with("create", true)
            .with("edit", true)
            .with("analyze", true)
            .with("validate", true)
            .with("ast", true)
            .with("format", true)
    }

    fn help(&self) -> AdapterHelp {
        AdapterHelp::new("Generate PHP classes, interfaces and traits; edit classes through the syntax tree.")
            .option("type", "class (default), interface or trait")
            .option("name", "declaration name")
            .option("namespace", "namespace for the file")
            .option("uses", "imports, optionally `Name as Alias`")
            .option("properties", "list of {name, visibility, static, readonly, type, default}")
            .option("methods", "list of {name, visibility, static, abstract, final, parameters, return_type, body}")
            .option("strict_types", "emit declare(strict_types=1)")
            .example(json!({
                "type": "class",
                "name": "User",
                "namespace": "App\\Models",
                "properties": [{"name": "name", "type": "string", "visibility": "protected"}],
                "methods": [{"name": "getName", "return_type": "string", "body": "return $this->name;"}]
            }))
    }

    fn create(&self, options: &Value) -> Result<Output, CodegenError> {
        let built = build_file(options).map_err(|error| match error {
            EditError::UnknownCreateType(ty) => CodegenError::UnknownType {
                adapter: self.name().to_string(),
                ty,
            },
            other => other.into(),
        })?;
        Ok(Output::text(print_with(&built.node, &self.print_options)).with_warnings(built.warnings))
    }

    fn edit(&self, source: &str, operations: &[Value]) -> Result<Output, CodegenError> {
        let operations = EditOperation::from_json_list(operations)?;
        let edited = edit_source_with(source, &operations, &self.print_options)?;
        Ok(Output::text(edited.text).with_warnings(edited.warnings))
    }

    fn analyze(&self, source: &str) -> Result<AnalysisReport, CodegenError> {
        Ok(AnalysisReport::Php(analyze_source(source)?))
    }

    fn validate(&self, source: &str) -> bool {
        is_syntactically_valid(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use php_ast::Severity;

    fn adapter() -> PhpAdapter {
        PhpAdapter::new(&GeneratorConfig::default())
    }

    #[test]
    fn create_unknown_type_is_fatal() {
        let err = adapter().create(&json!({"type": "enum", "name": "Suit"})).unwrap_err();
        match err {
            CodegenError::UnknownType { adapter, ty } => {
                assert_eq!(adapter, "php");
                assert_eq!(ty, "enum");
            }
            other => panic!("expected unknown type, got {other:?}"),
        }
    }

    #[test]
    fn create_reports_snippet_warnings() {
        let out = adapter()
            .create(&json!({"name": "A", "methods": [{"name": "broken", "body": "return (;"}]}))
            .unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].severity, Severity::Warning);
        assert!(adapter().validate(&out.text));
    }

    #[test]
    fn indent_follows_config() {
        let adapter = PhpAdapter::new(&GeneratorConfig::new(2, 1024).unwrap());
        let out = adapter.create(&json!({"name": "A", "methods": [{"name": "f"}]})).unwrap();
        assert!(out.text.contains("\n  public function f()\n  {\n  }\n"));
    }

    #[test]
    fn edit_errors_surface_as_engine_errors() {
        let err = adapter()
            .edit("<?php class A {}", &[json!({"type": "rename"})])
            .unwrap_err();
        assert!(matches!(err, CodegenError::Edit(EditError::UnknownOperation(_))));
    }

    #[test]
    fn analyze_is_tagged_php() {
        let report = adapter().analyze("<?php class A { public function f() {} }").unwrap();
        assert_eq!(report.as_php().unwrap().classes[0].name, "A");
    }
}
