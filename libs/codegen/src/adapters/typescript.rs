//! TypeScript adapter. Shares its engine with the JavaScript adapter and
//! adds typed declarations.

use config::constants::{GeneratorConfig, TYPESCRIPT_EXTENSIONS};
use serde_json::{json, Value};

use super::script::{
    ClassOptions, Dialect, EnumOptions, FunctionOptions, InterfaceOptions, Script, TypeAliasOptions,
};
use crate::adapter::{options, AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
use crate::error::CodegenError;

pub struct TypeScriptAdapter {
    script: Script,
}

impl TypeScriptAdapter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            script: Script::new(Dialect::TypeScript, config.indent_unit()),
        }
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        TYPESCRIPT_EXTENSIONS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with("create", true)
            .with("edit", true)
            .with("analyze", true)
            .with("validate", true)
            .with("types", true)
            .with("format", false)
    }

    fn help(&self) -> AdapterHelp {
        AdapterHelp::new("Generate and edit TypeScript interfaces, classes, type aliases, enums and functions.")
            .option("type", "interface, class (default), type, enum or function")
            .option("name", "declaration name")
            .option("properties", "interface members {name, type, optional, readonly}")
            .option("definition", "right-hand side of a type alias")
            .option("members", "enum members, names or {name, value}")
            .example(json!({
                "type": "interface",
                "name": "User",
                "properties": [{"name": "id", "type": "number", "readonly": true}]
            }))
            .example(json!({"type": "enum", "name": "Color", "members": ["Red", "Green"]}))
    }

    fn create(&self, options_value: &Value) -> Result<Output, CodegenError> {
        let script = &self.script;
        let text = match options_value.get("type").and_then(Value::as_str).unwrap_or("class") {
            "interface" => script.render_interface(&options::<InterfaceOptions>(options_value)?),
            "class" => script.render_class(&options::<ClassOptions>(options_value)?),
            "type" => script.render_type_alias(&options::<TypeAliasOptions>(options_value)?),
            "enum" => script.render_enum(&options::<EnumOptions>(options_value)?),
            "function" => script.render_function(&options::<FunctionOptions>(options_value)?),
            other => {
                return Err(CodegenError::UnknownType {
                    adapter: self.name().to_string(),
                    ty: other.to_string(),
                })
            }
        };
        Ok(Output::text(text))
    }

    fn edit(&self, source: &str, operations: &[Value]) -> Result<Output, CodegenError> {
        self.script.edit(source, operations).map(Output::text)
    }

    fn analyze(&self, source: &str) -> Result<AnalysisReport, CodegenError> {
        self.script.analyze(source).map(AnalysisReport::TypedScript)
    }

    fn validate(&self, source: &str) -> bool {
        self.script.validate(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn adapter() -> TypeScriptAdapter {
        TypeScriptAdapter::new(&GeneratorConfig::default())
    }

    #[test]
    fn class_with_typed_members() {
        let out = adapter()
            .create(&json!({
                "type": "class",
                "name": "Account",
                "implements": ["Entity"],
                "fields": [{"name": "balance", "type": "number", "visibility": "private", "value": 0}],
                "methods": [{"name": "deposit", "visibility": "public", "params": [{"name": "amount", "type": "number"}], "return_type": "void", "body": "this.balance += amount;"}]
            }))
            .unwrap();
        let expected = "export class Account implements Entity {
    private balance: number = 0;

    public deposit(amount: number): void {
        this.balance += amount;
    }
}
";
        assert_eq!(out.text, expected);
    }

    #[test]
    fn module_is_javascript_only() {
        let err = adapter().create(&json!({"type": "module"})).unwrap_err();
        assert!(matches!(err, CodegenError::UnknownType { .. }));
    }

    #[test]
    fn type_alias_requires_definition() {
        let err = adapter().create(&json!({"type": "type", "name": "Id"})).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidOptions(_)));
    }

    #[test]
    fn report_carries_typed_declarations() {
        let adapter = adapter();
        let mut source = adapter.create(&json!({"type": "interface", "name": "Named"})).unwrap().text;
        source.push_str(&adapter.create(&json!({"type": "enum", "name": "Kind", "members": ["A"]})).unwrap().text);
        let report = adapter.analyze(&source).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["language"], "typescript");
        assert_eq!(json["interfaces"][0]["name"], "Named");
        assert_eq!(json["enums"][0], "Kind");
        assert_eq!(json["exports"], json!(["Named", "Kind"]));
    }

    #[test]
    fn add_property_then_method() {
        let adapter = adapter();
        let out = adapter
            .edit(
                "interface Shape {}\n\nclass Circle implements Shape {}\n",
                &[
                    json!({"type": "add_property", "interface": "Shape", "property": {"name": "area", "type": "number", "readonly": true}}),
                    json!({"type": "add_method", "class": "Circle", "method": {"name": "grow", "return_type": "void"}}),
                ],
            )
            .unwrap();
        assert_eq!(
            out.text,
            "interface Shape {\n    readonly area: number;\n}\n\nclass Circle implements Shape {\n    grow(): void {}\n}\n"
        );
    }
}
