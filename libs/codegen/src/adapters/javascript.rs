//! JavaScript adapter.

use config::constants::{GeneratorConfig, JAVASCRIPT_EXTENSIONS};
use serde_json::{json, Value};

use super::script::{ClassOptions, Dialect, FunctionOptions, ModuleOptions, Script};
use crate::adapter::{options, AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
use crate::error::CodegenError;

pub struct JavaScriptAdapter {
    script: Script,
}

impl JavaScriptAdapter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            script: Script::new(Dialect::JavaScript, config.indent_unit()),
        }
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        JAVASCRIPT_EXTENSIONS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with("create", true)
            .with("edit", true)
            .with("analyze", true)
            .with("validate", true)
            .with("format", false)
    }

    fn help(&self) -> AdapterHelp {
        AdapterHelp::new("Generate and edit JavaScript classes, functions and modules.")
            .option("type", "class (default), function or module")
            .option("name", "class or function name")
            .option("export", "prefix the declaration with `export` (default true)")
            .option("default_export", "emit `export default` instead")
            .option("methods", "list of {name, params, body, static, async}")
            .example(json!({"type": "class", "name": "Greeter", "methods": [{"name": "greet", "body": "return 'hi';"}]}))
            .example(json!({"type": "function", "name": "sum", "params": ["a", "b"], "body": "return a + b;"}))
    }

    fn create(&self, options_value: &Value) -> Result<Output, CodegenError> {
        let text = match options_value.get("type").and_then(Value::as_str).unwrap_or("class") {
            "class" => self.script.render_class(&options::<ClassOptions>(options_value)?),
            "function" => self.script.render_function(&options::<FunctionOptions>(options_value)?),
            "module" => self.script.render_module(&options::<ModuleOptions>(options_value)?),
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
        self.script.analyze(source).map(AnalysisReport::Script)
    }

    fn validate(&self, source: &str) -> bool {
        self.script.validate(source)
    }
}
