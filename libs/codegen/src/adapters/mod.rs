//! Built-in language adapters.

pub mod css;
pub mod javascript;
pub mod json;
pub mod php;
pub(crate) mod scan;
pub mod script;
pub mod typescript;

use config::constants::GeneratorConfig;

use crate::adapter::LanguageAdapter;

pub use css::CssAdapter;
pub use javascript::JavaScriptAdapter;
pub use json::JsonAdapter;
pub use php::PhpAdapter;
pub use typescript::TypeScriptAdapter;

/// One instance of every built-in adapter.
pub fn default_adapters(config: &GeneratorConfig) -> Vec<Box<dyn LanguageAdapter>> {
    vec![
        Box::new(PhpAdapter::new(config)),
        Box::new(JavaScriptAdapter::new(config)),
        Box::new(TypeScriptAdapter::new(config)),
        Box::new(CssAdapter::new(config)),
        Box::new(JsonAdapter::new(config)),
    ]
}
