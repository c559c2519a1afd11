//! Extension → adapter lookup, fixed at construction.

use std::collections::{BTreeMap, BTreeSet};

use config::constants::{normalize_extension, GeneratorConfig};

use crate::adapter::LanguageAdapter;
use crate::adapters::default_adapters;
use crate::error::CodegenError;

/// Immutable map from normalized extension to adapter.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn LanguageAdapter>>,
    by_extension: BTreeMap<String, usize>,
}

impl AdapterRegistry {
    /// Build from `adapters`. Two adapters claiming one extension is an error.
    pub fn new(adapters: Vec<Box<dyn LanguageAdapter>>) -> Result<Self, CodegenError> {
        let mut by_extension: BTreeMap<String, usize> = BTreeMap::new();
        for (index, adapter) in adapters.iter().enumerate() {
            for extension in adapter.extensions() {
                let extension = normalize_extension(extension);
                if let Some(&existing) = by_extension.get(&extension) {
                    let first: &dyn LanguageAdapter = adapters[existing].as_ref();
                    return Err(CodegenError::DuplicateExtension {
                        extension,
                        first: first.name().to_string(),
                        second: adapter.name().to_string(),
                    });
                }
                by_extension.insert(extension, index);
            }
        }
        Ok(Self { adapters, by_extension })
    }

    /// Registry of the built-in adapters.
    pub fn with_defaults(config: &GeneratorConfig) -> Result<Self, CodegenError> {
        Self::new(default_adapters(config))
    }

    /// Adapter for `extension`, with or without a leading dot, any case.
    pub fn get(&self, extension: &str) -> Option<&dyn LanguageAdapter> {
        self.by_extension
            .get(&normalize_extension(extension))
            .map(|&index| self.adapters[index].as_ref())
    }

    pub fn extensions(&self) -> BTreeSet<String> {
        self.by_extension.keys().cloned().collect()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn LanguageAdapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.by_extension.iter().map(|(ext, &i)| (ext, self.adapters[i].name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{AdapterHelp, AnalysisReport, Capabilities, Output};
    use serde_json::Value;

    struct Fake(&'static str, &'static [&'static str]);

    impl LanguageAdapter for Fake {
        fn name(&self) -> &'static str {
            self.0
        }
        fn extensions(&self) -> &'static [&'static str] {
            self.1
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities::new()
        }
        fn help(&self) -> AdapterHelp {
            AdapterHelp::new("fake")
        }
        fn create(&self, _: &Value) -> Result<Output, CodegenError> {
            Ok(Output::default())
        }
        fn edit(&self, source: &str, _: &[Value]) -> Result<Output, CodegenError> {
            Ok(Output::text(source))
        }
        fn analyze(&self, _: &str) -> Result<AnalysisReport, CodegenError> {
            Err(CodegenError::OperationFailed("fake".into()))
        }
        fn validate(&self, _: &str) -> bool {
            true
        }
    }

    #[test]
    fn lookup_normalizes_extension() {
        let registry = AdapterRegistry::new(vec![Box::new(Fake("a", &["md", "markdown"]))]).unwrap();
        assert_eq!(registry.get(".MD").map(|a| a.name()), Some("a"));
        assert!(registry.get("txt").is_none());
        assert_eq!(registry.extensions().len(), 2);
    }

    #[test]
    fn defaults_cover_every_language() {
        let registry = AdapterRegistry::with_defaults(&GeneratorConfig::default()).unwrap();
        for (ext, name) in [("php", "php"), ("mjs", "javascript"), ("tsx", "typescript"), ("css", "css"), ("json", "json")] {
            assert_eq!(registry.get(ext).map(|a| a.name()), Some(name));
        }
        assert_eq!(registry.adapters().count(), 5);
    }

    #[test]
    fn duplicate_extension_is_rejected() {
        let err = AdapterRegistry::new(vec![Box::new(Fake("a", &["x"])), Box::new(Fake("b", &["X"]))]).unwrap_err();
        match err {
            CodegenError::DuplicateExtension { extension, first, second } => {
                assert_eq!((extension.as_str(), first.as_str(), second.as_str()), ("x", "a", "b"));
            }
            other => panic!("expected duplicate, got {other:?}"),
        }
    }
}
