//! # Code Generator
//!
//! The path-addressed façade. Every call picks an adapter from the path's
//! extension, and this is the only layer that touches the filesystem.
//!
//! ## Errors
//!
//! Input problems are fatal and returned as [`CodegenError`]. Two
//! operations answer with a plain flag instead:
//!
//! - [`CodeGenerator::write`] and [`CodeGenerator::edit_file`] return
//!   `Ok(false)` when the final write fails;
//! - [`CodeGenerator::validate`] returns `false` for anything that stops it
//!   from judging the file, including a missing file.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use config::constants::GeneratorConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::{AdapterHelp, AnalysisReport, LanguageAdapter, Output};
use crate::error::CodegenError;
use crate::registry::AdapterRegistry;

/// Multi-language source generator and editor.
#[derive(Debug)]
pub struct CodeGenerator {
    registry: AdapterRegistry,
    config: GeneratorConfig,
}

impl CodeGenerator {
    /// Generator with every built-in adapter and default settings.
    pub fn new() -> Result<Self, CodegenError> {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Result<Self, CodegenError> {
        Ok(Self {
            registry: AdapterRegistry::with_defaults(&config)?,
            config,
        })
    }

    /// Generator over a caller-built registry.
    pub fn with_registry(registry: AdapterRegistry, config: GeneratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Generate source for `path` without writing it.
    pub fn create(&self, path: impl AsRef<Path>, options: &Value) -> Result<Output, CodegenError> {
        let path = path.as_ref();
        let adapter = self.adapter_for(path)?;
        debug!(path = %path.display(), adapter = adapter.name(), "create");
        adapter.create(options)
    }

    /// Generate source and write it to `path`, creating parent directories.
    ///
    /// ## Errors
    ///
    /// Generation errors propagate. A failed write is `Ok(false)`.
    pub fn write(&self, path: impl AsRef<Path>, options: &Value) -> Result<bool, CodegenError> {
        let path = path.as_ref();
        let output = self.create(path, options)?;
        Ok(persist(path, &output))
    }

    /// Edit the file at `path` and return the new text without writing it.
    pub fn edit(&self, path: impl AsRef<Path>, operations: &[Value]) -> Result<Output, CodegenError> {
        let path = path.as_ref();
        let adapter = self.adapter_for(path)?;
        let source = self.read_source(path)?;
        debug!(
            path = %path.display(),
            adapter = adapter.name(),
            operations = operations.len(),
            "edit"
        );
        adapter.edit(&source, operations)
    }

    /// Edit the file at `path` in place.
    ///
    /// ## Errors
    ///
    /// Reading and editing errors propagate. A failed write is `Ok(false)`.
    pub fn edit_file(&self, path: impl AsRef<Path>, operations: &[Value]) -> Result<bool, CodegenError> {
        let path = path.as_ref();
        let output = self.edit(path, operations)?;
        Ok(persist(path, &output))
    }

    pub fn analyze(&self, path: impl AsRef<Path>) -> Result<AnalysisReport, CodegenError> {
        let path = path.as_ref();
        let adapter = self.adapter_for(path)?;
        let source = self.read_source(path)?;
        debug!(path = %path.display(), adapter = adapter.name(), "analyze");
        adapter.analyze(&source)
    }

    /// Whether the file at `path` is syntactically acceptable. Never fails.
    pub fn validate(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let adapter = match self.adapter_for(path) {
            Ok(adapter) => adapter,
            Err(error) => {
                debug!(path = %path.display(), %error, "validate: no adapter");
                return false;
            }
        };
        match self.read_source(path) {
            Ok(source) => adapter.validate(&source),
            Err(error) => {
                debug!(path = %path.display(), %error, "validate: unreadable");
                false
            }
        }
    }

    pub fn supports(&self, extension: &str) -> bool {
        self.registry.get(extension).is_some()
    }

    pub fn supported_extensions(&self) -> BTreeSet<String> {
        self.registry.extensions()
    }

    pub fn help(&self, extension: &str) -> Result<AdapterHelp, CodegenError> {
        self.registry
            .get(extension)
            .map(|adapter| adapter.help())
            .ok_or_else(|| CodegenError::UnsupportedExtension(extension.to_string()))
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn adapter_for(&self, path: &Path) -> Result<&dyn LanguageAdapter, CodegenError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| CodegenError::MissingExtension(path.to_path_buf()))?;
        self.registry
            .get(extension)
            .ok_or_else(|| CodegenError::UnsupportedExtension(extension.to_string()))
    }

    fn read_source(&self, path: &Path) -> Result<String, CodegenError> {
        let metadata = fs::metadata(path).map_err(|error| not_found_or_io(path, error))?;
        if metadata.len() > self.config.max_source_bytes as u64 {
            return Err(CodegenError::InvalidOptions(format!(
                "{} is {} bytes, above the {} byte limit",
                path.display(),
                metadata.len(),
                self.config.max_source_bytes
            )));
        }
        fs::read_to_string(path).map_err(|error| not_found_or_io(path, error))
    }
}

fn not_found_or_io(path: &Path, error: io::Error) -> CodegenError {
    if error.kind() == io::ErrorKind::NotFound {
        CodegenError::FileNotFound(PathBuf::from(path))
    } else {
        CodegenError::Io(error)
    }
}

/// Write `output` to `path`. Failures are logged and reported as `false`.
fn persist(path: &Path, output: &Output) -> bool {
    for warning in &output.warnings {
        warn!(path = %path.display(), message = %warning.message, "generated with warnings");
    }
    let result = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent).and_then(|()| fs::write(path, &output.text)),
        None => fs::write(path, &output.text),
    };
    match result {
        Ok(()) => true,
        Err(error) => {
            warn!(path = %path.display(), %error, "write failed");
            false
        }
    }
}
