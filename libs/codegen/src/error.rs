//! # Codegen Errors
//!
//! Errors surfaced by the façade and the language adapters. Engine errors
//! from `php-edit` and I/O errors convert with `?`.

use std::path::PathBuf;

use php_edit::EditError;
use thiserror::Error;

/// Errors from [`crate::CodeGenerator`] and the adapters.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Failure inside the PHP editing engine.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// No adapter is registered for the extension.
    #[error("unsupported file extension '{0}'")]
    UnsupportedExtension(String),

    /// The path has no extension to select an adapter with.
    #[error("path '{}' has no file extension", .0.display())]
    MissingExtension(PathBuf),

    /// Two adapters claim the same extension.
    #[error("extension '{extension}' is claimed by both '{first}' and '{second}'")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },

    /// Options or operation payload of the wrong shape.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// `create` was asked for a type the adapter does not generate.
    #[error("{adapter} adapter cannot create type '{ty}'")]
    UnknownType { adapter: String, ty: String },

    /// An edit operation the adapter does not know.
    #[error("{adapter} adapter has no edit operation '{operation}'")]
    UnknownOperation { adapter: String, operation: String },

    /// A well-formed operation that cannot be applied to this source.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// The file to edit or analyze does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodegenError {
    pub(crate) fn invalid_options(error: impl std::fmt::Display) -> Self {
        CodegenError::InvalidOptions(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_extension_message() {
        let err = CodegenError::DuplicateExtension {
            extension: "js".into(),
            first: "javascript".into(),
            second: "other".into(),
        };
        assert_eq!(err.to_string(), "extension 'js' is claimed by both 'javascript' and 'other'");
    }

    #[test]
    fn edit_errors_are_transparent() {
        let err: CodegenError = EditError::NoClass.into();
        assert_eq!(err.to_string(), "no class found in source");
    }
}
