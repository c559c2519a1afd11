//! # Edit Errors
//!
//! Every failure of the editing engine is fatal to the call that hit it.
//! Recoverable problems (a method body that does not parse) are reported as
//! warning diagnostics instead; see [`crate::builder::Built`].

use php_parser::ParseError;
use thiserror::Error;

/// Errors from building, editing and analyzing PHP trees.
#[derive(Debug, Error)]
pub enum EditError {
    /// The source being edited or analyzed is not valid PHP.
    #[error("failed to parse source: {0}")]
    Parse(#[from] ParseError),

    /// An operation with an unrecognised `type` tag.
    #[error("unknown edit operation '{0}'")]
    UnknownOperation(String),

    /// An operation that is not an object or lacks a string `type`,
    /// or whose payload does not match its type.
    #[error("invalid edit operation: {0}")]
    InvalidOperation(String),

    /// The tree contains no class to edit.
    #[error("no class found in source")]
    NoClass,

    /// `replace_method` named a method the class does not have.
    #[error("method '{method}' not found in class '{class}'")]
    MethodNotFound { class: String, method: String },

    /// A type annotation string that is not a PHP type.
    #[error("invalid type '{ty}': {source}")]
    InvalidType {
        ty: String,
        #[source]
        source: ParseError,
    },

    /// A descriptor that deserialized but cannot be built.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// `create` asked for something other than class, interface or trait.
    #[error("unknown create type '{0}', expected class, interface or trait")]
    UnknownCreateType(String),
}

impl EditError {
    pub(crate) fn invalid_descriptor(error: serde_json::Error) -> Self {
        EditError::InvalidDescriptor(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_not_found_names_both() {
        let err = EditError::MethodNotFound {
            class: "User".into(),
            method: "save".into(),
        };
        assert_eq!(err.to_string(), "method 'save' not found in class 'User'");
    }

    #[test]
    fn parse_errors_convert() {
        let err: EditError = php_parser::parse("").unwrap_err().into();
        assert!(matches!(err, EditError::Parse(_)));
    }
}
