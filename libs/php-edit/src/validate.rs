//! Syntax acceptance. No linting and no semantic checks.

use php_ast::Diagnostic;

/// `true` when the whole source parses.
pub fn is_syntactically_valid(source: &str) -> bool {
    php_parser::parse(source).is_ok()
}

/// The parse error as a diagnostic, or nothing for valid source.
pub fn diagnostics(source: &str) -> Vec<Diagnostic> {
    match php_parser::parse(source) {
        Ok(_) => Vec::new(),
        Err(error) => vec![error.to_diagnostic()],
    }
}
