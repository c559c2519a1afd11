//! # PHP Parser
//!
//! Pure Rust lexer and recursive-descent parser producing the [`php_ast`]
//! syntax tree.
//!
//! ## Architecture
//!
//! ```text
//! Source → Lexer → Vec<Token> → Parser → Ast
//! ```
//!
//! - [`lexer`]: mode-aware tokenizer (inline HTML, open/close tags, heredocs)
//! - [`parser`]: recursive descent with precedence climbing for expressions
//! - [`error`]: [`ParseError`] with kind, byte span and line/column
//!
//! ## Example
//!
//! ```rust
//! use php_parser::parse;
//!
//! let ast = parse("<?php\nclass User {}\n").unwrap();
//! assert_eq!(ast.stmts.len(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};

use config::constants::SNIPPET_PROLOGUE;
use lexer::Lexer;
use parser::Parser;
use php_ast::{Ast, Expr, Stmt, Type};

/// Parse a complete PHP file.
///
/// ## Parameters
///
/// - `source`: File contents, starting in inline-HTML mode
///
/// ## Returns
///
/// The syntax tree, or the first error encountered.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_file()
}

/// Parse a statement list without its own open tag, such as a method body.
///
/// ```rust
/// let stmts = php_parser::parse_snippet("return $this->name;").unwrap();
/// assert_eq!(stmts.len(), 1);
/// ```
pub fn parse_snippet(body: &str) -> Result<Vec<Stmt>, ParseError> {
    let source = format!("{SNIPPET_PROLOGUE}{body}");
    let mut ast = parse(&source)?;
    ast.stmts.retain(|stmt| !matches!(stmt, Stmt::Nop));
    Ok(ast.stmts)
}

/// Parse a type declaration such as `?string` or `int|false`.
pub fn parse_type(text: &str) -> Result<Type, ParseError> {
    let source = format!("<?php {text}");
    let tokens = Lexer::new(&source).tokenize()?;
    Parser::new(tokens).parse_standalone_type()
}

/// Parse a single expression. A trailing `;` is allowed.
pub fn parse_expr(text: &str) -> Result<Expr, ParseError> {
    let source = format!("<?php {text}");
    let tokens = Lexer::new(&source).tokenize()?;
    Parser::new(tokens).parse_standalone_expr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snippet_drops_placeholders() {
        let stmts = parse_snippet(";;\necho 1;").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Stmt::Echo(_)));
    }

    #[test]
    fn test_parse_snippet_reports_errors() {
        assert!(parse_snippet("return $x +;").is_err());
    }

    #[test]
    fn test_parse_type_rejects_trailing_tokens() {
        assert!(parse_type("int|").is_err());
        assert!(parse_type("string string").is_err());
        assert!(parse_type("?int").is_ok());
    }

    #[test]
    fn test_parse_expr_allows_semicolon() {
        assert!(matches!(parse_expr("$a + 1;").unwrap(), Expr::Binary { .. }));
    }
}
