//! # PHP AST Crate
//!
//! Typed syntax tree for PHP files plus the printer that turns a tree back
//! into text. The parser lives in `php-parser`; this crate has no knowledge
//! of source text beyond spans.
//!
//! ## Architecture
//!
//! ```text
//! PHP Source → php-parser (Ast) → php-edit (mutations) → php-ast printer → PHP Source
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use php_ast::{print, Ast, ClassDecl, Stmt};
//!
//! let ast = Ast::new(vec![Stmt::Class(ClassDecl {
//!     name: "User".to_string(),
//!     ..Default::default()
//! })]);
//! assert_eq!(print(&ast), "<?php\n\nclass User\n{\n}\n");
//! ```
//!
//! ## Design Principles
//!
//! - **Typed AST**: All nodes are strongly typed Rust enums/structs
//! - **Order Preserving**: Class members stay in source order
//! - **Deterministic Printing**: Same tree, same text

pub mod ast;
pub mod diagnostic;
pub mod printer;
pub mod span;

// Re-exports for convenience
pub use ast::*;
pub use diagnostic::{Diagnostic, Severity};
pub use printer::{print, print_expr, print_stmts, print_type, print_with, PrintOptions};
pub use span::{Position, Span};

#[cfg(test)]
mod tests;
