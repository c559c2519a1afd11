//! # PHP Edit
//!
//! Structured editing of PHP source: parse into a tree, locate a target,
//! apply edit operations, print deterministically.
//!
//! ## Architecture
//!
//! ```text
//! text → php_parser → Ast ─┬─ edit (query + builder per operation) → Ast → printer → text
//!                          └─ analyze → FileReport
//! ```
//!
//! - [`query`]: find namespaces, class-likes and members by kind
//! - [`builder`]: synthesize nodes from JSON descriptors
//! - [`edit`]: `add_method`, `add_property`, `replace_method`
//! - [`analyze`]: flat structural report
//! - [`validate`]: syntax acceptance
//!
//! The engine is stateless: every call parses its own tree and drops it.

pub mod analyze;
pub mod builder;
pub mod edit;
pub mod error;
pub mod query;
pub mod validate;

pub use analyze::{analyze, analyze_source, FileReport};
pub use builder::{build_class, build_file, build_interface, build_trait, Built};
pub use edit::{apply, edit_source, EditOperation, Edited};
pub use error::EditError;
pub use validate::is_syntactically_valid;
