//! # Polyglot Codegen
//!
//! Generate, edit, analyze and validate source files in several languages
//! through one path-addressed API. The file extension picks a
//! [`LanguageAdapter`]; PHP is edited through its syntax tree
//! (`php-edit`), the other languages through structural text splicing.
//!
//! ## Example
//!
//! ```rust
//! use polyglot_codegen::CodeGenerator;
//! use serde_json::json;
//!
//! let generator = CodeGenerator::new().unwrap();
//! let out = generator
//!     .create("src/User.php", &json!({"name": "User", "methods": [{"name": "getId", "return_type": "int", "body": "return 1;"}]}))
//!     .unwrap();
//! assert!(out.text.contains("public function getId(): int"));
//! assert!(generator.supports(".TS"));
//! ```

pub mod adapter;
pub mod adapters;
pub mod error;
pub mod generator;
pub mod registry;

pub use adapter::{AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
pub use adapters::css::CssReport;
pub use adapters::json::JsonReport;
pub use adapters::script::ScriptReport;
pub use error::CodegenError;
pub use generator::CodeGenerator;
pub use registry::AdapterRegistry;
