//! # Config Crate
//!
//! Centralized configuration constants for the polyglot codegen workspace.
//! All magic numbers and tunable parameters are defined here to ensure
//! consistency across crates and easy configuration management.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{normalize_extension, GeneratorConfig, PHP_EXTENSIONS};
//!
//! let ext = normalize_extension(".PHP");
//! assert!(PHP_EXTENSIONS.contains(&ext.as_str()));
//!
//! let cfg = GeneratorConfig::default();
//! assert_eq!(cfg.indent_unit().len(), cfg.indent_width);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **No Dependencies**: Pure configuration, usable from every crate
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
