//! Centralized configuration values shared across the polyglot codegen crates.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRINTING
// =============================================================================

/// Number of spaces per indentation level in generated source.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_INDENT_WIDTH;
/// assert_eq!(" ".repeat(DEFAULT_INDENT_WIDTH), "    ");
/// ```
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Opening tag written at the top of every printed PHP file.
///
/// # Examples
/// ```
/// use config::constants::PHP_OPEN_TAG;
/// assert!(PHP_OPEN_TAG.starts_with("<?"));
/// ```
pub const PHP_OPEN_TAG: &str = "<?php";

/// Prologue prepended to a body snippet so it parses as a standalone file.
///
/// # Examples
/// ```
/// use config::constants::SNIPPET_PROLOGUE;
/// let wrapped = format!("{SNIPPET_PROLOGUE}return 1;");
/// assert!(wrapped.starts_with("<?php"));
/// ```
pub const SNIPPET_PROLOGUE: &str = "<?php\n";

/// Indentation used when pretty-printing JSON without an explicit `indent`.
///
/// # Examples
/// ```
/// use config::constants::JSON_DEFAULT_INDENT;
/// assert!(JSON_DEFAULT_INDENT > 0);
/// ```
pub const JSON_DEFAULT_INDENT: usize = 4;

// =============================================================================
// ADAPTERS
// =============================================================================

/// Version string advertised by every built-in language adapter.
///
/// # Examples
/// ```
/// use config::constants::ADAPTER_VERSION;
/// assert!(!ADAPTER_VERSION.is_empty());
/// ```
pub const ADAPTER_VERSION: &str = "1.0.0";

/// File extensions handled by the PHP adapter.
pub const PHP_EXTENSIONS: &[&str] = &["php"];

/// File extensions handled by the JavaScript adapter.
pub const JAVASCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

/// File extensions handled by the TypeScript adapter.
pub const TYPESCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "mts"];

/// File extensions handled by the CSS adapter.
pub const CSS_EXTENSIONS: &[&str] = &["css"];

/// File extensions handled by the JSON adapter.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

// =============================================================================
// LIMITS
// =============================================================================

/// Largest source file the façade will read, in bytes.
///
/// # Examples
/// ```
/// use config::constants::MAX_SOURCE_BYTES;
/// assert!(MAX_SOURCE_BYTES >= 1024 * 1024);
/// ```
pub const MAX_SOURCE_BYTES: usize = 16 * 1024 * 1024;

/// Bytes of stack space reserved when growing recursion limits using the
/// `stacker` crate.
///
/// # Examples
/// ```
/// use config::constants::STACKER_STACK_SIZE_BYTES;
/// assert!(STACKER_STACK_SIZE_BYTES >= 1024);
/// ```
pub const STACKER_STACK_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Remaining stack below which `stacker` allocates a new segment.
///
/// # Examples
/// ```
/// use config::constants::{STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
/// assert!(STACKER_RED_ZONE_BYTES < STACKER_STACK_SIZE_BYTES);
/// ```
pub const STACKER_RED_ZONE_BYTES: usize = 128 * 1024;

// =============================================================================
// HELPERS
// =============================================================================

/// Normalizes a file extension for adapter lookup.
///
/// Lower-cases and strips any leading dots.
///
/// # Examples
/// ```
/// use config::constants::normalize_extension;
/// assert_eq!(normalize_extension(".PHP"), "php");
/// assert_eq!(normalize_extension("json"), "json");
/// ```
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

// =============================================================================
// GENERATOR CONFIG
// =============================================================================

/// Immutable snapshot of runtime settings shared by the printers and the
/// path-addressed façade.
///
/// # Examples
/// ```
/// use config::constants::GeneratorConfig;
/// let config = GeneratorConfig::default();
/// assert_eq!(config.indent_width, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Largest file the façade accepts.
    pub max_source_bytes: usize,
}

impl GeneratorConfig {
    /// Builds a configuration, rejecting values no printer can honour.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GeneratorConfig;
    /// let cfg = GeneratorConfig::new(2, 1024).expect("valid config");
    /// assert_eq!(cfg.indent_width, 2);
    /// ```
    pub fn new(indent_width: usize, max_source_bytes: usize) -> Result<Self, ConfigError> {
        if indent_width == 0 || indent_width > 16 {
            return Err(ConfigError::InvalidIndent(indent_width));
        }
        if max_source_bytes == 0 {
            return Err(ConfigError::InvalidSourceLimit(max_source_bytes));
        }
        Ok(Self {
            indent_width,
            max_source_bytes,
        })
    }

    /// One indentation level as a string.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            max_source_bytes: MAX_SOURCE_BYTES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the indent width is zero or absurdly large.
    InvalidIndent(usize),
    /// Raised when the source size limit is zero.
    InvalidSourceLimit(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidIndent(value) => {
                write!(f, "indent_width must be within 1..=16: {value}")
            }
            ConfigError::InvalidSourceLimit(value) => {
                write!(f, "max_source_bytes must be positive: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
