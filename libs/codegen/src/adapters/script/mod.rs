//! # Script Support
//!
//! Shared machinery for the JavaScript and TypeScript adapters. Both
//! dialects are handled as text: structure is located with regexes over a
//! masked copy of the source (see [`super::scan`]) and edits splice text at
//! the located offsets. Nothing outside the edited span is reformatted.

mod edit;
mod render;
mod report;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::scan::{self, SCRIPT};
use crate::error::CodegenError;

pub use report::{ScriptClass, ScriptImport, ScriptInterface, ScriptReport};
pub(crate) use render::{
    ClassOptions, EnumOptions, FunctionOptions, InterfaceOptions, ModuleOptions, TypeAliasOptions,
};

/// Which language a [`Script`] speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    JavaScript,
    TypeScript,
}

impl Dialect {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::TypeScript => "typescript",
        }
    }

    pub(crate) fn typed(self) -> bool {
        self == Dialect::TypeScript
    }
}

/// A dialect plus the indentation unit used for generated code.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub dialect: Dialect,
    pub indent: String,
}

impl Script {
    pub(crate) fn new(dialect: Dialect, indent: impl Into<String>) -> Self {
        Self {
            dialect,
            indent: indent.into(),
        }
    }

    pub(crate) fn edit(&self, source: &str, operations: &[Value]) -> Result<String, CodegenError> {
        edit::apply(self, source, operations)
    }

    pub(crate) fn analyze(&self, source: &str) -> Result<ScriptReport, CodegenError> {
        report::analyze(self.dialect, source)
    }

    /// Brackets balance outside strings, comments and template literals.
    pub(crate) fn validate(&self, source: &str) -> bool {
        match scan::mask(source, SCRIPT) {
            Ok(masked) => scan::brackets_balanced(&masked),
            Err(_) => false,
        }
    }

    pub(crate) fn render_class(&self, options: &ClassOptions) -> String {
        render::class(self, options)
    }

    pub(crate) fn render_function(&self, options: &FunctionOptions) -> String {
        render::function(self, options)
    }

    pub(crate) fn render_module(&self, options: &ModuleOptions) -> String {
        render::module(self, options)
    }

    pub(crate) fn render_interface(&self, options: &InterfaceOptions) -> String {
        render::interface(self, options)
    }

    pub(crate) fn render_type_alias(&self, options: &TypeAliasOptions) -> String {
        render::type_alias(options)
    }

    pub(crate) fn render_enum(&self, options: &EnumOptions) -> String {
        render::enumeration(self, options)
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// Declaration patterns, matched against masked text.
struct Patterns {
    class: Regex,
    interface: Regex,
    function: Regex,
    arrow: Regex,
    import: Regex,
    export_decl: Regex,
    export_list: Regex,
    export_default: Regex,
    method: Regex,
    member: Regex,
    type_alias: Regex,
    enumeration: Regex,
}

static PATTERNS: Lazy<Result<Patterns, regex::Error>> = Lazy::new(|| {
    Ok(Patterns {
        class: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:declare[ \t]+)?(?:abstract[ \t]+)?class[ \t]+([A-Za-z_$][\w$]*)\s*(?:<[^{]*?>)?(?:\s+extends\s+([A-Za-z_$][\w$.]*)(?:<[^{]*?>)?)?(?:\s+implements\s+([^{]+?))?\s*\{",
        )?,
        interface: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?interface[ \t]+([A-Za-z_$][\w$]*)\s*(?:<[^{]*?>)?(?:\s+extends\s+([^{]+?))?\s*\{",
        )?,
        function: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:default[ \t]+)?(?:declare[ \t]+)?(?:async[ \t]+)?function\b\s*\*?\s*([A-Za-z_$][\w$]*)",
        )?,
        arrow: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:const|let|var)[ \t]+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:async\s*)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::\s*[^=]+?)?=>",
        )?,
        import: Regex::new(
            r#"(?m)^[ \t]*import\s+(?:type\s+)?(?:([A-Za-z_$][\w$]*)\s*,?\s*)?(?:\{([^}]*)\}\s*)?(?:\*\s*as\s+([A-Za-z_$][\w$]*)\s*)?(?:from\s*)?["']([^"'\n]*)["'][ \t]*;?"#,
        )?,
        export_decl: Regex::new(
            r"(?m)^[ \t]*export[ \t]+(?:default[ \t]+)?(?:declare[ \t]+)?(?:async[ \t]+)?(?:abstract[ \t]+)?(?:function\b\s*\*?|class|const[ \t]+enum|const|let|var|interface|type|enum)\s*([A-Za-z_$][\w$]*)",
        )?,
        export_list: Regex::new(r"(?m)^[ \t]*export\s*(?:type\s*)?\{([^}]*)\}")?,
        export_default: Regex::new(r"(?m)^[ \t]*export[ \t]+default\b")?,
        method: Regex::new(
            r"(?m)^[ \t]*(?:(?:public|private|protected|static|async|readonly|abstract|override|get|set|declare)[ \t]+)*\*?[ \t]*(#?[A-Za-z_$][\w$]*)\s*\??\s*(?:<[^>(]*>)?\s*\(",
        )?,
        member: Regex::new(r"(?m)^[ \t]*(?:readonly[ \t]+)?([A-Za-z_$][\w$]*)\??\s*[:(<]")?,
        type_alias: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?type[ \t]+([A-Za-z_$][\w$]*)\s*(?:<[^=]*>)?\s*=",
        )?,
        enumeration: Regex::new(
            r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?(?:const[ \t]+)?enum[ \t]+([A-Za-z_$][\w$]*)\s*\{",
        )?,
    })
});

fn patterns() -> Result<&'static Patterns, CodegenError> {
    PATTERNS
        .as_ref()
        .map_err(|error| CodegenError::OperationFailed(format!("script patterns failed to compile: {error}")))
}

/// A located `{ ... }` declaration body.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    name: String,
    open: usize,
    close: usize,
}

/// Top-level declarations matched by `pattern`, with their bodies.
fn blocks(pattern: &Regex, source: &str, masked: &str) -> Vec<Block> {
    pattern
        .captures_iter(masked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if scan::depth_at(masked, whole.start()) != 0 {
                return None;
            }
            let name = caps.get(1)?;
            let open = whole.end() - 1;
            let close = scan::matching_brace(masked, open)?;
            Some(Block {
                name: source[name.range()].to_string(),
                open,
                close,
            })
        })
        .collect()
}

/// Masked copy of `source`, or the source itself when it cannot be masked.
fn masked(source: &str) -> String {
    scan::mask(source, SCRIPT).unwrap_or_else(|_| source.to_string())
}

const NOT_METHODS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "function", "with"];
