//! # CSS Adapter
//!
//! A small structural parser over masked stylesheet text. It recognizes
//! rule blocks, at-rule statements and declarations with their byte ranges,
//! which is enough to analyze a stylesheet and splice edits into it without
//! reformatting untouched rules.

use config::constants::{GeneratorConfig, CSS_EXTENSIONS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::scan::{self, CSS};
use crate::adapter::{operation_tag, options, AdapterHelp, AnalysisReport, Capabilities, LanguageAdapter, Output};
use crate::error::CodegenError;

// =============================================================================
// PARSED FORM
// =============================================================================

/// One item inside a stylesheet or block body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// `prelude { ... }`: a style rule or a block at-rule.
    Block {
        prelude: String,
        start: usize,
        open: usize,
        close: usize,
        children: Vec<Item>,
    },
    /// `@import ...;` and other statement at-rules.
    Statement { text: String },
    /// `property: value`, `end` excluding any `;`.
    Declaration {
        property: String,
        start: usize,
        end: usize,
        terminated: bool,
    },
}

fn at_rule_name(prelude: &str) -> Option<&str> {
    prelude
        .starts_with('@')
        .then(|| prelude.split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or(prelude))
}

/// Collapse runs of whitespace so selectors compare by content.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse `source` into items. Errors name the first structural problem.
fn parse(source: &str) -> Result<Vec<Item>, String> {
    let masked = scan::mask(source, CSS).map_err(|e| e.to_string())?;
    let items = parse_items(source, &masked, 0, masked.len())?;
    if let Some(Item::Declaration { property, .. }) = items.iter().find(|i| matches!(i, Item::Declaration { .. })) {
        return Err(format!("declaration '{property}' outside of any rule"));
    }
    Ok(items)
}

fn parse_items(source: &str, masked: &str, from: usize, to: usize) -> Result<Vec<Item>, String> {
    let bytes = masked.as_bytes();
    let mut items = Vec::new();
    let mut start = from;
    let mut parens = 0usize;
    let mut i = from;

    while i < to {
        match bytes[i] {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'{' if parens == 0 => {
                let close = scan::matching_brace(&masked[..to], i).ok_or_else(|| format!("unclosed '{{' at byte {i}"))?;
                let (lead, trail) = padding(&masked[start..i]);
                if start + lead >= i - trail {
                    return Err(format!("block without selector at byte {i}"));
                }
                let children = parse_items(source, masked, i + 1, close)?;
                items.push(Item::Block {
                    prelude: normalize(&source[start + lead..i - trail]),
                    start: start + lead,
                    open: i,
                    close,
                    children,
                });
                i = close + 1;
                start = i;
                continue;
            }
            b'}' if parens == 0 => return Err(format!("unexpected '}}' at byte {i}")),
            b';' if parens == 0 => {
                if let Some(item) = segment(source, masked, start, i, true)? {
                    items.push(item);
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if let Some(item) = segment(source, masked, start, to, false)? {
        items.push(item);
    }
    Ok(items)
}

/// A `;`-delimited run that is not a block. Comments count as blank.
fn segment(source: &str, masked: &str, start: usize, end: usize, terminated: bool) -> Result<Option<Item>, String> {
    let (lead, trail) = padding(&masked[start..end]);
    if start + lead >= end - trail {
        return Ok(None);
    }
    let (start, end) = (start + lead, end - trail);
    let text = &source[start..end];
    if text.starts_with('@') {
        return Ok(Some(Item::Statement { text: normalize(text) }));
    }
    let Some((property, _)) = text.split_once(':') else {
        return Err(format!("declaration without ':' near '{text}'"));
    };
    Ok(Some(Item::Declaration {
        property: property.trim().to_string(),
        start,
        end,
        terminated,
    }))
}

/// Leading and trailing blank byte counts of a masked run.
fn padding(masked: &str) -> (usize, usize) {
    let lead = masked.len() - masked.trim_start().len();
    let trail = masked.len() - masked.trim_end().len();
    (lead, trail)
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CssReport {
    pub selectors: Vec<String>,
    pub media_queries: Vec<String>,
    pub custom_properties: Vec<String>,
    pub imports: Vec<String>,
    pub rule_count: usize,
    pub declaration_count: usize,
}

fn report(items: &[Item]) -> CssReport {
    let mut report = CssReport::default();
    collect(items, &mut report, false);
    report
}

fn collect(items: &[Item], report: &mut CssReport, in_keyframes: bool) {
    for item in items {
        match item {
            Item::Block { prelude, children, .. } => {
                let at = at_rule_name(prelude).map(str::to_ascii_lowercase);
                match at.as_deref() {
                    None => {
                        report.rule_count += 1;
                        if !in_keyframes {
                            report.selectors.push(prelude.clone());
                        }
                    }
                    Some("@media") => report.media_queries.push(prelude["@media".len()..].trim().to_string()),
                    Some(_) => {}
                }
                let keyframes = at.as_deref().is_some_and(|name| name.ends_with("keyframes"));
                collect(children, report, in_keyframes || keyframes);
            }
            Item::Statement { text } => {
                if let Some(target) = text.strip_prefix("@import") {
                    report.imports.push(import_target(target));
                }
            }
            Item::Declaration { property, .. } => {
                report.declaration_count += 1;
                if property.starts_with("--") && !report.custom_properties.contains(property) {
                    report.custom_properties.push(property.clone());
                }
            }
        }
    }
}

/// `url("a.css") screen` → `a.css`.
fn import_target(rest: &str) -> String {
    let rest = rest.trim();
    let inner = rest
        .strip_prefix("url(")
        .and_then(|r| r.split_once(')').map(|(url, _)| url))
        .unwrap_or_else(|| rest.split_whitespace().next().unwrap_or(rest));
    inner.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

// =============================================================================
// OPTIONS AND RENDERING
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct RuleOptions {
    selector: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct MediaOptions {
    query: String,
    #[serde(default)]
    rules: Vec<RuleOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CreateOptions {
    imports: Option<Vec<String>>,
    variables: Option<Map<String, Value>>,
    rules: Option<Vec<RuleOptions>>,
    media: Option<Vec<MediaOptions>>,
}

#[derive(Debug, Deserialize)]
struct UpdateProperty {
    selector: String,
    property: String,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct RemoveRule {
    selector: String,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_import(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("url(") || target.starts_with('"') || target.starts_with('\'') {
        format!("@import {target};")
    } else {
        format!("@import url('{target}');")
    }
}

pub struct CssAdapter {
    indent: String,
}

impl CssAdapter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            indent: config.indent_unit(),
        }
    }

    fn render_rule(&self, rule: &RuleOptions) -> String {
        if rule.properties.is_empty() {
            return format!("{} {{\n}}", rule.selector.trim());
        }
        let body: Vec<String> = rule
            .properties
            .iter()
            .map(|(property, value)| format!("{}{property}: {};", self.indent, value_text(value)))
            .collect();
        format!("{} {{\n{}\n}}", rule.selector.trim(), body.join("\n"))
    }

    fn render_media(&self, media: &MediaOptions) -> String {
        let rules: Vec<String> = media
            .rules
            .iter()
            .map(|rule| scan::indent_lines(&self.render_rule(rule), &self.indent))
            .collect();
        if rules.is_empty() {
            return format!("@media {} {{\n}}", media.query.trim());
        }
        format!("@media {} {{\n{}\n}}", media.query.trim(), rules.join("\n\n"))
    }

    fn render_variables(&self, variables: &Map<String, Value>) -> String {
        let properties = variables
            .iter()
            .map(|(name, value)| {
                let name = if name.starts_with("--") { name.clone() } else { format!("--{name}") };
                (name, value.clone())
            })
            .collect();
        self.render_rule(&RuleOptions {
            selector: ":root".to_string(),
            properties,
        })
    }

    fn add_rule(&self, source: &str, rule: &RuleOptions) -> String {
        scan::append_block(source, &self.render_rule(rule))
    }

    fn add_media(&self, source: &str, media: &MediaOptions) -> String {
        scan::append_block(source, &self.render_media(media))
    }

    fn update_property(&self, source: &str, op: &UpdateProperty) -> Result<String, CodegenError> {
        let items = parse(source).map_err(CodegenError::OperationFailed)?;
        let selector = normalize(&op.selector);
        let Some(Item::Block { open, close, children, .. }) = items
            .iter()
            .find(|item| matches!(item, Item::Block { prelude, .. } if *prelude == selector))
        else {
            return Err(CodegenError::OperationFailed(format!("no rule matches selector '{}'", op.selector)));
        };

        let value = value_text(&op.value);
        let existing = children.iter().find_map(|child| match child {
            Item::Declaration { property, start, end, .. } if property.eq_ignore_ascii_case(&op.property) => {
                Some((*start, *end))
            }
            _ => None,
        });
        if let Some((start, end)) = existing {
            return Ok(format!("{}{}: {value}{}", &source[..start], op.property, &source[end..]));
        }

        // Terminate a trailing declaration before appending after it.
        let mut text = source.to_string();
        let mut close = *close;
        if let Some(Item::Declaration { end, terminated: false, .. }) = children.last() {
            text.insert(*end, ';');
            close += 1;
        }
        let declaration = format!("{}: {value};", op.property);
        Ok(scan::insert_last(&text, *open, close, &declaration, &self.indent, false))
    }

    fn remove_rule(&self, source: &str, op: &RemoveRule) -> Result<String, CodegenError> {
        let items = parse(source).map_err(CodegenError::OperationFailed)?;
        let selector = normalize(&op.selector);
        let spans: Vec<(usize, usize)> = items
            .iter()
            .filter_map(|item| match item {
                Item::Block { prelude, start, close, .. } if *prelude == selector => Some((*start, *close)),
                _ => None,
            })
            .collect();
        if spans.is_empty() {
            return Err(CodegenError::OperationFailed(format!("no rule matches selector '{}'", op.selector)));
        }

        let mut text = source.to_string();
        for &(start, close) in spans.iter().rev() {
            let from = scan::line_start(&text, start);
            let from = if text[from..start].trim().is_empty() { from } else { start };
            let mut to = close + 1;
            if text[to..].starts_with('\n') {
                to += 1;
            }
            text.replace_range(from..to, "");
        }
        let trimmed = collapse_blank_lines(&text);
        Ok(if trimmed.trim().is_empty() { String::new() } else { format!("{}\n", trimmed.trim()) })
    }
}

/// At most one blank line between blocks.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

impl LanguageAdapter for CssAdapter {
    fn name(&self) -> &'static str {
        "css"
    }

    fn extensions(&self) -> &'static [&'static str] {
        CSS_EXTENSIONS
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with("create", true)
            .with("edit", true)
            .with("analyze", true)
            .with("validate", true)
            .with("variables", true)
            .with("format", false)
    }

    fn help(&self) -> AdapterHelp {
        AdapterHelp::new("Generate and edit stylesheets: rules, media queries, imports and custom properties.")
            .option("imports", "stylesheets to @import")
            .option("variables", "custom properties placed on :root")
            .option("rules", "list of {selector, properties}")
            .option("media", "list of {query, rules}")
            .example(json!({
                "variables": {"primary": "#0055ff"},
                "rules": [{"selector": ".button", "properties": {"color": "var(--primary)"}}]
            }))
    }

    fn create(&self, options_value: &Value) -> Result<Output, CodegenError> {
        let opts: CreateOptions = options(options_value)?;
        if opts.imports.is_none() && opts.variables.is_none() && opts.rules.is_none() && opts.media.is_none() {
            return Err(CodegenError::InvalidOptions(
                "css create needs at least one of 'imports', 'variables', 'rules' or 'media'".to_string(),
            ));
        }

        let mut sections: Vec<String> = Vec::new();
        if let Some(imports) = opts.imports.as_ref().filter(|i| !i.is_empty()) {
            sections.push(imports.iter().map(|i| render_import(i)).collect::<Vec<_>>().join("\n"));
        }
        if let Some(variables) = opts.variables.as_ref().filter(|v| !v.is_empty()) {
            sections.push(self.render_variables(variables));
        }
        for rule in opts.rules.iter().flatten() {
            sections.push(self.render_rule(rule));
        }
        for media in opts.media.iter().flatten() {
            sections.push(self.render_media(media));
        }
        if sections.is_empty() {
            return Ok(Output::default());
        }
        Ok(Output::text(format!("{}\n", sections.join("\n\n"))))
    }

    fn edit(&self, source: &str, operations: &[Value]) -> Result<Output, CodegenError> {
        let mut text = source.to_string();
        for operation in operations {
            let tag = operation_tag(operation)?;
            debug!(adapter = "css", operation = tag, "applying edit operation");
            text = match tag {
                "add_rule" => self.add_rule(&text, &options(operation)?),
                "update_property" => self.update_property(&text, &options(operation)?)?,
                "remove_rule" => self.remove_rule(&text, &options(operation)?)?,
                "add_media" => self.add_media(&text, &options(operation)?),
                other => {
                    return Err(CodegenError::UnknownOperation {
                        adapter: self.name().to_string(),
                        operation: other.to_string(),
                    })
                }
            };
        }
        Ok(Output::text(text))
    }

    fn analyze(&self, source: &str) -> Result<AnalysisReport, CodegenError> {
        let items = parse(source).map_err(CodegenError::OperationFailed)?;
        Ok(AnalysisReport::Css(report(&items)))
    }

    fn validate(&self, source: &str) -> bool {
        parse(source).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn adapter() -> CssAdapter {
        CssAdapter::new(&GeneratorConfig::default())
    }

    const SHEET: &str = "@import url('base.css');

:root {
    --primary: #333;
    --gap: 4px;
}

.card,  .panel {
    color: var(--primary);
    padding: 0
}

@media (max-width: 600px) {
    .card {
        padding: 2px;
    }
}

/* footer */
footer {
    margin: 0;
}
";

    #[test]
    fn create_full_sheet() {
        let out = adapter()
            .create(&json!({
                "imports": ["reset.css"],
                "variables": {"primary": "#333", "--gap": "4px"},
                "rules": [{"selector": "body", "properties": {"margin": 0, "font-family": "sans-serif"}}],
                "media": [{"query": "(max-width: 600px)", "rules": [{"selector": "body", "properties": {"margin": "2px"}}]}]
            }))
            .unwrap();
        let expected = "@import url('reset.css');

:root {
    --primary: #333;
    --gap: 4px;
}

body {
    margin: 0;
    font-family: sans-serif;
}

@media (max-width: 600px) {
    body {
        margin: 2px;
    }
}
";
        assert_eq!(out.text, expected);
    }

    #[test]
    fn create_needs_some_content() {
        let err = adapter().create(&json!({})).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidOptions(_)));
    }

    #[test]
    fn analyze_sheet() {
        let report = adapter().analyze(SHEET).unwrap();
        let css = report.as_css().unwrap();
        assert_eq!(css.selectors, vec![":root", ".card, .panel", ".card", "footer"]);
        assert_eq!(css.media_queries, vec!["(max-width: 600px)"]);
        assert_eq!(css.custom_properties, vec!["--primary", "--gap"]);
        assert_eq!(css.imports, vec!["base.css"]);
        assert_eq!(css.rule_count, 4);
        assert_eq!(css.declaration_count, 6);
    }

    #[test]
    fn update_existing_declaration() {
        let out = adapter()
            .edit(SHEET, &[json!({"type": "update_property", "selector": "footer", "property": "margin", "value": "1em"})])
            .unwrap();
        assert!(out.text.contains("footer {\n    margin: 1em;\n}"));
    }

    #[test]
    fn update_adds_missing_declaration() {
        let out = adapter()
            .edit(SHEET, &[json!({"type": "update_property", "selector": ".card, .panel", "property": "border", "value": "none"})])
            .unwrap();
        assert!(out.text.contains(".card,  .panel {\n    color: var(--primary);\n    padding: 0;\n    border: none;\n}"));
    }

    #[test]
    fn update_unknown_selector_fails() {
        let err = adapter()
            .edit(SHEET, &[json!({"type": "update_property", "selector": ".missing", "property": "a", "value": "b"})])
            .unwrap_err();
        assert!(matches!(err, CodegenError::OperationFailed(_)));
    }

    #[test]
    fn remove_rule_and_add_rule() {
        let adapter = adapter();
        let out = adapter
            .edit(
                "a {\n    color: red;\n}\n\nb {\n    color: blue;\n}\n",
                &[
                    json!({"type": "remove_rule", "selector": "a"}),
                    json!({"type": "add_rule", "selector": "c", "properties": {"display": "none"}}),
                ],
            )
            .unwrap();
        assert_eq!(out.text, "b {\n    color: blue;\n}\n\nc {\n    display: none;\n}\n");

        let err = adapter.edit("b {}", &[json!({"type": "remove_rule", "selector": "a"})]).unwrap_err();
        assert!(matches!(err, CodegenError::OperationFailed(_)));
    }

    #[test]
    fn add_media_block() {
        let out = adapter()
            .edit("", &[json!({"type": "add_media", "query": "print", "rules": [{"selector": "nav", "properties": {"display": "none"}}]})])
            .unwrap();
        assert_eq!(out.text, "@media print {\n    nav {\n        display: none;\n    }\n}\n");
    }

    #[test]
    fn validation() {
        let adapter = adapter();
        assert!(adapter.validate(SHEET));
        assert!(adapter.validate(""));
        assert!(!adapter.validate("a { color: red;"));
        assert!(!adapter.validate("a { color red; }"));
        assert!(!adapter.validate("color: red;"));
        assert!(!adapter.validate("a { content: '}' } }"));
        assert!(adapter.validate("a { content: '}'; }"));
    }
}
