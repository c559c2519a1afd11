//! Structural summary of a script file.

use regex::Regex;
use serde::Serialize;

use super::{blocks, masked, patterns, Block, Dialect, Patterns, NOT_METHODS};
use crate::adapters::scan;
use crate::error::CodegenError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScriptReport {
    pub classes: Vec<ScriptClass>,
    pub functions: Vec<String>,
    pub imports: Vec<ScriptImport>,
    pub exports: Vec<String>,
    /// TypeScript only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<ScriptInterface>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enums: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScriptClass {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScriptInterface {
    pub name: String,
    pub extends: Vec<String>,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScriptImport {
    #[serde(rename = "from")]
    pub source: String,
    pub default: Option<String>,
    pub names: Vec<String>,
    pub namespace: Option<String>,
}

pub(super) fn analyze(dialect: Dialect, source: &str) -> Result<ScriptReport, CodegenError> {
    let patterns = patterns()?;
    let masked = masked(source);

    let classes = patterns
        .class
        .captures_iter(&masked)
        .filter(|caps| caps.get(0).is_some_and(|m| scan::depth_at(&masked, m.start()) == 0))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let open = whole.end() - 1;
            let close = scan::matching_brace(&masked, open).unwrap_or(masked.len());
            Some(ScriptClass {
                name: source[caps.get(1)?.range()].to_string(),
                extends: caps.get(2).map(|m| source[m.range()].to_string()),
                implements: caps.get(3).map(|m| split_list(&source[m.range()])).unwrap_or_default(),
                methods: methods(patterns, source, &masked, open, close),
            })
        })
        .collect();

    let mut functions = top_level_names(&patterns.function, source, &masked);
    functions.extend(top_level_names(&patterns.arrow, source, &masked));

    let mut report = ScriptReport {
        classes,
        functions,
        imports: imports(patterns, source, &masked),
        exports: exports(patterns, source, &masked),
        ..ScriptReport::default()
    };

    if dialect.typed() {
        report.interfaces = Some(
            patterns
                .interface
                .captures_iter(&masked)
                .filter(|caps| caps.get(0).is_some_and(|m| scan::depth_at(&masked, m.start()) == 0))
                .filter_map(|caps| {
                    let whole = caps.get(0)?;
                    let open = whole.end() - 1;
                    let close = scan::matching_brace(&masked, open).unwrap_or(masked.len());
                    Some(ScriptInterface {
                        name: source[caps.get(1)?.range()].to_string(),
                        extends: caps.get(2).map(|m| split_list(&source[m.range()])).unwrap_or_default(),
                        members: members(&patterns.member, source, &masked, open, close),
                    })
                })
                .collect(),
        );
        report.types = Some(top_level_names(&patterns.type_alias, source, &masked));
        report.enums = Some(top_level_names(&patterns.enumeration, source, &masked));
    }

    Ok(report)
}

/// Class bodies, for edits that target a class by name.
pub(super) fn class_blocks(source: &str, masked: &str) -> Result<Vec<Block>, CodegenError> {
    Ok(blocks(&patterns()?.class, source, masked))
}

pub(super) fn interface_blocks(source: &str, masked: &str) -> Result<Vec<Block>, CodegenError> {
    Ok(blocks(&patterns()?.interface, source, masked))
}

/// End offset of the last import statement.
pub(super) fn last_import_end(masked: &str) -> Result<Option<usize>, CodegenError> {
    Ok(patterns()?
        .import
        .find_iter(masked)
        .filter(|m| scan::depth_at(masked, m.start()) == 0)
        .last()
        .map(|m| m.end()))
}

fn top_level_names(pattern: &Regex, source: &str, masked: &str) -> Vec<String> {
    pattern
        .captures_iter(masked)
        .filter(|caps| caps.get(0).is_some_and(|m| scan::depth_at(masked, m.start()) == 0))
        .filter_map(|caps| caps.get(1).map(|m| source[m.range()].to_string()))
        .collect()
}

fn methods(patterns: &Patterns, source: &str, masked: &str, open: usize, close: usize) -> Vec<String> {
    let depth = scan::depth_at(masked, open) + 1;
    let body = &masked[open + 1..close];
    patterns
        .method
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            let at = open + 1 + name.start();
            if scan::depth_at(masked, at) != depth {
                return None;
            }
            let name = &source[at..open + 1 + name.end()];
            (!NOT_METHODS.contains(&name)).then(|| name.to_string())
        })
        .collect()
}

fn members(pattern: &Regex, source: &str, masked: &str, open: usize, close: usize) -> Vec<String> {
    let depth = scan::depth_at(masked, open) + 1;
    let body = &masked[open + 1..close];
    pattern
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            let at = open + 1 + name.start();
            (scan::depth_at(masked, at) == depth).then(|| source[at..open + 1 + name.end()].to_string())
        })
        .collect()
}

fn imports(patterns: &Patterns, source: &str, masked: &str) -> Vec<ScriptImport> {
    patterns
        .import
        .captures_iter(masked)
        .filter(|caps| caps.get(0).is_some_and(|m| scan::depth_at(masked, m.start()) == 0))
        .filter_map(|caps| {
            Some(ScriptImport {
                source: source[caps.get(4)?.range()].to_string(),
                default: caps.get(1).map(|m| source[m.range()].to_string()),
                names: caps.get(2).map(|m| split_list(&source[m.range()])).unwrap_or_default(),
                namespace: caps.get(3).map(|m| source[m.range()].to_string()),
            })
        })
        .collect()
}

fn exports(patterns: &Patterns, source: &str, masked: &str) -> Vec<String> {
    let mut names: Vec<(usize, String)> = Vec::new();
    let mut declared_at = Vec::new();

    for caps in patterns.export_decl.captures_iter(masked) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            declared_at.push(whole.start());
            names.push((whole.start(), source[name.range()].to_string()));
        }
    }
    for caps in patterns.export_list.captures_iter(masked) {
        if let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) {
            for item in split_list(&source[list.range()]) {
                // `a as b` exports `b`.
                let exported = item.rsplit(" as ").next().unwrap_or(item.as_str()).trim().to_string();
                names.push((whole.start(), exported));
            }
        }
    }
    for whole in patterns.export_default.find_iter(masked) {
        if !declared_at.contains(&whole.start()) {
            names.push((whole.start(), "default".to_string()));
        }
    }

    names.sort_by_key(|(at, _)| *at);
    let mut seen = Vec::new();
    for (_, name) in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Comma-separated names with whitespace and empty entries removed.
fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JS: &str = r#"import React, { useState, useEffect } from 'react';
import * as path from "path";
import './styles.css';

// class Commented {}
const banner = "class Fake {";

export class Widget extends Base {
    static create() {
        if (ready) {
            helper();
        }
        return new Widget();
    }

    async render(props) {
        return `<div>${props.title}</div>`;
    }
}

function helper() {}
export const double = (x) => x * 2;
export { helper as assist };
export default Widget;
"#;

    #[test]
    fn javascript_report() {
        let report = analyze(Dialect::JavaScript, JS).unwrap();
        assert_eq!(report.classes.len(), 1);
        let widget = &report.classes[0];
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.extends.as_deref(), Some("Base"));
        assert_eq!(widget.methods, vec!["create", "render"]);
        assert_eq!(report.functions, vec!["helper", "double"]);

        assert_eq!(report.imports.len(), 3);
        assert_eq!(report.imports[0].source, "react");
        assert_eq!(report.imports[0].default.as_deref(), Some("React"));
        assert_eq!(report.imports[0].names, vec!["useState", "useEffect"]);
        assert_eq!(report.imports[1].namespace.as_deref(), Some("path"));
        assert_eq!(report.imports[2].source, "./styles.css");

        assert_eq!(report.exports, vec!["Widget", "double", "assist", "default"]);
        assert!(report.interfaces.is_none());
    }

    #[test]
    fn typescript_report() {
        let source = "export interface Shape extends Named, Sized {
    readonly id: number;
    area(): number;
}

export type Id = string | number;

export enum Color { Red, Green }

export class Square implements Shape {
    private side: number = 1;
    constructor(side: number) {
        this.side = side;
    }
    public area(): number {
        return this.side * this.side;
    }
}
";
        let report = analyze(Dialect::TypeScript, source).unwrap();
        let shape = &report.interfaces.as_ref().unwrap()[0];
        assert_eq!(shape.name, "Shape");
        assert_eq!(shape.extends, vec!["Named", "Sized"]);
        assert_eq!(shape.members, vec!["id", "area"]);
        assert_eq!(report.types, Some(vec!["Id".to_string()]));
        assert_eq!(report.enums, Some(vec!["Color".to_string()]));
        assert_eq!(report.classes[0].implements, vec!["Shape"]);
        assert_eq!(report.classes[0].methods, vec!["constructor", "area"]);
    }

    #[test]
    fn report_serializes_without_typescript_fields() {
        let report = analyze(Dialect::JavaScript, "function f() {}").unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("interfaces").is_none());
        assert_eq!(json["functions"][0], "f");
    }
}
