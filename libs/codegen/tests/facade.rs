//! Façade behavior against real files.

use std::fs;

use config::constants::GeneratorConfig;
use polyglot_codegen::{AdapterRegistry, CodeGenerator, CodegenError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn generator() -> CodeGenerator {
    CodeGenerator::new().unwrap()
}

#[test]
fn write_then_edit_php_class() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("src/Models/User.php");
    let generator = generator();

    let written = generator
        .write(
            &path,
            &json!({
                "name": "User",
                "properties": [{"name": "name", "type": "string", "visibility": "protected"}],
                "methods": [{"name": "getName", "return_type": "string", "body": "return $this->name;"}]
            }),
        )
        .unwrap();
    assert!(written);

    let edited = generator
        .edit_file(
            &path,
            &[json!({
                "type": "add_method",
                "method": {
                    "name": "setName",
                    "parameters": [{"name": "name", "type": "string"}],
                    "return_type": "void",
                    "body": "$this->name = $name;"
                }
            })],
        )
        .unwrap();
    assert!(edited);

    let report = generator.analyze(&path).unwrap();
    let class = &report.as_php().unwrap().classes[0];
    let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["getName", "setName"]);
    assert_eq!(class.methods[1].parameters.len(), 1);
    assert_eq!(class.methods[1].parameters[0].name, "name");
    assert!(generator.validate(&path));
}

#[test]
fn edit_returns_text_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.js");
    fs::write(&path, "class App {}\n").unwrap();

    let out = generator()
        .edit(&path, &[json!({"type": "add_method", "method": {"name": "run"}})])
        .unwrap();
    assert_eq!(out.text, "class App {\n    run() {}\n}\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), "class App {}\n");
}

#[test]
fn unbalanced_braces_do_not_validate() {
    let dir = tempdir().unwrap();
    let generator = generator();
    for (name, text) in [
        ("broken.php", "<?php class A {"),
        ("broken.js", "function f() { return [1, 2; }"),
        ("broken.ts", "interface I { a: string;"),
        ("broken.css", "a { color: red;"),
        ("broken.json", "{\"a\": [1}"),
    ] {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        assert!(!generator.validate(&path), "{name} should not validate");
    }
}

#[test]
fn validate_is_false_for_unusable_paths() {
    let dir = tempdir().unwrap();
    let generator = generator();
    assert!(!generator.validate(dir.path().join("missing.php")));
    assert!(!generator.validate(dir.path().join("notes.txt")));
    assert!(!generator.validate(dir.path().join("Makefile")));
}

#[test]
fn missing_file_is_fatal_for_edit_and_analyze() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gone.json");
    let generator = generator();
    assert!(matches!(generator.edit(&path, &[]), Err(CodegenError::FileNotFound(_))));
    assert!(matches!(generator.analyze(&path), Err(CodegenError::FileNotFound(_))));
}

#[test]
fn extension_errors() {
    let generator = generator();
    assert!(matches!(
        generator.create("notes.txt", &json!({})),
        Err(CodegenError::UnsupportedExtension(ext)) if ext == "txt"
    ));
    assert!(matches!(generator.create("Makefile", &json!({})), Err(CodegenError::MissingExtension(_))));
    assert!(generator.create("Upper.PHP", &json!({"name": "Upper"})).is_ok());
}

#[test]
fn generation_errors_propagate_from_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.json");
    let err = generator().write(&path, &json!({"indent": 2})).unwrap_err();
    assert!(matches!(err, CodegenError::InvalidOptions(_)));
    assert!(!path.exists());
}

#[test]
fn failed_write_is_false() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();
    // The parent "directory" is a regular file.
    let path = blocker.join("out.json");
    assert!(!generator().write(&path, &json!({"data": {}})).unwrap());
}

#[test]
fn oversized_files_are_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.json");
    fs::write(&path, "[1, 2, 3, 4, 5, 6, 7, 8]").unwrap();
    let generator = CodeGenerator::with_config(GeneratorConfig::new(4, 8).unwrap()).unwrap();
    assert!(matches!(generator.analyze(&path), Err(CodegenError::InvalidOptions(_))));
}

#[test]
fn registry_metadata() {
    let generator = generator();
    let extensions: Vec<String> = generator.supported_extensions().into_iter().collect();
    assert_eq!(
        extensions,
        vec!["cjs", "css", "js", "json", "jsx", "mjs", "mts", "php", "ts", "tsx"]
    );
    assert!(generator.supports("JSX"));
    assert!(!generator.supports("rb"));

    let help = generator.help(".css").unwrap();
    assert!(help.options.contains_key("rules"));
    assert!(!help.examples.is_empty());
    assert!(matches!(generator.help("rb"), Err(CodegenError::UnsupportedExtension(_))));

    for adapter in generator.registry().adapters() {
        assert_eq!(adapter.version(), config::constants::ADAPTER_VERSION);
        assert!(adapter.capabilities().supports("create"));
    }
}

#[test]
fn registering_defaults_twice_collides() {
    let config = GeneratorConfig::default();
    let mut adapters = polyglot_codegen::adapters::default_adapters(&config);
    adapters.extend(polyglot_codegen::adapters::default_adapters(&config));
    let err = AdapterRegistry::new(adapters).unwrap_err();
    assert!(matches!(err, CodegenError::DuplicateExtension { .. }));
}

#[test]
fn css_and_json_round_through_files() {
    let dir = tempdir().unwrap();
    let generator = generator();

    let css = dir.path().join("site.css");
    assert!(generator
        .write(&css, &json!({"rules": [{"selector": "h1", "properties": {"margin": 0}}]}))
        .unwrap());
    assert!(generator
        .edit_file(&css, &[json!({"type": "update_property", "selector": "h1", "property": "color", "value": "red"})])
        .unwrap());
    assert_eq!(fs::read_to_string(&css).unwrap(), "h1 {\n    margin: 0;\n    color: red;\n}\n");

    let manifest = dir.path().join("package.json");
    assert!(generator
        .write(&manifest, &json!({"data": {"name": "demo", "scripts": {}}, "indent": 2}))
        .unwrap());
    assert!(generator
        .edit_file(&manifest, &[json!({"type": "set", "path": "scripts.test", "value": "jest"})])
        .unwrap());
    let report = generator.analyze(&manifest).unwrap();
    assert_eq!(report.as_json().unwrap().top_level_keys, vec!["name", "scripts"]);
    assert_eq!(
        fs::read_to_string(&manifest).unwrap(),
        "{\n  \"name\": \"demo\",\n  \"scripts\": {\n    \"test\": \"jest\"\n  }\n}\n"
    );
}

#[test]
fn regex_after_return_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quote.js");
    fs::write(&path, "function hasQuote(s) {\n    return /'/.test(s);\n}\n").unwrap();
    assert!(generator().validate(&path));
}

#[test]
fn php_comments_and_modern_syntax_survive_edits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Rows.php");
    fs::write(
        &path,
        "<?php
// License: MIT
enum Kind: string { case Row = 'r'; }
class Rows {
    // lazily
    public function all() { yield 1; }
}
",
    )
    .unwrap();
    let generator = generator();
    assert!(generator.validate(&path));
    assert!(generator
        .edit_file(&path, &[json!({"type": "add_method", "method": {"name": "count", "return_type": "int", "body": "return 1;"}})])
        .unwrap());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("// License: MIT"));
    assert!(text.contains("    // lazily\n    public function all()"));
    assert!(text.contains("case Row = 'r';"));
    let report = generator.analyze(&path).unwrap();
    let php = report.as_php().unwrap();
    assert_eq!(php.enums[0].name, "Kind");
    assert_eq!(php.classes[0].methods.len(), 2);
}
