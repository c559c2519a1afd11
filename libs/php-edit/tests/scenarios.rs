//! End-to-end edit scenarios: source text in, source text and reports out.

use php_edit::{analyze_source, edit_source, EditError, EditOperation};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const USER: &str = "<?php

class User
{
    protected string $name;

    public function getName(): string
    {
        return $this->name;
    }
}
";

fn ops(values: &[Value]) -> Vec<EditOperation> {
    EditOperation::from_json_list(values).unwrap()
}

#[test]
fn empty_edit_preserves_analysis() {
    let source = "<?php
namespace App;

use Foo\\Bar;

abstract class Repo extends Base implements Countable
{
    private static $cache = [], $hits = 0;

    abstract protected function load(int $id, ?string $key = null): ?array;

    public final function count(): int { return 0; }
}

interface Loader { public function load(int $id); }
";
    let before = analyze_source(source).unwrap();
    let edited = edit_source(source, &[]).unwrap();
    let after = analyze_source(&edited.text).unwrap();
    assert_eq!(before, after);
    assert!(edited.warnings.is_empty());
}

#[test]
fn replace_sees_method_added_in_same_call() {
    let edited = edit_source(
        "<?php class A {}",
        &ops(&[
            json!({"type": "add_method", "method": {"name": "foo"}}),
            json!({"type": "replace_method", "method_name": "foo", "method": {"name": "bar"}}),
        ]),
    )
    .unwrap();
    let report = analyze_source(&edited.text).unwrap();
    let names: Vec<&str> = report.classes[0].methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["bar"]);
}

#[test]
fn null_default_is_distinct_from_no_default() {
    let edited = edit_source(
        "<?php class A {}",
        &ops(&[
            json!({"type": "add_method", "method": {"name": "required", "parameters": [{"name": "x", "type": "string"}]}}),
            json!({"type": "add_method", "method": {"name": "optional", "parameters": [{"name": "x", "type": "string", "default": null}]}}),
        ]),
    )
    .unwrap();
    assert!(edited.text.contains("public function required(string $x)\n"));
    assert!(edited.text.contains("public function optional(string $x = null)\n"));
}

#[test]
fn property_goes_before_existing_methods() {
    let source = "<?php class A { public function one() {} public function two() {} }";
    let edited = edit_source(
        source,
        &ops(&[json!({"type": "add_property", "property": {"name": "count", "type": "int", "default": 0}})]),
    )
    .unwrap();
    let expected = "<?php

class A
{
    public int $count = 0;

    public function one()
    {
    }

    public function two()
    {
    }
}
";
    assert_eq!(edited.text, expected);
}

#[test]
fn property_is_appended_without_methods() {
    let edited = edit_source(
        "<?php class A { const X = 1; }",
        &ops(&[json!({"type": "add_property", "property": {"name": "y"}})]),
    )
    .unwrap();
    assert!(edited.text.contains("    const X = 1;\n\n    public $y;\n"));
}

#[test]
fn replacing_missing_method_is_fatal() {
    let err = edit_source(
        USER,
        &ops(&[json!({"type": "replace_method", "method_name": "missing", "method": {"name": "x"}})]),
    )
    .unwrap_err();
    match err {
        EditError::MethodNotFound { class, method } => {
            assert_eq!(class, "User");
            assert_eq!(method, "missing");
        }
        other => panic!("expected MethodNotFound, got {other:?}"),
    }
}

#[test]
fn failed_operation_discards_earlier_ones() {
    let result = edit_source(
        USER,
        &ops(&[
            json!({"type": "add_method", "method": {"name": "ok"}}),
            json!({"type": "replace_method", "method_name": "missing", "method": {"name": "x"}}),
        ]),
    );
    assert!(result.is_err());
}

#[test]
fn add_setter_to_getter_class() {
    let edited = edit_source(
        USER,
        &ops(&[json!({
            "type": "add_method",
            "method": {
                "name": "setName",
                "parameters": [{"name": "name", "type": "string"}],
                "return_type": "void",
                "body": "$this->name = $name;"
            }
        })]),
    )
    .unwrap();
    let report = analyze_source(&edited.text).unwrap();
    let methods = &report.classes[0].methods;
    assert_eq!(methods.len(), 2);
    assert!(methods.iter().any(|m| m.name == "getName"));
    let setter = methods.iter().find(|m| m.name == "setName").unwrap();
    assert_eq!(setter.parameters.len(), 1);
    assert_eq!(setter.parameters[0].name, "name");

    let expected = "<?php

class User
{
    protected string $name;

    public function getName(): string
    {
        return $this->name;
    }

    public function setName(string $name): void
    {
        $this->name = $name;
    }
}
";
    assert_eq!(edited.text, expected);
}

#[test]
fn edits_class_inside_namespace() {
    let edited = edit_source(
        "<?php\nnamespace App;\n\nclass A {}\n",
        &ops(&[json!({"type": "add_method", "method": {"name": "f", "static": true}})]),
    )
    .unwrap();
    assert_eq!(edited.text, "<?php\n\nnamespace App;\n\nclass A\n{\n    public static function f()\n    {\n    }\n}\n");
}

#[test]
fn unparsable_source_is_fatal() {
    let err = edit_source("<?php class {", &[]).unwrap_err();
    assert!(matches!(err, EditError::Parse(_)));
}

#[test]
fn unknown_visibility_is_fatal() {
    let err = EditOperation::from_json(&json!({
        "type": "add_method",
        "method": {"name": "f", "visibility": "internal"}
    }))
    .unwrap_err();
    assert!(matches!(err, EditError::InvalidDescriptor(_)));
}

const COMMENTED: &str = "<?php

// License: MIT
# hash
class A
{
    // keep me
    public function f()
    {
        // explain
        return 1;
    }
    /* closing */
}
";

#[test]
fn empty_edit_keeps_comments() {
    let edited = edit_source(COMMENTED, &[]).unwrap();
    assert_eq!(edited.text, COMMENTED);
}

#[test]
fn property_lands_above_the_comments_of_the_first_method() {
    let edited = edit_source(
        COMMENTED,
        &ops(&[json!({"type": "add_property", "property": {"name": "count"}})]),
    )
    .unwrap();
    let expected = "<?php

// License: MIT
# hash
class A
{
    public $count;

    // keep me
    public function f()
    {
        // explain
        return 1;
    }
    /* closing */
}
";
    assert_eq!(edited.text, expected);
}

#[test]
fn added_method_keeps_existing_comments() {
    let edited = edit_source(
        COMMENTED,
        &ops(&[json!({"type": "add_method", "method": {"name": "g", "body": "return 2;"}})]),
    )
    .unwrap();
    for comment in ["// License: MIT", "# hash", "// keep me", "// explain", "/* closing */"] {
        assert!(edited.text.contains(comment), "lost {comment}");
    }
    assert!(edited.text.contains("    public function g()\n    {\n        return 2;\n    }\n"));
}

#[test]
fn generator_class_accepts_edits() {
    let source = "<?php class Rows { public function all() { yield 1; yield from $this->more(); } }";
    let edited = edit_source(
        source,
        &ops(&[json!({"type": "add_method", "method": {"name": "more", "body": "return [2, 3];"}})]),
    )
    .unwrap();
    assert!(edited.text.contains("        yield 1;\n        yield from $this->more();\n"));
    assert_eq!(analyze_source(&edited.text).unwrap().classes[0].methods.len(), 2);
}

#[test]
fn enum_only_file_has_no_class_to_edit() {
    let source = "<?php enum Status: string { case Active = 'a'; }";
    assert_eq!(analyze_source(source).unwrap().enums[0].cases, vec!["Active"]);
    let err = edit_source(source, &ops(&[json!({"type": "add_property", "property": {"name": "x"}})])).unwrap_err();
    assert!(matches!(err, EditError::NoClass));
}
