//! # Printer Tests
//!
//! Layout tests for trees built by hand, without the parser.

use crate::ast::*;
use crate::printer::{print, print_expr, print_with, PrintOptions};
use pretty_assertions::assert_eq;

fn this_fetch(name: &str) -> Expr {
    Expr::PropertyFetch {
        object: Box::new(Expr::var("this")),
        name: Member::Ident(name.to_string()),
        nullsafe: false,
    }
}

fn user_class() -> ClassDecl {
    ClassDecl {
        name: "User".to_string(),
        extends: Some(Name::new("Model")),
        members: vec![
            ClassMember::Property(PropertyDecl {
                modifiers: Modifiers::PROTECTED,
                ty: Some(Type::named("string")),
                props: vec![PropertyItem { name: "name".to_string(), default: None }],
                ..Default::default()
            }),
            ClassMember::Method(MethodDecl {
                name: "getName".to_string(),
                modifiers: Modifiers::PUBLIC,
                return_type: Some(Type::named("string")),
                body: Some(vec![Stmt::Return(Some(this_fetch("name")))]),
                ..Default::default()
            }),
        ],
        ..Default::default()
    }
}

// =============================================================================
// FILE LAYOUT
// =============================================================================

#[test]
fn test_print_empty_file() {
    assert_eq!(print(&Ast::new(vec![])), "<?php\n");
}

#[test]
fn test_print_class_layout() {
    let ast = Ast::new(vec![Stmt::Class(user_class())]);
    let expected = "<?php\n\nclass User extends Model\n{\n    protected string $name;\n\n    public function getName(): string\n    {\n        return $this->name;\n    }\n}\n";
    assert_eq!(print(&ast), expected);
}

#[test]
fn test_print_namespace_and_uses() {
    let ast = Ast::new(vec![Stmt::Namespace(Namespace {
        name: Some(Name::new("App\\Models")),
        stmts: vec![
            Stmt::Use(UseDecl {
                kind: UseKind::Normal,
                items: vec![UseItem { name: Name::new("Foo\\Bar"), alias: None }],
            }),
            Stmt::Use(UseDecl {
                kind: UseKind::Function,
                items: vec![UseItem { name: Name::new("Foo\\helper"), alias: Some("h".to_string()) }],
            }),
            Stmt::Class(ClassDecl { name: "X".to_string(), ..Default::default() }),
        ],
        braced: false,
        span: Default::default(),
    })]);
    let expected = "<?php\n\nnamespace App\\Models;\n\nuse Foo\\Bar;\nuse function Foo\\helper as h;\n\nclass X\n{\n}\n";
    assert_eq!(print(&ast), expected);
}

#[test]
fn test_print_custom_indent() {
    let ast = Ast::new(vec![Stmt::Class(user_class())]);
    let text = print_with(&ast, &PrintOptions::with_indent_width(2));
    assert!(text.contains("\n  public function getName(): string\n  {\n    return $this->name;\n  }\n"));
}

// =============================================================================
// MEMBERS
// =============================================================================

#[test]
fn test_consecutive_properties_stay_together() {
    let prop = |name: &str| {
        ClassMember::Property(PropertyDecl {
            modifiers: Modifiers::PRIVATE,
            props: vec![PropertyItem { name: name.to_string(), default: None }],
            ..Default::default()
        })
    };
    let class = ClassDecl {
        name: "Pair".to_string(),
        modifiers: Modifiers::ABSTRACT,
        members: vec![
            prop("a"),
            prop("b"),
            ClassMember::Method(MethodDecl {
                name: "run".to_string(),
                modifiers: Modifiers::PROTECTED | Modifiers::ABSTRACT,
                return_type: Some(Type::named("void")),
                body: None,
                ..Default::default()
            }),
        ],
        ..Default::default()
    };
    let expected = "<?php\n\nabstract class Pair\n{\n    private $a;\n    private $b;\n\n    abstract protected function run(): void;\n}\n";
    assert_eq!(print(&Ast::new(vec![Stmt::Class(class)])), expected);
}

#[test]
fn test_parameter_defaults_and_promotion() {
    let method = MethodDecl {
        name: "__construct".to_string(),
        modifiers: Modifiers::PUBLIC,
        params: vec![
            Param {
                name: "id".to_string(),
                ty: Some(Type::named("int")),
                promoted: Modifiers::PRIVATE | Modifiers::READONLY,
                ..Default::default()
            },
            Param {
                name: "label".to_string(),
                ty: Some(Type::Nullable(Box::new(Type::named("string")))),
                default: Some(Expr::null()),
                ..Default::default()
            },
        ],
        body: Some(vec![]),
        ..Default::default()
    };
    let class = ClassDecl {
        name: "Tag".to_string(),
        members: vec![ClassMember::Method(method)],
        ..Default::default()
    };
    let text = print(&Ast::new(vec![Stmt::Class(class)]));
    assert!(text.contains(
        "public function __construct(private readonly int $id, ?string $label = null)\n    {\n    }\n"
    ));
}

#[test]
fn test_comments_sit_against_the_next_member() {
    let class = ClassDecl {
        name: "A".to_string(),
        members: vec![
            ClassMember::Comment("// ids".to_string()),
            ClassMember::Property(PropertyDecl {
                modifiers: Modifiers::PRIVATE,
                props: vec![PropertyItem { name: "id".to_string(), default: None }],
                ..Default::default()
            }),
            ClassMember::Comment("/*\n     * Runs.\n     */".to_string()),
            ClassMember::Method(MethodDecl {
                name: "run".to_string(),
                modifiers: Modifiers::PUBLIC,
                body: Some(vec![Stmt::Comment("# nothing yet".to_string())]),
                ..Default::default()
            }),
            ClassMember::Comment("// end".to_string()),
        ],
        ..Default::default()
    };
    let ast = Ast::new(vec![Stmt::Comment("// License: MIT".to_string()), Stmt::Class(class)]);
    let expected = "<?php\n\n// License: MIT\nclass A\n{\n    // ids\n    private $id;\n\n    /*\n     * Runs.\n     */\n    public function run()\n    {\n        # nothing yet\n    }\n    // end\n}\n";
    assert_eq!(print(&ast), expected);
}

#[test]
fn test_print_backed_enum() {
    let e = EnumDecl {
        name: "Status".to_string(),
        backing: Some(Type::named("string")),
        implements: vec![Name::new("HasLabel")],
        members: vec![
            ClassMember::Case(EnumCase {
                name: "Active".to_string(),
                value: Some(Expr::Literal(Literal::string("a"))),
                ..Default::default()
            }),
            ClassMember::Case(EnumCase {
                name: "Gone".to_string(),
                value: Some(Expr::Literal(Literal::string("g"))),
                ..Default::default()
            }),
        ],
        ..Default::default()
    };
    let expected = "<?php\n\nenum Status: string implements HasLabel\n{\n    case Active = 'a';\n    case Gone = 'g';\n}\n";
    assert_eq!(print(&Ast::new(vec![Stmt::Enum(e)])), expected);
}

#[test]
fn test_print_trait_adaptations() {
    let used = TraitUse {
        traits: vec![Name::new("A"), Name::new("B")],
        adaptations: vec![
            TraitAdaptation::Precedence {
                trait_name: Name::new("A"),
                method: "hello".to_string(),
                instead_of: vec![Name::new("B")],
            },
            TraitAdaptation::Alias {
                trait_name: Some(Name::new("B")),
                method: "hello".to_string(),
                visibility: Some(Visibility::Protected),
                alias: Some("greet".to_string()),
            },
            TraitAdaptation::Alias {
                trait_name: None,
                method: "bye".to_string(),
                visibility: Some(Visibility::Private),
                alias: None,
            },
        ],
    };
    let class = ClassDecl {
        name: "C".to_string(),
        members: vec![ClassMember::TraitUse(used)],
        ..Default::default()
    };
    let text = print(&Ast::new(vec![Stmt::Class(class)]));
    assert!(text.contains(
        "    use A, B {\n        A::hello insteadof B;\n        B::hello as protected greet;\n        bye as private;\n    }\n"
    ));
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[test]
fn test_print_generator_expressions() {
    let keyed = Expr::Yield {
        key: Some(Box::new(Expr::var("k"))),
        value: Some(Box::new(Expr::var("v"))),
    };
    assert_eq!(print_expr(&keyed), "yield $k => $v");
    assert_eq!(print_expr(&Expr::Yield { key: None, value: None }), "yield");
    assert_eq!(print_expr(&Expr::YieldFrom(Box::new(Expr::var("inner")))), "yield from $inner");
}

#[test]
fn test_print_variable_variables() {
    let simple = Expr::VariableVariable(Box::new(Expr::var("name")));
    assert_eq!(print_expr(&simple), "$$name");
    let braced = Expr::VariableVariable(Box::new(Expr::Binary {
        op: BinaryOp::Concat,
        left: Box::new(Expr::Literal(Literal::string("a"))),
        right: Box::new(Expr::var("b")),
    }));
    assert_eq!(print_expr(&braced), "${'a' . $b}");
}

#[test]
fn test_print_anonymous_class() {
    let e = Expr::AnonymousClass {
        args: vec![Arg::positional(Expr::Literal(Literal::int(1)))],
        class: Box::new(ClassDecl {
            implements: vec![Name::new("Countable")],
            members: vec![ClassMember::Method(MethodDecl {
                name: "count".to_string(),
                modifiers: Modifiers::PUBLIC,
                return_type: Some(Type::named("int")),
                body: Some(vec![Stmt::Return(Some(Expr::Literal(Literal::int(0))))]),
                ..Default::default()
            })],
            ..Default::default()
        }),
    };
    assert_eq!(
        print_expr(&e),
        "new class(1) implements Countable {\n    public function count(): int\n    {\n        return 0;\n    }\n}"
    );
}

#[test]
fn test_print_closure_nests_body() {
    let closure = Expr::Closure(Box::new(Closure {
        params: vec![Param { name: "x".to_string(), ..Default::default() }],
        uses: vec![ClosureUse { name: "a".to_string(), by_ref: true }],
        body: vec![Stmt::Return(Some(Expr::var("a")))],
        ..Default::default()
    }));
    assert_eq!(print_expr(&closure), "function ($x) use (&$a) {\n    return $a;\n}");
}

#[test]
fn test_print_double_negation_keeps_space() {
    let e = Expr::Unary {
        op: UnaryOp::Neg,
        expr: Box::new(Expr::Unary { op: UnaryOp::Neg, expr: Box::new(Expr::var("a")) }),
    };
    assert_eq!(print_expr(&e), "- -$a");
}

#[test]
fn test_print_keyed_short_array() {
    let e = Expr::Array {
        items: vec![
            ArrayItem::keyed(Expr::Literal(Literal::string("a")), Expr::Literal(Literal::int(1))),
            ArrayItem::value(Expr::Literal(Literal::Bool(true))),
        ],
        short: true,
    };
    assert_eq!(print_expr(&e), "['a' => 1, true]");
}
