use crate::error::ParseErrorKind;
use crate::{parse, parse_expr, parse_type};
use php_ast::*;

fn class(source: &str) -> ClassDecl {
    let ast = parse(source).unwrap();
    ast.stmts
        .into_iter()
        .find_map(|stmt| match stmt {
            Stmt::Class(class) => Some(class),
            _ => None,
        })
        .expect("class in source")
}

fn expr(source: &str) -> Expr {
    parse_expr(source).unwrap()
}

// =============================================================================
// DECLARATIONS
// =============================================================================

#[test]
fn test_class_with_members() {
    let class = class(
        "<?php
final class User extends Model implements JsonSerializable, Countable
{
    use HasName;

    const KIND = 'user';

    protected string $name;

    public function getName(): string
    {
        return $this->name;
    }
}
",
    );
    assert_eq!(class.name, "User");
    assert!(class.modifiers.is_final());
    assert_eq!(class.extends, Some(Name::new("Model")));
    assert_eq!(class.implements.len(), 2);
    assert_eq!(class.members.len(), 4);
    assert!(matches!(class.members[0], ClassMember::TraitUse(_)));
    assert!(matches!(class.members[1], ClassMember::Const(_)));

    let property = class.members[2].as_property().unwrap();
    assert_eq!(property.modifiers.visibility(), Visibility::Protected);
    assert_eq!(property.props[0].name, "name");

    let method = class.members[3].as_method().unwrap();
    assert_eq!(method.name, "getName");
    assert_eq!(method.return_type, Some(Type::named("string")));
    assert_eq!(method.body.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_abstract_method_has_no_body() {
    let class = class("<?php abstract class A { abstract protected function run(int $n): void; }");
    let method = class.members[0].as_method().unwrap();
    assert!(method.modifiers.is_abstract());
    assert!(method.body.is_none());
}

#[test]
fn test_multi_name_property() {
    let class = class("<?php class A { public static ?int $a = 1, $b; var $c; }");
    let first = class.members[0].as_property().unwrap();
    assert!(first.modifiers.is_static());
    assert_eq!(first.ty, Some(Type::Nullable(Box::new(Type::named("int")))));
    assert_eq!(first.props.len(), 2);
    assert!(first.props[1].default.is_none());

    let var = class.members[1].as_property().unwrap();
    assert!(var.modifiers.is_empty());
    assert_eq!(var.ty, None);
}

#[test]
fn test_params_distinguish_null_default_from_required() {
    let class = class("<?php class A { function f(string $a, ?string $b = null, &$c, int ...$rest) {} }");
    let params = &class.members[0].as_method().unwrap().params;
    assert_eq!(params.len(), 4);
    assert!(params[0].default.is_none());
    assert_eq!(params[1].default, Some(Expr::Literal(Literal::Null)));
    assert!(params[2].by_ref);
    assert!(params[2].ty.is_none());
    assert!(params[3].variadic);
}

#[test]
fn test_constructor_promotion() {
    let class = class("<?php class A { public function __construct(private readonly int $id) {} }");
    let param = &class.members[0].as_method().unwrap().params[0];
    assert!(param.promoted.contains(Modifiers::PRIVATE));
    assert!(param.promoted.is_readonly());
}

#[test]
fn test_doc_comments_attach_to_declarations() {
    let class = class(
        "<?php
/** A user. */
class User {
    /** The name. */
    public function name() {}
}",
    );
    assert_eq!(class.doc_comment.as_deref(), Some("/** A user. */"));
    let method = class.members[0].as_method().unwrap();
    assert_eq!(method.doc_comment.as_deref(), Some("/** The name. */"));
}

#[test]
fn test_attributes_are_kept_raw() {
    let class = class("<?php #[Entity(table: 'users')] class User {}");
    assert_eq!(class.attributes, vec!["#[Entity(table: 'users')]".to_string()]);
}

#[test]
fn test_repeated_visibility_is_rejected() {
    let err = parse("<?php class A { public private $x; }").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidModifier { .. }));

    let err = parse("<?php class A { static static function f() {} }").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidModifier { .. }));
}

#[test]
fn test_abstract_final_class_is_rejected() {
    let err = parse("<?php abstract final class A {}").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::InvalidModifier { .. }));
}

#[test]
fn test_interface_and_trait() {
    let ast = parse("<?php interface Shape extends A, B { public function area(): float; } trait T { private $x; }").unwrap();
    match &ast.stmts[0] {
        Stmt::Interface(iface) => {
            assert_eq!(iface.name, "Shape");
            assert_eq!(iface.extends.len(), 2);
            assert!(iface.members[0].as_method().unwrap().body.is_none());
        }
        other => panic!("expected interface, got {other:?}"),
    }
    assert!(matches!(&ast.stmts[1], Stmt::Trait(t) if t.name == "T"));
}

#[test]
fn test_unbraced_namespace_collects_following_statements() {
    let ast = parse("<?php\nnamespace App\\Models;\n\nuse Carbon\\Carbon;\n\nclass User {}\n").unwrap();
    assert_eq!(ast.stmts.len(), 1);
    match &ast.stmts[0] {
        Stmt::Namespace(ns) => {
            assert_eq!(ns.name, Some(Name::new("App\\Models")));
            assert!(!ns.braced);
            assert_eq!(ns.stmts.len(), 2);
        }
        other => panic!("expected namespace, got {other:?}"),
    }
}

#[test]
fn test_braced_namespaces() {
    let ast = parse("<?php namespace A { class X {} } namespace B { function f() {} }").unwrap();
    assert_eq!(ast.stmts.len(), 2);
    assert!(matches!(&ast.stmts[1], Stmt::Namespace(ns) if ns.braced && ns.stmts.len() == 1));
}

#[test]
fn test_group_use() {
    let ast = parse("<?php use App\\{Foo, Bar as Baz}; use function strlen;").unwrap();
    match &ast.stmts[0] {
        Stmt::Use(decl) => {
            assert_eq!(decl.items.len(), 2);
            assert_eq!(decl.items[0].name, Name::new("App\\Foo"));
            assert_eq!(decl.items[1].alias.as_deref(), Some("Baz"));
        }
        other => panic!("expected use, got {other:?}"),
    }
    assert!(matches!(&ast.stmts[1], Stmt::Use(decl) if decl.kind == UseKind::Function));
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[test]
fn test_control_flow() {
    let ast = parse(
        "<?php
if ($a) { echo 1; } elseif ($b) { echo 2; } else { echo 3; }
while ($i < 10) $i++;
do { $i--; } while ($i > 0);
for ($i = 0; $i < 3; $i++) {}
foreach ($items as $key => &$item) {}
switch ($x) { case 1: break; default: return; }
try { f(); } catch (A|B $e) {} finally {}
",
    )
    .unwrap();
    assert_eq!(ast.stmts.len(), 7);
    match &ast.stmts[0] {
        Stmt::If(stmt) => {
            assert_eq!(stmt.elseifs.len(), 1);
            assert!(stmt.otherwise.is_some());
        }
        other => panic!("expected if, got {other:?}"),
    }
    assert!(matches!(&ast.stmts[1], Stmt::While { body, .. } if body.len() == 1));
    assert!(matches!(&ast.stmts[4], Stmt::Foreach(f) if f.by_ref && f.key.is_some()));
    assert!(matches!(&ast.stmts[5], Stmt::Switch { cases, .. } if cases.len() == 2 && cases[1].test.is_none()));
    match &ast.stmts[6] {
        Stmt::Try(stmt) => {
            assert_eq!(stmt.catches[0].types.len(), 2);
            assert!(stmt.finally.is_some());
        }
        other => panic!("expected try, got {other:?}"),
    }
}

#[test]
fn test_inline_html_and_close_tag() {
    let ast = parse("<p><?php echo $x ?></p>").unwrap();
    assert!(matches!(&ast.stmts[0], Stmt::InlineHtml(html) if html == "<p>"));
    assert!(ast.stmts.iter().any(|s| matches!(s, Stmt::Echo(_))));
}

#[test]
fn test_unsupported_constructs_report_errors() {
    for source in [
        "<?php class A { public string $name { get => 'x'; } }",
        "<?php [, $b] = $pair;",
        "<?php #[Pure] $x = 1;",
        "<?php __halt_compiler();",
    ] {
        let err = parse(source).unwrap_err();
        assert!(
            matches!(err.kind, ParseErrorKind::Unsupported(_)),
            "{source}: {err}"
        );
    }
}

// =============================================================================
// COMMENTS
// =============================================================================

#[test]
fn test_comments_become_statements_and_members() {
    let ast = parse(
        "<?php
// License: MIT
class A {
    // keep me
    public function f() {
        # explain
        return 1;
    }
    /* trailing */
}",
    )
    .unwrap();
    assert!(matches!(&ast.stmts[0], Stmt::Comment(c) if c == "// License: MIT"));
    let Stmt::Class(class) = &ast.stmts[1] else {
        panic!("expected class, got {:?}", ast.stmts[1]);
    };
    assert!(matches!(&class.members[0], ClassMember::Comment(c) if c == "// keep me"));
    let method = class.members[1].as_method().unwrap();
    let body = method.body.as_ref().unwrap();
    assert!(matches!(&body[0], Stmt::Comment(c) if c == "# explain"));
    assert!(matches!(&body[1], Stmt::Return(_)));
    assert!(matches!(&class.members[2], ClassMember::Comment(c) if c == "/* trailing */"));
}

#[test]
fn test_stray_doc_comment_is_kept_as_comment() {
    let ast = parse("<?php\n/** @var int $x */\n$x = 1;").unwrap();
    assert!(matches!(&ast.stmts[0], Stmt::Comment(c) if c == "/** @var int $x */"));
    assert!(matches!(&ast.stmts[1], Stmt::Expr(_)));
}

// =============================================================================
// LANGUAGE FEATURES
// =============================================================================

#[test]
fn test_generators() {
    let class = class("<?php class R { public function all() { foreach ($this->rows as $r) { yield $r; } } }");
    let body = class.members[0].as_method().unwrap().body.as_ref().unwrap();
    let Stmt::Foreach(each) = &body[0] else {
        panic!("expected foreach, got {:?}", body[0]);
    };
    assert!(matches!(&each.body[0], Stmt::Expr(Expr::Yield { key: None, value: Some(_) })));

    assert!(matches!(expr("yield $k => $v"), Expr::Yield { key: Some(_), value: Some(_) }));
    assert!(matches!(expr("yield from gen()"), Expr::YieldFrom(_)));
    assert!(matches!(expr("yield"), Expr::Yield { key: None, value: None }));
    assert!(matches!(expr("$x = yield"), Expr::Assign { .. }));
}

#[test]
fn test_backed_enum() {
    let ast = parse("<?php enum Status: string implements HasLabel { case Active = 'a'; case Gone = 'g'; const DEFAULT = self::Active; public function label(): string { return $this->value; } }").unwrap();
    let Stmt::Enum(e) = &ast.stmts[0] else {
        panic!("expected enum, got {:?}", ast.stmts[0]);
    };
    assert_eq!(e.name, "Status");
    assert_eq!(e.backing, Some(Type::named("string")));
    assert_eq!(e.implements, vec![Name::new("HasLabel")]);
    assert!(matches!(&e.members[0], ClassMember::Case(c) if c.name == "Active" && c.value.is_some()));
    assert!(matches!(&e.members[2], ClassMember::Const(_)));
    assert!(e.members[3].is_method());

    let pure = parse("<?php enum Suit { case Hearts; case Spades; }").unwrap();
    assert!(matches!(&pure.stmts[0], Stmt::Enum(e) if e.backing.is_none() && e.members.len() == 2));
}

#[test]
fn test_anonymous_class() {
    let e = expr("new class($db) extends Base implements Countable { public function count(): int { return 0; } }");
    let Expr::AnonymousClass { args, class } = e else {
        panic!("expected anonymous class");
    };
    assert_eq!(args.len(), 1);
    assert_eq!(class.extends, Some(Name::new("Base")));
    assert_eq!(class.implements, vec![Name::new("Countable")]);
    assert!(class.members[0].is_method());
    assert!(matches!(expr("new class {}"), Expr::AnonymousClass { args, .. } if args.is_empty()));
}

#[test]
fn test_goto_and_labels() {
    let ast = parse("<?php start: $i++; if ($i < 3) { goto start; }").unwrap();
    assert_eq!(ast.stmts[0], Stmt::Label("start".to_string()));
    let Stmt::If(stmt) = &ast.stmts[2] else {
        panic!("expected if, got {:?}", ast.stmts[2]);
    };
    assert_eq!(stmt.then, vec![Stmt::Goto("start".to_string())]);
}

#[test]
fn test_alternative_syntax_matches_braces() {
    let braces = parse(
        "<?php if ($a) { echo 1; } elseif ($b) { echo 2; } else { echo 3; }
        while ($x) { $x--; }
        for ($i = 0; $i < 2; $i++) { f(); }
        foreach ($xs as $x) { g($x); }
        switch ($v) { case 1: h(); break; default: break; }",
    )
    .unwrap();
    let alternative = parse(
        "<?php if ($a): echo 1; elseif ($b): echo 2; else: echo 3; endif;
        while ($x): $x--; endwhile;
        for ($i = 0; $i < 2; $i++): f(); endfor;
        foreach ($xs as $x): g($x); endforeach;
        switch ($v): case 1: h(); break; default: break; endswitch;",
    )
    .unwrap();
    assert_eq!(alternative.stmts, braces.stmts);
}

#[test]
fn test_alternative_syntax_in_templates() {
    let ast = parse("<ul><?php foreach ($items as $item): ?><li><?= $item ?></li><?php endforeach; ?></ul>").unwrap();
    let Some(Stmt::Foreach(each)) = ast.stmts.iter().find(|s| matches!(s, Stmt::Foreach(_))) else {
        panic!("expected foreach in {:?}", ast.stmts);
    };
    assert!(each.body.iter().any(|s| matches!(s, Stmt::InlineHtml(html) if html == "<li>")));
    assert!(each.body.iter().any(|s| matches!(s, Stmt::Echo(_))));
}

#[test]
fn test_declare_block() {
    let ast = parse("<?php declare(ticks=1) { tick(); } declare(ticks=2): tock(); enddeclare;").unwrap();
    assert!(matches!(&ast.stmts[0], Stmt::DeclareBlock { body, .. } if body.len() == 1));
    assert!(matches!(&ast.stmts[1], Stmt::DeclareBlock { body, .. } if body.len() == 1));
}

#[test]
fn test_first_class_callables() {
    let Expr::Call { args, .. } = expr("strlen(...)") else {
        panic!("expected call");
    };
    assert_eq!(args, vec![Arg::positional(Expr::VariadicPlaceholder)]);
    assert!(matches!(expr("$this->handle(...)"), Expr::MethodCall { .. }));
    assert!(matches!(expr("Str::upper(...)"), Expr::StaticCall { .. }));
}

#[test]
fn test_variable_variables() {
    assert_eq!(expr("$$name"), Expr::VariableVariable(Box::new(Expr::var("name"))));
    assert!(matches!(expr("${'a' . $b}"), Expr::VariableVariable(inner) if matches!(*inner, Expr::Binary { .. })));
    assert!(matches!(expr("$$name = 1"), Expr::Assign { .. }));
    assert!(matches!(expr("$$$deep"), Expr::VariableVariable(inner) if matches!(*inner, Expr::VariableVariable(_))));
}

#[test]
fn test_trait_adaptations() {
    let class = class(
        "<?php class C { use A, B { A::hello insteadof B; B::hello as protected greet; bye as private; } }",
    );
    let ClassMember::TraitUse(used) = &class.members[0] else {
        panic!("expected trait use, got {:?}", class.members[0]);
    };
    assert_eq!(used.traits, vec![Name::new("A"), Name::new("B")]);
    assert_eq!(
        used.adaptations,
        vec![
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
        ]
    );
}

#[test]
fn test_error_reports_position() {
    let err = parse("<?php\nclass A {\n    public function f( {}\n}").unwrap_err();
    assert_eq!(err.position.line, 2);
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_unclosed_class_is_eof_error() {
    let err = parse("<?php class A {").unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[test]
fn test_precedence() {
    match expr("1 + 2 * 3") {
        Expr::Binary { op: BinaryOp::Add, right, .. } => {
            assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
        }
        other => panic!("expected addition, got {other:?}"),
    }
}

#[test]
fn test_pow_is_right_associative() {
    match expr("2 ** 3 ** 2") {
        Expr::Binary { op: BinaryOp::Pow, left, right } => {
            assert!(matches!(*left, Expr::Literal(Literal::Int(_))));
            assert!(matches!(*right, Expr::Binary { op: BinaryOp::Pow, .. }));
        }
        other => panic!("expected pow, got {other:?}"),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    match expr("$a = $b = 1") {
        Expr::Assign { value, .. } => assert!(matches!(*value, Expr::Assign { .. })),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_not_binds_looser_than_instanceof() {
    match expr("!$a instanceof B") {
        Expr::Unary { op: UnaryOp::Not, expr } => assert!(matches!(*expr, Expr::Instanceof { .. })),
        other => panic!("expected negation, got {other:?}"),
    }
}

#[test]
fn test_short_ternary_and_coalesce() {
    assert!(matches!(expr("$a ?: $b"), Expr::Ternary { then: None, .. }));
    assert!(matches!(expr("$a ?? $b ?? $c"), Expr::Binary { op: BinaryOp::Coalesce, .. }));
}

#[test]
fn test_member_chains() {
    match expr("$this->repo?->find($id)->name") {
        Expr::PropertyFetch { object, name, nullsafe } => {
            assert!(!nullsafe);
            assert_eq!(name, Member::Ident("name".into()));
            assert!(matches!(*object, Expr::MethodCall { nullsafe: true, .. }));
        }
        other => panic!("expected property fetch, got {other:?}"),
    }
}

#[test]
fn test_static_access() {
    assert!(matches!(expr("static::create()"), Expr::StaticCall { .. }));
    assert!(matches!(expr("User::class"), Expr::ClassConstFetch { name, .. } if name == "class"));
    assert!(matches!(expr("self::$count"), Expr::StaticPropertyFetch { name, .. } if name == "count"));
}

#[test]
fn test_named_and_spread_arguments() {
    match expr("f(...$args, key: 1)") {
        Expr::Call { args, .. } => {
            assert!(args[0].spread);
            assert_eq!(args[1].name.as_deref(), Some("key"));
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_arrays() {
    match expr("['a' => 1, ...$rest, &$ref]") {
        Expr::Array { items, short } => {
            assert!(short);
            assert!(items[0].key.is_some());
            assert!(items[1].spread);
            assert!(items[2].by_ref);
        }
        other => panic!("expected array, got {other:?}"),
    }
    assert!(matches!(expr("array(1, 2,)"), Expr::Array { short: false, items } if items.len() == 2));
}

#[test]
fn test_closures_and_arrow_functions() {
    match expr("function ($x) use (&$total): int { return $x; }") {
        Expr::Closure(closure) => {
            assert!(closure.uses[0].by_ref);
            assert_eq!(closure.return_type, Some(Type::named("int")));
        }
        other => panic!("expected closure, got {other:?}"),
    }
    assert!(matches!(expr("static fn($x) => $x * 2"), Expr::ArrowFn(f) if f.is_static));
}

#[test]
fn test_match_expression() {
    match expr("match ($x) { 1, 2 => 'low', default => 'high' }") {
        Expr::Match { arms, .. } => {
            assert_eq!(arms[0].conditions.as_ref().map(Vec::len), Some(2));
            assert!(arms[1].conditions.is_none());
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn test_new_and_casts() {
    assert!(matches!(expr("new DateTime('now')"), Expr::New { args, .. } if args.len() == 1));
    assert!(matches!(expr("new $class"), Expr::New { args, .. } if args.is_empty()));
    assert!(matches!(expr("(int) $x"), Expr::Cast { kind: CastKind::Int, .. }));
}

#[test]
fn test_keywords_as_literals_and_constants() {
    assert_eq!(expr("TRUE"), Expr::Literal(Literal::Bool(true)));
    assert_eq!(expr("null"), Expr::Literal(Literal::Null));
    assert_eq!(expr("PHP_EOL"), Expr::ConstFetch(Name::new("PHP_EOL")));
}

#[test]
fn test_assignment_to_non_lvalue_is_rejected() {
    assert!(parse_expr("1 = 2").is_err());
}

// =============================================================================
// TYPES
// =============================================================================

#[test]
fn test_types() {
    assert_eq!(parse_type("int|string|null").unwrap().to_string(), "int|string|null");
    assert_eq!(parse_type("A&B").unwrap(), Type::Intersection(vec![Type::named("A"), Type::named("B")]));
    assert_eq!(parse_type("(A&B)|null").unwrap().to_string(), "(A&B)|null");
    assert!(parse_type("?").is_err());
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 2_000;
    let source = format!("<?php $x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    assert!(parse(&source).is_ok());
}
