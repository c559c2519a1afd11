use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// FILE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ast {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Ast {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts, span: Span::default() }
    }
}

// =============================================================================
// NAMES, TYPES, MODIFIERS
// =============================================================================

/// A possibly qualified name kept as written (`Model`, `App\Models\User`,
/// `\DateTime`, `namespace\Foo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fully_qualified(&self) -> bool {
        self.0.starts_with('\\')
    }

    /// Last `\`-separated segment: `App\Models\User` → `User`.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('\\').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Named(Name),
    Nullable(Box<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(Name::new(name))
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Nullable(_) => true,
            Type::Named(n) => n.as_str().eq_ignore_ascii_case("null") || n.as_str().eq_ignore_ascii_case("mixed"),
            Type::Union(parts) => parts.iter().any(Type::is_nullable),
            Type::Intersection(_) => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::Nullable(inner) => write!(f, "?{inner}"),
            Type::Union(parts) => join_types(f, parts, "|"),
            Type::Intersection(parts) => join_types(f, parts, "&"),
        }
    }
}

fn join_types(f: &mut fmt::Formatter<'_>, parts: &[Type], sep: &str) -> fmt::Result {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        match part {
            // DNF: `(A&B)|null`
            Type::Intersection(_) if sep == "|" => write!(f, "({part})")?,
            _ => write!(f, "{part}")?,
        }
    }
    Ok(())
}

/// Member visibility. A closed set: anything else is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }

    pub const fn flag(&self) -> Modifiers {
        match self {
            Visibility::Public => Modifiers::PUBLIC,
            Visibility::Protected => Modifiers::PROTECTED,
            Visibility::Private => Modifiers::PRIVATE,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown visibility '{0}', expected public, protected or private")]
pub struct UnknownVisibility(pub String);

impl FromStr for Visibility {
    type Err = UnknownVisibility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            other => Err(UnknownVisibility(other.to_string())),
        }
    }
}

/// Declaration modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const PUBLIC: Modifiers = Modifiers(1 << 0);
    pub const PROTECTED: Modifiers = Modifiers(1 << 1);
    pub const PRIVATE: Modifiers = Modifiers(1 << 2);
    pub const STATIC: Modifiers = Modifiers(1 << 3);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 4);
    pub const FINAL: Modifiers = Modifiers(1 << 5);
    pub const READONLY: Modifiers = Modifiers(1 << 6);

    const VISIBILITY_MASK: u8 = Self::PUBLIC.0 | Self::PROTECTED.0 | Self::PRIVATE.0;

    pub const fn empty() -> Self {
        Modifiers(0)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Modifiers) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Modifiers, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub const fn has_visibility(&self) -> bool {
        self.0 & Self::VISIBILITY_MASK != 0
    }

    /// Effective visibility: private > protected > public-by-default.
    pub const fn visibility(&self) -> Visibility {
        if self.contains(Self::PRIVATE) {
            Visibility::Private
        } else if self.contains(Self::PROTECTED) {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }

    pub const fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }

    pub const fn is_abstract(&self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub const fn is_final(&self) -> bool {
        self.contains(Self::FINAL)
    }

    pub const fn is_readonly(&self) -> bool {
        self.contains(Self::READONLY)
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl From<Visibility> for Modifiers {
    fn from(value: Visibility) -> Self {
        value.flag()
    }
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Namespace(Namespace),
    Use(UseDecl),
    Declare(Vec<DeclareDirective>),
    /// `declare(ticks=1) { ... }`
    DeclareBlock { directives: Vec<DeclareDirective>, body: Vec<Stmt> },
    Const(Vec<ConstItem>),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Trait(TraitDecl),
    Enum(EnumDecl),
    Function(FunctionDecl),
    Expr(Expr),
    Echo(Vec<Expr>),
    Return(Option<Expr>),
    If(IfStmt),
    While { cond: Expr, body: Vec<Stmt> },
    DoWhile { body: Vec<Stmt>, cond: Expr },
    For(ForStmt),
    Foreach(ForeachStmt),
    Switch { subject: Expr, cases: Vec<SwitchCase> },
    Break(Option<Expr>),
    Continue(Option<Expr>),
    Throw(Expr),
    Try(TryStmt),
    Block(Vec<Stmt>),
    Global(Vec<String>),
    Static(Vec<StaticVar>),
    Unset(Vec<Expr>),
    Goto(String),
    Label(String),
    InlineHtml(String),
    /// A `//`, `#` or `/* */` comment, text as written.
    Comment(String),
    /// Placeholder that prints nothing.
    Nop,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Namespace {
    pub name: Option<Name>,
    pub stmts: Vec<Stmt>,
    pub braced: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UseKind {
    #[default]
    Normal,
    Function,
    Const,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UseDecl {
    pub kind: UseKind,
    pub items: Vec<UseItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UseItem {
    pub name: Name,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareDirective {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstItem {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub extends: Option<Name>,
    pub implements: Vec<Name>,
    pub members: Vec<ClassMember>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub extends: Vec<Name>,
    pub members: Vec<ClassMember>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitDecl {
    pub name: String,
    pub members: Vec<ClassMember>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

/// `enum Suit: string implements HasLabel { ... }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    /// Backing type of a backed enum.
    pub backing: Option<Type>,
    pub implements: Vec<Name>,
    pub members: Vec<ClassMember>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

/// One entry of a class-like body, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    TraitUse(TraitUse),
    Const(ClassConst),
    Property(PropertyDecl),
    Method(MethodDecl),
    /// `case Active = 'a';` inside an enum.
    Case(EnumCase),
    Comment(String),
}

impl ClassMember {
    pub fn as_method(&self) -> Option<&MethodDecl> {
        match self {
            ClassMember::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match self {
            ClassMember::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, ClassMember::Method(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, ClassMember::Comment(_))
    }
}

/// `use A, B { A::hello insteadof B; B::hello as protected greet; }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitUse {
    pub traits: Vec<Name>,
    /// Empty for the plain `use A, B;` form.
    pub adaptations: Vec<TraitAdaptation>,
}

impl TraitUse {
    pub fn new(traits: Vec<Name>) -> Self {
        Self { traits, adaptations: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraitAdaptation {
    /// `A::method insteadof B, C;`
    Precedence { trait_name: Name, method: String, instead_of: Vec<Name> },
    /// `[A::]method as [visibility] [alias];`
    Alias {
        trait_name: Option<Name>,
        method: String,
        visibility: Option<Visibility>,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumCase {
    pub name: String,
    /// Present only in backed enums.
    pub value: Option<Expr>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassConst {
    pub modifiers: Modifiers,
    pub items: Vec<ConstItem>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
}

/// `public ?string $a = null, $b;`: one declaration, possibly several names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub modifiers: Modifiers,
    pub ty: Option<Type>,
    pub props: Vec<PropertyItem>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyItem {
    /// Without the leading `$`.
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    /// `None` for abstract and interface methods.
    pub body: Option<Vec<Stmt>>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: Vec<Stmt>,
    pub doc_comment: Option<String>,
    pub attributes: Vec<String>,
    pub span: Span,
}

/// A parameter. `default: None` is a required parameter; a present default,
/// including `null`, makes it optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Param {
    /// Without the leading `$`.
    pub name: String,
    pub ty: Option<Type>,
    pub default: Option<Expr>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Constructor promotion flags; empty when not promoted.
    pub promoted: Modifiers,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then: Vec<Stmt>,
    pub elseifs: Vec<ElseIf>,
    pub otherwise: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIf {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: Vec<Expr>,
    pub cond: Vec<Expr>,
    pub step: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeachStmt {
    pub subject: Expr,
    pub key: Option<Expr>,
    pub value: Expr,
    pub by_ref: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub body: Vec<Stmt>,
    pub catches: Vec<Catch>,
    pub finally: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catch {
    pub types: Vec<Name>,
    pub var: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticVar {
    pub name: String,
    pub default: Option<Expr>,
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Integer literal as written (`42`, `0x1F`, `1_000`).
    Int(String),
    /// Float literal as written.
    Float(String),
    /// String literal as written, quotes included. Heredoc/nowdoc too.
    String(String),
}

impl Literal {
    /// Single-quoted PHP string literal for `value`.
    pub fn string(value: &str) -> Self {
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        Literal::String(format!("'{escaped}'"))
    }

    pub fn int(value: i64) -> Self {
        Literal::Int(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `$name`, stored without the `$`.
    Variable(String),
    /// `$$name` or `${expr}`.
    VariableVariable(Box<Expr>),
    Literal(Literal),
    Array { items: Vec<ArrayItem>, short: bool },
    /// Class reference in `new`, `::`, and `instanceof` position.
    Name(Name),
    ConstFetch(Name),
    ClassConstFetch { class: Box<Expr>, name: String },
    StaticPropertyFetch { class: Box<Expr>, name: String },
    PropertyFetch { object: Box<Expr>, name: Member, nullsafe: bool },
    MethodCall { object: Box<Expr>, name: Member, args: Vec<Arg>, nullsafe: bool },
    StaticCall { class: Box<Expr>, name: Member, args: Vec<Arg> },
    Call { callee: Box<Expr>, args: Vec<Arg> },
    New { class: Box<Expr>, args: Vec<Arg> },
    /// `new class(...) extends X { ... }`; the declaration's name is empty.
    AnonymousClass { args: Vec<Arg>, class: Box<ClassDecl> },
    Index { value: Box<Expr>, index: Option<Box<Expr>> },
    Assign { target: Box<Expr>, op: AssignOp, value: Box<Expr> },
    AssignRef { target: Box<Expr>, value: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, expr: Box<Expr> },
    IncDec { op: IncDecOp, expr: Box<Expr> },
    Cast { kind: CastKind, expr: Box<Expr> },
    Ternary { cond: Box<Expr>, then: Option<Box<Expr>>, otherwise: Box<Expr> },
    Instanceof { expr: Box<Expr>, class: Box<Expr> },
    Isset(Vec<Expr>),
    Empty(Box<Expr>),
    Closure(Box<Closure>),
    ArrowFn(Box<ArrowFn>),
    Match { subject: Box<Expr>, arms: Vec<MatchArm> },
    Clone(Box<Expr>),
    Print(Box<Expr>),
    Throw(Box<Expr>),
    /// `yield`, `yield $v` or `yield $k => $v`.
    Yield { key: Option<Box<Expr>>, value: Option<Box<Expr>> },
    YieldFrom(Box<Expr>),
    /// The `...` of a first-class callable, `strlen(...)`.
    VariadicPlaceholder,
    Include { kind: IncludeKind, expr: Box<Expr> },
    ErrorSuppress(Box<Expr>),
    Paren(Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Ident(String),
    /// `$obj->$prop` or `$obj->{expr}`.
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
    pub by_ref: bool,
    pub spread: bool,
}

impl ArrayItem {
    pub fn value(value: Expr) -> Self {
        Self { key: None, value, by_ref: false, spread: false }
    }

    pub fn keyed(key: Expr, value: Expr) -> Self {
        Self { key: Some(key), value, by_ref: false, spread: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    /// Named argument label.
    pub name: Option<String>,
    pub value: Expr,
    pub spread: bool,
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value, spread: false }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Closure {
    pub is_static: bool,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub uses: Vec<ClosureUse>,
    pub return_type: Option<Type>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFn {
    pub is_static: bool,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<Type>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    /// `None` for the `default` arm.
    pub conditions: Option<Vec<Expr>>,
    pub body: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    BooleanOr,
    BooleanAnd,
    LogicalOr,
    LogicalAnd,
    LogicalXor,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Spaceship,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    ShiftLeft,
    ShiftRight,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    BitwiseNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}
