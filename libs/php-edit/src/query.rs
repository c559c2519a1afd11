//! # Tree Query Engine
//!
//! Finds declaration nodes by kind. Traversal is pre-order in source order
//! and enters only namespaces (into their statements) and class-likes (into
//! their members). Function and method bodies are never searched, so a
//! class declared inside an `if` or a function is not found.
//!
//! Nodes have no stable identity. Callers that mutate the tree look their
//! target up again afterwards instead of holding on to references.
//!
//! ## Example
//!
//! ```rust
//! use php_edit::query::{find_all, NodeKind};
//!
//! let ast = php_parser::parse("<?php class A { function f() {} function g() {} }").unwrap();
//! assert_eq!(find_all(&ast, NodeKind::Method).len(), 2);
//! ```

use php_ast::{
    Ast, ClassConst, ClassDecl, ClassMember, EnumCase, EnumDecl, FunctionDecl, InterfaceDecl, MethodDecl,
    Namespace, PropertyDecl, Stmt, TraitDecl, TraitUse, UseDecl,
};

/// Structural node kinds the query engine can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Namespace,
    Class,
    Interface,
    Trait,
    Enum,
    Function,
    Method,
    Property,
    ClassConst,
    EnumCase,
    TraitUse,
    Use,
}

/// A borrowed node returned by [`find_all`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Namespace(&'a Namespace),
    Class(&'a ClassDecl),
    Interface(&'a InterfaceDecl),
    Trait(&'a TraitDecl),
    Enum(&'a EnumDecl),
    Function(&'a FunctionDecl),
    Method(&'a MethodDecl),
    Property(&'a PropertyDecl),
    ClassConst(&'a ClassConst),
    EnumCase(&'a EnumCase),
    TraitUse(&'a TraitUse),
    Use(&'a UseDecl),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Namespace(_) => NodeKind::Namespace,
            NodeRef::Class(_) => NodeKind::Class,
            NodeRef::Interface(_) => NodeKind::Interface,
            NodeRef::Trait(_) => NodeKind::Trait,
            NodeRef::Enum(_) => NodeKind::Enum,
            NodeRef::Function(_) => NodeKind::Function,
            NodeRef::Method(_) => NodeKind::Method,
            NodeRef::Property(_) => NodeKind::Property,
            NodeRef::ClassConst(_) => NodeKind::ClassConst,
            NodeRef::EnumCase(_) => NodeKind::EnumCase,
            NodeRef::TraitUse(_) => NodeKind::TraitUse,
            NodeRef::Use(_) => NodeKind::Use,
        }
    }
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Collect every node of `kind`, in source order. Empty when nothing matches.
pub fn find_all(ast: &Ast, kind: NodeKind) -> Vec<NodeRef<'_>> {
    let mut found = Vec::new();
    walk_stmts(&ast.stmts, &mut |node| {
        if node.kind() == kind {
            found.push(node);
        }
    });
    found
}

fn walk_stmts<'a>(stmts: &'a [Stmt], visit: &mut impl FnMut(NodeRef<'a>)) {
    for stmt in stmts {
        match stmt {
            Stmt::Namespace(ns) => {
                visit(NodeRef::Namespace(ns));
                walk_stmts(&ns.stmts, visit);
            }
            Stmt::Use(decl) => visit(NodeRef::Use(decl)),
            Stmt::Class(class) => {
                visit(NodeRef::Class(class));
                walk_members(&class.members, visit);
            }
            Stmt::Interface(iface) => {
                visit(NodeRef::Interface(iface));
                walk_members(&iface.members, visit);
            }
            Stmt::Trait(tr) => {
                visit(NodeRef::Trait(tr));
                walk_members(&tr.members, visit);
            }
            Stmt::Enum(e) => {
                visit(NodeRef::Enum(e));
                walk_members(&e.members, visit);
            }
            Stmt::Function(f) => visit(NodeRef::Function(f)),
            _ => {}
        }
    }
}

fn walk_members<'a>(members: &'a [ClassMember], visit: &mut impl FnMut(NodeRef<'a>)) {
    for member in members {
        match member {
            ClassMember::TraitUse(used) => visit(NodeRef::TraitUse(used)),
            ClassMember::Const(c) => visit(NodeRef::ClassConst(c)),
            ClassMember::Property(p) => visit(NodeRef::Property(p)),
            ClassMember::Method(m) => visit(NodeRef::Method(m)),
            ClassMember::Case(c) => visit(NodeRef::EnumCase(c)),
            ClassMember::Comment(_) => {}
        }
    }
}

// =============================================================================
// TYPED HELPERS
// =============================================================================

pub fn classes(ast: &Ast) -> Vec<&ClassDecl> {
    find_all(ast, NodeKind::Class)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Class(class) => Some(class),
            _ => None,
        })
        .collect()
}

pub fn interfaces(ast: &Ast) -> Vec<&InterfaceDecl> {
    find_all(ast, NodeKind::Interface)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Interface(iface) => Some(iface),
            _ => None,
        })
        .collect()
}

pub fn traits(ast: &Ast) -> Vec<&TraitDecl> {
    find_all(ast, NodeKind::Trait)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Trait(tr) => Some(tr),
            _ => None,
        })
        .collect()
}

pub fn enums(ast: &Ast) -> Vec<&EnumDecl> {
    find_all(ast, NodeKind::Enum)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Enum(e) => Some(e),
            _ => None,
        })
        .collect()
}

pub fn functions(ast: &Ast) -> Vec<&FunctionDecl> {
    find_all(ast, NodeKind::Function)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Function(f) => Some(f),
            _ => None,
        })
        .collect()
}

/// Every `use` import, top level and inside namespaces.
pub fn uses(ast: &Ast) -> Vec<&UseDecl> {
    find_all(ast, NodeKind::Use)
        .into_iter()
        .filter_map(|node| match node {
            NodeRef::Use(decl) => Some(decl),
            _ => None,
        })
        .collect()
}

/// The first namespace in the file. Later namespaces are ignored.
pub fn first_namespace(ast: &Ast) -> Option<&Namespace> {
    ast.stmts.iter().find_map(|stmt| match stmt {
        Stmt::Namespace(ns) => Some(ns),
        _ => None,
    })
}

/// Mutable access to the first class, in the same order as [`classes`].
pub fn first_class_mut(ast: &mut Ast) -> Option<&mut ClassDecl> {
    first_class_in(&mut ast.stmts)
}

fn first_class_in(stmts: &mut [Stmt]) -> Option<&mut ClassDecl> {
    for stmt in stmts {
        match stmt {
            Stmt::Class(class) => return Some(class),
            Stmt::Namespace(ns) => {
                if let Some(class) = first_class_in(&mut ns.stmts) {
                    return Some(class);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index into `class.members` of the method called `name`.
/// PHP method names are case-insensitive.
pub fn method_index(class: &ClassDecl, name: &str) -> Option<usize> {
    class
        .members
        .iter()
        .position(|member| member.as_method().is_some_and(|m| m.name.eq_ignore_ascii_case(name)))
}

/// Index into `class.members` of the first method.
pub fn first_method_index(class: &ClassDecl) -> Option<usize> {
    class.members.iter().position(ClassMember::is_method)
}

/// Like [`first_method_index`], but stepping back over the comments
/// directly above that method.
pub fn first_method_block_index(class: &ClassDecl) -> Option<usize> {
    let mut index = first_method_index(class)?;
    while index > 0 && class.members[index - 1].is_comment() {
        index -= 1;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use php_ast::Name;

    const SOURCE: &str = "<?php
namespace App;

use Foo\\Bar;

interface Named { public function name(): string; }

class User implements Named {
    use HasTimestamps;
    const TABLE = 'users';
    private $id;
    public function name(): string {
        $inner = function () {};
        return 'x';
    }
}

function helper() {
    class Hidden {}
}

namespace Other;

class Second {}
";

    fn ast() -> Ast {
        php_parser::parse(SOURCE).unwrap()
    }

    #[test]
    fn finds_classes_through_namespaces_in_order() {
        let ast = ast();
        let names: Vec<&str> = classes(&ast).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Second"]);
    }

    #[test]
    fn does_not_enter_function_bodies() {
        let ast = ast();
        assert!(classes(&ast).iter().all(|c| c.name != "Hidden"));
        assert_eq!(functions(&ast).len(), 1);
    }

    #[test]
    fn methods_include_interface_members() {
        let ast = ast();
        assert_eq!(find_all(&ast, NodeKind::Method).len(), 2);
        assert_eq!(find_all(&ast, NodeKind::TraitUse).len(), 1);
        assert_eq!(find_all(&ast, NodeKind::ClassConst).len(), 1);
        assert_eq!(find_all(&ast, NodeKind::Property).len(), 1);
        assert_eq!(uses(&ast).len(), 1);
    }

    #[test]
    fn enums_and_their_cases() {
        let ast = php_parser::parse("<?php enum Suit: string { case Hearts = 'h'; case Spades = 's'; }").unwrap();
        assert_eq!(enums(&ast).len(), 1);
        assert_eq!(find_all(&ast, NodeKind::EnumCase).len(), 2);
        assert!(classes(&ast).is_empty());
    }

    #[test]
    fn method_block_starts_at_its_comments() {
        let ast = php_parser::parse("<?php class A { private $a; // why\n /* how */ public function f() {} }").unwrap();
        let class = classes(&ast)[0];
        assert_eq!(first_method_index(class), Some(3));
        assert_eq!(first_method_block_index(class), Some(1));
    }

    #[test]
    fn empty_when_nothing_matches() {
        let ast = ast();
        assert!(traits(&ast).is_empty());
    }

    #[test]
    fn first_namespace_only() {
        let ast = ast();
        assert_eq!(find_all(&ast, NodeKind::Namespace).len(), 2);
        let ns = first_namespace(&ast).unwrap();
        assert_eq!(ns.name.as_ref().map(Name::as_str), Some("App"));
    }

    #[test]
    fn first_class_mut_matches_first_class() {
        let mut ast = ast();
        let class = first_class_mut(&mut ast).unwrap();
        assert_eq!(class.name, "User");
        assert_eq!(method_index(class, "NAME"), Some(3));
        assert_eq!(first_method_index(class), Some(3));
        assert_eq!(method_index(class, "missing"), None);
    }
}
