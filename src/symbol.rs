//! The symbol model.
//!
//! A symbol is one declaration: name, enclosing scope, source position, type
//! and a kind payload. Scope symbols additionally carry an ordered member
//! list; `find` over a scope returns the whole chain of declarations sharing
//! an identifier, which is how overload sets surface to lookup.
//!
//! Symbols live in an arena inside [`Control`](crate::control::Control) and
//! are referenced by [`SymbolId`] everywhere.

use serde::Serialize;

use crate::control::Control;
use crate::interner::Atom;
use crate::name::{self, NameId, NamePath};
use crate::ty::FullType;

/// Handle into the symbol arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

/// Source position of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SourcePos {
    pub file: Atom,
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(file: Atom, line: u32, column: u32) -> Self {
        SourcePos { file, line, column }
    }
}

/// Symbol kind with per-kind payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Namespace {
        is_inline: bool,
    },
    Class {
        /// Base-clause entries, in declaration order (`BaseClass` symbols).
        bases: Vec<SymbolId>,
    },
    /// One entry of a base clause; the name is the base-class name expression.
    BaseClass,
    ForwardClassDeclaration,
    Enum,
    /// An enumerator inside an enum scope.
    Enumerator,
    Function,
    /// A function parameter.
    Argument,
    Block,
    /// An object, member or typedef declaration.
    Declaration,
    /// A template wrapper; parameters are the scope members, the wrapped
    /// class/function is `declaration`.
    Template {
        declaration: Option<SymbolId>,
    },
    /// A `typename`/`class` template parameter.
    TypenameArgument,
    /// `using A::B::x;`
    UsingDeclaration,
    /// `using namespace N;`
    UsingNamespaceDirective,
    /// `namespace alias = N;` with the aliased namespace name in `target`.
    NamespaceAlias {
        target: NameId,
    },
    ObjcClass {
        base_class: Option<SymbolId>,
        protocols: Vec<SymbolId>,
    },
    ObjcBaseClass,
    ObjcProtocol {
        protocols: Vec<SymbolId>,
    },
    ObjcBaseProtocol,
    ObjcForwardClassDeclaration,
    ObjcForwardProtocolDeclaration,
    ObjcMethod,
}

/// One declaration in the symbol arena.
#[derive(Clone, Debug, Serialize)]
pub struct SymbolData {
    pub name: Option<NameId>,
    pub enclosing_scope: Option<SymbolId>,
    pub pos: SourcePos,
    pub ty: FullType,
    pub is_typedef: bool,
    pub is_friend: bool,
    pub kind: SymbolKind,
    /// Ordered members; empty for non-scope symbols.
    pub members: Vec<SymbolId>,
}

impl SymbolData {
    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace { .. })
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, SymbolKind::Class { .. })
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, SymbolKind::Enum)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function)
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, SymbolKind::Block)
    }

    pub fn is_declaration(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Declaration | SymbolKind::Enumerator | SymbolKind::Argument
        )
    }

    pub fn is_forward_class_declaration(&self) -> bool {
        matches!(self.kind, SymbolKind::ForwardClassDeclaration)
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, SymbolKind::Template { .. })
    }

    pub fn is_using_declaration(&self) -> bool {
        matches!(self.kind, SymbolKind::UsingDeclaration)
    }

    pub fn is_using_namespace_directive(&self) -> bool {
        matches!(self.kind, SymbolKind::UsingNamespaceDirective)
    }

    pub fn is_namespace_alias(&self) -> bool {
        matches!(self.kind, SymbolKind::NamespaceAlias { .. })
    }

    pub fn is_base_class(&self) -> bool {
        matches!(self.kind, SymbolKind::BaseClass)
    }

    pub fn is_objc_class(&self) -> bool {
        matches!(self.kind, SymbolKind::ObjcClass { .. })
    }

    pub fn is_objc_protocol(&self) -> bool {
        matches!(self.kind, SymbolKind::ObjcProtocol { .. })
    }

    pub fn is_objc_method(&self) -> bool {
        matches!(self.kind, SymbolKind::ObjcMethod)
    }

    /// Whether this symbol owns a member scope.
    pub fn is_scope(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Namespace { .. }
                | SymbolKind::Class { .. }
                | SymbolKind::Enum
                | SymbolKind::Function
                | SymbolKind::Block
                | SymbolKind::Template { .. }
                | SymbolKind::ObjcClass { .. }
                | SymbolKind::ObjcProtocol { .. }
                | SymbolKind::ObjcMethod
        )
    }
}

/// Same-declaration test by source position, used to compare a symbol with a
/// clone of itself produced by template instantiation.
pub fn symbols_identical(control: &Control, a: SymbolId, b: SymbolId) -> bool {
    let sa = control.symbol(a);
    let sb = control.symbol(b);
    sa.pos == sb.pos
}

fn path_helper(control: &Control, symbol: Option<SymbolId>, names: &mut NamePath) {
    let Some(symbol) = symbol else {
        return;
    };
    let data = control.symbol(symbol);
    path_helper(control, data.enclosing_scope, names);

    let Some(sym_name) = data.name else {
        return;
    };
    match &data.kind {
        SymbolKind::Class { .. }
        | SymbolKind::Namespace { .. }
        | SymbolKind::ForwardClassDeclaration
        | SymbolKind::ObjcClass { .. }
        | SymbolKind::ObjcBaseClass
        | SymbolKind::ObjcProtocol { .. }
        | SymbolKind::ObjcForwardClassDeclaration
        | SymbolKind::ObjcForwardProtocolDeclaration => {
            name::add_names(control, Some(sym_name), names, false);
        }
        SymbolKind::Function => {
            // Out-of-line definitions contribute their qualification.
            if let crate::name::NameKind::Qualified { base, .. } = control.name(sym_name) {
                name::add_names(control, *base, names, false);
            }
        }
        _ => {}
    }
}

/// The ordered chain of enclosing namespace/class names from the root down to
/// (and including) `symbol` itself when it names a scope.
pub fn path(control: &Control, symbol: SymbolId) -> NamePath {
    let mut names = NamePath::new();
    path_helper(control, Some(symbol), &mut names);
    names
}

/// The canonical qualified-name components of a declaration: the path of its
/// enclosing scope followed by all components of its own name.
pub fn fully_qualified_name(control: &Control, symbol: SymbolId) -> NamePath {
    let data = control.symbol(symbol);
    let mut names = NamePath::new();
    path_helper(control, data.enclosing_scope, &mut names);
    name::add_names(control, data.name, &mut names, true);
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;

    #[test]
    fn test_path_of_nested_class() {
        let mut c = Control::new();
        let file = c.intern("a.h");
        let global = c.new_global_namespace(file);
        let ns = c.new_namespace(global, Some("NS"), SourcePos::new(file, 1, 1));
        let class = c.new_class(ns, Some("Final"), SourcePos::new(file, 2, 1));
        let member = c.new_declaration(class, "x", c.int_type, SourcePos::new(file, 3, 5));

        let ns_name = c.symbol(ns).name;
        let class_name = c.symbol(class).name;
        let member_name = c.symbol(member).name;

        assert_eq!(path(&c, class).as_slice(), &[ns_name.unwrap(), class_name.unwrap()]);
        assert_eq!(
            fully_qualified_name(&c, member).as_slice(),
            &[ns_name.unwrap(), class_name.unwrap(), member_name.unwrap()]
        );
    }

    #[test]
    fn test_scope_find_returns_overload_chain() {
        let mut c = Control::new();
        let file = c.intern("a.h");
        let global = c.new_global_namespace(file);
        let f1 = c.new_function(global, Some("run"), SourcePos::new(file, 1, 1));
        let f2 = c.new_function(global, Some("run"), SourcePos::new(file, 2, 1));
        let _g = c.new_function(global, Some("walk"), SourcePos::new(file, 3, 1));

        let run = c.intern("run");
        assert_eq!(c.scope_find(global, run), vec![f1, f2]);
    }
}
