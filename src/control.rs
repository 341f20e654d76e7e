//! Central ownership of interner, names, types and symbols.
//!
//! `Control` is the allocation hub the parser layer (and the tests standing
//! in for it) builds translation units through. It interns identifiers,
//! names and types, owns the symbol arena, and offers factory methods for
//! every symbol kind. The lookup engine borrows it mutably because template
//! instantiation mints fresh names, types and cloned symbols.

use rustc_hash::FxHashMap;

use crate::interner::{Atom, Interner};
use crate::name::{NameId, NameKind, OperatorKind};
use crate::symbol::{SourcePos, SymbolData, SymbolId, SymbolKind};
use crate::ty::{FullType, IntegerKind, TypeId, TypeKind};

/// Arena owner and factory for identifiers, names, types and symbols.
pub struct Control {
    interner: Interner,
    names: Vec<NameKind>,
    name_map: FxHashMap<NameKind, NameId>,
    types: Vec<TypeKind>,
    type_map: FxHashMap<TypeKind, TypeId>,
    symbols: Vec<SymbolData>,
    /// `void` singleton.
    pub void_type: FullType,
    /// Plain `int` singleton.
    pub int_type: FullType,
    /// Plain `bool` singleton.
    pub bool_type: FullType,
}

impl Control {
    pub fn new() -> Self {
        let mut control = Control {
            interner: Interner::new(),
            names: Vec::new(),
            name_map: FxHashMap::default(),
            types: Vec::new(),
            type_map: FxHashMap::default(),
            symbols: Vec::new(),
            void_type: FullType::invalid(),
            int_type: FullType::invalid(),
            bool_type: FullType::invalid(),
        };
        control.void_type = FullType::new(control.intern_type(TypeKind::Void));
        control.int_type = FullType::new(control.intern_type(TypeKind::Integer(IntegerKind::Int)));
        control.bool_type = FullType::new(control.intern_type(TypeKind::Integer(IntegerKind::Bool)));
        control
    }

    // -------------------------------------------------------------------------
    // Identifiers
    // -------------------------------------------------------------------------

    pub fn intern(&mut self, text: &str) -> Atom {
        self.interner.intern(text)
    }

    pub fn resolve(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    // -------------------------------------------------------------------------
    // Names
    // -------------------------------------------------------------------------

    fn intern_name(&mut self, kind: NameKind) -> NameId {
        if let Some(&id) = self.name_map.get(&kind) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(kind.clone());
        self.name_map.insert(kind, id);
        id
    }

    pub fn name_id(&mut self, id: Atom) -> NameId {
        self.intern_name(NameKind::Id(id))
    }

    pub fn template_name_id(
        &mut self,
        id: Atom,
        args: Vec<FullType>,
        specialization: bool,
    ) -> NameId {
        self.intern_name(NameKind::Template {
            id,
            args,
            specialization,
        })
    }

    pub fn qualified_name_id(&mut self, base: Option<NameId>, name: NameId) -> NameId {
        self.intern_name(NameKind::Qualified { base, name })
    }

    pub fn operator_name_id(&mut self, kind: OperatorKind) -> NameId {
        self.intern_name(NameKind::Operator(kind))
    }

    pub fn conversion_name_id(&mut self, ty: FullType) -> NameId {
        self.intern_name(NameKind::Conversion(ty))
    }

    pub fn destructor_name_id(&mut self, id: Atom) -> NameId {
        self.intern_name(NameKind::Destructor(id))
    }

    pub fn name(&self, id: NameId) -> &NameKind {
        &self.names[id.0 as usize]
    }

    /// The identifier a name answers to, when it has one. Qualified names
    /// answer to their unqualified tail.
    pub fn identifier(&self, id: NameId) -> Option<Atom> {
        match self.name(id) {
            NameKind::Id(atom) | NameKind::Destructor(atom) => Some(*atom),
            NameKind::Template { id, .. } => Some(*id),
            NameKind::Qualified { name, .. } => self.identifier(*name),
            NameKind::Operator(_) | NameKind::Conversion(_) => None,
        }
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    fn intern_type(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.type_map.get(&kind) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind.clone());
        self.type_map.insert(kind, id);
        id
    }

    pub fn named_type(&mut self, name: NameId) -> FullType {
        FullType::new(self.intern_type(TypeKind::Named(name)))
    }

    pub fn pointer_type(&mut self, element: FullType) -> FullType {
        FullType::new(self.intern_type(TypeKind::Pointer(element)))
    }

    pub fn reference_type(&mut self, element: FullType) -> FullType {
        FullType::new(self.intern_type(TypeKind::Reference(element)))
    }

    pub fn class_type(&mut self, class: SymbolId) -> FullType {
        FullType::new(self.intern_type(TypeKind::Class(class)))
    }

    pub fn enum_type(&mut self, e: SymbolId) -> FullType {
        FullType::new(self.intern_type(TypeKind::Enum(e)))
    }

    pub fn function_type(&mut self, function: SymbolId) -> FullType {
        FullType::new(self.intern_type(TypeKind::Function(function)))
    }

    pub fn type_kind(&self, id: TypeId) -> Option<&TypeKind> {
        if id.is_none() {
            return None;
        }
        self.types.get(id.0 as usize)
    }

    pub fn full_type_kind(&self, ty: FullType) -> Option<&TypeKind> {
        self.type_kind(ty.ty)
    }

    // -------------------------------------------------------------------------
    // Symbols
    // -------------------------------------------------------------------------

    fn push_symbol(&mut self, data: SymbolData) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(data);
        id
    }

    fn new_symbol(
        &mut self,
        scope: Option<SymbolId>,
        name: Option<NameId>,
        pos: SourcePos,
        ty: FullType,
        kind: SymbolKind,
    ) -> SymbolId {
        let id = self.push_symbol(SymbolData {
            name,
            enclosing_scope: scope,
            pos,
            ty,
            is_typedef: false,
            is_friend: false,
            kind,
            members: Vec::new(),
        });
        if let Some(scope) = scope {
            self.symbols[scope.0 as usize].members.push(id);
        }
        id
    }

    /// Raw arena insertion for the cloner; does not register the symbol in
    /// any scope's member list.
    pub(crate) fn alloc_symbol(&mut self, data: SymbolData) -> SymbolId {
        self.push_symbol(data)
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolData {
        &mut self.symbols[id.0 as usize]
    }

    fn opt_name(&mut self, text: Option<&str>) -> Option<NameId> {
        match text {
            Some(text) => {
                let atom = self.intern(text);
                Some(self.name_id(atom))
            }
            None => None,
        }
    }

    /// The anonymous namespace a translation unit hangs off.
    pub fn new_global_namespace(&mut self, file: Atom) -> SymbolId {
        self.new_symbol(
            None,
            None,
            SourcePos::new(file, 0, 0),
            FullType::invalid(),
            SymbolKind::Namespace { is_inline: false },
        )
    }

    pub fn new_namespace(
        &mut self,
        scope: SymbolId,
        name: Option<&str>,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(name);
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::Namespace { is_inline: false },
        )
    }

    pub fn new_inline_namespace(
        &mut self,
        scope: SymbolId,
        name: Option<&str>,
        pos: SourcePos,
    ) -> SymbolId {
        let id = self.new_namespace(scope, name, pos);
        self.symbol_mut(id).kind = SymbolKind::Namespace { is_inline: true };
        id
    }

    pub fn new_class(&mut self, scope: SymbolId, name: Option<&str>, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(name);
        self.new_class_with_name(scope, name, pos)
    }

    pub fn new_class_with_name(
        &mut self,
        scope: SymbolId,
        name: Option<NameId>,
        pos: SourcePos,
    ) -> SymbolId {
        let id = self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::Class { bases: Vec::new() },
        );
        let ty = self.class_type(id);
        self.symbol_mut(id).ty = ty;
        id
    }

    /// A base-clause entry on `class`, naming the base by `name`.
    pub fn new_base_class(&mut self, class: SymbolId, name: NameId, pos: SourcePos) -> SymbolId {
        let id = self.push_symbol(SymbolData {
            name: Some(name),
            enclosing_scope: Some(class),
            pos,
            ty: FullType::invalid(),
            is_typedef: false,
            is_friend: false,
            kind: SymbolKind::BaseClass,
            members: Vec::new(),
        });
        if let SymbolKind::Class { bases } = &mut self.symbols[class.0 as usize].kind {
            bases.push(id);
        }
        id
    }

    pub fn new_forward_class_declaration(
        &mut self,
        scope: SymbolId,
        name: &str,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::ForwardClassDeclaration,
        )
    }

    pub fn new_enum(&mut self, scope: SymbolId, name: &str, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(Some(name));
        let id = self.new_symbol(Some(scope), name, pos, FullType::invalid(), SymbolKind::Enum);
        let ty = self.enum_type(id);
        self.symbol_mut(id).ty = ty;
        id
    }

    pub fn new_enumerator(&mut self, e: SymbolId, name: &str, pos: SourcePos) -> SymbolId {
        let ty = self.symbol(e).ty;
        let name = self.opt_name(Some(name));
        self.new_symbol(Some(e), name, pos, ty, SymbolKind::Enumerator)
    }

    pub fn new_function(&mut self, scope: SymbolId, name: Option<&str>, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(name);
        self.new_function_with_name(scope, name, pos)
    }

    pub fn new_function_with_name(
        &mut self,
        scope: SymbolId,
        name: Option<NameId>,
        pos: SourcePos,
    ) -> SymbolId {
        let id = self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::Function,
        );
        let ty = self.function_type(id);
        self.symbol_mut(id).ty = ty;
        id
    }

    pub fn new_argument(
        &mut self,
        function: SymbolId,
        name: &str,
        ty: FullType,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(Some(function), name, pos, ty, SymbolKind::Argument)
    }

    pub fn new_block(&mut self, scope: SymbolId, pos: SourcePos) -> SymbolId {
        self.new_symbol(Some(scope), None, pos, FullType::invalid(), SymbolKind::Block)
    }

    pub fn new_declaration(
        &mut self,
        scope: SymbolId,
        name: &str,
        ty: FullType,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_declaration_with_name(scope, name, ty, pos)
    }

    pub fn new_declaration_with_name(
        &mut self,
        scope: SymbolId,
        name: Option<NameId>,
        ty: FullType,
        pos: SourcePos,
    ) -> SymbolId {
        self.new_symbol(Some(scope), name, pos, ty, SymbolKind::Declaration)
    }

    /// `typedef <ty> <name>;`
    pub fn new_typedef(
        &mut self,
        scope: SymbolId,
        name: &str,
        ty: FullType,
        pos: SourcePos,
    ) -> SymbolId {
        let id = self.new_declaration(scope, name, ty, pos);
        self.symbol_mut(id).is_typedef = true;
        id
    }

    pub fn set_friend(&mut self, symbol: SymbolId) {
        self.symbol_mut(symbol).is_friend = true;
    }

    pub fn new_template(&mut self, scope: SymbolId, pos: SourcePos) -> SymbolId {
        self.new_symbol(
            Some(scope),
            None,
            pos,
            FullType::invalid(),
            SymbolKind::Template { declaration: None },
        )
    }

    pub fn new_typename_argument(
        &mut self,
        template: SymbolId,
        name: &str,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(
            Some(template),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::TypenameArgument,
        )
    }

    /// Attach the declaration a template wraps. The declaration must have
    /// been created with the template as its scope; it is removed from the
    /// member list so the members are exactly the parameters.
    pub fn set_template_declaration(&mut self, template: SymbolId, declaration: SymbolId) {
        let members = &mut self.symbols[template.0 as usize].members;
        members.retain(|&m| m != declaration);
        if let SymbolKind::Template { declaration: slot } =
            &mut self.symbols[template.0 as usize].kind
        {
            *slot = Some(declaration);
        }
    }

    pub fn template_declaration(&self, template: SymbolId) -> Option<SymbolId> {
        match self.symbol(template).kind {
            SymbolKind::Template { declaration } => declaration,
            _ => None,
        }
    }

    /// Template parameters in declaration order.
    pub fn template_parameters(&self, template: SymbolId) -> &[SymbolId] {
        &self.symbol(template).members
    }

    pub fn new_using_declaration(&mut self, scope: SymbolId, name: NameId, pos: SourcePos) -> SymbolId {
        self.new_symbol(
            Some(scope),
            Some(name),
            pos,
            FullType::invalid(),
            SymbolKind::UsingDeclaration,
        )
    }

    pub fn new_using_namespace_directive(
        &mut self,
        scope: SymbolId,
        name: NameId,
        pos: SourcePos,
    ) -> SymbolId {
        self.new_symbol(
            Some(scope),
            Some(name),
            pos,
            FullType::invalid(),
            SymbolKind::UsingNamespaceDirective,
        )
    }

    pub fn new_namespace_alias(
        &mut self,
        scope: SymbolId,
        alias: &str,
        target: NameId,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(alias));
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::NamespaceAlias { target },
        )
    }

    pub fn new_objc_class(&mut self, scope: SymbolId, name: &str, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(Some(name));
        let id = self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::ObjcClass {
                base_class: None,
                protocols: Vec::new(),
            },
        );
        let ty = self.class_type(id);
        self.symbol_mut(id).ty = ty;
        id
    }

    pub fn set_objc_base_class(&mut self, class: SymbolId, name: NameId, pos: SourcePos) -> SymbolId {
        let id = self.push_symbol(SymbolData {
            name: Some(name),
            enclosing_scope: Some(class),
            pos,
            ty: FullType::invalid(),
            is_typedef: false,
            is_friend: false,
            kind: SymbolKind::ObjcBaseClass,
            members: Vec::new(),
        });
        if let SymbolKind::ObjcClass { base_class, .. } = &mut self.symbols[class.0 as usize].kind {
            *base_class = Some(id);
        }
        id
    }

    pub fn new_objc_protocol(&mut self, scope: SymbolId, name: &str, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::ObjcProtocol {
                protocols: Vec::new(),
            },
        )
    }

    pub fn add_objc_base_protocol(
        &mut self,
        host: SymbolId,
        name: NameId,
        pos: SourcePos,
    ) -> SymbolId {
        let id = self.push_symbol(SymbolData {
            name: Some(name),
            enclosing_scope: Some(host),
            pos,
            ty: FullType::invalid(),
            is_typedef: false,
            is_friend: false,
            kind: SymbolKind::ObjcBaseProtocol,
            members: Vec::new(),
        });
        match &mut self.symbols[host.0 as usize].kind {
            SymbolKind::ObjcClass { protocols, .. } | SymbolKind::ObjcProtocol { protocols } => {
                protocols.push(id)
            }
            _ => {}
        }
        id
    }

    pub fn new_objc_forward_class_declaration(
        &mut self,
        scope: SymbolId,
        name: &str,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::ObjcForwardClassDeclaration,
        )
    }

    pub fn new_objc_forward_protocol_declaration(
        &mut self,
        scope: SymbolId,
        name: &str,
        pos: SourcePos,
    ) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(
            Some(scope),
            name,
            pos,
            FullType::invalid(),
            SymbolKind::ObjcForwardProtocolDeclaration,
        )
    }

    pub fn new_objc_method(&mut self, scope: SymbolId, name: &str, pos: SourcePos) -> SymbolId {
        let name = self.opt_name(Some(name));
        self.new_symbol(Some(scope), name, pos, FullType::invalid(), SymbolKind::ObjcMethod)
    }

    // -------------------------------------------------------------------------
    // Scope queries
    // -------------------------------------------------------------------------

    /// All members of `scope` answering to `id`, in declaration order. This
    /// is the overload chain: every declaration sharing the identifier.
    pub fn scope_find(&self, scope: SymbolId, id: Atom) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        for &member in &self.symbol(scope).members {
            if let Some(name) = self.symbol(member).name {
                if self.identifier(name) == Some(id) {
                    chain.push(member);
                }
            }
        }
        chain
    }

    /// The nearest enclosing namespace scope, the symbol itself included.
    pub fn enclosing_namespace(&self, symbol: SymbolId) -> Option<SymbolId> {
        let mut current = Some(symbol);
        while let Some(id) = current {
            if self.symbol(id).is_namespace() {
                return Some(id);
            }
            current = self.symbol(id).enclosing_scope;
        }
        None
    }
}

impl Default for Control {
    fn default() -> Self {
        Control::new()
    }
}
