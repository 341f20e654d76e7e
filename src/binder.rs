//! The binding factory.
//!
//! `Binder` owns the binding arena and populates the graph by visiting every
//! reachable translation unit's global namespace, included units first.
//! Visiting is shallow: members of a class or namespace are enqueued on the
//! owning binding's todo list and realized only when that binding is first
//! observed. This keeps intake cheap and breaks construction cycles between
//! mutually referencing scopes.
//!
//! The visitor is a match over symbol kinds; each case wires one declaration
//! form into the graph: namespaces (including inline ones), classes and
//! out-of-line definitions, forward declarations, enums, typedefs that alias
//! bindings, base classes, using-declarations and -directives, namespace
//! aliases, and the Obj-C forms, which always bind at the root.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::binding::{Binding, BindingId, LookupItem};
use crate::control::Control;
use crate::document::{Document, Snapshot};
use crate::name::{NameId, NameKind};
use crate::subst;
use crate::symbol::{self, SymbolId, SymbolKind};
use crate::ty::TypeKind;

/// Owner of the binding graph and visitor over symbol trees.
pub struct Binder {
    pub(crate) bindings: Vec<Binding>,
    pub(crate) global: BindingId,
    pub(crate) current: BindingId,
    processed_namespaces: FxHashSet<SymbolId>,
    pub(crate) expand_templates: bool,
}

impl Binder {
    /// Build the graph roots for `document` and everything it includes.
    /// Member processing is deferred until bindings are observed.
    pub fn new(
        control: &mut Control,
        document: &Document,
        snapshot: &Snapshot,
        expand_templates: bool,
    ) -> Self {
        let mut binder = Binder {
            bindings: Vec::new(),
            global: BindingId(0),
            current: BindingId(0),
            processed_namespaces: FxHashSet::default(),
            expand_templates,
        };
        let global = binder.alloc_binding(None);
        binder.global = global;
        binder.current = global;
        binder.process_document(control, document, snapshot);
        binder
    }

    pub fn global_namespace(&self) -> BindingId {
        self.global
    }

    pub fn expand_templates(&self) -> bool {
        self.expand_templates
    }

    pub fn set_expand_templates(&mut self, expand: bool) {
        self.expand_templates = expand;
    }

    pub(crate) fn alloc_binding(&mut self, parent: Option<BindingId>) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(Binding::new(parent));
        id
    }

    pub(crate) fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.0 as usize]
    }

    pub(crate) fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0 as usize]
    }

    fn process_document(&mut self, control: &mut Control, document: &Document, snapshot: &Snapshot) {
        if self.processed_namespaces.contains(&document.global_namespace) {
            return;
        }
        self.processed_namespaces.insert(document.global_namespace);

        for &include in &document.includes {
            if let Some(included) = snapshot.document(include) {
                let included = included.clone();
                self.process_document(control, &included, snapshot);
            }
        }

        debug!(file = control.resolve(document.file_name), "binding translation unit");
        self.accept(control, document.global_namespace);
    }

    /// Defer a member to the current binding.
    fn defer(&mut self, member: SymbolId) {
        let current = self.current;
        self.binding_mut(current).todo.push(member);
    }

    /// Visit `symbol` with `binding` as the current context; used by flush.
    pub(crate) fn process_in(&mut self, control: &mut Control, symbol: SymbolId, binding: BindingId) {
        let previous = self.current;
        self.current = binding;
        self.accept(control, symbol);
        self.current = previous;
    }

    fn enter_binding(&mut self, control: &mut Control, symbol: SymbolId) -> BindingId {
        let name = control.symbol(symbol).name;
        let current = self.current;
        let entity = self.find_or_create_type(control, current, name);
        self.binding_mut(entity).symbols.push(symbol);
        let previous = self.current;
        self.current = entity;
        previous
    }

    fn enter_global_binding(&mut self, control: &mut Control, symbol: SymbolId) -> BindingId {
        let name = control.symbol(symbol).name;
        let global = self.global;
        let entity = self.find_or_create_type(control, global, name);
        self.binding_mut(entity).symbols.push(symbol);
        let previous = self.current;
        self.current = entity;
        previous
    }

    fn accept(&mut self, control: &mut Control, symbol: SymbolId) {
        match control.symbol(symbol).kind.clone() {
            SymbolKind::Template { declaration } => {
                // The wrapper is transparent; the wrapped declaration carries
                // the parameters through its enclosing scope.
                if let Some(declaration) = declaration {
                    self.accept(control, declaration);
                }
            }
            SymbolKind::Namespace { is_inline } => self.visit_namespace(control, symbol, is_inline),
            SymbolKind::Class { bases } => self.visit_class(control, symbol, &bases),
            SymbolKind::ForwardClassDeclaration => {
                if !control.symbol(symbol).is_friend {
                    let previous = self.enter_binding(control, symbol);
                    self.current = previous;
                }
            }
            SymbolKind::Enum => {
                let current = self.current;
                self.binding_mut(current).enums.push(symbol);
            }
            SymbolKind::Declaration => self.visit_declaration(control, symbol),
            SymbolKind::BaseClass => self.visit_base_class(control, symbol),
            SymbolKind::UsingDeclaration => self.visit_using_declaration(control, symbol),
            SymbolKind::UsingNamespaceDirective => {
                if let Some(name) = control.symbol(symbol).name {
                    let current = self.current;
                    if let Some(e) = self.lookup_type(control, current, name) {
                        self.add_using(current, e);
                    }
                }
            }
            SymbolKind::NamespaceAlias { target } => {
                self.visit_namespace_alias(control, symbol, target)
            }
            SymbolKind::ObjcClass {
                base_class,
                protocols,
            } => {
                let previous = self.enter_global_binding(control, symbol);
                if let Some(base_class) = base_class {
                    self.defer(base_class);
                }
                for protocol in protocols {
                    self.defer(protocol);
                }
                for member in control.symbol(symbol).members.clone() {
                    self.defer(member);
                }
                self.current = previous;
            }
            SymbolKind::ObjcProtocol { protocols } => {
                let previous = self.enter_global_binding(control, symbol);
                for protocol in protocols {
                    self.defer(protocol);
                }
                for member in control.symbol(symbol).members.clone() {
                    self.defer(member);
                }
                self.current = previous;
            }
            SymbolKind::ObjcBaseClass | SymbolKind::ObjcBaseProtocol => {
                if let Some(name) = control.symbol(symbol).name {
                    let global = self.global;
                    let current = self.current;
                    if let Some(base) = self.lookup_type(control, global, name) {
                        self.add_using(current, base);
                    }
                }
            }
            SymbolKind::ObjcForwardClassDeclaration
            | SymbolKind::ObjcForwardProtocolDeclaration => {
                let previous = self.enter_global_binding(control, symbol);
                self.current = previous;
            }
            // Functions, blocks, parameters, enumerators and template
            // parameters contribute no binding of their own.
            SymbolKind::Function
            | SymbolKind::Block
            | SymbolKind::Argument
            | SymbolKind::Enumerator
            | SymbolKind::TypenameArgument
            | SymbolKind::ObjcMethod => {}
        }
    }

    fn visit_namespace(&mut self, control: &mut Control, namespace: SymbolId, is_inline: bool) {
        let previous = self.enter_binding(control, namespace);
        for member in control.symbol(namespace).members.clone() {
            self.defer(member);
        }
        if is_inline {
            // Names of an inline namespace are visible in the enclosing one.
            let inner = self.current;
            self.add_using(previous, inner);
        }
        self.current = previous;
    }

    fn visit_class(&mut self, control: &mut Control, class: SymbolId, bases: &[SymbolId]) {
        let previous = self.current;

        // An out-of-line definition reopens the binding created by the
        // forward declaration inside the enclosing class.
        let name = control.symbol(class).name;
        let mut binding = None;
        if let Some(name) = name {
            if matches!(control.name(name), NameKind::Qualified { .. }) {
                binding = self.lookup_type(control, previous, name);
            }
        }
        let binding = match binding {
            Some(binding) => binding,
            None => self.find_or_create_type(control, previous, name),
        };

        self.current = binding;
        self.binding_mut(binding).symbols.push(class);

        for &base in bases {
            self.defer(base);
        }
        for member in control.symbol(class).members.clone() {
            self.defer(member);
        }

        self.current = previous;
    }

    fn visit_declaration(&mut self, control: &mut Control, declaration: SymbolId) {
        if !control.symbol(declaration).is_typedef {
            return;
        }
        let data = control.symbol(declaration);
        let ty = data.ty;
        let Some(name) = data.name else {
            return;
        };
        let Some(identifier) = control.identifier(name) else {
            return;
        };
        if ty.is_const || ty.is_volatile {
            return;
        }

        match control.full_type_kind(ty).cloned() {
            Some(TypeKind::Named(named)) => {
                // A typedef whose right-hand side resolves to a binding
                // introduces an alias entry for it.
                let current = self.current;
                if let Some(target) = self.lookup_type(control, current, named) {
                    self.binding_mut(current).nested.insert(identifier, target);
                }
            }
            Some(TypeKind::Class(class)) => {
                // typedef of an anonymous class definition binds the class
                // under the typedef'd name.
                if matches!(control.name(name), NameKind::Id(_)) {
                    let current = self.current;
                    let binding = self.find_or_create_type(control, current, Some(name));
                    self.binding_mut(binding).symbols.push(class);
                }
            }
            _ => {}
        }
    }

    fn visit_base_class(&mut self, control: &mut Control, base: SymbolId) {
        let Some(name) = control.symbol(base).name else {
            return;
        };
        let current = self.current;
        if let Some(found) = self.lookup_type(control, current, name) {
            self.add_using(current, found);
        }
        // Unresolved bases are left out; template instantiation completes
        // them later when the dependent name becomes concrete.
    }

    fn visit_using_declaration(&mut self, control: &mut Control, using: SymbolId) {
        let Some(name) = control.symbol(using).name else {
            return;
        };
        let NameKind::Qualified { name: tail, .. } = control.name(name).clone() else {
            return;
        };
        if !matches!(control.name(tail), NameKind::Id(_)) {
            return;
        }
        let current = self.current;
        if let Some(delegate) = self.lookup_type(control, current, name) {
            // The unqualified name transparently delegates to its source.
            let entity = self.find_or_create_type(control, current, Some(tail));
            self.add_using(entity, delegate);
        }
    }

    fn visit_namespace_alias(&mut self, control: &mut Control, alias: SymbolId, target: NameId) {
        let Some(name) = control.symbol(alias).name else {
            return;
        };
        let Some(identifier) = control.identifier(name) else {
            return;
        };
        let current = self.current;
        if let Some(target_binding) = self.lookup_type(control, current, target) {
            if matches!(control.name(name), NameKind::Id(_) | NameKind::Template { .. }) {
                self.binding_mut(current).nested.insert(identifier, target_binding);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Name-against-scope matching
    // -------------------------------------------------------------------------

    /// Match one name against one scope's symbol table. Operator names match
    /// operator overloads by kind; identifier names match the declaration
    /// chain for that identifier. Friends, using-directives and out-of-line
    /// qualified declarations never introduce the name.
    pub fn lookup_in_scope(
        &mut self,
        control: &mut Control,
        name: NameId,
        scope: SymbolId,
        result: &mut Vec<LookupItem>,
        template_id: Option<NameId>,
        binding: Option<BindingId>,
    ) {
        match control.name(name).clone() {
            NameKind::Operator(_) => {
                for member in control.symbol(scope).members.clone() {
                    let data = control.symbol(member);
                    if data.is_friend {
                        continue;
                    }
                    if data.name != Some(name) {
                        continue;
                    }
                    result.push(LookupItem {
                        declaration: member,
                        binding,
                        ty: None,
                        scope: Some(scope),
                    });
                }
            }
            _ => {
                let Some(identifier) = control.identifier(name) else {
                    return;
                };
                for s in control.scope_find(scope, identifier) {
                    let data = control.symbol(s);
                    if data.is_friend || data.is_using_namespace_directive() {
                        continue;
                    }
                    let Some(symbol_name) = data.name else {
                        continue;
                    };
                    if matches!(control.name(symbol_name), NameKind::Qualified { .. }) {
                        continue;
                    }

                    let mut item = LookupItem {
                        declaration: s,
                        binding,
                        ty: None,
                        scope: Some(scope),
                    };

                    if data.is_namespace_alias() {
                        if let Some(binding) = binding {
                            // Report the aliased namespace's own type when it
                            // resolves uniquely.
                            if let Some(target) = self.lookup_type(control, binding, name) {
                                let symbols = self.symbols_of(control, target);
                                if symbols.len() == 1 {
                                    item.ty = Some(control.symbol(symbols[0]).ty);
                                }
                            }
                        }
                    }

                    if let Some(template_id) = template_id {
                        let data = control.symbol(s);
                        if data.is_declaration() || data.is_function() {
                            item.ty = Some(subst::instantiate_declaration_type(
                                control,
                                template_id,
                                s,
                            ));
                        }
                    }

                    result.push(item);
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Symbol-to-binding resolution
    // -------------------------------------------------------------------------

    /// The binding a scope symbol belongs to, resolved through its qualified
    /// path from the root. With an enclosing instantiation, the path's last
    /// name is first tried inside it, so types written in a template body
    /// resolve against the instantiation's substitutions.
    pub fn lookup_type_for(
        &mut self,
        control: &mut Control,
        symbol: SymbolId,
        enclosing_instantiation: Option<BindingId>,
    ) -> Option<BindingId> {
        let path = symbol::path(control, symbol);
        self.lookup_type_path(control, &path, enclosing_instantiation)
    }

    /// Walk a qualified path from the root: enclosing-scope search for the
    /// first component, direct nesting for the rest.
    pub fn lookup_type_path(
        &mut self,
        control: &mut Control,
        path: &[NameId],
        enclosing_instantiation: Option<BindingId>,
    ) -> Option<BindingId> {
        let (&first, rest) = match path.split_first() {
            Some(parts) => parts,
            None => return Some(self.global),
        };

        if let Some(enclosing) = enclosing_instantiation {
            if let Some(&last) = path.last() {
                if let Some(found) = self.lookup_type(control, enclosing, last) {
                    return Some(found);
                }
            }
        }

        let global = self.global;
        let mut binding = self.lookup_type(control, global, first)?;
        for &component in rest {
            binding = self.find_type(control, binding, component)?;
        }
        Some(binding)
    }
}
