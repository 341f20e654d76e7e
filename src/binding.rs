//! The binding graph.
//!
//! A [`Binding`] is one node of the name-resolution graph: a namespace or a
//! class (or an Obj-C class/protocol), aggregating every declaration that
//! contributes to it: reopened namespaces, forward declarations and the
//! definition all land on the same node. Edges:
//!
//! - `parent`/`nested` form the canonical tree from the global namespace down.
//! - `usings` are visibility edges: base classes, using-directives,
//!   using-declarations and inline-namespace membership. They may form
//!   cycles, so every traversal carries a processed set.
//!
//! Members of a binding are *deferred*: the factory enqueues them on `todo`
//! and realizes them on first observation (`flush`). This keeps construction
//! lazy and breaks initialization cycles between mutually referencing scopes.
//!
//! Template-ids hitting a binding's name table go through `nested_type`,
//! which records specializations, materializes instantiations cloned under a
//! parameter substitution, and completes base-class edges that could not be
//! resolved at visit time (dependent bases).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::hash::Hash;
use tracing::{trace, warn};

use crate::binder::Binder;
use crate::control::Control;
use crate::interner::Atom;
use crate::name::{self, NameId, NameKind, NamePath};
use crate::subst::{self, Subst};
use crate::symbol::{self, SymbolId, SymbolKind};
use crate::ty::{FullType, TypeKind};

/// Handle into the factory's binding arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BindingId(pub u32);

/// One candidate produced by lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LookupItem {
    pub declaration: SymbolId,
    pub binding: Option<BindingId>,
    /// Overridden type, when lookup substituted one (template instantiation,
    /// namespace alias). `None` means the declaration's own type applies.
    pub ty: Option<FullType>,
    pub scope: Option<SymbolId>,
}

impl LookupItem {
    pub fn effective_type(&self, control: &Control) -> FullType {
        self.ty.unwrap_or(control.symbol(self.declaration).ty)
    }
}

/// Reentrancy guard keyed on the item that opened the outermost completion.
/// `clear` empties the whole set only when called with that first item, so
/// nested recursive considerations stay guarded until the outermost one
/// finishes.
#[derive(Debug)]
pub(crate) struct ConsideredSet<T> {
    first: Option<T>,
    set: FxHashSet<T>,
}

impl<T> Default for ConsideredSet<T> {
    fn default() -> Self {
        ConsideredSet {
            first: None,
            set: FxHashSet::default(),
        }
    }
}

impl<T: Eq + Hash + Copy> ConsideredSet<T> {
    pub(crate) fn insert(&mut self, item: T) {
        if self.set.is_empty() {
            self.first = Some(item);
        }
        self.set.insert(item);
    }

    pub(crate) fn contains(&self, item: T) -> bool {
        self.set.contains(&item)
    }

    pub(crate) fn clear(&mut self, item: T) {
        if self.first == Some(item) || self.set.len() == 1 {
            self.set.clear();
            self.first = None;
        }
    }
}

/// A class-or-namespace node.
#[derive(Debug)]
pub struct Binding {
    pub(crate) parent: Option<BindingId>,
    /// Declarations contributing to this binding, in visit order.
    pub(crate) symbols: Vec<SymbolId>,
    /// Members awaiting first-touch processing.
    pub(crate) todo: Vec<SymbolId>,
    /// Enums declared here; their enumerators are visible unqualified.
    pub(crate) enums: Vec<SymbolId>,
    /// Visibility edges, in resolution order.
    pub(crate) usings: Vec<BindingId>,
    /// Direct nested types, keyed by identifier.
    pub(crate) nested: FxHashMap<Atom, BindingId>,
    /// Explicit specializations of this (primary template) binding.
    pub(crate) specializations: FxHashMap<NameId, BindingId>,
    /// Set when this binding stands for a template-id.
    pub(crate) template_id: Option<NameId>,
    /// For instantiations, the binding whose lookup caused them.
    pub(crate) instantiation_origin: Option<BindingId>,
    pub(crate) considered_classes: ConsideredSet<SymbolId>,
    pub(crate) considered_templates: ConsideredSet<NameId>,
}

impl Binding {
    pub(crate) fn new(parent: Option<BindingId>) -> Self {
        Binding {
            parent,
            symbols: Vec::new(),
            todo: Vec::new(),
            enums: Vec::new(),
            usings: Vec::new(),
            nested: FxHashMap::default(),
            specializations: FxHashMap::default(),
            template_id: None,
            instantiation_origin: None,
            considered_classes: ConsideredSet::default(),
            considered_templates: ConsideredSet::default(),
        }
    }
}

impl Binder {
    pub fn parent_of(&self, binding: BindingId) -> Option<BindingId> {
        self.binding(binding).parent
    }

    pub fn template_id_of(&self, binding: BindingId) -> Option<NameId> {
        self.binding(binding).template_id
    }

    pub fn instantiation_origin_of(&self, binding: BindingId) -> Option<BindingId> {
        self.binding(binding).instantiation_origin
    }

    /// The root of the tree `binding` hangs off.
    pub fn global_namespace_of(&self, binding: BindingId) -> BindingId {
        let mut current = binding;
        while let Some(parent) = self.binding(current).parent {
            current = parent;
        }
        current
    }

    /// Realize deferred members. The queue is taken before processing, so a
    /// reentrant flush observes an empty queue and terminates.
    pub(crate) fn flush(&mut self, control: &mut Control, binding: BindingId) {
        if self.binding(binding).todo.is_empty() {
            return;
        }
        let todo = std::mem::take(&mut self.binding_mut(binding).todo);
        for member in todo {
            self.process_in(control, member, binding);
        }
    }

    /// Declarations contributing to `binding` (flushes first).
    pub fn symbols_of(&mut self, control: &mut Control, binding: BindingId) -> Vec<SymbolId> {
        self.flush(control, binding);
        self.binding(binding).symbols.clone()
    }

    /// Visibility edges of `binding` (flushes first).
    pub fn usings_of(&mut self, control: &mut Control, binding: BindingId) -> Vec<BindingId> {
        self.flush(control, binding);
        self.binding(binding).usings.clone()
    }

    /// Enums of `binding` (flushes first).
    pub fn enums_of(&mut self, control: &mut Control, binding: BindingId) -> Vec<SymbolId> {
        self.flush(control, binding);
        self.binding(binding).enums.clone()
    }

    pub(crate) fn add_using(&mut self, binding: BindingId, using: BindingId) {
        let data = self.binding_mut(binding);
        if !data.usings.contains(&using) {
            data.usings.push(using);
        }
    }

    /// Candidates for `name` local to `binding`: symbols, nested types,
    /// enums and usings, but not the enclosing scope.
    pub fn find(&mut self, control: &mut Control, binding: BindingId, name: NameId) -> Vec<LookupItem> {
        self.lookup_impl(control, binding, name, false)
    }

    /// Like [`Binder::find`], but walks up the parent chain until candidates
    /// appear.
    pub fn lookup(&mut self, control: &mut Control, binding: BindingId, name: NameId) -> Vec<LookupItem> {
        self.lookup_impl(control, binding, name, true)
    }

    fn lookup_impl(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: NameId,
        search_enclosing_scope: bool,
    ) -> Vec<LookupItem> {
        let mut result = Vec::new();

        if let NameKind::Qualified { base, name: tail } = control.name(name).clone() {
            let Some(base) = base else {
                // Leading `::` restarts at the global namespace.
                let global = self.global_namespace_of(binding);
                return self.find(control, global, tail);
            };

            if let Some(base_binding) = self.lookup_type(control, binding, base) {
                result = self.find(control, base_binding, tail);

                // A nested class may be forward declared in its class but
                // defined outside it; the out-of-line definition lives in an
                // ancestor's scope under a qualified name. Recover it by
                // comparing fully qualified names.
                let mut full_name = NamePath::new();
                name::add_names(control, Some(name), &mut full_name, false);

                let mut matched: Option<SymbolId> = None;
                let mut ancestor = self.binding(base_binding).parent;
                while let Some(parent_binding) = ancestor {
                    for scope_symbol in self.symbols_of(control, parent_binding) {
                        if !control.symbol(scope_symbol).is_scope() {
                            continue;
                        }
                        for candidate in control.symbol(scope_symbol).members.clone() {
                            let candidate_name = symbol::fully_qualified_name(control, candidate);
                            if name::compare_fully_qualified_name(control, &full_name, &candidate_name)
                            {
                                matched = Some(candidate);
                                break;
                            }
                        }
                        if matched.is_some() {
                            break;
                        }
                    }
                    if matched.is_some() {
                        break;
                    }
                    ancestor = self.binding(parent_binding).parent;
                }

                if let Some(declaration) = matched {
                    result.push(LookupItem {
                        declaration,
                        binding: Some(base_binding),
                        ty: None,
                        scope: None,
                    });
                }
            }
            return result;
        }

        let mut processed = FxHashSet::default();
        let mut current = Some(binding);
        while let Some(b) = current {
            self.lookup_all(control, name, b, &mut result, &mut processed, None);
            if !search_enclosing_scope {
                break;
            }
            current = self.binding(b).parent;
        }
        result
    }

    /// Breadth of one binding: local symbols and enums, then usings under a
    /// processed set. Friends and using-directive pseudo-members never
    /// introduce a name.
    fn lookup_all(
        &mut self,
        control: &mut Control,
        name: NameId,
        binding: BindingId,
        result: &mut Vec<LookupItem>,
        processed: &mut FxHashSet<BindingId>,
        template_id: Option<NameId>,
    ) {
        if !processed.insert(binding) {
            return;
        }

        let name_identifier = control.identifier(name);
        for s in self.symbols_of(control, binding) {
            let data = control.symbol(s);
            if data.is_friend || data.is_using_namespace_directive() {
                continue;
            }
            if !data.is_scope() {
                continue;
            }
            if data.is_class() {
                // The class name is visible inside the class itself.
                let class_identifier = data.name.and_then(|n| control.identifier(n));
                if let (Some(id), Some(class_id)) = (name_identifier, class_identifier) {
                    if id == class_id {
                        result.push(LookupItem {
                            declaration: s,
                            binding: Some(binding),
                            ty: None,
                            scope: None,
                        });
                    }
                }
            }
            self.lookup_in_scope(control, name, s, result, template_id, Some(binding));
        }

        for e in self.enums_of(control, binding) {
            self.lookup_in_scope(control, name, e, result, template_id, Some(binding));
        }

        let next_template_id = self.binding(binding).template_id;
        for using in self.usings_of(control, binding) {
            self.lookup_all(control, name, using, result, processed, next_template_id);
        }
    }

    /// The binding a type name denotes, searching enclosing scopes.
    pub fn lookup_type(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: NameId,
    ) -> Option<BindingId> {
        let mut processed = FxHashSet::default();
        self.lookup_type_helper(control, binding, name, &mut processed, true, binding)
    }

    /// Like [`Binder::lookup_type`] without the enclosing-scope walk.
    pub fn find_type(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: NameId,
    ) -> Option<BindingId> {
        let mut processed = FxHashSet::default();
        self.lookup_type_helper(control, binding, name, &mut processed, false, binding)
    }

    fn lookup_type_helper(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: NameId,
        processed: &mut FxHashSet<BindingId>,
        search_enclosing_scope: bool,
        origin: BindingId,
    ) -> Option<BindingId> {
        if let NameKind::Qualified { base, name: tail } = control.name(name).clone() {
            let mut inner_processed = FxHashSet::default();
            let Some(base) = base else {
                let global = self.global_namespace_of(binding);
                return self.lookup_type_helper(control, global, tail, &mut inner_processed, true, origin);
            };
            let base_binding =
                self.lookup_type_helper(control, binding, base, processed, true, origin)?;
            return self.lookup_type_helper(
                control,
                base_binding,
                tail,
                &mut inner_processed,
                false,
                origin,
            );
        }

        if !processed.insert(binding) {
            return None;
        }

        if matches!(control.name(name), NameKind::Id(_) | NameKind::Template { .. }) {
            self.flush(control, binding);

            for s in self.binding(binding).symbols.clone() {
                let data = control.symbol(s);
                if !data.is_class() {
                    continue;
                }
                let class_identifier = data.name.and_then(|n| control.identifier(n));
                if class_identifier.is_some() && class_identifier == control.identifier(name) {
                    return Some(binding);
                }
            }

            if let Some(e) = self.nested_type(control, binding, name, origin) {
                return Some(e);
            }

            if self.binding(binding).template_id.is_some() {
                // A template class with a sole base that is a type parameter
                // instantiates to a binding whose only using is that base;
                // type lookup delegates through it.
                let usings = self.binding(binding).usings.clone();
                if usings.len() == 1 {
                    if let Some(r) =
                        self.lookup_type_helper(control, usings[0], name, processed, true, origin)
                    {
                        return Some(r);
                    }
                } else if usings.len() > 1 {
                    warn!(
                        usings = usings.len(),
                        "instantiation delegation expected a single using"
                    );
                }
            }

            for using in self.usings_of(control, binding) {
                if let Some(r) =
                    self.lookup_type_helper(control, using, name, processed, false, origin)
                {
                    return Some(r);
                }
            }
        }

        if search_enclosing_scope {
            if let Some(parent) = self.binding(binding).parent {
                return self.lookup_type_helper(
                    control,
                    parent,
                    name,
                    processed,
                    search_enclosing_scope,
                    origin,
                );
            }
        }

        None
    }

    /// Resolve `name` against the direct nested-type table of `binding`,
    /// materializing specializations and instantiations, and completing
    /// base-class edges that were unresolved at visit time.
    pub(crate) fn nested_type(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: NameId,
        origin: BindingId,
    ) -> Option<BindingId> {
        self.flush(control, binding);

        let identifier = control.identifier(name)?;
        let mut reference = *self.binding(binding).nested.get(&identifier)?;

        let template = match control.name(name) {
            NameKind::Template {
                id,
                args,
                specialization,
            } => Some((*id, args.clone(), *specialization)),
            _ => None,
        };

        if let Some((template_atom, ref args, specialization)) = template {
            if specialization {
                // Specializations are recorded on the primary; their bodies
                // are populated when the declaration walk reaches them.
                if let Some(&existing) = self.binding(reference).specializations.get(&name) {
                    return Some(existing);
                }
                let fresh = self.alloc_binding(Some(reference));
                self.binding_mut(reference).specializations.insert(name, fresh);
                return Some(fresh);
            }
            // An instantiation prefers a matching full specialization as its
            // reference; probing under the as-if-specialization key finds it.
            let probe = control.template_name_id(template_atom, args.clone(), true);
            if let Some(&specialized) = self.binding(reference).specializations.get(&probe) {
                reference = specialized;
            }
        }

        // The reference may still be missing base-class edges when the bases
        // are dependent. Gather the declared base names now.
        self.flush(control, reference);
        let mut all_bases: Vec<NameId> = Vec::new();
        let mut reference_class: Option<SymbolId> = None;
        for s in self.binding(reference).symbols.clone() {
            if let SymbolKind::Class { bases } = &control.symbol(s).kind {
                for &base in bases {
                    if let Some(base_name) = control.symbol(base).name {
                        all_bases.push(base_name);
                    }
                }
                reference_class = Some(s);
                break;
            }
        }
        let Some(reference_class) = reference_class else {
            return Some(reference);
        };

        let is_instantiation = template.as_ref().is_some_and(|(_, _, spec)| !spec);
        if (!is_instantiation && self.binding(binding).considered_classes.contains(reference_class))
            || (is_instantiation && self.binding(binding).considered_templates.contains(name))
        {
            return Some(reference);
        }
        if !is_instantiation {
            self.binding_mut(binding).considered_classes.insert(reference_class);
        }

        let known_usings: FxHashSet<BindingId> =
            self.usings_of(control, reference).into_iter().collect();

        if let Some((template_atom, args, _)) = template {
            self.binding_mut(binding).considered_templates.insert(name);
            trace!(?name, "instantiating template binding");

            let instantiation = self.alloc_binding(Some(reference));
            self.binding_mut(instantiation).template_id = Some(name);
            self.binding_mut(instantiation).instantiation_origin = Some(origin);

            let enums = self.binding(reference).enums.clone();
            let usings = self.binding(reference).usings.clone();
            self.binding_mut(instantiation).enums = enums;
            self.binding_mut(instantiation).usings = usings;

            let enclosing_template = control
                .symbol(reference_class)
                .enclosing_scope
                .filter(|&scope| control.symbol(scope).is_template());

            if let Some(template_symbol) = enclosing_template {
                // Dependent names in the body and the base clause are bound
                // to the supplied arguments.
                let parameters: Vec<SymbolId> =
                    control.template_parameters(template_symbol).to_vec();
                let argument_count = args.len();

                if self.expand_templates {
                    let mut body_subst = Subst::new();
                    for (i, &parameter) in parameters.iter().enumerate().take(argument_count) {
                        let data = control.symbol(parameter);
                        if !matches!(data.kind, SymbolKind::TypenameArgument) {
                            continue;
                        }
                        if let Some(parameter_name) = data.name {
                            body_subst.bind(parameter_name, args[i]);
                        }
                    }
                    for s in self.binding(reference).symbols.clone() {
                        let enclosing = control.symbol(s).enclosing_scope;
                        let clone = subst::clone_symbol(control, &body_subst, s, enclosing);
                        self.binding_mut(instantiation).symbols.push(clone);
                    }
                    self.instantiate_nested_classes(control, reference, &body_subst, instantiation);
                } else {
                    let symbols = self.binding(reference).symbols.clone();
                    self.binding_mut(instantiation).symbols.extend(symbols);
                }

                let mut parameter_index: FxHashMap<NameId, usize> = FxHashMap::default();
                for (i, &parameter) in parameters.iter().enumerate() {
                    if let Some(parameter_name) = control.symbol(parameter).name {
                        parameter_index.insert(parameter_name, i);
                    }
                }

                for base_name in all_bases {
                    let mut base_binding: Option<BindingId> = None;

                    if matches!(control.name(base_name), NameKind::Id(_)) {
                        // A type parameter itself is the base:
                        // template <class T> class A : public T {};
                        if let Some(&index) = parameter_index.get(&base_name) {
                            if index < argument_count {
                                let argument = args[index];
                                if argument.is_valid() {
                                    if let Some(argument_name) = control
                                        .full_type_kind(argument)
                                        .and_then(TypeKind::as_named)
                                    {
                                        base_binding =
                                            self.lookup_type(control, binding, argument_name);
                                    }
                                }
                            }
                        }
                    } else {
                        let mut base_subst = Subst::new();
                        for (i, &parameter) in parameters.iter().enumerate().take(argument_count) {
                            if let Some(parameter_name) = control.symbol(parameter).name {
                                base_subst.bind(parameter_name, args[i]);
                            }
                        }
                        let rewritten = subst::rewrite_name(control, &base_subst, base_name);

                        match control.name(rewritten).clone() {
                            NameKind::Template { id: base_atom, .. } => {
                                // Another template using the dependent name:
                                // template <class T> class A : public B<T> {};
                                if base_atom != template_atom {
                                    base_binding = self.nested_type(control, binding, rewritten, origin);
                                }
                            }
                            NameKind::Qualified { base: qualification, name: tail } => {
                                // Qualified bases in general:
                                // template <class T> class A : public B<T>::Type {};
                                let mut qualification_binding = Some(binding);
                                if let Some(qualification) = qualification {
                                    let names_current_template = match control.name(qualification) {
                                        NameKind::Template { id, .. } => *id == template_atom,
                                        _ => false,
                                    };
                                    if !names_current_template {
                                        qualification_binding =
                                            self.lookup_type(control, binding, qualification);
                                    }
                                }
                                if let Some(qualification_binding) = qualification_binding {
                                    base_binding =
                                        self.lookup_type(control, qualification_binding, tail);
                                }
                            }
                            _ => {}
                        }
                    }

                    if let Some(base_binding) = base_binding {
                        if !known_usings.contains(&base_binding) {
                            self.add_using(instantiation, base_binding);
                        }
                    }
                }
            } else {
                // Not enclosed by a template: the instantiation shares the
                // reference's nested types and symbols.
                let nested = self.binding(reference).nested.clone();
                self.binding_mut(instantiation).nested = nested;
                let symbols = self.binding(reference).symbols.clone();
                self.binding_mut(instantiation).symbols.extend(symbols);
            }

            self.binding_mut(binding).considered_templates.clear(name);
            return Some(instantiation);
        }

        if all_bases.is_empty() || all_bases.len() == known_usings.len() {
            return Some(reference);
        }

        // Complete the missing bases of a regular class in place.
        // Ex.: class A : public B<Some>::Type {};
        let reference_class_path = symbol::fully_qualified_name(control, reference_class);
        for declared_base in all_bases {
            let mut base_name = declared_base;
            let mut search_binding = Some(binding);

            if let NameKind::Qualified { base: qualification, name: tail } =
                control.name(declared_base).clone()
            {
                let mut base_path = NamePath::new();
                name::add_names(control, Some(declared_base), &mut base_path, false);
                if name::compare_fully_qualified_name(control, &reference_class_path, &base_path) {
                    continue;
                }

                if let Some(qualification) = qualification {
                    search_binding = self.lookup_type(control, binding, qualification);
                } else if self.binding(binding).parent.is_some() {
                    // A globally qualified base:
                    // class A {}; namespace NS { class B : public ::A {}; }
                    search_binding = Some(self.global_namespace_of(binding));
                } else {
                    continue;
                }
                base_name = tail;
            } else if name::compare_name(control, name, declared_base) {
                // Direct cyclic inheritance.
                continue;
            }

            if let Some(search_binding) = search_binding {
                if let Some(base_binding) = self.lookup_type(control, search_binding, base_name) {
                    if !known_usings.contains(&base_binding) {
                        self.add_using(reference, base_binding);
                    }
                }
            }
        }

        self.binding_mut(binding).considered_classes.clear(reference_class);
        Some(reference)
    }

    /// Nested classes whose member declarations mention a substituted
    /// parameter get their own instantiation; independent ones are shared
    /// with the reference.
    fn instantiate_nested_classes(
        &mut self,
        control: &mut Control,
        reference: BindingId,
        substitution: &Subst,
        instantiation: BindingId,
    ) {
        let mut considered = FxHashSet::default();
        self.instantiate_nested_rec(control, reference, substitution, instantiation, &mut considered);
    }

    fn instantiate_nested_rec(
        &mut self,
        control: &mut Control,
        enclosing: BindingId,
        substitution: &Subst,
        enclosing_instantiation: BindingId,
        considered: &mut FxHashSet<BindingId>,
    ) {
        if !considered.insert(enclosing) {
            return;
        }
        for (nested_identifier, nested) in self.binding(enclosing).nested.clone() {
            let mut target = nested;
            let nested_symbols = self.binding(nested).symbols.clone();
            if self.nested_instantiation_needed(control, &nested_symbols, substitution) {
                target = self.alloc_binding(Some(nested));
                let enums = self.binding(nested).enums.clone();
                let usings = self.binding(nested).usings.clone();
                self.binding_mut(target).enums = enums;
                self.binding_mut(target).usings = usings;
                self.binding_mut(target).instantiation_origin = Some(nested);
                for s in nested_symbols {
                    let enclosing_scope = control.symbol(s).enclosing_scope;
                    let clone = subst::clone_symbol(control, substitution, s, enclosing_scope);
                    self.binding_mut(target).symbols.push(clone);
                }
                self.instantiate_nested_rec(control, nested, substitution, target, considered);
            }
            self.binding_mut(enclosing_instantiation)
                .nested
                .insert(nested_identifier, target);
        }
        considered.remove(&enclosing);
    }

    fn nested_instantiation_needed(
        &self,
        control: &Control,
        symbols: &[SymbolId],
        substitution: &Subst,
    ) -> bool {
        for &s in symbols {
            if !control.symbol(s).is_class() {
                continue;
            }
            for &member in &control.symbol(s).members {
                let data = control.symbol(member);
                if data.is_declaration()
                    && subst::declaration_mentions_substituted_name(control, substitution, member)
                {
                    return true;
                }
                if data.is_function()
                    && subst::function_mentions_substituted_name(control, substitution, member)
                {
                    return true;
                }
            }
        }
        false
    }

    /// Return the existing nested binding for `name`, or allocate one.
    /// Qualified names create the whole chain; a missing name yields the
    /// binding itself.
    pub fn find_or_create_type(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: Option<NameId>,
    ) -> BindingId {
        self.find_or_create_type_from(control, binding, name, None)
    }

    fn find_or_create_type_from(
        &mut self,
        control: &mut Control,
        binding: BindingId,
        name: Option<NameId>,
        origin: Option<BindingId>,
    ) -> BindingId {
        let Some(name) = name else {
            return binding;
        };
        let origin = origin.unwrap_or(binding);

        match control.name(name).clone() {
            NameKind::Qualified { base, name: tail } => {
                let host = match base {
                    None => self.global_namespace_of(binding),
                    Some(base) => {
                        self.find_or_create_type_from(control, binding, Some(base), Some(origin))
                    }
                };
                self.find_or_create_type_from(control, host, Some(tail), Some(origin))
            }
            NameKind::Id(identifier) => {
                if let Some(existing) = self.nested_type(control, binding, name, origin) {
                    return existing;
                }
                let fresh = self.alloc_binding(Some(binding));
                self.binding_mut(binding).nested.insert(identifier, fresh);
                fresh
            }
            NameKind::Template { id, .. } => {
                if let Some(existing) = self.nested_type(control, binding, name, origin) {
                    return existing;
                }
                let fresh = self.alloc_binding(Some(binding));
                self.binding_mut(binding).nested.insert(id, fresh);
                fresh
            }
            _ => binding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_considered_set_clears_on_first_item_only() {
        let mut set: ConsideredSet<u32> = ConsideredSet::default();
        set.insert(1);
        set.insert(2);
        assert!(set.contains(1) && set.contains(2));

        // Clearing an inner item leaves the guard armed.
        set.clear(2);
        assert!(set.contains(1) && set.contains(2));

        // Clearing the outermost item disarms everything.
        set.clear(1);
        assert!(!set.contains(1) && !set.contains(2));
    }

    #[test]
    fn test_considered_set_single_item() {
        let mut set: ConsideredSet<u32> = ConsideredSet::default();
        set.insert(7);
        set.clear(7);
        assert!(!set.contains(7));
    }
}
