//! The lookup façade.
//!
//! `LookupContext` ties one translation unit and an ambient snapshot to a
//! lazily built binding graph and exposes the query surface an IDE needs:
//! candidate lookup for a name in a source scope, type resolution, qualified
//! paths, and minimal re-qualification of a symbol from a target scope.
//!
//! Scope walking runs innermost to outermost and dispatches on scope kind:
//! block locals shadow everything, function parameters come before the
//! enclosing class of an out-of-line definition, template parameters win
//! immediately, and class/namespace scopes resolve through their bindings.

use tracing::trace;

use crate::binder::Binder;
use crate::binding::{BindingId, LookupItem};
use crate::control::Control;
use crate::document::{Document, Snapshot};
use crate::interner::Atom;
use crate::name::{NameId, NameKind, NamePath};
use crate::symbol::{self, SymbolId, SymbolKind};

/// Query façade over one translation unit plus its snapshot.
pub struct LookupContext {
    /// Ephemeral parse of a user-typed fragment, for the IDE glue above;
    /// takes no part in binding.
    expression_document: Option<Document>,
    this_document: Document,
    snapshot: Snapshot,
    control: Control,
    binder: Option<Binder>,
    expand_templates: bool,
}

impl LookupContext {
    pub fn new(this_document: Document, snapshot: Snapshot, control: Control) -> Self {
        LookupContext {
            expression_document: None,
            this_document,
            snapshot,
            control,
            binder: None,
            expand_templates: false,
        }
    }

    pub fn with_expression_document(mut self, document: Document) -> Self {
        self.expression_document = Some(document);
        self
    }

    /// Governs whether template instantiation clones symbol bodies under the
    /// argument substitution or shares them verbatim.
    pub fn set_expand_templates(&mut self, expand: bool) {
        self.expand_templates = expand;
        if let Some(binder) = self.binder.as_mut() {
            binder.set_expand_templates(expand);
        }
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut Control {
        &mut self.control
    }

    pub fn this_document(&self) -> &Document {
        &self.this_document
    }

    pub fn expression_document(&self) -> Option<&Document> {
        self.expression_document.as_ref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn document(&self, file_name: Atom) -> Option<&Document> {
        self.snapshot.document(file_name)
    }

    /// The binding factory, constructed on first use.
    fn parts(&mut self) -> (&mut Binder, &mut Control) {
        if self.binder.is_none() {
            self.binder = Some(Binder::new(
                &mut self.control,
                &self.this_document,
                &self.snapshot,
                self.expand_templates,
            ));
        }
        match self.binder.as_mut() {
            Some(binder) => (binder, &mut self.control),
            None => unreachable!("binder was just constructed"),
        }
    }

    pub fn global_namespace(&mut self) -> BindingId {
        self.parts().0.global_namespace()
    }

    /// The ordered enclosing-scope names of `symbol`, root first.
    pub fn path(&self, symbol: SymbolId) -> NamePath {
        symbol::path(&self.control, symbol)
    }

    /// The canonical qualified-name components of `symbol`.
    pub fn fully_qualified_name(&self, symbol: SymbolId) -> NamePath {
        symbol::fully_qualified_name(&self.control, symbol)
    }

    /// Candidates for `name` as seen from `scope`, walking enclosing scopes
    /// innermost to outermost.
    pub fn lookup(&mut self, name: NameId, scope: SymbolId) -> Vec<LookupItem> {
        let (binder, control) = self.parts();
        lookup_in_scopes(binder, control, name, scope)
    }

    /// The binding `name` denotes when resolved from `scope`.
    pub fn lookup_type(
        &mut self,
        name: NameId,
        scope: SymbolId,
        enclosing_template_instantiation: Option<BindingId>,
    ) -> Option<BindingId> {
        let (binder, control) = self.parts();
        lookup_type_in_scope(
            binder,
            control,
            name,
            Some(scope),
            enclosing_template_instantiation,
        )
    }

    /// The binding a scope symbol belongs to.
    pub fn lookup_type_for_symbol(
        &mut self,
        symbol: SymbolId,
        enclosing_template_instantiation: Option<BindingId>,
    ) -> Option<BindingId> {
        let (binder, control) = self.parts();
        binder.lookup_type_for(control, symbol, enclosing_template_instantiation)
    }

    /// The binding enclosing `symbol`, resolved by walking its path with
    /// direct nesting only.
    pub fn lookup_parent(&mut self, symbol: SymbolId) -> Option<BindingId> {
        let path = symbol::path(&self.control, symbol);
        let (binder, control) = self.parts();
        let mut binding = binder.global_namespace();
        for &component in path.iter() {
            binding = binder.find_type(control, binding, component)?;
        }
        Some(binding)
    }

    /// The shortest qualified name that, looked up from `target`, resolves
    /// to exactly `symbol`. Builds suffixes of the fully qualified name
    /// right to left and stops at the first one that disambiguates.
    pub fn minimal_name(&mut self, symbol: SymbolId, target: BindingId) -> Option<NameId> {
        let names = symbol::fully_qualified_name(&self.control, symbol);
        let mut minimal: Option<NameId> = None;

        for &component in names.iter().rev() {
            minimal = Some(match minimal {
                None => component,
                Some(suffix) => self.control.qualified_name_id(Some(component), suffix),
            });

            let candidate = match minimal {
                Some(candidate) => candidate,
                None => continue,
            };
            let (binder, control) = self.parts();
            let results = binder.lookup(control, target, candidate);
            for item in results {
                if symbol::symbols_identical(control, item.declaration, symbol) {
                    return minimal;
                }
            }
        }

        minimal
    }

    // -------------------------------------------------------------------------
    // Binding accessors routed through the context
    // -------------------------------------------------------------------------

    /// Candidates for `name` local to `binding`.
    pub fn find_in(&mut self, binding: BindingId, name: NameId) -> Vec<LookupItem> {
        let (binder, control) = self.parts();
        binder.find(control, binding, name)
    }

    /// Candidates for `name` in `binding` or its enclosing bindings.
    pub fn lookup_in(&mut self, binding: BindingId, name: NameId) -> Vec<LookupItem> {
        let (binder, control) = self.parts();
        binder.lookup(control, binding, name)
    }

    /// The type `name` denotes inside `binding`, enclosing scopes included.
    pub fn lookup_type_in(&mut self, binding: BindingId, name: NameId) -> Option<BindingId> {
        let (binder, control) = self.parts();
        binder.lookup_type(control, binding, name)
    }

    /// The type `name` denotes inside `binding` only.
    pub fn find_type_in(&mut self, binding: BindingId, name: NameId) -> Option<BindingId> {
        let (binder, control) = self.parts();
        binder.find_type(control, binding, name)
    }

    pub fn symbols_in(&mut self, binding: BindingId) -> Vec<SymbolId> {
        let (binder, control) = self.parts();
        binder.symbols_of(control, binding)
    }

    pub fn usings_in(&mut self, binding: BindingId) -> Vec<BindingId> {
        let (binder, control) = self.parts();
        binder.usings_of(control, binding)
    }

    pub fn enums_in(&mut self, binding: BindingId) -> Vec<SymbolId> {
        let (binder, control) = self.parts();
        binder.enums_of(control, binding)
    }

    pub fn binding_parent(&mut self, binding: BindingId) -> Option<BindingId> {
        self.parts().0.parent_of(binding)
    }

    pub fn binding_template_id(&mut self, binding: BindingId) -> Option<NameId> {
        self.parts().0.template_id_of(binding)
    }
}

/// Scope-kind-dispatched walk from `scope` outward.
fn lookup_in_scopes(
    binder: &mut Binder,
    control: &mut Control,
    name: NameId,
    scope: SymbolId,
) -> Vec<LookupItem> {
    let mut candidates = Vec::new();
    trace!(?name, "lookup in scope chain");

    let mut next = Some(scope);
    while let Some(scope) = next {
        let kind = control.symbol(scope).kind.clone();
        match kind {
            SymbolKind::Block if control.identifier(name).is_some() => {
                binder.lookup_in_scope(control, name, scope, &mut candidates, None, None);
                if !candidates.is_empty() {
                    break; // locals shadow everything
                }

                // A using-directive inside the block opens the named
                // namespace for this lookup.
                for member in control.symbol(scope).members.clone() {
                    let member_data = control.symbol(member);
                    if !member_data.is_using_namespace_directive() {
                        continue;
                    }
                    let Some(directive_name) = member_data.name else {
                        continue;
                    };
                    let enclosing = control.enclosing_namespace(scope);
                    if let Some(opened) =
                        lookup_type_in_scope(binder, control, directive_name, enclosing, None)
                    {
                        candidates = binder.find(control, opened, name);
                        if !candidates.is_empty() {
                            return candidates;
                        }
                    }
                }
            }
            SymbolKind::Function => {
                binder.lookup_in_scope(control, name, scope, &mut candidates, None, None);
                if !candidates.is_empty() {
                    break; // it's a parameter
                }

                // An out-of-line member function sees its class and the
                // inheritance chain above it.
                let is_qualified = control
                    .symbol(scope)
                    .name
                    .map(|n| matches!(control.name(n), NameKind::Qualified { .. }))
                    .unwrap_or(false);
                if is_qualified {
                    if let Some(mut binding) = binder.lookup_type_for(control, scope, None) {
                        candidates = binder.find(control, binding, name);
                        while candidates.is_empty() {
                            match binder.parent_of(binding) {
                                Some(parent) => {
                                    binding = parent;
                                    candidates = binder.find(control, binding, name);
                                }
                                None => break,
                            }
                        }
                        if !candidates.is_empty() {
                            return candidates;
                        }
                    }
                }
            }
            SymbolKind::ObjcMethod => {
                binder.lookup_in_scope(control, name, scope, &mut candidates, None, None);
                if !candidates.is_empty() {
                    break; // it's a formal argument
                }
            }
            SymbolKind::Template { .. } => {
                binder.lookup_in_scope(control, name, scope, &mut candidates, None, None);
                if !candidates.is_empty() {
                    return candidates; // it's a template parameter
                }
            }
            SymbolKind::Class { .. }
            | SymbolKind::Namespace { .. }
            | SymbolKind::ObjcClass { .. }
            | SymbolKind::ObjcProtocol { .. } => {
                if let Some(binding) = binder.lookup_type_for(control, scope, None) {
                    candidates = binder.find(control, binding, name);
                    if !candidates.is_empty() {
                        return candidates;
                    }
                }
            }
            _ => {}
        }

        next = control.symbol(scope).enclosing_scope;
    }

    candidates
}

/// Type resolution from a source scope. Blocks honor their using-directives
/// and local typedef chains before deferring to the enclosing scope; other
/// scopes resolve through their binding.
fn lookup_type_in_scope(
    binder: &mut Binder,
    control: &mut Control,
    name: NameId,
    scope: Option<SymbolId>,
    enclosing_template_instantiation: Option<BindingId>,
) -> Option<BindingId> {
    let scope = scope?;

    if control.symbol(scope).is_block() {
        for member in control.symbol(scope).members.clone() {
            let member_data = control.symbol(member);
            if member_data.is_using_namespace_directive() {
                if let Some(directive_name) = member_data.name {
                    let enclosing = control.enclosing_namespace(scope);
                    if let Some(opened) =
                        lookup_type_in_scope(binder, control, directive_name, enclosing, None)
                    {
                        if let Some(found) = binder.lookup_type(control, opened, name) {
                            return Some(found);
                        }
                    }
                }
            } else if member_data.is_declaration()
                && member_data.is_typedef
                && member_data.name == Some(name)
            {
                // A local typedef redirects the search to its target name.
                let target = control
                    .full_type_kind(member_data.ty)
                    .and_then(crate::ty::TypeKind::as_named);
                if let Some(target) = target {
                    return lookup_type_in_scope(binder, control, target, Some(scope), None);
                }
            }
        }
        let enclosing = control.symbol(scope).enclosing_scope;
        return lookup_type_in_scope(
            binder,
            control,
            name,
            enclosing,
            enclosing_template_instantiation,
        );
    }

    let binding = binder.lookup_type_for(control, scope, enclosing_template_instantiation)?;
    binder.lookup_type(control, binding, name)
}
