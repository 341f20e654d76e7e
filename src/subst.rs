//! Template substitution: environments, symbol cloning, name rewriting.
//!
//! A substitution maps template-parameter *name identity* to concrete types.
//! The cloner deep-copies a symbol subtree while rewriting every type it
//! carries through the substitution; name rewriting turns dependent base
//! names (`B<T>`, `B<T>::Type`) into their substituted forms.

use rustc_hash::FxHashMap;

use crate::control::Control;
use crate::name::{NameId, NameKind};
use crate::symbol::{SymbolId, SymbolKind};
use crate::ty::{FullType, TypeKind};

/// Mapping from template-parameter names to argument types.
#[derive(Debug, Default)]
pub struct Subst {
    map: FxHashMap<NameId, FullType>,
}

impl Subst {
    pub fn new() -> Self {
        Subst::default()
    }

    pub fn bind(&mut self, name: NameId, ty: FullType) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: NameId) -> Option<FullType> {
        self.map.get(&name).copied()
    }

    pub fn contains(&self, name: NameId) -> bool {
        self.map.contains_key(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Rewrite a type through the substitution. Pointer and reference types are
/// rebuilt around their substituted element; named types are replaced when
/// their name is bound.
pub fn apply_type(control: &mut Control, subst: &Subst, ty: FullType) -> FullType {
    if subst.is_empty() || !ty.is_valid() {
        return ty;
    }
    let kind = match control.full_type_kind(ty) {
        Some(kind) => kind.clone(),
        None => return ty,
    };
    match kind {
        TypeKind::Named(name) => match subst.get(name) {
            Some(mut substituted) => {
                substituted.is_const |= ty.is_const;
                substituted.is_volatile |= ty.is_volatile;
                substituted
            }
            None => ty,
        },
        TypeKind::Pointer(element) => {
            let rewritten = apply_type(control, subst, element);
            if rewritten == element {
                ty
            } else {
                let mut out = control.pointer_type(rewritten);
                out.is_const = ty.is_const;
                out.is_volatile = ty.is_volatile;
                out
            }
        }
        TypeKind::Reference(element) => {
            let rewritten = apply_type(control, subst, element);
            if rewritten == element {
                ty
            } else {
                let mut out = control.reference_type(rewritten);
                out.is_const = ty.is_const;
                out.is_volatile = ty.is_volatile;
                out
            }
        }
        _ => ty,
    }
}

/// Rewrite a name through the substitution: template arguments and qualified
/// components are rewritten recursively; a plain identifier bound to a named
/// type is replaced by that type's name.
pub fn rewrite_name(control: &mut Control, subst: &Subst, name: NameId) -> NameId {
    match control.name(name).clone() {
        NameKind::Template {
            id,
            args,
            specialization,
        } => {
            let args = args
                .into_iter()
                .map(|arg| apply_type(control, subst, arg))
                .collect();
            control.template_name_id(id, args, specialization)
        }
        NameKind::Qualified { base, name: tail } => {
            let base = base.map(|b| rewrite_name(control, subst, b));
            let tail = rewrite_name(control, subst, tail);
            control.qualified_name_id(base, tail)
        }
        NameKind::Id(_) => match subst.get(name) {
            Some(ty) => match control.full_type_kind(ty).and_then(TypeKind::as_named) {
                Some(substituted) => substituted,
                None => name,
            },
            None => name,
        },
        _ => name,
    }
}

/// Deep-copy `symbol` with all carried types rewritten through `subst`.
/// Members are cloned into the new symbol; the top-level clone keeps the
/// enclosing scope handed in by the caller, so qualified paths and template
/// discovery keep working on clones.
pub fn clone_symbol(
    control: &mut Control,
    subst: &Subst,
    symbol: SymbolId,
    enclosing_scope: Option<SymbolId>,
) -> SymbolId {
    let mut data = control.symbol(symbol).clone();
    let members = std::mem::take(&mut data.members);
    data.enclosing_scope = enclosing_scope;
    data.ty = apply_type(control, subst, data.ty);

    let bases = match &mut data.kind {
        SymbolKind::Class { bases } => std::mem::take(bases),
        _ => Vec::new(),
    };

    let clone = control.alloc_symbol(data);

    // Self-referential types point at the clone, not the original.
    if matches!(
        control.symbol(clone).kind,
        SymbolKind::Class { .. } | SymbolKind::ObjcClass { .. }
    ) {
        let ty = control.class_type(clone);
        control.symbol_mut(clone).ty = ty;
    } else if matches!(control.symbol(clone).kind, SymbolKind::Enum) {
        let ty = control.enum_type(clone);
        control.symbol_mut(clone).ty = ty;
    } else if matches!(control.symbol(clone).kind, SymbolKind::Function) {
        let ty = control.function_type(clone);
        control.symbol_mut(clone).ty = ty;
    }

    for base in bases {
        let base_data = control.symbol(base).clone();
        let rewritten = base_data
            .name
            .map(|name| rewrite_name(control, subst, name));
        let mut base_clone = base_data;
        base_clone.name = rewritten;
        base_clone.enclosing_scope = Some(clone);
        let base_clone = control.alloc_symbol(base_clone);
        if let SymbolKind::Class { bases } = &mut control.symbol_mut(clone).kind {
            bases.push(base_clone);
        }
    }

    for member in members {
        let member_clone = clone_symbol(control, subst, member, Some(clone));
        control.symbol_mut(clone).members.push(member_clone);
    }

    clone
}

fn named_type_behind(control: &Control, ty: FullType) -> Option<NameId> {
    match control.full_type_kind(ty)? {
        TypeKind::Named(name) => Some(*name),
        TypeKind::Pointer(element) | TypeKind::Reference(element) => {
            named_type_behind(control, *element)
        }
        _ => None,
    }
}

/// Whether a member declaration's type mentions a substituted parameter,
/// looking through pointers and references. Decides if a nested class needs
/// its own instantiation.
pub fn declaration_mentions_substituted_name(
    control: &Control,
    subst: &Subst,
    symbol: SymbolId,
) -> bool {
    match named_type_behind(control, control.symbol(symbol).ty) {
        Some(name) => subst.contains(name),
        None => false,
    }
}

/// Conservative: function signatures are never analyzed for dependent names,
/// so nested functions alone never force a nested-class instantiation.
pub fn function_mentions_substituted_name(
    _control: &Control,
    _subst: &Subst,
    _symbol: SymbolId,
) -> bool {
    false
}

/// Positional parameter-to-argument substitution of one declaration's type:
/// locate the template enclosing `symbol`, bind its typename parameters to
/// the arguments of `template_id`, and rewrite the declaration's type.
///
/// Used when lookup walks into an instantiation whose body was not expanded;
/// candidates found there report the type they would have in the
/// instantiation.
pub fn instantiate_declaration_type(
    control: &mut Control,
    template_id: NameId,
    symbol: SymbolId,
) -> FullType {
    let ty = control.symbol(symbol).ty;
    let args = match control.name(template_id) {
        NameKind::Template { args, .. } => args.clone(),
        _ => return ty,
    };

    let mut enclosing = control.symbol(symbol).enclosing_scope;
    let template = loop {
        match enclosing {
            Some(scope) if control.symbol(scope).is_template() => break scope,
            Some(scope) => enclosing = control.symbol(scope).enclosing_scope,
            None => return ty,
        }
    };

    let mut subst = Subst::new();
    let parameters: Vec<SymbolId> = control.template_parameters(template).to_vec();
    for (parameter, arg) in parameters.iter().zip(args.iter()) {
        let parameter = control.symbol(*parameter);
        if !matches!(parameter.kind, SymbolKind::TypenameArgument) {
            continue;
        }
        if let Some(name) = parameter.name {
            subst.bind(name, *arg);
        }
    }

    apply_type(control, &subst, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SourcePos;

    #[test]
    fn test_apply_type_through_pointers() {
        let mut c = Control::new();
        let t = c.intern("T");
        let t_name = c.name_id(t);
        let named_t = c.named_type(t_name);
        let ptr_t = c.pointer_type(named_t);
        let ref_ptr_t = c.reference_type(ptr_t);

        let mut subst = Subst::new();
        subst.bind(t_name, c.int_type);

        let rewritten = apply_type(&mut c, &subst, ref_ptr_t);
        let element = c.full_type_kind(rewritten).and_then(TypeKind::element_type);
        let element = element.expect("reference element");
        let inner = c.full_type_kind(element).and_then(TypeKind::element_type);
        assert_eq!(inner, Some(c.int_type));
    }

    #[test]
    fn test_rewrite_template_and_qualified_names() {
        let mut c = Control::new();
        let t = c.intern("T");
        let b = c.intern("B");
        let ty_atom = c.intern("Type");
        let t_name = c.name_id(t);
        let named_t = c.named_type(t_name);

        let b_of_t = c.template_name_id(b, vec![named_t], false);
        let type_name = c.name_id(ty_atom);
        let qualified = c.qualified_name_id(Some(b_of_t), type_name);

        let mut subst = Subst::new();
        subst.bind(t_name, c.int_type);

        let rewritten = rewrite_name(&mut c, &subst, qualified);
        let NameKind::Qualified { base, name } = c.name(rewritten).clone() else {
            panic!("expected qualified name");
        };
        assert_eq!(name, type_name);
        let base = base.expect("base");
        let NameKind::Template { args, .. } = c.name(base).clone() else {
            panic!("expected template base");
        };
        assert_eq!(args, vec![c.int_type]);
    }

    #[test]
    fn test_clone_substitutes_member_types() {
        let mut c = Control::new();
        let file = c.intern("a.h");
        let global = c.new_global_namespace(file);
        let class = c.new_class(global, Some("List"), SourcePos::new(file, 1, 1));
        let t = c.intern("T");
        let t_name = c.name_id(t);
        let named_t = c.named_type(t_name);
        let member = c.new_declaration(class, "value", named_t, SourcePos::new(file, 2, 3));

        let mut subst = Subst::new();
        subst.bind(t_name, c.int_type);

        let scope = c.symbol(class).enclosing_scope;
        let clone = clone_symbol(&mut c, &subst, class, scope);
        assert_ne!(clone, class);
        let cloned_member = c.symbol(clone).members[0];
        assert_eq!(c.symbol(cloned_member).ty, c.int_type);
        assert_eq!(c.symbol(cloned_member).pos, c.symbol(member).pos);
        // The original is untouched.
        assert_eq!(c.symbol(member).ty, named_t);
    }
}
