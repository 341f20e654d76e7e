//! The name model.
//!
//! C++ names are a tagged variant: plain identifiers, template-ids with
//! argument lists, qualified chains, operator/conversion/destructor names.
//! Names are interned structurally inside [`Control`](crate::control::Control),
//! so equal structure means equal [`NameId`]. Substitution environments key on
//! that identity, matching the identifier interning discipline.

use serde::Serialize;
use smallvec::SmallVec;

use crate::control::Control;
use crate::interner::Atom;
use crate::ty::FullType;

/// Interned name handle. Structural interning: two names with the same
/// structure receive the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NameId(pub u32);

/// Overloadable operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    ExclaimEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    PlusEqual,
    MinusEqual,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Arrow,
    Call,
    Index,
}

/// A name, decomposed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// A plain identifier.
    Id(Atom),
    /// A template-id, `Foo<T1, T2>`. `specialization` distinguishes an
    /// explicit/partial specialization declaration from an instantiation use.
    Template {
        id: Atom,
        args: Vec<FullType>,
        specialization: bool,
    },
    /// A qualified chain, `A::B::C`. A missing base denotes a leading `::`.
    Qualified {
        base: Option<NameId>,
        name: NameId,
    },
    /// An operator function name, `operator+`.
    Operator(OperatorKind),
    /// A conversion function name, `operator T`.
    Conversion(FullType),
    /// A destructor name, `~Foo`.
    Destructor(Atom),
}

/// Short buffer for qualified-name component lists.
pub type NamePath = SmallVec<[NameId; 8]>;

/// Identifier-equality comparison: equal ids, or both names carry the same
/// identifier atom.
pub fn compare_name(control: &Control, name: NameId, other: NameId) -> bool {
    if name == other {
        return true;
    }
    match (control.identifier(name), control.identifier(other)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Component-wise identifier equality over qualified paths.
pub fn compare_fully_qualified_name(control: &Control, path: &[NameId], other: &[NameId]) -> bool {
    if path.len() != other.len() {
        return false;
    }
    path.iter()
        .zip(other.iter())
        .all(|(&a, &b)| compare_name(control, a, b))
}

/// Flatten a name into its component list. Qualified names contribute their
/// components in order; non-composite names contribute themselves only when
/// they are identifiers or template-ids, unless `add_all_names` is set.
pub fn add_names(control: &Control, name: Option<NameId>, names: &mut NamePath, add_all_names: bool) {
    let Some(name) = name else {
        return;
    };
    match control.name(name) {
        NameKind::Qualified { base, name: tail } => {
            add_names(control, *base, names, false);
            add_names(control, Some(*tail), names, add_all_names);
        }
        NameKind::Id(_) | NameKind::Template { .. } => names.push(name),
        _ if add_all_names => names.push(name),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Control;

    #[test]
    fn test_structural_interning() {
        let mut c = Control::new();
        let foo = c.intern("Foo");
        let n1 = c.name_id(foo);
        let n2 = c.name_id(foo);
        assert_eq!(n1, n2, "same identifier should intern to the same name");

        let int_ty = c.int_type;
        let t1 = c.template_name_id(foo, vec![int_ty], false);
        let t2 = c.template_name_id(foo, vec![int_ty], false);
        let t3 = c.template_name_id(foo, vec![int_ty], true);
        assert_eq!(t1, t2);
        assert_ne!(t1, t3, "specialization flag is part of the identity");
        assert_ne!(n1, t1);
    }

    #[test]
    fn test_identifier_extraction() {
        let mut c = Control::new();
        let a = c.intern("A");
        let b = c.intern("B");
        let na = c.name_id(a);
        let nb = c.name_id(b);
        let q = c.qualified_name_id(Some(na), nb);

        assert_eq!(c.identifier(q), Some(b), "qualified name uses its tail identifier");
        assert!(compare_name(&c, nb, q));

        let op = c.operator_name_id(OperatorKind::Plus);
        assert_eq!(c.identifier(op), None);
        assert!(!compare_name(&c, op, nb));
    }

    #[test]
    fn test_add_names_flattens_qualified() {
        let mut c = Control::new();
        let a = c.intern("A");
        let b = c.intern("B");
        let d = c.intern("C");
        let na = c.name_id(a);
        let nb = c.name_id(b);
        let nc = c.name_id(d);
        let ab = c.qualified_name_id(Some(na), nb);
        let abc = c.qualified_name_id(Some(ab), nc);

        let mut names = NamePath::new();
        add_names(&c, Some(abc), &mut names, false);
        assert_eq!(names.as_slice(), &[na, nb, nc]);
    }

    #[test]
    fn test_template_name_compares_by_identifier() {
        let mut c = Control::new();
        let list = c.intern("List");
        let plain = c.name_id(list);
        let int_ty = c.int_type;
        let templ = c.template_name_id(list, vec![int_ty], false);
        assert!(compare_name(&c, plain, templ));
    }
}
