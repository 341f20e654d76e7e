//! The type model.
//!
//! Types live behind [`TypeId`] handles in the control's type table, with
//! structural interning like names. [`FullType`] pairs a type with its
//! cv-qualification; an invalid `FullType` is the absent-type sentinel used
//! throughout the lookup engine.

use serde::Serialize;

use crate::name::NameId;
use crate::symbol::SymbolId;

/// Interned type handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NONE: TypeId = TypeId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// A type plus cv-qualification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FullType {
    pub ty: TypeId,
    pub is_const: bool,
    pub is_volatile: bool,
}

impl FullType {
    pub fn new(ty: TypeId) -> Self {
        FullType {
            ty,
            is_const: false,
            is_volatile: false,
        }
    }

    pub fn invalid() -> Self {
        FullType::new(TypeId::NONE)
    }

    pub fn is_valid(&self) -> bool {
        !self.ty.is_none()
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }
}

/// Built-in integer kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntegerKind {
    Bool,
    Char,
    Short,
    Int,
    Long,
    LongLong,
}

/// The type variants the lookup engine distinguishes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Integer(IntegerKind),
    /// A use of a (possibly not yet resolved) type name.
    Named(NameId),
    Pointer(FullType),
    Reference(FullType),
    /// The type introduced by a class definition.
    Class(SymbolId),
    /// The type introduced by an enum definition.
    Enum(SymbolId),
    /// A function type, carrying its symbol for signature access.
    Function(SymbolId),
}

impl TypeKind {
    pub fn as_named(&self) -> Option<NameId> {
        match self {
            TypeKind::Named(name) => Some(*name),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<SymbolId> {
        match self {
            TypeKind::Class(symbol) => Some(*symbol),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeKind::Pointer(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, TypeKind::Reference(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeKind::Function(_))
    }

    /// Element type of a pointer or reference.
    pub fn element_type(&self) -> Option<FullType> {
        match self {
            TypeKind::Pointer(e) | TypeKind::Reference(e) => Some(*e),
            _ => None,
        }
    }
}
