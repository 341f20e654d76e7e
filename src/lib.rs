//! C++ name lookup and template instantiation for IDE tooling.
//!
//! Given a parsed translation unit plus the snapshot of units it includes,
//! this crate builds a lazy, memoized graph of class-or-namespace bindings
//! and answers the queries completion, hover and go-to-definition need:
//!
//! - which binding a type name denotes from a given scope,
//! - the candidate declarations an unqualified or qualified name could refer
//!   to,
//! - the canonical qualified path of a declaration, and the minimal
//!   qualification needed to name it from some target scope.
//!
//! # Architecture
//!
//! ```text
//! interner → name / ty → symbol → control → document
//!                                    ↓
//!                         binder (factory + visitor)
//!                                    ↓
//!                         binding (graph + lookup + instantiation)
//!                                    ↓
//!                         context (query façade)
//! ```
//!
//! The engine is total: queries return empty candidate sets or `None`, never
//! errors. All graph traversals that can revisit a node carry a processed
//! set, so cyclic inheritance and self-referential templates terminate.

pub mod binder;
pub mod binding;
pub mod context;
pub mod control;
pub mod document;
pub mod interner;
pub mod name;
pub mod subst;
pub mod symbol;
pub mod ty;

pub use binder::Binder;
pub use binding::{Binding, BindingId, LookupItem};
pub use context::LookupContext;
pub use control::Control;
pub use document::{Document, Snapshot};
pub use interner::Atom;
pub use name::{NameId, NameKind, OperatorKind};
pub use symbol::{SourcePos, SymbolId, SymbolKind};
pub use ty::{FullType, IntegerKind, TypeId, TypeKind};
