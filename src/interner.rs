//! Identifier interning.
//!
//! Every identifier that enters the engine is interned into an [`Atom`], a
//! copyable `u32` handle. Two atoms compare equal iff they were interned from
//! the same byte string, so identifier comparison anywhere in the crate is an
//! integer compare.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Interned identifier handle.
///
/// `Atom::NONE` is reserved for the empty string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// String interner backing [`Atom`] handles.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<String>,
    map: FxHashMap<String, Atom>,
}

impl Interner {
    pub fn new() -> Self {
        Interner::default()
    }

    /// Intern a string, returning its atom. The empty string interns to
    /// `Atom::NONE`.
    pub fn intern(&mut self, text: &str) -> Atom {
        if text.is_empty() {
            return Atom::NONE;
        }
        if let Some(&atom) = self.map.get(text) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.map.insert(text.to_string(), atom);
        atom
    }

    /// Resolve an atom back to its string. `Atom::NONE` resolves to `""`.
    pub fn resolve(&self, atom: Atom) -> &str {
        if atom.is_none() {
            return "";
        }
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_basic() {
        let mut interner = Interner::new();
        let a1 = interner.intern("vector");
        let a2 = interner.intern("vector");
        let a3 = interner.intern("string");

        assert_eq!(a1, a2, "same string should return same atom");
        assert_ne!(a1, a3, "different strings should return different atoms");
        assert_eq!(interner.resolve(a1), "vector");
        assert_eq!(interner.resolve(a3), "string");
    }

    #[test]
    fn test_empty_string() {
        let mut interner = Interner::new();
        let empty = interner.intern("");
        assert_eq!(empty, Atom::NONE);
        assert!(empty.is_none());
        assert_eq!(interner.resolve(empty), "");
    }

    #[test]
    fn test_atom_copy() {
        let mut interner = Interner::new();
        let a1 = interner.intern("T");
        let a2 = a1;
        assert_eq!(a1, a2);
    }
}
