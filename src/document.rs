//! Translation units and snapshots.
//!
//! A `Document` is one parsed translation unit: its file name, its global
//! namespace symbol and the ordered list of files it includes. A `Snapshot`
//! is the set of documents known to the IDE at query time.

use rustc_hash::FxHashMap;

use crate::interner::Atom;
use crate::symbol::SymbolId;

/// One parsed translation unit.
#[derive(Clone, Debug)]
pub struct Document {
    pub file_name: Atom,
    pub global_namespace: SymbolId,
    /// Included file names, in textual order.
    pub includes: Vec<Atom>,
}

impl Document {
    pub fn new(file_name: Atom, global_namespace: SymbolId) -> Self {
        Document {
            file_name,
            global_namespace,
            includes: Vec::new(),
        }
    }

    pub fn add_include(&mut self, file_name: Atom) {
        self.includes.push(file_name);
    }
}

/// All translation units known to the IDE, keyed by file name.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    documents: FxHashMap<Atom, Document>,
}

impl Snapshot {
    pub fn new() -> Self {
        Snapshot::default()
    }

    pub fn insert(&mut self, document: Document) {
        self.documents.insert(document.file_name, document);
    }

    pub fn document(&self, file_name: Atom) -> Option<&Document> {
        self.documents.get(&file_name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
