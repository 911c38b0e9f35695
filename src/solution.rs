//! Immutable set of parsed documents.
//!
//! A [`Solution`] is a persistent map, so producing a solution with one
//! document replaced shares every other document with the original.

use crate::syntax::{parse, SyntaxTree};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u32);

impl DocumentId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: PathBuf,
    tree: SyntaxTree,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("document {0} is not part of the solution")]
pub struct UnknownDocument(pub DocumentId);

#[derive(Debug, Clone, Default)]
pub struct Solution {
    documents: im::OrdMap<DocumentId, Arc<Document>>,
    next_id: u32,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and add it as a new document.
    pub fn add_document(&mut self, path: impl Into<PathBuf>, text: &str) -> DocumentId {
        self.add_tree(path, parse(text).tree)
    }

    pub fn add_tree(&mut self, path: impl Into<PathBuf>, tree: SyntaxTree) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.insert(
            id,
            Arc::new(Document {
                id,
                path: path.into(),
                tree,
            }),
        );
        id
    }

    pub fn document(&self, id: DocumentId) -> Option<&Arc<Document>> {
        self.documents.get(&id)
    }

    pub fn document_by_path(&self, path: &Path) -> Option<&Arc<Document>> {
        self.documents.values().find(|doc| doc.path == path)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// A new solution in which document `id` has `tree`; all other
    /// documents are shared.
    pub fn with_document_tree(
        &self,
        id: DocumentId,
        tree: SyntaxTree,
    ) -> Result<Solution, UnknownDocument> {
        let current = self.documents.get(&id).ok_or(UnknownDocument(id))?;
        let document = Arc::new(Document {
            id,
            path: current.path.clone(),
            tree,
        });
        Ok(Solution {
            documents: self.documents.update(id, document),
            next_id: self.next_id,
        })
    }

    /// Documents whose tree differs from the one in `base`.
    pub fn changed_documents(&self, base: &Solution) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|&(id, doc)| match base.documents.get(id) {
                Some(old) => !Arc::ptr_eq(old, doc),
                None => true,
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// True when both solutions hold the very same document value for `id`.
    pub fn shares_document(&self, other: &Solution, id: DocumentId) -> bool {
        match (self.documents.get(&id), other.documents.get(&id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
