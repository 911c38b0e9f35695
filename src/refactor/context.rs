use super::errors::ActionError;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::rewrite::RewriteError;
use crate::semantics::SemanticModel;
use crate::solution::{Document, DocumentId, Solution};
use crate::syntax::SyntaxTree;
use crate::text::TextSpan;
use std::sync::Arc;

/// Everything a refactoring sees while computing its actions.
#[derive(Clone)]
pub struct RefactoringContext {
    pub solution: Solution,
    pub document: DocumentId,
    pub selection: TextSpan,
    pub config: Arc<Config>,
    pub semantics: Arc<dyn SemanticModel>,
    pub cancel: CancellationToken,
}

impl RefactoringContext {
    pub fn new(
        solution: Solution,
        document: DocumentId,
        selection: TextSpan,
        semantics: Arc<dyn SemanticModel>,
    ) -> Self {
        Self {
            solution,
            document,
            selection,
            config: Arc::new(Config::default()),
            semantics,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn current_document(&self) -> Option<&Arc<Document>> {
        self.solution.document(self.document)
    }

    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.current_document().map(|doc| doc.tree())
    }
}

/// Apply a single-document rewrite to `solution`, leaving every other
/// document shared.
pub fn rewrite_document<F>(
    solution: &Solution,
    document: DocumentId,
    rewrite: F,
) -> Result<Solution, ActionError>
where
    F: FnOnce(&SyntaxTree) -> Result<SyntaxTree, RewriteError>,
{
    let current = solution
        .document(document)
        .ok_or(ActionError::UnknownDocument(document))?;
    let tree = rewrite(current.tree())?;
    solution
        .with_document_tree(document, tree)
        .map_err(|e| ActionError::UnknownDocument(e.0))
}
