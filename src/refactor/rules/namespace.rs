use super::{Refactoring, SpanRequirement};
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::namespace::{can_demote, demote_to_flat, promote_to_wrapper};
use crate::semantics::SemanticError;
use crate::syntax::{SyntaxKind, SyntaxNode};
use async_trait::async_trait;

pub struct ChangeNamespaceToFileScoped;

#[async_trait]
impl Refactoring for ChangeNamespaceToFileScoped {
    fn id(&self) -> RefactoringId {
        RefactoringId::ChangeNamespaceToFileScoped
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::NamespaceDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        can_demote(node).is_ok()
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let solution = ctx.solution.clone();
        let document = ctx.document;
        let node = node.clone();
        Ok(Some(CodeAction::immediate(
            self.id(),
            "Change to file scoped namespace",
            move || rewrite_document(&solution, document, |tree| demote_to_flat(tree, &node)),
        )))
    }
}

pub struct ChangeNamespaceToBlockScoped;

#[async_trait]
impl Refactoring for ChangeNamespaceToBlockScoped {
    fn id(&self) -> RefactoringId {
        RefactoringId::ChangeNamespaceToBlockScoped
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::FileScopedNamespaceDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        node.parent().map(|p| p.kind()) == Some(SyntaxKind::CompilationUnit)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let solution = ctx.solution.clone();
        let document = ctx.document;
        let node = node.clone();
        Ok(Some(CodeAction::immediate(
            self.id(),
            "Change to block scoped namespace",
            move || rewrite_document(&solution, document, |tree| promote_to_wrapper(tree, &node)),
        )))
    }
}
