use super::{Refactoring, SpanRequirement};
use crate::naming::{derive_name, method_name_for, propose_rename};
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::rename::rename_tokens;
use crate::semantics::SemanticError;
use crate::syntax::ast::{is_void_type, AstNode, MethodDecl};
use crate::syntax::{SyntaxKind, SyntaxNode};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct RenameMethodAccordingToTypeName;

#[async_trait]
impl Refactoring for RenameMethodAccordingToTypeName {
    fn id(&self) -> RefactoringId {
        RefactoringId::RenameMethodAccordingToTypeName
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::EmptyOnName
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        MethodDecl::cast(node.clone())
            .and_then(|m| m.return_type())
            .is_some_and(|ty| !is_void_type(&ty))
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let Some(return_type) = MethodDecl::cast(node.clone()).and_then(|m| m.return_type())
        else {
            return Ok(None);
        };
        let semantics = Arc::clone(&ctx.semantics);
        let Some(symbol) = semantics
            .declared_symbol(ctx.document, node, &ctx.cancel)
            .await?
        else {
            return Ok(None);
        };
        let Some(ty) = semantics
            .type_symbol(ctx.document, &return_type, &ctx.cancel)
            .await?
        else {
            debug!(method = %symbol.name, "return type does not resolve");
            return Ok(None);
        };
        let Some(fragment) = derive_name(&ty, semantics.as_ref()) else {
            return Ok(None);
        };
        let new_name = method_name_for(&symbol, &fragment);
        if !propose_rename(semantics.as_ref(), &symbol, &new_name, &ctx.cancel).await? {
            return Ok(None);
        }

        // Overloads share the name, so their call sites cannot be told apart.
        let references = match semantics.find_references(&symbol, &ctx.cancel).await {
            Ok(references) => references,
            Err(SemanticError::AmbiguousReferences { count, .. }) => {
                debug!(method = %symbol.name, overloads = count, "rename withheld");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let solution = ctx.solution.clone();
        let title = format!("Rename method to '{new_name}'");
        Ok(Some(CodeAction::immediate(self.id(), title, move || {
            let renamed = rename_tokens(&solution, &references, &new_name)?;
            debug!(
                from = %symbol.name,
                to = %new_name,
                locations = references.len(),
                "method renamed"
            );
            Ok(renamed)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::apply;
    use super::*;

    #[tokio::test]
    async fn renames_after_task_result() {
        let (title, text) = apply(
            "using System.Threading.Tasks;\nclass Widget { }\nclass Repo\n{\n    async Task<Widget> |Load() { return null; }\n    void Use() { Load(); }\n}\n",
            &RenameMethodAccordingToTypeName,
        )
        .await
        .unwrap();
        assert_eq!(title, "Rename method to 'GetWidgetAsync'");
        assert!(text.contains("async Task<Widget> GetWidgetAsync()"));
        assert!(text.contains("void Use() { GetWidgetAsync(); }"));
    }

    #[tokio::test]
    async fn caret_after_identifier_counts() {
        let (title, _) = apply(
            "class Repo\n{\n    int Count|() { return 0; }\n}\n",
            &RenameMethodAccordingToTypeName,
        )
        .await
        .unwrap();
        assert_eq!(title, "Rename method to 'GetInt32'");
    }

    #[tokio::test]
    async fn withheld_on_collision_or_same_name() {
        let src = "class Repo\n{\n    int |Count() { return 0; }\n    int GetInt32() { return 1; }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
        let src = "class Repo\n{\n    int |GetInt32() { return 0; }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
    }

    #[tokio::test]
    async fn withheld_for_overloaded_method() {
        let src = "class Repo\n{\n    int |Count() { return 0; }\n    int Count(int x) { return x; }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
    }

    #[tokio::test]
    async fn withheld_for_void_plain_task_and_selection() {
        let src = "class Repo\n{\n    void |Run() { }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
        let src = "using System.Threading.Tasks;\nclass Repo\n{\n    Task |Run() { return null; }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
        let src = "class Repo\n{\n    int [|Count|]() { return 0; }\n}\n";
        assert!(apply(src, &RenameMethodAccordingToTypeName).await.is_none());
    }
}
