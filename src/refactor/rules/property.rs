use super::members::method_at;
use super::{Refactoring, SpanRequirement};
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::members::has_significant;
use crate::rewrite::property::{method_to_property, remove_empty_argument_lists};
use crate::semantics::SemanticError;
use crate::syntax::ast::{AstNode, MethodDecl};
use crate::syntax::{SyntaxKind, SyntaxNode};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct ReplaceMethodWithProperty;

/// Comments inside `()` or between the name and the body would have
/// nowhere to go.
fn would_lose_trivia(method: &MethodDecl) -> bool {
    let Some(list) = method.parameter_list() else {
        return true;
    };
    let tokens = list.tokens();
    let inside = tokens.iter().enumerate().any(|(i, token)| {
        has_significant(token.leading())
            || (i + 1 < tokens.len() && has_significant(token.trailing()))
    });
    let after_name = method
        .identifier()
        .is_some_and(|t| has_significant(t.trailing()));
    let before_block = method
        .body()
        .and_then(|b| b.first_token())
        .is_some_and(|t| has_significant(t.leading()));
    inside || after_name || before_block
}

#[async_trait]
impl Refactoring for ReplaceMethodWithProperty {
    fn id(&self) -> RefactoringId {
        RefactoringId::ReplaceMethodWithProperty
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    /// A non-generic, parameterless method that returns a value.
    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return false;
        };
        method.return_type().is_some()
            && !method.returns_void()
            && method.parameter_count() == Some(0)
            && method.type_parameter_list().is_none()
            && method.explicit_interface().is_none()
            && !method.is_async()
            && !method.has_modifier(SyntaxKind::PartialKeyword)
            && !would_lose_trivia(&method)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let semantics = Arc::clone(&ctx.semantics);
        let Some(symbol) = semantics
            .declared_symbol(ctx.document, node, &ctx.cancel)
            .await?
        else {
            return Ok(None);
        };
        let references = match semantics.find_references(&symbol, &ctx.cancel).await {
            Ok(references) => references,
            Err(SemanticError::AmbiguousReferences { count, .. }) => {
                debug!(method = %symbol.name, overloads = count, "property replacement withheld");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let solution = ctx.solution.clone();
        let document = ctx.document;
        let start = node.span().start();
        let title = format!("Replace '{}' with property", symbol.name);
        Ok(Some(CodeAction::immediate(self.id(), title, move || {
            let (updated, calls) = remove_empty_argument_lists(&solution, &references)?;
            // Each call before the declaration lost its two parentheses.
            let shift = 2 * calls
                .iter()
                .filter(|l| l.document == document && l.span.start() < start)
                .count();
            debug!(method = %symbol.name, calls = calls.len(), "method replaced with property");
            rewrite_document(&updated, document, |tree| {
                let method = method_at(tree, start - shift)?;
                method_to_property(tree, &method)
            })
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::apply;
    use super::*;

    #[tokio::test]
    async fn method_and_calls_become_property_access() {
        // A caret on a call site is not in the declaration's header.
        let src = "class Rect\n{\n    int Half() => Ar|ea() / 2;\n    public int Area() { return w * h; }\n}\n";
        assert!(apply(src, &ReplaceMethodWithProperty).await.is_none());

        let (title, text) = apply(
            "class Rect\n{\n    int Half() => Area() / 2;\n    public int Ar|ea() { return w * h; }\n}\n",
            &ReplaceMethodWithProperty,
        )
        .await
        .unwrap();
        assert_eq!(title, "Replace 'Area' with property");
        assert_eq!(
            text,
            "class Rect\n{\n    int Half() => Area / 2;\n    public int Area { get { return w * h; } }\n}\n"
        );
    }

    #[tokio::test]
    async fn withheld_for_parameters_void_generic_and_async() {
        for src in [
            "class C\n{\n    int Sc|ale(int x) => x;\n}\n",
            "class C\n{\n    void Ru|n() { }\n}\n",
            "class C\n{\n    T Ma|ke<T>() => default;\n}\n",
            "using System.Threading.Tasks;\nclass C\n{\n    async Task<int> Lo|ad() { return 1; }\n}\n",
            "class C\n{\n    int Ar|ea(/* none */) => 1;\n}\n",
        ] {
            assert!(apply(src, &ReplaceMethodWithProperty).await.is_none(), "{src}");
        }
    }

    #[tokio::test]
    async fn withheld_for_overloads() {
        let src = "class C\n{\n    int Ar|ea() => 1;\n    int Area(int scale) => scale;\n}\n";
        assert!(apply(src, &ReplaceMethodWithProperty).await.is_none());
    }
}
