use super::{Refactoring, SpanRequirement};
use crate::refactor::body::returns_no_value;
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::members::replace_type;
use crate::semantics::{SemanticError, TypeSymbol, WellKnownType};
use crate::syntax::ast::{is_void_type, AstNode, MethodDecl};
use crate::syntax::{SyntaxKind, SyntaxNode};
use async_trait::async_trait;
use tracing::debug;

pub struct ChangeMethodReturnTypeToVoid;

fn is_definition_of(ctx: &RefactoringContext, ty: &TypeSymbol, which: WellKnownType) -> bool {
    ctx.semantics
        .well_known_type(which)
        .is_some_and(|known| known.same_definition(ty))
}

/// Node to replace for `Task<T>`: the generic segment of a possibly
/// qualified name, so `System.Threading.Tasks.Task<int>` keeps its
/// qualifier.
fn generic_segment(type_syntax: &SyntaxNode) -> Option<SyntaxNode> {
    match type_syntax.kind() {
        SyntaxKind::GenericName => Some(type_syntax.clone()),
        SyntaxKind::QualifiedName => type_syntax
            .children()
            .last()
            .filter(|n| n.kind() == SyntaxKind::GenericName),
        _ => None,
    }
}

#[async_trait]
impl Refactoring for ChangeMethodReturnTypeToVoid {
    fn id(&self) -> RefactoringId {
        RefactoringId::ChangeMethodReturnTypeToVoid
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::FullyContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return false;
        };
        let excluded = method.modifiers().iter().any(|t| {
            matches!(
                t.kind(),
                SyntaxKind::AbstractKeyword | SyntaxKind::OverrideKeyword | SyntaxKind::PartialKeyword
            )
        });
        !excluded
            && method.return_type().is_some_and(|t| !is_void_type(&t))
            && method.body().is_some_and(|block| returns_no_value(&block))
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return Ok(None);
        };
        let Some(type_syntax) = method.return_type() else {
            return Ok(None);
        };
        let Some(ty) = ctx
            .semantics
            .type_symbol(ctx.document, &type_syntax, &ctx.cancel)
            .await?
        else {
            debug!(rule = %self.id(), "return type does not resolve");
            return Ok(None);
        };
        if ty.is_void() {
            return Ok(None);
        }

        let (target, new_type) = if method.is_async() {
            let wrapper = ty.constructed_from().and_then(|definition| {
                if is_definition_of(ctx, &definition, WellKnownType::TaskOfT) {
                    Some("Task")
                } else if is_definition_of(ctx, &definition, WellKnownType::ValueTaskOfT) {
                    Some("ValueTask")
                } else {
                    None
                }
            });
            // An async method already returning a plain task has nothing to drop.
            match (wrapper, generic_segment(&type_syntax)) {
                (Some(name), Some(segment)) => (segment, name),
                _ => return Ok(None),
            }
        } else {
            (type_syntax, "void")
        };

        let solution = ctx.solution.clone();
        let document = ctx.document;
        Ok(Some(CodeAction::immediate(
            self.id(),
            format!("Change return type to '{new_type}'"),
            move || {
                rewrite_document(&solution, document, |tree| {
                    replace_type(tree, &target, new_type)
                })
            },
        )))
    }
}
