//! Modifier rules on methods and their containing classes.

use super::{Refactoring, SpanRequirement};
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::members::{insert_modifier, remove_modifier, replace_body_with_semicolon};
use crate::rewrite::RewriteError;
use crate::semantics::SemanticError;
use crate::syntax::ast::{AstNode, MethodDecl, TypeDecl};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use async_trait::async_trait;

fn method_and_type(node: &SyntaxNode) -> Option<(MethodDecl, TypeDecl)> {
    let method = MethodDecl::cast(node.clone())?;
    let ty = method.containing_type()?;
    Some((method, ty))
}

/// No access modifier at all counts as private inside a class.
fn is_private(method: &MethodDecl) -> bool {
    let modifiers = method.modifiers();
    let has = |kind| modifiers.iter().any(|t| t.kind() == kind);
    (has(SyntaxKind::PrivateKeyword) && !has(SyntaxKind::ProtectedKeyword))
        || !modifiers.iter().any(|t| t.kind().is_access_modifier())
}

fn has_any(method: &MethodDecl, kinds: &[SyntaxKind]) -> bool {
    method.modifiers().iter().any(|t| kinds.contains(&t.kind()))
}

/// The method starting at `start` in a rewritten tree. Modifier and body
/// edits never move a declaration's start.
pub(super) fn method_at(tree: &SyntaxTree, start: usize) -> Result<SyntaxNode, RewriteError> {
    tree.root()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::MethodDeclaration && n.span().start() == start)
        .ok_or(RewriteError::Malformed(SyntaxKind::MethodDeclaration, "rewritten method"))
}

fn modifier_action(
    ctx: &RefactoringContext,
    id: RefactoringId,
    title: &str,
    target: &SyntaxNode,
    modifier: SyntaxKind,
) -> CodeAction {
    let solution = ctx.solution.clone();
    let document = ctx.document;
    let target = target.clone();
    CodeAction::immediate(id, title, move || {
        rewrite_document(&solution, document, |tree| {
            insert_modifier(tree, &target, modifier)
        })
    })
}

pub struct MarkMemberAsStatic;

#[async_trait]
impl Refactoring for MarkMemberAsStatic {
    fn id(&self) -> RefactoringId {
        RefactoringId::MarkMemberAsStatic
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::FullyContains
    }

    /// A method missing `static` in a static class, which does not compile
    /// as written.
    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some((method, ty)) = method_and_type(node) else {
            return false;
        };
        ty.is_class()
            && ty.has_modifier(SyntaxKind::StaticKeyword)
            && !method.has_modifier(SyntaxKind::StaticKeyword)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        Ok(Some(modifier_action(
            ctx,
            self.id(),
            "Mark method as static",
            node,
            SyntaxKind::StaticKeyword,
        )))
    }
}

pub struct MarkContainingClassAsAbstract;

#[async_trait]
impl Refactoring for MarkContainingClassAsAbstract {
    fn id(&self) -> RefactoringId {
        RefactoringId::MarkContainingClassAsAbstract
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some((method, ty)) = method_and_type(node) else {
            return false;
        };
        method.has_modifier(SyntaxKind::AbstractKeyword)
            && ty.is_class()
            && !ty.has_modifier(SyntaxKind::AbstractKeyword)
            && !ty.has_modifier(SyntaxKind::StaticKeyword)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let Some((_, ty)) = method_and_type(node) else {
            return Ok(None);
        };
        Ok(Some(modifier_action(
            ctx,
            self.id(),
            "Mark containing class as abstract",
            ty.syntax(),
            SyntaxKind::AbstractKeyword,
        )))
    }
}

pub struct MakeMemberAbstract;

#[async_trait]
impl Refactoring for MakeMemberAbstract {
    fn id(&self) -> RefactoringId {
        RefactoringId::MakeMemberAbstract
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some((method, ty)) = method_and_type(node) else {
            return false;
        };
        let sealed_override = method.has_modifier(SyntaxKind::SealedKeyword)
            && method.has_modifier(SyntaxKind::OverrideKeyword);
        let excluded = [
            SyntaxKind::StaticKeyword,
            SyntaxKind::AbstractKeyword,
            SyntaxKind::ExternKeyword,
            SyntaxKind::PartialKeyword,
        ];
        method.has_body()
            && ty.is_class()
            && ty.has_modifier(SyntaxKind::AbstractKeyword)
            && !has_any(&method, &excluded)
            && !is_private(&method)
            && !sealed_override
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let solution = ctx.solution.clone();
        let document = ctx.document;
        let node = node.clone();
        Ok(Some(CodeAction::immediate(self.id(), "Make method abstract", move || {
            rewrite_document(&solution, document, |tree| {
                let start = node.span().start();
                let mut tree = replace_body_with_semicolon(tree, &node)?;
                if MethodDecl::cast(node.clone())
                    .is_some_and(|m| m.has_modifier(SyntaxKind::VirtualKeyword))
                {
                    let method = method_at(&tree, start)?;
                    tree = remove_modifier(&tree, &method, SyntaxKind::VirtualKeyword)?;
                }
                let method = method_at(&tree, start)?;
                insert_modifier(&tree, &method, SyntaxKind::AbstractKeyword)
            })
        })))
    }
}

pub struct MakeMemberVirtual;

#[async_trait]
impl Refactoring for MakeMemberVirtual {
    fn id(&self) -> RefactoringId {
        RefactoringId::MakeMemberVirtual
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some((method, ty)) = method_and_type(node) else {
            return false;
        };
        let excluded = [
            SyntaxKind::StaticKeyword,
            SyntaxKind::VirtualKeyword,
            SyntaxKind::AbstractKeyword,
            SyntaxKind::OverrideKeyword,
            SyntaxKind::SealedKeyword,
            SyntaxKind::ExternKeyword,
            SyntaxKind::PartialKeyword,
        ];
        method.has_body()
            && ty.is_class()
            && !ty.has_modifier(SyntaxKind::SealedKeyword)
            && !ty.has_modifier(SyntaxKind::StaticKeyword)
            && !has_any(&method, &excluded)
            && !is_private(&method)
            && method.explicit_interface().is_none()
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        Ok(Some(modifier_action(
            ctx,
            self.id(),
            "Make method virtual",
            node,
            SyntaxKind::VirtualKeyword,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::apply;
    use super::*;

    #[tokio::test]
    async fn static_added_inside_static_class() {
        let (title, text) = apply(
            "public static class MathHelpers\n{\n    public int Tw|ice(int x) { return x * 2; }\n}\n",
            &MarkMemberAsStatic,
        )
        .await
        .unwrap();
        assert_eq!(title, "Mark method as static");
        assert_eq!(
            text,
            "public static class MathHelpers\n{\n    public static int Twice(int x) { return x * 2; }\n}\n"
        );
    }

    #[tokio::test]
    async fn static_withheld_outside_static_class() {
        let src = "class Counter\n{\n    private int count;\n    public int Current() { return co|unt; }\n}\n";
        assert!(apply(src, &MarkMemberAsStatic).await.is_none());
        let src = "class C\n{\n    public int Tw|ice(int x) { return x * 2; }\n}\n";
        assert!(apply(src, &MarkMemberAsStatic).await.is_none());
        let src = "static class C\n{\n    public static int Ge|t() { return 1; }\n}\n";
        assert!(apply(src, &MarkMemberAsStatic).await.is_none());
    }

    #[tokio::test]
    async fn containing_class_made_abstract() {
        let (title, text) = apply(
            "public class Shape\n{\n    public abstract double Ar|ea();\n}\n",
            &MarkContainingClassAsAbstract,
        )
        .await
        .unwrap();
        assert_eq!(title, "Mark containing class as abstract");
        assert_eq!(
            text,
            "public abstract class Shape\n{\n    public abstract double Area();\n}\n"
        );
    }

    #[tokio::test]
    async fn abstract_replaces_body_and_virtual() {
        let (title, text) = apply(
            "public abstract class Shape\n{\n    public virtual double Ar|ea()\n    {\n        return 0;\n    }\n}\n",
            &MakeMemberAbstract,
        )
        .await
        .unwrap();
        assert_eq!(title, "Make method abstract");
        assert_eq!(
            text,
            "public abstract class Shape\n{\n    public abstract double Area();\n}\n"
        );
    }

    #[tokio::test]
    async fn abstract_requires_abstract_class_and_visibility() {
        let src = "public class Shape\n{\n    public double Ar|ea() { return 0; }\n}\n";
        assert!(apply(src, &MakeMemberAbstract).await.is_none());
        let src = "public abstract class Shape\n{\n    double Ar|ea() { return 0; }\n}\n";
        assert!(apply(src, &MakeMemberAbstract).await.is_none());
    }

    #[tokio::test]
    async fn virtual_added_after_access_modifier() {
        let (title, text) = apply(
            "public class Shape\n{\n    [Pure]\n    public double Ar|ea() => 0;\n}\n",
            &MakeMemberVirtual,
        )
        .await
        .unwrap();
        assert_eq!(title, "Make method virtual");
        assert_eq!(
            text,
            "public class Shape\n{\n    [Pure]\n    public virtual double Area() => 0;\n}\n"
        );
    }

    #[tokio::test]
    async fn virtual_withheld_in_sealed_class() {
        let src = "public sealed class Shape\n{\n    public double Ar|ea() => 0;\n}\n";
        assert!(apply(src, &MakeMemberVirtual).await.is_none());
        let src = "public class Shape\n{\n    public double Area() { re|turn 0; }\n}\n";
        assert!(apply(src, &MakeMemberVirtual).await.is_none());
    }
}
