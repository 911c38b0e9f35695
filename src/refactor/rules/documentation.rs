use super::{Refactoring, SpanRequirement};
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::members::insert_documentation;
use crate::semantics::SemanticError;
use crate::syntax::ast::{AstNode, MethodDecl};
use crate::syntax::{SyntaxKind, SyntaxNode, Trivia, TriviaKind};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub struct CopyDocumentationCommentFromBaseMember;

/// `///` lines in front of a declaration.
fn documentation(decl: &SyntaxNode) -> Vec<Trivia> {
    decl.first_token()
        .map(|token| {
            token
                .leading()
                .iter()
                .filter(|t| t.kind() == TriviaKind::DocComment)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Refactoring for CopyDocumentationCommentFromBaseMember {
    fn id(&self) -> RefactoringId {
        RefactoringId::CopyDocumentationCommentFromBaseMember
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::HeaderContains
    }

    /// An undocumented method that may override or implement something.
    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return false;
        };
        let has_bases = method
            .containing_type()
            .is_some_and(|ty| !ty.base_types().is_empty());
        documentation(node).is_empty()
            && has_bases
            && !method.has_modifier(SyntaxKind::StaticKeyword)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let semantics = Arc::clone(&ctx.semantics);
        let bases = semantics
            .base_members(ctx.document, node, &ctx.cancel)
            .await?;
        let Some((base, lines)) = bases
            .iter()
            .map(|base| (base, documentation(base)))
            .find(|(_, lines)| !lines.is_empty())
        else {
            debug!(bases = bases.len(), "no documented base member");
            return Ok(None);
        };
        let implemented = base
            .parent()
            .is_some_and(|ty| ty.kind() == SyntaxKind::InterfaceDeclaration);
        let title = if implemented {
            "Copy documentation comment from implemented member"
        } else {
            "Copy documentation comment from base member"
        };

        let solution = ctx.solution.clone();
        let document = ctx.document;
        let node = node.clone();
        Ok(Some(CodeAction::immediate(self.id(), title, move || {
            rewrite_document(&solution, document, |tree| {
                insert_documentation(tree, &node, &lines)
            })
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::apply;
    use super::*;

    const SHAPES: &str = "interface IShape\n{\n    /// <summary>Surface in square units.</summary>\n    double Area();\n}\n\nabstract class Shape : IShape\n{\n    /// <summary>Area of the shape.</summary>\n    /// <returns>Never negative.</returns>\n    public abstract double Area();\n\n    public abstract double Perimeter();\n}\n";

    #[tokio::test]
    async fn override_gets_the_base_class_comment() {
        let src = format!(
            "{SHAPES}\nclass Square : Shape\n{{\n    [Pure]\n    public override double Ar|ea() => side * side;\n}}\n"
        );
        let (title, text) = apply(&src, &CopyDocumentationCommentFromBaseMember)
            .await
            .unwrap();
        assert_eq!(title, "Copy documentation comment from base member");
        assert!(text.ends_with(
            "class Square : Shape\n{\n    /// <summary>Area of the shape.</summary>\n    /// <returns>Never negative.</returns>\n    [Pure]\n    public override double Area() => side * side;\n}\n"
        ));
    }

    #[tokio::test]
    async fn implementation_gets_the_interface_comment() {
        let src = format!(
            "{SHAPES}\nclass Circle : IShape\n{{\n    public double Ar|ea() => 3.14 * r * r;\n}}\n"
        );
        let (title, text) = apply(&src, &CopyDocumentationCommentFromBaseMember)
            .await
            .unwrap();
        assert_eq!(title, "Copy documentation comment from implemented member");
        assert!(text.contains(
            "{\n    /// <summary>Surface in square units.</summary>\n    public double Area() => 3.14 * r * r;"
        ));
    }

    #[tokio::test]
    async fn withheld_when_documented_or_nothing_to_copy() {
        let documented = format!(
            "{SHAPES}\nclass Square : Shape\n{{\n    /// <summary>Side squared.</summary>\n    public override double Ar|ea() => 1;\n}}\n"
        );
        assert!(apply(&documented, &CopyDocumentationCommentFromBaseMember)
            .await
            .is_none());

        let undocumented_base = format!(
            "{SHAPES}\nclass Square : Shape\n{{\n    public override double Peri|meter() => 4;\n}}\n"
        );
        assert!(apply(&undocumented_base, &CopyDocumentationCommentFromBaseMember)
            .await
            .is_none());

        let no_override = format!(
            "{SHAPES}\nclass Plain : Shape\n{{\n    public double Wi|dth() => 1;\n}}\n"
        );
        assert!(apply(&no_override, &CopyDocumentationCommentFromBaseMember)
            .await
            .is_none());
    }
}
