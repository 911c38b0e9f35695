use super::{Refactoring, SpanRequirement};
use crate::refactor::body::{single_statement, SingleStatement};
use crate::refactor::context::rewrite_document;
use crate::refactor::{CodeAction, RefactoringContext, RefactoringId};
use crate::rewrite::members::{has_significant, replace_block_with_expression_body};
use crate::semantics::SemanticError;
use crate::syntax::ast::{simple_name, AstNode, MethodDecl};
use crate::syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use async_trait::async_trait;

pub struct UseExpressionBodiedMember;

/// `void`, or a result-less task on an async method: bodies of these may
/// be a bare expression statement.
fn discards_value(method: &MethodDecl) -> bool {
    if method.returns_void() {
        return true;
    }
    let Some(ty) = method.return_type() else {
        return false;
    };
    method.is_async()
        && matches!(ty.kind(), SyntaxKind::IdentifierName | SyntaxKind::QualifiedName)
        && simple_name(&ty).is_some_and(|name| {
            name.parent().kind() == SyntaxKind::IdentifierName
                && matches!(name.text(), "Task" | "ValueTask")
        })
}

/// True when converting would drop a comment or directive: anything in
/// the block other than the closing brace's trailing trivia, or on the
/// end of the signature line.
fn would_lose_trivia(block: &SyntaxNode) -> bool {
    let tokens = block.tokens();
    let inside = tokens.iter().enumerate().any(|(i, token)| {
        has_significant(token.leading())
            || (i + 1 < tokens.len() && has_significant(token.trailing()))
    });
    let signature_end = block.parent().and_then(|method| {
        method
            .children_with_tokens()
            .into_iter()
            .take(block.index())
            .last()
    });
    let before = signature_end
        .and_then(|element| match element {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.last_token(),
        })
        .is_some_and(|token| has_significant(token.trailing()));
    inside || before
}

#[async_trait]
impl Refactoring for UseExpressionBodiedMember {
    fn id(&self) -> RefactoringId {
        RefactoringId::UseExpressionBodiedMember
    }

    fn accepts(&self, kind: SyntaxKind) -> bool {
        kind == SyntaxKind::MethodDeclaration
    }

    fn requirement(&self) -> SpanRequirement {
        SpanRequirement::BodyContains
    }

    fn matches(&self, _ctx: &RefactoringContext, node: &SyntaxNode) -> bool {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return false;
        };
        let Some(block) = method.body() else {
            return false;
        };
        let statement = single_statement(&block, discards_value(&method));
        let fits = match statement {
            Some(SingleStatement::Return(_)) => !discards_value(&method),
            Some(_) => true,
            None => false,
        };
        fits && !would_lose_trivia(&block)
    }

    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError> {
        let Some(method) = MethodDecl::cast(node.clone()) else {
            return Ok(None);
        };
        let Some(statement) = method
            .body()
            .and_then(|block| single_statement(&block, discards_value(&method)))
        else {
            return Ok(None);
        };
        let expression: Vec<_> = statement
            .tokens()
            .iter()
            .map(|t| t.green().clone())
            .collect();
        let solution = ctx.solution.clone();
        let document = ctx.document;
        let node = node.clone();
        Ok(Some(CodeAction::immediate(
            self.id(),
            "Use expression-bodied member",
            move || {
                rewrite_document(&solution, document, |tree| {
                    replace_block_with_expression_body(tree, &node, expression.clone())
                })
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::apply;
    use super::*;

    #[tokio::test]
    async fn return_becomes_arrow() {
        let (title, text) = apply(
            "class C\n{\n    public int Twice(int x)\n    {\n        return x |* 2;\n    }\n}\n",
            &UseExpressionBodiedMember,
        )
        .await
        .unwrap();
        assert_eq!(title, "Use expression-bodied member");
        assert_eq!(text, "class C\n{\n    public int Twice(int x) => x * 2;\n}\n");
    }

    #[tokio::test]
    async fn void_expression_statement() {
        let (_, text) = apply(
            "class C\n{\n    void Log(string s)\n    {\n        Console.Write|Line(s);\n    }\n}\n",
            &UseExpressionBodiedMember,
        )
        .await
        .unwrap();
        assert_eq!(text, "class C\n{\n    void Log(string s) => Console.WriteLine(s);\n}\n");
    }

    #[tokio::test]
    async fn throw_statement() {
        let (_, text) = apply(
            "class C\n{\n    int Get() { th|row new NotSupportedException(); }\n}\n",
            &UseExpressionBodiedMember,
        )
        .await
        .unwrap();
        assert_eq!(
            text,
            "class C\n{\n    int Get() => throw new NotSupportedException();\n}\n"
        );
    }

    #[tokio::test]
    async fn withheld_when_comments_would_be_lost() {
        let src = "class C\n{\n    int Get()\n    {\n        // answer\n        return |42;\n    }\n}\n";
        assert!(apply(src, &UseExpressionBodiedMember).await.is_none());
    }

    #[tokio::test]
    async fn withheld_for_multiple_statements_or_header_selection() {
        let src = "class C\n{\n    void Run() { A(); |B(); }\n}\n";
        assert!(apply(src, &UseExpressionBodiedMember).await.is_none());
        let src = "class C\n{\n    int G|et() { return 1; }\n}\n";
        assert!(apply(src, &UseExpressionBodiedMember).await.is_none());
    }
}
