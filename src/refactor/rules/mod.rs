//! The refactoring rules, one type per rule.

mod documentation;
mod expression_body;
mod members;
mod namespace;
mod property;
mod rename;
mod return_type;

pub use documentation::CopyDocumentationCommentFromBaseMember;
pub use expression_body::UseExpressionBodiedMember;
pub use members::{
    MakeMemberAbstract, MakeMemberVirtual, MarkContainingClassAsAbstract, MarkMemberAsStatic,
};
pub use namespace::{ChangeNamespaceToBlockScoped, ChangeNamespaceToFileScoped};
pub use property::ReplaceMethodWithProperty;
pub use rename::RenameMethodAccordingToTypeName;
pub use return_type::ChangeMethodReturnTypeToVoid;

use super::action::CodeAction;
use super::context::RefactoringContext;
use super::ids::RefactoringId;
use crate::matching;
use crate::semantics::SemanticError;
use crate::syntax::{SyntaxKind, SyntaxNode};
use crate::text::TextSpan;
use async_trait::async_trait;

/// Span relation a rule needs between the selection and its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRequirement {
    FullyContains,
    HeaderContains,
    BodyContains,
    /// Empty selection on or next to the declaration's name.
    EmptyOnName,
}

impl SpanRequirement {
    pub fn holds(self, node: &SyntaxNode, selection: TextSpan) -> bool {
        match self {
            SpanRequirement::FullyContains => matching::fully_contains(node, selection),
            SpanRequirement::HeaderContains => matching::header_contains(node, selection),
            SpanRequirement::BodyContains => matching::body_contains(node, selection),
            SpanRequirement::EmptyOnName => matching::empty_between(node, selection).is_some(),
        }
    }
}

/// Which of the candidate nodes of an accepted kind a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AncestorPolicy {
    /// Only the innermost node of an accepted kind.
    #[default]
    Nearest,
    /// Every enclosing node of an accepted kind.
    Any,
}

#[async_trait]
pub trait Refactoring: Send + Sync {
    fn id(&self) -> RefactoringId;

    /// Node kinds the rule applies to.
    fn accepts(&self, kind: SyntaxKind) -> bool;

    fn requirement(&self) -> SpanRequirement;

    fn ancestor_policy(&self) -> AncestorPolicy {
        AncestorPolicy::Nearest
    }

    /// Structural precondition, checked after the span requirement.
    fn matches(&self, ctx: &RefactoringContext, node: &SyntaxNode) -> bool;

    /// Build the action, running any semantic checks. `Ok(None)` withholds
    /// the action.
    async fn build(
        &self,
        ctx: &RefactoringContext,
        node: &SyntaxNode,
    ) -> Result<Option<CodeAction>, SemanticError>;
}

/// The rules in registration order.
pub fn standard_rules() -> Vec<Box<dyn Refactoring>> {
    vec![
        Box::new(ChangeNamespaceToFileScoped),
        Box::new(ChangeNamespaceToBlockScoped),
        Box::new(MarkMemberAsStatic),
        Box::new(ChangeMethodReturnTypeToVoid),
        Box::new(MarkContainingClassAsAbstract),
        Box::new(ReplaceMethodWithProperty),
        Box::new(UseExpressionBodiedMember),
        Box::new(MakeMemberAbstract),
        Box::new(MakeMemberVirtual),
        Box::new(CopyDocumentationCommentFromBaseMember),
        Box::new(RenameMethodAccordingToTypeName),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::semantics::WorkspaceModel;
    use crate::solution::Solution;
    use std::sync::Arc;

    /// Context for `src` with the selection at the first `|` marker, or
    /// between the two markers of `[|...|]`.
    pub fn context(src: &str) -> RefactoringContext {
        let (text, selection) = strip_markers(src);
        let mut solution = Solution::new();
        let document = solution.add_document("Test.cs", &text);
        let semantics = WorkspaceModel::shared(solution.clone());
        RefactoringContext::new(solution, document, selection, semantics)
    }

    pub fn strip_markers(src: &str) -> (String, TextSpan) {
        if let (Some(start), Some(end)) = (src.find("[|"), src.find("|]")) {
            let text = format!("{}{}{}", &src[..start], &src[start + 2..end], &src[end + 2..]);
            return (text, TextSpan::new(start, end - 2));
        }
        let caret = src.find('|').unwrap_or(0);
        let text = src.replacen('|', "", 1);
        (text, TextSpan::empty(caret))
    }

    /// The innermost node the rule accepts, if the selection satisfies the
    /// rule's span requirement on it.
    pub fn candidate(ctx: &RefactoringContext, rule: &dyn Refactoring) -> Option<SyntaxNode> {
        ctx.tree()?
            .nodes_at(ctx.selection)
            .into_iter()
            .find(|n| rule.accepts(n.kind()))
            .filter(|n| rule.requirement().holds(n, ctx.selection))
    }

    /// Run the rule against the selection and return the rewritten text of
    /// the document, or `None` when no action is offered.
    pub async fn apply(src: &str, rule: &dyn Refactoring) -> Option<(String, String)> {
        let ctx = context(src);
        let node = candidate(&ctx, rule)?;
        if !rule.matches(&ctx, &node) {
            return None;
        }
        let action = rule.build(&ctx, &node).await.unwrap()?;
        let title = action.title().to_string();
        let solution = action
            .invoke(crate::cancel::CancellationToken::new())
            .await
            .unwrap();
        let text = solution.document(ctx.document).unwrap().text().to_string();
        Some((title, text))
    }
}
