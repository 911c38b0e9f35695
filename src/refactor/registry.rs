use super::action::CodeAction;
use super::context::RefactoringContext;
use super::rules::{standard_rules, AncestorPolicy, Refactoring};
use crate::cancel::{self, Cancelled};
use crate::semantics::SemanticError;
use tracing::{debug, warn};

/// Ordered set of refactorings consulted for a selection.
pub struct Registry {
    rules: Vec<Box<dyn Refactoring>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(standard_rules())
    }
}

impl Registry {
    pub fn new(rules: Vec<Box<dyn Refactoring>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Refactoring> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    /// Every applicable action for the context's selection, in rule order.
    ///
    /// A rule whose semantic checks fail is skipped; cancellation aborts
    /// the whole collection.
    pub async fn collect_actions(
        &self,
        ctx: &RefactoringContext,
    ) -> Result<Vec<CodeAction>, Cancelled> {
        cancel::check(&ctx.cancel)?;
        let Some(tree) = ctx.tree() else {
            warn!(document = %ctx.document, "document is not part of the solution");
            return Ok(Vec::new());
        };
        let chain = tree.nodes_at(ctx.selection);

        let mut actions = Vec::new();
        for rule in &self.rules {
            cancel::check(&ctx.cancel)?;
            let id = rule.id();
            if !ctx.config.is_refactoring_enabled(id) {
                debug!(rule = %id, "disabled by configuration");
                continue;
            }

            let accepted = chain.iter().filter(|node| rule.accepts(node.kind()));
            let candidates: Vec<_> = match rule.ancestor_policy() {
                AncestorPolicy::Nearest => accepted.take(1).collect(),
                AncestorPolicy::Any => accepted.collect(),
            };

            for node in candidates {
                if !rule.requirement().holds(node, ctx.selection) || !rule.matches(ctx, node) {
                    continue;
                }
                match rule.build(ctx, node).await {
                    Ok(Some(action)) => actions.push(action),
                    Ok(None) => debug!(rule = %id, "withheld"),
                    Err(SemanticError::Cancelled) => return Err(Cancelled),
                    Err(error) => warn!(rule = %id, %error, "semantic check failed"),
                }
            }
        }
        debug!(count = actions.len(), selection = %ctx.selection, "collected actions");
        Ok(actions)
    }
}

/// Collect actions with the standard rule set.
pub async fn collect_actions(ctx: &RefactoringContext) -> Result<Vec<CodeAction>, Cancelled> {
    Registry::default().collect_actions(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::config::Config;
    use crate::refactor::rules::test_support::context;
    use crate::refactor::RefactoringId;
    use std::sync::Arc;

    fn ids(actions: &[CodeAction]) -> Vec<RefactoringId> {
        actions.iter().map(CodeAction::id).collect()
    }

    const SHAPE: &str = "namespace App\n{\n    public class Shape\n    {\n        public int Ar|ea() { return 0; }\n    }\n}\n";

    /// Standard configuration with the opt-in property replacement on.
    fn all_enabled() -> Arc<Config> {
        Arc::new(Config::default().with_refactoring(RefactoringId::ReplaceMethodWithProperty, true))
    }

    #[tokio::test]
    async fn overlapping_rules_all_offer_actions_in_order() {
        let ctx = context(SHAPE).with_config(all_enabled());
        let actions = collect_actions(&ctx).await.unwrap();
        assert_eq!(
            ids(&actions),
            vec![
                RefactoringId::ReplaceMethodWithProperty,
                RefactoringId::MakeMemberVirtual,
                RefactoringId::RenameMethodAccordingToTypeName,
            ]
        );
    }

    #[tokio::test]
    async fn disabled_rules_are_skipped() {
        let ctx = context(SHAPE);
        let actions = collect_actions(&ctx).await.unwrap();
        assert_eq!(
            ids(&actions),
            vec![
                RefactoringId::MakeMemberVirtual,
                RefactoringId::RenameMethodAccordingToTypeName,
            ]
        );

        let config = Config::default()
            .with_refactoring(RefactoringId::MakeMemberVirtual, false)
            .with_refactoring(RefactoringId::RenameMethodAccordingToTypeName, false);
        let ctx = context(SHAPE).with_config(Arc::new(config));
        assert!(collect_actions(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn nothing_applicable_is_an_empty_list() {
        let ctx = context("// only a comment|\n");
        assert!(collect_actions(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancellation_aborts_collection() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = context(SHAPE).with_cancellation(cancel);
        assert_eq!(collect_actions(&ctx).await.unwrap_err(), Cancelled);
    }

    #[tokio::test]
    async fn actions_start_from_the_same_solution() {
        let ctx = context(SHAPE).with_config(all_enabled());
        let actions = collect_actions(&ctx).await.unwrap();
        let cancel = CancellationToken::new();
        let first = actions[0].invoke(cancel.clone()).await.unwrap();
        let second = actions[1].invoke(cancel).await.unwrap();
        let first_text = first.document(ctx.document).unwrap().text().to_string();
        let second_text = second.document(ctx.document).unwrap().text().to_string();
        assert!(first_text.contains("public int Area { get { return 0; } }"));
        assert!(second_text.contains("public virtual int Area()"));
        assert!(!second_text.contains("get"));
        assert!(ctx
            .current_document()
            .unwrap()
            .text()
            .contains("public int Area()"));
    }
}
