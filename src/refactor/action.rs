//! Deferred code actions.

use super::errors::ActionError;
use super::ids::RefactoringId;
use crate::cancel::{self, CancellationToken};
use crate::solution::Solution;
use futures_util::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type ActionFuture = BoxFuture<'static, Result<Solution, ActionError>>;

type Executor = dyn Fn(CancellationToken) -> ActionFuture + Send + Sync;

/// A titled rewrite that has not run yet.
///
/// The executor captures the immutable input solution, so invoking an
/// action any number of times always starts from the same state, and
/// invoking one action never affects another.
#[derive(Clone)]
pub struct CodeAction {
    id: RefactoringId,
    title: String,
    executor: Arc<Executor>,
}

impl CodeAction {
    pub fn new<F, Fut>(id: RefactoringId, title: impl Into<String>, executor: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Solution, ActionError>> + Send + 'static,
    {
        Self {
            id,
            title: title.into(),
            executor: Arc::new(move |cancel| executor(cancel).boxed()),
        }
    }

    /// Action whose rewrite needs no further awaiting.
    pub fn immediate<F>(id: RefactoringId, title: impl Into<String>, rewrite: F) -> Self
    where
        F: Fn() -> Result<Solution, ActionError> + Send + Sync + 'static,
    {
        let rewrite = Arc::new(rewrite);
        Self::new(id, title, move |_cancel| {
            let rewrite = Arc::clone(&rewrite);
            async move { rewrite() }
        })
    }

    pub fn id(&self) -> RefactoringId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Run the rewrite. A token cancelled before or during the run yields
    /// [`ActionError::Cancelled`].
    pub async fn invoke(&self, cancel: CancellationToken) -> Result<Solution, ActionError> {
        cancel::check(&cancel)?;
        let solution = (self.executor)(cancel.clone()).await?;
        cancel::check(&cancel)?;
        Ok(solution)
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invoke_checks_cancellation_first() {
        let mut solution = Solution::new();
        solution.add_document("A.cs", "class A { }");
        let action = CodeAction::immediate(RefactoringId::MarkMemberAsStatic, "t", move || {
            Ok(solution.clone())
        });
        let cancel = CancellationToken::new();
        assert!(action.invoke(cancel.clone()).await.is_ok());
        cancel.cancel();
        assert_eq!(
            action.invoke(cancel).await.unwrap_err(),
            ActionError::Cancelled
        );
    }

    #[test]
    fn debug_shows_id_and_title() {
        let action = CodeAction::immediate(RefactoringId::MakeMemberVirtual, "Make method virtual", || {
            Ok(Solution::new())
        });
        let debug = format!("{action:?}");
        assert!(debug.contains("MakeMemberVirtual"));
        assert!(debug.contains("Make method virtual"));
    }
}
