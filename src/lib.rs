//! Sharpfix: trivia-preserving C# refactorings and style fixes.
//!
//! Source files are parsed into lossless syntax trees ([`syntax`]). For a
//! selection in a document, the [`refactor`] registry asks each rule
//! whether it applies and collects deferred [`CodeAction`]s; invoking one
//! returns a new [`Solution`] with the rewritten documents. The
//! [`analysis`] module reports namespace style deviations (`SF0001`) and
//! fixes them through the same rewriter.
//!
//! # Architecture
//!
//! - [`matching`] relates selections to declaration headers and bodies
//! - [`naming`] derives method names from return types
//! - [`rewrite`] rebuilds trees, moving comments instead of dropping them
//! - [`semantics`] answers symbol questions behind an async trait
//!
//! Results reach disk as verified span [`Edit`]s, after the rewritten text
//! has been re-parsed with the tree-sitter C# grammar ([`validate`]).
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use sharpfix::refactor::{collect_actions, RefactoringContext};
//! use sharpfix::semantics::WorkspaceModel;
//! use sharpfix::solution::Solution;
//! use sharpfix::text::TextSpan;
//!
//! let mut solution = Solution::new();
//! let document = solution.add_document("App.cs", "namespace App\n{\n}\n");
//! let semantics = WorkspaceModel::shared(solution.clone());
//! let ctx = RefactoringContext::new(solution, document, TextSpan::empty(10), semantics);
//!
//! for action in collect_actions(&ctx).await? {
//!     println!("{}", action.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cancel;
pub mod config;
pub mod edit;
pub mod matching;
pub mod naming;
pub mod pool;
pub mod refactor;
pub mod rewrite;
pub mod safety;
pub mod semantics;
pub mod solution;
pub mod syntax;
pub mod text;
pub mod ts;
pub mod validate;

pub use analysis::{analyze_document, evaluate, fix_deviant, Diagnostic, Evaluation};
pub use cancel::{CancellationToken, Cancelled};
pub use config::{load_from_path, load_from_str, Config, ConfigError};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use refactor::{collect_actions, ActionError, CodeAction, RefactoringContext, RefactoringId};
pub use safety::{SafetyError, WorkspaceGuard};
pub use solution::{Document, DocumentId, Solution};
pub use syntax::{parse, SyntaxTree};
pub use text::TextSpan;
pub use validate::{ParseValidator, ValidationError};
