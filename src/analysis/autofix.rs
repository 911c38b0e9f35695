//! Fixes for reported diagnostics, turned into verified edits.

use super::diagnostic::Diagnostic;
use super::namespace_scope::{analyze_document, fix_deviant};
use crate::cancel::{CancellationToken, Cancelled};
use crate::config::Config;
use crate::edit::Edit;
use crate::syntax::SyntaxTree;
use std::path::Path;
use tracing::debug;

/// Result of attempting to fix a diagnostic.
#[derive(Debug)]
pub enum AutofixResult {
    /// Edits turning the document into the fixed one
    Fixed(Vec<Edit>),
    CannotFix { reason: String },
}

/// A diagnostic that stayed after fixing, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unfixable {
    pub diagnostic: Diagnostic,
    pub reason: String,
}

/// Outcome of fixing every diagnostic of one document.
#[derive(Debug, Clone)]
pub struct DocumentFix {
    pub tree: SyntaxTree,
    pub fixed: Vec<Diagnostic>,
    pub unfixable: Vec<Unfixable>,
}

impl DocumentFix {
    pub fn changed(&self) -> bool {
        !self.fixed.is_empty()
    }
}

/// Attempt to fix one diagnostic of the document at `path`.
#[must_use]
pub fn try_autofix(path: &Path, tree: &SyntaxTree, diagnostic: &Diagnostic) -> AutofixResult {
    match fix_deviant(tree, diagnostic) {
        Ok(fixed) => AutofixResult::Fixed(
            Edit::between(path, tree.text(), fixed.text())
                .into_iter()
                .collect(),
        ),
        Err(error) => AutofixResult::CannotFix {
            reason: error.to_string(),
        },
    }
}

/// Fix diagnostics one at a time, re-analyzing after each fix, until
/// only unfixable ones are left.
pub fn fix_document(
    tree: &SyntaxTree,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<DocumentFix, Cancelled> {
    let mut current = tree.clone();
    let mut fixed = Vec::new();
    loop {
        let mut unfixable = Vec::new();
        let mut progressed = false;
        for diagnostic in analyze_document(&current, config, cancel)? {
            match fix_deviant(&current, &diagnostic) {
                Ok(next) => {
                    current = next;
                    fixed.push(diagnostic);
                    progressed = true;
                    break;
                }
                Err(error) => {
                    debug!(span = %diagnostic.span, %error, "diagnostic not fixable");
                    unfixable.push(Unfixable {
                        diagnostic,
                        reason: error.to_string(),
                    });
                }
            }
        }
        if !progressed {
            return Ok(DocumentFix {
                tree: current,
                fixed,
                unfixable,
            });
        }
    }
}

/// Fix a whole document and express the result as edits against its
/// current text.
pub fn try_autofix_all(
    path: &Path,
    tree: &SyntaxTree,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<(Vec<Edit>, Vec<Unfixable>), Cancelled> {
    let outcome = fix_document(tree, config, cancel)?;
    let edits = Edit::between(path, tree.text(), outcome.tree.text())
        .into_iter()
        .collect();
    Ok((edits, outcome.unfixable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::namespace_scope::OPTION_KEY;
    use crate::syntax::parse;

    fn config(style: &str) -> Config {
        Config::default().with_option(OPTION_KEY, style)
    }

    #[test]
    fn single_fix_becomes_one_edit() {
        let src = "namespace App\n{\n    class C { }\n}\n";
        let tree = parse(src).tree;
        let diagnostics =
            analyze_document(&tree, &config("file"), &CancellationToken::new()).unwrap();
        match try_autofix(Path::new("App.cs"), &tree, &diagnostics[0]) {
            AutofixResult::Fixed(edits) => {
                assert_eq!(edits.len(), 1);
                assert_eq!(
                    edits[0].apply_to_str(src).unwrap(),
                    "namespace App;\n\nclass C { }\n"
                );
            }
            AutofixResult::CannotFix { reason } => panic!("unexpected: {reason}"),
        }
    }

    #[test]
    fn nested_namespace_cannot_be_fixed() {
        let tree = parse("namespace A\n{\n    namespace B\n    {\n    }\n}\n").tree;
        let outcome = fix_document(&tree, &config("file"), &CancellationToken::new()).unwrap();
        assert!(!outcome.changed());
        assert_eq!(outcome.unfixable.len(), 2);
        assert_eq!(outcome.tree.text(), tree.text());
    }

    #[test]
    fn all_file_scoped_namespaces_are_wrapped() {
        let src = "namespace A;\nclass C { }\n";
        let tree = parse(src).tree;
        let (edits, unfixable) = try_autofix_all(
            Path::new("A.cs"),
            &tree,
            &config("block"),
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(unfixable.is_empty());
        assert_eq!(edits.len(), 1);
        assert_eq!(
            edits[0].apply_to_str(src).unwrap(),
            "namespace A\n{\n    class C { }\n}\n"
        );
    }

    #[test]
    fn compliant_document_needs_no_edits() {
        let tree = parse("namespace A;\nclass C { }\n").tree;
        let (edits, unfixable) = try_autofix_all(
            Path::new("A.cs"),
            &tree,
            &config("file"),
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(edits.is_empty() && unfixable.is_empty());
    }
}
