//! Library integration tests: whole documents through the public API.

mod namespace_style;
mod refactorings;
mod round_trip;

use sharpfix::refactor::RefactoringContext;
use sharpfix::semantics::WorkspaceModel;
use sharpfix::solution::{DocumentId, Solution};
use sharpfix::text::TextSpan;

/// Remove the `|` caret marker and return the text and the caret.
pub fn caret(src: &str) -> (String, TextSpan) {
    let offset = src.find('|').expect("source has a caret");
    (src.replacen('|', "", 1), TextSpan::empty(offset))
}

/// Solution over `files`; the first file holds the caret.
pub fn context(files: &[(&str, &str)]) -> (RefactoringContext, Vec<DocumentId>) {
    let mut solution = Solution::new();
    let mut ids = Vec::new();
    let mut selection = TextSpan::empty(0);
    for (index, (path, src)) in files.iter().enumerate() {
        let text = if index == 0 {
            let (text, caret) = caret(src);
            selection = caret;
            text
        } else {
            src.to_string()
        };
        ids.push(solution.add_document(*path, &text));
    }
    let semantics = WorkspaceModel::shared(solution.clone());
    let ctx = RefactoringContext::new(solution, ids[0], selection, semantics);
    (ctx, ids)
}
