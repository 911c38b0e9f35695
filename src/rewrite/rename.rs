//! Identifier replacement across documents.

use super::RewriteError;
use crate::semantics::Location;
use crate::solution::{DocumentId, Solution};
use crate::syntax::{GreenToken, SyntaxKind};
use std::collections::BTreeMap;

/// Replace the identifier at each location with `new_name`.
///
/// Either every location is rewritten or the solution is returned
/// untouched through the error.
pub fn rename_tokens(
    solution: &Solution,
    locations: &[Location],
    new_name: &str,
) -> Result<Solution, RewriteError> {
    let mut by_document: BTreeMap<DocumentId, Vec<Location>> = BTreeMap::new();
    for location in locations {
        by_document
            .entry(location.document)
            .or_default()
            .push(*location);
    }

    let mut result = solution.clone();
    for (id, mut spans) in by_document {
        let document = solution.document(id).ok_or_else(|| {
            RewriteError::precondition(format!("document {id} is not part of the solution"))
        })?;
        // Right to left so earlier offsets stay valid.
        spans.sort_by(|a, b| b.span.cmp(&a.span));
        spans.dedup();
        let mut tree = document.tree().clone();
        for location in spans {
            let token = tree
                .token_at_offset(location.span.start())
                .filter(|t| t.span() == location.span && t.kind().is_identifier_like())
                .ok_or(RewriteError::Stale {
                    kind: SyntaxKind::Identifier,
                    span: location.span,
                })?;
            let renamed = GreenToken::new(
                SyntaxKind::Identifier,
                new_name,
                token.leading().to_vec(),
                token.trailing().to_vec(),
            );
            tree = tree.with_root(token.replace_with(renamed));
        }
        result = result
            .with_document_tree(id, tree)
            .map_err(|e| RewriteError::precondition(e.to_string()))?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextSpan;

    #[test]
    fn renames_every_location() {
        let mut solution = Solution::new();
        let src = "class C { object Load() => null; void Run() { Load(); } }";
        let id = solution.add_document("C.cs", src);
        let first = src.find("Load").unwrap();
        let second = src.rfind("Load").unwrap();
        let locations = [
            Location::new(id, TextSpan::from_len(first, 4)),
            Location::new(id, TextSpan::from_len(second, 4)),
        ];
        let renamed = rename_tokens(&solution, &locations, "GetObject").unwrap();
        assert_eq!(
            renamed.document(id).unwrap().text(),
            "class C { object GetObject() => null; void Run() { GetObject(); } }"
        );
        // The input is untouched.
        assert_eq!(solution.document(id).unwrap().text(), src);
    }

    #[test]
    fn stale_location_fails_whole_rename() {
        let mut solution = Solution::new();
        let id = solution.add_document("C.cs", "class C { void M() { } }");
        let locations = [Location::new(id, TextSpan::from_len(0, 3))];
        assert!(matches!(
            rename_tokens(&solution, &locations, "X"),
            Err(RewriteError::Stale { .. })
        ));
    }
}
