//! Parameterless methods to read-only properties.

use super::{
    detect_eol, detect_indent, ends_with_eol, ensure_present, indentation, last_trailing,
    line_indent, token, with_first_leading, with_last_trailing, Reindent, RewriteError,
};
use crate::semantics::Location;
use crate::solution::{DocumentId, Solution};
use crate::syntax::ast::{AstNode, MethodDecl};
use crate::syntax::{
    GreenElement, GreenNode, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxTree, Trivia, TriviaKind,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Push the tokens of `element` without their node structure. Properties
/// are parsed as flat member declarations.
fn flatten(element: &GreenElement, out: &mut Vec<GreenElement>) {
    element.for_each_token(&mut |t| out.push(GreenElement::Token(Arc::new(t.clone()))));
}

/// Replace `T Name() body` by a get-only property `T Name { get body }`.
///
/// An expression body stays one (`T Name => x;`) and a missing body
/// becomes `{ get; }`. A multi-line block gets the accessor on its own
/// line and is indented one level deeper.
pub fn method_to_property(
    tree: &SyntaxTree,
    method: &SyntaxNode,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, method)?;
    let decl = MethodDecl::cast(method.clone()).ok_or(RewriteError::UnexpectedKind {
        expected: SyntaxKind::MethodDeclaration,
        found: method.kind(),
    })?;
    if decl.parameter_count() != Some(0) || decl.type_parameter_list().is_some() {
        return Err(RewriteError::precondition(
            "only a non-generic method without parameters can become a property",
        ));
    }
    let list = decl
        .parameter_list()
        .ok_or(RewriteError::Malformed(method.kind(), "parameter list"))?;
    let identifier = decl
        .identifier()
        .filter(|t| t.parent() == *method)
        .ok_or(RewriteError::Malformed(method.kind(), "method name"))?;
    let list_trailing = last_trailing(&GreenElement::Node(list.green().clone()));
    let eol = detect_eol(tree.text());
    let unit = detect_indent(tree.text());
    let indent = method
        .first_token()
        .map(|t| line_indent(t.leading()))
        .unwrap_or_default();

    let green = method.green();
    let children = green.children();
    let mut out = Vec::with_capacity(children.len() + 8);
    for child in &children[..identifier.index()] {
        if child.kind() == SyntaxKind::AttributeList {
            out.push(child.clone());
        } else {
            flatten(child, &mut out);
        }
    }
    let name = |trailing: Vec<Trivia>| {
        GreenElement::Token(Arc::new(identifier.green().with_trailing(trailing)))
    };
    let space = || vec![Trivia::whitespace(" ")];

    let rest = &children[list.index() + 1..];
    match rest.first() {
        Some(body) if body.kind() == SyntaxKind::ArrowExpressionClause => {
            out.push(name(list_trailing));
            for child in rest {
                flatten(child, &mut out);
            }
        }
        Some(semicolon) if semicolon.kind() == SyntaxKind::Semicolon => {
            out.push(name(space()));
            out.push(token(SyntaxKind::OpenBrace, "{", Vec::new(), space()));
            out.push(token(SyntaxKind::Identifier, "get", Vec::new(), Vec::new()));
            out.push(token(SyntaxKind::Semicolon, ";", Vec::new(), space()));
            out.push(token(
                SyntaxKind::CloseBrace,
                "}",
                Vec::new(),
                last_trailing(semicolon),
            ));
        }
        Some(block) if block.kind() == SyntaxKind::Block => {
            let after = last_trailing(block);
            let text = match block {
                GreenElement::Node(node) => node.to_string(),
                GreenElement::Token(token) => token.text().to_string(),
            };
            let width: usize = after.iter().map(Trivia::len).sum();
            let inner = &text[..text.len().saturating_sub(width)];
            if ends_with_eol(&list_trailing) || inner.contains('\n') {
                let mut trailing = list_trailing;
                if !ends_with_eol(&trailing) {
                    while trailing
                        .last()
                        .is_some_and(|t| t.kind() == TriviaKind::Whitespace)
                    {
                        trailing.pop();
                    }
                    trailing.push(Trivia::end_of_line(eol));
                }
                let accessor_indent = format!("{indent}{unit}");
                let newline = || vec![Trivia::end_of_line(eol)];
                out.push(name(trailing));
                out.push(token(SyntaxKind::OpenBrace, "{", indentation(&indent), newline()));
                out.push(token(
                    SyntaxKind::Identifier,
                    "get",
                    indentation(&accessor_indent),
                    newline(),
                ));
                let mut line_start = true;
                let body = Reindent::Indent(&unit).apply(block, &mut line_start);
                let body = with_first_leading(&body, indentation(&accessor_indent));
                flatten(&with_last_trailing(&body, newline()), &mut out);
                out.push(token(SyntaxKind::CloseBrace, "}", indentation(&indent), after));
            } else {
                out.push(name(list_trailing));
                out.push(token(SyntaxKind::OpenBrace, "{", Vec::new(), space()));
                out.push(token(SyntaxKind::Identifier, "get", Vec::new(), space()));
                flatten(&with_last_trailing(block, space()), &mut out);
                out.push(token(SyntaxKind::CloseBrace, "}", Vec::new(), after));
            }
        }
        _ => return Err(RewriteError::Malformed(method.kind(), "method body")),
    }

    let property = GreenNode::new(SyntaxKind::MemberDeclaration, out);
    Ok(tree.with_root(method.replace_with(Arc::new(property))))
}

/// Drop the empty argument list after each location, turning `Area()`
/// into `Area`. Locations not followed by `()` are left alone.
///
/// Returns the new solution and the locations that were edited, in the
/// coordinates of the input.
pub fn remove_empty_argument_lists(
    solution: &Solution,
    locations: &[Location],
) -> Result<(Solution, Vec<Location>), RewriteError> {
    let mut by_document: BTreeMap<DocumentId, Vec<Location>> = BTreeMap::new();
    for location in locations {
        by_document
            .entry(location.document)
            .or_default()
            .push(*location);
    }

    let mut result = solution.clone();
    let mut edited = Vec::new();
    for (id, mut spans) in by_document {
        let document = solution.document(id).ok_or_else(|| {
            RewriteError::precondition(format!("document {id} is not part of the solution"))
        })?;
        // Right to left so earlier offsets stay valid.
        spans.sort_by(|a, b| b.span.cmp(&a.span));
        spans.dedup();
        let mut tree = document.tree().clone();
        let mut changed = false;
        for location in spans {
            let name = tree
                .token_at_offset(location.span.start())
                .filter(|t| t.span() == location.span && t.kind().is_identifier_like())
                .ok_or(RewriteError::Stale {
                    kind: SyntaxKind::Identifier,
                    span: location.span,
                })?;
            let parent = name.parent();
            let siblings = parent.children_with_tokens();
            let index = name.index();
            let (Some(SyntaxElement::Token(open)), Some(SyntaxElement::Token(close))) =
                (siblings.get(index + 1), siblings.get(index + 2))
            else {
                continue;
            };
            if open.kind() != SyntaxKind::OpenParen || close.kind() != SyntaxKind::CloseParen {
                continue;
            }
            let trailing = [
                name.trailing(),
                open.leading(),
                open.trailing(),
                close.leading(),
                close.trailing(),
            ]
            .concat();
            let replacement = GreenElement::Token(Arc::new(name.green().with_trailing(trailing)));
            let rebuilt = parent
                .green()
                .splice_children(index..index + 3, vec![replacement]);
            tree = tree.with_root(parent.replace_with(Arc::new(rebuilt)));
            edited.push(location);
            changed = true;
        }
        if changed {
            result = result
                .with_document_tree(id, tree)
                .map_err(|e| RewriteError::precondition(e.to_string()))?;
        }
    }
    edited.sort();
    Ok((result, edited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;
    use crate::text::TextSpan;

    fn convert(src: &str) -> String {
        let tree = parse(src).tree;
        let method = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap();
        method_to_property(&tree, &method).unwrap().text().to_string()
    }

    #[test]
    fn block_body_becomes_getter() {
        assert_eq!(
            convert("class C\n{\n    public int Area()\n    {\n        return w * h;\n    }\n}\n"),
            "class C\n{\n    public int Area\n    {\n        get\n        {\n            return w * h;\n        }\n    }\n}\n"
        );
        assert_eq!(
            convert("class C\n{\n    public int Area() { return 0; }\n}\n"),
            "class C\n{\n    public int Area { get { return 0; } }\n}\n"
        );
    }

    #[test]
    fn expression_and_missing_bodies() {
        assert_eq!(
            convert("class C\n{\n    [Pure]\n    int Area() => w * h; // cached\n}\n"),
            "class C\n{\n    [Pure]\n    int Area => w * h; // cached\n}\n"
        );
        assert_eq!(
            convert("interface IShape\n{\n    double Area();\n}\n"),
            "interface IShape\n{\n    double Area { get; }\n}\n"
        );
        let converted = parse(&convert("interface IShape\n{\n    double Area();\n}\n")).tree;
        assert!(converted
            .root()
            .descendants()
            .any(|n| n.kind() == SyntaxKind::MemberDeclaration));
    }

    #[test]
    fn parameters_are_rejected() {
        let tree = parse("class C { int Scale(int x) => x; }").tree;
        let method = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap();
        assert!(matches!(
            method_to_property(&tree, &method),
            Err(RewriteError::Precondition(_))
        ));
    }

    #[test]
    fn only_invocations_lose_their_parentheses() {
        let mut solution = Solution::new();
        let src = "class C { int Area() => 1; int Twice() => Area() * 2; string N() => nameof(Area); }";
        let id = solution.add_document("C.cs", src);
        let at = |needle: &str| {
            let start = src.find(needle).unwrap();
            Location::new(id, TextSpan::from_len(start, 4))
        };
        let declaration = Location::new(id, TextSpan::from_len(src.find("Area").unwrap(), 4));
        let call = at("Area() * 2");
        let name_of = at("Area);");
        let (updated, edited) =
            remove_empty_argument_lists(&solution, &[declaration, call, name_of]).unwrap();
        assert_eq!(edited, vec![call]);
        assert_eq!(
            updated.document(id).unwrap().text(),
            "class C { int Area() => 1; int Twice() => Area * 2; string N() => nameof(Area); }"
        );
    }
}
