use proptest::prelude::*;
use sharpfix::matching::{body_contains, classify, header_contains, header_span, SpanMatch};
use sharpfix::rewrite::{demote_to_flat, promote_to_wrapper};
use sharpfix::syntax::ast::{AstNode, MethodDecl, TypeDecl};
use sharpfix::syntax::{parse, SyntaxKind, SyntaxTree};
use sharpfix::text::TextSpan;

fn members() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec(
        ("[A-Z][a-z]{0,6}", proptest::option::of("[a-z]{1,8}")),
        1..5,
    )
}

fn block_source(members: &[(String, Option<String>)]) -> String {
    let mut out = String::from("using System;\n\nnamespace App.Core\n{\n");
    for (index, (name, doc)) in members.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if let Some(doc) = doc {
            out.push_str(&format!("    /// {doc}\n"));
        }
        out.push_str(&format!(
            "    public class {name}\n    {{\n        // body of {name}\n        void Run() {{ }}\n    }}\n"
        ));
    }
    out.push_str("}\n");
    out
}

/// Type names and comment texts, in document order.
fn outline(tree: &SyntaxTree) -> (Vec<String>, Vec<String>) {
    let names = tree
        .root()
        .descendants()
        .filter_map(TypeDecl::cast)
        .filter_map(|decl| decl.name())
        .collect();
    let comments = tree
        .root()
        .tokens()
        .iter()
        .flat_map(|token| token.leading().iter().chain(token.trailing()).cloned().collect::<Vec<_>>())
        .filter(|trivia| trivia.kind().is_comment())
        .map(|trivia| trivia.text().trim().to_string())
        .collect();
    (names, comments)
}

fn namespace(tree: &SyntaxTree, kind: SyntaxKind) -> sharpfix::syntax::SyntaxNode {
    tree.root()
        .descendants()
        .find(|n| n.kind() == kind)
        .expect("namespace present")
}

proptest! {
    #[test]
    fn parse_is_lossless(input in "[ -~\n\t]{0,400}") {
        let tree = parse(&input).tree;
        prop_assert_eq!(tree.text(), input.as_str());
    }

    #[test]
    fn demote_then_promote_keeps_members_and_docs(members in members()) {
        let src = block_source(&members);
        let original = parse(&src).tree;

        let flat = demote_to_flat(&original, &namespace(&original, SyntaxKind::NamespaceDeclaration))
            .unwrap();
        prop_assert!(flat.text().contains("namespace App.Core;"));
        prop_assert_eq!(outline(&flat), outline(&original));

        let block = promote_to_wrapper(&flat, &namespace(&flat, SyntaxKind::FileScopedNamespaceDeclaration))
            .unwrap();
        prop_assert_eq!(outline(&block), outline(&original));
        prop_assert!(!parse(block.text()).has_errors());
    }

    #[test]
    fn header_selections_never_match_the_body(
        modifiers in prop::sample::subsequence(vec!["public", "static", "async"], 0..=3),
        name in "[A-Z][a-z]{0,8}",
        start in 0usize..64,
        len in 0usize..64,
    ) {
        let src = format!(
            "class C\n{{\n    {} int {}(int x, string y) {{ return x; }}\n}}\n",
            modifiers.join(" "),
            name
        );
        let tree = parse(&src).tree;
        let method = tree
            .root()
            .descendants()
            .find_map(MethodDecl::cast)
            .unwrap();
        let header = header_span(method.syntax()).unwrap();
        let from = header.start() + start % header.len().max(1);
        let to = (from + len).min(header.end());
        let selection = TextSpan::new(from, to);

        prop_assert!(header_contains(method.syntax(), selection));
        prop_assert!(!body_contains(method.syntax(), selection));
        prop_assert_eq!(classify(method.syntax(), selection), SpanMatch::HeaderContains);
    }
}
