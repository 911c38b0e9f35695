//! Block ⇄ file-scoped namespace conversion.
//!
//! ```text
//! namespace App          namespace App;
//! {                <->
//!     class C { }        class C { }
//! }
//! ```
//!
//! Members keep their own trivia; only indentation at line starts changes
//! by one level. Comments attached to the braces, the name or the
//! semicolon move to the nearest surviving token.

use super::{
    as_lines, detect_eol, detect_indent, ends_with_eol, ensure_kind, ensure_present,
    first_leading, last_trailing, significant, token, trim_leading_blank_lines,
    trim_trailing_blank_lines, with_first_leading, with_last_trailing, Reindent, RewriteError,
};
use crate::syntax::ast::{token_text, AstNode, CompilationUnit, FileScopedNamespaceDecl, NamespaceDecl};
use crate::syntax::{
    Annotation, GreenElement, GreenNode, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxTree, Trivia,
    TriviaKind,
};
use std::sync::Arc;
use tracing::debug;

/// The compilation unit `node` must be a direct child of.
fn parent_unit(node: &SyntaxNode) -> Result<SyntaxNode, RewriteError> {
    node.parent()
        .filter(|p| p.kind() == SyntaxKind::CompilationUnit)
        .ok_or_else(|| {
            RewriteError::precondition("namespace is not a direct child of the compilation unit")
        })
}

/// Whether `namespace` can be turned into a file-scoped declaration: it is
/// a direct child of the unit, the only namespace in it, and nothing but
/// the end of file follows it.
pub fn can_demote(namespace: &SyntaxNode) -> Result<(), RewriteError> {
    ensure_kind(namespace, SyntaxKind::NamespaceDeclaration)?;
    let unit = parent_unit(namespace)?;
    let count = CompilationUnit::cast(unit)
        .map(|cu| cu.namespaces().len())
        .unwrap_or(0);
    if count != 1 {
        return Err(RewriteError::precondition(format!(
            "file scoped namespaces need a single namespace per file, found {count}"
        )));
    }
    let trailing_declaration = namespace
        .following_siblings()
        .iter()
        .any(|e| e.as_node().is_some());
    if trailing_declaration {
        return Err(RewriteError::precondition(
            "declarations follow the namespace in the same file",
        ));
    }
    Ok(())
}

/// Replace a block namespace by a file-scoped one whose members become
/// siblings that follow it.
pub fn demote_to_flat(tree: &SyntaxTree, namespace: &SyntaxNode) -> Result<SyntaxTree, RewriteError> {
    ensure_kind(namespace, SyntaxKind::NamespaceDeclaration)?;
    ensure_present(tree, namespace)?;
    can_demote(namespace)?;
    let unit = parent_unit(namespace)?;
    let decl = NamespaceDecl::cast(namespace.clone())
        .ok_or(RewriteError::Malformed(SyntaxKind::NamespaceDeclaration, "node"))?;
    let keyword = decl
        .namespace_keyword()
        .ok_or(RewriteError::Malformed(namespace.kind(), "`namespace` keyword"))?;
    let name = decl
        .name()
        .ok_or(RewriteError::Malformed(namespace.kind(), "name"))?;
    let open = decl
        .open_brace()
        .ok_or(RewriteError::Malformed(namespace.kind(), "`{`"))?;
    let close = decl
        .close_brace()
        .ok_or(RewriteError::Malformed(namespace.kind(), "`}`"))?;

    let text = tree.text();
    let eol = detect_eol(text);
    let unit_indent = detect_indent(&namespace.text());
    let reindent = Reindent::Dedent(&unit_indent);

    // Comments on the name and `{` go to the line after the new `;`.
    let name_green = GreenElement::Node(name.green().clone());
    let mut moved = significant(&last_trailing(&name_green));
    moved.extend(significant(open.leading()));
    moved.extend(significant(open.trailing()));

    let name_green = with_last_trailing(&name_green, Vec::new());
    let flat = GreenNode::new(
        SyntaxKind::FileScopedNamespaceDeclaration,
        vec![
            GreenElement::Token(keyword.green().clone()),
            name_green,
            token(SyntaxKind::Semicolon, ";", Vec::new(), vec![Trivia::end_of_line(eol)]),
        ],
    )
    .with_annotation(Annotation::Formatter);

    let mut line_start = ends_with_eol(open.trailing());
    let mut members: Vec<GreenElement> = decl
        .body_elements()
        .iter()
        .map(|element| reindent.apply(&element.green(), &mut line_start))
        .collect();

    if let Some(first) = members.first_mut() {
        let leading = first_leading(first);
        let mut new_leading = vec![Trivia::end_of_line(eol)];
        new_leading.extend(as_lines(&moved, eol));
        // A blank line separates the declaration from the first member.
        let skip_blank = leading
            .first()
            .is_some_and(|t| t.kind() == TriviaKind::EndOfLine);
        new_leading.extend(leading.into_iter().skip(usize::from(skip_blank)));
        *first = with_first_leading(first, new_leading);
    }
    if let Some(last) = members.last_mut() {
        let trailing = last_trailing(last);
        if !ends_with_eol(&trailing) {
            let mut trailing = trailing;
            trailing.push(Trivia::end_of_line(eol));
            *last = with_last_trailing(last, trailing);
        }
    }

    // Comments before `}`, after it and around an optional `;` land in
    // front of whatever follows the namespace.
    let close_leading = Reindent::Dedent(&unit_indent).leading(close.leading(), true);
    let mut carried = trim_trailing_blank_lines(&close_leading, eol);
    let mut tail = significant(close.trailing());
    if let Some(semicolon) = decl.semicolon() {
        tail.extend(significant(semicolon.leading()));
        tail.extend(significant(semicolon.trailing()));
    }
    carried.extend(as_lines(&tail, eol));
    if members.is_empty() && !moved.is_empty() {
        carried.splice(0..0, as_lines(&moved, eol));
    }

    let mut replacement = vec![GreenElement::from(flat)];
    replacement.extend(members);
    let index = namespace.index();
    let mut root = unit.green().splice_children(index..index + 1, replacement.clone());
    if !carried.is_empty() {
        let next = index + replacement.len();
        if let Some(following) = root.children().get(next).cloned() {
            let mut leading = carried;
            leading.extend(first_leading(&following));
            root = root.replace_child(next, with_first_leading(&following, leading));
        }
    }

    debug!(name = %token_text(&name), "namespace converted to file scoped");
    Ok(tree.with_root(Arc::new(root.with_annotation(Annotation::Formatter))))
}

/// Wrap the declarations following a file-scoped namespace in a block.
pub fn promote_to_wrapper(
    tree: &SyntaxTree,
    namespace: &SyntaxNode,
) -> Result<SyntaxTree, RewriteError> {
    ensure_kind(namespace, SyntaxKind::FileScopedNamespaceDeclaration)?;
    ensure_present(tree, namespace)?;
    let unit = parent_unit(namespace)?;
    let decl = FileScopedNamespaceDecl::cast(namespace.clone()).ok_or(RewriteError::Malformed(
        SyntaxKind::FileScopedNamespaceDeclaration,
        "node",
    ))?;
    let keyword = decl
        .namespace_keyword()
        .ok_or(RewriteError::Malformed(namespace.kind(), "`namespace` keyword"))?;
    let name = decl
        .name()
        .ok_or(RewriteError::Malformed(namespace.kind(), "name"))?;
    let semicolon = decl
        .semicolon()
        .ok_or(RewriteError::Malformed(namespace.kind(), "`;`"))?;

    let text = tree.text();
    let eol = detect_eol(text);
    let unit_indent = detect_indent(text);
    let reindent = Reindent::Indent(&unit_indent);

    let name_green = GreenElement::Node(name.green().clone());
    let mut moved = significant(&last_trailing(&name_green));
    moved.extend(significant(semicolon.leading()));
    moved.extend(significant(semicolon.trailing()));
    let name_green = with_last_trailing(&name_green, vec![Trivia::end_of_line(eol)]);

    let mut open_trailing = Vec::new();
    for comment in &moved {
        open_trailing.push(Trivia::whitespace(" "));
        open_trailing.push(comment.clone());
    }
    open_trailing.push(Trivia::end_of_line(eol));

    // Members run to the next file-scoped namespace or the end of file.
    let siblings: Vec<SyntaxElement> = namespace
        .following_siblings()
        .into_iter()
        .take_while(|e| {
            e.as_node()
                .is_some_and(|n| n.kind() != SyntaxKind::FileScopedNamespaceDeclaration)
        })
        .collect();
    let member_count = siblings.len();

    let mut members: Vec<GreenElement> = siblings.iter().map(SyntaxElement::green).collect();
    if let Some(first) = members.first_mut() {
        let leading = trim_leading_blank_lines(&first_leading(first));
        *first = with_first_leading(first, leading);
    }
    let mut line_start = true;
    let mut members: Vec<GreenElement> = members
        .iter()
        .map(|member| reindent.apply(member, &mut line_start))
        .collect();
    if let Some(last) = members.last_mut() {
        let trailing = last_trailing(last);
        if !ends_with_eol(&trailing) {
            let mut trailing = trailing;
            trailing.push(Trivia::end_of_line(eol));
            *last = with_last_trailing(last, trailing);
        }
    }

    // Trivia before the following token (usually end of file) belongs to
    // the namespace body now.
    let index = namespace.index();
    let following_index = index + 1 + member_count;
    let following = unit.green().children().get(following_index).cloned();
    let following_leading = following.as_ref().map(first_leading).unwrap_or_default();
    let close_leading = Reindent::Indent(&unit_indent)
        .leading(&trim_trailing_blank_lines(&following_leading, eol), true);
    // The indentation added after the last line belongs to nothing.
    let close_leading = match close_leading.last() {
        Some(last) if last.kind() == TriviaKind::Whitespace => {
            close_leading[..close_leading.len() - 1].to_vec()
        }
        _ => close_leading,
    };

    let mut children = vec![
        GreenElement::Token(keyword.green().clone()),
        name_green,
        token(SyntaxKind::OpenBrace, "{", Vec::new(), open_trailing),
    ];
    children.extend(members);
    children.push(token(
        SyntaxKind::CloseBrace,
        "}",
        close_leading,
        vec![Trivia::end_of_line(eol)],
    ));
    let block = GreenNode::new(SyntaxKind::NamespaceDeclaration, children)
        .with_annotation(Annotation::Formatter);

    let mut root = unit
        .green()
        .splice_children(index..following_index, vec![GreenElement::from(block)]);
    if let Some(following) = following {
        let stripped = with_first_leading(&following, Vec::new());
        root = root.replace_child(index + 1, stripped);
    }

    debug!(name = %token_text(&name), "namespace converted to block scoped");
    Ok(tree.with_root(Arc::new(root.with_annotation(Annotation::Formatter))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn convert(src: &str) -> String {
        let tree = parse(src).tree;
        let node = tree
            .root()
            .descendants()
            .find(|n| n.kind().is_namespace_declaration())
            .unwrap();
        let result = match node.kind() {
            SyntaxKind::NamespaceDeclaration => demote_to_flat(&tree, &node),
            _ => promote_to_wrapper(&tree, &node),
        };
        result.unwrap().text().to_string()
    }

    #[test]
    fn demote_simple() {
        let src = "using System;\n\nnamespace App\n{\n    /// <summary>Doc</summary>\n    public class C\n    {\n        void M() { }\n    }\n}\n";
        assert_eq!(
            convert(src),
            "using System;\n\nnamespace App;\n\n/// <summary>Doc</summary>\npublic class C\n{\n    void M() { }\n}\n"
        );
    }

    #[test]
    fn promote_simple() {
        let src = "using System;\n\nnamespace App;\n\n/// <summary>Doc</summary>\npublic class C\n{\n    void M() { }\n}\n";
        assert_eq!(
            convert(src),
            "using System;\n\nnamespace App\n{\n    /// <summary>Doc</summary>\n    public class C\n    {\n        void M() { }\n    }\n}\n"
        );
    }

    #[test]
    fn demote_keeps_brace_comments() {
        let src = "namespace App // root\n{\n    class C { }\n    // trailing note\n}\n";
        let out = convert(src);
        assert_eq!(out, "namespace App;\n\n// root\nclass C { }\n// trailing note\n");
    }

    #[test]
    fn demote_keeps_directives_unindented() {
        let src = "namespace App\n{\n#if DEBUG\n    class C { }\n#endif\n}\n";
        let out = convert(src);
        assert_eq!(out, "namespace App;\n\n#if DEBUG\nclass C { }\n#endif\n");
    }

    #[test]
    fn promote_carries_semicolon_comment_and_crlf() {
        let src = "namespace App; // root\r\n\r\nclass C { }\r\n";
        let out = convert(src);
        assert_eq!(out, "namespace App\r\n{ // root\r\n    class C { }\r\n}\r\n");
    }

    #[test]
    fn nested_namespace_is_refused() {
        let src = "namespace A\n{\n    namespace B\n    {\n    }\n}\n";
        let tree = parse(src).tree;
        let inner = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::NamespaceDeclaration)
            .nth(1)
            .unwrap();
        assert!(matches!(
            demote_to_flat(&tree, &inner),
            Err(RewriteError::Precondition(_))
        ));
    }

    #[test]
    fn stale_node_is_refused() {
        let tree = parse("namespace A\n{\n}\n").tree;
        let other = parse("// x\nnamespace B\n{\n}\n").tree;
        let node = other.root().children().next().unwrap();
        assert!(matches!(
            demote_to_flat(&tree, &node),
            Err(RewriteError::Stale { .. })
        ));
    }

    #[test]
    fn result_is_annotated_for_formatting() {
        let tree = parse("namespace A\n{\n    class C { }\n}\n").tree;
        let node = tree.root().children().next().unwrap();
        let out = demote_to_flat(&tree, &node).unwrap();
        let flat = out.root().children().next().unwrap();
        assert_eq!(flat.kind(), SyntaxKind::FileScopedNamespaceDeclaration);
        assert!(flat.green().has_annotation(Annotation::Formatter));
        assert!(!parse(out.text()).has_errors());
    }
}
