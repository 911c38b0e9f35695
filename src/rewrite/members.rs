//! Small edits on declarations: modifiers, bodies and return types.

use super::{
    detect_eol, ensure_present, first_leading, indentation, last_trailing, line_indent,
    significant, token, with_first_leading, with_last_trailing, RewriteError,
};
use crate::syntax::ast::{AstNode, MethodDecl};
use crate::syntax::{
    GreenElement, GreenNode, GreenToken, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxTree, Trivia,
    TriviaKind,
};
use std::sync::Arc;

/// Conventional position of a modifier in a modifier list.
fn modifier_rank(kind: SyntaxKind) -> u8 {
    match kind {
        SyntaxKind::PublicKeyword
        | SyntaxKind::PrivateKeyword
        | SyntaxKind::ProtectedKeyword
        | SyntaxKind::InternalKeyword => 0,
        SyntaxKind::NewKeyword => 1,
        SyntaxKind::StaticKeyword
        | SyntaxKind::AbstractKeyword
        | SyntaxKind::VirtualKeyword
        | SyntaxKind::OverrideKeyword
        | SyntaxKind::SealedKeyword => 2,
        SyntaxKind::ReadonlyKeyword
        | SyntaxKind::ExternKeyword
        | SyntaxKind::ConstKeyword
        | SyntaxKind::VolatileKeyword
        | SyntaxKind::FixedKeyword
        | SyntaxKind::RequiredKeyword => 3,
        SyntaxKind::UnsafeKeyword => 4,
        SyntaxKind::AsyncKeyword => 5,
        SyntaxKind::PartialKeyword => 6,
        _ => 3,
    }
}

fn modifier_text(kind: SyntaxKind) -> Result<&'static str, RewriteError> {
    let text = match kind {
        SyntaxKind::PublicKeyword => "public",
        SyntaxKind::PrivateKeyword => "private",
        SyntaxKind::ProtectedKeyword => "protected",
        SyntaxKind::InternalKeyword => "internal",
        SyntaxKind::NewKeyword => "new",
        SyntaxKind::StaticKeyword => "static",
        SyntaxKind::AbstractKeyword => "abstract",
        SyntaxKind::VirtualKeyword => "virtual",
        SyntaxKind::OverrideKeyword => "override",
        SyntaxKind::SealedKeyword => "sealed",
        SyntaxKind::ReadonlyKeyword => "readonly",
        SyntaxKind::ExternKeyword => "extern",
        SyntaxKind::UnsafeKeyword => "unsafe",
        SyntaxKind::AsyncKeyword => "async",
        SyntaxKind::PartialKeyword => "partial",
        other => {
            return Err(RewriteError::precondition(format!(
                "{other:?} is not a modifier that can be added"
            )))
        }
    };
    Ok(text)
}

fn replace_node(tree: &SyntaxTree, node: &SyntaxNode, green: GreenNode) -> SyntaxTree {
    tree.with_root(node.replace_with(Arc::new(green)))
}

/// Add `modifier` to a declaration, keeping the conventional order
/// (`public static async`, `protected abstract`, ...).
pub fn insert_modifier(
    tree: &SyntaxTree,
    decl: &SyntaxNode,
    modifier: SyntaxKind,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, decl)?;
    let text = modifier_text(modifier)?;
    let elements = decl.children_with_tokens();
    if elements.iter().any(|e| e.kind() == modifier) {
        return Err(RewriteError::precondition(format!("already `{text}`")));
    }

    let first_after_attributes = elements
        .iter()
        .position(|e| e.kind() != SyntaxKind::AttributeList)
        .ok_or(RewriteError::Malformed(decl.kind(), "declaration"))?;
    let modifiers_end = elements[first_after_attributes..]
        .iter()
        .position(|e| !e.kind().is_modifier())
        .map(|p| p + first_after_attributes)
        .unwrap_or(elements.len());
    let rank = modifier_rank(modifier);
    let insert_at = (first_after_attributes..modifiers_end)
        .find(|&i| modifier_rank(elements[i].kind()) > rank)
        .unwrap_or(modifiers_end);

    let green = decl.green();
    let anchor = green
        .children()
        .get(insert_at)
        .ok_or(RewriteError::Malformed(decl.kind(), "declaration body"))?;
    // The new token takes over the anchor's indentation and comments.
    let leading = first_leading(anchor);
    let new_token = token(modifier, text, leading, vec![Trivia::whitespace(" ")]);
    let anchor = with_first_leading(anchor, Vec::new());
    let rebuilt = green.splice_children(insert_at..insert_at + 1, vec![new_token, anchor]);
    Ok(replace_node(tree, decl, rebuilt))
}

/// Remove `modifier` from a declaration.
pub fn remove_modifier(
    tree: &SyntaxTree,
    decl: &SyntaxNode,
    modifier: SyntaxKind,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, decl)?;
    let elements = decl.children_with_tokens();
    let index = elements
        .iter()
        .position(|e| e.kind() == modifier)
        .ok_or_else(|| RewriteError::precondition(format!("{modifier:?} is not present")))?;
    let removed = decl.green().children()[index].clone();
    let next = decl
        .green()
        .children()
        .get(index + 1)
        .ok_or(RewriteError::Malformed(decl.kind(), "declaration"))?;
    let mut leading = first_leading(&removed);
    leading.extend(first_leading(next));
    let next = with_first_leading(next, leading);
    let rebuilt = decl
        .green()
        .splice_children(index..index + 2, vec![next]);
    Ok(replace_node(tree, decl, rebuilt))
}

/// Index of the body (block or `=>` clause) in a method's children.
fn body_index(method: &MethodDecl) -> Option<(usize, SyntaxElement)> {
    method
        .syntax()
        .children_with_tokens()
        .into_iter()
        .enumerate()
        .find(|(_, e)| matches!(e.kind(), SyntaxKind::Block | SyntaxKind::ArrowExpressionClause))
}

/// Replace a method body with `;`: `void M() { ... }` becomes `void M();`.
pub fn replace_body_with_semicolon(
    tree: &SyntaxTree,
    method: &SyntaxNode,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, method)?;
    let decl = MethodDecl::cast(method.clone()).ok_or(RewriteError::UnexpectedKind {
        expected: SyntaxKind::MethodDeclaration,
        found: method.kind(),
    })?;
    let (index, body) =
        body_index(&decl).ok_or_else(|| RewriteError::precondition("method has no body"))?;
    let green = method.green();
    let children = green.children();
    let end = match body.kind() {
        SyntaxKind::ArrowExpressionClause
            if children.get(index + 1).map(GreenElement::kind) == Some(SyntaxKind::Semicolon) =>
        {
            index + 2
        }
        _ => index + 1,
    };
    let last_removed = &children[end - 1];
    let previous = index
        .checked_sub(1)
        .and_then(|i| children.get(i))
        .ok_or(RewriteError::Malformed(method.kind(), "signature"))?;

    // `;` sits right after the signature and inherits the body's line end.
    let mut trailing: Vec<Trivia> = significant(&last_trailing(previous))
        .into_iter()
        .flat_map(|c| [Trivia::whitespace(" "), c])
        .collect();
    trailing.extend(last_trailing(last_removed));
    let semicolon = token(SyntaxKind::Semicolon, ";", Vec::new(), trailing);
    let previous = with_last_trailing(previous, Vec::new());

    let rebuilt = green.splice_children(index - 1..end, vec![previous, semicolon]);
    Ok(replace_node(tree, method, rebuilt))
}

/// Replace a block body with `=> expression;`. `expression` holds the
/// green tokens of the expression, keyword included for `throw`.
pub fn replace_block_with_expression_body(
    tree: &SyntaxTree,
    method: &SyntaxNode,
    expression: Vec<Arc<GreenToken>>,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, method)?;
    let decl = MethodDecl::cast(method.clone()).ok_or(RewriteError::UnexpectedKind {
        expected: SyntaxKind::MethodDeclaration,
        found: method.kind(),
    })?;
    let block = decl
        .body()
        .ok_or_else(|| RewriteError::precondition("method has no block body"))?;
    if expression.is_empty() {
        return Err(RewriteError::precondition("empty expression"));
    }
    let index = block.index();
    let green = method.green();
    let children = green.children();
    let previous = index
        .checked_sub(1)
        .and_then(|i| children.get(i))
        .ok_or(RewriteError::Malformed(method.kind(), "signature"))?;

    let last = expression.len() - 1;
    let mut arrow_children = vec![token(
        SyntaxKind::FatArrow,
        "=>",
        Vec::new(),
        vec![Trivia::whitespace(" ")],
    )];
    for (i, tok) in expression.iter().enumerate() {
        let mut tok = GreenToken::clone(tok);
        if i == 0 {
            tok = tok.with_leading(Vec::new());
        }
        if i == last {
            tok = tok.with_trailing(Vec::new());
        }
        arrow_children.push(GreenElement::from(tok));
    }
    let arrow = GreenElement::from(GreenNode::new(
        SyntaxKind::ArrowExpressionClause,
        arrow_children,
    ));
    let semicolon = token(
        SyntaxKind::Semicolon,
        ";",
        Vec::new(),
        last_trailing(&GreenElement::Node(block.green().clone())),
    );
    let previous = with_last_trailing(previous, vec![Trivia::whitespace(" ")]);
    let rebuilt = green.splice_children(index - 1..index + 1, vec![previous, arrow, semicolon]);
    Ok(replace_node(tree, method, rebuilt))
}

/// Replace a type syntax node by `new_type` (`void`, `Task`, ...), keeping
/// the surrounding trivia.
pub fn replace_type(
    tree: &SyntaxTree,
    type_node: &SyntaxNode,
    new_type: &str,
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, type_node)?;
    if !type_node.kind().is_type() {
        return Err(RewriteError::precondition(format!(
            "{:?} is not a type",
            type_node.kind()
        )));
    }
    let old = GreenElement::Node(type_node.green().clone());
    let leading = first_leading(&old);
    let trailing = last_trailing(&old);
    let green = match SyntaxKind::from_keyword(new_type) {
        Some(SyntaxKind::VoidKeyword) => GreenNode::new(
            SyntaxKind::PredefinedType,
            vec![token(SyntaxKind::VoidKeyword, new_type, leading, trailing)],
        ),
        Some(SyntaxKind::PredefinedTypeKeyword) => GreenNode::new(
            SyntaxKind::PredefinedType,
            vec![token(
                SyntaxKind::PredefinedTypeKeyword,
                new_type,
                leading,
                trailing,
            )],
        ),
        _ if !new_type.is_empty() && new_type.chars().all(|c| c == '_' || c.is_alphanumeric()) => {
            GreenNode::new(
                SyntaxKind::IdentifierName,
                vec![token(SyntaxKind::Identifier, new_type, leading, trailing)],
            )
        }
        _ => {
            return Err(RewriteError::precondition(format!(
                "`{new_type}` is not a simple type name"
            )))
        }
    };
    Ok(replace_node(tree, type_node, green))
}

/// Put documentation comment lines above a declaration, indented like
/// the declaration and after any comments already there.
pub fn insert_documentation(
    tree: &SyntaxTree,
    decl: &SyntaxNode,
    lines: &[Trivia],
) -> Result<SyntaxTree, RewriteError> {
    ensure_present(tree, decl)?;
    if lines.is_empty() {
        return Err(RewriteError::precondition("no documentation to insert"));
    }
    let eol = detect_eol(tree.text());
    let green = GreenElement::Node(decl.green().clone());
    let mut leading = first_leading(&green);
    let indent = line_indent(&leading);
    for line in lines {
        leading.push(line.clone());
        leading.push(Trivia::end_of_line(eol));
        leading.extend(indentation(&indent));
    }
    match with_first_leading(&green, leading) {
        GreenElement::Node(node) => Ok(tree.with_root(decl.replace_with(node))),
        GreenElement::Token(_) => Err(RewriteError::Malformed(decl.kind(), "declaration")),
    }
}

/// True when `trivia` holds anything a rewrite could lose.
pub fn has_significant(trivia: &[Trivia]) -> bool {
    trivia.iter().any(|t| t.kind().is_significant())
}

/// Whitespace and line breaks only.
pub fn is_blank(trivia: &[Trivia]) -> bool {
    trivia
        .iter()
        .all(|t| matches!(t.kind(), TriviaKind::Whitespace | TriviaKind::EndOfLine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn method(tree: &SyntaxTree) -> SyntaxNode {
        tree.root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .unwrap()
    }

    #[test]
    fn modifiers_go_in_conventional_order() {
        let tree = parse("class C\n{\n    public async Task M() { }\n}\n").tree;
        let out = insert_modifier(&tree, &method(&tree), SyntaxKind::StaticKeyword).unwrap();
        assert_eq!(out.text(), "class C\n{\n    public static async Task M() { }\n}\n");

        let tree = parse("class C\n{\n    /// doc\n    void M() { }\n}\n").tree;
        let out = insert_modifier(&tree, &method(&tree), SyntaxKind::StaticKeyword).unwrap();
        assert_eq!(out.text(), "class C\n{\n    /// doc\n    static void M() { }\n}\n");
    }

    #[test]
    fn modifier_after_attributes() {
        let tree = parse("class C\n{\n    [Test]\n    public void M() { }\n}\n").tree;
        let out = insert_modifier(&tree, &method(&tree), SyntaxKind::VirtualKeyword).unwrap();
        assert_eq!(out.text(), "class C\n{\n    [Test]\n    public virtual void M() { }\n}\n");
    }

    #[test]
    fn removing_first_modifier_keeps_indentation() {
        let tree = parse("class C\n{\n    static void M() { }\n}\n").tree;
        let out = remove_modifier(&tree, &method(&tree), SyntaxKind::StaticKeyword).unwrap();
        assert_eq!(out.text(), "class C\n{\n    void M() { }\n}\n");
    }

    #[test]
    fn body_to_semicolon() {
        let tree = parse("class C\n{\n    public void M()\n    {\n        Run();\n    }\n}\n").tree;
        let out = replace_body_with_semicolon(&tree, &method(&tree)).unwrap();
        assert_eq!(out.text(), "class C\n{\n    public void M();\n}\n");

        let tree = parse("class C\n{\n    int M() => 1;\n}\n").tree;
        let out = replace_body_with_semicolon(&tree, &method(&tree)).unwrap();
        assert_eq!(out.text(), "class C\n{\n    int M();\n}\n");
    }

    #[test]
    fn block_to_expression_body() {
        let tree = parse("class C\n{\n    int M()\n    {\n        return 1 + 2;\n    }\n}\n").tree;
        let m = method(&tree);
        let tokens: Vec<_> = m
            .tokens()
            .iter()
            .filter(|t| matches!(t.text(), "1" | "+" | "2"))
            .map(|t| t.green().clone())
            .collect();
        let out = replace_block_with_expression_body(&tree, &m, tokens).unwrap();
        assert_eq!(out.text(), "class C\n{\n    int M() => 1 + 2;\n}\n");
    }

    #[test]
    fn documentation_goes_above_attributes() {
        let tree = parse("class C\n{\n    // keep\n    [Pure]\n    int M() => 1;\n}\n").tree;
        let lines = vec![
            Trivia::new(TriviaKind::DocComment, "/// <summary>One.</summary>"),
            Trivia::new(TriviaKind::DocComment, "/// <returns>1</returns>"),
        ];
        let out = insert_documentation(&tree, &method(&tree), &lines).unwrap();
        assert_eq!(
            out.text(),
            "class C\n{\n    // keep\n    /// <summary>One.</summary>\n    /// <returns>1</returns>\n    [Pure]\n    int M() => 1;\n}\n"
        );
        assert!(insert_documentation(&tree, &method(&tree), &[]).is_err());
    }

    #[test]
    fn return_type_replacement() {
        let tree = parse("class C\n{\n    public int M() { }\n}\n").tree;
        let ty = MethodDecl::cast(method(&tree)).unwrap().return_type().unwrap();
        let out = replace_type(&tree, &ty, "void").unwrap();
        assert_eq!(out.text(), "class C\n{\n    public void M() { }\n}\n");
    }
}
