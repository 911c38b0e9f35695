use sharpfix::analysis::namespace_scope::OPTION_KEY;
use sharpfix::analysis::{analyze_document, evaluate, fix_deviant, fix_document, Evaluation};
use sharpfix::cancel::CancellationToken;
use sharpfix::config::{load_from_str, Config, Severity};
use sharpfix::syntax::{parse, SyntaxKind, SyntaxNode, SyntaxTree};
use sharpfix::validate::pooled;

fn style(value: &str) -> Config {
    Config::default().with_option(OPTION_KEY, value)
}

fn first_namespace(tree: &SyntaxTree) -> SyntaxNode {
    tree.root()
        .descendants()
        .find(|n| n.kind().is_namespace_declaration())
        .unwrap()
}

#[test]
fn deviant_block_namespace_is_fixed_and_then_compliant() {
    let src = "namespace Foo\n{\n    class Bar\n    {\n        // keep\n        void Run() { }\n    }\n}\n";
    let config = style("file");
    let tree = parse(src).tree;

    let Evaluation::Deviant(diagnostic) = evaluate(&first_namespace(&tree), &config) else {
        panic!("block namespace should deviate");
    };
    assert_eq!(diagnostic.message, "Change namespace declaration to file scoped.");

    let fixed = fix_deviant(&tree, &diagnostic).unwrap();
    assert_eq!(
        fixed.text(),
        "namespace Foo;\n\nclass Bar\n{\n    // keep\n    void Run() { }\n}\n"
    );
    assert_eq!(evaluate(&first_namespace(&fixed), &config), Evaluation::Compliant);
    assert!(pooled::validate(fixed.text()).is_ok());
}

#[test]
fn analysis_of_compliant_tree_is_idempotent() {
    let cancel = CancellationToken::new();
    let config = style("block");
    let tree = parse("namespace A\n{\n    class C { }\n}\n").tree;
    assert!(analyze_document(&tree, &config, &cancel).unwrap().is_empty());
    assert!(analyze_document(&tree, &config, &cancel).unwrap().is_empty());
}

#[test]
fn disabled_style_is_always_compliant() {
    let block = parse("namespace A\n{\n}\n").tree;
    let flat = parse("namespace A;\nclass C { }\n").tree;
    for config in [Config::default(), style("none"), style("")] {
        assert_eq!(evaluate(&first_namespace(&block), &config), Evaluation::Compliant);
        assert_eq!(evaluate(&first_namespace(&flat), &config), Evaluation::Compliant);
    }
}

#[test]
fn toml_configuration_drives_style_and_severity() {
    let config = load_from_str(
        "[options]\nnamespace_scope_style = \"Block\"\n\n[severity]\nSF0001 = \"error\"\n",
    )
    .unwrap();
    let tree = parse("namespace A;\n\nclass C { }\n").tree;
    let diagnostics = analyze_document(&tree, &config, &CancellationToken::new()).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].kind, SyntaxKind::FileScopedNamespaceDeclaration);
}

#[test]
fn fixing_a_document_keeps_comments_and_parses() {
    let src = "// header\nusing System;\n\nnamespace App // app\n{\n    /// <summary>Shape</summary>\n    public class Shape\n    {\n        public int Area() => 0;\n    }\n\n    #region helpers\n    internal static class Helpers { }\n    #endregion\n}\n";
    let tree = parse(src).tree;
    let outcome = fix_document(&tree, &style("file"), &CancellationToken::new()).unwrap();
    assert!(outcome.changed());
    assert!(outcome.unfixable.is_empty());

    let text = outcome.tree.text();
    for kept in [
        "// header",
        "// app",
        "/// <summary>Shape</summary>",
        "#region helpers",
        "#endregion",
    ] {
        assert!(text.contains(kept), "lost {kept:?} in:\n{text}");
    }
    assert!(text.contains("namespace App;"));
    assert!(pooled::validate_edit(src, text).is_ok());
}
