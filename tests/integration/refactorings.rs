use super::context;
use sharpfix::cancel::{CancellationToken, Cancelled};
use sharpfix::config::load_from_str;
use sharpfix::refactor::{collect_actions, ActionError, CodeAction, RefactoringId};
use sharpfix::syntax::SyntaxKind;
use std::sync::Arc;

const REPO: &str = "using System.Threading.Tasks;

namespace Shop
{
    public class Widget { }

    public class Repo
    {
        public async Task<Widget> |Load() { return null; }
    }
}
";

const SERVICE: &str = "namespace Shop
{
    public class Service
    {
        public void Run(Repo repo) { repo.Load(); }
    }
}
";

fn find(actions: &[CodeAction], id: RefactoringId) -> Option<&CodeAction> {
    actions.iter().find(|action| action.id() == id)
}

#[tokio::test]
async fn rename_updates_callers_in_other_documents() {
    let (ctx, ids) = context(&[("Repo.cs", REPO), ("Service.cs", SERVICE)]);
    let actions = collect_actions(&ctx).await.unwrap();
    let rename = find(&actions, RefactoringId::RenameMethodAccordingToTypeName).unwrap();
    assert_eq!(rename.title(), "Rename method to 'GetWidgetAsync'");

    let renamed = rename.invoke(CancellationToken::new()).await.unwrap();
    let repo = renamed.document(ids[0]).unwrap().text().to_string();
    let service = renamed.document(ids[1]).unwrap().text().to_string();
    assert!(repo.contains("public async Task<Widget> GetWidgetAsync() { return null; }"));
    assert!(service.contains("repo.GetWidgetAsync();"));
    assert!(!service.contains("Load"));
}

#[tokio::test]
async fn rename_is_withheld_when_the_name_is_taken() {
    let repo = REPO.replace(
        "    }\n}\n",
        "        public Task<Widget> GetWidgetAsync() { return null; }\n    }\n}\n",
    );
    let (ctx, _) = context(&[("Repo.cs", &repo), ("Service.cs", SERVICE)]);
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::RenameMethodAccordingToTypeName).is_none());
}

#[tokio::test]
async fn rename_is_withheld_when_another_partial_part_has_the_name() {
    let repo = "using System.Threading.Tasks;

namespace Shop
{
    public class Widget { }

    public partial class Repo
    {
        public async Task<Widget> |Load() { return null; }
    }
}
";
    let other_part = "using System.Threading.Tasks;

namespace Shop
{
    public partial class Repo
    {
        public Task<Widget> GetWidgetAsync() { return null; }
    }
}
";
    let (ctx, _) = context(&[("Repo.cs", repo), ("Repo.Cache.cs", other_part)]);
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::RenameMethodAccordingToTypeName).is_none());

    // Without the other part the rename is offered.
    let (ctx, _) = context(&[("Repo.cs", repo)]);
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::RenameMethodAccordingToTypeName).is_some());
}

#[tokio::test]
async fn result_less_task_gets_no_name() {
    let src = "using System.Threading.Tasks;\nclass Repo\n{\n    public async Task |Save() { }\n}\n";
    let (ctx, _) = context(&[("Repo.cs", src)]);
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::RenameMethodAccordingToTypeName).is_none());
}

#[tokio::test]
async fn nested_namespace_selection_targets_the_inner_one() {
    let src = "namespace Outer\n{\n    namespace In|ner\n    {\n        class C { }\n    }\n}\n";
    let (ctx, _) = context(&[("Nested.cs", src)]);

    let tree = ctx.tree().unwrap();
    let innermost = tree
        .nodes_at(ctx.selection)
        .into_iter()
        .find(|n| n.kind() == SyntaxKind::NamespaceDeclaration)
        .unwrap();
    assert!(innermost.text().trim_start().starts_with("namespace Inner"));

    // The inner namespace cannot become file scoped and the outer one is
    // not considered.
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::ChangeNamespaceToFileScoped).is_none());
}

#[tokio::test]
async fn invoking_an_action_leaves_other_documents_shared() {
    let shape = "namespace App\n{\n    public class Shape\n    {\n        public int Ar|ea() { return 0; }\n    }\n}\n";
    let other = "namespace App\n{\n    public class Other { }\n}\n";
    let (ctx, ids) = context(&[("Shape.cs", shape), ("Other.cs", other)]);

    let actions = collect_actions(&ctx).await.unwrap();
    let make_virtual = find(&actions, RefactoringId::MakeMemberVirtual).unwrap();
    assert!(ctx.current_document().unwrap().text().contains("public int Area()"));

    let updated = make_virtual.invoke(CancellationToken::new()).await.unwrap();
    assert_eq!(updated.changed_documents(&ctx.solution), vec![ids[0]]);
    assert!(Arc::ptr_eq(
        updated.document(ids[1]).unwrap(),
        ctx.solution.document(ids[1]).unwrap()
    ));
    assert!(updated
        .document(ids[0])
        .unwrap()
        .text()
        .contains("public virtual int Area() { return 0; }"));
}

#[tokio::test]
async fn cancellation_is_distinct_from_no_actions() {
    let (ctx, _) = context(&[("Repo.cs", REPO), ("Service.cs", SERVICE)]);
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(!actions.is_empty());

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        actions[0].invoke(cancel.clone()).await.unwrap_err(),
        ActionError::Cancelled
    );
    let cancelled = ctx.with_cancellation(cancel);
    assert_eq!(collect_actions(&cancelled).await.unwrap_err(), Cancelled);
}

#[tokio::test]
async fn configuration_disables_rules() {
    let config = load_from_str(
        "[refactorings]\nmake_member_virtual = false\nmark-member-as-static = false\n",
    )
    .unwrap();
    let (ctx, _) = context(&[("Repo.cs", REPO), ("Service.cs", SERVICE)]);
    let ctx = ctx.with_config(Arc::new(config));
    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::MakeMemberVirtual).is_none());
    assert!(find(&actions, RefactoringId::MarkMemberAsStatic).is_none());
    assert!(find(&actions, RefactoringId::RenameMethodAccordingToTypeName).is_some());
}

#[tokio::test]
async fn nested_class_member_affects_only_its_own_class() {
    let src = "public class Outer\n{\n    public class Inner\n    {\n        public abstract double Ar|ea();\n    }\n}\n";
    let (ctx, ids) = context(&[("Shapes.cs", src)]);
    let actions = collect_actions(&ctx).await.unwrap();
    let make_abstract = find(&actions, RefactoringId::MarkContainingClassAsAbstract).unwrap();

    let updated = make_abstract.invoke(CancellationToken::new()).await.unwrap();
    let text = updated.document(ids[0]).unwrap().text();
    assert!(text.contains("public abstract class Inner"));
    assert!(text.starts_with("public class Outer"));
}

#[tokio::test]
async fn property_replacement_rewrites_calls_in_other_documents() {
    let shape = "namespace App\n{\n    public class Shape\n    {\n        public int Ar|ea()\n        {\n            return 0;\n        }\n    }\n}\n";
    let user = "namespace App\n{\n    class Printer\n    {\n        string Print(Shape s) => s.Area().ToString();\n    }\n}\n";
    let config = load_from_str("[refactorings]\nreplace_method_with_property = true\n").unwrap();
    let (ctx, ids) = context(&[("Shape.cs", shape), ("Printer.cs", user)]);

    let actions = collect_actions(&ctx).await.unwrap();
    assert!(find(&actions, RefactoringId::ReplaceMethodWithProperty).is_none());

    let ctx = ctx.with_config(Arc::new(config));
    let actions = collect_actions(&ctx).await.unwrap();
    let replace = find(&actions, RefactoringId::ReplaceMethodWithProperty).unwrap();
    assert_eq!(replace.title(), "Replace 'Area' with property");

    let updated = replace.invoke(CancellationToken::new()).await.unwrap();
    assert_eq!(
        updated.document(ids[0]).unwrap().text(),
        "namespace App\n{\n    public class Shape\n    {\n        public int Area\n        {\n            get\n            {\n                return 0;\n            }\n        }\n    }\n}\n"
    );
    assert!(updated
        .document(ids[1])
        .unwrap()
        .text()
        .contains("string Print(Shape s) => s.Area.ToString();"));
}

#[tokio::test]
async fn documentation_is_copied_from_an_interface_in_another_document() {
    let circle = "namespace App\n{\n    public class Circle : IShape\n    {\n        public double Ar|ea() => 3.14;\n    }\n}\n";
    let shape = "namespace App\n{\n    public interface IShape\n    {\n        /// <summary>Surface in square units.</summary>\n        double Area();\n    }\n}\n";
    let (ctx, ids) = context(&[("Circle.cs", circle), ("IShape.cs", shape)]);
    let actions = collect_actions(&ctx).await.unwrap();
    let copy = find(&actions, RefactoringId::CopyDocumentationCommentFromBaseMember).unwrap();
    assert_eq!(copy.title(), "Copy documentation comment from implemented member");

    let updated = copy.invoke(CancellationToken::new()).await.unwrap();
    assert_eq!(updated.changed_documents(&ctx.solution), vec![ids[0]]);
    assert!(updated.document(ids[0]).unwrap().text().contains(
        "    {\n        /// <summary>Surface in square units.</summary>\n        public double Area() => 3.14;"
    ));
}
