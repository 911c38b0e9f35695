//! `SF0001`: keep namespace declarations in one scope style.
//!
//! With `namespace_scope_style = "file"` every block namespace is
//! reported; with `"block"` every file-scoped one is. Any other value, or
//! no value, turns the check off.

use super::diagnostic::{Diagnostic, DiagnosticDescriptor, ScopeFix};
use crate::cancel::{self, CancellationToken, Cancelled};
use crate::config::{Config, Severity};
use crate::rewrite::namespace::{demote_to_flat, promote_to_wrapper};
use crate::rewrite::RewriteError;
use crate::syntax::ast::{AstNode, FileScopedNamespaceDecl};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use std::str::FromStr;
use tracing::debug;

pub const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "SF0001",
    title: "Normalize namespace scope style",
    default_severity: Severity::Warning,
};

/// Option read from `[options]`.
pub const OPTION_KEY: &str = "namespace_scope_style";

const TO_FILE_SCOPED: &str = "Change namespace declaration to file scoped.";
const TO_BLOCK_SCOPED: &str = "Change namespace declaration to block scoped.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceStyle {
    FileScoped,
    BlockScoped,
}

impl FromStr for NamespaceStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("file") {
            Ok(NamespaceStyle::FileScoped)
        } else if value.eq_ignore_ascii_case("block") {
            Ok(NamespaceStyle::BlockScoped)
        } else {
            Err(())
        }
    }
}

impl NamespaceStyle {
    /// The configured style, `None` when the check is off.
    pub fn from_config(config: &Config) -> Option<Self> {
        config.get(OPTION_KEY)?.parse().ok()
    }
}

/// Outcome of checking a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Compliant,
    Deviant(Diagnostic),
}

/// Check one node against the configured style. Nodes other than
/// namespace declarations are always compliant.
pub fn evaluate(node: &SyntaxNode, config: &Config) -> Evaluation {
    let Some(style) = NamespaceStyle::from_config(config) else {
        return Evaluation::Compliant;
    };
    let (span, message, fix) = match (node.kind(), style) {
        (SyntaxKind::NamespaceDeclaration, NamespaceStyle::FileScoped) => {
            (node.span(), TO_FILE_SCOPED, ScopeFix::ToFileScoped)
        }
        (SyntaxKind::FileScopedNamespaceDeclaration, NamespaceStyle::BlockScoped) => {
            let Some(decl) = FileScopedNamespaceDecl::cast(node.clone()) else {
                return Evaluation::Compliant;
            };
            (decl.extent(), TO_BLOCK_SCOPED, ScopeFix::ToBlockScoped)
        }
        _ => return Evaluation::Compliant,
    };
    Evaluation::Deviant(Diagnostic {
        id: DESCRIPTOR.id,
        message: message.to_string(),
        severity: DESCRIPTOR.severity(config),
        span,
        kind: node.kind(),
        fix,
    })
}

/// Evaluate every namespace declaration of `tree`, outermost first.
/// Nested namespaces are checked on their own.
pub fn analyze_document(
    tree: &SyntaxTree,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>, Cancelled> {
    let mut diagnostics = Vec::new();
    if NamespaceStyle::from_config(config).is_none() {
        return Ok(diagnostics);
    }
    for node in tree
        .root()
        .descendants()
        .filter(|n| n.kind().is_namespace_declaration())
    {
        cancel::check(cancel)?;
        if let Evaluation::Deviant(diagnostic) = evaluate(&node, config) {
            diagnostics.push(diagnostic);
        }
    }
    debug!(count = diagnostics.len(), "namespace style analyzed");
    Ok(diagnostics)
}

/// The node `diagnostic` was reported on, if `tree` still has it.
fn flagged_node(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Option<SyntaxNode> {
    tree.root()
        .descendants()
        .find(|n| n.kind() == diagnostic.kind && n.span().start() == diagnostic.node_start())
}

/// Convert the namespace a diagnostic was reported on.
///
/// Fails with a precondition error when the conversion is not legal, e.g.
/// a nested block namespace cannot become file scoped.
pub fn fix_deviant(tree: &SyntaxTree, diagnostic: &Diagnostic) -> Result<SyntaxTree, RewriteError> {
    let node = flagged_node(tree, diagnostic).ok_or(RewriteError::Stale {
        kind: diagnostic.kind,
        span: diagnostic.span,
    })?;
    match diagnostic.fix {
        ScopeFix::ToFileScoped => demote_to_flat(tree, &node),
        ScopeFix::ToBlockScoped => promote_to_wrapper(tree, &node),
    }
}
