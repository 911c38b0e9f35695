//! Style diagnostics with automatic fixes.
//!
//! The analyzer reports `SF0001` for namespace declarations that do not
//! follow the configured `namespace_scope_style`. Each diagnostic can be
//! fixed by converting the namespace with the tree rewriter.

pub mod autofix;
pub mod diagnostic;
pub mod namespace_scope;

pub use autofix::{fix_document, try_autofix, try_autofix_all, AutofixResult, DocumentFix, Unfixable};
pub use diagnostic::{Diagnostic, DiagnosticDescriptor, ScopeFix};
pub use namespace_scope::{analyze_document, evaluate, fix_deviant, Evaluation, NamespaceStyle};

/// Diagnostics the analyzer can report.
pub const DESCRIPTORS: &[DiagnosticDescriptor] = &[namespace_scope::DESCRIPTOR];

/// Ids accepted in the `[severity]` table.
pub const KNOWN_DIAGNOSTICS: &[&str] = &[namespace_scope::DESCRIPTOR.id];
