//! Diagnostics reported by the style analyzer.

use crate::config::{Config, Severity};
use crate::syntax::SyntaxKind;
use crate::text::{LineColumn, LineIndex, TextSpan};
use serde::Serialize;
use std::fmt;

/// Static description of a diagnostic id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    /// Stable id, e.g. `SF0001`
    pub id: &'static str,
    pub title: &'static str,
    pub default_severity: Severity,
}

impl DiagnosticDescriptor {
    /// Severity after applying the `[severity]` overrides of `config`.
    pub fn severity(&self, config: &Config) -> Severity {
        config
            .severity_for(self.id)
            .unwrap_or(self.default_severity)
    }
}

/// Which way a deviant namespace has to be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFix {
    /// Block namespace to file scoped
    ToFileScoped,
    /// File-scoped namespace to block
    ToBlockScoped,
}

/// A single reported deviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: &'static str,
    pub message: String,
    pub severity: Severity,
    /// Region covered by the deviation (the whole governed extent for
    /// file-scoped namespaces)
    pub span: TextSpan,
    /// Kind of the flagged node
    #[serde(skip)]
    pub kind: SyntaxKind,
    pub fix: ScopeFix,
}

impl Diagnostic {
    /// Start of the flagged node, which is also the start of `span`.
    pub fn node_start(&self) -> usize {
        self.span.start()
    }

    pub fn location(&self, index: &LineIndex) -> LineColumn {
        index.line_column(self.span.start())
    }

    /// `path:line:col: severity[ID]: message`, the format the CLI prints.
    pub fn render(&self, path: &str, index: &LineIndex) -> String {
        let at = self.location(index);
        format!(
            "{path}:{}:{}: {}[{}]: {}",
            at.line, at.column, self.severity, self.id, self.message
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] at {}: {}", self.severity, self.id, self.span, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0001",
        title: "Normalize namespace scope style",
        default_severity: Severity::Warning,
    };

    #[test]
    fn severity_override() {
        assert_eq!(DESCRIPTOR.severity(&Config::default()), Severity::Warning);
        let mut config = Config::default();
        config.severity.insert("SF0001".into(), Severity::Error);
        assert_eq!(DESCRIPTOR.severity(&config), Severity::Error);
    }

    #[test]
    fn render_uses_one_based_positions() {
        let diagnostic = Diagnostic {
            id: "SF0001",
            message: "Change namespace declaration to file scoped.".into(),
            severity: Severity::Warning,
            span: TextSpan::new(10, 20),
            kind: SyntaxKind::NamespaceDeclaration,
            fix: ScopeFix::ToFileScoped,
        };
        let index = LineIndex::new("using System;\nnamespace A { }\n");
        assert_eq!(
            diagnostic.render("A.cs", &index),
            "A.cs:1:11: warning[SF0001]: Change namespace declaration to file scoped."
        );
    }
}
