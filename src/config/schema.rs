use crate::refactor::RefactoringId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Contents of a `sharpfix.toml` file.
///
/// ```toml
/// [options]
/// namespace_scope_style = "file"
///
/// [refactorings]
/// make_member_virtual = false
///
/// [severity]
/// SF0001 = "error"
/// ```
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Analyzer options, e.g. `namespace_scope_style`.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Refactoring enablement; refactorings not listed keep their default.
    #[serde(default)]
    pub refactorings: BTreeMap<String, bool>,
    /// Severity overrides by diagnostic id.
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for key in self.options.keys() {
            if key.trim().is_empty() {
                issues.push(ValidationIssue::EmptyOptionKey);
            }
        }

        for id in self.refactorings.keys() {
            if let Err(error) = id.parse::<RefactoringId>() {
                issues.push(ValidationIssue::UnknownRefactoring {
                    id: error.id,
                    suggestion: error.suggestion,
                });
            }
        }

        for id in self.severity.keys() {
            if !crate::analysis::KNOWN_DIAGNOSTICS.contains(&id.as_str()) {
                issues.push(ValidationIssue::UnknownDiagnostic { id: id.clone() });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Raw value of an analyzer option.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn is_refactoring_enabled(&self, id: RefactoringId) -> bool {
        self.refactorings
            .iter()
            .find(|(key, _)| key.parse::<RefactoringId>().ok() == Some(id))
            .map(|(_, enabled)| *enabled)
            .unwrap_or_else(|| id.enabled_by_default())
    }

    pub fn with_refactoring(mut self, id: RefactoringId, enabled: bool) -> Self {
        self.refactorings.insert(id.as_str().to_string(), enabled);
        self
    }

    pub fn severity_for(&self, diagnostic_id: &str) -> Option<Severity> {
        self.severity.get(diagnostic_id).copied()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Hidden => "hidden",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyOptionKey,
    UnknownRefactoring {
        id: String,
        suggestion: Option<&'static str>,
    },
    UnknownDiagnostic {
        id: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyOptionKey => write!(f, "option with an empty key"),
            ValidationIssue::UnknownRefactoring { id, suggestion } => match suggestion {
                Some(s) => write!(f, "unknown refactoring '{id}' (did you mean '{s}'?)"),
                None => write!(f, "unknown refactoring '{id}'"),
            },
            ValidationIssue::UnknownDiagnostic { id } => {
                write!(f, "severity set for unknown diagnostic '{id}'")
            }
        }
    }
}
