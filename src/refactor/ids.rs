use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Stable identifiers of the refactorings, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefactoringId {
    ChangeNamespaceToFileScoped,
    ChangeNamespaceToBlockScoped,
    MarkMemberAsStatic,
    ChangeMethodReturnTypeToVoid,
    MarkContainingClassAsAbstract,
    ReplaceMethodWithProperty,
    UseExpressionBodiedMember,
    MakeMemberAbstract,
    MakeMemberVirtual,
    CopyDocumentationCommentFromBaseMember,
    RenameMethodAccordingToTypeName,
}

impl RefactoringId {
    pub const ALL: [RefactoringId; 11] = [
        RefactoringId::ChangeNamespaceToFileScoped,
        RefactoringId::ChangeNamespaceToBlockScoped,
        RefactoringId::MarkMemberAsStatic,
        RefactoringId::ChangeMethodReturnTypeToVoid,
        RefactoringId::MarkContainingClassAsAbstract,
        RefactoringId::ReplaceMethodWithProperty,
        RefactoringId::UseExpressionBodiedMember,
        RefactoringId::MakeMemberAbstract,
        RefactoringId::MakeMemberVirtual,
        RefactoringId::CopyDocumentationCommentFromBaseMember,
        RefactoringId::RenameMethodAccordingToTypeName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RefactoringId::ChangeNamespaceToFileScoped => "change_namespace_to_file_scoped",
            RefactoringId::ChangeNamespaceToBlockScoped => "change_namespace_to_block_scoped",
            RefactoringId::MarkMemberAsStatic => "mark_member_as_static",
            RefactoringId::ChangeMethodReturnTypeToVoid => "change_method_return_type_to_void",
            RefactoringId::MarkContainingClassAsAbstract => "mark_containing_class_as_abstract",
            RefactoringId::ReplaceMethodWithProperty => "replace_method_with_property",
            RefactoringId::UseExpressionBodiedMember => "use_expression_bodied_member",
            RefactoringId::MakeMemberAbstract => "make_member_abstract",
            RefactoringId::MakeMemberVirtual => "make_member_virtual",
            RefactoringId::CopyDocumentationCommentFromBaseMember => {
                "copy_documentation_comment_from_base_member"
            }
            RefactoringId::RenameMethodAccordingToTypeName => {
                "rename_method_according_to_type_name"
            }
        }
    }

    /// Catalog description; action titles may be more specific.
    pub fn description(self) -> &'static str {
        match self {
            RefactoringId::ChangeNamespaceToFileScoped => "Change to file scoped namespace",
            RefactoringId::ChangeNamespaceToBlockScoped => "Change to block scoped namespace",
            RefactoringId::MarkMemberAsStatic => "Mark member as static",
            RefactoringId::ChangeMethodReturnTypeToVoid => "Change method return type to 'void'",
            RefactoringId::MarkContainingClassAsAbstract => "Mark containing class as abstract",
            RefactoringId::ReplaceMethodWithProperty => "Replace method with property",
            RefactoringId::UseExpressionBodiedMember => "Use expression-bodied member",
            RefactoringId::MakeMemberAbstract => "Make member abstract",
            RefactoringId::MakeMemberVirtual => "Make member virtual",
            RefactoringId::CopyDocumentationCommentFromBaseMember => {
                "Copy documentation comment from base member"
            }
            RefactoringId::RenameMethodAccordingToTypeName => {
                "Rename method according to type name"
            }
        }
    }
}

impl RefactoringId {
    /// Whether a configuration that does not mention the refactoring
    /// enables it.
    pub fn enabled_by_default(self) -> bool {
        !matches!(self, RefactoringId::ReplaceMethodWithProperty)
    }
}

impl fmt::Display for RefactoringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRefactoring {
    pub id: String,
    pub suggestion: Option<&'static str>,
}

impl fmt::Display for UnknownRefactoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown refactoring '{}'", self.id)?;
        if let Some(suggestion) = self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownRefactoring {}

impl FromStr for RefactoringId {
    type Err = UnknownRefactoring;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Some(id) = RefactoringId::ALL
            .iter()
            .find(|id| id.as_str() == normalized)
        {
            return Ok(*id);
        }
        let suggestion = RefactoringId::ALL
            .iter()
            .map(|id| (id.as_str(), strsim::jaro_winkler(id.as_str(), &normalized)))
            .filter(|(_, score)| *score > 0.8)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name);
        Err(UnknownRefactoring {
            id: s.to_string(),
            suggestion,
        })
    }
}
