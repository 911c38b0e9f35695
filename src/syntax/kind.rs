use std::fmt;

/// Kinds of tokens and nodes in the C# syntax tree.
///
/// Tokens and nodes share one enum so that a tree element can be
/// classified without knowing whether it is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Tokens
    Identifier,
    NumericLiteral,
    StringLiteral,
    CharLiteral,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    ColonColon,
    LessThan,
    GreaterThan,
    Question,
    Equals,
    FatArrow,
    Star,
    Tilde,
    Operator,
    Unknown,
    EndOfFile,

    // Declaration keywords
    NamespaceKeyword,
    UsingKeyword,
    ClassKeyword,
    StructKeyword,
    InterfaceKeyword,
    EnumKeyword,
    DelegateKeyword,
    EventKeyword,
    OperatorKeyword,
    ImplicitKeyword,
    ExplicitKeyword,

    // Modifiers
    PublicKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    InternalKeyword,
    StaticKeyword,
    AbstractKeyword,
    VirtualKeyword,
    OverrideKeyword,
    SealedKeyword,
    ReadonlyKeyword,
    ExternKeyword,
    NewKeyword,
    UnsafeKeyword,
    ConstKeyword,
    VolatileKeyword,
    FixedKeyword,

    // Type keywords
    VoidKeyword,
    PredefinedTypeKeyword,

    // Statement and expression keywords the rules inspect
    ReturnKeyword,
    ThrowKeyword,
    ThisKeyword,
    BaseKeyword,
    OtherKeyword,

    // Contextual keywords
    AsyncKeyword,
    AwaitKeyword,
    PartialKeyword,
    RecordKeyword,
    RequiredKeyword,
    WhereKeyword,
    YieldKeyword,
    GlobalKeyword,
    AliasKeyword,

    // Nodes
    CompilationUnit,
    ExternAliasDirective,
    UsingDirective,
    AttributeList,
    NamespaceDeclaration,
    FileScopedNamespaceDeclaration,
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    RecordDeclaration,
    EnumDeclaration,
    MethodDeclaration,
    MemberDeclaration,
    IdentifierName,
    GenericName,
    QualifiedName,
    TypeArgumentList,
    PredefinedType,
    ArrayType,
    NullableType,
    PointerType,
    TupleType,
    TypeParameterList,
    ParameterList,
    BaseList,
    ConstraintClause,
    ExplicitInterfaceSpecifier,
    Block,
    ArrowExpressionClause,
    EnumBody,
    Error,
}

impl SyntaxKind {
    /// Map reserved and contextual keyword text to its kind.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        use SyntaxKind::*;
        let kind = match text {
            "namespace" => NamespaceKeyword,
            "using" => UsingKeyword,
            "class" => ClassKeyword,
            "struct" => StructKeyword,
            "interface" => InterfaceKeyword,
            "enum" => EnumKeyword,
            "delegate" => DelegateKeyword,
            "event" => EventKeyword,
            "operator" => OperatorKeyword,
            "implicit" => ImplicitKeyword,
            "explicit" => ExplicitKeyword,
            "public" => PublicKeyword,
            "private" => PrivateKeyword,
            "protected" => ProtectedKeyword,
            "internal" => InternalKeyword,
            "static" => StaticKeyword,
            "abstract" => AbstractKeyword,
            "virtual" => VirtualKeyword,
            "override" => OverrideKeyword,
            "sealed" => SealedKeyword,
            "readonly" => ReadonlyKeyword,
            "extern" => ExternKeyword,
            "new" => NewKeyword,
            "unsafe" => UnsafeKeyword,
            "const" => ConstKeyword,
            "volatile" => VolatileKeyword,
            "fixed" => FixedKeyword,
            "void" => VoidKeyword,
            "bool" | "byte" | "sbyte" | "char" | "decimal" | "double" | "float" | "int"
            | "uint" | "long" | "ulong" | "short" | "ushort" | "object" | "string" => {
                PredefinedTypeKeyword
            }
            "return" => ReturnKeyword,
            "throw" => ThrowKeyword,
            "this" => ThisKeyword,
            "base" => BaseKeyword,
            "as" | "break" | "case" | "catch" | "checked" | "continue" | "default" | "do"
            | "else" | "false" | "finally" | "for" | "foreach" | "goto" | "if" | "in" | "is"
            | "lock" | "null" | "out" | "params" | "ref" | "sizeof" | "stackalloc" | "switch"
            | "true" | "try" | "typeof" | "unchecked" | "while" => OtherKeyword,
            "async" => AsyncKeyword,
            "await" => AwaitKeyword,
            "partial" => PartialKeyword,
            "record" => RecordKeyword,
            "required" => RequiredKeyword,
            "where" => WhereKeyword,
            "yield" => YieldKeyword,
            "global" => GlobalKeyword,
            "alias" => AliasKeyword,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_node(self) -> bool {
        self >= SyntaxKind::CompilationUnit
    }

    pub fn is_token(self) -> bool {
        !self.is_node()
    }

    /// Contextual keywords may stand in for identifiers.
    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::AsyncKeyword
                | SyntaxKind::AwaitKeyword
                | SyntaxKind::PartialKeyword
                | SyntaxKind::RecordKeyword
                | SyntaxKind::RequiredKeyword
                | SyntaxKind::WhereKeyword
                | SyntaxKind::YieldKeyword
                | SyntaxKind::GlobalKeyword
                | SyntaxKind::AliasKeyword
        )
    }

    pub fn is_identifier_like(self) -> bool {
        self == SyntaxKind::Identifier || self.is_contextual_keyword()
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::InternalKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::VirtualKeyword
                | SyntaxKind::OverrideKeyword
                | SyntaxKind::SealedKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::ExternKeyword
                | SyntaxKind::NewKeyword
                | SyntaxKind::UnsafeKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::VolatileKeyword
                | SyntaxKind::FixedKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::PartialKeyword
                | SyntaxKind::RequiredKeyword
        )
    }

    pub fn is_access_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::InternalKeyword
        )
    }

    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDeclaration
                | SyntaxKind::StructDeclaration
                | SyntaxKind::InterfaceDeclaration
                | SyntaxKind::RecordDeclaration
                | SyntaxKind::EnumDeclaration
        )
    }

    pub fn is_namespace_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration
        )
    }

    pub fn is_name(self) -> bool {
        matches!(
            self,
            SyntaxKind::IdentifierName | SyntaxKind::GenericName | SyntaxKind::QualifiedName
        )
    }

    pub fn is_type(self) -> bool {
        self.is_name()
            || matches!(
                self,
                SyntaxKind::PredefinedType
                    | SyntaxKind::ArrayType
                    | SyntaxKind::NullableType
                    | SyntaxKind::PointerType
                    | SyntaxKind::TupleType
            )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kinds of trivia attached to tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    DocComment,
    /// A whole preprocessor line such as `#if DEBUG` or `#region`.
    Directive,
}

impl TriviaKind {
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TriviaKind::SingleLineComment | TriviaKind::MultiLineComment | TriviaKind::DocComment
        )
    }

    /// Trivia that carries meaning and must survive a rewrite.
    pub fn is_significant(self) -> bool {
        self.is_comment() || self == TriviaKind::Directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(
            SyntaxKind::from_keyword("namespace"),
            Some(SyntaxKind::NamespaceKeyword)
        );
        assert_eq!(
            SyntaxKind::from_keyword("string"),
            Some(SyntaxKind::PredefinedTypeKeyword)
        );
        assert_eq!(SyntaxKind::from_keyword("Task"), None);
        assert_eq!(SyntaxKind::from_keyword("var"), None);
    }

    #[test]
    fn contextual_keywords_are_identifier_like() {
        assert!(SyntaxKind::AsyncKeyword.is_identifier_like());
        assert!(SyntaxKind::Identifier.is_identifier_like());
        assert!(!SyntaxKind::ClassKeyword.is_identifier_like());
    }

    #[test]
    fn node_token_partition() {
        assert!(SyntaxKind::CompilationUnit.is_node());
        assert!(SyntaxKind::Error.is_node());
        assert!(SyntaxKind::AliasKeyword.is_token());
        assert!(SyntaxKind::EndOfFile.is_token());
    }
}
