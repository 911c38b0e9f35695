//! Symbol model answered by a [`SemanticModel`](super::SemanticModel).

use crate::solution::DocumentId;
use crate::text::TextSpan;
use std::fmt;

/// A span inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub document: DocumentId,
    pub span: TextSpan,
}

impl Location {
    pub fn new(document: DocumentId, span: TextSpan) -> Self {
        Self { document, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Method,
    NamedType,
}

/// A declared member or type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Metadata name of the containing type, e.g. `App.Outer+Inner`1`.
    pub containing_type: Option<String>,
    pub containing_namespace: Option<String>,
    pub is_async: bool,
    pub is_static: bool,
    /// Identifier spans of every declaration (several for partial parts).
    pub declarations: Vec<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Array,
    Pointer,
    TypeParameter,
    Tuple,
    Dynamic,
    Error,
}

/// Predefined types that have a keyword spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialType {
    None,
    Void,
    Object,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Decimal,
    Single,
    Double,
    String,
}

impl SpecialType {
    /// Keyword spelling to special type.
    pub fn from_keyword(keyword: &str) -> Option<SpecialType> {
        let special = match keyword {
            "void" => SpecialType::Void,
            "object" => SpecialType::Object,
            "bool" => SpecialType::Boolean,
            "char" => SpecialType::Char,
            "sbyte" => SpecialType::SByte,
            "byte" => SpecialType::Byte,
            "short" => SpecialType::Int16,
            "ushort" => SpecialType::UInt16,
            "int" => SpecialType::Int32,
            "uint" => SpecialType::UInt32,
            "long" => SpecialType::Int64,
            "ulong" => SpecialType::UInt64,
            "decimal" => SpecialType::Decimal,
            "float" => SpecialType::Single,
            "double" => SpecialType::Double,
            "string" => SpecialType::String,
            _ => return None,
        };
        Some(special)
    }

    /// Runtime type name in the `System` namespace.
    pub fn runtime_name(self) -> Option<&'static str> {
        let name = match self {
            SpecialType::None => return None,
            SpecialType::Void => "Void",
            SpecialType::Object => "Object",
            SpecialType::Boolean => "Boolean",
            SpecialType::Char => "Char",
            SpecialType::SByte => "SByte",
            SpecialType::Byte => "Byte",
            SpecialType::Int16 => "Int16",
            SpecialType::UInt16 => "UInt16",
            SpecialType::Int32 => "Int32",
            SpecialType::UInt32 => "UInt32",
            SpecialType::Int64 => "Int64",
            SpecialType::UInt64 => "UInt64",
            SpecialType::Decimal => "Decimal",
            SpecialType::Single => "Single",
            SpecialType::Double => "Double",
            SpecialType::String => "String",
        };
        Some(name)
    }

    pub fn from_runtime_name(name: &str) -> SpecialType {
        match name {
            "Void" => SpecialType::Void,
            "Object" => SpecialType::Object,
            "Boolean" => SpecialType::Boolean,
            "Char" => SpecialType::Char,
            "SByte" => SpecialType::SByte,
            "Byte" => SpecialType::Byte,
            "Int16" => SpecialType::Int16,
            "UInt16" => SpecialType::UInt16,
            "Int32" => SpecialType::Int32,
            "UInt32" => SpecialType::UInt32,
            "Int64" => SpecialType::Int64,
            "UInt64" => SpecialType::UInt64,
            "Decimal" => SpecialType::Decimal,
            "Single" => SpecialType::Single,
            "Double" => SpecialType::Double,
            "String" => SpecialType::String,
            _ => SpecialType::None,
        }
    }

    pub fn is_reference_type(self) -> bool {
        matches!(self, SpecialType::Object | SpecialType::String)
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    pub name: String,
    pub namespace: Option<String>,
    /// Metadata name of the containing type for nested types.
    pub containing_type: Option<String>,
    pub kind: TypeKind,
    pub special: SpecialType,
    /// Number of type parameters of the definition.
    pub arity: usize,
    /// Arguments of a constructed generic type; empty for definitions.
    pub type_arguments: Vec<TypeSymbol>,
    /// Element type of arrays and pointers.
    pub element_type: Option<Box<TypeSymbol>>,
}

impl TypeSymbol {
    pub fn named(namespace: Option<&str>, name: &str, arity: usize, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            containing_type: None,
            kind,
            special: SpecialType::None,
            arity,
            type_arguments: Vec::new(),
            element_type: None,
        }
    }

    pub fn special(special: SpecialType) -> Self {
        let name = special.runtime_name().unwrap_or("Object");
        let kind = if special.is_reference_type() {
            TypeKind::Class
        } else {
            TypeKind::Struct
        };
        Self {
            special,
            ..Self::named(Some("System"), name, 0, kind)
        }
    }

    pub fn type_parameter(name: &str) -> Self {
        Self::named(None, name, 0, TypeKind::TypeParameter)
    }

    pub fn array(element: TypeSymbol) -> Self {
        Self {
            element_type: Some(Box::new(element)),
            ..Self::named(Some("System"), "Array", 0, TypeKind::Array)
        }
    }

    /// Construct this definition with `arguments`.
    pub fn construct(&self, arguments: Vec<TypeSymbol>) -> Self {
        Self {
            type_arguments: arguments,
            ..self.clone()
        }
    }

    /// `Task`1` style name.
    pub fn metadata_name(&self) -> String {
        if self.arity > 0 {
            format!("{}`{}", self.name, self.arity)
        } else {
            self.name.clone()
        }
    }

    /// Namespace-, containing-type- and arity-qualified name.
    pub fn full_metadata_name(&self) -> String {
        let prefix = match (&self.containing_type, &self.namespace) {
            (Some(outer), _) => format!("{outer}+"),
            (None, Some(ns)) if !ns.is_empty() => format!("{ns}."),
            _ => String::new(),
        };
        format!("{prefix}{}", self.metadata_name())
    }

    pub fn is_constructed(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// The generic definition this type was constructed from.
    pub fn constructed_from(&self) -> Option<TypeSymbol> {
        self.is_constructed().then(|| Self {
            type_arguments: Vec::new(),
            ..self.clone()
        })
    }

    /// Same definition: namespace, containing type, name and arity agree.
    pub fn same_definition(&self, other: &TypeSymbol) -> bool {
        self.full_metadata_name() == other.full_metadata_name()
    }

    pub fn is_void(&self) -> bool {
        self.special == SpecialType::Void
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.element_type) {
            (TypeKind::Array, Some(element)) => return write!(f, "{element}[]"),
            (TypeKind::Pointer, Some(element)) => return write!(f, "{element}*"),
            _ => {}
        }
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Types the core logic asks for by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownType {
    Task,
    TaskOfT,
    ValueTask,
    ValueTaskOfT,
    NullableOfT,
}

impl WellKnownType {
    pub fn symbol(self) -> TypeSymbol {
        match self {
            WellKnownType::Task => {
                TypeSymbol::named(Some("System.Threading.Tasks"), "Task", 0, TypeKind::Class)
            }
            WellKnownType::TaskOfT => {
                TypeSymbol::named(Some("System.Threading.Tasks"), "Task", 1, TypeKind::Class)
            }
            WellKnownType::ValueTask => TypeSymbol::named(
                Some("System.Threading.Tasks"),
                "ValueTask",
                0,
                TypeKind::Struct,
            ),
            WellKnownType::ValueTaskOfT => TypeSymbol::named(
                Some("System.Threading.Tasks"),
                "ValueTask",
                1,
                TypeKind::Struct,
            ),
            WellKnownType::NullableOfT => {
                TypeSymbol::named(Some("System"), "Nullable", 1, TypeKind::Struct)
            }
        }
    }
}
