//! Name-resolving semantic model over a [`Solution`].
//!
//! Types are resolved from declarations found in the solution and from a
//! table of common framework types. Resolution follows the enclosing type
//! chain, the enclosing namespaces, the file's `using` directives and
//! finally the framework table by simple name. Member references are
//! found by name: across the whole solution when the method name is
//! declared once, otherwise within the declaring type.

use super::errors::SemanticError;
use super::symbols::{Location, SpecialType, Symbol, SymbolKind, TypeKind, TypeSymbol, WellKnownType};
use super::SemanticModel;
use crate::cancel::{self, CancellationToken};
use crate::solution::{Document, DocumentId, Solution};
use crate::syntax::ast::{
    token_text, AstNode, FileScopedNamespaceDecl, MethodDecl, NamespaceDecl, TypeDecl,
};
use crate::syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Framework types resolvable without a declaration in the solution.
const FRAMEWORK_TYPES: &[(&str, &str, usize, TypeKind)] = &[
    ("System", "Object", 0, TypeKind::Class),
    ("System", "String", 0, TypeKind::Class),
    ("System", "Boolean", 0, TypeKind::Struct),
    ("System", "Char", 0, TypeKind::Struct),
    ("System", "SByte", 0, TypeKind::Struct),
    ("System", "Byte", 0, TypeKind::Struct),
    ("System", "Int16", 0, TypeKind::Struct),
    ("System", "UInt16", 0, TypeKind::Struct),
    ("System", "Int32", 0, TypeKind::Struct),
    ("System", "UInt32", 0, TypeKind::Struct),
    ("System", "Int64", 0, TypeKind::Struct),
    ("System", "UInt64", 0, TypeKind::Struct),
    ("System", "Decimal", 0, TypeKind::Struct),
    ("System", "Single", 0, TypeKind::Struct),
    ("System", "Double", 0, TypeKind::Struct),
    ("System", "Nullable", 1, TypeKind::Struct),
    ("System", "DateTime", 0, TypeKind::Struct),
    ("System", "DateTimeOffset", 0, TypeKind::Struct),
    ("System", "TimeSpan", 0, TypeKind::Struct),
    ("System", "Guid", 0, TypeKind::Struct),
    ("System", "Uri", 0, TypeKind::Class),
    ("System", "Version", 0, TypeKind::Class),
    ("System", "Type", 0, TypeKind::Class),
    ("System", "Exception", 0, TypeKind::Class),
    ("System", "IDisposable", 0, TypeKind::Interface),
    ("System.Threading", "CancellationToken", 0, TypeKind::Struct),
    ("System.Threading.Tasks", "Task", 0, TypeKind::Class),
    ("System.Threading.Tasks", "Task", 1, TypeKind::Class),
    ("System.Threading.Tasks", "ValueTask", 0, TypeKind::Struct),
    ("System.Threading.Tasks", "ValueTask", 1, TypeKind::Struct),
    ("System.Collections", "IEnumerable", 0, TypeKind::Interface),
    ("System.Collections.Generic", "IEnumerable", 1, TypeKind::Interface),
    ("System.Collections.Generic", "ICollection", 1, TypeKind::Interface),
    ("System.Collections.Generic", "IList", 1, TypeKind::Interface),
    ("System.Collections.Generic", "IReadOnlyCollection", 1, TypeKind::Interface),
    ("System.Collections.Generic", "IReadOnlyList", 1, TypeKind::Interface),
    ("System.Collections.Generic", "ISet", 1, TypeKind::Interface),
    ("System.Collections.Generic", "List", 1, TypeKind::Class),
    ("System.Collections.Generic", "HashSet", 1, TypeKind::Class),
    ("System.Collections.Generic", "Queue", 1, TypeKind::Class),
    ("System.Collections.Generic", "Stack", 1, TypeKind::Class),
    ("System.Collections.Generic", "Dictionary", 2, TypeKind::Class),
    ("System.Collections.Generic", "IDictionary", 2, TypeKind::Interface),
    ("System.Collections.Generic", "IReadOnlyDictionary", 2, TypeKind::Interface),
    ("System.Collections.Generic", "KeyValuePair", 2, TypeKind::Struct),
    ("System.IO", "Stream", 0, TypeKind::Class),
    ("System.IO", "FileInfo", 0, TypeKind::Class),
    ("System.IO", "DirectoryInfo", 0, TypeKind::Class),
    ("System.Text", "StringBuilder", 0, TypeKind::Class),
];

struct TypeEntry {
    symbol: TypeSymbol,
    type_parameters: Vec<String>,
    parts: Vec<(DocumentId, SyntaxNode)>,
}

/// Default [`SemanticModel`] backed by an immutable [`Solution`].
pub struct WorkspaceModel {
    solution: Solution,
    types: HashMap<String, TypeEntry>,
    framework: HashMap<String, TypeSymbol>,
}

impl WorkspaceModel {
    pub fn new(solution: Solution) -> Self {
        let mut types: HashMap<String, TypeEntry> = HashMap::new();
        for document in solution.documents() {
            for decl in document
                .tree()
                .root()
                .descendants()
                .filter_map(TypeDecl::cast)
            {
                let symbol = declared_type(&decl);
                let entry = types
                    .entry(symbol.full_metadata_name())
                    .or_insert_with(|| TypeEntry {
                        type_parameters: type_parameter_names(decl.syntax()),
                        symbol,
                        parts: Vec::new(),
                    });
                entry.parts.push((document.id(), decl.syntax().clone()));
            }
        }

        let framework = FRAMEWORK_TYPES
            .iter()
            .map(|(ns, name, arity, kind)| {
                let mut symbol = TypeSymbol::named(Some(ns), name, *arity, *kind);
                symbol.special = SpecialType::from_runtime_name(name);
                (symbol.full_metadata_name(), symbol)
            })
            .collect();

        debug!(types = types.len(), "indexed solution types");
        Self {
            solution,
            types,
            framework,
        }
    }

    pub fn shared(solution: Solution) -> Arc<Self> {
        Arc::new(Self::new(solution))
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    fn document(&self, id: DocumentId) -> Result<&Arc<Document>, SemanticError> {
        self.solution
            .document(id)
            .ok_or(SemanticError::UnknownDocument(id))
    }

    fn lookup(&self, key: &str) -> Option<TypeSymbol> {
        self.types
            .get(key)
            .map(|entry| entry.symbol.clone())
            .or_else(|| self.framework.get(key).cloned())
    }

    fn resolve(&self, document: &Document, node: &SyntaxNode) -> Option<TypeSymbol> {
        match node.kind() {
            SyntaxKind::PredefinedType => {
                let keyword = node.first_token()?;
                SpecialType::from_keyword(keyword.text()).map(TypeSymbol::special)
            }
            SyntaxKind::ArrayType => {
                let element = self.resolve(document, &node.children().next()?)?;
                Some(TypeSymbol::array(element))
            }
            SyntaxKind::PointerType => {
                let element = self.resolve(document, &node.children().next()?)?;
                Some(TypeSymbol {
                    element_type: Some(Box::new(element)),
                    ..TypeSymbol::named(None, "Pointer", 0, TypeKind::Pointer)
                })
            }
            SyntaxKind::NullableType => {
                let inner = self.resolve(document, &node.children().next()?)?;
                if inner.is_value_type() {
                    Some(WellKnownType::NullableOfT.symbol().construct(vec![inner]))
                } else {
                    Some(inner)
                }
            }
            SyntaxKind::TupleType => {
                let arity = node.children().count();
                Some(TypeSymbol::named(
                    Some("System"),
                    "ValueTuple",
                    arity,
                    TypeKind::Tuple,
                ))
            }
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                let (name, arguments) = self.name_parts(document, node)?;
                let definition = self.resolve_simple(node, &name, arguments.len())?;
                Some(construct(definition, arguments))
            }
            SyntaxKind::QualifiedName => self.resolve_qualified(document, node),
            _ => None,
        }
    }

    /// Identifier and resolved type arguments of a simple name.
    fn name_parts(
        &self,
        document: &Document,
        node: &SyntaxNode,
    ) -> Option<(String, Vec<TypeSymbol>)> {
        let name = node
            .child_tokens()
            .find(|t| t.kind().is_identifier_like())?
            .text()
            .to_string();
        let mut arguments = Vec::new();
        if let Some(list) = node.first_child(SyntaxKind::TypeArgumentList) {
            for argument in list.children() {
                arguments.push(self.resolve(document, &argument)?);
            }
        }
        Some((name, arguments))
    }

    fn resolve_simple(&self, context: &SyntaxNode, name: &str, arity: usize) -> Option<TypeSymbol> {
        if arity == 0 && name == "dynamic" {
            return Some(TypeSymbol::named(None, "dynamic", 0, TypeKind::Dynamic));
        }
        let metadata = metadata_name(name, arity);

        for ancestor in context.ancestors() {
            let declares_type_parameters = ancestor.kind() == SyntaxKind::MethodDeclaration
                || ancestor.kind().is_type_declaration();
            if arity == 0
                && declares_type_parameters
                && type_parameter_names(&ancestor).iter().any(|p| p == name)
            {
                return Some(TypeSymbol::type_parameter(name));
            }
            if let Some(decl) = TypeDecl::cast(ancestor.clone()) {
                let outer = declared_type(&decl).full_metadata_name();
                if let Some(found) = self.lookup(&format!("{outer}+{metadata}")) {
                    return Some(found);
                }
            }
        }

        let namespace = enclosing_namespace(context).unwrap_or_default();
        let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
        for depth in (0..=segments.len()).rev() {
            let key = qualify(&segments[..depth].join("."), &metadata);
            if let Some(found) = self.lookup(&key) {
                return Some(found);
            }
        }

        for using in usings_in_scope(context) {
            match using {
                Using::Namespace(ns) => {
                    if let Some(found) = self.lookup(&qualify(&ns, &metadata)) {
                        return Some(found);
                    }
                }
                Using::Alias { alias, target } if alias == name && arity == 0 => {
                    if let Some(found) = self.lookup(&target) {
                        return Some(found);
                    }
                }
                Using::Alias { .. } => {}
            }
        }

        let mut candidates = self
            .framework
            .values()
            .filter(|t| t.name == name && t.arity == arity);
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only.clone()),
            _ => None,
        }
    }

    fn resolve_qualified(&self, document: &Document, node: &SyntaxNode) -> Option<TypeSymbol> {
        let mut children = node.children();
        let left = children.next()?;
        let right = children.last()?;
        let (name, arguments) = self.name_parts(document, &right)?;
        let metadata = metadata_name(&name, arguments.len());

        let qualifier = token_text(&left);
        let qualifier = qualifier.strip_prefix("global::").unwrap_or(&qualifier);
        if let Some(found) = self.lookup(&qualify(qualifier, &metadata)) {
            return Some(construct(found, arguments));
        }
        let namespace = enclosing_namespace(node).unwrap_or_default();
        let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
        for depth in (1..=segments.len()).rev() {
            let prefix = qualify(&segments[..depth].join("."), qualifier);
            if let Some(found) = self.lookup(&qualify(&prefix, &metadata)) {
                return Some(construct(found, arguments));
            }
        }
        // `Outer.Inner` where `Outer` is itself a type.
        let outer = self.resolve(document, &left)?;
        let found = self.lookup(&format!("{}+{metadata}", outer.full_metadata_name()))?;
        Some(construct(found, arguments))
    }

    fn containing_entry(&self, symbol: &Symbol) -> Result<&TypeEntry, SemanticError> {
        let key = symbol
            .containing_type
            .as_deref()
            .ok_or_else(|| SemanticError::UnknownSymbol(symbol.name.clone()))?;
        self.types
            .get(key)
            .ok_or_else(|| SemanticError::UnknownSymbol(key.to_string()))
    }
}

fn construct(definition: TypeSymbol, arguments: Vec<TypeSymbol>) -> TypeSymbol {
    if arguments.is_empty() {
        definition
    } else {
        definition.construct(arguments)
    }
}

fn metadata_name(name: &str, arity: usize) -> String {
    if arity > 0 {
        format!("{name}`{arity}")
    } else {
        name.to_string()
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Dotted namespace enclosing `node`, counting a file-scoped declaration
/// earlier in the same unit.
pub fn enclosing_namespace(node: &SyntaxNode) -> Option<String> {
    let mut parts = Vec::new();
    for ancestor in node.ancestors().skip(1) {
        if let Some(name) = NamespaceDecl::cast(ancestor).and_then(|ns| ns.name()) {
            parts.push(token_text(&name));
        }
    }
    let root = node.root();
    let file_scoped = root
        .children()
        .filter_map(FileScopedNamespaceDecl::cast)
        .find(|ns| ns.syntax().span().start() <= node.span().start());
    if let Some(name) = file_scoped.and_then(|ns| ns.name()) {
        parts.push(token_text(&name));
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}

/// The definition symbol declared by a type declaration.
pub fn declared_type(decl: &TypeDecl) -> TypeSymbol {
    let kind = match decl.kind() {
        SyntaxKind::InterfaceDeclaration => TypeKind::Interface,
        SyntaxKind::EnumDeclaration => TypeKind::Enum,
        _ if decl.is_struct() => TypeKind::Struct,
        _ => TypeKind::Class,
    };
    let name = decl.name().unwrap_or_default();
    let arity = type_parameter_names(decl.syntax()).len();
    let mut symbol = TypeSymbol::named(None, &name, arity, kind);
    match decl.containing_type() {
        Some(outer) => {
            let outer = declared_type(&outer);
            symbol.namespace = outer.namespace.clone();
            symbol.containing_type = Some(outer.full_metadata_name());
        }
        None => symbol.namespace = enclosing_namespace(decl.syntax()),
    }
    symbol
}

/// Names declared by a type parameter list on `node`.
fn type_parameter_names(node: &SyntaxNode) -> Vec<String> {
    let Some(list) = node.first_child(SyntaxKind::TypeParameterList) else {
        return Vec::new();
    };
    let tokens = list.tokens();
    let mut names = Vec::new();
    let mut brackets = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind() {
            SyntaxKind::OpenBracket => brackets += 1,
            SyntaxKind::CloseBracket => brackets = brackets.saturating_sub(1),
            kind if kind.is_identifier_like() && brackets == 0 => {
                let next = tokens.get(i + 1).map(|t| t.kind());
                if matches!(next, Some(SyntaxKind::Comma | SyntaxKind::GreaterThan)) {
                    names.push(token.text().to_string());
                }
            }
            _ => {}
        }
    }
    names
}

enum Using {
    Namespace(String),
    Alias { alias: String, target: String },
}

/// `using` directives visible from `node`: those of the unit and of every
/// enclosing namespace block. `using static` is ignored.
fn usings_in_scope(node: &SyntaxNode) -> Vec<Using> {
    let mut scopes: Vec<SyntaxNode> = node
        .ancestors()
        .filter(|n| n.kind() == SyntaxKind::NamespaceDeclaration)
        .collect();
    scopes.push(node.root());
    let mut out = Vec::new();
    for scope in scopes {
        for directive in scope
            .children()
            .filter(|n| n.kind() == SyntaxKind::UsingDirective)
        {
            let tokens = directive.tokens();
            if tokens.iter().any(|t| t.kind() == SyntaxKind::StaticKeyword) {
                continue;
            }
            let text: String = tokens
                .iter()
                .skip_while(|t| t.kind() == SyntaxKind::GlobalKeyword)
                .filter(|t| !matches!(t.kind(), SyntaxKind::UsingKeyword | SyntaxKind::Semicolon))
                .map(|t| t.text())
                .collect();
            match text.split_once('=') {
                Some((alias, target)) => out.push(Using::Alias {
                    alias: alias.to_string(),
                    target: target.strip_prefix("global::").unwrap_or(target).to_string(),
                }),
                None => out.push(Using::Namespace(
                    text.strip_prefix("global::").unwrap_or(&text).to_string(),
                )),
            }
        }
    }
    out
}

/// Names a member declaration introduces into its type.
fn member_names(node: &SyntaxNode) -> Vec<String> {
    if let Some(method) = MethodDecl::cast(node.clone()) {
        return method.name().into_iter().collect();
    }
    if let Some(decl) = TypeDecl::cast(node.clone()) {
        return decl.name().into_iter().collect();
    }
    if node.kind() != SyntaxKind::MemberDeclaration {
        return Vec::new();
    }

    let tokens: Vec<_> = node
        .children_with_tokens()
        .into_iter()
        .filter_map(SyntaxElement::into_token)
        .collect();
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut in_initializer = false;
    for (i, token) in tokens.iter().enumerate() {
        let previous = i
            .checked_sub(1)
            .and_then(|p| tokens.get(p))
            .filter(|t| t.kind().is_identifier_like())
            .map(|t| t.text().to_string());
        match token.kind() {
            SyntaxKind::OpenParen | SyntaxKind::OpenBracket | SyntaxKind::LessThan => depth += 1,
            SyntaxKind::CloseParen | SyntaxKind::CloseBracket | SyntaxKind::GreaterThan => {
                depth = depth.saturating_sub(1)
            }
            SyntaxKind::OpenBrace | SyntaxKind::FatArrow if depth == 0 => {
                if !in_initializer {
                    names.extend(previous);
                }
                break;
            }
            SyntaxKind::Equals if depth == 0 => {
                if !in_initializer {
                    names.extend(previous);
                }
                in_initializer = true;
            }
            SyntaxKind::Comma if depth == 0 => {
                if !in_initializer {
                    names.extend(previous);
                }
                in_initializer = false;
            }
            SyntaxKind::Semicolon if depth == 0 => {
                if !in_initializer {
                    names.extend(previous);
                }
                break;
            }
            _ => {}
        }
    }
    names
}

/// Token parents that hold executable code.
fn is_code_container(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Block | SyntaxKind::ArrowExpressionClause | SyntaxKind::MemberDeclaration
    )
}

#[async_trait]
impl SemanticModel for WorkspaceModel {
    async fn declared_symbol(
        &self,
        document: DocumentId,
        node: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Option<Symbol>, SemanticError> {
        cancel::check(cancel)?;
        self.document(document)?;
        if let Some(method) = MethodDecl::cast(node.clone()) {
            let Some(identifier) = method.identifier() else {
                return Ok(None);
            };
            let containing = method.containing_type().map(|t| declared_type(&t));
            return Ok(Some(Symbol {
                name: identifier.text().to_string(),
                kind: SymbolKind::Method,
                containing_namespace: containing.as_ref().and_then(|t| t.namespace.clone()),
                containing_type: containing.map(|t| t.full_metadata_name()),
                is_async: method.is_async(),
                is_static: method.has_modifier(SyntaxKind::StaticKeyword),
                declarations: vec![Location::new(document, identifier.span())],
            }));
        }
        if let Some(decl) = TypeDecl::cast(node.clone()) {
            let symbol = declared_type(&decl);
            let declarations = self
                .types
                .get(&symbol.full_metadata_name())
                .map(|entry| {
                    entry
                        .parts
                        .iter()
                        .filter_map(|(doc, part)| {
                            TypeDecl::cast(part.clone())
                                .and_then(|d| d.identifier())
                                .map(|id| Location::new(*doc, id.span()))
                        })
                        .collect()
                })
                .unwrap_or_default();
            return Ok(Some(Symbol {
                name: symbol.name.clone(),
                kind: SymbolKind::NamedType,
                containing_type: symbol.containing_type.clone(),
                containing_namespace: symbol.namespace.clone(),
                is_async: false,
                is_static: decl.has_modifier(SyntaxKind::StaticKeyword),
                declarations,
            }));
        }
        Ok(None)
    }

    async fn type_symbol(
        &self,
        document: DocumentId,
        type_syntax: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Option<TypeSymbol>, SemanticError> {
        cancel::check(cancel)?;
        let document = self.document(document)?;
        let resolved = self.resolve(document, type_syntax);
        if resolved.is_none() {
            debug!(ty = %token_text(type_syntax), "type did not resolve");
        }
        Ok(resolved)
    }

    fn well_known_type(&self, which: WellKnownType) -> Option<TypeSymbol> {
        Some(which.symbol())
    }

    async fn is_unique_member_name(
        &self,
        symbol: &Symbol,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, SemanticError> {
        let entry = self.containing_entry(symbol)?;
        if entry.symbol.name == name || entry.type_parameters.iter().any(|p| p == name) {
            return Ok(false);
        }
        for (_, part) in &entry.parts {
            cancel::check(cancel)?;
            let Some(decl) = TypeDecl::cast(part.clone()) else {
                continue;
            };
            if decl
                .members()
                .iter()
                .any(|member| member_names(member).iter().any(|n| n == name))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn find_references(
        &self,
        symbol: &Symbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<Location>, SemanticError> {
        let entry = self.containing_entry(symbol)?;
        let overloads = entry
            .parts
            .iter()
            .filter_map(|(_, part)| TypeDecl::cast(part.clone()))
            .flat_map(|decl| decl.methods())
            .filter(|m| m.name().as_deref() == Some(symbol.name.as_str()))
            .count();
        if overloads > 1 {
            return Err(SemanticError::AmbiguousReferences {
                name: symbol.name.clone(),
                count: overloads,
            });
        }

        let mut declared_elsewhere = 0usize;
        for document in self.solution.documents() {
            cancel::check(cancel)?;
            declared_elsewhere += document
                .tree()
                .root()
                .descendants()
                .filter_map(MethodDecl::cast)
                .filter(|m| m.name().as_deref() == Some(symbol.name.as_str()))
                .count();
        }

        let scopes: Vec<(DocumentId, SyntaxNode)> = if declared_elsewhere <= 1 {
            self.solution
                .documents()
                .map(|d| (d.id(), d.tree().root()))
                .collect()
        } else {
            entry.parts.clone()
        };

        let mut locations = symbol.declarations.clone();
        for (document, scope) in scopes {
            cancel::check(cancel)?;
            for token in scope.tokens() {
                if token.text() == symbol.name
                    && token.kind().is_identifier_like()
                    && is_code_container(token.parent().kind())
                {
                    locations.push(Location::new(document, token.span()));
                }
            }
            tokio::task::yield_now().await;
        }
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    async fn base_members(
        &self,
        document: DocumentId,
        method: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Vec<SyntaxNode>, SemanticError> {
        cancel::check(cancel)?;
        self.document(document)?;
        let Some(decl) = MethodDecl::cast(method.clone()) else {
            return Ok(Vec::new());
        };
        let (Some(name), Some(ty)) = (decl.name(), decl.containing_type()) else {
            return Ok(Vec::new());
        };
        let parameters = decl.parameter_count();
        let overrides = decl.has_modifier(SyntaxKind::OverrideKeyword);

        // Breadth first over every partial part's base list.
        let start = declared_type(&ty).full_metadata_name();
        let mut queue = VecDeque::from([start.clone()]);
        let mut seen = HashSet::from([start]);
        let mut found = Vec::new();
        while let Some(key) = queue.pop_front() {
            cancel::check(cancel)?;
            let Some(entry) = self.types.get(&key) else {
                continue;
            };
            for (_, part) in &entry.parts {
                let Some(part_decl) = TypeDecl::cast(part.clone()) else {
                    continue;
                };
                for (base_name, arity) in part_decl.base_types() {
                    let Some(base) = self.resolve_simple(part, &base_name, arity) else {
                        continue;
                    };
                    let base_key = base.full_metadata_name();
                    if !seen.insert(base_key.clone()) {
                        continue;
                    }
                    let Some(base_entry) = self.types.get(&base_key) else {
                        continue;
                    };
                    // Class members only count for `override`.
                    if overrides || base_entry.symbol.kind == TypeKind::Interface {
                        found.extend(
                            base_entry
                                .parts
                                .iter()
                                .filter_map(|(_, p)| TypeDecl::cast(p.clone()))
                                .flat_map(|d| d.methods())
                                .filter(|m| {
                                    m.name().as_deref() == Some(name.as_str())
                                        && m.parameter_count() == parameters
                                })
                                .map(|m| m.syntax().clone()),
                        );
                    }
                    queue.push_back(base_key);
                }
            }
        }
        debug!(method = %name, found = found.len(), "base members");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(files: &[(&str, &str)]) -> (WorkspaceModel, Vec<DocumentId>) {
        let mut solution = Solution::new();
        let ids = files
            .iter()
            .map(|(path, text)| solution.add_document(*path, text))
            .collect();
        (WorkspaceModel::new(solution), ids)
    }

    fn method(model: &WorkspaceModel, id: DocumentId, name: &str) -> MethodDecl {
        model
            .solution()
            .document(id)
            .unwrap()
            .tree()
            .root()
            .descendants()
            .filter_map(MethodDecl::cast)
            .find(|m| m.name().as_deref() == Some(name))
            .unwrap()
    }

    async fn return_type(model: &WorkspaceModel, id: DocumentId, name: &str) -> Option<TypeSymbol> {
        let method = method(model, id, name);
        let ty = method.return_type().unwrap();
        model
            .type_symbol(id, &ty, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resolves_framework_and_solution_types() {
        let src = r#"
using System.Collections.Generic;
using System.Threading.Tasks;

namespace App.Models
{
    public class Widget { }

    public class Service
    {
        public Task<List<Widget>> Load() => null;
        public int Count() => 0;
        public Widget[] All() => null;
        public T Echo<T>(T x) => x;
        public Missing Nope() => null;
        public int? Maybe() => null;
    }
}
"#;
        let (model, ids) = model(&[("Service.cs", src)]);
        let id = ids[0];

        let load = return_type(&model, id, "Load").await.unwrap();
        assert!(load.same_definition(&WellKnownType::TaskOfT.symbol()));
        let list = &load.type_arguments[0];
        assert_eq!(list.full_metadata_name(), "System.Collections.Generic.List`1");
        assert_eq!(list.type_arguments[0].full_metadata_name(), "App.Models.Widget");

        let count = return_type(&model, id, "Count").await.unwrap();
        assert_eq!(count.special, SpecialType::Int32);

        let all = return_type(&model, id, "All").await.unwrap();
        assert_eq!(all.kind, TypeKind::Array);

        let echo = return_type(&model, id, "Echo").await.unwrap();
        assert_eq!(echo.kind, TypeKind::TypeParameter);

        assert!(return_type(&model, id, "Nope").await.is_none());

        let maybe = return_type(&model, id, "Maybe").await.unwrap();
        assert!(maybe
            .constructed_from()
            .unwrap()
            .same_definition(&WellKnownType::NullableOfT.symbol()));
    }

    #[tokio::test]
    async fn file_scoped_namespace_and_nested_types() {
        let src = "namespace App;\n\nclass Outer\n{\n    class Inner { }\n    Inner Make() => null;\n}\n";
        let (model, ids) = model(&[("Outer.cs", src)]);
        let make = return_type(&model, ids[0], "Make").await.unwrap();
        assert_eq!(make.full_metadata_name(), "App.Outer+Inner");
    }

    #[tokio::test]
    async fn uniqueness_spans_partial_declarations() {
        let a = "namespace App { partial class Repo { public int GetCount() => 0; } }";
        let b = "namespace App { partial class Repo { private string _name; public object Load() => null; } }";
        let (model, ids) = model(&[("A.cs", a), ("B.cs", b)]);
        let load = method(&model, ids[1], "Load");
        let cancel = CancellationToken::new();
        let symbol = model
            .declared_symbol(ids[1], load.syntax(), &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(symbol.containing_type.as_deref(), Some("App.Repo"));

        assert!(!model.is_unique_member_name(&symbol, "GetCount", &cancel).await.unwrap());
        assert!(!model.is_unique_member_name(&symbol, "_name", &cancel).await.unwrap());
        assert!(!model.is_unique_member_name(&symbol, "Repo", &cancel).await.unwrap());
        assert!(model.is_unique_member_name(&symbol, "GetObject", &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn references_cross_documents_for_unique_names() {
        let a = "class Repo { public object Load() => null; }";
        let b = "class User { void Run(Repo r) { var x = r.Load(); var y = nameof(Repo.Load); } }";
        let (model, ids) = model(&[("A.cs", a), ("B.cs", b)]);
        let load = method(&model, ids[0], "Load");
        let cancel = CancellationToken::new();
        let symbol = model
            .declared_symbol(ids[0], load.syntax(), &cancel)
            .await
            .unwrap()
            .unwrap();
        let references = model.find_references(&symbol, &cancel).await.unwrap();
        assert_eq!(references.len(), 3);
        assert_eq!(references.iter().filter(|l| l.document == ids[1]).count(), 2);
    }

    #[tokio::test]
    async fn base_members_follow_classes_and_interfaces() {
        let shapes = "namespace App\n{\n    interface IShape { double Area(); }\n    abstract class Shape : IShape\n    {\n        public abstract double Area();\n        public abstract double Area(int scale);\n    }\n}\n";
        let square = "namespace App\n{\n    class Square : Shape\n    {\n        public override double Area() => 1;\n        public double Perimeter() => 4;\n    }\n    class Circle : IShape\n    {\n        public double Area() => 3;\n    }\n}\n";
        let (model, ids) = model(&[("Shapes.cs", shapes), ("Square.cs", square)]);
        let cancel = CancellationToken::new();

        let square_area = model
            .solution()
            .document(ids[1])
            .unwrap()
            .tree()
            .root()
            .descendants()
            .filter_map(MethodDecl::cast)
            .find(|m| m.name().as_deref() == Some("Area"))
            .unwrap();
        let bases = model
            .base_members(ids[1], square_area.syntax(), &cancel)
            .await
            .unwrap();
        let owners: Vec<_> = bases
            .iter()
            .filter_map(|b| MethodDecl::cast(b.clone()))
            .filter_map(|m| m.containing_type().and_then(|t| t.name()))
            .collect();
        assert_eq!(owners, vec!["Shape", "IShape"]);

        let circle_area = model
            .solution()
            .document(ids[1])
            .unwrap()
            .tree()
            .root()
            .descendants()
            .filter_map(MethodDecl::cast)
            .filter(|m| m.name().as_deref() == Some("Area"))
            .nth(1)
            .unwrap();
        let bases = model
            .base_members(ids[1], circle_area.syntax(), &cancel)
            .await
            .unwrap();
        assert_eq!(bases.len(), 1);

        let perimeter = method(&model, ids[1], "Perimeter");
        assert!(model
            .base_members(ids[1], perimeter.syntax(), &cancel)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn cancelled_queries_report_cancellation() {
        let (model, ids) = model(&[("A.cs", "class A { int M() => 0; }")]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let m = method(&model, ids[0], "M");
        let err = model
            .type_symbol(ids[0], &m.return_type().unwrap(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, SemanticError::Cancelled);
    }
}
