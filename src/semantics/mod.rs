//! Semantic queries the refactorings ask of the host.
//!
//! Everything a rule needs beyond syntax goes through [`SemanticModel`]:
//! declared symbols, resolved types, member-name uniqueness,
//! references and base members. Queries are async and cancellable so a host can back them
//! with a slow index.

pub mod errors;
pub mod symbols;
pub mod workspace;

pub use errors::SemanticError;
pub use symbols::{
    Location, SpecialType, Symbol, SymbolKind, TypeKind, TypeSymbol, WellKnownType,
};
pub use workspace::WorkspaceModel;

use crate::cancel::CancellationToken;
use crate::solution::DocumentId;
use crate::syntax::SyntaxNode;
use async_trait::async_trait;

#[async_trait]
pub trait SemanticModel: Send + Sync {
    /// Symbol declared by a method or type declaration node.
    async fn declared_symbol(
        &self,
        document: DocumentId,
        node: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Option<Symbol>, SemanticError>;

    /// Resolve a type syntax node. `None` when the type is unknown.
    async fn type_symbol(
        &self,
        document: DocumentId,
        type_syntax: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Option<TypeSymbol>, SemanticError>;

    fn well_known_type(&self, which: WellKnownType) -> Option<TypeSymbol>;

    /// True when no other member of the symbol's containing type, across
    /// all partial parts, is named `name`.
    async fn is_unique_member_name(
        &self,
        symbol: &Symbol,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, SemanticError>;

    /// Declarations and references of `symbol`, sorted by document and
    /// position.
    async fn find_references(
        &self,
        symbol: &Symbol,
        cancel: &CancellationToken,
    ) -> Result<Vec<Location>, SemanticError>;

    /// Declarations of the methods `method` overrides or implements,
    /// nearest base first. Only declarations in the solution are found.
    async fn base_members(
        &self,
        document: DocumentId,
        method: &SyntaxNode,
        cancel: &CancellationToken,
    ) -> Result<Vec<SyntaxNode>, SemanticError>;
}
