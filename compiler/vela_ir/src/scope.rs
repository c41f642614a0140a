//! Lexical scopes.
//!
//! Scopes form a tree parallel to the declaration tree. File scopes exist
//! so that unqualified lookup can skip them: names declared at the top
//! level of a file belong to the module, and visiting each file scope on
//! the outward walk would search the same names twice.

use crate::{DeclId, ScopeId, StmtId};

/// What introduced a scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    /// A module root.
    Module(DeclId),
    /// A source file within a module.
    File,
    /// A declaration that outlines a lexical scope.
    Decl(DeclId),
    /// A brace statement.
    Brace(StmtId),
}

/// A lexical scope.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
}

impl Scope {
    /// The declaration outlining this scope, if any.
    pub fn decl(&self) -> Option<DeclId> {
        match self.kind {
            ScopeKind::Module(d) | ScopeKind::Decl(d) => Some(d),
            ScopeKind::File | ScopeKind::Brace(_) => None,
        }
    }
}
