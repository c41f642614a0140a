//! Established conformances.

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, ScopeId};

/// A proved conformance of a model type to a trait.
#[derive(Clone, Debug)]
pub struct Conformance {
    /// The conforming type's declaration.
    pub source: DeclId,
    /// The trait conformed to.
    pub trait_decl: DeclId,
    /// The outermost scope in which the conformance is exposed.
    pub scope: ScopeId,
    /// Requirement declaration to the member implementing it.
    pub implementations: FxHashMap<DeclId, DeclId>,
}

impl Conformance {
    /// The implementation satisfying `requirement`, if the conformance
    /// records one.
    pub fn implementation(&self, requirement: DeclId) -> Option<DeclId> {
        self.implementations.get(&requirement).copied()
    }
}
