//! Resolved references to declarations.

use vela_ir::DeclId;

use crate::Ty;

/// A reference to a declaration together with the generic arguments the
/// reference applies to it.
///
/// Arguments are keyed by generic parameter declaration and kept sorted by
/// handle so two references to the same specialization compare equal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DeclRef {
    pub decl: DeclId,
    arguments: Vec<(DeclId, Ty)>,
}

impl DeclRef {
    /// A reference with no specialization.
    pub fn direct(decl: DeclId) -> Self {
        DeclRef {
            decl,
            arguments: Vec::new(),
        }
    }

    /// A reference specialized by `arguments`.
    pub fn specialized(decl: DeclId, arguments: impl IntoIterator<Item = (DeclId, Ty)>) -> Self {
        let mut arguments: Vec<_> = arguments.into_iter().collect();
        arguments.sort_by_key(|(p, _)| p.raw());
        arguments.dedup_by_key(|(p, _)| *p);
        DeclRef { decl, arguments }
    }

    /// The argument bound to generic parameter `parameter`, if any.
    pub fn argument(&self, parameter: DeclId) -> Option<&Ty> {
        self.arguments
            .binary_search_by_key(&parameter.raw(), |(p, _)| p.raw())
            .ok()
            .map(|i| &self.arguments[i].1)
    }

    /// The specialization, sorted by parameter handle.
    pub fn arguments(&self) -> &[(DeclId, Ty)] {
        &self.arguments
    }

    /// Whether the reference carries no generic arguments.
    pub fn is_direct(&self) -> bool {
        self.arguments.is_empty()
    }
}
