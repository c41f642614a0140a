//! Type relations: canonical forms and the conformance table.

use rustc_hash::FxHashMap;
use vela_ir::DeclId;
use vela_types::{TransformAction, Ty};

use crate::Conformance;

/// Relational knowledge about types, shared by every checking phase.
#[derive(Default, Debug)]
pub struct TypeRelations {
    /// Proved conformances, keyed by canonical model and trait.
    conformances: FxHashMap<(Ty, DeclId), Conformance>,
}

impl TypeRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical form of `ty`: aliases stripped everywhere.
    ///
    /// Two types denote the same type iff their canonical forms are equal.
    pub fn canonical(&self, ty: &Ty) -> Ty {
        ty.transform(&mut |t| {
            // The traversal recurses into a replacement's parts, not the
            // replacement itself, so alias chains must be unwound here.
            let mut stripped = t;
            while let Ty::Alias { aliasee, .. } = stripped {
                stripped = aliasee;
            }
            TransformAction::StepInto(stripped.clone())
        })
    }

    /// Record a proved conformance of `model` to `conformance.trait_decl`.
    ///
    /// # Panics
    /// Panics if a conformance for the same `(model, trait)` pair was
    /// already recorded; callers must check before establishing one.
    pub fn insert_conformance(&mut self, model: &Ty, conformance: Conformance) {
        let key = (self.canonical(model), conformance.trait_decl);
        let previous = self.conformances.insert(key, conformance);
        assert!(
            previous.is_none(),
            "conformance established twice for the same model and trait"
        );
    }

    /// The recorded conformance of `model` to `trait_decl`, if any.
    pub fn conformance(&self, model: &Ty, trait_decl: DeclId) -> Option<&Conformance> {
        self.conformances.get(&(self.canonical(model), trait_decl))
    }

    /// The traits `model` is recorded to conform to.
    pub fn conformed_traits_of(&self, model: &Ty) -> Vec<DeclId> {
        let canonical = self.canonical(model);
        let mut traits: Vec<DeclId> = self
            .conformances
            .keys()
            .filter(|(m, _)| *m == canonical)
            .map(|(_, t)| *t)
            .collect();
        traits.sort_by_key(|t| t.raw());
        traits
    }
}

#[cfg(test)]
mod tests {
    use vela_ir::ScopeId;

    use super::*;

    fn conformance(trait_decl: DeclId) -> Conformance {
        Conformance {
            source: DeclId::from_raw(0),
            trait_decl,
            scope: ScopeId::from_raw(0),
            implementations: FxHashMap::default(),
        }
    }

    #[test]
    fn canonical_strips_nested_aliases() {
        let relations = TypeRelations::new();
        let aliased = Ty::Alias {
            decl: DeclId::from_raw(1),
            aliasee: Box::new(Ty::Alias {
                decl: DeclId::from_raw(2),
                aliasee: Box::new(Ty::INT),
            }),
        };
        assert_eq!(relations.canonical(&aliased), Ty::INT);
    }

    #[test]
    fn conformance_lookup_sees_through_aliases() {
        let mut relations = TypeRelations::new();
        let model = Ty::Product(DeclId::from_raw(3));
        let t = DeclId::from_raw(9);
        relations.insert_conformance(&model, conformance(t));

        let aliased = Ty::Alias {
            decl: DeclId::from_raw(4),
            aliasee: Box::new(model),
        };
        assert!(relations.conformance(&aliased, t).is_some());
    }

    #[test]
    #[should_panic(expected = "established twice")]
    fn duplicate_conformance_panics() {
        let mut relations = TypeRelations::new();
        let model = Ty::Product(DeclId::from_raw(3));
        let t = DeclId::from_raw(9);
        relations.insert_conformance(&model, conformance(t));
        relations.insert_conformance(&model, conformance(t));
    }
}
