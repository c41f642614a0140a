//! Type-variable substitutions.

use rustc_hash::FxHashMap;
use vela_types::{TransformAction, Ty, TypeVar};

/// A mapping from inference variables to the types they were solved to.
#[derive(Clone, Default, Debug)]
pub struct Substitution {
    assignments: FxHashMap<TypeVar, Ty>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `var` stands for `ty`.
    ///
    /// Callers must have run the occurs check; binding a variable to a type
    /// containing itself would make reification loop.
    pub fn bind(&mut self, var: TypeVar, ty: Ty) {
        debug_assert!(self.assignments.get(&var).is_none(), "variable bound twice");
        self.assignments.insert(var, ty);
    }

    /// The direct assignment of `var`, if any.
    pub fn get(&self, var: TypeVar) -> Option<&Ty> {
        self.assignments.get(&var)
    }

    /// Resolve chains of variable assignments at the top level only.
    pub fn walk(&self, ty: &Ty) -> Ty {
        let mut current = ty;
        while let Ty::Var(v) = current {
            match self.assignments.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Replace every solved variable in `ty`, leaving unsolved ones in
    /// place.
    pub fn reify(&self, ty: &Ty) -> Ty {
        ty.transform(&mut |t| match t {
            Ty::Var(v) if self.assignments.contains_key(v) => {
                TransformAction::StepInto(self.walk(t))
            }
            other => TransformAction::StepInto(other.clone()),
        })
    }

    /// Iterate over the solved variables.
    pub fn iter(&self) -> impl Iterator<Item = (TypeVar, &Ty)> {
        self.assignments.iter().map(|(v, t)| (*v, t))
    }

    /// Whether nothing has been solved.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use vela_types::{CallableParam, TupleField};

    use super::*;

    #[test]
    fn reify_replaces_solved_and_keeps_unsolved() {
        let solved = TypeVar::from_raw(0);
        let open = TypeVar::from_raw(1);
        let mut sub = Substitution::new();
        sub.bind(solved, Ty::INT);

        let ty = Ty::Tuple(vec![
            TupleField::bare(Ty::Var(solved)),
            TupleField::bare(Ty::Var(open)),
        ]);
        let reified = sub.reify(&ty);
        assert_eq!(
            reified,
            Ty::Tuple(vec![
                TupleField::bare(Ty::INT),
                TupleField::bare(Ty::Var(open)),
            ])
        );
    }

    #[test]
    fn reify_chases_chains() {
        let a = TypeVar::from_raw(0);
        let b = TypeVar::from_raw(1);
        let mut sub = Substitution::new();
        sub.bind(a, Ty::Var(b));
        sub.bind(b, Ty::BOOL);

        let lambda = Ty::thin_lambda(vec![CallableParam::bare(Ty::Var(a))], Ty::Var(b));
        let reified = sub.reify(&lambda);
        assert_eq!(
            reified,
            Ty::thin_lambda(vec![CallableParam::bare(Ty::BOOL)], Ty::BOOL)
        );
    }
}
