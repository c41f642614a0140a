//! Structural type rewriting.
//!
//! [`Ty::transform`] is the workhorse behind canonicalization,
//! specialization, instantiation, and reification: one traversal,
//! parameterized by a callback that decides what to do at each node.

use crate::{CallableParam, TupleField, Ty};

fn transform_inputs(
    inputs: &[CallableParam],
    f: &mut impl FnMut(&Ty) -> TransformAction,
) -> Vec<CallableParam> {
    inputs
        .iter()
        .map(|p| CallableParam::new(p.label, p.ty.transform(f)))
        .collect()
}

/// The callback's verdict for one node.
pub enum TransformAction {
    /// Replace the node and recurse into the replacement's parts.
    StepInto(Ty),
    /// Replace the node and do not recurse.
    StepOver(Ty),
}

impl Ty {
    /// Rewrite this type bottom-up under the control of `f`.
    ///
    /// `f` is applied to the whole type first; on [`TransformAction::StepInto`]
    /// the traversal continues into the replacement's parts, on
    /// [`TransformAction::StepOver`] the replacement is final.
    pub fn transform(&self, f: &mut impl FnMut(&Ty) -> TransformAction) -> Ty {
        match f(self) {
            TransformAction::StepOver(ty) => ty,
            TransformAction::StepInto(ty) => ty.transform_parts(f),
        }
    }

    fn transform_parts(&self, f: &mut impl FnMut(&Ty) -> TransformAction) -> Ty {
        match self {
            leaf if leaf.is_leaf() => leaf.clone(),
            Ty::Associated { decl, domain } => Ty::Associated {
                decl: *decl,
                domain: Box::new(domain.transform(f)),
            },
            Ty::Alias { decl, aliasee } => Ty::Alias {
                decl: *decl,
                aliasee: Box::new(aliasee.transform(f)),
            },
            Ty::BoundGeneric { base, args } => Ty::BoundGeneric {
                base: Box::new(base.transform(f)),
                args: args.iter().map(|a| a.transform(f)).collect(),
            },
            Ty::Tuple(fields) => Ty::Tuple(
                fields
                    .iter()
                    .map(|field| TupleField::new(field.label, field.ty.transform(f)))
                    .collect(),
            ),
            Ty::Sum(elements) => Ty::sum(elements.iter().map(|e| e.transform(f))),
            Ty::Lambda {
                receiver_effect,
                environment,
                inputs,
                output,
            } => Ty::Lambda {
                receiver_effect: *receiver_effect,
                environment: Box::new(environment.transform(f)),
                inputs: transform_inputs(inputs, f),
                output: Box::new(output.transform(f)),
            },
            Ty::Method {
                capabilities,
                receiver,
                inputs,
                output,
            } => Ty::Method {
                capabilities: *capabilities,
                receiver: Box::new(receiver.transform(f)),
                inputs: transform_inputs(inputs, f),
                output: Box::new(output.transform(f)),
            },
            Ty::Subscript {
                is_property,
                capabilities,
                environment,
                inputs,
                output,
            } => Ty::Subscript {
                is_property: *is_property,
                capabilities: *capabilities,
                environment: Box::new(environment.transform(f)),
                inputs: transform_inputs(inputs, f),
                output: Box::new(output.transform(f)),
            },
            Ty::Parameter { convention, bare } => Ty::Parameter {
                convention: *convention,
                bare: Box::new(bare.transform(f)),
            },
            Ty::Remote {
                capability,
                referent,
            } => Ty::Remote {
                capability: *capability,
                referent: Box::new(referent.transform(f)),
            },
            Ty::Skolem(base) => Ty::Skolem(Box::new(base.transform(f))),
            Ty::ConformanceLens { subject, lens } => Ty::ConformanceLens {
                subject: Box::new(subject.transform(f)),
                lens: Box::new(lens.transform(f)),
            },
            Ty::Metatype(instance) => Ty::Metatype(Box::new(instance.transform(f))),
            // is_leaf covered these; kept for exhaustiveness.
            Ty::Void
            | Ty::Never
            | Ty::Any
            | Ty::Error
            | Ty::Primitive(_)
            | Ty::Builtin(_)
            | Ty::GenericParam(_)
            | Ty::Trait(_)
            | Ty::Product(_)
            | Ty::Var(_) => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use vela_ir::DeclId;

    use super::*;
    use crate::TypeVar;

    #[test]
    fn step_into_rewrites_nested_occurrences() {
        let v = Ty::Var(TypeVar::from_raw(0));
        let subject = Ty::Tuple(vec![
            TupleField::bare(v.clone()),
            TupleField::bare(Ty::metatype(v.clone())),
        ]);

        let rewritten = subject.transform(&mut |t| {
            if *t == v {
                TransformAction::StepOver(Ty::INT)
            } else {
                TransformAction::StepInto(t.clone())
            }
        });

        let expected = Ty::Tuple(vec![
            TupleField::bare(Ty::INT),
            TupleField::bare(Ty::metatype(Ty::INT)),
        ]);
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn step_over_stops_the_walk() {
        let inner = Ty::GenericParam(DeclId::from_raw(1));
        let subject = Ty::skolem(inner.clone());

        // Skolems are opaque to this rewrite; the parameter underneath is
        // left alone.
        let rewritten = subject.transform(&mut |t| match t {
            Ty::Skolem(_) => TransformAction::StepOver(t.clone()),
            Ty::GenericParam(_) => TransformAction::StepOver(Ty::Error),
            other => TransformAction::StepInto(other.clone()),
        });
        assert_eq!(rewritten, subject);
    }
}
