//! The constraint solver.
//!
//! A deterministic worklist unifier. Constraints whose subjects are still
//! open are postponed and retried after every round that made progress;
//! literal variables left open at the fixed point take their class default.
//! The solver is a collaborator: it never reads checker state directly,
//! only through [`SolverContext`].

use rustc_hash::FxHashMap;
use tracing::trace;
use vela_diagnostic::{Diagnostic, DiagnosticSet, ErrorCode};
use vela_ir::{ExprId, ScopeId, Span};
use vela_types::{
    CallableParam, Constraint, ConstraintCause, ConstraintKind, DeclRef, LiteralClass,
    OverloadCandidate, Primitive, Ty, TypeVar,
};

use crate::{Solution, SolverContext, Substitution, UnifyError};

/// One queued obligation.
#[derive(Clone, Debug)]
struct Obligation {
    constraint: Constraint,
    /// How many rounds in a row this obligation was postponed.
    stale: u32,
}

/// A pending literal-class obligation, kept until defaulting.
#[derive(Clone, Debug)]
struct LiteralObligation {
    var: TypeVar,
    class: LiteralClass,
    span: Span,
}

/// Solves one constraint system.
pub struct Solver<'a, C: SolverContext> {
    context: &'a mut C,
    scope: ScopeId,
    expected: Option<Ty>,
    substitution: Substitution,
    diagnostics: DiagnosticSet,
    bindings: FxHashMap<ExprId, DeclRef>,
    literals: Vec<LiteralObligation>,
}

/// What processing one obligation produced.
enum Outcome {
    /// Fully discharged.
    Done,
    /// Not enough information yet; retry next round.
    Postponed,
}

impl<'a, C: SolverContext> Solver<'a, C> {
    /// Create a solver for one system rooted at `scope`.
    pub fn new(context: &'a mut C, scope: ScopeId, expected: Option<Ty>) -> Self {
        Solver {
            context,
            scope,
            expected,
            substitution: Substitution::new(),
            diagnostics: DiagnosticSet::new(),
            bindings: FxHashMap::default(),
            literals: Vec::new(),
        }
    }

    /// Run the system to a fixed point and produce a solution.
    pub fn solve(mut self, constraints: Vec<Constraint>) -> Solution {
        let mut queue: Vec<Obligation> = constraints
            .into_iter()
            .map(|constraint| Obligation {
                constraint,
                stale: 0,
            })
            .collect();

        loop {
            let mut next = Vec::new();
            let mut progressed = false;
            for mut obligation in queue {
                match self.step(&obligation.constraint) {
                    Outcome::Done => progressed = true,
                    Outcome::Postponed => {
                        obligation.stale += 1;
                        next.push(obligation);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            if !progressed {
                // Defaulting literals may unblock postponed applications.
                if self.default_literals() {
                    queue = next;
                    continue;
                }
                for obligation in &next {
                    self.report_stuck(&obligation.constraint);
                }
                break;
            }
            queue = next;
        }

        self.default_literals();
        self.check_literals();

        Solution {
            substitution: self.substitution,
            bindings: self.bindings,
            diagnostics: self.diagnostics,
        }
    }

    fn step(&mut self, constraint: &Constraint) -> Outcome {
        trace!(?constraint.kind, "solving");
        let cause = constraint.cause;
        match &constraint.kind {
            ConstraintKind::Equality { lhs, rhs } => {
                let lhs = self.normalized(lhs);
                let rhs = self.normalized(rhs);
                self.unify_or_report(&lhs, &rhs, cause);
                Outcome::Done
            }
            ConstraintKind::Subtyping { subtype, supertype } => {
                self.solve_subtyping(subtype, supertype, cause)
            }
            ConstraintKind::Parameter {
                argument,
                parameter,
            } => {
                // The convention governs access, not the value's type: the
                // obligation is subtyping against the bare type.
                let argument = self.normalized(argument);
                let parameter = self.normalized(parameter);
                let bare = parameter.bare().clone();
                self.solve_subtyping(&argument, &bare, cause);
                Outcome::Done
            }
            ConstraintKind::Conformance { subject, traits } => {
                let subject = self.normalized(subject);
                if subject.has_variable() {
                    return Outcome::Postponed;
                }
                if subject.is_error() {
                    return Outcome::Done;
                }
                for t in traits {
                    if !self.context.conforms(&subject, *t, self.scope) {
                        self.diagnostics.insert(
                            Diagnostic::error(ErrorCode::ConformanceFailure, cause.span)
                                .with_message(format!(
                                    "`{}` does not satisfy the required conformance",
                                    self.context.display(&subject)
                                )),
                        );
                    }
                }
                Outcome::Done
            }
            ConstraintKind::Literal { subject, class } => {
                let subject = self.normalized(subject);
                match subject {
                    Ty::Var(v) => {
                        self.literals.push(LiteralObligation {
                            var: v,
                            class: *class,
                            span: cause.span,
                        });
                        Outcome::Done
                    }
                    other => {
                        if !literal_admits(*class, &other) {
                            self.diagnostics.insert(
                                Diagnostic::error(ErrorCode::TypeMismatch, cause.span)
                                    .with_message(format!(
                                        "`{}` cannot be expressed by this literal",
                                        self.context.display(&other)
                                    )),
                            );
                        }
                        Outcome::Done
                    }
                }
            }
            ConstraintKind::Apply {
                callee,
                inputs,
                output,
            } => self.solve_apply(callee, inputs, output, cause),
            ConstraintKind::Overload {
                name,
                subject,
                candidates,
            } => self.solve_overload(*name, subject, candidates, cause),
            ConstraintKind::Predicate(_) => {
                // Value predicates are accepted without proof.
                Outcome::Done
            }
        }
    }

    /// Walk variable chains and canonicalize through the checker.
    fn normalized(&mut self, ty: &Ty) -> Ty {
        let walked = self.substitution.reify(ty);
        self.context.canonical(&walked)
    }

    fn solve_subtyping(&mut self, subtype: &Ty, supertype: &Ty, cause: ConstraintCause) -> Outcome {
        let sub = self.normalized(subtype);
        let sup = self.normalized(supertype);
        match (&sub, &sup) {
            (_, Ty::Any) | (Ty::Never, _) => Outcome::Done,
            (s, p) if s == p => Outcome::Done,
            (Ty::Remote { referent, .. }, _) => self.solve_subtyping(referent, &sup, cause),
            (element, Ty::Sum(alternatives)) if alternatives.contains(element) => Outcome::Done,
            // No deeper subtyping lattice: fall back to unification.
            _ => {
                self.unify_or_report(&sub, &sup, cause);
                Outcome::Done
            }
        }
    }

    fn solve_apply(
        &mut self,
        callee: &Ty,
        inputs: &[CallableParam],
        output: &Ty,
        cause: ConstraintCause,
    ) -> Outcome {
        let callee = self.normalized(callee);
        let (params, ret) = match &callee {
            Ty::Var(_) => return Outcome::Postponed,
            Ty::Error => {
                // Error callees poison the output so checking continues.
                let output = self.normalized(output);
                self.unify_or_report(&output, &Ty::Error, cause);
                return Outcome::Done;
            }
            Ty::Lambda { inputs, output, .. } => (inputs.clone(), (**output).clone()),
            Ty::Method { inputs, output, .. } => (inputs.clone(), (**output).clone()),
            Ty::Metatype(instance) => {
                // Calling a type applies its initializer; the memberwise
                // path resolves through an overload constraint instead, so
                // a direct metatype call just produces an instance.
                let output = self.normalized(output);
                self.unify_or_report(&output, instance, cause);
                return Outcome::Done;
            }
            other => {
                self.diagnostics.insert(
                    Diagnostic::error(ErrorCode::TypeMismatch, cause.span).with_message(format!(
                        "`{}` is not callable",
                        self.context.display(other)
                    )),
                );
                return Outcome::Done;
            }
        };

        if params.len() != inputs.len() {
            self.diagnostics.insert(
                Diagnostic::error(ErrorCode::TypeMismatch, cause.span).with_message(format!(
                    "expected {} arguments, found {}",
                    params.len(),
                    inputs.len()
                )),
            );
            return Outcome::Done;
        }
        for (argument, parameter) in inputs.iter().zip(&params) {
            if argument.label != parameter.label {
                self.diagnostics.insert(
                    Diagnostic::error(ErrorCode::TypeMismatch, cause.span)
                        .with_message("argument labels do not match the callee"),
                );
                return Outcome::Done;
            }
            let arg = self.normalized(&argument.ty);
            let par = self.normalized(parameter.ty.bare());
            self.solve_subtyping(&arg, &par, cause);
        }
        let out = self.normalized(output);
        let ret = self.normalized(&ret);
        self.unify_or_report(&out, &ret, cause);
        Outcome::Done
    }

    fn solve_overload(
        &mut self,
        name: ExprId,
        subject: &Ty,
        candidates: &[OverloadCandidate],
        cause: ConstraintCause,
    ) -> Outcome {
        let subject = self.normalized(subject);

        // Filter by trial unification against the current assignment.
        let mut survivors: Vec<&OverloadCandidate> = Vec::new();
        for candidate in candidates {
            let ty = self.normalized(&candidate.ty);
            let mut trial = self.substitution.clone();
            if unify(&mut trial, &subject, &ty).is_ok() {
                survivors.push(candidate);
            }
        }

        // A contextual expected type breaks ties where trial unification
        // could not.
        if survivors.len() > 1 {
            if let Some(expected) = self.expected.clone() {
                let expected = self.normalized(&expected);
                let matching: Vec<_> = survivors
                    .iter()
                    .copied()
                    .filter(|c| {
                        let ty = self.normalized(&c.ty);
                        returns(&ty) == Some(&expected) || ty == expected
                    })
                    .collect();
                if matching.len() == 1 {
                    survivors = matching;
                }
            }
        }

        match survivors.len() {
            0 => {
                self.diagnostics.insert(
                    Diagnostic::error(ErrorCode::TypeMismatch, cause.span).with_message(format!(
                        "no candidate matches the expected type `{}`",
                        self.context.display(&subject)
                    )),
                );
                Outcome::Done
            }
            1 => {
                let chosen = survivors[0];
                let ty = self.normalized(&chosen.ty);
                self.unify_or_report(&subject, &ty, cause);
                self.bindings.insert(name, chosen.reference.clone());
                Outcome::Done
            }
            _ => {
                // More information may arrive from sibling constraints.
                if subject.has_variable() {
                    return Outcome::Postponed;
                }
                self.diagnostics.insert(
                    Diagnostic::error(ErrorCode::AmbiguousName, cause.span)
                        .with_message("the name is ambiguous in this context"),
                );
                Outcome::Done
            }
        }
    }

    fn unify_or_report(&mut self, lhs: &Ty, rhs: &Ty, cause: ConstraintCause) {
        if let Err(error) = unify(&mut self.substitution, lhs, rhs) {
            let message = match error {
                UnifyError::Mismatch { lhs, rhs } => format!(
                    "expected `{}`, found `{}`",
                    self.context.display(&lhs),
                    self.context.display(&rhs)
                ),
                other => other.to_string(),
            };
            self.diagnostics
                .insert(Diagnostic::error(ErrorCode::TypeMismatch, cause.span).with_message(message));
        }
    }

    /// Bind defaults to literal variables still open. Returns whether any
    /// variable was bound.
    fn default_literals(&mut self) -> bool {
        let mut bound = false;
        for obligation in &self.literals {
            if self.substitution.get(obligation.var).is_some() {
                continue;
            }
            let default = match obligation.class {
                LiteralClass::Integer => Ty::INT,
                LiteralClass::Floating => Ty::FLOAT,
                LiteralClass::Boolean => Ty::BOOL,
            };
            self.substitution.bind(obligation.var, default);
            bound = true;
        }
        bound
    }

    /// Re-check every literal obligation against its final assignment.
    fn check_literals(&mut self) {
        let literals = std::mem::take(&mut self.literals);
        for obligation in literals {
            let ty = self.substitution.reify(&Ty::Var(obligation.var));
            let ty = self.context.canonical(&ty);
            if !literal_admits(obligation.class, &ty) {
                self.diagnostics.insert(
                    Diagnostic::error(ErrorCode::TypeMismatch, obligation.span).with_message(
                        format!(
                            "`{}` cannot be expressed by this literal",
                            self.context.display(&ty)
                        ),
                    ),
                );
            }
        }
    }

    fn report_stuck(&mut self, constraint: &Constraint) {
        let diagnostic = match &constraint.kind {
            ConstraintKind::Overload { .. } => {
                Diagnostic::error(ErrorCode::AmbiguousName, constraint.cause.span)
                    .with_message("the name is ambiguous in this context")
            }
            _ => Diagnostic::error(ErrorCode::NotEnoughContext, constraint.cause.span)
                .with_message("not enough context to infer a type here"),
        };
        self.diagnostics.insert(diagnostic);
    }
}

/// The types a literal of `class` may take.
fn literal_admits(class: LiteralClass, ty: &Ty) -> bool {
    if ty.is_error() {
        return true;
    }
    match class {
        LiteralClass::Integer => {
            matches!(ty, Ty::Primitive(Primitive::Int | Primitive::Float))
        }
        LiteralClass::Floating => matches!(ty, Ty::Primitive(Primitive::Float)),
        LiteralClass::Boolean => matches!(ty, Ty::Primitive(Primitive::Bool)),
    }
}

/// The output type of a callable, for expected-type tie breaking.
fn returns(ty: &Ty) -> Option<&Ty> {
    match ty {
        Ty::Lambda { output, .. } | Ty::Method { output, .. } => Some(output),
        _ => None,
    }
}

/// Structural first-order unification with an occurs check.
fn unify(substitution: &mut Substitution, lhs: &Ty, rhs: &Ty) -> Result<(), UnifyError> {
    let a = substitution.walk(lhs);
    let b = substitution.walk(rhs);
    match (&a, &b) {
        (x, y) if x == y => Ok(()),
        // The error type absorbs everything so one failure does not cascade.
        (Ty::Error, _) | (_, Ty::Error) => Ok(()),
        (Ty::Var(v), other) | (other, Ty::Var(v)) => {
            let target = substitution.reify(other);
            if occurs(*v, &target) {
                return Err(UnifyError::OccursCheck { var: *v, ty: target });
            }
            substitution.bind(*v, target);
            Ok(())
        }
        (Ty::Alias { aliasee, .. }, other) => unify(substitution, aliasee, other),
        (other, Ty::Alias { aliasee, .. }) => unify(substitution, other, aliasee),
        (
            Ty::Parameter {
                convention: ca,
                bare: ba,
            },
            Ty::Parameter {
                convention: cb,
                bare: bb,
            },
        ) => {
            if ca != cb {
                return Err(UnifyError::Mismatch { lhs: a.clone(), rhs: b.clone() });
            }
            unify(substitution, ba, bb)
        }
        (Ty::Metatype(x), Ty::Metatype(y)) => unify(substitution, x, y),
        (Ty::Skolem(_), _) | (_, Ty::Skolem(_)) => {
            // Distinct skolems never unify; equality was handled above.
            Err(UnifyError::Mismatch { lhs: a.clone(), rhs: b.clone() })
        }
        (Ty::Tuple(xs), Ty::Tuple(ys)) => {
            if xs.len() != ys.len() {
                return Err(UnifyError::ArityMismatch {
                    expected: xs.len(),
                    found: ys.len(),
                });
            }
            for (x, y) in xs.iter().zip(ys) {
                if x.label != y.label {
                    return Err(UnifyError::LabelMismatch);
                }
                unify(substitution, &x.ty, &y.ty)?;
            }
            Ok(())
        }
        (
            Ty::Lambda {
                receiver_effect: ea,
                environment: na,
                inputs: ia,
                output: oa,
            },
            Ty::Lambda {
                receiver_effect: eb,
                environment: nb,
                inputs: ib,
                output: ob,
            },
        ) => {
            if ea != eb {
                return Err(UnifyError::Mismatch { lhs: a.clone(), rhs: b.clone() });
            }
            unify_inputs(substitution, ia, ib)?;
            unify(substitution, na, nb)?;
            unify(substitution, oa, ob)
        }
        (
            Ty::BoundGeneric { base: ba, args: aa },
            Ty::BoundGeneric { base: bb, args: ab },
        ) => {
            if aa.len() != ab.len() {
                return Err(UnifyError::ArityMismatch {
                    expected: aa.len(),
                    found: ab.len(),
                });
            }
            unify(substitution, ba, bb)?;
            for (x, y) in aa.iter().zip(ab) {
                unify(substitution, x, y)?;
            }
            Ok(())
        }
        (Ty::Remote { capability: ca, referent: ra }, Ty::Remote { capability: cb, referent: rb })
            if ca == cb =>
        {
            unify(substitution, ra, rb)
        }
        _ => Err(UnifyError::Mismatch { lhs: a, rhs: b }),
    }
}

fn unify_inputs(
    substitution: &mut Substitution,
    xs: &[CallableParam],
    ys: &[CallableParam],
) -> Result<(), UnifyError> {
    if xs.len() != ys.len() {
        return Err(UnifyError::ArityMismatch {
            expected: xs.len(),
            found: ys.len(),
        });
    }
    for (x, y) in xs.iter().zip(ys) {
        if x.label != y.label {
            return Err(UnifyError::LabelMismatch);
        }
        unify(substitution, &x.ty, &y.ty)?;
    }
    Ok(())
}

/// Whether `var` occurs anywhere in `ty`.
fn occurs(var: TypeVar, ty: &Ty) -> bool {
    let mut found = false;
    let _ = ty.transform(&mut |t| {
        if matches!(t, Ty::Var(v) if *v == var) {
            found = true;
        }
        vela_types::TransformAction::StepInto(t.clone())
    });
    found
}

/// Whether solving `subject` should be traced, given the configured span.
pub fn should_trace(tracing_span: Option<Span>, subject: Span) -> bool {
    tracing_span.is_some_and(|range| range.contains(subject))
}

#[cfg(test)]
mod tests {
    use vela_ir::{DeclId, ExprId};
    use vela_types::{CauseKind, DeclRef, OverloadCandidate};

    use super::*;

    struct NullContext;

    impl SolverContext for NullContext {
        fn canonical(&mut self, ty: &Ty) -> Ty {
            ty.clone()
        }

        fn conforms(&mut self, _subject: &Ty, _trait_decl: DeclId, _scope: ScopeId) -> bool {
            false
        }

        fn display(&self, ty: &Ty) -> String {
            format!("{ty:?}")
        }
    }

    fn cause() -> ConstraintCause {
        ConstraintCause::new(CauseKind::Structural, Span::new(0, 1))
    }

    #[test]
    fn equality_binds_variables() {
        let v = TypeVar::from_raw(0);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![Constraint::equality(
            Ty::Var(v),
            Ty::INT,
            cause(),
        )]);
        assert!(solution.is_sound());
        assert_eq!(solution.substitution.reify(&Ty::Var(v)), Ty::INT);
    }

    #[test]
    fn integer_literal_defaults_to_int() {
        let v = TypeVar::from_raw(0);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![Constraint::new(
            ConstraintKind::Literal {
                subject: Ty::Var(v),
                class: LiteralClass::Integer,
            },
            cause(),
        )]);
        assert!(solution.is_sound());
        assert_eq!(solution.substitution.reify(&Ty::Var(v)), Ty::INT);
    }

    #[test]
    fn integer_literal_admits_float_context() {
        let v = TypeVar::from_raw(0);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![
            Constraint::equality(Ty::Var(v), Ty::FLOAT, cause()),
            Constraint::new(
                ConstraintKind::Literal {
                    subject: Ty::Var(v),
                    class: LiteralClass::Integer,
                },
                cause(),
            ),
        ]);
        assert!(solution.is_sound());
        assert_eq!(solution.substitution.reify(&Ty::Var(v)), Ty::FLOAT);
    }

    #[test]
    fn bool_context_rejects_integer_literal() {
        let v = TypeVar::from_raw(0);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![
            Constraint::equality(Ty::Var(v), Ty::BOOL, cause()),
            Constraint::new(
                ConstraintKind::Literal {
                    subject: Ty::Var(v),
                    class: LiteralClass::Integer,
                },
                cause(),
            ),
        ]);
        assert!(!solution.is_sound());
    }

    #[test]
    fn apply_unifies_arguments_and_output() {
        let callee = Ty::thin_lambda(vec![CallableParam::bare(Ty::INT)], Ty::BOOL);
        let v = TypeVar::from_raw(0);
        let out = TypeVar::from_raw(1);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![
            Constraint::equality(Ty::Var(v), callee, cause()),
            Constraint::new(
                ConstraintKind::Apply {
                    callee: Ty::Var(v),
                    inputs: vec![CallableParam::bare(Ty::INT)],
                    output: Ty::Var(out),
                },
                cause(),
            ),
        ]);
        assert!(solution.is_sound());
        assert_eq!(solution.substitution.reify(&Ty::Var(out)), Ty::BOOL);
    }

    #[test]
    fn unresolvable_apply_reports_missing_context() {
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![Constraint::new(
            ConstraintKind::Apply {
                callee: Ty::Var(TypeVar::from_raw(0)),
                inputs: Vec::new(),
                output: Ty::Var(TypeVar::from_raw(1)),
            },
            cause(),
        )]);
        assert!(!solution.is_sound());
        let codes: Vec<_> = solution.diagnostics.iter().map(|d| d.code).collect();
        assert!(codes.contains(&ErrorCode::NotEnoughContext));
    }

    #[test]
    fn overload_requires_unique_survivor() {
        let expr = ExprId::from_raw(0);
        let f = DeclId::from_raw(1);
        let g = DeclId::from_raw(2);
        let f_ty = Ty::thin_lambda(vec![CallableParam::bare(Ty::INT)], Ty::Void);
        let g_ty = Ty::thin_lambda(vec![CallableParam::bare(Ty::BOOL)], Ty::Void);
        let subject = Ty::Var(TypeVar::from_raw(0));

        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![
            Constraint::equality(
                subject.clone(),
                Ty::thin_lambda(vec![CallableParam::bare(Ty::BOOL)], Ty::Void),
                cause(),
            ),
            Constraint::new(
                ConstraintKind::Overload {
                    name: expr,
                    subject,
                    candidates: vec![
                        OverloadCandidate {
                            reference: DeclRef::direct(f),
                            ty: f_ty,
                        },
                        OverloadCandidate {
                            reference: DeclRef::direct(g),
                            ty: g_ty,
                        },
                    ],
                },
                cause(),
            ),
        ]);
        assert!(solution.is_sound());
        assert_eq!(solution.bindings.get(&expr), Some(&DeclRef::direct(g)));
    }

    #[test]
    fn ambiguous_overload_is_an_error() {
        let expr = ExprId::from_raw(0);
        let f = DeclId::from_raw(1);
        let g = DeclId::from_raw(2);
        let shared = Ty::thin_lambda(vec![CallableParam::bare(Ty::INT)], Ty::Void);

        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![Constraint::new(
            ConstraintKind::Overload {
                name: expr,
                subject: shared.clone(),
                candidates: vec![
                    OverloadCandidate {
                        reference: DeclRef::direct(f),
                        ty: shared.clone(),
                    },
                    OverloadCandidate {
                        reference: DeclRef::direct(g),
                        ty: shared,
                    },
                ],
            },
            cause(),
        )]);
        assert!(!solution.is_sound());
        let codes: Vec<_> = solution.diagnostics.iter().map(|d| d.code).collect();
        assert!(codes.contains(&ErrorCode::AmbiguousName));
    }

    #[test]
    fn occurs_check_fails_cyclic_binding() {
        let v = TypeVar::from_raw(0);
        let cyclic = Ty::thin_lambda(vec![CallableParam::bare(Ty::Var(v))], Ty::Void);
        let mut context = NullContext;
        let solver = Solver::new(&mut context, ScopeId::from_raw(0), None);
        let solution = solver.solve(vec![Constraint::equality(Ty::Var(v), cyclic, cause())]);
        assert!(!solution.is_sound());
    }

    #[test]
    fn identical_inputs_produce_identical_solutions() {
        let build = || {
            vec![
                Constraint::equality(Ty::Var(TypeVar::from_raw(0)), Ty::INT, cause()),
                Constraint::new(
                    ConstraintKind::Literal {
                        subject: Ty::Var(TypeVar::from_raw(1)),
                        class: LiteralClass::Floating,
                    },
                    cause(),
                ),
            ]
        };
        let mut c1 = NullContext;
        let s1 = Solver::new(&mut c1, ScopeId::from_raw(0), None).solve(build());
        let mut c2 = NullContext;
        let s2 = Solver::new(&mut c2, ScopeId::from_raw(0), None).solve(build());
        for raw in 0..2 {
            let v = Ty::Var(TypeVar::from_raw(raw));
            assert_eq!(s1.substitution.reify(&v), s2.substitution.reify(&v));
        }
    }
}
