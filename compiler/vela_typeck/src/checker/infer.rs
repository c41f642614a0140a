//! Constraint generation and solver orchestration.
//!
//! `solve_constraints` is the inference seam: it walks one expression
//! structurally, assigning a type (often an open variable) to every node
//! and emitting constraints, hands the system to the solver, and applies
//! the solution back onto the expression and binding maps. Work that needs
//! the solution first, such as checking a lambda body against its solved
//! signature, is queued as a data-only deferred obligation and dispatched
//! before the call returns.

use vela_ir::{DeclId, DeclKind, ExprId, ExprKind, FunctionFlags, NameDomain, NameExpr, ScopeId};
use vela_solve::{should_trace, Solution, Solver};
use vela_types::{
    CallableParam, CauseKind, Constraint, ConstraintCause, ConstraintKind, LiteralClass,
    TupleField, Ty,
};

use super::generics::skolemize;
use super::resolve::{ResolvedDomain, ResolvedName};
use super::{diagnostics, ImplicitCapture, TypeChecker};
use crate::ensure_sufficient_stack;

/// Work that can only run once a solution exists.
#[derive(Clone, Debug)]
pub enum DeferredObligation {
    /// Check a lambda's body against its solved signature.
    LambdaBody {
        /// The lambda's underlying function declaration.
        function: DeclId,
        /// The signature as inferred, possibly containing solved variables.
        signature: Ty,
    },
}

/// Per-call state of one inference run.
struct InferenceSession {
    constraints: Vec<Constraint>,
    /// Expressions whose recorded types need reification afterwards.
    recorded: Vec<ExprId>,
    deferred: Vec<DeferredObligation>,
    expected: Option<Ty>,
}

impl TypeChecker<'_> {
    /// Infer and solve the type of `subject`, optionally against an
    /// expected type, folding the solution into the checker's maps.
    pub(crate) fn solve_constraints(
        &mut self,
        subject: ExprId,
        expected: Option<Ty>,
        scope: ScopeId,
        cause: CauseKind,
    ) -> bool {
        let mut session = InferenceSession {
            constraints: Vec::new(),
            recorded: Vec::new(),
            deferred: Vec::new(),
            expected: expected.clone(),
        };
        let span = self.ast.expr_span(subject);
        let inferred = self.infer_expr(subject, scope, &mut session);
        if let Some(expected_ty) = expected.clone() {
            session.constraints.push(Constraint::subtyping(
                inferred,
                expected_ty,
                ConstraintCause::new(cause, span),
            ));
        }

        let traced = should_trace(self.tracing_range, span);
        let guard = traced.then(|| tracing::debug_span!("inference", subject = subject.raw()).entered());
        let solution = Solver::new(self, scope, expected).solve(session.constraints);
        let Solution {
            substitution,
            bindings,
            diagnostics,
        } = solution;
        if traced {
            tracing::debug!(?substitution, "solved");
        }
        drop(guard);

        let sound = !diagnostics.contains_error();
        self.diagnostics.merge(diagnostics);
        self.bindings.extend(bindings);
        for expr in session.recorded {
            if let Some(ty) = self.expr_types.get(&expr).cloned() {
                let reified = substitution.reify(&ty);
                let canonical = self.relations.canonical(&reified);
                self.expr_types.insert(expr, canonical);
            }
        }

        let mut ok = sound;
        for obligation in session.deferred {
            match obligation {
                DeferredObligation::LambdaBody {
                    function,
                    signature,
                } => {
                    let solved = self.relations.canonical(&substitution.reify(&signature));
                    self.decl_types.insert(function, solved);
                    let parameters = match self.ast.decl(function) {
                        DeclKind::Function(f) => f.parameters.clone(),
                        _ => Vec::new(),
                    };
                    for parameter in parameters {
                        if let Some(ty) = self.decl_types.get(parameter).cloned() {
                            let reified =
                                self.relations.canonical(&substitution.reify(&ty));
                            self.decl_types.insert(parameter, reified);
                        }
                    }
                    ok &= self.check_decl(function);
                }
            }
        }
        ok
    }

    /// Check a binding initializer against its declared type.
    pub(crate) fn check_binding_initializer(
        &mut self,
        initializer: ExprId,
        declared: &Ty,
        scope: ScopeId,
    ) {
        let expected = skolemize(declared);
        self.solve_constraints(initializer, Some(expected), scope, CauseKind::Initialization);
    }

    /// Infer a binding's type from its initializer alone.
    pub(crate) fn infer_binding_initializer(&mut self, initializer: ExprId, scope: ScopeId) -> Ty {
        self.solve_constraints(initializer, None, scope, CauseKind::Initialization);
        let ty = self
            .expr_types
            .get(&initializer)
            .cloned()
            .unwrap_or(Ty::Error);
        if ty.has_variable() {
            let span = self.ast.expr_span(initializer);
            self.diagnostics
                .insert(diagnostics::not_enough_context(span));
            return Ty::Error;
        }
        ty
    }

    fn infer_expr(&mut self, expr: ExprId, scope: ScopeId, session: &mut InferenceSession) -> Ty {
        ensure_sufficient_stack(|| self.infer_expr_inner(expr, scope, session))
    }

    fn infer_expr_inner(
        &mut self,
        expr: ExprId,
        scope: ScopeId,
        session: &mut InferenceSession,
    ) -> Ty {
        let span = self.ast.expr_span(expr);
        let kind = self.ast.expr(expr).kind.clone();
        let ty = match kind {
            ExprKind::IntLiteral(_) => self.literal(LiteralClass::Integer, span, session),
            ExprKind::FloatLiteral(_) => self.literal(LiteralClass::Floating, span, session),
            ExprKind::BoolLiteral(_) => self.literal(LiteralClass::Boolean, span, session),
            ExprKind::Name(name) => self.infer_name_expr(expr, &name, scope, session),
            ExprKind::Call { callee, arguments } => {
                let callee_ty = self.infer_expr(callee, scope, session);
                let mut inputs = Vec::new();
                for argument in &arguments {
                    let ty = self.infer_expr(argument.value, scope, session);
                    inputs.push(CallableParam::new(argument.label, ty));
                }
                let output = self.fresh_var();
                session.constraints.push(Constraint::new(
                    ConstraintKind::Apply {
                        callee: callee_ty,
                        inputs,
                        output: output.clone(),
                    },
                    ConstraintCause::new(CauseKind::Call, span),
                ));
                output
            }
            ExprKind::Lambda(function) => {
                let signature = self.realized_type(function);
                session.deferred.push(DeferredObligation::LambdaBody {
                    function,
                    signature: signature.clone(),
                });
                signature
            }
            ExprKind::Tuple(elements) => {
                let mut fields = Vec::new();
                for element in &elements {
                    let ty = self.infer_expr(element.value, scope, session);
                    fields.push(TupleField::new(element.label, ty));
                }
                Ty::Tuple(fields)
            }
            // A type expression in value position denotes the type as a
            // value.
            ExprKind::ConformanceLens { .. }
            | ExprKind::LambdaType { .. }
            | ExprKind::TupleType(_) => {
                let instance = self.realize_type_expr(expr, scope);
                if instance.is_error() {
                    Ty::Error
                } else {
                    Ty::metatype(instance)
                }
            }
            ExprKind::ParameterType { .. } => {
                self.diagnostics
                    .insert(diagnostics::illegal_parameter_convention(span));
                Ty::Error
            }
            ExprKind::Wildcard => self.fresh_var(),
        };
        self.record(expr, ty, session)
    }

    fn literal(
        &mut self,
        class: LiteralClass,
        span: vela_ir::Span,
        session: &mut InferenceSession,
    ) -> Ty {
        let subject = self.fresh_var();
        session.constraints.push(Constraint::new(
            ConstraintKind::Literal {
                subject: subject.clone(),
                class,
            },
            ConstraintCause::new(CauseKind::Literal, span),
        ));
        subject
    }

    fn infer_name_expr(
        &mut self,
        expr: ExprId,
        name: &NameExpr,
        scope: ScopeId,
        session: &mut InferenceSession,
    ) -> Ty {
        let span = self.ast.expr_span(expr);
        let domain = match name.domain {
            NameDomain::None => ResolvedDomain::None,
            // Leading-dot sugar resolves against the expected type.
            NameDomain::Implicit => match session.expected.clone() {
                Some(expected) => ResolvedDomain::Type(Ty::metatype(expected)),
                None => {
                    self.diagnostics
                        .insert(diagnostics::not_enough_context(span));
                    return Ty::Error;
                }
            },
            NameDomain::Expr(domain_expr) => {
                if let Some(space) = self.declaration_space_of(domain_expr, scope) {
                    self.record(domain_expr, Ty::Void, session);
                    ResolvedDomain::Space(space)
                } else {
                    let ty = self.infer_expr(domain_expr, scope, session);
                    if ty.has_variable() {
                        let domain_span = self.ast.expr_span(domain_expr);
                        self.diagnostics
                            .insert(diagnostics::not_enough_context(domain_span));
                        return Ty::Error;
                    }
                    ResolvedDomain::Type(ty)
                }
            }
        };
        let cause = match &domain {
            ResolvedDomain::None => CauseKind::Structural,
            _ => CauseKind::Member,
        };

        match self.resolve_name_expr(expr, name, domain, scope) {
            ResolvedName::One(reference, ty) => {
                // A parameter used as a value has the convention's bare type.
                let ty = match ty {
                    Ty::Parameter { bare, .. } => *bare,
                    other => other,
                };
                self.note_implicit_capture(reference.decl, &ty, scope);
                self.bindings.insert(expr, reference);
                ty
            }
            ResolvedName::Many(candidates) => {
                let subject = self.fresh_var();
                session.constraints.push(Constraint::new(
                    ConstraintKind::Overload {
                        name: expr,
                        subject: subject.clone(),
                        candidates,
                    },
                    ConstraintCause::new(cause, span),
                ));
                subject
            }
            ResolvedName::Magic(ty) => ty,
            ResolvedName::Poisoned => Ty::Error,
        }
    }

    /// Record that a local declaration referenced from inside a nested
    /// function is captured implicitly.
    fn note_implicit_capture(&mut self, decl: DeclId, ty: &Ty, scope: ScopeId) {
        if !self.ast.is_local(decl) {
            return;
        }
        let Some(function) = self.enclosing_local_callable(scope) else {
            return;
        };
        let (Some(decl_scope), Some(function_scope)) =
            (self.ast.scope_containing(decl), self.ast.scope_of(function))
        else {
            return;
        };
        if self.ast.is_contained(decl_scope, function_scope) {
            return;
        }
        // A local function that captures nothing is a plain value, not a
        // capture.
        if matches!(self.ast.decl(decl), DeclKind::Function(_)) {
            let realized = self.realized_type(decl);
            if matches!(&realized, Ty::Lambda { environment, .. } if **environment == Ty::Void) {
                return;
            }
        }
        // Captured generics stay rigid inside the capturing function.
        let ty = skolemize(ty);
        let captures = self.implicit_captures.entry(function).or_default();
        if !captures.iter().any(|c| c.decl == decl) {
            captures.push(ImplicitCapture { decl, ty });
        }
    }

    /// The innermost local function or lambda enclosing `scope`, if the
    /// nearest callable is one.
    fn enclosing_local_callable(&self, scope: ScopeId) -> Option<DeclId> {
        for s in self.ast.scopes_from(scope) {
            let Some(decl) = self.ast.scope(s).decl() else {
                continue;
            };
            match self.ast.decl(decl) {
                DeclKind::Function(f) => {
                    if self.ast.is_local(decl)
                        || f.flags.contains(FunctionFlags::IN_EXPR_CONTEXT)
                    {
                        return Some(decl);
                    }
                    return None;
                }
                DeclKind::MethodImpl(_)
                | DeclKind::SubscriptImpl(_)
                | DeclKind::Initializer(_)
                | DeclKind::Subscript(_) => return None,
                _ => continue,
            }
        }
        None
    }

    fn record(&mut self, expr: ExprId, ty: Ty, session: &mut InferenceSession) -> Ty {
        self.expr_types.insert(expr, ty.clone());
        session.recorded.push(expr);
        ty
    }
}
