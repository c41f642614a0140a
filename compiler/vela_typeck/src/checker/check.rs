//! Declaration and statement checking.
//!
//! `check_decl` drives a declaration through the second half of its
//! request lifecycle: realize the declared type, then check bodies,
//! defaults, and conformances against it. Like realization, checking is
//! memoized through the request state machine, and observing a request
//! already on the stack is a circular dependency.

use rustc_hash::FxHashSet;
use vela_ir::{
    Body, Capability, ConditionItem, DeclId, DeclKind, ExprId, Name, OperatorNotation, ScopeId,
    Span, StmtId, StmtKind,
};
use vela_types::{CauseKind, Ty};

use super::generics::skolemize;
use super::{diagnostics, TypeChecker};
use crate::{ensure_sufficient_stack, RequestStatus};

impl TypeChecker<'_> {
    /// Fully check `decl`, realizing it first if needed.
    ///
    /// Returns whether the declaration checked without errors. The answer
    /// is memoized; re-checking a finished declaration is free.
    pub(crate) fn check_decl(&mut self, decl: DeclId) -> bool {
        match self.statuses.get_copied(decl) {
            Some(RequestStatus::Success) => return true,
            Some(RequestStatus::Failure) => return false,
            Some(RequestStatus::CheckingStarted) => {
                let span = self.ast.decl_span(decl);
                let name = self.decl_name(decl).to_owned();
                self.diagnostics
                    .insert(diagnostics::circular_dependency(span, &name));
                self.statuses.insert(decl, RequestStatus::Failure);
                return false;
            }
            _ => {}
        }

        let realized = self.realized_type(decl);
        // Realization may have finished the whole request on re-entry.
        if let Some(status) = self.statuses.get_copied(decl) {
            if status.is_final() {
                return status == RequestStatus::Success;
            }
        }

        self.statuses.insert(decl, RequestStatus::CheckingStarted);
        let ok =
            ensure_sufficient_stack(|| self.check_decl_kind(decl)) && !realized.is_error();
        let status = if ok {
            RequestStatus::Success
        } else {
            RequestStatus::Failure
        };
        self.statuses.insert(decl, status);
        ok
    }

    fn check_decl_kind(&mut self, decl: DeclId) -> bool {
        match self.ast.decl(decl) {
            // Modules are checked through `check_module`, declaration by
            // declaration.
            DeclKind::Module(_) | DeclKind::Operator(_) => true,
            DeclKind::Namespace(d) => {
                let members = d.members.clone();
                self.check_members(&members)
            }
            DeclKind::Function(_) => self.check_function(decl),
            DeclKind::Initializer(_) => self.check_initializer(decl),
            DeclKind::Method(_) => self.check_method(decl),
            DeclKind::MethodImpl(_) => self.check_method_variant(decl),
            DeclKind::Subscript(_) => self.check_subscript(decl),
            DeclKind::SubscriptImpl(_) => self.check_subscript_variant(decl),
            DeclKind::ProductType(_) => self.check_product(decl),
            DeclKind::Trait(_) => self.check_trait(decl),
            DeclKind::Conformance(_) => self.check_conformance_decl(decl),
            DeclKind::Extension(_) => self.check_extension(decl),
            DeclKind::TypeAlias(_)
            | DeclKind::AssociatedType(_)
            | DeclKind::AssociatedValue(_)
            | DeclKind::GenericParameter(_)
            | DeclKind::Parameter(_)
            | DeclKind::Binding(_)
            | DeclKind::Var(_) => !self.realized_type(decl).is_error(),
        }
    }

    /// Check every member, without short-circuiting on failure.
    fn check_members(&mut self, members: &[DeclId]) -> bool {
        let mut ok = true;
        for &member in members {
            ok &= self.check_decl(member);
        }
        ok
    }

    // === Callables ===

    fn check_function(&mut self, decl: DeclId) -> bool {
        let function = self.ast.function(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        self.environment_of(decl);

        let declared = self.realized_type(decl);
        let output = match &declared {
            Ty::Lambda { output, .. } => skolemize(output),
            _ => Ty::Error,
        };

        let mut ok = self.check_parameter_defaults(&function.parameters, scope);
        match function.body {
            Some(Body::Expr(expr)) => {
                ok &= self.solve_constraints(expr, Some(output), scope, CauseKind::Return);
            }
            Some(Body::Block(stmt)) => {
                ok &= self.check_block(stmt, scope, &output);
            }
            None => {}
        }
        ok
    }

    fn check_initializer(&mut self, decl: DeclId) -> bool {
        let initializer = self.ast.initializer(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        self.environment_of(decl);

        let mut ok = self.check_parameter_defaults(&initializer.parameters, scope);
        if let Some(body) = initializer.body {
            ok &= self.check_block(body, scope, &Ty::Void);
        }
        ok
    }

    fn check_method(&mut self, decl: DeclId) -> bool {
        let method = self.ast.method(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        self.environment_of(decl);
        let mut ok = self.check_parameter_defaults(&method.parameters, scope);

        // A bundle with an `inout` variant must produce the receiver's own
        // type, so the variants stay interchangeable at call sites. An
        // elided output defaults to void and is exactly the mismatch case.
        if let Ty::Method {
            receiver, output, ..
        } = self.realized_type(decl)
        {
            let has_inout = method
                .impls
                .iter()
                .any(|v| self.ast.method_impl(*v).introducer == Capability::Inout);
            if has_inout {
                let receiver = self.relations.canonical(&receiver);
                let output = self.relations.canonical(&output);
                if output != receiver && !output.is_error() {
                    let span = self.ast.decl_span(decl);
                    self.diagnostics
                        .insert(diagnostics::inout_bundle_output_mismatch(span));
                    ok = false;
                }
            }
        }

        ok & self.check_members(&method.impls)
    }

    fn check_method_variant(&mut self, decl: DeclId) -> bool {
        let variant = self.ast.method_impl(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        // An `inout` body mutates the receiver and produces nothing; the
        // receiver-typed output of the variant's value type is synthesized.
        let output = match variant.introducer {
            Capability::Inout => Ty::Void,
            _ => match self.realized_type(decl) {
                Ty::Lambda { output, .. } => skolemize(&output),
                _ => Ty::Error,
            },
        };
        match variant.body {
            Some(Body::Expr(expr)) => {
                self.solve_constraints(expr, Some(output), scope, CauseKind::Return)
            }
            Some(Body::Block(stmt)) => self.check_block(stmt, scope, &output),
            None => true,
        }
    }

    fn check_subscript(&mut self, decl: DeclId) -> bool {
        let subscript = self.ast.subscript(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        self.environment_of(decl);
        let mut ok = match &subscript.parameters {
            Some(parameters) => self.check_parameter_defaults(parameters, scope),
            None => true,
        };
        ok &= self.check_members(&subscript.impls);
        ok
    }

    fn check_subscript_variant(&mut self, decl: DeclId) -> bool {
        let variant = self.ast.subscript_impl(decl).clone();
        let Some(scope) = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))
        else {
            return false;
        };
        // The body yields the bare output; the remote wrapper belongs to
        // the caller's view.
        let output = match self.realized_type(decl) {
            Ty::Lambda { output, .. } => match *output {
                Ty::Remote { referent, .. } => skolemize(&referent),
                other => skolemize(&other),
            },
            _ => Ty::Error,
        };
        match variant.body {
            Some(Body::Expr(expr)) => {
                self.solve_constraints(expr, Some(output), scope, CauseKind::Yield)
            }
            Some(Body::Block(stmt)) => self.check_block(stmt, scope, &output),
            None => true,
        }
    }

    /// Check each defaulted parameter's value against its declared type.
    fn check_parameter_defaults(&mut self, parameters: &[DeclId], scope: ScopeId) -> bool {
        let mut ok = true;
        for &parameter in parameters {
            let Some(default) = self.ast.parameter(parameter).default_value else {
                continue;
            };
            let declared = self.realized_type(parameter);
            let expected = skolemize(declared.bare());
            ok &= self.solve_constraints(default, Some(expected), scope, CauseKind::Argument);
        }
        ok
    }

    // === Nominal type declarations ===

    fn check_product(&mut self, decl: DeclId) -> bool {
        let payload = self.ast.product_type(decl).clone();
        let Some(scope) = self.ast.scope_of(decl) else {
            return false;
        };
        self.environment_of(decl);
        let subject = self.self_type_in(scope).unwrap_or(Ty::Error);

        let mut ok = true;
        for expr in payload.conformances {
            ok &= self.check_declared_conformance(&subject, expr, scope);
        }
        ok &= self.check_decl(payload.memberwise_init);
        ok & self.check_members(&payload.members)
    }

    fn check_trait(&mut self, decl: DeclId) -> bool {
        let payload = self.ast.trait_decl(decl).clone();
        self.environment_of(decl);
        // Walking the refinement closure diagnoses refinement cycles.
        let ok = self.conformed_traits(decl).is_some();
        ok & self.check_members(&payload.members)
    }

    fn check_conformance_decl(&mut self, decl: DeclId) -> bool {
        let payload = self.ast.conformance_decl(decl).clone();
        let Some(scope) = self.ast.scope_of(decl) else {
            return false;
        };
        let subject = match self.realized_type(decl) {
            Ty::Metatype(instance) => *instance,
            _ => Ty::Error,
        };

        let mut ok = !subject.is_error();
        for expr in payload.conformances {
            ok &= self.check_declared_conformance(&subject, expr, scope);
        }
        ok & self.check_members(&payload.members)
    }

    fn check_extension(&mut self, decl: DeclId) -> bool {
        let payload = self.ast.extension(decl).clone();
        let subject = self.realized_type(decl);
        let ok = match subject {
            Ty::Metatype(instance) => !instance.is_error(),
            _ => false,
        };
        ok & self.check_members(&payload.members)
    }

    /// Prove one entry of a declared conformance list.
    fn check_declared_conformance(
        &mut self,
        subject: &Ty,
        expr: ExprId,
        scope: ScopeId,
    ) -> bool {
        let ty = self.realize_type_expr(expr, scope);
        let Ty::Trait(trait_decl) = self.relations.canonical(&ty) else {
            if !ty.is_error() {
                let span = self.ast.expr_span(expr);
                let found = self.show(&ty);
                self.diagnostics
                    .insert(diagnostics::not_a_trait(span, &found));
            }
            return false;
        };
        self.conforms_to(subject, trait_decl, scope)
    }

    // === Statements ===

    /// Check a brace statement in its own scope.
    fn check_block(&mut self, stmt: StmtId, scope: ScopeId, output: &Ty) -> bool {
        let inner = self.ast.scope_of_brace(stmt).unwrap_or(scope);
        let StmtKind::Brace(stmts) = self.ast.stmt(stmt).kind.clone() else {
            return self.check_stmt(stmt, scope, output);
        };
        let mut ok = true;
        for s in stmts {
            ok &= self.check_stmt(s, inner, output);
        }
        ok
    }

    fn check_stmt(&mut self, stmt: StmtId, scope: ScopeId, output: &Ty) -> bool {
        let span = self.ast.stmt(stmt).span;
        let kind = self.ast.stmt(stmt).kind.clone();
        match kind {
            StmtKind::Brace(_) => self.check_block(stmt, scope, output),
            StmtKind::Decl(decl) => self.check_decl(decl),
            StmtKind::Expr(expr) => {
                let ok = self.solve_constraints(expr, None, scope, CauseKind::Structural);
                if ok {
                    let ty = self.expr_types.get(&expr).cloned();
                    if let Some(ty) = ty {
                        if !matches!(ty, Ty::Void | Ty::Never | Ty::Error) {
                            let shown = self.show(&ty);
                            self.diagnostics
                                .insert(diagnostics::unused_result(span, &shown));
                        }
                    }
                }
                ok
            }
            StmtKind::Discard(expr) => {
                self.solve_constraints(expr, None, scope, CauseKind::Structural)
            }
            StmtKind::Return(value) => match value {
                Some(expr) => {
                    self.solve_constraints(expr, Some(output.clone()), scope, CauseKind::Return)
                }
                None => {
                    if matches!(output, Ty::Void | Ty::Error) {
                        true
                    } else {
                        self.diagnostics
                            .insert(diagnostics::missing_return_value(span));
                        false
                    }
                }
            },
            StmtKind::Yield(expr) => {
                self.solve_constraints(expr, Some(output.clone()), scope, CauseKind::Yield)
            }
            StmtKind::While { condition, body } => {
                let mut ok = true;
                for item in condition {
                    match item {
                        ConditionItem::Expr(expr) => {
                            ok &= self.solve_constraints(
                                expr,
                                Some(Ty::BOOL),
                                scope,
                                CauseKind::Structural,
                            );
                        }
                        ConditionItem::Decl(decl) => ok &= self.check_decl(decl),
                    }
                }
                ok & self.check_block(body, scope, output)
            }
            StmtKind::DoWhile { body, condition } => {
                let ok = self.check_block(body, scope, output);
                // The trailing condition sees the body's declarations.
                let body_scope = self.ast.scope_of_brace(body).unwrap_or(scope);
                ok & self.solve_constraints(
                    condition,
                    Some(Ty::BOOL),
                    body_scope,
                    CauseKind::Structural,
                )
            }
            StmtKind::Assign { lhs, rhs } => self.check_assign(lhs, rhs, scope, span),
            StmtKind::For { body } => self.check_block(body, scope, output),
            StmtKind::Break | StmtKind::Continue => true,
        }
    }

    fn check_assign(&mut self, lhs: ExprId, rhs: ExprId, scope: ScopeId, span: Span) -> bool {
        let mut ok = self.solve_constraints(lhs, None, scope, CauseKind::Structural);
        let target = self.expr_types.get(&lhs).cloned().unwrap_or(Ty::Error);
        // Assignment sinks the previous value; the target's type must be
        // sinkable where that trait is in scope at all.
        if let Some(sinkable) = self.sinkable_trait(scope) {
            if !target.is_error() && !self.conforms_to(&target, sinkable, scope) {
                let model = self.show(&target);
                let trait_name = self.decl_name(sinkable).to_owned();
                self.diagnostics.insert(diagnostics::conformance_failure(
                    span,
                    &model,
                    &trait_name,
                ));
                ok = false;
            }
        }
        ok & self.solve_constraints(rhs, Some(target), scope, CauseKind::Assignment)
    }

    /// The `Sinkable` trait visible from `scope`, if one is declared.
    fn sinkable_trait(&mut self, scope: ScopeId) -> Option<DeclId> {
        let candidates = self.unqualified_lookup(self.well_known.sinkable, scope);
        candidates
            .into_iter()
            .find(|d| matches!(self.ast.decl(*d), DeclKind::Trait(_)))
    }

    // === Module-level well-formedness ===

    /// Report operator declarations sharing a notation and name within one
    /// module.
    pub(crate) fn check_operator_uniqueness(&mut self, module: DeclId) {
        let mut seen: FxHashSet<(OperatorNotation, Name)> = FxHashSet::default();
        let mut scopes = Vec::new();
        if let Some(scope) = self.ast.scope_of(module) {
            scopes.push(scope);
        }
        scopes.extend_from_slice(self.ast.files_of(module));
        for scope in scopes {
            for decl in self.ast.decls_in(scope).to_vec() {
                let DeclKind::Operator(op) = self.ast.decl(decl) else {
                    continue;
                };
                if !seen.insert((op.notation, op.name)) {
                    let span = self.ast.decl_span(decl);
                    let text = self.names.lookup(op.name).to_owned();
                    self.diagnostics
                        .insert(diagnostics::duplicate_operator(span, &text));
                }
            }
        }
    }
}
