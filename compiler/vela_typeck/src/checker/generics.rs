//! Generic environments and the conformance engine.
//!
//! The environment of a generic declaration collects its parameters and the
//! constraints imposed by conformance-list sugar and where clauses. The
//! conformance engine decides whether a model satisfies a trait by matching
//! each requirement to exactly one witness, and records proved conformances
//! in the relations table.

use rustc_hash::FxHashMap;
use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{
    ConstraintExprKind, DeclId, DeclKind, ExprId, GenericClause, InitializerKind, Name, ScopeId,
    WhereClause,
};
use vela_types::{CauseKind, Constraint, ConstraintCause, ConstraintKind, TransformAction, Ty};

use super::{diagnostics, TypeChecker};
use crate::{Conformance, GenericEnvironment, MemoState};

/// Replace generic parameters according to `map`, leaving everything else
/// alone. Skolems are opaque to the rewrite.
pub(crate) fn substitute(ty: &Ty, map: &FxHashMap<DeclId, Ty>) -> Ty {
    ty.transform(&mut |t| match t {
        Ty::GenericParam(decl) => match map.get(decl) {
            Some(replacement) => TransformAction::StepOver(replacement.clone()),
            None => TransformAction::StepOver(t.clone()),
        },
        Ty::Skolem(_) => TransformAction::StepOver(t.clone()),
        other => TransformAction::StepInto(other.clone()),
    })
}

/// Rigidify every free generic parameter of `ty`.
pub(crate) fn skolemize(ty: &Ty) -> Ty {
    ty.transform(&mut |t| match t {
        Ty::GenericParam(_) => TransformAction::StepOver(Ty::skolem(t.clone())),
        Ty::Skolem(_) => TransformAction::StepOver(t.clone()),
        other => TransformAction::StepInto(other.clone()),
    })
}

impl TypeChecker<'_> {
    /// The generic clause a declaration carries, if its kind has one.
    pub(crate) fn generic_clause_of(&self, decl: DeclId) -> Option<GenericClause> {
        match self.ast.decl(decl) {
            DeclKind::Function(d) => d.generic.clone(),
            DeclKind::Initializer(d) => d.generic.clone(),
            DeclKind::Method(d) => d.generic.clone(),
            DeclKind::Subscript(d) => d.generic.clone(),
            DeclKind::ProductType(d) => d.generic.clone(),
            DeclKind::TypeAlias(d) => d.generic.clone(),
            _ => None,
        }
    }

    /// The generic parameters a declaration introduces.
    pub(crate) fn generic_parameters_of(&self, decl: DeclId) -> Vec<DeclId> {
        self.generic_clause_of(decl)
            .map(|clause| clause.parameters)
            .unwrap_or_default()
    }

    /// The generic environment of `decl`, or `None` if it is not generic.
    ///
    /// Memoized; observing the computation mid-flight panics, since no
    /// well-formed input lets an environment depend on itself.
    pub(crate) fn environment_of(&mut self, decl: DeclId) -> Option<GenericEnvironment> {
        if let Some(state) = self.environments.get(&decl) {
            return state.finished().clone();
        }
        self.environments.insert(decl, MemoState::InProgress);
        let environment = self.compute_environment(decl);
        self.environments
            .insert(decl, MemoState::Done(environment.clone()));
        environment
    }

    fn compute_environment(&mut self, decl: DeclId) -> Option<GenericEnvironment> {
        // A trait's environment is its implicit `Self` parameter with the
        // reflexive conformance constraint.
        if let DeclKind::Trait(t) = self.ast.decl(decl) {
            let self_parameter = t.self_parameter;
            let span = self.ast.decl_span(decl);
            let mut environment = GenericEnvironment::new(decl);
            environment.parameters.push(self_parameter);
            environment.constraints.push(Constraint::conformance(
                Ty::GenericParam(self_parameter),
                [decl],
                ConstraintCause::new(CauseKind::Annotation, span),
            ));
            return Some(environment);
        }

        let clause = self.generic_clause_of(decl)?;
        let scope = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl))?;
        let mut environment = GenericEnvironment::new(decl);
        environment.parameters = clause.parameters.clone();

        for &parameter in &clause.parameters {
            let conformances = match self.ast.decl(parameter) {
                DeclKind::GenericParameter(p) => p.conformances.clone(),
                _ => Vec::new(),
            };
            let mut bounds = Vec::new();
            for expr in conformances {
                let ty = self.realize_type_expr(expr, scope);
                match self.relations.canonical(&ty) {
                    Ty::Trait(t) => bounds.push(t),
                    Ty::Error => {}
                    // A non-trait first entry denotes a value parameter; the
                    // realizer diagnoses anything after it.
                    _ => break,
                }
            }
            if !bounds.is_empty() {
                let span = self.ast.decl_span(parameter);
                environment.constraints.push(Constraint::conformance(
                    Ty::GenericParam(parameter),
                    bounds,
                    ConstraintCause::new(CauseKind::Annotation, span),
                ));
            }
        }

        if let Some(where_clause) = clause.where_clause.clone() {
            let mut constraints = std::mem::take(&mut environment.constraints);
            self.eval_where_clause(&where_clause, scope, &mut constraints);
            environment.constraints = constraints;
        }
        Some(environment)
    }

    /// Evaluate a where clause into constraints, diagnosing malformed
    /// entries.
    pub(crate) fn eval_where_clause(
        &mut self,
        clause: &WhereClause,
        scope: ScopeId,
        constraints: &mut Vec<Constraint>,
    ) {
        for constraint in &clause.constraints {
            let cause = ConstraintCause::new(CauseKind::Annotation, constraint.span);
            match &constraint.kind {
                ConstraintExprKind::Equality { lhs, rhs } => {
                    let lhs = self.realize_type_expr(*lhs, scope);
                    let rhs = self.realize_type_expr(*rhs, scope);
                    if !lhs.has_generic_param() && !rhs.has_generic_param() {
                        self.diagnostics
                            .insert(diagnostics::invalid_constraint(constraint.span));
                        continue;
                    }
                    constraints.push(Constraint::equality(lhs, rhs, cause));
                }
                ConstraintExprKind::Conformance { subject, traits } => {
                    let subject_ty = self.realize_type_expr(*subject, scope);
                    if !subject_ty.has_generic_param() {
                        self.diagnostics
                            .insert(diagnostics::invalid_constraint(constraint.span));
                        continue;
                    }
                    let mut bounds = Vec::new();
                    for &t in traits {
                        let ty = self.realize_type_expr(t, scope);
                        match self.relations.canonical(&ty) {
                            Ty::Trait(d) => bounds.push(d),
                            Ty::Error => {}
                            other => {
                                let found = self.show(&other);
                                let span = self.ast.expr_span(t);
                                self.diagnostics
                                    .insert(diagnostics::not_a_trait(span, &found));
                            }
                        }
                    }
                    if !bounds.is_empty() {
                        constraints.push(Constraint::conformance(subject_ty, bounds, cause));
                    }
                }
                ConstraintExprKind::Value(expr) => {
                    // Symbolic evaluation of value predicates is deferred;
                    // the constraint is carried but never solved.
                    constraints.push(Constraint::new(ConstraintKind::Predicate(*expr), cause));
                }
            }
        }
    }

    /// The transitive refinement closure of a trait, including itself.
    ///
    /// `None` when the closure runs through a refinement cycle; the cycle
    /// is diagnosed.
    pub(crate) fn conformed_traits(&mut self, trait_decl: DeclId) -> Option<Vec<DeclId>> {
        let mut closure = vec![trait_decl];
        let mut worklist = vec![trait_decl];
        let mut cyclic = false;
        while let Some(current) = worklist.pop() {
            let refinements = self.ast.trait_decl(current).refinements.clone();
            let Some(scope) = self
                .ast
                .scope_containing(current)
                .or_else(|| self.ast.scope_of(current))
            else {
                continue;
            };
            for refinement in refinements {
                let ty = self.realize_type_expr(refinement, scope);
                match self.relations.canonical(&ty) {
                    Ty::Trait(refined) => {
                        if refined == trait_decl || refined == current {
                            let span = self.ast.expr_span(refinement);
                            let name = self.decl_name(trait_decl).to_owned();
                            self.diagnostics
                                .insert(diagnostics::circular_refinement(span, &name));
                            cyclic = true;
                            continue;
                        }
                        if !closure.contains(&refined) {
                            closure.push(refined);
                            worklist.push(refined);
                        }
                    }
                    Ty::Error => {}
                    other => {
                        let found = self.show(&other);
                        let span = self.ast.expr_span(refinement);
                        self.diagnostics
                            .insert(diagnostics::not_a_trait(span, &found));
                    }
                }
            }
        }
        if cyclic {
            return None;
        }
        closure.sort_by_key(|t| t.raw());
        Some(closure)
    }

    /// The traits `subject` declares conformance to, directly or through
    /// conformance declarations visible from `scope`, closed under
    /// refinement.
    pub(crate) fn conformed_trait_decls(&mut self, subject: &Ty, scope: ScopeId) -> Vec<DeclId> {
        let canonical = self.relations.canonical(subject);
        let mut traits: Vec<DeclId> = Vec::new();
        match &canonical {
            Ty::Product(decl) => {
                let decl = *decl;
                let conformances = self.ast.product_type(decl).conformances.clone();
                let decl_scope = self
                    .ast
                    .scope_of(decl)
                    .or_else(|| self.ast.scope_containing(decl));
                if let Some(decl_scope) = decl_scope {
                    for expr in conformances {
                        self.collect_declared_trait(expr, decl_scope, &mut traits);
                    }
                }
            }
            Ty::Trait(decl) => {
                traits.extend(self.conformed_traits(*decl).unwrap_or_default());
            }
            Ty::GenericParam(decl) => {
                traits.extend(self.bounds_of_generic_param(*decl));
            }
            Ty::Skolem(base) | Ty::BoundGeneric { base, .. } => {
                return self.conformed_trait_decls(&base.clone(), scope);
            }
            _ => {}
        }
        for extension in self.extending_decls(&canonical, scope) {
            let exprs = match self.ast.decl(extension) {
                DeclKind::Conformance(c) => c.conformances.clone(),
                _ => continue,
            };
            let Some(decl_scope) = self.ast.scope_of(extension) else {
                continue;
            };
            for expr in exprs {
                self.collect_declared_trait(expr, decl_scope, &mut traits);
            }
        }
        traits.sort_by_key(|t| t.raw());
        traits.dedup();
        traits
    }

    fn collect_declared_trait(&mut self, expr: ExprId, scope: ScopeId, into: &mut Vec<DeclId>) {
        let ty = self.realize_type_expr(expr, scope);
        match self.relations.canonical(&ty) {
            Ty::Trait(t) => into.extend(self.conformed_traits(t).unwrap_or_default()),
            Ty::Error => {}
            other => {
                let found = self.show(&other);
                let span = self.ast.expr_span(expr);
                self.diagnostics
                    .insert(diagnostics::not_a_trait(span, &found));
            }
        }
    }

    /// The trait bounds of a generic parameter, closed under refinement.
    pub(crate) fn bounds_of_generic_param(&mut self, decl: DeclId) -> Vec<DeclId> {
        let Some(scope) = self.ast.scope_containing(decl) else {
            return Vec::new();
        };
        let owner = self.ast.scope(scope).decl();

        // A trait's implicit `Self` parameter is bounded by the trait.
        if let Some(owner) = owner {
            if let DeclKind::Trait(t) = self.ast.decl(owner) {
                if t.self_parameter == decl {
                    return self.conformed_traits(owner).unwrap_or_default();
                }
            }
        }

        let mut bounds = Vec::new();
        let conformances = match self.ast.decl(decl) {
            DeclKind::GenericParameter(p) => p.conformances.clone(),
            _ => Vec::new(),
        };
        for expr in conformances {
            let ty = self.realize_type_expr(expr, scope);
            match self.relations.canonical(&ty) {
                Ty::Trait(t) => bounds.extend(self.conformed_traits(t).unwrap_or_default()),
                // A non-trait first entry denotes a value parameter.
                _ => break,
            }
        }

        if let Some(owner) = owner {
            if let Some(clause) = self.generic_clause_of(owner).and_then(|g| g.where_clause) {
                for constraint in &clause.constraints {
                    let ConstraintExprKind::Conformance { subject, traits } = &constraint.kind
                    else {
                        continue;
                    };
                    let subject_ty = self.realize_type_expr(*subject, scope);
                    if self.relations.canonical(&subject_ty) != Ty::GenericParam(decl) {
                        continue;
                    }
                    for &t in traits {
                        let ty = self.realize_type_expr(t, scope);
                        if let Ty::Trait(bound) = self.relations.canonical(&ty) {
                            bounds.extend(self.conformed_traits(bound).unwrap_or_default());
                        }
                    }
                }
            }
        }

        bounds.sort_by_key(|t| t.raw());
        bounds.dedup();
        bounds
    }

    /// Whether `subject` conforms to `trait_decl`, proving and recording
    /// the conformance on first demand.
    pub(crate) fn conforms_to(&mut self, subject: &Ty, trait_decl: DeclId, scope: ScopeId) -> bool {
        let canonical = self.relations.canonical(subject);
        match &canonical {
            // The error type absorbs every obligation.
            Ty::Error => true,
            Ty::Var(_) => false,
            Ty::GenericParam(decl) => self.bounds_of_generic_param(*decl).contains(&trait_decl),
            Ty::Skolem(base) => {
                let base = base.clone();
                self.conforms_to(&base, trait_decl, scope)
            }
            Ty::Trait(decl) => self
                .conformed_traits(*decl)
                .is_some_and(|closure| closure.contains(&trait_decl)),
            Ty::Sum(elements) => {
                let elements = elements.clone();
                elements
                    .iter()
                    .all(|e| self.conforms_to(e, trait_decl, scope))
            }
            Ty::BoundGeneric { base, .. } => {
                let base = base.clone();
                self.conforms_to(&base, trait_decl, scope)
            }
            _ => {
                if self.relations.conformance(&canonical, trait_decl).is_some() {
                    return true;
                }
                if !self
                    .conformed_trait_decls(&canonical, scope)
                    .contains(&trait_decl)
                {
                    return false;
                }
                self.establish_conformance(&canonical, trait_decl, scope)
            }
        }
    }

    fn establish_conformance(&mut self, model: &Ty, trait_decl: DeclId, scope: ScopeId) -> bool {
        let key = (model.clone(), trait_decl);
        if !self.conformances_in_flight.insert(key.clone()) {
            // Already being proved further up the stack; assume it holds,
            // the outer frame reports otherwise.
            return true;
        }
        let source = self.conformance_source(model, trait_decl, scope);
        let outcome = self.check_conformance(model, trait_decl, source, scope);
        self.conformances_in_flight.remove(&key);
        match outcome {
            Some(conformance) => {
                if self.relations.conformance(model, trait_decl).is_none() {
                    self.relations.insert_conformance(model, conformance);
                }
                true
            }
            None => false,
        }
    }

    /// The declaration that declared `model: trait_decl`: the product type
    /// itself, or the conformance declaration extending it.
    fn conformance_source(&mut self, model: &Ty, trait_decl: DeclId, scope: ScopeId) -> DeclId {
        if let Some(decl) = model.nominal_decl() {
            if let DeclKind::ProductType(p) = self.ast.decl(decl) {
                let conformances = p.conformances.clone();
                let decl_scope = self
                    .ast
                    .scope_of(decl)
                    .or_else(|| self.ast.scope_containing(decl));
                if let Some(decl_scope) = decl_scope {
                    for expr in conformances {
                        let ty = self.realize_type_expr(expr, decl_scope);
                        if matches!(self.relations.canonical(&ty), Ty::Trait(t) if t == trait_decl)
                        {
                            return decl;
                        }
                    }
                }
            }
        }
        for extension in self.extending_decls(model, scope) {
            let exprs = match self.ast.decl(extension) {
                DeclKind::Conformance(c) => c.conformances.clone(),
                _ => continue,
            };
            let Some(decl_scope) = self.ast.scope_of(extension) else {
                continue;
            };
            for expr in exprs {
                let ty = self.realize_type_expr(expr, decl_scope);
                if matches!(self.relations.canonical(&ty), Ty::Trait(t) if t == trait_decl) {
                    return extension;
                }
            }
        }
        model.nominal_decl().unwrap_or(trait_decl)
    }

    /// Match every requirement of `trait_decl` to a witness in `model`.
    ///
    /// Success yields the implementation map; failure reports one
    /// aggregated diagnostic carrying a note per unsatisfied requirement.
    pub(crate) fn check_conformance(
        &mut self,
        model: &Ty,
        trait_decl: DeclId,
        source: DeclId,
        scope: ScopeId,
    ) -> Option<Conformance> {
        let payload = self.ast.trait_decl(trait_decl).clone();
        let mut substitution = FxHashMap::default();
        substitution.insert(payload.self_parameter, model.clone());

        let mut implementations = FxHashMap::default();
        let mut notes = Vec::new();

        for requirement in payload.members {
            if matches!(
                self.ast.decl(requirement),
                DeclKind::AssociatedType(_) | DeclKind::AssociatedValue(_)
            ) {
                continue;
            }
            let Some(stem) = self.requirement_stem(requirement) else {
                continue;
            };
            let required = self.realized_type(requirement);
            let required = substitute(&self.relations.canonical(&required), &substitution);

            let mut witnesses = Vec::new();
            for candidate in self.member_lookup(stem, model, scope) {
                if candidate == requirement || !self.has_witness_body(candidate) {
                    continue;
                }
                let candidate_ty = self.realized_type(candidate);
                if self.relations.canonical(&candidate_ty) == required {
                    witnesses.push(candidate);
                }
            }

            let name = self.names.lookup(stem).to_owned();
            let span = self.ast.decl_span(requirement);
            match witnesses.len() {
                1 => {
                    implementations.insert(requirement, witnesses[0]);
                }
                // A requirement with a default body witnesses itself.
                0 if self.has_witness_body(requirement) => {
                    implementations.insert(requirement, requirement);
                }
                0 => notes.push(
                    Diagnostic::note(ErrorCode::ConformanceFailure, span).with_message(format!(
                        "no implementation of `{name}` matches its requirement"
                    )),
                ),
                _ => notes.push(
                    Diagnostic::note(ErrorCode::AmbiguousRequirement, span).with_message(format!(
                        "requirement `{name}` matches several candidates"
                    )),
                ),
            }
        }

        if notes.is_empty() {
            Some(Conformance {
                source,
                trait_decl,
                scope,
                implementations,
            })
        } else {
            let model_name = self.show(model);
            let trait_name = self.decl_name(trait_decl).to_owned();
            let span = self.ast.decl_span(source);
            self.diagnostics.insert(
                diagnostics::conformance_failure(span, &model_name, &trait_name).with_notes(notes),
            );
            None
        }
    }

    /// The stem a requirement is looked up under in a model.
    fn requirement_stem(&self, decl: DeclId) -> Option<Name> {
        match self.ast.decl(decl) {
            DeclKind::Function(d) => d.name,
            DeclKind::Method(d) => Some(d.name),
            DeclKind::Subscript(d) => d.name,
            DeclKind::Initializer(_) => Some(self.well_known.init),
            _ => None,
        }
    }

    /// Whether `decl` carries a body that can serve as a witness.
    fn has_witness_body(&self, decl: DeclId) -> bool {
        match self.ast.decl(decl) {
            DeclKind::Function(f) => f.body.is_some(),
            DeclKind::Initializer(i) => {
                i.body.is_some() || matches!(i.introducer, InitializerKind::Memberwise)
            }
            DeclKind::Method(m) => m
                .impls
                .iter()
                .any(|v| self.ast.method_impl(*v).body.is_some()),
            DeclKind::Subscript(s) => s
                .impls
                .iter()
                .any(|v| self.ast.subscript_impl(*v).body.is_some()),
            _ => false,
        }
    }
}
