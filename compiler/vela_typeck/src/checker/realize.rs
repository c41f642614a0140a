//! Declaration realization.
//!
//! Realizing a declaration computes its declared type from annotations
//! alone, without checking bodies. Realization is memoized through the
//! request state machine: observing a request already on the stack is a
//! circular dependency, diagnosed once and answered with the error type
//! from then on.

use vela_ir::{
    Body, Capability, DeclId, DeclKind, ExprId, ExprKind, FunctionFlags, InitializerKind, Name,
    NameDomain, ScopeId, Span,
};
use vela_types::{BuiltinType, CallableParam, CapabilitySet, Ty};

use super::{diagnostics, TypeChecker};
use crate::{ensure_sufficient_stack, RequestStatus};

impl TypeChecker<'_> {
    /// The declared type of `decl`, realizing it on first request.
    pub(crate) fn realized_type(&mut self, decl: DeclId) -> Ty {
        match self.statuses.get_copied(decl) {
            Some(status) if status.is_in_progress() && !self.decl_types.contains(decl) => {
                let span = self.ast.decl_span(decl);
                let name = self.decl_name(decl).to_owned();
                self.diagnostics
                    .insert(diagnostics::circular_dependency(span, &name));
                self.statuses.insert(decl, RequestStatus::Failure);
                self.decl_types.insert(decl, Ty::Error);
                Ty::Error
            }
            Some(_) if self.decl_types.contains(decl) => self
                .decl_types
                .get(decl)
                .cloned()
                .unwrap_or(Ty::Error),
            _ => {
                self.statuses.insert(decl, RequestStatus::RealizationStarted);
                let ty = ensure_sufficient_stack(|| self.realize_decl(decl));
                self.decl_types.insert(decl, ty.clone());
                if self.statuses.get_copied(decl) == Some(RequestStatus::RealizationStarted) {
                    self.statuses
                        .insert(decl, RequestStatus::RealizationCompleted);
                }
                ty
            }
        }
    }

    fn realize_decl(&mut self, decl: DeclId) -> Ty {
        match self.ast.decl(decl) {
            // Modules and namespaces are pure declaration spaces.
            DeclKind::Module(_) | DeclKind::Namespace(_) | DeclKind::Operator(_) => Ty::Void,
            DeclKind::Function(_) => self.realize_function(decl),
            DeclKind::Initializer(_) => self.realize_initializer(decl),
            DeclKind::Method(_) => self.realize_method_bundle(decl),
            DeclKind::MethodImpl(_) => self.realize_method_impl(decl),
            DeclKind::Subscript(_) => self.realize_subscript(decl),
            DeclKind::SubscriptImpl(_) => self.realize_subscript_impl(decl),
            DeclKind::ProductType(_) => Ty::metatype(Ty::Product(decl)),
            DeclKind::Trait(_) => Ty::metatype(Ty::Trait(decl)),
            DeclKind::TypeAlias(_) => self.realize_type_alias(decl),
            DeclKind::AssociatedType(_) => self.realize_associated_type(decl),
            DeclKind::AssociatedValue(_) => self.realize_associated_value(decl),
            DeclKind::GenericParameter(_) => self.realize_generic_parameter(decl),
            DeclKind::Parameter(_) => self.realize_parameter(decl),
            DeclKind::Binding(_) => self.realize_binding(decl),
            DeclKind::Var(_) => self.realize_var(decl),
            DeclKind::Conformance(_) | DeclKind::Extension(_) => self.realize_extension_subject(decl),
        }
    }

    // === Callables ===

    fn realize_function(&mut self, decl: DeclId) -> Ty {
        let function = self.ast.function(decl).clone();
        let scope = self
            .ast
            .scope_of(decl)
            .or_else(|| self.ast.scope_containing(decl));
        let Some(scope) = scope else { return Ty::Error };

        self.check_distinct_parameter_names(&function.parameters);
        self.check_distinct_capture_names(&function.explicit_captures);

        let in_expr_context = function.flags.contains(FunctionFlags::IN_EXPR_CONTEXT);
        let inputs = self.realize_inputs(&function.parameters, in_expr_context);

        let output = match function.output {
            Some(expr) => self.realize_type_expr(expr, scope),
            None if in_expr_context => self.fresh_var(),
            None => Ty::Void,
        };

        let receiver_effect = if function.flags.contains(FunctionFlags::INOUT) {
            Some(Capability::Inout)
        } else if function.flags.contains(FunctionFlags::SINK) {
            Some(Capability::Sink)
        } else {
            None
        };

        let environment = self.realize_environment(decl, &function.explicit_captures);

        let missing_body = function.body.is_none()
            && !function.flags.contains(FunctionFlags::FOREIGN)
            && !self.ast.is_requirement(decl);
        if missing_body {
            let span = self.ast.decl_span(decl);
            self.diagnostics.insert(diagnostics::missing_body(span));
        }

        Ty::Lambda {
            receiver_effect,
            environment: Box::new(environment),
            inputs,
            output: Box::new(output),
        }
    }

    fn realize_initializer(&mut self, decl: DeclId) -> Ty {
        let initializer = self.ast.initializer(decl).clone();
        let Some(parent) = self.ast.member_parent(decl) else {
            return Ty::Error;
        };
        let Some(scope) = self.ast.scope_of(decl).or_else(|| self.ast.scope_containing(decl))
        else {
            return Ty::Error;
        };
        let receiver_ty = match self.self_type_in(scope) {
            Some(ty) => ty,
            None => Ty::Error,
        };

        let mut inputs = Vec::new();
        match initializer.introducer {
            InitializerKind::Memberwise => {
                // One `sink` input per stored variable, in declaration
                // order.
                let members = match self.ast.decl(parent) {
                    DeclKind::ProductType(p) => p.members.clone(),
                    _ => Vec::new(),
                };
                for member in members {
                    if let DeclKind::Binding(b) = self.ast.decl(member) {
                        let pattern = b.pattern;
                        self.realized_type(member);
                        let mut vars = Vec::new();
                        self.ast.collect_pattern_vars(pattern, &mut vars);
                        for var in vars {
                            let name = self.ast.var(var).name;
                            let ty = self
                                .decl_types
                                .get(var)
                                .cloned()
                                .unwrap_or(Ty::Error);
                            inputs.push(CallableParam::new(
                                Some(name),
                                Ty::parameter(Capability::Sink, ty),
                            ));
                        }
                    }
                }
            }
            InitializerKind::Init => {
                self.check_distinct_parameter_names(&initializer.parameters);
                inputs = self.realize_inputs(&initializer.parameters, false);
            }
        }

        // The receiver comes first, by `set` convention: the initializer's
        // job is to initialize it.
        let receiver = CallableParam::new(
            Some(self.well_known.self_type),
            Ty::parameter(Capability::Set, receiver_ty),
        );
        let mut all = vec![receiver];
        all.extend(inputs);

        // Record the receiver parameter's type as well.
        let receiver_decl = initializer.receiver;
        if !self.decl_types.contains(receiver_decl) {
            let ty = all[0].ty.clone();
            self.decl_types.insert(receiver_decl, ty);
            self.statuses
                .insert(receiver_decl, RequestStatus::RealizationCompleted);
        }

        Ty::thin_lambda(all, Ty::Void)
    }

    fn realize_method_bundle(&mut self, decl: DeclId) -> Ty {
        let method = self.ast.method(decl).clone();
        let Some(scope) = self.ast.scope_of(decl).or_else(|| self.ast.scope_containing(decl))
        else {
            return Ty::Error;
        };
        self.check_distinct_parameter_names(&method.parameters);

        let receiver = match self.self_type_in(scope) {
            Some(ty) => ty,
            None => Ty::Error,
        };
        let inputs = self.realize_inputs(&method.parameters, false);
        let output = match method.output {
            Some(expr) => self.realize_type_expr(expr, scope),
            None => Ty::Void,
        };

        let mut capabilities = CapabilitySet::empty();
        for variant in &method.impls {
            let introducer = self.ast.method_impl(*variant).introducer;
            capabilities |= introducer.into();
        }
        if capabilities.is_empty() {
            capabilities = CapabilitySet::LET;
        }

        Ty::Method {
            capabilities,
            receiver: Box::new(receiver),
            inputs,
            output: Box::new(output),
        }
    }

    fn realize_method_impl(&mut self, decl: DeclId) -> Ty {
        let variant = self.ast.method_impl(decl).clone();
        let Some(bundle) = self
            .ast
            .scope_containing(decl)
            .and_then(|s| self.ast.scope(s).decl())
        else {
            return Ty::Error;
        };
        let bundle_ty = self.realized_type(bundle);
        let Ty::Method {
            receiver,
            inputs,
            output,
            ..
        } = bundle_ty
        else {
            return Ty::Error;
        };

        // The variant's value type: the receiver moves into the
        // environment under the variant's capability, and an `inout`
        // variant returns the updated receiver.
        let receiver_decl = variant.receiver;
        let receiver_param_ty =
            Ty::parameter(variant.introducer, (*receiver).clone());
        if !self.decl_types.contains(receiver_decl) {
            self.decl_types.insert(receiver_decl, receiver_param_ty);
            self.statuses
                .insert(receiver_decl, RequestStatus::RealizationCompleted);
        }

        let output = match variant.introducer {
            Capability::Inout => receiver.clone(),
            _ => output,
        };
        Ty::Lambda {
            receiver_effect: Some(variant.introducer),
            environment: Box::new(Ty::remote(variant.introducer, (*receiver).clone())),
            inputs,
            output,
        }
    }

    fn realize_subscript(&mut self, decl: DeclId) -> Ty {
        let subscript = self.ast.subscript(decl).clone();
        let Some(scope) = self.ast.scope_of(decl).or_else(|| self.ast.scope_containing(decl))
        else {
            return Ty::Error;
        };
        self.check_distinct_capture_names(&subscript.explicit_captures);
        if let Some(parameters) = &subscript.parameters {
            self.check_distinct_parameter_names(parameters);
        }

        let inputs = match &subscript.parameters {
            Some(parameters) => self.realize_inputs(parameters, false),
            None => Vec::new(),
        };
        let output = self.realize_type_expr(subscript.output, scope);
        let environment = self.realize_environment(decl, &subscript.explicit_captures);

        let mut capabilities = CapabilitySet::empty();
        for variant in &subscript.impls {
            let introducer = self.ast.subscript_impl(*variant).introducer;
            capabilities |= introducer.into();
        }
        if capabilities.is_empty() {
            capabilities = CapabilitySet::LET;
        }

        Ty::Subscript {
            is_property: subscript.parameters.is_none(),
            capabilities,
            environment: Box::new(environment),
            inputs,
            output: Box::new(output),
        }
    }

    fn realize_subscript_impl(&mut self, decl: DeclId) -> Ty {
        let variant = self.ast.subscript_impl(decl).clone();
        let Some(bundle) = self
            .ast
            .scope_containing(decl)
            .and_then(|s| self.ast.scope(s).decl())
        else {
            return Ty::Error;
        };
        let bundle_ty = self.realized_type(bundle);
        let Ty::Subscript {
            environment,
            inputs,
            output,
            ..
        } = bundle_ty
        else {
            return Ty::Error;
        };
        if let Some(receiver_decl) = variant.receiver {
            if !self.decl_types.contains(receiver_decl) {
                let scope = self.ast.scope_containing(decl);
                let receiver_ty = scope
                    .and_then(|s| self.self_type_in(s))
                    .unwrap_or(Ty::Error);
                self.decl_types.insert(
                    receiver_decl,
                    Ty::parameter(variant.introducer, receiver_ty),
                );
                self.statuses
                    .insert(receiver_decl, RequestStatus::RealizationCompleted);
            }
        }
        Ty::Lambda {
            receiver_effect: Some(variant.introducer),
            environment,
            inputs,
            output: Box::new(Ty::remote(variant.introducer, *output)),
        }
    }

    /// Realize a parameter list into callable inputs.
    fn realize_inputs(&mut self, parameters: &[DeclId], in_expr_context: bool) -> Vec<CallableParam> {
        let mut inputs = Vec::new();
        for &parameter in parameters {
            let payload = self.ast.parameter(parameter).clone();
            let label = payload.label.or(Some(payload.name));
            let ty = if payload.annotation.is_none() && in_expr_context {
                // Lambda parameters may elide annotations; inference fills
                // them in.
                let var = self.fresh_var();
                let ty = Ty::parameter(Capability::Let, var);
                self.decl_types.insert(parameter, ty.clone());
                self.statuses
                    .insert(parameter, RequestStatus::RealizationCompleted);
                ty
            } else {
                self.realized_type(parameter)
            };
            inputs.push(CallableParam::new(label, ty));
        }
        inputs
    }

    fn realize_parameter(&mut self, decl: DeclId) -> Ty {
        let parameter = self.ast.parameter(decl).clone();
        let Some(scope) = self.ast.scope_containing(decl) else {
            return Ty::Error;
        };
        match parameter.annotation {
            Some(annotation) => {
                let expr = self.ast.expr(annotation);
                match &expr.kind {
                    ExprKind::ParameterType { convention, bare } => {
                        let bare = self.realize_type_expr(*bare, scope);
                        Ty::parameter(*convention, bare)
                    }
                    _ => {
                        let bare = self.realize_type_expr(annotation, scope);
                        Ty::parameter(Capability::Let, bare)
                    }
                }
            }
            None => {
                let span = self.ast.decl_span(decl);
                self.diagnostics.insert(diagnostics::not_enough_context(span));
                Ty::Error
            }
        }
    }

    /// The capture environment of a function or subscript.
    fn realize_environment(&mut self, decl: DeclId, explicit_captures: &[DeclId]) -> Ty {
        if let Some(receiver) = self.receiver_of(decl) {
            return receiver;
        }
        if explicit_captures.is_empty() {
            return Ty::Void;
        }
        let mut fields = Vec::new();
        for &capture in explicit_captures {
            let ty = self.realized_type(capture);
            let payload = self.ast.decl(capture);
            let introducer = match payload {
                DeclKind::Binding(b) => match self.ast.pattern(b.pattern).kind {
                    vela_ir::PatternKind::Binding { introducer, .. } => introducer,
                    _ => vela_ir::BindingIntroducer::Let,
                },
                _ => vela_ir::BindingIntroducer::Let,
            };
            let field = match introducer {
                vela_ir::BindingIntroducer::Let => Ty::remote(Capability::Let, ty),
                vela_ir::BindingIntroducer::Inout => Ty::remote(Capability::Inout, ty),
                // `var` and `sink` captures are owned by value.
                vela_ir::BindingIntroducer::Var | vela_ir::BindingIntroducer::SinkLet => ty,
            };
            fields.push(vela_types::TupleField::bare(field));
        }
        Ty::Tuple(fields)
    }

    /// The receiver type a non-static member callable closes over.
    fn receiver_of(&mut self, decl: DeclId) -> Option<Ty> {
        if !self.ast.is_non_static_member(decl) {
            return None;
        }
        if !matches!(self.ast.decl(decl), DeclKind::Function(_)) {
            return None;
        }
        let flags = self.ast.function(decl).flags;
        let scope = self.ast.scope_containing(decl)?;
        let receiver = self.self_type_in(scope)?;
        let field = if flags.contains(FunctionFlags::SINK) {
            receiver
        } else if flags.contains(FunctionFlags::INOUT) {
            Ty::remote(Capability::Inout, receiver)
        } else {
            Ty::remote(Capability::Let, receiver)
        };
        Some(field)
    }

    // === Nominal type declarations ===

    fn realize_type_alias(&mut self, decl: DeclId) -> Ty {
        let alias = self.ast.type_alias(decl).clone();
        let Some(scope) = self.ast.scope_of(decl).or_else(|| self.ast.scope_containing(decl))
        else {
            return Ty::Error;
        };
        let aliasee = self.realize_type_expr(alias.aliased, scope);
        if aliasee.is_error() {
            return Ty::Error;
        }
        Ty::metatype(Ty::Alias {
            decl,
            aliasee: Box::new(aliasee),
        })
    }

    fn realize_associated_type(&mut self, decl: DeclId) -> Ty {
        let Some(parent) = self.ast.member_parent(decl) else {
            return Ty::Error;
        };
        if !matches!(self.ast.decl(parent), DeclKind::Trait(_)) {
            let span = self.ast.decl_span(decl);
            self.diagnostics
                .insert(diagnostics::invalid_use_of_associated_type(span));
            return Ty::Error;
        }
        let self_param = self.ast.trait_decl(parent).self_parameter;
        Ty::metatype(Ty::Associated {
            decl,
            domain: Box::new(Ty::GenericParam(self_param)),
        })
    }

    fn realize_associated_value(&mut self, decl: DeclId) -> Ty {
        let Some(parent) = self.ast.member_parent(decl) else {
            return Ty::Error;
        };
        if !matches!(self.ast.decl(parent), DeclKind::Trait(_)) {
            return Ty::Error;
        }
        // Associated values are untyped requirements until conformance
        // checking binds them; their declared type is inferred per model.
        self.fresh_var()
    }

    fn realize_generic_parameter(&mut self, decl: DeclId) -> Ty {
        let parameter = self.ast.generic_parameter(decl).clone();
        let Some(scope) = self.ast.scope_containing(decl) else {
            return Ty::Error;
        };
        // If the first entry of the conformance list is not a trait, the
        // declaration denotes a generic value parameter of that type.
        if let Some(&first) = parameter.conformances.first() {
            let first_ty = self.realize_type_expr(first, scope);
            let is_trait = matches!(self.relations.canonical(&first_ty), Ty::Trait(_));
            if !is_trait {
                if parameter.conformances.len() > 1 {
                    let span = self.ast.expr_span(parameter.conformances[1]);
                    self.diagnostics.insert(diagnostics::invalid_constraint(span));
                }
                return first_ty;
            }
        }
        Ty::metatype(Ty::GenericParam(decl))
    }

    fn realize_extension_subject(&mut self, decl: DeclId) -> Ty {
        let subject_expr = match self.ast.decl(decl) {
            DeclKind::Conformance(c) => c.subject,
            DeclKind::Extension(e) => e.subject,
            _ => return Ty::Error,
        };
        let Some(scope) = self.ast.scope_of(decl).or_else(|| self.ast.scope_containing(decl))
        else {
            return Ty::Error;
        };
        self.extensions_under_binding.insert(decl);
        let subject = self.realize_type_expr(subject_expr, scope);
        self.extensions_under_binding.remove(&decl);
        Ty::metatype(subject)
    }

    // === Bindings ===

    fn realize_binding(&mut self, decl: DeclId) -> Ty {
        let binding = self.ast.binding(decl).clone();
        let Some(scope) = self.ast.scope_containing(decl) else {
            return Ty::Error;
        };
        let annotation = match self.ast.pattern(binding.pattern).kind {
            vela_ir::PatternKind::Binding { annotation, .. } => annotation,
            _ => None,
        };
        let subpattern = match self.ast.pattern(binding.pattern).kind {
            vela_ir::PatternKind::Binding { subpattern, .. } => subpattern,
            _ => binding.pattern,
        };

        let ty = match (annotation, binding.initializer) {
            (Some(annotation), initializer) => {
                let declared = self.realize_type_expr(annotation, scope);
                if let Some(initializer) = initializer {
                    self.check_binding_initializer(initializer, &declared, scope);
                }
                declared
            }
            (None, Some(initializer)) => self.infer_binding_initializer(initializer, scope),
            (None, None) => {
                // Upstream must not produce such a binding.
                panic!("binding declaration with neither annotation nor initializer")
            }
        };

        self.assign_pattern_types(subpattern, &ty);
        ty
    }

    /// Distribute a binding's type across the variables of its pattern.
    fn assign_pattern_types(&mut self, pattern: vela_ir::PatternId, ty: &Ty) {
        match &self.ast.pattern(pattern).kind {
            vela_ir::PatternKind::Binding { subpattern, .. } => {
                self.assign_pattern_types(*subpattern, ty);
            }
            vela_ir::PatternKind::Name(var) => {
                let var = *var;
                self.decl_types.insert(var, ty.clone());
                self.statuses
                    .insert(var, RequestStatus::RealizationCompleted);
            }
            vela_ir::PatternKind::Tuple(elements) => {
                let elements = elements.clone();
                match ty {
                    Ty::Tuple(fields) if fields.len() == elements.len() => {
                        let fields = fields.clone();
                        for (element, field) in elements.iter().zip(&fields) {
                            self.assign_pattern_types(*element, &field.ty);
                        }
                    }
                    _ => {
                        for element in elements {
                            self.assign_pattern_types(element, &Ty::Error);
                        }
                        if !ty.is_error() {
                            let span = self.ast.pattern(pattern).span;
                            let found = self.show(ty);
                            self.diagnostics.insert(diagnostics::type_mismatch(
                                span,
                                "a tuple",
                                &found,
                            ));
                        }
                    }
                }
            }
            vela_ir::PatternKind::Wildcard => {}
        }
    }

    fn realize_var(&mut self, decl: DeclId) -> Ty {
        match self.ast.binding_of_var(decl) {
            Some(binding) => {
                self.realized_type(binding);
                self.decl_types.get(decl).cloned().unwrap_or(Ty::Error)
            }
            None => Ty::Error,
        }
    }

    // === Type expressions ===

    /// Evaluate an expression in type position.
    pub(crate) fn realize_type_expr(&mut self, expr: ExprId, scope: ScopeId) -> Ty {
        ensure_sufficient_stack(|| self.realize_type_expr_inner(expr, scope))
    }

    fn realize_type_expr_inner(&mut self, expr: ExprId, scope: ScopeId) -> Ty {
        let span = self.ast.expr_span(expr);
        let kind = self.ast.expr(expr).kind.clone();
        match kind {
            ExprKind::Name(name) => self.realize_name_type_expr(expr, &name, scope),
            ExprKind::ConformanceLens { subject, lens } => {
                let subject_ty = self.realize_type_expr(subject, scope);
                let lens_ty = self.realize_type_expr(lens, scope);
                let Ty::Trait(trait_decl) = self.relations.canonical(&lens_ty) else {
                    let found = self.show(&lens_ty);
                    self.diagnostics
                        .insert(diagnostics::not_a_trait(span, &found));
                    return Ty::Error;
                };
                if !self.conforms_to(&subject_ty, trait_decl, scope) {
                    let model = self.show(&subject_ty);
                    let trait_name = self.decl_name(trait_decl).to_owned();
                    self.diagnostics.insert(diagnostics::conformance_failure(
                        span,
                        &model,
                        &trait_name,
                    ));
                    return Ty::Error;
                }
                Ty::ConformanceLens {
                    subject: Box::new(subject_ty),
                    lens: Box::new(lens_ty),
                }
            }
            ExprKind::LambdaType {
                receiver_effect,
                environment,
                parameters,
                output,
            } => {
                let environment = match environment {
                    Some(e) => self.realize_type_expr(e, scope),
                    None => Ty::Void,
                };
                let mut inputs = Vec::new();
                for parameter in &parameters {
                    let annotation = self.ast.expr(parameter.annotation).kind.clone();
                    let ty = match annotation {
                        ExprKind::ParameterType { convention, bare } => {
                            let bare = self.realize_type_expr(bare, scope);
                            Ty::parameter(convention, bare)
                        }
                        _ => {
                            let bare = self.realize_type_expr(parameter.annotation, scope);
                            Ty::parameter(Capability::Let, bare)
                        }
                    };
                    inputs.push(CallableParam::new(parameter.label, ty));
                }
                let output = self.realize_type_expr(output, scope);
                Ty::Lambda {
                    receiver_effect,
                    environment: Box::new(environment),
                    inputs,
                    output: Box::new(output),
                }
            }
            ExprKind::ParameterType { .. } => {
                self.diagnostics
                    .insert(diagnostics::illegal_parameter_convention(span));
                Ty::Error
            }
            ExprKind::TupleType(elements) => {
                let mut fields = Vec::new();
                for element in &elements {
                    let ty = self.realize_type_expr(element.value, scope);
                    fields.push(vela_types::TupleField::new(element.label, ty));
                }
                Ty::Tuple(fields)
            }
            ExprKind::Wildcard => self.fresh_var(),
            ExprKind::IntLiteral(_)
            | ExprKind::FloatLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::Call { .. }
            | ExprKind::Lambda(_)
            | ExprKind::Tuple(_) => {
                self.diagnostics
                    .insert(diagnostics::name_refers_to_value(span));
                Ty::Error
            }
        }
    }

    fn realize_name_type_expr(
        &mut self,
        expr: ExprId,
        name: &vela_ir::NameExpr,
        scope: ScopeId,
    ) -> Ty {
        let span = self.ast.expr_span(expr);
        let stem = name.name.stem;

        let candidates = match name.domain {
            NameDomain::None => self.unqualified_lookup(stem, scope),
            NameDomain::Implicit => {
                self.diagnostics.insert(diagnostics::not_enough_context(span));
                return Ty::Error;
            }
            NameDomain::Expr(domain) => {
                let domain_ty = self.realize_type_expr(domain, scope);
                if domain_ty.is_error() {
                    return Ty::Error;
                }
                self.member_lookup(stem, &domain_ty, scope)
            }
        };

        let type_candidates: Vec<DeclId> = candidates
            .iter()
            .copied()
            .filter(|d| self.ast.decl(*d).is_type_decl())
            .collect();

        let decl = match type_candidates.len() {
            0 => {
                if candidates.is_empty() {
                    return self.realize_magic_type_expr(expr, name, scope);
                }
                self.diagnostics
                    .insert(diagnostics::name_refers_to_value(span));
                return Ty::Error;
            }
            1 => type_candidates[0],
            _ => {
                let text = self.names.lookup(stem).to_owned();
                self.diagnostics
                    .insert(diagnostics::ambiguous_name(span, &text));
                return Ty::Error;
            }
        };

        let realized = self.realized_type(decl);
        let instance = match self.instance_of(&realized) {
            Some(instance) => instance,
            None => {
                self.diagnostics
                    .insert(diagnostics::name_refers_to_value(span));
                return Ty::Error;
            }
        };

        // Adjust associated types reached through a concrete domain.
        let instance = match (&instance, name.domain) {
            (Ty::Associated { decl, .. }, NameDomain::Expr(domain)) => {
                let domain_ty = self.realize_type_expr(domain, scope);
                Ty::Associated {
                    decl: *decl,
                    domain: Box::new(domain_ty),
                }
            }
            _ => instance,
        };

        self.apply_static_arguments(decl, instance, &name.arguments, span, scope)
    }

    /// Apply a name expression's static arguments to the resolved type.
    fn apply_static_arguments(
        &mut self,
        decl: DeclId,
        instance: Ty,
        arguments: &[ExprId],
        span: Span,
        scope: ScopeId,
    ) -> Ty {
        let parameters = self.generic_parameters_of(decl);
        if arguments.is_empty() {
            return instance;
        }
        if parameters.is_empty() {
            let name = self.decl_name(decl).to_owned();
            self.diagnostics
                .insert(diagnostics::argument_to_non_generic_type(span, &name));
            return Ty::Error;
        }
        if parameters.len() != arguments.len() {
            let name = self.decl_name(decl).to_owned();
            self.diagnostics.insert(diagnostics::invalid_generic_argument_count(
                span,
                &name,
                parameters.len(),
                arguments.len(),
            ));
            return Ty::Error;
        }
        let args: Vec<Ty> = arguments
            .iter()
            .map(|a| self.realize_type_expr(*a, scope))
            .collect();
        Ty::BoundGeneric {
            base: Box::new(instance),
            args,
        }
    }

    pub(crate) fn realize_magic_type_expr(
        &mut self,
        expr: ExprId,
        name: &vela_ir::NameExpr,
        scope: ScopeId,
    ) -> Ty {
        let span = self.ast.expr_span(expr);
        let stem = name.name.stem;
        let w = &self.well_known;

        if stem == w.any {
            return Ty::Any;
        }
        if stem == w.never {
            return Ty::Never;
        }
        if stem == w.void {
            return Ty::Void;
        }
        if stem == w.int {
            return Ty::INT;
        }
        if stem == w.float {
            return Ty::FLOAT;
        }
        if stem == w.bool_ {
            return Ty::BOOL;
        }
        if stem == w.builtin {
            return Ty::Builtin(BuiltinType::Module);
        }
        if stem == w.self_type {
            return match self.self_type_in(scope) {
                Some(ty) => ty,
                None => {
                    self.diagnostics
                        .insert(diagnostics::invalid_self_reference(span));
                    Ty::Error
                }
            };
        }
        if stem == w.sum {
            return self.realize_sum_type_expr(span, &name.arguments, scope);
        }
        if stem == w.metatype {
            if name.arguments.len() != 1 {
                self.diagnostics.insert(diagnostics::invalid_generic_argument_count(
                    span,
                    "Metatype",
                    1,
                    name.arguments.len(),
                ));
                return Ty::Error;
            }
            let instance = self.realize_type_expr(name.arguments[0], scope);
            return Ty::metatype(instance);
        }

        let text = self.names.lookup(stem).to_owned();
        self.diagnostics
            .insert(diagnostics::undefined_name(span, &text));
        Ty::Error
    }

    fn realize_sum_type_expr(&mut self, span: Span, arguments: &[ExprId], scope: ScopeId) -> Ty {
        match arguments.len() {
            0 => {
                self.diagnostics.insert(diagnostics::empty_sum(span));
                Ty::Never
            }
            1 => {
                self.diagnostics.insert(diagnostics::sum_type_arity(span));
                Ty::Error
            }
            _ => {
                let mut elements = Vec::new();
                let mut poisoned = false;
                for &argument in arguments {
                    let kind = &self.ast.expr(argument).kind;
                    if matches!(
                        kind,
                        ExprKind::IntLiteral(_)
                            | ExprKind::FloatLiteral(_)
                            | ExprKind::BoolLiteral(_)
                    ) {
                        let arg_span = self.ast.expr_span(argument);
                        self.diagnostics
                            .insert(diagnostics::value_in_sum_type(arg_span));
                        poisoned = true;
                        continue;
                    }
                    elements.push(self.realize_type_expr(argument, scope));
                }
                if poisoned {
                    Ty::Error
                } else {
                    Ty::sum(elements)
                }
            }
        }
    }

    /// The instance denoted by a declaration's realized type.
    fn instance_of(&self, realized: &Ty) -> Option<Ty> {
        match realized {
            Ty::Metatype(instance) => Some((**instance).clone()),
            Ty::Error => Some(Ty::Error),
            _ => None,
        }
    }

    /// The `Self` type visible from `scope`, if any.
    pub(crate) fn self_type_in(&mut self, scope: ScopeId) -> Option<Ty> {
        for s in self.ast.scopes_from(scope).collect::<Vec<_>>() {
            let Some(decl) = self.ast.scope(s).decl() else {
                continue;
            };
            match self.ast.decl(decl) {
                DeclKind::ProductType(p) => {
                    let base = Ty::Product(decl);
                    let parameters = p
                        .generic
                        .as_ref()
                        .map(|g| g.parameters.clone())
                        .unwrap_or_default();
                    if parameters.is_empty() {
                        return Some(base);
                    }
                    // Inside a generic type, `Self` is the type applied to
                    // its own parameters.
                    let args = parameters.iter().map(|p| Ty::GenericParam(*p)).collect();
                    return Some(Ty::BoundGeneric {
                        base: Box::new(base),
                        args,
                    });
                }
                DeclKind::Trait(t) => {
                    return Some(Ty::GenericParam(t.self_parameter));
                }
                DeclKind::Conformance(_) | DeclKind::Extension(_) => {
                    let realized = self.realized_type(decl);
                    return self.instance_of(&realized);
                }
                _ => continue,
            }
        }
        None
    }

    // === Well-formedness of signatures ===

    fn check_distinct_parameter_names(&mut self, parameters: &[DeclId]) {
        let mut seen: Vec<Name> = Vec::new();
        for &parameter in parameters {
            let payload = self.ast.parameter(parameter);
            let name = payload.name;
            let span = self.ast.decl_span(parameter);
            if seen.contains(&name) {
                let text = self.names.lookup(name).to_owned();
                self.diagnostics
                    .insert(diagnostics::duplicate_parameter(span, &text));
            } else {
                seen.push(name);
            }
        }
    }

    fn check_distinct_capture_names(&mut self, captures: &[DeclId]) {
        let mut seen: Vec<Name> = Vec::new();
        for &capture in captures {
            let mut vars = Vec::new();
            if let DeclKind::Binding(b) = self.ast.decl(capture) {
                self.ast.collect_pattern_vars(b.pattern, &mut vars);
            }
            for var in vars {
                let name = self.ast.var(var).name;
                let span = self.ast.decl_span(var);
                if seen.contains(&name) {
                    let text = self.names.lookup(name).to_owned();
                    self.diagnostics
                        .insert(diagnostics::duplicate_capture(span, &text));
                } else {
                    seen.push(name);
                }
            }
        }
    }

    /// Whether a callable declaration has a body to check.
    pub(crate) fn body_of(&self, decl: DeclId) -> Option<Body> {
        match self.ast.decl(decl) {
            DeclKind::Function(f) => f.body,
            DeclKind::MethodImpl(m) => m.body,
            DeclKind::SubscriptImpl(s) => s.body,
            DeclKind::Initializer(i) => i.body.map(Body::Block),
            _ => None,
        }
    }
}
