//! Name-expression resolution.
//!
//! Turns a name expression into declaration candidates, filters them by the
//! reference's argument labels and variant introducer, and instantiates the
//! survivors. A unique survivor resolves immediately; several survivors are
//! deferred to inference as an overload constraint, which has the context
//! (expected type, argument types) to discriminate.

use rustc_hash::FxHashMap;
use vela_ir::{DeclId, DeclKind, ExprId, Name, NameDomain, NameExpr, NameRef, ScopeId, Span};
use vela_types::{CallableParam, DeclRef, OverloadCandidate, Ty};

use super::generics::substitute;
use super::{diagnostics, TypeChecker};

/// Where a name expression's component is looked up.
pub(crate) enum ResolvedDomain {
    /// No domain; unqualified lookup.
    None,
    /// A domain expression of this type; member lookup.
    Type(Ty),
    /// The domain named a module or namespace; declaration-space lookup.
    Space(DeclId),
}

/// What resolving a name expression produced.
pub(crate) enum ResolvedName {
    /// Exactly one candidate survived.
    One(DeclRef, Ty),
    /// Several candidates survived; inference picks one.
    Many(Vec<OverloadCandidate>),
    /// A name with built-in meaning; nothing to bind.
    Magic(Ty),
    /// Resolution failed; a diagnostic was reported.
    Poisoned,
}

/// The labeled inputs of a callable type, if it has any.
fn callable_inputs(ty: &Ty) -> Option<&[CallableParam]> {
    match ty {
        Ty::Lambda { inputs, .. } | Ty::Method { inputs, .. } | Ty::Subscript { inputs, .. } => {
            Some(inputs)
        }
        _ => None,
    }
}

impl TypeChecker<'_> {
    /// Resolve one name expression against its domain.
    pub(crate) fn resolve_name_expr(
        &mut self,
        expr: ExprId,
        name: &NameExpr,
        domain: ResolvedDomain,
        scope: ScopeId,
    ) -> ResolvedName {
        let span = self.ast.expr_span(expr);
        let stem = name.name.stem;

        let candidates = match &domain {
            ResolvedDomain::None => self.unqualified_lookup(stem, scope),
            ResolvedDomain::Type(ty) => {
                let ty = ty.clone();
                self.member_lookup(stem, &ty, scope)
            }
            ResolvedDomain::Space(space) => self.space_members_named(*space, stem),
        };

        if candidates.is_empty() {
            if matches!(domain, ResolvedDomain::None) {
                // Identifiers with built-in meaning resolve only when no
                // declaration shadows them.
                let instance = self.realize_magic_type_expr(expr, name, scope);
                if instance.is_error() {
                    return ResolvedName::Poisoned;
                }
                return match instance {
                    module @ Ty::Builtin(_) => ResolvedName::Magic(module),
                    other => ResolvedName::Magic(Ty::metatype(other)),
                };
            }
            let text = self.names.lookup(stem).to_owned();
            self.diagnostics
                .insert(diagnostics::undefined_name(span, &text));
            return ResolvedName::Poisoned;
        }

        let filtered = self.filter_candidates(candidates, &name.name);
        match filtered.len() {
            0 => {
                let text = self.names.lookup(stem).to_owned();
                self.diagnostics
                    .insert(diagnostics::undefined_name(span, &text));
                ResolvedName::Poisoned
            }
            1 => match self.reference_to(filtered[0], &name.arguments, span, scope) {
                Some((reference, ty)) => ResolvedName::One(reference, ty),
                None => ResolvedName::Poisoned,
            },
            _ => {
                let mut survivors = Vec::new();
                for decl in filtered {
                    if let Some((reference, ty)) =
                        self.reference_to(decl, &name.arguments, span, scope)
                    {
                        survivors.push(OverloadCandidate { reference, ty });
                    }
                }
                match survivors.len() {
                    0 => ResolvedName::Poisoned,
                    1 => {
                        let candidate = survivors.pop();
                        match candidate {
                            Some(c) => ResolvedName::One(c.reference, c.ty),
                            None => ResolvedName::Poisoned,
                        }
                    }
                    _ => ResolvedName::Many(survivors),
                }
            }
        }
    }

    /// Drop candidates incompatible with the reference's argument labels or
    /// variant introducer. An introducer narrows a method bundle to the
    /// matching variant.
    fn filter_candidates(&mut self, candidates: Vec<DeclId>, name: &NameRef) -> Vec<DeclId> {
        let mut kept = Vec::new();
        for candidate in candidates {
            if let Some(labels) = &name.labels {
                let ty = self.realized_type(candidate);
                if let Some(inputs) = callable_inputs(&ty) {
                    let matches = inputs.len() == labels.len()
                        && inputs.iter().zip(labels).all(|(input, label)| {
                            label.is_none() || input.label == *label
                        });
                    if !matches {
                        continue;
                    }
                }
            }
            if let Some(introducer) = name.introducer {
                if let DeclKind::Method(m) = self.ast.decl(candidate) {
                    let variant = m
                        .impls
                        .iter()
                        .copied()
                        .find(|v| self.ast.method_impl(*v).introducer == introducer);
                    match variant {
                        Some(v) => kept.push(v),
                        None => {}
                    }
                    continue;
                }
            }
            kept.push(candidate);
        }
        kept
    }

    /// Build the reference and contextual type for one candidate, applying
    /// explicit static arguments or opening the generics.
    fn reference_to(
        &mut self,
        decl: DeclId,
        arguments: &[ExprId],
        span: Span,
        scope: ScopeId,
    ) -> Option<(DeclRef, Ty)> {
        if arguments.is_empty() {
            return Some(self.instantiate(decl, scope));
        }
        let parameters = self.generic_parameters_of(decl);
        if parameters.is_empty() {
            let name = self.decl_name(decl).to_owned();
            self.diagnostics
                .insert(diagnostics::argument_to_non_generic_type(span, &name));
            return None;
        }
        if parameters.len() != arguments.len() {
            let name = self.decl_name(decl).to_owned();
            self.diagnostics
                .insert(diagnostics::invalid_generic_argument_count(
                    span,
                    &name,
                    parameters.len(),
                    arguments.len(),
                ));
            return None;
        }
        let mut map = FxHashMap::default();
        let mut bound = Vec::new();
        for (&parameter, &argument) in parameters.iter().zip(arguments) {
            let ty = self.realize_type_expr(argument, scope);
            map.insert(parameter, ty.clone());
            bound.push((parameter, ty));
        }
        let declared = self.realized_type(decl);
        let ty = substitute(&declared, &map);
        Some((DeclRef::specialized(decl, bound), ty))
    }

    /// Open the generics of `decl` for a use at `scope`.
    ///
    /// A parameter whose defining scope contains the use site stays rigid
    /// (a skolem); otherwise it opens to a fresh inference variable, so the
    /// same declaration can be reused with independent arguments.
    pub(crate) fn instantiate(&mut self, decl: DeclId, scope: ScopeId) -> (DeclRef, Ty) {
        let declared = self.realized_type(decl);
        let parameters = self.generic_parameters_of(decl);
        if parameters.is_empty() {
            return (DeclRef::direct(decl), declared);
        }
        let defining = self.ast.scope_of(decl);
        let mut map = FxHashMap::default();
        let mut bound = Vec::new();
        for parameter in parameters {
            let inside = defining.is_some_and(|d| self.ast.is_contained(scope, d));
            let replacement = if inside {
                Ty::skolem(Ty::GenericParam(parameter))
            } else {
                self.fresh_var()
            };
            map.insert(parameter, replacement.clone());
            bound.push((parameter, replacement));
        }
        let ty = substitute(&declared, &map);
        (DeclRef::specialized(decl, bound), ty)
    }

    /// The module or namespace a domain expression names, if that is all it
    /// names.
    pub(crate) fn declaration_space_of(&mut self, expr: ExprId, scope: ScopeId) -> Option<DeclId> {
        let kind = self.ast.expr(expr).kind.clone();
        let vela_ir::ExprKind::Name(name) = kind else {
            return None;
        };
        let candidates = match name.domain {
            NameDomain::None => self.unqualified_lookup(name.name.stem, scope),
            NameDomain::Expr(inner) => {
                let space = self.declaration_space_of(inner, scope)?;
                self.space_members_named(space, name.name.stem)
            }
            NameDomain::Implicit => return None,
        };
        match candidates.as_slice() {
            [decl]
                if matches!(
                    self.ast.decl(*decl),
                    DeclKind::Module(_) | DeclKind::Namespace(_)
                ) =>
            {
                Some(*decl)
            }
            _ => None,
        }
    }

    /// Declarations named `stem` inside a module or namespace.
    fn space_members_named(&mut self, space: DeclId, stem: Name) -> Vec<DeclId> {
        match self.ast.decl(space) {
            DeclKind::Module(_) => self.module_level_decls_named(space, stem),
            DeclKind::Namespace(_) => match self.ast.scope_of(space) {
                Some(scope) => self.decls_named_in(stem, scope),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}
