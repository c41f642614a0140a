//! The type checker.
//!
//! One `TypeChecker` owns every cache and side table for a checking
//! session. Checking is demand-driven: any entry point funnels into the
//! request machinery in `realize`/`check`, which memoizes per-declaration
//! results and detects circular dependencies. The checker is
//! single-threaded by construction; nothing here is `Sync` and nothing
//! needs to be.

mod check;
mod diagnostics;
mod generics;
mod infer;
mod lookup;
mod realize;
mod resolve;

#[cfg(test)]
mod tests;

use rustc_hash::{FxHashMap, FxHashSet};
use vela_diagnostic::DiagnosticSet;
use vela_ir::{Ast, DeclId, ExprId, Name, ScopeId, Span, StringInterner};
use vela_solve::SolverContext;
use vela_types::{DeclRef, Ty, TypeVar};

use crate::{DeclProperty, GenericEnvironment, MemoState, RequestStatus, TypeRelations};

pub use infer::DeferredObligation;

/// Identifiers with built-in meaning when lookup finds no declaration.
pub(crate) struct WellKnownNames {
    pub any: Name,
    pub never: Name,
    pub void: Name,
    pub self_type: Name,
    pub sum: Name,
    pub metatype: Name,
    pub builtin: Name,
    pub sinkable: Name,
    pub int: Name,
    pub float: Name,
    pub bool_: Name,
    /// The stem initializers are looked up under.
    pub init: Name,
}

impl WellKnownNames {
    fn intern(names: &mut StringInterner) -> Self {
        WellKnownNames {
            any: names.intern("Any"),
            never: names.intern("Never"),
            void: names.intern("Void"),
            self_type: names.intern("Self"),
            sum: names.intern("Sum"),
            metatype: names.intern("Metatype"),
            builtin: names.intern("Builtin"),
            sinkable: names.intern("Sinkable"),
            int: names.intern("Int"),
            float: names.intern("Float"),
            bool_: names.intern("Bool"),
            init: names.intern("init"),
        }
    }
}

/// A capture a local function takes implicitly from its surroundings.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ImplicitCapture {
    /// The captured declaration.
    pub decl: DeclId,
    /// The capture's type inside the function.
    pub ty: Ty,
}

/// Everything a finished checking session produced.
#[derive(Debug, Default)]
pub struct CheckedModule {
    /// The type assigned to each realized declaration.
    pub decl_types: FxHashMap<DeclId, Ty>,
    /// The type assigned to each checked expression.
    pub expr_types: FxHashMap<ExprId, Ty>,
    /// The declaration each name expression resolved to.
    pub bindings: FxHashMap<ExprId, DeclRef>,
    /// Implicit captures of local functions and subscripts.
    pub implicit_captures: FxHashMap<DeclId, Vec<ImplicitCapture>>,
    /// Everything reported.
    pub diagnostics: DiagnosticSet,
}

/// The type checker for one program.
pub struct TypeChecker<'a> {
    /// The program under analysis; never mutated.
    pub(crate) ast: &'a Ast,
    pub(crate) names: &'a StringInterner,
    pub(crate) well_known: WellKnownNames,

    pub(crate) diagnostics: DiagnosticSet,

    /// Request state machine per declaration.
    pub(crate) statuses: DeclProperty<RequestStatus>,
    /// Realized declaration types.
    pub(crate) decl_types: DeclProperty<Ty>,
    /// Inferred expression types.
    pub(crate) expr_types: FxHashMap<ExprId, Ty>,
    /// Resolved name expressions.
    pub(crate) bindings: FxHashMap<ExprId, DeclRef>,
    /// Implicit captures of local functions, recorded while checking.
    pub(crate) implicit_captures: FxHashMap<DeclId, Vec<ImplicitCapture>>,

    pub(crate) relations: TypeRelations,
    /// Generic environments, memoized per declaration. `None` means the
    /// declaration is not generic.
    pub(crate) environments: FxHashMap<DeclId, MemoState<Option<GenericEnvironment>>>,

    /// Names introduced directly in a scope, memoized.
    pub(crate) scope_names: FxHashMap<ScopeId, FxHashMap<Name, Vec<DeclId>>>,
    /// Member lookup tables, memoized per canonical type and scope.
    pub(crate) member_tables: FxHashMap<(Ty, ScopeId), FxHashMap<Name, Vec<DeclId>>>,
    /// Extension/conformance declarations whose subject is being realized,
    /// to break re-entrant extension binding.
    pub(crate) extensions_under_binding: FxHashSet<DeclId>,
    /// Conformance proofs on the call stack, to break re-entrant checks.
    pub(crate) conformances_in_flight: FxHashSet<(Ty, DeclId)>,

    /// Next fresh inference variable.
    fresh_var: u32,
    /// Spans whose subjects get their solving traced.
    pub(crate) tracing_range: Option<Span>,
}

impl<'a> TypeChecker<'a> {
    /// Create a checker for `ast`.
    ///
    /// Takes the interner mutably only long enough to intern the well-known
    /// identifiers.
    pub fn new(ast: &'a Ast, names: &'a mut StringInterner) -> Self {
        let well_known = WellKnownNames::intern(names);
        TypeChecker {
            ast,
            names,
            well_known,
            diagnostics: DiagnosticSet::new(),
            statuses: DeclProperty::new(),
            decl_types: DeclProperty::new(),
            expr_types: FxHashMap::default(),
            bindings: FxHashMap::default(),
            implicit_captures: FxHashMap::default(),
            relations: TypeRelations::new(),
            environments: FxHashMap::default(),
            scope_names: FxHashMap::default(),
            member_tables: FxHashMap::default(),
            extensions_under_binding: FxHashSet::default(),
            conformances_in_flight: FxHashSet::default(),
            fresh_var: 0,
            tracing_range: None,
        }
    }

    /// Restrict inference tracing to subjects whose span falls in `range`.
    pub fn trace_inference_in(&mut self, range: Span) {
        self.tracing_range = Some(range);
    }

    /// Check every top-level declaration of `module`.
    pub fn check_module(&mut self, module: DeclId) {
        self.check_operator_uniqueness(module);
        for decl in self.ast.top_level_decls(module) {
            self.check_decl(decl);
        }
    }

    /// Check every module of the program.
    pub fn check_all(&mut self) {
        for module in self.ast.modules().to_vec() {
            self.check_module(module);
        }
    }

    /// The diagnostics reported so far.
    pub fn diagnostics(&self) -> &DiagnosticSet {
        &self.diagnostics
    }

    /// The realized type of `decl`, if realization has run.
    pub fn realized_type_of(&self, decl: DeclId) -> Option<&Ty> {
        self.decl_types.get(decl)
    }

    /// The inferred type of `expr`, if checking reached it.
    pub fn type_of_expr(&self, expr: ExprId) -> Option<&Ty> {
        self.expr_types.get(&expr)
    }

    /// The request status of `decl`, if any request ran.
    pub fn status_of(&self, decl: DeclId) -> Option<RequestStatus> {
        self.statuses.get_copied(decl)
    }

    /// Consume the checker and hand back everything it established.
    ///
    /// This is the only way state leaves a checker; caches are never
    /// selectively flushed mid-session.
    pub fn release(self) -> CheckedModule {
        let mut decl_types = FxHashMap::default();
        for decl in 0..self.ast.decl_count() {
            let decl = DeclId::from_raw(decl as u32);
            if let Some(ty) = self.decl_types.get(decl) {
                decl_types.insert(decl, ty.clone());
            }
        }
        CheckedModule {
            decl_types,
            expr_types: self.expr_types,
            bindings: self.bindings,
            implicit_captures: self.implicit_captures,
            diagnostics: self.diagnostics,
        }
    }

    /// Allocate a fresh inference variable.
    pub(crate) fn fresh_var(&mut self) -> Ty {
        let var = TypeVar::from_raw(self.fresh_var);
        self.fresh_var += 1;
        Ty::Var(var)
    }

    /// Render a type for a diagnostic message.
    pub(crate) fn show(&self, ty: &Ty) -> String {
        ty.display(self.ast, self.names).to_string()
    }

    /// The display name of a declaration, for diagnostics.
    pub(crate) fn decl_name(&self, decl: DeclId) -> &str {
        use vela_ir::DeclKind;
        let name = match self.ast.decl(decl) {
            DeclKind::Module(d) => Some(d.name),
            DeclKind::Namespace(d) => Some(d.name),
            DeclKind::Function(d) => d.name,
            DeclKind::Initializer(_) => Some(self.well_known.init),
            DeclKind::Method(d) => Some(d.name),
            DeclKind::Subscript(d) => d.name,
            DeclKind::ProductType(d) => Some(d.name),
            DeclKind::Trait(d) => Some(d.name),
            DeclKind::TypeAlias(d) => Some(d.name),
            DeclKind::AssociatedType(d) => Some(d.name),
            DeclKind::AssociatedValue(d) => Some(d.name),
            DeclKind::GenericParameter(d) => Some(d.name),
            DeclKind::Parameter(d) => Some(d.name),
            DeclKind::Var(d) => Some(d.name),
            DeclKind::Operator(d) => Some(d.name),
            _ => None,
        };
        match name {
            Some(n) => self.names.lookup(n),
            None => "<anonymous>",
        }
    }
}

impl SolverContext for TypeChecker<'_> {
    fn canonical(&mut self, ty: &Ty) -> Ty {
        self.relations.canonical(ty)
    }

    fn conforms(&mut self, subject: &Ty, trait_decl: DeclId, scope: ScopeId) -> bool {
        self.conforms_to(subject, trait_decl, scope)
    }

    fn display(&self, ty: &Ty) -> String {
        self.show(ty)
    }
}
