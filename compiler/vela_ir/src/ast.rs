//! The AST arena.
//!
//! All nodes live in flat vectors owned by [`Ast`] and are addressed by
//! 32-bit handles. The checker treats a finished arena as immutable; the
//! mutating methods here are the construction surface used by the parser
//! (and by tests, which build trees programmatically).
//!
//! Declarations are created in two phases: [`Ast::declare`] allocates the
//! handle and links it into its enclosing scope, and [`Ast::define`] fills
//! in the payload once the children exist. This mirrors how a parser works:
//! a function's parameters belong to the function's scope, which must exist
//! before the function node itself is complete.

use rustc_hash::FxHashMap;

use crate::{
    AssociatedTypeDecl, AssociatedValueDecl, BindingDecl, ConformanceDecl, DeclId, DeclKind, Expr,
    ExprId, ExprKind, ExtensionDecl, FunctionDecl, GenericParameterDecl, InitializerDecl,
    MethodDecl, MethodImplDecl, ModuleDecl, OperatorDecl, ParameterDecl, Pattern, PatternId,
    PatternKind, ProductTypeDecl, Scope, ScopeId, ScopeKind, Span, Stmt, StmtId, StmtKind,
    SubscriptDecl, SubscriptImplDecl, TraitDecl, TypeAliasDecl, VarDecl,
};

/// Generate a typed accessor that panics on a kind mismatch. Callers use
/// these where the kind is already established; a mismatch is a bug in the
/// caller, not recoverable state.
macro_rules! typed_accessor {
    ($(#[$doc:meta])* $fn_name:ident, $variant:ident, $payload:ty) => {
        $(#[$doc])*
        pub fn $fn_name(&self, id: DeclId) -> &$payload {
            match self.decl(id) {
                DeclKind::$variant(payload) => payload,
                other => panic!(
                    concat!("expected a ", stringify!($variant), " declaration, found {:?}"),
                    std::mem::discriminant(other)
                ),
            }
        }
    };
}

#[derive(Clone, Debug)]
struct DeclSlot {
    span: Span,
    kind: Option<DeclKind>,
}

/// The finalized program tree for one or more modules.
#[derive(Default, Debug)]
pub struct Ast {
    decls: Vec<DeclSlot>,
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    patterns: Vec<Pattern>,
    scopes: Vec<Scope>,

    /// The modules of the program, in load order.
    modules: Vec<DeclId>,
    /// File scopes of each module.
    files: FxHashMap<DeclId, Vec<ScopeId>>,
    /// Innermost scope containing each declaration.
    decl_to_scope: FxHashMap<DeclId, ScopeId>,
    /// Scope introduced by a declaration, for declarations that outline one.
    decl_scopes: FxHashMap<DeclId, ScopeId>,
    /// Scope introduced by a brace statement.
    brace_scopes: FxHashMap<StmtId, ScopeId>,
    /// Declarations introduced directly in each scope.
    scope_decls: Vec<Vec<DeclId>>,
    /// Variable declaration to the binding declaration introducing it.
    var_to_binding: FxHashMap<DeclId, DeclId>,
}

impl Ast {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // === Construction ===

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_raw(self.scopes.len() as u32);
        self.scopes.push(Scope { kind, parent });
        self.scope_decls.push(Vec::new());
        id
    }

    /// Create a module declaration and its root scope.
    pub fn push_module(&mut self, name: crate::Name, span: Span) -> DeclId {
        let id = DeclId::from_raw(self.decls.len() as u32);
        self.decls.push(DeclSlot {
            span,
            kind: Some(DeclKind::Module(ModuleDecl { name })),
        });
        let scope = self.push_scope(ScopeKind::Module(id), None);
        self.decl_scopes.insert(id, scope);
        self.modules.push(id);
        id
    }

    /// Create a file scope under `module`'s root scope.
    pub fn push_file(&mut self, module: DeclId) -> ScopeId {
        let parent = self.decl_scopes[&module];
        let scope = self.push_scope(ScopeKind::File, Some(parent));
        self.files.entry(module).or_default().push(scope);
        scope
    }

    /// Allocate a declaration handle in `scope`; the payload is supplied
    /// later with [`Ast::define`].
    pub fn declare(&mut self, scope: ScopeId, span: Span) -> DeclId {
        let id = DeclId::from_raw(self.decls.len() as u32);
        self.decls.push(DeclSlot { span, kind: None });
        self.decl_to_scope.insert(id, scope);
        self.scope_decls[scope.index()].push(id);
        id
    }

    /// Fill in the payload of a declared handle.
    ///
    /// Defining a binding declaration also records the binding for every
    /// variable its pattern introduces.
    pub fn define(&mut self, id: DeclId, kind: DeclKind) {
        if let DeclKind::Binding(BindingDecl { pattern, .. }) = &kind {
            let mut vars = Vec::new();
            self.collect_pattern_vars(*pattern, &mut vars);
            for v in vars {
                self.var_to_binding.insert(v, id);
            }
        }
        let slot = &mut self.decls[id.index()];
        debug_assert!(slot.kind.is_none(), "declaration defined twice");
        slot.kind = Some(kind);
    }

    /// Open the lexical scope outlined by `decl`.
    pub fn open_scope(&mut self, decl: DeclId) -> ScopeId {
        let parent = self.decl_to_scope.get(&decl).copied();
        let scope = self.push_scope(ScopeKind::Decl(decl), parent);
        self.decl_scopes.insert(decl, scope);
        scope
    }

    /// Open the scope of a brace statement under `parent`.
    pub fn open_brace_scope(&mut self, stmt: StmtId, parent: ScopeId) -> ScopeId {
        let scope = self.push_scope(ScopeKind::Brace(stmt), Some(parent));
        self.brace_scopes.insert(stmt, scope);
        scope
    }

    /// Append an expression node.
    pub fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        id
    }

    /// Append a statement node.
    pub fn push_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::from_raw(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    /// Append a pattern node.
    pub fn push_pattern(&mut self, kind: PatternKind, span: Span) -> PatternId {
        let id = PatternId::from_raw(self.patterns.len() as u32);
        self.patterns.push(Pattern { kind, span });
        id
    }

    // === Node access ===

    /// The payload of `id`.
    ///
    /// # Panics
    /// Panics if the declaration was never defined; a finalized tree has no
    /// undefined declarations.
    pub fn decl(&self, id: DeclId) -> &DeclKind {
        match &self.decls[id.index()].kind {
            Some(kind) => kind,
            None => panic!("declaration {id:?} was never defined"),
        }
    }

    /// The source span of `id`.
    pub fn decl_span(&self, id: DeclId) -> Span {
        self.decls[id.index()].span
    }

    typed_accessor!(function, Function, FunctionDecl);
    typed_accessor!(initializer, Initializer, InitializerDecl);
    typed_accessor!(method, Method, MethodDecl);
    typed_accessor!(method_impl, MethodImpl, MethodImplDecl);
    typed_accessor!(subscript, Subscript, SubscriptDecl);
    typed_accessor!(subscript_impl, SubscriptImpl, SubscriptImplDecl);
    typed_accessor!(product_type, ProductType, ProductTypeDecl);
    typed_accessor!(trait_decl, Trait, TraitDecl);
    typed_accessor!(type_alias, TypeAlias, TypeAliasDecl);
    typed_accessor!(associated_type, AssociatedType, AssociatedTypeDecl);
    typed_accessor!(associated_value, AssociatedValue, AssociatedValueDecl);
    typed_accessor!(generic_parameter, GenericParameter, GenericParameterDecl);
    typed_accessor!(parameter, Parameter, ParameterDecl);
    typed_accessor!(binding, Binding, BindingDecl);
    typed_accessor!(var, Var, VarDecl);
    typed_accessor!(operator, Operator, OperatorDecl);
    typed_accessor!(conformance_decl, Conformance, ConformanceDecl);
    typed_accessor!(extension, Extension, ExtensionDecl);
    typed_accessor!(module_decl, Module, ModuleDecl);

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> Scope {
        self.scopes[id.index()]
    }

    /// Number of declarations in the arena.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // === Structure queries ===

    /// The modules of the program.
    pub fn modules(&self) -> &[DeclId] {
        &self.modules
    }

    /// The innermost scope containing `decl`, or `None` for modules.
    pub fn scope_containing(&self, decl: DeclId) -> Option<ScopeId> {
        self.decl_to_scope.get(&decl).copied()
    }

    /// The scope outlined by `decl`, if it outlines one.
    pub fn scope_of(&self, decl: DeclId) -> Option<ScopeId> {
        self.decl_scopes.get(&decl).copied()
    }

    /// The scope of a brace statement.
    pub fn scope_of_brace(&self, stmt: StmtId) -> Option<ScopeId> {
        self.brace_scopes.get(&stmt).copied()
    }

    /// Declarations introduced directly in `scope`.
    pub fn decls_in(&self, scope: ScopeId) -> &[DeclId] {
        &self.scope_decls[scope.index()]
    }

    /// Top-level declarations of a module: everything in its file scopes
    /// plus anything declared directly at module scope.
    pub fn top_level_decls(&self, module: DeclId) -> Vec<DeclId> {
        let mut out = Vec::new();
        if let Some(scope) = self.decl_scopes.get(&module) {
            out.extend_from_slice(&self.scope_decls[scope.index()]);
        }
        if let Some(files) = self.files.get(&module) {
            for f in files {
                out.extend_from_slice(&self.scope_decls[f.index()]);
            }
        }
        out
    }

    /// The file scopes of `module`.
    pub fn files_of(&self, module: DeclId) -> &[ScopeId] {
        self.files.get(&module).map_or(&[], Vec::as_slice)
    }

    /// Iterate from `scope` outward through its ancestors, `scope` first.
    pub fn scopes_from(&self, scope: ScopeId) -> ScopeChain<'_> {
        ScopeChain {
            ast: self,
            next: Some(scope),
        }
    }

    /// Whether `inner` is `outer` or nested inside it.
    pub fn is_contained(&self, inner: ScopeId, outer: ScopeId) -> bool {
        self.scopes_from(inner).any(|s| s == outer)
    }

    /// The module whose tree contains `scope`.
    pub fn module_containing(&self, scope: ScopeId) -> Option<DeclId> {
        self.scopes_from(scope).find_map(|s| match self.scope(s).kind {
            ScopeKind::Module(m) => Some(m),
            _ => None,
        })
    }

    /// The binding declaration that introduces variable `var`.
    pub fn binding_of_var(&self, var: DeclId) -> Option<DeclId> {
        self.var_to_binding.get(&var).copied()
    }

    /// Collect the variable declarations introduced by `pattern`, in
    /// left-to-right order.
    pub fn collect_pattern_vars(&self, pattern: PatternId, out: &mut Vec<DeclId>) {
        match &self.patterns[pattern.index()].kind {
            PatternKind::Binding { subpattern, .. } => self.collect_pattern_vars(*subpattern, out),
            PatternKind::Name(decl) => out.push(*decl),
            PatternKind::Tuple(elements) => {
                for e in elements {
                    self.collect_pattern_vars(*e, out);
                }
            }
            PatternKind::Wildcard => {}
        }
    }

    // === Declaration classification ===

    /// The type-like declaration whose scope directly contains `decl`, if
    /// any: a product type, trait, conformance, or extension.
    pub fn member_parent(&self, decl: DeclId) -> Option<DeclId> {
        let scope = self.scope_containing(decl)?;
        let parent = self.scope(scope).decl()?;
        match self.decl(parent) {
            DeclKind::ProductType(_)
            | DeclKind::Trait(_)
            | DeclKind::Conformance(_)
            | DeclKind::Extension(_) => Some(parent),
            _ => None,
        }
    }

    /// Whether `decl` is a member of a type declaration space.
    pub fn is_member(&self, decl: DeclId) -> bool {
        self.member_parent(decl).is_some()
    }

    /// Whether `decl` is a member with an implicit receiver.
    pub fn is_non_static_member(&self, decl: DeclId) -> bool {
        if !self.is_member(decl) {
            return false;
        }
        match self.decl(decl) {
            DeclKind::Function(f) => !f.flags.contains(crate::FunctionFlags::STATIC),
            _ => true,
        }
    }

    /// Whether `decl` is a requirement: a direct member of a trait.
    pub fn is_requirement(&self, decl: DeclId) -> bool {
        let Some(parent) = self.member_parent(decl) else {
            return false;
        };
        if matches!(self.decl(parent), DeclKind::Trait(_)) {
            return true;
        }
        // A method or subscript variant is a requirement if its bundle is.
        false
    }

    /// Whether `decl` is visible program-wide: declared at module or file
    /// scope, a static member, or a nominal type.
    pub fn is_global(&self, decl: DeclId) -> bool {
        if self.decl(decl).is_type_decl() {
            return true;
        }
        if let DeclKind::Function(f) = self.decl(decl) {
            if f.flags.contains(crate::FunctionFlags::STATIC) {
                return true;
            }
        }
        match self.scope_containing(decl) {
            None => true,
            Some(s) => matches!(
                self.scope(s).kind,
                ScopeKind::Module(_) | ScopeKind::File
            ),
        }
    }

    /// Whether `decl` is local to a function, subscript, or brace scope.
    pub fn is_local(&self, decl: DeclId) -> bool {
        !self.is_global(decl) && !self.is_member(decl)
    }
}

/// Iterator over a scope and its ancestors.
pub struct ScopeChain<'a> {
    ast: &'a Ast,
    next: Option<ScopeId>,
}

impl Iterator for ScopeChain<'_> {
    type Item = ScopeId;

    fn next(&mut self) -> Option<ScopeId> {
        let current = self.next?;
        self.next = self.ast.scope(current).parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Name, StringInterner, VarDecl};

    #[test]
    fn scope_chain_walks_outward() {
        let mut ast = Ast::new();
        let module = ast.push_module(Name::EMPTY, Span::DUMMY);
        let file = ast.push_file(module);
        let decl = ast.declare(file, Span::DUMMY);
        ast.define(decl, DeclKind::Var(VarDecl { name: Name::EMPTY }));
        let inner = ast.open_scope(decl);

        let chain: Vec<_> = ast.scopes_from(inner).collect();
        assert_eq!(chain.len(), 3);
        assert!(ast.is_contained(inner, ast.scope_of(module).unwrap()));
        assert_eq!(ast.module_containing(inner), Some(module));
    }

    #[test]
    fn pattern_vars_are_collected_in_order() {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new();
        let module = ast.push_module(interner.intern("test"), Span::DUMMY);
        let file = ast.push_file(module);

        let x = ast.declare(file, Span::DUMMY);
        ast.define(x, DeclKind::Var(VarDecl { name: interner.intern("x") }));
        let y = ast.declare(file, Span::DUMMY);
        ast.define(y, DeclKind::Var(VarDecl { name: interner.intern("y") }));

        let px = ast.push_pattern(PatternKind::Name(x), Span::DUMMY);
        let py = ast.push_pattern(PatternKind::Name(y), Span::DUMMY);
        let tuple = ast.push_pattern(PatternKind::Tuple(vec![px, py]), Span::DUMMY);

        let mut vars = Vec::new();
        ast.collect_pattern_vars(tuple, &mut vars);
        assert_eq!(vars, vec![x, y]);
    }
}
