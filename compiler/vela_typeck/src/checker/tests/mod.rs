//! Checker tests over programmatically built trees.
//!
//! The fixture mirrors how a parser drives the arena: declare handles into
//! their scopes first, fill in payloads once the children exist. Every node
//! gets a distinct span so that similar diagnostics reported at different
//! sites stay distinct in the set.

mod inference;
mod lookup;
mod realization;

use vela_diagnostic::{DiagnosticSet, ErrorCode};
use vela_ir::{
    Ast, BindingDecl, BindingIntroducer, Body, DeclId, DeclKind, ExprId, ExprKind, FunctionDecl,
    FunctionFlags, GenericParameterDecl, InitializerDecl, InitializerKind, Name, NameDomain,
    NameExpr, NameRef, ParameterDecl, PatternKind, ProductTypeDecl, ScopeId, Span, StmtId,
    StmtKind, StringInterner, TraitDecl, VarDecl,
};

pub(crate) use super::{CheckedModule, TypeChecker};

/// One module with one file scope, and a cursor handing out fresh spans.
pub(crate) struct Fixture {
    pub ast: Ast,
    pub names: StringInterner,
    pub module: DeclId,
    pub file: ScopeId,
    cursor: u32,
}

impl Fixture {
    pub fn new() -> Self {
        let mut names = StringInterner::new();
        let mut ast = Ast::new();
        let module = names.intern("main");
        let module = ast.push_module(module, Span::new(0, 1));
        let file = ast.push_file(module);
        Fixture {
            ast,
            names,
            module,
            file,
            cursor: 1,
        }
    }

    pub fn span(&mut self) -> Span {
        self.cursor += 2;
        Span::new(self.cursor, self.cursor + 1)
    }

    pub fn name(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    /// An unqualified name expression.
    pub fn name_expr(&mut self, text: &str) -> ExprId {
        let name = self.name(text);
        let span = self.span();
        self.ast.push_expr(
            ExprKind::Name(NameExpr {
                domain: NameDomain::None,
                name: NameRef::bare(name),
                arguments: Vec::new(),
            }),
            span,
        )
    }

    /// An unqualified name expression carrying static arguments.
    pub fn generic_name_expr(&mut self, text: &str, arguments: Vec<ExprId>) -> ExprId {
        let name = self.name(text);
        let span = self.span();
        self.ast.push_expr(
            ExprKind::Name(NameExpr {
                domain: NameDomain::None,
                name: NameRef::bare(name),
                arguments,
            }),
            span,
        )
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        let span = self.span();
        self.ast.push_expr(ExprKind::IntLiteral(value), span)
    }

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let span = self.span();
        self.ast.push_stmt(kind, span)
    }

    /// A brace statement whose scope hangs under `parent`.
    pub fn block(&mut self, stmts: Vec<StmtId>, parent: ScopeId) -> StmtId {
        let stmt = self.stmt(StmtKind::Brace(stmts));
        self.ast.open_brace_scope(stmt, parent);
        stmt
    }

    /// A `let` binding; returns the binding and its single variable.
    pub fn binding(
        &mut self,
        scope: ScopeId,
        name: &str,
        annotation: Option<ExprId>,
        initializer: Option<ExprId>,
    ) -> (DeclId, DeclId) {
        let stem = self.name(name);
        let var_span = self.span();
        let var = self.ast.declare(scope, var_span);
        self.ast.define(var, DeclKind::Var(VarDecl { name: stem }));
        let named = self.ast.push_pattern(PatternKind::Name(var), var_span);
        let pattern_span = self.span();
        let pattern = self.ast.push_pattern(
            PatternKind::Binding {
                introducer: BindingIntroducer::Let,
                subpattern: named,
                annotation,
            },
            pattern_span,
        );
        let binding = self.ast.declare(scope, pattern_span);
        self.ast.define(
            binding,
            DeclKind::Binding(BindingDecl {
                pattern,
                initializer,
            }),
        );
        (binding, var)
    }

    /// Allocate a function handle and open its scope; define it with
    /// [`Fixture::define_function`] once parameters and body exist.
    pub fn declare_function(&mut self, scope: ScopeId) -> (DeclId, ScopeId) {
        let span = self.span();
        let decl = self.ast.declare(scope, span);
        let inner = self.ast.open_scope(decl);
        (decl, inner)
    }

    pub fn define_function(
        &mut self,
        decl: DeclId,
        name: &str,
        parameters: Vec<DeclId>,
        output: Option<ExprId>,
        body: Option<Body>,
    ) {
        let stem = self.name(name);
        self.ast.define(
            decl,
            DeclKind::Function(FunctionDecl {
                name: Some(stem),
                flags: FunctionFlags::empty(),
                generic: None,
                explicit_captures: Vec::new(),
                parameters,
                receiver: None,
                output,
                body,
            }),
        );
    }

    pub fn parameter(&mut self, scope: ScopeId, name: &str, annotation: ExprId) -> DeclId {
        let stem = self.name(name);
        let span = self.span();
        let decl = self.ast.declare(scope, span);
        self.ast.define(
            decl,
            DeclKind::Parameter(ParameterDecl {
                label: None,
                name: stem,
                annotation: Some(annotation),
                default_value: None,
            }),
        );
        decl
    }

    /// Allocate a product type handle and open its scope.
    pub fn declare_product(&mut self, scope: ScopeId) -> (DeclId, ScopeId) {
        let span = self.span();
        let decl = self.ast.declare(scope, span);
        let inner = self.ast.open_scope(decl);
        (decl, inner)
    }

    /// Define a product type, synthesizing its memberwise initializer.
    /// Returns the initializer declaration.
    pub fn define_product(
        &mut self,
        decl: DeclId,
        name: &str,
        conformances: Vec<ExprId>,
        members: Vec<DeclId>,
    ) -> DeclId {
        let stem = self.name(name);
        let scope = self.ast.scope_of(decl).unwrap();
        let init_span = self.span();
        let init = self.ast.declare(scope, init_span);
        let init_scope = self.ast.open_scope(init);
        let receiver_name = self.name("self");
        let receiver_span = self.span();
        let receiver = self.ast.declare(init_scope, receiver_span);
        self.ast.define(
            receiver,
            DeclKind::Parameter(ParameterDecl {
                label: None,
                name: receiver_name,
                annotation: None,
                default_value: None,
            }),
        );
        self.ast.define(
            init,
            DeclKind::Initializer(InitializerDecl {
                introducer: InitializerKind::Memberwise,
                generic: None,
                parameters: Vec::new(),
                receiver,
                body: None,
            }),
        );
        self.ast.define(
            decl,
            DeclKind::ProductType(ProductTypeDecl {
                name: stem,
                generic: None,
                conformances,
                members,
                memberwise_init: init,
            }),
        );
        init
    }

    /// Allocate a trait handle, open its scope, and declare the implicit
    /// `Self` parameter. Returns the trait, its scope, and `Self`.
    pub fn declare_trait(&mut self, scope: ScopeId) -> (DeclId, ScopeId, DeclId) {
        let span = self.span();
        let decl = self.ast.declare(scope, span);
        let inner = self.ast.open_scope(decl);
        let self_name = self.name("Self");
        let self_span = self.span();
        let self_parameter = self.ast.declare(inner, self_span);
        self.ast.define(
            self_parameter,
            DeclKind::GenericParameter(GenericParameterDecl {
                name: self_name,
                conformances: Vec::new(),
                default: None,
            }),
        );
        (decl, inner, self_parameter)
    }

    pub fn define_trait(
        &mut self,
        decl: DeclId,
        name: &str,
        refinements: Vec<ExprId>,
        members: Vec<DeclId>,
        self_parameter: DeclId,
    ) {
        let stem = self.name(name);
        self.ast.define(
            decl,
            DeclKind::Trait(TraitDecl {
                name: stem,
                refinements,
                members,
                self_parameter,
            }),
        );
    }

    /// Run a full checking session over the tree and release the results.
    pub fn check(self) -> CheckedModule {
        let Fixture {
            ast, mut names, ..
        } = self;
        let mut checker = TypeChecker::new(&ast, &mut names);
        checker.check_all();
        checker.release()
    }
}

/// How many diagnostics in `set` carry `code`.
pub(crate) fn count_of(set: &DiagnosticSet, code: ErrorCode) -> usize {
    set.iter().filter(|d| d.code == code).count()
}
