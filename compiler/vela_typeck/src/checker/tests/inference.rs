//! Expression and body inference through the constraint solver.

use pretty_assertions::assert_eq;
use vela_diagnostic::ErrorCode;
use vela_ir::{
    Argument, Body, DeclKind, ExprKind, FunctionDecl, FunctionFlags, GenericClause,
    GenericParameterDecl, NameDomain, NameExpr, NameRef, StmtKind,
};
use vela_types::{DeclRef, Ty};

use crate::ImplicitCapture;

use super::{count_of, Fixture};

#[test]
fn integer_literal_defaults_to_int() {
    let mut f = Fixture::new();
    let one = f.int(1);
    let file = f.file;
    let (_, var) = f.binding(file, "x", None, Some(one));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::INT));
    assert_eq!(checked.expr_types.get(&one), Some(&Ty::INT));
}

#[test]
fn integer_literal_widens_to_an_annotated_float() {
    let mut f = Fixture::new();
    let float_ty = f.name_expr("Float");
    let one = f.int(1);
    let file = f.file;
    let (_, var) = f.binding(file, "x", Some(float_ty), Some(one));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::FLOAT));
}

#[test]
fn bool_annotation_rejects_an_integer_literal() {
    let mut f = Fixture::new();
    let bool_ty = f.name_expr("Bool");
    let one = f.int(1);
    let file = f.file;
    let (_, var) = f.binding(file, "x", Some(bool_ty), Some(one));

    let checked = f.check();
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::TypeMismatch), 1);
    // The declared type stands; only the initializer is at fault.
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::BOOL));
}

#[test]
fn function_body_checks_against_the_declared_output() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let output = f.name_expr("Int");
    let one = f.int(1);
    let ret = f.stmt(StmtKind::Return(Some(one)));
    let body = f.block(vec![ret], scope);
    f.define_function(
        function,
        "answer",
        Vec::new(),
        Some(output),
        Some(Body::Block(body)),
    );

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(
        checked.decl_types.get(&function),
        Some(&Ty::thin_lambda(Vec::new(), Ty::INT))
    );
}

#[test]
fn bare_return_in_a_non_void_function_is_reported() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let output = f.name_expr("Int");
    let ret = f.stmt(StmtKind::Return(None));
    let body = f.block(vec![ret], scope);
    f.define_function(
        function,
        "g",
        Vec::new(),
        Some(output),
        Some(Body::Block(body)),
    );

    let checked = f.check();
    assert_eq!(
        count_of(&checked.diagnostics, ErrorCode::MissingReturnValue),
        1
    );
}

#[test]
fn unused_expression_result_warns() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let one = f.int(1);
    let discarded = f.stmt(StmtKind::Expr(one));
    let body = f.block(vec![discarded], scope);
    f.define_function(function, "g", Vec::new(), None, Some(Body::Block(body)));

    let checked = f.check();
    assert!(!checked.diagnostics.contains_error());
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::UnusedResult), 1);
}

#[test]
fn call_types_the_output_and_binds_the_callee() {
    let mut f = Fixture::new();
    let file = f.file;

    let (id, id_scope) = f.declare_function(file);
    let param_ty = f.name_expr("Int");
    let parameter = f.parameter(id_scope, "x", param_ty);
    let output = f.name_expr("Int");
    let reference = f.name_expr("x");
    let ret = f.stmt(StmtKind::Return(Some(reference)));
    let body = f.block(vec![ret], id_scope);
    f.define_function(
        id,
        "id",
        vec![parameter],
        Some(output),
        Some(Body::Block(body)),
    );

    let callee = f.name_expr("id");
    let one = f.int(1);
    let label = f.name("x");
    let span = f.span();
    let call = f.ast.push_expr(
        ExprKind::Call {
            callee,
            arguments: vec![Argument {
                label: Some(label),
                value: one,
            }],
        },
        span,
    );
    let (_, var) = f.binding(file, "y", None, Some(call));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::INT));
    assert_eq!(checked.expr_types.get(&call), Some(&Ty::INT));
    assert_eq!(checked.bindings.get(&callee), Some(&DeclRef::direct(id)));
}

#[test]
fn argument_labels_narrow_an_overload_set() {
    let mut f = Fixture::new();
    let file = f.file;

    // g() -> Int
    let (nullary, nullary_scope) = f.declare_function(file);
    let output = f.name_expr("Int");
    let one = f.int(1);
    let ret = f.stmt(StmtKind::Return(Some(one)));
    let body = f.block(vec![ret], nullary_scope);
    f.define_function(
        nullary,
        "g",
        Vec::new(),
        Some(output),
        Some(Body::Block(body)),
    );

    // g(a: Int) -> Int
    let (unary, unary_scope) = f.declare_function(file);
    let param_ty = f.name_expr("Int");
    let parameter = f.parameter(unary_scope, "a", param_ty);
    let output = f.name_expr("Int");
    let reference = f.name_expr("a");
    let ret = f.stmt(StmtKind::Return(Some(reference)));
    let body = f.block(vec![ret], unary_scope);
    f.define_function(
        unary,
        "g",
        vec![parameter],
        Some(output),
        Some(Body::Block(body)),
    );

    // `g()`, spelled with an empty label list.
    let stem = f.name("g");
    let span = f.span();
    let callee = f.ast.push_expr(
        ExprKind::Name(NameExpr {
            domain: NameDomain::None,
            name: NameRef {
                stem,
                labels: Some(Vec::new()),
                introducer: None,
            },
            arguments: Vec::new(),
        }),
        span,
    );
    let span = f.span();
    let call = f.ast.push_expr(
        ExprKind::Call {
            callee,
            arguments: Vec::new(),
        },
        span,
    );
    let (_, var) = f.binding(file, "y", None, Some(call));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::INT));
    assert_eq!(
        checked.bindings.get(&callee),
        Some(&DeclRef::direct(nullary))
    );
}

#[test]
fn assignment_checks_the_value_against_the_target() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let int_ty = f.name_expr("Int");
    let (binding, _) = f.binding(scope, "x", Some(int_ty), None);
    let declared = f.stmt(StmtKind::Decl(binding));
    let lhs = f.name_expr("x");
    let rhs = f.int(2);
    let assign = f.stmt(StmtKind::Assign { lhs, rhs });
    let body = f.block(vec![declared, assign], scope);
    f.define_function(function, "h", Vec::new(), None, Some(Body::Block(body)));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.expr_types.get(&lhs), Some(&Ty::INT));
    assert_eq!(checked.expr_types.get(&rhs), Some(&Ty::INT));
}

#[test]
fn while_condition_must_be_bool() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let one = f.int(1);
    let loop_body = f.block(Vec::new(), scope);
    let looped = f.stmt(StmtKind::While {
        condition: vec![vela_ir::ConditionItem::Expr(one)],
        body: loop_body,
    });
    let body = f.block(vec![looped], scope);
    f.define_function(function, "g", Vec::new(), None, Some(Body::Block(body)));

    let checked = f.check();
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::TypeMismatch), 1);
}

#[test]
fn local_functions_capture_surrounding_locals_implicitly() {
    let mut f = Fixture::new();
    let file = f.file;
    let (outer, outer_scope) = f.declare_function(file);

    let int_ty = f.name_expr("Int");
    let (binding, var) = f.binding(outer_scope, "c", Some(int_ty), None);
    let declared = f.stmt(StmtKind::Decl(binding));

    let (inner, inner_scope) = f.declare_function(outer_scope);
    let output = f.name_expr("Int");
    let reference = f.name_expr("c");
    let ret = f.stmt(StmtKind::Return(Some(reference)));
    let inner_body = f.block(vec![ret], inner_scope);
    f.define_function(
        inner,
        "grab",
        Vec::new(),
        Some(output),
        Some(Body::Block(inner_body)),
    );
    let inner_stmt = f.stmt(StmtKind::Decl(inner));

    let body = f.block(vec![declared, inner_stmt], outer_scope);
    f.define_function(outer, "o", Vec::new(), None, Some(Body::Block(body)));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(
        checked.implicit_captures.get(&inner),
        Some(&vec![ImplicitCapture {
            decl: var,
            ty: Ty::INT,
        }])
    );
}

#[test]
fn captured_generics_stay_rigid_in_the_capture_record() {
    let mut f = Fixture::new();
    let file = f.file;
    let (outer, outer_scope) = f.declare_function(file);

    let t_name = f.name("T");
    let t_span = f.span();
    let t = f.ast.declare(outer_scope, t_span);
    f.ast.define(
        t,
        DeclKind::GenericParameter(GenericParameterDecl {
            name: t_name,
            conformances: Vec::new(),
            default: None,
        }),
    );
    let annotation = f.name_expr("T");
    let x = f.parameter(outer_scope, "x", annotation);

    let (inner, inner_scope) = f.declare_function(outer_scope);
    let reference = f.name_expr("x");
    let discarded = f.stmt(StmtKind::Expr(reference));
    let inner_body = f.block(vec![discarded], inner_scope);
    f.define_function(inner, "grab", Vec::new(), None, Some(Body::Block(inner_body)));
    let inner_stmt = f.stmt(StmtKind::Decl(inner));

    let body = f.block(vec![inner_stmt], outer_scope);
    let outer_name = f.name("o");
    f.ast.define(
        outer,
        DeclKind::Function(FunctionDecl {
            name: Some(outer_name),
            flags: FunctionFlags::empty(),
            generic: Some(GenericClause {
                parameters: vec![t],
                where_clause: None,
            }),
            explicit_captures: Vec::new(),
            parameters: vec![x],
            receiver: None,
            output: None,
            body: Some(Body::Block(body)),
        }),
    );

    let checked = f.check();
    assert!(!checked.diagnostics.contains_error());
    assert_eq!(
        checked.implicit_captures.get(&inner),
        Some(&vec![ImplicitCapture {
            decl: x,
            ty: Ty::skolem(Ty::GenericParam(t)),
        }])
    );
}
