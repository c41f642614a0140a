//! Declared-type realization and signature well-formedness.

use pretty_assertions::assert_eq;
use vela_diagnostic::ErrorCode;
use vela_ir::{
    Body, Capability, DeclId, DeclKind, ExprId, FunctionDecl, FunctionFlags, MethodDecl,
    MethodImplDecl, OperatorDecl, OperatorNotation, ParameterDecl, ScopeId, StmtKind,
    TypeAliasDecl,
};
use vela_types::{CallableParam, Ty};

use super::{count_of, Fixture, TypeChecker};

fn alias(f: &mut Fixture, name: &str, aliased: ExprId) -> DeclId {
    let stem = f.name(name);
    let span = f.span();
    let file = f.file;
    let decl = f.ast.declare(file, span);
    f.ast.define(
        decl,
        DeclKind::TypeAlias(TypeAliasDecl {
            name: stem,
            generic: None,
            aliased,
        }),
    );
    decl
}

#[test]
fn annotated_binding_realizes_its_declared_type() {
    let mut f = Fixture::new();
    let int_ty = f.name_expr("Int");
    let file = f.file;
    let (binding, var) = f.binding(file, "x", Some(int_ty), None);

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    assert_eq!(checked.decl_types.get(&binding), Some(&Ty::INT));
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::INT));
}

#[test]
fn memberwise_initializer_takes_receiver_then_fields() {
    let mut f = Fixture::new();
    let file = f.file;
    let (product, product_scope) = f.declare_product(file);
    let int_ty = f.name_expr("Int");
    let float_ty = f.name_expr("Float");
    let (x_binding, _) = f.binding(product_scope, "x", Some(int_ty), None);
    let (y_binding, _) = f.binding(product_scope, "y", Some(float_ty), None);
    let init = f.define_product(product, "P", Vec::new(), vec![x_binding, y_binding]);

    let self_name = f.name("Self");
    let x_name = f.name("x");
    let y_name = f.name("y");

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    let expected = Ty::thin_lambda(
        vec![
            CallableParam::new(
                Some(self_name),
                Ty::parameter(Capability::Set, Ty::Product(product)),
            ),
            CallableParam::new(Some(x_name), Ty::parameter(Capability::Sink, Ty::INT)),
            CallableParam::new(Some(y_name), Ty::parameter(Capability::Sink, Ty::FLOAT)),
        ],
        Ty::Void,
    );
    assert_eq!(checked.decl_types.get(&init), Some(&expected));
}

#[test]
fn alias_cycle_is_reported_once_and_memoized() {
    let mut f = Fixture::new();
    let b_ref = f.name_expr("B");
    let a_ref = f.name_expr("A");
    let a = alias(&mut f, "A", b_ref);
    let b = alias(&mut f, "B", a_ref);

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    checker.check_all();
    assert_eq!(
        count_of(checker.diagnostics(), ErrorCode::CircularDependency),
        1
    );
    assert_eq!(checker.realized_type_of(a), Some(&Ty::Error));
    assert_eq!(checker.realized_type_of(b), Some(&Ty::Error));

    // Re-checking answers from the memo without re-diagnosing.
    let reported = checker.diagnostics().len();
    checker.check_all();
    assert_eq!(checker.diagnostics().len(), reported);
}

#[test]
fn duplicate_parameter_names_are_reported() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, scope) = f.declare_function(file);
    let first_ty = f.name_expr("Int");
    let second_ty = f.name_expr("Int");
    let first = f.parameter(scope, "a", first_ty);
    let second = f.parameter(scope, "a", second_ty);
    let body = f.block(Vec::new(), scope);
    f.define_function(
        function,
        "g",
        vec![first, second],
        None,
        Some(Body::Block(body)),
    );

    let checked = f.check();
    assert_eq!(
        count_of(&checked.diagnostics, ErrorCode::DuplicateParameterName),
        1
    );
}

#[test]
fn sum_type_needs_two_alternatives() {
    let mut f = Fixture::new();
    let int_ty = f.name_expr("Int");
    let annotation = f.generic_name_expr("Sum", vec![int_ty]);
    let file = f.file;
    let (_, var) = f.binding(file, "x", Some(annotation), None);

    let checked = f.check();
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::SumTypeArity), 1);
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::Error));
}

#[test]
fn empty_sum_collapses_to_never_with_a_warning() {
    let mut f = Fixture::new();
    let annotation = f.generic_name_expr("Sum", Vec::new());
    let file = f.file;
    let (_, var) = f.binding(file, "x", Some(annotation), None);

    let checked = f.check();
    assert!(!checked.diagnostics.contains_error());
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::EmptySum), 1);
    assert_eq!(checked.decl_types.get(&var), Some(&Ty::Never));
}

#[test]
fn function_without_body_is_reported() {
    let mut f = Fixture::new();
    let file = f.file;
    let (function, _) = f.declare_function(file);
    f.define_function(function, "g", Vec::new(), None, None);

    let checked = f.check();
    assert_eq!(count_of(&checked.diagnostics, ErrorCode::MissingBody), 1);
}

#[test]
fn duplicate_operators_in_one_module_are_reported() {
    let mut f = Fixture::new();
    let stem = f.name("+");
    let file = f.file;
    for _ in 0..2 {
        let span = f.span();
        let decl = f.ast.declare(file, span);
        f.ast.define(
            decl,
            DeclKind::Operator(OperatorDecl {
                notation: OperatorNotation::Infix,
                name: stem,
            }),
        );
    }

    let checked = f.check();
    assert_eq!(
        count_of(&checked.diagnostics, ErrorCode::DuplicateOperator),
        1
    );
}

/// A product `P` holding one method bundle `update` with a single `inout`
/// variant whose body is empty, declared with the given output annotation.
fn product_with_inout_update(f: &mut Fixture, output: Option<ExprId>) {
    let file = f.file;
    let (product, product_scope) = f.declare_product(file);
    let (method, method_scope) = {
        let span = f.span();
        let decl = f.ast.declare(product_scope, span);
        let inner = f.ast.open_scope(decl);
        (decl, inner)
    };

    let variant_span = f.span();
    let variant = f.ast.declare(method_scope, variant_span);
    let variant_scope = f.ast.open_scope(variant);
    let receiver_name = f.name("self");
    let receiver_span = f.span();
    let receiver = f.ast.declare(variant_scope, receiver_span);
    f.ast.define(
        receiver,
        DeclKind::Parameter(ParameterDecl {
            label: None,
            name: receiver_name,
            annotation: None,
            default_value: None,
        }),
    );
    let body = f.block(Vec::new(), variant_scope);
    f.ast.define(
        variant,
        DeclKind::MethodImpl(MethodImplDecl {
            introducer: Capability::Inout,
            receiver,
            body: Some(Body::Block(body)),
        }),
    );

    let method_name = f.name("update");
    f.ast.define(
        method,
        DeclKind::Method(MethodDecl {
            name: method_name,
            generic: None,
            parameters: Vec::new(),
            output,
            impls: vec![variant],
        }),
    );
    f.define_product(product, "P", Vec::new(), vec![method]);
}

#[test]
fn inout_bundle_output_must_be_the_receiver() {
    let mut f = Fixture::new();
    let output = f.name_expr("P");
    product_with_inout_update(&mut f, Some(output));

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
}

#[test]
fn inout_bundle_with_elided_output_is_reported() {
    // The output defaults to void, which can never equal the receiver.
    let mut f = Fixture::new();
    product_with_inout_update(&mut f, None);

    let checked = f.check();
    assert_eq!(
        count_of(&checked.diagnostics, ErrorCode::InoutBundleOutputMismatch),
        1
    );
}

#[test]
fn inout_bundle_with_foreign_output_is_reported() {
    let mut f = Fixture::new();
    let output = f.name_expr("Int");
    product_with_inout_update(&mut f, Some(output));

    let checked = f.check();
    assert_eq!(
        count_of(&checked.diagnostics, ErrorCode::InoutBundleOutputMismatch),
        1
    );
}

#[test]
fn member_receivers_follow_the_declared_capability() {
    fn member(f: &mut Fixture, scope: ScopeId, name: &str, flags: FunctionFlags) -> DeclId {
        let (decl, inner) = f.declare_function(scope);
        let stem = f.name(name);
        let body = f.block(Vec::new(), inner);
        f.ast.define(
            decl,
            DeclKind::Function(FunctionDecl {
                name: Some(stem),
                flags,
                generic: None,
                explicit_captures: Vec::new(),
                parameters: Vec::new(),
                receiver: None,
                output: None,
                body: Some(Body::Block(body)),
            }),
        );
        decl
    }

    let mut f = Fixture::new();
    let file = f.file;
    let (product, product_scope) = f.declare_product(file);
    let reader = member(&mut f, product_scope, "read", FunctionFlags::empty());
    let writer = member(&mut f, product_scope, "write", FunctionFlags::INOUT);
    let taker = member(&mut f, product_scope, "take", FunctionFlags::SINK);
    f.define_product(product, "P", Vec::new(), vec![reader, writer, taker]);

    let checked = f.check();
    assert!(checked.diagnostics.is_empty());
    let receiver = Ty::Product(product);
    assert_eq!(
        checked.decl_types.get(&reader),
        Some(&Ty::Lambda {
            receiver_effect: None,
            environment: Box::new(Ty::remote(Capability::Let, receiver.clone())),
            inputs: Vec::new(),
            output: Box::new(Ty::Void),
        })
    );
    assert_eq!(
        checked.decl_types.get(&writer),
        Some(&Ty::Lambda {
            receiver_effect: Some(Capability::Inout),
            environment: Box::new(Ty::remote(Capability::Inout, receiver.clone())),
            inputs: Vec::new(),
            output: Box::new(Ty::Void),
        })
    );
    assert_eq!(
        checked.decl_types.get(&taker),
        Some(&Ty::Lambda {
            receiver_effect: Some(Capability::Sink),
            environment: Box::new(receiver),
            inputs: Vec::new(),
            output: Box::new(Ty::Void),
        })
    );
}

#[test]
fn finished_requests_are_answered_without_recomputation() {
    let mut f = Fixture::new();
    let file = f.file;
    // One solved body and one reported failure.
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
    let bool_ty = f.name_expr("Bool");
    let two = f.int(2);
    f.binding(file, "x", Some(bool_ty), Some(two));

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    checker.check_all();
    let allocated = checker.fresh_var;
    let reported = checker.diagnostics().len();
    assert!(allocated > 0);

    // A second pass answers every request from the memo; re-running any
    // inference would allocate fresh variables.
    checker.check_all();
    assert_eq!(checker.fresh_var, allocated);
    assert_eq!(checker.diagnostics().len(), reported);
}

#[test]
fn later_checking_never_retracts_earlier_reports() {
    let mut f = Fixture::new();
    let file = f.file;
    let bool_ty = f.name_expr("Bool");
    let one = f.int(1);
    let (first, _) = f.binding(file, "x", Some(bool_ty), Some(one));
    let int_ty = f.name_expr("Int");
    let two = f.int(2);
    f.binding(file, "y", Some(int_ty), Some(two));

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    checker.check_decl(first);
    let earlier: Vec<_> = checker.diagnostics().iter().cloned().collect();
    assert!(!earlier.is_empty());

    checker.check_all();
    for diagnostic in &earlier {
        assert!(checker.diagnostics().iter().any(|d| d == diagnostic));
    }
}
