//! Name lookup through the scope chain and member tables.

use pretty_assertions::assert_eq;
use vela_ir::{DeclKind, ExtensionDecl};
use vela_types::Ty;

use super::{Fixture, TypeChecker};

#[test]
fn inner_declarations_shadow_outer_ones() {
    let mut f = Fixture::new();
    let file = f.file;
    let outer_ty = f.name_expr("Int");
    let (_, outer_var) = f.binding(file, "x", Some(outer_ty), None);
    let (function, scope) = f.declare_function(file);
    let inner_ty = f.name_expr("Int");
    let (_, inner_var) = f.binding(scope, "x", Some(inner_ty), None);
    f.define_function(function, "h", Vec::new(), None, None);
    let x = f.name("x");

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    assert_eq!(checker.unqualified_lookup(x, scope), vec![inner_var]);
    assert_eq!(checker.unqualified_lookup(x, file), vec![outer_var]);
}

#[test]
fn function_overloads_accumulate_to_module_level() {
    let mut f = Fixture::new();
    let file = f.file;
    let (first, _) = f.declare_function(file);
    f.define_function(first, "g", Vec::new(), None, None);
    let (second, _) = f.declare_function(file);
    f.define_function(second, "g", Vec::new(), None, None);

    // One vantage point with nothing in between, one with a local `g`.
    let (plain, plain_scope) = f.declare_function(file);
    f.define_function(plain, "h", Vec::new(), None, None);
    let (shadowing, shadowing_scope) = f.declare_function(file);
    let local_ty = f.name_expr("Int");
    let (_, local) = f.binding(shadowing_scope, "g", Some(local_ty), None);
    f.define_function(shadowing, "k", Vec::new(), None, None);
    let g = f.name("g");

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    assert_eq!(
        checker.unqualified_lookup(g, plain_scope),
        vec![first, second]
    );
    assert_eq!(checker.unqualified_lookup(g, shadowing_scope), vec![local]);
}

#[test]
fn lookup_falls_back_to_module_names_and_siblings() {
    let mut f = Fixture::new();
    let file = f.file;
    let main = f.module;
    let lib_name = f.name("lib");
    let span = f.span();
    let lib = f.ast.push_module(lib_name, span);
    let lib_file = f.ast.push_file(lib);
    let int_ty = f.name_expr("Int");
    let (_, k_var) = f.binding(lib_file, "k", Some(int_ty), None);
    let main_name = f.name("main");
    let k = f.name("k");

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    // A sibling module's top level is reachable once the chain runs dry.
    assert_eq!(checker.unqualified_lookup(k, file), vec![k_var]);
    // The module's own name denotes the module itself.
    assert_eq!(checker.unqualified_lookup(main_name, file), vec![main]);
}

#[test]
fn own_members_shadow_same_named_extension_members() {
    let mut f = Fixture::new();
    let file = f.file;
    let (product, product_scope) = f.declare_product(file);
    let int_ty = f.name_expr("Int");
    let (x_binding, x_var) = f.binding(product_scope, "x", Some(int_ty), None);
    let (own_h, _) = f.declare_function(product_scope);
    f.define_function(own_h, "h", Vec::new(), None, None);
    f.define_product(product, "P", Vec::new(), vec![x_binding, own_h]);

    let span = f.span();
    let extension = f.ast.declare(file, span);
    let extension_scope = f.ast.open_scope(extension);
    let (ext_x, _) = f.declare_function(extension_scope);
    f.define_function(ext_x, "x", Vec::new(), None, None);
    let (ext_h, _) = f.declare_function(extension_scope);
    f.define_function(ext_h, "h", Vec::new(), None, None);
    let subject = f.name_expr("P");
    f.ast.define(
        extension,
        DeclKind::Extension(ExtensionDecl {
            subject,
            where_clause: None,
            members: vec![ext_x, ext_h],
        }),
    );

    let x = f.name("x");
    let h = f.name("h");
    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    // The stored variable answers `x`; the extension function never joins.
    assert_eq!(
        checker.member_lookup(x, &Ty::Product(product), file),
        vec![x_var]
    );
    // Function overloads accumulate across the layers.
    assert_eq!(
        checker.member_lookup(h, &Ty::Product(product), file),
        vec![own_h, ext_h]
    );
}

#[test]
fn lookup_answers_identically_before_and_after_warm_up() {
    let mut f = Fixture::new();
    let file = f.file;
    let (product, _) = f.declare_product(file);
    f.define_product(product, "P", Vec::new(), Vec::new());

    let span = f.span();
    let extension = f.ast.declare(file, span);
    let extension_scope = f.ast.open_scope(extension);
    let (method, _) = f.declare_function(extension_scope);
    f.define_function(method, "h", Vec::new(), None, None);
    let subject = f.name_expr("P");
    f.ast.define(
        extension,
        DeclKind::Extension(ExtensionDecl {
            subject,
            where_clause: None,
            members: vec![method],
        }),
    );

    let int_ty = f.name_expr("Int");
    let (_, k_var) = f.binding(file, "k", Some(int_ty), None);
    let h = f.name("h");
    let k = f.name("k");

    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    let cold = checker.member_lookup(h, &Ty::Product(product), file);
    let warm = checker.member_lookup(h, &Ty::Product(product), file);
    assert_eq!(cold, vec![method]);
    assert_eq!(cold, warm);

    let cold = checker.unqualified_lookup(k, file);
    let warm = checker.unqualified_lookup(k, file);
    assert_eq!(cold, vec![k_var]);
    assert_eq!(cold, warm);
}

#[test]
fn member_lookup_sees_extension_members_and_the_initializer() {
    let mut f = Fixture::new();
    let file = f.file;
    let (product, _) = f.declare_product(file);
    let init = f.define_product(product, "P", Vec::new(), Vec::new());

    let span = f.span();
    let extension = f.ast.declare(file, span);
    let extension_scope = f.ast.open_scope(extension);
    let (method, _) = f.declare_function(extension_scope);
    f.define_function(method, "h", Vec::new(), None, None);
    let subject = f.name_expr("P");
    f.ast.define(
        extension,
        DeclKind::Extension(ExtensionDecl {
            subject,
            where_clause: None,
            members: vec![method],
        }),
    );

    let h = f.name("h");
    let init_name = f.name("init");
    let mut checker = TypeChecker::new(&f.ast, &mut f.names);
    assert_eq!(
        checker.member_lookup(h, &Ty::Product(product), file),
        vec![method]
    );
    assert_eq!(
        checker.member_lookup(init_name, &Ty::Product(product), file),
        vec![init]
    );
}
