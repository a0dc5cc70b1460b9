mod harness;

use harness::{codes, Fixture};
use javelin_syntax::ExprKind;
use javelin_types::{Flags, PrimitiveType, Symbol, Type};

/// `class C { int x; void m() { long x; x = ...; } }` — the block-local
/// declaration wins the lookup; no cross-class fallthrough.
#[test]
fn local_declaration_shadows_field() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let long_ref = fx.prim_ref(PrimitiveType::Long);
    let field = fx.field("x", int_ref, Flags::empty(), None);

    let use_x = fx.name("x");
    let use_stmt = fx.expr_stmt(use_x);
    let decl = fx.local("x", long_ref, Flags::empty(), None);
    let body = fx.block(vec![decl, use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());

    let node = sem.ast.expr(use_x);
    assert!(matches!(node.symbol, Some(Symbol::Local(_))));
    assert_eq!(node.ty, Some(Type::Primitive(PrimitiveType::Long)));
}

#[test]
fn field_resolves_when_no_local_hides_it() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("count", int_ref, Flags::empty(), None);

    let use_count = fx.name("count");
    let use_stmt = fx.expr_stmt(use_count);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());
    assert!(matches!(sem.ast.expr(use_count).symbol, Some(Symbol::Field(_))));
}

#[test]
fn unknown_name_suggests_a_close_field() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("length", int_ref, Flags::empty(), None);

    let use_expr = fx.name("lenght");
    let use_stmt = fx.expr_stmt(use_expr);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    let not_found = codes(&sem, "SemanticError::NOT_FOUND_VARIABLE");
    assert_eq!(not_found.len(), 1);
    assert!(not_found[0].message.contains("length"));
    // Recovery: the node carries the error sentinel, not a missing type.
    assert_eq!(sem.ast.expr(use_expr).ty, Some(Type::Error));
}

#[test]
fn instance_field_in_static_method_is_rejected() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let field = fx.field("x", int_ref, Flags::empty(), None);

    let use_x = fx.name("x");
    let use_stmt = fx.expr_stmt(use_x);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::STATIC, vec![], None, Some(body));

    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(codes(&sem, "SemanticError::INSTANCE_IN_STATIC_REGION").len(), 1);
}

/// A statically imported constant is found after scopes and fields fail.
/// The holder lives in the same unit, so no classpath is needed.
#[test]
fn single_static_import_resolves_a_constant() {
    let mut fx = Fixture::new();
    fx.set_package("com.ext");
    fx.import_static("com.ext.Constants", "WIDTH");

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let init = fx.int_lit(42);
    let width =
        fx.field("WIDTH", int_ref, Flags::PUBLIC | Flags::STATIC | Flags::FINAL, Some(init));
    let mut holder = fx.class("Constants", Flags::PUBLIC);
    holder.fields.push(width);
    fx.add_type(holder);

    let use_expr = fx.name("WIDTH");
    let use_stmt = fx.expr_stmt(use_expr);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let mut class = fx.class("C", Flags::PUBLIC);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );
    assert!(matches!(sem.ast.expr(use_expr).symbol, Some(Symbol::Field(_))));
    assert_eq!(sem.ast.expr(use_expr).ty, Some(Type::Primitive(PrimitiveType::Int)));
}

#[test]
fn ambiguous_static_on_demand_imports_are_reported() {
    let mut fx = Fixture::new();
    fx.set_package("p");
    fx.import_static_on_demand("p.A");
    fx.import_static_on_demand("p.B");

    for holder_name in ["A", "B"] {
        let int_ref = fx.prim_ref(PrimitiveType::Int);
        let init = fx.int_lit(1);
        let field = fx.field(
            "MAX",
            int_ref,
            Flags::PUBLIC | Flags::STATIC | Flags::FINAL,
            Some(init),
        );
        let mut holder = fx.class(holder_name, Flags::PUBLIC);
        holder.fields.push(field);
        fx.add_type(holder);
    }

    let use_expr = fx.name("MAX");
    let use_stmt = fx.expr_stmt(use_expr);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let mut class = fx.class("C", Flags::PUBLIC);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!codes(&sem, "SemanticError::AMBIGUOUS_FIELD").is_empty());
}

#[test]
fn qualified_static_field_through_type_name() {
    let mut fx = Fixture::new();
    fx.set_package("p");

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let init = fx.int_lit(7);
    let field = fx.field(
        "LIMIT",
        int_ref,
        Flags::PUBLIC | Flags::STATIC | Flags::FINAL,
        Some(init),
    );
    let mut holder = fx.class("Holder", Flags::PUBLIC);
    holder.fields.push(field);
    fx.add_type(holder);

    // `Holder.LIMIT` as a qualified name expression.
    let holder_name = fx.name("Holder");
    let token = fx.tok("LIMIT");
    let access = fx.ast.alloc_expr(
        ExprKind::Name {
            qualifier: Some(holder_name),
            name: javelin_core::Name::new("LIMIT"),
        },
        token,
    );
    let use_stmt = fx.expr_stmt(access);
    let body = fx.block(vec![use_stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let mut class = fx.class("C", Flags::PUBLIC);
    class.methods.push(method);
    fx.add_type(class);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());
    assert!(matches!(sem.ast.expr(holder_name).symbol, Some(Symbol::Class(_))));
    assert!(matches!(sem.ast.expr(access).symbol, Some(Symbol::Field(_))));
    // The constant value propagated to the use.
    assert!(sem.ast.expr(access).value.is_some());
}

/// Seeding a type into the store after the fact keeps working: undefined
/// ids behave as `bad` types and convert freely.
#[test]
fn unknown_types_recover_with_a_single_diagnostic() {
    let mut fx = Fixture::new();

    let missing_ref = fx.named_ref("does.not.Exist");
    let field = fx.field("x", missing_ref, Flags::empty(), None);
    let mut class = fx.class("C", Flags::PUBLIC);
    class.fields.push(field);
    fx.add_type(class);

    let sem = fx.analyze();
    assert_eq!(codes(&sem, "SemanticError::NOT_FOUND_TYPE").len(), 1);
}
