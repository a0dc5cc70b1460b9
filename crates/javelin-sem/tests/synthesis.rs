mod harness;

use harness::Fixture;
use javelin_classfile::access_flags::{ACC_STATIC, ACC_SYNTHETIC};
use javelin_syntax::{ExprKind, StmtKind};
use javelin_types::{AccessedMember, Flags, PrimitiveType, Symbol, Type};

/// `class O { private int x; class I { int y = x; } }` — the inner
/// initializer reaches `x` through a synthetic static `access$0(O)` added
/// to `O`.
#[test]
fn private_field_across_classes_gets_a_read_accessor() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let x = fx.field("x", int_ref, Flags::PRIVATE, None);

    let use_x = fx.name("x");
    let int_ref_y = fx.prim_ref(PrimitiveType::Int);
    let y = fx.field("y", int_ref_y, Flags::empty(), Some(use_x));
    let mut inner = fx.class("I", Flags::empty());
    inner.fields.push(y);
    let inner_id = fx.add_nested_type(inner);

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.fields.push(x);
    outer.nested.push(inner_id);
    let outer_decl = fx.add_type(outer);

    let sem = fx.analyze();
    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );

    // The use site now binds the accessor, not the field.
    let accessor = sem.ast.expr(use_x).symbol.and_then(Symbol::as_method).expect("accessor bound");
    let outer_id = sem.ast.type_decl(outer_decl).symbol.unwrap();
    assert_eq!(accessor.class, outer_id);

    let accessor_def = sem.store.method(accessor).expect("accessor exists");
    assert!(accessor_def.name.starts_with("access$"));
    assert_eq!(
        accessor_def.flags.to_member_access() & (ACC_STATIC | ACC_SYNTHETIC),
        ACC_STATIC | ACC_SYNTHETIC
    );
    // Instance field: the accessor takes the qualifying instance.
    assert_eq!(accessor_def.params.len(), 1);
    assert_eq!(accessor_def.params[0].ty, Type::class(outer_id, vec![]));
    assert_eq!(accessor_def.return_type, Type::Primitive(PrimitiveType::Int));

    // And it remembers what it forwards to.
    let field_decl_id = {
        let decl = sem.ast.type_decl(outer_decl);
        decl.fields[0].symbol.unwrap()
    };
    assert_eq!(accessor_def.accessed, Some(AccessedMember::Field(field_decl_id)));
}

/// Accessor dedup: the same (member, base type) pair yields the same
/// accessor no matter how often it is queried.
#[test]
fn accessors_are_deduplicated_per_member_and_base() {
    let mut fx = Fixture::new();

    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let x = fx.field("x", int_ref, Flags::PRIVATE, None);

    let use1 = fx.name("x");
    let use2 = fx.name("x");
    let s1 = fx.expr_stmt(use1);
    let s2 = fx.expr_stmt(use2);
    let body = fx.block(vec![s1, s2]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let mut inner = fx.class("I", Flags::empty());
    inner.methods.push(method);
    let inner_id = fx.add_nested_type(inner);

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.fields.push(x);
    outer.nested.push(inner_id);
    fx.add_type(outer);

    let sem = fx.analyze();
    let first = sem.ast.expr(use1).symbol.and_then(Symbol::as_method).expect("accessor");
    let second = sem.ast.expr(use2).symbol.and_then(Symbol::as_method).expect("accessor");
    assert_eq!(first, second);
}

/// A non-static inner class gains `this$0` and its constructors take the
/// enclosing instance first.
#[test]
fn inner_class_creation_inserts_the_enclosing_instance_field() {
    let mut fx = Fixture::new();

    let inner = fx.class("I", Flags::empty());
    let inner_id = fx.add_nested_type(inner);

    // `new I()` inside an instance method of O.
    let inner_ref = fx.named_ref("I");
    let creation = {
        let token = fx.tok("new");
        fx.ast.alloc_expr(
            ExprKind::New { ty: inner_ref, args: vec![], body: None, enclosing: None },
            token,
        )
    };
    let stmt = fx.expr_stmt(creation);
    let body = fx.block(vec![stmt]);
    let method = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.methods.push(method);
    outer.nested.push(inner_id);
    fx.add_type(outer);

    let sem = fx.analyze();
    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );

    let inner_class = sem.ast.type_decl(inner_id).symbol.unwrap();
    let def = sem.store.def(inner_class).unwrap();
    let this0 = def
        .fields
        .iter()
        .find(|f| f.name == "this$0")
        .expect("this$0 inserted");
    assert!(this0.flags.is_synthetic());
    assert!(this0.flags.is_final());

    // Every constructor was given the enclosing instance as its first
    // parameter.
    for ctor in &def.constructors {
        assert_eq!(ctor.params.first().map(|p| p.name.as_str()), Some("this$0"));
    }
}

/// `void m() { final int k = ...; class L { int f() { return k; } } }`
/// (modelled with an anonymous class) — the captured local becomes a
/// `val$k` field plus a trailing constructor parameter.
#[test]
fn captured_local_gets_a_shadow_field_and_ctor_parameter() {
    let mut fx = Fixture::new();

    // final int k = read(); (non-constant initializer)
    let read_call = fx.call(None, "read", vec![]);
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let k_decl = fx.local("k", int_ref, Flags::FINAL, Some(read_call));

    // new Object() { int f() { return k; } }
    let use_k = fx.name("k");
    let ret = {
        let token = fx.tok("return");
        fx.ast.alloc_stmt(StmtKind::Return { value: Some(use_k) }, token)
    };
    let f_body = fx.block(vec![ret]);
    let int_ref_f = fx.prim_ref(PrimitiveType::Int);
    let f = fx.method("f", Flags::empty(), vec![], Some(int_ref_f), Some(f_body));
    let mut anon_body = fx.class("<anonymous>", Flags::empty());
    anon_body.methods.push(f);
    let anon_decl = fx.add_nested_type(anon_body);

    let object_ref = fx.named_ref("Object");
    let creation = {
        let token = fx.tok("new");
        fx.ast.alloc_expr(
            ExprKind::New { ty: object_ref, args: vec![], body: Some(anon_decl), enclosing: None },
            token,
        )
    };
    let creation_stmt = fx.expr_stmt(creation);

    let body = fx.block(vec![k_decl, creation_stmt]);
    let m = fx.method("m", Flags::empty(), vec![], None, Some(body));
    let int_ref_r = fx.prim_ref(PrimitiveType::Int);
    let read = fx.method("read", Flags::empty(), vec![], Some(int_ref_r), None);

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.methods.extend([m, read]);
    fx.add_type(outer);

    let sem = fx.analyze();
    assert!(
        !sem.diagnostics.has_errors(),
        "{:?}",
        sem.diagnostics.iter().collect::<Vec<_>>()
    );

    let anon_class = sem.ast.type_decl(anon_decl).symbol.expect("anonymous class built");
    let def = sem.store.def(anon_class).unwrap();
    assert!(def.flags.contains(Flags::ANONYMOUS));
    assert!(def.flags.is_final());

    let shadow = def
        .fields
        .iter()
        .find(|f| f.name == "val$k")
        .expect("captured local shadowed");
    assert!(shadow.flags.is_synthetic());
    assert_eq!(shadow.ty, Type::Primitive(PrimitiveType::Int));

    // The synthesised constructor carries the captured value.
    assert!(def
        .constructors
        .iter()
        .any(|c| c.params.iter().any(|p| p.name == "val$k")));
}

/// Capturing a non-final local is an error.
#[test]
fn non_final_local_capture_is_rejected() {
    let mut fx = Fixture::new();

    let init = fx.int_lit(0);
    let int_ref = fx.prim_ref(PrimitiveType::Int);
    let k_decl = fx.local("k", int_ref, Flags::empty(), Some(init));

    let use_k = fx.name("k");
    let ret = {
        let token = fx.tok("return");
        fx.ast.alloc_stmt(StmtKind::Return { value: Some(use_k) }, token)
    };
    let f_body = fx.block(vec![ret]);
    let int_ref_f = fx.prim_ref(PrimitiveType::Int);
    let f = fx.method("f", Flags::empty(), vec![], Some(int_ref_f), Some(f_body));
    let mut anon_body = fx.class("<anonymous>", Flags::empty());
    anon_body.methods.push(f);
    let anon_decl = fx.add_nested_type(anon_body);

    let object_ref = fx.named_ref("Object");
    let creation = {
        let token = fx.tok("new");
        fx.ast.alloc_expr(
            ExprKind::New { ty: object_ref, args: vec![], body: Some(anon_decl), enclosing: None },
            token,
        )
    };
    let creation_stmt = fx.expr_stmt(creation);
    let body = fx.block(vec![k_decl, creation_stmt]);
    let m = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.methods.push(m);
    fx.add_type(outer);

    let sem = fx.analyze();
    assert!(sem
        .diagnostics
        .iter()
        .any(|d| d.code == "SemanticError::NON_FINAL_LOCAL_CAPTURED"));
}

/// Anonymous classes implementing an interface get Object as the direct
/// super and the interface as their only superinterface.
#[test]
fn anonymous_class_over_an_interface_supers_object() {
    let mut fx = Fixture::new();

    let anon_body = fx.class("<anonymous>", Flags::empty());
    let anon_decl = fx.add_nested_type(anon_body);

    let cloneable_ref = fx.named_ref("Cloneable");
    let creation = {
        let token = fx.tok("new");
        fx.ast.alloc_expr(
            ExprKind::New {
                ty: cloneable_ref,
                args: vec![],
                body: Some(anon_decl),
                enclosing: None,
            },
            token,
        )
    };
    let stmt = fx.expr_stmt(creation);
    let body = fx.block(vec![stmt]);
    let m = fx.method("m", Flags::empty(), vec![], None, Some(body));

    let mut outer = fx.class("O", Flags::PUBLIC);
    outer.methods.push(m);
    fx.add_type(outer);

    let sem = fx.analyze();
    assert!(!sem.diagnostics.has_errors());

    let anon_class = sem.ast.type_decl(anon_decl).symbol.unwrap();
    let def = sem.store.def(anon_class).unwrap();
    let object = sem.store.well_known().object;
    let cloneable = sem.store.well_known().cloneable;
    assert_eq!(def.super_class, Some(Type::class(object, vec![])));
    assert_eq!(def.interfaces, vec![Type::class(cloneable, vec![])]);

    // Numbered per outermost type.
    assert!(sem.store.class_name(anon_class).ends_with("$1"));
}
