use std::collections::HashMap;

use javelin_classfile::{ClassStub, FieldStub, MethodStub};
use javelin_types::{
    resolve_field, resolve_method_call, CallKind, ClassDef, ClassKind, FieldDef, FieldResolution,
    Flags, MethodCall, MethodDef, MethodResolution, ParamDef, PrimitiveType, Type, TypeProvider,
    TypeStore,
};

#[derive(Default)]
struct StubProvider {
    stubs: HashMap<String, ClassStub>,
}

impl StubProvider {
    fn insert(&mut self, stub: ClassStub) {
        self.stubs.insert(stub.binary_name.clone(), stub);
    }
}

impl TypeProvider for StubProvider {
    fn lookup_type(&self, binary_name: &str) -> Option<ClassStub> {
        self.stubs.get(binary_name).cloned()
    }
}

fn stub(binary_name: &str, super_class: Option<&str>) -> ClassStub {
    ClassStub {
        internal_name: binary_name.replace('.', "/"),
        binary_name: binary_name.to_string(),
        access_flags: 0x0021,
        super_class: super_class.map(|s| s.to_string()),
        interfaces: vec![],
        signature: None,
        inner_classes: vec![],
        fields: vec![],
        methods: vec![],
        deprecated: false,
    }
}

#[test]
fn expanded_field_table_keeps_shadowed_declarations_as_conflicts() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    let base = env.add_class(ClassDef {
        name: "com.example.Base".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![FieldDef {
            name: "x".into(),
            flags: Flags::PUBLIC,
            ty: Type::Primitive(PrimitiveType::Int),
            constant_value: None,
        }],
        constructors: vec![],
        methods: vec![],
    });
    let sub = env.add_class(ClassDef {
        name: "com.example.Sub".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(base, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![FieldDef {
            name: "x".into(),
            flags: Flags::PUBLIC,
            ty: Type::Primitive(PrimitiveType::Long),
            constant_value: None,
        }],
        constructors: vec![],
        methods: vec![],
    });

    let tables = env.expanded_tables(sub);
    let shadow = tables.field("x").expect("field present");
    assert_eq!(shadow.field.class, sub);
    assert_eq!(shadow.conflicts.len(), 1);
    assert_eq!(shadow.conflicts[0].class, base);
    drop(tables);

    // The preferred declaration hides the inherited one; no ambiguity.
    match resolve_field(&mut env, &Type::class(sub, vec![]), "x") {
        FieldResolution::Found(found) => {
            assert_eq!(found.ty, Type::Primitive(PrimitiveType::Long));
        }
        other => panic!("expected field, got {other:?}"),
    }
}

#[test]
fn fields_inherited_from_unrelated_interfaces_are_ambiguous() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    let iface = |env: &mut TypeStore, name: &str| {
        env.add_class(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Interface,
            flags: Flags::PUBLIC | Flags::INTERFACE,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![FieldDef {
                name: "K".into(),
                flags: Flags::PUBLIC | Flags::STATIC | Flags::FINAL,
                ty: Type::Primitive(PrimitiveType::Int),
                constant_value: None,
            }],
            constructors: vec![],
            methods: vec![],
        })
    };
    let a = iface(&mut env, "com.example.IA");
    let b = iface(&mut env, "com.example.IB");

    let both = env.add_class(ClassDef {
        name: "com.example.Both".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(a, vec![]), Type::class(b, vec![])],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    assert!(matches!(
        resolve_field(&mut env, &Type::class(both, vec![]), "K"),
        FieldResolution::Ambiguous(_)
    ));
}

#[test]
fn overriding_methods_collapse_into_one_overload() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    let m = |ret: Type| MethodDef {
        name: "m".to_string(),
        flags: Flags::PUBLIC,
        type_params: vec![],
        params: vec![ParamDef { name: "p".into(), ty: Type::Primitive(PrimitiveType::Int) }],
        return_type: ret,
        throws: vec![],
        accessed: None,
    };

    let base = env.add_class(ClassDef {
        name: "com.example.OBase".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![m(Type::Void)],
    });
    let sub = env.add_class(ClassDef {
        name: "com.example.OSub".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(base, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![m(Type::Void)],
    });

    let tables = env.expanded_tables(sub);
    let overloads = tables.overloads("m");
    assert_eq!(overloads.len(), 1);
    assert_eq!(overloads[0].method.class, sub);
    assert_eq!(overloads[0].conflicts.len(), 1);
    drop(tables);

    let call = MethodCall {
        receiver: Type::class(sub, vec![]),
        call_kind: CallKind::Instance,
        name: "m",
        args: vec![Type::Primitive(PrimitiveType::Int)],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.owner, sub);
}

#[test]
fn tables_are_computed_once_and_reused() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let id = env.add_class(ClassDef {
        name: "com.example.Once".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    let first = env.expanded_tables(id);
    let second = env.expanded_tables(id);
    assert!(std::rc::Rc::ptr_eq(&first, &second));
}

#[test]
fn external_types_materialize_lazily_from_stubs() {
    let mut provider = StubProvider::default();
    let mut dep = stub("com.dep.Widget", Some("java/lang/Object"));
    dep.fields.push(FieldStub {
        access_flags: 0x0019, // public static final
        name: "SIZE".to_string(),
        descriptor: "I".to_string(),
        signature: None,
        constant_value: None,
        deprecated: false,
    });
    dep.methods.push(MethodStub {
        access_flags: 0x0001,
        name: "resize".to_string(),
        descriptor: "(I)Lcom/dep/Widget;".to_string(),
        signature: None,
        exceptions: vec!["java/io/IOException".to_string()],
        deprecated: false,
    });
    provider.insert(dep);

    let mut env = TypeStore::with_minimal_jdk();
    let widget = env
        .load_external("com.dep.Widget", &provider)
        .expect("stub should load");
    assert!(env.is_defined(widget));

    // Members arrived with descriptor-derived types.
    match resolve_field(&mut env, &Type::class(widget, vec![]), "SIZE") {
        FieldResolution::Found(found) => {
            assert_eq!(found.ty, Type::Primitive(PrimitiveType::Int));
        }
        other => panic!("expected field, got {other:?}"),
    }

    // The return type referenced the class itself; ids match without a
    // second load.
    let call = MethodCall {
        receiver: Type::class(widget, vec![]),
        call_kind: CallKind::Instance,
        name: "resize",
        args: vec![Type::Primitive(PrimitiveType::Int)],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, Type::class(widget, vec![]));

    // The throws clause stays pending until asked for.
    let thrown = javelin_types::resolve_method_throws(&mut env, found.method);
    assert_eq!(thrown.len(), 1);
    let io = env.class_id("java.io.IOException").unwrap();
    assert_eq!(thrown[0], Type::class(io, vec![]));
}

#[test]
fn generic_signatures_win_over_descriptors_when_loading() {
    let mut provider = StubProvider::default();
    let mut dep = stub("com.dep.Box", Some("java/lang/Object"));
    dep.signature = Some("<T:Ljava/lang/Object;>Ljava/lang/Object;".to_string());
    dep.fields.push(FieldStub {
        access_flags: 0x0001,
        name: "value".to_string(),
        descriptor: "Ljava/lang/Object;".to_string(),
        signature: Some("TT;".to_string()),
        constant_value: None,
        deprecated: false,
    });
    provider.insert(dep);

    let mut env = TypeStore::with_minimal_jdk();
    let box_id = env.load_external("com.dep.Box", &provider).unwrap();
    let string = Type::class(env.well_known().string, vec![]);

    match resolve_field(&mut env, &Type::class(box_id, vec![string.clone()]), "value") {
        FieldResolution::Found(found) => assert_eq!(found.ty, string),
        other => panic!("expected field, got {other:?}"),
    }
}
