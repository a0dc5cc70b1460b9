use javelin_types::{
    instantiate_supertype, is_subtype, member_type_in, resolve_field, resolve_method_call,
    CallKind, ClassDef, ClassKind, FieldDef, FieldResolution, Flags, MethodCall, MethodDef,
    MethodResolution, ParamDef, Type, TypeStore,
};

use pretty_assertions::assert_eq;

#[test]
fn inheritance_type_arg_substitution() {
    let env = TypeStore::with_minimal_jdk();

    let array_list = env.class_id("java.util.ArrayList").unwrap();
    let list = env.class_id("java.util.List").unwrap();
    let string = env.well_known().string;
    let object = env.well_known().object;

    let array_list_string = Type::class(array_list, vec![Type::class(string, vec![])]);
    let list_string = Type::class(list, vec![Type::class(string, vec![])]);
    let list_object = Type::class(list, vec![Type::class(object, vec![])]);

    assert!(is_subtype(&env, &array_list_string, &list_string));
    assert!(!is_subtype(&env, &array_list_string, &list_object));

    assert_eq!(
        instantiate_supertype(&env, &array_list_string, list),
        Some(vec![Type::class(string, vec![])])
    );
}

/// `class Box<T> { T v; T get() {...} } class S extends Box<String> {}`
/// — members reached through `S` substitute `T := String`.
fn box_and_sub(env: &mut TypeStore) -> (javelin_types::ClassId, javelin_types::ClassId) {
    let object = env.well_known().object;
    let string = env.well_known().string;

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let box_id = env.add_class(ClassDef {
        name: "com.example.Box".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![t],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![FieldDef {
            name: "v".to_string(),
            flags: Flags::PUBLIC,
            ty: Type::TypeVar(t),
            constant_value: None,
        }],
        constructors: vec![],
        methods: vec![MethodDef {
            name: "get".to_string(),
            flags: Flags::PUBLIC,
            type_params: vec![],
            params: vec![],
            return_type: Type::TypeVar(t),
            throws: vec![],
            accessed: None,
        }],
    });
    let sub = env.add_class(ClassDef {
        name: "com.example.S".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(box_id, vec![Type::class(string, vec![])])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    (box_id, sub)
}

#[test]
fn method_return_substitutes_through_parameterized_super() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let (_box_id, sub) = box_and_sub(&mut env);

    let call = MethodCall {
        receiver: Type::class(sub, vec![]),
        call_kind: CallKind::Instance,
        name: "get",
        args: vec![],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, Type::class(string, vec![]));
}

#[test]
fn field_substitution_uses_the_declared_type() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let (box_id, sub) = box_and_sub(&mut env);

    match resolve_field(&mut env, &Type::class(sub, vec![]), "v") {
        FieldResolution::Found(found) => {
            assert_eq!(found.ty, Type::class(string, vec![]));
            assert_eq!(found.declared_in, Some(box_id));
        }
        other => panic!("expected field, got {other:?}"),
    }
}

#[test]
fn raw_receiver_sees_the_erasure() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let (box_id, _sub) = box_and_sub(&mut env);

    match resolve_field(&mut env, &Type::class(box_id, vec![]), "v") {
        FieldResolution::Found(found) => {
            assert_eq!(found.ty, Type::class(object, vec![]));
        }
        other => panic!("expected field, got {other:?}"),
    }
}

#[test]
fn same_erasure_parameters_substitute_by_identity() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let integer = env.well_known().integer;

    // class Pair<K, V> { K k; V v; } — K and V share an erasure.
    let k = env.add_type_param("K", vec![Type::class(object, vec![])]);
    let v = env.add_type_param("V", vec![Type::class(object, vec![])]);
    let pair = env.add_class(ClassDef {
        name: "com.example.Pair".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![k, v],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![
            FieldDef {
                name: "k".into(),
                flags: Flags::PUBLIC,
                ty: Type::TypeVar(k),
                constant_value: None,
            },
            FieldDef {
                name: "v".into(),
                flags: Flags::PUBLIC,
                ty: Type::TypeVar(v),
                constant_value: None,
            },
        ],
        constructors: vec![],
        methods: vec![],
    });

    let receiver = Type::class(
        pair,
        vec![Type::class(string, vec![]), Type::class(integer, vec![])],
    );
    match resolve_field(&mut env, &receiver, "k") {
        FieldResolution::Found(found) => assert_eq!(found.ty, Type::class(string, vec![])),
        other => panic!("expected field, got {other:?}"),
    }
    match resolve_field(&mut env, &receiver, "v") {
        FieldResolution::Found(found) => assert_eq!(found.ty, Type::class(integer, vec![])),
        other => panic!("expected field, got {other:?}"),
    }
}

#[test]
fn member_type_in_walks_interface_chains() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let map = env.class_id("java.util.Map").unwrap();
    let hash_map = env.class_id("java.util.HashMap").unwrap();

    let receiver = Type::class(
        hash_map,
        vec![Type::class(string, vec![]), Type::class(string, vec![])],
    );
    let value_param = env.def(map).unwrap().type_params[1];
    let substituted = member_type_in(&env, &receiver, map, &Type::TypeVar(value_param));
    assert_eq!(substituted, Type::class(string, vec![]));
}

#[test]
fn array_clone_returns_the_array_type() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = env.well_known().string;
    let receiver = Type::array(Type::class(string, vec![]));

    let call = MethodCall {
        receiver: receiver.clone(),
        call_kind: CallKind::Instance,
        name: "clone",
        args: vec![],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, receiver);
}

#[test]
fn methods_declared_with_params_still_resolve() {
    // A smoke check that ParamDef construction used across these tests
    // matches what the resolver consumes.
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let id = env.add_class(ClassDef {
        name: "com.example.P".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![MethodDef {
            name: "id".into(),
            flags: Flags::PUBLIC,
            type_params: vec![],
            params: vec![ParamDef { name: "x".into(), ty: Type::class(object, vec![]) }],
            return_type: Type::class(object, vec![]),
            throws: vec![],
            accessed: None,
        }],
    });
    let call = MethodCall {
        receiver: Type::class(id, vec![]),
        call_kind: CallKind::Instance,
        name: "id",
        args: vec![Type::Null],
        explicit_type_args: vec![],
    };
    assert!(matches!(resolve_method_call(&mut env, &call), MethodResolution::Found(_)));
}
