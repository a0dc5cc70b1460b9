use javelin_types::{
    infer_type_arguments, resolve_method_call, CallKind, ClassDef, ClassKind, Flags, MethodCall,
    MethodDef, MethodResolution, ParamDef, PrimitiveType, Type, TypeStore,
};

use pretty_assertions::assert_eq;

/// `class Util { static <T> T pick(T a, T b); static <T> T first(T[] a); }`
fn util_class(env: &mut TypeStore) -> Type {
    let object = env.well_known().object;
    let pick_t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let first_t = env.add_type_param("T", vec![Type::class(object, vec![])]);

    let id = env.add_class(ClassDef {
        name: "com.example.Util".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![
            MethodDef {
                name: "pick".to_string(),
                flags: Flags::PUBLIC | Flags::STATIC,
                type_params: vec![pick_t],
                params: vec![
                    ParamDef { name: "a".into(), ty: Type::TypeVar(pick_t) },
                    ParamDef { name: "b".into(), ty: Type::TypeVar(pick_t) },
                ],
                return_type: Type::TypeVar(pick_t),
                throws: vec![],
                accessed: None,
            },
            MethodDef {
                name: "first".to_string(),
                flags: Flags::PUBLIC | Flags::STATIC,
                type_params: vec![first_t],
                params: vec![ParamDef {
                    name: "a".into(),
                    ty: Type::array(Type::TypeVar(first_t)),
                }],
                return_type: Type::TypeVar(first_t),
                throws: vec![],
                accessed: None,
            },
        ],
    });
    Type::class(id, vec![])
}

#[test]
fn identical_argument_types_bind_directly() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let util = util_class(&mut env);

    let call = MethodCall {
        receiver: util,
        call_kind: CallKind::Static,
        name: "pick",
        args: vec![string.clone(), string.clone()],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, string.clone());
    assert_eq!(found.params, vec![string.clone(), string]);
}

#[test]
fn mixed_argument_types_widen_to_their_join() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let integer = Type::class(env.well_known().integer, vec![]);
    let object = Type::class(env.well_known().object, vec![]);
    let util = util_class(&mut env);

    let call = MethodCall {
        receiver: util,
        call_kind: CallKind::Static,
        name: "pick",
        args: vec![string, integer],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, object);
}

#[test]
fn array_arguments_subtract_dimensions() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let util = util_class(&mut env);

    let call = MethodCall {
        receiver: util,
        call_kind: CallKind::Static,
        name: "first",
        args: vec![Type::array(string.clone())],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, string);
}

#[test]
fn primitive_arguments_bind_through_their_wrapper() {
    let mut env = TypeStore::with_minimal_jdk();
    let integer = Type::class(env.well_known().integer, vec![]);
    let util = util_class(&mut env);

    let call = MethodCall {
        receiver: util,
        call_kind: CallKind::Static,
        name: "pick",
        args: vec![
            Type::Primitive(PrimitiveType::Int),
            Type::Primitive(PrimitiveType::Int),
        ],
        explicit_type_args: vec![],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, integer);
}

#[test]
fn explicit_type_arguments_override_inference() {
    let mut env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let object = Type::class(env.well_known().object, vec![]);
    let util = util_class(&mut env);

    let call = MethodCall {
        receiver: util,
        call_kind: CallKind::Static,
        name: "pick",
        args: vec![string.clone(), string],
        explicit_type_args: vec![object.clone()],
    };
    let MethodResolution::Found(found) = resolve_method_call(&mut env, &call) else {
        panic!("expected resolution");
    };
    assert_eq!(found.return_type, object);
}

#[test]
fn parameterized_formals_infer_through_the_argument_hierarchy() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = Type::class(env.well_known().string, vec![]);
    let list = env.class_id("java.util.List").unwrap();
    let array_list = env.class_id("java.util.ArrayList").unwrap();

    // <E> E head(List<E> list) — called with ArrayList<String>.
    let e = env.add_type_param("E", vec![Type::class(object, vec![])]);
    let formals = vec![Type::class(list, vec![Type::TypeVar(e)])];
    let args = vec![Type::class(array_list, vec![string.clone()])];

    let bindings = infer_type_arguments(&env, &[e], &formals, &args);
    assert_eq!(bindings.get(&e), Some(&string));
}

#[test]
fn anonymous_subclass_of_parameterized_interface_infers_its_argument() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = Type::class(env.well_known().string, vec![]);

    // interface Handler<T> { ... }; class StringHandler implements
    // Handler<String> — the shape an anonymous class creation leaves
    // behind.
    let h_t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let handler = env.add_class(ClassDef {
        name: "com.example.Handler".to_string(),
        kind: ClassKind::Interface,
        flags: Flags::PUBLIC | Flags::INTERFACE,
        type_params: vec![h_t],
        super_class: None,
        interfaces: vec![],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    let string_handler = env.add_class(ClassDef {
        name: "com.example.Main$1".to_string(),
        kind: ClassKind::Class,
        flags: Flags::FINAL,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(handler, vec![string.clone()])],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let t = env.add_type_param("T", vec![Type::class(object, vec![])]);
    let formals = vec![Type::class(handler, vec![Type::TypeVar(t)])];
    let args = vec![Type::class(string_handler, vec![])];

    let bindings = infer_type_arguments(&env, &[t], &formals, &args);
    assert_eq!(bindings.get(&t), Some(&string));
}
