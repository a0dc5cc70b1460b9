use javelin_classfile::{parse_class_signature, parse_field_signature, parse_method_signature};
use javelin_types::signature::{
    class_needs_signature, class_signature, erased_descriptor, field_signature,
    mangled_nested_name, method_descriptor, method_signature,
};
use javelin_types::{
    ClassDef, ClassKind, FieldDef, Flags, MethodDef, ParamDef, PrimitiveType, Type, TypeStore,
    WildcardBound,
};

use pretty_assertions::assert_eq;

#[test]
fn erased_descriptors_bit_match_the_jvms_grammar() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let list = env.class_id("java.util.List").unwrap();

    assert_eq!(erased_descriptor(&env, &Type::Primitive(PrimitiveType::Int)), "I");
    assert_eq!(erased_descriptor(&env, &string), "Ljava/lang/String;");
    assert_eq!(
        erased_descriptor(&env, &Type::array(Type::array(string.clone()))),
        "[[Ljava/lang/String;"
    );
    // Type arguments erase away.
    assert_eq!(
        erased_descriptor(&env, &Type::class(list, vec![string])),
        "Ljava/util/List;"
    );
}

#[test]
fn method_descriptors_cover_params_and_void() {
    let env = TypeStore::with_minimal_jdk();
    let string = Type::class(env.well_known().string, vec![]);
    let method = MethodDef {
        name: "m".to_string(),
        flags: Flags::PUBLIC,
        type_params: vec![],
        params: vec![
            ParamDef { name: "a".into(), ty: Type::Primitive(PrimitiveType::Int) },
            ParamDef { name: "b".into(), ty: string },
        ],
        return_type: Type::array(Type::Primitive(PrimitiveType::Int)),
        throws: vec![],
        accessed: None,
    };
    assert_eq!(method_descriptor(&env, &method), "(ILjava/lang/String;)[I");

    let void_method = MethodDef { return_type: Type::Void, params: vec![], ..method };
    assert_eq!(method_descriptor(&env, &void_method), "()V");
}

#[test]
fn generic_class_signature_round_trips() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let number = env.well_known().number;
    let serializable = env.well_known().serializable;

    // class Holder<T extends Number> implements java.io.Serializable
    let t = env.add_type_param("T", vec![Type::class(number, vec![])]);
    let holder = env.add_class(ClassDef {
        name: "com.example.Holder".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![t],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(serializable, vec![])],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });

    let signature = class_signature(&env, holder).expect("generic class needs a signature");
    assert_eq!(
        signature,
        "<T:Ljava/lang/Number;>Ljava/lang/Object;Ljava/io/Serializable;"
    );

    // Parsing the generated attribute and printing it yields the same bytes.
    let parsed = parse_class_signature(&signature).expect("own output must parse");
    assert_eq!(parsed.to_string(), signature);
}

#[test]
fn a_type_needs_a_signature_iff_generic_or_parameterized_supers() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let list = env.class_id("java.util.List").unwrap();

    let plain = env.add_class(ClassDef {
        name: "com.example.Plain".to_string(),
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
    assert!(!class_needs_signature(&env, plain));
    assert_eq!(class_signature(&env, plain), None);

    let stringy = env.add_class(ClassDef {
        name: "com.example.Names".to_string(),
        kind: ClassKind::Class,
        flags: Flags::PUBLIC,
        type_params: vec![],
        super_class: Some(Type::class(object, vec![])),
        interfaces: vec![Type::class(list, vec![Type::class(string, vec![])])],
        enclosing: None,
        nested: vec![],
        fields: vec![],
        constructors: vec![],
        methods: vec![],
    });
    assert!(class_needs_signature(&env, stringy));
    let signature = class_signature(&env, stringy).unwrap();
    assert_eq!(
        signature,
        "Ljava/lang/Object;Ljava/util/List<Ljava/lang/String;>;"
    );
    assert_eq!(parse_class_signature(&signature).unwrap().to_string(), signature);
}

#[test]
fn generic_method_signature_round_trips() {
    let mut env = TypeStore::with_minimal_jdk();
    let object = env.well_known().object;

    let u = env.add_type_param("U", vec![Type::class(object, vec![])]);
    let method = MethodDef {
        name: "pick".to_string(),
        flags: Flags::PUBLIC | Flags::STATIC,
        type_params: vec![u],
        params: vec![
            ParamDef { name: "a".into(), ty: Type::TypeVar(u) },
            ParamDef { name: "b".into(), ty: Type::TypeVar(u) },
        ],
        return_type: Type::TypeVar(u),
        throws: vec![],
        accessed: None,
    };

    let signature = method_signature(&env, &method).expect("generic method needs a signature");
    assert_eq!(signature, "<U:Ljava/lang/Object;>(TU;TU;)TU;");
    assert_eq!(parse_method_signature(&signature).unwrap().to_string(), signature);

    // A plain method needs none.
    let plain = MethodDef {
        name: "f".into(),
        flags: Flags::PUBLIC,
        type_params: vec![],
        params: vec![ParamDef { name: "a".into(), ty: Type::Primitive(PrimitiveType::Int) }],
        return_type: Type::Void,
        throws: vec![],
        accessed: None,
    };
    assert_eq!(method_signature(&env, &plain), None);
}

#[test]
fn field_signatures_cover_wildcards() {
    let env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let number = env.well_known().number;

    let ty = Type::class(
        list,
        vec![Type::Wildcard(WildcardBound::Extends(Box::new(Type::class(number, vec![]))))],
    );
    let signature = field_signature(&env, &ty).unwrap();
    assert_eq!(signature, "Ljava/util/List<+Ljava/lang/Number;>;");
    assert_eq!(parse_field_signature(&signature).unwrap().to_string(), signature);

    let plain = Type::class(number, vec![]);
    assert_eq!(field_signature(&env, &plain), None);

    // Exercised only to keep FieldDef's shape honest alongside signatures.
    let _ = FieldDef {
        name: "xs".into(),
        flags: Flags::PUBLIC,
        ty,
        constant_value: None,
    };
}

#[test]
fn nested_name_mangling_is_stable() {
    assert_eq!(mangled_nested_name("Outer", "Inner", false), "Outer$Inner");
    assert_eq!(mangled_nested_name("Outer", "Inner", true), "Outer-Inner");
}
