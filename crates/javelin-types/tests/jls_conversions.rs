use javelin_types::{
    assignment_conversion, assignment_conversion_with_const, binary_numeric_promotion,
    cast_conversion, method_invocation_conversion, strict_invocation_conversion,
    unary_numeric_promotion, ConstValue, ConversionStep, PrimitiveType, Type, TypeStore,
    TypeWarning, UncheckedReason,
};

use pretty_assertions::assert_eq;

#[test]
fn numeric_promotions() {
    assert_eq!(unary_numeric_promotion(PrimitiveType::Byte), Some(PrimitiveType::Int));
    assert_eq!(unary_numeric_promotion(PrimitiveType::Char), Some(PrimitiveType::Int));
    assert_eq!(unary_numeric_promotion(PrimitiveType::Double), Some(PrimitiveType::Double));
    assert_eq!(unary_numeric_promotion(PrimitiveType::Boolean), None);

    assert_eq!(
        binary_numeric_promotion(PrimitiveType::Int, PrimitiveType::Double),
        Some(PrimitiveType::Double)
    );
    assert_eq!(
        binary_numeric_promotion(PrimitiveType::Short, PrimitiveType::Long),
        Some(PrimitiveType::Long)
    );
    assert_eq!(
        binary_numeric_promotion(PrimitiveType::Byte, PrimitiveType::Char),
        Some(PrimitiveType::Int)
    );
}

#[test]
fn strict_conversion_excludes_boxing() {
    let env = TypeStore::with_minimal_jdk();
    let int_ty = Type::Primitive(PrimitiveType::Int);
    let long_ty = Type::Primitive(PrimitiveType::Long);
    let integer_ty = Type::class(env.well_known().integer, vec![]);

    let widening = strict_invocation_conversion(&env, &int_ty, &long_ty).unwrap();
    assert_eq!(widening.steps, vec![ConversionStep::WideningPrimitive]);

    assert!(strict_invocation_conversion(&env, &int_ty, &integer_ty).is_none());
    assert!(strict_invocation_conversion(&env, &integer_ty, &int_ty).is_none());
}

#[test]
fn boxing_and_widening_reference() {
    let env = TypeStore::with_minimal_jdk();

    let int_ty = Type::Primitive(PrimitiveType::Int);
    let integer_ty = Type::class(env.well_known().integer, vec![]);
    let object_ty = Type::class(env.well_known().object, vec![]);

    let c1 = method_invocation_conversion(&env, &int_ty, &integer_ty).unwrap();
    assert_eq!(c1.steps, vec![ConversionStep::Boxing]);

    let c2 = method_invocation_conversion(&env, &int_ty, &object_ty).unwrap();
    assert_eq!(c2.steps, vec![ConversionStep::Boxing, ConversionStep::WideningReference]);
}

#[test]
fn widening_then_boxing_to_different_wrapper() {
    let env = TypeStore::with_minimal_jdk();

    let int_ty = Type::Primitive(PrimitiveType::Int);
    let long_wrapper = Type::class(env.class_id("java.lang.Long").unwrap(), vec![]);

    let conv = method_invocation_conversion(&env, &int_ty, &long_wrapper).unwrap();
    assert_eq!(conv.steps, vec![ConversionStep::WideningPrimitive, ConversionStep::Boxing]);
}

#[test]
fn unboxing_and_widening_primitive() {
    let env = TypeStore::with_minimal_jdk();

    let integer_ty = Type::class(env.well_known().integer, vec![]);
    let long_ty = Type::Primitive(PrimitiveType::Long);

    let conv = method_invocation_conversion(&env, &integer_ty, &long_ty).unwrap();
    assert_eq!(conv.steps, vec![ConversionStep::Unboxing, ConversionStep::WideningPrimitive]);
}

#[test]
fn raw_type_conversions_produce_unchecked_warning() {
    let env = TypeStore::with_minimal_jdk();
    let list_id = env.class_id("java.util.List").unwrap();
    let array_list_id = env.class_id("java.util.ArrayList").unwrap();

    let list_string = Type::class(list_id, vec![Type::class(env.well_known().string, vec![])]);
    let raw_array_list = Type::class(array_list_id, vec![]);

    let conv = assignment_conversion(&env, &raw_array_list, &list_string).unwrap();
    assert!(conv
        .warnings
        .contains(&TypeWarning::Unchecked(UncheckedReason::RawConversion)));
}

#[test]
fn assignment_allows_constant_narrowing() {
    let env = TypeStore::with_minimal_jdk();
    let int_ty = Type::Primitive(PrimitiveType::Int);
    let byte_ty = Type::Primitive(PrimitiveType::Byte);
    let char_ty = Type::Primitive(PrimitiveType::Char);

    assert!(assignment_conversion(&env, &int_ty, &byte_ty).is_none());

    let conv =
        assignment_conversion_with_const(&env, &int_ty, &byte_ty, Some(&ConstValue::Int(1)))
            .unwrap();
    assert_eq!(conv.steps, vec![ConversionStep::NarrowingPrimitive]);

    assert!(
        assignment_conversion_with_const(&env, &int_ty, &byte_ty, Some(&ConstValue::Int(128)))
            .is_none()
    );
    assert!(
        assignment_conversion_with_const(&env, &int_ty, &char_ty, Some(&ConstValue::Int(-1)))
            .is_none()
    );
}

#[test]
fn cast_allows_numeric_narrowing_and_boxing() {
    let env = TypeStore::with_minimal_jdk();

    let int_ty = Type::Primitive(PrimitiveType::Int);
    let long_ty = Type::Primitive(PrimitiveType::Long);
    let conv = cast_conversion(&env, &long_ty, &int_ty).unwrap();
    assert_eq!(conv.steps, vec![ConversionStep::NarrowingPrimitive]);

    let obj_ty = Type::class(env.well_known().object, vec![]);
    let conv = cast_conversion(&env, &int_ty, &obj_ty).unwrap();
    assert!(conv.steps.contains(&ConversionStep::Boxing));

    // boolean does not cast to a numeric type.
    let bool_ty = Type::Primitive(PrimitiveType::Boolean);
    assert!(cast_conversion(&env, &bool_ty, &int_ty).is_none());
}

#[test]
fn downcast_to_parameterized_type_is_unchecked() {
    let env = TypeStore::with_minimal_jdk();
    let list_id = env.class_id("java.util.List").unwrap();
    let array_list_id = env.class_id("java.util.ArrayList").unwrap();
    let string = Type::class(env.well_known().string, vec![]);

    let list_string = Type::class(list_id, vec![string.clone()]);
    let array_list_string = Type::class(array_list_id, vec![string]);

    let conv = cast_conversion(&env, &list_string, &array_list_string).unwrap();
    assert!(conv
        .warnings
        .contains(&TypeWarning::Unchecked(UncheckedReason::UncheckedCast)));
}

#[test]
fn unrelated_final_class_does_not_cast_to_interface() {
    let env = TypeStore::with_minimal_jdk();
    // String is final and does not implement Cloneable.
    let string = Type::class(env.well_known().string, vec![]);
    let cloneable = Type::class(env.well_known().cloneable, vec![]);
    assert!(cast_conversion(&env, &string, &cloneable).is_none());

    // A non-final class casts to any unrelated interface.
    let number = Type::class(env.well_known().number, vec![]);
    assert!(cast_conversion(&env, &number, &cloneable).is_some());
}
