//! Semantic error and warning kinds.
//!
//! Each kind maps to a stable `SemanticError::<KIND>` code used by the
//! external message catalog; the message text carried alongside is a
//! fallback rendering of the same arguments.

use javelin_core::Severity;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SemanticErrorKind {
    // Resolution errors.
    NotFoundVariable,
    NotFoundMethod,
    NotFoundType,
    NotFoundConstructor,
    NotFoundPackage,
    AmbiguousField,
    AmbiguousMethod,
    AmbiguousType,
    AccessViolation,
    TypeNotValue,
    PackageNotType,
    FieldNotMethod,
    MethodNotField,

    // Type errors.
    IncompatibleTypes,
    InvalidCast,
    TypeNotReference,
    TypeNotIntegral,
    TypeNotBoolean,
    TypeNotNumeric,
    TypeIsVoid,
    InvalidInstanceof,
    AbstractSuperCall,

    // Constant errors.
    ConstantOverflow,
    InvalidNarrowing,
    NegativeArraySize,
    ZeroDivide,
    ShiftCountOutOfRange,

    // Generics errors.
    UncheckedConversion,
    UncheckedCast,
    InstanceofParameterizedType,
    ExplicitTypeArgumentsNotSupported,

    // Structural errors.
    ForwardReference,
    CircularInitializer,
    InstanceInStaticRegion,
    InstanceInExplicitCtorCall,
    SelfInExplicitCtorCall,
    EnclosingInstanceNotAccessible,
    NonFinalLocalCaptured,
    SuperOfObject,
    InheritanceScopeConflict,

    // Advisory.
    Deprecated,
    SyntheticAccess,
    StaticViaInstance,
    UncaughtException,
}

impl SemanticErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            SemanticErrorKind::NotFoundVariable => "SemanticError::NOT_FOUND_VARIABLE",
            SemanticErrorKind::NotFoundMethod => "SemanticError::NOT_FOUND_METHOD",
            SemanticErrorKind::NotFoundType => "SemanticError::NOT_FOUND_TYPE",
            SemanticErrorKind::NotFoundConstructor => "SemanticError::NOT_FOUND_CONSTRUCTOR",
            SemanticErrorKind::NotFoundPackage => "SemanticError::NOT_FOUND_PACKAGE",
            SemanticErrorKind::AmbiguousField => "SemanticError::AMBIGUOUS_FIELD",
            SemanticErrorKind::AmbiguousMethod => "SemanticError::AMBIGUOUS_METHOD",
            SemanticErrorKind::AmbiguousType => "SemanticError::AMBIGUOUS_TYPE",
            SemanticErrorKind::AccessViolation => "SemanticError::ACCESS_VIOLATION",
            SemanticErrorKind::TypeNotValue => "SemanticError::TYPE_NOT_VALUE",
            SemanticErrorKind::PackageNotType => "SemanticError::PACKAGE_NOT_TYPE",
            SemanticErrorKind::FieldNotMethod => "SemanticError::FIELD_NOT_METHOD",
            SemanticErrorKind::MethodNotField => "SemanticError::METHOD_NOT_FIELD",
            SemanticErrorKind::IncompatibleTypes => "SemanticError::INCOMPATIBLE_TYPES",
            SemanticErrorKind::InvalidCast => "SemanticError::INVALID_CAST",
            SemanticErrorKind::TypeNotReference => "SemanticError::TYPE_NOT_REFERENCE",
            SemanticErrorKind::TypeNotIntegral => "SemanticError::TYPE_NOT_INTEGRAL",
            SemanticErrorKind::TypeNotBoolean => "SemanticError::TYPE_NOT_BOOLEAN",
            SemanticErrorKind::TypeNotNumeric => "SemanticError::TYPE_NOT_NUMERIC",
            SemanticErrorKind::TypeIsVoid => "SemanticError::TYPE_IS_VOID",
            SemanticErrorKind::InvalidInstanceof => "SemanticError::INVALID_INSTANCEOF",
            SemanticErrorKind::AbstractSuperCall => "SemanticError::ABSTRACT_SUPER_CALL",
            SemanticErrorKind::ConstantOverflow => "SemanticError::CONSTANT_OVERFLOW",
            SemanticErrorKind::InvalidNarrowing => "SemanticError::INVALID_NARROWING",
            SemanticErrorKind::NegativeArraySize => "SemanticError::NEGATIVE_ARRAY_SIZE",
            SemanticErrorKind::ZeroDivide => "SemanticError::ZERO_DIVIDE",
            SemanticErrorKind::ShiftCountOutOfRange => "SemanticError::SHIFT_COUNT_OUT_OF_RANGE",
            SemanticErrorKind::UncheckedConversion => "SemanticError::UNCHECKED_CONVERSION",
            SemanticErrorKind::UncheckedCast => "SemanticError::UNCHECKED_CAST",
            SemanticErrorKind::InstanceofParameterizedType => {
                "SemanticError::INSTANCEOF_PARAMETERIZED_TYPE"
            }
            SemanticErrorKind::ExplicitTypeArgumentsNotSupported => {
                "SemanticError::EXPLICIT_TYPE_ARGUMENTS_NOT_SUPPORTED"
            }
            SemanticErrorKind::ForwardReference => "SemanticError::FORWARD_REFERENCE",
            SemanticErrorKind::CircularInitializer => "SemanticError::CIRCULAR_INITIALIZER",
            SemanticErrorKind::InstanceInStaticRegion => "SemanticError::INSTANCE_IN_STATIC_REGION",
            SemanticErrorKind::InstanceInExplicitCtorCall => {
                "SemanticError::INSTANCE_IN_EXPLICIT_CTOR_CALL"
            }
            SemanticErrorKind::SelfInExplicitCtorCall => "SemanticError::SELF_IN_EXPLICIT_CTOR_CALL",
            SemanticErrorKind::EnclosingInstanceNotAccessible => {
                "SemanticError::ENCLOSING_INSTANCE_NOT_ACCESSIBLE"
            }
            SemanticErrorKind::NonFinalLocalCaptured => "SemanticError::NON_FINAL_LOCAL_CAPTURED",
            SemanticErrorKind::SuperOfObject => "SemanticError::SUPER_OF_OBJECT",
            SemanticErrorKind::InheritanceScopeConflict => {
                "SemanticError::INHERITANCE_SCOPE_CONFLICT"
            }
            SemanticErrorKind::Deprecated => "SemanticError::DEPRECATED",
            SemanticErrorKind::SyntheticAccess => "SemanticError::SYNTHETIC_ACCESS",
            SemanticErrorKind::StaticViaInstance => "SemanticError::STATIC_VIA_INSTANCE",
            SemanticErrorKind::UncaughtException => "SemanticError::UNCAUGHT_EXCEPTION",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            SemanticErrorKind::ZeroDivide
            | SemanticErrorKind::ConstantOverflow
            | SemanticErrorKind::ShiftCountOutOfRange
            | SemanticErrorKind::UncheckedConversion
            | SemanticErrorKind::UncheckedCast
            | SemanticErrorKind::Deprecated
            | SemanticErrorKind::SyntheticAccess
            | SemanticErrorKind::StaticViaInstance
            | SemanticErrorKind::InheritanceScopeConflict => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
