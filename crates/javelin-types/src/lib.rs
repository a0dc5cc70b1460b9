//! The Javelin symbol and type model.
//!
//! Classes, interfaces, enums and their members live in a [`TypeStore`]
//! arena keyed by numeric ids; the generic surface of a type is the
//! [`Type`] sum. On top of the model this crate implements the JLS
//! machinery the semantic pass drives: conversions and numeric promotion,
//! subtyping, expanded member tables, generic substitution and method
//! type inference, three-phase overload resolution, and JVM descriptor /
//! `Signature` synthesis.

mod const_value;
mod convert;
mod flags;
mod loader;
mod members;
mod overload;
mod provider;
pub mod signature;
mod store;
mod substitute;
mod subtype;
mod symbol;
mod ty;

pub use const_value::{fits_in_primitive, fold_binary, fold_shift, fold_unary, ArithOp, ConstValue, Folded, ShiftOp, UnaryOp};
pub use convert::{
    assignment_conversion, assignment_conversion_with_const, binary_numeric_promotion,
    boxed_class, cast_conversion, method_invocation_conversion, strict_invocation_conversion,
    unary_numeric_promotion, unboxed_primitive, Conversion, ConversionStep, TypeWarning,
    UncheckedReason,
};
pub use flags::Flags;
pub use loader::resolve_method_throws;
pub use members::{FieldShadow, MemberTables, MethodShadow, TypeShadow};
pub use overload::{
    resolve_constructor_call, resolve_field, resolve_method_call, resolve_nested_type, CallKind,
    CandidateFailure, CandidateFailureReason, FieldResolution, MethodCall, MethodResolution,
    NotFound, ResolvedField, ResolvedMethod, VarargsShape,
};
pub use provider::{ClasspathProvider, PackageProvider, ProviderView, TypeProvider};
pub use store::{
    AccessedMember, ClassDef, ClassKind, FieldDef, MethodDef, ParamDef, ThrowsEntry, TypeParamDef,
    TypeStore, WellKnown,
};
pub use substitute::{infer_type_arguments, instantiate_supertype, member_type_in, substitute};
pub use symbol::Symbol;
pub use subtype::{common_superclass, is_assignable, is_subtype, lub};
pub use ty::{ClassType, PrimitiveType, Type, WildcardBound};

pub use javelin_core::{ClassId, FieldId, MethodId, TypeParamId};
