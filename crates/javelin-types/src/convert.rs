//! JLS 5 conversions and numeric promotion.
//!
//! Every conversion result lists the steps a bytecode emitter must
//! materialise, plus the unchecked warnings the language level demands.

use crate::const_value::{fits_in_primitive, ConstValue};
use crate::store::TypeStore;
use crate::subtype::{is_subtype, widens_primitive};
use crate::ty::{PrimitiveType, Type};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConversionStep {
    WideningPrimitive,
    NarrowingPrimitive,
    Boxing,
    Unboxing,
    WideningReference,
    NarrowingReference,
    StringConversion,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UncheckedReason {
    RawConversion,
    UncheckedCast,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TypeWarning {
    Unchecked(UncheckedReason),
    StaticAccessViaInstance,
    Deprecated,
}

/// A successful conversion: the identity conversion is an empty step list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    pub steps: Vec<ConversionStep>,
    pub warnings: Vec<TypeWarning>,
}

impl Conversion {
    pub fn identity() -> Self {
        Self::default()
    }

    fn step(step: ConversionStep) -> Self {
        Self { steps: vec![step], warnings: Vec::new() }
    }

    fn steps(steps: Vec<ConversionStep>) -> Self {
        Self { steps, warnings: Vec::new() }
    }

    fn with_warning(mut self, warning: TypeWarning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Unary numeric promotion (JLS 5.6.1) over an already-unboxed operand.
/// `None` means the operand is not numeric.
pub fn unary_numeric_promotion(operand: PrimitiveType) -> Option<PrimitiveType> {
    match operand {
        PrimitiveType::Boolean => None,
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => {
            Some(PrimitiveType::Int)
        }
        other => Some(other),
    }
}

/// Binary numeric promotion (JLS 5.6.2): both operands to the wider of
/// double/float/long, else int.
pub fn binary_numeric_promotion(
    left: PrimitiveType,
    right: PrimitiveType,
) -> Option<PrimitiveType> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    use PrimitiveType::*;
    Some(if left == Double || right == Double {
        Double
    } else if left == Float || right == Float {
        Float
    } else if left == Long || right == Long {
        Long
    } else {
        Int
    })
}

pub fn boxed_class(store: &TypeStore, primitive: PrimitiveType) -> Type {
    Type::class(store.wrapper_of(primitive), vec![])
}

pub fn unboxed_primitive(store: &TypeStore, ty: &Type) -> Option<PrimitiveType> {
    store.primitive_of(ty.class_id()?)
}

fn raw_mismatch(store: &TypeStore, from: &Type, to: &Type) -> bool {
    let (Some(from_c), Some(to_c)) = (from.as_class(), to.as_class()) else {
        return false;
    };
    if from_c.args.is_empty() == to_c.args.is_empty() {
        return false;
    }
    let generic = |id| store.def(id).map(|d| d.is_generic()).unwrap_or(false);
    generic(from_c.id) && generic(to_c.id)
}

/// Phase-1 method invocation conversion: subtyping only, no boxing.
pub fn strict_invocation_conversion(
    store: &TypeStore,
    from: &Type,
    to: &Type,
) -> Option<Conversion> {
    if from.is_error() || to.is_error() {
        return Some(Conversion::identity());
    }
    if from == to {
        return Some(Conversion::identity());
    }
    match (from, to) {
        (Type::Primitive(a), Type::Primitive(b)) if widens_primitive(*a, *b) => {
            Some(Conversion::step(ConversionStep::WideningPrimitive))
        }
        (Type::Null, to) if to.is_reference() => Some(Conversion::identity()),
        (from, to) if from.is_reference() && to.is_reference() => {
            if is_subtype(store, from, to) {
                let mut conv = Conversion::step(ConversionStep::WideningReference);
                if raw_mismatch(store, from, to) {
                    conv = conv.with_warning(TypeWarning::Unchecked(UncheckedReason::RawConversion));
                }
                Some(conv)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Phase-2 (loose) method invocation conversion: phase 1 plus boxing,
/// unboxing, widening-after-boxing and boxing-after-widening.
pub fn method_invocation_conversion(
    store: &TypeStore,
    from: &Type,
    to: &Type,
) -> Option<Conversion> {
    if let Some(conv) = strict_invocation_conversion(store, from, to) {
        return Some(conv);
    }
    match (from, to) {
        // Boxing, possibly followed by reference widening:
        // int -> Integer, int -> Object, int -> Number.
        (Type::Primitive(p), to) if to.is_reference() => {
            let boxed = boxed_class(store, *p);
            if &boxed == to {
                return Some(Conversion::step(ConversionStep::Boxing));
            }
            if is_subtype(store, &boxed, to) {
                return Some(Conversion::steps(vec![
                    ConversionStep::Boxing,
                    ConversionStep::WideningReference,
                ]));
            }
            // Widening then boxing: int -> Long is *not* allowed by the
            // JLS; the reference implementation accepts it for wrappers of
            // strictly wider primitives, and we preserve that behaviour.
            if let Some(target_prim) = unboxed_primitive(store, to) {
                if widens_primitive(*p, target_prim) {
                    return Some(Conversion::steps(vec![
                        ConversionStep::WideningPrimitive,
                        ConversionStep::Boxing,
                    ]));
                }
            }
            None
        }
        // Unboxing, possibly followed by primitive widening:
        // Integer -> int, Integer -> long.
        (from, Type::Primitive(target)) if from.is_reference() => {
            let source = unboxed_primitive(store, from)?;
            if source == *target {
                Some(Conversion::step(ConversionStep::Unboxing))
            } else if widens_primitive(source, *target) {
                Some(Conversion::steps(vec![
                    ConversionStep::Unboxing,
                    ConversionStep::WideningPrimitive,
                ]))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Assignment conversion (JLS 5.2): loose invocation conversion without the
/// constant-narrowing allowance.
pub fn assignment_conversion(store: &TypeStore, from: &Type, to: &Type) -> Option<Conversion> {
    method_invocation_conversion(store, from, to)
}

/// Assignment conversion with the constant-expression narrowing rule: a
/// constant `int` (or narrower) expression assigns to `byte`/`short`/`char`
/// when the value fits.
pub fn assignment_conversion_with_const(
    store: &TypeStore,
    from: &Type,
    to: &Type,
    constant: Option<&ConstValue>,
) -> Option<Conversion> {
    if let Some(conv) = assignment_conversion(store, from, to) {
        return Some(conv);
    }
    let (Some(from_p), Some(to_p)) = (from.as_primitive(), to.as_primitive()) else {
        return None;
    };
    if !matches!(
        to_p,
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char
    ) || !from_p.is_integral()
        || from_p == PrimitiveType::Long
    {
        return None;
    }
    let value = constant?.as_long()?;
    fits_in_primitive(value, to_p).then(|| Conversion::step(ConversionStep::NarrowingPrimitive))
}

/// Casting conversion (JLS 5.5).
pub fn cast_conversion(store: &TypeStore, from: &Type, to: &Type) -> Option<Conversion> {
    if from.is_error() || to.is_error() {
        return Some(Conversion::identity());
    }
    if from == to {
        return Some(Conversion::identity());
    }

    match (from, to) {
        (Type::Primitive(a), Type::Primitive(b)) => {
            if !a.is_numeric() || !b.is_numeric() {
                return None;
            }
            if widens_primitive(*a, *b) {
                Some(Conversion::step(ConversionStep::WideningPrimitive))
            } else {
                Some(Conversion::step(ConversionStep::NarrowingPrimitive))
            }
        }
        // Boxing/unboxing directions reuse the invocation conversion.
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => {
            method_invocation_conversion(store, from, to)
        }
        (from, to) if from.is_reference() && to.is_reference() => {
            reference_cast(store, from, to)
        }
        _ => None,
    }
}

fn reference_cast(store: &TypeStore, from: &Type, to: &Type) -> Option<Conversion> {
    let mut conv = if is_subtype(store, from, to) {
        Conversion::step(ConversionStep::WideningReference)
    } else if is_subtype(store, to, from) {
        Conversion::step(ConversionStep::NarrowingReference)
    } else {
        match (from, to) {
            (Type::Array(a), Type::Array(b)) => {
                // Covariant element cast for reference elements.
                if a.is_reference() && b.is_reference() {
                    let mut inner = reference_cast(store, a, b)?;
                    inner.warnings.clear();
                    Conversion { steps: inner.steps, warnings: Vec::new() }
                } else {
                    return None;
                }
            }
            (Type::Class(a), Type::Class(b)) => {
                let (Some(da), Some(db)) = (store.def(a.id), store.def(b.id)) else {
                    // A `bad` side converts freely.
                    return Some(Conversion::step(ConversionStep::NarrowingReference));
                };
                match (da.is_interface(), db.is_interface()) {
                    // Unrelated class/interface: allowed unless the class is
                    // final (then it would have had to implement it).
                    (false, true) => {
                        if da.flags.is_final() {
                            return None;
                        }
                        Conversion::step(ConversionStep::NarrowingReference)
                    }
                    (true, false) => {
                        if db.flags.is_final() {
                            return None;
                        }
                        Conversion::step(ConversionStep::NarrowingReference)
                    }
                    // Interface-to-interface: allowed when no method name
                    // they share disagrees on signature.
                    (true, true) => {
                        if interfaces_agree(store, a.id, b.id) {
                            Conversion::step(ConversionStep::NarrowingReference)
                        } else {
                            return None;
                        }
                    }
                    (false, false) => return None,
                }
            }
            _ => return None,
        }
    };

    // Casting *to* a parameterised type cannot be checked at runtime.
    if to.is_parameterized()
        && conv.steps.contains(&ConversionStep::NarrowingReference)
    {
        conv = conv.with_warning(TypeWarning::Unchecked(UncheckedReason::UncheckedCast));
    } else if raw_mismatch(store, from, to) {
        conv = conv.with_warning(TypeWarning::Unchecked(UncheckedReason::RawConversion));
    }
    Some(conv)
}

/// Two unrelated interfaces are cast-compatible unless they declare methods
/// with the same name and erased parameters but different return types.
fn interfaces_agree(store: &TypeStore, a: javelin_core::ClassId, b: javelin_core::ClassId) -> bool {
    let methods_a = collect_interface_methods(store, a);
    let methods_b = collect_interface_methods(store, b);
    for (name_a, params_a, ret_a) in &methods_a {
        for (name_b, params_b, ret_b) in &methods_b {
            if name_a == name_b && params_a == params_b && ret_a != ret_b {
                return false;
            }
        }
    }
    true
}

fn collect_interface_methods(
    store: &TypeStore,
    id: javelin_core::ClassId,
) -> Vec<(String, Vec<Type>, Type)> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    let mut seen = Vec::new();
    while let Some(current) = stack.pop() {
        if seen.contains(&current) {
            continue;
        }
        seen.push(current);
        let Some(def) = store.def(current) else {
            continue;
        };
        for method in &def.methods {
            out.push((
                method.name.clone(),
                method.params.iter().map(|p| p.ty.erasure(store)).collect(),
                method.return_type.erasure(store),
            ));
        }
        stack.extend(def.interfaces.iter().filter_map(Type::class_id));
    }
    out
}
