//! Subtyping, assignability and least upper bounds.

use javelin_core::ClassId;

use crate::convert::assignment_conversion;
use crate::store::TypeStore;
use crate::substitute::instantiate_supertype;
use crate::ty::{ClassType, PrimitiveType, Type, WildcardBound};

/// Widening primitive conversion (JLS 5.1.2), which is also the primitive
/// slice of the subtype relation used by phase-1 overload resolution.
pub fn widens_primitive(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to {
        return true;
    }
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short => matches!(to, Int | Long | Float | Double),
        Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        _ => false,
    }
}

/// `sub <: sup`, including widening primitive conversion and the null type.
///
/// `Error` is a subtype and a supertype of everything: recovery must never
/// fail twice. A raw use of a generic class converts to any instantiation
/// here; the unchecked warning belongs to the conversion layer.
pub fn is_subtype(store: &TypeStore, sub: &Type, sup: &Type) -> bool {
    match (sub, sup) {
        (Type::Error, _) | (_, Type::Error) => true,
        (Type::Void, Type::Void) => true,
        (Type::Null, other) => other.is_reference(),
        (Type::Primitive(a), Type::Primitive(b)) => widens_primitive(*a, *b),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::TypeVar(a), Type::TypeVar(b)) if a == b => true,
        (Type::TypeVar(id), sup) => match store.type_param(*id) {
            Some(def) => {
                def.bounds.iter().any(|bound| is_subtype(store, bound, sup))
                    || matches!(sup.as_class(), Some(c) if c.id == store.well_known().object)
            }
            None => false,
        },
        (_, Type::TypeVar(_)) => false,
        (Type::Array(a), Type::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (Type::Primitive(pa), Type::Primitive(pb)) => pa == pb,
            (elem_a, elem_b) => {
                elem_a.is_reference() && elem_b.is_reference() && is_subtype(store, elem_a, elem_b)
            }
        },
        (Type::Array(_), Type::Class(c)) => {
            let wk = store.well_known();
            c.id == wk.object || c.id == wk.cloneable || c.id == wk.serializable
        }
        (Type::Class(_), Type::Array(_)) => false,
        (Type::Class(sub_c), Type::Class(sup_c)) => class_subtype(store, sub_c, sup_c),
        _ => false,
    }
}

fn class_subtype(store: &TypeStore, sub: &ClassType, sup: &ClassType) -> bool {
    if sub.id == sup.id {
        return args_compatible(store, &sub.args, &sup.args);
    }
    match instantiate_supertype(store, &Type::Class(sub.clone()), sup.id) {
        Some(args) => args_compatible(store, &args, &sup.args),
        None => {
            // An undefined (never-loaded) class behaves as `bad`: accept.
            !store.is_defined(sub.id) || !store.is_defined(sup.id)
        }
    }
}

fn args_compatible(store: &TypeStore, have: &[Type], want: &[Type]) -> bool {
    // Raw on either side is compatible here; the conversion layer warns.
    if have.is_empty() || want.is_empty() {
        return true;
    }
    if have.len() != want.len() {
        return false;
    }
    have.iter().zip(want).all(|(h, w)| argument_contains(store, w, h))
}

/// JLS 4.5.1 containment: does type argument `outer` contain `inner`?
fn argument_contains(store: &TypeStore, outer: &Type, inner: &Type) -> bool {
    match outer {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(bound)) => match inner {
            Type::Wildcard(WildcardBound::Extends(inner_bound)) => {
                is_subtype(store, inner_bound, bound)
            }
            Type::Wildcard(_) => false,
            other => is_subtype(store, other, bound),
        },
        Type::Wildcard(WildcardBound::Super(bound)) => match inner {
            Type::Wildcard(WildcardBound::Super(inner_bound)) => {
                is_subtype(store, bound, inner_bound)
            }
            Type::Wildcard(_) => false,
            other => is_subtype(store, bound, other),
        },
        _ => outer == inner || inner.is_error(),
    }
}

pub fn is_assignable(store: &TypeStore, from: &Type, to: &Type) -> bool {
    assignment_conversion(store, from, to).is_some()
}

/// The nearest common superclass, walking only the class chain. Interfaces
/// are deliberately ignored, matching the conditional-expression behaviour
/// of the reference implementation.
pub fn common_superclass(store: &TypeStore, a: ClassId, b: ClassId) -> ClassId {
    let a_chain = superclass_chain(store, a);
    let mut cursor = Some(b);
    while let Some(id) = cursor {
        if a_chain.contains(&id) {
            return id;
        }
        cursor = store
            .def(id)
            .and_then(|def| def.super_class.as_ref())
            .and_then(Type::class_id);
    }
    store.well_known().object
}

fn superclass_chain(store: &TypeStore, id: ClassId) -> Vec<ClassId> {
    let mut chain = vec![id];
    let mut cursor = id;
    while let Some(super_id) = store
        .def(cursor)
        .and_then(|def| def.super_class.as_ref())
        .and_then(Type::class_id)
    {
        chain.push(super_id);
        cursor = super_id;
    }
    chain
}

/// A modest least upper bound: exact where both sides share a direction,
/// common superclass otherwise. Used by conditional expressions and method
/// type inference.
pub fn lub(store: &TypeStore, a: &Type, b: &Type) -> Type {
    if a == b {
        return a.clone();
    }
    match (a, b) {
        (Type::Error, _) | (_, Type::Error) => Type::Error,
        (Type::Null, other) | (other, Type::Null) if other.is_reference() => other.clone(),
        (Type::Primitive(pa), Type::Primitive(pb)) => {
            if widens_primitive(*pa, *pb) {
                Type::Primitive(*pb)
            } else if widens_primitive(*pb, *pa) {
                Type::Primitive(*pa)
            } else {
                Type::Error
            }
        }
        (Type::Array(ea), Type::Array(eb)) if ea.is_reference() && eb.is_reference() => {
            Type::array(lub(store, ea, eb))
        }
        _ => {
            if is_subtype(store, a, b) {
                b.clone()
            } else if is_subtype(store, b, a) {
                a.clone()
            } else {
                let (Some(ca), Some(cb)) = (erased_id(store, a), erased_id(store, b)) else {
                    return Type::class(store.well_known().object, vec![]);
                };
                Type::class(common_superclass(store, ca, cb), vec![])
            }
        }
    }
}

fn erased_id(store: &TypeStore, ty: &Type) -> Option<ClassId> {
    ty.erasure(store).class_id().or(Some(store.well_known().object))
}
