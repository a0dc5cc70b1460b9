//! Generic substitution: propagating concrete type arguments through the
//! inheritance chain, and inferring method type parameters from arguments.

use std::collections::HashMap;

use javelin_core::{ClassId, TypeParamId};

use crate::store::TypeStore;
use crate::subtype::lub;
use crate::ty::{ClassType, Type, WildcardBound};

/// Replace occurrences of `params[i]` with `args[i]` throughout `ty`.
pub fn substitute(ty: &Type, params: &[TypeParamId], args: &[Type]) -> Type {
    match ty {
        Type::TypeVar(id) => match params.iter().position(|p| p == id) {
            Some(index) => args.get(index).cloned().unwrap_or_else(|| ty.clone()),
            None => ty.clone(),
        },
        Type::Class(c) => Type::class(
            c.id,
            c.args.iter().map(|arg| substitute(arg, params, args)).collect(),
        ),
        Type::Array(component) => Type::array(substitute(component, params, args)),
        Type::Wildcard(WildcardBound::Extends(bound)) => Type::Wildcard(WildcardBound::Extends(
            Box::new(substitute(bound, params, args)),
        )),
        Type::Wildcard(WildcardBound::Super(bound)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(bound, params, args))))
        }
        _ => ty.clone(),
    }
}

/// The type arguments with which `sub` instantiates `target`, walking the
/// super chain (class and interfaces) hop by hop and substituting at each
/// hop.
///
/// Returns `None` when `target` is not a supertype of `sub`, and
/// `Some(vec![])` when it is reached raw (no argument information
/// survives).
pub fn instantiate_supertype(store: &TypeStore, sub: &Type, target: ClassId) -> Option<Vec<Type>> {
    match sub {
        Type::Class(c) => instantiate_from_class(store, c, target, &mut Vec::new()),
        Type::Array(_) => {
            let wk = store.well_known();
            (target == wk.object || target == wk.cloneable || target == wk.serializable)
                .then(Vec::new)
        }
        Type::TypeVar(id) => {
            let def = store.type_param(*id)?;
            // Bounds are tried in order; the first that reaches the target
            // wins, which keeps the answer deterministic.
            def.bounds
                .iter()
                .find_map(|bound| instantiate_supertype(store, bound, target))
        }
        Type::Error => Some(Vec::new()),
        _ => None,
    }
}

fn instantiate_from_class(
    store: &TypeStore,
    sub: &ClassType,
    target: ClassId,
    visited: &mut Vec<ClassId>,
) -> Option<Vec<Type>> {
    if sub.id == target {
        return Some(sub.args.clone());
    }
    if visited.contains(&sub.id) {
        return None;
    }
    visited.push(sub.id);

    let def = store.def(sub.id)?;
    let raw = sub.args.is_empty() && def.is_generic();

    let supers = def
        .super_class
        .iter()
        .chain(def.interfaces.iter())
        .cloned()
        .collect::<Vec<_>>();

    for sup in supers {
        // Substitute this hop's own arguments into its super clause before
        // recursing, so `S extends G<A>` reached via `S` yields `A`.
        let instantiated = if raw {
            sup.erasure(store)
        } else {
            substitute(&sup, &def.type_params, &sub.args)
        };
        if let Type::Class(sup_class) = instantiated {
            if let Some(args) = instantiate_from_class(store, &sup_class, target, visited) {
                return Some(args);
            }
        }
    }
    None
}

/// The type a member declared in `declaring` with declared type `declared`
/// has when accessed through a receiver of static type `receiver`.
///
/// Matching is by type-parameter identity: the member's declared `Type`
/// names its `TypeParamId` directly, so fields whose type parameters share
/// an erasure (`K` and `V` both erasing to `Object`) substitute correctly.
pub fn member_type_in(
    store: &TypeStore,
    receiver: &Type,
    declaring: ClassId,
    declared: &Type,
) -> Type {
    if !declared.mentions_type_var() {
        return declared.clone();
    }
    let Some(def) = store.def(declaring) else {
        return declared.clone();
    };
    if def.type_params.is_empty() {
        // Only method-level type variables remain; they belong to
        // inference, not to receiver substitution.
        return declared.clone();
    }
    match instantiate_supertype(store, receiver, declaring) {
        Some(args) if args.len() == def.type_params.len() => {
            substitute(declared, &def.type_params, &args)
        }
        // Raw receiver (or no instantiation found): the class's own
        // parameters are seen at their erasure; anything else survives.
        _ => {
            let erased: Vec<Type> = def
                .type_params
                .iter()
                .map(|&p| Type::TypeVar(p).erasure(store))
                .collect();
            substitute(declared, &def.type_params, &erased)
        }
    }
}

/// Infer bindings for a generic method's type parameters from the actual
/// argument types (JLS 15.12.2.7, as the reference implementation
/// approximates it).
///
/// Handles the argument shapes that matter in practice: a formal that *is*
/// the type variable, an array formal whose element is the type variable
/// (dimensions are subtracted from the argument), and a parameterised
/// formal reached through the argument's inheritance (an anonymous class
/// implementing `Comparator<String>` binds `T=String` for a
/// `Comparator<T>` formal). Conflicting bindings are widened to their
/// least upper bound.
pub fn infer_type_arguments(
    store: &TypeStore,
    type_params: &[TypeParamId],
    formals: &[Type],
    args: &[Type],
) -> HashMap<TypeParamId, Type> {
    let mut bindings: HashMap<TypeParamId, Type> = HashMap::new();
    for (formal, arg) in formals.iter().zip(args) {
        unify(store, type_params, formal, arg, &mut bindings);
    }
    bindings
}

fn unify(
    store: &TypeStore,
    type_params: &[TypeParamId],
    formal: &Type,
    arg: &Type,
    bindings: &mut HashMap<TypeParamId, Type>,
) {
    if arg.is_error() {
        return;
    }
    match formal {
        Type::TypeVar(id) if type_params.contains(id) => {
            // A primitive argument binds through its wrapper.
            let bound = match arg.as_primitive() {
                Some(p) => Type::class(store.wrapper_of(p), vec![]),
                None if matches!(arg, Type::Null) => return,
                None => arg.clone(),
            };
            match bindings.get(id) {
                Some(existing) if *existing != bound => {
                    let widened = lub(store, existing, &bound);
                    bindings.insert(*id, widened);
                }
                Some(_) => {}
                None => {
                    bindings.insert(*id, bound);
                }
            }
        }
        Type::Array(formal_elem) => {
            if let Type::Array(arg_elem) = arg {
                unify(store, type_params, formal_elem, arg_elem, bindings);
            }
        }
        Type::Class(formal_class) if !formal_class.args.is_empty() => {
            if let Some(arg_args) = instantiate_supertype(store, arg, formal_class.id) {
                if arg_args.len() == formal_class.args.len() {
                    for (f, a) in formal_class.args.iter().zip(&arg_args) {
                        let f = match f {
                            Type::Wildcard(WildcardBound::Extends(b) | WildcardBound::Super(b)) => {
                                b
                            }
                            other => other,
                        };
                        unify(store, type_params, f, a, bindings);
                    }
                }
            }
        }
        _ => {}
    }
}
