//! Overload resolution (JLS 15.12.2).
//!
//! Three phases: subtyping only, then boxing/unboxing, then varargs. Each
//! phase keeps a maximally-specific set; a later phase is consulted only
//! when the earlier one found nothing, and a surviving set larger than one
//! is an ambiguity. The declaring-type test is deliberately absent from the
//! specificity comparison (the Sun 4761586 clarification).

use std::collections::HashMap;

use javelin_core::{ClassId, FieldId, MethodId, TypeParamId};

use crate::convert::{
    method_invocation_conversion, strict_invocation_conversion, Conversion, TypeWarning,
};
use crate::store::{MethodDef, TypeStore};
use crate::substitute::{infer_type_arguments, member_type_in, substitute};
use crate::subtype::is_subtype;
use crate::ty::Type;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CallKind {
    Static,
    Instance,
}

#[derive(Debug, Clone)]
pub struct MethodCall<'a> {
    pub receiver: Type,
    pub call_kind: CallKind,
    pub name: &'a str,
    pub args: Vec<Type>,
    pub explicit_type_args: Vec<Type>,
}

/// How a varargs invocation binds its trailing arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarargsShape {
    pub element: Type,
    /// Number of trailing actuals wrapped into the synthesised array;
    /// `None` when an assignment-compatible array was passed through.
    pub wrapped: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    pub method: MethodId,
    pub owner: ClassId,
    pub name: String,
    pub is_static: bool,
    /// Formal parameter types after receiver substitution and inference.
    pub params: Vec<Type>,
    /// Return type after receiver substitution and inference; may be
    /// parameterised — the erasure is the expression's static symbol.
    pub return_type: Type,
    /// Inferred bindings of the method's own type parameters.
    pub inferred: HashMap<TypeParamId, Type>,
    /// Conversion per argument, aligned with the call's argument list.
    pub conversions: Vec<Conversion>,
    pub varargs: Option<VarargsShape>,
    pub phase: u8,
    pub warnings: Vec<TypeWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateFailureReason {
    WrongArity { expected: usize, found: usize },
    ArgumentConversion { arg_index: usize, from: Type, to: Type },
    StaticMismatch,
}

#[derive(Debug, Clone)]
pub struct CandidateFailure {
    pub method: MethodId,
    pub reason: CandidateFailureReason,
}

#[derive(Debug, Clone, Default)]
pub struct NotFound {
    pub name: String,
    pub candidates: Vec<CandidateFailure>,
}

#[derive(Debug, Clone)]
pub enum MethodResolution {
    Found(Box<ResolvedMethod>),
    Ambiguous(Vec<MethodId>),
    NotFound(NotFound),
}

#[derive(Debug, Clone)]
pub struct ResolvedField {
    /// `None` for the `length` member of an array type.
    pub field: Option<FieldId>,
    pub ty: Type,
    pub declared_in: Option<ClassId>,
}

#[derive(Debug, Clone)]
pub enum FieldResolution {
    Found(ResolvedField),
    Ambiguous(Vec<FieldId>),
    NotFound,
}

struct Candidate {
    method: MethodId,
    owner: ClassId,
    /// Formals after receiver substitution and (for generic methods)
    /// inference.
    formals: Vec<Type>,
    return_type: Type,
    inferred: HashMap<TypeParamId, Type>,
    is_static: bool,
    is_varargs: bool,
}

struct Applicable {
    candidate: usize,
    conversions: Vec<Conversion>,
    varargs: Option<VarargsShape>,
}

pub fn resolve_method_call(store: &mut TypeStore, call: &MethodCall<'_>) -> MethodResolution {
    let receiver_erasure = call.receiver.erasure(store);
    let class_id = match &receiver_erasure {
        Type::Class(c) => c.id,
        Type::Array(_) => {
            // Arrays answer `clone()` with their own type and otherwise
            // behave like Object.
            if call.name == "clone" && call.args.is_empty() {
                return resolve_array_clone(store, &call.receiver);
            }
            store.well_known().object
        }
        _ => {
            return MethodResolution::NotFound(NotFound {
                name: call.name.to_string(),
                candidates: Vec::new(),
            })
        }
    };

    let tables = store.expanded_tables(class_id);
    let shadows = tables.overloads(call.name);
    let mut failures = Vec::new();
    let mut candidates = Vec::new();
    for shadow in shadows {
        match make_candidate(store, call, shadow.method) {
            Ok(candidate) => candidates.push(candidate),
            Err(failure) => failures.push(failure),
        }
    }

    finish_resolution(store, call.name, &call.args, call.call_kind, candidates, failures, 3)
}

/// Constructor resolution: the same search over the type's own `<init>`
/// overloads, but only the first two phases apply at this layer.
pub fn resolve_constructor_call(
    store: &mut TypeStore,
    class_type: &Type,
    args: &[Type],
) -> MethodResolution {
    let Some(class_id) = class_type.erasure(store).class_id() else {
        return MethodResolution::NotFound(NotFound { name: "<init>".into(), candidates: vec![] });
    };
    let Some(def) = store.def(class_id) else {
        return MethodResolution::NotFound(NotFound { name: "<init>".into(), candidates: vec![] });
    };

    let ctor_count = def.constructors.len();
    let call = MethodCall {
        receiver: class_type.clone(),
        call_kind: CallKind::Instance,
        name: "<init>",
        args: args.to_vec(),
        explicit_type_args: Vec::new(),
    };

    let mut candidates = Vec::new();
    let mut failures = Vec::new();
    for index in 0..ctor_count {
        let id = MethodId::constructor(class_id, index as u32);
        if store.method(id).map(|m| m.flags.is_synthetic()).unwrap_or(true) {
            continue;
        }
        match make_candidate(store, &call, id) {
            Ok(candidate) => candidates.push(candidate),
            Err(failure) => failures.push(failure),
        }
    }

    finish_resolution(store, "<init>", args, CallKind::Instance, candidates, failures, 2)
}

fn make_candidate(
    store: &TypeStore,
    call: &MethodCall<'_>,
    id: MethodId,
) -> Result<Candidate, CandidateFailure> {
    let method = store.method(id).ok_or(CandidateFailure {
        method: id,
        reason: CandidateFailureReason::WrongArity { expected: 0, found: call.args.len() },
    })?;

    if call.call_kind == CallKind::Static && !method.is_static() {
        return Err(CandidateFailure { method: id, reason: CandidateFailureReason::StaticMismatch });
    }

    // Rewrite formals and return through the receiver's instantiation of
    // the declaring type. Constructors skip the synthetic call-convention
    // parameters (`this$0`, captured `val$` shadows, placeholder bases):
    // the emitter supplies those, not the source-level argument list.
    let mut formals: Vec<Type> = method
        .params
        .iter()
        .filter(|p| !(id.is_constructor && is_synthetic_ctor_param(&p.name)))
        .map(|p| member_type_in(store, &call.receiver, id.class, &p.ty))
        .collect();
    let mut return_type = member_type_in(store, &call.receiver, id.class, &method.return_type);

    // Generic method: bind its own type parameters, explicitly or by
    // inference from the arguments.
    let mut inferred = HashMap::new();
    if !method.type_params.is_empty() {
        if !call.explicit_type_args.is_empty() {
            for (param, arg) in method.type_params.iter().zip(&call.explicit_type_args) {
                inferred.insert(*param, arg.clone());
            }
        } else {
            inferred = infer_type_arguments(store, &method.type_params, &formals, &call.args);
        }

        let (params_vec, args_vec) = bindings_as_substitution(store, method, &inferred);
        formals = formals.iter().map(|f| substitute(f, &params_vec, &args_vec)).collect();
        return_type = substitute(&return_type, &params_vec, &args_vec);
    }

    Ok(Candidate {
        method: id,
        owner: id.class,
        formals,
        return_type,
        inferred,
        is_static: method.is_static(),
        is_varargs: method.is_varargs(),
    })
}

/// Turn a binding map into parallel vectors for [`substitute`], erasing any
/// parameter inference left unbound.
fn bindings_as_substitution(
    store: &TypeStore,
    method: &MethodDef,
    inferred: &HashMap<TypeParamId, Type>,
) -> (Vec<TypeParamId>, Vec<Type>) {
    let mut params_vec = Vec::with_capacity(method.type_params.len());
    let mut args_vec = Vec::with_capacity(method.type_params.len());
    for &param in &method.type_params {
        params_vec.push(param);
        match inferred.get(&param) {
            Some(bound) => args_vec.push(bound.clone()),
            None => args_vec.push(Type::TypeVar(param).erasure(store)),
        }
    }
    (params_vec, args_vec)
}

fn finish_resolution(
    store: &mut TypeStore,
    name: &str,
    args: &[Type],
    call_kind: CallKind,
    candidates: Vec<Candidate>,
    mut failures: Vec<CandidateFailure>,
    max_phase: u8,
) -> MethodResolution {
    for phase in 1..=max_phase {
        let mut maximal: Vec<Applicable> = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let applicable = match applicability(store, candidate, args, phase) {
                Ok(applicable) => applicable,
                Err(Some(failure)) => {
                    // Record once per candidate: strict-phase failures, plus
                    // the varargs-specific ones surfaced only in phase 3.
                    if phase == 1 || phase == 3 {
                        failures.push(failure);
                    }
                    continue;
                }
                Err(None) => continue,
            };
            let applicable = Applicable { candidate: index, ..applicable };

            // Maximally-specific set maintenance: if the newcomer beats
            // every member, it replaces the set; if no member beats it, it
            // joins the set.
            if maximal
                .iter()
                .all(|held| more_specific(store, &candidates[index], &candidates[held.candidate]))
                && !maximal.is_empty()
            {
                maximal.clear();
                maximal.push(applicable);
            } else if maximal
                .iter()
                .all(|held| !more_specific(store, &candidates[held.candidate], &candidates[index]))
            {
                maximal.push(applicable);
            }
        }

        if maximal.len() > 1 {
            // Identical erased signatures inherited along several interface
            // paths are not a user-visible ambiguity; all others are.
            let ids: Vec<MethodId> = maximal.iter().map(|a| candidates[a.candidate].method).collect();
            return MethodResolution::Ambiguous(ids);
        }
        if let Some(chosen) = maximal.pop() {
            let candidate = &candidates[chosen.candidate];
            let mut warnings = Vec::new();
            if call_kind == CallKind::Instance && candidate.is_static && name != "<init>" {
                warnings.push(TypeWarning::StaticAccessViaInstance);
            }
            for conversion in &chosen.conversions {
                warnings.extend(conversion.warnings.iter().copied());
            }
            return MethodResolution::Found(Box::new(ResolvedMethod {
                method: candidate.method,
                owner: candidate.owner,
                name: name.to_string(),
                is_static: candidate.is_static,
                params: candidate.formals.clone(),
                return_type: candidate.return_type.clone(),
                inferred: candidate.inferred.clone(),
                conversions: chosen.conversions,
                varargs: chosen.varargs,
                phase,
                warnings,
            }));
        }
    }

    MethodResolution::NotFound(NotFound { name: name.to_string(), candidates: failures })
}

/// Applicability of one candidate in one phase. `Err(Some(..))` carries a
/// reportable failure; `Err(None)` means "wrong phase, stay quiet".
fn applicability(
    store: &TypeStore,
    candidate: &Candidate,
    args: &[Type],
    phase: u8,
) -> Result<Applicable, Option<CandidateFailure>> {
    let formals = &candidate.formals;

    if phase < 3 {
        if formals.len() != args.len() {
            return Err(Some(CandidateFailure {
                method: candidate.method,
                reason: CandidateFailureReason::WrongArity {
                    expected: formals.len(),
                    found: args.len(),
                },
            }));
        }
        let mut conversions = Vec::with_capacity(args.len());
        for (index, (arg, formal)) in args.iter().zip(formals).enumerate() {
            let conversion = if phase == 1 {
                strict_invocation_conversion(store, arg, formal)
            } else {
                method_invocation_conversion(store, arg, formal)
            };
            match conversion {
                Some(conversion) => conversions.push(conversion),
                None => {
                    return Err(Some(CandidateFailure {
                        method: candidate.method,
                        reason: CandidateFailureReason::ArgumentConversion {
                            arg_index: index,
                            from: arg.clone(),
                            to: formal.clone(),
                        },
                    }))
                }
            }
        }
        return Ok(Applicable { candidate: 0, conversions, varargs: None });
    }

    // Phase 3: varargs. Applicability by arity is `args >= formals - 1`.
    if !candidate.is_varargs || formals.is_empty() {
        return Err(None);
    }
    if args.len() + 1 < formals.len() {
        return Err(Some(CandidateFailure {
            method: candidate.method,
            reason: CandidateFailureReason::WrongArity {
                expected: formals.len() - 1,
                found: args.len(),
            },
        }));
    }

    let fixed = formals.len() - 1;
    let last = &formals[fixed];
    let mut conversions = Vec::with_capacity(args.len());
    for (index, (arg, formal)) in args.iter().zip(&formals[..fixed]).enumerate() {
        match method_invocation_conversion(store, arg, formal) {
            Some(conversion) => conversions.push(conversion),
            None => {
                return Err(Some(CandidateFailure {
                    method: candidate.method,
                    reason: CandidateFailureReason::ArgumentConversion {
                        arg_index: index,
                        from: arg.clone(),
                        to: formal.clone(),
                    },
                }))
            }
        }
    }

    // An exact-arity call whose last argument already is a compatible array
    // passes the array through unchanged.
    if args.len() == formals.len() {
        if let Some(conversion) = method_invocation_conversion(store, &args[fixed], last) {
            conversions.push(conversion);
            return Ok(Applicable {
                candidate: 0,
                conversions,
                varargs: Some(VarargsShape {
                    element: element_of(last),
                    wrapped: None,
                }),
            });
        }
    }

    let element = element_of(last);
    for (offset, arg) in args[fixed..].iter().enumerate() {
        match method_invocation_conversion(store, arg, &element) {
            Some(conversion) => conversions.push(conversion),
            None => {
                return Err(Some(CandidateFailure {
                    method: candidate.method,
                    reason: CandidateFailureReason::ArgumentConversion {
                        arg_index: fixed + offset,
                        from: arg.clone(),
                        to: element.clone(),
                    },
                }))
            }
        }
    }
    Ok(Applicable {
        candidate: 0,
        conversions,
        varargs: Some(VarargsShape { element, wrapped: Some(args.len() - fixed) }),
    })
}

fn is_synthetic_ctor_param(name: &str) -> bool {
    name == "this$0" || name == "$base" || name.starts_with("val$")
}

fn element_of(array: &Type) -> Type {
    match array {
        Type::Array(component) => (**component).clone(),
        other => other.clone(),
    }
}

/// `a` is more specific than `b`: every formal of `a` converts to the
/// corresponding formal of `b` by subtyping alone.
fn more_specific(store: &TypeStore, a: &Candidate, b: &Candidate) -> bool {
    if a.formals.len() != b.formals.len() {
        // Mixed fixed/varargs arities only meet in phase 3; compare what
        // aligns and let the element types settle the rest.
        return false;
    }
    a.formals
        .iter()
        .zip(&b.formals)
        .all(|(fa, fb)| strict_invocation_conversion(store, fa, fb).is_some())
        && a.formals != b.formals
}

fn resolve_array_clone(store: &mut TypeStore, receiver: &Type) -> MethodResolution {
    let object = store.well_known().object;
    let tables = store.expanded_tables(object);
    let clone_id = tables.overloads("clone").first().map(|s| s.method);
    match clone_id {
        Some(method) => MethodResolution::Found(Box::new(ResolvedMethod {
            method,
            owner: object,
            name: "clone".to_string(),
            is_static: false,
            params: Vec::new(),
            // `array.clone()` returns the array's own type, not Object.
            return_type: receiver.clone(),
            inferred: HashMap::new(),
            conversions: Vec::new(),
            varargs: None,
            phase: 1,
            warnings: Vec::new(),
        })),
        None => MethodResolution::NotFound(NotFound { name: "clone".into(), candidates: vec![] }),
    }
}

/// Field lookup through the expanded table, with inherited-generic
/// substitution on the declared (not erased) field type.
pub fn resolve_field(store: &mut TypeStore, receiver: &Type, name: &str) -> FieldResolution {
    let receiver_erasure = receiver.erasure(store);
    let class_id = match &receiver_erasure {
        Type::Class(c) => c.id,
        Type::Array(_) => {
            if name == "length" {
                return FieldResolution::Found(ResolvedField {
                    field: None,
                    ty: Type::Primitive(crate::ty::PrimitiveType::Int),
                    declared_in: None,
                });
            }
            store.well_known().object
        }
        _ => return FieldResolution::NotFound,
    };

    let tables = store.expanded_tables(class_id);
    let Some(shadow) = tables.field(name) else {
        return FieldResolution::NotFound;
    };

    // A conflict whose declaring type is a supertype of the preferred's is
    // ordinary hiding; one declared in an unrelated supertype makes the
    // reference ambiguous.
    let preferred_owner = shadow.field.class;
    let mut ambiguous = vec![shadow.field];
    for conflict in &shadow.conflicts {
        let owner = conflict.class;
        let hidden = is_subtype(
            store,
            &Type::class(preferred_owner, vec![]),
            &Type::class(owner, vec![]),
        );
        if !hidden {
            ambiguous.push(*conflict);
        }
    }
    if ambiguous.len() > 1 {
        return FieldResolution::Ambiguous(ambiguous);
    }

    let Some(field) = store.field(shadow.field) else {
        return FieldResolution::NotFound;
    };
    let ty = member_type_in(store, receiver, shadow.field.class, &field.ty);
    FieldResolution::Found(ResolvedField {
        field: Some(shadow.field),
        ty,
        declared_in: Some(shadow.field.class),
    })
}

/// Resolve a nested type member through the expanded type table.
pub fn resolve_nested_type(store: &mut TypeStore, receiver: ClassId, name: &str) -> Option<ClassId> {
    let tables = store.expanded_tables(receiver);
    tables.nested_type(name).map(|shadow| shadow.class)
}
