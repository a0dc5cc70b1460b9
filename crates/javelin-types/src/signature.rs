//! Descriptor and generic-`Signature` synthesis.
//!
//! The strings produced here must bit-match the JVMS `FieldDescriptor`,
//! `MethodDescriptor` and `Signature` grammars: the class-file side parses
//! them back verbatim, and the round-trip is a tested invariant.

use javelin_core::ClassId;

use crate::store::{MethodDef, TypeStore};
use crate::ty::{Type, WildcardBound};

fn internal_name(store: &TypeStore, id: ClassId) -> String {
    store.class_name(id).replace('.', "/")
}

/// Erased `FieldDescriptor` for a type.
pub fn erased_descriptor(store: &TypeStore, ty: &Type) -> String {
    let mut out = String::new();
    push_descriptor(store, ty, &mut out);
    out
}

fn push_descriptor(store: &TypeStore, ty: &Type, out: &mut String) {
    match ty.erasure(store) {
        Type::Primitive(p) => out.push(p.descriptor_char()),
        Type::Void => out.push('V'),
        Type::Array(component) => {
            out.push('[');
            push_descriptor(store, &component, out);
        }
        Type::Class(c) => {
            out.push('L');
            out.push_str(&internal_name(store, c.id));
            out.push(';');
        }
        // Error and null have no descriptor of their own; Object is the
        // only sound stand-in after recovery.
        _ => {
            out.push('L');
            out.push_str(&internal_name(store, store.well_known().object));
            out.push(';');
        }
    }
}

/// Erased `MethodDescriptor` for a method or constructor. Constructors are
/// emitted with a `V` return.
pub fn method_descriptor(store: &TypeStore, method: &MethodDef) -> String {
    let mut out = String::from("(");
    for param in &method.params {
        push_descriptor(store, &param.ty, &mut out);
    }
    out.push(')');
    match &method.return_type {
        Type::Void => out.push('V'),
        ty => push_descriptor(store, ty, &mut out),
    }
    out
}

/// Generic type signature for a type position (`TypeSignature` production).
pub fn type_signature(store: &TypeStore, ty: &Type) -> String {
    let mut out = String::new();
    push_type_signature(store, ty, &mut out);
    out
}

fn push_type_signature(store: &TypeStore, ty: &Type, out: &mut String) {
    match ty {
        Type::Primitive(p) => out.push(p.descriptor_char()),
        Type::Void => out.push('V'),
        Type::Array(component) => {
            out.push('[');
            push_type_signature(store, component, out);
        }
        Type::TypeVar(id) => {
            out.push('T');
            match store.type_param(*id) {
                Some(def) => out.push_str(&def.name),
                None => out.push_str("java/lang/Object"),
            }
            out.push(';');
        }
        Type::Wildcard(WildcardBound::Unbounded) => out.push('*'),
        Type::Wildcard(WildcardBound::Extends(bound)) => {
            out.push('+');
            push_type_signature(store, bound, out);
        }
        Type::Wildcard(WildcardBound::Super(bound)) => {
            out.push('-');
            push_type_signature(store, bound, out);
        }
        Type::Class(c) => {
            out.push('L');
            out.push_str(&internal_name(store, c.id));
            if !c.args.is_empty() {
                out.push('<');
                for arg in &c.args {
                    push_type_signature(store, arg, out);
                }
                out.push('>');
            }
            out.push(';');
        }
        Type::Null | Type::Error => {
            out.push('L');
            out.push_str(&internal_name(store, store.well_known().object));
            out.push(';');
        }
    }
}

fn push_type_parameters(
    store: &TypeStore,
    params: &[javelin_core::TypeParamId],
    out: &mut String,
) {
    if params.is_empty() {
        return;
    }
    out.push('<');
    for &param in params {
        let Some(def) = store.type_param(param) else {
            continue;
        };
        out.push_str(&def.name);
        out.push(':');
        let mut bounds = def.bounds.iter();
        match bounds.next() {
            Some(first) => {
                // An interface first bound leaves the class bound empty and
                // moves to the interface-bound list.
                let first_is_interface = first
                    .class_id()
                    .and_then(|id| store.def(id))
                    .map(|def| def.is_interface())
                    .unwrap_or(false);
                if first_is_interface {
                    out.push(':');
                }
                push_type_signature(store, first, out);
            }
            None => {
                out.push('L');
                out.push_str(&internal_name(store, store.well_known().object));
                out.push(';');
            }
        }
        for bound in bounds {
            out.push(':');
            push_type_signature(store, bound, out);
        }
    }
    out.push('>');
}

/// Whether a class needs a `Signature` attribute: it declares type
/// parameters, or its super/interface clause mentions type arguments.
pub fn class_needs_signature(store: &TypeStore, id: ClassId) -> bool {
    let Some(def) = store.def(id) else {
        return false;
    };
    !def.type_params.is_empty()
        || def
            .super_class
            .as_ref()
            .map(|s| s.is_parameterized() || s.mentions_type_var())
            .unwrap_or(false)
        || def
            .interfaces
            .iter()
            .any(|i| i.is_parameterized() || i.mentions_type_var())
}

/// The class `Signature` attribute:
/// `<TypeParams>? SuperclassSignature SuperinterfaceSignature*`.
pub fn class_signature(store: &TypeStore, id: ClassId) -> Option<String> {
    if !class_needs_signature(store, id) {
        return None;
    }
    let def = store.def(id)?;
    let mut out = String::new();
    push_type_parameters(store, &def.type_params, &mut out);
    match &def.super_class {
        Some(super_class) => push_type_signature(store, super_class, &mut out),
        None => {
            push_type_signature(store, &Type::class(store.well_known().object, vec![]), &mut out)
        }
    }
    for iface in &def.interfaces {
        push_type_signature(store, iface, &mut out);
    }
    Some(out)
}

/// Whether a method needs a `Signature` attribute.
pub fn method_needs_signature(method: &MethodDef) -> bool {
    !method.type_params.is_empty()
        || method
            .params
            .iter()
            .any(|p| p.ty.is_parameterized() || p.ty.mentions_type_var())
        || method.return_type.is_parameterized()
        || method.return_type.mentions_type_var()
}

/// The method `Signature` attribute:
/// `<TypeParams>? ( ParamSig* ) ReturnSig ThrowsSig*`.
pub fn method_signature(store: &TypeStore, method: &MethodDef) -> Option<String> {
    if !method_needs_signature(method) {
        return None;
    }
    let mut out = String::new();
    push_type_parameters(store, &method.type_params, &mut out);
    out.push('(');
    for param in &method.params {
        push_type_signature(store, &param.ty, &mut out);
    }
    out.push(')');
    match &method.return_type {
        Type::Void => out.push('V'),
        ty => push_type_signature(store, ty, &mut out),
    }
    Some(out)
}

/// The field `Signature` attribute, present only when the declared type
/// mentions a type variable or type arguments.
pub fn field_signature(store: &TypeStore, ty: &Type) -> Option<String> {
    (ty.is_parameterized() || ty.mentions_type_var()).then(|| type_signature(store, ty))
}

/// The externally visible name of a nested type. Java-compatible
/// generation keeps the `$` separator; 1.5+ emission uses the dash form.
pub fn mangled_nested_name(outer: &str, inner: &str, target_15: bool) -> String {
    let sep = if target_15 { '-' } else { '$' };
    format!("{outer}{sep}{inner}")
}
