//! Expanded member tables.
//!
//! For each class the core materialises, on first need, hash tables of all
//! fields, methods and nested types visible on it — own members and
//! inherited ones. Each name keeps a preferred *shadow* plus the *conflicts*
//! it hides: inherited declarations of the same name are retained even when
//! inaccessible, because even an inaccessible member hides declarations
//! further up (JLS 8.3), and because ambiguous-inheritance diagnostics need
//! the losers.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use javelin_core::{ClassId, FieldId, MethodId};

use crate::store::TypeStore;
use crate::ty::Type;

#[derive(Debug, Clone)]
pub struct FieldShadow {
    pub field: FieldId,
    pub conflicts: Vec<FieldId>,
}

#[derive(Debug, Clone)]
pub struct MethodShadow {
    pub method: MethodId,
    /// Same-signature methods inherited along other paths (typically from
    /// several superinterfaces).
    pub conflicts: Vec<MethodId>,
}

#[derive(Debug, Clone)]
pub struct TypeShadow {
    pub class: ClassId,
    pub conflicts: Vec<ClassId>,
}

#[derive(Debug, Default)]
pub struct MemberTables {
    pub fields: HashMap<String, FieldShadow>,
    /// Overload list per name; each entry is a distinct erased signature.
    pub methods: HashMap<String, Vec<MethodShadow>>,
    pub nested: HashMap<String, TypeShadow>,
}

impl MemberTables {
    pub fn field(&self, name: &str) -> Option<&FieldShadow> {
        self.fields.get(name)
    }

    pub fn overloads(&self, name: &str) -> &[MethodShadow] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nested_type(&self, name: &str) -> Option<&TypeShadow> {
        self.nested.get(name)
    }

    /// Build the closure for `id`: own members first, then the super chain,
    /// then superinterfaces, breadth order. The first declaration seen for a
    /// name wins the shadow; later ones become conflicts.
    pub(crate) fn compute(store: &TypeStore, id: ClassId) -> MemberTables {
        tracing::trace!(class = store.class_name(id), "computing member closure");
        let mut tables = MemberTables::default();
        let mut visited = Vec::new();
        collect(store, id, true, &mut tables, &mut visited);
        tables
    }
}

fn collect(
    store: &TypeStore,
    id: ClassId,
    is_self: bool,
    tables: &mut MemberTables,
    visited: &mut Vec<ClassId>,
) {
    if visited.contains(&id) {
        return;
    }
    visited.push(id);

    let Some(def) = store.def(id) else {
        return;
    };

    for (index, field) in def.fields.iter().enumerate() {
        if field.flags.is_synthetic() {
            continue;
        }
        // Private fields of supertypes are not inherited but still hide.
        let field_id = FieldId::new(id, index as u32);
        match tables.fields.entry(field.name.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(FieldShadow { field: field_id, conflicts: Vec::new() });
            }
            Entry::Occupied(mut entry) => {
                entry.get_mut().conflicts.push(field_id);
            }
        }
    }

    for (index, method) in def.methods.iter().enumerate() {
        if method.flags.is_synthetic() {
            continue;
        }
        if !is_self && method.flags.is_private() {
            // Private methods do not take part in any inherited lookup.
            continue;
        }
        let method_id = MethodId::method(id, index as u32);
        let overloads = tables.methods.entry(method.name.clone()).or_default();
        let erased: Vec<Type> = method.params.iter().map(|p| p.ty.erasure(store)).collect();

        let mut overridden = false;
        for shadow in overloads.iter_mut() {
            let existing = match store.method(shadow.method) {
                Some(m) => m,
                None => continue,
            };
            let existing_erased: Vec<Type> =
                existing.params.iter().map(|p| p.ty.erasure(store)).collect();
            if existing_erased == erased {
                // Same erased signature seen closer to the class: the new
                // one is overridden (super) or a multi-path duplicate
                // (interface); either way it goes to the conflict list.
                if shadow.method != method_id {
                    shadow.conflicts.push(method_id);
                }
                overridden = true;
                break;
            }
        }
        if !overridden {
            overloads.push(MethodShadow { method: method_id, conflicts: Vec::new() });
        }
    }

    for &nested_id in &def.nested {
        let Some(nested) = store.def(nested_id) else {
            continue;
        };
        match tables.nested.entry(nested.simple_name().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(TypeShadow { class: nested_id, conflicts: Vec::new() });
            }
            Entry::Occupied(mut entry) => {
                if entry.get().class != nested_id {
                    entry.get_mut().conflicts.push(nested_id);
                }
            }
        }
    }

    if let Some(super_id) = def.super_class.as_ref().and_then(Type::class_id) {
        collect(store, super_id, false, tables, visited);
    }
    for iface in &def.interfaces {
        if let Some(iface_id) = iface.class_id() {
            collect(store, iface_id, false, tables, visited);
        }
    }
    // Interfaces without a super chain still see Object's methods.
    if def.is_interface() && def.super_class.is_none() {
        collect(store, store.well_known().object, false, tables, visited);
    }
}
