//! Synthetic-member synthesis: accessor methods for private and
//! cross-package-protected members, the enclosing-instance field of inner
//! classes, and captured-local shadows of local and anonymous classes.
//!
//! Accessors are *added*, never inserted: they bypass the expanded member
//! tables so they are not overload candidates. A map keyed by (member,
//! qualifying type) dedupes them, so `Outer.super.m()` and
//! `((Outer) this).m()` get distinct accessors while repeated identical
//! uses share one.

use javelin_core::{ClassId, ExprId, FieldId, LocalId, MethodId, Name};
use javelin_types::{AccessedMember, FieldDef, Flags, MethodDef, ParamDef, Symbol, Type};

use javelin_core::name::synthetic;

use crate::semantic::{Semantic, TargetRelease};

impl<'a> Semantic<'a> {
    fn next_accessor_name(&mut self, class: ClassId) -> String {
        let counter = self.accessor_counters.entry(class).or_insert(0);
        let index = *counter;
        *counter += 1;
        let prefix = match self.target {
            TargetRelease::Java14 => synthetic::ACCESS_PREFIX,
            TargetRelease::Java5 => synthetic::ACCESS_PREFIX_15,
        };
        format!("{prefix}{index}")
    }

    /// Read accessor for a field: a static method on the declaring type
    /// that returns the field's value, taking the qualifying instance when
    /// the field is an instance field.
    pub(crate) fn read_field_accessor(&mut self, field: FieldId, base_type: ClassId) -> MethodId {
        let key = (AccessedMember::Field(field), base_type);
        if let Some(&existing) = self.accessor_cache.get(&key) {
            return existing;
        }

        let Some(def) = self.store.field(field).cloned() else {
            return MethodId::method(base_type, 0);
        };
        let name = self.next_accessor_name(field.class);
        let mut params = Vec::new();
        if !def.flags.is_static() {
            params.push(ParamDef { name: "$0".into(), ty: Type::class(base_type, vec![]) });
        }
        let mut flags = Flags::STATIC | Flags::SYNTHETIC;
        if def.flags.contains(Flags::STRICTFP) {
            flags |= Flags::STRICTFP;
        }
        let accessor = MethodDef {
            name,
            flags,
            type_params: vec![],
            params,
            return_type: def.ty.clone(),
            throws: vec![],
            accessed: Some(AccessedMember::Field(field)),
        };
        let id = self
            .store
            .add_synthetic_method(field.class, accessor)
            .unwrap_or(MethodId::method(field.class, 0));
        self.accessor_cache.insert(key, id);
        tracing::debug!(
            class = self.store.class_name(field.class),
            accessor = ?id,
            "synthesized field read accessor"
        );
        id
    }

    /// Write accessor: static, void, same qualifier shape plus the new
    /// value. Derived from the read accessor so both share the qualifying
    /// type.
    pub(crate) fn write_field_accessor(&mut self, field: FieldId, base_type: ClassId) -> MethodId {
        if let Some(&existing) = self.write_accessor_cache.get(&(field, base_type)) {
            return existing;
        }
        // The read accessor's qualifying type decides the parameter shape;
        // creating it first keeps the pair consistent.
        let read = self.read_field_accessor(field, base_type);
        let qualifier = self
            .store
            .method(read)
            .and_then(|m| m.params.first())
            .map(|p| p.ty.clone());

        let Some(def) = self.store.field(field).cloned() else {
            return read;
        };
        let name = self.next_accessor_name(field.class);
        let mut params = Vec::new();
        if !def.flags.is_static() {
            params.push(ParamDef {
                name: "$0".into(),
                ty: qualifier.unwrap_or(Type::class(base_type, vec![])),
            });
        }
        params.push(ParamDef { name: "$1".into(), ty: def.ty.clone() });

        let accessor = MethodDef {
            name,
            flags: Flags::STATIC | Flags::SYNTHETIC,
            type_params: vec![],
            params,
            return_type: Type::Void,
            throws: vec![],
            accessed: Some(AccessedMember::Field(field)),
        };
        let id = self
            .store
            .add_synthetic_method(field.class, accessor)
            .unwrap_or(read);
        self.write_accessor_cache.insert((field, base_type), id);
        id
    }

    /// Read accessor for a method: forwards the call with the original
    /// argument list, plus the qualifying instance when the target is an
    /// instance method.
    pub(crate) fn read_method_accessor(&mut self, method: MethodId, base_type: ClassId) -> MethodId {
        let key = (AccessedMember::Method(method), base_type);
        if let Some(&existing) = self.accessor_cache.get(&key) {
            return existing;
        }

        let Some(def) = self.store.method(method).cloned() else {
            return method;
        };
        let name = self.next_accessor_name(method.class);
        let mut params = Vec::new();
        if !def.flags.is_static() {
            params.push(ParamDef { name: "$0".into(), ty: Type::class(base_type, vec![]) });
        }
        params.extend(def.params.iter().cloned());

        let mut flags = Flags::STATIC | Flags::SYNTHETIC;
        if def.flags.contains(Flags::STRICTFP) {
            flags |= Flags::STRICTFP;
        }
        let accessor = MethodDef {
            name,
            flags,
            type_params: vec![],
            params,
            return_type: def.return_type.clone(),
            throws: def.throws.clone(),
            accessed: Some(AccessedMember::Method(method)),
        };
        let id = self
            .store
            .add_synthetic_method(method.class, accessor)
            .unwrap_or(method);
        self.accessor_cache.insert(key, id);
        id
    }

    /// Accessor for a private constructor: an alternate constructor that
    /// forwards to the real one, distinguished by a trailing parameter of
    /// a synthesised placeholder type.
    pub(crate) fn constructor_accessor(&mut self, ctor: MethodId) -> MethodId {
        if let Some(&existing) = self.ctor_accessor_cache.get(&ctor) {
            return existing;
        }
        let Some(def) = self.store.method(ctor).cloned() else {
            return ctor;
        };
        let outermost = self.outermost_type(ctor.class);
        let placeholder = self.placeholder_type(outermost);

        let mut params = def.params.clone();
        params.push(ParamDef {
            name: format!("${}", params.len()),
            ty: Type::class(placeholder, vec![]),
        });

        let accessor = MethodDef {
            name: synthetic::INIT.to_string(),
            flags: Flags::SYNTHETIC,
            type_params: vec![],
            params,
            return_type: Type::Void,
            throws: def.throws.clone(),
            accessed: Some(AccessedMember::Method(ctor)),
        };
        let id = self
            .store
            .add_synthetic_constructor(ctor.class, accessor)
            .unwrap_or(ctor);
        self.ctor_accessor_cache.insert(ctor, id);
        id
    }

    /// The placeholder class (`Outer$`) that disambiguates constructor
    /// accessors; one per outermost type.
    fn placeholder_type(&mut self, outermost: ClassId) -> ClassId {
        if let Some(&existing) = self.placeholder_types.get(&outermost) {
            return existing;
        }
        let name = format!("{}$", self.store.class_name(outermost));
        let object = self.store.well_known().object;
        let id = self.store.add_class(javelin_types::ClassDef {
            name,
            kind: javelin_types::ClassKind::Class,
            flags: Flags::SYNTHETIC | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(Type::class(object, vec![])),
            interfaces: vec![],
            enclosing: Some(outermost),
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
        });
        self.placeholder_types.insert(outermost, id);
        id
    }

    /// The synthetic `final this$0` field of a non-static inner class,
    /// inserted on first need; every constructor gains a leading parameter
    /// that initialises it.
    pub(crate) fn ensure_enclosing_instance(&mut self, inner: ClassId) -> Option<FieldId> {
        if let Some(&existing) = self.enclosing_field.get(&inner) {
            return Some(existing);
        }
        let enclosing = self.store.def(inner)?.enclosing?;
        let enclosing_ty = Type::class(enclosing, vec![]);

        let field = self.store.add_synthetic_field(
            inner,
            FieldDef {
                name: synthetic::THIS0.to_string(),
                flags: Flags::PRIVATE | Flags::FINAL | Flags::SYNTHETIC,
                ty: enclosing_ty.clone(),
                constant_value: None,
            },
        )?;

        // Prepend the enclosing instance to every declared constructor.
        let ctor_count = self.store.def(inner)?.constructors.len();
        for index in 0..ctor_count {
            let id = MethodId::constructor(inner, index as u32);
            if let Some(ctor) = self.store.method_mut(id) {
                ctor.params.insert(
                    0,
                    ParamDef { name: synthetic::THIS0.to_string(), ty: enclosing_ty.clone() },
                );
            }
        }

        self.enclosing_field.insert(inner, field);
        tracing::debug!(class = self.store.class_name(inner), "inserted this$0");
        Some(field)
    }

    /// Shadow a captured effectively-final local into `class` (and any
    /// local classes between it and the declaring method) as a `val$x`
    /// field plus a trailing constructor parameter. Returns the shadow
    /// variable the use site should bind instead.
    pub(crate) fn find_local_shadow(&mut self, local: LocalId, class: ClassId) -> LocalId {
        let data = self.locals.get(local).clone();

        // Walk outward over the chain of local/anonymous classes that sit
        // between the use and the local's declaring method.
        let mut chain = Vec::new();
        let mut cursor = Some(class);
        while let Some(current) = cursor {
            let Some(def) = self.store.def(current) else {
                break;
            };
            if current == data.owner {
                break;
            }
            if def.flags.contains(Flags::LOCAL) || def.flags.contains(Flags::ANONYMOUS) {
                chain.push(current);
                cursor = def.enclosing;
            } else {
                break;
            }
        }

        let mut shadow = local;
        // Outermost first, so inner classes capture through their
        // enclosing local class's field.
        for &target in chain.iter().rev() {
            shadow = self.shadow_in_class(local, shadow, target);
        }
        shadow
    }

    fn shadow_in_class(&mut self, original: LocalId, source: LocalId, class: ClassId) -> LocalId {
        if let Some(&field) = self.capture_fields.get(&(class, original)) {
            // Already captured here; reuse its shadow local.
            let order = self.capture_order.get(&class);
            if let Some(entries) = order {
                for (captured, f, shadow) in entries {
                    if *captured == original && *f == field {
                        return *shadow;
                    }
                }
            }
        }

        let data = self.locals.get(source).clone();
        let field_name = format!("{}{}", synthetic::VAL_PREFIX, self.locals.get(original).name);

        let Some(field) = self.store.add_synthetic_field(
            class,
            FieldDef {
                name: field_name.clone(),
                flags: Flags::PRIVATE | Flags::FINAL | Flags::SYNTHETIC,
                ty: data.ty.clone(),
                constant_value: None,
            },
        ) else {
            return source;
        };

        // Every constructor takes the captured value as a trailing
        // parameter.
        let ctor_count = self.store.def(class).map(|d| d.constructors.len()).unwrap_or(0);
        for index in 0..ctor_count {
            let id = MethodId::constructor(class, index as u32);
            if let Some(ctor) = self.store.method_mut(id) {
                ctor.params.push(ParamDef { name: field_name.clone(), ty: data.ty.clone() });
            }
        }

        let shadow = self.locals.alloc(crate::scope::LocalData {
            name: Name::new(field_name.as_str()),
            ty: data.ty.clone(),
            flags: Flags::FINAL | Flags::SYNTHETIC,
            slot: 0,
            value: None,
            owner: class,
            accessed_local: Some(source),
        });

        self.capture_fields.insert((class, original), field);
        self.capture_order
            .entry(class)
            .or_default()
            .push((original, field, shadow));
        tracing::debug!(
            class = self.store.class_name(class),
            field = %field_name,
            "captured local into shadow field"
        );
        shadow
    }

    /// A constructor call against a local class that has not finished
    /// processing: remember it and patch the argument list once the
    /// class's captures are known.
    pub(crate) fn defer_local_ctor_call(&mut self, class: ClassId, call: ExprId) {
        self.deferred_ctor_calls.entry(class).or_default().push(call);
    }

    /// Drain the deferred-call queue of a local class: each recorded
    /// invocation gains one trailing argument per captured local, in
    /// capture order.
    pub(crate) fn patch_local_ctor_calls(&mut self, class: ClassId) {
        let calls = self.deferred_ctor_calls.remove(&class).unwrap_or_default();
        if calls.is_empty() {
            return;
        }
        let captures = self.capture_order.get(&class).cloned().unwrap_or_default();
        for call in calls {
            for (original, _field, _shadow) in &captures {
                let data = self.locals.get(*original).clone();
                let token = self.ast.expr(call).token;
                let arg = self.ast.alloc_expr(
                    javelin_syntax::ExprKind::Name { qualifier: None, name: data.name.clone() },
                    token,
                );
                {
                    let node = self.ast.expr_mut(arg);
                    node.symbol = Some(Symbol::Local(*original));
                    node.ty = Some(data.ty.clone());
                }
                if let javelin_syntax::ExprKind::New { args, .. } = &mut self.ast.expr_mut(call).kind
                {
                    args.push(arg);
                }
            }
        }
    }
}
