//! Materialising external (class-file) types into the store, and the
//! minimal JDK image used by tests and small scenarios.
//!
//! External types load lazily: a stub's members keep their descriptor and
//! `Signature` strings until the class is first dereferenced, and the
//! throws clause of a method stays a list of pending internal names until
//! a call site needs it.

use std::collections::HashMap;

use javelin_classfile::signature as sig;
use javelin_classfile::{ClassStub, FieldType, MemberConstant, ReturnType};
use javelin_core::{ClassId, MethodId, TypeParamId};

use crate::const_value::ConstValue;
use crate::flags::Flags;
use crate::provider::TypeProvider;
use crate::store::{
    ClassDef, ClassKind, FieldDef, MethodDef, ParamDef, ThrowsEntry, TypeStore,
};
use crate::ty::{PrimitiveType, Type, WildcardBound};

impl TypeStore {
    /// Find-or-load a class by binary name. Referenced classes are interned
    /// but not recursively loaded; they materialise when dereferenced.
    pub fn load_external(
        &mut self,
        binary_name: &str,
        provider: &dyn TypeProvider,
    ) -> Option<ClassId> {
        if let Some(id) = self.class_id(binary_name) {
            if self.is_defined(id) {
                return Some(id);
            }
        }
        let stub = provider.lookup_type(binary_name)?;
        Some(self.define_from_stub(&stub))
    }

    /// Translate a class stub into a definition. Broken descriptors mark
    /// the type `bad` rather than failing: the caller keeps going and the
    /// diagnostics layer decides whether to say anything.
    pub fn define_from_stub(&mut self, stub: &ClassStub) -> ClassId {
        tracing::debug!(class = %stub.binary_name, "materialising external type");
        let id = self.intern_class_id(&stub.binary_name);
        if self.is_defined(id) {
            return id;
        }

        let mut bad = false;
        let parsed_signature = match stub.parsed_signature() {
            Ok(parsed) => parsed,
            Err(_) => {
                bad = true;
                None
            }
        };

        // Class type parameters come from the generic signature; their
        // names scope over every member signature below.
        let mut scope = TypeParamScope::default();
        let mut type_params = Vec::new();
        if let Some(class_sig) = &parsed_signature {
            type_params = self.translate_type_params(&class_sig.type_parameters, &mut scope);
        }

        let (super_class, interfaces) = match &parsed_signature {
            Some(class_sig) => (
                Some(self.translate_class_type(&class_sig.super_class, &scope)),
                class_sig
                    .interfaces
                    .iter()
                    .map(|iface| self.translate_class_type(iface, &scope))
                    .collect(),
            ),
            None => (
                stub.super_class
                    .as_deref()
                    .map(|name| Type::class(self.intern_internal(name), vec![])),
                stub.interfaces
                    .iter()
                    .map(|name| Type::class(self.intern_internal(name), vec![]))
                    .collect(),
            ),
        };

        let mut fields = Vec::new();
        for field in &stub.fields {
            let ty = match field.parsed_signature() {
                Ok(Some(field_sig)) => self.translate_type_sig(&field_sig, &scope),
                Ok(None) => match field.parsed_descriptor() {
                    Ok(desc) => self.translate_descriptor(&desc),
                    Err(_) => {
                        bad = true;
                        Type::Error
                    }
                },
                Err(_) => {
                    bad = true;
                    Type::Error
                }
            };
            let mut flags = Flags::from_field_access(field.access_flags);
            if field.deprecated {
                flags |= Flags::DEPRECATED;
            }
            fields.push(FieldDef {
                name: field.name.clone(),
                flags,
                ty,
                constant_value: field.constant_value.as_ref().map(translate_constant),
            });
        }

        let mut constructors = Vec::new();
        let mut methods = Vec::new();
        for method in &stub.methods {
            if method.name == "<clinit>" {
                continue;
            }
            let mut flags = Flags::from_method_access(method.access_flags);
            if method.deprecated {
                flags |= Flags::DEPRECATED;
            }
            let throws: Vec<ThrowsEntry> = method
                .exceptions
                .iter()
                .map(|name| ThrowsEntry::Pending(name.replace('/', ".")))
                .collect();

            let translated = match method.parsed_signature() {
                Ok(Some(method_sig)) => {
                    let mut method_scope = scope.clone();
                    let method_type_params =
                        self.translate_type_params(&method_sig.type_parameters, &mut method_scope);
                    let params = method_sig
                        .parameters
                        .iter()
                        .enumerate()
                        .map(|(index, p)| ParamDef {
                            name: format!("arg{index}"),
                            ty: self.translate_type_sig(p, &method_scope),
                        })
                        .collect();
                    let return_type = match &method_sig.return_type {
                        Some(ty) => self.translate_type_sig(ty, &method_scope),
                        None => Type::Void,
                    };
                    Some((method_type_params, params, return_type))
                }
                Ok(None) => match method.parsed_descriptor() {
                    Ok(desc) => {
                        let params = desc
                            .params
                            .iter()
                            .enumerate()
                            .map(|(index, p)| ParamDef {
                                name: format!("arg{index}"),
                                ty: self.translate_descriptor(p),
                            })
                            .collect();
                        let return_type = match &desc.return_type {
                            ReturnType::Void => Type::Void,
                            ReturnType::Type(ty) => self.translate_descriptor(ty),
                        };
                        Some((Vec::new(), params, return_type))
                    }
                    Err(_) => None,
                },
                Err(_) => None,
            };
            let Some((method_type_params, params, return_type)) = translated else {
                bad = true;
                continue;
            };

            let def = MethodDef {
                name: method.name.clone(),
                flags,
                type_params: method_type_params,
                params,
                return_type,
                throws,
                accessed: None,
            };
            if method.name == "<init>" {
                constructors.push(def);
            } else {
                methods.push(def);
            }
        }

        let mut flags = Flags::from_class_access(stub.access_flags)
            | Flags::HEADER_PROCESSED
            | Flags::MEMBERS_PROCESSED
            | Flags::COMPLETE;
        if bad {
            flags |= Flags::BAD;
        }
        if stub.deprecated {
            flags |= Flags::DEPRECATED;
        }

        let kind = if flags.contains(Flags::ENUM) {
            ClassKind::Enum
        } else if flags.contains(Flags::INTERFACE) {
            ClassKind::Interface
        } else {
            ClassKind::Class
        };

        // Nested-type links from the InnerClasses attribute.
        let mut enclosing = None;
        let mut nested = Vec::new();
        for inner in &stub.inner_classes {
            if inner.inner_class == stub.internal_name {
                enclosing = inner
                    .outer_class
                    .as_deref()
                    .map(|outer| self.intern_internal(outer));
            } else if inner.outer_class.as_deref() == Some(stub.internal_name.as_str()) {
                nested.push(self.intern_internal(&inner.inner_class));
            }
        }

        self.define_class(
            id,
            ClassDef {
                name: stub.binary_name.clone(),
                kind,
                flags,
                type_params,
                super_class,
                interfaces,
                enclosing,
                nested,
                fields,
                constructors,
                methods,
            },
        );
        id
    }

    fn intern_internal(&mut self, internal_name: &str) -> ClassId {
        self.intern_class_id(&internal_name.replace('/', "."))
    }

    fn translate_type_params(
        &mut self,
        params: &[sig::TypeParameter],
        scope: &mut TypeParamScope,
    ) -> Vec<TypeParamId> {
        // Two passes so that f-bounded parameters (`E extends Enum<E>`) can
        // see their own ids while their bounds translate.
        let ids: Vec<TypeParamId> = params
            .iter()
            .map(|param| {
                let id = self.reserve_type_param();
                scope.names.insert(param.name.clone(), id);
                id
            })
            .collect();

        for (param, &id) in params.iter().zip(&ids) {
            let mut bounds = Vec::new();
            if let Some(class_bound) = &param.class_bound {
                bounds.push(self.translate_type_sig(class_bound, scope));
            }
            for bound in &param.interface_bounds {
                bounds.push(self.translate_type_sig(bound, scope));
            }
            if bounds.is_empty() {
                bounds.push(Type::class(self.well_known().object, vec![]));
            }
            self.define_type_param(
                id,
                crate::store::TypeParamDef { name: param.name.clone(), bounds },
            );
        }
        ids
    }

    fn translate_type_sig(&mut self, ty: &sig::TypeSignature, scope: &TypeParamScope) -> Type {
        match ty {
            sig::TypeSignature::Base(base) => Type::Primitive(translate_base(*base)),
            sig::TypeSignature::Array(component) => {
                Type::array(self.translate_type_sig(component, scope))
            }
            sig::TypeSignature::TypeVariable(name) => match scope.names.get(name) {
                Some(&id) => Type::TypeVar(id),
                None => Type::class(self.well_known().object, vec![]),
            },
            sig::TypeSignature::Class(class) => self.translate_class_type(class, scope),
        }
    }

    fn translate_class_type(
        &mut self,
        class: &sig::ClassTypeSignature,
        scope: &TypeParamScope,
    ) -> Type {
        let id = self.intern_internal(&class.internal_name());
        // Type arguments of the innermost segment; enclosing-segment
        // arguments collapse into the erasure, matching how the rest of
        // the core consumes nested parameterised types.
        let args = class
            .segments
            .last()
            .map(|segment| {
                segment
                    .type_arguments
                    .iter()
                    .map(|arg| match arg {
                        sig::TypeArgument::Any => Type::Wildcard(WildcardBound::Unbounded),
                        sig::TypeArgument::Exact(inner) => self.translate_type_sig(inner, scope),
                        sig::TypeArgument::Extends(inner) => Type::Wildcard(
                            WildcardBound::Extends(Box::new(self.translate_type_sig(inner, scope))),
                        ),
                        sig::TypeArgument::Super(inner) => Type::Wildcard(WildcardBound::Super(
                            Box::new(self.translate_type_sig(inner, scope)),
                        )),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Type::class(id, args)
    }

    fn translate_descriptor(&mut self, desc: &FieldType) -> Type {
        match desc {
            FieldType::Base(base) => Type::Primitive(translate_base(*base)),
            FieldType::Object(internal) => Type::class(self.intern_internal(internal), vec![]),
            FieldType::Array(component) => Type::array(self.translate_descriptor(component)),
        }
    }
}

#[derive(Default, Clone)]
struct TypeParamScope {
    names: HashMap<String, TypeParamId>,
}

fn translate_base(base: javelin_classfile::BaseType) -> PrimitiveType {
    use javelin_classfile::BaseType as B;
    match base {
        B::Byte => PrimitiveType::Byte,
        B::Char => PrimitiveType::Char,
        B::Double => PrimitiveType::Double,
        B::Float => PrimitiveType::Float,
        B::Int => PrimitiveType::Int,
        B::Long => PrimitiveType::Long,
        B::Short => PrimitiveType::Short,
        B::Boolean => PrimitiveType::Boolean,
    }
}

fn translate_constant(constant: &MemberConstant) -> ConstValue {
    match constant {
        MemberConstant::Integer(v) => ConstValue::Int(*v),
        MemberConstant::Long(v) => ConstValue::Long(*v),
        MemberConstant::Float(v) => ConstValue::Float(*v),
        MemberConstant::Double(v) => ConstValue::Double(*v),
        MemberConstant::String(v) => ConstValue::Str(v.clone()),
    }
}

/// Resolve a method's pending throws entries in place. Entries become
/// plain class references; the classes themselves stay lazy.
pub fn resolve_method_throws(store: &mut TypeStore, method: MethodId) -> Vec<Type> {
    let pending: Vec<(usize, String)> = match store.method(method) {
        Some(def) => def
            .throws
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                ThrowsEntry::Pending(name) => Some((index, name.clone())),
                ThrowsEntry::Resolved(_) => None,
            })
            .collect(),
        None => return Vec::new(),
    };

    for (index, name) in pending {
        let id = store.intern_class_id(&name);
        if let Some(def) = store.method_mut(method) {
            def.throws[index] = ThrowsEntry::Resolved(Type::class(id, vec![]));
        }
    }

    match store.method(method) {
        Some(def) => def
            .throws
            .iter()
            .filter_map(|entry| match entry {
                ThrowsEntry::Resolved(ty) => Some(ty.clone()),
                ThrowsEntry::Pending(_) => None,
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Define the slice of the JDK the tests and the minimal scenarios rely on.
pub(crate) fn define_minimal_jdk(store: &mut TypeStore) {
    let wk = store.well_known().clone();
    let object_ty = Type::class(wk.object, vec![]);
    let string_ty = Type::class(wk.string, vec![]);
    let public = Flags::PUBLIC;

    let method = |name: &str, params: Vec<(&str, Type)>, ret: Type, flags: Flags| MethodDef {
        name: name.to_string(),
        flags,
        type_params: vec![],
        params: params
            .into_iter()
            .map(|(n, ty)| ParamDef { name: n.to_string(), ty })
            .collect(),
        return_type: ret,
        throws: vec![],
        accessed: None,
    };
    let ctor = |params: Vec<(&str, Type)>, flags: Flags| MethodDef {
        name: "<init>".to_string(),
        flags,
        type_params: vec![],
        params: params
            .into_iter()
            .map(|(n, ty)| ParamDef { name: n.to_string(), ty })
            .collect(),
        return_type: Type::Void,
        throws: vec![],
        accessed: None,
    };

    let class_t = store.add_type_param("T", vec![object_ty.clone()]);
    store.define_class(
        wk.object,
        ClassDef {
            name: "java.lang.Object".into(),
            kind: ClassKind::Class,
            flags: public | Flags::COMPLETE,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![
                method("equals", vec![("obj", object_ty.clone())], Type::Primitive(PrimitiveType::Boolean), public),
                method("hashCode", vec![], Type::Primitive(PrimitiveType::Int), public),
                method("toString", vec![], string_ty.clone(), public),
                method("getClass", vec![], Type::class(wk.class, vec![Type::Wildcard(WildcardBound::Unbounded)]), public | Flags::FINAL),
                method("clone", vec![], object_ty.clone(), Flags::PROTECTED),
            ],
        },
    );

    store.define_class(
        wk.class,
        ClassDef {
            name: "java.lang.Class".into(),
            kind: ClassKind::Class,
            flags: public | Flags::FINAL | Flags::COMPLETE,
            type_params: vec![class_t],
            super_class: Some(object_ty.clone()),
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![method("getName", vec![], string_ty.clone(), public)],
        },
    );

    for (id, name) in [(wk.cloneable, "java.lang.Cloneable"), (wk.serializable, "java.io.Serializable")] {
        store.define_class(
            id,
            ClassDef {
                name: name.into(),
                kind: ClassKind::Interface,
                flags: public | Flags::INTERFACE | Flags::COMPLETE,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                enclosing: None,
                nested: vec![],
                fields: vec![],
                constructors: vec![],
                methods: vec![],
            },
        );
    }

    // java.lang.Comparable<T>
    let comparable_t = store.add_type_param("T", vec![object_ty.clone()]);
    let comparable = store.intern_class_id("java.lang.Comparable");
    store.define_class(
        comparable,
        ClassDef {
            name: "java.lang.Comparable".into(),
            kind: ClassKind::Interface,
            flags: public | Flags::INTERFACE | Flags::COMPLETE,
            type_params: vec![comparable_t],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![method(
                "compareTo",
                vec![("o", Type::TypeVar(comparable_t))],
                Type::Primitive(PrimitiveType::Int),
                public | Flags::ABSTRACT,
            )],
        },
    );

    // java.lang.CharSequence
    let char_sequence = store.intern_class_id("java.lang.CharSequence");
    store.define_class(
        char_sequence,
        ClassDef {
            name: "java.lang.CharSequence".into(),
            kind: ClassKind::Interface,
            flags: public | Flags::INTERFACE | Flags::COMPLETE,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![
                method("length", vec![], Type::Primitive(PrimitiveType::Int), public | Flags::ABSTRACT),
                method("charAt", vec![("index", Type::Primitive(PrimitiveType::Int))], Type::Primitive(PrimitiveType::Char), public | Flags::ABSTRACT),
            ],
        },
    );

    store.define_class(
        wk.string,
        ClassDef {
            name: "java.lang.String".into(),
            kind: ClassKind::Class,
            flags: public | Flags::FINAL | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(object_ty.clone()),
            interfaces: vec![
                Type::class(wk.serializable, vec![]),
                Type::class(comparable, vec![string_ty.clone()]),
                Type::class(char_sequence, vec![]),
            ],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![
                method("length", vec![], Type::Primitive(PrimitiveType::Int), public),
                method("charAt", vec![("index", Type::Primitive(PrimitiveType::Int))], Type::Primitive(PrimitiveType::Char), public),
                method("concat", vec![("str", string_ty.clone())], string_ty.clone(), public),
                method("valueOf", vec![("obj", object_ty.clone())], string_ty.clone(), public | Flags::STATIC),
                method("intern", vec![], string_ty.clone(), public),
            ],
        },
    );

    // Number and the primitive wrappers.
    store.define_class(
        wk.number,
        ClassDef {
            name: "java.lang.Number".into(),
            kind: ClassKind::Class,
            flags: public | Flags::ABSTRACT | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(wk.serializable, vec![])],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![
                method("intValue", vec![], Type::Primitive(PrimitiveType::Int), public | Flags::ABSTRACT),
                method("longValue", vec![], Type::Primitive(PrimitiveType::Long), public | Flags::ABSTRACT),
                method("floatValue", vec![], Type::Primitive(PrimitiveType::Float), public | Flags::ABSTRACT),
                method("doubleValue", vec![], Type::Primitive(PrimitiveType::Double), public | Flags::ABSTRACT),
            ],
        },
    );

    let numeric_wrappers = [
        (wk.byte, "java.lang.Byte", PrimitiveType::Byte),
        (wk.short, "java.lang.Short", PrimitiveType::Short),
        (wk.integer, "java.lang.Integer", PrimitiveType::Int),
        (wk.long, "java.lang.Long", PrimitiveType::Long),
        (wk.float, "java.lang.Float", PrimitiveType::Float),
        (wk.double, "java.lang.Double", PrimitiveType::Double),
    ];
    for (id, name, prim) in numeric_wrappers {
        let self_ty = Type::class(id, vec![]);
        let value_method = format!("{}Value", prim.name());
        store.define_class(
            id,
            ClassDef {
                name: name.into(),
                kind: ClassKind::Class,
                flags: public | Flags::FINAL | Flags::COMPLETE,
                type_params: vec![],
                super_class: Some(Type::class(wk.number, vec![])),
                interfaces: vec![Type::class(comparable, vec![self_ty.clone()])],
                enclosing: None,
                nested: vec![],
                fields: vec![
                    FieldDef {
                        name: "MIN_VALUE".into(),
                        flags: public | Flags::STATIC | Flags::FINAL,
                        ty: Type::Primitive(prim),
                        constant_value: None,
                    },
                    FieldDef {
                        name: "MAX_VALUE".into(),
                        flags: public | Flags::STATIC | Flags::FINAL,
                        ty: Type::Primitive(prim),
                        constant_value: None,
                    },
                ],
                constructors: vec![ctor(vec![("value", Type::Primitive(prim))], public)],
                methods: vec![
                    method(&value_method, vec![], Type::Primitive(prim), public),
                    method("valueOf", vec![("value", Type::Primitive(prim))], self_ty.clone(), public | Flags::STATIC),
                ],
            },
        );
    }

    for (id, name, prim) in [
        (wk.boolean, "java.lang.Boolean", PrimitiveType::Boolean),
        (wk.character, "java.lang.Character", PrimitiveType::Char),
    ] {
        let self_ty = Type::class(id, vec![]);
        let value_method = if prim == PrimitiveType::Boolean { "booleanValue" } else { "charValue" };
        store.define_class(
            id,
            ClassDef {
                name: name.into(),
                kind: ClassKind::Class,
                flags: public | Flags::FINAL | Flags::COMPLETE,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: vec![
                    Type::class(wk.serializable, vec![]),
                    Type::class(comparable, vec![self_ty.clone()]),
                ],
                enclosing: None,
                nested: vec![],
                fields: vec![],
                constructors: vec![ctor(vec![("value", Type::Primitive(prim))], public)],
                methods: vec![
                    method(value_method, vec![], Type::Primitive(prim), public),
                    method("valueOf", vec![("value", Type::Primitive(prim))], self_ty.clone(), public | Flags::STATIC),
                ],
            },
        );
    }

    store.define_class(
        wk.void,
        ClassDef {
            name: "java.lang.Void".into(),
            kind: ClassKind::Class,
            flags: public | Flags::FINAL | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(object_ty.clone()),
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
        },
    );

    // Throwable hierarchy.
    let throwable_ty = Type::class(wk.throwable, vec![]);
    store.define_class(
        wk.throwable,
        ClassDef {
            name: "java.lang.Throwable".into(),
            kind: ClassKind::Class,
            flags: public | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(wk.serializable, vec![])],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public), ctor(vec![("message", string_ty.clone())], public)],
            methods: vec![method("getMessage", vec![], string_ty.clone(), public)],
        },
    );
    for (id, name, super_id) in [
        (wk.error, "java.lang.Error", wk.throwable),
        (wk.exception, "java.lang.Exception", wk.throwable),
        (wk.runtime_exception, "java.lang.RuntimeException", wk.exception),
    ] {
        store.define_class(
            id,
            ClassDef {
                name: name.into(),
                kind: ClassKind::Class,
                flags: public | Flags::COMPLETE,
                type_params: vec![],
                super_class: Some(Type::class(super_id, vec![])),
                interfaces: vec![],
                enclosing: None,
                nested: vec![],
                fields: vec![],
                constructors: vec![ctor(vec![], public), ctor(vec![("message", string_ty.clone())], public)],
                methods: vec![],
            },
        );
    }
    let io_exception = store.intern_class_id("java.io.IOException");
    store.define_class(
        io_exception,
        ClassDef {
            name: "java.io.IOException".into(),
            kind: ClassKind::Class,
            flags: public | Flags::COMPLETE,
            type_params: vec![],
            super_class: Some(Type::class(wk.exception, vec![])),
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![],
        },
    );

    // String builders: the append surface the concatenation lowering uses.
    for (id, name) in [
        (wk.string_builder, "java.lang.StringBuilder"),
        (wk.string_buffer, "java.lang.StringBuffer"),
    ] {
        let self_ty = Type::class(id, vec![]);
        store.define_class(
            id,
            ClassDef {
                name: name.into(),
                kind: ClassKind::Class,
                flags: public | Flags::FINAL | Flags::COMPLETE,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: vec![Type::class(char_sequence, vec![])],
                enclosing: None,
                nested: vec![],
                fields: vec![],
                constructors: vec![ctor(vec![], public), ctor(vec![("str", string_ty.clone())], public)],
                methods: vec![
                    method("append", vec![("str", string_ty.clone())], self_ty.clone(), public),
                    method("append", vec![("obj", object_ty.clone())], self_ty.clone(), public),
                    method("append", vec![("i", Type::Primitive(PrimitiveType::Int))], self_ty.clone(), public),
                    method("append", vec![("l", Type::Primitive(PrimitiveType::Long))], self_ty.clone(), public),
                    method("append", vec![("c", Type::Primitive(PrimitiveType::Char))], self_ty.clone(), public),
                    method("append", vec![("b", Type::Primitive(PrimitiveType::Boolean))], self_ty.clone(), public),
                    method("append", vec![("d", Type::Primitive(PrimitiveType::Double))], self_ty.clone(), public),
                    method("toString", vec![], string_ty.clone(), public),
                    method("length", vec![], Type::Primitive(PrimitiveType::Int), public),
                    method("charAt", vec![("index", Type::Primitive(PrimitiveType::Int))], Type::Primitive(PrimitiveType::Char), public),
                ],
            },
        );
    }

    // java.lang.Enum<E extends Enum<E>>; the bound is self-referential, so
    // the class id and parameter id are reserved before the bound exists.
    let enum_e = store.reserve_type_param();
    store.define_type_param(
        enum_e,
        crate::store::TypeParamDef {
            name: "E".into(),
            bounds: vec![Type::class(wk.enum_, vec![Type::TypeVar(enum_e)])],
        },
    );
    store.define_class(
        wk.enum_,
        ClassDef {
            name: "java.lang.Enum".into(),
            kind: ClassKind::Class,
            flags: public | Flags::ABSTRACT | Flags::COMPLETE,
            type_params: vec![enum_e],
            super_class: Some(object_ty.clone()),
            interfaces: vec![
                Type::class(comparable, vec![Type::TypeVar(enum_e)]),
                Type::class(wk.serializable, vec![]),
            ],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(
                vec![("name", string_ty.clone()), ("ordinal", Type::Primitive(PrimitiveType::Int))],
                Flags::PROTECTED,
            )],
            methods: vec![
                method("name", vec![], string_ty.clone(), public | Flags::FINAL),
                method("ordinal", vec![], Type::Primitive(PrimitiveType::Int), public | Flags::FINAL),
            ],
        },
    );

    // java.lang.Iterable<T>, java.util.List<E>, java.util.ArrayList<E>,
    // java.util.Map<K, V>: enough generic surface for substitution and
    // inference to be exercised end to end.
    let iterable_t = store.add_type_param("T", vec![object_ty.clone()]);
    let iterable = store.intern_class_id("java.lang.Iterable");
    store.define_class(
        iterable,
        ClassDef {
            name: "java.lang.Iterable".into(),
            kind: ClassKind::Interface,
            flags: public | Flags::INTERFACE | Flags::COMPLETE,
            type_params: vec![iterable_t],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
        },
    );

    let list_e = store.add_type_param("E", vec![object_ty.clone()]);
    let list = store.intern_class_id("java.util.List");
    store.define_class(
        list,
        ClassDef {
            name: "java.util.List".into(),
            kind: ClassKind::Interface,
            flags: public | Flags::INTERFACE | Flags::COMPLETE,
            type_params: vec![list_e],
            super_class: None,
            interfaces: vec![Type::class(iterable, vec![Type::TypeVar(list_e)])],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![
                method("get", vec![("index", Type::Primitive(PrimitiveType::Int))], Type::TypeVar(list_e), public | Flags::ABSTRACT),
                method("add", vec![("e", Type::TypeVar(list_e))], Type::Primitive(PrimitiveType::Boolean), public | Flags::ABSTRACT),
                method("size", vec![], Type::Primitive(PrimitiveType::Int), public | Flags::ABSTRACT),
            ],
        },
    );

    let array_list_e = store.add_type_param("E", vec![object_ty.clone()]);
    let array_list = store.intern_class_id("java.util.ArrayList");
    store.define_class(
        array_list,
        ClassDef {
            name: "java.util.ArrayList".into(),
            kind: ClassKind::Class,
            flags: public | Flags::COMPLETE,
            type_params: vec![array_list_e],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![
                method("get", vec![("index", Type::Primitive(PrimitiveType::Int))], Type::TypeVar(array_list_e), public),
                method("add", vec![("e", Type::TypeVar(array_list_e))], Type::Primitive(PrimitiveType::Boolean), public),
                method("size", vec![], Type::Primitive(PrimitiveType::Int), public),
            ],
        },
    );

    let map_k = store.add_type_param("K", vec![object_ty.clone()]);
    let map_v = store.add_type_param("V", vec![object_ty.clone()]);
    let map = store.intern_class_id("java.util.Map");
    store.define_class(
        map,
        ClassDef {
            name: "java.util.Map".into(),
            kind: ClassKind::Interface,
            flags: public | Flags::INTERFACE | Flags::COMPLETE,
            type_params: vec![map_k, map_v],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![
                method("get", vec![("key", object_ty.clone())], Type::TypeVar(map_v), public | Flags::ABSTRACT),
                method(
                    "put",
                    vec![("key", Type::TypeVar(map_k)), ("value", Type::TypeVar(map_v))],
                    Type::TypeVar(map_v),
                    public | Flags::ABSTRACT,
                ),
            ],
        },
    );

    let hash_map_k = store.add_type_param("K", vec![object_ty.clone()]);
    let hash_map_v = store.add_type_param("V", vec![object_ty.clone()]);
    let hash_map = store.intern_class_id("java.util.HashMap");
    store.define_class(
        hash_map,
        ClassDef {
            name: "java.util.HashMap".into(),
            kind: ClassKind::Class,
            flags: public | Flags::COMPLETE,
            type_params: vec![hash_map_k, hash_map_v],
            super_class: Some(object_ty.clone()),
            interfaces: vec![Type::class(
                map,
                vec![Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v)],
            )],
            enclosing: None,
            nested: vec![],
            fields: vec![],
            constructors: vec![ctor(vec![], public)],
            methods: vec![
                method("get", vec![("key", object_ty.clone())], Type::TypeVar(hash_map_v), public),
                method(
                    "put",
                    vec![("key", Type::TypeVar(hash_map_k)), ("value", Type::TypeVar(hash_map_v))],
                    Type::TypeVar(hash_map_v),
                    public,
                ),
            ],
        },
    );
}
