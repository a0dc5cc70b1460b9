//! The class arena.
//!
//! Types reference their super, their subtypes, their owner and their
//! enclosing instances, so the graph is cyclic; records keyed by [`ClassId`]
//! with id-valued back-references keep ownership flat. A class id can be
//! interned before its definition exists — that is how mutually recursive
//! and lazily loaded types are wired up — and a dereference of an undefined
//! id behaves like a `bad` type: it converts freely and produces at most one
//! diagnostic upstream.

use std::collections::HashMap;
use std::rc::Rc;

use javelin_core::{ClassId, FieldId, MethodId, TypeParamId};

use crate::const_value::ConstValue;
use crate::flags::Flags;
use crate::members::MemberTables;
use crate::ty::{PrimitiveType, Type};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone)]
pub struct TypeParamDef {
    pub name: String,
    /// Ordered bounds: first is the class bound (or `Object`), the rest are
    /// interface bounds. The erasure of the parameter is the first bound.
    pub bounds: Vec<Type>,
}

#[derive(Debug, Clone)]
pub struct ParamDef {
    pub name: String,
    pub ty: Type,
}

/// A throws-clause entry. Class-file methods keep the raw internal name
/// until the throws clause is first needed.
#[derive(Debug, Clone, PartialEq)]
pub enum ThrowsEntry {
    Resolved(Type),
    Pending(String),
}

/// The member a synthetic accessor forwards to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccessedMember {
    Field(FieldId),
    Method(MethodId),
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub flags: Flags,
    pub type_params: Vec<TypeParamId>,
    pub params: Vec<ParamDef>,
    pub return_type: Type,
    pub throws: Vec<ThrowsEntry>,
    /// Set on synthetic accessors: the member the accessor reaches.
    pub accessed: Option<AccessedMember>,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    pub fn is_varargs(&self) -> bool {
        self.flags.is_varargs()
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params.iter().map(|p| &p.ty)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub flags: Flags,
    pub ty: Type,
    pub constant_value: Option<ConstValue>,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Binary name: dots between packages, `$` before nested simple names.
    pub name: String,
    pub kind: ClassKind,
    pub flags: Flags,
    pub type_params: Vec<TypeParamId>,
    /// Possibly parameterised; `None` only for `java.lang.Object`.
    pub super_class: Option<Type>,
    /// Possibly parameterised direct superinterfaces.
    pub interfaces: Vec<Type>,
    pub enclosing: Option<ClassId>,
    pub nested: Vec<ClassId>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<MethodDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn simple_name(&self) -> &str {
        let last = self.name.rsplit('.').next().unwrap_or(&self.name);
        last.rsplit('$').next().unwrap_or(last)
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface)
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn package_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}

/// Ids of the types the core special-cases.
#[derive(Debug, Clone)]
pub struct WellKnown {
    pub object: ClassId,
    pub string: ClassId,
    pub class: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub character: ClassId,
    pub short: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub void: ClassId,
    pub throwable: ClassId,
    pub error: ClassId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
    pub string_builder: ClassId,
    pub string_buffer: ClassId,
    pub enum_: ClassId,
}

struct ClassData {
    name: String,
    def: Option<ClassDef>,
    tables: Option<Rc<MemberTables>>,
}

pub struct TypeStore {
    classes: Vec<ClassData>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<Option<TypeParamDef>>,
    subtypes: HashMap<ClassId, Vec<ClassId>>,
    well_known: WellKnown,
}

impl TypeStore {
    /// An empty store with the well-known ids interned but undefined.
    pub fn new() -> Self {
        let mut store = TypeStore {
            classes: Vec::new(),
            by_name: HashMap::new(),
            type_params: Vec::new(),
            subtypes: HashMap::new(),
            // Placeholder; replaced right below once ids exist.
            well_known: WellKnown {
                object: ClassId::from_raw(0),
                string: ClassId::from_raw(0),
                class: ClassId::from_raw(0),
                cloneable: ClassId::from_raw(0),
                serializable: ClassId::from_raw(0),
                number: ClassId::from_raw(0),
                boolean: ClassId::from_raw(0),
                byte: ClassId::from_raw(0),
                character: ClassId::from_raw(0),
                short: ClassId::from_raw(0),
                integer: ClassId::from_raw(0),
                long: ClassId::from_raw(0),
                float: ClassId::from_raw(0),
                double: ClassId::from_raw(0),
                void: ClassId::from_raw(0),
                throwable: ClassId::from_raw(0),
                error: ClassId::from_raw(0),
                exception: ClassId::from_raw(0),
                runtime_exception: ClassId::from_raw(0),
                string_builder: ClassId::from_raw(0),
                string_buffer: ClassId::from_raw(0),
                enum_: ClassId::from_raw(0),
            },
        };
        store.well_known = WellKnown {
            object: store.intern_class_id("java.lang.Object"),
            string: store.intern_class_id("java.lang.String"),
            class: store.intern_class_id("java.lang.Class"),
            cloneable: store.intern_class_id("java.lang.Cloneable"),
            serializable: store.intern_class_id("java.io.Serializable"),
            number: store.intern_class_id("java.lang.Number"),
            boolean: store.intern_class_id("java.lang.Boolean"),
            byte: store.intern_class_id("java.lang.Byte"),
            character: store.intern_class_id("java.lang.Character"),
            short: store.intern_class_id("java.lang.Short"),
            integer: store.intern_class_id("java.lang.Integer"),
            long: store.intern_class_id("java.lang.Long"),
            float: store.intern_class_id("java.lang.Float"),
            double: store.intern_class_id("java.lang.Double"),
            void: store.intern_class_id("java.lang.Void"),
            throwable: store.intern_class_id("java.lang.Throwable"),
            error: store.intern_class_id("java.lang.Error"),
            exception: store.intern_class_id("java.lang.Exception"),
            runtime_exception: store.intern_class_id("java.lang.RuntimeException"),
            string_builder: store.intern_class_id("java.lang.StringBuilder"),
            string_buffer: store.intern_class_id("java.lang.StringBuffer"),
            enum_: store.intern_class_id("java.lang.Enum"),
        };
        store
    }

    /// A store preloaded with the slice of `java.lang`/`java.util` the tests
    /// and the minimal scenarios need.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        crate::loader::define_minimal_jdk(&mut store);
        store
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    /// Intern (or find) the id for a binary class name without defining it.
    pub fn intern_class_id(&mut self, binary_name: &str) -> ClassId {
        if let Some(&id) = self.by_name.get(binary_name) {
            return id;
        }
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.classes.push(ClassData { name: binary_name.to_string(), def: None, tables: None });
        self.by_name.insert(binary_name.to_string(), id);
        id
    }

    pub fn class_id(&self, binary_name: &str) -> Option<ClassId> {
        self.by_name.get(binary_name).copied()
    }

    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        self.record_subtype_edges(id, &def);
        let data = &mut self.classes[id.index()];
        data.def = Some(def);
        data.tables = None;
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name.clone());
        self.define_class(id, def);
        id
    }

    fn record_subtype_edges(&mut self, id: ClassId, def: &ClassDef) {
        if let Some(super_id) = def.super_class.as_ref().and_then(Type::class_id) {
            self.subtypes.entry(super_id).or_default().push(id);
        }
        for iface in &def.interfaces {
            if let Some(iface_id) = iface.class_id() {
                self.subtypes.entry(iface_id).or_default().push(id);
            }
        }
    }

    /// The definition, or `None` when the id was interned but the class was
    /// never materialised (a `bad` type from the core's point of view).
    pub fn def(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index()).and_then(|c| c.def.as_ref())
    }

    pub fn def_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        let data = self.classes.get_mut(id.index())?;
        // Synthesis may append members after the expanded tables were built;
        // accessors are added, not inserted, so the tables stay valid.
        data.def.as_mut()
    }

    pub fn is_defined(&self, id: ClassId) -> bool {
        self.def(id).is_some()
    }

    pub fn class_name(&self, id: ClassId) -> &str {
        &self.classes[id.index()].name
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Classes recorded as direct subtypes of `id` (back-reference).
    pub fn direct_subtypes(&self, id: ClassId) -> &[ClassId] {
        self.subtypes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_type_param(&mut self, name: &str, bounds: Vec<Type>) -> TypeParamId {
        let id = TypeParamId::from_raw(self.type_params.len() as u32);
        self.type_params.push(Some(TypeParamDef { name: name.to_string(), bounds }));
        id
    }

    /// Reserve a type-parameter id to be defined later (self-referential
    /// bounds need the id before the bound can be written).
    pub fn reserve_type_param(&mut self) -> TypeParamId {
        let id = TypeParamId::from_raw(self.type_params.len() as u32);
        self.type_params.push(None);
        id
    }

    pub fn define_type_param(&mut self, id: TypeParamId, def: TypeParamDef) {
        self.type_params[id.index()] = Some(def);
    }

    pub fn type_param(&self, id: TypeParamId) -> Option<&TypeParamDef> {
        self.type_params.get(id.index()).and_then(|p| p.as_ref())
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.def(id.class)?.fields.get(id.index as usize)
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodDef> {
        let def = self.def(id.class)?;
        if id.is_constructor {
            def.constructors.get(id.index as usize)
        } else {
            def.methods.get(id.index as usize)
        }
    }

    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodDef> {
        let def = self.def_mut(id.class)?;
        if id.is_constructor {
            def.constructors.get_mut(id.index as usize)
        } else {
            def.methods.get_mut(id.index as usize)
        }
    }

    /// Append a field without entering it into the expanded tables: the slot
    /// for synthetic members (`this$0`, `val$x`, class-literal caches).
    pub fn add_synthetic_field(&mut self, class: ClassId, field: FieldDef) -> Option<FieldId> {
        let def = self.def_mut(class)?;
        let id = FieldId::new(class, def.fields.len() as u32);
        def.fields.push(field);
        Some(id)
    }

    /// Append a method without entering it into the expanded tables, so it
    /// is never an overload candidate. Accessors go through here.
    pub fn add_synthetic_method(&mut self, class: ClassId, method: MethodDef) -> Option<MethodId> {
        let def = self.def_mut(class)?;
        let id = MethodId::method(class, def.methods.len() as u32);
        def.methods.push(method);
        Some(id)
    }

    pub fn add_synthetic_constructor(
        &mut self,
        class: ClassId,
        ctor: MethodDef,
    ) -> Option<MethodId> {
        let def = self.def_mut(class)?;
        let id = MethodId::constructor(class, def.constructors.len() as u32);
        def.constructors.push(ctor);
        Some(id)
    }

    /// The expanded member tables for a class, built on first need and
    /// immutable afterwards.
    pub fn expanded_tables(&mut self, id: ClassId) -> Rc<MemberTables> {
        if let Some(tables) = self.classes.get(id.index()).and_then(|c| c.tables.clone()) {
            return tables;
        }
        let tables = Rc::new(MemberTables::compute(self, id));
        if let Some(data) = self.classes.get_mut(id.index()) {
            data.tables = Some(tables.clone());
        }
        tables
    }

    /// Wrapper class for a primitive, for boxing.
    pub fn wrapper_of(&self, primitive: PrimitiveType) -> ClassId {
        let wk = &self.well_known;
        match primitive {
            PrimitiveType::Boolean => wk.boolean,
            PrimitiveType::Byte => wk.byte,
            PrimitiveType::Short => wk.short,
            PrimitiveType::Char => wk.character,
            PrimitiveType::Int => wk.integer,
            PrimitiveType::Long => wk.long,
            PrimitiveType::Float => wk.float,
            PrimitiveType::Double => wk.double,
        }
    }

    /// The primitive a wrapper class unboxes to, if it is one.
    pub fn primitive_of(&self, class: ClassId) -> Option<PrimitiveType> {
        let wk = &self.well_known;
        if class == wk.boolean {
            Some(PrimitiveType::Boolean)
        } else if class == wk.byte {
            Some(PrimitiveType::Byte)
        } else if class == wk.short {
            Some(PrimitiveType::Short)
        } else if class == wk.character {
            Some(PrimitiveType::Char)
        } else if class == wk.integer {
            Some(PrimitiveType::Int)
        } else if class == wk.long {
            Some(PrimitiveType::Long)
        } else if class == wk.float {
            Some(PrimitiveType::Float)
        } else if class == wk.double {
            Some(PrimitiveType::Double)
        } else {
            None
        }
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}
