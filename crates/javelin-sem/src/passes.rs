//! The pass driver: type headers, member headers, symbol-table
//! completion, executable bodies.
//!
//! Each phase is guarded by a per-type state bit so reentrant processing
//! (a body referencing a type whose headers are still being computed) is
//! idempotent. A unit marked bad short-circuits everything.

use javelin_core::{ClassId, Name};
use javelin_syntax::{ImportDecl, TypeDeclId, TypeDeclKind};
use javelin_types::{
    ClassDef, ClassKind, FieldDef, Flags, MethodDef, ParamDef, ThrowsEntry, Type, TypeParamDef,
};

use crate::errors::SemanticErrorKind;
use crate::imports::StaticImport;
use crate::scope::{BlockScope, LocalData, TypeEnv};
use crate::semantic::Semantic;

impl<'a> Semantic<'a> {
    /// Run the full semantic pass over every compilation unit.
    pub fn analyze(&mut self) {
        for unit in 0..self.ast.units.len() {
            self.unit = unit;
            if self.ast.units[unit].bad {
                tracing::debug!(unit, "skipping bad compilation unit");
                continue;
            }
            let _span =
                tracing::debug_span!("analyze_unit", file = self.lex.file_name()).entered();
            let types: Vec<TypeDeclId> = self.ast.units[unit].types.clone();
            for &decl in &types {
                self.declare_type(decl, None);
            }
            // Imports may name types of this same compilation, so they
            // resolve after declaration but before headers.
            self.process_imports();
            for &decl in &types {
                self.process_type_header(decl);
            }
            for &decl in &types {
                self.process_members(decl);
            }
            for &decl in &types {
                self.complete_symbol_table(decl);
            }
            for &decl in &types {
                self.process_executable_bodies(decl);
            }
        }
    }

    fn process_imports(&mut self) {
        let imports = std::mem::take(&mut self.ast.units[self.unit].imports);
        for import in &imports {
            match import {
                ImportDecl::SingleType { name } => {
                    let simple = name.parts.last().cloned().unwrap_or_else(|| Name::new(""));
                    if let Some(class) = self.lookup_import_target(&name.dotted()) {
                        self.imports.single_types.push((simple, class));
                    } else {
                        self.report(
                            SemanticErrorKind::NotFoundType,
                            name.token,
                            format!("the import {} cannot be resolved", name.dotted()),
                        );
                    }
                }
                ImportDecl::OnDemand { name } => {
                    let dotted = name.dotted();
                    let exists = self
                        .classpath
                        .map(|cp| cp.package_exists(&dotted))
                        .unwrap_or(false);
                    if exists {
                        let package = self.packages.intern(&dotted);
                        self.imports.on_demand_packages.push(package);
                    } else if let Some(class) = self.lookup_import_target(&dotted) {
                        self.imports.on_demand_types.push(class);
                    } else {
                        self.report(
                            SemanticErrorKind::NotFoundPackage,
                            name.token,
                            format!("the imported package {dotted} does not exist"),
                        );
                    }
                }
                ImportDecl::SingleStatic { type_name, member, token } => {
                    match self.lookup_import_target(&type_name.dotted()) {
                        Some(class) => self.imports.single_static.push(StaticImport {
                            imported_type: class,
                            member: member.clone(),
                        }),
                        None => self.report(
                            SemanticErrorKind::NotFoundType,
                            *token,
                            format!("the static import {} cannot be resolved", type_name.dotted()),
                        ),
                    }
                }
                ImportDecl::StaticOnDemand { type_name } => {
                    match self.lookup_import_target(&type_name.dotted()) {
                        Some(class) => self.imports.static_on_demand.push(class),
                        None => self.report(
                            SemanticErrorKind::NotFoundType,
                            type_name.token,
                            format!("the static import {} cannot be resolved", type_name.dotted()),
                        ),
                    }
                }
            }
        }
        self.ast.units[self.unit].imports = imports;
    }

    /// Phase 0: intern ids for every declared type (nested included) so
    /// headers can reference each other in any order.
    pub(crate) fn declare_type(&mut self, decl_id: TypeDeclId, enclosing: Option<ClassId>) {
        let (name, nested) = {
            let decl = self.ast.type_decl(decl_id);
            (decl.name.clone(), decl.nested.clone())
        };
        let binary = match enclosing {
            Some(outer) => format!("{}${}", self.store.class_name(outer), name),
            None => {
                let package = self.unit_package();
                let package_name = self.packages.name(package).to_string();
                if package_name.is_empty() {
                    name.as_str().to_string()
                } else {
                    format!("{package_name}.{name}")
                }
            }
        };
        let class = self.store.intern_class_id(&binary);
        self.ast.type_decl_mut(decl_id).symbol = Some(class);
        self.class_decl.insert(class, decl_id);

        if enclosing.is_none() {
            let package = self.unit_package();
            self.packages.add_type(package, name, class);
        }

        for nested_decl in nested {
            self.declare_type(nested_decl, Some(class));
        }
    }

    /// Phase 1: names, supers, type parameters.
    pub(crate) fn process_type_header(&mut self, decl_id: TypeDeclId) {
        let Some(class) = self.ast.type_decl(decl_id).symbol else {
            return;
        };
        if self
            .store
            .def(class)
            .map(|d| d.flags.contains(Flags::HEADER_PROCESSED))
            .unwrap_or(false)
        {
            return;
        }

        let (kind, modifiers, type_param_decls, nested) = {
            let decl = self.ast.type_decl(decl_id);
            (decl.kind, decl.modifiers, decl.type_params.len(), decl.nested.clone())
        };

        let kind = match kind {
            TypeDeclKind::Class => ClassKind::Class,
            TypeDeclKind::Interface => ClassKind::Interface,
            TypeDeclKind::Enum => ClassKind::Enum,
        };
        let mut flags = modifiers | Flags::HEADER_PROCESSED | Flags::SOURCE_PENDING;
        if kind == ClassKind::Interface {
            flags |= Flags::INTERFACE | Flags::ABSTRACT;
        }
        if kind == ClassKind::Enum {
            flags |= Flags::ENUM | Flags::FINAL;
        }

        // Reserve the type parameters with their names before resolving
        // bounds, so f-bounded parameters resolve.
        let mut type_params = Vec::with_capacity(type_param_decls);
        let object_ty = Type::class(self.store.well_known().object, vec![]);
        for index in 0..type_param_decls {
            let param_name = self.ast.type_decl(decl_id).type_params[index].name.clone();
            let id = self.store.add_type_param(param_name.as_str(), vec![object_ty.clone()]);
            type_params.push(id);
        }

        let enclosing = self
            .store
            .class_id(&binary_enclosing_name(self.store.class_name(class)))
            .filter(|_| self.store.class_name(class).contains('$'));

        let binary_name = self.store.class_name(class).to_string();
        self.store.define_class(
            class,
            ClassDef {
                name: binary_name,
                kind,
                flags,
                type_params: type_params.clone(),
                super_class: None,
                interfaces: Vec::new(),
                enclosing,
                nested: Vec::new(),
                fields: Vec::new(),
                constructors: Vec::new(),
                methods: Vec::new(),
            },
        );

        // Resolve bounds and the super clause inside the class's own
        // environment, so type parameters and nested names are visible.
        self.envs.push(TypeEnv::new(class, Some(decl_id)));

        for (index, &param) in type_params.iter().enumerate() {
            let (param_name, bound_refs) = {
                let p = &self.ast.type_decl(decl_id).type_params[index];
                (p.name.clone(), p.bounds.clone())
            };
            let mut bounds: Vec<Type> =
                bound_refs.iter().map(|&b| self.resolve_type_ref(b)).collect();
            if bounds.is_empty() {
                bounds.push(object_ty.clone());
            }
            self.store.define_type_param(
                param,
                TypeParamDef { name: param_name.as_str().to_string(), bounds },
            );
        }

        let extends_ref = self.ast.type_decl(decl_id).extends;
        let implement_refs = self.ast.type_decl(decl_id).implements.clone();

        let super_class = match extends_ref {
            Some(type_ref) if kind == ClassKind::Class => Some(self.resolve_type_ref(type_ref)),
            _ => None,
        };
        let super_class = match super_class {
            Some(ty) if !ty.is_error() => Some(ty),
            _ if class == self.store.well_known().object => None,
            _ => Some(object_ty.clone()),
        };
        let mut interfaces: Vec<Type> = implement_refs
            .iter()
            .map(|&i| self.resolve_type_ref(i))
            .filter(|ty| !ty.is_error())
            .collect();
        if kind == ClassKind::Interface {
            if let Some(type_ref) = extends_ref {
                let extended = self.resolve_type_ref(type_ref);
                if !extended.is_error() {
                    interfaces.insert(0, extended);
                }
            }
        }

        let enum_super = if kind == ClassKind::Enum {
            let enum_id = self.store.well_known().enum_;
            Some(Type::class(enum_id, vec![Type::class(class, vec![])]))
        } else {
            None
        };

        if let Some(def) = self.store.def_mut(class) {
            def.super_class = enum_super.or(super_class);
            def.interfaces = interfaces;
        }

        for nested_decl in nested {
            self.process_type_header(nested_decl);
            if let Some(nested_class) = self.ast.type_decl(nested_decl).symbol {
                if let Some(def) = self.store.def_mut(class) {
                    def.nested.push(nested_class);
                }
            }
        }

        self.envs.pop();
    }

    /// Phase 2: field and method signatures, no bodies.
    pub(crate) fn process_members(&mut self, decl_id: TypeDeclId) {
        let Some(class) = self.ast.type_decl(decl_id).symbol else {
            return;
        };
        if self
            .store
            .def(class)
            .map(|d| d.flags.contains(Flags::MEMBERS_PROCESSED))
            .unwrap_or(true)
        {
            return;
        }

        self.envs.push(TypeEnv::new(class, Some(decl_id)));

        let field_count = self.ast.type_decl(decl_id).fields.len();
        for index in 0..field_count {
            let (name, modifiers, ty_ref) = {
                let field = &self.ast.type_decl(decl_id).fields[index];
                (field.name.clone(), field.modifiers, field.ty)
            };
            let ty = self.resolve_type_ref(ty_ref);
            let field_id = {
                let def = match self.store.def_mut(class) {
                    Some(def) => def,
                    None => break,
                };
                let id = javelin_core::FieldId::new(class, def.fields.len() as u32);
                def.fields.push(FieldDef {
                    name: name.as_str().to_string(),
                    flags: modifiers,
                    ty,
                    constant_value: None,
                });
                id
            };
            self.ast.type_decl_mut(decl_id).fields[index].symbol = Some(field_id);
        }

        let method_count = self.ast.type_decl(decl_id).methods.len();
        for index in 0..method_count {
            self.process_method_header(decl_id, class, index);
        }

        // A class with no declared constructor gets the default one.
        let needs_default = {
            let def = self.store.def(class);
            def.map(|d| d.kind == ClassKind::Class && d.constructors.is_empty())
                .unwrap_or(false)
        };
        if needs_default {
            let visibility = self
                .store
                .def(class)
                .map(|d| d.flags & (Flags::PUBLIC | Flags::PROTECTED | Flags::PRIVATE))
                .unwrap_or(Flags::empty());
            if let Some(def) = self.store.def_mut(class) {
                def.constructors.push(MethodDef {
                    name: "<init>".to_string(),
                    flags: visibility,
                    type_params: vec![],
                    params: vec![],
                    return_type: Type::Void,
                    throws: vec![],
                    accessed: None,
                });
            }
        }

        if let Some(def) = self.store.def_mut(class) {
            def.flags |= Flags::MEMBERS_PROCESSED;
        }

        let nested = self.ast.type_decl(decl_id).nested.clone();
        for nested_decl in nested {
            self.process_members(nested_decl);
        }

        self.envs.pop();
    }

    fn process_method_header(&mut self, decl_id: TypeDeclId, class: ClassId, index: usize) {
        let (name, modifiers, is_constructor, type_param_count) = {
            let method = &self.ast.type_decl(decl_id).methods[index];
            (
                method.name.clone(),
                method.modifiers,
                method.is_constructor,
                method.type_params.len(),
            )
        };

        // Method type parameters scope over the signature; register them
        // before resolving parameter and return types.
        let object_ty = Type::class(self.store.well_known().object, vec![]);
        let mut type_params = Vec::with_capacity(type_param_count);
        for tp_index in 0..type_param_count {
            let tp_name =
                self.ast.type_decl(decl_id).methods[index].type_params[tp_index].name.clone();
            type_params.push(self.store.add_type_param(tp_name.as_str(), vec![object_ty.clone()]));
        }

        // Pre-register a skeleton so `find_type_parameter` sees the method
        // while its own signature resolves.
        let method_id = {
            let def = match self.store.def_mut(class) {
                Some(def) => def,
                None => return,
            };
            let skeleton = MethodDef {
                name: if is_constructor { "<init>".to_string() } else { name.as_str().to_string() },
                flags: modifiers,
                type_params: type_params.clone(),
                params: vec![],
                return_type: Type::Void,
                throws: vec![],
                accessed: None,
            };
            if is_constructor {
                let id = javelin_core::MethodId::constructor(class, def.constructors.len() as u32);
                def.constructors.push(skeleton);
                id
            } else {
                let id = javelin_core::MethodId::method(class, def.methods.len() as u32);
                def.methods.push(skeleton);
                id
            }
        };

        if let Some(env) = self.envs.top_mut() {
            env.enclosing_method = Some(method_id);
        }

        for (tp_index, &param) in type_params.iter().enumerate() {
            let (tp_name, bound_refs) = {
                let tp = &self.ast.type_decl(decl_id).methods[index].type_params[tp_index];
                (tp.name.clone(), tp.bounds.clone())
            };
            let mut bounds: Vec<Type> =
                bound_refs.iter().map(|&b| self.resolve_type_ref(b)).collect();
            if bounds.is_empty() {
                bounds.push(object_ty.clone());
            }
            self.store.define_type_param(
                param,
                TypeParamDef { name: tp_name.as_str().to_string(), bounds },
            );
        }

        let param_count = self.ast.type_decl(decl_id).methods[index].params.len();
        let mut params = Vec::with_capacity(param_count);
        let mut varargs = false;
        for p_index in 0..param_count {
            let (p_name, p_ty_ref, p_varargs) = {
                let p = &self.ast.type_decl(decl_id).methods[index].params[p_index];
                (p.name.clone(), p.ty, p.varargs)
            };
            let ty = self.resolve_type_ref(p_ty_ref);
            if p_varargs {
                varargs = true;
            }
            params.push(ParamDef { name: p_name.as_str().to_string(), ty });
        }

        let return_type = match self.ast.type_decl(decl_id).methods[index].return_type {
            Some(type_ref) if !is_constructor => self.resolve_type_ref(type_ref),
            _ => Type::Void,
        };

        let throws_refs = self.ast.type_decl(decl_id).methods[index].throws.clone();
        let throws: Vec<ThrowsEntry> = throws_refs
            .iter()
            .map(|&t| ThrowsEntry::Resolved(self.resolve_type_ref(t)))
            .collect();

        if let Some(def) = self.store.method_mut(method_id) {
            def.params = params;
            def.return_type = return_type;
            def.throws = throws;
            if varargs {
                def.flags |= Flags::VARARGS;
            }
        }
        if let Some(env) = self.envs.top_mut() {
            env.enclosing_method = None;
        }

        self.ast.type_decl_mut(decl_id).methods[index].symbol = Some(method_id);
    }

    /// Phase 3: inheritance closures. The expanded tables are built here
    /// (and then reused read-only), and obvious hierarchy mistakes
    /// surface.
    pub(crate) fn complete_symbol_table(&mut self, decl_id: TypeDeclId) {
        let Some(class) = self.ast.type_decl(decl_id).symbol else {
            return;
        };
        self.store.expanded_tables(class);

        let super_id = self
            .store
            .def(class)
            .and_then(|d| d.super_class.as_ref())
            .and_then(Type::class_id);
        if let Some(super_id) = super_id {
            let loaded = self.store.is_defined(super_id)
                || self
                    .classpath
                    .map(|cp| {
                        let name = self.store.class_name(super_id).to_string();
                        cp.type_exists(&name)
                    })
                    .unwrap_or(false);
            if !loaded {
                let name = self.store.class_name(super_id).to_string();
                let token = self.ast.type_decl(decl_id).token;
                self.report_bad_type(token, &name);
            }
        }

        let nested = self.ast.type_decl(decl_id).nested.clone();
        for nested_decl in nested {
            self.complete_symbol_table(nested_decl);
        }
    }

    /// Phase 4: statements and expressions.
    pub(crate) fn process_executable_bodies(&mut self, decl_id: TypeDeclId) {
        let Some(class) = self.ast.type_decl(decl_id).symbol else {
            return;
        };
        if self
            .store
            .def(class)
            .map(|d| d.flags.contains(Flags::COMPLETE))
            .unwrap_or(true)
        {
            return;
        }

        self.envs.push(TypeEnv::new(class, Some(decl_id)));

        // Field initializers, in declaration order.
        let field_count = self.ast.type_decl(decl_id).fields.len();
        for index in 0..field_count {
            self.process_field_initializer(decl_id, class, index);
        }

        // Instance and static initializer blocks.
        let initializers = {
            let decl = self.ast.type_decl(decl_id);
            decl.initializers.iter().map(|i| (i.is_static, i.body)).collect::<Vec<_>>()
        };
        for (is_static, body) in initializers {
            if let Some(env) = self.envs.top_mut() {
                env.static_region = is_static;
                env.blocks.push(BlockScope::default());
                env.next_local_slot = if is_static { 0 } else { 1 };
            }
            self.process_statement(body);
            if let Some(env) = self.envs.top_mut() {
                env.blocks.pop();
                env.static_region = false;
            }
        }

        // Method and constructor bodies.
        let method_count = self.ast.type_decl(decl_id).methods.len();
        for index in 0..method_count {
            self.process_method_body(decl_id, class, index);
        }

        if let Some(def) = self.store.def_mut(class) {
            def.flags |= Flags::COMPLETE;
            def.flags &= !Flags::SOURCE_PENDING;
        }

        // The class's captures are now known; patch any constructor call
        // recorded before completion.
        self.patch_local_ctor_calls(class);

        let nested = self.ast.type_decl(decl_id).nested.clone();
        for nested_decl in nested {
            self.process_executable_bodies(nested_decl);
        }

        self.envs.pop();
    }

    fn process_field_initializer(&mut self, decl_id: TypeDeclId, class: ClassId, index: usize) {
        let (name, modifiers, init, field_id, token) = {
            let field = &self.ast.type_decl(decl_id).fields[index];
            (field.name.clone(), field.modifiers, field.init, field.symbol, field.token)
        };
        let Some(field_id) = field_id else {
            return;
        };

        if let Some(init) = init {
            if let Some(env) = self.envs.top_mut() {
                env.static_region = modifiers.is_static();
            }

            // Track final-field initialisation in progress for cycles.
            if self.fields_in_progress.contains(&field_id) {
                self.report(
                    SemanticErrorKind::CircularInitializer,
                    token,
                    format!("the initializer of {name} depends on itself"),
                );
                return;
            }
            self.fields_in_progress.push(field_id);

            let declared = self
                .store
                .field(field_id)
                .map(|f| f.ty.clone())
                .unwrap_or(Type::Error);
            if let Type::Array(element) = &declared {
                if matches!(
                    self.ast.expr(init).kind,
                    javelin_syntax::ExprKind::ArrayInit { .. }
                ) {
                    let element = (**element).clone();
                    self.process_array_initializer(init, &element);
                } else {
                    self.process_expression(init);
                    self.convert_to_type(init, &declared);
                }
            } else {
                let init_ty = self.process_expression(init);
                let value = self.ast.expr(init).value.clone();
                match javelin_types::assignment_conversion_with_const(
                    &self.store,
                    &init_ty,
                    &declared,
                    value.as_ref(),
                ) {
                    Some(_) => {
                        self.convert_to_type(init, &declared);
                    }
                    None if !init_ty.is_error() && !declared.is_error() => {
                        self.report(
                            SemanticErrorKind::IncompatibleTypes,
                            token,
                            format!(
                                "cannot convert from {} to {}",
                                init_ty.display(&self.store),
                                declared.display(&self.store)
                            ),
                        );
                    }
                    None => {}
                }
            }

            // A static final field with a constant initializer becomes a
            // compile-time constant.
            if modifiers.is_final() {
                let value = self.ast.expr(init).value.clone();
                if let Some(value) = value {
                    if let Some(def) = self.store.def_mut(class) {
                        if let Some(field) = def.fields.get_mut(index) {
                            field.constant_value = Some(value);
                        }
                    }
                }
            }

            self.fields_in_progress.pop();
            if let Some(env) = self.envs.top_mut() {
                env.static_region = false;
            }
        }

        if let Some(env) = self.envs.top_mut() {
            env.initialized_fields.push(name);
        }
    }

    pub(crate) fn process_method_body(
        &mut self,
        decl_id: TypeDeclId,
        class: ClassId,
        index: usize,
    ) {
        let (method_id, body, is_static, param_count) = {
            let method = &self.ast.type_decl(decl_id).methods[index];
            (
                method.symbol,
                method.body,
                method.modifiers.is_static(),
                method.params.len(),
            )
        };
        let (Some(method_id), Some(body)) = (method_id, body) else {
            return;
        };

        if let Some(env) = self.envs.top_mut() {
            env.static_region = is_static;
            env.enclosing_method = Some(method_id);
            env.blocks.push(BlockScope::default());
            env.next_local_slot = if is_static { 0 } else { 1 };
        }

        for p_index in 0..param_count {
            let (p_name, p_token) = {
                let p = &self.ast.type_decl(decl_id).methods[index].params[p_index];
                (p.name.clone(), p.token)
            };
            let _ = p_token;
            let ty = self
                .store
                .method(method_id)
                .and_then(|m| m.params.get(p_index))
                .map(|p| p.ty.clone())
                .unwrap_or(Type::Error);
            let slot = self.envs.top().map(|e| e.next_local_slot).unwrap_or(0);
            let wide = matches!(
                ty,
                Type::Primitive(javelin_types::PrimitiveType::Long)
                    | Type::Primitive(javelin_types::PrimitiveType::Double)
            );
            let local = self.locals.alloc(LocalData {
                name: p_name.clone(),
                ty,
                flags: Flags::empty(),
                slot,
                value: None,
                owner: class,
                accessed_local: None,
            });
            if let Some(env) = self.envs.top_mut() {
                env.next_local_slot += if wide { 2 } else { 1 };
                env.declare_local(p_name, local);
            }
            self.ast.type_decl_mut(decl_id).methods[index].params[p_index].symbol = Some(local);
        }

        self.process_statement(body);

        if let Some(env) = self.envs.top_mut() {
            env.blocks.pop();
            env.static_region = false;
            env.enclosing_method = None;
        }
    }
}

fn binary_enclosing_name(binary: &str) -> String {
    match binary.rfind('$') {
        Some(index) => binary[..index].to_string(),
        None => binary.to_string(),
    }
}
