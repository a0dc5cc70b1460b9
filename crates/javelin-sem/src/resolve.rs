//! Name resolution: the JLS 6.5.2 reclassification cascade.
//!
//! A simple name is, in order: a local/scoped variable, a field of an
//! enclosing class (with inherited shadows and conflicts), a statically
//! imported member, a type, or a package. The first enclosing scope that
//! declares any variable of the name wins the lookup outright; there is no
//! cross-class fallthrough past it. Qualified names classify their
//! qualifier first and look the selector up inside it.

use javelin_core::{ClassId, ExprId, LocalId, Name, TokenIndex};
use javelin_types::{
    member_type_in, resolve_field, resolve_nested_type, FieldResolution, Flags, Symbol, Type,
};

use crate::errors::SemanticErrorKind;
use crate::semantic::Semantic;
use crate::spell;

/// A variable found in the environment: the winning symbol, how many type
/// scopes out it lives, and the same-name declarations it hides.
pub(crate) struct FoundVar {
    pub symbol: Symbol,
    pub depth: usize,
    pub conflicts: Vec<javelin_core::FieldId>,
}

impl<'a> Semantic<'a> {
    /// Walk the stack of enclosing blocks and types for a variable named
    /// `name`. The first scope that declares one wins.
    pub(crate) fn find_variable_in_environment(&mut self, name: &Name) -> Option<FoundVar> {
        let depth_count = self.envs.len();
        for depth in 0..depth_count {
            let class = {
                let env = self.envs.get(depth)?;
                if let Some(local) = env.find_local(name) {
                    return Some(FoundVar {
                        symbol: Symbol::Local(local),
                        depth,
                        conflicts: Vec::new(),
                    });
                }
                env.class
            };

            let tables = self.store.expanded_tables(class);
            if let Some(shadow) = tables.field(name.as_str()) {
                // Enclosing scopes see even private members; accessibility
                // was decided by scope nesting, not flags.
                return Some(FoundVar {
                    symbol: Symbol::Field(shadow.field),
                    depth,
                    conflicts: shadow.conflicts.clone(),
                });
            }
        }
        None
    }

    /// Resolve a simple (unqualified) ambiguous name in expression
    /// position, filling the node's annotation slots. Returns the static
    /// type.
    pub(crate) fn resolve_simple_name(&mut self, expr: ExprId, name: Name) -> Type {
        let token = self.ast.expr(expr).token;

        // 1. Local / scoped variable / inherited field.
        if let Some(found) = self.find_variable_in_environment(&name) {
            return self.finish_variable(expr, name, found, token);
        }

        // 2. Static imports: field, then nested type, then static method.
        if let Some(symbol) = self.probe_static_imports(&name, token, false) {
            match symbol {
                Symbol::Field(field) => {
                    let ty = self
                        .store
                        .field(field)
                        .map(|f| f.ty.clone())
                        .unwrap_or(Type::Error);
                    self.note_member_use(symbol, token);
                    let node = self.ast.expr_mut(expr);
                    node.symbol = Some(symbol);
                    node.ty = Some(ty.clone());
                    if let Some(f) = self.store.field(field) {
                        self.ast.expr_mut(expr).value = f.constant_value.clone();
                    }
                    return ty;
                }
                Symbol::Class(class) => {
                    let node = self.ast.expr_mut(expr);
                    node.symbol = Some(Symbol::Class(class));
                    node.ty = Some(Type::class(class, vec![]));
                    return Type::class(class, vec![]);
                }
                _ => {}
            }
        }

        // 3. Type lookup.
        if let Some(class) = self.find_type_by_simple_name(&name, token) {
            let node = self.ast.expr_mut(expr);
            node.symbol = Some(Symbol::Class(class));
            node.ty = Some(Type::class(class, vec![]));
            return Type::class(class, vec![]);
        }

        // 4. Package fallback.
        let root = self.packages.root();
        if let Some(package) = self.packages.find_subpackage(root, &name, self.classpath) {
            let node = self.ast.expr_mut(expr);
            node.symbol = Some(Symbol::Package(package));
            node.ty = Some(Type::Error);
            return Type::Error;
        }

        // 5. Rich not-found diagnostic.
        self.report_variable_not_found(&name, token);
        self.ast.expr_mut(expr).ty = Some(Type::Error);
        Type::Error
    }

    fn finish_variable(
        &mut self,
        expr: ExprId,
        name: Name,
        found: FoundVar,
        token: TokenIndex,
    ) -> Type {
        // Hiding is fine; a conflict declared in an unrelated supertype is
        // an ambiguity.
        if let Symbol::Field(preferred) = found.symbol {
            for conflict in &found.conflicts {
                let hidden = {
                    let sub = Type::class(preferred.class, vec![]);
                    let sup = Type::class(conflict.class, vec![]);
                    javelin_types::is_subtype(&self.store, &sub, &sup)
                };
                if !hidden {
                    self.report(
                        SemanticErrorKind::AmbiguousField,
                        token,
                        format!("the field {name} is inherited from more than one supertype"),
                    );
                    break;
                }
            }
        }

        match found.symbol {
            Symbol::Local(local) => {
                let local = if found.depth > 0 {
                    self.capture_outer_local(local, token)
                } else {
                    local
                };
                let data = self.locals.get(local).clone();
                let node = self.ast.expr_mut(expr);
                node.symbol = Some(Symbol::Local(local));
                node.ty = Some(data.ty.clone());
                node.value = data.value;
                data.ty
            }
            Symbol::Field(field) => {
                let Some(field_def) = self.store.field(field).cloned() else {
                    self.ast.expr_mut(expr).ty = Some(Type::Error);
                    return Type::Error;
                };

                let env_class = self.envs.get(found.depth).map(|env| env.class);
                self.check_instance_context(&field_def.flags, token, &name);
                if found.depth == 0 {
                    self.check_forward_reference(&name, field, token);
                }

                // Substitution through the inheritance chain when the field
                // came from a generic supertype.
                let receiver = env_class
                    .map(|class| self.self_view(class))
                    .unwrap_or(Type::Error);
                let declared = field_def.ty.clone();
                let resolved = member_type_in(&self.store, &receiver, field.class, &declared);

                self.note_member_use(Symbol::Field(field), token);

                // Reaching a private member of an outer class goes through
                // a synthetic accessor on the declaring type.
                let mut symbol = Symbol::Field(field);
                if let Some(from) = self.this_type() {
                    if self.needs_accessor(field_def.flags, field.class, from) {
                        let accessor = self.read_field_accessor(field, field.class);
                        symbol = Symbol::Method(accessor);
                    }
                }

                let node = self.ast.expr_mut(expr);
                node.symbol = Some(symbol);
                node.ty = Some(resolved.clone());
                if resolved != declared {
                    node.resolved_type = Some(resolved.erasure(&self.store));
                    if resolved.is_parameterized() {
                        node.resolved_parameterized_type = Some(resolved.clone());
                    }
                }
                node.value = field_def.constant_value.clone();
                resolved
            }
            _ => Type::Error,
        }
    }

    /// The class viewed from inside itself: its own type parameters as
    /// arguments, so substitution through supertypes works unchanged.
    pub(crate) fn self_view(&self, class: ClassId) -> Type {
        let args = self
            .store
            .def(class)
            .map(|def| def.type_params.iter().map(|&p| Type::TypeVar(p)).collect())
            .unwrap_or_default();
        Type::class(class, args)
    }

    /// Instance member referenced in a static region or explicit
    /// constructor invocation.
    fn check_instance_context(&mut self, flags: &Flags, token: TokenIndex, name: &Name) {
        let Some(env) = self.envs.top() else {
            return;
        };
        if flags.is_static() {
            return;
        }
        if env.in_explicit_ctor {
            self.report(
                SemanticErrorKind::InstanceInExplicitCtorCall,
                token,
                format!("cannot refer to the instance member {name} in an explicit constructor invocation"),
            );
        } else if env.static_region {
            self.report(
                SemanticErrorKind::InstanceInStaticRegion,
                token,
                format!("cannot make a static reference to the instance member {name}"),
            );
        }
    }

    /// Forward reference to a field declared later in the same class.
    fn check_forward_reference(&mut self, name: &Name, field: javelin_core::FieldId, token: TokenIndex) {
        let Some(env) = self.envs.top() else {
            return;
        };
        if env.enclosing_method.is_some() {
            return; // only initializers are restricted
        }
        let own_class = env.class == field.class;
        if own_class
            && !env.initialized_fields.iter().any(|n| n == name)
            && self.fields_in_progress.last().map(|f| *f != field).unwrap_or(false)
        {
            self.report(
                SemanticErrorKind::ForwardReference,
                token,
                format!("illegal forward reference to field {name}"),
            );
        }
    }

    /// A local of an enclosing method referenced from a local or anonymous
    /// class: must be final; non-constant finals go through a `val$`
    /// shadow on the outermost local class in scope.
    fn capture_outer_local(&mut self, local: LocalId, token: TokenIndex) -> LocalId {
        let data = self.locals.get(local).clone();
        if !data.flags.is_final() {
            let name = data.name.clone();
            self.report(
                SemanticErrorKind::NonFinalLocalCaptured,
                token,
                format!("local variable {name} is accessed from within an inner class and must be final"),
            );
            return local;
        }
        if data.value.is_some() {
            // Compile-time constants are inlined, not captured.
            return local;
        }
        let Some(this_type) = self.this_type() else {
            return local;
        };
        self.find_local_shadow(local, this_type)
    }

    // -- static imports ---------------------------------------------------

    /// The §6.5.2 static-import probe: single imports first, then
    /// on-demand; per type a field, then a nested type, then (when
    /// `want_method`) a static method. Ambiguity across on-demand imports
    /// is reported.
    pub(crate) fn probe_static_imports(
        &mut self,
        name: &Name,
        token: TokenIndex,
        want_method: bool,
    ) -> Option<Symbol> {
        let singles = self.imports.single_static.clone();
        for import in &singles {
            if &import.member != name {
                continue;
            }
            let ty = import.imported_type;
            if self.store.def(ty).map(|d| d.flags.is_bad()).unwrap_or(true) {
                continue;
            }
            if let Some(symbol) = self.static_member_of(ty, name, want_method) {
                return Some(symbol);
            }
        }

        let on_demand = self.imports.static_on_demand.clone();
        let mut found: Option<Symbol> = None;
        for ty in on_demand {
            if self.store.def(ty).map(|d| d.flags.is_bad()).unwrap_or(true) {
                continue;
            }
            let Some(symbol) = self.static_member_of(ty, name, want_method) else {
                continue;
            };
            match found {
                None => found = Some(symbol),
                Some(previous) if previous != symbol => {
                    let kind = match symbol {
                        Symbol::Class(_) => SemanticErrorKind::AmbiguousType,
                        _ => SemanticErrorKind::AmbiguousField,
                    };
                    self.report(
                        kind,
                        token,
                        format!("the static import of {name} is ambiguous"),
                    );
                    return found;
                }
                Some(_) => {}
            }
        }
        found
    }

    fn static_member_of(&mut self, ty: ClassId, name: &Name, want_method: bool) -> Option<Symbol> {
        let tables = self.store.expanded_tables(ty);
        if let Some(shadow) = tables.field(name.as_str()) {
            let is_static = self
                .store
                .field(shadow.field)
                .map(|f| f.flags.is_static())
                .unwrap_or(false);
            if is_static {
                return Some(Symbol::Field(shadow.field));
            }
        }
        if let Some(nested) = tables.nested_type(name.as_str()) {
            let is_static = self
                .store
                .def(nested.class)
                .map(|d| d.flags.is_static())
                .unwrap_or(false);
            if is_static {
                return Some(Symbol::Class(nested.class));
            }
        }
        if want_method {
            for shadow in tables.overloads(name.as_str()) {
                let is_static = self
                    .store
                    .method(shadow.method)
                    .map(|m| m.flags.is_static())
                    .unwrap_or(false);
                if is_static {
                    return Some(Symbol::Method(shadow.method));
                }
            }
        }
        None
    }

    // -- diagnostics ------------------------------------------------------

    /// The rich not-found report: misspelling, inaccessible member, or a
    /// method of the same name.
    pub(crate) fn report_variable_not_found(&mut self, name: &Name, token: TokenIndex) {
        let Some(class) = self.this_type() else {
            self.report(
                SemanticErrorKind::NotFoundVariable,
                token,
                format!("{name} cannot be resolved to a variable"),
            );
            return;
        };

        let tables = self.store.expanded_tables(class);
        let field_names: Vec<String> = tables.fields.keys().cloned().collect();
        let has_method_of_name = !tables.overloads(name.as_str()).is_empty();
        drop(tables);

        if has_method_of_name {
            self.report(
                SemanticErrorKind::MethodNotField,
                token,
                format!("{name} is a method, not a field; did you mean {name}()?"),
            );
            return;
        }

        let suggestion = spell::best_match(name.as_str(), field_names.iter().map(String::as_str));
        let message = match &suggestion {
            Some(better) => {
                format!("{name} cannot be resolved to a variable; did you mean {better}?")
            }
            None => format!("{name} cannot be resolved to a variable"),
        };
        let mut args = vec![name.as_str().to_string()];
        args.extend(suggestion);
        self.report_with_args(SemanticErrorKind::NotFoundVariable, token, message, args);
    }

    // -- qualified selectors ----------------------------------------------

    /// `qualifier.name` where the qualifier has already been classified.
    /// Returns the static type of the selector expression.
    pub(crate) fn resolve_selector(
        &mut self,
        expr: ExprId,
        qualifier: ExprId,
        name: Name,
    ) -> Type {
        let token = self.ast.expr(expr).token;
        let qualifier_symbol = self.ast.expr(qualifier).symbol;

        match qualifier_symbol {
            Some(Symbol::Package(package)) => {
                // A subpackage, or a type (reading its class file if the
                // classpath has one).
                if let Some(class) =
                    self.packages
                        .find_type(package, &name, &mut self.store, self.classpath)
                {
                    let node = self.ast.expr_mut(expr);
                    node.symbol = Some(Symbol::Class(class));
                    node.ty = Some(Type::class(class, vec![]));
                    return Type::class(class, vec![]);
                }
                if let Some(sub) = self.packages.find_subpackage(package, &name, self.classpath) {
                    let node = self.ast.expr_mut(expr);
                    node.symbol = Some(Symbol::Package(sub));
                    node.ty = Some(Type::Error);
                    return Type::Error;
                }
                let dotted = self.packages.name(package).to_string();
                self.report(
                    SemanticErrorKind::NotFoundType,
                    token,
                    format!("{dotted}.{name} cannot be resolved"),
                );
                self.ast.expr_mut(expr).ty = Some(Type::Error);
                Type::Error
            }
            Some(Symbol::Class(class)) => {
                // Nested type, then static field.
                if let Some(nested) = resolve_nested_type(&mut self.store, class, name.as_str()) {
                    let node = self.ast.expr_mut(expr);
                    node.symbol = Some(Symbol::Class(nested));
                    node.ty = Some(Type::class(nested, vec![]));
                    return Type::class(nested, vec![]);
                }
                let receiver = Type::class(class, vec![]);
                match resolve_field(&mut self.store, &receiver, name.as_str()) {
                    FieldResolution::Found(found) => {
                        let Some(field) = found.field else {
                            self.ast.expr_mut(expr).ty = Some(found.ty.clone());
                            return found.ty;
                        };
                        let flags = self
                            .store
                            .field(field)
                            .map(|f| f.flags)
                            .unwrap_or_default();
                        if !flags.is_static() {
                            self.report(
                                SemanticErrorKind::InstanceInStaticRegion,
                                token,
                                format!("cannot make a static reference to the instance field {name}"),
                            );
                        }
                        self.finish_qualified_field(expr, field, found.ty, receiver, token)
                    }
                    FieldResolution::Ambiguous(_) => {
                        self.report(
                            SemanticErrorKind::AmbiguousField,
                            token,
                            format!("the field {name} is ambiguous"),
                        );
                        self.ast.expr_mut(expr).ty = Some(Type::Error);
                        Type::Error
                    }
                    FieldResolution::NotFound => {
                        self.report_missing_member(class, &name, token);
                        self.ast.expr_mut(expr).ty = Some(Type::Error);
                        Type::Error
                    }
                }
            }
            _ => {
                // Expression qualifier: an instance field of its type.
                // Prefer the parameterised resolved type for the receiver,
                // so chained generic accesses keep substituting.
                let receiver = self
                    .ast
                    .expr(qualifier)
                    .resolved_parameterized_type
                    .clone()
                    .or_else(|| self.ast.expr(qualifier).ty.clone())
                    .unwrap_or(Type::Error);
                if receiver.is_error() {
                    self.ast.expr_mut(expr).ty = Some(Type::Error);
                    return Type::Error;
                }
                match resolve_field(&mut self.store, &receiver, name.as_str()) {
                    FieldResolution::Found(found) => match found.field {
                        Some(field) => {
                            self.finish_qualified_field(expr, field, found.ty, receiver, token)
                        }
                        None => {
                            // Array length.
                            let node = self.ast.expr_mut(expr);
                            node.ty = Some(found.ty.clone());
                            found.ty
                        }
                    },
                    FieldResolution::Ambiguous(_) => {
                        self.report(
                            SemanticErrorKind::AmbiguousField,
                            token,
                            format!("the field {name} is ambiguous"),
                        );
                        self.ast.expr_mut(expr).ty = Some(Type::Error);
                        Type::Error
                    }
                    FieldResolution::NotFound => {
                        if let Some(class) = receiver.erasure(&self.store).class_id() {
                            self.report_missing_member(class, &name, token);
                        } else {
                            self.report(
                                SemanticErrorKind::NotFoundVariable,
                                token,
                                format!("{name} cannot be resolved"),
                            );
                        }
                        self.ast.expr_mut(expr).ty = Some(Type::Error);
                        Type::Error
                    }
                }
            }
        }
    }

    fn finish_qualified_field(
        &mut self,
        expr: ExprId,
        field: javelin_core::FieldId,
        resolved_ty: Type,
        _receiver: Type,
        token: TokenIndex,
    ) -> Type {
        let Some(field_def) = self.store.field(field).cloned() else {
            self.ast.expr_mut(expr).ty = Some(Type::Error);
            return Type::Error;
        };

        let mut symbol = Symbol::Field(field);
        if let Some(from) = self.this_type() {
            if !self.member_accessible(field_def.flags, field.class, from) {
                let name = field_def.name.clone();
                self.report(
                    SemanticErrorKind::AccessViolation,
                    token,
                    format!("the field {name} is not accessible"),
                );
            } else if self.needs_accessor(field_def.flags, field.class, from) {
                symbol = Symbol::Method(self.read_field_accessor(field, field.class));
            }
        }
        self.note_member_use(Symbol::Field(field), token);

        let declared = field_def.ty.clone();
        let node = self.ast.expr_mut(expr);
        node.symbol = Some(symbol);
        node.ty = Some(resolved_ty.clone());
        node.value = field_def.constant_value;
        if resolved_ty != declared {
            node.resolved_type = Some(resolved_ty.erasure(&self.store));
            if resolved_ty.is_parameterized() {
                node.resolved_parameterized_type = Some(resolved_ty.clone());
            }
        }
        resolved_ty
    }

    pub(crate) fn report_missing_member(&mut self, class: ClassId, name: &Name, token: TokenIndex) {
        let tables = self.store.expanded_tables(class);
        let field_names: Vec<String> = tables.fields.keys().cloned().collect();
        let has_method = !tables.overloads(name.as_str()).is_empty();
        drop(tables);
        let class_name = self.store.class_name(class).to_string();

        if has_method {
            self.report(
                SemanticErrorKind::MethodNotField,
                token,
                format!("{name} is a method of {class_name}, not a field"),
            );
            return;
        }
        let suggestion = spell::best_match(name.as_str(), field_names.iter().map(String::as_str));
        let message = match &suggestion {
            Some(better) => {
                format!("{name} cannot be resolved in {class_name}; did you mean {better}?")
            }
            None => format!("{name} cannot be resolved in {class_name}"),
        };
        self.report(SemanticErrorKind::NotFoundVariable, token, message);
    }
}
