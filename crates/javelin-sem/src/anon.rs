//! Anonymous and local class synthesis.
//!
//! An anonymous class is implicitly final with exactly one direct super:
//! extending a class keeps it as the superclass, implementing an interface
//! makes `Object` the superclass and the interface the single direct
//! superinterface. The synthesised default constructor forwards its
//! parameters to the resolved super constructor; when the creation has an
//! enclosing-instance base (`expr.new Super() {...}`) the base routes
//! through a fresh first parameter.

use javelin_core::{ClassId, ExprId, TokenIndex};
use javelin_syntax::TypeDeclId;
use javelin_types::{
    resolve_constructor_call, ClassDef, ClassKind, Flags, MethodDef, MethodResolution, ParamDef,
    Symbol, Type,
};

use crate::errors::SemanticErrorKind;
use crate::scope::TypeEnv;
use crate::semantic::Semantic;

impl<'a> Semantic<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn process_anonymous_creation(
        &mut self,
        expr: ExprId,
        created: &Type,
        body: TypeDeclId,
        arg_ids: &[ExprId],
        arg_types: &[Type],
        enclosing_base: Option<ExprId>,
        token: TokenIndex,
    ) -> Type {
        let Some(this_class) = self.this_type() else {
            return Type::Error;
        };
        let Some(super_id) = created.erasure(&self.store).class_id() else {
            return Type::Error;
        };

        // Anonymous types number per outermost type: Outer$1, Outer$2, ...
        let outermost = self.outermost_type(this_class);
        let counter = self.anon_counters.entry(outermost).or_insert(0);
        *counter += 1;
        let name = format!("{}${}", self.store.class_name(outermost), counter);

        let super_is_interface = self
            .store
            .def(super_id)
            .map(ClassDef::is_interface)
            .unwrap_or(false);
        let object = self.store.well_known().object;
        let (super_class, interfaces) = if super_is_interface {
            if !arg_types.is_empty() {
                self.report(
                    SemanticErrorKind::NotFoundConstructor,
                    token,
                    "an anonymous class implementing an interface takes no constructor arguments",
                );
            }
            (Type::class(object, vec![]), vec![created.clone()])
        } else {
            (created.clone(), vec![])
        };

        let static_region = self.envs.top().map(|e| e.static_region).unwrap_or(false);
        let mut flags = Flags::FINAL | Flags::ANONYMOUS | Flags::LOCAL | Flags::HEADER_PROCESSED;
        if static_region {
            flags |= Flags::STATIC;
        }

        let anon = self.store.add_class(ClassDef {
            name,
            kind: ClassKind::Class,
            flags,
            type_params: vec![],
            super_class: Some(super_class.clone()),
            interfaces,
            enclosing: Some(this_class),
            nested: vec![],
            fields: vec![],
            constructors: vec![],
            methods: vec![],
        });
        self.ast.type_decl_mut(body).symbol = Some(anon);
        self.class_decl.insert(anon, body);
        if let Some(def) = self.store.def_mut(this_class) {
            def.nested.push(anon);
        }

        // Resolve the super constructor against the creation arguments;
        // the synthesised constructor mirrors its parameter list.
        let mut ctor_params: Vec<ParamDef> = Vec::new();
        let mut super_ctor = None;
        if !super_is_interface {
            match resolve_constructor_call(&mut self.store, &super_class, arg_types) {
                MethodResolution::Found(found) => {
                    for (index, ty) in found.params.iter().enumerate() {
                        ctor_params.push(ParamDef { name: format!("${index}"), ty: ty.clone() });
                    }
                    super_ctor = Some(found.method);
                }
                MethodResolution::Ambiguous(_) => {
                    self.report(
                        SemanticErrorKind::AmbiguousMethod,
                        token,
                        "the super constructor invocation is ambiguous",
                    );
                }
                MethodResolution::NotFound(_) => {
                    if !arg_types.iter().any(Type::is_error) {
                        self.report(
                            SemanticErrorKind::NotFoundConstructor,
                            token,
                            format!(
                                "no constructor of {} matches the arguments",
                                super_class.display(&self.store)
                            ),
                        );
                    }
                }
            }
        }

        // An explicit enclosing base becomes a fresh first parameter so the
        // emitter can route it to the super constructor's own `this$0`.
        if let Some(base) = enclosing_base {
            let base_ty = self.ast.expr(base).ty.clone().unwrap_or(Type::Error);
            ctor_params.insert(0, ParamDef { name: "$base".to_string(), ty: base_ty });
        }

        let ctor = MethodDef {
            name: "<init>".to_string(),
            flags: Flags::empty(),
            type_params: vec![],
            params: ctor_params,
            return_type: Type::Void,
            throws: super_ctor
                .and_then(|m| self.store.method(m))
                .map(|m| m.throws.clone())
                .unwrap_or_default(),
            accessed: None,
        };
        let ctor_id = self
            .store
            .add_synthetic_constructor(anon, ctor)
            .unwrap_or(javelin_core::MethodId::constructor(anon, 0));

        // Convert the creation arguments against the forwarded super
        // parameters before synthesis appends captures; the `$base` slot,
        // if any, is routed separately.
        let param_types: Vec<Type> = self
            .store
            .method(ctor_id)
            .map(|m| {
                m.params
                    .iter()
                    .filter(|p| p.name != "$base")
                    .map(|p| p.ty.clone())
                    .collect()
            })
            .unwrap_or_default();
        for (&arg, target) in arg_ids.iter().zip(param_types.iter()) {
            let target = target.clone();
            self.convert_to_type(arg, &target);
        }

        // In a non-static context the anonymous class captures the
        // enclosing instance like any inner class.
        if !static_region {
            self.ensure_enclosing_instance(anon);
        }

        // Members declared in the body.
        self.process_members(body);
        self.process_anonymous_bodies(body, anon);

        let node = self.ast.expr_mut(expr);
        node.symbol = Some(Symbol::Method(ctor_id));
        node.ty = Some(Type::class(anon, vec![]));
        if created.is_parameterized() {
            node.resolved_parameterized_type = Some(created.clone());
        }
        Type::class(anon, vec![])
    }

    /// Anonymous bodies run inside a fresh environment nested in the
    /// current one, so captured locals of the enclosing method stay
    /// visible through the environment stack.
    fn process_anonymous_bodies(&mut self, body: TypeDeclId, anon: ClassId) {
        self.envs.push(TypeEnv::new(anon, Some(body)));

        let field_count = self.ast.type_decl(body).fields.len();
        for index in 0..field_count {
            self.process_anon_field(body, anon, index);
        }
        let method_count = self.ast.type_decl(body).methods.len();
        for index in 0..method_count {
            self.process_method_body(body, anon, index);
        }

        if let Some(def) = self.store.def_mut(anon) {
            def.flags |= Flags::COMPLETE | Flags::MEMBERS_PROCESSED;
        }
        self.patch_local_ctor_calls(anon);
        self.envs.pop();
    }

    fn process_anon_field(&mut self, decl_id: TypeDeclId, class: ClassId, index: usize) {
        let (modifiers, init, field_id, token) = {
            let field = &self.ast.type_decl(decl_id).fields[index];
            (field.modifiers, field.init, field.symbol, field.token)
        };
        let (Some(init), Some(field_id)) = (init, field_id) else {
            return;
        };
        if let Some(env) = self.envs.top_mut() {
            env.static_region = modifiers.is_static();
        }
        let declared = self
            .store
            .field(field_id)
            .map(|f| f.ty.clone())
            .unwrap_or(Type::Error);
        let init_ty = self.process_expression(init);
        if !init_ty.is_error() && !declared.is_error() {
            let value = self.ast.expr(init).value.clone();
            if javelin_types::assignment_conversion_with_const(
                &self.store,
                &init_ty,
                &declared,
                value.as_ref(),
            )
            .is_none()
            {
                self.report(
                    SemanticErrorKind::IncompatibleTypes,
                    token,
                    format!(
                        "cannot convert from {} to {}",
                        init_ty.display(&self.store),
                        declared.display(&self.store)
                    ),
                );
            } else {
                self.convert_to_type(init, &declared);
            }
        }
        if let Some(env) = self.envs.top_mut() {
            env.static_region = false;
        }
    }
}
