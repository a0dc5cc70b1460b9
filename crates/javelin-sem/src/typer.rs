//! The expression and statement typer.
//!
//! Walks executable code, applying numeric promotion, boxing, string
//! conversion and constant folding, binding every call to a method and
//! every name to a symbol, and materialising the implicit conversions as
//! explicit nodes for the bytecode emitter. Every error stamps the node
//! with `Type::Error` and keeps going.

use javelin_core::{ClassId, ExprId, MethodId, Name, StmtId, TokenIndex};
use javelin_core::name::synthetic;
use javelin_syntax::{BinaryOpKind, ExprKind, Lit, StmtKind, UnaryOpKind};
use javelin_types::{
    assignment_conversion_with_const, binary_numeric_promotion, cast_conversion, fits_in_primitive,
    fold_binary, fold_shift, fold_unary, is_subtype, method_invocation_conversion,
    resolve_constructor_call, resolve_method_call, unary_numeric_promotion, unboxed_primitive,
    ArithOp, CallKind, ConstValue, Conversion, FieldDef, Flags, MethodCall, MethodResolution,
    PrimitiveType, ShiftOp, Symbol, ThrowsEntry, Type, TypeWarning, UnaryOp as FoldUnaryOp,
    UncheckedReason, WildcardBound,
};

use crate::errors::SemanticErrorKind;
use crate::semantic::{Semantic, TargetRelease};

impl<'a> Semantic<'a> {
    // -- conversions ------------------------------------------------------

    /// Materialise a conversion of `expr` to `target` as a synthetic node.
    /// Idempotent: an expression already of the target type is returned
    /// unchanged, as is anything involving the error sentinel.
    pub(crate) fn convert_to_type(&mut self, expr: ExprId, target: &Type) -> ExprId {
        let current = self.ast.expr(expr).ty.clone().unwrap_or(Type::Error);
        if &current == target || current.is_error() || target.is_error() {
            return expr;
        }
        let Some(conversion) = method_invocation_conversion(&self.store, &current, target)
            .or_else(|| cast_conversion(&self.store, &current, target))
        else {
            return expr;
        };
        self.apply_conversion(expr, target, conversion)
    }

    fn apply_conversion(&mut self, expr: ExprId, target: &Type, conversion: Conversion) -> ExprId {
        if conversion.is_identity() {
            // Same erasure; just refine the recorded type.
            self.ast.expr_mut(expr).ty = Some(target.clone());
            return expr;
        }
        let token = self.ast.expr(expr).token;
        let value = self
            .ast
            .expr(expr)
            .value
            .clone()
            .and_then(|v| cast_constant(&v, target));
        let node = self.ast.alloc_expr(
            ExprKind::Conversion { operand: expr, to: target.clone(), steps: conversion.steps },
            token,
        );
        let out = self.ast.expr_mut(node);
        out.ty = Some(target.clone());
        out.value = value;
        node
    }

    fn report_conversion_warnings(&mut self, warnings: &[TypeWarning], token: TokenIndex) {
        for warning in warnings {
            match warning {
                TypeWarning::Unchecked(UncheckedReason::UncheckedCast) => self.report(
                    SemanticErrorKind::UncheckedCast,
                    token,
                    "unchecked cast to a parameterized type",
                ),
                TypeWarning::Unchecked(UncheckedReason::RawConversion) => self.report(
                    SemanticErrorKind::UncheckedConversion,
                    token,
                    "unchecked conversion between raw and parameterized type",
                ),
                TypeWarning::StaticAccessViaInstance => self.report(
                    SemanticErrorKind::StaticViaInstance,
                    token,
                    "static member accessed via an instance reference",
                ),
                TypeWarning::Deprecated => {}
            }
        }
    }

    // -- expressions ------------------------------------------------------

    /// Type one expression, filling its annotation slots. Always leaves
    /// `ty` set; `Type::Error` marks recovery.
    pub(crate) fn process_expression(&mut self, expr: ExprId) -> Type {
        if let Some(ty) = self.ast.expr(expr).ty.clone() {
            return ty;
        }
        let token = self.ast.expr(expr).token;
        let kind = self.ast.expr(expr).kind.clone();

        // Each arm computes the type and fills the slots it owns.
        let ty = match kind {
            ExprKind::Literal(lit) => self.process_literal(expr, lit),
            ExprKind::Name { qualifier, name } => match qualifier {
                None => self.resolve_simple_name(expr, name),
                Some(q) => {
                    self.process_expression(q);
                    self.resolve_selector(expr, q, name)
                }
            },
            ExprKind::FieldAccess { base, name } => {
                self.process_expression(base);
                self.resolve_selector(expr, base, name)
            }
            ExprKind::This { qualifier } => self.process_this(expr, qualifier, token),
            ExprKind::Super { .. } => {
                // Only legal as a call/field qualifier; the enclosing
                // handler consumes it.
                self.super_type_of_this()
            }
            ExprKind::ClassLiteral { target } => self.process_class_literal(expr, target, token),
            ExprKind::ArrayAccess { array, index } => {
                self.process_array_access(expr, array, index, token)
            }
            ExprKind::ArrayInit { elements } => {
                // Standalone initializer: element types join by lub.
                let mut element_ty = Type::Error;
                for &element in &elements {
                    let ty = self.process_expression(element);
                    element_ty = if element_ty.is_error() {
                        ty
                    } else {
                        javelin_types::lub(&self.store, &element_ty, &ty)
                    };
                }
                Type::array(element_ty)
            }
            ExprKind::NewArray { element, dims, extra_dims, init } => {
                self.process_new_array(element, &dims, extra_dims, init, token)
            }
            ExprKind::Cast { target, expr: operand } => {
                self.process_cast(expr, target, operand, token)
            }
            ExprKind::InstanceOf { expr: operand, target } => {
                self.process_instanceof(operand, target, token)
            }
            ExprKind::Unary { op, operand } => self.process_unary(expr, op, operand, token),
            ExprKind::Binary { op, left, right } => {
                self.process_binary(expr, op, left, right, token)
            }
            ExprKind::Conditional { cond, then_expr, else_expr } => {
                self.process_conditional(expr, cond, then_expr, else_expr, token)
            }
            ExprKind::Assign { op, lhs, rhs } => {
                self.process_assignment(expr, op, lhs, rhs, token)
            }
            ExprKind::MethodCall { .. } => self.process_method_call(expr, token),
            ExprKind::New { .. } => self.process_new(expr, token),
            ExprKind::Conversion { operand, to, .. } => {
                self.process_expression(operand);
                to
            }
        };

        let node = self.ast.expr_mut(expr);
        if node.ty.is_none() {
            node.ty = Some(ty.clone());
        }
        node.ty.clone().unwrap_or(ty)
    }

    fn process_literal(&mut self, expr: ExprId, lit: Lit) -> Type {
        let (ty, value) = match lit {
            Lit::Int(v) => (Type::Primitive(PrimitiveType::Int), Some(ConstValue::Int(v))),
            Lit::Long(v) => (Type::Primitive(PrimitiveType::Long), Some(ConstValue::Long(v))),
            Lit::Float(v) => (Type::Primitive(PrimitiveType::Float), Some(ConstValue::Float(v))),
            Lit::Double(v) => (Type::Primitive(PrimitiveType::Double), Some(ConstValue::Double(v))),
            Lit::Bool(v) => (Type::Primitive(PrimitiveType::Boolean), Some(ConstValue::Bool(v))),
            Lit::Char(v) => {
                (Type::Primitive(PrimitiveType::Char), Some(ConstValue::Int(v as i32)))
            }
            Lit::Str(v) => (
                Type::class(self.store.well_known().string, vec![]),
                Some(ConstValue::Str(v)),
            ),
            Lit::Null => (Type::Null, None),
        };
        self.ast.expr_mut(expr).value = value;
        ty
    }

    fn process_this(
        &mut self,
        _expr: ExprId,
        qualifier: Option<javelin_core::TypeRefId>,
        token: TokenIndex,
    ) -> Type {
        let Some(env) = self.envs.top() else {
            return Type::Error;
        };
        let in_explicit_ctor = env.in_explicit_ctor;
        let static_region = env.static_region;
        let this_class = env.class;
        if in_explicit_ctor {
            self.report(
                SemanticErrorKind::SelfInExplicitCtorCall,
                token,
                "cannot refer to this in an explicit constructor invocation",
            );
        } else if static_region {
            self.report(
                SemanticErrorKind::InstanceInStaticRegion,
                token,
                "cannot use this in a static context",
            );
            return Type::Error;
        }

        match qualifier {
            None => self.self_view(this_class),
            Some(target_ref) => {
                let target = self.resolve_type_ref(target_ref);
                let Some(target_id) = target.class_id() else {
                    return Type::Error;
                };
                // The named type must be an enclosing type with a
                // reachable enclosing instance.
                let mut cursor = Some(this_class);
                while let Some(current) = cursor {
                    if current == target_id {
                        return self.self_view(current);
                    }
                    self.ensure_enclosing_instance(current);
                    cursor = self.store.def(current).and_then(|d| d.enclosing);
                }
                self.report(
                    SemanticErrorKind::EnclosingInstanceNotAccessible,
                    token,
                    format!(
                        "no enclosing instance of type {} is accessible",
                        target.display(&self.store)
                    ),
                );
                Type::Error
            }
        }
    }

    pub(crate) fn super_type_of_this(&self) -> Type {
        self.this_type()
            .and_then(|class| self.store.def(class))
            .and_then(|def| def.super_class.clone())
            .unwrap_or(Type::Error)
    }

    fn process_class_literal(
        &mut self,
        expr: ExprId,
        target: javelin_core::TypeRefId,
        _token: TokenIndex,
    ) -> Type {
        let target_ty = self.resolve_type_ref(target);
        let class_id = self.store.well_known().class;

        // Pre-1.5 emission reaches the literal through a cached static
        // field and a `class$` helper on the outermost type.
        if self.target == TargetRelease::Java14 && !target_ty.is_primitive() {
            if let Some(this_class) = self.this_type() {
                let outermost = self.outermost_type(this_class);
                self.ensure_class_literal_cache(outermost, &target_ty);
            }
        }

        let node = self.ast.expr_mut(expr);
        node.resolved_parameterized_type = Some(Type::class(class_id, vec![target_ty]));
        Type::class(class_id, vec![])
    }

    /// The `class$<mangled>` cache field plus the shared `class$` helper
    /// method, synthesized once per outermost type.
    fn ensure_class_literal_cache(&mut self, outermost: ClassId, literal: &Type) {
        let mangled = format!(
            "{}{}",
            synthetic::CLASS_PREFIX,
            javelin_types::signature::erased_descriptor(&self.store, literal)
                .trim_start_matches('L')
                .trim_end_matches(';')
                .replace('/', "$")
        );
        let already = self
            .store
            .def(outermost)
            .map(|def| def.fields.iter().any(|f| f.name == mangled))
            .unwrap_or(true);
        if already {
            return;
        }
        let class_ty = Type::class(self.store.well_known().class, vec![]);
        self.store.add_synthetic_field(
            outermost,
            FieldDef {
                name: mangled,
                flags: Flags::STATIC | Flags::SYNTHETIC,
                ty: class_ty.clone(),
                constant_value: None,
            },
        );

        let has_helper = self
            .store
            .def(outermost)
            .map(|def| def.methods.iter().any(|m| m.name == synthetic::CLASS_PREFIX))
            .unwrap_or(true);
        if !has_helper {
            let string_ty = Type::class(self.store.well_known().string, vec![]);
            self.store.add_synthetic_method(
                outermost,
                javelin_types::MethodDef {
                    name: synthetic::CLASS_PREFIX.to_string(),
                    flags: Flags::STATIC | Flags::SYNTHETIC,
                    type_params: vec![],
                    params: vec![javelin_types::ParamDef { name: "name".into(), ty: string_ty }],
                    return_type: class_ty,
                    throws: vec![],
                    accessed: None,
                },
            );
        }
    }

    fn process_array_access(
        &mut self,
        _expr: ExprId,
        array: ExprId,
        index: ExprId,
        token: TokenIndex,
    ) -> Type {
        let array_ty = self.process_expression(array);
        let index_ty = self.process_expression(index);

        if let Some(promoted) = self.promote_unary(&index_ty) {
            if promoted != PrimitiveType::Int {
                self.report(
                    SemanticErrorKind::TypeNotIntegral,
                    token,
                    "array index must be of type int",
                );
            } else {
                self.convert_to_type(index, &Type::Primitive(PrimitiveType::Int));
            }
        } else if !index_ty.is_error() {
            self.report(
                SemanticErrorKind::TypeNotIntegral,
                token,
                "array index must be of type int",
            );
        }

        match array_ty {
            Type::Array(component) => *component,
            Type::Error => Type::Error,
            other => {
                self.report(
                    SemanticErrorKind::IncompatibleTypes,
                    token,
                    format!("{} is not an array type", other.display(&self.store)),
                );
                Type::Error
            }
        }
    }

    fn process_new_array(
        &mut self,
        element: javelin_core::TypeRefId,
        dims: &[ExprId],
        extra_dims: u32,
        init: Option<ExprId>,
        token: TokenIndex,
    ) -> Type {
        let element_ty = self.resolve_type_ref(element);
        for &dim in dims {
            let dim_ty = self.process_expression(dim);
            match self.promote_unary(&dim_ty) {
                Some(PrimitiveType::Int) => {
                    self.convert_to_type(dim, &Type::Primitive(PrimitiveType::Int));
                    if let Some(ConstValue::Int(size)) = &self.ast.expr(dim).value {
                        if *size < 0 {
                            self.report(
                                SemanticErrorKind::NegativeArraySize,
                                token,
                                format!("array size {size} is negative"),
                            );
                        }
                    }
                }
                _ if dim_ty.is_error() => {}
                _ => {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "array size must be of type int",
                    );
                }
            }
        }
        let ty = Type::array_of(element_ty, dims.len() + extra_dims as usize);
        if let Some(init) = init {
            let element = match &ty {
                Type::Array(component) => (**component).clone(),
                _ => Type::Error,
            };
            self.process_array_initializer(init, &element);
        }
        ty
    }

    /// Type an `{ ... }` initializer against a known element type,
    /// converting each element.
    pub(crate) fn process_array_initializer(&mut self, init: ExprId, element_ty: &Type) {
        let elements = match self.ast.expr(init).kind.clone() {
            ExprKind::ArrayInit { elements } => elements,
            _ => {
                self.process_expression(init);
                return;
            }
        };
        let mut converted = Vec::with_capacity(elements.len());
        for element in elements {
            let ty = self.process_expression(element);
            let value = self.ast.expr(element).value.clone();
            let token = self.ast.expr(element).token;
            if let Type::Array(nested) = element_ty {
                if matches!(self.ast.expr(element).kind, ExprKind::ArrayInit { .. }) {
                    self.process_array_initializer(element, nested);
                    converted.push(element);
                    continue;
                }
            }
            match assignment_conversion_with_const(&self.store, &ty, element_ty, value.as_ref()) {
                Some(conversion) => {
                    self.report_conversion_warnings(&conversion.warnings.clone(), token);
                    converted.push(self.apply_conversion(element, element_ty, conversion));
                }
                None => {
                    if !ty.is_error() {
                        self.report(
                            SemanticErrorKind::IncompatibleTypes,
                            token,
                            format!(
                                "cannot convert from {} to {}",
                                ty.display(&self.store),
                                element_ty.display(&self.store)
                            ),
                        );
                    }
                    converted.push(element);
                }
            }
        }
        if let ExprKind::ArrayInit { elements } = &mut self.ast.expr_mut(init).kind {
            *elements = converted;
        }
        self.ast.expr_mut(init).ty = Some(Type::array(element_ty.clone()));
    }

    fn process_cast(
        &mut self,
        expr: ExprId,
        target: javelin_core::TypeRefId,
        operand: ExprId,
        token: TokenIndex,
    ) -> Type {
        let target_ty = self.resolve_type_ref(target);
        let operand_ty = self.process_expression(operand);

        match cast_conversion(&self.store, &operand_ty, &target_ty) {
            Some(conversion) => {
                self.report_conversion_warnings(&conversion.warnings.clone(), token);
                let value = self
                    .ast
                    .expr(operand)
                    .value
                    .clone()
                    .and_then(|v| cast_constant(&v, &target_ty));
                self.ast.expr_mut(expr).value = value;
            }
            None => {
                if !operand_ty.is_error() && !target_ty.is_error() {
                    self.report(
                        SemanticErrorKind::InvalidCast,
                        token,
                        format!(
                            "cannot cast from {} to {}",
                            operand_ty.display(&self.store),
                            target_ty.display(&self.store)
                        ),
                    );
                }
            }
        }
        target_ty
    }

    fn process_instanceof(
        &mut self,
        operand: ExprId,
        target: javelin_core::TypeRefId,
        token: TokenIndex,
    ) -> Type {
        let operand_ty = self.process_expression(operand);
        let target_ty = self.resolve_type_ref(target);

        // Only an unbounded wildcard survives erasure untested; any other
        // type argument cannot be checked at runtime.
        if let Type::Class(c) = &target_ty {
            let refutable = c
                .args
                .iter()
                .any(|arg| !matches!(arg, Type::Wildcard(WildcardBound::Unbounded)));
            if refutable {
                self.report(
                    SemanticErrorKind::InstanceofParameterizedType,
                    token,
                    "instanceof cannot test a parameterized type",
                );
            }
        }

        if !operand_ty.is_reference() && !operand_ty.is_error() {
            self.report(
                SemanticErrorKind::InvalidInstanceof,
                token,
                "instanceof operand must be a reference",
            );
        } else if !target_ty.is_error()
            && cast_conversion(&self.store, &operand_ty, &target_ty).is_none()
        {
            self.report(
                SemanticErrorKind::InvalidInstanceof,
                token,
                format!(
                    "{} can never be an instance of {}",
                    operand_ty.display(&self.store),
                    target_ty.display(&self.store)
                ),
            );
        }
        Type::Primitive(PrimitiveType::Boolean)
    }

    /// Unary promotion over a possibly boxed operand.
    fn promote_unary(&self, ty: &Type) -> Option<PrimitiveType> {
        match ty {
            Type::Primitive(p) => unary_numeric_promotion(*p),
            other => unboxed_primitive(&self.store, other).and_then(unary_numeric_promotion),
        }
    }

    fn unboxed(&self, ty: &Type) -> Option<PrimitiveType> {
        match ty {
            Type::Primitive(p) => Some(*p),
            other => unboxed_primitive(&self.store, other),
        }
    }

    fn process_unary(
        &mut self,
        expr: ExprId,
        op: UnaryOpKind,
        operand: ExprId,
        token: TokenIndex,
    ) -> Type {
        let operand_ty = self.process_expression(operand);
        if operand_ty.is_error() {
            return Type::Error;
        }
        match op {
            UnaryOpKind::Plus | UnaryOpKind::Minus => {
                let Some(promoted) = self.promote_unary(&operand_ty) else {
                    self.report(
                        SemanticErrorKind::TypeNotNumeric,
                        token,
                        "unary +/- needs a numeric operand",
                    );
                    return Type::Error;
                };
                let target = Type::Primitive(promoted);
                let converted = self.convert_to_type(operand, &target);
                self.replace_unary_operand(expr, converted);
                if op == UnaryOpKind::Minus {
                    if let Some(value) = self.ast.expr(converted).value.clone() {
                        if let Some(folded) = fold_unary(FoldUnaryOp::Neg, &value) {
                            if folded.overflow {
                                self.report(
                                    SemanticErrorKind::ConstantOverflow,
                                    token,
                                    "constant expression overflows",
                                );
                            }
                            self.ast.expr_mut(expr).value = Some(folded.value);
                        }
                    }
                } else {
                    let value = self.ast.expr(converted).value.clone();
                    self.ast.expr_mut(expr).value = value;
                }
                target
            }
            UnaryOpKind::BitNot => {
                let Some(promoted) = self.promote_unary(&operand_ty) else {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "~ needs an integral operand",
                    );
                    return Type::Error;
                };
                if !promoted.is_integral() {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "~ needs an integral operand",
                    );
                    return Type::Error;
                }
                let target = Type::Primitive(promoted);
                let converted = self.convert_to_type(operand, &target);
                self.replace_unary_operand(expr, converted);
                if let Some(value) = self.ast.expr(converted).value.clone() {
                    if let Some(folded) = fold_unary(FoldUnaryOp::BitNot, &value) {
                        self.ast.expr_mut(expr).value = Some(folded.value);
                    }
                }
                target
            }
            UnaryOpKind::Not => {
                if self.unboxed(&operand_ty) != Some(PrimitiveType::Boolean) {
                    self.report(
                        SemanticErrorKind::TypeNotBoolean,
                        token,
                        "! needs a boolean operand",
                    );
                    return Type::Error;
                }
                let target = Type::Primitive(PrimitiveType::Boolean);
                let converted = self.convert_to_type(operand, &target);
                self.replace_unary_operand(expr, converted);
                if let Some(value) = self.ast.expr(converted).value.clone() {
                    if let Some(folded) = fold_unary(FoldUnaryOp::Not, &value) {
                        self.ast.expr_mut(expr).value = Some(folded.value);
                    }
                }
                target
            }
            UnaryOpKind::PreInc | UnaryOpKind::PreDec | UnaryOpKind::PostInc | UnaryOpKind::PostDec => {
                if self.promote_unary(&operand_ty).is_none() {
                    self.report(
                        SemanticErrorKind::TypeNotNumeric,
                        token,
                        "++/-- needs a numeric variable",
                    );
                    return Type::Error;
                }
                if !matches!(
                    self.ast.expr(operand).symbol,
                    Some(Symbol::Local(_)) | Some(Symbol::Field(_)) | Some(Symbol::Method(_))
                ) && !matches!(self.ast.expr(operand).kind, ExprKind::ArrayAccess { .. })
                {
                    self.report(
                        SemanticErrorKind::IncompatibleTypes,
                        token,
                        "++/-- needs a variable",
                    );
                }
                operand_ty
            }
        }
    }

    fn replace_unary_operand(&mut self, expr: ExprId, converted: ExprId) {
        if let ExprKind::Unary { operand, .. } = &mut self.ast.expr_mut(expr).kind {
            *operand = converted;
        }
    }

    fn replace_binary_operands(&mut self, expr: ExprId, left: ExprId, right: ExprId) {
        if let ExprKind::Binary { left: l, right: r, .. } = &mut self.ast.expr_mut(expr).kind {
            *l = left;
            *r = right;
        }
    }

    fn process_binary(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let left_ty = self.process_expression(left);
        let right_ty = self.process_expression(right);
        if left_ty.is_error() || right_ty.is_error() {
            return if matches!(
                op,
                BinaryOpKind::Lt
                    | BinaryOpKind::Gt
                    | BinaryOpKind::Le
                    | BinaryOpKind::Ge
                    | BinaryOpKind::Eq
                    | BinaryOpKind::Ne
                    | BinaryOpKind::AndAnd
                    | BinaryOpKind::OrOr
            ) {
                // Predicates recover as boolean so conditions keep typing.
                Type::Primitive(PrimitiveType::Boolean)
            } else {
                Type::Error
            };
        }

        let string = Type::class(self.store.well_known().string, vec![]);
        match op {
            BinaryOpKind::Add
                if left_ty == string || right_ty == string =>
            {
                self.process_string_concat(expr, left, right)
            }
            BinaryOpKind::Add
            | BinaryOpKind::Sub
            | BinaryOpKind::Mul
            | BinaryOpKind::Div
            | BinaryOpKind::Rem => self.process_arith(expr, op, left, right, token),
            BinaryOpKind::Shl | BinaryOpKind::Shr | BinaryOpKind::Ushr => {
                self.process_shift(expr, op, left, right, token)
            }
            BinaryOpKind::Lt | BinaryOpKind::Gt | BinaryOpKind::Le | BinaryOpKind::Ge => {
                self.process_relational(expr, op, left, right, token)
            }
            BinaryOpKind::Eq | BinaryOpKind::Ne => {
                self.process_equality(expr, op, left, right, token)
            }
            BinaryOpKind::BitAnd | BinaryOpKind::BitXor | BinaryOpKind::BitOr => {
                self.process_bitwise(expr, op, left, right, token)
            }
            BinaryOpKind::AndAnd | BinaryOpKind::OrOr => {
                let boolean = Type::Primitive(PrimitiveType::Boolean);
                for (&operand, ty) in [(&left, &left_ty), (&right, &right_ty)] {
                    if self.unboxed(ty) != Some(PrimitiveType::Boolean) {
                        self.report(
                            SemanticErrorKind::TypeNotBoolean,
                            token,
                            "&& and || need boolean operands",
                        );
                    } else {
                        self.convert_to_type(operand, &boolean);
                    }
                }
                let (lv, rv) =
                    (self.ast.expr(left).value.clone(), self.ast.expr(right).value.clone());
                if let (Some(ConstValue::Bool(a)), Some(ConstValue::Bool(b))) = (lv, rv) {
                    let folded = if op == BinaryOpKind::AndAnd { a && b } else { a || b };
                    self.ast.expr_mut(expr).value = Some(ConstValue::Bool(folded));
                }
                boolean
            }
        }
    }

    /// `+` with a String side: the result is String; a constant or null
    /// other side is converted eagerly, anything else is left for the
    /// emitter's builder lowering.
    fn process_string_concat(&mut self, expr: ExprId, left: ExprId, right: ExprId) -> Type {
        let string = Type::class(self.store.well_known().string, vec![]);
        for operand in [left, right] {
            let is_constant = self.ast.expr(operand).value.is_some()
                || matches!(self.ast.expr(operand).kind, ExprKind::Literal(Lit::Null));
            if is_constant {
                let ty = self.ast.expr(operand).ty.clone().unwrap_or(Type::Error);
                if ty != string {
                    let value = self.ast.expr(operand).value.clone();
                    let token = self.ast.expr(operand).token;
                    let converted = self.ast.alloc_expr(
                        ExprKind::Conversion {
                            operand,
                            to: string.clone(),
                            steps: vec![javelin_types::ConversionStep::StringConversion],
                        },
                        token,
                    );
                    let node = self.ast.expr_mut(converted);
                    node.ty = Some(string.clone());
                    node.value = value.map(|v| ConstValue::Str(v.to_java_string()));
                    let (l, r) = if operand == left { (converted, right) } else { (left, converted) };
                    self.replace_binary_operands(expr, l, r);
                }
            }
        }

        // Fold constant concatenation.
        let (l, r) = match &self.ast.expr(expr).kind {
            ExprKind::Binary { left, right, .. } => (*left, *right),
            _ => (left, right),
        };
        if let (Some(ConstValue::Str(a)), Some(ConstValue::Str(b))) =
            (self.ast.expr(l).value.clone(), self.ast.expr(r).value.clone())
        {
            self.ast.expr_mut(expr).value = Some(ConstValue::Str(format!("{a}{b}")));
        }
        string
    }

    fn process_arith(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let (Some(lp), Some(rp)) = (
            self.unboxed(&self.ast.expr(left).ty.clone().unwrap_or(Type::Error)),
            self.unboxed(&self.ast.expr(right).ty.clone().unwrap_or(Type::Error)),
        ) else {
            self.report(
                SemanticErrorKind::TypeNotNumeric,
                token,
                "arithmetic needs numeric operands",
            );
            return Type::Error;
        };
        let Some(promoted) = binary_numeric_promotion(lp, rp) else {
            self.report(
                SemanticErrorKind::TypeNotNumeric,
                token,
                "arithmetic needs numeric operands",
            );
            return Type::Error;
        };
        let target = Type::Primitive(promoted);
        let left = self.convert_to_type(left, &target);
        let right = self.convert_to_type(right, &target);
        self.replace_binary_operands(expr, left, right);

        let arith = match op {
            BinaryOpKind::Add => ArithOp::Add,
            BinaryOpKind::Sub => ArithOp::Sub,
            BinaryOpKind::Mul => ArithOp::Mul,
            BinaryOpKind::Div => ArithOp::Div,
            _ => ArithOp::Rem,
        };
        if let (Some(lv), Some(rv)) =
            (self.ast.expr(left).value.clone(), self.ast.expr(right).value.clone())
        {
            match fold_binary(arith, &lv, &rv) {
                Some(folded) => {
                    if folded.overflow {
                        self.report(
                            SemanticErrorKind::ConstantOverflow,
                            token,
                            "constant expression overflows",
                        );
                    }
                    self.ast.expr_mut(expr).value = Some(folded.value);
                }
                None if matches!(arith, ArithOp::Div | ArithOp::Rem) => {
                    // Accepted, but it will throw at run time.
                    self.report(SemanticErrorKind::ZeroDivide, token, "division by zero");
                }
                None => {}
            }
        }
        target
    }

    fn process_shift(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let left_ty = self.ast.expr(left).ty.clone().unwrap_or(Type::Error);
        let right_ty = self.ast.expr(right).ty.clone().unwrap_or(Type::Error);
        let promoted = self.promote_unary(&left_ty).filter(|p| p.is_integral());
        let Some(promoted) = promoted else {
            self.report(
                SemanticErrorKind::TypeNotIntegral,
                token,
                "shift needs an integral left operand",
            );
            return Type::Error;
        };
        if self.promote_unary(&right_ty).filter(|p| p.is_integral()).is_none() {
            self.report(
                SemanticErrorKind::TypeNotIntegral,
                token,
                "shift count must be integral",
            );
            return Type::Primitive(promoted);
        }
        let target = Type::Primitive(promoted);
        let left = self.convert_to_type(left, &target);
        // The count undergoes unary promotion to int independently.
        let right = self.convert_to_type(right, &Type::Primitive(PrimitiveType::Int));
        self.replace_binary_operands(expr, left, right);

        let width: i64 = if promoted == PrimitiveType::Long { 63 } else { 31 };
        if let Some(count) = self.ast.expr(right).value.clone().and_then(|v| v.as_long()) {
            if count < 0 || count > width {
                self.report(
                    SemanticErrorKind::ShiftCountOutOfRange,
                    token,
                    format!("shift count {count} is masked to {}", count & width),
                );
            }
            if let Some(lv) = self.ast.expr(left).value.clone() {
                let shift_op = match op {
                    BinaryOpKind::Shl => ShiftOp::Shl,
                    BinaryOpKind::Shr => ShiftOp::Shr,
                    _ => ShiftOp::Ushr,
                };
                if let Some((value, _)) = fold_shift(shift_op, &lv, count) {
                    self.ast.expr_mut(expr).value = Some(value);
                }
            }
        }
        target
    }

    fn process_relational(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        let (Some(lp), Some(rp)) = (
            self.unboxed(&self.ast.expr(left).ty.clone().unwrap_or(Type::Error)),
            self.unboxed(&self.ast.expr(right).ty.clone().unwrap_or(Type::Error)),
        ) else {
            self.report(
                SemanticErrorKind::TypeNotNumeric,
                token,
                "comparison needs numeric operands",
            );
            return boolean;
        };
        let Some(promoted) = binary_numeric_promotion(lp, rp) else {
            self.report(
                SemanticErrorKind::TypeNotNumeric,
                token,
                "comparison needs numeric operands",
            );
            return boolean;
        };
        let target = Type::Primitive(promoted);
        let left = self.convert_to_type(left, &target);
        let right = self.convert_to_type(right, &target);
        self.replace_binary_operands(expr, left, right);

        if let (Some(lv), Some(rv)) = (
            self.ast.expr(left).value.clone().and_then(|v| v.as_double()),
            self.ast.expr(right).value.clone().and_then(|v| v.as_double()),
        ) {
            let folded = match op {
                BinaryOpKind::Lt => lv < rv,
                BinaryOpKind::Gt => lv > rv,
                BinaryOpKind::Le => lv <= rv,
                _ => lv >= rv,
            };
            self.ast.expr_mut(expr).value = Some(ConstValue::Bool(folded));
        }
        boolean
    }

    fn process_equality(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        let left_ty = self.ast.expr(left).ty.clone().unwrap_or(Type::Error);
        let right_ty = self.ast.expr(right).ty.clone().unwrap_or(Type::Error);

        let numeric = self.unboxed(&left_ty).zip(self.unboxed(&right_ty));
        if let Some((lp, rp)) = numeric {
            if lp == PrimitiveType::Boolean && rp == PrimitiveType::Boolean {
                // boolean == boolean is fine as-is.
            } else if let Some(promoted) = binary_numeric_promotion(lp, rp) {
                let target = Type::Primitive(promoted);
                let left = self.convert_to_type(left, &target);
                let right = self.convert_to_type(right, &target);
                self.replace_binary_operands(expr, left, right);
            } else {
                self.report(
                    SemanticErrorKind::IncompatibleTypes,
                    token,
                    "incomparable operand types",
                );
            }
        } else if left_ty.is_reference() && right_ty.is_reference() {
            // One side must be cast-convertible to the other.
            if cast_conversion(&self.store, &left_ty, &right_ty).is_none()
                && cast_conversion(&self.store, &right_ty, &left_ty).is_none()
            {
                self.report(
                    SemanticErrorKind::IncompatibleTypes,
                    token,
                    format!(
                        "incompatible operand types {} and {}",
                        left_ty.display(&self.store),
                        right_ty.display(&self.store)
                    ),
                );
            }
        } else if !left_ty.is_error() && !right_ty.is_error() {
            self.report(
                SemanticErrorKind::IncompatibleTypes,
                token,
                "incomparable operand types",
            );
        }

        if let (Some(lv), Some(rv)) =
            (self.ast.expr(left).value.clone(), self.ast.expr(right).value.clone())
        {
            let equal = lv == rv;
            let folded = if op == BinaryOpKind::Eq { equal } else { !equal };
            self.ast.expr_mut(expr).value = Some(ConstValue::Bool(folded));
        }
        boolean
    }

    fn process_bitwise(
        &mut self,
        expr: ExprId,
        op: BinaryOpKind,
        left: ExprId,
        right: ExprId,
        token: TokenIndex,
    ) -> Type {
        let left_ty = self.ast.expr(left).ty.clone().unwrap_or(Type::Error);
        let right_ty = self.ast.expr(right).ty.clone().unwrap_or(Type::Error);
        let (Some(lp), Some(rp)) = (self.unboxed(&left_ty), self.unboxed(&right_ty)) else {
            self.report(
                SemanticErrorKind::TypeNotIntegral,
                token,
                "bitwise operators need boolean or integral operands",
            );
            return Type::Error;
        };

        let target = if lp == PrimitiveType::Boolean && rp == PrimitiveType::Boolean {
            Type::Primitive(PrimitiveType::Boolean)
        } else if lp.is_integral() && rp.is_integral() {
            match binary_numeric_promotion(lp, rp) {
                Some(promoted) => Type::Primitive(promoted),
                None => return Type::Error,
            }
        } else {
            self.report(
                SemanticErrorKind::TypeNotIntegral,
                token,
                "bitwise operators need boolean or integral operands",
            );
            return Type::Error;
        };

        let left = self.convert_to_type(left, &target);
        let right = self.convert_to_type(right, &target);
        self.replace_binary_operands(expr, left, right);

        if let (Some(lv), Some(rv)) =
            (self.ast.expr(left).value.clone(), self.ast.expr(right).value.clone())
        {
            let folded = match (lv, rv) {
                (ConstValue::Bool(a), ConstValue::Bool(b)) => Some(ConstValue::Bool(match op {
                    BinaryOpKind::BitAnd => a & b,
                    BinaryOpKind::BitXor => a ^ b,
                    _ => a | b,
                })),
                (ConstValue::Int(a), ConstValue::Int(b)) => Some(ConstValue::Int(match op {
                    BinaryOpKind::BitAnd => a & b,
                    BinaryOpKind::BitXor => a ^ b,
                    _ => a | b,
                })),
                (ConstValue::Long(a), ConstValue::Long(b)) => Some(ConstValue::Long(match op {
                    BinaryOpKind::BitAnd => a & b,
                    BinaryOpKind::BitXor => a ^ b,
                    _ => a | b,
                })),
                _ => None,
            };
            if let Some(folded) = folded {
                self.ast.expr_mut(expr).value = Some(folded);
            }
        }
        target
    }

    fn process_conditional(
        &mut self,
        expr: ExprId,
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
        token: TokenIndex,
    ) -> Type {
        let cond_ty = self.process_expression(cond);
        if self.unboxed(&cond_ty) != Some(PrimitiveType::Boolean) && !cond_ty.is_error() {
            self.report(
                SemanticErrorKind::TypeNotBoolean,
                token,
                "conditional test must be boolean",
            );
        } else {
            self.convert_to_type(cond, &Type::Primitive(PrimitiveType::Boolean));
        }

        let then_ty = self.process_expression(then_expr);
        let else_ty = self.process_expression(else_expr);
        if then_ty.is_error() || else_ty.is_error() {
            return Type::Error;
        }
        if then_ty == else_ty {
            return then_ty;
        }

        let result = match (&then_ty, &else_ty) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                // Mixed numeric arms: the wider type, or the narrower when a
                // constant arm fits it.
                if let Some(promoted) = binary_numeric_promotion(*a, *b) {
                    let constant_fit = [
                        (then_expr, *b, &else_ty),
                        (else_expr, *a, &then_ty),
                    ]
                    .into_iter()
                    .find_map(|(arm, other_prim, other_ty)| {
                        let value = self.ast.expr(arm).value.clone()?.as_long()?;
                        fits_in_primitive(value, other_prim).then(|| other_ty.clone())
                    });
                    constant_fit.unwrap_or(Type::Primitive(promoted))
                } else {
                    self.report(
                        SemanticErrorKind::IncompatibleTypes,
                        token,
                        "incompatible conditional arms",
                    );
                    Type::Error
                }
            }
            (prim @ Type::Primitive(p), reference) | (reference, prim @ Type::Primitive(p)) => {
                // Unbox the reference arm to match if possible, otherwise
                // box the primitive and join as references.
                if unboxed_primitive(&self.store, reference) == Some(*p) {
                    (*prim).clone()
                } else {
                    let boxed = Type::class(self.store.wrapper_of(*p), vec![]);
                    javelin_types::lub(&self.store, &boxed, reference)
                }
            }
            _ => {
                // Two references: try each direction of assignment, else
                // the common superclass (interfaces intentionally ignored).
                if javelin_types::is_assignable(&self.store, &then_ty, &else_ty) {
                    else_ty.clone()
                } else if javelin_types::is_assignable(&self.store, &else_ty, &then_ty) {
                    then_ty.clone()
                } else {
                    match (
                        then_ty.erasure(&self.store).class_id(),
                        else_ty.erasure(&self.store).class_id(),
                    ) {
                        (Some(a), Some(b)) => {
                            Type::class(javelin_types::common_superclass(&self.store, a, b), vec![])
                        }
                        _ => {
                            self.report(
                                SemanticErrorKind::IncompatibleTypes,
                                token,
                                "incompatible conditional arms",
                            );
                            Type::Error
                        }
                    }
                }
            }
        };

        if !result.is_error() {
            let then_conv = self.convert_to_type(then_expr, &result);
            let else_conv = self.convert_to_type(else_expr, &result);
            if let ExprKind::Conditional { then_expr: t, else_expr: e, .. } =
                &mut self.ast.expr_mut(expr).kind
            {
                *t = then_conv;
                *e = else_conv;
            }
        }

        // `cond ? a : b` folds when the condition is constant.
        if let Some(ConstValue::Bool(flag)) = self.ast.expr(cond).value.clone() {
            let arm = if flag { then_expr } else { else_expr };
            let value = self.ast.expr(arm).value.clone();
            self.ast.expr_mut(expr).value = value;
        }
        result
    }

    fn process_assignment(
        &mut self,
        expr: ExprId,
        op: Option<BinaryOpKind>,
        lhs: ExprId,
        rhs: ExprId,
        token: TokenIndex,
    ) -> Type {
        let lhs_ty = self.process_expression(lhs);
        let rhs_ty = self.process_expression(rhs);

        // The target must be a variable.
        let assignable_target = matches!(
            self.ast.expr(lhs).kind,
            ExprKind::Name { .. } | ExprKind::FieldAccess { .. } | ExprKind::ArrayAccess { .. }
        );
        if !assignable_target {
            self.report(
                SemanticErrorKind::IncompatibleTypes,
                token,
                "the left-hand side of an assignment must be a variable",
            );
            return lhs_ty;
        }

        // Assignment through an accessor needs a write accessor too.
        if let Some(Symbol::Method(read_accessor)) = self.ast.expr(lhs).symbol {
            if let Some(javelin_types::AccessedMember::Field(field)) =
                self.store.method(read_accessor).and_then(|m| m.accessed)
            {
                let write = self.write_field_accessor(field, field.class);
                self.ast.expr_mut(expr).write_method = Some(write);
            }
        }

        match op {
            None => {
                let value = self.ast.expr(rhs).value.clone();
                match assignment_conversion_with_const(&self.store, &rhs_ty, &lhs_ty, value.as_ref())
                {
                    Some(conversion) => {
                        self.report_conversion_warnings(&conversion.warnings.clone(), token);
                        let converted = self.apply_conversion(rhs, &lhs_ty, conversion);
                        if let ExprKind::Assign { rhs: r, .. } = &mut self.ast.expr_mut(expr).kind {
                            *r = converted;
                        }
                    }
                    None => {
                        if !rhs_ty.is_error() && !lhs_ty.is_error() {
                            let narrowing_constant = rhs_ty.is_primitive()
                                && lhs_ty.is_primitive()
                                && value.is_some();
                            let kind = if narrowing_constant {
                                SemanticErrorKind::InvalidNarrowing
                            } else {
                                SemanticErrorKind::IncompatibleTypes
                            };
                            self.report(
                                kind,
                                token,
                                format!(
                                    "cannot convert from {} to {}",
                                    rhs_ty.display(&self.store),
                                    lhs_ty.display(&self.store)
                                ),
                            );
                        }
                    }
                }
                lhs_ty
            }
            Some(op) => self.process_compound_assignment(expr, op, lhs, rhs, lhs_ty, rhs_ty, token),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn process_compound_assignment(
        &mut self,
        _expr: ExprId,
        op: BinaryOpKind,
        _lhs: ExprId,
        rhs: ExprId,
        lhs_ty: Type,
        rhs_ty: Type,
        token: TokenIndex,
    ) -> Type {
        let string = Type::class(self.store.well_known().string, vec![]);
        if op == BinaryOpKind::Add && lhs_ty == string {
            // `s += x` converts the right side to String; anything else is
            // the emitter's builder lowering.
            return string;
        }

        match op {
            BinaryOpKind::Shl | BinaryOpKind::Shr | BinaryOpKind::Ushr => {
                // LHS promotes on its own; the count converts to int.
                if self.promote_unary(&lhs_ty).filter(|p| p.is_integral()).is_none() {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "shift needs an integral left operand",
                    );
                } else if self.promote_unary(&rhs_ty).filter(|p| p.is_integral()).is_none() {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "shift count must be integral",
                    );
                } else {
                    self.convert_to_type(rhs, &Type::Primitive(PrimitiveType::Int));
                }
                lhs_ty
            }
            BinaryOpKind::BitAnd | BinaryOpKind::BitOr | BinaryOpKind::BitXor => {
                let ok = match (self.unboxed(&lhs_ty), self.unboxed(&rhs_ty)) {
                    (Some(PrimitiveType::Boolean), Some(PrimitiveType::Boolean)) => true,
                    (Some(a), Some(b)) => a.is_integral() && b.is_integral(),
                    _ => false,
                };
                if !ok && !lhs_ty.is_error() && !rhs_ty.is_error() {
                    self.report(
                        SemanticErrorKind::TypeNotIntegral,
                        token,
                        "bitwise compound assignment needs boolean or integral operands",
                    );
                }
                lhs_ty
            }
            _ => {
                // Numeric compound assignment: binary promotion happens,
                // then an implicit narrowing back to the variable's type.
                let (Some(lp), Some(rp)) = (self.unboxed(&lhs_ty), self.unboxed(&rhs_ty)) else {
                    if !lhs_ty.is_error() && !rhs_ty.is_error() {
                        self.report(
                            SemanticErrorKind::TypeNotNumeric,
                            token,
                            "compound assignment needs numeric operands",
                        );
                    }
                    return lhs_ty;
                };
                if binary_numeric_promotion(lp, rp).is_none() {
                    self.report(
                        SemanticErrorKind::TypeNotNumeric,
                        token,
                        "compound assignment needs numeric operands",
                    );
                }
                lhs_ty
            }
        }
    }

    // -- calls ------------------------------------------------------------

    fn process_method_call(&mut self, expr: ExprId, token: TokenIndex) -> Type {
        let (base, name, type_arg_refs, arg_ids) = match &self.ast.expr(expr).kind {
            ExprKind::MethodCall { base, name, type_args, args } => {
                (*base, name.clone(), type_args.clone(), args.clone())
            }
            _ => return Type::Error,
        };

        if self.target == TargetRelease::Java14 && !type_arg_refs.is_empty() {
            self.report(
                SemanticErrorKind::ExplicitTypeArgumentsNotSupported,
                token,
                "explicit type arguments require source level 1.5",
            );
        }
        let explicit_type_args: Vec<Type> = type_arg_refs
            .iter()
            .map(|&r| self.resolve_type_ref(r))
            .collect();

        let mut arg_types = Vec::with_capacity(arg_ids.len());
        for &arg in &arg_ids {
            arg_types.push(self.process_expression(arg));
        }

        // Work out the receiver.
        let mut is_super_call = false;
        let (receiver, call_kind) = match base {
            None => match self.find_call_environment(&name, token) {
                Some((receiver, kind)) => (receiver, kind),
                None => {
                    self.ast.expr_mut(expr).ty = Some(Type::Error);
                    return Type::Error;
                }
            },
            Some(base_expr) => {
                if matches!(self.ast.expr(base_expr).kind, ExprKind::Super { .. }) {
                    is_super_call = true;
                    (self.process_expression(base_expr), CallKind::Instance)
                } else {
                    let base_ty = self.process_expression(base_expr);
                    match self.ast.expr(base_expr).symbol {
                        Some(Symbol::Package(_)) => {
                            self.report(
                                SemanticErrorKind::PackageNotType,
                                token,
                                format!("{name} cannot be called on a package"),
                            );
                            self.ast.expr_mut(expr).ty = Some(Type::Error);
                            return Type::Error;
                        }
                        Some(Symbol::Class(_)) => (base_ty, CallKind::Static),
                        _ => {
                            let receiver = self
                                .ast
                                .expr(base_expr)
                                .resolved_parameterized_type
                                .clone()
                                .unwrap_or(base_ty);
                            (receiver, CallKind::Instance)
                        }
                    }
                }
            }
        };
        if receiver.is_error() {
            self.ast.expr_mut(expr).ty = Some(Type::Error);
            return Type::Error;
        }

        let call = MethodCall {
            receiver: receiver.clone(),
            call_kind,
            name: name.as_str(),
            args: arg_types.clone(),
            explicit_type_args,
        };
        match resolve_method_call(&mut self.store, &call) {
            MethodResolution::Found(found) => {
                // An unqualified call reaching a static method is not the
                // instance-receiver pattern the advisory is about.
                let warnings: Vec<TypeWarning> = found
                    .warnings
                    .iter()
                    .copied()
                    .filter(|w| {
                        base.is_some() || !matches!(w, TypeWarning::StaticAccessViaInstance)
                    })
                    .collect();
                self.report_conversion_warnings(&warnings, token);

                if is_super_call {
                    let is_abstract = self
                        .store
                        .method(found.method)
                        .map(|m| m.flags.is_abstract())
                        .unwrap_or(false);
                    if is_abstract {
                        self.report(
                            SemanticErrorKind::AbstractSuperCall,
                            token,
                            format!("cannot invoke the abstract method {name} via super"),
                        );
                    }
                }

                // Static context check for unqualified instance calls.
                if base.is_none() && !found.is_static {
                    let static_region = self.envs.top().map(|e| e.static_region).unwrap_or(false);
                    let in_ctor_call = self.envs.top().map(|e| e.in_explicit_ctor).unwrap_or(false);
                    if in_ctor_call {
                        self.report(
                            SemanticErrorKind::InstanceInExplicitCtorCall,
                            token,
                            format!("cannot invoke the instance method {name} in an explicit constructor invocation"),
                        );
                    } else if static_region {
                        self.report(
                            SemanticErrorKind::InstanceInStaticRegion,
                            token,
                            format!("cannot make a static reference to the instance method {name}"),
                        );
                    }
                }

                self.apply_argument_conversions(expr, &arg_ids, &found);
                self.record_thrown_exceptions(found.method, token);
                self.note_member_use(Symbol::Method(found.method), token);

                // Access check and accessor bridging.
                let mut symbol = Symbol::Method(found.method);
                let flags = self
                    .store
                    .method(found.method)
                    .map(|m| m.flags)
                    .unwrap_or_default();
                if let Some(from) = self.this_type() {
                    if !self.member_accessible(flags, found.method.class, from) {
                        self.report(
                            SemanticErrorKind::AccessViolation,
                            token,
                            format!("the method {name} is not accessible"),
                        );
                    } else if self.needs_accessor(flags, found.method.class, from)
                        || (is_super_call && self.needs_super_accessor(found.method, from))
                    {
                        let base_type = if is_super_call {
                            receiver.erasure(&self.store).class_id().unwrap_or(found.method.class)
                        } else {
                            found.method.class
                        };
                        symbol = Symbol::Method(self.read_method_accessor(found.method, base_type));
                    }
                }

                let return_type = found.return_type.clone();
                let node = self.ast.expr_mut(expr);
                node.symbol = Some(symbol);
                node.ty = Some(return_type.erasure(&self.store));
                if return_type.is_parameterized() {
                    node.resolved_parameterized_type = Some(return_type.clone());
                }
                if return_type != return_type.erasure(&self.store) {
                    node.resolved_type = Some(return_type.erasure(&self.store));
                }
                self.ast.expr(expr).ty.clone().unwrap_or(Type::Error)
            }
            MethodResolution::Ambiguous(candidates) => {
                self.report(
                    SemanticErrorKind::AmbiguousMethod,
                    token,
                    format!("the call to {name} is ambiguous ({} candidates)", candidates.len()),
                );
                self.ast.expr_mut(expr).ty = Some(Type::Error);
                Type::Error
            }
            MethodResolution::NotFound(not_found) => {
                if !arg_types.iter().any(Type::is_error) {
                    let description = if not_found.candidates.is_empty() {
                        format!("the method {name} is undefined")
                    } else {
                        format!(
                            "no applicable overload of {name} for the given arguments ({} candidates)",
                            not_found.candidates.len()
                        )
                    };
                    self.report(SemanticErrorKind::NotFoundMethod, token, description);
                }
                self.ast.expr_mut(expr).ty = Some(Type::Error);
                Type::Error
            }
        }
    }

    /// Unqualified call: the first enclosing type whose expanded tables
    /// carry the name wins; statically imported methods come after.
    fn find_call_environment(
        &mut self,
        name: &Name,
        token: TokenIndex,
    ) -> Option<(Type, CallKind)> {
        let depth_count = self.envs.len();
        for depth in 0..depth_count {
            let class = self.envs.get(depth)?.class;
            let tables = self.store.expanded_tables(class);
            if !tables.overloads(name.as_str()).is_empty() {
                return Some((self.self_view(class), CallKind::Instance));
            }
        }
        if let Some(Symbol::Method(method)) = self.probe_static_imports(name, token, true) {
            return Some((Type::class(method.class, vec![]), CallKind::Static));
        }
        self.report(
            SemanticErrorKind::NotFoundMethod,
            token,
            format!("the method {name} is undefined in this scope"),
        );
        None
    }

    /// Apply the resolver's per-argument conversions, wrapping trailing
    /// varargs actuals into a synthesised array when the invocation is not
    /// a pass-through.
    fn apply_argument_conversions(
        &mut self,
        call: ExprId,
        arg_ids: &[ExprId],
        found: &javelin_types::ResolvedMethod,
    ) {
        let mut new_args: Vec<ExprId> = Vec::with_capacity(arg_ids.len());

        match &found.varargs {
            Some(shape) if shape.wrapped.is_some() => {
                let fixed = found.params.len().saturating_sub(1);
                for (index, &arg) in arg_ids.iter().take(fixed).enumerate() {
                    let target = found.params.get(index).cloned().unwrap_or(Type::Error);
                    new_args.push(self.convert_to_type(arg, &target));
                }
                // Wrap the rest in a new array of the element type.
                let element = shape.element.clone();
                let mut wrapped = Vec::new();
                for &arg in &arg_ids[fixed.min(arg_ids.len())..] {
                    wrapped.push(self.convert_to_type(arg, &element));
                }
                let token = self.ast.expr(call).token;
                let array = self.ast.alloc_expr(ExprKind::ArrayInit { elements: wrapped }, token);
                self.ast.expr_mut(array).ty = Some(Type::array(element));
                new_args.push(array);
            }
            _ => {
                for (index, &arg) in arg_ids.iter().enumerate() {
                    let target = found.params.get(index).cloned().unwrap_or(Type::Error);
                    new_args.push(self.convert_to_type(arg, &target));
                }
            }
        }

        match &mut self.ast.expr_mut(call).kind {
            ExprKind::MethodCall { args, .. } | ExprKind::New { args, .. } => *args = new_args,
            _ => {}
        }
    }

    /// `Outer.super.m()` from a scope that is not a subclass of the
    /// declaring type needs the accessor bridge even for non-private
    /// members.
    fn needs_super_accessor(&self, method: MethodId, from: ClassId) -> bool {
        let Some(def) = self.store.method(method) else {
            return false;
        };
        def.flags.is_protected() && !self.same_package(method.class, from)
    }

    /// Resolve pending throws and record them against the innermost try
    /// context, or check them against the enclosing method's clause.
    fn record_thrown_exceptions(&mut self, method: MethodId, token: TokenIndex) {
        let thrown = javelin_types::resolve_method_throws(&mut self.store, method);
        if thrown.is_empty() {
            return;
        }
        let checked: Vec<Type> = thrown
            .into_iter()
            .filter(|ty| self.is_checked_exception(ty))
            .collect();
        if checked.is_empty() {
            return;
        }

        if let Some(env) = self.envs.top_mut() {
            if let Some(context) = env.try_throws.last_mut() {
                context.extend(checked);
                return;
            }
        }

        // No try context: the enclosing method must declare them.
        let declared: Vec<Type> = self
            .envs
            .top()
            .and_then(|env| env.enclosing_method)
            .and_then(|m| self.store.method(m).cloned())
            .map(|m| {
                m.throws
                    .iter()
                    .filter_map(|t| match t {
                        ThrowsEntry::Resolved(ty) => Some(ty.clone()),
                        ThrowsEntry::Pending(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        for exception in checked {
            let covered = declared
                .iter()
                .any(|declared| is_subtype(&self.store, &exception, declared));
            if !covered {
                self.report(
                    SemanticErrorKind::UncaughtException,
                    token,
                    format!(
                        "unhandled exception type {}",
                        exception.display(&self.store)
                    ),
                );
            }
        }
    }

    pub(crate) fn is_checked_exception(&self, ty: &Type) -> bool {
        let wk = self.store.well_known();
        let throwable = Type::class(wk.throwable, vec![]);
        let runtime = Type::class(wk.runtime_exception, vec![]);
        let error = Type::class(wk.error, vec![]);
        is_subtype(&self.store, ty, &throwable)
            && !is_subtype(&self.store, ty, &runtime)
            && !is_subtype(&self.store, ty, &error)
    }

    // -- object creation --------------------------------------------------

    fn process_new(&mut self, expr: ExprId, token: TokenIndex) -> Type {
        let (ty_ref, arg_ids, body, enclosing) = match &self.ast.expr(expr).kind {
            ExprKind::New { ty, args, body, enclosing } => (*ty, args.clone(), *body, *enclosing),
            _ => return Type::Error,
        };

        let created = self.resolve_type_ref(ty_ref);
        if created.is_error() {
            return Type::Error;
        }

        if let Some(base) = enclosing {
            self.process_expression(base);
        }

        let mut arg_types = Vec::with_capacity(arg_ids.len());
        for &arg in &arg_ids {
            arg_types.push(self.process_expression(arg));
        }

        // Anonymous body: synthesize the class first, then resolve the
        // super constructor through it.
        if let Some(body) = body {
            return self.process_anonymous_creation(expr, &created, body, &arg_ids, &arg_types, enclosing, token);
        }

        let Some(class) = created.erasure(&self.store).class_id() else {
            return Type::Error;
        };

        // A non-static inner class needs a reachable enclosing instance.
        let is_inner = self
            .store
            .def(class)
            .map(|def| def.enclosing.is_some() && !def.flags.is_static())
            .unwrap_or(false);
        if is_inner {
            self.ensure_enclosing_instance(class);
            if enclosing.is_none() {
                let static_region = self.envs.top().map(|e| e.static_region).unwrap_or(false);
                if static_region {
                    self.report(
                        SemanticErrorKind::EnclosingInstanceNotAccessible,
                        token,
                        format!(
                            "no enclosing instance available for {}",
                            created.display(&self.store)
                        ),
                    );
                }
            }
        }

        // A local class that has not finished processing yet: remember the
        // call and patch its captures later.
        let pending = self
            .store
            .def(class)
            .map(|def| {
                def.flags.contains(Flags::LOCAL) && !def.flags.contains(Flags::COMPLETE)
            })
            .unwrap_or(false);
        if pending {
            self.defer_local_ctor_call(class, expr);
        }

        match resolve_constructor_call(&mut self.store, &created, &arg_types) {
            MethodResolution::Found(found) => {
                self.report_conversion_warnings(&found.warnings.clone(), token);
                self.apply_argument_conversions(expr, &arg_ids, &found);
                self.record_thrown_exceptions(found.method, token);

                let mut ctor = found.method;
                let flags = self.store.method(ctor).map(|m| m.flags).unwrap_or_default();
                if let Some(from) = self.this_type() {
                    if !self.member_accessible(flags, ctor.class, from) {
                        self.report(
                            SemanticErrorKind::AccessViolation,
                            token,
                            format!(
                                "the constructor of {} is not accessible",
                                created.display(&self.store)
                            ),
                        );
                    } else if flags.is_private() && ctor.class != from {
                        ctor = self.constructor_accessor(ctor);
                    }
                }
                self.ast.expr_mut(expr).symbol = Some(Symbol::Method(ctor));
                created
            }
            MethodResolution::Ambiguous(_) => {
                self.report(
                    SemanticErrorKind::AmbiguousMethod,
                    token,
                    format!(
                        "the constructor call for {} is ambiguous",
                        created.display(&self.store)
                    ),
                );
                created
            }
            MethodResolution::NotFound(_) => {
                if !arg_types.iter().any(Type::is_error) {
                    self.report(
                        SemanticErrorKind::NotFoundConstructor,
                        token,
                        format!(
                            "no constructor of {} matches the arguments",
                            created.display(&self.store)
                        ),
                    );
                }
                created
            }
        }
    }

    // -- statements -------------------------------------------------------

    pub(crate) fn process_statement(&mut self, stmt: StmtId) {
        let token = self.ast.stmt(stmt).token;
        match self.ast.stmt(stmt).kind.clone() {
            StmtKind::Empty => {}
            StmtKind::Block { statements } => {
                if let Some(env) = self.envs.top_mut() {
                    env.blocks.push(crate::scope::BlockScope::default());
                }
                for statement in statements {
                    self.process_statement(statement);
                }
                if let Some(env) = self.envs.top_mut() {
                    env.blocks.pop();
                }
            }
            StmtKind::LocalVar { name, modifiers, ty, init, .. } => {
                self.process_local_var(stmt, name, modifiers, ty, init, token);
            }
            StmtKind::Expr { expr } => {
                self.process_expression(expr);
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.check_condition(cond, token);
                self.process_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.process_statement(else_branch);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond, token);
                self.process_statement(body);
            }
            StmtKind::For { init, cond, update, body } => {
                if let Some(env) = self.envs.top_mut() {
                    env.blocks.push(crate::scope::BlockScope::default());
                }
                for statement in init {
                    self.process_statement(statement);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond, token);
                }
                for expr in update {
                    self.process_expression(expr);
                }
                self.process_statement(body);
                if let Some(env) = self.envs.top_mut() {
                    env.blocks.pop();
                }
            }
            StmtKind::Return { value } => {
                self.process_return(value, token);
            }
            StmtKind::Throw { value } => {
                let thrown = self.process_expression(value);
                let throwable = Type::class(self.store.well_known().throwable, vec![]);
                if !thrown.is_error() && !is_subtype(&self.store, &thrown, &throwable) {
                    self.report(
                        SemanticErrorKind::IncompatibleTypes,
                        token,
                        format!("{} is not throwable", thrown.display(&self.store)),
                    );
                }
                if self.is_checked_exception(&thrown) {
                    if let Some(env) = self.envs.top_mut() {
                        if let Some(context) = env.try_throws.last_mut() {
                            context.push(thrown);
                        }
                    }
                }
            }
            StmtKind::Try { body, catches, finally } => {
                let catch_count = catches.len();
                if let Some(env) = self.envs.top_mut() {
                    env.try_throws.push(Vec::new());
                }
                self.process_statement(body);
                if let Some(env) = self.envs.top_mut() {
                    env.try_throws.pop();
                }
                for index in 0..catch_count {
                    self.process_catch(stmt, index);
                }
                if let Some(finally) = finally {
                    self.process_statement(finally);
                }
            }
            StmtKind::ExplicitCtorCall { is_super, args, .. } => {
                self.process_explicit_ctor_call(stmt, is_super, args, token);
            }
        }
    }

    fn process_catch(&mut self, stmt: StmtId, index: usize) {
        let (name, ty_ref, body) = match &self.ast.stmt(stmt).kind {
            StmtKind::Try { catches, .. } => {
                let clause = &catches[index];
                (clause.param_name.clone(), clause.param_ty, clause.body)
            }
            _ => return,
        };
        let ty = self.resolve_type_ref(ty_ref);
        let owner = self.this_type().unwrap_or(javelin_core::ClassId::from_raw(0));
        let slot = self.envs.top().map(|e| e.next_local_slot).unwrap_or(0);
        let local = self.locals.alloc(crate::scope::LocalData {
            name: name.clone(),
            ty,
            flags: Flags::empty(),
            slot,
            value: None,
            owner,
            accessed_local: None,
        });
        if let Some(env) = self.envs.top_mut() {
            env.next_local_slot += 1;
            env.blocks.push(crate::scope::BlockScope::default());
            env.declare_local(name, local);
        }
        if let StmtKind::Try { catches, .. } = &mut self.ast.stmt_mut(stmt).kind {
            catches[index].param_symbol = Some(local);
        }
        self.process_statement(body);
        if let Some(env) = self.envs.top_mut() {
            env.blocks.pop();
        }
    }

    fn check_condition(&mut self, cond: ExprId, token: TokenIndex) {
        let ty = self.process_expression(cond);
        if self.unboxed(&ty) == Some(PrimitiveType::Boolean) {
            self.convert_to_type(cond, &Type::Primitive(PrimitiveType::Boolean));
        } else if !ty.is_error() {
            self.report(
                SemanticErrorKind::TypeNotBoolean,
                token,
                format!("condition must be boolean, found {}", ty.display(&self.store)),
            );
        }
    }

    fn process_local_var(
        &mut self,
        stmt: StmtId,
        name: Name,
        modifiers: Flags,
        ty_ref: javelin_core::TypeRefId,
        init: Option<ExprId>,
        token: TokenIndex,
    ) {
        let declared = self.resolve_type_ref(ty_ref);
        let mut constant = None;

        if let Some(init) = init {
            if let Type::Array(element) = &declared {
                if matches!(self.ast.expr(init).kind, ExprKind::ArrayInit { .. }) {
                    let element = (**element).clone();
                    self.process_array_initializer(init, &element);
                } else {
                    self.convert_initializer(init, &declared, token);
                }
            } else {
                self.convert_initializer(init, &declared, token);
            }
            if modifiers.is_final() {
                constant = self.ast.expr(init).value.clone();
            }
        }

        let owner = self.this_type().unwrap_or(javelin_core::ClassId::from_raw(0));
        let slot = self.envs.top().map(|e| e.next_local_slot).unwrap_or(0);
        let wide = matches!(
            declared,
            Type::Primitive(PrimitiveType::Long) | Type::Primitive(PrimitiveType::Double)
        );
        let local = self.locals.alloc(crate::scope::LocalData {
            name: name.clone(),
            ty: declared,
            flags: modifiers,
            slot,
            value: constant,
            owner,
            accessed_local: None,
        });
        if let Some(env) = self.envs.top_mut() {
            env.next_local_slot += if wide { 2 } else { 1 };
            env.declare_local(name, local);
        }
        if let StmtKind::LocalVar { symbol, .. } = &mut self.ast.stmt_mut(stmt).kind {
            *symbol = Some(local);
        }
    }

    fn convert_initializer(&mut self, init: ExprId, declared: &Type, token: TokenIndex) {
        let init_ty = self.process_expression(init);
        let value = self.ast.expr(init).value.clone();
        match assignment_conversion_with_const(&self.store, &init_ty, declared, value.as_ref()) {
            Some(conversion) => {
                self.report_conversion_warnings(&conversion.warnings.clone(), token);
                self.apply_conversion(init, declared, conversion);
            }
            None => {
                if !init_ty.is_error() && !declared.is_error() {
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
            }
        }
    }

    fn process_return(&mut self, value: Option<ExprId>, token: TokenIndex) {
        let expected = self
            .envs
            .top()
            .and_then(|env| env.enclosing_method)
            .and_then(|m| self.store.method(m))
            .map(|m| m.return_type.clone())
            .unwrap_or(Type::Void);

        match (value, &expected) {
            (None, Type::Void) => {}
            (None, _) => {
                self.report(
                    SemanticErrorKind::IncompatibleTypes,
                    token,
                    "this method must return a value",
                );
            }
            (Some(value), Type::Void) => {
                self.process_expression(value);
                self.report(
                    SemanticErrorKind::TypeIsVoid,
                    token,
                    "cannot return a value from a void method",
                );
            }
            (Some(value), expected) => {
                let expected = expected.clone();
                self.convert_initializer(value, &expected, token);
            }
        }
    }

    fn process_explicit_ctor_call(
        &mut self,
        stmt: StmtId,
        is_super: bool,
        args: Vec<ExprId>,
        token: TokenIndex,
    ) {
        let Some(this_class) = self.this_type() else {
            return;
        };
        let target = if is_super {
            match self.store.def(this_class).and_then(|d| d.super_class.clone()) {
                Some(super_ty) => super_ty,
                None => {
                    self.report(
                        SemanticErrorKind::SuperOfObject,
                        token,
                        "Object has no superclass constructor",
                    );
                    return;
                }
            }
        } else {
            self.self_view(this_class)
        };

        if let Some(env) = self.envs.top_mut() {
            env.in_explicit_ctor = true;
        }
        let mut arg_types = Vec::with_capacity(args.len());
        for &arg in &args {
            arg_types.push(self.process_expression(arg));
        }
        if let Some(env) = self.envs.top_mut() {
            env.in_explicit_ctor = false;
        }

        match resolve_constructor_call(&mut self.store, &target, &arg_types) {
            MethodResolution::Found(found) => {
                self.record_thrown_exceptions(found.method, token);
                for (index, &arg) in args.iter().enumerate() {
                    if let Some(param) = found.params.get(index).cloned() {
                        self.convert_to_type(arg, &param);
                    }
                }
                if let StmtKind::ExplicitCtorCall { resolved, .. } =
                    &mut self.ast.stmt_mut(stmt).kind
                {
                    *resolved = Some(found.method);
                }
            }
            MethodResolution::Ambiguous(_) => {
                self.report(
                    SemanticErrorKind::AmbiguousMethod,
                    token,
                    "the constructor invocation is ambiguous",
                );
            }
            MethodResolution::NotFound(_) => {
                if !arg_types.iter().any(Type::is_error) {
                    self.report(
                        SemanticErrorKind::NotFoundConstructor,
                        token,
                        format!(
                            "no constructor of {} matches the arguments",
                            target.display(&self.store)
                        ),
                    );
                }
            }
        }
    }
}

/// Constant value change under a primitive cast; reference casts keep the
/// value (String literals).
fn cast_constant(value: &ConstValue, target: &Type) -> Option<ConstValue> {
    let Some(prim) = target.as_primitive() else {
        return Some(value.clone());
    };
    match prim {
        PrimitiveType::Byte => value.as_long().map(|v| ConstValue::Int(v as i8 as i32)),
        PrimitiveType::Short => value.as_long().map(|v| ConstValue::Int(v as i16 as i32)),
        PrimitiveType::Char => value.as_long().map(|v| ConstValue::Int(v as u16 as i32)),
        PrimitiveType::Int => match value {
            ConstValue::Float(v) => Some(ConstValue::Int(*v as i32)),
            ConstValue::Double(v) => Some(ConstValue::Int(*v as i32)),
            _ => value.as_long().map(|v| ConstValue::Int(v as i32)),
        },
        PrimitiveType::Long => match value {
            ConstValue::Float(v) => Some(ConstValue::Long(*v as i64)),
            ConstValue::Double(v) => Some(ConstValue::Long(*v as i64)),
            _ => value.as_long().map(ConstValue::Long),
        },
        PrimitiveType::Float => value.as_double().map(|v| ConstValue::Float(v as f32)),
        PrimitiveType::Double => value.as_double().map(ConstValue::Double),
        PrimitiveType::Boolean => match value {
            ConstValue::Bool(v) => Some(ConstValue::Bool(*v)),
            _ => None,
        },
    }
}
