//! The semantic driver: per-compilation state and the shared helpers the
//! resolver, typer and synthesis passes hang off.

use std::collections::HashMap;

use javelin_core::{
    ClassId, Diagnostic, Diagnostics, ExprId, FieldId, LocalId, MethodId, Name, TokenIndex,
};
use javelin_syntax::{Ast, LexStream, QualifiedName, TypeDeclId, TypeRefKind, WildcardKind};
use javelin_types::{
    AccessedMember, ClasspathProvider, Flags, Symbol, Type, TypeStore, WildcardBound,
};

use crate::errors::SemanticErrorKind;
use crate::imports::Imports;
use crate::packages::PackageTree;
use crate::scope::{EnvStack, Locals};

/// Emission target; decides the accessor-name prefix and nested-name
/// mangling.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetRelease {
    /// Pre-1.5 class files: `access$<n>`, `Outer$Inner`.
    Java14,
    /// 1.5 and later: the dash prefix.
    Java5,
}

pub struct Semantic<'a> {
    pub store: TypeStore,
    pub ast: Ast,
    pub lex: LexStream,
    pub diagnostics: Diagnostics,
    pub packages: PackageTree,
    pub classpath: Option<&'a dyn ClasspathProvider>,
    pub locals: Locals,
    pub imports: Imports,
    pub target: TargetRelease,

    pub(crate) envs: EnvStack,
    pub(crate) unit: usize,

    // Synthesis state.
    pub(crate) accessor_cache: HashMap<(AccessedMember, ClassId), MethodId>,
    pub(crate) write_accessor_cache: HashMap<(FieldId, ClassId), MethodId>,
    pub(crate) ctor_accessor_cache: HashMap<MethodId, MethodId>,
    pub(crate) accessor_counters: HashMap<ClassId, u32>,
    pub(crate) placeholder_types: HashMap<ClassId, ClassId>,
    pub(crate) anon_counters: HashMap<ClassId, u32>,
    pub(crate) enclosing_field: HashMap<ClassId, FieldId>,
    pub(crate) capture_fields: HashMap<(ClassId, LocalId), FieldId>,
    /// Per local class, the captures in creation order:
    /// (captured local, `val$` field, shadow variable).
    pub(crate) capture_order: HashMap<ClassId, Vec<(LocalId, FieldId, LocalId)>>,
    /// Constructor calls made before a local class closed over its
    /// captures; patched when the class completes.
    pub(crate) deferred_ctor_calls: HashMap<ClassId, Vec<ExprId>>,
    pub(crate) class_decl: HashMap<ClassId, TypeDeclId>,
    /// Final fields whose constant value is being computed, for cycles.
    pub(crate) fields_in_progress: Vec<FieldId>,
}

impl<'a> Semantic<'a> {
    pub fn new(
        store: TypeStore,
        ast: Ast,
        lex: LexStream,
        classpath: Option<&'a dyn ClasspathProvider>,
    ) -> Self {
        Self {
            store,
            ast,
            lex,
            diagnostics: Diagnostics::new(),
            packages: PackageTree::new(),
            classpath,
            locals: Locals::default(),
            imports: Imports::default(),
            target: TargetRelease::Java14,
            envs: EnvStack::default(),
            unit: 0,
            accessor_cache: HashMap::new(),
            write_accessor_cache: HashMap::new(),
            ctor_accessor_cache: HashMap::new(),
            accessor_counters: HashMap::new(),
            placeholder_types: HashMap::new(),
            anon_counters: HashMap::new(),
            enclosing_field: HashMap::new(),
            capture_fields: HashMap::new(),
            capture_order: HashMap::new(),
            deferred_ctor_calls: HashMap::new(),
            class_decl: HashMap::new(),
            fields_in_progress: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: TargetRelease) -> Self {
        self.target = target;
        self
    }

    pub fn report(&mut self, kind: SemanticErrorKind, token: TokenIndex, message: impl Into<String>) {
        self.report_with_args(kind, token, message, Vec::new());
    }

    pub fn report_with_args(
        &mut self,
        kind: SemanticErrorKind,
        token: TokenIndex,
        message: impl Into<String>,
        args: Vec<String>,
    ) {
        let diagnostic =
            Diagnostic::new(self.lex.file(), token, kind.severity(), kind.code(), message)
                .with_args(args);
        self.diagnostics.push(diagnostic);
    }

    /// A `bad` (unloadable) type produces a diagnostic only when the unit
    /// has no errors yet, so one broken archive does not drown the output.
    pub(crate) fn report_bad_type(&mut self, token: TokenIndex, name: &str) {
        if !self.diagnostics.has_errors() {
            self.report(
                SemanticErrorKind::NotFoundType,
                token,
                format!("type {name} could not be loaded"),
            );
        }
    }

    /// The innermost enclosing type being processed.
    pub(crate) fn this_type(&self) -> Option<ClassId> {
        self.envs.top().map(|env| env.class)
    }

    // -- accessibility ---------------------------------------------------

    /// The reflexive-transitive containing type with no enclosing type.
    pub(crate) fn outermost_type(&self, mut id: ClassId) -> ClassId {
        while let Some(enclosing) = self.store.def(id).and_then(|def| def.enclosing) {
            id = enclosing;
        }
        id
    }

    pub(crate) fn same_package(&self, a: ClassId, b: ClassId) -> bool {
        match (self.store.def(a), self.store.def(b)) {
            (Some(da), Some(db)) => da.package_name() == db.package_name(),
            _ => true,
        }
    }

    fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut cursor = Some(sub);
        while let Some(id) = cursor {
            if id == sup {
                return true;
            }
            cursor = self
                .store
                .def(id)
                .and_then(|def| def.super_class.as_ref())
                .and_then(Type::class_id);
        }
        false
    }

    /// Whether a member with `flags` declared in `declaring` is accessible
    /// from code in `from`.
    pub(crate) fn member_accessible(
        &self,
        flags: Flags,
        declaring: ClassId,
        from: ClassId,
    ) -> bool {
        if flags.is_public() {
            return true;
        }
        if flags.is_private() {
            return self.outermost_type(declaring) == self.outermost_type(from);
        }
        if self.same_package(declaring, from) {
            return true;
        }
        flags.is_protected() && self.is_subclass_of(from, declaring)
    }

    /// Whether reaching the member requires a synthetic accessor: it is
    /// accessible, but the JVM-level access check would fail (private
    /// across class boundaries, or protected across packages through an
    /// enclosing class).
    pub(crate) fn needs_accessor(&self, flags: Flags, declaring: ClassId, from: ClassId) -> bool {
        if flags.is_private() {
            return declaring != from
                && self.outermost_type(declaring) == self.outermost_type(from);
        }
        if flags.is_protected() && !self.same_package(declaring, from) {
            // Inside a subclass the JVM allows the access; only an
            // enclosing (non-subclass) scope needs the bridge.
            return !self.is_subclass_of(from, declaring);
        }
        false
    }

    // -- type references -------------------------------------------------

    /// Resolve a syntactic type reference to a `Type`, memoised on the
    /// node.
    pub(crate) fn resolve_type_ref(&mut self, id: javelin_core::TypeRefId) -> Type {
        if let Some(resolved) = &self.ast.type_ref(id).resolved {
            return resolved.clone();
        }
        let token = self.ast.type_ref(id).token;
        let resolved = match self.ast.type_ref(id).kind.clone() {
            TypeRefKind::Primitive(p) => Type::Primitive(p),
            TypeRefKind::Void => Type::Void,
            TypeRefKind::Array { component } => Type::array(self.resolve_type_ref(component)),
            TypeRefKind::Wildcard { bound } => match bound {
                None => Type::Wildcard(WildcardBound::Unbounded),
                Some((kind, bound_ref)) => {
                    let bound_ty = self.resolve_type_ref(bound_ref);
                    match kind {
                        WildcardKind::Extends => {
                            Type::Wildcard(WildcardBound::Extends(Box::new(bound_ty)))
                        }
                        WildcardKind::Super => {
                            Type::Wildcard(WildcardBound::Super(Box::new(bound_ty)))
                        }
                    }
                }
            },
            TypeRefKind::Named { name, args } => {
                let arg_types: Vec<Type> =
                    args.iter().map(|&arg| self.resolve_type_ref(arg)).collect();
                self.resolve_named_type(&name, arg_types, token)
            }
        };
        self.ast.type_ref_mut(id).resolved = Some(resolved.clone());
        resolved
    }

    fn resolve_named_type(
        &mut self,
        name: &QualifiedName,
        args: Vec<Type>,
        token: TokenIndex,
    ) -> Type {
        let first = &name.parts[0];

        if name.parts.len() == 1 {
            // A simple type name may be a type parameter of the enclosing
            // method or classes.
            if let Some(param) = self.find_type_parameter(first) {
                if !args.is_empty() {
                    self.report(
                        SemanticErrorKind::IncompatibleTypes,
                        token,
                        format!("type parameter {first} cannot take type arguments"),
                    );
                }
                return Type::TypeVar(param);
            }
            match self.find_type_by_simple_name(first, token) {
                Some(id) => return Type::class(id, args),
                None => {
                    self.report_type_not_found(first, token);
                    return Type::Error;
                }
            }
        }

        // Qualified: the longest prefix that names a package, then type
        // selectors.
        let dotted = name.dotted();
        if let Some(id) = self.lookup_binary_type(&dotted) {
            return Type::class(id, args);
        }
        // Try package.Type$Nested spellings right to left.
        for split in (1..name.parts.len()).rev() {
            let package = name.parts[..split]
                .iter()
                .map(Name::as_str)
                .collect::<Vec<_>>()
                .join(".");
            let rest = name.parts[split..]
                .iter()
                .map(Name::as_str)
                .collect::<Vec<_>>()
                .join("$");
            let binary = format!("{package}.{rest}");
            if let Some(id) = self.lookup_binary_type(&binary) {
                return Type::class(id, args);
            }
        }

        self.report_type_not_found(&Name::new(dotted.as_str()), token);
        Type::Error
    }

    pub(crate) fn lookup_binary_type(&mut self, binary: &str) -> Option<ClassId> {
        if let Some(id) = self.store.class_id(binary) {
            if self.store.is_defined(id) {
                return Some(id);
            }
        }
        let classpath = self.classpath?;
        self.store
            .load_external(binary, &javelin_types::ProviderView(classpath))
    }

    /// Import targets may be source types of this very compilation, which
    /// are declared but not yet defined when imports resolve. An interned
    /// id is enough; members resolve lazily at each use.
    pub(crate) fn lookup_import_target(&mut self, binary: &str) -> Option<ClassId> {
        if let Some(id) = self.store.class_id(binary) {
            return Some(id);
        }
        let classpath = self.classpath?;
        if classpath.type_exists(binary) {
            self.store
                .load_external(binary, &javelin_types::ProviderView(classpath))
        } else {
            None
        }
    }

    /// Scan enclosing method/class type parameters, innermost first.
    pub(crate) fn find_type_parameter(&self, name: &Name) -> Option<javelin_core::TypeParamId> {
        for env in self.envs.iter_outward() {
            if let Some(method) = env.enclosing_method {
                if let Some(def) = self.store.method(method) {
                    for &param in &def.type_params {
                        if let Some(p) = self.store.type_param(param) {
                            if p.name == name.as_str() {
                                return Some(param);
                            }
                        }
                    }
                }
            }
            if let Some(def) = self.store.def(env.class) {
                for &param in &def.type_params {
                    if let Some(p) = self.store.type_param(param) {
                        if p.name == name.as_str() {
                            return Some(param);
                        }
                    }
                }
            }
        }
        None
    }

    /// JLS 6.5.5 simple type-name lookup: nested types of enclosing
    /// classes, single-type imports, unit types, same package, on-demand
    /// imports.
    pub(crate) fn find_type_by_simple_name(
        &mut self,
        name: &Name,
        token: TokenIndex,
    ) -> Option<ClassId> {
        // Nested types visible from the enclosing classes.
        let envs: Vec<ClassId> = self.envs.iter_outward().map(|env| env.class).collect();
        for class in envs {
            if self
                .store
                .def(class)
                .map(|def| def.simple_name() == name.as_str())
                .unwrap_or(false)
            {
                return Some(class);
            }
            if let Some(found) = javelin_types::resolve_nested_type(&mut self.store, class, name.as_str()) {
                return Some(found);
            }
        }

        if let Some(found) = self.imports.single_type(name) {
            return Some(found);
        }

        // Types of this compilation unit and of the unit's package.
        let package = self.unit_package();
        if let Some(found) =
            self.packages
                .find_type(package, name, &mut self.store, self.classpath)
        {
            return Some(found);
        }
        // On-demand imports; more than one hit is an error.
        let mut found: Option<ClassId> = None;
        let on_demand: Vec<javelin_core::PackageId> =
            self.imports.on_demand_packages.clone();
        for pkg in on_demand {
            if let Some(id) = self
                .packages
                .find_type(pkg, name, &mut self.store, self.classpath)
            {
                if let Some(previous) = found {
                    if previous != id {
                        self.report(
                            SemanticErrorKind::AmbiguousType,
                            token,
                            format!("the type {name} is imported on demand from more than one package"),
                        );
                        return Some(previous);
                    }
                } else {
                    found = Some(id);
                }
            }
        }
        let on_demand_types: Vec<ClassId> = self.imports.on_demand_types.clone();
        for ty in on_demand_types {
            if let Some(id) = javelin_types::resolve_nested_type(&mut self.store, ty, name.as_str()) {
                if found.is_none() {
                    found = Some(id);
                }
            }
        }
        if found.is_some() {
            return found;
        }

        // java.lang is imported on demand implicitly.
        self.lookup_binary_type(&format!("java.lang.{name}"))
    }

    pub(crate) fn unit_package(&mut self) -> javelin_core::PackageId {
        let dotted = self
            .ast
            .units
            .get(self.unit)
            .and_then(|unit| unit.package.as_ref())
            .map(QualifiedName::dotted)
            .unwrap_or_default();
        self.packages.intern(&dotted)
    }

    pub(crate) fn report_type_not_found(&mut self, name: &Name, token: TokenIndex) {
        // Misspelling search across the visible packages.
        let package = self.unit_package();
        let names = self.packages.type_names(package, self.classpath);
        let suggestion =
            crate::spell::best_match(name.as_str(), names.iter().map(String::as_str));
        let message = match &suggestion {
            Some(better) => format!("{name} cannot be resolved to a type; did you mean {better}?"),
            None => format!("{name} cannot be resolved to a type"),
        };
        let mut args = vec![name.as_str().to_string()];
        args.extend(suggestion);
        self.report_with_args(SemanticErrorKind::NotFoundType, token, message, args);
    }

    /// Record the chosen symbol plus its deprecation/synthetic advisories.
    pub(crate) fn note_member_use(&mut self, symbol: Symbol, token: TokenIndex) {
        let (flags, description) = match symbol {
            Symbol::Field(id) => match self.store.field(id) {
                Some(field) => (field.flags, field.name.clone()),
                None => return,
            },
            Symbol::Method(id) => match self.store.method(id) {
                Some(method) => {
                    // Enum `values`/`valueOf` are compiler-minted and exempt.
                    let enum_helper = self
                        .store
                        .def(id.class)
                        .map(|def| def.flags.contains(Flags::ENUM))
                        .unwrap_or(false)
                        && matches!(method.name.as_str(), "values" | "valueOf");
                    if enum_helper {
                        return;
                    }
                    (method.flags, method.name.clone())
                }
                None => return,
            },
            Symbol::Class(id) => match self.store.def(id) {
                Some(def) => (def.flags, def.name.clone()),
                None => return,
            },
            _ => return,
        };
        if flags.is_deprecated() {
            self.report(
                SemanticErrorKind::Deprecated,
                token,
                format!("{description} is deprecated"),
            );
        }
        if flags.is_synthetic() {
            self.report(
                SemanticErrorKind::SyntheticAccess,
                token,
                format!("{description} is synthetic and not meant to be referenced"),
            );
        }
    }
}
