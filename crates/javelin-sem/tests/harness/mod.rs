//! Shared scaffolding for the semantic-pass tests: builds AST arenas the
//! way the parser driver would, then runs the full analysis.

use javelin_core::{ExprId, FileId, Name, StmtId, TokenIndex, TypeRefId};
use javelin_sem::Semantic;
use javelin_syntax::{
    Ast, BinaryOpKind, CompilationUnit, ExprKind, FieldDecl, ImportDecl, LexStream, Lit,
    MethodDecl, ParamDecl, QualifiedName, StmtKind, TypeDecl, TypeDeclId, TypeDeclKind,
};
use javelin_types::{Flags, PrimitiveType, TypeStore};

pub struct Fixture {
    pub ast: Ast,
    pub lex: LexStream,
    package: Option<QualifiedName>,
    imports: Vec<ImportDecl>,
    types: Vec<TypeDeclId>,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Self {
            ast: Ast::new(),
            lex: LexStream::new(FileId::from_raw(0), "Test.java"),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn tok(&mut self, text: &str) -> TokenIndex {
        self.lex.push_token(text, 1)
    }

    pub fn qualified(&mut self, dotted: &str) -> QualifiedName {
        let token = self.tok(dotted);
        QualifiedName {
            parts: dotted.split('.').map(Name::new).collect(),
            token,
        }
    }

    pub fn set_package(&mut self, dotted: &str) {
        self.package = Some(self.qualified(dotted));
    }

    pub fn import_static(&mut self, type_name: &str, member: &str) {
        let type_name = self.qualified(type_name);
        let token = self.tok(member);
        self.imports.push(ImportDecl::SingleStatic {
            type_name,
            member: Name::new(member),
            token,
        });
    }

    pub fn import_static_on_demand(&mut self, type_name: &str) {
        let type_name = self.qualified(type_name);
        self.imports.push(ImportDecl::StaticOnDemand { type_name });
    }

    // -- type references -------------------------------------------------

    pub fn prim_ref(&mut self, prim: PrimitiveType) -> TypeRefId {
        let token = self.tok(prim.name());
        self.ast
            .alloc_type_ref(javelin_syntax::TypeRefKind::Primitive(prim), token)
    }

    pub fn named_ref(&mut self, name: &str) -> TypeRefId {
        self.named_ref_with_args(name, vec![])
    }

    pub fn named_ref_with_args(&mut self, name: &str, args: Vec<TypeRefId>) -> TypeRefId {
        let qualified = self.qualified(name);
        let token = qualified.token;
        self.ast.alloc_type_ref(
            javelin_syntax::TypeRefKind::Named { name: qualified, args },
            token,
        )
    }

    pub fn array_ref(&mut self, component: TypeRefId) -> TypeRefId {
        let token = self.ast.type_ref(component).token;
        self.ast
            .alloc_type_ref(javelin_syntax::TypeRefKind::Array { component }, token)
    }

    // -- expressions -----------------------------------------------------

    pub fn int_lit(&mut self, value: i32) -> ExprId {
        let token = self.tok(&value.to_string());
        self.ast.alloc_expr(ExprKind::Literal(Lit::Int(value)), token)
    }

    pub fn str_lit(&mut self, value: &str) -> ExprId {
        let token = self.tok(value);
        self.ast
            .alloc_expr(ExprKind::Literal(Lit::Str(value.to_string())), token)
    }

    pub fn name(&mut self, text: &str) -> ExprId {
        let token = self.tok(text);
        self.ast.alloc_expr(
            ExprKind::Name { qualifier: None, name: Name::new(text) },
            token,
        )
    }

    pub fn binary(&mut self, op: BinaryOpKind, left: ExprId, right: ExprId) -> ExprId {
        let token = self.ast.expr(left).token;
        self.ast
            .alloc_expr(ExprKind::Binary { op, left, right }, token)
    }

    pub fn call(&mut self, base: Option<ExprId>, name: &str, args: Vec<ExprId>) -> ExprId {
        let token = self.tok(name);
        self.ast.alloc_expr(
            ExprKind::MethodCall { base, name: Name::new(name), type_args: vec![], args },
            token,
        )
    }

    pub fn new_array_with_init(&mut self, element: TypeRefId, elements: Vec<ExprId>) -> ExprId {
        let token = self.ast.type_ref(element).token;
        let init = self.ast.alloc_expr(ExprKind::ArrayInit { elements }, token);
        self.ast.alloc_expr(
            ExprKind::NewArray { element, dims: vec![], extra_dims: 1, init: Some(init) },
            token,
        )
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        let token = self.ast.expr(expr).token;
        self.ast.alloc_stmt(StmtKind::Expr { expr }, token)
    }

    pub fn block(&mut self, statements: Vec<StmtId>) -> StmtId {
        let token = TokenIndex::from_raw(0);
        self.ast.alloc_stmt(StmtKind::Block { statements }, token)
    }

    pub fn local(
        &mut self,
        name: &str,
        ty: TypeRefId,
        modifiers: Flags,
        init: Option<ExprId>,
    ) -> StmtId {
        let token = self.tok(name);
        self.ast.alloc_stmt(
            StmtKind::LocalVar { name: Name::new(name), modifiers, ty, init, symbol: None },
            token,
        )
    }

    // -- declarations ----------------------------------------------------

    pub fn field(&mut self, name: &str, ty: TypeRefId, modifiers: Flags, init: Option<ExprId>) -> FieldDecl {
        let token = self.tok(name);
        FieldDecl { name: Name::new(name), token, modifiers, ty, init, symbol: None }
    }

    pub fn param(&mut self, name: &str, ty: TypeRefId) -> ParamDecl {
        let token = self.tok(name);
        ParamDecl { name: Name::new(name), token, ty, varargs: false, symbol: None }
    }

    pub fn varargs_param(&mut self, name: &str, element: TypeRefId) -> ParamDecl {
        let ty = self.array_ref(element);
        let token = self.tok(name);
        ParamDecl { name: Name::new(name), token, ty, varargs: true, symbol: None }
    }

    pub fn method(
        &mut self,
        name: &str,
        modifiers: Flags,
        params: Vec<ParamDecl>,
        return_type: Option<TypeRefId>,
        body: Option<StmtId>,
    ) -> MethodDecl {
        let token = self.tok(name);
        MethodDecl {
            name: Name::new(name),
            token,
            modifiers,
            is_constructor: false,
            type_params: vec![],
            params,
            return_type,
            throws: vec![],
            body,
            symbol: None,
        }
    }

    pub fn class(&mut self, name: &str, modifiers: Flags) -> TypeDecl {
        let token = self.tok(name);
        TypeDecl {
            name: Name::new(name),
            token,
            kind: TypeDeclKind::Class,
            modifiers,
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            initializers: vec![],
            nested: vec![],
            symbol: None,
        }
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> TypeDeclId {
        let id = self.ast.alloc_type_decl(decl);
        self.types.push(id);
        id
    }

    pub fn add_nested_type(&mut self, decl: TypeDecl) -> TypeDeclId {
        self.ast.alloc_type_decl(decl)
    }

    /// Finish the unit: the (ast, lex) pair a driver run consumes.
    pub fn into_parts(mut self) -> (Ast, LexStream) {
        self.ast.units.push(CompilationUnit {
            file: FileId::from_raw(0),
            package: self.package.take(),
            imports: std::mem::take(&mut self.imports),
            types: std::mem::take(&mut self.types),
            bad: false,
        });
        (self.ast, self.lex)
    }

    /// Finish the unit and run the whole pass without a classpath.
    pub fn analyze(self) -> Semantic<'static> {
        let (ast, lex) = self.into_parts();
        let mut sem = Semantic::new(TypeStore::with_minimal_jdk(), ast, lex, None);
        sem.analyze();
        sem
    }
}

/// All diagnostics with the given code.
#[allow(dead_code)]
pub fn codes<'a>(sem: &'a Semantic<'_>, code: &'a str) -> Vec<&'a javelin_core::Diagnostic> {
    sem.diagnostics.iter().filter(|d| d.code == code).collect()
}
