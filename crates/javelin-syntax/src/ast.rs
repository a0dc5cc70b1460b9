use javelin_core::{ExprId, FieldId, FileId, LocalId, MethodId, Name, StmtId, TokenIndex, TypeRefId};
use javelin_types::{
    ClassId, ConstValue, ConversionStep, Flags, PrimitiveType, Symbol, Type,
};

/// A nested arena holding every node of every compilation unit the driver
/// is processing. Nodes address each other by id, which keeps the tree
/// mutable in place while the semantic pass walks it.
#[derive(Default)]
pub struct Ast {
    pub units: Vec<CompilationUnit>,
    pub type_decls: Vec<TypeDecl>,
    pub exprs: Vec<Expr>,
    pub stmts: Vec<Stmt>,
    pub type_refs: Vec<TypeRef>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct TypeDeclId(pub u32);

impl TypeDeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, token: TokenIndex) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(Expr::new(kind, token));
        id
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, token: TokenIndex) -> StmtId {
        let id = StmtId::from_raw(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, token });
        id
    }

    pub fn alloc_type_ref(&mut self, kind: TypeRefKind, token: TokenIndex) -> TypeRefId {
        let id = TypeRefId::from_raw(self.type_refs.len() as u32);
        self.type_refs.push(TypeRef { kind, token, resolved: None });
        id
    }

    pub fn alloc_type_decl(&mut self, decl: TypeDecl) -> TypeDeclId {
        let id = TypeDeclId(self.type_decls.len() as u32);
        self.type_decls.push(decl);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id.index()]
    }

    pub fn type_ref(&self, id: TypeRefId) -> &TypeRef {
        &self.type_refs[id.index()]
    }

    pub fn type_ref_mut(&mut self, id: TypeRefId) -> &mut TypeRef {
        &mut self.type_refs[id.index()]
    }

    pub fn type_decl(&self, id: TypeDeclId) -> &TypeDecl {
        &self.type_decls[id.index()]
    }

    pub fn type_decl_mut(&mut self, id: TypeDeclId) -> &mut TypeDecl {
        &mut self.type_decls[id.index()]
    }
}

/// A dotted name as written, with the token of its first segment.
#[derive(Debug, Clone)]
pub struct QualifiedName {
    pub parts: Vec<Name>,
    pub token: TokenIndex,
}

impl QualifiedName {
    pub fn dotted(&self) -> String {
        self.parts
            .iter()
            .map(Name::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone)]
pub enum ImportDecl {
    /// `import java.util.List;`
    SingleType { name: QualifiedName },
    /// `import java.util.*;`
    OnDemand { name: QualifiedName },
    /// `import static java.lang.Math.max;`
    SingleStatic { type_name: QualifiedName, member: Name, token: TokenIndex },
    /// `import static java.lang.Math.*;`
    StaticOnDemand { type_name: QualifiedName },
}

pub struct CompilationUnit {
    pub file: FileId,
    pub package: Option<QualifiedName>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDeclId>,
    /// Fatal front-end failure: all later passes become no-ops.
    pub bad: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
}

pub struct TypeParamDecl {
    pub name: Name,
    pub token: TokenIndex,
    pub bounds: Vec<TypeRefId>,
}

pub struct TypeDecl {
    pub name: Name,
    pub token: TokenIndex,
    pub kind: TypeDeclKind,
    pub modifiers: Flags,
    pub type_params: Vec<TypeParamDecl>,
    pub extends: Option<TypeRefId>,
    pub implements: Vec<TypeRefId>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub initializers: Vec<InitializerDecl>,
    pub nested: Vec<TypeDeclId>,
    /// Filled by the header pass.
    pub symbol: Option<ClassId>,
}

pub struct FieldDecl {
    pub name: Name,
    pub token: TokenIndex,
    pub modifiers: Flags,
    pub ty: TypeRefId,
    pub init: Option<ExprId>,
    pub symbol: Option<FieldId>,
}

pub struct ParamDecl {
    pub name: Name,
    pub token: TokenIndex,
    pub ty: TypeRefId,
    pub varargs: bool,
    pub symbol: Option<LocalId>,
}

pub struct MethodDecl {
    pub name: Name,
    pub token: TokenIndex,
    pub modifiers: Flags,
    pub is_constructor: bool,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ParamDecl>,
    /// `None` for `void` and for constructors.
    pub return_type: Option<TypeRefId>,
    pub throws: Vec<TypeRefId>,
    pub body: Option<StmtId>,
    pub symbol: Option<MethodId>,
}

pub struct InitializerDecl {
    pub is_static: bool,
    pub body: StmtId,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WildcardKind {
    Extends,
    Super,
}

#[derive(Debug, Clone)]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Void,
    Named { name: QualifiedName, args: Vec<TypeRefId> },
    Wildcard { bound: Option<(WildcardKind, TypeRefId)> },
    Array { component: TypeRefId },
}

#[derive(Debug)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub token: TokenIndex,
    /// Filled when the reference is resolved against the environment.
    pub resolved: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Ushr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    AndAnd,
    OrOr,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOpKind {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Lit),
    /// An ambiguous (possibly qualified) name, pre-classification.
    Name { qualifier: Option<ExprId>, name: Name },
    /// A selector applied to an expression qualifier.
    FieldAccess { base: ExprId, name: Name },
    MethodCall {
        base: Option<ExprId>,
        name: Name,
        type_args: Vec<TypeRefId>,
        args: Vec<ExprId>,
    },
    This { qualifier: Option<TypeRefId> },
    Super { qualifier: Option<TypeRefId> },
    New {
        ty: TypeRefId,
        args: Vec<ExprId>,
        /// Anonymous class body.
        body: Option<TypeDeclId>,
        /// `expr.new Inner()` enclosing-instance base.
        enclosing: Option<ExprId>,
    },
    NewArray {
        element: TypeRefId,
        dims: Vec<ExprId>,
        extra_dims: u32,
        init: Option<ExprId>,
    },
    ArrayInit { elements: Vec<ExprId> },
    ArrayAccess { array: ExprId, index: ExprId },
    Cast { target: TypeRefId, expr: ExprId },
    InstanceOf { expr: ExprId, target: TypeRefId },
    Unary { op: UnaryOpKind, operand: ExprId },
    Binary { op: BinaryOpKind, left: ExprId, right: ExprId },
    Conditional { cond: ExprId, then_expr: ExprId, else_expr: ExprId },
    Assign { op: Option<BinaryOpKind>, lhs: ExprId, rhs: ExprId },
    ClassLiteral { target: TypeRefId },
    /// Synthesised by `ConvertToType`: an explicit conversion the emitter
    /// materialises.
    Conversion { operand: ExprId, to: Type, steps: Vec<ConversionStep> },
}

/// An expression node plus its mutable annotation slots.
#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub token: TokenIndex,
    /// Static type; `Some(Type::Error)` after a reported error. The
    /// output invariant is that this is never `None` once the owning
    /// body has been processed.
    pub ty: Option<Type>,
    /// The declaration this expression resolved to, when it names one.
    pub symbol: Option<Symbol>,
    /// Compile-time constant value, when the expression has one.
    pub value: Option<ConstValue>,
    /// Post-substitution erased type, when generic substitution changed
    /// the member's declared type.
    pub resolved_type: Option<Type>,
    /// Parameterised resolved type, tracked so the next call in a chain
    /// can substitute again.
    pub resolved_parameterized_type: Option<Type>,
    /// Write accessor for compound assignment through a private member.
    pub write_method: Option<MethodId>,
}

impl Expr {
    fn new(kind: ExprKind, token: TokenIndex) -> Self {
        Self {
            kind,
            token,
            ty: None,
            symbol: None,
            value: None,
            resolved_type: None,
            resolved_parameterized_type: None,
            write_method: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Empty,
    Block { statements: Vec<StmtId> },
    LocalVar {
        name: Name,
        modifiers: Flags,
        ty: TypeRefId,
        init: Option<ExprId>,
        symbol: Option<LocalId>,
    },
    Expr { expr: ExprId },
    If { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    While { cond: ExprId, body: StmtId },
    For {
        init: Vec<StmtId>,
        cond: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
    },
    Return { value: Option<ExprId> },
    Throw { value: ExprId },
    Try {
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    /// Explicit constructor invocation: `this(...)` or `super(...)`.
    ExplicitCtorCall { is_super: bool, args: Vec<ExprId>, resolved: Option<MethodId> },
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param_name: Name,
    pub param_ty: TypeRefId,
    pub param_symbol: Option<LocalId>,
    pub body: StmtId,
}

#[derive(Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub token: TokenIndex,
}
