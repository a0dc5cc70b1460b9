//! The abstract syntax tree the semantic core consumes and annotates.
//!
//! The parser is an external collaborator: it (or a test) builds the arena
//! in [`Ast`] and the token table in [`LexStream`], then hands both to the
//! semantic pass. Expression nodes carry mutable slots — resolved symbol,
//! constant value, resolved (post-substitution) types, synthesised write
//! accessor — that the pass fills in and the bytecode emitter reads back.

mod ast;
mod token;

pub use ast::{
    Ast, BinaryOpKind, CatchClause, CompilationUnit, Expr, ExprKind, FieldDecl, ImportDecl,
    InitializerDecl, Lit, MethodDecl, ParamDecl, QualifiedName, Stmt, StmtKind, TypeDecl,
    TypeDeclId, TypeDeclKind, TypeParamDecl, TypeRef, TypeRefKind, UnaryOpKind, WildcardKind,
};
pub use token::LexStream;
