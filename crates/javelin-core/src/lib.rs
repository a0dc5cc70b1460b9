//! Core shared types for Javelin.
//!
//! This crate is intentionally small: interned names, strongly-typed ids,
//! and the diagnostics primitives every other crate reports through.

pub mod diagnostic;
pub mod ids;
pub mod name;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use ids::{
    BlockId, ClassId, ExprId, FieldId, FileId, LocalId, MethodId, PackageId, StmtId, TokenIndex,
    TypeParamId, TypeRefId,
};
pub use name::{Name, NameInterner};
