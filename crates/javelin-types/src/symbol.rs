//! The tagged symbol reference.
//!
//! Name resolution classifies every identifier as one of these; sites that
//! would downcast in a pointer-based design pattern-match instead, making
//! illegal casts unrepresentable.

use javelin_core::{ClassId, FieldId, LocalId, MethodId, PackageId, TypeParamId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Symbol {
    Package(PackageId),
    Class(ClassId),
    Method(MethodId),
    Field(FieldId),
    Local(LocalId),
    TypeParam(TypeParamId),
}

impl Symbol {
    pub fn as_class(self) -> Option<ClassId> {
        match self {
            Symbol::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_field(self) -> Option<FieldId> {
        match self {
            Symbol::Field(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_local(self) -> Option<LocalId> {
        match self {
            Symbol::Local(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_method(self) -> Option<MethodId> {
        match self {
            Symbol::Method(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, Symbol::Field(_) | Symbol::Local(_))
    }
}
