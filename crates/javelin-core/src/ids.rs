//! Strongly-typed ids used across Javelin.
//!
//! Symbols, AST nodes and tokens are all arena entries addressed by index.
//! Wrapping the index gives O(1) identity comparison without smart-pointer
//! cycles through the symbol graph.

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn to_raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// A source file (or class-file resource) participating in a compilation.
    FileId
);
define_id!(
    /// An index into a file's token stream. Diagnostics are keyed by this.
    TokenIndex
);
define_id!(
    /// A package node in the classpath package tree.
    PackageId
);
define_id!(
    /// A class, interface, enum or array type in the type store.
    ClassId
);
define_id!(
    /// A type parameter declared by a class or a method.
    TypeParamId
);
define_id!(
    /// A local variable or formal parameter in a block scope.
    LocalId
);
define_id!(
    /// A block scope inside a method body.
    BlockId
);
define_id!(
    /// An expression node in the AST arena.
    ExprId
);
define_id!(
    /// A statement node in the AST arena.
    StmtId
);
define_id!(
    /// A syntactic type reference (name + type arguments + array dims).
    TypeRefId
);

/// A method or constructor, addressed by its containing class and slot.
///
/// Constructors and methods live in separate per-class lists, so the slot
/// alone is ambiguous; the flag disambiguates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MethodId {
    pub class: ClassId,
    pub index: u32,
    pub is_constructor: bool,
}

impl MethodId {
    #[inline]
    pub const fn method(class: ClassId, index: u32) -> Self {
        Self { class, index, is_constructor: false }
    }

    #[inline]
    pub const fn constructor(class: ClassId, index: u32) -> Self {
        Self { class, index, is_constructor: true }
    }
}

impl std::fmt::Debug for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_constructor { "ctor" } else { "method" };
        write!(f, "MethodId({:?}.{}#{})", self.class, kind, self.index)
    }
}

/// A field, addressed by its containing class and slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FieldId {
    pub class: ClassId,
    pub index: u32,
}

impl FieldId {
    #[inline]
    pub const fn new(class: ClassId, index: u32) -> Self {
        Self { class, index }
    }
}

impl std::fmt::Debug for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldId({:?}#{})", self.class, self.index)
    }
}
