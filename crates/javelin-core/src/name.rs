//! Shared name types and string interning.

use lasso::{Key, Rodeo, Spur};
use smol_str::SmolStr;

/// A lightweight owned identifier.
///
/// Backed by [`smol_str::SmolStr`], which stores short strings inline; Java
/// identifiers almost always fit.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Name").field(&self.0.as_str()).finish()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A symbolic identifier for a name stored in a [`NameInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct InternedName(Spur);

impl InternedName {
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0.into_usize() as u32
    }
}

impl std::fmt::Debug for InternedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InternedName({})", self.to_raw())
    }
}

/// Names the compiler itself mints for synthetic members.
///
/// `access$`/`class$` get a numeric or mangled suffix appended at the use
/// site; the rest are used verbatim.
pub mod synthetic {
    /// Enclosing-instance field of a non-static inner class.
    pub const THIS0: &str = "this$0";
    /// Prefix for captured-local shadow fields of local and anonymous classes.
    pub const VAL_PREFIX: &str = "val$";
    /// Prefix for private/protected accessor methods (pre-1.5 emission).
    pub const ACCESS_PREFIX: &str = "access$";
    /// Accessor prefix when emitting for 1.5+ targets.
    pub const ACCESS_PREFIX_15: &str = "-";
    /// Prefix for class-literal cache fields and their helper method.
    pub const CLASS_PREFIX: &str = "class$";
    /// Instance initializer / constructor special name.
    pub const INIT: &str = "<init>";
    /// Static initializer special name.
    pub const CLINIT: &str = "<clinit>";
}

/// An append-only string interner for frequently repeated identifiers.
///
/// One interner is owned by each compilation driver and threaded through
/// explicitly; there is no process-global pool.
#[derive(Default)]
pub struct NameInterner {
    rodeo: Rodeo,
}

impl NameInterner {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn intern(&mut self, text: &str) -> InternedName {
        InternedName(self.rodeo.get_or_intern(text))
    }

    #[inline]
    pub fn resolve(&self, name: InternedName) -> &str {
        self.rodeo.resolve(&name.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut interner = NameInterner::new();
        let a = interner.intern("toString");
        let b = interner.intern("hashCode");
        let a2 = interner.intern("toString");
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "toString");
    }
}
