use javelin_classfile::access_flags as acc;

bitflags::bitflags! {
    /// Declared access/modifier flags plus the processing-state bits the
    /// pass driver uses to make header and member processing idempotent.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct Flags: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const INTERFACE = 1 << 6;
        const SYNTHETIC = 1 << 7;
        const ENUM = 1 << 8;
        const VARARGS = 1 << 9;
        const STRICTFP = 1 << 10;
        const NATIVE = 1 << 11;
        const VOLATILE = 1 << 12;
        const TRANSIENT = 1 << 13;
        const SYNCHRONIZED = 1 << 14;
        const DEPRECATED = 1 << 15;

        // Processing state.
        const HEADER_PROCESSED = 1 << 20;
        const MEMBERS_PROCESSED = 1 << 21;
        const COMPLETE = 1 << 22;
        const SOURCE_PENDING = 1 << 23;
        const ANONYMOUS = 1 << 24;
        const LOCAL = 1 << 25;
        const BAD = 1 << 26;
    }
}

impl Flags {
    pub fn from_class_access(flags: u16) -> Self {
        let mut out = Flags::empty();
        if flags & acc::ACC_PUBLIC != 0 {
            out |= Flags::PUBLIC;
        }
        if flags & acc::ACC_PRIVATE != 0 {
            out |= Flags::PRIVATE;
        }
        if flags & acc::ACC_PROTECTED != 0 {
            out |= Flags::PROTECTED;
        }
        if flags & acc::ACC_STATIC != 0 {
            out |= Flags::STATIC;
        }
        if flags & acc::ACC_FINAL != 0 {
            out |= Flags::FINAL;
        }
        if flags & acc::ACC_INTERFACE != 0 {
            out |= Flags::INTERFACE;
        }
        if flags & acc::ACC_ABSTRACT != 0 {
            out |= Flags::ABSTRACT;
        }
        if flags & acc::ACC_SYNTHETIC != 0 {
            out |= Flags::SYNTHETIC;
        }
        if flags & acc::ACC_ENUM != 0 {
            out |= Flags::ENUM;
        }
        if flags & acc::ACC_STRICT != 0 {
            out |= Flags::STRICTFP;
        }
        out
    }

    pub fn from_field_access(flags: u16) -> Self {
        let mut out = Self::from_class_access(flags & !(acc::ACC_INTERFACE | acc::ACC_STRICT));
        if flags & acc::ACC_VOLATILE != 0 {
            out |= Flags::VOLATILE;
        }
        if flags & acc::ACC_TRANSIENT != 0 {
            out |= Flags::TRANSIENT;
        }
        out
    }

    pub fn from_method_access(flags: u16) -> Self {
        let mut out = Self::from_class_access(flags & !acc::ACC_INTERFACE);
        if flags & acc::ACC_VARARGS != 0 {
            out |= Flags::VARARGS;
        }
        if flags & acc::ACC_NATIVE != 0 {
            out |= Flags::NATIVE;
        }
        if flags & acc::ACC_SYNCHRONIZED != 0 {
            out |= Flags::SYNCHRONIZED;
        }
        out
    }

    /// The `ACC_*` mask a class-file writer would emit for a member with
    /// these flags.
    pub fn to_member_access(self) -> u16 {
        let mut out = 0u16;
        if self.contains(Flags::PUBLIC) {
            out |= acc::ACC_PUBLIC;
        }
        if self.contains(Flags::PRIVATE) {
            out |= acc::ACC_PRIVATE;
        }
        if self.contains(Flags::PROTECTED) {
            out |= acc::ACC_PROTECTED;
        }
        if self.contains(Flags::STATIC) {
            out |= acc::ACC_STATIC;
        }
        if self.contains(Flags::FINAL) {
            out |= acc::ACC_FINAL;
        }
        if self.contains(Flags::ABSTRACT) {
            out |= acc::ACC_ABSTRACT;
        }
        if self.contains(Flags::SYNTHETIC) {
            out |= acc::ACC_SYNTHETIC;
        }
        if self.contains(Flags::ENUM) {
            out |= acc::ACC_ENUM;
        }
        if self.contains(Flags::VARARGS) {
            out |= acc::ACC_VARARGS;
        }
        if self.contains(Flags::STRICTFP) {
            out |= acc::ACC_STRICT;
        }
        out
    }

    pub fn is_public(self) -> bool {
        self.contains(Flags::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(Flags::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Flags::PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(Flags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Flags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Flags::ABSTRACT)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(Flags::SYNTHETIC)
    }

    pub fn is_varargs(self) -> bool {
        self.contains(Flags::VARARGS)
    }

    pub fn is_deprecated(self) -> bool {
        self.contains(Flags::DEPRECATED)
    }

    pub fn is_bad(self) -> bool {
        self.contains(Flags::BAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_flag_round_trip_for_synthetic_member() {
        let flags = Flags::STATIC | Flags::SYNTHETIC;
        let acc = flags.to_member_access();
        assert_eq!(acc, 0x0008 | 0x1000);
        assert_eq!(Flags::from_method_access(acc), flags);
    }
}
