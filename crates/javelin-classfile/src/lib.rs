//! Class-file reading for Javelin.
//!
//! Decodes `.class` resources into [`ClassStub`]s: shallow records whose
//! members keep their descriptor and `Signature` strings raw, to be parsed
//! against the containing type on first dereference. Also owns the JVMS
//! `FieldDescriptor`/`MethodDescriptor` and `Signature` grammars, both
//! directions (parse and print).

mod classfile;
mod constant_pool;
pub mod descriptor;
mod error;
mod reader;
pub mod signature;
mod stub;

pub use classfile::{ClassFile, ClassMember, InnerClassInfo, MemberConstant};
pub use constant_pool::ConstantPool;
pub use descriptor::{
    parse_field_descriptor, parse_method_descriptor, BaseType, FieldType, MethodDescriptor,
    ReturnType,
};
pub use error::{Error, Result};
pub use signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSegment, ClassTypeSignature, MethodSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
pub use stub::{ClassStub, FieldStub, MethodStub};

pub mod access_flags {
    //! JVMS access-flag masks as they appear on the wire.
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_SYNCHRONIZED: u16 = 0x0020;
    pub const ACC_VOLATILE: u16 = 0x0040;
    pub const ACC_VARARGS: u16 = 0x0080;
    pub const ACC_TRANSIENT: u16 = 0x0080;
    pub const ACC_NATIVE: u16 = 0x0100;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_STRICT: u16 = 0x0800;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
    pub const ACC_ANNOTATION: u16 = 0x2000;
    pub const ACC_ENUM: u16 = 0x4000;
}
