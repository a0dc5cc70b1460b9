use crate::classfile::{ClassFile, InnerClassInfo, MemberConstant};
use crate::descriptor::{parse_field_descriptor, parse_method_descriptor, FieldType, MethodDescriptor};
use crate::error::Result;
use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    MethodSignature as ParsedMethodSignature, TypeSignature,
};

/// Shallow view of a class from the classpath.
///
/// Member descriptors and `Signature` strings stay raw here; the type model
/// parses them against the containing type on first dereference, so an
/// archive full of classes the program never touches costs only this much.
#[derive(Debug, Clone)]
pub struct ClassStub {
    pub internal_name: String,
    pub binary_name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClassInfo>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<MemberConstant>,
    pub deprecated: bool,
}

#[derive(Debug, Clone)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute, unresolved.
    pub exceptions: Vec<String>,
    pub deprecated: bool,
}

impl ClassStub {
    pub fn from_classfile(class: &ClassFile) -> Self {
        ClassStub {
            internal_name: class.this_class.clone(),
            binary_name: class.this_class.replace('/', "."),
            access_flags: class.access_flags,
            super_class: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            signature: class.signature.clone(),
            inner_classes: class.inner_classes.clone(),
            fields: class
                .fields
                .iter()
                .map(|f| FieldStub {
                    access_flags: f.access_flags,
                    name: f.name.clone(),
                    descriptor: f.descriptor.clone(),
                    signature: f.signature.clone(),
                    constant_value: f.constant_value.clone(),
                    deprecated: f.deprecated,
                })
                .collect(),
            methods: class
                .methods
                .iter()
                .map(|m| MethodStub {
                    access_flags: m.access_flags,
                    name: m.name.clone(),
                    descriptor: m.descriptor.clone(),
                    signature: m.signature.clone(),
                    exceptions: m.exceptions.clone(),
                    deprecated: m.deprecated,
                })
                .collect(),
            deprecated: class.deprecated,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_classfile(&ClassFile::parse(bytes)?))
    }

    pub fn parsed_signature(&self) -> Result<Option<ClassSignature>> {
        self.signature.as_deref().map(parse_class_signature).transpose()
    }
}

impl FieldStub {
    pub fn parsed_descriptor(&self) -> Result<FieldType> {
        parse_field_descriptor(&self.descriptor)
    }

    pub fn parsed_signature(&self) -> Result<Option<TypeSignature>> {
        self.signature.as_deref().map(parse_field_signature).transpose()
    }
}

impl MethodStub {
    pub fn parsed_descriptor(&self) -> Result<MethodDescriptor> {
        parse_method_descriptor(&self.descriptor)
    }

    pub fn parsed_signature(&self) -> Result<Option<ParsedMethodSignature>> {
        self.signature.as_deref().map(parse_method_signature).transpose()
    }
}

impl ClassFile {
    pub fn stub(&self) -> ClassStub {
        ClassStub::from_classfile(self)
    }
}
