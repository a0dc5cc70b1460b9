//! JVMS `Signature` attribute grammar, parse and print.
//!
//! Printing reproduces the input byte-for-byte; the signature synthesis in
//! the type model relies on this when it round-trips generated attributes.

use std::fmt;

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    pub return_type: Option<TypeSignature>, // None => void
    pub throws: Vec<TypeSignature>,         // class or type variable
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub package: Vec<String>,
    pub segments: Vec<ClassTypeSegment>,
}

impl ClassTypeSignature {
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package.join("/"));
            out.push('/');
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSegment {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Any,
    Exact(Box<TypeSignature>),
    Extends(Box<TypeSignature>),
    Super(Box<TypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Array(Box<TypeSignature>),
    Class(ClassTypeSignature),
    TypeVariable(String),
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Base(base) => write!(f, "{}", base.descriptor_char()),
            TypeSignature::Array(component) => write!(f, "[{component}"),
            TypeSignature::Class(class) => write!(f, "{class}"),
            TypeSignature::TypeVariable(name) => write!(f, "T{name};"),
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("L")?;
        for pkg in &self.package {
            write!(f, "{pkg}/")?;
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            f.write_str(&seg.name)?;
            if !seg.type_arguments.is_empty() {
                f.write_str("<")?;
                for arg in &seg.type_arguments {
                    write!(f, "{arg}")?;
                }
                f.write_str(">")?;
            }
        }
        f.write_str(";")
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Any => f.write_str("*"),
            TypeArgument::Exact(sig) => write!(f, "{sig}"),
            TypeArgument::Extends(sig) => write!(f, "+{sig}"),
            TypeArgument::Super(sig) => write!(f, "-{sig}"),
        }
    }
}

fn fmt_type_parameters(params: &[TypeParameter], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for param in params {
        write!(f, "{}:", param.name)?;
        if let Some(bound) = &param.class_bound {
            write!(f, "{bound}")?;
        }
        for bound in &param.interface_bounds {
            write!(f, ":{bound}")?;
        }
    }
    f.write_str(">")
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(&self.type_parameters, f)?;
        write!(f, "{}", self.super_class)?;
        for iface in &self.interfaces {
            write!(f, "{iface}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_type_parameters(&self.type_parameters, f)?;
        f.write_str("(")?;
        for param in &self.parameters {
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match &self.return_type {
            None => f.write_str("V")?,
            Some(ty) => write!(f, "{ty}")?,
        }
        for thrown in &self.throws {
            write!(f, "^{thrown}")?;
        }
        Ok(())
    }
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.parse_type_parameters_if_present()?;
    let super_class = p.parse_class_type_signature()?;
    let mut interfaces = Vec::new();
    while !p.is_eof() {
        interfaces.push(p.parse_class_type_signature()?);
    }
    Ok(ClassSignature { type_parameters, super_class, interfaces })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.parse_type_parameters_if_present()?;
    p.expect('(')?;
    let mut parameters = Vec::new();
    while !p.is_eof() && p.peek() != Some(')') {
        parameters.push(p.parse_type_signature()?);
    }
    p.expect(')')?;
    let return_type = if p.peek() == Some('V') {
        p.bump();
        None
    } else {
        Some(p.parse_type_signature()?)
    };

    let mut throws = Vec::new();
    while p.peek() == Some('^') {
        p.bump();
        let ty = match p.peek() {
            Some('T') => p.parse_type_variable_signature()?,
            Some('L') => TypeSignature::Class(p.parse_class_type_signature()?),
            _ => return Err(Error::InvalidSignature(sig.to_string())),
        };
        throws.push(ty);
    }

    if !p.is_eof() {
        return Err(Error::InvalidSignature(sig.to_string()));
    }

    Ok(MethodSignature { type_parameters, parameters, return_type, throws })
}

pub fn parse_field_signature(sig: &str) -> Result<TypeSignature> {
    let mut p = Parser::new(sig);
    let ty = p.parse_field_type_signature()?;
    if !p.is_eof() {
        return Err(Error::InvalidSignature(sig.to_string()));
    }
    Ok(ty)
}

struct Parser<'a> {
    sig: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(sig: &'a str) -> Self {
        Self { sig, bytes: sig.as_bytes(), pos: 0 }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).copied().map(|b| b as char)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == ch => Ok(()),
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_type_parameters_if_present(&mut self) -> Result<Vec<TypeParameter>> {
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.expect('<')?;
        let mut out = Vec::new();
        while self.peek() != Some('>') {
            if self.is_eof() {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            out.push(self.parse_type_parameter()?);
        }
        self.expect('>')?;
        Ok(out)
    }

    fn parse_type_parameter(&mut self) -> Result<TypeParameter> {
        let name = self.parse_identifier_until(':')?;
        self.expect(':')?;

        let class_bound = match self.peek() {
            Some(':') => None,
            Some('L') | Some('T') | Some('[') => Some(self.parse_field_type_signature()?),
            _ => return Err(Error::InvalidSignature(self.sig.to_string())),
        };

        let mut interface_bounds = Vec::new();
        while self.peek() == Some(':') {
            self.bump();
            interface_bounds.push(self.parse_field_type_signature()?);
        }

        Ok(TypeParameter { name, class_bound, interface_bounds })
    }

    fn parse_type_signature(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('B') => self.base(BaseType::Byte),
            Some('C') => self.base(BaseType::Char),
            Some('D') => self.base(BaseType::Double),
            Some('F') => self.base(BaseType::Float),
            Some('I') => self.base(BaseType::Int),
            Some('J') => self.base(BaseType::Long),
            Some('S') => self.base(BaseType::Short),
            Some('Z') => self.base(BaseType::Boolean),
            Some('L') | Some('T') | Some('[') => self.parse_field_type_signature(),
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn base(&mut self, base: BaseType) -> Result<TypeSignature> {
        self.bump();
        Ok(TypeSignature::Base(base))
    }

    fn parse_field_type_signature(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some('L') => Ok(TypeSignature::Class(self.parse_class_type_signature()?)),
            Some('T') => self.parse_type_variable_signature(),
            Some('[') => {
                self.bump();
                let component = self.parse_type_signature()?;
                Ok(TypeSignature::Array(Box::new(component)))
            }
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_type_variable_signature(&mut self) -> Result<TypeSignature> {
        self.expect('T')?;
        let name = self.parse_identifier_until(';')?;
        self.expect(';')?;
        Ok(TypeSignature::TypeVariable(name))
    }

    fn parse_class_type_signature(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;

        let mut package = Vec::new();
        // The leading identifiers are package segments as long as '/' follows.
        let mut first = self.parse_identifier()?;
        while self.peek() == Some('/') {
            self.bump();
            package.push(first);
            first = self.parse_identifier()?;
        }

        let mut segments = Vec::new();
        let type_arguments = self.parse_type_arguments_if_present()?;
        segments.push(ClassTypeSegment { name: first, type_arguments });

        while self.peek() == Some('.') {
            self.bump();
            let name = self.parse_identifier()?;
            let type_arguments = self.parse_type_arguments_if_present()?;
            segments.push(ClassTypeSegment { name, type_arguments });
        }

        self.expect(';')?;
        Ok(ClassTypeSignature { package, segments })
    }

    fn parse_type_arguments_if_present(&mut self) -> Result<Vec<TypeArgument>> {
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.expect('<')?;
        let mut args = Vec::new();
        while self.peek() != Some('>') {
            if self.is_eof() {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            args.push(self.parse_type_argument()?);
        }
        self.expect('>')?;
        Ok(args)
    }

    fn parse_type_argument(&mut self) -> Result<TypeArgument> {
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(TypeArgument::Any)
            }
            Some('+') => {
                self.bump();
                Ok(TypeArgument::Extends(Box::new(self.parse_field_type_signature()?)))
            }
            Some('-') => {
                self.bump();
                Ok(TypeArgument::Super(Box::new(self.parse_field_type_signature()?)))
            }
            Some('L') | Some('T') | Some('[') => {
                Ok(TypeArgument::Exact(Box::new(self.parse_field_type_signature()?)))
            }
            _ => Err(Error::InvalidSignature(self.sig.to_string())),
        }
    }

    fn parse_identifier_until(&mut self, delim: char) -> Result<String> {
        let start = self.pos;
        while !self.is_eof() && self.peek() != Some(delim) {
            let ch = self.peek().unwrap();
            if is_forbidden_in_identifier(ch) {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            self.pos += 1;
        }
        if self.is_eof() || start == self.pos {
            return Err(Error::InvalidSignature(self.sig.to_string()));
        }
        Ok(self.sig[start..self.pos].to_string())
    }

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.pos;
        while !self.is_eof() {
            let ch = self.peek().unwrap();
            if ch == '/' || ch == ';' || ch == '<' || ch == '>' || ch == '.' || ch == ':' {
                break;
            }
            if is_forbidden_in_identifier(ch) {
                return Err(Error::InvalidSignature(self.sig.to_string()));
            }
            self.pos += 1;
        }

        if start == self.pos {
            return Err(Error::InvalidSignature(self.sig.to_string()));
        }

        Ok(self.sig[start..self.pos].to_string())
    }
}

fn is_forbidden_in_identifier(ch: char) -> bool {
    matches!(ch, '[' | '^' | '(' | ')' | '*' | '+' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_class_signature_with_bound() {
        let sig = parse_class_signature("<T:Ljava/lang/Number;>Ljava/lang/Object;").unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.type_parameters[0].name, "T");
        assert_eq!(sig.super_class.internal_name(), "java/lang/Object");
    }

    #[test]
    fn parse_method_signature_with_type_param() {
        let sig = parse_method_signature("<U:Ljava/lang/Object;>(TU;)TU;").unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        assert_eq!(sig.parameters, vec![TypeSignature::TypeVariable("U".to_string())]);
        assert_eq!(sig.return_type, Some(TypeSignature::TypeVariable("U".to_string())));
    }

    #[test]
    fn printing_reproduces_input_bytes() {
        let class_sigs = [
            "<T:Ljava/lang/Number;>Ljava/lang/Object;",
            "Ljava/util/AbstractList<Ljava/lang/String;>;Ljava/io/Serializable;",
            "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;Ljava/util/Map<TK;TV;>;",
        ];
        for sig in class_sigs {
            assert_eq!(parse_class_signature(sig).unwrap().to_string(), sig);
        }

        let method_sigs = [
            "<U:Ljava/lang/Object;>(TU;)TU;",
            "(Ljava/util/List<+Ljava/lang/Number;>;)V^Ljava/io/IOException;",
            "([TE;Ljava/util/List<*>;)[TE;",
        ];
        for sig in method_sigs {
            assert_eq!(parse_method_signature(sig).unwrap().to_string(), sig);
        }
    }
}
