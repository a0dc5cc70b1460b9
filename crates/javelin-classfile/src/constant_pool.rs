use crate::error::{Error, Result};
use crate::reader::Reader;

/// The subset of constant-pool entries the semantic core consumes.
///
/// Member references, invokedynamic plumbing and module/package constants are
/// parsed for their byte length and recorded as `Skipped`; nothing upstream
/// of the bytecode emitter dereferences them.
#[derive(Debug, Clone)]
pub enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    Skipped(&'static str),
}

impl CpInfo {
    fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::Skipped(kind) => kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Option<CpInfo>>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        if count == 0 {
            return Err(Error::Other("constant_pool_count must be >= 1"));
        }

        let mut entries = vec![None; count];
        let mut i = 1usize;
        while i < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    CpInfo::Utf8(decode_modified_utf8(bytes)?)
                }
                3 => CpInfo::Integer(reader.read_u4()? as i32),
                4 => CpInfo::Float(f32::from_bits(reader.read_u4()?)),
                5 => CpInfo::Long(reader.read_u8()? as i64),
                6 => CpInfo::Double(f64::from_bits(reader.read_u8()?)),
                7 => CpInfo::Class { name_index: reader.read_u2()? },
                8 => CpInfo::String { string_index: reader.read_u2()? },
                // Fieldref / Methodref / InterfaceMethodref / NameAndType
                9 | 10 | 11 | 12 => {
                    reader.read_u2()?;
                    reader.read_u2()?;
                    CpInfo::Skipped("Ref")
                }
                // MethodHandle
                15 => {
                    reader.read_u1()?;
                    reader.read_u2()?;
                    CpInfo::Skipped("MethodHandle")
                }
                // MethodType / Module / Package
                16 | 19 | 20 => {
                    reader.read_u2()?;
                    CpInfo::Skipped("MethodType")
                }
                // Dynamic / InvokeDynamic
                17 | 18 => {
                    reader.read_u2()?;
                    reader.read_u2()?;
                    CpInfo::Skipped("Dynamic")
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };

            let wide = matches!(entry, CpInfo::Long(_) | CpInfo::Double(_));
            entries[i] = Some(entry);

            // Long/Double take up two slots.
            if wide {
                if i + 1 >= count {
                    return Err(Error::Other("malformed constant pool"));
                }
                i += 2;
            } else {
                i += 1;
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        let idx = index as usize;
        if idx == 0 || idx >= self.entries.len() {
            return Err(Error::InvalidConstantPoolIndex(index));
        }
        self.entries[idx]
            .as_ref()
            .ok_or(Error::InvalidConstantPoolIndex(index))
    }

    pub fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Ok(s.as_str()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    pub fn get_class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }
}

fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    // Modified UTF-8 is UTF-8 for the BMP plus NUL as 0xC0 0x80 and
    // supplementary characters as CESU-8 surrogate pairs. Decode to UTF-16
    // code units first; identifiers may legally contain unpaired surrogates,
    // so finish with a lossy conversion rather than rejecting the file.
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if (b & 0xE0) == 0xC0 {
            if i + 1 >= bytes.len() {
                return Err(Error::InvalidModifiedUtf8);
            }
            let b2 = bytes[i + 1];
            if b == 0xC0 && b2 == 0x80 {
                units.push(0);
            } else {
                if (b2 & 0xC0) != 0x80 {
                    return Err(Error::InvalidModifiedUtf8);
                }
                units.push((((b & 0x1F) as u16) << 6) | ((b2 & 0x3F) as u16));
            }
            i += 2;
        } else if (b & 0xF0) == 0xE0 {
            if i + 2 >= bytes.len() {
                return Err(Error::InvalidModifiedUtf8);
            }
            let b2 = bytes[i + 1];
            let b3 = bytes[i + 2];
            if (b2 & 0xC0) != 0x80 || (b3 & 0xC0) != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(
                (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | ((b3 & 0x3F) as u16),
            );
            i += 3;
        } else {
            // Modified UTF-8 never uses 4-byte sequences.
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    Ok(String::from_utf16_lossy(&units))
}
