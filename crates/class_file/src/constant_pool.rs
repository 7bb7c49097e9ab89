use std::borrow::Cow;

use crate::{ClassFileError, Result};

macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {{
        let index = $index;
        match $cp.get(index)? {
            CpInfo::$i(ref n) => Ok(n),
            c => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: stringify!($i),
                found: c.name(),
            }),
        }
    }};
}

/// The constant pool of a class file, indexed from 1.
///
/// Slot 0 is never stored. The slot following a `Long` or `Double` holds
/// [`CpInfo::Unusable`] and resolving it fails like any other out of range index.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
}
impl ConstantPool {
    pub(crate) fn new(cp_infos: Vec<CpInfo>) -> Self {
        Self { cp_infos }
    }

    /// Number of usable index slots, counting the reserved halves of two-slot entries.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        match (index as usize)
            .checked_sub(1)
            .and_then(|i| self.cp_infos.get(i))
        {
            None | Some(CpInfo::Unusable) => {
                Err(ClassFileError::ConstantPoolIndexOutOfRange(index))
            }
            Some(cp_info) => Ok(cp_info),
        }
    }

    /// Raw modified UTF-8 bytes of a `Utf8` entry.
    pub fn utf8_bytes(&self, index: u16) -> Result<&[u8]> {
        matches_cp_info!(self, index, Utf8).map(Vec::as_slice)
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        let bytes = self.utf8_bytes(index)?;
        cesu8::from_java_cesu8(bytes).map_err(|_| ClassFileError::MalformedUtf8(index))
    }

    pub fn class_name(&self, index: u16) -> Result<Cow<'_, str>> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;
        self.utf8(*name_index)
    }

    pub fn string(&self, index: u16) -> Result<Cow<'_, str>> {
        match self.get(index)? {
            CpInfo::String { string_index } => self.utf8(*string_index),
            c => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: "String",
                found: c.name(),
            }),
        }
    }

    /// Resolves a `NameAndType` entry to its `(name, descriptor)` pair.
    pub fn name_and_type(&self, index: u16) -> Result<(Cow<'_, str>, Cow<'_, str>)> {
        let NameAndTypeInfo {
            name_index,
            descriptor_index,
        } = matches_cp_info!(self, index, NameAndType)?;
        Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
    }

    /// Resolves any of the three member reference kinds.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let RefInfo {
            class_index,
            name_and_type_index,
        } = match self.get(index)? {
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => r,
            c => {
                return Err(ClassFileError::ConstantPoolTypeMismatch {
                    index,
                    expected: "FieldRef, MethodRef or InterfaceMethodRef",
                    found: c.name(),
                })
            }
        };
        let (name, descriptor) = self.name_and_type(*name_and_type_index)?;

        Ok(MemberRef {
            class_name: self.class_name(*class_index)?,
            name,
            descriptor,
        })
    }

    pub fn integer(&self, index: u16) -> Result<i32> {
        matches_cp_info!(self, index, Integer).copied()
    }

    pub fn float(&self, index: u16) -> Result<f32> {
        matches_cp_info!(self, index, Float).copied()
    }

    pub fn long(&self, index: u16) -> Result<i64> {
        matches_cp_info!(self, index, Long).copied()
    }

    pub fn double(&self, index: u16) -> Result<f64> {
        matches_cp_info!(self, index, Double).copied()
    }

    pub fn method_handle(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }

    /// Checks `index` names a constant a `ConstantValue` attribute may hold.
    pub(crate) fn check_constant_value(&self, index: u16) -> Result<()> {
        match self.get(index)? {
            CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_)
            | CpInfo::String { .. } => Ok(()),
            c => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: "Integer, Float, Long, Double or String",
                found: c.name(),
            }),
        }
    }

    /// Checks `index` names a loadable constant, as bootstrap arguments must.
    pub(crate) fn check_loadable(&self, index: u16) -> Result<()> {
        match self.get(index)? {
            CpInfo::Integer(_)
            | CpInfo::Float(_)
            | CpInfo::Long(_)
            | CpInfo::Double(_)
            | CpInfo::Class(_)
            | CpInfo::String { .. }
            | CpInfo::MethodHandle(_)
            | CpInfo::MethodType(_)
            | CpInfo::Dynamic(_) => Ok(()),
            c => Err(ClassFileError::ConstantPoolTypeMismatch {
                index,
                expected: "loadable constant",
                found: c.name(),
            }),
        }
    }

    /// Checks every index nested inside the pool points at an entry of the right kind.
    ///
    /// Entries may refer forward, so this only runs once the whole table is read.
    pub(crate) fn validate(&self) -> Result<()> {
        for cp_info in self {
            match cp_info {
                CpInfo::Class(ClassInfo { name_index })
                | CpInfo::Module { name_index }
                | CpInfo::Package { name_index } => {
                    matches_cp_info!(self, *name_index, Utf8)?;
                }
                CpInfo::String { string_index } => {
                    matches_cp_info!(self, *string_index, Utf8)?;
                }
                CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                    matches_cp_info!(self, r.class_index, Class)?;
                    matches_cp_info!(self, r.name_and_type_index, NameAndType)?;
                }
                CpInfo::NameAndType(NameAndTypeInfo {
                    name_index,
                    descriptor_index,
                }) => {
                    matches_cp_info!(self, *name_index, Utf8)?;
                    matches_cp_info!(self, *descriptor_index, Utf8)?;
                }
                CpInfo::MethodHandle(MethodHandleInfo {
                    reference_kind,
                    reference_index,
                }) => {
                    let expected = match reference_kind {
                        1..=4 => "FieldRef",
                        5..=9 => "MethodRef or InterfaceMethodRef",
                        kind => return Err(ClassFileError::InvalidReferenceKind(*kind)),
                    };
                    match (reference_kind, self.get(*reference_index)?) {
                        (1..=4, CpInfo::FieldRef(_))
                        | (5..=9, CpInfo::MethodRef(_) | CpInfo::InterfaceMethodRef(_)) => {}
                        (_, c) => {
                            return Err(ClassFileError::ConstantPoolTypeMismatch {
                                index: *reference_index,
                                expected,
                                found: c.name(),
                            })
                        }
                    }
                }
                CpInfo::MethodType(MethodTypeInfo { descriptor_index }) => {
                    matches_cp_info!(self, *descriptor_index, Utf8)?;
                }
                CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                    matches_cp_info!(self, d.name_and_type_index, NameAndType)?;
                }
                CpInfo::Utf8(_)
                | CpInfo::Integer(_)
                | CpInfo::Float(_)
                | CpInfo::Long(_)
                | CpInfo::Double(_)
                | CpInfo::Unusable => {}
            }
        }

        Ok(())
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(Vec<u8>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module { name_index: u16 },
    Package { name_index: u16 },
    Unusable,
}
impl CpInfo {
    pub fn name(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class(_) => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::FieldRef(_) => "FieldRef",
            CpInfo::MethodRef(_) => "MethodRef",
            CpInfo::InterfaceMethodRef(_) => "InterfaceMethodRef",
            CpInfo::NameAndType(_) => "NameAndType",
            CpInfo::MethodHandle(_) => "MethodHandle",
            CpInfo::MethodType(_) => "MethodType",
            CpInfo::Dynamic(_) => "Dynamic",
            CpInfo::InvokeDynamic(_) => "InvokeDynamic",
            CpInfo::Module { .. } => "Module",
            CpInfo::Package { .. } => "Package",
            CpInfo::Unusable => "Unusable",
        }
    }

    /// Number of pool slots the entry occupies.
    pub fn slot_size(&self) -> usize {
        match self {
            CpInfo::Long(_) | CpInfo::Double(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // Must point at a Utf8 entry holding a binary name in internal form (slash separated).
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

/// A field or method reference with every index resolved.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MemberRef<'a> {
    pub class_name: Cow<'a, str>,
    pub name: Cow<'a, str>,
    pub descriptor: Cow<'a, str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8(b"java/lang/Object".to_vec()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Long(7),
            CpInfo::Unusable,
            CpInfo::String { string_index: 1 },
        ])
    }

    #[test]
    fn resolves_class_name_through_utf8() {
        assert_eq!("java/lang/Object", pool().class_name(2).unwrap());
    }

    #[test]
    fn index_zero_and_past_end_are_out_of_range() {
        let cp = pool();
        assert_eq!(
            Err(ClassFileError::ConstantPoolIndexOutOfRange(0)),
            cp.get(0)
        );
        assert_eq!(
            Err(ClassFileError::ConstantPoolIndexOutOfRange(6)),
            cp.get(6)
        );
    }

    #[test]
    fn follow_slot_of_long_is_out_of_range() {
        let cp = pool();
        assert_eq!(7, cp.long(3).unwrap());
        assert_eq!(
            Err(ClassFileError::ConstantPoolIndexOutOfRange(4)),
            cp.get(4)
        );
    }

    #[test]
    fn wrong_tag_is_a_type_mismatch() {
        assert_eq!(
            Err(ClassFileError::ConstantPoolTypeMismatch {
                index: 1,
                expected: "Class",
                found: "Utf8",
            }),
            pool().class_name(1)
        );
    }

    #[test]
    fn modified_utf8_null_and_supplementary() {
        let cp = ConstantPool::new(vec![
            // "a\0b" with the overlong two-byte null
            CpInfo::Utf8(vec![b'a', 0xC0, 0x80, b'b']),
            // U+1F600 as a surrogate pair, each half three bytes
            CpInfo::Utf8(vec![0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]),
            CpInfo::Utf8(vec![b'x', 0xFF]),
        ]);
        assert_eq!("a\0b", cp.utf8(1).unwrap());
        assert_eq!("\u{1F600}", cp.utf8(2).unwrap());
        assert_eq!(Err(ClassFileError::MalformedUtf8(3)), cp.utf8(3));
    }

    #[test]
    fn validate_catches_dangling_nested_index() {
        let cp = ConstantPool::new(vec![CpInfo::Class(ClassInfo { name_index: 9 })]);
        assert_eq!(
            Err(ClassFileError::ConstantPoolIndexOutOfRange(9)),
            cp.validate()
        );
        assert!(pool().validate().is_ok());
    }

    #[test]
    fn constant_value_and_loadable_kinds() {
        let cp = pool();
        assert!(cp.check_constant_value(3).is_ok());
        assert!(cp.check_constant_value(5).is_ok());
        assert_eq!(
            Err(ClassFileError::ConstantPoolTypeMismatch {
                index: 2,
                expected: "Integer, Float, Long, Double or String",
                found: "Class",
            }),
            cp.check_constant_value(2)
        );

        assert!(cp.check_loadable(2).is_ok());
        assert_eq!(
            Err(ClassFileError::ConstantPoolTypeMismatch {
                index: 1,
                expected: "loadable constant",
                found: "Utf8",
            }),
            cp.check_loadable(1)
        );
        assert_eq!(
            Err(ClassFileError::ConstantPoolIndexOutOfRange(4)),
            cp.check_loadable(4)
        );
    }
}
