use std::borrow::Cow;

use crate::{attributes::Attributes, parser::Parser, AccessFlags, ConstantPool, Result};

/// A fully decoded class file.
///
/// Only [`Parser`] builds one, and it never hands out a partially filled value. All
/// string accessors resolve through the constant pool on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub(crate) minor_version: u16,
    pub(crate) major_version: u16,
    pub(crate) constant_pool: ConstantPool,
    pub(crate) access_flags: AccessFlags,
    pub(crate) this_class: u16,
    pub(crate) super_class: u16,
    pub(crate) interfaces: Vec<u16>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn this_class(&self) -> u16 {
        self.this_class
    }

    pub fn super_class(&self) -> u16 {
        self.super_class
    }

    pub fn interfaces(&self) -> &[u16] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Binary name of this class in internal form, e.g. `java/lang/Object`.
    pub fn class_name(&self) -> Result<Cow<'_, str>> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Binary name of the direct superclass, or an empty string for `java/lang/Object`,
    /// the only class file whose super_class item is zero.
    pub fn super_class_name(&self) -> Result<Cow<'_, str>> {
        if self.super_class == 0 {
            return Ok(Cow::Borrowed(""));
        }

        self.constant_pool.class_name(self.super_class)
    }

    pub fn interface_names(&self) -> Result<Vec<Cow<'_, str>>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn member_name(&self, member: &MemberInfo) -> Result<Cow<'_, str>> {
        member.name(&self.constant_pool)
    }

    pub fn member_descriptor(&self, member: &MemberInfo) -> Result<Cow<'_, str>> {
        member.descriptor(&self.constant_pool)
    }

    pub fn find_field(&self, name: &str) -> Result<Option<&FieldInfo>> {
        for field in &self.fields {
            if self.member_name(field)? == name {
                return Ok(Some(field));
            }
        }

        Ok(None)
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Result<Option<&MethodInfo>> {
        for method in &self.methods {
            if self.member_name(method)? == name && self.member_descriptor(method)? == descriptor {
                return Ok(Some(method));
            }
        }

        Ok(None)
    }

    /// Value of the top level `SourceFile` attribute, if present.
    pub fn source_file(&self) -> Result<Option<Cow<'_, str>>> {
        self.attributes
            .source_file()
            .map(|index| self.constant_pool.utf8(index))
            .transpose()
    }
}

/// A field or method record. Indices are kept raw; resolve them through the pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
impl MemberInfo {
    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.name_index)
    }

    pub fn descriptor<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.descriptor_index)
    }
}

pub type FieldInfo = MemberInfo;
pub type MethodInfo = MemberInfo;
