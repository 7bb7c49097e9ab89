use log::{debug, trace};

use crate::{
    attributes::{
        Attribute, Attributes, BootstrapMethod, CodeAttribute, ExceptionTableEntry,
        InnerClassEntry, LineNumberTableEntry, LocalVariableTableEntry, RawAttribute,
    },
    class_file::MemberInfo,
    constant_pool::{
        ClassInfo, CpInfo, DynamicInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo,
        RefInfo,
    },
    reader::ByteCursor,
    AccessFlags, ClassFile, ClassFileError, ConstantPool, ParseOptions, Result,
};

const MAGIC: u32 = 0xCAFEBABE;

// Smallest encoded size of each record kind, used to reject counts the remaining input
// cannot hold before allocating for them.
const MIN_CP_SLOT_SIZE: usize = 3;
const MEMBER_HEADER_SIZE: usize = 8;
const ATTRIBUTE_HEADER_SIZE: usize = 6;

/// Single pass decoder from a class file buffer to a [`ClassFile`].
pub struct Parser<'a> {
    r: ByteCursor<'a>,
    options: ParseOptions,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: ByteCursor::new(buf),
            options: ParseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);

        let this_class = self.r.read_u16()?;
        constant_pool.class_name(this_class)?;
        let super_class = self.r.read_u16()?;
        if super_class != 0 {
            constant_pool.class_name(super_class)?;
        }

        let interfaces_count = self.r.read_u16()?;
        let interfaces = self.r.read_u16_vec(interfaces_count as usize)?;
        for &index in &interfaces {
            constant_pool.class_name(index)?;
        }

        let fields = self.parse_members(&constant_pool)?;
        let methods = self.parse_members(&constant_pool)?;
        let attributes = self.parse_attributes(&constant_pool)?;
        debug!(
            "decoded {} fields, {} methods, {} attributes",
            fields.len(),
            methods.len(),
            attributes.len()
        );

        let trailing = self.r.remaining();
        if trailing > 0 {
            if self.options.reject_trailing_bytes {
                return Err(ClassFileError::TrailingBytes(trailing));
            }
            debug!("ignoring {} trailing bytes", trailing);
        }

        Ok(ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.r.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::MagicMismatch(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.r.read_u16()?;
        let major = self.r.read_u16()?;
        self.options.check_version(major, minor)?;
        debug!("class file version {}.{}", major, minor);

        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.r.read_u16()?;

        let count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = self.r.bounded_vec(count, MIN_CP_SLOT_SIZE)?;
        while res.len() < count {
            let cp_info = self.parse_cp_info()?;
            let slot_size = cp_info.slot_size();
            res.push(cp_info);
            if slot_size == 2 {
                // The reserved follow slot would be index `constant_pool_count` itself.
                if res.len() == count {
                    return Err(ClassFileError::ConstantPoolIndexOutOfRange(
                        constant_pool_count,
                    ));
                }
                res.push(CpInfo::Unusable);
            }
        }
        debug!("constant pool holds {} slots", res.len());

        let constant_pool = ConstantPool::new(res);
        constant_pool.validate()?;
        Ok(constant_pool)
    }

    fn parse_cp_info(&mut self) -> Result<CpInfo> {
        let tag = self.r.read_u8()?;
        let cp_info = match tag {
            1 => self.parse_utf8()?,
            3 => CpInfo::Integer(self.r.read_i32()?),
            4 => CpInfo::Float(self.r.read_f32()?),
            5 => CpInfo::Long(self.r.read_i64()?),
            6 => CpInfo::Double(self.r.read_f64()?),
            7 => CpInfo::Class(ClassInfo {
                name_index: self.r.read_u16()?,
            }),
            8 => CpInfo::String {
                string_index: self.r.read_u16()?,
            },
            9 => CpInfo::FieldRef(self.parse_ref_info()?),
            10 => CpInfo::MethodRef(self.parse_ref_info()?),
            11 => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            12 => self.parse_name_and_type_info()?,
            15 => self.parse_method_handle()?,
            16 => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.r.read_u16()?,
            }),
            17 => CpInfo::Dynamic(self.parse_dynamic_info()?),
            18 => CpInfo::InvokeDynamic(self.parse_dynamic_info()?),
            19 => CpInfo::Module {
                name_index: self.r.read_u16()?,
            },
            20 => CpInfo::Package {
                name_index: self.r.read_u16()?,
            },
            _ => return Err(ClassFileError::UnknownConstantTag(tag)),
        };

        Ok(cp_info)
    }

    fn parse_utf8(&mut self) -> Result<CpInfo> {
        let length = self.r.read_u16()?;
        let bytes = self.r.read_bytes(length as usize)?;

        Ok(CpInfo::Utf8(bytes.to_vec()))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.r.read_u16()?;
        let descriptor_index = self.r.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.r.read_u8()?;
        let reference_index = self.r.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.r.read_u16()?;
        let name_and_type_index = self.r.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_members(&mut self, constant_pool: &ConstantPool) -> Result<Vec<MemberInfo>> {
        self.parse_table(MEMBER_HEADER_SIZE, |p| p.parse_member_info(constant_pool))
    }

    fn parse_member_info(&mut self, constant_pool: &ConstantPool) -> Result<MemberInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.r.read_u16()?);
        let name_index = self.r.read_u16()?;
        constant_pool.utf8(name_index)?;
        let descriptor_index = self.r.read_u16()?;
        constant_pool.utf8(descriptor_index)?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(MemberInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_attributes(&mut self, constant_pool: &ConstantPool) -> Result<Attributes> {
        self.parse_table(ATTRIBUTE_HEADER_SIZE, |p| p.parse_attribute(constant_pool))
            .map(Attributes)
    }

    fn parse_attribute(&mut self, constant_pool: &ConstantPool) -> Result<Attribute> {
        let attribute_name_index = self.r.read_u16()?;
        let name = constant_pool.utf8(attribute_name_index)?.into_owned();
        let attribute_length = self.r.read_u32()?;
        let info = self.r.read_bytes(attribute_length as usize)?;

        // Decode on a cursor bounded by the declared length, so an over-read never
        // reaches the bytes of whatever follows the attribute.
        let outer = std::mem::replace(&mut self.r, ByteCursor::new(info));
        let decoded = self.parse_attribute_info(attribute_name_index, &name, constant_pool);
        let leftover = self.r.remaining();
        self.r = outer;

        let consumed = match decoded {
            Ok(attribute) if leftover == 0 => {
                trace!("decoded attribute {} ({} bytes)", name, attribute_length);
                return Ok(attribute);
            }
            Ok(_) => info.len() - leftover,
            // Everything before the failed read, plus what that read asked for.
            Err(ClassFileError::UnexpectedEndOfInput {
                requested,
                remaining,
            }) => (info.len() - remaining).saturating_add(requested),
            Err(e) => return Err(e),
        };

        Err(ClassFileError::AttributeLengthMismatch {
            name,
            declared: attribute_length,
            consumed,
        })
    }

    fn parse_attribute_info(
        &mut self,
        attribute_name_index: u16,
        name: &str,
        constant_pool: &ConstantPool,
    ) -> Result<Attribute> {
        let attribute = match name {
            "Code" => Attribute::Code(self.parse_code_attribute(constant_pool)?),
            "ConstantValue" => {
                let constantvalue_index = self.r.read_u16()?;
                constant_pool.check_constant_value(constantvalue_index)?;
                Attribute::ConstantValue {
                    constantvalue_index,
                }
            }
            "Exceptions" => {
                let number_of_exceptions = self.r.read_u16()?;
                let exceptions = self.r.read_u16_vec(number_of_exceptions as usize)?;
                for &index in &exceptions {
                    constant_pool.class_name(index)?;
                }
                Attribute::Exceptions(exceptions)
            }
            "SourceFile" => {
                let sourcefile_index = self.r.read_u16()?;
                constant_pool.utf8(sourcefile_index)?;
                Attribute::SourceFile { sourcefile_index }
            }
            "LineNumberTable" => {
                Attribute::LineNumberTable(self.parse_table(4, Self::parse_line_number)?)
            }
            "LocalVariableTable" => Attribute::LocalVariableTable(
                self.parse_table(10, |p| p.parse_local_variable(constant_pool))?,
            ),
            "LocalVariableTypeTable" => Attribute::LocalVariableTypeTable(
                self.parse_table(10, |p| p.parse_local_variable(constant_pool))?,
            ),
            "InnerClasses" => Attribute::InnerClasses(
                self.parse_table(8, |p| p.parse_inner_class(constant_pool))?,
            ),
            "EnclosingMethod" => {
                let class_index = self.r.read_u16()?;
                constant_pool.class_name(class_index)?;
                let method_index = self.r.read_u16()?;
                if method_index != 0 {
                    constant_pool.name_and_type(method_index)?;
                }
                Attribute::EnclosingMethod {
                    class_index,
                    method_index,
                }
            }
            "Signature" => {
                let signature_index = self.r.read_u16()?;
                constant_pool.utf8(signature_index)?;
                Attribute::Signature { signature_index }
            }
            "BootstrapMethods" => Attribute::BootstrapMethods(
                self.parse_table(4, |p| p.parse_bootstrap_method(constant_pool))?,
            ),
            "Synthetic" => Attribute::Synthetic,
            "Deprecated" => Attribute::Deprecated,
            _ => {
                let length = self.r.remaining();
                debug!("keeping unrecognized attribute {} ({} bytes)", name, length);
                Attribute::Other(RawAttribute {
                    attribute_name_index,
                    name: name.to_owned(),
                    info: self.r.read_bytes(length)?.to_vec(),
                })
            }
        };

        Ok(attribute)
    }

    fn parse_code_attribute(&mut self, constant_pool: &ConstantPool) -> Result<CodeAttribute> {
        let max_stack = self.r.read_u16()?;
        let max_locals = self.r.read_u16()?;
        let code_length = self.r.read_u32()?;
        let code = self.r.read_bytes(code_length as usize)?.to_vec();
        let exception_table =
            self.parse_table(8, |p| p.parse_exception_table_entry(constant_pool))?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<ExceptionTableEntry> {
        let start_pc = self.r.read_u16()?;
        let end_pc = self.r.read_u16()?;
        let handler_pc = self.r.read_u16()?;
        // 0 catches everything
        let catch_type = self.r.read_u16()?;
        if catch_type != 0 {
            constant_pool.class_name(catch_type)?;
        }

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_line_number(&mut self) -> Result<LineNumberTableEntry> {
        let start_pc = self.r.read_u16()?;
        let line_number = self.r.read_u16()?;

        Ok(LineNumberTableEntry {
            start_pc,
            line_number,
        })
    }

    fn parse_local_variable(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<LocalVariableTableEntry> {
        let start_pc = self.r.read_u16()?;
        let length = self.r.read_u16()?;
        let name_index = self.r.read_u16()?;
        constant_pool.utf8(name_index)?;
        let descriptor_index = self.r.read_u16()?;
        constant_pool.utf8(descriptor_index)?;
        let index = self.r.read_u16()?;

        Ok(LocalVariableTableEntry {
            start_pc,
            length,
            name_index,
            descriptor_index,
            index,
        })
    }

    fn parse_inner_class(&mut self, constant_pool: &ConstantPool) -> Result<InnerClassEntry> {
        let inner_class_info_index = self.r.read_u16()?;
        constant_pool.class_name(inner_class_info_index)?;
        // Top-level and anonymous classes leave these two at 0.
        let outer_class_info_index = self.r.read_u16()?;
        if outer_class_info_index != 0 {
            constant_pool.class_name(outer_class_info_index)?;
        }
        let inner_name_index = self.r.read_u16()?;
        if inner_name_index != 0 {
            constant_pool.utf8(inner_name_index)?;
        }
        let inner_class_access_flags = self.r.read_u16()?;

        Ok(InnerClassEntry {
            inner_class_info_index,
            outer_class_info_index,
            inner_name_index,
            inner_class_access_flags,
        })
    }

    fn parse_bootstrap_method(&mut self, constant_pool: &ConstantPool) -> Result<BootstrapMethod> {
        let bootstrap_method_ref = self.r.read_u16()?;
        constant_pool.method_handle(bootstrap_method_ref)?;
        let num_bootstrap_arguments = self.r.read_u16()?;
        let bootstrap_arguments = self.r.read_u16_vec(num_bootstrap_arguments as usize)?;
        for &index in &bootstrap_arguments {
            constant_pool.check_loadable(index)?;
        }

        Ok(BootstrapMethod {
            bootstrap_method_ref,
            bootstrap_arguments,
        })
    }

    /// Reads a 16-bit count followed by that many records.
    fn parse_table<T>(
        &mut self,
        min_record_size: usize,
        mut parse_record: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.r.read_u16()? as usize;
        let mut records = self.r.bounded_vec(count, min_record_size)?;
        for _ in 0..count {
            records.push(parse_record(self)?);
        }

        Ok(records)
    }
}
