use std::fmt;

/// Attributes attached to a class, a member, or a `Code` attribute, in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name() == name)
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn constant_value(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a {
            Attribute::ConstantValue { constantvalue_index } => Some(*constantvalue_index),
            _ => None,
        })
    }

    pub fn exceptions(&self) -> Option<&[u16]> {
        self.0.iter().find_map(|a| match a {
            Attribute::Exceptions(indices) => Some(indices.as_slice()),
            _ => None,
        })
    }

    pub fn source_file(&self) -> Option<u16> {
        self.0.iter().find_map(|a| match a {
            Attribute::SourceFile { sourcefile_index } => Some(*sourcefile_index),
            _ => None,
        })
    }

    pub fn line_number_table(&self) -> Option<&[LineNumberTableEntry]> {
        self.0.iter().find_map(|a| match a {
            Attribute::LineNumberTable(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    pub fn local_variable_table(&self) -> Option<&[LocalVariableTableEntry]> {
        self.0.iter().find_map(|a| match a {
            Attribute::LocalVariableTable(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }
}
impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Code(CodeAttribute),
    ConstantValue { constantvalue_index: u16 },
    Exceptions(Vec<u16>),
    SourceFile { sourcefile_index: u16 },
    LineNumberTable(Vec<LineNumberTableEntry>),
    LocalVariableTable(Vec<LocalVariableTableEntry>),
    LocalVariableTypeTable(Vec<LocalVariableTableEntry>),
    InnerClasses(Vec<InnerClassEntry>),
    EnclosingMethod { class_index: u16, method_index: u16 },
    Signature { signature_index: u16 },
    BootstrapMethods(Vec<BootstrapMethod>),
    Synthetic,
    Deprecated,
    /// Any attribute without a dedicated decoder, kept byte for byte.
    Other(RawAttribute),
}
impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Code(_) => "Code",
            Attribute::ConstantValue { .. } => "ConstantValue",
            Attribute::Exceptions(_) => "Exceptions",
            Attribute::SourceFile { .. } => "SourceFile",
            Attribute::LineNumberTable(_) => "LineNumberTable",
            Attribute::LocalVariableTable(_) => "LocalVariableTable",
            Attribute::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
            Attribute::InnerClasses(_) => "InnerClasses",
            Attribute::EnclosingMethod { .. } => "EnclosingMethod",
            Attribute::Signature { .. } => "Signature",
            Attribute::BootstrapMethods(_) => "BootstrapMethods",
            Attribute::Synthetic => "Synthetic",
            Attribute::Deprecated => "Deprecated",
            Attribute::Other(raw) => raw.name.as_str(),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct RawAttribute {
    pub attribute_name_index: u16,
    pub name: String,
    pub info: Vec<u8>,
}
impl fmt::Debug for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAttribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("name", &self.name)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Clone, PartialEq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}
impl fmt::Debug for CodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAttribute")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code", &format!("({} bytes)", self.code.len()))
            .field("exception_table", &self.exception_table)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberTableEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

/// Entry of a `LocalVariableTable` or `LocalVariableTypeTable`. For the latter,
/// `descriptor_index` points at a generic signature rather than a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableTableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    pub bootstrap_method_ref: u16,
    pub bootstrap_arguments: Vec<u16>,
}
