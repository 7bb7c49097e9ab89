// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
pub mod constant_pool;
mod error;
mod parser;
pub mod reader;
mod version;

pub use self::class_file::{ClassFile, FieldInfo, MemberInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use constant_pool::ConstantPool;
pub use error::ClassFileError;
pub use parser::Parser;
pub use version::{ParseOptions, DEFAULT_MAX_MAJOR_VERSION, OLDEST_MAJOR_VERSION};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// Decodes a complete class file held in `buf` with the default [`ParseOptions`].
pub fn parse(buf: &[u8]) -> Result<ClassFile> {
    Parser::new(buf).parse()
}
