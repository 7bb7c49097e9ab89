use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("Invalid magic identifier: 0x{0:X}")]
    MagicMismatch(u32),
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("Unexpected end of input: needed {requested} bytes, {remaining} left")]
    UnexpectedEndOfInput { requested: usize, remaining: usize },
    #[error("Invalid cp info tag: {0}")]
    UnknownConstantTag(u8),
    #[error("Constant pool index out of range: {0}")]
    ConstantPoolIndexOutOfRange(u16),
    #[error("Expected {expected} at constant pool index {index}, found {found}")]
    ConstantPoolTypeMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Attribute {name} declared {declared} bytes but {consumed} were read")]
    AttributeLengthMismatch {
        name: String,
        declared: u32,
        consumed: usize,
    },
    #[error("Malformed modified UTF-8 at constant pool index {0}")]
    MalformedUtf8(u16),
    #[error("Invalid method handle reference kind: {0}")]
    InvalidReferenceKind(u8),
    #[error("{0} trailing bytes after class file")]
    TrailingBytes(usize),
}
