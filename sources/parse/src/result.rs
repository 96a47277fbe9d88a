use crate::classfile::ClassFile;
use crate::error::ParseError;

pub type ParseResult<T = ClassFile> = Result<T, ParseError>;
