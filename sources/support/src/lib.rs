pub mod bytes_ext;
pub mod reader;

pub use reader::{ByteReader, ReadError};
