use support::ReadError;
use thiserror::Error;

/// First format error aborts the class being parsed; the archive walker
/// decides whether to carry on with the next entry.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("[P] bad class magic {found:#010x}")]
    BadMagic { found: u32 },

    #[error("[P] unsupported constant tag {tag}")]
    UnsupportedTag { tag: u8 },

    #[error("[P] constant index {index} outside pool of {len}")]
    IndexOutOfBounds { index: u16, len: usize },

    #[error("[P] no string reachable from constant index {index}")]
    StringNotFound { index: u16 },

    #[error("[P] inner class info {index} encloses itself")]
    InvalidInnerClass { index: u16 },

    #[error("[P] no attribute tagged {tag}")]
    AttrTagNotFound { tag: &'static str },

    #[error("[P] truncated class file: {0}")]
    Truncated(#[from] ReadError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
