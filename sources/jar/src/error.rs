use parse::error::ParseError;
use support::ReadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("[L] archive of {len} bytes cannot hold an end record")]
    TooSmall { len: usize },

    #[error("[L] no end-of-central-directory magic; tail word was {found:#010x}")]
    BadMagic { found: u32 },

    #[error("[L] record magic {found:#010x} where {expected:#010x} belongs")]
    BadRecordMagic { expected: u32, found: u32 },

    #[error("[L] truncated archive: {0}")]
    Truncated(#[from] ReadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("[L] {0}")]
    Io(#[from] std::io::Error),
}
