pub mod error;
pub mod loader;
pub mod records;

pub use error::ArchiveError;
pub use loader::{load, parse_archive};
